use crate::error::{DatasheetError, DatasheetResult};
use crate::excel::{DatasheetExporter, GenerateMode, BATCH_ARCHIVE_NAME};
use crate::i18n::{BuiltinLocalizer, Locale};
use crate::parser::{load_template, parse_catalog, LoadedCatalog};
use colored::Colorize;
use std::path::{Path, PathBuf};

fn parse_locale(locale: &str) -> DatasheetResult<Locale> {
    locale
        .parse::<Locale>()
        .map_err(DatasheetError::Validation)
}

fn exporter_for<'a>(loaded: &'a LoadedCatalog, locale: Locale) -> DatasheetExporter<'a> {
    let mut exporter = DatasheetExporter::new(&loaded.catalog, &BuiltinLocalizer)
        .with_locale(locale)
        .with_footer(loaded.footer.clone());
    if let Some(company) = &loaded.company {
        exporter = exporter.with_company(company);
    }
    exporter
}

/// Execute the validate command: load a catalog file and report it.
pub fn validate(file: PathBuf) -> DatasheetResult<()> {
    println!("{}", "📋 Datasheet - Validating catalog".bold().green());
    println!("   File: {}", file.display());
    println!();

    let loaded = parse_catalog(&file)?;
    println!("{}", "✅ Catalog is valid".bold().green());
    println!("   Sections: {}", loaded.catalog.section_count());
    println!("   Groups:   {}", loaded.catalog.group_count());
    println!("   Fields:   {}", loaded.catalog.field_count());
    println!("   Products: {}", loaded.catalog.products().len());
    Ok(())
}

/// Execute the export command: ad-hoc workbook for one product.
pub fn export(file: PathBuf, product: String, output: PathBuf, locale: String) -> DatasheetResult<()> {
    println!("{}", "📊 Datasheet - Ad-hoc export".bold().green());
    println!("   File: {}", file.display());
    println!("   Product: {}", product.bright_blue());
    println!();

    let locale = parse_locale(&locale)?;
    let loaded = parse_catalog(&file)?;
    let exporter = exporter_for(&loaded, locale);
    let bytes = exporter.generate(GenerateMode::AdHoc, &product)?;
    std::fs::write(&output, bytes)?;

    println!("{} {}", "✅ Written".bold().green(), output.display());
    Ok(())
}

/// Execute the template command: templated workbook for one product.
pub fn template(
    file: PathBuf,
    template_path: PathBuf,
    product: String,
    output: PathBuf,
    locale: String,
) -> DatasheetResult<()> {
    println!("{}", "📊 Datasheet - Templated export".bold().green());
    println!("   File: {}", file.display());
    println!("   Template: {}", template_path.display());
    println!("   Product: {}", product.bright_blue());
    println!();

    let locale = parse_locale(&locale)?;
    let loaded = parse_catalog(&file)?;
    let template = load_template(&template_path)?;
    let exporter = exporter_for(&loaded, locale);
    let bytes = exporter.generate(GenerateMode::Templated(&template), &product)?;
    std::fs::write(&output, bytes)?;

    println!("{} {}", "✅ Written".bold().green(), output.display());
    Ok(())
}

/// Execute the batch command: templated export of many products into the
/// zip archive. Per-product failures are reported, not fatal.
pub fn batch(
    file: PathBuf,
    template_path: PathBuf,
    products: Vec<String>,
    output: Option<PathBuf>,
    locale: String,
) -> DatasheetResult<()> {
    println!("{}", "📦 Datasheet - Batch export".bold().green());
    println!("   File: {}", file.display());
    println!("   Template: {}", template_path.display());
    println!();

    let locale = parse_locale(&locale)?;
    let loaded = parse_catalog(&file)?;
    let template = load_template(&template_path)?;

    let codes: Vec<String> = if products.is_empty() {
        loaded
            .catalog
            .products()
            .iter()
            .map(|p| p.code.clone())
            .collect()
    } else {
        products
    };
    if codes.is_empty() {
        return Err(DatasheetError::Validation(
            "catalog contains no products to export".to_string(),
        ));
    }

    let exporter = exporter_for(&loaded, locale);
    let result = exporter.generate_batch(&template, &codes)?;

    let output = output.unwrap_or_else(|| Path::new(BATCH_ARCHIVE_NAME).to_path_buf());
    std::fs::write(&output, &result.archive)?;

    let generated = codes.len() - result.failures.len();
    println!(
        "{} {} ({} of {} products)",
        "✅ Written".bold().green(),
        output.display(),
        generated,
        codes.len()
    );
    if !result.failures.is_empty() {
        println!();
        println!("{}", "⚠️  Failed products:".bold().yellow());
        for failure in &result.failures {
            println!("   {} - {}", failure.product.bright_yellow(), failure.reason);
        }
    }
    Ok(())
}
