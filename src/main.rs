use clap::{Parser, Subcommand};
use product_datasheet::cli;
use product_datasheet::error::DatasheetResult;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "datasheet")]
#[command(about = "Product datasheet export: typed attribute hierarchies to formatted Excel workbooks")]
#[command(long_about = "Datasheet - Product datasheet export engine

Manages hierarchical product attributes (Section > Group > Field > Value)
and exports them into formatted .xlsx workbooks, either with a built-in
layout (ad-hoc) or by filling a user-supplied placeholder template.

COMMANDS:
  validate  - Load a catalog file and report its contents
  export    - Ad-hoc export of one product
  template  - Templated export of one product
  batch     - Templated export of many products into a zip archive

TEMPLATE TOKENS:
  {{ o.name }}                                  product name
  {{ h.today }} / {{ h.logo }}                  run context slots
  {{ i.section.nutrition | name }}              localized record name
  {{ i.section.nutrition }}                     name + section images
  {{ i.info.nutrition.per_100g.energy | value }} formatted value

EXAMPLES:
  datasheet validate catalog.yaml
  datasheet export catalog.yaml --product P1 -o P1.xlsx
  datasheet batch catalog.yaml --template t.xlsx -o out.zip")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a catalog file and report its contents
    Validate {
        /// Catalog YAML file
        file: PathBuf,
    },

    /// Ad-hoc export of one product
    Export {
        /// Catalog YAML file
        file: PathBuf,
        /// Product code to export
        #[arg(short, long)]
        product: String,
        /// Output .xlsx path
        #[arg(short, long)]
        output: PathBuf,
        /// Locale for labels and units (en, es)
        #[arg(short, long, default_value = "en")]
        locale: String,
    },

    /// Templated export of one product
    Template {
        /// Catalog YAML file
        file: PathBuf,
        /// Template .xlsx with placeholder tokens
        #[arg(short, long)]
        template: PathBuf,
        /// Product code to export
        #[arg(short, long)]
        product: String,
        /// Output .xlsx path
        #[arg(short, long)]
        output: PathBuf,
        /// Locale for labels and units (en, es)
        #[arg(short, long, default_value = "en")]
        locale: String,
    },

    /// Templated export of many products into a zip archive
    Batch {
        /// Catalog YAML file
        file: PathBuf,
        /// Template .xlsx with placeholder tokens
        #[arg(short, long)]
        template: PathBuf,
        /// Product codes to export (default: every product in the catalog)
        #[arg(short, long)]
        product: Vec<String>,
        /// Output archive path (default: ProductDatasheetTemplates.zip)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Locale for labels and units (en, es)
        #[arg(short, long, default_value = "en")]
        locale: String,
    },
}

fn main() -> DatasheetResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { file } => cli::validate(file),

        Commands::Export {
            file,
            product,
            output,
            locale,
        } => cli::export(file, product, output, locale),

        Commands::Template {
            file,
            template,
            product,
            output,
            locale,
        } => cli::template(file, template, product, output, locale),

        Commands::Batch {
            file,
            template,
            product,
            output,
            locale,
        } => cli::batch(file, template, product, output, locale),
    }
}
