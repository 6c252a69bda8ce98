//! Placeholder grammar and resolver tests

use pretty_assertions::assert_eq;
use product_datasheet::catalog::Catalog;
use product_datasheet::i18n::{BuiltinLocalizer, Locale};
use product_datasheet::placeholder::{
    parse_placeholder, ContextSlot, Placeholder, Resolution, Resolver, RunContext,
};
use product_datasheet::types::{
    EntityKind, Field, FieldType, Group, Product, ProductImage, Section, Uom,
};

fn sample_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog
        .add_section(Section::new("nutrition", "Nutritional Information", 10))
        .unwrap();
    catalog
        .add_group(Group::new("per_100g", "Per 100g", 1, "nutrition"))
        .unwrap();
    catalog
        .add_field(Field::new("energy", "Energy", FieldType::Number).with_uom(Uom::Kcal))
        .unwrap();
    catalog.add_product(Product::new("p1", "Choco Bar")).unwrap();
    catalog
        .set_value("p1", "per_100g", "energy", Some("123.456"))
        .unwrap();
    catalog
}

fn resolve_with<'a>(
    catalog: &'a Catalog,
    context: &'a RunContext,
    text: &str,
) -> Resolution<'a> {
    let product = catalog.product("p1").unwrap();
    let resolver = Resolver::new(catalog, product, context, Locale::En, &BuiltinLocalizer);
    resolver.resolve_cell(text)
}

//==============================================================================
// Grammar
//==============================================================================

#[test]
fn grammar_recognizes_all_namespaces() {
    assert_eq!(
        parse_placeholder("{{ o.name }}"),
        Some(Placeholder::Context {
            key: "o.name".to_string()
        })
    );
    assert_eq!(
        parse_placeholder("{{h.footer_note}}"),
        Some(Placeholder::Context {
            key: "h.footer_note".to_string()
        })
    );
    assert_eq!(
        parse_placeholder("{{ i.field.energy | name }}"),
        Some(Placeholder::EntityName {
            kind: EntityKind::Field,
            code: "energy".to_string()
        })
    );
    assert_eq!(
        parse_placeholder("{{ i.section.nutrition }}"),
        Some(Placeholder::Entity {
            kind: EntityKind::Section,
            code: "nutrition".to_string()
        })
    );
    assert_eq!(
        parse_placeholder("{{i.info.nutrition.per_100g.energy|value}}"),
        Some(Placeholder::Info {
            section: "nutrition".to_string(),
            group: "per_100g".to_string(),
            field: "energy".to_string()
        })
    );
}

#[test]
fn grammar_is_whitespace_insensitive() {
    assert_eq!(
        parse_placeholder("{{   i.group.per_100g   |   name   }}"),
        parse_placeholder("{{i.group.per_100g|name}}")
    );
}

#[test]
fn malformed_tokens_are_not_placeholders() {
    for text in [
        "Energy",
        "{{",
        "{{ }}",
        "{{ unknown.root }}",
        "{{ i.section }}",
        "{{ i.section.x | weight }}",
        "{{ i.info.a.b.c }}",
        "{{ i.info.a.b.c.d | value }}",
        "{{ o.name | value }}",
        "{{ o.name }} trailing",
    ] {
        assert_eq!(parse_placeholder(text), None, "should stay literal: {}", text);
    }
}

//==============================================================================
// Resolution
//==============================================================================

#[test]
fn context_slots_resolve_text_and_unknown_keys_resolve_empty() {
    let catalog = sample_catalog();
    let product = catalog.product("p1").unwrap();
    let context = RunContext::for_product(product, None, "legal text", "note text");

    match resolve_with(&catalog, &context, "{{ o.name }}") {
        Resolution::Text(text) => assert_eq!(text, "Choco Bar"),
        other => panic!("unexpected: {:?}", other),
    }
    match resolve_with(&catalog, &context, "{{ h.legal_footer }}") {
        Resolution::Text(text) => assert_eq!(text, "legal text"),
        other => panic!("unexpected: {:?}", other),
    }
    // Optional slot never declared: empty, not an error.
    match resolve_with(&catalog, &context, "{{ h.missing_slot }}") {
        Resolution::Text(text) => assert_eq!(text, ""),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn context_image_slot_resolves_to_image() {
    let catalog = sample_catalog();
    let mut context = RunContext::default();
    context.insert("h.logo", ContextSlot::Image(vec![9, 9, 9]));
    match resolve_with(&catalog, &context, "{{ h.logo }}") {
        Resolution::Image(data) => assert_eq!(data, &[9u8, 9, 9][..]),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn entity_names_resolve_localized_and_unknown_codes_resolve_empty() {
    let catalog = sample_catalog();
    let context = RunContext::default();
    match resolve_with(&catalog, &context, "{{ i.section.nutrition | name }}") {
        Resolution::Text(text) => assert_eq!(text, "Nutritional Information"),
        other => panic!("unexpected: {:?}", other),
    }
    match resolve_with(&catalog, &context, "{{ i.field.missing | name }}") {
        Resolution::Text(text) => assert_eq!(text, ""),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn section_without_modifier_triggers_image_placement() {
    let mut catalog = sample_catalog();
    catalog
        .add_image(ProductImage::new("p1", "nutrition", "chart", vec![1, 2]))
        .unwrap();
    let context = RunContext::default();
    match resolve_with(&catalog, &context, "{{ i.section.nutrition }}") {
        Resolution::TextWithImages(text, images) => {
            assert_eq!(text, "Nutritional Information");
            assert_eq!(images.len(), 1);
            assert_eq!(images[0].name, "chart");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn info_resolves_through_the_formatter() {
    let catalog = sample_catalog();
    let context = RunContext::default();
    match resolve_with(&catalog, &context, "{{ i.info.nutrition.per_100g.energy | value }}") {
        Resolution::Text(text) => assert_eq!(text, "123.46 kcal"),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn missing_info_row_renders_absent_dash() {
    let mut catalog = sample_catalog();
    catalog
        .add_field(Field::new("note", "Allergen Note", FieldType::String))
        .unwrap();
    let context = RunContext::default();
    match resolve_with(&catalog, &context, "{{ i.info.nutrition.per_100g.note | value }}") {
        Resolution::Text(text) => assert_eq!(text, "-"),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn info_with_wrong_section_renders_absent_dash() {
    let mut catalog = sample_catalog();
    catalog
        .add_section(Section::new("general", "General", 1))
        .unwrap();
    let context = RunContext::default();
    // Group belongs to nutrition, not general: no row matches the exact path.
    match resolve_with(&catalog, &context, "{{ i.info.general.per_100g.energy | value }}") {
        Resolution::Text(text) => assert_eq!(text, "-"),
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn resolution_is_idempotent() {
    let catalog = sample_catalog();
    let product = catalog.product("p1").unwrap();
    let context = RunContext::for_product(product, None, "legal", "note");
    let resolver = Resolver::new(&catalog, product, &context, Locale::En, &BuiltinLocalizer);

    for token in [
        "{{ o.name }}",
        "{{ i.section.nutrition | name }}",
        "{{ i.info.nutrition.per_100g.energy | value }}",
    ] {
        let first = match resolver.resolve_cell(token) {
            Resolution::Text(text) => text,
            other => panic!("unexpected: {:?}", other),
        };
        let second = match resolver.resolve_cell(token) {
            Resolution::Text(text) => text,
            other => panic!("unexpected: {:?}", other),
        };
        assert_eq!(first, second, "token {} not idempotent", token);
    }
}
