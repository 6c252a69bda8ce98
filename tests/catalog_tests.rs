//! Catalog invariant tests: uniqueness, ordering, truncation, back-links,
//! bulk attach/detach.

use pretty_assertions::assert_eq;
use product_datasheet::catalog::Catalog;
use product_datasheet::error::DatasheetError;
use product_datasheet::types::{Field, FieldType, Group, Product, Section, SectionColumn};

fn nutrition_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog
        .add_section(Section::new("general", "General", 5))
        .unwrap();
    catalog
        .add_section(Section::new("nutrition", "Nutrition", 10))
        .unwrap();
    catalog
        .add_group(Group::new("basics", "Basics", 1, "general"))
        .unwrap();
    catalog
        .add_group(Group::new("per_100g", "Per 100g", 1, "nutrition"))
        .unwrap();
    catalog
        .add_group(Group::new("per_dose", "Per dose", 2, "nutrition"))
        .unwrap();
    catalog
        .add_field(Field::new("name", "Commercial name", FieldType::String))
        .unwrap();
    catalog
        .add_field(Field::new("energy", "Energy", FieldType::Number))
        .unwrap();
    catalog
        .add_field(Field::new("protein", "Protein", FieldType::Number))
        .unwrap();
    catalog.add_product(Product::new("p1", "Choco Bar")).unwrap();
    catalog
}

//==============================================================================
// Uniqueness
//==============================================================================

#[test]
fn duplicate_section_code_is_rejected() {
    let mut catalog = nutrition_catalog();
    let err = catalog
        .add_section(Section::new("nutrition", "Other", 99))
        .unwrap_err();
    assert!(err.to_string().contains("nutrition"));
}

#[test]
fn duplicate_group_and_field_codes_are_rejected() {
    let mut catalog = nutrition_catalog();
    assert!(catalog
        .add_group(Group::new("per_100g", "Again", 9, "general"))
        .is_err());
    assert!(catalog
        .add_field(Field::new("energy", "Again", FieldType::String))
        .is_err());
}

#[test]
fn rename_section_rules() {
    let mut catalog = nutrition_catalog();
    // Renaming to a code used by a different section is rejected.
    assert!(catalog.rename_section("general", "nutrition").is_err());
    // Renaming to its own current code succeeds.
    catalog.rename_section("general", "general").unwrap();
    // A fresh code succeeds and re-parents groups.
    catalog.rename_section("general", "overview").unwrap();
    assert_eq!(catalog.group("basics").unwrap().section, "overview");
}

#[test]
fn rename_group_and_field_follow_values() {
    let mut catalog = nutrition_catalog();
    catalog
        .set_value("p1", "per_100g", "energy", Some("100"))
        .unwrap();
    catalog.rename_group("per_100g", "per_100").unwrap();
    catalog.rename_field("energy", "energy_kcal").unwrap();
    assert!(catalog.value_at("p1", "nutrition", "per_100", "energy_kcal").is_some());
}

//==============================================================================
// Value rows
//==============================================================================

#[test]
fn value_display_truncation_invariant() {
    let mut catalog = nutrition_catalog();
    let short = "short text";
    catalog.set_value("p1", "basics", "name", Some(short)).unwrap();
    let row = catalog.value_at("p1", "general", "basics", "name").unwrap();
    assert_eq!(row.value_display, short);

    let long = "a".repeat(80);
    catalog.set_value("p1", "basics", "name", Some(long.as_str())).unwrap();
    let row = catalog.value_at("p1", "general", "basics", "name").unwrap();
    assert_eq!(row.value_display, format!("{}...", "a".repeat(47)));
    assert_eq!(row.value_display.chars().count(), 50);
}

#[test]
fn set_value_rejects_unknown_references() {
    let mut catalog = nutrition_catalog();
    assert!(catalog.set_value("p1", "nope", "energy", Some("1")).is_err());
    assert!(catalog.set_value("p1", "per_100g", "nope", Some("1")).is_err());
    assert!(catalog.set_value("nope", "per_100g", "energy", Some("1")).is_err());
}

#[test]
fn ordering_follows_section_group_value_sequences() {
    let mut catalog = nutrition_catalog();
    // Insert out of order on purpose.
    catalog.set_value("p1", "per_dose", "protein", Some("2")).unwrap();
    catalog.set_value("p1", "basics", "name", Some("Choco")).unwrap();
    catalog.set_value("p1", "per_100g", "protein", Some("8")).unwrap();
    catalog.set_value("p1", "per_100g", "energy", Some("450")).unwrap();
    catalog.set_value_sequence("p1", "per_100g", "energy", 0).unwrap();
    catalog.set_value_sequence("p1", "per_100g", "protein", 1).unwrap();

    let rows = catalog.ordered_values("p1");
    let path: Vec<(&str, &str, &str)> = rows
        .iter()
        .map(|(s, g, v)| (s.code.as_str(), g.code.as_str(), v.field.as_str()))
        .collect();
    assert_eq!(
        path,
        vec![
            ("general", "basics", "name"),
            ("nutrition", "per_100g", "energy"),
            ("nutrition", "per_100g", "protein"),
            ("nutrition", "per_dose", "protein"),
        ]
    );
}

//==============================================================================
// Back-links
//==============================================================================

fn backlinked_catalog() -> Catalog {
    let mut catalog = nutrition_catalog();
    let mut field = Field::new("origin", "Origin", FieldType::Selection);
    field.related_product_field = Some("country_of_origin".to_string());
    catalog.add_field(field).unwrap();

    let mut product = Product::new("p2", "Olive Oil");
    product.attribute_choices.insert(
        "country_of_origin".to_string(),
        vec!["ES".to_string(), "IT".to_string()],
    );
    catalog.add_product(product).unwrap();
    catalog
}

#[test]
fn backlink_propagates_value_into_product_attribute() {
    let mut catalog = backlinked_catalog();
    catalog.set_value("p2", "basics", "origin", Some("ES")).unwrap();
    assert_eq!(
        catalog.product("p2").unwrap().attributes.get("country_of_origin"),
        Some(&"ES".to_string())
    );
}

#[test]
fn backlink_choice_mismatch_is_a_hard_validation_error() {
    let mut catalog = backlinked_catalog();
    let err = catalog
        .set_value("p2", "basics", "origin", Some("FR"))
        .unwrap_err();
    assert!(matches!(err, DatasheetError::Validation(_)));
    // No value row and no attribute write happened.
    assert!(catalog.value_at("p2", "general", "basics", "origin").is_none());
    assert!(catalog
        .product("p2")
        .unwrap()
        .attributes
        .get("country_of_origin")
        .is_none());
}

//==============================================================================
// Bulk attach / detach
//==============================================================================

#[test]
fn attach_field_after_anchor_row() {
    let mut catalog = nutrition_catalog();
    catalog.set_value("p1", "per_100g", "energy", Some("450")).unwrap();
    catalog.set_value("p1", "per_100g", "protein", Some("8")).unwrap();
    let anchor_seq = catalog
        .value_at("p1", "nutrition", "per_100g", "energy")
        .unwrap()
        .sequence;

    let products = vec!["p1".to_string()];
    catalog
        .attach_field(&products, "per_dose", "protein", Some(("per_100g", "energy")))
        .unwrap();

    let row = catalog
        .value_at("p1", "nutrition", "per_dose", "protein")
        .unwrap();
    assert_eq!(row.sequence, anchor_seq + 1);
}

#[test]
fn attach_field_falls_back_to_group_tail_then_product_tail() {
    let mut catalog = nutrition_catalog();
    catalog.set_value("p1", "per_100g", "energy", Some("450")).unwrap();
    let products = vec!["p1".to_string()];

    // Anchor row missing but anchor group populated: tail of the group.
    catalog
        .attach_field(&products, "per_dose", "energy", Some(("per_100g", "protein")))
        .unwrap();
    let tail = catalog
        .value_at("p1", "nutrition", "per_100g", "energy")
        .unwrap()
        .sequence;
    assert_eq!(
        catalog
            .value_at("p1", "nutrition", "per_dose", "energy")
            .unwrap()
            .sequence,
        tail + 1
    );

    // Empty catalog for the product: first sequence is 0.
    catalog.add_product(Product::new("p3", "Empty")).unwrap();
    catalog
        .attach_field(&["p3".to_string()], "per_100g", "energy", Some(("basics", "name")))
        .unwrap();
    assert_eq!(
        catalog
            .value_at("p3", "nutrition", "per_100g", "energy")
            .unwrap()
            .sequence,
        0
    );
}

#[test]
fn attach_field_is_idempotent_and_seeds_from_backlink() {
    // Seed the native attribute first.
    let mut catalog = backlinked_catalog();
    catalog.set_value("p2", "basics", "origin", Some("IT")).unwrap();
    catalog.detach_field(&["p2".to_string()], "basics", "origin");
    assert!(catalog.value_at("p2", "general", "basics", "origin").is_none());

    // Attach seeds the row from the synced attribute.
    catalog
        .attach_field(&["p2".to_string()], "basics", "origin", None)
        .unwrap();
    let row = catalog.value_at("p2", "general", "basics", "origin").unwrap();
    assert_eq!(row.value.as_deref(), Some("IT"));
    let seq = row.sequence;

    // Re-attaching leaves the existing row untouched.
    catalog
        .attach_field(&["p2".to_string()], "basics", "origin", None)
        .unwrap();
    let row = catalog.value_at("p2", "general", "basics", "origin").unwrap();
    assert_eq!(row.sequence, seq);
}

#[test]
fn assign_photo_to_many_products() {
    let mut catalog = nutrition_catalog();
    catalog.add_product(Product::new("p2", "Second")).unwrap();
    let codes = vec!["p1".to_string(), "p2".to_string()];
    catalog.assign_photo(&codes, &[1, 2, 3]).unwrap();
    assert_eq!(catalog.product("p1").unwrap().photo.as_deref(), Some(&[1u8, 2, 3][..]));
    assert_eq!(catalog.product("p2").unwrap().photo.as_deref(), Some(&[1u8, 2, 3][..]));
    assert!(catalog.assign_photo(&["nope".to_string()], &[1]).is_err());
}

#[test]
fn column_table_declaration_requires_known_groups() {
    let mut catalog = nutrition_catalog();
    let err = catalog
        .set_section_columns(
            "nutrition",
            vec![SectionColumn {
                group: "missing".to_string(),
                index: 1,
                label: "Avg".to_string(),
            }],
        )
        .unwrap_err();
    assert!(matches!(err, DatasheetError::Validation(_)));

    catalog
        .set_section_columns(
            "nutrition",
            vec![
                SectionColumn {
                    group: "per_100g".to_string(),
                    index: 1,
                    label: "Average value".to_string(),
                },
                SectionColumn {
                    group: "per_dose".to_string(),
                    index: 2,
                    label: "% daily reference".to_string(),
                },
            ],
        )
        .unwrap();
    assert!(catalog.section("nutrition").unwrap().is_column_table());
}
