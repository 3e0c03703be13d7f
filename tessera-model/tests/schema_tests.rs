use tessera_model::{FieldType, ModelSchema, PropertySchema};

// ── FieldType display ────────────────────────────────────────────

#[test]
fn field_type_display_scalars() {
    assert_eq!(FieldType::Bool.to_string(), "bool");
    assert_eq!(FieldType::Integer.to_string(), "integer");
    assert_eq!(FieldType::DateTime.to_string(), "datetime");
    assert_eq!(FieldType::Json.to_string(), "json");
}

#[test]
fn field_type_display_composites() {
    let nested = FieldType::optional(FieldType::list(FieldType::model("Address")));
    assert_eq!(nested.to_string(), "optional<list<model<Address>>>");

    let status = FieldType::Enum {
        variants: vec!["open".into(), "closed".into()],
    };
    assert_eq!(status.to_string(), "enum[open|closed]");
}

// ── Serde roundtrips ─────────────────────────────────────────────

#[test]
fn field_type_serde_uses_kind_tag() {
    let json = serde_json::to_value(FieldType::DateTime).unwrap();
    assert_eq!(json, serde_json::json!({"kind": "date_time"}));

    let back: FieldType = serde_json::from_value(json).unwrap();
    assert_eq!(back, FieldType::DateTime);
}

#[test]
fn model_schema_serde_roundtrip() {
    let schema = ModelSchema {
        model: "note".to_string(),
        properties: vec![
            PropertySchema {
                name: "id".to_string(),
                column: None,
                field_type: FieldType::Integer,
                readable: true,
                writable: true,
                identity: true,
            },
            PropertySchema {
                name: "title".to_string(),
                column: Some("note_title".to_string()),
                field_type: FieldType::Text,
                readable: true,
                writable: true,
                identity: false,
            },
        ],
    };
    let json = serde_json::to_string(&schema).unwrap();
    let back: ModelSchema = serde_json::from_str(&json).unwrap();
    assert_eq!(back, schema);
    assert_eq!(back.identity(), Some("id"));
}

#[test]
fn property_schema_identity_defaults_to_false() {
    let json = r#"{
        "name": "title",
        "field_type": {"kind": "text"},
        "readable": true,
        "writable": false
    }"#;
    let property: PropertySchema = serde_json::from_str(json).unwrap();
    assert!(!property.identity);
    assert_eq!(property.column, None);
}
