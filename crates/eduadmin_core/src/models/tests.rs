//! Model-level unit tests.

#[cfg(test)]
mod model_tests {
    use super::super::*;
    use serde_json::json;

    #[test]
    fn record_id_normalizes_numbers_and_strings() {
        let from_number: RecordId = serde_json::from_value(json!(42)).expect("number id");
        let from_string: RecordId = serde_json::from_value(json!(" 42 ")).expect("string id");
        assert_eq!(from_number, from_string);
        assert_eq!(from_number.as_str(), "42");
    }

    #[test]
    fn record_id_rejects_non_scalar_values() {
        for value in [json!(null), json!(true), json!([1]), json!({"id": 1}), json!("  ")] {
            assert!(
                serde_json::from_value::<RecordId>(value.clone()).is_err(),
                "value: {}",
                value
            );
        }
    }

    #[test]
    fn record_id_serializes_plain_integers_as_numbers() {
        assert_eq!(RecordId::from(7u64).to_json(), json!(7));
        assert_eq!(RecordId::from("007").to_json(), json!("007"));
        assert_eq!(RecordId::from("abc123").to_json(), json!("abc123"));
    }

    #[test]
    fn record_parses_document_id_and_extra_fields() {
        let record: Record = serde_json::from_value(json!({
            "id": 3,
            "documentId": "doc-3",
            "name": "Calculus",
            "subject": { "id": 1 }
        }))
        .expect("record");

        assert_eq!(record.id, RecordId::from(3u64));
        assert_eq!(record.document_id, Some(RecordId::from("doc-3")));
        assert_eq!(record.identity_key().as_str(), "doc-3");
        assert_eq!(record.display("name").as_deref(), Some("Calculus"));
        assert!(record.fields.contains_key("subject"));
        assert!(!record.fields.contains_key("documentId"));
    }

    #[test]
    fn record_accepts_null_document_id() {
        let record: Record =
            serde_json::from_value(json!({ "id": "9", "documentId": null, "text": "Q?" }))
                .expect("record");
        assert!(record.document_id.is_none());
        assert_eq!(record.identity_key().as_str(), "9");
    }

    #[test]
    fn record_matches_either_identity_field() {
        let record = Record::new(3u64).with_document_id("doc-3");
        assert!(record.matches(&RecordId::from("3")));
        assert!(record.matches(&RecordId::from("doc-3")));
        assert!(!record.matches(&RecordId::from("4")));

        let by_primary = Record::new(3u64);
        let by_document = Record::new(99u64).with_document_id("doc-3");
        assert!(record.shares_identity(&by_primary));
        assert!(record.shares_identity(&by_document));
        assert!(!by_primary.shares_identity(&by_document));
    }

    #[test]
    fn display_renders_scalars_and_falls_back_to_id() {
        let record = Record::new(5u64)
            .with_field("name", "Algebra")
            .with_field("order", 2)
            .with_field("published", true)
            .with_field("tags", json!(["a"]));
        assert_eq!(record.display("name").as_deref(), Some("Algebra"));
        assert_eq!(record.display("order").as_deref(), Some("2"));
        assert_eq!(record.display("published").as_deref(), Some("true"));
        assert_eq!(record.display("tags"), None);
        assert_eq!(record.display_or_id("title"), "#5");
    }

    #[test]
    fn filters_compare_by_value_regardless_of_insert_order() {
        let a = Filter::new().with("subject", 3).with("published", true);
        let b = Filter::new().with("published", true).with("subject", 3);
        assert_eq!(a, b);
        assert_eq!(a.to_query_value(), r#"{"published":true,"subject":3}"#);
    }

    #[test]
    fn list_page_reads_has_more_aliases() {
        let camel: ListPage =
            serde_json::from_value(json!({ "data": [], "hasMore": false })).expect("camel");
        let snake: ListPage =
            serde_json::from_value(json!({ "data": [], "has_more": true, "total": 4 }))
                .expect("snake");
        assert_eq!(camel.has_more, Some(false));
        assert_eq!(snake.has_more, Some(true));
        assert_eq!(snake.total, Some(4));
    }

    #[test]
    fn sort_order_renders_wire_names() {
        assert_eq!(SortOrder::Asc.to_string(), "ASC");
        assert_eq!(
            serde_json::to_value(SortOrder::Desc).expect("encode"),
            json!("DESC")
        );
    }
}
