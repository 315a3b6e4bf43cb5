//! JSON emitted by the CLI for list and search

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use snapcat::cli::output::{format_list_json, format_search_json, format_snapshot_json};
    use snapcat::{SkippedEntry, Snapshot, SnapshotSearchResult};

    #[test]
    fn test_list_json_shape() {
        let snapshots = vec![Snapshot::new("a", "Alpha", ""), Snapshot::new("b", "Beta", "")];
        let json: Value = serde_json::from_str(&format_list_json(&snapshots, &[])).unwrap();

        assert_eq!(json["snapshots"].as_array().unwrap().len(), 2);
        assert_eq!(json["snapshots"][1]["name"], "Beta");
        assert_eq!(json["skipped_count"], 0);
        assert!(json["skipped"].is_null());
    }

    #[test]
    fn test_list_json_reports_skipped() {
        let skipped = vec![SkippedEntry {
            path: "/cat/broken".to_string(),
            code: "invalid_json".to_string(),
            message: "bad".to_string(),
        }];
        let json: Value = serde_json::from_str(&format_list_json(&[], &skipped)).unwrap();

        assert_eq!(json["skipped_count"], 1);
        assert_eq!(json["skipped"][0]["code"], "invalid_json");
    }

    #[test]
    fn test_search_json_shape() {
        let results = vec![SnapshotSearchResult {
            snapshot_id: "a".to_string(),
            snapshot_name: "Alpha".to_string(),
            file_path: "/cat/a/1-x/f.txt".to_string(),
            line_number: 3,
            searched_text: "needle".to_string(),
            line_content: "a needle here".to_string(),
        }];
        let json: Value = serde_json::from_str(&format_search_json(&results)).unwrap();

        assert_eq!(json["match_count"], 1);
        let hit = &json["matches"][0];
        for key in [
            "snapshot_id",
            "snapshot_name",
            "file_path",
            "line_number",
            "searched_text",
            "line_content",
        ] {
            assert!(hit.get(key).is_some(), "missing {key}");
        }
        assert_eq!(hit["line_number"], 3);
    }

    #[test]
    fn test_show_json_is_the_stored_document() {
        let snapshot = Snapshot::new("a", "Alpha", "desc");
        let json: Value = serde_json::from_str(&format_snapshot_json(&snapshot)).unwrap();
        assert_eq!(json["id"], "a");
        assert_eq!(json["desc"], "desc");
    }
}
