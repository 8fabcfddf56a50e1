#[cfg(test)]
mod tests {
    use crate::annotations::error::LedgerError;
    use crate::annotations::model::AnomalyClass;
    use crate::annotations::units::RangeUnits;
    use crate::parsing::ledger_parser::*;

    const LEGACY_LEDGER: &str = r#"{
        "log_12_2023-5-3-14-02-11": {
            "annotations": [
                {
                    "class": "External Position",
                    "note": "vision dropout",
                    "timestamp": "2023-06-01T10:15:00.250000",
                    "ranges": [
                        ["Position.X", [[1200, 1900], [2500, 2600]]],
                        ["Velocity", [[1200, 1900]]]
                    ]
                }
            ]
        },
        "batch2/log_3": {
            "annotations": [],
            "range_units": "microseconds"
        }
    }"#;

    #[test]
    fn test_parse_legacy_ledger() {
        let data = parse_ledger_str(LEGACY_LEDGER).unwrap();
        assert_eq!(data.len(), 2);

        let legacy = &data["log_12_2023-5-3-14-02-11"];
        assert_eq!(legacy.range_units, None);
        assert_eq!(legacy.annotations.len(), 1);

        let record = &legacy.annotations[0];
        assert_eq!(record.class_label, AnomalyClass::ExternalPosition);
        assert_eq!(record.ranges.len(), 2);
        assert_eq!(record.ranges[0].intervals.len(), 2);

        assert_eq!(data["batch2/log_3"].range_units, Some(RangeUnits::Microseconds));
    }

    #[test]
    fn test_render_then_parse_is_identity() {
        let data = parse_ledger_str(LEGACY_LEDGER).unwrap();
        let rendered = render_ledger(&data).unwrap();
        assert_eq!(parse_ledger_str(&rendered).unwrap(), data);
    }

    #[test]
    fn test_blank_document_is_empty_ledger() {
        assert!(parse_ledger_str("").unwrap().is_empty());
        assert!(parse_ledger_str("  \n").unwrap().is_empty());
        assert!(parse_ledger_str("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_error_names_json_path() {
        let json = r#"{"f": {"annotations": [{"class": "Mechanical", "note": "",
            "timestamp": "2023-06-01T10:15:00Z", "ranges": [["ch", [[1, "x"]]]]}]}}"#;
        match parse_ledger_str(json) {
            Err(LedgerError::Parse { path, .. }) => {
                assert!(path.starts_with("f.annotations[0].ranges[0]"), "path was {}", path);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_reversed_interval_rejected_on_load() {
        let json = r#"{"f": {"annotations": [{"class": "Heading", "note": "",
            "timestamp": "2023-06-01T10:15:00Z", "ranges": [["Yaw", [[50, 10]]]]}]}}"#;
        match parse_ledger_str(json) {
            Err(LedgerError::InvalidRange {
                flight_id,
                record,
                channel,
                start,
                end,
            }) => {
                assert_eq!(flight_id, "f");
                assert_eq!(record, 0);
                assert_eq!(channel, "Yaw");
                assert_eq!((start, end), (50, 10));
            }
            other => panic!("expected invalid range, got {:?}", other),
        }
    }
}
