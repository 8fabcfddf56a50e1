#[cfg(test)]
mod tests {
    use crate::parsing::csv_parser::{parse_flight_csv, table_timestamps, write_flight_csv};
    use polars::prelude::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    /// Helper to create a temp CSV file
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    #[test]
    fn test_parse_float_timestamps() {
        let csv_content = "timestamp,vehicle_attitude.roll,vehicle_status.nav_state\n\
                           1000000.0,0.5,3\n\
                           1020000.0,0.6,3\n\
                           1040000.0,0.7,4\n";
        let temp_file = create_temp_csv(csv_content);
        let df = parse_flight_csv(temp_file.path()).unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.column("timestamp").unwrap().dtype(), &DataType::Int64);
        assert_eq!(
            df.column("vehicle_status.nav_state").unwrap().dtype(),
            &DataType::Float64
        );
        assert_eq!(
            table_timestamps(&df).unwrap(),
            vec![1_000_000, 1_020_000, 1_040_000]
        );
    }

    #[test]
    fn test_parse_requires_timestamp_column() {
        let temp_file = create_temp_csv("time,roll\n1,0.5\n");
        let result = parse_flight_csv(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_write_then_parse() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("log_1.csv");
        let mut df = df!(
            "timestamp" => &[10i64, 20, 30],
            "battery_status.voltage_v" => &[16.8f64, 16.7, 16.6]
        )
        .unwrap();

        write_flight_csv(&mut df, &path).unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("sub").join("log_1.csv.tmp").exists());

        let read_back = parse_flight_csv(&path).unwrap();
        assert!(read_back.equals(&df));
    }
}
