use demand_forecast::data::{DataLoader, SalesRecord};
use demand_forecast::ForecastError;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_data_loader_from_csv() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "size,category,quantity,order_date,price").unwrap();
    writeln!(file, "M,Lehenga,3,2024-01-01,4500.0").unwrap();
    writeln!(file, "S,Suit,1,2024-01-02 10:15:00,").unwrap();

    let records = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(
        records,
        vec![
            SalesRecord::new("Lehenga", "M", 3, "2024-01-01").with_price(4500.0),
            SalesRecord::new("Suit", "S", 1, "2024-01-02 10:15:00"),
        ]
    );
}

#[test]
fn test_column_order_and_whitespace() {
    let csv = "order_date, category ,size,price,quantity\n2024-03-05, Saree ,L,,2\n";

    let records = DataLoader::from_reader(csv.as_bytes()).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].category, "Saree");
    assert_eq!(records[0].quantity, 2);
    assert_eq!(records[0].unit_price, None);
}

#[test]
fn test_data_loader_error_handling() {
    let result = DataLoader::from_csv("nonexistent_sales_export.csv");
    assert!(result.is_err());

    let csv = "size,category,quantity,order_date,price\nM,Lehenga,many,2024-01-01,\n";
    let result = DataLoader::from_reader(csv.as_bytes());
    assert!(matches!(result, Err(ForecastError::CsvError(_))));
}

#[test]
fn test_record_date() {
    let record = SalesRecord::new("Lehenga", "M", 1, "2024-02-29T08:00:00Z");
    assert_eq!(
        record.date().unwrap(),
        chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    );

    let record = SalesRecord::new("Lehenga", "M", 1, "yesterday");
    assert!(matches!(record.date(), Err(ForecastError::ValidationError(_))));
}
