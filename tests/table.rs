//! Table serialization tests: CSV shape, ragged channel padding, and
//! readback through a CSV reader.

use anyhow::Result;
use tdmsflow::table::{Channel, Table};

#[test]
fn csv_has_header_and_padded_rows() -> Result<()> {
    let table = Table::from_channels(vec![
        Channel::new("fz", vec![1.0, 2.0, 3.0]),
        Channel::new("fx", vec![0.5]),
    ]);
    assert_eq!(table.row_count(), 3);

    let text = String::from_utf8(table.to_csv_bytes()?)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["fz,fx", "1,0.5", "2,", "3,"]);
    Ok(())
}

#[test]
fn empty_table_serializes_to_nothing() -> Result<()> {
    assert_eq!(Table::new().to_csv_bytes()?, Vec::<u8>::new());
    Ok(())
}

#[test]
fn header_only_when_channels_have_no_samples() -> Result<()> {
    let table = Table::from_channels(vec![Channel::new("fz", vec![])]);
    let text = String::from_utf8(table.to_csv_bytes()?)?;
    assert_eq!(text, "fz\n");
    Ok(())
}

#[test]
fn write_csv_reports_the_row_count() -> Result<()> {
    let mut table = Table::new();
    table.push_channel(Channel::new("a", vec![1.0, 2.0]));
    table.push_channel(Channel::new("b", vec![1.0, 2.0, 3.0, 4.0]));

    let mut buf = Vec::new();
    assert_eq!(table.write_csv(&mut buf)?, 4);
    Ok(())
}

#[test]
fn csv_parses_back_with_a_csv_reader() -> Result<()> {
    let table = Table::from_channels(vec![
        Channel::new("a", vec![1.5, -2.0]),
        Channel::new("b", vec![10.0, 20.0]),
    ]);

    let bytes = table.to_csv_bytes()?;
    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    assert_eq!(reader.headers()?.iter().collect::<Vec<_>>(), vec!["a", "b"]);

    let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][0], "1.5");
    assert_eq!(&records[0][1], "10");
    assert_eq!(&records[1][0], "-2");
    assert_eq!(&records[1][1], "20");
    Ok(())
}
