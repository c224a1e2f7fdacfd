use std::fs;
use std::path::Path;
use csv::{Reader, Writer};

use crate::batch::BatchTable;
use crate::errors::{MinaError, Result};
use crate::fields::{Field, UnitKind, Value};

/// Write a batch table to CSV: one header row of titles, then one row per image
pub fn write_table_csv<P: AsRef<Path>>(table: &BatchTable, output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();

    // Create directory if it doesn't exist
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = Writer::from_path(output_path)
        .map_err(MinaError::CsvOutput)?;

    writer.write_record(table.titles())?;

    for row in &table.rows {
        writer.write_record(row.iter().map(|value| value.to_string()))?;
    }

    writer.flush().map_err(|e| MinaError::CsvOutput(csv::Error::from(e)))?;

    Ok(())
}

/// Unit label carried by a title such as "Mean rod length (um)"
fn unit_from_title(field: Field, title: &str) -> Option<String> {
    let rest = title.trim().strip_prefix(field.title())?;
    let unit = rest.strip_prefix(" (")?.strip_suffix(')')?;
    match field.unit_kind() {
        UnitKind::Area => unit.strip_suffix("^2").map(str::to_string),
        UnitKind::Length => Some(unit.to_string()),
        UnitKind::Unscaled => None,
    }
}

/// Read a table previously written by [`write_table_csv`]
pub fn read_table_csv<P: AsRef<Path>>(path: P) -> Result<BatchTable> {
    let mut reader = Reader::from_path(path.as_ref())?;

    let headers = reader.headers()?.clone();
    let mut columns = Vec::with_capacity(headers.len());
    let mut unit_name = None;

    for title in headers.iter() {
        let field = Field::from_title(title)
            .ok_or_else(|| MinaError::Table(format!("unknown column title '{}'", title)))?;
        if unit_name.is_none() {
            unit_name = unit_from_title(field, title);
        }
        columns.push(field);
    }

    let mut table = BatchTable::new(columns, unit_name);

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let row = table
            .columns
            .iter()
            .zip(record.iter())
            .map(|(&field, raw)| {
                Value::parse(field, raw).ok_or_else(|| {
                    MinaError::Table(format!(
                        "row {}: '{}' is not a valid value for '{}'",
                        line + 1, raw, field
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        table.rows.push(row);
    }

    Ok(table)
}
