//! CSV format loader for nominal datasets
//!
//! Supports CSV files where:
//! - The first row holds the attribute names
//! - The last column is the class
//! - Every cell is a category; `?` or an empty cell is a missing value
//!
//! Values are coded in the order they first appear in each column.

use crate::core::{CarError, Result};
use crate::data::{NominalDataset, Schema};
use std::io::BufRead;

/// Parse a CSV document into a nominal dataset
pub fn from_reader<R: BufRead>(reader: R, relation: &str) -> Result<NominalDataset> {
    let mut header: Option<Vec<String>> = None;
    let mut rows: Vec<(usize, Vec<Option<String>>)> = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(CarError::IoError)?;
        let line = line.trim();
        let line_num = line_num + 1;

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        match &header {
            None => {
                if fields.len() < 2 {
                    return Err(CarError::ParseError(format!(
                        "Line {line_num}: header has too few columns: {line}"
                    )));
                }
                header = Some(fields.iter().map(|f| f.to_string()).collect());
            }
            Some(names) => {
                if fields.len() != names.len() {
                    return Err(CarError::ParseError(format!(
                        "Line {line_num}: expected {} fields, got {}",
                        names.len(),
                        fields.len()
                    )));
                }
                let row = fields
                    .iter()
                    .map(|&f| match f {
                        "" | "?" => None,
                        value => Some(value.to_string()),
                    })
                    .collect();
                rows.push((line_num, row));
            }
        }
    }

    let Some(names) = header else {
        return Err(CarError::EmptyDataset);
    };
    if rows.is_empty() {
        return Err(CarError::EmptyDataset);
    }

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for (_, row) in &rows {
        for (values, cell) in columns.iter_mut().zip(row) {
            if let Some(value) = cell {
                if !values.contains(value) {
                    values.push(value.clone());
                }
            }
        }
    }

    let schema = Schema::new(relation, names.into_iter().zip(columns).collect())?;
    let instances = rows
        .iter()
        .map(|(line_num, row)| {
            let cells: Vec<Option<&str>> = row.iter().map(|c| c.as_deref()).collect();
            schema.encode(&cells, *line_num)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(NominalDataset::new(schema, instances))
}
