//! ARFF format loader for nominal datasets
//!
//! Supports the dense nominal subset of ARFF:
//!
//! ```text
//! % comment
//! @relation weather
//! @attribute outlook {sunny, overcast, rainy}
//! @attribute play {yes, no}
//! @data
//! sunny,no
//! ?,yes
//! ```
//!
//! The last attribute is the class. `?` marks a missing value.

use crate::core::{CarError, Result};
use crate::data::{NominalDataset, Schema};
use std::io::BufRead;

/// Parse an ARFF document into a nominal dataset
pub fn from_reader<R: BufRead>(reader: R) -> Result<NominalDataset> {
    let mut relation = String::new();
    let mut attributes: Vec<(String, Vec<String>)> = Vec::new();
    let mut schema: Option<Schema> = None;
    let mut instances = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(CarError::IoError)?;
        let line = line.trim();
        let line_num = line_num + 1;

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('%') {
            continue;
        }

        if let Some(schema) = &schema {
            if line.starts_with('{') {
                return Err(CarError::ParseError(format!(
                    "Line {line_num}: sparse ARFF rows are not supported"
                )));
            }
            let row: Vec<Option<&str>> = line.split(',').map(parse_value).collect();
            instances.push(schema.encode(&row, line_num)?);
            continue;
        }

        let (keyword, rest) = split_keyword(line);
        match keyword.to_ascii_lowercase().as_str() {
            "@relation" => relation = unquote(rest).to_string(),
            "@attribute" => attributes.push(parse_attribute(rest, line_num)?),
            "@data" => schema = Some(Schema::new(&relation, std::mem::take(&mut attributes))?),
            _ => {
                return Err(CarError::ParseError(format!(
                    "Line {line_num}: unexpected header line: {line}"
                )))
            }
        }
    }

    let schema = schema
        .ok_or_else(|| CarError::ParseError("Missing @data section".to_string()))?;
    if instances.is_empty() {
        return Err(CarError::EmptyDataset);
    }

    Ok(NominalDataset::new(schema, instances))
}

fn split_keyword(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], line[pos..].trim()),
        None => (line, ""),
    }
}

/// `name {v1, v2}` or `'quoted name' {v1, v2}`
fn parse_attribute(declaration: &str, line_num: usize) -> Result<(String, Vec<String>)> {
    let (name, kind) = match declaration.chars().next() {
        Some(quote @ ('\'' | '"')) => {
            let end = declaration[1..].find(quote).ok_or_else(|| {
                CarError::ParseError(format!("Line {line_num}: unterminated attribute name"))
            })?;
            (&declaration[1..=end], declaration[end + 2..].trim())
        }
        Some(_) => split_keyword(declaration),
        None => {
            return Err(CarError::ParseError(format!(
                "Line {line_num}: attribute without a name"
            )))
        }
    };

    let Some(body) = kind.strip_prefix('{').and_then(|k| k.strip_suffix('}')) else {
        return Err(CarError::UnsupportedAttribute {
            name: name.to_string(),
            kind: kind.to_string(),
        });
    };

    let values = body
        .split(',')
        .map(|v| unquote(v.trim()).to_string())
        .filter(|v| !v.is_empty())
        .collect();
    Ok((name.to_string(), values))
}

fn parse_value(field: &str) -> Option<&str> {
    match unquote(field.trim()) {
        "?" => None,
        value => Some(value),
    }
}

fn unquote(value: &str) -> &str {
    let quoted = value.len() >= 2
        && ((value.starts_with('\'') && value.ends_with('\''))
            || (value.starts_with('"') && value.ends_with('"')));
    if quoted {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
