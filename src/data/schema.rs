//! Nominal attribute schema and item code assignment
//!
//! Codes are handed out sequentially: every value of the first attribute,
//! then every value of the second, and so on, with the class attribute last.

use crate::core::{CarError, ClassCode, Instance, ItemCode, Result, NO_PREDICTION};

/// A nominal attribute with its declared values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    values: Vec<String>,
    first_code: ItemCode,
}

impl Attribute {
    /// Attribute name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Code of `value`, if declared
    pub fn code_of(&self, value: &str) -> Option<ItemCode> {
        self.values
            .iter()
            .position(|v| v == value)
            .map(|i| self.first_code + i as ItemCode)
    }

    /// Codes owned by this attribute
    pub fn codes(&self) -> std::ops::Range<ItemCode> {
        self.first_code..self.first_code + self.values.len() as ItemCode
    }

    fn value_of(&self, code: ItemCode) -> Option<&str> {
        self.codes()
            .contains(&code)
            .then(|| self.values[(code - self.first_code) as usize].as_str())
    }
}

/// Attributes of a nominal dataset; the last one is the class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    relation: String,
    attributes: Vec<Attribute>,
}

impl Schema {
    /// Build a schema from `(name, values)` pairs, the class attribute last
    pub fn new(relation: &str, attributes: Vec<(String, Vec<String>)>) -> Result<Self> {
        if attributes.len() < 2 {
            return Err(CarError::InvalidDataset(format!(
                "Need at least one attribute and a class, got {} columns",
                attributes.len()
            )));
        }

        let mut next_code: u64 = 0;
        let mut built = Vec::with_capacity(attributes.len());
        for (name, values) in attributes {
            if let Some(duplicate) = values
                .iter()
                .enumerate()
                .find(|(i, v)| values[..*i].contains(v))
                .map(|(_, v)| v)
            {
                return Err(CarError::InvalidDataset(format!(
                    "Attribute '{name}' declares value '{duplicate}' twice"
                )));
            }

            let first_code = next_code;
            next_code += values.len() as u64;
            if next_code >= NO_PREDICTION as u64 {
                return Err(CarError::InvalidDataset(
                    "Too many attribute values to encode".to_string(),
                ));
            }

            built.push(Attribute {
                name,
                values,
                first_code: first_code as ItemCode,
            });
        }

        Ok(Self {
            relation: relation.to_string(),
            attributes: built,
        })
    }

    /// Relation name (file stem or `@relation`)
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// Non-class attributes
    pub fn attributes(&self) -> &[Attribute] {
        match self.attributes.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    /// The class attribute, if the schema has one
    pub fn class_attribute(&self) -> Option<&Attribute> {
        self.attributes.last()
    }

    /// Render an item code as `name=value`
    pub fn describe_item(&self, code: ItemCode) -> String {
        self.attributes
            .iter()
            .find_map(|a| a.value_of(code).map(|v| format!("{}={}", a.name, v)))
            .unwrap_or_else(|| format!("#{code}"))
    }

    /// Render an itemset as `{a=x, b=y}`
    pub fn describe_itemset(&self, itemset: &[ItemCode]) -> String {
        let items: Vec<String> = itemset.iter().map(|&c| self.describe_item(c)).collect();
        format!("{{{}}}", items.join(", "))
    }

    /// Class value for a class code; `?` for [`NO_PREDICTION`]
    pub fn class_name(&self, code: ClassCode) -> String {
        if code == NO_PREDICTION {
            return "?".to_string();
        }
        self.class_attribute()
            .and_then(|a| a.value_of(code))
            .map_or_else(|| code.to_string(), str::to_string)
    }

    /// Code of the same `name=value` pair under `target`, if it declares one
    pub fn translate(&self, code: ItemCode, target: &Schema) -> Option<ItemCode> {
        let (name, value) = self
            .attributes
            .iter()
            .find_map(|a| a.value_of(code).map(|v| (a.name.as_str(), v)))?;
        target
            .attributes
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.code_of(value))
    }

    /// Encode one row of values (`None` for missing) into an instance.
    ///
    /// `line` is only used for error messages.
    pub fn encode(&self, row: &[Option<&str>], line: usize) -> Result<Instance> {
        if row.len() != self.attributes.len() {
            return Err(CarError::ParseError(format!(
                "Line {line}: expected {} values, got {}",
                self.attributes.len(),
                row.len()
            )));
        }

        let mut items = Vec::with_capacity(row.len() - 1);
        let mut class = None;
        for (i, (attribute, value)) in self.attributes.iter().zip(row).enumerate() {
            let Some(value) = value else {
                continue;
            };
            let code = attribute.code_of(value).ok_or_else(|| {
                CarError::ParseError(format!(
                    "Line {line}: undeclared value '{value}' for attribute '{}'",
                    attribute.name
                ))
            })?;
            if i + 1 == self.attributes.len() {
                class = Some(code);
            } else {
                items.push(code);
            }
        }

        let class = class
            .ok_or_else(|| CarError::ParseError(format!("Line {line}: missing class value")))?;
        Ok(Instance::new(items, class))
    }
}
