//! Data loading and dataset implementations
//!
//! Both loaders produce a [`NominalDataset`]: a [`Schema`] that maps
//! attribute values to item codes, plus the encoded instances.

pub mod arff;
pub mod csv;
pub mod schema;

pub use self::schema::*;

use crate::core::{CarError, ClassCode, Dataset, Instance, Result};
use log::warn;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Arff,
    Csv,
}

impl DataFormat {
    /// Guess the format from the file extension, defaulting to ARFF
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => DataFormat::Csv,
            Some(ext) if ext.eq_ignore_ascii_case("arff") => DataFormat::Arff,
            _ => {
                warn!("Unknown file extension for {path:?}, assuming ARFF format");
                DataFormat::Arff
            }
        }
    }

    /// Parse `auto`, `arff` or `csv`; `auto` detects from `path`
    pub fn from_name(name: &str, path: &Path) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::detect(path)),
            "arff" => Ok(DataFormat::Arff),
            "csv" => Ok(DataFormat::Csv),
            _ => Err(CarError::InvalidParameter(format!(
                "Unsupported format: {name}. Use 'arff' or 'csv'"
            ))),
        }
    }
}

/// In-memory dataset of nominal instances
#[derive(Debug, Clone)]
pub struct NominalDataset {
    schema: Schema,
    instances: Vec<Instance>,
    class_frequency: BTreeMap<ClassCode, usize>,
}

impl NominalDataset {
    /// Create a dataset from a schema and instances encoded against it
    pub fn new(schema: Schema, instances: Vec<Instance>) -> Self {
        let mut class_frequency = BTreeMap::new();
        for instance in &instances {
            *class_frequency.entry(instance.class()).or_insert(0) += 1;
        }
        Self {
            schema,
            instances,
            class_frequency,
        }
    }

    /// Create a dataset of pre-coded instances without attribute names
    pub fn from_instances(instances: Vec<Instance>) -> Self {
        Self::new(Schema::default(), instances)
    }

    /// Load a dataset in the given format
    pub fn from_file<P: AsRef<Path>>(path: P, format: DataFormat) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path).map_err(CarError::IoError)?);
        match format {
            DataFormat::Arff => arff::from_reader(reader),
            DataFormat::Csv => {
                let relation = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                csv::from_reader(reader, &relation)
            }
        }
    }

    /// Load a dataset, detecting the format from the extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let format = DataFormat::detect(path.as_ref());
        Self::from_file(path, format)
    }

    /// Attribute schema used to encode the instances
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// A dataset with the instances at `indices`, in that order
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self::new(
            self.schema.clone(),
            indices.iter().map(|&i| self.instances[i].clone()).collect(),
        )
    }

    /// Re-encode the instances against another schema, matching attribute
    /// values by name.
    ///
    /// Values `target` does not declare are dropped from the instances; a
    /// class value it does not declare is an error.
    pub fn align_to(&self, target: &Schema) -> Result<Self> {
        if self.schema == *target {
            return Ok(self.clone());
        }

        let mut dropped = 0;
        let mut instances = Vec::with_capacity(self.instances.len());
        for instance in &self.instances {
            let items: Vec<_> = instance
                .items()
                .iter()
                .filter_map(|&code| self.schema.translate(code, target))
                .collect();
            dropped += instance.items().len() - items.len();

            let class = self.schema.translate(instance.class(), target).ok_or_else(|| {
                CarError::InvalidDataset(format!(
                    "Class value {} is not declared by the target schema",
                    self.schema.class_name(instance.class())
                ))
            })?;
            instances.push(Instance::new(items, class));
        }

        if dropped > 0 {
            warn!("Dropped {dropped} attribute values unknown to the target schema");
        }
        Ok(Self::new(target.clone(), instances))
    }

    /// Sequential split: the first `ratio` share of instances, then the rest
    pub fn split(&self, ratio: f64) -> (Self, Self) {
        let cut = ((self.instances.len() as f64 * ratio) as usize).min(self.instances.len());
        let (train, test) = self.instances.split_at(cut);
        (
            Self::new(self.schema.clone(), train.to_vec()),
            Self::new(self.schema.clone(), test.to_vec()),
        )
    }
}

impl Dataset for NominalDataset {
    fn len(&self) -> usize {
        self.instances.len()
    }

    fn instance(&self, i: usize) -> &Instance {
        &self.instances[i]
    }

    fn frequency_by_class(&self) -> BTreeMap<ClassCode, usize> {
        self.class_frequency.clone()
    }
}
