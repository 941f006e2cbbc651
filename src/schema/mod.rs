//! Feature schema and category lookup
//!
//! The schema is a JSON document describing every attribute of an input
//! record: its name, its ordinal position in the record, and for
//! categorical attributes the ordered list of allowed category labels.
//!
//! ```json
//! {
//!   "fields": [
//!     {"name": "color", "ordinal": 1, "dataType": "categorical",
//!      "cardinality": ["red", "green", "blue"]}
//!   ]
//! }
//! ```
//!
//! The schema is resolved once at setup and shared read-only afterwards.

mod field;

pub use field::{DataType, FeatureField};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or querying a schema
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no field with ordinal {0} in schema")]
    UnknownOrdinal(usize),

    #[error("ordinal {0} is declared by more than one field")]
    DuplicateOrdinal(usize),

    #[error("field '{name}' (ordinal {ordinal}) is not categorical")]
    NotCategorical { name: String, ordinal: usize },

    #[error("field '{name}' declares no categories")]
    EmptyCardinality { name: String },

    #[error("field '{field}' declares category '{value}' more than once")]
    DuplicateCategory { field: String, value: String },

    #[error("value '{value}' is not a category of field '{field}'")]
    UnrecognizedCategory { field: String, value: String },
}

/// Maps a raw field value to its zero-based category position
pub trait CategoryIndexer {
    /// Number of declared categories
    fn cardinality(&self) -> usize;

    /// Position of `value` among the declared categories
    fn category_index(&self, value: &str) -> Result<usize, SchemaError>;
}

/// The full set of attribute descriptions for a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSchema {
    fields: Vec<FeatureField>,
    #[serde(skip)]
    by_ordinal: HashMap<usize, usize>,
}

impl FeatureSchema {
    /// Build a schema from already constructed fields
    pub fn new(fields: Vec<FeatureField>) -> Result<Self, SchemaError> {
        let mut schema = Self {
            fields,
            by_ordinal: HashMap::new(),
        };
        schema.build_indexes()?;
        Ok(schema)
    }

    /// Parse a schema from JSON text
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let mut schema: FeatureSchema = serde_json::from_str(json)?;
        schema.build_indexes()?;
        Ok(schema)
    }

    /// Read and parse a schema file
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    fn build_indexes(&mut self) -> Result<(), SchemaError> {
        self.by_ordinal.clear();
        for (position, field) in self.fields.iter_mut().enumerate() {
            field.build_lookup()?;
            if self.by_ordinal.insert(field.ordinal(), position).is_some() {
                return Err(SchemaError::DuplicateOrdinal(field.ordinal()));
            }
        }
        Ok(())
    }

    pub fn fields(&self) -> &[FeatureField] {
        &self.fields
    }

    pub fn find_field_by_ordinal(&self, ordinal: usize) -> Option<&FeatureField> {
        self.by_ordinal.get(&ordinal).map(|&idx| &self.fields[idx])
    }

    /// Look up a field that takes part in an attribute pair
    ///
    /// The field must exist and be categorical with at least one category.
    pub fn categorical_field(&self, ordinal: usize) -> Result<&FeatureField, SchemaError> {
        let field = self
            .find_field_by_ordinal(ordinal)
            .ok_or(SchemaError::UnknownOrdinal(ordinal))?;

        if !field.is_categorical() {
            return Err(SchemaError::NotCategorical {
                name: field.name().to_string(),
                ordinal,
            });
        }
        if field.cardinality() == 0 {
            return Err(SchemaError::EmptyCardinality {
                name: field.name().to_string(),
            });
        }
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"{
        "fields": [
            {"name": "id", "ordinal": 0, "dataType": "string"},
            {"name": "color", "ordinal": 1, "dataType": "categorical",
             "cardinality": ["red", "green", "blue"]},
            {"name": "size", "ordinal": 2, "dataType": "categorical",
             "cardinality": ["S", "M"]},
            {"name": "weight", "ordinal": 3, "dataType": "double"},
            {"name": "empty", "ordinal": 4, "dataType": "categorical", "cardinality": []}
        ]
    }"#;

    #[test]
    fn test_parse_and_lookup() {
        let schema = FeatureSchema::from_json(SCHEMA).unwrap();
        assert_eq!(schema.fields().len(), 5);

        let color = schema.find_field_by_ordinal(1).unwrap();
        assert_eq!(color.name(), "color");
        assert_eq!(color.cardinality(), 3);
        assert_eq!(color.category_index("blue").unwrap(), 2);
        assert!(schema.find_field_by_ordinal(9).is_none());
    }

    #[test]
    fn test_categorical_field_checks() {
        let schema = FeatureSchema::from_json(SCHEMA).unwrap();
        assert!(schema.categorical_field(2).is_ok());
        assert!(matches!(
            schema.categorical_field(3),
            Err(SchemaError::NotCategorical { ordinal: 3, .. })
        ));
        assert!(matches!(
            schema.categorical_field(4),
            Err(SchemaError::EmptyCardinality { .. })
        ));
        assert!(matches!(
            schema.categorical_field(7),
            Err(SchemaError::UnknownOrdinal(7))
        ));
    }

    #[test]
    fn test_duplicate_ordinal_rejected() {
        let json = r#"{"fields": [
            {"name": "a", "ordinal": 0, "dataType": "categorical", "cardinality": ["x"]},
            {"name": "b", "ordinal": 0, "dataType": "categorical", "cardinality": ["y"]}
        ]}"#;
        assert!(matches!(
            FeatureSchema::from_json(json),
            Err(SchemaError::DuplicateOrdinal(0))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            FeatureSchema::from_json("{not json"),
            Err(SchemaError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = FeatureSchema::load(Path::new("/nonexistent/schema.json")).unwrap_err();
        assert!(matches!(err, SchemaError::Io { .. }));
    }
}
