use super::{CategoryIndexer, SchemaError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declared type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Categorical,
    Int,
    Long,
    Double,
    String,
    Text,
    #[serde(other)]
    Other,
}

/// One attribute of an input record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureField {
    name: String,
    ordinal: usize,
    #[serde(default)]
    data_type: DataType,
    /// Ordered category labels; a label's position is its category index
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    cardinality: Vec<String>,
    #[serde(skip)]
    lookup: HashMap<String, usize>,
}

impl FeatureField {
    /// Create a categorical field
    pub fn categorical(
        name: impl Into<String>,
        ordinal: usize,
        categories: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, SchemaError> {
        let mut field = Self {
            name: name.into(),
            ordinal,
            data_type: DataType::Categorical,
            cardinality: categories.into_iter().map(Into::into).collect(),
            lookup: HashMap::new(),
        };
        field.build_lookup()?;
        Ok(field)
    }

    pub(super) fn build_lookup(&mut self) -> Result<(), SchemaError> {
        self.lookup.clear();
        for (idx, value) in self.cardinality.iter().enumerate() {
            if self.lookup.insert(value.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateCategory {
                    field: self.name.clone(),
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn is_categorical(&self) -> bool {
        self.data_type == DataType::Categorical
    }

    pub fn categories(&self) -> &[String] {
        &self.cardinality
    }
}

impl CategoryIndexer for FeatureField {
    fn cardinality(&self) -> usize {
        self.cardinality.len()
    }

    fn category_index(&self, value: &str) -> Result<usize, SchemaError> {
        self.lookup
            .get(value)
            .copied()
            .ok_or_else(|| SchemaError::UnrecognizedCategory {
                field: self.name.clone(),
                value: value.to_string(),
            })
    }
}
