//! Common test utilities and helpers

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Feature schema shared by the integration tests
pub const SCHEMA_JSON: &str = r#"{
    "fields": [
        {"name": "id", "ordinal": 0, "dataType": "string"},
        {"name": "color", "ordinal": 1, "dataType": "categorical",
         "cardinality": ["red", "green", "blue"]},
        {"name": "size", "ordinal": 2, "dataType": "categorical",
         "cardinality": ["S", "M"]},
        {"name": "shape", "ordinal": 3, "dataType": "categorical",
         "cardinality": ["round", "square"]}
    ]
}"#;

/// Eight records where size and shape agree three times out of four and
/// color never varies
pub fn strong_association_records() -> Vec<String> {
    let mut records = Vec::new();
    let mut push = |size: &str, shape: &str, times: usize| {
        for _ in 0..times {
            records.push(format!("{},red,{},{}", records.len(), size, shape));
        }
    };
    push("S", "round", 3);
    push("S", "square", 1);
    push("M", "round", 1);
    push("M", "square", 3);
    records
}

/// Builder for a job directory holding a schema, a job file and inputs
pub struct JobFixtureBuilder {
    temp_dir: TempDir,
    job_yaml: String,
    inputs: Vec<(PathBuf, Vec<String>)>,
}

impl JobFixtureBuilder {
    /// Create a new fixture builder with a default job file
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            job_yaml: "schema_path: schema.json\nsource_attributes: [1, 2]\ndest_attributes: [3]\n"
                .to_string(),
            inputs: Vec::new(),
        })
    }

    /// Replace the job file content
    pub fn with_job_yaml(mut self, yaml: &str) -> Self {
        self.job_yaml = yaml.to_string();
        self
    }

    /// Add an input file under `data/`
    pub fn with_input(mut self, name: &str, records: Vec<String>) -> Self {
        self.inputs.push((PathBuf::from("data").join(name), records));
        self
    }

    /// Write everything to disk
    pub fn build(self) -> Result<JobFixture> {
        let root = self.temp_dir.path();
        fs::write(root.join("schema.json"), SCHEMA_JSON)?;
        fs::write(root.join("job.yml"), &self.job_yaml)?;
        fs::create_dir_all(root.join("data"))?;
        for (path, records) in &self.inputs {
            let mut content = records.join("\n");
            content.push('\n');
            fs::write(root.join(path), content)?;
        }
        Ok(JobFixture {
            temp_dir: self.temp_dir,
        })
    }
}

/// A job directory on disk
pub struct JobFixture {
    temp_dir: TempDir,
}

impl JobFixture {
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn job_file(&self) -> PathBuf {
        self.root().join("job.yml")
    }

    pub fn schema_file(&self) -> PathBuf {
        self.root().join("schema.json")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root().join("data")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root().join("out")
    }

    /// All lines of every part file in the output directory, sorted
    pub fn output_lines(&self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for entry in fs::read_dir(self.output_dir())? {
            let path = entry?.path();
            let is_part = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("part-r-"))
                .unwrap_or(false);
            if is_part {
                lines.extend(fs::read_to_string(&path)?.lines().map(str::to_string));
            }
        }
        lines.sort();
        Ok(lines)
    }
}
