//! # catcorr
//!
//! Distributed Cramer's V between categorical attributes of delimited
//! records.
//!
//! ## Usage
//!
//! ```bash
//! catcorr run --config job.yml --input data/ --output out/
//! ```
//!
//! ## Modules
//!
//! - `cli` - Command-line parsing and command handlers
//! - `config` - Job configuration loading and environment overrides
//! - `error` - Unified error type with error codes
//! - `mapreduce` - Partition accumulation, shuffle, aggregation and the local job runner
//! - `matrix` - Contingency matrix, its wire format and Cramer's V
//! - `schema` - Feature schema and category lookup
pub mod cli;
pub mod config;
pub mod error;
pub mod mapreduce;
pub mod matrix;
pub mod schema;

#[cfg(test)]
mod property_tests;
