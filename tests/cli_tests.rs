//! Integration tests for the CLI interface
//!
//! Tests the main entry point and command parsing logic

mod common;

use assert_cmd::Command;
use common::{strong_association_records, JobFixtureBuilder};
use predicates::prelude::*;
use std::fs;

fn catcorr() -> Command {
    let mut cmd = Command::cargo_bin("catcorr").unwrap();
    for key in [
        "SCHEMA_PATH",
        "FIELD_DELIM_REGEX",
        "FIELD_DELIM_OUT",
        "SOURCE_ATTRIBUTES",
        "DEST_ATTRIBUTES",
        "NUM_REDUCERS",
        "CORRELATION_SCALE",
        "DEBUG",
        "SPLIT_SIZE",
        "MAX_PARALLEL_MAPPERS",
    ] {
        cmd.env_remove(format!("CATCORR_{key}"));
    }
    cmd
}

#[test]
fn test_cli_help_flag() {
    catcorr()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("pairs"))
        .stdout(predicate::str::contains("score"));
}

#[test]
fn test_run_requires_config() {
    catcorr()
        .args(["run", "--input", "data.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--config"));
}

#[test]
fn test_run_prints_scores_to_stdout() {
    let fixture = JobFixtureBuilder::new()
        .unwrap()
        .with_input("records.csv", strong_association_records())
        .build()
        .unwrap();

    catcorr()
        .arg("run")
        .arg("--config")
        .arg(fixture.job_file())
        .arg("--input")
        .arg(fixture.data_dir())
        .assert()
        .success()
        .stdout(predicate::eq("color,shape,undefined\nsize,shape,500\n"));
}

#[test]
fn test_run_writes_part_files() {
    let fixture = JobFixtureBuilder::new()
        .unwrap()
        .with_input("records.csv", strong_association_records())
        .build()
        .unwrap();

    catcorr()
        .arg("run")
        .arg("-c")
        .arg(fixture.job_file())
        .arg("-i")
        .arg(fixture.data_dir())
        .arg("-o")
        .arg(fixture.output_dir())
        .args(["--reducers", "2", "--summary"])
        .assert()
        .success();

    assert!(fixture.output_dir().join("part-r-00000").exists());
    assert!(fixture.output_dir().join("part-r-00001").exists());
    assert!(fixture.output_dir().join("_SUCCESS.json").exists());
    assert_eq!(
        fixture.output_lines().unwrap(),
        vec!["color,shape,undefined", "size,shape,500"]
    );
}

#[test]
fn test_env_override_changes_scale() {
    let fixture = JobFixtureBuilder::new()
        .unwrap()
        .with_input("records.csv", strong_association_records())
        .build()
        .unwrap();

    catcorr()
        .env("CATCORR_CORRELATION_SCALE", "100")
        .env("CATCORR_SOURCE_ATTRIBUTES", "2")
        .arg("run")
        .arg("-c")
        .arg(fixture.job_file())
        .arg("-i")
        .arg(fixture.data_dir())
        .assert()
        .success()
        .stdout(predicate::eq("size,shape,50\n"));
}

#[test]
fn test_flag_overrides_env() {
    let fixture = JobFixtureBuilder::new()
        .unwrap()
        .with_input("records.csv", strong_association_records())
        .build()
        .unwrap();

    catcorr()
        .env("CATCORR_CORRELATION_SCALE", "100")
        .env("CATCORR_SOURCE_ATTRIBUTES", "2")
        .arg("run")
        .arg("-c")
        .arg(fixture.job_file())
        .arg("-i")
        .arg(fixture.data_dir())
        .args(["--scale", "1"])
        .assert()
        .success()
        .stdout(predicate::eq("size,shape,0.500000\n"));
}

#[test]
fn test_invalid_config_reports_error_code() {
    let fixture = JobFixtureBuilder::new()
        .unwrap()
        .with_job_yaml("schema_path: schema.json\nsource_attributes: [2]\ndest_attributes: [3]\nnum_reducers: 0\n")
        .with_input("records.csv", strong_association_records())
        .build()
        .unwrap();

    catcorr()
        .arg("run")
        .arg("-c")
        .arg(fixture.job_file())
        .arg("-i")
        .arg(fixture.data_dir())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("E1008"))
        .stderr(predicate::str::contains("num_reducers"));
}

#[test]
fn test_pairs_lists_declared_pairs() {
    let fixture = JobFixtureBuilder::new()
        .unwrap()
        .with_job_yaml("schema_path: schema.json\nsource_attributes: \"1,2\"\ndest_attributes: [2, 3]\n")
        .build()
        .unwrap();

    catcorr()
        .arg("pairs")
        .arg("-c")
        .arg(fixture.job_file())
        .assert()
        .success()
        .stdout(predicate::eq(
            "1,2\tcolor\tsize\t3x2\n1,3\tcolor\tshape\t3x2\n2,3\tsize\tshape\t2x2\n",
        ));
}

#[test]
fn test_score_merges_matrix_files() {
    let fixture = JobFixtureBuilder::new().unwrap().build().unwrap();
    let first = fixture.root().join("first.txt");
    let second = fixture.root().join("second.txt");
    fs::write(&first, "2,2,3,1,0,0\n").unwrap();
    fs::write(&second, "2,2,0,0,1,2\n\n2,2,0,0,0,1\n").unwrap();

    catcorr()
        .arg("score")
        .arg("-s")
        .arg(fixture.schema_file())
        .args(["--source", "2", "--dest", "3"])
        .arg(&first)
        .arg(&second)
        .assert()
        .success()
        .stdout(predicate::eq("size,shape,500\n"));
}

#[test]
fn test_score_rejects_shape_mismatch() {
    let fixture = JobFixtureBuilder::new().unwrap().build().unwrap();
    let matrices = fixture.root().join("matrices.txt");
    fs::write(&matrices, "2,2,3,1,1,3\n2,3,0,0,0,0,0,0\n").unwrap();

    catcorr()
        .arg("score")
        .arg("-s")
        .arg(fixture.schema_file())
        .args(["--source", "2", "--dest", "3"])
        .arg(&matrices)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E4020"));
}
