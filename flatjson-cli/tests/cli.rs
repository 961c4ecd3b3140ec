use predicates::prelude::*;
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct SampleFile {
    _dir: TempDir,
    json_path: PathBuf,
    index_path: PathBuf,
}

fn build_sample_file(extra_args: &[&str]) -> Result<SampleFile, Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let json_path = dir.path().join("input.json");
    let index_path = dir.path().join("output.fji");

    fs::write(
        &json_path,
        r#"{"a":1,"b":[2,3],"c":{},"users":[{"name":"alice"},{"name":"bob"}],"s/k":null}"#,
    )?;

    assert_cmd::Command::cargo_bin("flatjson")?
        .args([
            "build",
            json_path.to_str().unwrap(),
            "-o",
            index_path.to_str().unwrap(),
        ])
        .args(extra_args)
        .assert()
        .success()
        .stderr(predicate::str::contains("Built"));

    Ok(SampleFile {
        _dir: dir,
        json_path,
        index_path,
    })
}

fn run(args: &[&str]) -> Result<String, Box<dyn Error>> {
    let output = assert_cmd::Command::cargo_bin("flatjson")?
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    Ok(String::from_utf8(output)?)
}

#[test]
fn get_prints_json_values() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(&[])?;
    let index = sample.index_path.to_str().unwrap();

    assert_eq!(run(&["get", index, "b/0"])?.trim(), "2");
    assert_eq!(run(&["get", index, "users/1/name"])?.trim(), r#""bob""#);
    assert_eq!(run(&["get", index, "c"])?.trim(), "{}");
    assert_eq!(run(&["get", index, r"s\/k"])?.trim(), "null");
    Ok(())
}

#[test]
fn get_root_matches_input() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(&[])?;
    let stdout = run(&["get", sample.index_path.to_str().unwrap()])?;
    let actual: Value = serde_json::from_str(&stdout)?;
    let expected: Value = serde_json::from_str(&fs::read_to_string(&sample.json_path)?)?;
    assert_eq!(actual, expected);
    Ok(())
}

#[test]
fn get_pretty_output_parses() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(&[])?;
    let stdout = run(&["get", sample.index_path.to_str().unwrap(), "users", "--pretty"])?;
    assert!(stdout.lines().count() > 1);
    let value: Value = serde_json::from_str(&stdout)?;
    assert_eq!(value[0]["name"], "alice");
    Ok(())
}

#[test]
fn get_missing_path_uses_default_or_fails() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(&[])?;
    let index = sample.index_path.to_str().unwrap();

    assert_eq!(
        run(&["get", index, "b/x", "--default", r#""fallback""#])?.trim(),
        r#""fallback""#
    );

    assert_cmd::Command::cargo_bin("flatjson")?
        .args(["get", index, "b/x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'x'"));
    Ok(())
}

#[test]
fn has_size_keys_and_paths() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(&[])?;
    let index = sample.index_path.to_str().unwrap();

    assert_eq!(run(&["has", index, "users/0/name"])?.trim(), "true");
    assert_eq!(run(&["has", index, "users/9"])?.trim(), "false");
    assert_eq!(run(&["size", index, "b"])?.trim(), "2");
    assert_eq!(run(&["size", index])?.trim(), "5");

    let keys: Value = serde_json::from_str(&run(&["keys", index])?)?;
    assert_eq!(keys, serde_json::json!(["a", "b", "c", "s/k", "users"]));
    let keys: Value = serde_json::from_str(&run(&["keys", index, "b"])?)?;
    assert_eq!(keys, serde_json::json!([0, 1]));

    let paths = run(&["paths", index, "users"])?;
    let paths: Vec<&str> = paths.lines().collect();
    assert_eq!(paths, vec!["users/0", "users/0/name", "users/1", "users/1/name"]);
    Ok(())
}

#[test]
fn size_of_scalar_fails() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(&[])?;
    assert_cmd::Command::cargo_bin("flatjson")?
        .args(["size", sample.index_path.to_str().unwrap(), "a"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn inspect_reports_header() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(&["--hash", "md5"])?;
    let index = sample.index_path.to_str().unwrap();

    let table = run(&["inspect", index])?;
    assert!(table.contains("MD5"));
    assert!(table.contains("object"));

    let json: Value = serde_json::from_str(&run(&["inspect", index, "--format", "json"])?)?;
    assert_eq!(json["hash_algorithm"], "MD5");
    assert_eq!(json["format_version"], "1.0");
    assert_eq!(json["lines"], 11);
    assert_eq!(json["declared_lines"], 11);
    Ok(())
}

#[test]
fn verify_detects_tampering() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(&[])?;
    let index = sample.index_path.to_str().unwrap();

    assert_cmd::Command::cargo_bin("flatjson")?
        .args(["verify", index])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));

    let text = fs::read_to_string(&sample.index_path)?;
    fs::write(&sample.index_path, text.replace(r#":"a">1"#, r#":"a">7"#))?;

    assert_cmd::Command::cargo_bin("flatjson")?
        .args(["verify", index])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Hash verification failed"));

    assert_eq!(run(&["get", index, "a", "--ignore-hash"])?.trim(), "7");
    Ok(())
}

#[test]
fn build_rejects_scalar_root() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("scalar.json");
    fs::write(&input, "42")?;

    assert_cmd::Command::cargo_bin("flatjson")?
        .args([
            "build",
            input.to_str().unwrap(),
            "-o",
            dir.path().join("out.fji").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported root type"));
    Ok(())
}

#[test]
fn verbose_flag_emits_debug_events() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(&[])?;
    assert_cmd::Command::cargo_bin("flatjson")?
        .args(["size", sample.index_path.to_str().unwrap(), "-v"])
        .assert()
        .success()
        .stderr(predicate::str::contains("opened flat index"));
    Ok(())
}
