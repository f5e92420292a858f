use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

fn cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_jsdocr")));
    cmd.env_remove("JSDOCR_LOG");
    cmd
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let assert = cmd().args(args).assert().success();
    serde_json::from_slice(&assert.get_output().stdout).unwrap()
}

fn longnames(doclets: &serde_json::Value) -> Vec<String> {
    doclets
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["longname"].as_str().unwrap().to_string())
        .collect()
}

fn find<'a>(doclets: &'a serde_json::Value, longname: &str) -> &'a serde_json::Value {
    doclets
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["longname"] == longname)
        .unwrap_or_else(|| panic!("no doclet named {longname}"))
}

// -- stdin mode --

#[test]
fn stdin_mode_produces_json() {
    let input = std::fs::read_to_string(fixture_path("soup.js")).unwrap();
    let assert = cmd().write_stdin(input).assert().success();
    let doclets: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();

    let soup = find(&doclets, "Soup");
    assert_eq!(soup["kind"], "class");
    assert_eq!(soup["meta"]["filename"], "<stdin>");
}

#[test]
fn empty_stdin_is_an_empty_array() {
    cmd()
        .write_stdin("var x = 1;\n")
        .assert()
        .success()
        .stdout("[]\n");
}

// -- symbol resolution --

#[test]
fn code_names_resolve() {
    let doclets = run_json(&[&fixture_path("soup.js")]);
    assert_eq!(
        longnames(&doclets),
        [
            "Soup",
            "Soup#level",
            "Soup#heat(degrees)",
            "Soup#heat(degrees, flame)",
            "serve",
        ]
    );

    let level = find(&doclets, "Soup#level");
    assert_eq!(level["memberof"], "Soup");
    assert_eq!(level["scope"], "instance");

    let serve = find(&doclets, "serve");
    assert_eq!(serve["scope"], "global");
    assert_eq!(serve["kind"], "function");
}

#[test]
fn module_members() {
    let doclets = run_json(&[&fixture_path("module.js")]);
    assert_eq!(
        longnames(&doclets),
        ["module:kitchen", "module:kitchen.add", "module:kitchen~helper"]
    );
    assert_eq!(find(&doclets, "module:kitchen~helper")["scope"], "inner");
}

#[test]
fn inheritance_across_files_is_order_independent() {
    let dir = TempDir::new().unwrap();
    let input = std::fs::read_to_string(fixture_path("inherit.js")).unwrap();
    // Child documented in a file sorted before its parent.
    let (parent, child) = input.split_at(input.find("/**\n * A loyal").unwrap());
    std::fs::write(dir.path().join("a_dog.js"), child).unwrap();
    std::fs::write(dir.path().join("b_animal.js"), parent).unwrap();

    let doclets = run_json(&[dir.path().to_str().unwrap()]);
    let eat = find(&doclets, "Dog#eat");
    assert_eq!(eat["inherited"], true);
    assert_eq!(eat["inherits"], "Animal#eat");
    assert_eq!(find(&doclets, "Dog#sleep")["overrides"], "Animal#sleep");
}

#[test]
fn missing_parent_fails() {
    cmd()
        .arg(fixture_path("broken.js"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing dependency"))
        .stderr(predicate::str::contains("Nowhere"));
}

// -- output --

#[test]
fn markdown_to_stdout() {
    cmd()
        .args(["-f", "markdown"])
        .arg(fixture_path("inherit.js"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("## Index\n"))
        .stdout(predicate::str::contains("* [Dog](#dog)"))
        .stdout(predicate::str::contains("  * [Dog#eat](#dogeat)"))
        .stdout(predicate::str::contains("\n### Dog#eat\n"))
        .stdout(predicate::str::contains("* Inherited from `Animal#eat`"))
        .stdout(predicate::str::contains("* Overrides `Animal#sleep`"))
        .stdout(predicate::str::contains("| `food` | `string` | What to eat. |"));
}

#[test]
fn output_file_format_from_extension() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("docs").join("api.md");

    cmd()
        .args(["-o", out.to_str().unwrap()])
        .arg(fixture_path("soup.js"))
        .assert()
        .success()
        .stdout("");

    let output = std::fs::read_to_string(&out).unwrap();
    assert!(output.contains("\n## Soup\n"));
    assert!(output.contains("\n### Soup#heat(degrees, flame)\n"));
    assert!(output.contains("#### Returns\n\n* `boolean` Whether any soup was left."));
}

#[test]
fn explicit_format_wins_over_extension() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("api.md");

    cmd()
        .args(["-f", "json", "-o", out.to_str().unwrap()])
        .arg(fixture_path("module.js"))
        .assert()
        .success();

    let output = std::fs::read_to_string(&out).unwrap();
    let doclets: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(doclets.as_array().unwrap().len(), 3);
}

#[test]
fn unknown_format_fails() {
    cmd()
        .args(["-f", "html"])
        .arg(fixture_path("soup.js"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: html"));
}

// -- inputs --

#[test]
fn glob_inputs() {
    let pattern = format!("{}/tests/fixtures/[ms]*.js", env!("CARGO_MANIFEST_DIR"));
    let doclets = run_json(&[&pattern]);
    let names = longnames(&doclets);
    // module.js sorts before soup.js
    assert_eq!(names.first().map(String::as_str), Some("module:kitchen"));
    assert_eq!(names.last().map(String::as_str), Some("serve"));
}

#[test]
fn no_matching_inputs_fails() {
    let dir = TempDir::new().unwrap();
    cmd()
        .arg(format!("{}/*.js", dir.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no input files found"));
}

// -- configuration --

#[test]
fn unknown_tags_allowed_by_default() {
    let doclets = run_json(&[&fixture_path("custom.js")]);
    let stir = find(&doclets, "stir");
    assert_eq!(stir["tags"][0]["title"], "customtag");
}

#[test]
fn no_unknown_tags_reports_them() {
    cmd()
        .arg("--no-unknown-tags")
        .arg(fixture_path("custom.js"))
        .assert()
        .success()
        .stderr(predicate::str::contains("is not a known tag"));
}

#[test]
fn config_file_allow_list() {
    let mut config = NamedTempFile::new().unwrap();
    write!(config, r#"{{"tags": {{"allowUnknownTags": ["othertag"]}}}}"#).unwrap();

    cmd()
        .args(["--config", config.path().to_str().unwrap()])
        .arg(fixture_path("custom.js"))
        .assert()
        .success()
        .stderr(predicate::str::contains("@customtag"));
}

#[test]
fn malformed_config_fails() {
    let mut config = NamedTempFile::new().unwrap();
    write!(config, "{{").unwrap();

    cmd()
        .args(["--config", config.path().to_str().unwrap()])
        .arg(fixture_path("soup.js"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn quiet_hides_warnings() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("borrow.js");
    std::fs::write(&input, "/**\n * @class Widget\n * @borrows Ghost#boo as #baz\n */\n").unwrap();

    cmd()
        .arg(input.to_str().unwrap())
        .assert()
        .success()
        .stderr(predicate::str::contains("Ghost#boo"));

    cmd()
        .arg("-q")
        .arg(input.to_str().unwrap())
        .assert()
        .success()
        .stderr("");
}
