// End-to-end CLI behaviour: argument validation and exit codes.

use std::process::Command;

fn mcddump() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mcddump"))
}

#[test]
fn no_arguments_prints_usage_and_fails() {
    let output = mcddump().output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"));
}

#[test]
fn parse_requires_an_existing_project_folder() {
    let output = mcddump()
        .args([
            "parse",
            "/nonexistent/project",
            "EV_Test.bv",
            "VariantA",
            "F190",
            "0102",
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("project must be a folder"));
}

#[test]
fn parse_rejects_non_hex_did() {
    let dir = tempfile::tempdir().unwrap();
    let output = mcddump()
        .args([
            "parse",
            dir.path().to_str().unwrap(),
            "EV_Test.bv",
            "VariantA",
            "notahexdid",
            "0102",
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("hex"));
}

#[test]
fn base_variant_dump_fails_without_string_pools() {
    // A folder without string pools is not a project; the strict entry
    // point must exit non-zero.
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let output = mcddump()
        .args([
            "base-variant",
            dir.path().to_str().unwrap(),
            "EV_Test.bv",
            out.path().to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn projects_batch_succeeds_on_an_empty_folder() {
    // Batch mode records failures and continues; an empty folder is a
    // successful no-op.
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let output = mcddump()
        .args([
            "projects",
            dir.path().to_str().unwrap(),
            out.path().to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
}
