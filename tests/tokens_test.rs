//! Integration tests for `fwpcd tokens`

mod common;

use common::{run_fwpcd, TestProject};

#[test]
fn test_tokens_lists_platform_registry() {
    let project = TestProject::sample();
    let output = run_fwpcd(&project, &["tokens"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("PcdHelloCount"));
    assert!(stdout.contains("PcdDebugPrintErrorLevel"));
    assert!(stdout.contains("PcdBootTimeout"));
    assert!(stdout.contains("DYNAMIC  UINT16  = 5"));
    assert!(stdout.contains("3 token(s)"));
}

#[test]
fn test_tokens_for_module_shows_usage() {
    let project = TestProject::sample();
    let output = run_fwpcd(&project, &["tokens", "--module", "HelloDxe"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("[ALWAYS_CONSUMED]"));
    assert!(stdout.contains("[SOMETIMES_CONSUMED]"));
    assert!(!stdout.contains("PcdDebugPrintErrorLevel"));
}

#[test]
fn test_tokens_json_output() {
    let project = TestProject::sample();
    let output = run_fwpcd(&project, &["tokens", "--json"]);
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("tokens output is JSON");
    let tokens = value.as_array().expect("array of tokens");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0]["c_name"], "PcdBootTimeout");
    assert_eq!(tokens[0]["pcd_type"], "DYNAMIC");
    assert_eq!(tokens[0]["sku_data"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_tokens_unknown_module() {
    let project = TestProject::sample();
    let output = run_fwpcd(&project, &["tokens", "--module", "Missing"]);
    assert!(!output.status.success());
}

#[test]
fn test_tokens_undeclared_pcd_fails() {
    let project = TestProject::sample();
    let module = common::HELLO_DXE.replace("PcdHelloCount", "PcdNotDeclared");
    project.create_file("MdePkg/HelloDxe/HelloDxe.toml", &module);

    let output = run_fwpcd(&project, &["tokens"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("PcdNotDeclared"));
}
