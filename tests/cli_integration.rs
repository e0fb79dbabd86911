// CLI integration tests for encode/parse/apply/shorten flows.
use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::{Value, json};

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_querystate");
    let mut command = Command::new(exe);
    command
        .env_remove("QUERYSTATE_ORIGIN")
        .env_remove("QUERYSTATE_SHORTENER_URL")
        .env_remove("QUERYSTATE_SHORTENER_TIMEOUT_MS")
        .env_remove("RUST_LOG");
    command
}

fn stdout_text(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8")
}

fn parse_json(output: &[u8]) -> Value {
    let text = String::from_utf8_lossy(output);
    let line = text.lines().next().expect("json line");
    serde_json::from_str(line).expect("valid json")
}

#[test]
fn encode_then_parse_flow() {
    let encode = cmd()
        .args(["encode", "country.value=USA", "clicks.n_clicks=3"])
        .output()
        .expect("encode");
    assert!(encode.status.success());
    let search = stdout_text(&encode).trim().to_string();
    assert_eq!(search, "?country=value&country=USA&clicks=n_clicks&clicks=3");

    let parse = cmd().args(["parse", search.as_str()]).output().expect("parse");
    assert!(parse.status.success());
    assert_eq!(
        parse_json(&parse.stdout),
        json!({"country": [["value", "USA"]], "clicks": [["n_clicks", 3]]})
    );
}

#[test]
fn encode_reads_field_file_and_skips_nulls() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("fields.json");
    std::fs::write(
        &path,
        r#"[
            {"id": "club_multidropdown", "param": "value", "value": ["Heerenveen"]},
            {"id": "datepicker", "param": "start_date", "value": null},
            {"id": "submit-button", "param": "n_clicks"}
        ]"#,
    )
    .expect("write fields");

    let output = cmd()
        .args(["encode", "--json", "--input", path.to_str().expect("path")])
        .output()
        .expect("encode");
    assert!(output.status.success());
    assert_eq!(
        parse_json(&output.stdout),
        json!({"search": "?club_multidropdown=value&club_multidropdown=%5B%27Heerenveen%27%5D"})
    );
}

#[test]
fn encode_reads_stdin() {
    let mut child = cmd()
        .args(["encode", "--input", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(br#"[{"id": "slider", "param": "value", "value": 0.5}]"#)
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success());
    assert_eq!(stdout_text(&output).trim(), "?slider=value&slider=0.5");
}

#[test]
fn apply_overrides_defaults() {
    let output = cmd()
        .args([
            "apply",
            "http://127.0.0.1:8050/?country_radiobutton=value&country_radiobutton=USA",
            "--defaults",
            r#"{"id": "country_radiobutton", "value": "Canada", "options": ["Canada", "USA"]}"#,
        ])
        .output()
        .expect("apply");
    assert!(output.status.success());
    assert_eq!(
        parse_json(&output.stdout),
        json!({"id": "country_radiobutton", "value": "USA", "options": ["Canada", "USA"]})
    );
}

#[test]
fn corrupt_query_reports_json_error() {
    let output = cmd()
        .args(["parse", "?country=value&country=USA&country=n_clicks"])
        .output()
        .expect("parse");
    assert_eq!(output.status.code(), Some(3));
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "Corrupt");
    assert_eq!(err["error"]["component"], "country");
    assert!(err["error"]["hint"].is_string());
}

#[test]
fn mismatched_usage_exits_with_usage_code() {
    let output = cmd().args(["encode"]).output().expect("encode");
    assert_eq!(output.status.code(), Some(2));
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "Usage");
}

#[test]
fn shorten_without_state_prints_fallback() {
    let output = cmd().args(["shorten", "?"]).output().expect("shorten");
    assert!(output.status.success());
    assert_eq!(stdout_text(&output).trim(), "No url to shorten");
}

#[test]
fn empty_search_skips_shortener_setup() {
    for search in ["", "?"] {
        let output = cmd()
            .env("QUERYSTATE_SHORTENER_URL", "not a url")
            .args(["shorten", search])
            .output()
            .expect("shorten");
        assert!(output.status.success(), "{search:?}");
        assert_eq!(stdout_text(&output).trim(), "No url to shorten");
    }
}

#[test]
fn shorten_failure_is_reported_not_crashed() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let endpoint = format!("http://127.0.0.1:{port}/create");
    let output = cmd()
        .args([
            "shorten",
            "?a=value&a=1",
            "--endpoint",
            endpoint.as_str(),
            "--timeout-ms",
            "2000",
        ])
        .output()
        .expect("shorten");
    assert_eq!(output.status.code(), Some(4));
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "Io");
}

#[test]
fn version_reports_package() {
    let output = cmd().arg("version").output().expect("version");
    assert!(output.status.success());
    let value = parse_json(&output.stdout);
    assert_eq!(value["name"], "querystate");
}
