/// Integration tests for the analyze command
/// These tests run the full pipeline end to end against temporary files
use admission_log_tools::audit::analyzer::MissingUserInfo;
use admission_log_tools::commands::analyze;
use serde_json::{json, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Build one zap-style proxy log line with `msg` encoded as JSON text
fn log_line(request_id: &str, direction: &str, msg: &Value) -> String {
    json!({
        "level": "info",
        "ts": 1_700_000_000.0,
        "caller": "logger/logger.go:78",
        "msg": msg.to_string(),
        "requestId": request_id,
        "requestDirection": direction,
    })
    .to_string()
}

fn incoming(request_id: &str, kind: &str, namespace: &str, username: &str) -> String {
    let msg = json!({
        "kind": "AdmissionReview",
        "apiVersion": "admission.k8s.io/v1",
        "request": {
            "uid": request_id,
            "object": {"kind": kind, "metadata": {"name": format!("{request_id}-obj")}},
            "namespace": namespace,
            "operation": "CREATE",
            "userInfo": {"username": username, "groups": ["system:authenticated"]},
            "dryRun": false
        }
    });
    log_line(request_id, "incoming", &msg)
}

fn outgoing(request_id: &str, allowed: bool) -> String {
    let msg = json!({
        "AdmissionReview": {
            "kind": "AdmissionReview",
            "apiVersion": "admission.k8s.io/v1",
            "response": {"uid": request_id, "allowed": allowed}
        },
        "IsSkipped": false
    });
    log_line(request_id, "outgoing", &msg)
}

fn write_log(dir: &TempDir, lines: &[String]) -> PathBuf {
    let path = dir.path().join("webhook.log");
    let mut file = fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    path
}

fn run_default(input: &Path, output: &Path) -> anyhow::Result<()> {
    analyze::run(
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        None,
        false,
        MissingUserInfo::Exclude,
        true,
    )
}

fn read_output(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn names(output: &Value) -> Vec<String> {
    output
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_documented_scenario() {
    let dir = TempDir::new().unwrap();
    let lines = [
        r#"{"requestId":"r1","requestDirection":"incoming","msg":"{\"IsSkipped\":false}"}"#.to_string(),
        r#"{"requestId":"r1","requestDirection":"outgoing","msg":"{\"AdmissionReview\":{\"response\":{\"allowed\":true}},\"request\":{\"object\":{\"kind\":\"Pod\",\"metadata\":{\"name\":\"x\"}},\"namespace\":\"default\",\"userInfo\":{\"username\":\"system:admin\"},\"operation\":\"CREATE\",\"dryRun\":false}}"}"#.to_string(),
    ];
    let input = write_log(&dir, &lines);
    let output = dir.path().join("out.json");

    run_default(&input, &output).unwrap();

    assert_eq!(
        read_output(&output),
        json!([{
            "isSkipped": false,
            "isAllowed": true,
            "kind": "Pod",
            "name": "x",
            "namespace": "default",
            "userInfo": {"username": "system:admin"},
            "operation": "CREATE",
            "dryRun": false
        }])
    );
}

#[test]
fn test_output_is_pretty_printed_in_field_order() {
    let dir = TempDir::new().unwrap();
    let input = write_log(
        &dir,
        &[
            incoming("r1", "Pod", "default", "system:admin"),
            outgoing("r1", true),
        ],
    );
    let output = dir.path().join("out.json");

    run_default(&input, &output).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("[\n  {\n    \"isSkipped\": false,\n    \"isAllowed\": true,\n    \"kind\": \"Pod\""));
    let user_info = text.find("\"userInfo\"").unwrap();
    let operation = text.find("\"operation\"").unwrap();
    let dry_run = text.find("\"dryRun\"").unwrap();
    assert!(user_info < operation && operation < dry_run);
}

#[test]
fn test_order_follows_incoming_lines() {
    let dir = TempDir::new().unwrap();
    let input = write_log(
        &dir,
        &[
            incoming("r1", "Pod", "default", "system:admin"),
            incoming("r2", "Secret", "default", "system:admin"),
            outgoing("r2", true),
            incoming("r3", "ConfigMap", "default", "system:admin"),
            outgoing("r3", false),
            outgoing("r1", true),
        ],
    );
    let output = dir.path().join("out.json");

    run_default(&input, &output).unwrap();

    assert_eq!(names(&read_output(&output)), ["r1-obj", "r2-obj", "r3-obj"]);
}

#[test]
fn test_business_filter() {
    let dir = TempDir::new().unwrap();
    let mut lines = Vec::new();
    for (id, kind, namespace, username) in [
        ("lease", "Lease", "default", "system:admin"),
        ("event", "Event", "default", "system:admin"),
        ("os", "Pod", "openshift-monitoring", "system:admin"),
        ("human", "Pod", "default", "alice"),
        ("sa", "Pod", "default", "system:serviceaccount:ns:builder"),
        ("node", "Pod", "default", "system:node:worker-0"),
        ("kept", "Deployment", "apps", "system:kube-controller-manager"),
    ] {
        lines.push(incoming(id, kind, namespace, username));
        lines.push(outgoing(id, true));
    }
    let input = write_log(&dir, &lines);
    let output = dir.path().join("out.json");

    run_default(&input, &output).unwrap();

    assert_eq!(names(&read_output(&output)), ["kept-obj"]);
}

#[test]
fn test_no_filter_keeps_all_admission_transactions() {
    let dir = TempDir::new().unwrap();
    let input = write_log(
        &dir,
        &[
            incoming("a", "Lease", "default", "system:admin"),
            outgoing("a", true),
            incoming("b", "Pod", "default", "alice"),
            outgoing("b", false),
            incoming("c", "Pod", "default", "alice"),
        ],
    );
    let output = dir.path().join("out.json");

    analyze::run(
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        None,
        false,
        MissingUserInfo::Exclude,
        false,
    )
    .unwrap();

    assert_eq!(names(&read_output(&output)), ["a-obj", "b-obj"]);
}

#[test]
fn test_unmatched_and_noise_are_ignored() {
    let dir = TempDir::new().unwrap();
    let input = write_log(
        &dir,
        &[
            r#"{"level":"info","ts":1700000000.0,"msg":"\"webhook server started\"","requestId":""}"#
                .to_string(),
            r#"{"level":"error","msg":"failed to convert object to JSON","requestId":"r9"}"#
                .to_string(),
            "panic: runtime error".to_string(),
            outgoing("orphan", true),
            incoming("r1", "Pod", "default", "system:admin"),
            outgoing("r1", true),
        ],
    );
    let output = dir.path().join("out.json");

    run_default(&input, &output).unwrap();

    assert_eq!(names(&read_output(&output)), ["r1-obj"]);
}

#[test]
fn test_raw_output_contains_merged_records() {
    let dir = TempDir::new().unwrap();
    let input = write_log(
        &dir,
        &[
            incoming("r1", "Pod", "default", "alice"),
            outgoing("r1", false),
        ],
    );
    let output = dir.path().join("out.json");
    let raw = dir.path().join("raw.json");

    analyze::run(
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        Some(raw.to_str().unwrap()),
        false,
        MissingUserInfo::Exclude,
        true,
    )
    .unwrap();

    assert_eq!(read_output(&output), json!([]));

    let raw = read_output(&raw);
    let records = raw.as_array().unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["requestId"], "r1");
    assert_eq!(record["requestDirection"], "incoming");
    assert_eq!(record["msg"]["kind"], "AdmissionReview");
    assert_eq!(record["msg"]["AdmissionReview"]["response"]["allowed"], false);
    assert_eq!(record["msg"]["IsSkipped"], false);
    assert!(record.get("orderNumber").is_none());
}

#[test]
fn test_existing_output_is_overwritten() {
    let dir = TempDir::new().unwrap();
    let input = write_log(&dir, &[]);
    let output = dir.path().join("out.json");
    fs::write(&output, "stale content that is much longer than an empty array").unwrap();

    run_default(&input, &output).unwrap();

    assert_eq!(fs::read_to_string(&output).unwrap(), "[]");
}

#[test]
fn test_gzip_input() {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let dir = TempDir::new().unwrap();
    let input = dir.path().join("webhook.log.gz");
    {
        let file = fs::File::create(&input).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        writeln!(encoder, "{}", incoming("r1", "Pod", "default", "system:admin")).unwrap();
        writeln!(encoder, "{}", outgoing("r1", true)).unwrap();
        encoder.finish().unwrap();
    }
    let output = dir.path().join("out.json");

    run_default(&input, &output).unwrap();

    assert_eq!(names(&read_output(&output)), ["r1-obj"]);
}

#[test]
fn test_missing_user_info_policy() {
    let dir = TempDir::new().unwrap();
    let no_user = log_line(
        "r1",
        "incoming",
        &json!({"request": {"object": {"kind": "Pod", "metadata": {"name": "p"}}}}),
    );
    let input = write_log(&dir, &[no_user, outgoing("r1", true)]);
    let output = dir.path().join("out.json");

    run_default(&input, &output).unwrap();
    assert_eq!(read_output(&output), json!([]));

    let strict_output = dir.path().join("strict.json");
    let result = analyze::run(
        input.to_str().unwrap(),
        strict_output.to_str().unwrap(),
        None,
        false,
        MissingUserInfo::Error,
        true,
    );
    assert!(result.is_err());
    assert!(!strict_output.exists());
}

#[test]
fn test_payloadless_incoming_blocks_later_outgoing() {
    let dir = TempDir::new().unwrap();
    let input = write_log(
        &dir,
        &[
            incoming("r1", "Pod", "default", "system:admin"),
            log_line("r1", "incoming", &Value::Null),
            outgoing("r1", true),
            incoming("r2", "Pod", "default", "system:admin"),
            outgoing("r2", true),
        ],
    );
    let output = dir.path().join("out.json");

    run_default(&input, &output).unwrap();

    assert_eq!(names(&read_output(&output)), ["r2-obj"]);
}

#[test]
fn test_scalars_written_as_logged() {
    let dir = TempDir::new().unwrap();
    let msg = json!({
        "request": {
            "object": {"kind": "Pod", "metadata": {"name": "p"}},
            "namespace": null,
            "userInfo": {"username": "system:admin", "groups": ["a", 1]}
        }
    });
    let reply = json!({"AdmissionReview": {"response": {"allowed": "true"}}});
    let input = write_log(
        &dir,
        &[
            log_line("r1", "incoming", &msg),
            log_line("r1", "outgoing", &reply),
        ],
    );
    let output = dir.path().join("out.json");

    run_default(&input, &output).unwrap();

    assert_eq!(
        read_output(&output),
        json!([{
            "isAllowed": "true",
            "kind": "Pod",
            "name": "p",
            "namespace": null,
            "userInfo": {"username": "system:admin", "groups": ["a", 1]}
        }])
    );
}
