use crate::common::IsolatedEnv;
use pingwatch::config::{self, ConfigError};
use serial_test::serial;
use std::io::Write;

fn write_config(dir: &std::path::Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("config.yaml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
#[serial]
fn loads_a_minimal_valid_configuration() {
    let _env = IsolatedEnv::new();
    let dir = crate::common::create_temp_dir();
    let path = write_config(
        dir.path(),
        r#"
pings:
  - name: "Example"
    protocol: HTTPS
    method: GET
    resource: "https://example.gov/health"
    expected:
      status: 200
"#,
    );

    let configuration = config::load(Some(&path)).expect("configuration should load");
    assert_eq!(configuration.pings.len(), 1);
    assert_eq!(configuration.pings[0].name, "Example");
}

#[test]
#[serial]
fn rejects_duplicate_service_names_with_the_literal_message() {
    let _env = IsolatedEnv::new();
    let dir = crate::common::create_temp_dir();
    let path = write_config(
        dir.path(),
        r#"
pings:
  - name: "Svc"
    protocol: HTTPS
    method: GET
    resource: "https://example.gov/a"
    expected:
      status: 200
  - name: "Svc"
    protocol: HTTPS
    method: GET
    resource: "https://example.gov/b"
    expected:
      status: 200
"#,
    );

    let err = config::load(Some(&path)).expect_err("duplicate names must fail validation");
    match err {
        ConfigError::Invalid { issues } => {
            assert!(issues
                .iter()
                .any(|issue| issue.message == "Duplicate service name: \"Svc\""));
        }
        other => panic!("expected ConfigError::Invalid, got {other:?}"),
    }
}

#[test]
#[serial]
fn rejects_payload_on_a_non_post_method() {
    let _env = IsolatedEnv::new();
    let dir = crate::common::create_temp_dir();
    let path = write_config(
        dir.path(),
        r#"
pings:
  - name: "Svc"
    protocol: HTTPS
    method: GET
    resource: "https://example.gov/a"
    payload:
      x: 1
    expected:
      status: 200
"#,
    );

    let err = config::load(Some(&path)).expect_err("payload on GET must fail validation");
    match err {
        ConfigError::Invalid { issues } => {
            assert!(issues
                .iter()
                .any(|issue| issue.message.contains("payload is only valid for POST")));
        }
        other => panic!("expected ConfigError::Invalid, got {other:?}"),
    }
}

#[test]
#[serial]
fn rejects_warning_threshold_not_below_timeout() {
    let _env = IsolatedEnv::new();
    let dir = crate::common::create_temp_dir();
    let path = write_config(
        dir.path(),
        r#"
settings:
  warning_threshold: 5
  timeout: 5
pings:
  - name: "Svc"
    protocol: HTTPS
    method: GET
    resource: "https://example.gov/a"
    expected:
      status: 200
"#,
    );

    let err = config::load(Some(&path)).expect_err("equal thresholds must fail validation");
    assert!(matches!(err, ConfigError::Invalid { .. }));
}

#[test]
#[serial]
fn reports_every_candidate_path_tried_when_none_exist() {
    let _env = IsolatedEnv::new();
    let dir = crate::common::create_temp_dir();
    let missing = dir.path().join("does-not-exist.yaml");

    let err = config::load(Some(&missing)).expect_err("missing file must fail");
    assert!(matches!(err, ConfigError::Io { .. }) || matches!(err, ConfigError::NotFound { .. }));
}

#[test]
#[serial]
fn rejects_empty_document() {
    let _env = IsolatedEnv::new();
    let dir = crate::common::create_temp_dir();
    let path = write_config(dir.path(), "# just a comment\n");

    let err = config::load(Some(&path)).expect_err("comment-only document must fail");
    assert!(matches!(err, ConfigError::Invalid { .. }));
}
