use predicates::prelude::*;

use crate::fixtures::kvc::KvcEnv;

#[test]
fn dsn_from_host_and_bucket() {
    let env = KvcEnv::new();
    env.cmd()
        .args(["-h", "db1;db2", "-b", "travel", "-t", "5", "dsn"])
        .assert()
        .success()
        .stdout("couchbase://db1,db2/travel?operation_timeout=5&\n");
}

#[test]
fn dsn_from_spec_with_options() {
    let env = KvcEnv::new();
    env.cmd()
        .args([
            "-U",
            "couchbase://h/b?ssl=off",
            "-C",
            "http",
            "--certpath",
            "/etc/ca.pem",
            "dsn",
        ])
        .assert()
        .success()
        .stdout("couchbase://h/b?ssl=off&certpath=/etc/ca.pem&bootstrap_on=http&\n");
}

#[test]
fn dsn_json() {
    let env = KvcEnv::new();
    let output = env
        .cmd()
        .args(["--admin", "dsn", "--json"])
        .output()
        .expect("run kvc");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(
        json["dsn"],
        "couchbase://localhost/default?username=Administrator&"
    );
}

#[test]
fn apply_reports_settings_json() {
    let env = KvcEnv::new();
    let output = env
        .cmd()
        .args([
            "-b",
            "travel",
            "-D",
            "operation_timeout=2.5000001",
            "-D",
            "retry_policy=missingnode:safe",
            "--json",
            "apply",
        ])
        .output()
        .expect("run kvc");
    assert!(output.status.success(), "{output:?}");
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["operation_timeout"], 2_500_000);
    assert_eq!(json["bucket"], "travel");
    assert_eq!(json["retry"][3], "safe");
}

#[test]
fn apply_lists_readable_settings() {
    let env = KvcEnv::new();
    env.cmd()
        .args(["-D", "unsafe_optimize=1", "apply"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vbguess_persist"))
        .stdout(predicate::str::contains(
            "topochange:none sockerr:none maperr:none missingnode:none",
        ));
}

#[test]
fn unknown_cntl_key_fails() {
    let env = KvcEnv::new();
    env.cmd()
        .args(["-D", "no_such_setting=1", "apply"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no_such_setting"));
}

#[test]
fn get_one_setting() {
    let env = KvcEnv::new();
    env.cmd()
        .args(["-t", "3", "get", "operation_timeout"])
        .assert()
        .success()
        .stdout("3000000\n");

    env.cmd()
        .args(["-S", "PLAIN", "get", "sasl_mech_force"])
        .assert()
        .success()
        .stdout("PLAIN\n");

    env.cmd()
        .args(["get", "retry_policy"])
        .assert()
        .success()
        .stdout("topochange:all\nsockerr:all\nmaperr:all\nmissingnode:none\n");
}

#[test]
fn console_log_file_gets_client_events() {
    let env = KvcEnv::new();
    let log = env.dir.path().join("client.log");
    env.cmd()
        .env("LOG", "debug")
        .args(["-D", &format!("console_log_file={}", log.display())])
        .args(["-D", "console_log_level=4", "get", "operation_timeout"])
        .assert()
        .success()
        .stdout("2500000\n");

    let written = std::fs::read_to_string(&log).unwrap();
    assert!(written.contains("(kvcntl::cntl) cntl"), "{written}");
}

#[test]
fn get_write_only_setting_fails() {
    let env = KvcEnv::new();
    env.cmd()
        .args(["get", "console_log_level"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not supported"));
}

#[test]
fn keys_lists_every_alias() {
    let env = KvcEnv::new();
    let output = env
        .cmd()
        .args(["keys", "--json"])
        .output()
        .expect("run kvc");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let keys = json.as_array().expect("array");
    assert_eq!(keys.len(), kvcntl::cntl::ALIASES.len());
    assert_eq!(keys[0]["key"], "operation_timeout");
    assert_eq!(keys[0]["opcode"], 0);
}

#[test]
fn help_is_long_only() {
    let env = KvcEnv::new();
    env.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--host"));
}
