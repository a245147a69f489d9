use std::fs;

use predicates::prelude::*;

use crate::fixtures::kvc::KvcEnv;

#[test]
fn rc_defaults_feed_the_dsn() {
    let env = KvcEnv::new();
    env.write_rc("# saved\nuri=db7\nbucket=beer\ntimeout=4\n");
    env.cmd()
        .arg("dsn")
        .assert()
        .success()
        .stdout("couchbase://db7/beer?operation_timeout=4&\n");
}

#[test]
fn flags_beat_rc_defaults() {
    let env = KvcEnv::new();
    env.write_rc("dsn=couchbase://saved/b\n");
    env.cmd()
        .args(["-h", "db1", "dsn"])
        .assert()
        .success()
        .stdout("couchbase://db1/default?\n");
}

#[test]
fn broken_rc_is_skipped() {
    let env = KvcEnv::new();
    env.write_rc("colour=blue\n");
    env.cmd()
        .arg("dsn")
        .assert()
        .success()
        .stdout("couchbase://localhost/default?\n")
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn broken_rc_keeps_logging_from_config_toml() {
    let env = KvcEnv::new();
    env.write_rc("colour=blue\n");
    let config_dir = env.dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[logging]\nstdout_format = \"json\"\n",
    )
    .unwrap();

    env.cmd()
        .arg("dsn")
        .assert()
        .success()
        .stderr(predicate::str::contains(r#""level":"WARN""#))
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn env_overrides_rc() {
    let env = KvcEnv::new();
    env.write_rc("uri=db7\n");
    env.cmd()
        .env("KVC_HOST", "db8")
        .arg("dsn")
        .assert()
        .success()
        .stdout("couchbase://db8/default?\n");
}

#[test]
fn write_config_saves_passed_options() {
    let env = KvcEnv::new();
    env.cmd()
        .args(["-h", "db1", "-b", "travel", "-P", "s3cret", "-t", "9", "write-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));

    let saved = fs::read_to_string(env.rc_path()).expect("rc written");
    assert!(saved.starts_with("# Generated by kvc at "));
    assert!(saved.contains("dsn=couchbase://db1/travel?\n"));
    assert!(saved.contains("password=s3cret\n"));
    assert!(saved.contains("timeout=9\n"));
    assert!(!saved.contains("user="));

    // The saved file is read back on the next run.
    env.cmd()
        .arg("dsn")
        .assert()
        .success()
        .stdout("couchbase://db1/travel?operation_timeout=9&\n");
}

#[test]
fn write_config_to_explicit_path() {
    let env = KvcEnv::new();
    let target = env.dir.path().join("nested").join("kvcrc");
    env.cmd()
        .args(["--ssl", "on", "write-config"])
        .arg(&target)
        .assert()
        .success();
    let saved = fs::read_to_string(&target).expect("rc written");
    assert!(saved.contains("ssl=on\n"));
    assert!(!saved.contains("dsn="));
}
