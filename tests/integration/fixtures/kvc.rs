#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// Isolated home for one `kvc` run: empty config dir, private rc path,
/// no connection overrides leaking in from the environment.
pub struct KvcEnv {
    pub dir: TempDir,
}

impl KvcEnv {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    pub fn rc_path(&self) -> PathBuf {
        self.dir.path().join(".kvcrc")
    }

    pub fn write_rc(&self, contents: &str) {
        fs::write(self.rc_path(), contents).expect("write rc");
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("kvc");
        cmd.env("KVC_CONFIG_DIR", self.dir.path().join("config"));
        cmd.env("KVC_RC", self.rc_path());
        cmd.env("HOME", self.dir.path());
        for var in ["KVC_HOST", "KVC_BUCKET", "KVC_TIMEOUT", "LOG"] {
            cmd.env_remove(var);
        }
        cmd
    }
}
