//! Hermetic sandbox for running the `shelf` binary in tests.
//!
//! - Fixture files are written under an `assert_fs::TempDir`, cleaned up on drop
//! - Commands run with a scrubbed environment: private `HOME`, colors off,
//!   no `SHELF_*` or `RUST_LOG` leaking in from the caller
//! - `snapshot_run` captures exit code, stdout and stderr as one string
//!
//! ## Quick example
//! ```no_run
//! use shelf_test_utils::Sandbox;
//!
//! let out = Sandbox::new()
//!     .write("library.csv", "id,title\n1,One\n")
//!     .run("shelf", ["list"])
//!     .unwrap();
//! assert!(out.contains("One"));
//! ```

use assert_fs::TempDir;
use assert_fs::fixture::PathChild;
use duct::Expression;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

pub struct Sandbox {
    root: TempDir,
    pub home: PathBuf,
    default_cwd: PathBuf,
    env: HashMap<String, String>,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    pub fn new() -> Self {
        let root = TempDir::new().expect("create sandbox TempDir");
        let home = root.child("home").to_path_buf();
        fs::create_dir_all(&home).expect("create home dir");
        let default_cwd = root.path().to_path_buf();

        Self {
            root,
            home,
            default_cwd,
            env: HashMap::new(),
        }
    }

    /// Absolute path to the sandbox root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    pub fn default_cwd(&self) -> &Path {
        &self.default_cwd
    }

    /// Set the working directory for commands. Relative paths are taken from the sandbox root.
    pub fn set_default_cwd<P: AsRef<Path>>(&mut self, cwd: P) -> &mut Self {
        let cwd = cwd.as_ref();
        self.default_cwd = if cwd.is_absolute() {
            cwd.to_path_buf()
        } else {
            self.root_path().join(cwd)
        };
        self
    }

    /// Write/overwrite a file relative to the sandbox root.
    pub fn write<P: AsRef<Path>, S: AsRef<[u8]>>(&mut self, rel: P, contents: S) -> &mut Self {
        let p = self.root_path().join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(p, contents).expect("write file");
        self
    }

    /// Set an extra environment variable for every command run from here on.
    pub fn env<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> &mut Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Run a binary built by this workspace and return its stdout.
    ///
    /// Errors if the process exits with a non-zero status.
    pub fn run<I>(&self, program: &str, args: I) -> Result<String, String>
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        self.bin(program, args)
            .read()
            .map_err(|e| format!("command failed: {e}"))
    }

    /// Run a workspace binary and render exit code, stdout and stderr for a snapshot.
    ///
    /// Never fails on a non-zero exit; the code is part of the output.
    pub fn snapshot_run<I>(&self, program: &str, args: I) -> String
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let output = self
            .bin(program, args)
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .expect("spawn command");

        let code = output
            .status
            .code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let root = self.root_path().to_string_lossy();

        format!("Exit Code: {code}\n--- STDOUT ---\n{stdout}--- STDERR ---\n{stderr}")
            .replace(root.as_ref(), "<SANDBOX>")
    }

    fn bin<I>(&self, program: &str, args: I) -> Expression
    where
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let cargo_bin_path = assert_cmd::cargo::cargo_bin(program)
            .to_string_lossy()
            .to_string();
        let args: Vec<_> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_string_lossy().to_string())
            .collect();

        let expr = duct::cmd(cargo_bin_path, args).dir(&self.default_cwd);
        self.inject_env(expr)
    }

    pub fn inject_env(&self, expr: Expression) -> Expression {
        let mut env_map: HashMap<String, String> = HashMap::new();
        if let Ok(path) = std::env::var("PATH") {
            env_map.insert("PATH".into(), path);
        }
        env_map.insert("HOME".into(), self.home.to_string_lossy().into_owned());
        env_map.insert("NO_COLOR".into(), "1".into());
        env_map.insert("CLICOLOR".into(), "0".into());
        for (key, value) in &self.env {
            env_map.insert(key.clone(), value.clone());
        }

        expr.full_env(&env_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parents() {
        let mut sb = Sandbox::new();
        sb.write("data/nested/library.csv", "id\n1\n");
        let written = fs::read_to_string(sb.root_path().join("data/nested/library.csv")).unwrap();
        assert_eq!(written, "id\n1\n");
    }

    #[test]
    fn test_set_default_cwd_is_relative_to_root() {
        let mut sb = Sandbox::new();
        sb.set_default_cwd("data");
        assert_eq!(sb.default_cwd(), sb.root_path().join("data"));
    }
}
