//! Shared test utilities and fixtures
//!
//! A throwaway project directory plus a shell script standing in for the
//! external analysis tool. The script prints `<target>.report` for every
//! `.c` target it is given and copies the option file it received to
//! `last-options.txt` in its working directory.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use lintrun_lint::InvocationConfig;
use lintrun_types::ReportFormat;
use tempfile::TempDir;

pub const OPTIONS_COPY: &str = "last-options.txt";

const FAKE_TOOL: &str = r#"#!/bin/sh
status=0
for arg in "$@"; do
  case "$arg" in
    *lintrun-*.lnt) cat "$arg" > last-options.txt ;;
    *.c)
      if [ -f "$arg.report" ]; then cat "$arg.report"; fi
      if [ -f "$arg.stderr" ]; then cat "$arg.stderr" 1>&2; fi
      if [ -f "$arg.status" ]; then status=$(cat "$arg.status"); fi
      ;;
  esac
done
exit $status
"#;

pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// A source file plus the report the fake tool prints for it.
    pub fn source_with_report(&self, rel: &str, tags: &[String]) -> PathBuf {
        self.write(&format!("{rel}.report"), &(tags.join("\n") + "\n"));
        self.write(rel, "int main(void) { return 0; }\n")
    }

    /// Make the fake tool exit with `status` for `rel`.
    pub fn exit_status(&self, rel: &str, status: i32) {
        self.write(&format!("{rel}.status"), &status.to_string());
    }

    pub fn stderr_for(&self, rel: &str, text: &str) {
        self.write(&format!("{rel}.stderr"), text);
    }

    #[cfg(unix)]
    pub fn fake_tool(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.write("bin/fake-lint", FAKE_TOOL);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    pub fn config(&self) -> InvocationConfig {
        let mut config = InvocationConfig::new(self.fake_tool());
        config.repository_root = Some(self.root().to_path_buf());
        config.output_format = ReportFormat::Xml;
        config
    }

    pub fn options_seen(&self) -> String {
        fs::read_to_string(self.path(OPTIONS_COPY)).unwrap_or_default()
    }
}

/// One structured issue tag as the tool prints it.
pub fn issue_tag(file: &str, line: u32, number: &str, desc: &str) -> String {
    format!(r#"<issue file="{file}" line="{line}" number="{number}" desc="{desc}"/>"#)
}
