//! Scripted invoker shared by the engine's unit tests.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::LintError;
use crate::invocation::{Invoke, RawOutput};
use crate::types::InvocationConfig;

/// Answers each target with canned output, or a spawn failure.
#[derive(Default)]
pub(crate) struct ScriptedInvoker {
    responses: Mutex<HashMap<PathBuf, Option<String>>>,
    calls: Mutex<Vec<PathBuf>>,
}

impl ScriptedInvoker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, target: &Path, tags: &[String]) -> Self {
        self.set(target, &tags.join("\n"));
        self
    }

    pub(crate) fn fail(self, target: &Path) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(target.to_path_buf(), None);
        self
    }

    pub(crate) fn set(&self, target: &Path, raw: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(target.to_path_buf(), Some(raw.to_string()));
    }

    pub(crate) fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

impl Invoke for ScriptedInvoker {
    async fn invoke(
        &self,
        targets: &[PathBuf],
        _config: &InvocationConfig,
    ) -> Result<RawOutput, LintError> {
        let target = targets.first().cloned().unwrap_or_default();
        self.calls.lock().unwrap().push(target.clone());
        let response = self.responses.lock().unwrap().get(&target).cloned();
        match response {
            Some(None) => Err(LintError::Spawn {
                program: PathBuf::from("fake-lint"),
                source: io::Error::new(io::ErrorKind::NotFound, "scripted spawn failure"),
            }),
            Some(Some(stdout)) => Ok(RawOutput {
                stdout,
                stderr: String::new(),
                exit_code: Some(0),
            }),
            None => Ok(RawOutput {
                exit_code: Some(0),
                ..RawOutput::default()
            }),
        }
    }
}

/// One structured issue tag.
pub(crate) fn issue(file: &str, line: &str, code: &str, desc: &str) -> String {
    format!(r#"<issue file="{file}" line="{line}" number="{code}" desc="{desc}"/>"#)
}

/// Config whose executable exists and whose root is `root`.
pub(crate) fn fake_config(root: &Path) -> InvocationConfig {
    let exe = root.join("fake-lint");
    std::fs::write(&exe, "").unwrap();
    let mut config = InvocationConfig::new(exe);
    config.repository_root = Some(root.to_path_buf());
    config
}
