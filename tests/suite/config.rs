//! Config file to lint run, without the CLI in between.

#![cfg(unix)]

use std::sync::Arc;

use lintrun_config::{CONFIG_FILE_NAME, LintrunConfig};
use lintrun_lint::{Linter, TracingOutput};
use lintrun_types::ReportFormat;

use crate::common::{Project, issue_tag};

#[tokio::test]
async fn config_file_drives_a_lint_run() {
    let project = Project::new();
    let exe = project.fake_tool();
    project.write("inc/.keep", "");
    project.write(
        CONFIG_FILE_NAME,
        &format!(
            r#"
[tool]
executable = "{}"
include_paths = ["inc"]
definitions = ["FROM_CONFIG"]
repository_root = "."
output_format = "text"

[diagnostics]
source_tag = "pclint"
system_header_markers = ["/sdk/"]

[editor]
lint_on_save = true
file_extensions = ["c"]
"#,
            exe.display()
        ),
    );
    let main = project.source_with_report(
        "main.c",
        &[
            issue_tag("main.c", 3, "530", "warning: x"),
            issue_tag("/sdk/include/std.h", 1, "1", "ignored"),
        ],
    );

    let loaded = LintrunConfig::load(None, project.root()).unwrap();
    assert_eq!(loaded.path, Some(project.path(CONFIG_FILE_NAME)));
    let invocation = loaded.config.invocation_config(&loaded.base_dir(project.root()));
    assert_eq!(invocation.output_format, ReportFormat::Text);

    let trigger = loaded.config.save_trigger();
    let mut linter = Linter::new(loaded.config.classifier_settings(), Arc::new(TracingOutput));
    let outcome = linter
        .on_file_saved(&main, &invocation, &trigger)
        .await
        .expect("a .c save triggers a lint")
        .unwrap();

    assert_eq!(outcome.counts.source, 1);
    assert_eq!(outcome.counts.system, 1);
    let entries = linter.diagnostics(&main, project.root());
    assert_eq!(entries[0].source(), "pclint");

    let options = project.options_seen();
    assert!(!options.contains("+xml"));
    assert!(options.contains("-dFROM_CONFIG"));
    assert!(options.contains("inc\""));
}
