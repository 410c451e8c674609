use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::billing::Invoice;
use crate::templates;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Could not run the generator: {source}")]
    Spawn { source: io::Error },

    #[error("Generator exited with {status}")]
    Failed { status: ExitStatus },

    #[error("Generator did not write the HTML invoice to {}", path.display())]
    Incomplete { path: PathBuf },

    #[error("Template Error: {source}")]
    Template {
        #[from]
        source: askama::Error,
    },
}

/// Runs a content generation request and returns its event stream.
pub trait Generator {
    fn run(
        &self,
        model: &str,
        dir: &Path,
        prompt: &str,
    ) -> Result<Vec<u8>, GenerateError>;
}

pub struct Opencode {
    program: PathBuf,
}

impl Default for Opencode {
    fn default() -> Self {
        Self {
            program: "opencode".into(),
        }
    }
}

impl Generator for Opencode {
    fn run(
        &self,
        model: &str,
        dir: &Path,
        prompt: &str,
    ) -> Result<Vec<u8>, GenerateError> {
        let output = Command::new(&self.program)
            .args(["run", "--model", model, "--format", "json", "--dir"])
            .arg(dir)
            .arg(prompt)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| GenerateError::Spawn { source })?;

        if !output.status.success() {
            return Err(GenerateError::Failed {
                status: output.status,
            });
        }
        Ok(output.stdout)
    }
}

/// Ask the generator for an HTML invoice at `output_path` and confirm it
/// was written.
pub fn html(
    generator: &dyn Generator,
    invoice: &Invoice,
    model: &str,
    output_path: &Path,
) -> Result<(), GenerateError> {
    let prompt = templates::prompt(invoice, output_path)?;
    let dir = output_path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    info!("generating {} with {}", output_path.display(), model);
    let events = generator.run(model, dir, &prompt)?;
    confirm_written(&events, output_path)
}

#[derive(Deserialize)]
struct Event {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    part: serde_json::Value,
}

#[derive(Deserialize)]
struct ToolPart {
    tool: String,
    state: ToolState,
}

#[derive(Deserialize)]
struct ToolState {
    status: String,
    #[serde(default)]
    input: serde_json::Value,
}

#[derive(Deserialize)]
struct WriteInput {
    #[serde(rename = "filePath")]
    file_path: PathBuf,
}

fn completed_write(line: &str) -> Result<Option<PathBuf>, serde_json::Error> {
    let event: Event = serde_json::from_str(line)?;
    if event.kind != "tool_use" {
        return Ok(None);
    }
    let part: ToolPart = serde_json::from_value(event.part)?;
    if part.tool != "write" || part.state.status != "completed" {
        return Ok(None);
    }
    let input: WriteInput = serde_json::from_value(part.state.input)?;
    Ok(Some(input.file_path))
}

/// Scan the event stream for a completed write to `expected`, falling back
/// to the file existing on disk. Lines that fail to parse are skipped.
pub fn confirm_written(
    events: &[u8],
    expected: &Path,
) -> Result<(), GenerateError> {
    for line in String::from_utf8_lossy(events).lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match completed_write(line) {
            Ok(Some(path)) if path == expected => {
                debug!("write to {} confirmed by event", expected.display());
                return Ok(());
            }
            Ok(_) => {}
            Err(error) => debug!("skipping event line: {}", error),
        }
    }

    if expected.exists() {
        debug!("{} found on disk", expected.display());
        return Ok(());
    }

    Err(GenerateError::Incomplete {
        path: expected.to_path_buf(),
    })
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::templates::tests::sample_invoice;
    use const_format::formatcp;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::{tempdir, NamedTempFile};

    const TARGET: &str = "/nonexistent/invoice-acme-corp-2025-01.html";

    const WRITE_EVENT: &str = formatcp!(
        r#"{{"type":"tool_use","part":{{"tool":"write","state":{{"status":"completed","input":{{"filePath":"{}"}},"output":""}}}}}}"#,
        TARGET
    );

    pub fn write_event(path: &Path, status: &str) -> String {
        serde_json::json!({
            "type": "tool_use",
            "part": {
                "tool": "write",
                "state": {
                    "status": status,
                    "input": { "filePath": path },
                    "output": "",
                },
            },
        })
        .to_string()
    }

    #[test]
    fn confirmed_by_write_event() {
        confirm_written(WRITE_EVENT.as_bytes(), Path::new(TARGET)).unwrap();
    }

    #[test]
    fn other_path_is_not_confirmation() {
        let line = write_event(Path::new("/nonexistent/other.html"), "completed");
        assert!(matches!(
            confirm_written(line.as_bytes(), Path::new(TARGET)),
            Err(GenerateError::Incomplete { .. })
        ));
    }

    #[test]
    fn unfinished_write_is_not_confirmation() {
        let line = write_event(Path::new(TARGET), "error");
        assert!(confirm_written(line.as_bytes(), Path::new(TARGET)).is_err());
    }

    #[test]
    fn other_tools_are_ignored() {
        let line = WRITE_EVENT.replace(r#""tool":"write""#, r#""tool":"read""#);
        assert!(confirm_written(line.as_bytes(), Path::new(TARGET)).is_err());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let stream = format!(
            "not json\n{{\"type\":\"step_start\"}}\n\
             {{\"type\":\"tool_use\",\"part\":42}}\n\n{}\n",
            WRITE_EVENT
        );
        confirm_written(stream.as_bytes(), Path::new(TARGET)).unwrap();
    }

    #[test]
    fn falls_back_to_file_on_disk() {
        let file = NamedTempFile::new().unwrap();
        confirm_written(b"", file.path()).unwrap();
    }

    #[test]
    fn nothing_written_is_incomplete() {
        let error = confirm_written(b"", Path::new(TARGET)).unwrap_err();
        assert!(error.to_string().contains(TARGET));
    }

    /// Writes the requested file and reports it like opencode does.
    pub struct FakeGenerator {
        pub calls: RefCell<Vec<(String, PathBuf)>>,
        pub write: bool,
    }

    impl FakeGenerator {
        pub fn new(write: bool) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                write,
            }
        }
    }

    impl Generator for FakeGenerator {
        fn run(
            &self,
            model: &str,
            dir: &Path,
            prompt: &str,
        ) -> Result<Vec<u8>, GenerateError> {
            self.calls
                .borrow_mut()
                .push((model.to_string(), dir.to_path_buf()));
            let path = prompt
                .lines()
                .next()
                .and_then(|l| l.rsplit("to the file: ").next())
                .map(PathBuf::from)
                .unwrap_or_default();
            if !self.write {
                return Ok(b"{\"type\":\"step_finish\"}\n".to_vec());
            }
            fs::write(&path, "<html></html>").unwrap();
            Ok(write_event(&path, "completed").into_bytes())
        }
    }

    #[test]
    fn generates_with_model_in_output_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invoice.html");
        let generator = FakeGenerator::new(true);

        html(&generator, &sample_invoice(), "some/model", &path).unwrap();

        assert!(path.exists());
        let calls = generator.calls.borrow();
        assert_eq!(
            *calls,
            vec![("some/model".to_string(), dir.path().to_path_buf())]
        );
    }

    #[test]
    fn reports_missing_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invoice.html");
        let generator = FakeGenerator::new(false);

        assert!(matches!(
            html(&generator, &sample_invoice(), "some/model", &path),
            Err(GenerateError::Incomplete { .. })
        ));
    }
}
