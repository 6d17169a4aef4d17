use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{DubsyncError, Result};

/// Pitch-preserving change of audio duration.
///
/// `ratio` is target duration over current duration: 2.0 doubles the length.
#[async_trait]
pub trait TimeStretcher: Send + Sync {
    async fn stretch(&self, input: &Path, output: &Path, ratio: f64) -> Result<()>;
    fn name(&self) -> &'static str;
    async fn is_available(&self) -> bool;
}

/// Time stretching through the `rubberband` command line tool.
pub struct RubberbandStretcher {
    program: String,
}

impl Default for RubberbandStretcher {
    fn default() -> Self {
        Self::new("rubberband")
    }
}

impl RubberbandStretcher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn not_found(&self, e: std::io::Error) -> DubsyncError {
        DubsyncError::ToolNotFound {
            tool: self.program.clone(),
            hint: format!(
                "Install with: brew install rubberband (macOS) or apt install rubberband-cli (Linux) ({e})"
            ),
        }
    }
}

#[async_trait]
impl TimeStretcher for RubberbandStretcher {
    async fn stretch(&self, input: &Path, output: &Path, ratio: f64) -> Result<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        debug!("rubberband -t {} {:?} -> {:?}", ratio, input, output);

        let result = Command::new(&self.program)
            .arg("-t")
            .arg(ratio.to_string())
            .arg(input)
            .arg(output)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => self.not_found(e),
                _ => DubsyncError::Io(e),
            })?;

        if !result.status.success() {
            return Err(DubsyncError::ToolFailed {
                tool: self.program.clone(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "rubberband"
    }

    async fn is_available(&self) -> bool {
        // Only spawning matters; the exit code of --version differs between releases.
        Command::new(&self.program)
            .arg("--version")
            .output()
            .await
            .is_ok()
    }
}
