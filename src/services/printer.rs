//! Printer gateway: hands a rendered PDF to the operating system's print
//! subsystem.
//!
//! - macOS / Linux: CUPS `lp`
//! - Windows: SumatraPDF bundled next to the executable

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, instrument};

/// Capability to submit a document to a named output device.
#[async_trait::async_trait]
pub trait PrinterGateway: Send + Sync {
    async fn submit(&self, printer: &str, job_name: &str, document: &[u8]) -> Result<(), PrintError>;
}

/// Gateway backed by the system print command.
#[derive(Debug, Clone, Default)]
pub struct SystemPrinter {
    sumatra_path: Option<PathBuf>,
}

impl SystemPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the SumatraPDF location (Windows only).
    pub fn with_sumatra_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sumatra_path = Some(path.into());
        self
    }

    fn print_command(&self, printer: &str, job_name: &str, file: &Path) -> Result<Command, PrintError> {
        if cfg!(windows) {
            let sumatra = match &self.sumatra_path {
                Some(path) => path.clone(),
                None => std::env::current_exe()?
                    .parent()
                    .map(|dir| dir.join("SumatraPDF.exe"))
                    .ok_or_else(|| PrintError::Unavailable("executable has no parent directory".into()))?,
            };
            if !sumatra.exists() {
                return Err(PrintError::Unavailable(format!(
                    "SumatraPDF.exe not found at {}",
                    sumatra.display()
                )));
            }
            let mut cmd = Command::new(sumatra);
            cmd.arg("-print-to").arg(printer).arg("-silent").arg(file);
            Ok(cmd)
        } else {
            let mut cmd = Command::new("lp");
            cmd.arg("-d").arg(printer).arg("-t").arg(job_name).arg(file);
            Ok(cmd)
        }
    }
}

/// File name used for the spooled document.
fn spool_file_name(job_name: &str) -> String {
    let stem: String = job_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{}.pdf", stem)
}

#[async_trait::async_trait]
impl PrinterGateway for SystemPrinter {
    #[instrument(skip(self, document), fields(bytes = document.len()))]
    async fn submit(&self, printer: &str, job_name: &str, document: &[u8]) -> Result<(), PrintError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(spool_file_name(job_name));
        tokio::fs::write(&path, document).await?;

        let output = self.print_command(printer, job_name, &path)?.output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(PrintError::Rejected {
                code: output.status.code(),
                stderr,
            });
        }

        debug!("Document accepted by print subsystem");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    #[error("Print I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Print command failed (exit code {code:?}): {stderr}")]
    Rejected { code: Option<i32>, stderr: String },

    #[error("Print subsystem unavailable: {0}")]
    Unavailable(String),

    #[error("PDF document is not valid base64: {0}")]
    Undecodable(#[from] base64::DecodeError),
}
