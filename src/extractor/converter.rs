use crate::config::{ConvertConfig, INPUT_PLACEHOLDER, OUTDIR_PLACEHOLDER};
use crate::error::ExtractError;
use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;
use wait_timeout::ChildExt;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const MAX_STDERR_CHARS: usize = 200;

/// Turns a legacy Word document into an equivalent `.docx`.
pub trait DocConverter {
    /// Convert `legacy`, returning the path of the produced modern document.
    fn convert(&self, legacy: &Path) -> Result<PathBuf, ExtractError>;
}

/// Sibling path the converted document is expected at: same directory,
/// same stem, `.docx` extension.
pub fn converted_path(legacy: &Path) -> PathBuf {
    legacy.with_extension("docx")
}

/// Runs an external headless converter (LibreOffice by default).
///
/// The child is bounded by a timeout and killed if the shared running flag
/// is cleared while it is still working. The converted file is left on disk.
pub struct CommandConverter {
    command: String,
    args: Vec<String>,
    timeout: Duration,
    running: Option<Arc<AtomicBool>>,
}

impl CommandConverter {
    pub fn new<S: Into<String>>(command: S, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            timeout: Duration::from_secs(120),
            running: None,
        }
    }

    pub fn from_config(config: &ConvertConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
            .with_timeout(Duration::from_secs(config.timeout))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_running_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = Some(running);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.load(Ordering::SeqCst))
    }

    fn build_args(&self, legacy: &Path, outdir: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(|arg| match arg.as_str() {
                INPUT_PLACEHOLDER => legacy.as_os_str().to_os_string(),
                OUTDIR_PLACEHOLDER => outdir.as_os_str().to_os_string(),
                _ => OsString::from(
                    arg.replace(INPUT_PLACEHOLDER, &legacy.to_string_lossy())
                        .replace(OUTDIR_PLACEHOLDER, &outdir.to_string_lossy()),
                ),
            })
            .collect()
    }

    fn wait_for_exit(
        &self,
        child: &mut Child,
        stderr: StderrCapture,
        legacy: &Path,
    ) -> Result<(), ExtractError> {
        let deadline = Instant::now() + self.timeout;

        let status = loop {
            if self.is_cancelled() {
                stop(child);
                return Err(ExtractError::ConversionCancelled {
                    path: legacy.to_path_buf(),
                });
            }

            let now = Instant::now();
            if now >= deadline {
                stop(child);
                return Err(ExtractError::ConversionTimedOut {
                    path: legacy.to_path_buf(),
                    seconds: self.timeout.as_secs(),
                });
            }

            match child.wait_timeout((deadline - now).min(POLL_INTERVAL)) {
                Ok(Some(status)) => break status,
                Ok(None) => continue,
                Err(e) => {
                    stop(child);
                    return Err(ExtractError::ConversionFailed {
                        path: legacy.to_path_buf(),
                        reason: format!("failed to wait for {}: {}", self.command, e),
                    });
                }
            }
        };

        if status.success() {
            return Ok(());
        }

        let stderr = stderr.finish();
        Err(ExtractError::ConversionFailed {
            path: legacy.to_path_buf(),
            reason: match status.code() {
                Some(code) if stderr.is_empty() => format!("{} exited with status {}", self.command, code),
                Some(code) => format!("{} exited with status {}: {}", self.command, code, stderr),
                None => format!("{} was terminated by a signal", self.command),
            },
        })
    }
}

/// Drains the child's stderr on its own thread so a chatty converter can
/// never fill the pipe and stall. Keeps the first few hundred characters.
struct StderrCapture {
    reader: Option<JoinHandle<String>>,
}

impl StderrCapture {
    fn spawn(stderr: Option<ChildStderr>) -> Self {
        let reader = stderr.map(|mut pipe| {
            thread::spawn(move || {
                let mut bytes = Vec::new();
                let mut chunk = [0u8; 8192];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if bytes.len() < MAX_STDERR_CHARS * 4 {
                                bytes.extend_from_slice(&chunk[..n]);
                            }
                        }
                    }
                }
                String::from_utf8_lossy(&bytes).into_owned()
            })
        });

        Self { reader }
    }

    /// Join the reader once the child has exited. Only called after a
    /// normal exit; a killed child's reader is left to finish on its own.
    fn finish(self) -> String {
        let text = self
            .reader
            .and_then(|reader| reader.join().ok())
            .unwrap_or_default();
        text.trim().chars().take(MAX_STDERR_CHARS).collect()
    }
}

impl DocConverter for CommandConverter {
    fn convert(&self, legacy: &Path) -> Result<PathBuf, ExtractError> {
        let outdir = legacy
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        debug!(command = %self.command, path = %legacy.display(), "converting legacy document");

        let mut child = Command::new(&self.command)
            .args(self.build_args(legacy, outdir))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ExtractError::ConverterUnavailable {
                    command: self.command.clone(),
                },
                _ => ExtractError::ConversionFailed {
                    path: legacy.to_path_buf(),
                    reason: format!("failed to start {}: {}", self.command, e),
                },
            })?;

        let stderr = StderrCapture::spawn(child.stderr.take());
        self.wait_for_exit(&mut child, stderr, legacy)?;

        let output = converted_path(legacy);
        if !output.is_file() {
            return Err(ExtractError::ConversionFailed {
                path: legacy.to_path_buf(),
                reason: format!("{} did not produce {}", self.command, output.display()),
            });
        }

        Ok(output)
    }
}

fn stop(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Used when legacy conversion is switched off: every conversion fails and
/// the file keeps its Word classification with absent dates.
pub struct DisabledConverter;

impl DocConverter for DisabledConverter {
    fn convert(&self, legacy: &Path) -> Result<PathBuf, ExtractError> {
        Err(ExtractError::ConversionFailed {
            path: legacy.to_path_buf(),
            reason: "legacy document conversion is disabled".to_string(),
        })
    }
}
