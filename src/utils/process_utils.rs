//! Helpers for running the bundled Python flasher scripts

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::errors::{FlasherError, Result};
use crate::progress::ProgressHub;

/// Script that downloads and writes a firmware image
pub const FLASHER_SCRIPT: &str = "ncd_flasher.py";
/// esptool entry point shipped next to the flasher script
pub const ESPTOOL_SCRIPT: &str = "esptool.py";

/// Default Python interpreter name for the current platform
pub fn default_python() -> &'static str {
    if cfg!(target_os = "windows") {
        "python"
    } else {
        "python3"
    }
}

/// Resolve the Python interpreter, preferring an explicitly configured one
pub fn python_command(configured: Option<&str>) -> Result<PathBuf> {
    let name = configured.unwrap_or_else(|| default_python());
    which::which(name).map_err(|e| {
        FlasherError::Process(format!("Python interpreter '{}' not found: {}", name, e))
    })
}

/// Directories searched for the flasher scripts, in priority order
pub fn flasher_dir_candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = configured {
        candidates.push(dir.to_path_buf());
    }
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join("resources").join("flasher"));
    }
    candidates.push(
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("resources")
            .join("flasher"),
    );
    candidates
}

/// First candidate directory that contains `script`
pub fn find_script(candidates: &[PathBuf], script: &str) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|dir| dir.join(script))
        .find(|path| path.is_file())
}

/// Locate `script` in the configured or bundled flasher directory
pub fn locate_script(configured: Option<&Path>, script: &str) -> Result<PathBuf> {
    let candidates = flasher_dir_candidates(configured);
    find_script(&candidates, script).ok_or_else(|| {
        FlasherError::Process(format!(
            "Could not find {} in any of: {}",
            script,
            candidates
                .iter()
                .map(|dir| dir.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })
}

/// Exit status and collected output of a finished process
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub lines: Vec<String>,
}

impl ProcessOutput {
    pub fn combined(&self) -> String {
        self.lines.join("\n")
    }
}

/// Run `cmd` to completion, emitting every stdout/stderr line on `channel`
pub async fn run_streaming(
    mut cmd: Command,
    progress: &ProgressHub,
    channel: &str,
) -> Result<ProcessOutput> {
    let program = cmd.as_std().get_program().to_string_lossy().into_owned();
    log::debug!("Spawning {:?}", cmd.as_std());

    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| FlasherError::Process(format!("Failed to execute {}: {}", program, e)))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| FlasherError::Process("stdout was not captured".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| FlasherError::Process("stderr was not captured".to_string()))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_line_reader(stdout, tx.clone());
    spawn_line_reader(stderr, tx);

    let mut lines = Vec::new();
    while let Some(line) = rx.recv().await {
        progress.emit(channel, line.clone());
        lines.push(line);
    }

    let status = child
        .wait()
        .await
        .map_err(|e| FlasherError::Process(format!("Failed to wait for process: {}", e)))?;
    log::debug!("{} exited with {}", program, status);

    Ok(ProcessOutput { status, lines })
}

/// Forward each line of `reader` to `tx`.
///
/// Invalid UTF-8 is replaced instead of ending the stream.
fn spawn_line_reader<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\n', '\r']).to_string();
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::debug!("Stopped reading process output: {}", e);
                    break;
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_script_prefers_first_candidate() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        std::fs::write(first.path().join(FLASHER_SCRIPT), "print('x')").unwrap();
        std::fs::write(second.path().join(FLASHER_SCRIPT), "print('y')").unwrap();

        let candidates = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(
            find_script(&candidates, FLASHER_SCRIPT),
            Some(first.path().join(FLASHER_SCRIPT))
        );
    }

    #[test]
    fn test_find_script_skips_directories_without_it() {
        let empty = TempDir::new().unwrap();
        let bundled = TempDir::new().unwrap();
        std::fs::write(bundled.path().join(ESPTOOL_SCRIPT), "").unwrap();

        let candidates = vec![empty.path().to_path_buf(), bundled.path().to_path_buf()];
        assert_eq!(
            find_script(&candidates, ESPTOOL_SCRIPT),
            Some(bundled.path().join(ESPTOOL_SCRIPT))
        );
        assert_eq!(find_script(&candidates, FLASHER_SCRIPT), None);
    }

    #[test]
    fn test_configured_dir_is_searched_first() {
        let dir = Path::new("/opt/ncd/flasher");
        let candidates = flasher_dir_candidates(Some(dir));
        assert_eq!(candidates.first().map(PathBuf::as_path), Some(dir));
        assert!(candidates.len() >= 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_streaming_emits_lines() {
        let hub = ProgressHub::new();
        let mut sub = hub.listen("flash-output").unwrap();

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo Connecting...; echo 'Status: Success'");
        let output = run_streaming(cmd, &hub, "flash-output").await.unwrap();

        assert!(output.status.success());
        assert_eq!(output.lines, vec!["Connecting...", "Status: Success"]);
        assert!(output.combined().contains("Status: Success"));
        assert_eq!(sub.try_next_line().as_deref(), Some("Connecting..."));
        assert_eq!(sub.try_next_line().as_deref(), Some("Status: Success"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_streaming_survives_invalid_utf8() {
        let hub = ProgressHub::new();

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg("echo Connecting...; printf 'bad \\377 byte\\n'; echo 'Status: Success'");
        let output = run_streaming(cmd, &hub, "flash-output").await.unwrap();

        assert!(output.status.success());
        assert_eq!(output.lines.len(), 3);
        assert_eq!(output.lines[1], "bad \u{FFFD} byte");
        assert_eq!(output.lines[2], "Status: Success");
    }
}
