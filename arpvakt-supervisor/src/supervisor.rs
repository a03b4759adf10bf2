//! Detector lifecycle supervision.
//!
//! The supervisor owns the only handle to the external detector process
//! and is the only component allowed to mutate it. `reconcile` compares
//! the persisted toggle with the in-memory handle and issues at most one
//! corrective action, so back-to-back invocations from rapid setting
//! changes stay safe.

use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, error, info, trace, warn};

use arpvakt_config::DetectorConfig;
use arpvakt_core::types::DetectorState;
use arpvakt_storage::SettingsStore;
use arpvakt_telemetry::MetricsRecorder;

use crate::error::SupervisorError;
use crate::noise::is_benign_stderr;

/// The supervisor's belief about a live child process.
#[derive(Debug)]
struct DetectorHandle {
    /// Missing only if the child was reaped before `id()` was read; a
    /// handle without a pid is cleared without signalling (pid 0 would
    /// address the caller's own process group).
    pid: Option<u32>,
    /// Ties the exit watcher to the spawn that created it, so a watcher
    /// for an already-stopped process never clears a newer handle.
    generation: u64,
}

#[derive(Debug)]
struct Shared {
    handle: Option<DetectorHandle>,
    state: DetectorState,
}

/// Keeps the external detector's running/stopped state synchronized with
/// the persisted settings toggle.
pub struct DetectorSupervisor {
    config: DetectorConfig,
    settings: Arc<dyn SettingsStore>,
    metrics: Arc<MetricsRecorder>,
    shared: Arc<Mutex<Shared>>,
    generation: AtomicU64,
}

impl DetectorSupervisor {
    pub fn new(
        config: DetectorConfig,
        settings: Arc<dyn SettingsStore>,
        metrics: Arc<MetricsRecorder>,
    ) -> Self {
        Self {
            config,
            settings,
            metrics,
            shared: Arc::new(Mutex::new(Shared {
                handle: None,
                state: DetectorState::Stopped,
            })),
            generation: AtomicU64::new(0),
        }
    }

    /// Read the persisted toggle (creating it disabled when absent) and
    /// match the process state to it. Idempotent: when desired state
    /// already matches actual state nothing happens.
    pub async fn reconcile(&self) -> Result<(), SupervisorError> {
        let setting = self.settings.load_or_create().await?;
        debug!(enabled = setting.enabled, "Reconciling detector state");
        if setting.enabled {
            self.start()
        } else {
            self.stop();
            Ok(())
        }
    }

    /// Launch the detector child process. A no-op while a handle is held;
    /// the lock spans the spawn, so a start already in flight counts as
    /// already running.
    pub fn start(&self) -> Result<(), SupervisorError> {
        let mut shared = self.shared.lock();
        if shared.handle.is_some() {
            debug!("Detector already running; start is a no-op");
            return Ok(());
        }

        shared.state = DetectorState::Starting;
        let mut child = match Command::new(&self.config.command)
            .args(&self.config.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                shared.state = DetectorState::Stopped;
                error!(
                    command = %self.config.command,
                    "Failed to spawn detector: {e}"
                );
                return Err(SupervisorError::Spawn(e));
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let pid = child.id();

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_stdout(stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(stderr));
        }
        tokio::spawn(watch_exit(child, generation, Arc::clone(&self.shared)));

        shared.handle = Some(DetectorHandle { pid, generation });
        shared.state = DetectorState::Running;
        self.metrics.detector_spawns.inc();
        info!(pid = ?pid, "Detector started");
        Ok(())
    }

    /// Request graceful termination and clear the handle immediately.
    /// Does not wait for exit confirmation; a failed signal still clears
    /// the handle so the next reconcile can resolve the leftover state.
    pub fn stop(&self) {
        let taken = {
            let mut shared = self.shared.lock();
            let taken = shared.handle.take();
            if taken.is_some() {
                shared.state = DetectorState::Stopped;
            }
            taken
        };

        let Some(handle) = taken else {
            debug!("Detector not running; stop is a no-op");
            return;
        };

        self.metrics.detector_terminations.inc();
        let Some(pid) = handle.pid else {
            warn!("Detector pid unknown; handle cleared without signal");
            return;
        };
        match terminate(pid) {
            Ok(()) => info!(pid, "Detector stop requested"),
            Err(e) => warn!(pid, "Failed to deliver termination signal: {e}"),
        }
    }

    pub fn state(&self) -> DetectorState {
        self.shared.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().handle.is_some()
    }
}

/// Deliver SIGTERM; the detector installs its own handlers and exits.
#[cfg(unix)]
fn terminate(pid: u32) -> std::io::Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
        .map_err(|errno| std::io::Error::from_raw_os_error(errno as i32))
}

#[cfg(not(unix))]
fn terminate(_pid: u32) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "graceful termination requires unix signals",
    ))
}

/// Detector stdout is forwarded verbatim.
async fn forward_stdout<R: AsyncRead + Unpin>(stdout: R) {
    let mut lines = BufReader::new(stdout).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        info!(target: "detector", "{line}");
    }
}

/// Detector stderr passes the fixed noise filter before being logged.
async fn forward_stderr<R: AsyncRead + Unpin>(stderr: R) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if is_benign_stderr(&line) {
            trace!(target: "detector", "{line}");
        } else {
            error!(target: "detector", "{line}");
        }
    }
}

/// Await the child's exit and log the reason. Clears the handle only when
/// the exit is unsolicited (an explicit stop has already cleared it).
/// No auto-restart: recovery happens on the next setting change.
async fn watch_exit(mut child: Child, generation: u64, shared: Arc<Mutex<Shared>>) {
    let outcome = child.wait().await;

    let mut shared = shared.lock();
    let unsolicited = matches!(&shared.handle, Some(h) if h.generation == generation);
    if unsolicited {
        shared.handle = None;
    }

    match outcome {
        Ok(status) => {
            let reason = describe_exit(&status);
            if unsolicited {
                shared.state = if status.success() {
                    DetectorState::Stopped
                } else {
                    DetectorState::Crashed
                };
                warn!("Detector exited unexpectedly ({reason})");
            } else {
                info!("Detector exited ({reason})");
            }
        }
        Err(e) => {
            if unsolicited {
                shared.state = DetectorState::Crashed;
            }
            error!("Failed to observe detector exit: {e}");
        }
    }
}

fn describe_exit(status: &std::process::ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exit code {code}");
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("signal {signal}");
        }
    }
    "unknown exit reason".into()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use arpvakt_storage::MemoryStore;
    use std::time::Duration;

    fn supervisor_for(command: &str, args: &[&str]) -> (DetectorSupervisor, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new(64));
        let config = DetectorConfig {
            command: command.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        };
        let sup = DetectorSupervisor::new(
            config,
            store.clone() as Arc<dyn SettingsStore>,
            Arc::new(MetricsRecorder::new()),
        );
        (sup, store)
    }

    #[tokio::test]
    async fn start_twice_spawns_once() {
        let (sup, _store) = supervisor_for("sleep", &["5"]);
        sup.start().unwrap();
        sup.start().unwrap();
        assert!(sup.is_running());
        assert_eq!(sup.metrics.detector_spawns.get() as u64, 1);
        sup.stop();
        assert!(!sup.is_running());
        assert_eq!(sup.metrics.detector_terminations.get() as u64, 1);
    }

    #[tokio::test]
    async fn stop_when_stopped_is_noop() {
        let (sup, _store) = supervisor_for("sleep", &["5"]);
        sup.stop();
        assert_eq!(sup.metrics.detector_terminations.get() as u64, 0);
        assert_eq!(sup.state(), DetectorState::Stopped);
    }

    #[tokio::test]
    async fn stop_without_pid_clears_handle_without_signal() {
        let (sup, _store) = supervisor_for("sleep", &["5"]);
        {
            let mut shared = sup.shared.lock();
            shared.handle = Some(DetectorHandle {
                pid: None,
                generation: 1,
            });
            shared.state = DetectorState::Running;
        }
        sup.stop();
        assert!(!sup.is_running());
        assert_eq!(sup.state(), DetectorState::Stopped);
        assert_eq!(sup.metrics.detector_terminations.get() as u64, 1);
    }

    #[tokio::test]
    async fn spawn_failure_leaves_handle_unset() {
        let (sup, _store) = supervisor_for("/nonexistent/arpvakt-detector", &[]);
        assert!(matches!(sup.start(), Err(SupervisorError::Spawn(_))));
        assert!(!sup.is_running());
        assert_eq!(sup.state(), DetectorState::Stopped);
        assert_eq!(sup.metrics.detector_spawns.get() as u64, 0);
    }

    #[tokio::test]
    async fn reconcile_follows_setting() {
        let (sup, store) = supervisor_for("sleep", &["5"]);

        // First reconcile lazily creates the record disabled.
        sup.reconcile().await.unwrap();
        assert!(!sup.is_running());
        assert!(!store.load_or_create().await.unwrap().enabled);

        store.set_enabled(true).await.unwrap();
        sup.reconcile().await.unwrap();
        sup.reconcile().await.unwrap();
        assert!(sup.is_running());
        assert_eq!(sup.metrics.detector_spawns.get() as u64, 1);

        store.set_enabled(false).await.unwrap();
        sup.reconcile().await.unwrap();
        sup.reconcile().await.unwrap();
        assert!(!sup.is_running());
        assert_eq!(sup.metrics.detector_terminations.get() as u64, 1);
    }

    #[tokio::test]
    async fn unsolicited_clean_exit_returns_to_stopped() {
        let (sup, _store) = supervisor_for("true", &[]);
        sup.start().unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!sup.is_running());
        assert_eq!(sup.state(), DetectorState::Stopped);
    }

    #[tokio::test]
    async fn unsolicited_crash_marks_crashed() {
        let (sup, _store) = supervisor_for("sh", &["-c", "exit 3"]);
        sup.start().unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!sup.is_running());
        assert_eq!(sup.state(), DetectorState::Crashed);
    }
}
