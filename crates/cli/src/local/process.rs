// Path: crates/cli/src/local/process.rs

//! Node process supervision.
//!
//! The orchestrator depends only on [`NodeProcess`], so the local OS-process
//! backend can be swapped for an in-memory fake in tests.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use netrunner_types::{LocalNodeConfig, NodeConfig};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command as TokioCommand};
use tokio::sync::{watch, Mutex};
use tokio::time::timeout;

/// How long a stopped node may take to exit before it is killed.
pub const STOP_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// A handle to one node process.
#[async_trait]
pub trait NodeProcess: Send + Sync {
    /// Launches the process. Fails if the binary cannot be launched.
    async fn start(&self) -> Result<()>;

    /// Blocks until the process exits. An exit that was not requested through
    /// [`NodeProcess::stop`] and did not succeed is an error.
    async fn wait(&self) -> Result<()>;

    /// Requests graceful termination. Idempotent, and a no-op for a process
    /// that was never started.
    async fn stop(&self) -> Result<()>;
}

/// Builds a process handle for a resolved node config and its arguments.
pub type NewNodeProcessFn =
    Arc<dyn Fn(&NodeConfig, &[String]) -> Result<Box<dyn NodeProcess>> + Send + Sync>;

/// The factory used by default: runs the `binaryPath` of the node's
/// implementation-specific config as a local OS process.
pub fn local_process_factory() -> NewNodeProcessFn {
    Arc::new(|config: &NodeConfig, args: &[String]| {
        let raw = config.impl_specific_config.as_deref().unwrap_or_default();
        let local = LocalNodeConfig::parse(raw, &config.name)?;
        let binary_path = local.binary_path.ok_or_else(|| {
            anyhow!(
                "Node {} has no binaryPath in its implementation-specific config",
                config.name
            )
        })?;
        let process: Box<dyn NodeProcess> =
            Box::new(LocalProcess::new(config.name.clone(), binary_path, args.to_vec()));
        Ok(process)
    })
}

#[derive(Debug, Clone)]
struct Exit {
    requested: bool,
    status: std::result::Result<ExitStatus, String>,
}

struct Supervision {
    shutdown_tx: watch::Sender<bool>,
    exit_rx: watch::Receiver<Option<Exit>>,
}

/// A node running as a child OS process of this one.
///
/// A background task owns the child: it forwards the child's output to the
/// `node` tracing target, reaps it, and terminates it once a stop is
/// requested or this handle is dropped.
pub struct LocalProcess {
    name: String,
    binary_path: PathBuf,
    args: Vec<String>,
    supervision: Mutex<Option<Supervision>>,
}

impl LocalProcess {
    pub fn new(name: String, binary_path: PathBuf, args: Vec<String>) -> Self {
        Self {
            name,
            binary_path,
            args,
            supervision: Mutex::new(None),
        }
    }
}

impl std::fmt::Debug for LocalProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalProcess")
            .field("name", &self.name)
            .field("binary_path", &self.binary_path)
            .field("args", &self.args)
            .finish()
    }
}

#[async_trait]
impl NodeProcess for LocalProcess {
    async fn start(&self) -> Result<()> {
        let mut supervision = self.supervision.lock().await;
        if supervision.is_some() {
            return Err(anyhow!("Node {} process already started", self.name));
        }

        let mut cmd = TokioCommand::new(&self.binary_path);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to launch {}", self.binary_path.display()))?;

        if let Some(stdout) = child.stdout.take() {
            forward_output(self.name.clone(), "stdout", stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_output(self.name.clone(), "stderr", stderr);
        }

        tracing::info!(
            target: "netrunner",
            node = %self.name,
            pid = ?child.id(),
            binary = %self.binary_path.display(),
            "Node process launched"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (exit_tx, exit_rx) = watch::channel(None);
        tokio::spawn(supervise(self.name.clone(), child, shutdown_rx, exit_tx));

        *supervision = Some(Supervision {
            shutdown_tx,
            exit_rx,
        });
        Ok(())
    }

    async fn wait(&self) -> Result<()> {
        let mut exit_rx = match self.supervision.lock().await.as_ref() {
            Some(supervision) => supervision.exit_rx.clone(),
            None => return Err(anyhow!("Node {} process was never started", self.name)),
        };
        let exit = exit_rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| anyhow!("Supervisor of node {} went away", self.name))?
            .clone();

        match exit {
            Some(Exit {
                requested: true, ..
            }) => Ok(()),
            Some(Exit {
                status: Ok(status),
                ..
            }) if status.success() => Ok(()),
            Some(Exit {
                status: Ok(status),
                ..
            }) => Err(anyhow!("Node {} exited with {}", self.name, status)),
            Some(Exit { status: Err(e), .. }) => {
                Err(anyhow!("Failed to reap node {}: {}", self.name, e))
            }
            None => Err(anyhow!("Node {} has not exited", self.name)),
        }
    }

    async fn stop(&self) -> Result<()> {
        if let Some(supervision) = self.supervision.lock().await.as_ref() {
            // A closed channel means the process already exited.
            let _ = supervision.shutdown_tx.send(true);
        }
        Ok(())
    }
}

async fn supervise(
    name: String,
    mut child: Child,
    mut shutdown_rx: watch::Receiver<bool>,
    exit_tx: watch::Sender<Option<Exit>>,
) {
    let (requested, status) = tokio::select! {
        status = child.wait() => (false, status),
        // Fires on a stop request and when the handle is dropped.
        _ = shutdown_rx.changed() => (true, terminate(&name, &mut child).await),
    };

    let status = status.map_err(|e| e.to_string());
    match &status {
        Ok(code) => tracing::info!(target: "netrunner", node = %name, status = %code, requested, "Node process exited"),
        Err(e) => tracing::warn!(target: "netrunner", node = %name, error = %e, "Failed to reap node process"),
    }
    let _ = exit_tx.send(Some(Exit { requested, status }));
}

async fn terminate(name: &str, child: &mut Child) -> std::io::Result<ExitStatus> {
    if let Err(e) = request_termination(child) {
        tracing::warn!(target: "netrunner", node = %name, error = %e, "Graceful termination failed, killing");
        child.start_kill()?;
    }
    match timeout(STOP_GRACE_PERIOD, child.wait()).await {
        Ok(status) => status,
        Err(_) => {
            tracing::warn!(
                target: "netrunner",
                node = %name,
                grace = ?STOP_GRACE_PERIOD,
                "Node did not exit in time, killing"
            );
            child.kill().await?;
            child.wait().await
        }
    }
}

#[cfg(unix)]
fn request_termination(child: &mut Child) -> std::io::Result<()> {
    let Some(pid) = child.id() else {
        // Already reaped.
        return Ok(());
    };
    let pid = libc::pid_t::try_from(pid)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    unsafe {
        if libc::kill(pid, libc::SIGTERM) != 0 {
            return Err(std::io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn request_termination(child: &mut Child) -> std::io::Result<()> {
    child.start_kill()
}

fn forward_output<R>(node: String, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => tracing::info!(target: "node", node = %node, stream, "{}", line),
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(target: "node", node = %node, stream, error = %e, "Failed to read node output");
                    break;
                }
            }
        }
    });
}
