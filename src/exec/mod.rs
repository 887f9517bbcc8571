// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Remote command execution inside a running Pod.

pub mod relay;
pub mod terminal;

pub use relay::{ExecStreams, RemoteStreams};
pub use terminal::{with_raw_mode, HostTerminal, RawModeGuard, TerminalControl};

use crate::error::{KubeprepError, Result};
use crate::kubernetes::client_from_kubeconfig;
use crate::types::{ResourceKind, ResourceRef};
use k8s_openapi::api::core::v1::Pod;
use kube::api::AttachParams;
use kube::{Api, Client};
use std::fmt;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

/// A command to run in a Pod and the local streams to wire it to
pub struct ExecSession {
    pub pod_name: String,
    pub namespace: String,
    /// Container to run in; the Pod's default container when unset
    pub container: Option<String>,
    pub command: Vec<String>,
    pub stdin: bool,
    pub stdout: bool,
    pub stderr: bool,
    pub tty: bool,
    pub streams: ExecStreams,
}

impl ExecSession {
    /// A non-interactive session attached to the process's standard streams
    pub fn new<I, S>(pod_name: impl Into<String>, namespace: impl Into<String>, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pod_name: pod_name.into(),
            namespace: namespace.into(),
            container: None,
            command: command.into_iter().map(Into::into).collect(),
            stdin: true,
            stdout: true,
            stderr: true,
            tty: false,
            streams: ExecStreams::stdio(),
        }
    }

    pub fn with_tty(mut self, tty: bool) -> Self {
        self.tty = tty;
        self
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn with_streams(mut self, streams: ExecStreams) -> Self {
        self.streams = streams;
        self
    }

    pub fn with_stdin(mut self, stdin: bool) -> Self {
        self.stdin = stdin;
        self
    }

    pub fn target(&self) -> ResourceRef {
        ResourceRef::new(ResourceKind::Pod, &self.pod_name, &self.namespace)
    }

    /// Parameters for the exec subresource request.
    ///
    /// A TTY merges stderr into stdout, so stderr is never requested with one.
    pub fn attach_params(&self) -> AttachParams {
        let params = AttachParams::default()
            .stdin(self.stdin)
            .stdout(self.stdout)
            .stderr(self.stderr && !self.tty)
            .tty(self.tty);
        match &self.container {
            Some(container) => params.container(container.clone()),
            None => params,
        }
    }
}

impl fmt::Debug for ExecSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecSession")
            .field("pod_name", &self.pod_name)
            .field("namespace", &self.namespace)
            .field("container", &self.container)
            .field("command", &self.command)
            .field("tty", &self.tty)
            .finish_non_exhaustive()
    }
}

/// Lifecycle of an exec session, traced as it progresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    RequestBuilt,
    StreamNegotiated,
    RawModeEntered,
    Streaming,
    Closed,
    Failed,
}

/// Run a command in a Pod using the cluster from `kubeconfig` and the
/// process terminal. With `silent`, remote stdout is discarded.
pub async fn pod_exec_session(
    kubeconfig: impl AsRef<Path>,
    session: ExecSession,
    silent: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let client = client_from_kubeconfig(kubeconfig).await?;
    let mut terminal = HostTerminal::claim()?;

    run_in_pod(&client, session, silent, &mut terminal, cancel).await
}

/// Run a command in a Pod, switching `terminal` to raw mode for TTY sessions.
///
/// The terminal is back in its previous mode when this returns, whether the
/// session closed cleanly, failed, or was cancelled.
#[instrument(skip_all, fields(pod = %session.target(), command = ?session.command))]
pub async fn run_in_pod<T>(
    client: &Client,
    session: ExecSession,
    silent: bool,
    terminal: &mut T,
    cancel: &CancellationToken,
) -> Result<()>
where
    T: TerminalControl + ?Sized,
{
    debug!(state = ?SessionState::Idle);
    let target = session.target();
    let params = session.attach_params();
    debug!(state = ?SessionState::RequestBuilt);

    let pods: Api<Pod> = Api::namespaced(client.clone(), &session.namespace);
    let mut process = pods
        .exec(&session.pod_name, session.command.clone(), &params)
        .await
        .map_err(|e| {
            error!("Error executing command on Pod {}: {}", target, e);
            KubeprepError::ExecError(format!("failed to start exec on Pod {}: {}", target, e))
        })?;
    debug!(state = ?SessionState::StreamNegotiated);

    let remote = RemoteStreams {
        stdin: process.stdin().map(|s| Box::new(s) as relay::Writer),
        stdout: process.stdout().map(|s| Box::new(s) as relay::Reader),
        stderr: process.stderr().map(|s| Box::new(s) as relay::Reader),
    };
    let status = process.take_status();
    let local = if silent {
        session.streams.silenced()
    } else {
        session.streams
    };

    let streamed = with_raw_mode(terminal, session.tty, async {
        if session.tty {
            debug!(state = ?SessionState::RawModeEntered);
        }
        debug!(state = ?SessionState::Streaming);
        tokio::select! {
            result = relay::relay(local, remote) => result.map_err(|e| {
                KubeprepError::ExecError(format!("stream to Pod {} failed: {}", target, e))
            }),
            _ = cancel.cancelled() => Err(KubeprepError::Cancelled {
                kind: ResourceKind::Pod,
                target: target.to_string(),
            }),
        }
    })
    .await;

    if let Err(e) = streamed {
        error!("Error running command on Pod {}: {}", target, e);
        debug!(state = ?SessionState::Failed);
        return Err(e);
    }

    process.join().await.map_err(|e| {
        error!("Error running command on Pod {}: {}", target, e);
        KubeprepError::ExecError(format!("exec on Pod {} did not finish cleanly: {}", target, e))
    })?;

    if let Some(status) = status {
        if let Some(status) = status.await {
            if status.status.as_deref() == Some("Failure") {
                debug!(state = ?SessionState::Failed);
                return Err(KubeprepError::ExecError(format!(
                    "command in Pod {} failed: {}",
                    target,
                    status.message.unwrap_or_default()
                )));
            }
        }
    }

    debug!(state = ?SessionState::Closed);
    info!("Command finished in Pod {}", target);
    Ok(())
}
