// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Copies bytes between local handles and the streams of a remote process

use std::io;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

pub type Reader = Box<dyn AsyncRead + Send + Unpin>;
pub type Writer = Box<dyn AsyncWrite + Send + Unpin>;

/// Local ends of an exec session
pub struct ExecStreams {
    pub stdin: Reader,
    pub stdout: Writer,
    pub stderr: Writer,
}

impl ExecStreams {
    pub fn new(stdin: Reader, stdout: Writer, stderr: Writer) -> Self {
        Self {
            stdin,
            stdout,
            stderr,
        }
    }

    /// The process's own standard streams
    pub fn stdio() -> Self {
        Self::new(
            Box::new(tokio::io::stdin()),
            Box::new(tokio::io::stdout()),
            Box::new(tokio::io::stderr()),
        )
    }

    /// Discard remote output. Remote errors still reach `stderr`.
    pub fn silenced(mut self) -> Self {
        self.stdout = Box::new(tokio::io::sink());
        self
    }
}

impl Default for ExecStreams {
    fn default() -> Self {
        Self::stdio()
    }
}

/// Remote ends handed out by the exec stream; absent when not requested
#[derive(Default)]
pub struct RemoteStreams {
    pub stdin: Option<Writer>,
    pub stdout: Option<Reader>,
    pub stderr: Option<Reader>,
}

/// Relay until the remote output streams close.
///
/// Local input is forwarded for as long as the session lasts. Reaching the end
/// of local input closes the remote stdin but does not end the session.
pub async fn relay(local: ExecStreams, remote: RemoteStreams) -> io::Result<()> {
    let ExecStreams {
        stdin: mut local_in,
        stdout: mut local_out,
        stderr: mut local_err,
    } = local;
    let RemoteStreams {
        stdin: remote_in,
        stdout: remote_out,
        stderr: remote_err,
    } = remote;

    let input = async move {
        if let Some(mut remote_in) = remote_in {
            if let Err(e) = tokio::io::copy(&mut local_in, &mut remote_in).await {
                debug!("stdin relay stopped: {}", e);
            }
            if let Err(e) = remote_in.shutdown().await {
                debug!("closing remote stdin failed: {}", e);
            }
        }
        std::future::pending::<()>().await
    };

    let output = async move {
        tokio::try_join!(
            pipe(remote_out, &mut local_out),
            pipe(remote_err, &mut local_err)
        )
        .map(|_| ())
    };

    tokio::select! {
        result = output => result,
        _ = input => Ok(()),
    }
}

async fn pipe(source: Option<Reader>, sink: &mut Writer) -> io::Result<()> {
    if let Some(mut source) = source {
        tokio::io::copy(&mut source, sink).await?;
    }
    sink.flush().await
}
