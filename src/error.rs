// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::ResourceKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KubeprepError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Failed to start watch on {kind} {target}: {source}")]
    WatchSetup {
        kind: ResourceKind,
        target: String,
        #[source]
        source: kube::Error,
    },

    #[error("Watch on {kind} {target} failed: {source}")]
    Watch {
        kind: ResourceKind,
        target: String,
        #[source]
        source: kube::Error,
    },

    #[error("Watch on {kind} {target} reported an error ({code}): {message}")]
    WatchEvent {
        kind: ResourceKind,
        target: String,
        code: u16,
        message: String,
    },

    #[error("Watch on {kind} {target} closed before the condition was met")]
    WatchClosed { kind: ResourceKind, target: String },

    #[error("The {kind} {target} was not ready within {timeout_secs} seconds")]
    TimedOut {
        kind: ResourceKind,
        target: String,
        timeout_secs: u64,
    },

    #[error("The {kind} {target} was not created within {timeout_secs} seconds")]
    NotCreated {
        kind: ResourceKind,
        target: String,
        timeout_secs: u64,
    },

    #[error("Waiting for {kind} {target} was cancelled")]
    Cancelled { kind: ResourceKind, target: String },

    #[error("No {kind} matching {target} was found")]
    NotFound { kind: ResourceKind, target: String },

    #[error("Secret {0} contains a value that is not valid UTF-8")]
    SecretDecode(String),

    #[error("Exec session failed: {0}")]
    ExecError(String),

    #[error("Terminal error: {0}")]
    TerminalError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KubeprepError>;
