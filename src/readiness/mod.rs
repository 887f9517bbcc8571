// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Watch-based readiness checks for Deployments, StatefulSets and Pods.
//!
//! Every call opens one watch, races it against a single deadline measured
//! from call entry, and drops both when it returns.

pub mod conditions;
pub mod locator;
pub mod watcher;

use crate::constants::watch::{DEFAULT_PACING_MILLIS, DEFAULT_TIMEOUT_SECS};
use crate::error::{KubeprepError, Result};
use crate::types::ResourceKind;
use k8s_openapi::NamespaceResourceScope;
use kube::Resource;
use serde::de::DeserializeOwned;
use std::fmt;
use std::fmt::Debug;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub use locator::{find_object, return_deployment_object, return_pod_object, return_statefulset_object};
pub use watcher::{
    wait_for_deployment_ready, wait_for_pod_ready, wait_for_ready, wait_for_statefulset_ready,
};

/// Whether replicated workloads must report ready pods or only created ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyMode {
    #[default]
    Ready,
    /// Count pods that exist, ready or not. Only StatefulSets honour this.
    Created,
}

/// Condition a watched object must reach, snapshotted when the wait starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyCondition {
    ReadyReplicas(i32),
    CurrentReplicas(i32),
    PodRunning,
}

impl fmt::Display for ReadyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadyCondition::ReadyReplicas(n) => write!(f, "readyReplicas == {}", n),
            ReadyCondition::CurrentReplicas(n) => write!(f, "currentReplicas == {}", n),
            ReadyCondition::PodRunning => f.write_str("phase == Running"),
        }
    }
}

/// A namespaced kind the watcher and locator can evaluate
pub trait Watched:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + DeserializeOwned
    + Debug
    + Send
    + Sync
    + 'static
{
    const KIND: ResourceKind;

    /// The condition to wait for, taken from this object's current status
    fn ready_condition(&self, mode: ReadyMode) -> ReadyCondition;

    fn satisfies(&self, condition: ReadyCondition) -> bool;

    /// Whether the object exists far enough along for the locator to return it
    fn is_present(&self) -> bool;
}

/// Outcome of a single wait or locate call
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome<K> {
    Ready(K),
    TimedOut,
    WatchClosed,
}

impl<K> WaitOutcome<K> {
    pub fn is_ready(&self) -> bool {
        matches!(self, WaitOutcome::Ready(_))
    }

    /// Turn a non-ready outcome into the matching error
    pub fn into_result(self, kind: ResourceKind, target: &str, options: &WaitOptions) -> Result<K> {
        match self {
            WaitOutcome::Ready(object) => Ok(object),
            WaitOutcome::TimedOut => Err(KubeprepError::TimedOut {
                kind,
                target: target.to_string(),
                timeout_secs: options.timeout.as_secs(),
            }),
            WaitOutcome::WatchClosed => Err(KubeprepError::WatchClosed {
                kind,
                target: target.to_string(),
            }),
        }
    }

    /// Like `into_result`, for a locator that waited on creation rather than readiness
    pub fn into_located(self, kind: ResourceKind, target: &str, options: &WaitOptions) -> Result<K> {
        match self {
            WaitOutcome::TimedOut => Err(KubeprepError::NotCreated {
                kind,
                target: target.to_string(),
                timeout_secs: options.timeout.as_secs(),
            }),
            other => other.into_result(kind, target, options),
        }
    }
}

const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Deadline, pacing and cancellation for a wait call
#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub timeout: Duration,
    /// Delay after each event that did not satisfy the condition
    pub pacing: Duration,
    pub cancel: CancellationToken,
}

impl WaitOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            pacing: Duration::from_millis(DEFAULT_PACING_MILLIS),
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_secs(timeout_secs: u64) -> Self {
        Self::new(Duration::from_secs(timeout_secs))
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Absolute deadline for a call starting now. Timeouts past what the
    /// clock can represent wait until `FAR_FUTURE` instead.
    pub(crate) fn deadline(&self) -> Instant {
        let now = Instant::now();
        now.checked_add(self.timeout)
            .unwrap_or_else(|| now + FAR_FUTURE)
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::from_secs(DEFAULT_TIMEOUT_SECS)
    }
}
