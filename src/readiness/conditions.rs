// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-kind readiness and presence predicates.
//!
//! Replica counts missing from a status are read as zero, so a workload scaled
//! to zero is ready once it reports zero ready replicas. Equality is exact:
//! more ready replicas than configured does not count.

use super::{ReadyCondition, ReadyMode, Watched};
use crate::constants::phase;
use crate::types::ResourceKind;
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::Pod;

impl Watched for Deployment {
    const KIND: ResourceKind = ResourceKind::Deployment;

    fn ready_condition(&self, _mode: ReadyMode) -> ReadyCondition {
        ReadyCondition::ReadyReplicas(deployment_replicas(self))
    }

    fn satisfies(&self, condition: ReadyCondition) -> bool {
        match condition {
            ReadyCondition::ReadyReplicas(n) => {
                self.status
                    .as_ref()
                    .and_then(|s| s.ready_replicas)
                    .unwrap_or(0)
                    == n
            }
            _ => false,
        }
    }

    fn is_present(&self) -> bool {
        deployment_replicas(self) > 0
    }
}

impl Watched for StatefulSet {
    const KIND: ResourceKind = ResourceKind::StatefulSet;

    fn ready_condition(&self, mode: ReadyMode) -> ReadyCondition {
        let replicas = self.status.as_ref().map(|s| s.replicas).unwrap_or(0);
        match mode {
            ReadyMode::Ready => ReadyCondition::ReadyReplicas(replicas),
            ReadyMode::Created => ReadyCondition::CurrentReplicas(replicas),
        }
    }

    fn satisfies(&self, condition: ReadyCondition) -> bool {
        let status = self.status.as_ref();
        match condition {
            ReadyCondition::ReadyReplicas(n) => {
                status.and_then(|s| s.ready_replicas).unwrap_or(0) == n
            }
            ReadyCondition::CurrentReplicas(n) => {
                status.and_then(|s| s.current_replicas).unwrap_or(0) == n
            }
            ReadyCondition::PodRunning => false,
        }
    }

    fn is_present(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.replicas > 0)
    }
}

impl Watched for Pod {
    const KIND: ResourceKind = ResourceKind::Pod;

    fn ready_condition(&self, _mode: ReadyMode) -> ReadyCondition {
        ReadyCondition::PodRunning
    }

    fn satisfies(&self, condition: ReadyCondition) -> bool {
        match condition {
            ReadyCondition::PodRunning => pod_phase(self) == Some(phase::RUNNING),
            _ => false,
        }
    }

    fn is_present(&self) -> bool {
        matches!(pod_phase(self), Some(phase::PENDING | phase::RUNNING))
    }
}

fn deployment_replicas(deployment: &Deployment) -> i32 {
    deployment
        .status
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(0)
}

fn pod_phase(pod: &Pod) -> Option<&str> {
    pod.status.as_ref().and_then(|s| s.phase.as_deref())
}
