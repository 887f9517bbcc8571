// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Readiness watcher: blocks until a known object meets its kind's condition

use super::{ReadyMode, WaitOptions, WaitOutcome, Watched};
use crate::constants::watch::START_VERSION;
use crate::error::{KubeprepError, Result};
use crate::kubernetes::client_from_kubeconfig;
use crate::types::{ResourceKind, ResourceRef};
use futures::{Stream, StreamExt};
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{ListParams, WatchEvent, WatchParams};
use kube::{Api, Client, ResourceExt};
use std::path::Path;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, error, info, instrument};

/// Wait for a Deployment to report all configured replicas ready
pub async fn wait_for_deployment_ready(
    kubeconfig: impl AsRef<Path>,
    deployment: &Deployment,
    options: &WaitOptions,
) -> Result<bool> {
    ensure_ready(kubeconfig, deployment, ReadyMode::Ready, options).await
}

/// Wait for a StatefulSet to report all configured replicas ready, or only
/// created when `ignore_ready` is set
pub async fn wait_for_statefulset_ready(
    kubeconfig: impl AsRef<Path>,
    statefulset: &StatefulSet,
    options: &WaitOptions,
    ignore_ready: bool,
) -> Result<bool> {
    let mode = if ignore_ready {
        ReadyMode::Created
    } else {
        ReadyMode::Ready
    };
    ensure_ready(kubeconfig, statefulset, mode, options).await
}

/// Wait for a Pod to reach the Running phase
pub async fn wait_for_pod_ready(
    kubeconfig: impl AsRef<Path>,
    pod: &Pod,
    options: &WaitOptions,
) -> Result<bool> {
    ensure_ready(kubeconfig, pod, ReadyMode::Ready, options).await
}

async fn ensure_ready<K: Watched>(
    kubeconfig: impl AsRef<Path>,
    object: &K,
    mode: ReadyMode,
    options: &WaitOptions,
) -> Result<bool> {
    let client = client_from_kubeconfig(kubeconfig).await?;
    let target = ResourceRef::of(K::KIND, object);

    wait_for_ready(&client, object, mode, options)
        .await?
        .into_result(K::KIND, &target.to_string(), options)
        .map(|_| true)
}

/// Watch a single object until it satisfies its readiness condition.
///
/// The condition is taken from `object` as passed in, not from the live
/// object. On success the object is listed again and the listed copy is
/// returned rather than the watch payload.
#[instrument(skip_all, fields(kind = %K::KIND, name = %object.name_any()))]
pub async fn wait_for_ready<K: Watched>(
    client: &Client,
    object: &K,
    mode: ReadyMode,
    options: &WaitOptions,
) -> Result<WaitOutcome<K>> {
    let deadline = options.deadline();
    let target = ResourceRef::of(K::KIND, object);
    let condition = object.ready_condition(mode);
    let api: Api<K> = Api::namespaced(client.clone(), &target.namespace);

    let events = api
        .watch(
            &WatchParams::default().fields(&target.field_selector()),
            START_VERSION,
        )
        .await
        .map_err(|source| {
            error!("Error when attempting to wait for {} {}: {}", K::KIND, target, source);
            KubeprepError::WatchSetup {
                kind: K::KIND,
                target: target.to_string(),
                source,
            }
        })?;

    info!(
        "Waiting for {} {} to be ready ({}). This could take up to {} seconds.",
        K::KIND,
        target.name,
        condition,
        options.timeout.as_secs()
    );

    let outcome = watch_until(
        events,
        |o: &K| o.satisfies(condition),
        deadline,
        options,
        K::KIND,
        &target.to_string(),
    )
    .await?;

    match outcome {
        WaitOutcome::Ready(_) => {
            let lp = ListParams::default().fields(&target.field_selector());
            let current = first_listed(&api, &lp, K::KIND, &target.to_string()).await?;
            info!("{} {} is ready", K::KIND, target.name);
            Ok(WaitOutcome::Ready(current))
        }
        other => Ok(other),
    }
}

/// Drive a watch stream until an object matches, the deadline passes, the
/// stream ends, or the wait is cancelled.
///
/// Events are handled in delivery order and the first match wins.
pub(crate) async fn watch_until<K, S, P>(
    events: S,
    matches: P,
    deadline: Instant,
    options: &WaitOptions,
    kind: ResourceKind,
    target: &str,
) -> Result<WaitOutcome<K>>
where
    K: ResourceExt,
    S: Stream<Item = kube::Result<WatchEvent<K>>>,
    P: Fn(&K) -> bool,
{
    tokio::pin!(events);
    let expired = sleep_until(deadline);
    tokio::pin!(expired);

    let cancelled = || KubeprepError::Cancelled {
        kind,
        target: target.to_string(),
    };

    loop {
        let next = tokio::select! {
            biased;
            _ = options.cancel.cancelled() => return Err(cancelled()),
            _ = &mut expired => {
                error!("The {} {} was not ready within the timeout period", kind, target);
                return Ok(WaitOutcome::TimedOut);
            }
            next = events.next() => next,
        };

        match next {
            None => {
                error!("Watch on {} {} closed before the condition was met", kind, target);
                return Ok(WaitOutcome::WatchClosed);
            }
            Some(Err(source)) => {
                error!("Error waiting for {} {}: {}", kind, target, source);
                return Err(KubeprepError::Watch {
                    kind,
                    target: target.to_string(),
                    source,
                });
            }
            Some(Ok(WatchEvent::Added(object))) | Some(Ok(WatchEvent::Modified(object))) => {
                if matches(&object) {
                    return Ok(WaitOutcome::Ready(object));
                }
                debug!("{} {} not ready yet", kind, object.name_any());
            }
            Some(Ok(WatchEvent::Deleted(object))) => {
                debug!("{} {} was deleted", kind, object.name_any());
            }
            Some(Ok(WatchEvent::Bookmark(_))) => continue,
            Some(Ok(WatchEvent::Error(e))) => {
                error!("Watch on {} {} returned an error: {}", kind, target, e.message);
                return Err(KubeprepError::WatchEvent {
                    kind,
                    target: target.to_string(),
                    code: e.code,
                    message: e.message,
                });
            }
        }

        if !options.pacing.is_zero() {
            tokio::select! {
                biased;
                _ = options.cancel.cancelled() => return Err(cancelled()),
                _ = &mut expired => {
                    error!("The {} {} was not ready within the timeout period", kind, target);
                    return Ok(WaitOutcome::TimedOut);
                }
                _ = sleep(options.pacing) => {}
            }
        }
    }
}

/// List with the given params and return the first item
pub(crate) async fn first_listed<K: Watched>(
    api: &Api<K>,
    lp: &ListParams,
    kind: ResourceKind,
    target: &str,
) -> Result<K> {
    let list = api.list(lp).await.map_err(|e| {
        error!("Error when searching for {} {}: {}", kind, target, e);
        e
    })?;

    list.items
        .into_iter()
        .next()
        .ok_or_else(|| KubeprepError::NotFound {
            kind,
            target: target.to_string(),
        })
}
