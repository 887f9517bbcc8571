// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource locator: finds a not-yet-named object by label

use super::watcher::{first_listed, watch_until};
use super::{WaitOptions, WaitOutcome, Watched};
use crate::constants::watch::START_VERSION;
use crate::error::{KubeprepError, Result};
use crate::kubernetes::client_from_kubeconfig;
use crate::types::LabelQuery;
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{ListParams, WatchParams};
use kube::{Api, Client};
use std::path::Path;
use tracing::{error, info, instrument};

/// Find the Deployment carrying `label_key=label_value` once it has replicas
pub async fn return_deployment_object(
    kubeconfig: impl AsRef<Path>,
    label_key: &str,
    label_value: &str,
    namespace: &str,
    options: &WaitOptions,
) -> Result<Deployment> {
    locate(kubeconfig, LabelQuery::new(label_key, label_value, namespace), options).await
}

/// Find the Pod carrying `label_key=label_value` once it is Pending or Running
pub async fn return_pod_object(
    kubeconfig: impl AsRef<Path>,
    label_key: &str,
    label_value: &str,
    namespace: &str,
    options: &WaitOptions,
) -> Result<Pod> {
    locate(kubeconfig, LabelQuery::new(label_key, label_value, namespace), options).await
}

/// Find the StatefulSet carrying `label_key=label_value` once it has replicas
pub async fn return_statefulset_object(
    kubeconfig: impl AsRef<Path>,
    label_key: &str,
    label_value: &str,
    namespace: &str,
    options: &WaitOptions,
) -> Result<StatefulSet> {
    locate(kubeconfig, LabelQuery::new(label_key, label_value, namespace), options).await
}

async fn locate<K: Watched>(
    kubeconfig: impl AsRef<Path>,
    query: LabelQuery,
    options: &WaitOptions,
) -> Result<K> {
    let client = client_from_kubeconfig(kubeconfig).await?;

    find_object(&client, &query, options)
        .await?
        .into_located(K::KIND, &query.to_string(), options)
}

/// Watch a label selector until some matching object exists.
///
/// Pods count once Pending or Running, Deployments and StatefulSets once they
/// report replicas. If several objects match, the first one delivered wins and
/// the first item of a fresh list by the same selector is returned.
#[instrument(skip_all, fields(kind = %K::KIND, query = %query))]
pub async fn find_object<K: Watched>(
    client: &Client,
    query: &LabelQuery,
    options: &WaitOptions,
) -> Result<WaitOutcome<K>> {
    let deadline = options.deadline();
    let selector = query.label_selector();
    let target = query.to_string();
    let api: Api<K> = Api::namespaced(client.clone(), &query.namespace);

    let events = api
        .watch(&WatchParams::default().labels(&selector), START_VERSION)
        .await
        .map_err(|source| {
            error!("Error when attempting to search for {} {}: {}", K::KIND, target, source);
            KubeprepError::WatchSetup {
                kind: K::KIND,
                target: target.clone(),
                source,
            }
        })?;

    info!("Waiting for {} {} to be created.", query.value, K::KIND);

    match watch_until(events, |o: &K| o.is_present(), deadline, options, K::KIND, &target).await? {
        WaitOutcome::Ready(_) => {
            let lp = ListParams::default().labels(&selector);
            let found = first_listed(&api, &lp, K::KIND, &target).await?;
            info!("Found {} {}", K::KIND, target);
            Ok(WaitOutcome::Ready(found))
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{deployment, list_json, pod, statefulset, watch_body, MockService};
    use kube::ResourceExt;
    use std::time::Duration;

    const PODS: &str = "/api/v1/namespaces/vault/pods";

    #[tokio::test(start_paused = true)]
    async fn test_finds_pending_pod_by_label() {
        let events = watch_body(&[
            ("ADDED", &pod("vault-0", "vault", "Pending")),
            ("MODIFIED", &pod("vault-0", "vault", "Running")),
        ]);
        let mock = MockService::new()
            .on_watch(PODS, 200, &events)
            .on_get(PODS, 200, &list_json(&[pod("vault-0", "vault", "Running")]));
        let client = mock.clone().into_client();

        let outcome: WaitOutcome<Pod> = find_object(
            &client,
            &LabelQuery::new("app", "vault", "vault"),
            &WaitOptions::from_secs(30),
        )
        .await
        .unwrap();

        let WaitOutcome::Ready(found) = outcome else {
            panic!("expected Ready, got {:?}", outcome);
        };
        assert_eq!(found.name_any(), "vault-0");

        let requests = mock.requests();
        assert!(requests[0].starts_with("WATCH /api/v1/namespaces/vault/pods?"));
        assert!(requests[0].contains("labelSelector=app%3Dvault"));
        assert!(requests[1].starts_with("GET /api/v1/namespaces/vault/pods?"));
        assert!(requests[1].contains("labelSelector=app%3Dvault"));
        // Matched on the first (Pending) event, the later Running event is never needed
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_first_item_of_fresh_list() {
        let events = watch_body(&[("ADDED", &pod("vault-1", "vault", "Pending"))]);
        let client = MockService::new()
            .on_watch(PODS, 200, &events)
            .on_get(
                PODS,
                200,
                &list_json(&[
                    pod("vault-0", "vault", "Running"),
                    pod("vault-1", "vault", "Pending"),
                ]),
            )
            .into_client();

        let outcome: WaitOutcome<Pod> = find_object(
            &client,
            &LabelQuery::new("app", "vault", "vault"),
            &WaitOptions::from_secs(30),
        )
        .await
        .unwrap();

        let WaitOutcome::Ready(found) = outcome else {
            panic!("expected Ready, got {:?}", outcome);
        };
        assert_eq!(found.name_any(), "vault-0");
    }

    #[tokio::test(start_paused = true)]
    async fn test_skips_pods_that_are_not_scheduled() {
        let events = watch_body(&[
            ("ADDED", &pod("vault-0", "vault", "Failed")),
            ("ADDED", &pod("vault-0", "vault", "Unknown")),
        ]);
        let client = MockService::new()
            .on_watch(PODS, 200, &events)
            .into_client();

        let outcome: WaitOutcome<Pod> = find_object(
            &client,
            &LabelQuery::new("app", "vault", "vault"),
            &WaitOptions::from_secs(30),
        )
        .await
        .unwrap();

        assert_eq!(outcome, WaitOutcome::WatchClosed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deployment_found_once_it_has_replicas() {
        let path = "/apis/apps/v1/namespaces/argocd/deployments";
        let events = watch_body(&[
            ("ADDED", &deployment("argocd-server", "argocd", 0, 0)),
            ("MODIFIED", &deployment("argocd-server", "argocd", 1, 0)),
        ]);
        let client = MockService::new()
            .on_watch(path, 200, &events)
            .on_get(path, 200, &list_json(&[deployment("argocd-server", "argocd", 1, 0)]))
            .into_client();

        let outcome: WaitOutcome<Deployment> = find_object(
            &client,
            &LabelQuery::new("app.kubernetes.io/name", "argocd-server", "argocd"),
            &WaitOptions::from_secs(30),
        )
        .await
        .unwrap();

        assert!(outcome.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_statefulset_found_once_it_has_replicas() {
        let path = "/apis/apps/v1/namespaces/vault/statefulsets";
        let events = watch_body(&[("ADDED", &statefulset("vault", "vault", 3, 0, 1))]);
        let client = MockService::new()
            .on_watch(path, 200, &events)
            .on_get(path, 200, &list_json(&[statefulset("vault", "vault", 3, 0, 1)]))
            .into_client();

        let outcome: WaitOutcome<StatefulSet> = find_object(
            &client,
            &LabelQuery::new("app", "vault", "vault"),
            &WaitOptions::from_secs(30),
        )
        .await
        .unwrap();

        assert!(outcome.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_nothing_appears() {
        let options = WaitOptions::from_secs(5).with_pacing(Duration::ZERO);
        let started = tokio::time::Instant::now();

        let outcome = watch_until(
            futures::stream::pending(),
            |p: &Pod| p.is_present(),
            options.deadline(),
            &options,
            Pod::KIND,
            "vault/app=vault",
        )
        .await
        .unwrap();

        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_outcome_names_kind_and_query() {
        let err = WaitOutcome::<Pod>::TimedOut
            .into_located(Pod::KIND, "vault/app=vault", &WaitOptions::from_secs(5))
            .unwrap_err();

        assert!(matches!(err, KubeprepError::NotCreated { timeout_secs: 5, .. }));
        assert_eq!(
            err.to_string(),
            "The Pod vault/app=vault was not created within 5 seconds"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_located_outcome_keeps_other_errors() {
        let err = WaitOutcome::<Pod>::WatchClosed
            .into_located(Pod::KIND, "vault/app=vault", &WaitOptions::from_secs(5))
            .unwrap_err();

        assert!(matches!(err, KubeprepError::WatchClosed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_timeout_does_not_overflow() {
        let events = watch_body(&[("ADDED", &pod("vault-0", "vault", "Pending"))]);
        let client = MockService::new()
            .on_watch(PODS, 200, &events)
            .on_get(PODS, 200, &list_json(&[pod("vault-0", "vault", "Pending")]))
            .into_client();

        let outcome: WaitOutcome<Pod> = find_object(
            &client,
            &LabelQuery::new("app", "vault", "vault"),
            &WaitOptions::from_secs(u64::MAX),
        )
        .await
        .unwrap();

        assert!(outcome.is_ready());
    }
}
