// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::Pod;
use kube::Client;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kubeprep::config::{Config, Target};
use kubeprep::exec::{run_in_pod, ExecSession, HostTerminal};
use kubeprep::kubernetes::client_from_kubeconfig;
use kubeprep::readiness::{find_object, wait_for_ready, ReadyMode, WaitOptions, Watched};
use kubeprep::types::{ResourceKind, ResourceRef};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run());
    // A pending read on stdin would otherwise keep the runtime from shutting down
    runtime.shutdown_background();
    result
}

async fn run() -> Result<()> {
    info!("Starting kubeprep");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: target={} {}, timeout={}s",
        config.target.kind, config.target.query, config.timeout_secs
    );

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling");
                cancel.cancel();
            }
        }
    });

    let client = client_from_kubeconfig(config.kubeconfig.clone().unwrap_or_default()).await?;
    info!("Connected to Kubernetes cluster");

    let options = config.wait_options().with_cancellation(cancel.clone());

    match config.target.kind {
        ResourceKind::Deployment => {
            locate_and_wait::<Deployment>(&client, &config.target, &options).await?;
        }
        ResourceKind::StatefulSet => {
            locate_and_wait::<StatefulSet>(&client, &config.target, &options).await?;
        }
        ResourceKind::Pod => {
            let pod = locate_and_wait::<Pod>(&client, &config.target, &options).await?;
            if let Some(exec) = &config.exec {
                let target = ResourceRef::of(ResourceKind::Pod, &pod);
                let session = ExecSession::new(target.name, target.namespace, exec.command.clone())
                    .with_tty(exec.tty);
                let mut terminal = HostTerminal::claim()?;
                run_in_pod(&client, session, exec.silent, &mut terminal, &cancel).await?;
            }
            return Ok(());
        }
    }

    if config.exec.is_some() {
        warn!(
            "EXEC_COMMAND is only supported for Pods, ignoring it for {}",
            config.target.kind
        );
    }
    Ok(())
}

async fn locate_and_wait<K: Watched>(
    client: &Client,
    target: &Target,
    options: &WaitOptions,
) -> kubeprep::error::Result<K> {
    let found: K = find_object(client, &target.query, options)
        .await?
        .into_located(K::KIND, &target.query.to_string(), options)?;

    let mode = if target.ignore_ready {
        ReadyMode::Created
    } else {
        ReadyMode::Ready
    };
    let name = ResourceRef::of(K::KIND, &found).to_string();
    wait_for_ready(client, &found, mode, options)
        .await?
        .into_result(K::KIND, &name, options)
}
