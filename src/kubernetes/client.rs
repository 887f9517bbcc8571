// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client and REST config creation from a kubeconfig path

use crate::error::{KubeprepError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::Path;
use tracing::{debug, instrument};

/// Create a Kubernetes client for the cluster described by a kubeconfig file.
///
/// An empty path falls back to the inferred configuration (`KUBECONFIG`,
/// `~/.kube/config` or the in-cluster service account).
#[instrument(skip_all, fields(kubeconfig = %kubeconfig.as_ref().display()))]
pub async fn client_from_kubeconfig(kubeconfig: impl AsRef<Path>) -> Result<Client> {
    let config = rest_config(kubeconfig).await?;

    Client::try_from(config)
        .map_err(|e| KubeprepError::KubeconfigError(format!("Failed to create client: {}", e)))
}

/// Load the REST transport configuration from a kubeconfig file
pub async fn rest_config(kubeconfig: impl AsRef<Path>) -> Result<Config> {
    let path = kubeconfig.as_ref();

    if path.as_os_str().is_empty() {
        debug!("No kubeconfig path given, inferring configuration");
        return Config::infer()
            .await
            .map_err(|e| KubeprepError::KubeconfigError(format!("Failed to infer config: {}", e)));
    }

    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        KubeprepError::KubeconfigError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    config_from_kubeconfig_str(&raw).await
}

/// Build a REST config from kubeconfig YAML
pub async fn config_from_kubeconfig_str(kubeconfig: &str) -> Result<Config> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig).map_err(|e| {
        KubeprepError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e))
    })?;

    Config::from_custom_kubeconfig(kubeconfig_parsed, &KubeConfigOptions::default())
        .await
        .map_err(|e| KubeprepError::KubeconfigError(format!("Failed to create config: {}", e)))
}
