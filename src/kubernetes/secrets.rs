// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret reads and writes used by provisioning steps to exchange bootstrap tokens

use crate::error::{KubeprepError, Result};
use k8s_openapi::api::core::v1::Secret;
use kube::{api::PostParams, Api, Client, ResourceExt};
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Read a secret and return its data as UTF-8 strings
#[instrument(skip(client))]
pub async fn read_secret(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<BTreeMap<String, String>> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    let secret = secrets.get(name).await?;

    secret
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            String::from_utf8(value.0)
                .map(|decoded| (key.clone(), decoded))
                .map_err(|_| KubeprepError::SecretDecode(format!("{}/{} key {}", namespace, name, key)))
        })
        .collect()
}

/// Create a secret in the namespace named by its metadata
#[instrument(skip(client, secret), fields(secret = %secret.name_any()))]
pub async fn create_secret(client: &Client, secret: &Secret) -> Result<Secret> {
    let namespace = secret
        .namespace()
        .unwrap_or_else(|| client.default_namespace().to_string());
    let secrets: Api<Secret> = Api::namespaced(client.clone(), &namespace);

    let created = secrets.create(&PostParams::default(), secret).await?;
    info!("Created Secret {} in Namespace {}", created.name_any(), namespace);

    Ok(created)
}
