// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{env as keys, watch, DEFAULT_NAMESPACE};
use crate::readiness::WaitOptions;
use crate::types::{LabelQuery, ResourceKind};
use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Kubeconfig to load; the in-cluster or default kubeconfig is inferred when unset
    pub kubeconfig: Option<PathBuf>,
    pub timeout_secs: u64,
    pub pacing: Duration,
    pub target: Target,
    pub exec: Option<ExecConfig>,
}

/// The object to locate and wait for
#[derive(Debug, Clone)]
pub struct Target {
    pub kind: ResourceKind,
    pub query: LabelQuery,
    pub ignore_ready: bool,
}

#[derive(Debug, Clone)]
pub struct ExecConfig {
    pub command: Vec<String>,
    pub tty: bool,
    pub silent: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kubeconfig = lookup(keys::KUBECONFIG)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let timeout_secs = match lookup(keys::WAIT_TIMEOUT_SECS) {
            Some(v) => v
                .parse()
                .with_context(|| format!("{} must be a number of seconds", keys::WAIT_TIMEOUT_SECS))?,
            None => watch::DEFAULT_TIMEOUT_SECS,
        };
        let pacing_millis = match lookup(keys::WATCH_PACING_MILLIS) {
            Some(v) => v.parse().with_context(|| {
                format!("{} must be a number of milliseconds", keys::WATCH_PACING_MILLIS)
            })?,
            None => watch::DEFAULT_PACING_MILLIS,
        };

        let kind: ResourceKind = lookup(keys::TARGET_KIND)
            .context("TARGET_KIND environment variable not set")?
            .parse()
            .map_err(|e: String| anyhow!(e))?;
        let namespace =
            lookup(keys::TARGET_NAMESPACE).unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let label = lookup(keys::TARGET_LABEL).context("TARGET_LABEL environment variable not set")?;
        let query = LabelQuery::parse(&label, namespace)
            .with_context(|| format!("TARGET_LABEL '{}' is not of the form key=value", label))?;

        let exec = lookup(keys::EXEC_COMMAND)
            .map(|c| c.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|c| !c.is_empty())
            .map(|command| ExecConfig {
                command,
                tty: flag(&lookup, keys::EXEC_TTY),
                silent: flag(&lookup, keys::EXEC_SILENT),
            });

        Ok(Config {
            kubeconfig,
            timeout_secs,
            pacing: Duration::from_millis(pacing_millis),
            target: Target {
                kind,
                query,
                ignore_ready: flag(&lookup, keys::IGNORE_READY),
            },
            exec,
        })
    }

    /// Wait options for a single locate or wait call
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::from_secs(self.timeout_secs).with_pacing(self.pacing)
    }
}

fn flag<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str) -> bool {
    lookup(key).unwrap_or("false".to_string()).parse().unwrap_or(false)
}
