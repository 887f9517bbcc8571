// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::DEFAULT_NAMESPACE;
use kube::ResourceExt;
use std::fmt;
use std::str::FromStr;

/// The workload kinds the watcher and locator know how to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Deployment,
    Pod,
    StatefulSet,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Deployment => "Deployment",
            ResourceKind::Pod => "Pod",
            ResourceKind::StatefulSet => "StatefulSet",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deployment" | "deploy" => Ok(ResourceKind::Deployment),
            "pod" => Ok(ResourceKind::Pod),
            "statefulset" | "sts" => Ok(ResourceKind::StatefulSet),
            other => Err(format!("unsupported resource kind '{}'", other)),
        }
    }
}

/// A single named object in a namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Build a reference from an object, falling back to the default namespace
    pub fn of<K: ResourceExt>(kind: ResourceKind, object: &K) -> Self {
        Self::new(
            kind,
            object.name_any(),
            object
                .namespace()
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        )
    }

    /// Field selector pinning a watch or list to this object
    pub fn field_selector(&self) -> String {
        format!("metadata.name={}", self.name)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Label key/value pair scoped to a namespace.
///
/// When several objects carry the label, whichever the watch delivers first wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelQuery {
    pub key: String,
    pub value: String,
    pub namespace: String,
}

impl LabelQuery {
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            namespace: namespace.into(),
        }
    }

    /// Parse a `key=value` pair
    pub fn parse(selector: &str, namespace: impl Into<String>) -> Option<Self> {
        let (key, value) = selector.split_once('=')?;
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self::new(key, value, namespace))
    }

    pub fn label_selector(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}

impl fmt::Display for LabelQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.label_selector())
    }
}
