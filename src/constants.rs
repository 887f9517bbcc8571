// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Environment variables read by `Config::from_env`
pub mod env {
    pub const KUBECONFIG: &str = "KUBECONFIG";
    pub const WAIT_TIMEOUT_SECS: &str = "WAIT_TIMEOUT_SECS";
    pub const WATCH_PACING_MILLIS: &str = "WATCH_PACING_MILLIS";
    pub const TARGET_KIND: &str = "TARGET_KIND";
    /// `key=value` label used to locate the target
    pub const TARGET_LABEL: &str = "TARGET_LABEL";
    pub const TARGET_NAMESPACE: &str = "TARGET_NAMESPACE";
    /// Whitespace separated command run in the target pod once it is ready
    pub const EXEC_COMMAND: &str = "EXEC_COMMAND";
    pub const EXEC_TTY: &str = "EXEC_TTY";
    pub const EXEC_SILENT: &str = "EXEC_SILENT";
    /// Wait for StatefulSet pods to be created rather than ready
    pub const IGNORE_READY: &str = "IGNORE_READY";
}

/// Watch loop timing
pub mod watch {
    /// Default deadline for a single locate or wait call
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
    /// Delay between processed watch events
    pub const DEFAULT_PACING_MILLIS: u64 = 1000;
    /// Resource version that starts a watch with synthetic ADDED events for existing objects
    pub const START_VERSION: &str = "0";
}

/// Pod phases the readiness predicates look at
pub mod phase {
    pub const PENDING: &str = "Pending";
    pub const RUNNING: &str = "Running";
}

pub const DEFAULT_NAMESPACE: &str = "default";
