// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Identifiers shared by the watcher, locator and exec session.

pub mod resource;

pub use resource::{LabelQuery, ResourceKind, ResourceRef};
