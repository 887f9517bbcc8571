// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Raw terminal mode as a scoped resource.
//!
//! `RawModeGuard` holds a mutable borrow of the terminal for as long as raw
//! mode is active, so a second acquisition on the same terminal while a
//! session is streaming does not compile. The process terminal itself can only
//! be claimed once at a time through `HostTerminal::claim`.

use crate::error::{KubeprepError, Result};
use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Switches a terminal between raw and its previous mode
pub trait TerminalControl {
    fn enter_raw_mode(&mut self) -> io::Result<()>;

    /// Return to the mode that was active before `enter_raw_mode`
    fn restore(&mut self) -> io::Result<()>;
}

static HOST_TERMINAL_CLAIMED: AtomicBool = AtomicBool::new(false);

/// The controlling terminal of this process
#[derive(Debug)]
pub struct HostTerminal {
    _claim: (),
}

impl HostTerminal {
    /// Claim the process terminal, failing if another session holds it
    pub fn claim() -> Result<Self> {
        if HOST_TERMINAL_CLAIMED.swap(true, Ordering::SeqCst) {
            return Err(KubeprepError::ExecError(
                "terminal is already held by another exec session".to_string(),
            ));
        }
        Ok(Self { _claim: () })
    }
}

impl Drop for HostTerminal {
    fn drop(&mut self) {
        HOST_TERMINAL_CLAIMED.store(false, Ordering::SeqCst);
    }
}

impl TerminalControl for HostTerminal {
    fn enter_raw_mode(&mut self) -> io::Result<()> {
        crossterm::terminal::enable_raw_mode()
    }

    fn restore(&mut self) -> io::Result<()> {
        crossterm::terminal::disable_raw_mode()
    }
}

/// Raw mode held for the lifetime of the guard; dropping it restores the terminal
pub struct RawModeGuard<'t, T: TerminalControl + ?Sized> {
    terminal: &'t mut T,
}

impl<'t, T: TerminalControl + ?Sized> RawModeGuard<'t, T> {
    pub fn acquire(terminal: &'t mut T) -> Result<Self> {
        terminal.enter_raw_mode().map_err(|e| {
            warn!("Error when attempting to start terminal: {}", e);
            KubeprepError::TerminalError(e)
        })?;
        debug!("Terminal switched to raw mode");
        Ok(Self { terminal })
    }
}

impl<T: TerminalControl + ?Sized> Drop for RawModeGuard<'_, T> {
    fn drop(&mut self) {
        match self.terminal.restore() {
            Ok(()) => debug!("Terminal mode restored"),
            Err(e) => warn!("Failed to restore terminal mode: {}", e),
        }
    }
}

/// Run `session` with the terminal in raw mode when `enabled`.
///
/// The terminal is restored however `session` ends, including by panic or by
/// the returned future being dropped.
pub async fn with_raw_mode<T, F, R>(terminal: &mut T, enabled: bool, session: F) -> Result<R>
where
    T: TerminalControl + ?Sized,
    F: Future<Output = Result<R>>,
{
    let _guard = if enabled {
        Some(RawModeGuard::acquire(terminal)?)
    } else {
        None
    };
    session.await
}
