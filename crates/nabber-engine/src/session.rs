//! Overlay session state
//!
//! Two cells: whether the overlay is open, and whether an open is in flight.
//! Opening claims the in-flight flag with a synchronous check-and-set and
//! holds it in an [`OpenGuard`], which releases it on every exit path.

use std::cell::Cell;

use tracing::info;

/// Whether the overlay is showing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlayState {
    #[default]
    Closed,
    Open,
}

/// Open/closed state plus the re-entrancy flag
#[derive(Debug, Default)]
pub struct SessionState {
    state: Cell<OverlayState>,
    opening: Cell<bool>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OverlayState {
        self.state.get()
    }

    pub fn is_open(&self) -> bool {
        self.state.get() == OverlayState::Open
    }

    /// An open is in progress
    pub fn is_opening(&self) -> bool {
        self.opening.get()
    }

    /// Claim the right to open
    ///
    /// Fails while the overlay is open or another open holds the guard.
    pub fn try_begin_open(&self) -> Option<OpenGuard<'_>> {
        if self.is_open() || self.opening.replace(true) {
            return None;
        }
        Some(OpenGuard { session: self })
    }

    /// `Open -> Closed`; returns false when the overlay was not open
    pub fn close(&self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.state.set(OverlayState::Closed);
        info!("overlay closed");
        true
    }
}

/// Held for the duration of one open attempt
#[derive(Debug)]
pub struct OpenGuard<'a> {
    session: &'a SessionState,
}

impl OpenGuard<'_> {
    /// The overlay is built and inserted: `Closed -> Open`
    pub fn commit(self) {
        self.session.state.set(OverlayState::Open);
        info!("overlay open");
    }
}

impl Drop for OpenGuard<'_> {
    fn drop(&mut self) {
        self.session.opening.set(false);
    }
}
