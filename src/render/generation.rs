//! Load generations
//!
//! Every document load takes a ticket. Starting another load bumps the
//! generation, and tickets from older loads stop being current; a stale
//! render notices this between pages and bails out instead of overwriting
//! the newer document's state.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use super::error::{RenderError, RenderResult};

/// Generation counter shared by a viewer and its in-flight loads
#[derive(Debug, Clone, Default)]
pub struct LoadGeneration {
    current: Arc<AtomicU64>,
}

impl LoadGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load, superseding all earlier tickets
    pub fn begin(&self) -> LoadTicket {
        let id = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        LoadTicket {
            id,
            current: Arc::clone(&self.current),
        }
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }
}

/// Proof of a particular load
#[derive(Debug, Clone)]
pub struct LoadTicket {
    id: u64,
    current: Arc<AtomicU64>,
}

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether no newer load has started
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.id
    }

    pub fn ensure_current(&self) -> RenderResult<()> {
        if self.is_current() {
            Ok(())
        } else {
            Err(RenderError::Superseded)
        }
    }
}
