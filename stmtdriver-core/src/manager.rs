//! Connection manager abstraction.
//!
//! A connection manager is an adapter-specific handle to a pool of live
//! connections. Builders return it wrapped in a [`TaggedManager`], which records the
//! adapter that produced it so callers can tell managers from different code paths
//! apart without inspecting the handle itself.

use async_trait::async_trait;
use std::ops::Deref;

use crate::error::DriverResult;

/// A manager handle together with the marker of the adapter that built it.
#[derive(Debug, Clone)]
pub struct TaggedManager<H> {
    handle: H,
    provenance: &'static str,
}

impl<H> TaggedManager<H> {
    pub fn new(handle: H, provenance: &'static str) -> Self {
        Self { handle, provenance }
    }

    /// Returns the marker of the adapter that built this manager.
    pub fn provenance(&self) -> &'static str {
        self.provenance
    }

    /// Returns `true` if this manager was built by the adapter with the given marker.
    pub fn is_from(&self, provenance: &str) -> bool {
        self.provenance == provenance
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn into_handle(self) -> H {
        self.handle
    }
}

impl<H> Deref for TaggedManager<H> {
    type Target = H;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

/// Factory for connection managers.
///
/// Building performs the adapter's only blocking step: establishing the pool.
/// Builders impose no timeout of their own and never retry.
#[async_trait]
pub trait ManagerBuilder {
    type Manager: Send + Sync;

    async fn build(self) -> DriverResult<TaggedManager<Self::Manager>>;
}
