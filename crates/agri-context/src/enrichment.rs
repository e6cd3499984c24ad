//! Location Enrichment Client: keeps the latest resolved place for the advice dispatcher.
//!
//! One best-effort geocoding attempt per coordinate change. Failures keep the
//! previous value. Each refresh takes a generation number; a result whose
//! generation was superseded while in flight is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::task::JoinHandle;

use crate::geocode::ReverseGeocoder;
use crate::types::{Coordinates, LocationInfo};

/// What a single refresh did to the shared location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The shared location now holds this resolution
    Updated(LocationInfo),
    /// Newer coordinates arrived while this one was in flight
    Superseded,
    /// Geocoding failed; the previous value is kept
    Failed,
}

#[derive(Debug, Clone)]
pub struct LocationEnricher {
    geocoder: Arc<ReverseGeocoder>,
    current: Arc<RwLock<Option<LocationInfo>>>,
    generation: Arc<AtomicU64>,
}

impl LocationEnricher {
    pub fn new(geocoder: ReverseGeocoder) -> Self {
        Self {
            geocoder: Arc::new(geocoder),
            current: Arc::new(RwLock::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Latest resolved location, if any resolution has succeeded
    pub fn current(&self) -> Option<LocationInfo> {
        self.current.read().clone()
    }

    pub async fn refresh(&self, coords: Coordinates) -> RefreshOutcome {
        let generation = self.next_generation();
        self.resolve_into(generation, coords).await
    }

    /// Start a refresh in the background. Must be called inside a Tokio runtime.
    ///
    /// The generation is taken before spawning, so call order decides which
    /// coordinates win, not task scheduling.
    pub fn spawn_refresh(&self, coords: Coordinates) -> JoinHandle<RefreshOutcome> {
        let generation = self.next_generation();
        let enricher = self.clone();
        tokio::spawn(async move { enricher.resolve_into(generation, coords).await })
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn resolve_into(&self, generation: u64, coords: Coordinates) -> RefreshOutcome {
        match self.geocoder.resolve(coords).await {
            Ok(info) => {
                let mut current = self.current.write();
                // Checked under the write lock so a newer refresh cannot interleave.
                if self.generation.load(Ordering::SeqCst) != generation {
                    tracing::debug!(
                        "Discarding location for ({}, {}): superseded",
                        coords.latitude,
                        coords.longitude
                    );
                    return RefreshOutcome::Superseded;
                }
                *current = Some(info.clone());
                RefreshOutcome::Updated(info)
            }
            Err(e) => {
                tracing::warn!(
                    "Error fetching location info for ({}, {}): {}",
                    coords.latitude,
                    coords.longitude,
                    e
                );
                RefreshOutcome::Failed
            }
        }
    }
}
