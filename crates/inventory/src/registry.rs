//! Ownership of per-trip inventories.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use common::{Clock, TripId};

use crate::error::{InventoryError, Result};
use crate::expiry::ExpiryPolicy;
use crate::seat_inventory::SeatInventory;
use crate::seat_map::SeatMap;

/// Owns exactly one [`SeatInventory`] per trip.
///
/// The registry lock only guards the map itself. It is never held while a
/// trip's inventory lock is taken, so trips never contend with each other.
#[derive(Clone)]
pub struct InventoryRegistry {
    trips: Arc<RwLock<HashMap<TripId, Arc<SeatInventory>>>>,
    policy: ExpiryPolicy,
    clock: Arc<dyn Clock>,
}

impl InventoryRegistry {
    pub fn new(policy: ExpiryPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            trips: Arc::new(RwLock::new(HashMap::new())),
            policy,
            clock,
        }
    }

    /// Opens a trip for sale, or returns its existing inventory.
    ///
    /// Capacity is fixed by the first call; later calls with a different
    /// seat map get the original inventory back.
    pub fn open(&self, trip_id: TripId, seat_map: SeatMap) -> Arc<SeatInventory> {
        let mut trips = self.trips.write().unwrap_or_else(PoisonError::into_inner);
        trips
            .entry(trip_id)
            .or_insert_with(|| {
                tracing::info!(%trip_id, capacity = seat_map.capacity(), "trip inventory opened");
                Arc::new(SeatInventory::new(
                    trip_id,
                    seat_map,
                    self.policy,
                    self.clock.clone(),
                ))
            })
            .clone()
    }

    /// Looks up the inventory of a trip.
    pub fn get(&self, trip_id: TripId) -> Result<Arc<SeatInventory>> {
        self.trips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&trip_id)
            .cloned()
            .ok_or(InventoryError::TripNotRegistered(trip_id))
    }

    pub fn trip_ids(&self) -> Vec<TripId> {
        self.trips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }

    /// Purges expired holds across every trip, one trip lock at a time.
    pub fn purge_expired(&self) -> usize {
        let inventories: Vec<Arc<SeatInventory>> = self
            .trips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        inventories.iter().map(|inv| inv.purge_expired()).sum()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

impl std::fmt::Debug for InventoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryRegistry")
            .field("trips", &self.trip_ids().len())
            .field("policy", &self.policy)
            .finish()
    }
}
