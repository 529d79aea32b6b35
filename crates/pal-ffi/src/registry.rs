//! Generation-checked engine registry.
//!
//! Callers on the other side of the C boundary hold engines as opaque
//! `u64` handles. A handle packs a slot index in the low 32 bits and a
//! slot generation in the high 32 bits. Destroying an engine bumps its
//! slot's generation, so a stale handle kept by the caller can never
//! reach an engine that now lives in the reused slot.
//!
//! Lookups clone the slot's `Arc<Engine>` and release the registry lock
//! before any engine work happens. A concurrent destroy therefore only
//! drops the registry's reference; in-flight calls finish on their own
//! clone and the engine is freed when the last one returns.

use std::sync::{Arc, PoisonError, RwLock};

use pal_core::Engine;

/// Upper bound on live engines. Mobile hosts run one or two; the cap
/// exists so a handle leak in the host app fails loudly instead of
/// growing without bound.
pub const MAX_ENGINES: usize = 64;

/// Opaque engine handle as seen by the caller. Never 0 for a live
/// engine, so 0 can serve as the error sentinel at the boundary.
pub type RawHandle = u64;

struct Slot {
    /// Starts at 1 and is bumped on every destroy, skipping 0 on wrap.
    /// A generation of 0 never occurs, which keeps the packed handle
    /// nonzero even for slot index 0.
    generation: u32,
    engine: Option<Arc<Engine>>,
}

pub struct EngineRegistry {
    slots: RwLock<Vec<Slot>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        EngineRegistry {
            slots: RwLock::new(Vec::new()),
        }
    }

    /// Allocate a fresh engine, reusing the first free slot. Returns
    /// `None` when [`MAX_ENGINES`] are already live.
    pub fn create(&self) -> Option<RawHandle> {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(index) = slots.iter().position(|slot| slot.engine.is_none()) {
            let slot = &mut slots[index];
            slot.engine = Some(Arc::new(Engine::new()));
            return Some(pack(index as u32, slot.generation));
        }

        if slots.len() >= MAX_ENGINES {
            return None;
        }

        let index = slots.len() as u32;
        slots.push(Slot {
            generation: 1,
            engine: Some(Arc::new(Engine::new())),
        });
        Some(pack(index, 1))
    }

    /// Resolve a handle to its engine. `None` for a handle that was
    /// never issued, was destroyed, or belongs to a previous occupant
    /// of the slot.
    pub fn get(&self, handle: RawHandle) -> Option<Arc<Engine>> {
        let (index, generation) = unpack(handle);
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.get(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.engine.clone()
    }

    /// Invalidate a handle and release the registry's reference to the
    /// engine. Returns false if the handle was not live. The engine
    /// itself is dropped once the last in-flight call releases its
    /// clone.
    pub fn destroy(&self, handle: RawHandle) -> bool {
        let (index, generation) = unpack(handle);
        let taken = {
            let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
            let Some(slot) = slots.get_mut(index as usize) else {
                return false;
            };
            if slot.generation != generation || slot.engine.is_none() {
                return false;
            }
            slot.generation = next_generation(slot.generation);
            slot.engine.take()
        };
        // Dropped outside the registry lock.
        drop(taken);
        true
    }

    /// Number of live engines.
    pub fn live_count(&self) -> usize {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots.iter().filter(|slot| slot.engine.is_some()).count()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn pack(index: u32, generation: u32) -> RawHandle {
    (u64::from(generation) << 32) | u64::from(index)
}

fn unpack(handle: RawHandle) -> (u32, u32) {
    (handle as u32, (handle >> 32) as u32)
}

fn next_generation(generation: u32) -> u32 {
    let next = generation.wrapping_add(1);
    if next == 0 {
        1
    } else {
        next
    }
}

// ============================================================================
// Tests
// ============================================================================
