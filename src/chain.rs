//! Active filter chain
//!
//! The ordered, shared, mutable sequence of currently-applied filters with
//! their live parameter values - the single piece of shared mutable state in
//! the system. Three actors touch it: the preview tick, user edits, and the
//! background save job. One coarse mutex guards every structural mutation,
//! every parameter mutation, and every snapshot; lock hold times are bounded
//! by O(chain length) copy work, never by frame decoding or filtering.
//!
//! Callers never hold references into the chain. They carry opaque
//! [`EntryHandle`]s and the chain resolves handle to entry internally; an
//! entry's position is derived from its current place in the sequence, never
//! stored or renumbered.

use crate::error::{Error, Result};
use crate::filter::{default_values, ParamValues, VideoFilter};
use parking_lot::Mutex;
use std::sync::Arc;

/// Opaque, stable identity of one chain entry
///
/// Handles are never reused within a process; a handle for a removed entry
/// stays dead forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(u64);

struct ChainEntry {
    handle: EntryHandle,
    filter: Arc<dyn VideoFilter>,
    values: ParamValues,
}

struct ChainState {
    entries: Vec<ChainEntry>,
    next_handle: u64,
}

/// One entry of a chain snapshot
#[derive(Clone)]
pub struct SnapshotEntry {
    /// The filter implementation
    pub filter: Arc<dyn VideoFilter>,
    /// Parameter values at snapshot time
    pub values: ParamValues,
}

/// An immutable point-in-time copy of the chain contents
///
/// Snapshots are fully detached: edits to the live chain after the snapshot
/// was taken are never visible through it.
#[derive(Clone, Default)]
pub struct ChainSnapshot {
    entries: Vec<SnapshotEntry>,
}

impl ChainSnapshot {
    /// Entries in ascending position order
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The ordered, shared, mutable sequence of active filters
pub struct ActiveFilterChain {
    state: Mutex<ChainState>,
}

impl ActiveFilterChain {
    /// Create an empty chain
    pub fn new() -> Self {
        ActiveFilterChain {
            state: Mutex::new(ChainState {
                entries: Vec::new(),
                next_handle: 0,
            }),
        }
    }

    /// Append a filter to the end of the chain, parameter values seeded from
    /// the filter's defaults
    ///
    /// The new entry's position equals the chain's prior length.
    pub fn add(&self, filter: Arc<dyn VideoFilter>) -> EntryHandle {
        let values = default_values(filter.as_ref());
        let mut state = self.state.lock();
        let handle = EntryHandle(state.next_handle);
        state.next_handle += 1;
        state.entries.push(ChainEntry {
            handle,
            filter,
            values,
        });
        handle
    }

    /// Remove the entry for `handle`
    ///
    /// All later entries shift down by one position. Removing a handle that
    /// no longer exists is an explicit [`Error::HandleNotFound`], not a
    /// silent no-op.
    pub fn remove(&self, handle: EntryHandle) -> Result<()> {
        let mut state = self.state.lock();
        match state.entries.iter().position(|e| e.handle == handle) {
            Some(index) => {
                state.entries.remove(index);
                Ok(())
            }
            None => Err(Error::HandleNotFound),
        }
    }

    /// Update one parameter of one entry
    ///
    /// The value is stored as given: bounds are owned by the input control,
    /// not re-validated here. An unknown parameter name is an error; it can
    /// only come from a caller bug, never from a slider built against the
    /// filter's own schema.
    pub fn set_param(&self, handle: EntryHandle, name: &str, value: f64) -> Result<()> {
        let mut state = self.state.lock();
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.handle == handle)
            .ok_or(Error::HandleNotFound)?;
        match entry.values.get_mut(name) {
            Some(v) => {
                *v = value;
                Ok(())
            }
            None => Err(Error::UnknownParam(name.to_string())),
        }
    }

    /// Current position of an entry, if it still exists
    pub fn position(&self, handle: EntryHandle) -> Option<usize> {
        self.state
            .lock()
            .entries
            .iter()
            .position(|e| e.handle == handle)
    }

    /// Produce an immutable copy of the current chain contents
    ///
    /// Used by the preview tick on every frame and by a save job once, when
    /// saving begins.
    pub fn snapshot(&self) -> ChainSnapshot {
        let state = self.state.lock();
        ChainSnapshot {
            entries: state
                .entries
                .iter()
                .map(|e| SnapshotEntry {
                    filter: Arc::clone(&e.filter),
                    values: e.values.clone(),
                })
                .collect(),
        }
    }

    /// Number of active entries
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }
}

impl Default for ActiveFilterChain {
    fn default() -> Self {
        Self::new()
    }
}
