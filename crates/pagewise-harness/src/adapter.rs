#![forbid(unsafe_code)]

//! Vector-backed adapter with failure injection.
//!
//! [`VecAdapter`] keeps a list of items with stable ids and uses the id as
//! the page handle, so revalidation sees exactly the moves and removals a
//! host list would produce. Every lifecycle call is logged as an
//! [`AdapterCall`] and the set of live handles is tracked, so tests can
//! check that nothing leaks.

use std::collections::{BTreeMap, BTreeSet};

use pagewise::{AdapterError, ItemPosition, PageAdapter};

/// One lifecycle call received by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterCall {
    /// `begin_update`.
    Begin,
    /// Successful `instantiate` of an index.
    Instantiate(usize),
    /// Successful `destroy` of an index.
    Destroy(usize),
    /// `set_primary` for an index.
    Primary(usize),
    /// `finish_update`.
    Finish,
}

/// An item in the list.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Item {
    id: u64,
    width: f32,
}

/// List-backed [`PageAdapter`] whose handles are item ids.
#[derive(Debug, Default)]
pub struct VecAdapter {
    items: Vec<Item>,
    next_id: u64,
    live: BTreeMap<u64, usize>,
    calls: Vec<AdapterCall>,
    fail_instantiate: BTreeSet<usize>,
    fail_destroy: BTreeSet<usize>,
    reported_count: Option<usize>,
    primary: Option<usize>,
    saved: Option<Vec<u8>>,
    in_update: bool,
}

impl VecAdapter {
    /// Adapter with `count` full-width items.
    #[must_use]
    pub fn new(count: usize) -> Self {
        let mut adapter = Self::default();
        for _ in 0..count {
            adapter.push();
        }
        adapter
    }

    fn fresh(&mut self) -> Item {
        let item = Item {
            id: self.next_id,
            width: 1.0,
        };
        self.next_id += 1;
        item
    }

    /// Append an item. Returns its id.
    pub fn push(&mut self) -> u64 {
        let item = self.fresh();
        self.items.push(item);
        item.id
    }

    /// Insert an item at `index`. Returns its id.
    pub fn insert(&mut self, index: usize) -> u64 {
        let item = self.fresh();
        self.items.insert(index.min(self.items.len()), item);
        item.id
    }

    /// Remove the item at `index`.
    pub fn remove(&mut self, index: usize) -> Option<u64> {
        (index < self.items.len()).then(|| self.items.remove(index).id)
    }

    /// Move the item at `from` to `to`.
    pub fn move_item(&mut self, from: usize, to: usize) {
        if from < self.items.len() {
            let item = self.items.remove(from);
            self.items.insert(to.min(self.items.len()), item);
        }
    }

    /// Replace the item at `index` with a new one. Returns the new id.
    pub fn replace(&mut self, index: usize) -> Option<u64> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.fresh();
        self.items[index] = item;
        Some(item.id)
    }

    /// Keep only the first `len` items.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    /// Set the width fraction of the item at `index`.
    pub fn set_width(&mut self, index: usize, width: f32) {
        if let Some(item) = self.items.get_mut(index) {
            item.width = width;
        }
    }

    /// Make `instantiate(index)` fail until cleared.
    pub fn fail_instantiate(&mut self, index: usize) {
        self.fail_instantiate.insert(index);
    }

    /// Make `destroy(index)` fail until cleared.
    pub fn fail_destroy(&mut self, index: usize) {
        self.fail_destroy.insert(index);
    }

    /// Stop injecting failures.
    pub fn clear_failures(&mut self) {
        self.fail_instantiate.clear();
        self.fail_destroy.clear();
    }

    /// Report `count` from [`PageAdapter::count`] without changing the items
    /// or notifying anyone.
    pub fn set_count_silently(&mut self, count: usize) {
        self.reported_count = Some(count);
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Id of the item at `index`.
    #[must_use]
    pub fn id_at(&self, index: usize) -> Option<u64> {
        self.items.get(index).map(|item| item.id)
    }

    /// Ids of instantiated, not yet destroyed pages.
    #[must_use]
    pub fn live_ids(&self) -> Vec<u64> {
        self.live.keys().copied().collect()
    }

    /// Index passed to the last `set_primary` call.
    #[must_use]
    pub fn primary(&self) -> Option<usize> {
        self.primary
    }

    /// Blob received by the last `restore_state`.
    #[must_use]
    pub fn restored(&self) -> Option<&[u8]> {
        self.saved.as_deref()
    }

    /// Set the blob returned by `save_state`.
    pub fn set_saved(&mut self, blob: Vec<u8>) {
        self.saved = Some(blob);
    }

    /// Lifecycle calls received so far.
    #[must_use]
    pub fn calls(&self) -> &[AdapterCall] {
        &self.calls
    }

    /// Drain the call log.
    pub fn take_calls(&mut self) -> Vec<AdapterCall> {
        std::mem::take(&mut self.calls)
    }

    /// Whether a begin/finish bracket is open.
    #[must_use]
    pub fn in_update(&self) -> bool {
        self.in_update
    }
}

impl PageAdapter for VecAdapter {
    type Handle = u64;

    fn count(&self) -> usize {
        self.reported_count.unwrap_or(self.items.len())
    }

    fn instantiate(&mut self, index: usize) -> Result<u64, AdapterError> {
        if self.fail_instantiate.contains(&index) {
            return Err(AdapterError::new(format!("injected instantiate failure at {index}")));
        }
        let id = self
            .id_at(index)
            .ok_or_else(|| AdapterError::new(format!("no item at {index}")))?;
        if self.live.insert(id, index).is_some() {
            return Err(AdapterError::new(format!("item {id} is already live")));
        }
        self.calls.push(AdapterCall::Instantiate(index));
        Ok(id)
    }

    fn destroy(&mut self, index: usize, handle: &u64) -> Result<(), AdapterError> {
        if self.fail_destroy.contains(&index) {
            return Err(AdapterError::new(format!("injected destroy failure at {index}")));
        }
        if self.live.remove(handle).is_none() {
            return Err(AdapterError::new(format!("item {handle} is not live")));
        }
        self.calls.push(AdapterCall::Destroy(index));
        Ok(())
    }

    fn position_of(&self, handle: &u64) -> ItemPosition {
        match self.items.iter().position(|item| item.id == *handle) {
            Some(index) => ItemPosition::Moved(index),
            None => ItemPosition::Removed,
        }
    }

    fn width_fraction(&self, index: usize) -> f32 {
        self.items.get(index).map_or(1.0, |item| item.width)
    }

    fn begin_update(&mut self) {
        self.in_update = true;
        self.calls.push(AdapterCall::Begin);
    }

    fn finish_update(&mut self) {
        self.in_update = false;
        self.calls.push(AdapterCall::Finish);
    }

    fn set_primary(&mut self, index: usize, _handle: Option<&u64>) {
        self.primary = Some(index);
        self.calls.push(AdapterCall::Primary(index));
    }

    fn save_state(&self) -> Option<Vec<u8>> {
        self.saved.clone()
    }

    fn restore_state(&mut self, state: &[u8]) {
        self.saved = Some(state.to_vec());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_stable_across_edits() {
        let mut adapter = VecAdapter::new(3);
        let first = adapter.id_at(0).expect("item");
        let inserted = adapter.insert(0);
        assert_ne!(inserted, first);
        assert_eq!(adapter.position_of(&first), ItemPosition::Moved(1));
        adapter.remove(1);
        assert_eq!(adapter.position_of(&first), ItemPosition::Removed);
    }

    #[test]
    fn live_set_tracks_lifecycle() {
        let mut adapter = VecAdapter::new(2);
        let id = adapter.instantiate(1).expect("instantiate");
        assert_eq!(adapter.live_ids(), vec![id]);
        assert!(adapter.instantiate(1).is_err(), "double instantiate");
        adapter.destroy(1, &id).expect("destroy");
        assert!(adapter.live_ids().is_empty());
        assert!(adapter.destroy(1, &id).is_err(), "double destroy");
    }

    #[test]
    fn injected_failures() {
        let mut adapter = VecAdapter::new(2);
        adapter.fail_instantiate(0);
        assert!(adapter.instantiate(0).is_err());
        adapter.clear_failures();
        assert!(adapter.instantiate(0).is_ok());
        adapter.set_count_silently(9);
        assert_eq!(adapter.count(), 9);
        assert_eq!(adapter.len(), 2);
    }
}
