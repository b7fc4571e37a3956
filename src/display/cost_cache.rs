// Copyright (c) 2025 termcraft contributors. Licensed under Apache License, Version 2.0.

//! A concurrent cache of evaluated-capability byte costs, keyed by
//! `(capability, parameters)` (`spec.md` §4.7, §5 "Shared resources"): the
//! diff renderer and a WINCH-driven resize both read and write it, so a
//! plain `HashMap` behind `&mut self` isn't safe.
//!
//! Follows the general preference for `std::sync::RwLock` over a
//! third-party concurrent map for read-heavy/write-rare maps (seen in
//! `tui::core::pty_mux`'s terminal-size cache); this cache fits the same
//! shape, since a given `(capability, params)` pair is evaluated once and
//! read on every subsequent frame.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::capability::Param;

type Key = (String, Vec<Param>);

/// Caches the byte length of an evaluated capability string, so the diff
/// renderer can compare costs of candidate cursor-movement sequences
/// without re-running the `%`-directive evaluator every frame.
#[derive(Debug, Default)]
pub struct CostCache {
    entries: RwLock<HashMap<Key, usize>>,
}

impl CostCache {
    #[must_use]
    pub fn new() -> Self { CostCache::default() }

    /// Returns the cached cost for `(capability, params)`, if present.
    #[must_use]
    pub fn get(&self, capability: &str, params: &[Param]) -> Option<usize> {
        let key = (capability.to_owned(), params.to_vec());
        self.entries.read().expect("cost cache lock poisoned").get(&key).copied()
    }

    /// Records `cost` for `(capability, params)`, overwriting any prior
    /// value.
    pub fn put(&self, capability: &str, params: &[Param], cost: usize) {
        let key = (capability.to_owned(), params.to_vec());
        self.entries.write().expect("cost cache lock poisoned").insert(key, cost);
    }

    /// Looks up `(capability, params)`, computing and storing it via
    /// `compute` on a miss.
    pub fn get_or_insert_with(&self, capability: &str, params: &[Param], compute: impl FnOnce() -> usize) -> usize {
        if let Some(cost) = self.get(capability, params) {
            return cost;
        }
        let cost = compute();
        self.put(capability, params, cost);
        cost
    }

    /// Discards every cached cost, e.g. when the terminal type changes.
    pub fn clear(&self) { self.entries.write().expect("cost cache lock poisoned").clear(); }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn miss_then_hit() {
        let cache = CostCache::new();
        assert_eq!(cache.get("cup", &[Param::Int(1), Param::Int(2)]), None);
        cache.put("cup", &[Param::Int(1), Param::Int(2)], 7);
        assert_eq!(cache.get("cup", &[Param::Int(1), Param::Int(2)]), Some(7));
    }

    #[test]
    fn concurrent_resize_and_render_do_not_corrupt_the_map() {
        let cache = Arc::new(CostCache::new());
        let mut handles = Vec::new();
        for i in 0..1000u32 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                let params = [Param::Int(i64::from(i))];
                cache.get_or_insert_with("cup", &params, || i as usize);
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        for i in 0..1000u32 {
            assert_eq!(cache.get("cup", &[Param::Int(i64::from(i))]), Some(i as usize));
        }
    }
}
