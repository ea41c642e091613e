//! Reactive dependency cache.
//!
//! Memoizes derivations under opaque string keys and tracks which keys were
//! read while computing which other keys. Deleting a key deletes everything
//! that (transitively) depended on it, so an external file-change event only
//! has to delete the file's own key.
//!
//! The host model is single-threaded cooperative; the state still sits behind
//! a re-entrant lock so that a parallel host can share the cache by locking
//! around compute/delete.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use parking_lot::ReentrantMutex;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use thiserror::Error;

/// A computation re-entered a key that is still being computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cyclic dependency detected: {path}")]
pub struct CycleError {
    /// The offending key chain, e.g. `a -> b -> a`.
    pub path: String,
}

#[derive(Default)]
struct CacheState {
    values: FxHashMap<SmolStr, Rc<dyn Any>>,
    /// key → keys it read while computing
    deps: FxHashMap<SmolStr, FxHashSet<SmolStr>>,
    /// key → keys whose computation read it
    dependents: FxHashMap<SmolStr, FxHashSet<SmolStr>>,
    /// keys currently being computed, outermost first
    active: Vec<SmolStr>,
}

impl CacheState {
    fn record_edge(&mut self, child: &SmolStr) {
        if let Some(parent) = self.active.last() {
            if parent != child {
                self.deps
                    .entry(parent.clone())
                    .or_default()
                    .insert(child.clone());
                self.dependents
                    .entry(child.clone())
                    .or_default()
                    .insert(parent.clone());
            }
        }
    }

    fn remove(&mut self, key: &SmolStr) {
        // Every dependent goes first so that no dependent survives its input.
        let dependents: Vec<SmolStr> = self
            .dependents
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        for dependent in dependents {
            self.remove(&dependent);
        }
        self.values.remove(key);
        self.dependents.remove(key);
        if let Some(children) = self.deps.remove(key) {
            for child in children {
                if let Some(set) = self.dependents.get_mut(&child) {
                    set.remove(key);
                }
            }
        }
    }
}

/// String-keyed memo cache with dynamic dependency tracking.
pub struct ReactiveCache {
    state: ReentrantMutex<RefCell<CacheState>>,
}

impl Default for ReactiveCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactiveCache {
    pub fn new() -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(CacheState::default())),
        }
    }

    /// Return the cached value for `key`, computing it with `f` on a miss.
    ///
    /// While `f` runs, `key` is the current computation: any nested `compute`
    /// call records a dependency edge from `key` to the nested key. Nested
    /// calls re-entering `key` itself fail with a [`CycleError`].
    pub fn compute<T: Clone + 'static>(
        &self,
        key: &str,
        f: impl FnOnce() -> T,
    ) -> Result<T, CycleError> {
        let guard = self.state.lock();
        let key = SmolStr::new(key);
        {
            let mut state = guard.borrow_mut();
            state.record_edge(&key);
            if let Some(value) = state.values.get(&key) {
                let value = value
                    .downcast_ref::<T>()
                    .expect("cache key reused with a different value type")
                    .clone();
                return Ok(value);
            }
            if let Some(start) = state.active.iter().position(|k| *k == key) {
                let mut path: Vec<&str> = state.active[start..].iter().map(|k| k.as_str()).collect();
                path.push(key.as_str());
                return Err(CycleError {
                    path: path.join(" -> "),
                });
            }
            state.active.push(key.clone());
        }
        // The borrow is released here: `f` may re-enter `compute`.
        tracing::trace!(key = %key, "cache miss");
        let value = f();
        let mut state = guard.borrow_mut();
        state.active.pop();
        state.values.insert(key, Rc::new(value.clone()));
        Ok(value)
    }

    /// Drop `key` and, first, everything that transitively depended on it.
    pub fn delete(&self, key: &str) {
        let guard = self.state.lock();
        tracing::trace!(key, "cache delete");
        guard.borrow_mut().remove(&SmolStr::new(key));
    }

    /// Whether a value is currently cached under `key`.
    pub fn contains(&self, key: &str) -> bool {
        let guard = self.state.lock();
        let contains = guard.borrow().values.contains_key(key);
        contains
    }

    /// Number of cached values.
    pub fn len(&self) -> usize {
        let guard = self.state.lock();
        let len = guard.borrow().values.len();
        len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_memoizes() {
        let cache = ReactiveCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let v = cache
                .compute("k", || {
                    calls += 1;
                    42u32
                })
                .unwrap();
            assert_eq!(v, 42);
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_delete_cascades_to_dependents() {
        let cache = ReactiveCache::new();
        let derived = |cache: &ReactiveCache| {
            cache
                .compute("derived", || {
                    let base = cache.compute("base", || 1u32).unwrap();
                    base + 1
                })
                .unwrap()
        };
        assert_eq!(derived(&cache), 2);
        assert!(cache.contains("base"));
        assert!(cache.contains("derived"));

        cache.delete("base");
        assert!(!cache.contains("base"));
        assert!(!cache.contains("derived"));
    }

    #[test]
    fn test_delete_leaves_unrelated_keys() {
        let cache = ReactiveCache::new();
        cache.compute("a", || 1u32).unwrap();
        cache.compute("b", || 2u32).unwrap();
        cache.delete("a");
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
    }

    #[test]
    fn test_cycle_detection() {
        let cache = ReactiveCache::new();
        let result: Result<u32, CycleError> = cache.compute("a", || {
            cache
                .compute("b", || match cache.compute("a", || 1u32) {
                    Err(e) => {
                        assert_eq!(e.path, "a -> b -> a");
                        0
                    }
                    Ok(v) => v,
                })
                .unwrap()
        });
        assert_eq!(result.unwrap(), 0);
    }

    #[test]
    fn test_edge_recorded_on_hit() {
        let cache = ReactiveCache::new();
        cache.compute("leaf", || 7u32).unwrap();
        cache
            .compute("root", || cache.compute("leaf", || 7u32).unwrap())
            .unwrap();
        // The edge was recorded on the cache hit, so the cascade still works.
        cache.delete("leaf");
        assert!(!cache.contains("root"));
    }
}
