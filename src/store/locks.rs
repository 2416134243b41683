//! Per-unit mutual exclusion.
//!
//! The deck store's atomic rewrite protects a document against torn writes,
//! not against two writers that both passed the duplicate check. Every
//! read-modify-write against one unit (accept, sweep) must hold that unit's
//! lock; distinct units proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct UnitLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UnitLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock handle for a unit directory key. Clone-cheap; callers hold the
    /// returned mutex for the duration of the critical section.
    pub fn for_unit(&self, dir_key: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap();
        map.entry(dir_key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
