#![forbid(unsafe_code)]

//! "Don't show again" preference capability.
//!
//! Persistence is owned by the host. The engine only needs a boolean keyed by
//! a caller-supplied string, so the capability is a two-method trait. When no
//! store is injected the tour falls back to [`MemoryPreferences`].

use std::collections::HashMap;
use std::fmt;

/// Boolean preference storage injected by the host.
pub trait PreferenceStore {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Read a preference. `None` means "never written".
    fn get(&self, key: &str) -> Option<bool>;

    /// Write a preference.
    fn set(&mut self, key: &str, value: bool);
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory preference store. State is lost when the process exits.
#[derive(Default, Clone)]
pub struct MemoryPreferences {
    data: HashMap<String, bool>,
}

impl MemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    #[must_use]
    pub fn with_entries(entries: impl IntoIterator<Item = (String, bool)>) -> Self {
        Self {
            data: entries.into_iter().collect(),
        }
    }
}

impl PreferenceStore for MemoryPreferences {
    fn name(&self) -> &str {
        "MemoryPreferences"
    }

    fn get(&self, key: &str) -> Option<bool> {
        self.data.get(key).copied()
    }

    fn set(&mut self, key: &str, value: bool) {
        self.data.insert(key.to_owned(), value);
    }
}

impl fmt::Debug for MemoryPreferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPreferences")
            .field("entries", &self.data.len())
            .finish()
    }
}
