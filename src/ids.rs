//! Collision-free cell identifiers.

use std::collections::HashSet;

const MAX_ID_LEN: usize = 50;

/// Hands out XML-safe cell ids, never the same one twice.
///
/// The sentinel ids `"0"` and `"1"` are reserved up front.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    used: HashSet<String>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            used: ["0", "1"].into_iter().map(String::from).collect(),
        }
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id derived from a human-readable seed.
    ///
    /// The sanitized seed is used as-is when free; otherwise `_1`, `_2`, ...
    /// is appended until an unused id turns up.
    pub fn allocate(&mut self, seed: &str) -> String {
        let base = sanitize(seed);
        let mut id = base.clone();
        let mut counter = 1u64;
        while self.used.contains(&id) {
            id = format!("{}_{}", base, counter);
            counter += 1;
        }
        self.used.insert(id.clone());
        id
    }

    pub fn contains(&self, id: &str) -> bool {
        self.used.contains(id)
    }
}

/// Replace everything outside `[A-Za-z0-9_-]` with `_`, prefix a leading
/// digit with `id_` and cap the result at 50 characters.
pub fn sanitize(seed: &str) -> String {
    let mut out: String = seed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, "id_");
    }

    // Only ASCII survives sanitizing, so byte truncation is char-safe.
    out.truncate(MAX_ID_LEN);
    out
}
