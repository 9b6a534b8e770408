// 🔎 Name Resolver - best-effort display names
// Any fetch failure degrades to the "Unknown" placeholder; nothing propagates

use crate::config::UNKNOWN_NAME;
use crate::steam::MemberSource;
use std::cell::Cell;

pub struct NameResolver<'a> {
    source: &'a dyn MemberSource,
    lookups: Cell<usize>,
    fallbacks: Cell<usize>,
}

impl<'a> NameResolver<'a> {
    pub fn new(source: &'a dyn MemberSource) -> Self {
        NameResolver {
            source,
            lookups: Cell::new(0),
            fallbacks: Cell::new(0),
        }
    }

    /// Fetch the display name for `id`, or `"Unknown"` if that fails
    pub fn resolve_name(&self, id: &str) -> String {
        self.lookups.set(self.lookups.get() + 1);

        match self.source.fetch_display_name(id) {
            Ok(name) if !name.trim().is_empty() => name.trim().to_string(),
            Ok(_) => {
                log::warn!("⚠️ Empty name returned for {}", id);
                self.fallback()
            }
            Err(e) => {
                log::warn!("⚠️ Error fetching name for {}: {}", id, e);
                self.fallback()
            }
        }
    }

    fn fallback(&self) -> String {
        self.fallbacks.set(self.fallbacks.get() + 1);
        UNKNOWN_NAME.to_string()
    }

    /// Number of names fetched so far
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }

    /// Number of lookups that ended in the placeholder
    pub fn fallbacks(&self) -> usize {
        self.fallbacks.get()
    }
}

/// Sort-key form of a name: the prefix tag, if present, is stripped
pub fn strip_prefix_tag<'n>(name: &'n str, prefix: &str) -> &'n str {
    match name.strip_prefix(prefix) {
        Some(rest) => rest.trim_start(),
        None => name,
    }
}
