//! URL slugs for mosque pages.
//!
//! A slug is derived from name and postcode, then made unique against every
//! slug already persisted with the same base by appending `-2`, `-3`, ...

use std::collections::HashSet;

const FALLBACK_SLUG: &str = "mosque";

/// Base slug for a mosque: lowercase ASCII alphanumerics separated by
/// single hyphens.
#[must_use]
pub fn slugify(name: &str, postcode: Option<&str>) -> String {
    let source = match postcode {
        Some(pc) => format!("{name} {pc}"),
        None => name.to_string(),
    };

    let mut slug = String::with_capacity(source.len());
    let mut pending_hyphen = false;
    for c in source.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Hands out slugs that collide with nothing already taken.
///
/// Seed it with the persisted slugs sharing a base, then call
/// [`SlugAllocator::allocate`]; every allocation is remembered so later
/// calls in the same batch never repeat it.
#[derive(Debug, Default, Clone)]
pub struct SlugAllocator {
    taken: HashSet<String>,
}

impl SlugAllocator {
    /// Creates an allocator with nothing taken.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks persisted slugs as taken.
    pub fn extend<I>(&mut self, slugs: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.taken.extend(slugs);
    }

    /// Returns `true` if `slug` is already taken.
    #[must_use]
    pub fn is_taken(&self, slug: &str) -> bool {
        self.taken.contains(slug)
    }

    /// Returns the first free slug among `base`, `base-2`, `base-3`, ...
    /// and marks it taken.
    pub fn allocate(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut suffix: u32 = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}-{suffix}");
            suffix = suffix.saturating_add(1);
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    /// Releases a slug whose insert did not go through.
    pub fn release(&mut self, slug: &str) {
        self.taken.remove(slug);
    }
}
