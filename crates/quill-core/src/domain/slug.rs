//! Slug derivation for posts.

/// Maximum slug length, matching the `posts.slug` column.
pub const MAX_SLUG_LEN: usize = 200;

/// Room left for a `-NNNN` suffix when truncating the base slug.
const SUFFIX_RESERVE: usize = 8;

const FALLBACK_SLUG: &str = "post";

/// Derive the base slug from a post title.
///
/// Letters are lowercased and whitespace runs become a single `-`.
/// Only ASCII alphanumerics, `-` and `_` survive.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.trim().chars() {
        if c.is_whitespace() {
            pending_separator = true;
            continue;
        }

        let lower = c.to_ascii_lowercase();
        if !(lower.is_ascii_alphanumeric() || lower == '-' || lower == '_') {
            continue;
        }

        if pending_separator && !slug.is_empty() {
            slug.push('-');
        }
        pending_separator = false;
        slug.push(lower);
    }

    if slug.is_empty() {
        return FALLBACK_SLUG.to_string();
    }

    slug.truncate(MAX_SLUG_LEN - SUFFIX_RESERVE);
    slug
}

/// The `attempt`-th candidate for a base slug: `base`, `base-1`, `base-2`, ...
pub fn candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}

/// Check a caller-supplied slug.
pub fn is_valid(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}
