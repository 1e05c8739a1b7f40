//! URL slugs for merchants, products and collections.

/// Maximum slug length.
pub const MAX_SLUG_LENGTH: usize = 96;

/// Errors produced by [`slugify`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    /// Nothing usable remained after stripping.
    #[error("name must contain at least one letter or digit")]
    Empty,
}

/// Turn a display name into a URL slug.
///
/// ASCII letters and digits are kept (lowercased); every other run of
/// characters becomes a single `-`. Leading and trailing dashes are dropped
/// and the result is cut to [`MAX_SLUG_LENGTH`].
///
/// ```
/// use luxora_core::slug::slugify;
///
/// assert_eq!(slugify("Autumn / Winter 2026").unwrap(), "autumn-winter-2026");
/// ```
///
/// # Errors
///
/// Returns [`SlugError::Empty`] when `name` has no ASCII letters or digits.
pub fn slugify(name: &str) -> Result<String, SlugError> {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
        if slug.len() >= MAX_SLUG_LENGTH {
            break;
        }
    }

    slug.truncate(MAX_SLUG_LENGTH);
    let slug = slug.trim_end_matches('-').to_owned();

    if slug.is_empty() {
        Err(SlugError::Empty)
    } else {
        Ok(slug)
    }
}

/// Append a numeric suffix to make a slug unique: `tote` -> `tote-2`.
#[must_use]
pub fn with_suffix(slug: &str, n: u32) -> String {
    let suffix = format!("-{n}");
    let keep = MAX_SLUG_LENGTH.saturating_sub(suffix.len()).min(slug.len());
    let base = slug.get(..keep).unwrap_or(slug).trim_end_matches('-');
    format!("{base}{suffix}")
}
