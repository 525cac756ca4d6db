//! Category slug derivation.

/// Derive a URL slug from a display name: trimmed, lowercased, spaces
/// replaced with hyphens.
pub fn slugify(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}
