//! Catalog ordering and filtering rules.
//!
//! The gallery is a pure function of (projects, selected category). Both
//! halves live here so the API layer and tests share one implementation:
//! category filtering and the manual-order sort with its "missing order
//! sorts last" sentinel.
//!
//! Normalization happens once, at the read boundary: rows with a NULL
//! `sort_order` are given [`SENTINEL_ORDER`] when the catalog snapshot is
//! built, never in individual views.

use crate::error::CoreError;
use crate::types::DbId;

/// Placeholder sort position for projects without an explicit order.
/// Anything with a real order value sorts ahead of it.
pub const SENTINEL_ORDER: i64 = i64::MAX;

/// Fallback category id assigned when a project's last category is deleted.
/// No `categories` row ever carries this id.
pub const UNCATEGORIZED_CATEGORY: DbId = 0;

/// Lower bound of the plausible project year range.
const MIN_PROJECT_YEAR: i32 = 1900;

/// An entry that can be ordered and filtered by the catalog rules.
///
/// Implemented by the database project model; tests use a local stub.
pub trait CatalogEntry {
    /// Explicit manual sort position, if one was ever assigned.
    fn sort_order(&self) -> Option<i64>;

    /// Ids of the categories this entry belongs to.
    fn category_ids(&self) -> &[DbId];
}

/// Category selection for the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Every project, unfiltered.
    All,
    /// Only projects whose category set contains this id.
    Id(DbId),
}

impl CategoryFilter {
    /// Whether an entry with the given category set passes this filter.
    ///
    /// Entries with no categories are excluded from every non-`All` filter.
    pub fn matches(&self, categories: &[DbId]) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Id(id) => categories.contains(id),
        }
    }
}

/// Normalize a stored sort position, substituting the sentinel for NULL.
pub fn normalized_order(sort_order: Option<i64>) -> i64 {
    sort_order.unwrap_or(SENTINEL_ORDER)
}

/// The gallery view: filter by category, then sort ascending by order.
///
/// The sort is stable, so entries with equal (or equally missing) order
/// values keep the store's return order; there is no secondary key.
pub fn gallery_view<'a, T: CatalogEntry>(
    entries: &'a [T],
    filter: &CategoryFilter,
) -> Vec<&'a T> {
    let mut selected: Vec<&T> = entries
        .iter()
        .filter(|e| filter.matches(e.category_ids()))
        .collect();
    selected.sort_by_key(|e| normalized_order(e.sort_order()));
    selected
}

/// Reject an empty category selection before any network call is made.
pub fn validate_category_selection(categories: &[DbId]) -> Result<(), CoreError> {
    if categories.is_empty() {
        return Err(CoreError::Validation(
            "At least one category must be selected".into(),
        ));
    }
    Ok(())
}

/// Validate that a project year falls in the plausible range
/// (1900 through next year).
pub fn validate_year(year: i32) -> Result<(), CoreError> {
    use chrono::Datelike;
    let max = chrono::Utc::now().year() + 1;
    if year < MIN_PROJECT_YEAR || year > max {
        return Err(CoreError::Validation(format!(
            "Year {year} is out of range ({MIN_PROJECT_YEAR}..={max})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Entry {
        order: Option<i64>,
        categories: Vec<DbId>,
    }

    impl CatalogEntry for Entry {
        fn sort_order(&self) -> Option<i64> {
            self.order
        }
        fn category_ids(&self) -> &[DbId] {
            &self.categories
        }
    }

    fn entry(order: Option<i64>, categories: &[DbId]) -> Entry {
        Entry {
            order,
            categories: categories.to_vec(),
        }
    }

    #[test]
    fn missing_order_sorts_last() {
        let entries = vec![
            entry(None, &[1]),
            entry(Some(2), &[1]),
            entry(Some(1), &[1]),
        ];
        let view = gallery_view(&entries, &CategoryFilter::All);
        let orders: Vec<Option<i64>> = view.iter().map(|e| e.sort_order()).collect();
        assert_eq!(orders, vec![Some(1), Some(2), None]);
    }

    #[test]
    fn all_filter_returns_everything() {
        let entries = vec![entry(Some(1), &[1]), entry(Some(2), &[]), entry(None, &[2])];
        assert_eq!(gallery_view(&entries, &CategoryFilter::All).len(), 3);
    }

    #[test]
    fn category_filter_selects_exact_subset() {
        let entries = vec![
            entry(Some(1), &[1, 2]),
            entry(Some(2), &[2]),
            entry(Some(3), &[3]),
        ];
        let view = gallery_view(&entries, &CategoryFilter::Id(2));
        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|e| e.category_ids().contains(&2)));
    }

    #[test]
    fn entries_without_categories_excluded_from_non_all_filters() {
        let entries = vec![entry(Some(1), &[]), entry(Some(2), &[5])];
        let view = gallery_view(&entries, &CategoryFilter::Id(5));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].sort_order(), Some(2));
    }

    #[test]
    fn ties_preserve_input_order() {
        let entries = vec![entry(Some(7), &[1]), entry(Some(7), &[2])];
        let view = gallery_view(&entries, &CategoryFilter::All);
        assert_eq!(view[0].category_ids(), &[1]);
        assert_eq!(view[1].category_ids(), &[2]);
    }

    #[test]
    fn empty_category_selection_rejected() {
        assert!(validate_category_selection(&[]).is_err());
        assert!(validate_category_selection(&[1]).is_ok());
    }

    #[test]
    fn year_bounds() {
        assert!(validate_year(1899).is_err());
        assert!(validate_year(2020).is_ok());
        assert!(validate_year(9999).is_err());
    }
}
