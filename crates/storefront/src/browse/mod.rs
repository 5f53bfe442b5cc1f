//! Client-side product browsing: filtering, search, sorting, facets.
//!
//! Everything here is a pure, synchronous function over the cached catalog
//! snapshot - no I/O, no hidden state. The UI re-runs the pipeline on every
//! predicate change; identical inputs always produce identical output
//! ordering.
//!
//! Predicates combine as a conjunction: category AND subcategory set AND
//! free text AND price bucket. The free-text query is mirrored in a single
//! URL parameter (`q`) so search results are shareable.

use husk_threads_core::{CategoryId, SubcategoryId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Product, Subcategory};

/// URL query parameter carrying the free-text search predicate.
pub const SEARCH_PARAM: &str = "q";

// =============================================================================
// Predicates
// =============================================================================

/// Category tab selection: everything, or exactly one category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategorySelector {
    /// No category restriction (the "ALL" tab).
    #[default]
    All,
    /// Restrict to one category.
    Category(CategoryId),
}

/// Mutually exclusive price range over the effective price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriceBucket {
    /// No price restriction.
    #[default]
    All,
    /// Effective price below 500.
    Under500,
    /// Effective price from 500 to 1000, inclusive on both ends.
    From500To1000,
    /// Effective price above 1000.
    Above1000,
}

impl PriceBucket {
    /// The specific bucket a price falls into (never `All`).
    ///
    /// The three specific buckets partition the price domain: every price
    /// lands in exactly one.
    #[must_use]
    pub fn of(price: Decimal) -> Self {
        if price < Decimal::from(500) {
            Self::Under500
        } else if price <= Decimal::from(1000) {
            Self::From500To1000
        } else {
            Self::Above1000
        }
    }

    /// Whether a price falls inside this bucket.
    #[must_use]
    pub fn contains(self, price: Decimal) -> bool {
        match self {
            Self::All => true,
            _ => Self::of(price) == self,
        }
    }

    /// Parse from URL parameter value.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "under-500" => Self::Under500,
            "500-1000" => Self::From500To1000,
            "above-1000" => Self::Above1000,
            _ => Self::All,
        }
    }

    /// Convert to URL parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Under500 => "under-500",
            Self::From500To1000 => "500-1000",
            Self::Above1000 => "above-1000",
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// Catalog order, no reordering.
    #[default]
    Relevance,
    /// Effective price, lowest first.
    PriceAsc,
    /// Effective price, highest first.
    PriceDesc,
    /// Name, case-insensitive lexicographic.
    NameAsc,
}

impl SortMode {
    /// Parse from URL parameter value.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "price-ascending" | "price_asc" => Self::PriceAsc,
            "price-descending" | "price_desc" => Self::PriceDesc,
            "name-ascending" | "name_asc" => Self::NameAsc,
            _ => Self::Relevance,
        }
    }

    /// Convert to URL parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceAsc => "price-ascending",
            Self::PriceDesc => "price-descending",
            Self::NameAsc => "name-ascending",
        }
    }
}

/// The full predicate set the pipeline runs over.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BrowseFilters {
    /// Category tab.
    pub category: CategorySelector,
    /// Selected subcategories, OR-combined; empty matches everything.
    pub subcategories: Vec<SubcategoryId>,
    /// Free-text query; empty matches everything.
    pub query: String,
    /// Price bucket.
    pub price: PriceBucket,
    /// Result ordering.
    pub sort: SortMode,
}

impl BrowseFilters {
    /// Filters matching the whole catalog in store order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch category tabs. Selecting a category (or "ALL") resets any
    /// subcategory selection, which belongs to the previous tab.
    pub fn select_category(&mut self, selector: CategorySelector) {
        self.category = selector;
        self.subcategories.clear();
    }

    /// Toggle a subcategory in or out of the selection.
    pub fn toggle_subcategory(&mut self, id: SubcategoryId) {
        if let Some(pos) = self.subcategories.iter().position(|s| *s == id) {
            self.subcategories.remove(pos);
        } else {
            self.subcategories.push(id);
        }
    }

    /// Deselect every subcategory.
    pub fn clear_subcategories(&mut self) {
        self.subcategories.clear();
    }

    fn matches(&self, product: &Product) -> bool {
        let category_match = match &self.category {
            CategorySelector::All => true,
            CategorySelector::Category(id) => product.category_id == *id,
        };

        let subcategory_match = self.subcategories.is_empty()
            || product
                .subcategory_id
                .as_ref()
                .is_some_and(|sub| self.subcategories.contains(sub));

        category_match
            && subcategory_match
            && matches_text(product, &self.query)
            && self.price.contains(product.effective_price())
    }
}

/// Case-insensitive substring match against name, description, and tags.
///
/// The query is plain text: regex metacharacters have no special meaning.
fn matches_text(product: &Product, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    product.name.to_lowercase().contains(&needle)
        || product.description.to_lowercase().contains(&needle)
        || product
            .tags
            .iter()
            .flatten()
            .any(|tag| tag.to_lowercase().contains(&needle))
}

// =============================================================================
// Pipeline
// =============================================================================

/// Run the predicate conjunction and sort over a catalog snapshot.
///
/// Pure function of `(products, filters)`; "relevance" keeps the snapshot
/// order, and all sorts are stable.
#[must_use]
pub fn filter_and_sort(products: &[Product], filters: &BrowseFilters) -> Vec<Product> {
    let mut results: Vec<Product> = products
        .iter()
        .filter(|p| filters.matches(p))
        .cloned()
        .collect();

    match filters.sort {
        SortMode::Relevance => {}
        SortMode::PriceAsc => results.sort_by(|a, b| a.effective_price().cmp(&b.effective_price())),
        SortMode::PriceDesc => {
            results.sort_by(|a, b| b.effective_price().cmp(&a.effective_price()));
        }
        SortMode::NameAsc => results.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        }),
    }

    results
}

// =============================================================================
// Facets
// =============================================================================

/// The subcategory options offered for the current category tab.
///
/// Empty under "ALL" - subcategory filtering only makes sense inside one
/// category. (The global search view facets on the full category list
/// instead; that is just the catalog's category collection.)
#[must_use]
pub fn subcategory_options(
    subcategories: &[Subcategory],
    selector: &CategorySelector,
) -> Vec<Subcategory> {
    match selector {
        CategorySelector::All => Vec::new(),
        CategorySelector::Category(id) => subcategories
            .iter()
            .filter(|sub| sub.category_id == *id)
            .cloned()
            .collect(),
    }
}

// =============================================================================
// URL query state
// =============================================================================

/// Encode the free-text predicate as a URL query string (`q=...`).
///
/// An empty or whitespace-only query encodes to an empty string (no
/// parameter at all).
#[must_use]
pub fn encode_search_param(query: &str) -> String {
    if query.trim().is_empty() {
        return String::new();
    }
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair(SEARCH_PARAM, query)
        .finish()
}

/// Extract the free-text predicate from a URL query string.
///
/// Returns `None` when the parameter is absent. Round-trips exactly with
/// [`encode_search_param`].
#[must_use]
pub fn parse_search_param(query_string: &str) -> Option<String> {
    url::form_urlencoded::parse(query_string.as_bytes())
        .find(|(key, _)| key == SEARCH_PARAM)
        .map(|(_, value)| value.into_owned())
}
