//! Item catalog: static disposal metadata keyed by item identifier.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{BinColor, CouncilName, ItemId};

const BUILTIN_ITEMS: &str = include_str!("../data/items.json");

#[derive(thiserror::Error, Debug)]
/// Errors detected while loading or cross-checking the static catalogs.
pub enum CatalogError {
    /// Catalog file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Catalog JSON is invalid, including unknown bin colours.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Two items share an identifier.
    #[error("Duplicate item id: {0}")]
    DuplicateItem(ItemId),
    /// Two councils share a name.
    #[error("Duplicate council: {0}")]
    DuplicateCouncil(CouncilName),
    /// No council was configured.
    #[error("Council catalog is empty")]
    NoCouncils,
    /// A postcode prefix belongs to more than one council.
    #[error("Postcode prefix {prefix} is claimed by both {first} and {second}")]
    OverlappingPrefix {
        /// The shared prefix.
        prefix: String,
        /// Council that declared it first.
        first: CouncilName,
        /// Council that declared it again.
        second: CouncilName,
    },
    /// The default council is not part of the catalog.
    #[error("Unknown default council: {0}")]
    UnknownDefaultCouncil(CouncilName),
    /// An item carries a rule for a council that does not exist.
    #[error("Item {item} has a location rule for unknown council {council}")]
    UnknownRuleCouncil {
        /// Offending item.
        item: ItemId,
        /// Council named by the rule.
        council: CouncilName,
    },
    /// Neither the item nor the council provide an instruction.
    #[error("Item {item} has no disposal instruction for council {council}")]
    MissingInstruction {
        /// Item without coverage.
        item: ItemId,
        /// Council without a matching bin rule.
        council: CouncilName,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Disposal metadata for a single item.
pub struct ItemRecord {
    /// Unique identifier, matched against detector labels.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Other names users search for.
    #[serde(default)]
    pub alternate_names: Vec<String>,
    /// Semantic group (fruit, packaging, organic, ...).
    pub category: String,
    /// Target bin.
    pub bin_color: BinColor,
    /// General-purpose instruction.
    pub disposal_note: String,
    /// Ambiguous disposal that needs manual confirmation.
    #[serde(default)]
    pub requires_user_input: bool,
    /// Usually bundled with packaging that must be separated.
    #[serde(default)]
    pub packaging_warning: bool,
    /// Council-specific overrides of the council's bin default.
    #[serde(default)]
    pub location_rules: BTreeMap<CouncilName, String>,
}

impl ItemRecord {
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .alternate_names
                .iter()
                .any(|alias| alias.to_lowercase().contains(needle))
            || self.category.to_lowercase().contains(needle)
            || self.disposal_note.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Deserialize)]
struct ItemCatalogFile {
    items: Vec<ItemRecord>,
}

/// Read-only collection of [`ItemRecord`]s in catalog order.
#[derive(Debug, Clone)]
pub struct ItemCatalog {
    items: Vec<ItemRecord>,
    index: HashMap<ItemId, usize>,
}

impl ItemCatalog {
    /// Build a catalog, rejecting duplicate identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateItem`] when two records share an id.
    pub fn new(items: Vec<ItemRecord>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if index.insert(item.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateItem(item.id.clone()));
            }
        }
        Ok(Self { items, index })
    }

    /// Parse a catalog from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] for invalid JSON, unknown bin colours or duplicates.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let file: ItemCatalogFile = serde_json::from_str(raw)?;
        Self::new(file.items)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] when the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Catalog shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the embedded data is corrupt.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_ITEMS)
    }

    /// Look up an item by identifier.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&ItemRecord> {
        self.index
            .get(id)
            .and_then(|&position| self.items.get(position))
    }

    /// Iterate over all items in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemRecord> {
        self.items.iter()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Case-insensitive substring search over names, aliases, category and note.
    ///
    /// An empty query lists the catalog.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize, offset: usize) -> Vec<&ItemRecord> {
        let needle = query.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| needle.is_empty() || item.matches(&needle))
            .skip(offset)
            .take(limit)
            .collect()
    }

    /// Items whose category equals `category`, ignoring case.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&ItemRecord> {
        self.items
            .iter()
            .filter(|item| item.category.eq_ignore_ascii_case(category.trim()))
            .collect()
    }

    /// Items bound for the given bin.
    #[must_use]
    pub fn by_bin_color(&self, color: BinColor) -> Vec<&ItemRecord> {
        self.items
            .iter()
            .filter(|item| item.bin_color == color)
            .collect()
    }

    /// Sorted, de-duplicated category names.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        self.items
            .iter()
            .map(|item| item.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = ItemCatalog::builtin().expect("builtin items");
        assert!(!catalog.is_empty(), "builtin catalog should not be empty");
        let apple = catalog.get(&ItemId::from("apple")).expect("apple present");
        assert_eq!(apple.bin_color, BinColor::Brown);
    }

    #[test]
    fn unknown_bin_color_fails_at_load() {
        let raw = r#"{"items":[{"id":"x","name":"X","category":"c","bin_color":"purple","disposal_note":"n"}]}"#;
        assert!(matches!(
            ItemCatalog::from_json(raw),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let raw = r#"{"items":[
            {"id":"x","name":"X","category":"c","bin_color":"blue","disposal_note":"n"},
            {"id":"x","name":"Y","category":"c","bin_color":"black","disposal_note":"n"}
        ]}"#;
        assert!(matches!(
            ItemCatalog::from_json(raw),
            Err(CatalogError::DuplicateItem(id)) if id.as_str() == "x"
        ));
    }

    #[test]
    fn search_matches_alternate_names_and_paginates() {
        let catalog = ItemCatalog::builtin().expect("builtin items");

        let hits = catalog.search("Soda", 10, 0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.first().map(|item| item.id.as_str()), Some("plastic_bottle"));

        let fruit = catalog.search("fruit", 100, 0);
        let second_page = catalog.search("fruit", 2, 1);
        assert_eq!(second_page.as_slice(), fruit.get(1..3).unwrap_or_default());
    }

    #[test]
    fn empty_search_lists_everything() {
        let catalog = ItemCatalog::builtin().expect("builtin items");
        assert_eq!(catalog.search("  ", usize::MAX, 0).len(), catalog.len());
    }

    #[test]
    fn categories_are_sorted_and_unique() {
        let catalog = ItemCatalog::builtin().expect("builtin items");
        let categories = catalog.categories();
        let mut sorted = categories.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(categories, sorted);
        assert!(categories.contains(&"packaging"));
    }

    #[test]
    fn filters_by_category_and_bin() {
        let catalog = ItemCatalog::builtin().expect("builtin items");
        assert!(
            catalog
                .by_category("FRUIT")
                .iter()
                .all(|item| item.category == "fruit")
        );
        assert!(
            catalog
                .by_bin_color(BinColor::Orange)
                .iter()
                .any(|item| item.id.as_str() == "cooking_oil")
        );
    }
}
