//! Council catalog, postcode resolution and collection schedules.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;
use crate::model::{BinColor, CollectionEvent, CouncilName, DateRange, WasteStream};
use crate::ports::InputError;

const BUILTIN_COUNCILS: &str = include_str!("../data/councils.json");

static POSTCODE_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{1,2}[0-9][A-Z0-9]? ?[0-9][A-Z]{2}$").expect("postcode regex is valid")
});

/// Outward code of a postcode, uppercased.
///
/// Valid postcodes written without a space (`E16AN`) are split before the inward code;
/// anything else yields its leading whitespace-delimited token. Blank input yields an
/// empty string.
#[must_use]
pub fn outward_code(postcode: &str) -> String {
    if let Ok(valid) = Postcode::parse(postcode) {
        return valid.outward();
    }

    postcode
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
/// A syntactically valid UK postcode, uppercased.
pub struct Postcode(String);

impl Postcode {
    /// Validate the UK postcode format, e.g. `SW1A 1AA` or `e16an`.
    ///
    /// The result is uppercased with a single space before the three-character inward code.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidPostcode`] when the format does not match.
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let compact = raw.split_whitespace().collect::<String>().to_ascii_uppercase();
        if !POSTCODE_FORMAT.is_match(&compact) {
            return Err(InputError::InvalidPostcode(raw.to_owned()));
        }

        let (outward, inward) = compact
            .split_at_checked(compact.len().saturating_sub(3))
            .ok_or_else(|| InputError::InvalidPostcode(raw.to_owned()))?;
        Ok(Self(format!("{outward} {inward}")))
    }

    /// Full postcode.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Outward code, e.g. `SW1A`.
    #[must_use]
    pub fn outward(&self) -> String {
        self.0
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_owned()
    }
}

impl fmt::Display for Postcode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Static description of a council and its disposal policy.
pub struct CouncilRecord {
    /// URL-friendly slug.
    pub id: String,
    /// Unique name used as key in item location rules.
    pub name: CouncilName,
    /// Full display name.
    pub display_name: String,
    /// Outward codes served by the council.
    pub postcode_prefixes: Vec<String>,
    /// Category-level policy, e.g. `disposable_cups -> general_waste`.
    #[serde(default)]
    pub rule_overrides: BTreeMap<String, String>,
    /// Default instruction per bin colour.
    #[serde(default)]
    pub bin_rules: BTreeMap<BinColor, String>,
    /// Weekday each kerbside stream is collected on.
    #[serde(default)]
    pub collection_days: BTreeMap<WasteStream, Weekday>,
    /// Free-text guidance shown with the rules.
    #[serde(default)]
    pub special_instructions: Vec<String>,
}

impl CouncilRecord {
    /// Council default instruction for a bin.
    #[must_use]
    pub fn bin_rule(&self, color: BinColor) -> Option<&str> {
        self.bin_rules.get(&color).map(String::as_str)
    }

    /// Next collection of every configured stream on or after `today`.
    #[must_use]
    pub fn next_collections(&self, today: NaiveDate) -> Vec<CollectionEvent> {
        let mut events = self
            .collection_days
            .iter()
            .map(|(&stream, &weekday)| {
                let ahead = days_until(today.weekday(), weekday);
                let date = today
                    .checked_add_days(Days::new(ahead))
                    .unwrap_or(today);
                CollectionEvent {
                    date,
                    weekday,
                    stream,
                }
            })
            .collect::<Vec<_>>();
        events.sort_by_key(|event| (event.date, event.stream));
        events
    }

    /// All collections inside the inclusive `range`, sorted by date.
    #[must_use]
    pub fn collections_within(&self, range: DateRange) -> Vec<CollectionEvent> {
        let mut events = Vec::new();
        for (&stream, &weekday) in &self.collection_days {
            let ahead = days_until(range.start.weekday(), weekday);
            let mut next = range.start.checked_add_days(Days::new(ahead));
            while let Some(date) = next.filter(|date| *date <= range.end) {
                events.push(CollectionEvent {
                    date,
                    weekday,
                    stream,
                });
                next = date.checked_add_days(Days::new(7));
            }
        }
        events.sort_by_key(|event| (event.date, event.stream));
        events
    }
}

fn days_until(from: Weekday, to: Weekday) -> u64 {
    let from = u64::from(from.num_days_from_monday());
    let to = u64::from(to.num_days_from_monday());
    (to + 7 - from) % 7
}

fn find_council(
    councils: &[CouncilRecord],
    name: &CouncilName,
) -> Result<CouncilRecord, CatalogError> {
    councils
        .iter()
        .find(|council| &council.name == name)
        .cloned()
        .ok_or_else(|| CatalogError::UnknownDefaultCouncil(name.clone()))
}

#[derive(Debug, Deserialize)]
struct CouncilCatalogFile {
    default_council: CouncilName,
    councils: Vec<CouncilRecord>,
}

/// Read-only, ordered council table with a default council.
#[derive(Debug, Clone)]
pub struct CouncilCatalog {
    councils: Vec<CouncilRecord>,
    default_council: CouncilRecord,
}

impl CouncilCatalog {
    /// Build a catalog; prefixes are uppercased and must be disjoint across councils.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] for empty input, duplicate names, overlapping prefixes
    /// or a default council that is not in `councils`.
    pub fn new(
        mut councils: Vec<CouncilRecord>,
        default_council: &CouncilName,
    ) -> Result<Self, CatalogError> {
        if councils.is_empty() {
            return Err(CatalogError::NoCouncils);
        }

        let mut owners: HashMap<String, CouncilName> = HashMap::new();
        for council in &mut councils {
            for prefix in &mut council.postcode_prefixes {
                *prefix = prefix.trim().to_ascii_uppercase();
                if let Some(first) = owners.get(prefix.as_str())
                    && *first != council.name
                {
                    return Err(CatalogError::OverlappingPrefix {
                        prefix: prefix.clone(),
                        first: first.clone(),
                        second: council.name.clone(),
                    });
                }
                owners.insert(prefix.clone(), council.name.clone());
            }
        }

        let mut seen = Vec::with_capacity(councils.len());
        for council in &councils {
            if seen.contains(&&council.name) {
                return Err(CatalogError::DuplicateCouncil(council.name.clone()));
            }
            seen.push(&council.name);
        }

        let default_council = find_council(&councils, default_council)?;

        Ok(Self {
            councils,
            default_council,
        })
    }

    /// Parse a catalog from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] for invalid JSON or failed validation.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let file: CouncilCatalogFile = serde_json::from_str(raw)?;
        Self::new(file.councils, &file.default_council)
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
        Self::from_json(BUILTIN_COUNCILS)
    }

    /// Replace the default council.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownDefaultCouncil`] if `name` is not in the catalog.
    pub fn with_default(mut self, name: &CouncilName) -> Result<Self, CatalogError> {
        self.default_council = find_council(&self.councils, name)?;
        Ok(self)
    }

    /// Council that handles postcodes matching no prefix.
    #[must_use]
    pub fn default_council(&self) -> &CouncilRecord {
        &self.default_council
    }

    /// Council whose prefix set contains the postcode's outward code, if any.
    #[must_use]
    pub fn lookup(&self, postcode: &str) -> Option<&CouncilRecord> {
        let outward = outward_code(postcode);
        if outward.is_empty() {
            return None;
        }
        self.councils.iter().find(|council| {
            council
                .postcode_prefixes
                .iter()
                .any(|prefix| *prefix == outward)
        })
    }

    /// Resolve a postcode to a council record, falling back to the default council.
    #[must_use]
    pub fn resolve_record(&self, postcode: &str) -> &CouncilRecord {
        self.lookup(postcode).unwrap_or_else(|| {
            tracing::debug!(postcode, "no council prefix matched, using default council");
            self.default_council()
        })
    }

    /// Resolve a postcode to a council name, falling back to the default council.
    #[must_use]
    pub fn resolve(&self, postcode: &str) -> &CouncilName {
        &self.resolve_record(postcode).name
    }

    /// Council by name.
    #[must_use]
    pub fn get(&self, name: &CouncilName) -> Option<&CouncilRecord> {
        self.councils.iter().find(|council| &council.name == name)
    }

    /// Iterate over councils in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &CouncilRecord> {
        self.councils.iter()
    }

    /// Number of councils.
    #[must_use]
    pub fn len(&self) -> usize {
        self.councils.len()
    }

    /// Always `false`; an empty catalog cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.councils.is_empty()
    }
}
