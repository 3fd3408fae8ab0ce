//! Disposal classification of detections and aggregation into recognition results.

use std::sync::Arc;

use crate::catalog::{CatalogError, ItemCatalog, ItemRecord};
use crate::council::CouncilCatalog;
use crate::model::{
    BinColor, ClassifiedDetection, CouncilName, Detection, EnvironmentalImpact, RecognitionResult,
};

/// Category assigned to items missing from the catalog.
pub const UNKNOWN_CATEGORY: &str = "unknown";
/// Disposal note assigned to items missing from the catalog.
pub const FALLBACK_NOTE: &str = "unable to classify";
/// Bin assigned to items missing from the catalog.
pub const FALLBACK_BIN: BinColor = BinColor::Black;

/// Pure classifier over validated item and council catalogs.
///
/// Construction checks that every item resolves to an instruction for every council,
/// so request-time classification never has to report configuration problems.
#[derive(Debug, Clone)]
pub struct Classifier {
    items: Arc<ItemCatalog>,
    councils: Arc<CouncilCatalog>,
}

impl Classifier {
    /// Cross-check the catalogs and build a classifier.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownRuleCouncil`] when an item names a council that does
    /// not exist, or [`CatalogError::MissingInstruction`] when an item has neither an
    /// override nor a council bin default for some council.
    pub fn new(
        items: Arc<ItemCatalog>,
        councils: Arc<CouncilCatalog>,
    ) -> Result<Self, CatalogError> {
        for item in items.iter() {
            if let Some(council) = item
                .location_rules
                .keys()
                .find(|council| councils.get(council).is_none())
            {
                return Err(CatalogError::UnknownRuleCouncil {
                    item: item.id.clone(),
                    council: council.clone(),
                });
            }

            for council in councils.iter() {
                let covered = item.location_rules.contains_key(&council.name)
                    || council.bin_rule(item.bin_color).is_some();
                if !covered {
                    return Err(CatalogError::MissingInstruction {
                        item: item.id.clone(),
                        council: council.name.clone(),
                    });
                }
            }
        }

        tracing::info!(
            items = items.len(),
            councils = councils.len(),
            "disposal catalogs loaded"
        );

        Ok(Self { items, councils })
    }

    /// Load and cross-check the catalogs embedded in the crate.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the embedded data is inconsistent.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(
            Arc::new(ItemCatalog::builtin()?),
            Arc::new(CouncilCatalog::builtin()?),
        )
    }

    /// Item catalog backing this classifier.
    #[must_use]
    pub fn items(&self) -> &ItemCatalog {
        &self.items
    }

    /// Council catalog backing this classifier.
    #[must_use]
    pub fn councils(&self) -> &CouncilCatalog {
        &self.councils
    }

    /// Council instruction for an item: the item override, else the council's bin default.
    #[must_use]
    pub fn instruction_for<'record>(
        &'record self,
        item: &'record ItemRecord,
        council: &CouncilName,
    ) -> Option<&'record str> {
        item.location_rules.get(council).map(String::as_str).or_else(|| {
            self.councils
                .get(council)
                .and_then(|record| record.bin_rule(item.bin_color))
        })
    }

    /// Classify one detection for a council. Total: unknown items get the fallback.
    #[must_use]
    pub fn classify(&self, detection: &Detection, council: &CouncilName) -> ClassifiedDetection {
        let Some(item) = self.items.get(&detection.item) else {
            tracing::debug!(item = %detection.item, "item not in catalog, using fallback");
            return ClassifiedDetection {
                item: detection.item.clone(),
                confidence: detection.confidence,
                bbox: detection.bbox,
                bin_color: FALLBACK_BIN,
                category: UNKNOWN_CATEGORY.to_owned(),
                disposal_note: FALLBACK_NOTE.to_owned(),
                council_instruction: None,
                requires_user_input: true,
                packaging_warning: false,
                catalogued: false,
            };
        };

        ClassifiedDetection {
            item: detection.item.clone(),
            confidence: detection.confidence,
            bbox: detection.bbox,
            bin_color: item.bin_color,
            category: item.category.clone(),
            disposal_note: item.disposal_note.clone(),
            council_instruction: self.instruction_for(item, council).map(str::to_owned),
            requires_user_input: item.requires_user_input,
            packaging_warning: item.packaging_warning,
            catalogued: true,
        }
    }

    /// Resolve the location once, classify every detection in order, and count buckets.
    #[must_use]
    pub fn aggregate(&self, detections: &[Detection], location: &str) -> RecognitionResult {
        let council = self.councils.resolve(location).clone();

        let classified = detections
            .iter()
            .map(|detection| self.classify(detection, &council))
            .collect::<Vec<_>>();
        let environmental_impact = classified.iter().collect::<EnvironmentalImpact>();

        RecognitionResult {
            total_items: classified.len(),
            detections: classified,
            location: location.to_owned(),
            council,
            environmental_impact,
        }
    }
}
