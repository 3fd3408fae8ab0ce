//! Domain data structures for items, councils, detections and recognition results.

use std::fmt;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
/// Identifier of an item in the disposal catalog, e.g. `plastic_bottle`.
pub struct ItemId(pub String);

impl ItemId {
    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(raw: &str) -> Self {
        ItemId(raw.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
/// Name of a council known to binwise, e.g. `Westminster`.
pub struct CouncilName(pub String);

impl CouncilName {
    /// Borrow the raw council name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouncilName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for CouncilName {
    fn from(raw: &str) -> Self {
        CouncilName(raw.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Bin an item should end up in.
pub enum BinColor {
    /// Food and garden waste.
    Brown,
    /// Dry mixed recycling.
    Blue,
    /// General/residual waste.
    Black,
    /// Garden waste in councils that split it from food waste.
    Green,
    /// Special disposal (hazardous, oils, electricals).
    Orange,
}

impl BinColor {
    /// All bin colours in declaration order.
    pub const ALL: [BinColor; 5] = [
        BinColor::Brown,
        BinColor::Blue,
        BinColor::Black,
        BinColor::Green,
        BinColor::Orange,
    ];

    /// Lowercase slug used on the wire and in catalogs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BinColor::Brown => "brown",
            BinColor::Blue => "blue",
            BinColor::Black => "black",
            BinColor::Green => "green",
            BinColor::Orange => "orange",
        }
    }

    /// Environmental-impact bucket this bin counts towards.
    #[must_use]
    pub fn bucket(self) -> ImpactBucket {
        match self {
            BinColor::Brown => ImpactBucket::Compostable,
            BinColor::Blue => ImpactBucket::Recyclable,
            BinColor::Black => ImpactBucket::GeneralWaste,
            BinColor::Orange => ImpactBucket::SpecialDisposal,
            BinColor::Green => ImpactBucket::Other,
        }
    }
}

impl fmt::Display for BinColor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Summary bucket reported in [`EnvironmentalImpact`].
pub enum ImpactBucket {
    /// Brown bin.
    Compostable,
    /// Blue bin.
    Recyclable,
    /// Black bin.
    GeneralWaste,
    /// Orange bin.
    SpecialDisposal,
    /// Any bin without a dedicated bucket.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
/// Axis-aligned box in image pixel coordinates, serialized as `[x1, y1, x2, y2]`.
pub struct BoundingBox {
    /// Left edge.
    pub x1: u32,
    /// Top edge.
    pub y1: u32,
    /// Right edge (exclusive of `x1`).
    pub x2: u32,
    /// Bottom edge (exclusive of `y1`).
    pub y2: u32,
}

impl BoundingBox {
    /// Build a box from its corners.
    #[must_use]
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// `x1 < x2` and `y1 < y2`.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2
    }

    /// Whether the box is well formed and lies inside a `width` x `height` image.
    #[must_use]
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.is_well_formed() && self.x2 <= width && self.y2 <= height
    }
}

impl From<[u32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [u32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BoundingBox> for [u32; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x1, bbox.y1, bbox.x2, bbox.y2]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Raw object produced by a detection backend, before classification.
pub struct Detection {
    /// Item label as reported by the detector; may be absent from the catalog.
    pub item: ItemId,
    /// Confidence in percent, `0.0..=100.0`.
    pub confidence: f64,
    /// Location of the object in the image.
    pub bbox: BoundingBox,
}

impl Detection {
    /// Construct a detection.
    #[must_use]
    pub fn new<I: Into<ItemId>>(item: I, confidence: f64, bbox: BoundingBox) -> Self {
        Self {
            item: item.into(),
            confidence,
            bbox,
        }
    }

    /// Whether the confidence lies in `0..=100`.
    #[must_use]
    pub fn has_valid_confidence(&self) -> bool {
        (0.0..=100.0).contains(&self.confidence)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Detection enriched with disposal guidance for a council.
pub struct ClassifiedDetection {
    /// Detected item label.
    pub item: ItemId,
    /// Detector confidence in percent.
    pub confidence: f64,
    /// Location of the object in the image.
    pub bbox: BoundingBox,
    /// Target bin.
    pub bin_color: BinColor,
    /// Semantic group of the item.
    pub category: String,
    /// Generic disposal note from the item catalog.
    pub disposal_note: String,
    /// Council-specific instruction, when one applies.
    pub council_instruction: Option<String>,
    /// Disposal is ambiguous and needs user confirmation.
    pub requires_user_input: bool,
    /// Item usually comes with packaging that must be separated.
    pub packaging_warning: bool,
    /// `false` when the item was missing from the catalog and the fallback was used.
    pub catalogued: bool,
}

impl ClassifiedDetection {
    /// Note to show to a user: the council instruction when present, else the generic note.
    #[must_use]
    pub fn display_note(&self) -> &str {
        self.council_instruction
            .as_deref()
            .unwrap_or(&self.disposal_note)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Count of classified items per impact bucket.
pub struct EnvironmentalImpact {
    /// Items bound for the brown bin.
    pub compostable: usize,
    /// Items bound for the blue bin.
    pub recyclable: usize,
    /// Items bound for the black bin.
    pub general_waste: usize,
    /// Items bound for the orange bin.
    pub special_disposal: usize,
    /// Items bound for any other bin.
    pub other: usize,
}

impl EnvironmentalImpact {
    /// Count one item in the bucket for `color`.
    pub fn record(&mut self, color: BinColor) {
        let slot = match color.bucket() {
            ImpactBucket::Compostable => &mut self.compostable,
            ImpactBucket::Recyclable => &mut self.recyclable,
            ImpactBucket::GeneralWaste => &mut self.general_waste,
            ImpactBucket::SpecialDisposal => &mut self.special_disposal,
            ImpactBucket::Other => &mut self.other,
        };
        *slot += 1;
    }

    /// Sum over all buckets.
    #[must_use]
    pub fn total(&self) -> usize {
        self.compostable + self.recyclable + self.general_waste + self.special_disposal + self.other
    }
}

impl<'item> FromIterator<&'item ClassifiedDetection> for EnvironmentalImpact {
    fn from_iter<T: IntoIterator<Item = &'item ClassifiedDetection>>(iter: T) -> Self {
        let mut impact = EnvironmentalImpact::default();
        for detection in iter {
            impact.record(detection.bin_color);
        }
        impact
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Aggregate answer to a single recognition request.
pub struct RecognitionResult {
    /// Classified detections in detector order.
    pub detections: Vec<ClassifiedDetection>,
    /// Location string supplied by the caller.
    pub location: String,
    /// Council the location resolved to.
    pub council: CouncilName,
    /// Number of classified detections, unknown items included.
    pub total_items: usize,
    /// Per-bucket counts; always sums to `total_items`.
    pub environmental_impact: EnvironmentalImpact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Kerbside collection stream run by a council.
pub enum WasteStream {
    /// Food waste caddy / brown bin.
    Compost,
    /// Dry recycling.
    Recycling,
    /// Residual waste.
    General,
}

impl WasteStream {
    /// All streams in reporting order.
    pub const ALL: [WasteStream; 3] = [
        WasteStream::Compost,
        WasteStream::Recycling,
        WasteStream::General,
    ];

    /// Bin colour collected by this stream.
    #[must_use]
    pub fn bin_color(self) -> BinColor {
        match self {
            WasteStream::Compost => BinColor::Brown,
            WasteStream::Recycling => BinColor::Blue,
            WasteStream::General => BinColor::Black,
        }
    }
}

impl fmt::Display for WasteStream {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            WasteStream::Compost => "compost",
            WasteStream::Recycling => "recycling",
            WasteStream::General => "general",
        };
        formatter.pad(slug)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A single scheduled kerbside collection.
pub struct CollectionEvent {
    /// Date of the collection.
    pub date: NaiveDate,
    /// Weekday of `date`.
    pub weekday: Weekday,
    /// Stream collected on that day.
    pub stream: WasteStream,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
/// Inclusive start/end range for requested schedules.
pub struct DateRange {
    /// Start date (inclusive).
    pub start: NaiveDate,
    /// End date (inclusive).
    pub end: NaiveDate,
}
