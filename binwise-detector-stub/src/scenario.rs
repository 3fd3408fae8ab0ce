//! Scripted demo scenarios with seeded confidences and bounding boxes.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use binwise_core::model::{BoundingBox, Detection};

/// Side length of the square frame scenario boxes are laid out in before scaling.
pub const SCENARIO_FRAME: u32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How hard a scenario is to sort.
pub enum Complexity {
    /// Single obvious item.
    Low,
    /// A couple of items or one ambiguous one.
    Medium,
    /// Many or badly lit items.
    High,
}

impl fmt::Display for Complexity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        };
        formatter.pad(label)
    }
}

#[derive(Debug, Clone, Copy)]
/// A named, reproducible set of detections.
pub struct Scenario {
    /// Unique display name.
    pub name: &'static str,
    /// What the scenario exercises.
    pub description: &'static str,
    /// Item labels in detection order.
    pub items: &'static [&'static str],
    /// Inclusive confidence range in percent.
    pub confidence: (f64, f64),
    /// Sorting difficulty.
    pub complexity: Complexity,
}

impl Scenario {
    /// Generate detections for an image of the given size.
    ///
    /// The same seed always yields the same detections.
    #[must_use]
    pub fn generate(&self, seed: u64, width: u32, height: u32) -> Vec<Detection> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (low, high) = self.confidence;

        self.items
            .iter()
            .map(|&item| {
                let confidence = (rng.gen_range(low..=high) * 10.0).round() / 10.0;
                let bbox = scale(random_box(&mut rng), width, height);
                Detection::new(item, confidence, bbox)
            })
            .collect()
    }
}

fn random_box(rng: &mut StdRng) -> [u32; 4] {
    let x1 = rng.gen_range(20..=SCENARIO_FRAME - 100);
    let y1 = rng.gen_range(20..=SCENARIO_FRAME - 100);
    let box_width = rng.gen_range(60..=120);
    let box_height = rng.gen_range(60..=120);
    let x2 = (x1 + box_width).min(SCENARIO_FRAME - 20);
    let y2 = (y1 + box_height).min(SCENARIO_FRAME - 20);
    [x1, y1, x2, y2]
}

// Scaled boxes keep at least one pixel of extent and never leave the image.
fn scale([x1, y1, x2, y2]: [u32; 4], width: u32, height: u32) -> BoundingBox {
    let axis = |value: u32, extent: u32| {
        let scaled = u64::from(value) * u64::from(extent) / u64::from(SCENARIO_FRAME);
        u32::try_from(scaled).unwrap_or(extent)
    };
    let width = width.max(1);
    let height = height.max(1);
    let left = axis(x1, width).min(width - 1);
    let top = axis(y1, height).min(height - 1);
    let right = axis(x2, width).clamp(left + 1, width);
    let bottom = axis(y2, height).clamp(top + 1, height);
    BoundingBox::new(left, top, right, bottom)
}

/// Built-in demo scenarios.
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "Fresh Apple",
        description: "Single fresh fruit detection",
        items: &["apple"],
        confidence: (85.0, 95.0),
        complexity: Complexity::Low,
    },
    Scenario {
        name: "Moldy Bread",
        description: "Contaminated food item",
        items: &["moldy_bread"],
        confidence: (70.0, 85.0),
        complexity: Complexity::Medium,
    },
    Scenario {
        name: "Pizza Box Dilemma",
        description: "Complex packaging disposal",
        items: &["pizza_box"],
        confidence: (75.0, 90.0),
        complexity: Complexity::High,
    },
    Scenario {
        name: "Banana and Peel",
        description: "Separated fruit and peel",
        items: &["banana", "banana_peel"],
        confidence: (80.0, 95.0),
        complexity: Complexity::Medium,
    },
    Scenario {
        name: "Bottle and Cap",
        description: "Container with removable component",
        items: &["plastic_bottle", "bottle_cap"],
        confidence: (70.0, 95.0),
        complexity: Complexity::Medium,
    },
    Scenario {
        name: "Mixed Fruit Bowl",
        description: "Multiple fruits in various states",
        items: &["apple", "banana", "orange", "strawberry"],
        confidence: (75.0, 90.0),
        complexity: Complexity::High,
    },
    Scenario {
        name: "Takeaway Lunch Cleanup",
        description: "Mixed containers and food waste",
        items: &["takeaway_container", "plastic_bottle", "apple_core", "bread_crust"],
        confidence: (65.0, 85.0),
        complexity: Complexity::High,
    },
    Scenario {
        name: "Kitchen Prep Waste",
        description: "Vegetable scraps and egg shells",
        items: &["carrot_tops", "potato_peels", "onion_skins", "egg_shells"],
        confidence: (80.0, 95.0),
        complexity: Complexity::Medium,
    },
    Scenario {
        name: "Low Confidence Mixed Items",
        description: "Challenging lighting conditions",
        items: &["unclear_item_1", "unclear_item_2", "unclear_item_3"],
        confidence: (55.0, 75.0),
        complexity: Complexity::High,
    },
    Scenario {
        name: "Coffee Shop Waste",
        description: "Mixed beverage packaging",
        items: &["coffee_cup", "plastic_lid", "coffee_grounds", "paper_napkin"],
        confidence: (70.0, 90.0),
        complexity: Complexity::Medium,
    },
    Scenario {
        name: "Dairy and Meat Dilemma",
        description: "Items that can't be composted",
        items: &["cheese_wrapper", "cooked_chicken", "yogurt_container"],
        confidence: (75.0, 90.0),
        complexity: Complexity::Medium,
    },
];

/// Find a built-in scenario by name, ignoring ASCII case.
#[must_use]
pub fn find(name: &str) -> Option<&'static Scenario> {
    SCENARIOS
        .iter()
        .find(|scenario| scenario.name.eq_ignore_ascii_case(name.trim()))
}
