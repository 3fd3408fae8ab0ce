use binwise_core::{Classifier, CollectionEvent, Postcode, RecognitionResult};
use binwise_detector_stub::{SCENARIOS, Scenario};
use chrono::{Local, NaiveDate};

/// Virtual frame the scenarios are rendered into.
pub(crate) const FRAME_SIZE: (u32, u32) = (640, 480);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    ScenarioSelect,
    LocationInput,
    ResultView,
}

pub(crate) struct App {
    pub classifier: Classifier,

    pub screen: Screen,
    pub scenarios: &'static [Scenario],
    pub scenario_index: usize,

    pub location_input: String,
    pub seed: u64,

    pub result: Option<RecognitionResult>,
    pub collections: Vec<CollectionEvent>,
    pub detail_index: usize,

    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            screen: Screen::ScenarioSelect,
            scenarios: SCENARIOS,
            scenario_index: 0,
            location_input: String::from("SW1A 1AA"),
            seed: 1,
            result: None,
            collections: Vec::new(),
            detail_index: 0,
            error_message: None,
        }
    }

    pub(crate) fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub(crate) fn current_scenario(&self) -> Option<&'static Scenario> {
        self.scenarios.get(self.scenario_index)
    }

    pub(crate) fn select_current_scenario(&mut self) {
        if self.current_scenario().is_some() {
            self.error_message = None;
            self.screen = Screen::LocationInput;
        }
    }

    /// Classify the selected scenario for the typed postcode and switch to the result view.
    pub(crate) fn run_scenario(&mut self, today: NaiveDate) {
        let Some(scenario) = self.current_scenario() else {
            self.error_message = Some("Select a scenario first".into());
            return;
        };

        let postcode = match Postcode::parse(&self.location_input) {
            Ok(postcode) => postcode,
            Err(err) => {
                self.error_message = Some(err.to_string());
                return;
            }
        };

        let (width, height) = FRAME_SIZE;
        let detections = scenario.generate(self.seed, width, height);
        let result = self.classifier.aggregate(&detections, postcode.as_str());

        self.collections = self
            .classifier
            .councils()
            .resolve_record(postcode.as_str())
            .next_collections(today);
        self.result = Some(result);
        self.detail_index = 0;
        self.error_message = None;
        self.screen = Screen::ResultView;
    }

    /// Same scenario and postcode with fresh confidences and boxes.
    pub(crate) fn reroll(&mut self, today: NaiveDate) {
        self.seed = self.seed.wrapping_add(1);
        self.run_scenario(today);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Classifier::builtin().expect("builtin catalogs"))
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
    }

    #[test]
    fn running_a_scenario_classifies_every_item() {
        let mut app = app();
        app.scenario_index = app
            .scenarios
            .iter()
            .position(|scenario| scenario.name == "Kitchen Prep Waste")
            .expect("scenario exists");
        app.location_input = "e3 2aa".into();
        app.select_current_scenario();
        app.run_scenario(monday());

        assert_eq!(app.screen, Screen::ResultView);
        let result = app.result.as_ref().expect("result");
        assert_eq!(result.council.as_str(), "Tower Hamlets");
        assert_eq!(result.total_items, 4);
        assert_eq!(result.environmental_impact.compostable, 4);
        assert_eq!(app.collections.len(), 3);
    }

    #[test]
    fn invalid_postcode_stays_on_the_input_screen() {
        let mut app = app();
        app.select_current_scenario();
        app.location_input = "nowhere".into();
        app.run_scenario(monday());

        assert_eq!(app.screen, Screen::LocationInput);
        assert!(app.result.is_none());
        assert!(app.error_message.is_some());
    }

    #[test]
    fn reroll_changes_the_seed_but_not_the_items() {
        let mut app = app();
        app.select_current_scenario();
        app.run_scenario(monday());
        let first = app.result.clone().expect("result");

        app.reroll(monday());
        let second = app.result.clone().expect("result");

        assert_eq!(app.seed, 2);
        let items = |result: &RecognitionResult| {
            result
                .detections
                .iter()
                .map(|detection| detection.item.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(items(&first), items(&second));
    }
}
