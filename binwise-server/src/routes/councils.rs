use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use binwise_core::{BinColor, CollectionEvent, CouncilName, CouncilRecord, DateRange, Postcode};

use super::AppState;
use crate::error::ApiError;

const DEFAULT_SCHEDULE_DAYS: u64 = 14;
const MAX_SCHEDULE_DAYS: u64 = 366;

#[derive(Debug, Serialize)]
pub(crate) struct CouncilSummary {
    id: String,
    name: CouncilName,
    display_name: String,
    postcode_prefixes: Vec<String>,
}

impl From<&CouncilRecord> for CouncilSummary {
    fn from(record: &CouncilRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            display_name: record.display_name.clone(),
            postcode_prefixes: record.postcode_prefixes.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CouncilList {
    default_council: CouncilName,
    councils: Vec<CouncilSummary>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Resolution {
    postcode: Postcode,
    outward_code: String,
    /// `false` when the default council was used.
    matched: bool,
    council: CouncilSummary,
}

#[derive(Debug, Serialize)]
pub(crate) struct CouncilRules {
    council: CouncilName,
    bin_rules: BTreeMap<BinColor, String>,
    rule_overrides: BTreeMap<String, String>,
    special_instructions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleQuery {
    days: Option<u64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Schedule {
    council: CouncilName,
    today: NaiveDate,
    next_collections: Vec<CollectionEvent>,
    upcoming: Vec<CollectionEvent>,
}

pub(crate) async fn list(State(state): State<AppState>) -> Json<CouncilList> {
    let councils = state.service.classifier().councils();
    Json(CouncilList {
        default_council: councils.default_council().name.clone(),
        councils: councils.iter().map(CouncilSummary::from).collect(),
    })
}

pub(crate) async fn resolve(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Resolution>, ApiError> {
    let postcode = Postcode::parse(&raw)?;
    let councils = state.service.classifier().councils();
    let matched = councils.lookup(postcode.as_str()).is_some();
    let council = councils.resolve_record(postcode.as_str()).into();

    Ok(Json(Resolution {
        outward_code: postcode.outward(),
        postcode,
        matched,
        council,
    }))
}

pub(crate) async fn rules(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<CouncilRules>, ApiError> {
    let postcode = Postcode::parse(&raw)?;
    let record = state
        .service
        .classifier()
        .councils()
        .resolve_record(postcode.as_str());

    Ok(Json(CouncilRules {
        council: record.name.clone(),
        bin_rules: record.bin_rules.clone(),
        rule_overrides: record.rule_overrides.clone(),
        special_instructions: record.special_instructions.clone(),
    }))
}

pub(crate) async fn schedule(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    query: Result<Query<ScheduleQuery>, QueryRejection>,
) -> Result<Json<Schedule>, ApiError> {
    let Query(query) = query?;
    let postcode = Postcode::parse(&raw)?;
    let record = state
        .service
        .classifier()
        .councils()
        .resolve_record(postcode.as_str());

    let today = Utc::now().date_naive();
    let days = query
        .days
        .unwrap_or(DEFAULT_SCHEDULE_DAYS)
        .clamp(1, MAX_SCHEDULE_DAYS);
    let range = DateRange {
        start: today,
        end: today.checked_add_days(Days::new(days - 1)).unwrap_or(today),
    };

    Ok(Json(Schedule {
        council: record.name.clone(),
        today,
        next_collections: record.next_collections(today),
        upcoming: record.collections_within(range),
    }))
}
