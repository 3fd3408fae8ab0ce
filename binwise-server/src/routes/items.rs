use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize};

use binwise_core::{BinColor, InputError, ItemId, ItemRecord};

use super::AppState;
use crate::error::ApiError;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    category: Option<String>,
    bin_color: Option<BinColor>,
    limit: Option<usize>,
    #[serde(default)]
    offset: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    q: String,
    limit: Option<usize>,
    #[serde(default)]
    offset: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct ItemPage {
    /// Matches before paging.
    total: usize,
    items: Vec<ItemRecord>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchResults {
    query: String,
    count: usize,
    items: Vec<ItemRecord>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Categories {
    categories: Vec<String>,
}

fn page_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
}

pub(crate) async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ItemPage>, ApiError> {
    let Query(query) = query?;
    let catalog = state.service.classifier().items();
    let matches = match (&query.category, query.bin_color) {
        (Some(category), _) => catalog
            .by_category(category)
            .into_iter()
            .filter(|item| query.bin_color.is_none_or(|color| item.bin_color == color))
            .collect(),
        (None, Some(color)) => catalog.by_bin_color(color),
        (None, None) => catalog.iter().collect::<Vec<_>>(),
    };

    Ok(Json(ItemPage {
        total: matches.len(),
        items: matches
            .into_iter()
            .skip(query.offset)
            .take(page_limit(query.limit))
            .cloned()
            .collect(),
    }))
}

pub(crate) async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResults>, ApiError> {
    let Query(query) = query?;
    let needle = query.q.trim();
    if needle.is_empty() {
        return Err(InputError::EmptyQuery.into());
    }

    let items = state
        .service
        .classifier()
        .items()
        .search(needle, page_limit(query.limit), query.offset)
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();

    Ok(Json(SearchResults {
        query: needle.to_owned(),
        count: items.len(),
        items,
    }))
}

pub(crate) async fn categories(State(state): State<AppState>) -> Json<Categories> {
    let categories = state
        .service
        .classifier()
        .items()
        .categories()
        .into_iter()
        .map(str::to_owned)
        .collect();
    Json(Categories { categories })
}

pub(crate) async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemRecord>, ApiError> {
    state
        .service
        .classifier()
        .items()
        .get(&ItemId(id.clone()))
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Item not found: {id}")))
}
