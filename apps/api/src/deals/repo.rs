use std::cmp::Ordering;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::listing::{contains_ci, SortOrder};
use crate::models::deal::{deserialize_close_date, Deal, DealStage};
use crate::models::{clamp_percent, Level};
use crate::store::{new_id, Store};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealQuery {
    pub stage: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DealFilters {
    pub stage: String,
    pub priority: String,
    pub search: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DealSortKey {
    Name,
    Company,
    Value,
    Probability,
    Stage,
    Priority,
    ExpectedClose,
    CreatedAt,
    UpdatedAt,
}

impl DealSortKey {
    /// Unknown keys sort by last update.
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("name") => DealSortKey::Name,
            Some("company") => DealSortKey::Company,
            Some("value") => DealSortKey::Value,
            Some("probability") => DealSortKey::Probability,
            Some("stage") => DealSortKey::Stage,
            Some("priority") => DealSortKey::Priority,
            Some("expectedClose") => DealSortKey::ExpectedClose,
            Some("createdAt") => DealSortKey::CreatedAt,
            _ => DealSortKey::UpdatedAt,
        }
    }

    fn compare(self, a: &Deal, b: &Deal) -> Ordering {
        match self {
            DealSortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            DealSortKey::Company => a.company.to_lowercase().cmp(&b.company.to_lowercase()),
            DealSortKey::Value => a.value.total_cmp(&b.value),
            DealSortKey::Probability => a.probability.cmp(&b.probability),
            DealSortKey::Stage => a.stage.as_str().cmp(b.stage.as_str()),
            DealSortKey::Priority => a.priority.as_str().cmp(b.priority.as_str()),
            DealSortKey::ExpectedClose => a.expected_close.cmp(&b.expected_close),
            DealSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            DealSortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

pub fn list(store: &Store, query: &DealQuery) -> (Vec<Deal>, DealFilters) {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut deals: Vec<Deal> = store
        .deals
        .read()
        .iter()
        .filter(|d| query.stage.as_deref().map_or(true, |s| d.stage.as_str() == s))
        .filter(|d| {
            query
                .priority
                .as_deref()
                .map_or(true, |p| d.priority.as_str() == p)
        })
        .filter(|d| {
            needle
                .as_deref()
                .map_or(true, |s| contains_ci(&d.name, s) || contains_ci(&d.company, s))
        })
        .cloned()
        .collect();

    let key = DealSortKey::parse(query.sort_by.as_deref());
    let order = SortOrder::parse(query.sort_order.as_deref());
    deals.sort_by(|a, b| order.apply(key.compare(a, b)));

    let filters = DealFilters {
        stage: query.stage.clone().unwrap_or_else(|| "all".to_string()),
        priority: query.priority.clone().unwrap_or_else(|| "all".to_string()),
        search: query.search.clone().unwrap_or_default(),
    };
    (deals, filters)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeal {
    pub name: Option<String>,
    pub company: Option<String>,
    pub value: Option<f64>,
    pub stage: Option<DealStage>,
    pub probability: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_close_date")]
    pub expected_close: Option<NaiveDate>,
    pub assigned_to: Option<String>,
    pub priority: Option<Level>,
}

pub fn create(store: &Store, input: NewDeal) -> Result<Deal, AppError> {
    let name = required(input.name);
    let company = required(input.company);
    let (Some(name), Some(company), Some(value)) = (name, company, input.value) else {
        return Err(AppError::Validation(
            "Name, company, and value are required".to_string(),
        ));
    };
    validate_value(value)?;

    let now = Utc::now();
    let deal = Deal {
        id: new_id(),
        name,
        company,
        value,
        stage: input.stage.unwrap_or(DealStage::Lead),
        probability: clamp_percent(input.probability.unwrap_or(50.0)),
        expected_close: input.expected_close,
        last_activity: "Just created".to_string(),
        assigned_to: required(input.assigned_to).unwrap_or_else(|| "Unassigned".to_string()),
        priority: input.priority.unwrap_or(Level::Medium),
        created_at: now,
        updated_at: now,
    };

    store.deals.write().push(deal.clone());
    Ok(deal)
}

pub fn get(store: &Store, id: &str) -> Result<Deal, AppError> {
    store
        .deals
        .read()
        .iter()
        .find(|d| d.id == id)
        .cloned()
        .ok_or_else(not_found)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealPatch {
    pub name: Option<String>,
    pub company: Option<String>,
    pub value: Option<f64>,
    pub stage: Option<DealStage>,
    pub probability: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_close_date")]
    pub expected_close: Option<NaiveDate>,
    pub assigned_to: Option<String>,
    pub priority: Option<Level>,
}

pub fn update(store: &Store, id: &str, patch: DealPatch) -> Result<Deal, AppError> {
    let mut deals = store.deals.write();
    let deal = deals.iter_mut().find(|d| d.id == id).ok_or_else(not_found)?;
    if let Some(value) = patch.value {
        validate_value(value)?;
    }

    if let Some(name) = patch.name {
        deal.name = name;
    }
    if let Some(company) = patch.company {
        deal.company = company;
    }
    if let Some(value) = patch.value {
        deal.value = value;
    }
    if let Some(stage) = patch.stage {
        deal.stage = stage;
    }
    if let Some(probability) = patch.probability {
        deal.probability = clamp_percent(probability);
    }
    if patch.expected_close.is_some() {
        deal.expected_close = patch.expected_close;
    }
    if let Some(assigned_to) = patch.assigned_to {
        deal.assigned_to = assigned_to;
    }
    if let Some(priority) = patch.priority {
        deal.priority = priority;
    }
    deal.last_activity = "Recently updated".to_string();
    deal.updated_at = Utc::now();

    Ok(deal.clone())
}

pub fn delete(store: &Store, id: &str) -> Result<Deal, AppError> {
    let mut deals = store.deals.write();
    let index = deals.iter().position(|d| d.id == id).ok_or_else(not_found)?;
    Ok(deals.remove(index))
}

fn validate_value(value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::Validation(
            "Value must be a positive number".to_string(),
        ));
    }
    Ok(())
}

fn required(field: Option<String>) -> Option<String> {
    field.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn not_found() -> AppError {
    AppError::NotFound("Deal not found".to_string())
}
