use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::listing::{paginate, OffsetPage};
use crate::models::insight::{Insight, InsightKind};
use crate::models::{parse_variant, Level};
use crate::store::{new_id, Store};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub impact: Option<String>,
    pub deal_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightFilters {
    #[serde(rename = "type")]
    pub kind: String,
    pub impact: String,
    pub deal_id: Option<String>,
}

pub fn list(store: &Store, query: &InsightQuery) -> (Vec<Insight>, OffsetPage, InsightFilters) {
    let mut insights: Vec<Insight> = store
        .insights
        .read()
        .iter()
        .filter(|i| query.kind.as_deref().map_or(true, |k| i.kind.as_str() == k))
        .filter(|i| {
            query
                .impact
                .as_deref()
                .map_or(true, |m| i.impact.as_str() == m)
        })
        .filter(|i| {
            query
                .deal_id
                .as_deref()
                .map_or(true, |d| i.deal_id.as_deref() == Some(d))
        })
        .cloned()
        .collect();

    insights.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let (insights, page) = paginate(
        insights,
        query.limit.unwrap_or(20),
        query.offset.unwrap_or(0),
    );
    let filters = InsightFilters {
        kind: query.kind.clone().unwrap_or_else(|| "all".to_string()),
        impact: query.impact.clone().unwrap_or_else(|| "all".to_string()),
        deal_id: query.deal_id.clone(),
    };
    (insights, page, filters)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInsight {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub impact: Option<String>,
    pub confidence: Option<f64>,
    pub deal_id: Option<String>,
}

pub fn create(store: &Store, input: NewInsight) -> Result<Insight, AppError> {
    let (Some(kind), Some(title), Some(description)) = (
        input.kind.filter(|s| !s.is_empty()),
        input.title.filter(|s| !s.trim().is_empty()),
        input.description.filter(|s| !s.trim().is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Type, title, and description are required".to_string(),
        ));
    };

    let kind: InsightKind = parse_variant(&kind)
        .ok_or_else(|| AppError::Validation("Invalid insight type".to_string()))?;

    let impact = match input.impact.as_deref() {
        None => Level::Medium,
        Some(raw) => parse_variant(raw)
            .ok_or_else(|| AppError::Validation("Invalid impact level".to_string()))?,
    };

    let confidence = match input.confidence {
        Some(c) if !(0.0..=100.0).contains(&c) => {
            return Err(AppError::Validation(
                "Confidence must be between 0 and 100".to_string(),
            ))
        }
        Some(c) => c.round() as u8,
        None => rand::rng().random_range(70..100),
    };

    let insight = Insight {
        id: new_id(),
        kind,
        title,
        description,
        impact,
        confidence,
        deal_id: input.deal_id,
        timestamp: Utc::now(),
    };

    store.insights.write().push(insight.clone());
    Ok(insight)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_insight(kind: &str) -> NewInsight {
        NewInsight {
            kind: Some(kind.to_string()),
            title: Some("Margin compression".to_string()),
            description: Some("Supplier costs up 12% quarter over quarter".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_list_newest_first() {
        let store = Store::seeded();
        let (insights, page, filters) = list(&store, &InsightQuery::default());
        let ids: Vec<&str> = insights.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(page.total, 3);
        assert_eq!(filters.kind, "all");
    }

    #[test]
    fn test_list_filters_by_type_and_deal() {
        let store = Store::seeded();
        let query = InsightQuery {
            kind: Some("risk".to_string()),
            ..Default::default()
        };
        assert_eq!(list(&store, &query).0.len(), 1);

        let query = InsightQuery {
            deal_id: Some("1".to_string()),
            ..Default::default()
        };
        let (insights, _, _) = list(&store, &query);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].title, "High Probability Deal Alert");
    }

    #[test]
    fn test_create_defaults() {
        let store = Store::seeded();
        let insight = create(&store, new_insight("risk")).unwrap();
        assert_eq!(insight.impact, Level::Medium);
        assert!((70..100).contains(&insight.confidence));
        // newly created insight sorts first
        let (insights, _, _) = list(&store, &InsightQuery::default());
        assert_eq!(insights[0].id, insight.id);
    }

    #[test]
    fn test_create_rejects_unknown_type() {
        let store = Store::default();
        let err = create(&store, new_insight("rumour")).unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m == "Invalid insight type"));
    }

    #[test]
    fn test_create_rejects_bad_impact_and_confidence() {
        let store = Store::default();
        let mut input = new_insight("trend");
        input.impact = Some("extreme".to_string());
        assert!(create(&store, input).is_err());

        let mut input = new_insight("trend");
        input.confidence = Some(101.0);
        let err = create(&store, input).unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m.contains("between 0 and 100")));
    }
}
