//! Cross-collection search with a simple additive relevance score.

use serde::Serialize;

use crate::clients::repo::matches_search;
use crate::errors::AppError;
use crate::listing::contains_ci;
use crate::models::client::Client;
use crate::models::deal::Deal;
use crate::models::insight::Insight;
use crate::store::Store;

pub const MIN_QUERY_LEN: usize = 2;
pub const DEFAULT_LIMIT: usize = 10;

/// Score of `query` (already lowercased) against `fields`.
///
/// Per field: +10 when it contains the whole query, and for every
/// whitespace-separated query word +3 when the field contains it and +2 when
/// the field starts with it.
pub fn relevance(query: &str, fields: &[&str]) -> u32 {
    let words: Vec<&str> = query.split_whitespace().collect();
    fields
        .iter()
        .map(|field| {
            let field = field.to_lowercase();
            let mut score = if field.contains(query) { 10 } else { 0 };
            for word in &words {
                if field.contains(word) {
                    score += 3;
                }
                if field.starts_with(word) {
                    score += 2;
                }
            }
            score
        })
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Deals,
    Clients,
    Insights,
    All,
}

impl Scope {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw.map(str::trim) {
            None | Some("") | Some("all") => Ok(Scope::All),
            Some("deals") => Ok(Scope::Deals),
            Some("clients") => Ok(Scope::Clients),
            Some("insights") => Ok(Scope::Insights),
            Some(other) => Err(AppError::Validation(format!(
                "Invalid search type: {other}. Expected deals, clients, insights or all"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Deals => "deals",
            Scope::Clients => "clients",
            Scope::Insights => "insights",
            Scope::All => "all",
        }
    }

    fn includes(&self, other: Scope) -> bool {
        *self == Scope::All || *self == other
    }
}

/// A matching record with its search annotations flattened alongside.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hit<T> {
    #[serde(flatten)]
    pub record: T,
    pub search_type: &'static str,
    pub search_relevance: u32,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnyHit {
    Deal(Hit<Deal>),
    Client(Hit<Client>),
    Insight(Hit<Insight>),
}

impl AnyHit {
    pub fn relevance(&self) -> u32 {
        match self {
            AnyHit::Deal(h) => h.search_relevance,
            AnyHit::Client(h) => h.search_relevance,
            AnyHit::Insight(h) => h.search_relevance,
        }
    }
}

#[derive(Debug, Default)]
pub struct SearchResults {
    pub deals: Vec<Hit<Deal>>,
    pub clients: Vec<Hit<Client>>,
    pub insights: Vec<Hit<Insight>>,
}

impl SearchResults {
    pub fn total(&self) -> usize {
        self.deals.len() + self.clients.len() + self.insights.len()
    }

    /// All hits by descending relevance, truncated to `max`.
    pub fn ranked(self, max: usize) -> Vec<AnyHit> {
        let mut all: Vec<AnyHit> = self
            .deals
            .into_iter()
            .map(AnyHit::Deal)
            .chain(self.clients.into_iter().map(AnyHit::Client))
            .chain(self.insights.into_iter().map(AnyHit::Insight))
            .collect();
        all.sort_by(|a, b| b.relevance().cmp(&a.relevance()));
        all.truncate(max);
        all
    }
}

/// Normalises the raw `q` parameter, rejecting queries shorter than two characters.
pub fn normalise_query(raw: Option<&str>) -> Result<String, AppError> {
    let q = raw.map(str::trim).unwrap_or_default();
    if q.chars().count() < MIN_QUERY_LEN {
        return Err(AppError::Validation(
            "Search query must be at least 2 characters".to_string(),
        ));
    }
    Ok(q.to_lowercase())
}

/// Each collection contributes at most `limit` hits in store order.
pub fn search(store: &Store, query: &str, scope: Scope, limit: usize) -> SearchResults {
    let mut results = SearchResults::default();

    if scope.includes(Scope::Deals) {
        results.deals = store
            .deals
            .read()
            .iter()
            .filter(|d| {
                contains_ci(&d.name, query)
                    || contains_ci(&d.company, query)
                    || contains_ci(&d.assigned_to, query)
            })
            .take(limit)
            .map(|d| Hit {
                search_relevance: relevance(query, &[&d.name, &d.company]),
                search_type: "deal",
                record: d.clone(),
            })
            .collect();
    }

    if scope.includes(Scope::Clients) {
        results.clients = store
            .clients
            .read()
            .iter()
            .filter(|c| matches_search(c, query))
            .take(limit)
            .map(|c| Hit {
                search_relevance: relevance(query, &[&c.name, &c.company, &c.industry]),
                search_type: "client",
                record: c.clone(),
            })
            .collect();
    }

    if scope.includes(Scope::Insights) {
        results.insights = store
            .insights
            .read()
            .iter()
            .filter(|i| {
                contains_ci(&i.title, query)
                    || contains_ci(&i.description, query)
                    || i.kind.as_str().contains(query)
            })
            .take(limit)
            .map(|i| Hit {
                search_relevance: relevance(query, &[&i.title, &i.description]),
                search_type: "insight",
                record: i.clone(),
            })
            .collect();
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevance_scoring() {
        // whole query +10, word contained +3, word prefix +2
        assert_eq!(relevance("tech", &["TechCorp"]), 15);
        assert_eq!(relevance("tech", &["FinTech"]), 13);
        assert_eq!(relevance("tech", &["Retail"]), 0);
        assert_eq!(relevance("global retail", &["Global Retail Merger"]), 10 + 5 + 3);
        assert_eq!(relevance("tech", &["TechCorp", "Tech Solutions"]), 30);
    }

    #[test]
    fn test_query_too_short() {
        assert!(normalise_query(Some(" a ")).is_err());
        assert!(normalise_query(None).is_err());
        assert_eq!(normalise_query(Some("  TechCorp ")).unwrap(), "techcorp");
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!(Scope::parse(None).unwrap(), Scope::All);
        assert_eq!(Scope::parse(Some("clients")).unwrap(), Scope::Clients);
        assert!(Scope::parse(Some("people")).is_err());
    }

    #[test]
    fn test_search_all_ranks_across_collections() {
        let store = Store::seeded();
        let results = search(&store, "tech", Scope::All, 10);
        assert!(!results.deals.is_empty());
        assert!(!results.clients.is_empty());
        let ranked = results.ranked(20);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].relevance() >= w[1].relevance()));
    }

    #[test]
    fn test_search_single_scope_skips_others() {
        let store = Store::seeded();
        let results = search(&store, "tech", Scope::Deals, 10);
        assert!(results.clients.is_empty());
        assert!(results.insights.is_empty());
        assert_eq!(results.deals[0].search_type, "deal");
    }

    #[test]
    fn test_hit_serialises_flat() {
        let store = Store::seeded();
        let results = search(&store, "techcorp", Scope::Deals, 10);
        let json = serde_json::to_value(&results.deals[0]).unwrap();
        assert_eq!(json["searchType"], "deal");
        assert!(json["name"].is_string());
        assert!(json["searchRelevance"].as_u64().unwrap() > 0);
    }
}
