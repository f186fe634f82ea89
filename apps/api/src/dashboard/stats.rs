//! Dashboard aggregates computed from a snapshot of the store.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;

use crate::models::client::Client;
use crate::models::deal::{Deal, DealStage};
use crate::models::insight::{Insight, InsightKind};
use crate::models::Level;
use crate::store::Store;

const TOP_N: usize = 5;

#[derive(Debug, Serialize, PartialEq)]
pub struct Trend {
    pub current: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    pub change: String,
    pub trend: &'static str,
}

impl Trend {
    /// `change` is a whole-percent delta; non-negative deltas trend up.
    pub fn with_change(current: f64, change: i32) -> Self {
        Self {
            current,
            formatted: None,
            change: format!("{}{change}%", if change >= 0 { "+" } else { "" }),
            trend: if change >= 0 { "up" } else { "down" },
        }
    }

    /// Demo delta in -10..=19 percent.
    fn random(current: f64, rng: &mut impl Rng) -> Self {
        Self::with_change(current, rng.random_range(-10..20))
    }

    fn fixed(current: f64, formatted: String, change: &str) -> Self {
        Self {
            current,
            formatted: Some(formatted),
            change: change.to_string(),
            trend: "up",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub active_deals: Trend,
    pub total_pipeline_value: Trend,
    pub success_rate: Trend,
    pub total_insights: Trend,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealBreakdown {
    pub by_stage: BTreeMap<&'static str, usize>,
    pub by_priority: BTreeMap<&'static str, usize>,
    pub average_value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightBreakdown {
    pub by_type: BTreeMap<&'static str, usize>,
    pub high_impact: usize,
    pub average_confidence: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopClient {
    pub id: String,
    pub name: String,
    pub company: String,
    pub score: u8,
    pub deal_potential: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientBreakdown {
    pub by_status: BTreeMap<&'static str, usize>,
    pub total_clients: usize,
    pub average_score: u32,
    pub top_clients: Vec<TopClient>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentDeal {
    pub id: String,
    pub name: String,
    pub company: String,
    pub value: f64,
    pub stage: DealStage,
    pub probability: u8,
    pub last_activity: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentInsight {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub confidence: u8,
    pub impact: Level,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RecentActivity {
    pub deals: Vec<RecentDeal>,
    pub insights: Vec<RecentInsight>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub period: String,
    pub generated_at: DateTime<Utc>,
    pub deals_in_pipeline: usize,
    pub average_deal_size: f64,
    pub conversion_rate: String,
    pub ai_analysis_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub overview: Overview,
    pub deal_breakdown: DealBreakdown,
    pub insight_breakdown: InsightBreakdown,
    pub client_breakdown: ClientBreakdown,
    pub recent_activity: RecentActivity,
    pub performance: Performance,
}

fn tally<'a, T: 'a>(
    items: impl IntoIterator<Item = &'a T>,
    key: impl Fn(&T) -> &'static str,
) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

fn rounded_mean(values: impl ExactSizeIterator<Item = u32>) -> u32 {
    let n = values.len() as f64;
    if n == 0.0 {
        return 0;
    }
    (values.map(f64::from).sum::<f64>() / n).round() as u32
}

pub fn compute(store: &Store, period: &str) -> DashboardStats {
    // snapshot each collection so no two locks are held together
    let deals: Vec<Deal> = store.deals.read().clone();
    let clients: Vec<Client> = store.clients.read().clone();
    let insights: Vec<Insight> = store.insights.read().clone();
    compute_from(&deals, &clients, &insights, period, &mut rand::rng())
}

fn compute_from(
    deals: &[Deal],
    clients: &[Client],
    insights: &[Insight],
    period: &str,
    rng: &mut impl Rng,
) -> DashboardStats {
    let active: Vec<&Deal> = deals.iter().filter(|d| d.stage.is_active()).collect();
    let pipeline: f64 = active.iter().map(|d| d.value).sum();
    let closed = deals
        .iter()
        .filter(|d| d.stage == DealStage::Closed)
        .count();
    let success_rate = if deals.is_empty() {
        0.0
    } else {
        (closed as f64 / deals.len() as f64 * 100.0).round()
    };

    let mut by_score: Vec<&Client> = clients.iter().collect();
    by_score.sort_by(|a, b| b.score.cmp(&a.score));
    let top_clients = by_score
        .into_iter()
        .take(TOP_N)
        .map(|c| TopClient {
            id: c.id.clone(),
            name: c.name.clone(),
            company: c.company.clone(),
            score: c.score,
            deal_potential: c.deal_potential.clone(),
        })
        .collect();

    let fallback_close = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN);
    let mut by_close: Vec<&Deal> = deals.iter().collect();
    by_close.sort_by(|a, b| {
        b.expected_close
            .unwrap_or(fallback_close)
            .cmp(&a.expected_close.unwrap_or(fallback_close))
    });
    let recent_deals = by_close
        .into_iter()
        .take(TOP_N)
        .map(|d| RecentDeal {
            id: d.id.clone(),
            name: d.name.clone(),
            company: d.company.clone(),
            value: d.value,
            stage: d.stage,
            probability: d.probability,
            last_activity: d.last_activity.clone(),
        })
        .collect();

    let recent_insights = insights
        .iter()
        .take(TOP_N)
        .map(|i| RecentInsight {
            id: i.id.clone(),
            kind: i.kind,
            title: i.title.clone(),
            confidence: i.confidence,
            impact: i.impact,
            timestamp: i.timestamp,
        })
        .collect();

    let rate = format!("{success_rate}%");

    DashboardStats {
        overview: Overview {
            active_deals: Trend::random(active.len() as f64, rng),
            total_pipeline_value: Trend::fixed(
                pipeline,
                format!("${:.1}M", pipeline / 1_000_000.0),
                "+8%",
            ),
            success_rate: Trend::fixed(success_rate, rate.clone(), "+3%"),
            total_insights: Trend::random(insights.len() as f64, rng),
        },
        deal_breakdown: DealBreakdown {
            by_stage: tally(deals, |d| d.stage.as_str()),
            by_priority: tally(deals, |d| d.priority.as_str()),
            average_value: if deals.is_empty() {
                0.0
            } else {
                (pipeline / deals.len() as f64).round()
            },
        },
        insight_breakdown: InsightBreakdown {
            by_type: tally(insights, |i| i.kind.as_str()),
            high_impact: insights.iter().filter(|i| i.impact == Level::High).count(),
            average_confidence: rounded_mean(insights.iter().map(|i| u32::from(i.confidence))),
        },
        client_breakdown: ClientBreakdown {
            by_status: tally(clients, |c| c.status.as_str()),
            total_clients: clients.len(),
            average_score: rounded_mean(clients.iter().map(|c| u32::from(c.score))),
            top_clients,
        },
        recent_activity: RecentActivity {
            deals: recent_deals,
            insights: recent_insights,
        },
        performance: Performance {
            period: period.to_string(),
            generated_at: Utc::now(),
            deals_in_pipeline: active.len(),
            average_deal_size: if active.is_empty() {
                0.0
            } else {
                (pipeline / active.len() as f64).round()
            },
            conversion_rate: rate,
            ai_analysis_count: insights.len(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_stats() -> DashboardStats {
        compute(&Store::seeded(), "30d")
    }

    #[test]
    fn test_trend_formatting() {
        assert_eq!(Trend::with_change(3.0, 5).change, "+5%");
        assert_eq!(Trend::with_change(3.0, 0).trend, "up");
        let down = Trend::with_change(3.0, -4);
        assert_eq!(down.change, "-4%");
        assert_eq!(down.trend, "down");
    }

    #[test]
    fn test_seeded_overview() {
        let stats = seeded_stats();
        assert_eq!(stats.overview.active_deals.current, 3.0);
        assert_eq!(stats.overview.total_pipeline_value.current, 240_000_000.0);
        assert_eq!(
            stats.overview.total_pipeline_value.formatted.as_deref(),
            Some("$240.0M")
        );
        assert_eq!(stats.overview.success_rate.current, 0.0);
        assert_eq!(stats.performance.average_deal_size, 80_000_000.0);
        assert_eq!(stats.performance.conversion_rate, "0%");
    }

    #[test]
    fn test_seeded_breakdowns() {
        let stats = seeded_stats();
        assert_eq!(stats.deal_breakdown.by_stage.get("negotiation"), Some(&1));
        assert_eq!(stats.client_breakdown.by_status.get("warm"), Some(&2));
        assert_eq!(stats.client_breakdown.top_clients[0].score, 92);
        assert_eq!(stats.insight_breakdown.by_type.len(), 3);
        // latest expected close first
        assert_eq!(stats.recent_activity.deals[0].id, "3");
    }

    #[test]
    fn test_no_active_deals_has_zero_average() {
        let store = Store::default();
        let stats = compute(&store, "7d");
        assert_eq!(stats.performance.average_deal_size, 0.0);
        assert_eq!(stats.deal_breakdown.average_value, 0.0);
        assert_eq!(stats.insight_breakdown.average_confidence, 0);
        assert_eq!(stats.performance.period, "7d");
    }
}
