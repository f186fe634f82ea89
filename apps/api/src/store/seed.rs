use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::calendar::{CalendarEvent, EventKind};
use crate::models::client::{Client, ClientStatus, ContactInfo};
use crate::models::deal::{Deal, DealStage};
use crate::models::insight::{Insight, InsightKind};
use crate::models::Level;

pub(super) fn deals(now: DateTime<Utc>) -> Vec<Deal> {
    let deal = |id: &str,
                name: &str,
                company: &str,
                value: f64,
                stage: DealStage,
                probability: u8,
                close: (i32, u32, u32),
                hours_ago: i64,
                assigned_to: &str,
                priority: Level| {
        let touched = now - Duration::hours(hours_ago);
        Deal {
            id: id.to_string(),
            name: name.to_string(),
            company: company.to_string(),
            value,
            stage,
            probability,
            expected_close: NaiveDate::from_ymd_opt(close.0, close.1, close.2),
            last_activity: activity_label(hours_ago),
            assigned_to: assigned_to.to_string(),
            priority,
            created_at: touched,
            updated_at: touched,
        }
    };

    vec![
        deal(
            "1",
            "TechCorp Acquisition",
            "TechCorp Inc.",
            45_000_000.0,
            DealStage::Negotiation,
            85,
            (2024, 3, 15),
            2,
            "Sarah Johnson",
            Level::High,
        ),
        deal(
            "2",
            "Global Retail Merger",
            "Retail Solutions Ltd.",
            120_000_000.0,
            DealStage::Proposal,
            65,
            (2024, 4, 20),
            24,
            "Michael Chen",
            Level::Medium,
        ),
        deal(
            "3",
            "Healthcare Partnership",
            "MedTech Systems",
            75_000_000.0,
            DealStage::Qualified,
            45,
            (2024, 5, 10),
            72,
            "Emily Rodriguez",
            Level::High,
        ),
    ]
}

fn activity_label(hours_ago: i64) -> String {
    match hours_ago {
        h if h < 24 => format!("{h} hours ago"),
        h if h < 48 => "1 day ago".to_string(),
        h => format!("{} days ago", h / 24),
    }
}

pub(super) fn clients(now: DateTime<Utc>) -> Vec<Client> {
    vec![
        Client {
            id: "1".to_string(),
            name: "Sarah Johnson".to_string(),
            company: "TechCorp Solutions".to_string(),
            industry: "Technology".to_string(),
            location: "San Francisco, CA".to_string(),
            revenue: "$50M - $100M".to_string(),
            employees: "200-500".to_string(),
            description:
                "Leading provider of enterprise software solutions with strong growth potential."
                    .to_string(),
            contact_info: ContactInfo {
                email: "sarah.johnson@techcorp.com".to_string(),
                phone: "+1 (415) 555-0123".to_string(),
                website: "www.techcorp.com".to_string(),
            },
            score: 92,
            status: ClientStatus::Hot,
            last_contact: "2 days ago".to_string(),
            deal_potential: "$5M - $10M".to_string(),
            tags: tags(&["Enterprise", "SaaS", "Growth Stage"]),
            created_at: now,
            updated_at: now,
        },
        Client {
            id: "2".to_string(),
            name: "Michael Chen".to_string(),
            company: "Global Retail Group".to_string(),
            industry: "Retail".to_string(),
            location: "New York, NY".to_string(),
            revenue: "$100M - $500M".to_string(),
            employees: "1000-5000".to_string(),
            description:
                "Multi-national retail chain looking for digital transformation opportunities."
                    .to_string(),
            contact_info: ContactInfo {
                email: "mchen@globalretail.com".to_string(),
                phone: "+1 (212) 555-0456".to_string(),
                website: "www.globalretail.com".to_string(),
            },
            score: 85,
            status: ClientStatus::Warm,
            last_contact: "1 week ago".to_string(),
            deal_potential: "$10M - $25M".to_string(),
            tags: tags(&["Retail", "Digital Transformation", "International"]),
            created_at: now,
            updated_at: now,
        },
        Client {
            id: "3".to_string(),
            name: "Emily Rodriguez".to_string(),
            company: "MedTech Innovations".to_string(),
            industry: "Healthcare".to_string(),
            location: "Boston, MA".to_string(),
            revenue: "$25M - $50M".to_string(),
            employees: "100-200".to_string(),
            description: "Innovative medical technology startup with breakthrough products."
                .to_string(),
            contact_info: ContactInfo {
                email: "emily@medtechinnovations.com".to_string(),
                phone: "+1 (617) 555-0789".to_string(),
                website: "www.medtechinnovations.com".to_string(),
            },
            score: 78,
            status: ClientStatus::Warm,
            last_contact: "3 days ago".to_string(),
            deal_potential: "$2M - $5M".to_string(),
            tags: tags(&["Healthcare", "Startup", "Innovation"]),
            created_at: now,
            updated_at: now,
        },
    ]
}

fn tags(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub(super) fn insights(now: DateTime<Utc>) -> Vec<Insight> {
    vec![
        Insight {
            id: "1".to_string(),
            kind: InsightKind::Opportunity,
            title: "High Probability Deal Alert".to_string(),
            description: "TechCorp acquisition shows 85% success probability based on market conditions and company performance.".to_string(),
            impact: Level::High,
            confidence: 92,
            deal_id: Some("1".to_string()),
            timestamp: now - Duration::hours(2),
        },
        Insight {
            id: "2".to_string(),
            kind: InsightKind::Risk,
            title: "Regulatory Risk Detected".to_string(),
            description: "Potential antitrust concerns identified in Global Retail merger. Recommend additional legal review.".to_string(),
            impact: Level::Medium,
            confidence: 78,
            deal_id: Some("2".to_string()),
            timestamp: now - Duration::days(1),
        },
        Insight {
            id: "3".to_string(),
            kind: InsightKind::Trend,
            title: "Market Trend Analysis".to_string(),
            description: "Healthcare sector showing increased M&A activity. 23% more deals expected in Q2 2024.".to_string(),
            impact: Level::Low,
            confidence: 85,
            deal_id: None,
            timestamp: now - Duration::days(3),
        },
    ]
}

pub(super) fn events(now: DateTime<Utc>) -> Vec<CalendarEvent> {
    let event = |id: &str,
                 title: &str,
                 description: &str,
                 days_ahead: i64,
                 kind: EventKind,
                 priority: Level,
                 deal: Option<(&str, &str)>| CalendarEvent {
        id: id.to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        date: now + Duration::days(days_ahead),
        kind,
        priority,
        deal_id: deal.map(|(id, _)| id.to_string()),
        deal_name: deal.map(|(_, name)| name.to_string()),
        completed: false,
        user_id: "system".to_string(),
        created_at: now,
        updated_at: now,
    };

    vec![
        event(
            "1",
            "Due diligence deadline",
            "Complete the financial review for TechCorp Acquisition",
            7,
            EventKind::Deadline,
            Level::High,
            Some(("1", "TechCorp Acquisition")),
        ),
        event(
            "2",
            "Investor meeting",
            "Present Global Retail Merger to prospective investors",
            3,
            EventKind::Meeting,
            Level::Medium,
            Some(("2", "Global Retail Merger")),
        ),
        event(
            "3",
            "LOI signing",
            "Sign the Letter of Intent for Healthcare Partnership",
            1,
            EventKind::Milestone,
            Level::High,
            Some(("3", "Healthcare Partnership")),
        ),
        event(
            "4",
            "Document review reminder",
            "Check the legal documents for every active deal",
            2,
            EventKind::Reminder,
            Level::Medium,
            None,
        ),
    ]
}
