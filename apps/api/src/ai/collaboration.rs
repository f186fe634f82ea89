use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::facts;
use crate::ai::gateway::{self, CompletionRequest, Document};
use crate::ai::prompts;
use crate::llm_client::{ChatModel, ChatOptions};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollaborationRequest {
    pub collaboration_type: Option<String>,
    pub team_data: Option<Value>,
    pub project_data: Value,
    pub communication_preferences: Value,
    pub ai_assistance: bool,
}

impl Default for CollaborationRequest {
    fn default() -> Self {
        Self {
            collaboration_type: None,
            team_data: None,
            project_data: Value::Null,
            communication_preferences: json!({}),
            ai_assistance: true,
        }
    }
}

pub fn ai_features(collaboration_type: &str, ai_assistance: bool) -> Value {
    let primary = match collaboration_type {
        "deal_negotiation" => [
            "AI Negotiation Support",
            "Real-time Market Data",
            "Automated Communication",
            "Deal Structure Optimization",
        ],
        "integration_team" => [
            "AI Integration Planning",
            "Progress Prediction",
            "Risk Monitoring",
            "Success Metrics Tracking",
        ],
        "virtual_team" => [
            "AI Meeting Assistant",
            "Smart Scheduling",
            "Virtual Team Building",
            "Performance Analytics",
        ],
        _ => [
            "AI Document Analysis",
            "Automated Risk Scoring",
            "Smart Task Assignment",
            "Predictive Timeline Management",
        ],
    };
    let automation_level = if ai_assistance { "high" } else { "medium" };
    json!({
        "primary_features": primary,
        "ai_assistance_enabled": ai_assistance,
        "automation_level": automation_level,
        "integration_capabilities": [
            "Calendar Integration",
            "Communication Platforms",
            "Project Management Tools",
            "Analytics Dashboards"
        ]
    })
}

/// Tooling summary; the caller's preferences are echoed back unchanged.
pub fn communication_tools(preferences: &Value) -> Value {
    json!({
        "primary_tools": ["Slack/Teams", "Email", "Video Conferencing", "Project Management Platforms"],
        "preferences": preferences,
        "automation_features": ["Auto-scheduling", "Smart notifications", "Meeting transcription", "Action item tracking"],
        "collaboration_features": ["Real-time editing", "Version control", "Comment threads", "Approval workflows"]
    })
}

fn nested_len(doc: &Document, outer: &str, inner: &str) -> usize {
    doc.get(outer)
        .and_then(|o| o.get(inner))
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

/// Efficiency drops 5 points per role; communication gains 20 per channel.
pub fn performance_optimization(doc: &Document) -> Value {
    let roles = nested_len(doc, "team_structure", "roles");
    let channels = nested_len(doc, "communication_framework", "channels");
    let efficiency = 100usize.saturating_sub(roles * 5);
    let communication = (channels * 20).min(100);
    let quality = if roles > 0 && channels > 0 {
        "high"
    } else {
        "medium"
    };
    json!({
        "team_efficiency_score": efficiency,
        "communication_effectiveness": communication,
        "collaboration_quality": quality,
        "optimization_recommendations": [
            "Regular retrospectives",
            "Automate routine tasks",
            "Improve communication processes",
            "Introduce AI assistants"
        ]
    })
}

fn fallback_document() -> Document {
    gateway::into_document(json!({
        "team_structure": {
            "roles": [
                {
                    "title": "Project Manager",
                    "responsibilities": ["Coordinate every aspect of the project", "Manage timelines", "Stakeholder communication"],
                    "required_skills": ["Project management", "Communication", "Leadership"],
                    "ai_support": "AI assistant for planning and progress tracking"
                },
                {
                    "title": "Financial Analyst",
                    "responsibilities": ["Financial analysis", "Modelling", "Risk assessment"],
                    "required_skills": ["Financial modelling", "Data analysis", "Excel/Financial Tools"],
                    "ai_support": "AI automation of routine calculations and trend analysis"
                },
                {
                    "title": "Legal Advisor",
                    "responsibilities": ["Legal analysis", "Compliance", "Document management"],
                    "required_skills": ["Corporate law", "M&A experience", "Regulatory knowledge"],
                    "ai_support": "AI document review and automated compliance checks"
                }
            ],
            "reporting_hierarchy": "Flat structure with weekly reports",
            "decision_making_process": "Team consensus with final approval by the PM"
        },
        "communication_framework": {
            "channels": [
                {"type": "Slack/Teams", "purpose": "Daily communication and quick questions", "frequency": "Continuous", "participants": ["Whole team"]},
                {"type": "Email", "purpose": "Formal communication and document flow", "frequency": "As needed", "participants": ["Team and stakeholders"]},
                {"type": "Video Calls", "purpose": "Weekly meetings and key discussions", "frequency": "Weekly", "participants": ["Whole team"]}
            ],
            "meeting_schedule": [
                {"type": "Kick-off Meeting", "frequency": "Once", "duration": "2 hours", "agenda": "Team introductions, goals and roles"},
                {"type": "Weekly Status", "frequency": "Weekly", "duration": "1 hour", "agenda": "Progress review, blockers, planning"},
                {"type": "Milestone Review", "frequency": "At each milestone", "duration": "1.5 hours", "agenda": "Review results and adjust plans"}
            ]
        },
        "ai_collaboration_features": [
            {
                "feature": "AI Meeting Assistant",
                "description": "Automatic meeting notes and action tracking",
                "benefits": ["Less time spent on documentation", "Better decision tracking", "Automatic reminders"],
                "implementation": "Integration with calendar and communication systems"
            },
            {
                "feature": "Smart Task Assignment",
                "description": "AI recommendations for task assignment based on skills and workload",
                "benefits": ["Balanced workload", "Less overload", "Higher efficiency"],
                "implementation": "Analysis of skill profiles and current workload"
            },
            {
                "feature": "Predictive Analytics",
                "description": "Forecasting of risks and likely delays",
                "benefits": ["Proactive risk management", "Better planning", "Fewer surprises"],
                "implementation": "Analysis of historical data and current metrics"
            }
        ],
        "project_management": {
            "tools": ["Asana/Jira", "Microsoft Project", "Trello", "Notion"],
            "methodology": "Hybrid approach (Agile + Waterfall)",
            "milestones": [
                {"name": "Project Initiation", "description": "Project launch and team formation", "timeline": "Week 1", "deliverables": ["Project Charter", "Team Roster", "Initial Plan"]},
                {"name": "Data Collection", "description": "Gather all required data and documents", "timeline": "Weeks 2-4", "deliverables": ["Data Repository", "Document Index", "Initial Analysis"]},
                {"name": "Analysis Phase", "description": "Detailed analysis", "timeline": "Weeks 5-8", "deliverables": ["Financial Analysis", "Risk Assessment", "Valuation"]},
                {"name": "Final Report", "description": "Prepare the final report", "timeline": "Weeks 9-10", "deliverables": ["Final Report", "Presentation", "Recommendations"]}
            ]
        },
        "quality_assurance": {
            "review_process": "Multi-level review with subject experts",
            "approval_workflow": "Automated workflow with notifications",
            "feedback_mechanisms": ["Weekly retrospectives", "360-degree feedback", "Client surveys"]
        }
    }))
}

pub async fn design(
    llm: &dyn ChatModel,
    collaboration_type: &str,
    team: &Value,
    request: &CollaborationRequest,
) -> Document {
    let outcome = gateway::complete_json(
        llm,
        CompletionRequest {
            system: prompts::COLLABORATION_SYSTEM,
            prompt: prompts::collaboration(
                collaboration_type,
                team,
                &request.project_data,
                &request.communication_preferences,
                request.ai_assistance,
            ),
            options: ChatOptions {
                temperature: 0.3,
                max_tokens: 1500,
            },
        },
    )
    .await;
    let (mut doc, stamp) = outcome.or_fallback(fallback_document);

    let optimization = performance_optimization(&doc);
    let project_scope = facts::text(&request.project_data, "scope")
        .filter(|s| !s.is_empty())
        .unwrap_or("general");
    doc.insert(
        "ai_features".to_string(),
        ai_features(collaboration_type, request.ai_assistance),
    );
    doc.insert(
        "communication_tools".to_string(),
        communication_tools(&request.communication_preferences),
    );
    doc.insert("performance_optimization".to_string(), optimization);
    doc.insert(
        "metadata".to_string(),
        stamp.stamp(json!({
            "collaboration_type": collaboration_type,
            "team_size": facts::count(team, "members"),
            "project_scope": project_scope,
            "created_at": Utc::now(),
        })),
    );
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::LlmClient;

    #[test]
    fn test_performance_from_roles_and_channels() {
        let perf = performance_optimization(&fallback_document());
        assert_eq!(perf["team_efficiency_score"], 85);
        assert_eq!(perf["communication_effectiveness"], 60);
        assert_eq!(perf["collaboration_quality"], "high");

        let crowded = gateway::into_document(json!({
            "team_structure": {"roles": vec![json!({}); 25]},
            "communication_framework": {"channels": vec![json!({}); 7]}
        }));
        let perf = performance_optimization(&crowded);
        assert_eq!(perf["team_efficiency_score"], 0);
        assert_eq!(perf["communication_effectiveness"], 100);

        let perf = performance_optimization(&Document::new());
        assert_eq!(perf["collaboration_quality"], "medium");
    }

    #[test]
    fn test_ai_features_by_type() {
        let features = ai_features("virtual_team", false);
        assert_eq!(features["primary_features"][1], "Smart Scheduling");
        assert_eq!(features["automation_level"], "medium");
        let features = ai_features("unknown", true);
        assert_eq!(features["primary_features"][0], "AI Document Analysis");
        assert_eq!(features["automation_level"], "high");
    }

    #[tokio::test]
    async fn test_fallback_collaboration() {
        let llm = LlmClient::new(&Config::for_tests("uploads")).unwrap();
        let team = json!({"members": ["ann", "bo", "cy"]});
        let request = CollaborationRequest {
            project_data: json!({"scope": "due diligence"}),
            communication_preferences: json!({"timezone": "UTC"}),
            ..Default::default()
        };
        let doc = design(&llm, "due_diligence_team", &team, &request).await;
        assert_eq!(doc["metadata"]["team_size"], 3);
        assert_eq!(doc["metadata"]["project_scope"], "due diligence");
        assert_eq!(doc["metadata"]["model_used"], "demo-fallback");
        assert_eq!(doc["communication_tools"]["preferences"]["timezone"], "UTC");
        assert_eq!(doc["team_structure"]["roles"][0]["title"], "Project Manager");
    }

    #[tokio::test]
    async fn test_live_collaboration_is_scored() {
        let llm = ScriptedModel::new(&[r#"{"team_structure": {"roles": [{"title": "Lead"}]}}"#]);
        let doc = design(&llm, "integration_team", &json!({}), &CollaborationRequest::default()).await;
        assert_eq!(doc["performance_optimization"]["team_efficiency_score"], 95);
        assert_eq!(doc["performance_optimization"]["communication_effectiveness"], 0);
        assert_eq!(doc["metadata"]["project_scope"], "general");
        assert_eq!(doc["metadata"]["team_size"], 0);
        assert_eq!(doc["metadata"]["model_used"], "scripted");
    }
}
