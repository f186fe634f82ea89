use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::gateway::{self, CompletionRequest, Document};
use crate::ai::prompts;
use crate::llm_client::{ChatModel, ChatOptions};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualizationRequest {
    pub visualization_type: Option<String>,
    pub deal_data: Option<Value>,
    pub target_audience: String,
    pub format: String,
    pub interactive: bool,
}

impl Default for VisualizationRequest {
    fn default() -> Self {
        Self {
            visualization_type: None,
            deal_data: None,
            target_audience: "executives".to_string(),
            format: "3d".to_string(),
            interactive: true,
        }
    }
}

/// Immersive features for a visualization type; unknown types get the deal-flow set.
pub fn ar_vr_features(visualization_type: &str, format: &str) -> Value {
    let primary = match visualization_type {
        "synergy_analysis" => [
            "3D view of synergies between the companies",
            "AR overlay of operating processes",
            "VR simulation of integration scenarios",
        ],
        "risk_landscape" => [
            "Colour-coded 3D risk map",
            "AR early-warning indicators",
            "VR simulation of crisis scenarios",
        ],
        "financial_modeling" => [
            "Holographic financial models",
            "AR projection of cash flows",
            "VR simulation of alternative scenarios",
        ],
        _ => [
            "AR deal map with holographic milestones",
            "VR simulation of the negotiation process",
            "Interactive 3D timelines",
        ],
    };
    let format_support: &[&str] = if format == "3d" {
        &["AR", "VR", "Holographic"]
    } else {
        &["2D", "Interactive"]
    };
    json!({
        "primary_features": primary,
        "format_support": format_support,
        "device_compatibility": ["Microsoft HoloLens", "Meta Quest", "Apple Vision Pro", "Mobile AR"],
        "collaboration_features": [
            "Multi-user AR sessions",
            "Shared VR workspaces",
            "Holographic presentations"
        ]
    })
}

pub fn interactivity_options(interactive: bool) -> Value {
    json!({
        "enabled": interactive,
        "interaction_methods": [
            "Voice commands",
            "Hand gestures",
            "Haptic feedback",
            "Eye tracking",
            "Brain-computer interface (experimental)"
        ],
        "customization_options": [
            "Interface personalisation",
            "Gesture configuration",
            "Voice profiles",
            "Display preferences"
        ],
        "accessibility_features": [
            "Voice control",
            "Enlarged interface",
            "High contrast",
            "Audio descriptions"
        ]
    })
}

/// Rendering advice scaled by the number of data layers.
pub fn performance_optimization(doc: &Document) -> Value {
    let layers = doc
        .get("data_layers")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    let complexity = match layers {
        n if n > 3 => "high",
        n if n > 1 => "medium",
        _ => "low",
    };
    let (render_quality, update_frequency, detail_level) = if complexity == "high" {
        ("medium", "30fps", "reduced")
    } else {
        ("high", "60fps", "full")
    };
    json!({
        "optimization_level": complexity,
        "recommended_settings": {
            "render_quality": render_quality,
            "update_frequency": update_frequency,
            "detail_level": detail_level
        },
        "performance_tips": [
            "Use level of detail (LOD) for complex scenes",
            "Optimise textures for mobile devices",
            "Cache frequently requested data"
        ]
    })
}

fn fallback_document() -> Document {
    gateway::into_document(json!({
        "visualization_structure": {
            "main_view": "Interactive 3D deal map with navigation across every aspect of the deal",
            "sub_views": [
                "Real-time financial panel",
                "Colour-coded risk landscape",
                "Timeline with milestones"
            ],
            "navigation": "Voice and gesture navigation in AR/VR space",
            "interactions": [
                "Touch elements for detail",
                "Voice commands to filter data",
                "Gestures to zoom and rotate"
            ]
        },
        "data_layers": [
            {
                "layer_name": "Financial data",
                "data_type": "financial",
                "visual_elements": [
                    "3D revenue and cost charts",
                    "Interactive cash flow diagrams",
                    "Live synergy view"
                ],
                "interactivity": "Touching an element shows detailed analytics"
            },
            {
                "layer_name": "Operating metrics",
                "data_type": "operational",
                "visual_elements": [
                    "Operating process map",
                    "Integration touchpoints",
                    "Performance indicators"
                ],
                "interactivity": "Voice commands filter by department"
            },
            {
                "layer_name": "Strategic insights",
                "data_type": "strategic",
                "visual_elements": [
                    "3D competitive landscape",
                    "Market opportunity view",
                    "Strategic scenarios"
                ],
                "interactivity": "Gestures switch between scenarios"
            }
        ],
        "performance_metrics": {
            "render_time": "60 FPS for smooth AR/VR",
            "memory_usage": "Optimised for mobile AR devices",
            "optimization_level": "high"
        },
        "accessibility_features": {
            "voice_navigation": [
                "Show financial data",
                "Filter by risk",
                "Zoom in",
                "Switch scenario"
            ],
            "gesture_control": [
                "Swipe to navigate",
                "Pinch to zoom",
                "Turn the hand to rotate the view"
            ],
            "accessibility_modes": [
                "High contrast",
                "Large text",
                "Audio descriptions"
            ]
        }
    }))
}

pub async fn visualize(
    llm: &dyn ChatModel,
    visualization_type: &str,
    deal: &Value,
    request: &VisualizationRequest,
) -> Document {
    let outcome = gateway::complete_json(
        llm,
        CompletionRequest {
            system: prompts::VISUALIZATION_SYSTEM,
            prompt: prompts::visualization(
                visualization_type,
                deal,
                &request.target_audience,
                &request.format,
                request.interactive,
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
    doc.insert(
        "ar_vr_features".to_string(),
        ar_vr_features(visualization_type, &request.format),
    );
    doc.insert(
        "interactivity_options".to_string(),
        interactivity_options(request.interactive),
    );
    doc.insert("performance_optimization".to_string(), optimization);
    doc.insert(
        "metadata".to_string(),
        stamp.stamp(json!({
            "visualization_type": visualization_type,
            "target_audience": request.target_audience,
            "format": request.format,
            "interactive": request.interactive,
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
    fn test_performance_scales_with_layers() {
        let doc = |n: usize| {
            gateway::into_document(json!({"data_layers": vec![json!({}); n]}))
        };
        assert_eq!(performance_optimization(&doc(0))["optimization_level"], "low");
        assert_eq!(performance_optimization(&doc(3))["optimization_level"], "medium");
        let heavy = performance_optimization(&doc(4));
        assert_eq!(heavy["optimization_level"], "high");
        assert_eq!(heavy["recommended_settings"]["update_frequency"], "30fps");
    }

    #[test]
    fn test_format_support_depends_on_format() {
        let features = ar_vr_features("risk_landscape", "2d");
        assert_eq!(features["format_support"], json!(["2D", "Interactive"]));
        assert_eq!(features["primary_features"][0], "Colour-coded 3D risk map");
        let features = ar_vr_features("unheard_of", "3d");
        assert_eq!(features["format_support"][2], "Holographic");
        assert_eq!(
            features["primary_features"][0],
            "AR deal map with holographic milestones"
        );
    }

    #[tokio::test]
    async fn test_fallback_visualization() {
        let llm = LlmClient::new(&Config::for_tests("uploads")).unwrap();
        let request = VisualizationRequest {
            interactive: false,
            ..Default::default()
        };
        let doc = visualize(&llm, "deal_flow", &json!({"value": 5}), &request).await;
        assert_eq!(doc["data_layers"].as_array().unwrap().len(), 3);
        assert_eq!(doc["performance_optimization"]["optimization_level"], "medium");
        assert_eq!(doc["interactivity_options"]["enabled"], false);
        assert_eq!(doc["metadata"]["target_audience"], "executives");
        assert_eq!(doc["metadata"]["model_used"], "demo-fallback");
        assert!(doc["metadata"]["fallback_reason"].is_string());
    }

    #[tokio::test]
    async fn test_live_visualization_gets_local_features() {
        let llm = ScriptedModel::new(&[
            r#"{"visualization_structure": {"main_view": "pipeline"}, "ar_vr_features": {"immersive_elements": []}}"#,
        ]);
        let request = VisualizationRequest::default();
        let doc = visualize(&llm, "financial_modeling", &json!({}), &request).await;
        assert_eq!(doc["visualization_structure"]["main_view"], "pipeline");
        assert_eq!(
            doc["ar_vr_features"]["primary_features"][0],
            "Holographic financial models"
        );
        assert_eq!(doc["performance_optimization"]["optimization_level"], "low");
        assert_eq!(doc["metadata"]["model_used"], "scripted");
    }
}
