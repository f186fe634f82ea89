use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::facts;
use crate::ai::gateway::{self, CompletionRequest, Document};
use crate::ai::prompts;
use crate::llm_client::{ChatModel, ChatOptions};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockchainRequest {
    pub blockchain_type: Option<String>,
    pub deal_data: Option<Value>,
    pub contract_type: String,
    pub security_level: String,
    pub compliance: bool,
}

impl Default for BlockchainRequest {
    fn default() -> Self {
        Self {
            blockchain_type: None,
            deal_data: None,
            contract_type: "smart_contract".to_string(),
            security_level: "enterprise".to_string(),
            compliance: true,
        }
    }
}

/// Unknown security levels get the enterprise feature set.
pub fn security_features(security_level: &str) -> Value {
    let features: &[&str] = match security_level {
        "basic" => &["Basic authentication", "Data encryption", "Access control"],
        "military" => &[
            "Quantum-resistant encryption",
            "Biometric authentication",
            "Network isolation",
            "Real-time monitoring",
            "Automated threat response",
        ],
        _ => &[
            "Multi-factor authentication",
            "End-to-end encryption",
            "Role-based access",
            "Security audits",
            "DDoS protection",
        ],
    };
    json!({
        "security_level": security_level,
        "features": features,
        "certifications": ["ISO 27001", "SOC 2 Type II", "PCI DSS", "GDPR Compliance"],
        "monitoring": [
            "24/7 security monitoring",
            "Automated threat detection",
            "Real-time alerts",
            "Security analytics"
        ]
    })
}

pub fn compliance_framework(enabled: bool) -> Value {
    json!({
        "enabled": enabled,
        "frameworks": [
            "GDPR - General Data Protection Regulation",
            "SOX - Sarbanes-Oxley Act",
            "ISO 27001 - Information security",
            "PCI DSS - Payment Card Industry Data Security Standard"
        ],
        "features": [
            "Automated compliance checks",
            "Compliance report generation",
            "Consent management",
            "Right to be forgotten"
        ],
        "reporting": [
            "Quarterly compliance reports",
            "Annual audits",
            "Regulatory reporting",
            "Internal reviews"
        ]
    })
}

/// Throughput estimate from the network type (private when absent) and contract count.
pub fn performance_metrics(doc: &Document) -> Value {
    let contracts = doc
        .get("smart_contracts")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    let private = doc
        .get("blockchain_architecture")
        .and_then(|a| facts::text(a, "network_type"))
        .map_or(true, |t| t == "private");
    let scalability = match contracts {
        n if n > 5 => "high",
        n if n > 2 => "medium",
        _ => "low",
    };
    let (speed, confirmation, cost) = if private {
        ("1000+ TPS", "< 2 seconds", "high")
    } else {
        ("100+ TPS", "< 10 seconds", "medium")
    };
    json!({
        "transaction_speed": speed,
        "confirmation_time": confirmation,
        "scalability": scalability,
        "cost_efficiency": cost,
        "performance_optimization": [
            "Smart contract optimisation",
            "Layer 2 solutions",
            "Data caching",
            "Load balancing"
        ]
    })
}

fn fallback_document() -> Document {
    gateway::into_document(json!({
        "blockchain_architecture": {
            "network_type": "private",
            "consensus_mechanism": "Proof of Authority (PoA) for enterprise use",
            "block_time": "2 seconds for fast transaction confirmation",
            "scalability_solution": "Layer 2 and sharding for high throughput"
        },
        "smart_contracts": [
            {
                "contract_name": "DealExecutionContract",
                "purpose": "Automatic execution of deal terms",
                "functions": ["executePayment", "releaseEscrow", "validateConditions", "triggerMilestones"],
                "security_features": ["Multi-factor authentication", "Data encryption", "Signature verification", "Re-entrancy protection"],
                "compliance_checks": ["KYC/AML screening", "Regulatory compliance", "Transaction audit", "Reporting"]
            },
            {
                "contract_name": "DueDiligenceContract",
                "purpose": "Management of the due diligence process",
                "functions": ["uploadDocument", "verifyDocument", "grantAccess", "revokeAccess"],
                "security_features": ["Document encryption", "Access control", "Time-limited access", "Action audit"],
                "compliance_checks": ["Authenticity checks", "Requirement compliance", "Version control", "Change tracking"]
            },
            {
                "contract_name": "IntegrationContract",
                "purpose": "Tracking of integration processes",
                "functions": ["trackMilestone", "updateProgress", "notifyStakeholders", "measureSuccess"],
                "security_features": ["Data protection", "Access control", "Change audit", "Backups"],
                "compliance_checks": ["Plan adherence", "Progress reporting", "Quality control", "Risk management"]
            }
        ],
        "token_economics": {
            "token_type": "utility",
            "distribution_model": "Tokens allocated by role and contribution to the deal",
            "incentive_mechanism": "Rewards for completed stages and reached goals",
            "governance_structure": "Decentralised governance with stakeholder voting"
        },
        "security_framework": {
            "encryption_standards": ["AES-256 for data encryption", "RSA-4096 for asymmetric encryption", "SHA-256 for hashing"],
            "access_control": "Role-based access with multi-factor authentication",
            "audit_trail": "Full, traceable record of every action",
            "risk_mitigation": ["Regular security audits", "Suspicious activity monitoring", "Automatic threat blocking", "Data backups"]
        },
        "compliance_features": {
            "regulatory_compliance": [
                "GDPR for personal data protection",
                "SOX for financial reporting",
                "ISO 27001 for information security",
                "PCI DSS for payment data"
            ],
            "kyc_aml_integration": "KYC/AML integration for participant screening",
            "reporting_mechanisms": ["Automatic report generation", "Regulatory reporting", "Internal audit", "External audit"],
            "audit_requirements": ["Regular security audits", "Compliance audits", "Performance audits", "Availability audits"]
        }
    }))
}

pub async fn design(
    llm: &dyn ChatModel,
    blockchain_type: &str,
    deal: &Value,
    request: &BlockchainRequest,
) -> Document {
    let outcome = gateway::complete_json(
        llm,
        CompletionRequest {
            system: prompts::BLOCKCHAIN_SYSTEM,
            prompt: prompts::blockchain(
                blockchain_type,
                deal,
                &request.contract_type,
                &request.security_level,
                request.compliance,
            ),
            options: ChatOptions {
                temperature: 0.2,
                max_tokens: 1500,
            },
        },
    )
    .await;
    let (mut doc, stamp) = outcome.or_fallback(fallback_document);

    let performance = performance_metrics(&doc);
    doc.insert(
        "security_features".to_string(),
        security_features(&request.security_level),
    );
    doc.insert(
        "compliance_framework".to_string(),
        compliance_framework(request.compliance),
    );
    doc.insert("performance_metrics".to_string(), performance);
    doc.insert(
        "metadata".to_string(),
        stamp.stamp(json!({
            "blockchain_type": blockchain_type,
            "contract_type": request.contract_type,
            "security_level": request.security_level,
            "compliance_enabled": request.compliance,
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
    fn test_performance_by_network_and_contracts() {
        let perf = performance_metrics(&fallback_document());
        assert_eq!(perf["transaction_speed"], "1000+ TPS");
        assert_eq!(perf["scalability"], "medium");

        let public = gateway::into_document(json!({
            "blockchain_architecture": {"network_type": "public"},
            "smart_contracts": vec![json!({}); 6]
        }));
        let perf = performance_metrics(&public);
        assert_eq!(perf["transaction_speed"], "100+ TPS");
        assert_eq!(perf["cost_efficiency"], "medium");
        assert_eq!(perf["scalability"], "high");

        let perf = performance_metrics(&Document::new());
        assert_eq!(perf["confirmation_time"], "< 2 seconds");
        assert_eq!(perf["scalability"], "low");
    }

    #[test]
    fn test_security_features_by_level() {
        assert_eq!(security_features("basic")["features"].as_array().unwrap().len(), 3);
        let unknown = security_features("paranoid");
        assert_eq!(unknown["security_level"], "paranoid");
        assert_eq!(unknown["features"][0], "Multi-factor authentication");
    }

    #[tokio::test]
    async fn test_fallback_blockchain() {
        let llm = LlmClient::new(&Config::for_tests("uploads")).unwrap();
        let request = BlockchainRequest {
            compliance: false,
            ..Default::default()
        };
        let doc = design(&llm, "deal_execution", &json!({"value": 5}), &request).await;
        assert_eq!(doc["smart_contracts"].as_array().unwrap().len(), 3);
        assert_eq!(doc["compliance_framework"]["enabled"], false);
        assert_eq!(doc["metadata"]["contract_type"], "smart_contract");
        assert_eq!(doc["metadata"]["compliance_enabled"], false);
        assert_eq!(doc["metadata"]["model_used"], "demo-fallback");
    }

    #[tokio::test]
    async fn test_live_blockchain_gets_local_metrics() {
        let llm = ScriptedModel::new(&[
            r#"{"blockchain_architecture": {"network_type": "hybrid"}, "performance_metrics": {"tps": 1}}"#,
        ]);
        let doc = design(&llm, "governance", &json!({}), &BlockchainRequest::default()).await;
        assert_eq!(doc["performance_metrics"]["transaction_speed"], "100+ TPS");
        assert!(doc["performance_metrics"].get("tps").is_none());
        assert_eq!(doc["security_features"]["security_level"], "enterprise");
        assert_eq!(doc["metadata"]["model_used"], "scripted");
    }
}
