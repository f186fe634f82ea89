// Prompt templates for the AI endpoints.

use serde_json::Value;

pub const CHAT_SYSTEM: &str = "You are an expert M&A advisor and AI assistant with deep knowledge of:
- Mergers and acquisitions processes and best practices
- Financial analysis and valuation methodologies
- Legal and regulatory compliance in M&A transactions
- Market intelligence and competitive analysis
- Due diligence processes and risk assessment
- Deal structuring and negotiation strategies

You provide clear, actionable insights and recommendations. Always consider the context of the conversation and provide specific, relevant advice. If you need more information to provide a complete answer, ask clarifying questions.";

pub const REPLY_ANALYZER_SYSTEM: &str =
    "You are an expert M&A response analyzer. Provide comprehensive analysis of advisory replies.";

pub const DOCUMENT_SYSTEM: &str = "You are an expert M&A document analyzer.";

pub const PREDICTION_SYSTEM: &str = "You are an expert M&A predictive analyst.";

pub const NEGOTIATION_SYSTEM: &str = "You are an expert M&A negotiation strategist with decades of experience in complex deal negotiations. Provide strategic advice, tactics, and recommendations for successful deal execution.";

pub const RISK_SYSTEM: &str = "You are an expert M&A risk management specialist with deep knowledge of financial, operational, legal, and strategic risks in complex transactions.";

pub const MARKET_SYSTEM: &str = "You are an expert market intelligence analyst specializing in M&A and competitive analysis. Provide detailed, accurate market insights.";

pub const VISUALIZATION_SYSTEM: &str = "You are an expert in data visualization and AR/VR technologies for M&A. Create immersive, interactive visualizations that transform complex deal data into intuitive experiences.";

pub const COLLABORATION_SYSTEM: &str = "You are an expert M&A collaboration and team coordination specialist. Design effective collaboration frameworks that optimize team performance and project outcomes.";

pub const BLOCKCHAIN_SYSTEM: &str = "You are an expert in blockchain technology and smart contracts for M&A transactions. Design secure, compliant, and efficient blockchain solutions.";

pub fn report_system(language: &str, format: &str) -> String {
    format!("You are an expert M&A report writer. Generate professional, comprehensive reports in {language} language. Use {format} format. Include executive summary, detailed analysis, and actionable recommendations.")
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn chat_system(context: &Value) -> String {
    format!("{CHAT_SYSTEM}\n\nCurrent context: {context}")
}

pub fn reply_analysis(user_message: &str, reply: &str) -> String {
    format!(
        r#"Analyze the following AI response to a user query and provide comprehensive analysis:

User Query: "{user_message}"
AI Response: "{reply}"

Provide detailed analysis in the following JSON format:
{{
  "type": "insight|recommendation|risk|opportunity|question|analysis",
  "confidence": 85,
  "impact": "high|medium|low",
  "actionable": true,
  "sentiment": "positive|neutral|negative|mixed",
  "emotion": "confident|cautious|enthusiastic|concerned|neutral",
  "specificity": "high|medium|low",
  "urgency": "high|medium|low",
  "key_topics": ["M&A", "valuation", "due diligence"],
  "recommended_actions": ["conduct financial analysis", "review legal documents"],
  "risk_level": "low|medium|high",
  "opportunity_score": 0-100
}}"#
    )
}

pub fn document_analysis(content: &str, document_type: &str, context: &Value) -> String {
    format!(
        r#"Analyze the following {document_type} and provide comprehensive M&A insights:

Document Content:
{content}

Context: {context}

Please provide analysis in the following JSON format:
{{
  "summary": "Brief summary of the document",
  "key_findings": ["finding1", "finding2", "finding3"],
  "risks": ["risk1", "risk2"],
  "opportunities": ["opportunity1", "opportunity2"],
  "financial_metrics": {{
    "revenue": "estimated value or range",
    "ebitda": "estimated value or range",
    "debt": "estimated value or range"
  }},
  "legal_considerations": ["consideration1", "consideration2"],
  "recommendations": ["recommendation1", "recommendation2"],
  "confidence_score": 85,
  "urgency_level": "high|medium|low",
  "deal_impact": "positive|negative|neutral"
}}"#
    )
}

pub fn prediction(deal_data: &Value, market_context: &Value, historical: &[Value]) -> String {
    let sample: Vec<&Value> = historical.iter().take(5).collect();
    format!(
        r#"Analyze the following M&A deal data and provide comprehensive predictions:

Deal Data:
{deal}

Market Context:
{market}

Historical Data ({n} records):
{sample}

Please provide predictions in the following JSON format:
{{
  "success_probability": 85,
  "completion_time_months": 6,
  "valuation_range": {{"min": 1000000, "max": 5000000, "currency": "USD"}},
  "key_factors": {{
    "positive": ["factor1", "factor2"],
    "negative": ["factor1", "factor2"],
    "neutral": ["factor1", "factor2"]
  }},
  "risk_assessment": {{
    "financial_risk": "low|medium|high",
    "regulatory_risk": "low|medium|high",
    "integration_risk": "low|medium|high",
    "market_risk": "low|medium|high"
  }},
  "synergy_potential": {{
    "cost_synergies": "estimated_savings",
    "revenue_synergies": "estimated_growth",
    "total_synergy_value": "estimated_value"
  }},
  "recommendations": ["recommendation1", "recommendation2"],
  "confidence_intervals": {{
    "success_probability": {{"lower": 70, "upper": 95}},
    "completion_time": {{"lower": 4, "upper": 8}},
    "valuation": {{"lower": 800000, "upper": 6000000}}
  }}
}}"#,
        deal = pretty(deal_data),
        market = pretty(market_context),
        n = historical.len(),
        sample = serde_json::to_string_pretty(&sample).unwrap_or_default(),
    )
}

fn negotiation_focus(negotiation_type: &str) -> Option<&'static str> {
    match negotiation_type {
        "acquisition" => Some("- Valuation negotiations\n- Due diligence coordination\n- Integration planning\n- Cultural alignment\n- Regulatory compliance"),
        "merger" => Some("- Equal partnership dynamics\n- Synergy identification\n- Governance structure\n- Brand integration\n- Stakeholder alignment"),
        "divestiture" => Some("- Asset valuation\n- Employee transition\n- Customer retention\n- Regulatory approvals\n- Clean separation"),
        "joint_venture" => Some("- Partnership structure\n- Resource contribution\n- Risk sharing\n- Exit strategies\n- Performance metrics"),
        _ => None,
    }
}

pub fn negotiation(
    negotiation_type: &str,
    deal_data: &Value,
    counterparty: &Value,
    current_stage: &str,
    objectives: &[String],
    constraints: &[String],
) -> String {
    let base = format!(
        r#"Provide comprehensive negotiation strategy for {negotiation_type}:

Deal Data: {deal}
Counterparty Info: {counterparty}
Current Stage: {current_stage}
Objectives: {objectives}
Constraints: {constraints}

Provide strategy in JSON format:
{{
  "negotiation_strategy": {{
    "overall_approach": "strategy_description",
    "key_principles": ["principle1", "principle2"],
    "bargaining_power_analysis": {{
      "our_strengths": ["strength1"],
      "our_weaknesses": ["weakness1"],
      "counterparty_strengths": ["strength1"],
      "counterparty_weaknesses": ["weakness1"]
    }}
  }},
  "tactical_recommendations": [
    {{"stage": "stage_name", "recommendations": ["r1"], "key_messages": ["m1"], "red_lines": ["l1"]}}
  ],
  "communication_strategy": {{
    "tone": "professional|collaborative|assertive",
    "key_messaging": ["message1"],
    "presentation_focus": ["focus1"],
    "objection_handling": [{{"objection": "objection_description", "response": "response_strategy"}}]
  }},
  "deal_structure_recommendations": {{
    "payment_terms": "recommended_terms",
    "earn_out_structure": "earn_out_recommendation",
    "escrow_requirements": "escrow_recommendation",
    "closing_conditions": ["condition1"]
  }},
  "timeline_strategy": {{
    "optimal_timing": "timing_recommendation",
    "milestones": [{{"milestone": "milestone_name", "target_date": "date", "dependencies": ["d1"]}}],
    "pressure_points": ["pressure1"]
  }}
}}"#,
        deal = pretty(deal_data),
        counterparty = pretty(counterparty),
        objectives = objectives.join(", "),
        constraints = constraints.join(", "),
    );
    match negotiation_focus(negotiation_type) {
        Some(focus) => format!("{base}\n\nFocus on:\n{focus}"),
        None => base,
    }
}

fn risk_focus(risk_type: &str) -> Option<&'static str> {
    match risk_type {
        "financial" => Some("- Valuation risks\n- Financing risks\n- Currency risks\n- Interest rate risks\n- Credit risks"),
        "operational" => Some("- Integration risks\n- Technology risks\n- Supply chain risks\n- Human resource risks\n- Process risks"),
        "legal" => Some("- Contract risks\n- Litigation risks\n- Regulatory compliance\n- Intellectual property\n- Employment law"),
        "strategic" => Some("- Market risks\n- Competitive risks\n- Brand risks\n- Customer risks\n- Technology disruption"),
        _ => None,
    }
}

pub fn risk_management(
    deal_data: &Value,
    risk_type: &str,
    risk_tolerance: &str,
    strategies: &[String],
    monitoring_frequency: &str,
) -> String {
    let base = format!(
        r#"Provide comprehensive risk management analysis for M&A deal:

Deal Data: {deal}
Risk Type: {risk_type}
Risk Tolerance: {risk_tolerance}
Mitigation Strategies: {strategies}
Monitoring Frequency: {monitoring_frequency}

Provide analysis in JSON format:
{{
  "risk_assessment": {{
    "financial_risks": [{{"risk": "risk_description", "probability": "high|medium|low", "impact": "high|medium|low", "mitigation": "mitigation_strategy", "monitoring": "monitoring_approach"}}],
    "operational_risks": [],
    "legal_risks": [],
    "strategic_risks": [],
    "integration_risks": [],
    "regulatory_risks": []
  }},
  "mitigation_framework": {{
    "immediate_actions": ["action1"],
    "short_term_mitigations": ["mitigation1"],
    "long_term_strategies": ["strategy1"],
    "contingency_plans": ["plan1"]
  }},
  "monitoring_dashboard": {{
    "key_risk_indicators": ["kri1"],
    "alert_thresholds": {{"high_risk": "threshold", "medium_risk": "threshold", "low_risk": "threshold"}},
    "reporting_frequency": "frequency_description"
  }},
  "compliance_framework": {{
    "regulatory_requirements": ["requirement1"],
    "compliance_risks": ["risk1"],
    "monitoring_mechanisms": ["mechanism1"]
  }}
}}"#,
        deal = pretty(deal_data),
        strategies = strategies.join(", "),
    );
    match risk_focus(risk_type) {
        Some(focus) => format!("{base}\n\nFocus on:\n{focus}"),
        None => base,
    }
}

pub fn market_intelligence(
    sector: &str,
    region: &str,
    deal_type: &str,
    timeframe: &str,
    include_competitors: bool,
) -> String {
    format!(
        r#"Provide comprehensive market intelligence for {sector} sector in {region} market:

Requirements:
- Market size and growth trends
- Key players and competitive landscape
- Recent M&A activity and valuations
- Regulatory environment
- Technology trends and disruption
- Investment opportunities
- Risk factors

Deal Type: {deal_type}
Timeframe: {timeframe}
Include Competitors: {include_competitors}

Provide analysis in JSON format:
{{
  "market_overview": {{"size": "market_size_in_usd", "growth_rate": "annual_growth_percentage", "trends": ["trend1"]}},
  "competitive_landscape": {{
    "key_players": [{{"name": "company_name", "market_share": "percentage", "strengths": ["s1"], "weaknesses": ["w1"]}}],
    "competitive_intensity": "high|medium|low"
  }},
  "recent_ma_activity": [{{"date": "YYYY-MM-DD", "buyer": "buyer_name", "target": "target_name", "value": "deal_value_usd", "type": "acquisition|merger|divestiture"}}],
  "valuation_trends": {{"average_ebitda_multiple": "range", "average_revenue_multiple": "range", "valuation_drivers": ["driver1"]}},
  "opportunities": [{{"type": "opportunity_type", "description": "description", "potential_value": "estimated_value", "timeframe": "months"}}],
  "risks": [{{"type": "risk_type", "description": "description", "probability": "high|medium|low", "impact": "high|medium|low"}}],
  "regulatory_environment": {{"overall_sentiment": "favorable|neutral|unfavorable", "key_regulations": ["r1"], "compliance_requirements": ["c1"]}}
}}"#
    )
}

fn report_focus(report_type: &str) -> Option<&'static str> {
    match report_type {
        "due_diligence" => Some("- Financial analysis and valuation\n- Legal and regulatory compliance\n- Operational assessment\n- Risk identification and mitigation\n- Integration planning\n- Strategic fit analysis"),
        "investment_memo" => Some("- Investment thesis\n- Market opportunity\n- Competitive landscape\n- Financial projections\n- Risk assessment\n- Exit strategy\n- Investment recommendation"),
        "synergy_analysis" => Some("- Cost synergies identification\n- Revenue synergies potential\n- Integration challenges\n- Synergy realization timeline\n- Synergy value quantification\n- Implementation roadmap"),
        "risk_assessment" => Some("- Financial risks\n- Operational risks\n- Legal and regulatory risks\n- Market risks\n- Integration risks\n- Risk mitigation strategies\n- Risk monitoring framework"),
        "valuation_report" => Some("- Valuation methodology\n- Financial analysis\n- Comparable transactions\n- Discounted cash flow analysis\n- Sensitivity analysis\n- Valuation conclusion\n- Key assumptions"),
        _ => None,
    }
}

pub fn report(
    report_type: &str,
    deal_data: &Value,
    analysis_data: &Value,
    prediction_data: &Value,
    format: &str,
    language: &str,
) -> String {
    let base = format!(
        r#"Generate a comprehensive {report_type} report for the following M&A deal:

Deal Information:
{deal}

Analysis Data:
{analysis}

Prediction Data:
{prediction}

Requirements:
- Language: {language}
- Format: {format}
- Include executive summary
- Provide detailed analysis
- Include actionable recommendations
- Use professional business language
- Include relevant metrics and KPIs
- Structure with clear sections and subsections

Please generate a complete, professional report."#,
        deal = pretty(deal_data),
        analysis = pretty(analysis_data),
        prediction = pretty(prediction_data),
    );
    match report_focus(report_type) {
        Some(focus) => format!("{base}\n\nFocus on:\n{focus}"),
        None => base,
    }
}

fn visualization_focus(visualization_type: &str) -> Option<&'static str> {
    match visualization_type {
        "deal_flow" => Some("- Deal pipeline visualization\n- Progress tracking\n- Risk indicators\n- Timeline visualization\n- Stakeholder interactions"),
        "synergy_analysis" => Some("- Synergy identification\n- Value creation visualization\n- Integration planning\n- Cost savings mapping\n- Revenue growth projection"),
        "risk_landscape" => Some("- Risk mapping\n- Impact assessment\n- Mitigation strategies\n- Risk correlation\n- Early warning systems"),
        "financial_modeling" => Some("- Financial projections\n- Sensitivity analysis\n- Scenario modeling\n- Valuation visualization\n- Cash flow mapping"),
        _ => None,
    }
}

pub fn visualization(
    visualization_type: &str,
    deal_data: &Value,
    target_audience: &str,
    format: &str,
    interactive: bool,
) -> String {
    let base = format!(
        r#"Create a {format} visualization for {visualization_type}:

Deal Data: {deal}
Target Audience: {target_audience}
Interactive: {interactive}

Provide visualization specification in JSON format:
{{
  "visualization_structure": {{"main_view": "description_of_main_visualization", "sub_views": ["view1"], "navigation": "navigation_structure", "interactions": ["interaction1"]}},
  "data_layers": [{{"layer_name": "layer_name", "data_type": "financial|operational|strategic", "visual_elements": ["element1"], "interactivity": "interaction_description"}}],
  "ar_vr_features": {{"immersive_elements": ["element1"], "spatial_organization": "spatial_layout_description", "user_interaction": "interaction_methods", "haptic_feedback": "feedback_description"}},
  "performance_metrics": {{"render_time": "estimated_time", "memory_usage": "estimated_usage", "optimization_level": "high|medium|low"}},
  "accessibility_features": {{"voice_navigation": "voice_commands", "gesture_control": "gesture_descriptions", "accessibility_modes": ["mode1"]}}
}}"#,
        deal = pretty(deal_data),
    );
    match visualization_focus(visualization_type) {
        Some(focus) => format!("{base}\n\nFocus on:\n{focus}"),
        None => base,
    }
}

fn collaboration_focus(collaboration_type: &str) -> Option<&'static str> {
    match collaboration_type {
        "due_diligence_team" => Some("- Multi-disciplinary team coordination\n- Document review workflows\n- Expert consultation processes\n- Quality control mechanisms\n- Stakeholder communication"),
        "deal_negotiation" => Some("- Negotiation team structure\n- Communication protocols\n- Decision-making frameworks\n- Risk management coordination\n- Client relationship management"),
        "integration_team" => Some("- Cross-functional team integration\n- Change management coordination\n- Progress tracking mechanisms\n- Stakeholder alignment\n- Success measurement"),
        "virtual_team" => Some("- Remote collaboration tools\n- Time zone coordination\n- Digital communication protocols\n- Virtual team building\n- Performance monitoring"),
        _ => None,
    }
}

pub fn collaboration(
    collaboration_type: &str,
    team_data: &Value,
    project_data: &Value,
    communication_preferences: &Value,
    ai_assistance: bool,
) -> String {
    let base = format!(
        r#"Design a collaboration framework for {collaboration_type}:

Team Data: {team}
Project Data: {project}
Communication Preferences: {preferences}
AI Assistance: {ai_assistance}

Provide framework in JSON format:
{{
  "team_structure": {{
    "roles": [{{"title": "role_title", "responsibilities": ["r1"], "required_skills": ["s1"], "ai_support": "ai_support_description"}}],
    "reporting_hierarchy": "hierarchy_description",
    "decision_making_process": "process_description"
  }},
  "communication_framework": {{
    "channels": [{{"type": "channel_type", "purpose": "purpose_description", "frequency": "frequency_description", "participants": ["p1"]}}],
    "meeting_schedule": [{{"type": "meeting_type", "frequency": "frequency", "duration": "duration", "agenda": "agenda_description"}}]
  }},
  "ai_collaboration_features": [{{"feature": "feature_name", "description": "feature_description", "benefits": ["b1"], "implementation": "implementation_details"}}],
  "project_management": {{
    "tools": ["tool1"],
    "methodology": "methodology_description",
    "milestones": [{{"name": "milestone_name", "description": "description", "timeline": "timeline", "deliverables": ["d1"]}}]
  }},
  "quality_assurance": {{"review_process": "process_description", "approval_workflow": "workflow_description", "feedback_mechanisms": ["m1"]}}
}}"#,
        team = pretty(team_data),
        project = pretty(project_data),
        preferences = pretty(communication_preferences),
    );
    match collaboration_focus(collaboration_type) {
        Some(focus) => format!("{base}\n\nFocus on:\n{focus}"),
        None => base,
    }
}

fn blockchain_focus(blockchain_type: &str) -> Option<&'static str> {
    match blockchain_type {
        "deal_execution" => Some("- Automated deal execution\n- Escrow management\n- Payment processing\n- Regulatory compliance\n- Audit trails"),
        "due_diligence" => Some("- Document verification\n- Data integrity\n- Access control\n- Audit trails\n- Compliance reporting"),
        "post_merger_integration" => Some("- Integration tracking\n- Performance monitoring\n- Stakeholder management\n- Milestone tracking\n- Success metrics"),
        "governance" => Some("- Voting mechanisms\n- Decision making\n- Stakeholder rights\n- Transparency\n- Accountability"),
        _ => None,
    }
}

pub fn blockchain(
    blockchain_type: &str,
    deal_data: &Value,
    contract_type: &str,
    security_level: &str,
    compliance: bool,
) -> String {
    let base = format!(
        r#"Design a blockchain solution for {blockchain_type} in M&A:

Deal Data: {deal}
Contract Type: {contract_type}
Security Level: {security_level}
Compliance: {compliance}

Provide blockchain specification in JSON format:
{{
  "blockchain_architecture": {{"network_type": "public|private|hybrid", "consensus_mechanism": "mechanism_description", "block_time": "time_in_seconds", "scalability_solution": "scalability_description"}},
  "smart_contracts": [{{"contract_name": "contract_name", "purpose": "contract_purpose", "functions": ["f1"], "security_features": ["s1"], "compliance_checks": ["c1"]}}],
  "token_economics": {{"token_type": "utility|security|governance", "distribution_model": "distribution_description", "incentive_mechanism": "incentive_description", "governance_structure": "governance_description"}},
  "security_framework": {{"encryption_standards": ["e1"], "access_control": "access_control_description", "audit_trail": "audit_description", "risk_mitigation": ["m1"]}},
  "compliance_features": {{"regulatory_compliance": ["r1"], "kyc_aml_integration": "kyc_aml_description", "reporting_mechanisms": ["m1"], "audit_requirements": ["a1"]}}
}}"#,
        deal = pretty(deal_data),
    );
    match blockchain_focus(blockchain_type) {
        Some(focus) => format!("{base}\n\nFocus on:\n{focus}"),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_negotiation_focus_by_type() {
        let deal = json!({"value": 5});
        let p = negotiation("merger", &deal, &json!({}), "initial", &[], &[]);
        assert!(p.contains("Governance structure"));
        let p = negotiation("licensing", &deal, &json!({}), "initial", &[], &[]);
        assert!(!p.contains("Focus on:"));
    }

    #[test]
    fn test_risk_focus_by_type() {
        let p = risk_management(&json!({}), "legal", "medium", &[], "weekly");
        assert!(p.contains("Litigation risks"));
        let p = risk_management(&json!({}), "comprehensive", "medium", &[], "weekly");
        assert!(!p.contains("Focus on:"));
    }

    #[test]
    fn test_report_and_visualization_focus() {
        let p = report("valuation_report", &json!({}), &json!(null), &json!(null), "markdown", "en");
        assert!(p.contains("Sensitivity analysis"));
        assert!(p.contains("- Language: en"));
        let p = report("board_pack", &json!({}), &json!(null), &json!(null), "markdown", "en");
        assert!(!p.contains("Focus on:"));
        let p = visualization("risk_landscape", &json!({}), "executives", "3d", true);
        assert!(p.contains("Early warning systems"));
        assert!(p.starts_with("Create a 3d visualization for risk_landscape"));
    }

    #[test]
    fn test_collaboration_and_blockchain_focus() {
        let p = collaboration("virtual_team", &json!({}), &json!(null), &json!({}), true);
        assert!(p.contains("Time zone coordination"));
        assert!(p.contains("AI Assistance: true"));
        let p = blockchain("governance", &json!({}), "smart_contract", "enterprise", false);
        assert!(p.contains("Voting mechanisms"));
        assert!(p.contains("Compliance: false"));
        let p = blockchain("tokenisation", &json!({}), "smart_contract", "enterprise", true);
        assert!(!p.contains("Focus on:"));
    }

    #[test]
    fn test_prediction_samples_history() {
        let history: Vec<Value> = (0..8).map(|i| json!({"deal": i})).collect();
        let p = prediction(&json!({}), &json!({}), &history);
        assert!(p.contains("Historical Data (8 records)"));
        assert!(!p.contains("\"deal\": 6"));
    }
}
