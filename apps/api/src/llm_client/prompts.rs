// Cross-cutting prompt fragments. Endpoint prompts live in `ai::prompts`.

/// Appended to every system prompt whose reply is parsed as JSON.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with a single valid JSON object. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
