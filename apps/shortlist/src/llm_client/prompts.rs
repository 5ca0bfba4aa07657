// Shared prompt fragments. Each service that calls the LLM keeps its own
// prompts.rs alongside it; this file holds the cross-cutting pieces.

/// Appended to every prompt that expects a machine-readable reply.
pub const JSON_ONLY_INSTRUCTION: &str = "Return ONLY valid JSON. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences.";
