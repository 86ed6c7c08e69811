use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<Value>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

/// Candidates and parts past the first are left untyped, so a blocked or
/// partial later candidate does not hide the first reply.
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Value>,
}

/// `candidates[0].content.parts[0].text`
pub(crate) fn extract_reply(body: &[u8]) -> Option<String> {
    let response: GeminiResponse = serde_json::from_slice(body).ok()?;
    let first = response.candidates.into_iter().next()?;
    let candidate: GeminiCandidate = serde_json::from_value(first).ok()?;
    let part = candidate.content.parts.into_iter().next()?;
    let part: GeminiPart = serde_json::from_value(part).ok()?;
    Some(part.text)
}
