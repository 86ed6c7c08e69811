use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

/// Only the first choice is typed; the rest may have any shape.
#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<Value>,
}

/// `choices[0].message.content`
pub(crate) fn extract_reply(body: &[u8]) -> Option<String> {
    let response: OpenAIResponse = serde_json::from_slice(body).ok()?;
    let first = response.choices.into_iter().next()?;
    let choice: OpenAIChoice = serde_json::from_value(first).ok()?;
    Some(choice.message.content)
}
