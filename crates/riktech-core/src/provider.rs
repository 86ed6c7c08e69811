use std::fmt;

use crate::error::GatewayError;
use crate::gateway::{gemini, openai};

/// The gateway backend a prompt is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    OpenAI,
    Gemini,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Gemini => "gemini",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAI),
            "gemini" => Some(Provider::Gemini),
            _ => None,
        }
    }

    pub fn all() -> Vec<Provider> {
        vec![Provider::OpenAI, Provider::Gemini]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "ChatGPT (OpenAI)",
            Provider::Gemini => "Gemini (Google)",
        }
    }

    /// Gateway path relative to the configured base URL.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Provider::OpenAI => "/api/openai",
            Provider::Gemini => "/api/gemini",
        }
    }

    /// The provider after this one, wrapping around.
    pub fn next(&self) -> Provider {
        match self {
            Provider::OpenAI => Provider::Gemini,
            Provider::Gemini => Provider::OpenAI,
        }
    }

    /// Pull the reply text out of this provider's response body.
    pub fn extract_reply(&self, body: &[u8]) -> Result<String, GatewayError> {
        let extracted = match self {
            Provider::OpenAI => openai::extract_reply(body),
            Provider::Gemini => gemini::extract_reply(body),
        };
        extracted.ok_or(GatewayError::Protocol(*self))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAI => f.write_str("OpenAI"),
            Provider::Gemini => f.write_str("Gemini"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(Provider::from_str("OpenAI"), Some(Provider::OpenAI));
        assert_eq!(Provider::from_str(" gemini "), Some(Provider::Gemini));
        assert_eq!(Provider::from_str("claude"), None);
    }

    #[test]
    fn test_as_str_round_trips() {
        for provider in Provider::all() {
            assert_eq!(Provider::from_str(provider.as_str()), Some(provider));
        }
    }

    #[test]
    fn test_next_cycles_through_all() {
        assert_eq!(Provider::OpenAI.next(), Provider::Gemini);
        assert_eq!(Provider::Gemini.next(), Provider::OpenAI);
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(Provider::OpenAI.endpoint(), "/api/openai");
        assert_eq!(Provider::Gemini.endpoint(), "/api/gemini");
    }
}
