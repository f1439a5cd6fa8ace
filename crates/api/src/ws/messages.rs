//! Inbound peer message types.
//!
//! Peers report finished work with a single JSON object carrying the
//! artifact locator. Anything else arriving on the socket is ignored by the
//! connection handler.

use serde::Deserialize;
use thiserror::Error;

/// Completion report sent by a peer once an artifact is ready.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionEvent {
    /// Locator of the finished artifact, fetched later by the watch.
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

#[derive(Debug, Error)]
pub enum CompletionParseError {
    #[error("malformed completion payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("completion payload has an empty imageUrl")]
    EmptyLocator,
}

/// Parse a text frame into a completion event.
pub fn parse_completion(text: &str) -> Result<CompletionEvent, CompletionParseError> {
    let event: CompletionEvent = serde_json::from_str(text)?;
    if event.image_url.is_empty() {
        return Err(CompletionParseError::EmptyLocator);
    }
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_completion_event() {
        let event = parse_completion(r#"{"imageUrl": "http://host/out/img.png"}"#).unwrap();
        assert_eq!(event.image_url, "http://host/out/img.png");
    }

    #[test]
    fn extra_fields_are_tolerated() {
        let event =
            parse_completion(r#"{"imageUrl": "http://host/a.png", "seed": 42, "peer": "gpu-1"}"#)
                .unwrap();
        assert_eq!(event.image_url, "http://host/a.png");
    }

    #[test]
    fn missing_locator_is_rejected() {
        let err = parse_completion(r#"{"progress": 0.5}"#).unwrap_err();
        match err {
            CompletionParseError::Json(_) => {}
            other => panic!("Expected Json error, got {other:?}"),
        }
    }

    #[test]
    fn empty_locator_is_rejected() {
        let err = parse_completion(r#"{"imageUrl": ""}"#).unwrap_err();
        match err {
            CompletionParseError::EmptyLocator => {}
            other => panic!("Expected EmptyLocator, got {other:?}"),
        }
    }

    #[test]
    fn non_json_is_rejected() {
        let err = parse_completion("done!").unwrap_err();
        match err {
            CompletionParseError::Json(_) => {}
            other => panic!("Expected Json error, got {other:?}"),
        }
    }
}
