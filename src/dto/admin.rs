//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::chat::ChatEvent;

/// Locally injected chat message, handled exactly like one received from the channel.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ChatInjectionRequest {
    /// Sender identity.
    #[validate(length(min = 1, max = 25))]
    pub user: String,
    /// Message body.
    #[validate(length(min = 1, max = 500))]
    pub text: String,
    /// Treat the sender as a moderator.
    #[serde(default)]
    pub privileged: bool,
    /// Treat the sender as a paying subscriber.
    #[serde(default)]
    pub supporter: bool,
}

impl From<ChatInjectionRequest> for ChatEvent {
    fn from(value: ChatInjectionRequest) -> Self {
        Self {
            sender: value.user.trim().to_lowercase(),
            text: value.text,
            is_privileged: value.privileged,
            is_supporter: value.supporter,
            is_echo: false,
        }
    }
}

/// Reply the bot would have sent to chat, if any.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatInjectionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

/// Generic acknowledgement for admin actions.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injection_request_limits() {
        let ok = ChatInjectionRequest {
            user: "alice".into(),
            text: "cat".into(),
            privileged: false,
            supporter: false,
        };
        assert!(ok.validate().is_ok());

        let empty_user = ChatInjectionRequest {
            user: String::new(),
            ..ok
        };
        assert!(empty_user.validate().is_err());

        let long_text = ChatInjectionRequest {
            user: "bob".into(),
            text: "x".repeat(501),
            privileged: false,
            supporter: false,
        };
        assert!(long_text.validate().is_err());
    }

    #[test]
    fn injected_sender_is_normalised() {
        let event: ChatEvent = ChatInjectionRequest {
            user: " Alice ".into(),
            text: "!start".into(),
            privileged: true,
            supporter: false,
        }
        .into();
        assert_eq!(event.sender, "alice");
        assert!(event.is_privileged);
        assert!(!event.is_echo);
    }
}
