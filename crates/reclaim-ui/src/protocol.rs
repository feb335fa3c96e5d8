//! Wire shapes of the identity endpoints.

use serde::{Deserialize, Serialize};

/// Session lookup endpoint.
pub const SESSION_PATH: &str = "/auth/session";
/// Password sign-in endpoint.
pub const LOGIN_PATH: &str = "/auth/login";
/// Sign-out endpoint.
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Shown when the provider rejects a sign-in without a usable message.
pub const DEFAULT_REJECTION: &str = "Invalid email or password.";

/// Sign-in request body.
#[derive(Debug, Serialize)]
pub struct LoginBody<'a> {
    /// Account email.
    pub email: &'a str,
    /// Account password.
    pub password: &'a str,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    error_description: Option<String>,
    message: Option<String>,
    msg: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    /// First non-blank message, most descriptive key first.
    fn into_message(self) -> Option<String> {
        [self.error_description, self.message, self.msg, self.error]
            .into_iter()
            .flatten()
            .map(|text| text.trim().to_string())
            .find(|text| !text.is_empty())
    }
}

/// Join `base` and `path` without doubling the slash.
#[must_use]
pub fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// How a response status maps onto the identity contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    /// Request succeeded.
    Success,
    /// The provider refused (bad credentials, no session).
    Refused,
    /// Anything else; treated as the provider being unavailable.
    Failure,
}

/// Classify an HTTP status.
#[must_use]
pub const fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        400 | 401 | 403 | 404 | 422 => StatusClass::Refused,
        _ => StatusClass::Failure,
    }
}

/// User-presentable message extracted from a rejection body.
#[must_use]
pub fn rejection_message(body: Option<&str>) -> String {
    body.and_then(|raw| serde_json::from_str::<ErrorBody>(raw).ok())
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| DEFAULT_REJECTION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("https://id.reclaim.example/", LOGIN_PATH),
            "https://id.reclaim.example/auth/login"
        );
        assert_eq!(endpoint("", SESSION_PATH), "/auth/session");
    }

    #[test]
    fn statuses_split_into_three_classes() {
        assert_eq!(classify_status(204), StatusClass::Success);
        assert_eq!(classify_status(401), StatusClass::Refused);
        assert_eq!(classify_status(503), StatusClass::Failure);
    }

    #[test]
    fn rejection_message_prefers_provider_text() {
        assert_eq!(
            rejection_message(Some(r#"{"error":"Email not confirmed"}"#)),
            "Email not confirmed"
        );
        assert_eq!(rejection_message(Some("<html>")), DEFAULT_REJECTION);
        assert_eq!(rejection_message(Some(r#"{"message":"  "}"#)), DEFAULT_REJECTION);
        assert_eq!(rejection_message(None), DEFAULT_REJECTION);
    }

    #[test]
    fn oauth_style_rejection_keeps_the_description() {
        assert_eq!(
            rejection_message(Some(
                r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#
            )),
            "Invalid login credentials"
        );
        assert_eq!(
            rejection_message(Some(r#"{"error":"invalid_grant","msg":"Too many attempts"}"#)),
            "Too many attempts"
        );
        assert_eq!(
            rejection_message(Some(r#"{"error_description":" ","error":"invalid_grant"}"#)),
            "invalid_grant"
        );
    }

    #[test]
    fn login_body_serializes_both_fields() {
        let body = serde_json::to_value(LoginBody {
            email: "ops@reclaim.example",
            password: "pw",
        })
        .expect("serializable");
        assert_eq!(body["email"], "ops@reclaim.example");
        assert_eq!(body["password"], "pw");
    }
}
