//! Third-party profile normalization.

use serde_json::Value;

use crate::api::{ApiError, ApiResult};

/// Normalized identity attributes from an OAuth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProfile {
    pub email: String,
    pub name: String,
    pub provider: String,
}

/// Normalize a provider userinfo document into an [`OAuthProfile`].
pub fn normalize(provider: &str, attributes: &Value) -> ApiResult<OAuthProfile> {
    match provider {
        "google" => of_google(attributes),
        "kakao" => of_kakao(attributes),
        other => Err(ApiError::UnsupportedProvider(other.to_string())),
    }
}

fn of_google(attributes: &Value) -> ApiResult<OAuthProfile> {
    let email = attributes
        .get("email")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::invalid_field("email", "missing from provider profile"))?;

    let name = attributes
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(email);

    Ok(OAuthProfile {
        email: email.to_string(),
        name: name.to_string(),
        provider: "google".to_string(),
    })
}

/// Kakao nests the display name under `kakao_account.profile` and does not
/// share the real email; the account is keyed by a synthesized address
/// derived from the numeric Kakao id.
fn of_kakao(attributes: &Value) -> ApiResult<OAuthProfile> {
    let id = attributes
        .get("id")
        .map(|id| match id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .filter(|id| !id.is_empty() && id != "null")
        .ok_or_else(|| ApiError::invalid_field("id", "missing from provider profile"))?;

    let nickname = attributes
        .pointer("/kakao_account/profile/nickname")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::invalid_field("nickname", "missing from provider profile"))?;

    Ok(OAuthProfile {
        email: format!("kakao_{id}@koyn.local"),
        name: nickname.to_string(),
        provider: "kakao".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_google_profile() {
        let attributes = json!({
            "email": "g@example.com",
            "name": "G User",
            "sub": "1234"
        });

        let profile = normalize("google", &attributes).unwrap();
        assert_eq!(profile.email, "g@example.com");
        assert_eq!(profile.name, "G User");
        assert_eq!(profile.provider, "google");
    }

    #[test]
    fn test_google_falls_back_to_email_as_name() {
        let attributes = json!({ "email": "g@example.com" });
        let profile = normalize("google", &attributes).unwrap();
        assert_eq!(profile.name, "g@example.com");
    }

    #[test]
    fn test_google_requires_email() {
        let err = normalize("google", &json!({ "name": "G" })).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_kakao_profile_synthesizes_email() {
        let attributes = json!({
            "id": 99887766,
            "kakao_account": {
                "profile": { "nickname": "kay" }
            }
        });

        let profile = normalize("kakao", &attributes).unwrap();
        assert_eq!(profile.email, "kakao_99887766@koyn.local");
        assert_eq!(profile.name, "kay");
        assert_eq!(profile.provider, "kakao");
    }

    #[test]
    fn test_kakao_requires_nested_nickname() {
        let err = normalize("kakao", &json!({ "id": 1 })).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_unknown_provider() {
        let err = normalize("naver", &json!({})).unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedProvider(_)));
    }
}
