//! Registration and login payloads

use serde::{Deserialize, Deserializer, Serialize};

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "year_from_number_or_string")]
    pub graduation_year: Option<i32>,
    pub degree: Option<String>,
    pub phone: Option<String>,
    pub primary_role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Older sign-up form that sends a single display name
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyRegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sign-up forms post the year as text as often as as a number
fn year_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Year {
        Number(i32),
        Text(String),
    }

    match Option::<Year>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Year::Number(year)) => Ok(Some(year)),
        Some(Year::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Year::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid graduation_year: {}", text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_graduation_year_formats() {
        let parse = |value: serde_json::Value| {
            serde_json::from_value::<UserMetadata>(json!({ "graduation_year": value }))
        };

        assert_eq!(parse(json!(2012)).unwrap().graduation_year, Some(2012));
        assert_eq!(parse(json!("2012")).unwrap().graduation_year, Some(2012));
        assert_eq!(parse(json!("")).unwrap().graduation_year, None);
        assert_eq!(parse(json!(null)).unwrap().graduation_year, None);
        assert!(parse(json!("twenty")).is_err());
    }

    #[test]
    fn test_metadata_is_optional() {
        let request: RegisterRequest =
            serde_json::from_value(json!({ "email": "a@example.edu", "password": "secret123" })).unwrap();
        assert!(request.user_metadata.first_name.is_none());
    }
}
