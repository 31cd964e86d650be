//! Domain records for the pet-shelter API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently,
//! so integration tests catch any drift between what the client expects and
//! what the service sends. Every pet field is a string because the service
//! serialises ages and timestamps as strings.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Opaque token issued by `GET /api/key`.
///
/// No format validation happens locally: a made-up key is a legal value
/// and is simply rejected by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthKey(String);

impl AuthKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ApiKey> for AuthKey {
    fn from(key: ApiKey) -> Self {
        Self(key.key)
    }
}

/// Which subset of pets `GET /api/pets` returns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PetFilter {
    /// Every pet in the shelter (`filter=`).
    #[default]
    All,
    /// Only pets owned by the caller (`filter=my_pets`).
    MyPets,
    /// Any other value, sent verbatim for the service to reject.
    Other(String),
}

impl PetFilter {
    pub fn as_str(&self) -> &str {
        match self {
            PetFilter::All => "",
            PetFilter::MyPets => "my_pets",
            PetFilter::Other(raw) => raw,
        }
    }
}

impl FromStr for PetFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" => PetFilter::All,
            "my_pets" => PetFilter::MyPets,
            other => PetFilter::Other(other.to_string()),
        })
    }
}

/// A single pet as stored by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: String,
    #[serde(default)]
    pub pet_photo: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub created_at: String,
}

/// Body of a successful `GET /api/pets`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PetList {
    pub pets: Vec<Pet>,
}

impl PetList {
    pub fn contains_id(&self, id: &str) -> bool {
        self.pets.iter().any(|pet| pet.id == id)
    }
}

/// Body of a successful `GET /api/key`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey {
    pub key: String,
}

/// A response body: parsed JSON when the service sent JSON, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(serde_json::Value),
    Text(String),
}

impl Body {
    /// Membership test used by assertions.
    ///
    /// A JSON object contains its keys; text contains its substrings; any
    /// other JSON value is searched through its serialised form.
    pub fn contains(&self, needle: &str) -> bool {
        match self {
            Body::Json(serde_json::Value::Object(map)) => map.contains_key(needle),
            Body::Json(other) => other.to_string().contains(needle),
            Body::Text(text) => text.contains(needle),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    /// The body as text, serialising JSON if necessary.
    pub fn to_text(&self) -> String {
        match self {
            Body::Json(value) => value.to_string(),
            Body::Text(text) => text.clone(),
        }
    }
}

/// Normalised outcome of one API call: the status and the body, verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Body,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Decode a successful JSON body into `T`.
    ///
    /// A 404 becomes `ApiError::NotFound` and any other non-200 status
    /// `ApiError::HttpError` carrying the body text.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        match self.status {
            200 => {}
            404 => return Err(ApiError::NotFound),
            status => {
                return Err(ApiError::HttpError {
                    status,
                    body: self.body.to_text(),
                })
            }
        }
        match &self.body {
            Body::Json(value) => T::deserialize(value)
                .map_err(|e| ApiError::DeserializationError(e.to_string())),
            Body::Text(text) => Err(ApiError::DeserializationError(format!(
                "expected a JSON body, got {} bytes of text",
                text.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_parses_known_values() {
        assert_eq!("".parse::<PetFilter>().unwrap(), PetFilter::All);
        assert_eq!("my_pets".parse::<PetFilter>().unwrap(), PetFilter::MyPets);
        assert_eq!(
            "pets".parse::<PetFilter>().unwrap(),
            PetFilter::Other("pets".to_string())
        );
    }

    #[test]
    fn filter_other_is_sent_verbatim() {
        assert_eq!(PetFilter::Other("ьн_зуеы".into()).as_str(), "ьн_зуеы");
        assert_eq!(PetFilter::All.as_str(), "");
        assert_eq!(PetFilter::MyPets.as_str(), "my_pets");
    }

    #[test]
    fn json_object_contains_its_keys_not_values() {
        let body = Body::Json(json!({"key": "abc"}));
        assert!(body.contains("key"));
        assert!(!body.contains("abc"));
    }

    #[test]
    fn text_body_contains_substrings() {
        let body = Body::Text("<title>403 Forbidden</title>".into());
        assert!(body.contains("Forbidden"));
        assert!(!body.contains("Internal Server Error"));
    }

    #[test]
    fn pet_tolerates_missing_optional_fields() {
        let pet: Pet =
            serde_json::from_value(json!({"id": "1", "name": "Rex", "animal_type": "dog", "age": "3"}))
                .unwrap();
        assert_eq!(pet.name, "Rex");
        assert!(pet.pet_photo.is_empty());
        assert!(pet.user_id.is_empty());
    }

    #[test]
    fn decode_success() {
        let resp = ApiResponse {
            status: 200,
            body: Body::Json(json!({"key": "k-1"})),
        };
        let key: ApiKey = resp.decode().unwrap();
        assert_eq!(AuthKey::from(key).as_str(), "k-1");
    }

    #[test]
    fn decode_not_found() {
        let resp = ApiResponse {
            status: 404,
            body: Body::Text("Not Found".into()),
        };
        assert!(matches!(resp.decode::<Pet>(), Err(ApiError::NotFound)));
    }

    #[test]
    fn decode_forbidden_keeps_body() {
        let resp = ApiResponse {
            status: 403,
            body: Body::Text("Forbidden".into()),
        };
        match resp.decode::<ApiKey>() {
            Err(ApiError::HttpError { status, body }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "Forbidden");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn decode_text_on_200_is_a_deserialization_error() {
        let resp = ApiResponse {
            status: 200,
            body: Body::Text("ok".into()),
        };
        assert!(matches!(
            resp.decode::<PetList>(),
            Err(ApiError::DeserializationError(_))
        ));
    }

    #[test]
    fn pet_list_contains_id() {
        let list: PetList = serde_json::from_value(json!({"pets": [
            {"id": "a", "name": "A", "animal_type": "cat", "age": "1"}
        ]}))
        .unwrap();
        assert!(list.contains_id("a"));
        assert!(!list.contains_id(""));
    }
}
