//! Stateless request builder and response normaliser for the pet-shelter API.
//!
//! # Design
//! `PetFriendsClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation has a `build_*` method producing an
//! `HttpRequest`; every response goes through the same `parse_response`,
//! which keeps the status and the body verbatim. Interpreting the status is
//! left to the caller.

use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::multipart::{MultipartForm, Photo};
use crate::types::{ApiResponse, AuthKey, Body, PetFilter};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone)]
pub struct PetFriendsClient {
    base_url: String,
}

impl PetFriendsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET /api/key` with the credentials in the `email` and `password` headers.
    pub fn build_get_api_key(&self, email: &str, password: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/api/key", self.base_url),
            headers: vec![
                ("email".to_string(), email.to_string()),
                ("password".to_string(), password.to_string()),
            ],
            body: None,
        }
    }

    pub fn build_list_pets(&self, auth_key: &AuthKey, filter: &PetFilter) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!(
                "{}/api/pets?filter={}",
                self.base_url,
                urlencoding::encode(filter.as_str())
            ),
            headers: vec![auth_header(auth_key)],
            body: None,
        }
    }

    pub fn build_add_new_pet(
        &self,
        auth_key: &AuthKey,
        name: &str,
        animal_type: &str,
        age: &str,
        photo: &Photo,
    ) -> HttpRequest {
        let form = MultipartForm::new()
            .text("name", name)
            .text("animal_type", animal_type)
            .text("age", age)
            .file(
                "pet_photo",
                &photo.file_name,
                &photo.content_type,
                photo.data.clone(),
            );
        multipart_request(HttpMethod::Post, format!("{}/api/pets", self.base_url), auth_key, &form)
    }

    pub fn build_add_new_pet_simple(
        &self,
        auth_key: &AuthKey,
        name: &str,
        animal_type: &str,
        age: &str,
    ) -> HttpRequest {
        form_request(
            HttpMethod::Post,
            format!("{}/api/create_pet_simple", self.base_url),
            auth_key,
            &[("name", name), ("animal_type", animal_type), ("age", age)],
        )
    }

    pub fn build_add_pet_photo(&self, auth_key: &AuthKey, pet_id: &str, photo: &Photo) -> HttpRequest {
        let form = MultipartForm::new().file(
            "pet_photo",
            &photo.file_name,
            &photo.content_type,
            photo.data.clone(),
        );
        multipart_request(
            HttpMethod::Post,
            format!("{}/api/pets/set_photo/{pet_id}", self.base_url),
            auth_key,
            &form,
        )
    }

    pub fn build_update_pet_info(
        &self,
        auth_key: &AuthKey,
        pet_id: &str,
        name: &str,
        animal_type: &str,
        age: &str,
    ) -> HttpRequest {
        form_request(
            HttpMethod::Put,
            format!("{}/api/pets/{pet_id}", self.base_url),
            auth_key,
            &[("name", name), ("animal_type", animal_type), ("age", age)],
        )
    }

    /// An empty `pet_id` produces `/api/pets/`, which the service answers with 404.
    pub fn build_delete_pet(&self, auth_key: &AuthKey, pet_id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: format!("{}/api/pets/{pet_id}", self.base_url),
            headers: vec![auth_header(auth_key)],
            body: None,
        }
    }

    /// Keep the status; parse the body as JSON when it is JSON, else keep the text.
    pub fn parse_response(&self, response: HttpResponse) -> ApiResponse {
        let body = match serde_json::from_str(&response.body) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Text(response.body),
        };
        ApiResponse {
            status: response.status,
            body,
        }
    }
}

fn auth_header(auth_key: &AuthKey) -> (String, String) {
    ("auth_key".to_string(), auth_key.as_str().to_string())
}

fn multipart_request(
    method: HttpMethod,
    url: String,
    auth_key: &AuthKey,
    form: &MultipartForm,
) -> HttpRequest {
    HttpRequest {
        method,
        url,
        headers: vec![
            auth_header(auth_key),
            ("content-type".to_string(), form.content_type()),
        ],
        body: Some(form.encode()),
    }
}

fn form_request(
    method: HttpMethod,
    url: String,
    auth_key: &AuthKey,
    fields: &[(&str, &str)],
) -> HttpRequest {
    HttpRequest {
        method,
        url,
        headers: vec![
            auth_header(auth_key),
            ("content-type".to_string(), FORM_CONTENT_TYPE.to_string()),
        ],
        body: Some(encode_form(fields).into_bytes()),
    }
}

/// `application/x-www-form-urlencoded` serialisation of ordered fields.
pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
