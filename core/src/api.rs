//! The `PetFriends` facade: one method per API operation.
//!
//! Each method builds its request, executes it once through the transport
//! and normalises the response. A non-200 status comes back as an ordinary
//! `ApiResponse`; `Err` only reports failures that produced no response.

use std::path::Path;

use crate::client::PetFriendsClient;
use crate::config::Settings;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::multipart::Photo;
use crate::transport::{Transport, UreqTransport};
use crate::types::{ApiKey, ApiResponse, AuthKey, PetFilter};

pub struct PetFriends<T = UreqTransport> {
    client: PetFriendsClient,
    transport: T,
}

impl PetFriends<UreqTransport> {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, UreqTransport::new())
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.base_url)
    }
}

impl<T: Transport> PetFriends<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            client: PetFriendsClient::new(base_url),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn get_api_key(&self, email: &str, password: &str) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_get_api_key(email, password))
    }

    /// Fetch a key and decode it, failing on any non-200 answer.
    pub fn auth_key(&self, email: &str, password: &str) -> Result<AuthKey, ApiError> {
        let key: ApiKey = self.get_api_key(email, password)?.decode()?;
        Ok(key.into())
    }

    pub fn get_list_of_pets(&self, auth_key: &AuthKey, filter: &PetFilter) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_list_pets(auth_key, filter))
    }

    pub fn add_new_pet(
        &self,
        auth_key: &AuthKey,
        name: &str,
        animal_type: &str,
        age: &str,
        photo_path: impl AsRef<Path>,
    ) -> Result<ApiResponse, ApiError> {
        let photo = Photo::from_path(photo_path.as_ref())?;
        self.send(
            self.client
                .build_add_new_pet(auth_key, name, animal_type, age, &photo),
        )
    }

    pub fn add_new_pet_simple(
        &self,
        auth_key: &AuthKey,
        name: &str,
        animal_type: &str,
        age: &str,
    ) -> Result<ApiResponse, ApiError> {
        self.send(
            self.client
                .build_add_new_pet_simple(auth_key, name, animal_type, age),
        )
    }

    pub fn add_pet_photo(
        &self,
        auth_key: &AuthKey,
        pet_id: &str,
        photo_path: impl AsRef<Path>,
    ) -> Result<ApiResponse, ApiError> {
        let photo = Photo::from_path(photo_path.as_ref())?;
        self.send(self.client.build_add_pet_photo(auth_key, pet_id, &photo))
    }

    pub fn update_pet_info(
        &self,
        auth_key: &AuthKey,
        pet_id: &str,
        name: &str,
        animal_type: &str,
        age: &str,
    ) -> Result<ApiResponse, ApiError> {
        self.send(
            self.client
                .build_update_pet_info(auth_key, pet_id, name, animal_type, age),
        )
    }

    pub fn delete_pet(&self, auth_key: &AuthKey, pet_id: &str) -> Result<ApiResponse, ApiError> {
        self.send(self.client.build_delete_pet(auth_key, pet_id))
    }

    fn send(&self, request: HttpRequest) -> Result<ApiResponse, ApiError> {
        let method = request.method.as_str();
        let response = self.transport.execute(&request).map_err(|err| {
            tracing::warn!(method, url = %request.url, error = %err, "request failed");
            err
        })?;
        tracing::debug!(method, url = %request.url, status = response.status, "request completed");
        Ok(self.client.parse_response(response))
    }
}
