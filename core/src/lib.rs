//! Blocking client for the PetFriends pet-shelter REST API.
//!
//! # Overview
//! `PetFriendsClient` turns each API operation into an `HttpRequest` and
//! normalises every `HttpResponse` into an `ApiResponse` (status plus JSON
//! or raw text body) without touching the network. `PetFriends` ties the
//! builder to a `Transport` and exposes the operations as plain method
//! calls.
//!
//! # Design
//! - The builder is stateless; it holds only `base_url`.
//! - Statuses are never interpreted by the operations: a 403 or 500 is a
//!   value to assert on. `ApiError` is reserved for transport failures,
//!   unreadable photos, bad settings and explicit typed decoding.
//! - Record types are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod multipart;
pub mod transport;
pub mod types;

pub use api::PetFriends;
pub use client::PetFriendsClient;
pub use config::Settings;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use multipart::{MultipartForm, Photo};
pub use transport::{Transport, UreqTransport};
pub use types::{ApiKey, ApiResponse, AuthKey, Body, Pet, PetFilter, PetList};
