use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Largest request body the shelter accepts, photos included.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: String,
    pub pet_photo: String,
    pub user_id: String,
    pub created_at: String,
}

#[derive(Serialize, Deserialize)]
pub struct KeyResponse {
    pub key: String,
}

#[derive(Serialize, Deserialize)]
pub struct PetsResponse {
    pub pets: Vec<Pet>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub filter: Option<String>,
}

/// Text fields shared by the simple create and the update forms.
#[derive(Deserialize, Default)]
pub struct PetForm {
    pub name: Option<String>,
    pub animal_type: Option<String>,
    pub age: Option<String>,
}

/// Credentials the shelter accepts.
#[derive(Clone, Debug)]
pub struct Account {
    pub email: String,
    pub password: String,
}

impl Account {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

struct User {
    password: String,
    user_id: String,
    key: Option<String>,
}

/// All shelter state. Pets are kept newest first.
#[derive(Default)]
pub struct Shelter {
    users: HashMap<String, User>,
    pets: Vec<Pet>,
}

impl Shelter {
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        let users = accounts
            .into_iter()
            .map(|account| {
                let user = User {
                    password: account.password,
                    user_id: Uuid::new_v4().simple().to_string(),
                    key: None,
                };
                (account.email, user)
            })
            .collect();
        Self {
            users,
            pets: Vec::new(),
        }
    }

    pub fn pets(&self) -> &[Pet] {
        &self.pets
    }

    /// Key for matching credentials; the same key is returned on every call.
    fn issue_key(&mut self, email: &str, password: &str) -> Option<String> {
        let user = self.users.get_mut(email)?;
        if user.password != password {
            return None;
        }
        Some(user.key.get_or_insert_with(new_key).clone())
    }

    fn user_for_key(&self, key: &str) -> Option<String> {
        self.users
            .values()
            .find(|user| user.key.as_deref() == Some(key))
            .map(|user| user.user_id.clone())
    }

    /// Index of a pet the caller may modify.
    fn owned_pet(&self, user_id: &str, pet_id: &str) -> Result<usize, ShelterError> {
        let idx = self
            .pets
            .iter()
            .position(|pet| pet.id == pet_id)
            .ok_or(ShelterError::NotFound)?;
        if self.pets[idx].user_id != user_id {
            return Err(ShelterError::Forbidden("This pet belongs to another user"));
        }
        Ok(idx)
    }

    fn insert(&mut self, user_id: String, fields: PetFields, pet_photo: String) -> Pet {
        let pet = Pet {
            id: Uuid::new_v4().to_string(),
            name: fields.name,
            animal_type: fields.animal_type,
            age: fields.age,
            pet_photo,
            user_id,
            created_at: now(),
        };
        self.pets.insert(0, pet.clone());
        pet
    }
}

/// 56 hex characters, the length of the keys the real service issues.
fn new_key() -> String {
    let mut key = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    key.truncate(56);
    key
}

fn now() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();
    format!("{secs:.6}")
}

/// Failures rendered as the service's HTML error pages.
#[derive(Debug, PartialEq, Eq)]
pub enum ShelterError {
    BadRequest(&'static str),
    Forbidden(&'static str),
    NotFound,
    PayloadTooLarge,
    Internal,
}

impl IntoResponse for ShelterError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ShelterError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ShelterError::Forbidden(detail) => (StatusCode::FORBIDDEN, detail),
            ShelterError::NotFound => (
                StatusCode::NOT_FOUND,
                "The requested URL was not found on the server.",
            ),
            ShelterError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "The data value transmitted exceeds the capacity limit.",
            ),
            ShelterError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "The server encountered an internal error and was unable to complete your request.",
            ),
        };
        (status, Html(error_page(status, detail))).into_response()
    }
}

fn error_page(status: StatusCode, detail: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("Error");
    format!(
        "<!doctype html>\n<html lang=en>\n<title>{} {reason}</title>\n<h1>{reason}</h1>\n<p>{detail}</p>\n",
        status.as_u16()
    )
}

pub type Db = Arc<RwLock<Shelter>>;

pub fn app(accounts: Vec<Account>) -> Router {
    let db: Db = Arc::new(RwLock::new(Shelter::new(accounts)));
    Router::new()
        .route("/api/key", get(get_api_key))
        .route("/api/pets", get(list_pets).post(create_pet))
        .route("/api/create_pet_simple", post(create_pet_simple))
        .route("/api/pets/set_photo/{pet_id}", post(set_photo))
        .route("/api/pets/{pet_id}", put(update_pet).delete(delete_pet))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener, accounts: Vec<Account>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(accounts)).await
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn authenticate(shelter: &Shelter, headers: &HeaderMap) -> Result<String, ShelterError> {
    let key = header(headers, "auth_key")
        .ok_or(ShelterError::Forbidden("Please provide 'auth_key' Header"))?;
    shelter
        .user_for_key(key)
        .ok_or(ShelterError::Forbidden("Please provide 'auth_key' Header"))
}

/// Required text fields of a new pet.
struct PetFields {
    name: String,
    animal_type: String,
    age: String,
}

impl PetFields {
    fn from_map(mut fields: HashMap<String, String>) -> Result<Self, ShelterError> {
        let mut take = |name: &str| {
            fields
                .remove(name)
                .ok_or(ShelterError::BadRequest("Missing required form field"))
        };
        Ok(Self {
            name: take("name")?,
            animal_type: take("animal_type")?,
            age: take("age")?,
        })
    }
}

impl TryFrom<PetForm> for PetFields {
    type Error = ShelterError;

    fn try_from(form: PetForm) -> Result<Self, Self::Error> {
        match (form.name, form.animal_type, form.age) {
            (Some(name), Some(animal_type), Some(age)) => Ok(Self {
                name,
                animal_type,
                age,
            }),
            _ => Err(ShelterError::BadRequest("Missing required form field")),
        }
    }
}

/// Text fields and the encoded `pet_photo` of a multipart upload.
#[derive(Default)]
struct Upload {
    fields: HashMap<String, String>,
    photo: Option<String>,
}

fn upload_error(err: MultipartError) -> ShelterError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ShelterError::PayloadTooLarge
    } else {
        ShelterError::BadRequest("Malformed multipart body")
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ShelterError> {
    let mut upload = Upload::default();
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == "pet_photo" {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let data = field.bytes().await.map_err(upload_error)?;
            upload.photo = Some(format!(
                "data:{content_type};base64,{}",
                STANDARD.encode(&data)
            ));
        } else {
            let text = field.text().await.map_err(upload_error)?;
            upload.fields.insert(name, text);
        }
    }
    Ok(upload)
}

async fn get_api_key(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<KeyResponse>, ShelterError> {
    let email = header(&headers, "email").unwrap_or_default();
    let password = header(&headers, "password").unwrap_or_default();
    let key = db
        .write()
        .await
        .issue_key(email, password)
        .ok_or(ShelterError::Forbidden(
            "This user wasn't found in database",
        ))?;
    Ok(Json(KeyResponse { key }))
}

async fn list_pets(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<PetsResponse>, ShelterError> {
    let shelter = db.read().await;
    let user_id = authenticate(&shelter, &headers)?;
    let pets = match query.filter.as_deref().unwrap_or_default() {
        "" => shelter.pets.clone(),
        "my_pets" => shelter
            .pets
            .iter()
            .filter(|pet| pet.user_id == user_id)
            .cloned()
            .collect(),
        other => {
            tracing::warn!(filter = other, "unsupported filter");
            return Err(ShelterError::Internal);
        }
    };
    Ok(Json(PetsResponse { pets }))
}

async fn create_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Pet>, ShelterError> {
    let user_id = authenticate(&*db.read().await, &headers)?;
    let upload = read_upload(multipart).await?;
    let photo = upload
        .photo
        .ok_or(ShelterError::BadRequest("Missing pet_photo file"))?;
    let fields = PetFields::from_map(upload.fields)?;
    let pet = db.write().await.insert(user_id, fields, photo);
    tracing::info!(pet_id = %pet.id, "pet created");
    Ok(Json(pet))
}

async fn create_pet_simple(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(form): Form<PetForm>,
) -> Result<Json<Pet>, ShelterError> {
    let mut shelter = db.write().await;
    let user_id = authenticate(&shelter, &headers)?;
    let fields = PetFields::try_from(form)?;
    let pet = shelter.insert(user_id, fields, String::new());
    tracing::info!(pet_id = %pet.id, "pet created without photo");
    Ok(Json(pet))
}

async fn set_photo(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Pet>, ShelterError> {
    let user_id = authenticate(&*db.read().await, &headers)?;
    let photo = read_upload(multipart)
        .await?
        .photo
        .ok_or(ShelterError::BadRequest("Missing pet_photo file"))?;
    let mut shelter = db.write().await;
    let idx = shelter.owned_pet(&user_id, &pet_id)?;
    let pet = &mut shelter.pets[idx];
    pet.pet_photo = photo;
    Ok(Json(pet.clone()))
}

async fn update_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
    Form(form): Form<PetForm>,
) -> Result<Json<Pet>, ShelterError> {
    let mut shelter = db.write().await;
    let user_id = authenticate(&shelter, &headers)?;
    let idx = shelter.owned_pet(&user_id, &pet_id)?;
    let pet = &mut shelter.pets[idx];
    if let Some(name) = form.name {
        pet.name = name;
    }
    if let Some(animal_type) = form.animal_type {
        pet.animal_type = animal_type;
    }
    if let Some(age) = form.age {
        pet.age = age;
    }
    Ok(Json(pet.clone()))
}

async fn delete_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(pet_id): Path<String>,
) -> Result<StatusCode, ShelterError> {
    let mut shelter = db.write().await;
    let user_id = authenticate(&shelter, &headers)?;
    let idx = shelter.owned_pet(&user_id, &pet_id)?;
    let pet = shelter.pets.remove(idx);
    tracing::info!(pet_id = %pet.id, "pet deleted");
    Ok(StatusCode::OK)
}

async fn not_found() -> ShelterError {
    ShelterError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelter() -> Shelter {
        Shelter::new([Account::new("me@example.com", "secret")])
    }

    fn fields(name: &str) -> PetFields {
        PetFields {
            name: name.to_string(),
            animal_type: "cat".to_string(),
            age: "2".to_string(),
        }
    }

    #[test]
    fn key_is_issued_for_valid_credentials_only() {
        let mut shelter = shelter();
        assert!(shelter.issue_key("me@example.com", "wrong").is_none());
        assert!(shelter.issue_key("nobody@example.com", "secret").is_none());
        assert!(shelter.issue_key("", "").is_none());
        let key = shelter.issue_key("me@example.com", "secret").unwrap();
        assert_eq!(key.len(), 56);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn key_is_stable_per_account() {
        let mut shelter = shelter();
        let first = shelter.issue_key("me@example.com", "secret").unwrap();
        let second = shelter.issue_key("me@example.com", "secret").unwrap();
        assert_eq!(first, second);
        assert!(shelter.user_for_key(&first).is_some());
        assert!(shelter.user_for_key("d3c1355cc3c551acbebe5b58ead5d09897aa6ff03ce448554d40987d").is_none());
    }

    #[test]
    fn pets_are_listed_newest_first() {
        let mut shelter = shelter();
        shelter.insert("u".into(), fields("first"), String::new());
        shelter.insert("u".into(), fields("second"), String::new());
        assert_eq!(shelter.pets()[0].name, "second");
        assert_eq!(shelter.pets()[1].name, "first");
    }

    #[test]
    fn owned_pet_distinguishes_missing_from_foreign() {
        let mut shelter = shelter();
        let pet = shelter.insert("owner".into(), fields("Rex"), String::new());
        assert_eq!(shelter.owned_pet("owner", &pet.id), Ok(0));
        assert!(matches!(
            shelter.owned_pet("intruder", &pet.id),
            Err(ShelterError::Forbidden(_))
        ));
        assert_eq!(shelter.owned_pet("owner", "missing"), Err(ShelterError::NotFound));
    }

    #[test]
    fn pet_form_requires_every_field() {
        let form: PetForm = serde_json::from_str(r#"{"name":"Rex","age":"3"}"#).unwrap();
        assert!(matches!(
            PetFields::try_from(form),
            Err(ShelterError::BadRequest(_))
        ));
    }

    #[test]
    fn error_page_names_the_status() {
        let page = error_page(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(page.contains("<title>500 Internal Server Error</title>"));
        assert!(page.contains("<p>boom</p>"));
    }

    #[test]
    fn pet_serializes_to_json() {
        let pet = Pet {
            id: "1".into(),
            name: "Murzik".into(),
            animal_type: "Cat".into(),
            age: "2".into(),
            pet_photo: String::new(),
            user_id: "u".into(),
            created_at: "0".into(),
        };
        let json = serde_json::to_value(&pet).unwrap();
        assert_eq!(json["name"], "Murzik");
        assert_eq!(json["age"], "2");
        assert_eq!(json["pet_photo"], "");
    }
}
