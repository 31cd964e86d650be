//! `multipart/form-data` encoding for pet creation and photo upload.

use std::path::Path;

use uuid::Uuid;

use crate::error::ApiError;

/// One part of a multipart body.
#[derive(Debug, Clone)]
pub enum Part {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: String,
        data: Vec<u8>,
    },
}

/// Builder for a `multipart/form-data` body.
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    parts: Vec<Part>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::with_boundary(format!("----petfriends{}", Uuid::new_v4().simple()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.parts.push(Part::Text {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: Vec<u8>) -> Self {
        self.parts.push(Part::File {
            name: name.to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            data,
        });
        self
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Serialise every part, terminated by the closing boundary.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            match part {
                Part::Text { name, value } => {
                    out.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", quote(name))
                            .as_bytes(),
                    );
                    out.extend_from_slice(value.as_bytes());
                }
                Part::File {
                    name,
                    file_name,
                    content_type,
                    data,
                } => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                            quote(name),
                            quote(file_name)
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
                    out.extend_from_slice(data);
                }
            }
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        out
    }
}

/// Escape the characters that would terminate a quoted header parameter.
fn quote(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\r', '\n'], " ")
}

/// Photo contents ready to be attached as a file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Photo {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Read a photo from disk, naming the part after the file.
    pub fn from_path(path: &Path) -> Result<Self, ApiError> {
        let data = std::fs::read(path).map_err(|source| ApiError::Photo {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        Ok(Self::new(file_name, photo_content_type(path), data))
    }
}

/// MIME type for a photo, guessed from its extension.
pub fn photo_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_text_and_file_parts() {
        let form = MultipartForm::with_boundary("XYZ")
            .text("name", "Murzik")
            .file("pet_photo", "cat.jpg", "image/jpeg", vec![0xFF, 0xD8]);
        let mut expected = Vec::new();
        expected.extend_from_slice(
            b"--XYZ\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nMurzik\r\n",
        );
        expected.extend_from_slice(
            b"--XYZ\r\nContent-Disposition: form-data; name=\"pet_photo\"; filename=\"cat.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
        );
        expected.extend_from_slice(&[0xFF, 0xD8]);
        expected.extend_from_slice(b"\r\n--XYZ--\r\n");
        assert_eq!(form.encode(), expected);
    }

    #[test]
    fn content_type_carries_boundary() {
        let form = MultipartForm::with_boundary("abc");
        assert_eq!(form.content_type(), "multipart/form-data; boundary=abc");
    }

    #[test]
    fn random_boundaries_differ() {
        assert_ne!(MultipartForm::new().boundary(), MultipartForm::new().boundary());
    }

    #[test]
    fn empty_form_is_only_the_closing_boundary() {
        assert_eq!(MultipartForm::with_boundary("b").encode(), b"--b--\r\n".to_vec());
    }

    #[test]
    fn quotes_in_file_names_are_escaped() {
        let body = MultipartForm::with_boundary("b")
            .file("f", "a\"b.png", "image/png", Vec::new())
            .encode();
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("filename=\"a\\\"b.png\""));
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(photo_content_type(Path::new("images/cat1.jpg")), "image/jpeg");
        assert_eq!(photo_content_type(Path::new("Kotya.JPEG")), "image/jpeg");
        assert_eq!(photo_content_type(Path::new("dog.png")), "image/png");
        assert_eq!(photo_content_type(Path::new("notes")), "application/octet-stream");
    }

    #[test]
    fn missing_photo_reports_its_path() {
        let path = std::env::temp_dir().join(format!("missing-{}.jpg", Uuid::new_v4()));
        match Photo::from_path(&path) {
            Err(ApiError::Photo { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn photo_from_path_reads_bytes_and_name() {
        let path = std::env::temp_dir().join(format!("photo-{}.png", Uuid::new_v4()));
        std::fs::write(&path, [1u8, 2, 3]).unwrap();
        let photo = Photo::from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(photo.data, vec![1, 2, 3]);
        assert_eq!(photo.content_type, "image/png");
        assert!(photo.file_name.starts_with("photo-"));
    }
}
