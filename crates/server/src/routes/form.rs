use std::collections::HashMap;

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form,
};

use crate::error::ApiError;

const IMAGE_FIELD: &str = "image";

/// A drained form post: text fields by name plus the optional label image.
///
/// Accepts `multipart/form-data` and, for posts without a file,
/// `application/x-www-form-urlencoded`.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    /// Bytes of the `image` part. An empty part (a form submitted without a file) counts as absent.
    pub image: Option<Vec<u8>>,
}

impl<S> FromRequest<S> for UploadForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state).await?;
            Self::read(multipart).await
        } else {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state).await?;
            Ok(Self {
                fields,
                image: None,
            })
        }
    }
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == IMAGE_FIELD {
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    form.image = Some(bytes.to_vec());
                }
            } else if !name.is_empty() {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Parse a numeric field. Missing or blank fields are `None`.
    pub fn number(&self, name: &str) -> Result<Option<f64>, ApiError> {
        match self.text(name).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse::<f64>().map(Some).map_err(|_| {
                ApiError::BadRequest(format!("Field '{name}' must be a number, got '{raw}'"))
            }),
        }
    }
}
