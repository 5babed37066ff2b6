//! Request body extractors.
//!
//! Create/update endpoints take either `multipart/form-data` (text fields
//! plus file fields) or a JSON object. Both end up as an `UpsertForm`.

use std::collections::HashMap;
use std::str::FromStr;

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::Json;
use models::haircut::HairCutFields;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use service::attachments::Upload;
use service::UserInput;

use crate::errors::JsonApiError;

/// JSON body whose rejections render as `{"error": ...}`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(JsonApiError::bad_request(rejection.body_text())),
        }
    }
}

/// Query string whose rejections render as `{"error": ...}`.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(JsonApiError::bad_request(rejection.body_text())),
        }
    }
}

/// Fields and files of a create/update request.
#[derive(Debug, Default)]
pub struct UpsertForm {
    fields: Map<String, Value>,
    files: HashMap<String, Vec<Upload>>,
}

#[async_trait]
impl<S> FromRequest<S> for UpsertForm
where
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| JsonApiError::bad_request(e.body_text()))?;
            return Self::from_multipart(multipart).await;
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| JsonApiError::bad_request(e.body_text()))?;
        Self::from_json(&bytes)
    }
}

impl UpsertForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, JsonApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| JsonApiError::bad_request(format!("multipart error: {}", e.body_text())))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| JsonApiError::bad_request(format!("failed to read {name}: {}", e.body_text())))?;
                    // browsers send an empty part for an untouched file input
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.entry(name).or_default().push(Upload::new(file_name, bytes.to_vec()));
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| JsonApiError::bad_request(format!("failed to read {name}: {}", e.body_text())))?;
                    form.fields.insert(name, Value::String(text));
                }
            }
        }
        Ok(form)
    }

    fn from_json(bytes: &[u8]) -> Result<Self, JsonApiError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| JsonApiError::bad_request(format!("malformed JSON body: {e}")))?;
        match value {
            Value::Object(fields) => Ok(Self { fields, files: HashMap::new() }),
            _ => Err(JsonApiError::bad_request("request body must be a JSON object")),
        }
    }

    /// Raw field as text; `null` counts as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn parse<T: FromStr>(&self, key: &str, kind: &str) -> Result<Option<T>, JsonApiError> {
        match self.text(key).map(|s| s.trim().to_string()) {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => s
                .parse::<T>()
                .map(Some)
                .map_err(|_| JsonApiError::bad_request(format!("{key}: a valid {kind} is required."))),
        }
    }

    fn flag(&self, key: &str) -> Result<Option<bool>, JsonApiError> {
        let Some(raw) = self.text(key) else { return Ok(None) };
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" | "1" | "on" | "yes" => Ok(Some(true)),
            "false" | "0" | "off" | "no" => Ok(Some(false)),
            _ => Err(JsonApiError::bad_request(format!("{key}: must be a valid boolean."))),
        }
    }

    /// Structured field: a JSON value, or a JSON document sent as text.
    fn structured<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, JsonApiError> {
        let invalid = |e: serde_json::Error| JsonApiError::bad_request(format!("{key}: {e}"));
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => serde_json::from_str(s).map(Some).map_err(invalid),
            Some(other) => serde_json::from_value(other.clone()).map(Some).map_err(invalid),
        }
    }

    pub fn has_files(&self, key: &str) -> bool {
        self.files.get(key).is_some_and(|f| !f.is_empty())
    }

    /// Take every file sent under `key`.
    pub fn take_files(&mut self, key: &str) -> Vec<Upload> {
        self.files.remove(key).unwrap_or_default()
    }

    /// Take the first file sent under `key`.
    pub fn take_file(&mut self, key: &str) -> Option<Upload> {
        self.take_files(key).into_iter().next()
    }

    pub fn haircut_fields(&self) -> Result<HairCutFields, JsonApiError> {
        Ok(HairCutFields {
            code: self.text("code"),
            description: self.text("description"),
            price: self.parse::<Decimal>("price", "number")?,
            minutes: self.parse::<i32>("minutes", "integer")?,
            is_active: self.flag("is_active")?,
        })
    }

    pub fn user_input(&self) -> Result<UserInput, JsonApiError> {
        Ok(UserInput {
            username: self.text("username"),
            email: self.text("email"),
            name: self.text("name"),
            last_name: self.text("last_name"),
            password: self.text("password"),
            direction: self.text("direction"),
            phone: self.text("phone"),
            about: self.text("about"),
            point: self.structured("point")?,
            status: self.parse::<i16>("status", "integer")?,
            is_barber: self.flag("is_barber")?,
            is_superuser: self.flag("is_superuser")?,
            info: self.structured("info")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: Value) -> UpsertForm {
        UpsertForm::from_json(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn haircut_fields_accept_numbers_and_strings() {
        let f = form(json!({"description": "Fade", "price": "15.00", "minutes": 20, "is_active": "false"}));
        let fields = f.haircut_fields().unwrap();
        assert_eq!(fields.description.as_deref(), Some("Fade"));
        assert_eq!(fields.price, Some(Decimal::new(1500, 2)));
        assert_eq!(fields.minutes, Some(20));
        assert_eq!(fields.is_active, Some(false));
    }

    #[test]
    fn bad_number_is_a_validation_error() {
        let err = form(json!({"minutes": "ten"})).haircut_fields().unwrap_err();
        assert_eq!(err.error, json!("minutes: a valid integer is required."));
    }

    #[test]
    fn point_may_arrive_as_text() {
        let f = form(json!({"email": "a@b.com", "point": "{\"latitude\": 4.6, \"longitude\": -74.1}"}));
        let input = f.user_input().unwrap();
        let point = input.point.unwrap();
        assert_eq!(point.latitude, 4.6);
        assert_eq!(point.longitude, -74.1);
    }

    #[test]
    fn empty_body_is_an_empty_form() {
        let f = UpsertForm::from_json(b"  ").unwrap();
        assert!(f.text("description").is_none());
        assert!(!f.has_files("images"));
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(UpsertForm::from_json(b"[1, 2]").is_err());
    }
}
