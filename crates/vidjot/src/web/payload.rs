//! Request bodies that may arrive as a form, as JSON, or not at all.

use axum::{
    extract::{FromRequest, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::de::DeserializeOwned;

/// Body decoded by `Content-Type`.
///
/// `application/x-www-form-urlencoded` goes through [`Form`] and
/// `application/json` through [`Json`]. A request with no `Content-Type`
/// carries no body and yields `T::default()`, so a bare
/// `POST /ideas/{id}?_method=DELETE` still reaches its handler. Anything else
/// is `415 Unsupported Media Type`.
#[derive(Debug, Clone, Default)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mime = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                value
                    .split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_lowercase()
            });

        match mime.as_deref() {
            None => Ok(Self(T::default())),
            Some("application/x-www-form-urlencoded") => Form::<T>::from_request(req, state)
                .await
                .map(|Form(value)| Self(value))
                .map_err(IntoResponse::into_response),
            Some(json) if json == "application/json" || json.ends_with("+json") => {
                Json::<T>::from_request(req, state)
                    .await
                    .map(|Json(value)| Self(value))
                    .map_err(IntoResponse::into_response)
            }
            Some(_) => Err(StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response()),
        }
    }
}
