use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use super::views;
use crate::error::Error;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, page) = if self.is_not_found() {
            (
                StatusCode::NOT_FOUND,
                views::error_page("Not Found", &self.to_string()),
            )
        } else {
            error!("Request failed: {}", self);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                views::error_page("Something went wrong", "The request could not be completed."),
            )
        };

        (status, Html(page)).into_response()
    }
}
