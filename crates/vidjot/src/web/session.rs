//! Session cookie middleware and extractor.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use uuid::Uuid;

use super::AppState;
use crate::config::Config;
use crate::error::Error;
use crate::session::Session;

/// How the session cookie is named and flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    /// Cookie name.
    pub name: String,
    /// Add the `Secure` attribute.
    pub secure: bool,
}

impl From<&Config> for CookieSettings {
    fn from(config: &Config) -> Self {
        Self {
            name: config.session.cookie_name.clone(),
            secure: config.session.secure_cookie,
        }
    }
}

impl CookieSettings {
    /// `Set-Cookie` value carrying `id`.
    #[must_use]
    pub fn header_value(&self, id: Uuid) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!("{}={id}; Path=/; HttpOnly; SameSite=Lax{secure}", self.name)
    }
}

/// Find the session id in the request's `Cookie` headers.
fn session_id(headers: &HeaderMap, name: &str) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

/// Attach a [`Session`] to the request, starting one if the client has none.
pub async fn attach_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let (id, fresh) = match session_id(req.headers(), &state.cookie.name) {
        Some(id) if state.sessions.touch(id) => (id, false),
        _ => (state.sessions.create(), true),
    };

    req.extensions_mut()
        .insert(Session::new(id, Arc::clone(&state.sessions)));

    let mut response = next.run(req).await;

    if fresh {
        match HeaderValue::from_str(&state.cookie.header_value(id)) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!("Could not build session cookie: {}", e),
        }
    }

    response
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| Error::internal("session middleware is not installed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookies: &[&str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for c in cookies {
            map.append(header::COOKIE, HeaderValue::from_str(c).unwrap());
        }
        map
    }

    #[test]
    fn test_session_id_found_among_other_cookies() {
        let id = Uuid::new_v4();
        let map = headers(&[&format!("theme=dark; vidjot.sid={id}; lang=en")]);
        assert_eq!(session_id(&map, "vidjot.sid"), Some(id));
    }

    #[test]
    fn test_session_id_across_multiple_headers() {
        let id = Uuid::new_v4();
        let map = headers(&["theme=dark", &format!("vidjot.sid={id}")]);
        assert_eq!(session_id(&map, "vidjot.sid"), Some(id));
    }

    #[test]
    fn test_session_id_missing_or_malformed() {
        assert_eq!(session_id(&HeaderMap::new(), "vidjot.sid"), None);
        assert_eq!(
            session_id(&headers(&["vidjot.sid=not-a-uuid"]), "vidjot.sid"),
            None
        );
        assert_eq!(
            session_id(&headers(&[&format!("other={}", Uuid::new_v4())]), "vidjot.sid"),
            None
        );
    }

    #[test]
    fn test_cookie_header_value() {
        let id = Uuid::nil();
        let plain = CookieSettings {
            name: "sid".to_string(),
            secure: false,
        };
        assert_eq!(
            plain.header_value(id),
            format!("sid={id}; Path=/; HttpOnly; SameSite=Lax")
        );

        let secure = CookieSettings {
            name: "sid".to_string(),
            secure: true,
        };
        assert!(secure.header_value(id).ends_with("; Secure"));
    }

    #[test]
    fn test_cookie_settings_from_config() {
        let settings = CookieSettings::from(&Config::default());
        assert_eq!(settings.name, "vidjot.sid");
        assert!(!settings.secure);
    }
}
