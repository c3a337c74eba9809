//! Route handlers.
//!
//! Each handler makes at most one logical store call, then renders a view or
//! redirects to `/ideas` with a flash message.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{debug, info};

use super::{payload::Payload, views, AppState};
use crate::error::Result;
use crate::idea::IdeaInput;
use crate::session::Session;

const IDEAS_PATH: &str = "/ideas";

/// `GET /`
pub async fn index(session: Session) -> Html<String> {
    Html(views::index(&session.take_flash(), "Welcome"))
}

/// `GET /about`
pub async fn about(session: Session) -> Html<String> {
    Html(views::about(&session.take_flash()))
}

/// `GET /ideas`: every idea, newest first.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub async fn list_ideas(State(state): State<AppState>, session: Session) -> Result<Html<String>> {
    let ideas = state.ideas.list().await?;
    Ok(Html(views::ideas_index(&session.take_flash(), &ideas)))
}

/// `GET /ideas/add`
pub async fn add_idea_form(session: Session) -> Html<String> {
    Html(views::add_idea(
        &session.take_flash(),
        &IdeaInput::default(),
        &[],
    ))
}

/// `GET /ideas/edit/{id}`
///
/// # Errors
///
/// Returns [`crate::Error::IdeaNotFound`] for an unknown id.
pub async fn edit_idea_form(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let idea = state.ideas.find(&id).await?;
    Ok(Html(views::edit_idea(
        &session.take_flash(),
        &id,
        &IdeaInput::from(&idea),
        &[],
    )))
}

/// `POST /ideas`: validate, then create.
///
/// Accepts a form or a JSON body. Invalid input re-renders the add form with
/// the errors and the submitted values; nothing is stored.
///
/// # Errors
///
/// Returns an error if the store insert fails.
pub async fn create_idea(
    State(state): State<AppState>,
    session: Session,
    Payload(input): Payload<IdeaInput>,
) -> Result<Response> {
    let idea = match input.clone().into_idea() {
        Ok(idea) => idea,
        Err(errors) => {
            debug!("Rejected new idea: {} field errors", errors.len());
            let page = views::add_idea(&session.take_flash(), &input, &errors);
            return Ok(Html(page).into_response());
        }
    };

    let idea = state.ideas.create(idea).await?;
    info!("Created idea {}", idea.id.as_deref().unwrap_or_default());

    session.success("Video idea added");
    Ok(Redirect::to(IDEAS_PATH).into_response())
}

/// `PUT /ideas/{id}`: replace title and details.
///
/// # Errors
///
/// Returns [`crate::Error::IdeaNotFound`] for an unknown id, or an error if the
/// store update fails.
pub async fn update_idea(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Payload(input): Payload<IdeaInput>,
) -> Result<Response> {
    apply_update(&state, &session, &id, input).await
}

async fn apply_update(
    state: &AppState,
    session: &Session,
    id: &str,
    input: IdeaInput,
) -> Result<Response> {
    state.ideas.find(id).await?;

    let errors = input.validate();
    if !errors.is_empty() {
        debug!("Rejected edit of idea {}: {} field errors", id, errors.len());
        let page = views::edit_idea(&session.take_flash(), id, &input, &errors);
        return Ok(Html(page).into_response());
    }

    state
        .ideas
        .update(
            id,
            input.title.unwrap_or_default(),
            input.details.unwrap_or_default(),
        )
        .await?;
    info!("Updated idea {}", id);

    session.success("Video idea updated");
    Ok(Redirect::to(IDEAS_PATH).into_response())
}

/// `DELETE /ideas/{id}`
///
/// Removing an id that does not exist still redirects with the flash.
///
/// # Errors
///
/// Returns an error if the store delete fails.
pub async fn delete_idea(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect> {
    apply_delete(&state, &session, &id).await
}

async fn apply_delete(state: &AppState, session: &Session, id: &str) -> Result<Redirect> {
    if state.ideas.remove(id).await? {
        info!("Deleted idea {}", id);
    } else {
        debug!("Delete of unknown idea {}", id);
    }

    session.success("Video idea removed");
    Ok(Redirect::to(IDEAS_PATH))
}

/// `_method` given in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct OverrideQuery {
    #[serde(rename = "_method")]
    method: Option<String>,
}

/// Body of a form posted in place of a PUT or DELETE.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OverrideForm {
    #[serde(rename = "_method")]
    method: Option<String>,
    title: Option<String>,
    details: Option<String>,
}

/// `POST /ideas/{id}` with `_method=PUT` or `_method=DELETE`.
///
/// HTML forms can only GET or POST; the query string wins over a form field
/// when both are present.
///
/// # Errors
///
/// Propagates the errors of the update or delete it dispatches to.
pub async fn method_override(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<OverrideQuery>,
    Payload(form): Payload<OverrideForm>,
) -> Result<Response> {
    let method = query.method.or(form.method).unwrap_or_default();

    match method.to_ascii_uppercase().as_str() {
        "PUT" => {
            let input = IdeaInput {
                title: form.title,
                details: form.details,
            };
            apply_update(&state, &session, &id, input).await
        }
        "DELETE" => Ok(apply_delete(&state, &session, &id).await?.into_response()),
        other => {
            debug!("Rejected method override {:?} for idea {}", other, id);
            Ok(StatusCode::METHOD_NOT_ALLOWED.into_response())
        }
    }
}

/// Fallback for unmatched routes.
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(views::error_page("Not Found", "There is nothing at this address.")),
    )
        .into_response()
}
