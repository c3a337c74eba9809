//! Server-rendered HTML views.
//!
//! Every page shares [`layout`], which draws the navbar and the flash
//! messages drained for the current request. All interpolated values go
//! through [`escape`].

use crate::idea::{FieldError, Idea, IdeaInput};
use crate::session::Flash;

const APP_NAME: &str = "VidJot";

/// Escape text for use in HTML content and double-quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap page content in the shared document layout.
#[must_use]
pub fn layout(flash: &Flash, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@4.6.2/dist/css/bootstrap.min.css">
  <title>{APP_NAME}</title>
</head>
<body>
{navbar}
<div class="container">
{messages}{body}
</div>
</body>
</html>
"#,
        navbar = navbar(),
        messages = flash_messages(flash),
    )
}

fn navbar() -> String {
    format!(
        r#"<nav class="navbar navbar-expand-sm navbar-dark bg-dark mb-3">
  <div class="container">
    <a class="navbar-brand" href="/">{APP_NAME}</a>
    <ul class="navbar-nav mr-auto">
      <li class="nav-item"><a class="nav-link" href="/">Home</a></li>
      <li class="nav-item"><a class="nav-link" href="/about">About</a></li>
    </ul>
    <ul class="navbar-nav ml-auto">
      <li class="nav-item"><a class="nav-link" href="/ideas">Ideas</a></li>
      <li class="nav-item"><a class="nav-link" href="/ideas/add">Add Idea</a></li>
    </ul>
  </div>
</nav>"#
    )
}

fn flash_messages(flash: &Flash) -> String {
    let success = flash
        .success
        .iter()
        .map(|msg| alert("success", msg));
    let error = flash.error.iter().map(|msg| alert("danger", msg));
    success.chain(error).collect()
}

fn field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|err| alert("danger", &err.to_string()))
        .collect()
}

fn alert(class: &str, message: &str) -> String {
    format!(
        "<div class=\"alert alert-{class}\">{}</div>\n",
        escape(message)
    )
}

/// Landing page.
#[must_use]
pub fn index(flash: &Flash, title: &str) -> String {
    let body = format!(
        r#"<div class="jumbotron text-center">
  <h1 class="display-4">{}</h1>
  <p class="lead">Jot down ideas for future videos.</p>
  <a class="btn btn-dark btn-lg" href="/ideas/add">Add an idea</a>
</div>"#,
        escape(title)
    );
    layout(flash, &body)
}

/// About page.
#[must_use]
pub fn about(flash: &Flash) -> String {
    let body = format!(
        r#"<h1>About</h1>
<p>{APP_NAME} is a place to keep video ideas until you are ready to film them.</p>
<p>Version {}</p>"#,
        env!("CARGO_PKG_VERSION")
    );
    layout(flash, &body)
}

/// List of ideas, in the order given.
#[must_use]
pub fn ideas_index(flash: &Flash, ideas: &[Idea]) -> String {
    let mut body = String::from("<h1 class=\"mb-3\">Video Ideas</h1>\n");

    if ideas.is_empty() {
        body.push_str("<p>No video ideas listed</p>\n");
    }

    for idea in ideas {
        let id = escape(idea.id.as_deref().unwrap_or_default());
        body.push_str(&format!(
            r#"<div class="card card-body mb-2">
  <h4>{title}</h4>
  <p>{details}</p>
  <small class="text-muted">{date}</small>
  <div class="mt-2">
    <a class="btn btn-dark btn-block mb-2" href="/ideas/edit/{id}">Edit</a>
    <form method="post" action="/ideas/{id}?_method=DELETE">
      <input type="hidden" name="_method" value="DELETE">
      <input type="submit" class="btn btn-danger btn-block" value="Delete">
    </form>
  </div>
</div>
"#,
            title = escape(&idea.title),
            details = escape(&idea.details),
            date = idea.date.format("%B %-d, %Y %H:%M UTC"),
        ));
    }

    layout(flash, &body)
}

fn idea_form(heading: &str, action: &str, method: Option<&str>, form: &IdeaInput) -> String {
    let override_field = method.map_or_else(String::new, |m| {
        format!("  <input type=\"hidden\" name=\"_method\" value=\"{m}\">\n")
    });
    format!(
        r#"<div class="card card-body">
<h3>{heading}</h3>
<form method="post" action="{action}">
{override_field}  <div class="form-group">
    <label for="title">Title</label>
    <input type="text" class="form-control" id="title" name="title" value="{title}" required>
  </div>
  <div class="form-group">
    <label for="details">Details</label>
    <textarea class="form-control" id="details" name="details" required>{details}</textarea>
  </div>
  <button type="submit" class="btn btn-primary">Submit</button>
</form>
</div>"#,
        title = escape(form.title()),
        details = escape(form.details()),
    )
}

/// Form for a new idea, with any validation errors above it.
#[must_use]
pub fn add_idea(flash: &Flash, form: &IdeaInput, errors: &[FieldError]) -> String {
    let body = field_errors(errors) + &idea_form("Video Idea", "/ideas", None, form);
    layout(flash, &body)
}

/// Form editing the idea with `id`.
#[must_use]
pub fn edit_idea(flash: &Flash, id: &str, form: &IdeaInput, errors: &[FieldError]) -> String {
    let action = format!("/ideas/{}?_method=PUT", escape(id));
    let body = field_errors(errors) + &idea_form("Edit Video Idea", &action, Some("PUT"), form);
    layout(flash, &body)
}

/// Error page shown for failed requests.
#[must_use]
pub fn error_page(heading: &str, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n<a href=\"/ideas\">Back to ideas</a>",
        escape(heading),
        escape(message)
    );
    layout(&Flash::default(), &body)
}
