//! HTTP glue around the card store and randomizer.
//!
//! This module only adapts the library to the web: it maps URLs to store
//! and shuffle operations, renders Handlebars templates kept next to this
//! file, and translates errors into status codes. Cards are loaded or
//! built fresh for every request; the only shared state is the immutable
//! store handle.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Form, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use handlebars::Handlebars;
use log::{error, info};
use serde::Serialize;

use crate::{
    card::{Card, Phrase, CARD_SIZE},
    shuffle::shuffled,
    store::{CardStore, StoreError},
};

/// Per-process state handed to every request handler.
#[derive(Clone)]
struct AppState {
    store: Arc<CardStore>,
    templates: Arc<Handlebars<'static>>,
}

/// Build the application router around `store`.
pub fn router(store: CardStore) -> Result<Router> {
    let mut templates = Handlebars::new();
    templates.register_template_string("index", include_str!("index.html.hbs"))?;
    templates.register_template_string("play", include_str!("play.html.hbs"))?;
    templates.register_template_string("edit", include_str!("edit.html.hbs"))?;

    let state = AppState {
        store: Arc::new(store),
        templates: Arc::new(templates),
    };
    Ok(Router::new()
        .route("/", get(index))
        .route("/style.css", get(style))
        .route("/cards/{name}", get(play).post(save))
        .route("/cards/{name}/edit", get(edit))
        .with_state(state))
}

/// One grid cell, for the templates.
#[derive(Debug, Serialize)]
struct CellInfo {
    text: String,
}

impl CellInfo {
    fn from_phrases(phrases: &[Phrase]) -> Vec<CellInfo> {
        phrases
            .iter()
            .map(|p| CellInfo {
                text: p.text.clone(),
            })
            .collect()
    }
}

/// Bindings for the index template.
#[derive(Debug, Serialize)]
struct IndexInfo {
    names: Vec<String>,
}

/// Bindings for the play-view template.
#[derive(Debug, Serialize)]
struct PlayInfo {
    name: String,
    title: String,
    rows: Vec<Vec<CellInfo>>,
}

/// Bindings for the edit-form template.
#[derive(Debug, Serialize)]
struct EditInfo {
    name: String,
    title: String,
    phrases: Vec<CellInfo>,
}

impl AppState {
    fn render<T: Serialize>(&self, template: &str, bindings: &T) -> Response {
        match self.templates.render(template, bindings) {
            Ok(html) => Html(html).into_response(),
            Err(err) => internal_error(err.into()),
        }
    }
}

fn internal_error(err: anyhow::Error) -> Response {
    error!("request failed: {:?}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
        .into_response()
}

async fn style() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css")],
        include_bytes!("style.css").as_slice(),
    )
}

/// `GET /` — the directory of stored cards.
async fn index(State(state): State<AppState>) -> Response {
    match state.store.list_names() {
        Ok(names) => state.render("index", &IndexInfo { names }),
        Err(err) => internal_error(err.into()),
    }
}

/// `GET /cards/{name}` — the play view: a fresh shuffle of the stored
/// card. A card that doesn't exist yet redirects to its edit form.
async fn play(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.store.load(&name) {
        Ok(card) => {
            let played = shuffled(&card);
            state.render(
                "play",
                &PlayInfo {
                    name: played.name.clone(),
                    title: played.title.clone(),
                    rows: played
                        .phrases
                        .chunks(5)
                        .map(CellInfo::from_phrases)
                        .collect(),
                },
            )
        }
        Err(StoreError::NotFound { .. }) => {
            Redirect::to(&format!("/cards/{}/edit", name)).into_response()
        }
        Err(err) => internal_error(err.into()),
    }
}

/// `GET /cards/{name}/edit` — the edit form, in canonical phrase order. A
/// missing card gets a blank form.
async fn edit(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.store.load(&name) {
        Ok(card) => state.render(
            "edit",
            &EditInfo {
                name: card.name.clone(),
                title: card.title.clone(),
                phrases: CellInfo::from_phrases(&card.phrases),
            },
        ),
        Err(StoreError::NotFound { .. }) => state.render(
            "edit",
            &EditInfo {
                name,
                title: String::new(),
                phrases: (0..CARD_SIZE)
                    .map(|_| CellInfo {
                        text: String::new(),
                    })
                    .collect(),
            },
        ),
        Err(err) => internal_error(err.into()),
    }
}

/// `POST /cards/{name}` — build a card from the submitted form and persist
/// it, then redirect to the play view.
///
/// The form is read as raw key/value pairs in document order: one `title`
/// field and the 25 positional `phrase` fields. All counting and
/// validation happens in [`Card::from_submission`] and the store.
async fn save(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let mut title = String::new();
    let mut texts = Vec::with_capacity(CARD_SIZE);
    for (key, value) in fields {
        match key.as_str() {
            "title" => title = value,
            "phrase" => texts.push(value),
            _ => {}
        }
    }

    let card = match Card::from_submission(&name, &title, texts) {
        Ok(card) => card,
        Err(err) => {
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };
    match state.store.save(&card) {
        Ok(()) => {
            info!("saved card {:?}", card.name);
            Redirect::to(&format!("/cards/{}", card.name)).into_response()
        }
        Err(err @ StoreError::Invalid { .. }) => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Err(err) => internal_error(err.into()),
    }
}
