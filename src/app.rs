use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::record::Submission;
use crate::remote::HttpSheet;
use crate::sync::SyncController;
use crate::view::{HtmlView, list_data};

pub struct AppState {
    controller: Arc<SyncController>,
    view: HtmlView,
}

impl AppState {
    pub fn new(controller: Arc<SyncController>, view: HtmlView) -> Self {
        AppState { controller, view }
    }
}

#[derive(Serialize)]
struct SubmitResponse {
    status: String,
    message: Option<String>,
}

/// Routes of the browser front-end
///
/// The list is shared by every visitor. The form and its error belong to
/// the request: they travel in the redirect or in the re-rendered page, and
/// are never read back from the controller.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_page))
        .route("/submit", post(submit_form))
        .route("/refresh", post(refresh_list))
        .route("/api/list", get(get_list))
        .route("/api/submit", post(submit_json))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the periodic sync and serve the page until the process stops.
pub async fn run(config: Config) -> Result<(), Box<dyn Error + Send + Sync>> {
    let backend = Arc::new(HttpSheet::new(&config)?);
    let controller = Arc::new(SyncController::from_config(backend, &config));
    let _ticker = controller.spawn_periodic();

    let view = HtmlView::new(config.refresh_secs)?;
    let app = router(Arc::new(AppState::new(controller, view)));

    let listener = TcpListener::bind(config.bind.as_str()).await?;
    log::info!("Listening on http://{}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

fn page(state: &AppState, form: &Submission, error: Option<&str>) -> Response {
    match state.view.render_page(&state.controller.snapshot(), form, error) {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            log::error!("could not render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "could not render page").into_response()
        }
    }
}

/// `/?name=...` prefills the form, so a visitor keeps their name after adding.
async fn serve_page(
    State(state): State<Arc<AppState>>,
    Query(form): Query<Submission>,
) -> Response {
    page(&state, &form, None)
}

async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<Submission>,
) -> Response {
    match state.controller.submit(form.clone()).await {
        Ok(()) => {
            let kept = format!("/?name={}", urlencoding::encode(&form.name));
            Redirect::to(&kept).into_response()
        }
        // Shown to this visitor only, with what they typed
        Err(e) => page(&state, &form, Some(&e.to_string())),
    }
}

async fn refresh_list(State(state): State<Arc<AppState>>) -> Response {
    match state.controller.refresh(true).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => page(&state, &Submission::default(), Some(&e.to_string())),
    }
}

async fn get_list(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(list_data(&state.controller.snapshot()))
}

async fn submit_json(
    State(state): State<Arc<AppState>>,
    Json(form): Json<Submission>,
) -> impl IntoResponse {
    match state.controller.submit(form).await {
        Ok(()) => Json(SubmitResponse {
            status: "ok".to_string(),
            message: None,
        }),
        Err(e) => Json(SubmitResponse {
            status: "error".to_string(),
            message: Some(e.to_string()),
        }),
    }
}
