use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::FormRejection, Form, State},
    http::{
        header::{COOKIE, LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    serve, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::app_state::{SessionState, SessionStore};
use crate::config::ServerConfig;
use crate::constants::SESSION_COOKIE;
use crate::error::{ProfileError, SessionError};
use crate::profile::{Profile, ProfileForm};
use crate::render::PageView;
use crate::session::SessionController;

/// What the page can do: either talk to the model or explain why it can't.
#[derive(Clone)]
pub enum Backend {
    Ready(SessionController),
    /// Configuration or model setup failed; the message is shown on every page.
    Blocked(String),
}

// Shared application state
#[derive(Clone)]
pub struct AppState {
    templates: Arc<AutoReloader>,
    backend: Backend,
    sessions: SessionStore,
}

impl AppState {
    pub fn new(templates: AutoReloader, backend: Backend, sessions: SessionStore) -> Self {
        Self {
            templates: Arc::new(templates),
            backend,
            sessions,
        }
    }

    fn render(&self, view: &PageView) -> Result<String, minijinja::Error> {
        self.templates
            .acquire_env()
            .and_then(|env| env.get_template("index.html").and_then(|tmpl| tmpl.render(view)))
    }

    fn controller(&self) -> Result<&SessionController, Response> {
        match &self.backend {
            Backend::Ready(controller) => Ok(controller),
            Backend::Blocked(reason) => Err(self.page(
                StatusCode::SERVICE_UNAVAILABLE,
                &PageView::blocked(reason.clone()),
            )),
        }
    }

    fn page(&self, status: StatusCode, view: &PageView) -> Response {
        match self.render(view) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                error!("Failed to get or render template: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(format!("Internal Server Error: {}", e)),
                )
                    .into_response()
            }
        }
    }
}

/// Template environment reloaded from `dir` whenever a file changes.
pub fn create_minijinja_env(dir: PathBuf) -> AutoReloader {
    AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader(&dir));
        notifier.watch_path(&dir, true);
        Ok(env)
    })
}

#[derive(Debug, Deserialize)]
pub struct QuestionForm {
    #[serde(default)]
    pub question: String,
}

fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// No Max-Age: the cookie, and so the session, ends with the browser session.
fn with_session_cookie(mut response: Response, new_session: Option<Uuid>) -> Response {
    if let Some(id) = new_session {
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().insert(SET_COOKIE, value);
            }
            Err(e) => error!("Failed to build session cookie: {}", e),
        }
    }
    response
}

async fn index_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(response) = state.controller() {
        return response;
    }

    let (id, session, created) = state.sessions.get_or_create(session_id(&headers)).await;
    let session = session.lock().await;
    let response = state.page(StatusCode::OK, &PageView::for_session(&session));
    with_session_cookie(response, created.then_some(id))
}

async fn generate_plans_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<ProfileForm>, FormRejection>,
) -> Response {
    let controller = match state.controller() {
        Ok(controller) => controller,
        Err(response) => return response,
    };

    let (id, session, created) = state.sessions.get_or_create(session_id(&headers)).await;
    let new_session = created.then_some(id);
    // Held across the model calls: one interaction per session at a time.
    let mut session = session.lock().await;

    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!(session = %id, "Rejected profile form: {}", rejection);
            let err = ProfileError::Malformed(rejection.body_text());
            return invalid_profile(&state, &session, err, new_session);
        }
    };
    session.form = form;

    let profile = match Profile::from_form(&session.form) {
        Ok(profile) => profile,
        Err(err) => {
            warn!(session = %id, "Profile out of bounds: {}", err);
            return invalid_profile(&state, &session, err, new_session);
        }
    };

    info!(session = %id, model = controller.model_name(), "Generating plans");
    let (status, view) = match controller.generate_plans(&mut session, &profile).await {
        Ok(()) => (StatusCode::OK, PageView::for_session(&session)),
        Err(err) => (
            StatusCode::BAD_GATEWAY,
            PageView::for_session(&session).with_error(err.to_string()),
        ),
    };
    with_session_cookie(state.page(status, &view), new_session)
}

fn invalid_profile(
    state: &AppState,
    session: &SessionState,
    err: ProfileError,
    new_session: Option<Uuid>,
) -> Response {
    let view = PageView::for_session(session).with_error(err.to_string());
    with_session_cookie(state.page(StatusCode::UNPROCESSABLE_ENTITY, &view), new_session)
}

async fn ask_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<QuestionForm>,
) -> Response {
    let controller = match state.controller() {
        Ok(controller) => controller,
        Err(response) => return response,
    };

    let (id, session, created) = state.sessions.get_or_create(session_id(&headers)).await;
    let new_session = created.then_some(id);
    let mut session = session.lock().await;

    let response = match controller.answer_question(&mut session, &form.question).await {
        Ok(_) => state.page(StatusCode::OK, &PageView::for_session(&session)),
        Err(SessionError::PlansNotReady) => {
            (StatusCode::SEE_OTHER, [(LOCATION, "/")]).into_response()
        }
        Err(err) => state.page(
            StatusCode::BAD_GATEWAY,
            &PageView::for_session(&session).with_error(err.to_string()),
        ),
    };
    with_session_cookie(response, new_session)
}

pub fn router(state: AppState, static_dir: &Path) -> Router {
    // Serve static files from the configured directory
    let static_files_service = ServeDir::new(static_dir);

    Router::new()
        .route("/", get(index_handler))
        .route("/plans", post(generate_plans_handler))
        .route("/ask", post(ask_handler))
        .nest_service("/static", static_files_service)
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

pub async fn start_web_server(config: ServerConfig, backend: Backend) -> Result<()> {
    let templates = create_minijinja_env(config.templates_dir.clone());
    let state = AppState::new(templates, backend, SessionStore::new(config.session_ttl));
    let app = router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .context(format!("Failed to bind to address {}", config.addr))?;
    info!("Web server listening on http://{}", config.addr);

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_is_read_from_cookie_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}", SESSION_COOKIE, id)).unwrap(),
        );
        assert_eq!(session_id(&headers), Some(id));
    }

    #[test]
    fn test_malformed_session_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{}=not-a-uuid", SESSION_COOKIE)).unwrap(),
        );
        assert_eq!(session_id(&headers), None);
        assert_eq!(session_id(&HeaderMap::new()), None);
    }

    #[test]
    fn test_cookie_only_set_for_new_sessions() {
        let id = Uuid::new_v4();
        let response = with_session_cookie(StatusCode::OK.into_response(), Some(id));
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with(&format!("{}={}", SESSION_COOKIE, id)));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Max-Age"));

        let response = with_session_cookie(StatusCode::OK.into_response(), None);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }
}
