/// Application state and router builder
///
/// # Route table
///
/// ```text
/// /
/// ├── GET  /                    # redirect to /tasks
/// ├── GET  /health              # health check (public)
/// ├── GET  /tasks               # listing (public)
/// ├── POST /tasks               # create (login required)
/// ├── GET  /tasks/new           # create form (login required)
/// ├── GET  /tasks/:id           # detail (public)
/// ├── PATCH/DELETE /tasks/:id   # update/destroy (login required)
/// ├── GET  /tasks/:id/edit      # edit form (login required)
/// ├── GET  /sign_up             # sign-up form (public)
/// ├── POST /users               # create account (public)
/// ├── GET/PATCH /users/:id      # profile show/update (login required)
/// ├── GET  /users/:id/edit      # profile edit form (owner only)
/// ├── GET/POST /login           # login form / authenticate
/// └── DELETE /logout            # end session (login required)
/// ```
///
/// The login gate is the [`CurrentUser`] extractor, not a router layer, so
/// public and gated methods can share a path (`GET /tasks` is public while
/// `POST /tasks` is gated). The method-override middleware runs outside
/// routing so `?_method=patch` form posts reach the PATCH routes.
///
/// [`CurrentUser`]: crate::auth::middleware::CurrentUser
use crate::{config::Config, middleware::method_override::method_override, routes};
use axum::{
    response::Redirect,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// Cloned into each request handler via Axum's `State` extractor; uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the secret used to sign session cookies
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(routes::health::health_check))
        .route(
            "/tasks",
            get(routes::tasks::index).post(routes::tasks::create),
        )
        .route("/tasks/new", get(routes::tasks::new))
        .route(
            "/tasks/:id",
            get(routes::tasks::show)
                .patch(routes::tasks::update)
                .delete(routes::tasks::destroy),
        )
        .route("/tasks/:id/edit", get(routes::tasks::edit))
        .route("/sign_up", get(routes::users::sign_up_form))
        .route("/users", post(routes::users::create))
        .route(
            "/users/:id",
            get(routes::users::show).patch(routes::users::update),
        )
        .route("/users/:id/edit", get(routes::users::edit))
        .route(
            "/login",
            get(routes::sessions::login_form).post(routes::sessions::login),
        )
        .route("/logout", delete(routes::sessions::logout))
        .layer(axum::middleware::from_fn(method_override))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

async fn root() -> Redirect {
    Redirect::to("/tasks")
}
