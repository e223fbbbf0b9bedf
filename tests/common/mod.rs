/// Common test utilities for integration tests
///
/// Provides a test context (database + router) and a minimal cookie-aware
/// client for driving the app the way a browser would: form posts, redirect
/// following, session and flash cookies carried between requests.
///
/// Integration tests need a PostgreSQL database. They connect to
/// `TEST_DATABASE_URL` and skip (returning early) when it is not set, so
/// the unit test suite stays runnable without infrastructure.
use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use sqlx::PgPool;
use tasklist::{
    app::{build_router, AppState},
    config::{Config, DatabaseConfig, ServerConfig, SessionConfig},
};
use tower::ServiceExt;
use uuid::Uuid;

/// Test context containing the database pool and application router
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
}

impl TestContext {
    /// Creates a test context, or `None` when `TEST_DATABASE_URL` is unset
    pub async fn new() -> Option<Self> {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("skipping integration test: TEST_DATABASE_URL not set");
            return None;
        };

        let db = PgPool::connect(&url)
            .await
            .expect("test database should be reachable");

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .expect("migrations should run");

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            session: SessionConfig {
                secret: "integration-test-secret-at-least-32-bytes".to_string(),
            },
        };

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Some(Self { db, app })
    }

    /// Starts a browser-like client against this context's router
    pub fn client(&self) -> Client {
        Client {
            app: self.app.clone(),
            cookies: Vec::new(),
        }
    }
}

/// Minimal cookie-aware HTTP client over `tower::ServiceExt::oneshot`
pub struct Client {
    app: Router,
    cookies: Vec<(String, String)>,
}

impl Client {
    pub async fn get(&mut self, path: &str) -> Response<Body> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> Response<Body> {
        self.request(Method::POST, path, Some(encode_form(fields)))
            .await
    }

    pub async fn patch_form(&mut self, path: &str, fields: &[(&str, &str)]) -> Response<Body> {
        self.request(Method::PATCH, path, Some(encode_form(fields)))
            .await
    }

    pub async fn delete(&mut self, path: &str) -> Response<Body> {
        self.request(Method::DELETE, path, None).await
    }

    /// Plants a cookie directly, as a tampering client would
    #[allow(dead_code)]
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.retain(|(n, _)| n != name);
        self.cookies.push((name.to_string(), value.to_string()));
    }

    /// Follows the redirect in `res`, asserting one is present
    pub async fn follow(&mut self, res: &Response<Body>) -> Response<Body> {
        let location = location(res);
        self.get(&location).await
    }

    async fn request(
        &mut self,
        method: Method,
        path: &str,
        form_body: Option<String>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(path);
        if !self.cookies.is_empty() {
            builder = builder.header(header::COOKIE, self.cookie_header());
        }

        let request = match form_body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("request should not fail");

        self.absorb(&response);
        response
    }

    /// Updates the cookie store from Set-Cookie headers; an empty value is
    /// a removal
    fn absorb(&mut self, res: &Response<Body>) {
        for value in res.headers().get_all(header::SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let Some(pair) = raw.split(';').next() else {
                continue;
            };
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };

            self.cookies.retain(|(n, _)| n != name);
            if !value.is_empty() {
                self.cookies.push((name.to_string(), value.to_string()));
            }
        }
    }

    fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(n, v)| format!("{}={}", n, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn encode_form(fields: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(fields).expect("form fields should encode")
}

/// Reads the Location header of a redirect response
pub fn location(res: &Response<Body>) -> String {
    res.headers()
        .get(header::LOCATION)
        .expect("response should be a redirect")
        .to_str()
        .expect("location should be valid UTF-8")
        .to_string()
}

/// Consumes a response body into a string
pub async fn body_string(res: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Unique per-test email so parallel tests never collide
pub fn unique_email() -> String {
    format!("tester_{}@example.com", Uuid::new_v4().simple())
}

/// Unique per-test task title
pub fn unique_title(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// Signs up a fresh user via the sign-up form, leaving the client logged
/// in; returns the new user's profile path (`/users/:id`)
pub async fn sign_up(client: &mut Client, email: &str, password: &str) -> String {
    let res = client
        .post_form(
            "/users",
            &[
                ("email", email),
                ("password", password),
                ("password_confirmation", password),
            ],
        )
        .await;
    location(&res)
}
