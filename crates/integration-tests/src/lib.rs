//! Integration tests for the Verdant storefront.
//!
//! Tests drive the full router in-process with `tower::ServiceExt::oneshot`,
//! carrying the session cookie between requests the way a browser would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p verdant-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use tower::ServiceExt;
use verdant_storefront::{catalog::Catalog, config::StorefrontConfig, state::AppState};

/// Largest response body read by the helpers.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Directory of the storefront crate (catalog, static assets).
fn storefront_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront")
}

/// Storefront configuration pointing at the bundled catalog and assets.
#[must_use]
pub fn test_config(banner: Duration) -> StorefrontConfig {
    let dir = storefront_dir();
    let catalog = dir.join("content/catalog.json").display().to_string();
    let statics = dir.join("static").display().to_string();
    let banner_ms = banner.as_millis().to_string();

    StorefrontConfig::from_lookup(|key| match key {
        "STOREFRONT_CATALOG_PATH" => Some(catalog.clone()),
        "STOREFRONT_STATIC_DIR" => Some(statics.clone()),
        "STOREFRONT_CHECKOUT_BANNER_MS" => Some(banner_ms.clone()),
        _ => None,
    })
    .unwrap()
}

/// A response with its body collected.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `HX-Trigger` header, if any.
    #[must_use]
    pub fn hx_trigger(&self) -> Option<&str> {
        self.headers.get("HX-Trigger").and_then(|v| v.to_str().ok())
    }
}

/// One visitor talking to an in-process storefront.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    /// A storefront with the default 3 second checkout banner.
    #[must_use]
    pub fn new() -> Self {
        Self::with_banner(Duration::from_millis(3000))
    }

    /// A storefront with a custom checkout banner duration.
    #[must_use]
    pub fn with_banner(banner: Duration) -> Self {
        let config = test_config(banner);
        let catalog = Catalog::load(&config.catalog_path).unwrap();
        let state = AppState::new(config, catalog);

        Self {
            router: verdant_storefront::app(state),
            cookie: None,
        }
    }

    /// A second visitor on the same storefront, without a session cookie.
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::builder().uri(uri);
        self.send(request, Body::empty()).await
    }

    /// POST a url-encoded form, e.g. `name=Rose`.
    pub async fn post_form(&mut self, uri: &str, form: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(request, Body::from(form.to_string())).await
    }

    /// Add a catalog product by handle.
    pub async fn add(&mut self, handle: &str) -> TestResponse {
        self.post_form("/cart/add", &format!("handle={handle}")).await
    }

    pub async fn increment(&mut self, name: &str) -> TestResponse {
        self.post_form("/cart/increment", &format!("name={name}"))
            .await
    }

    pub async fn decrement(&mut self, name: &str) -> TestResponse {
        self.post_form("/cart/decrement", &format!("name={name}"))
            .await
    }

    pub async fn remove(&mut self, name: &str) -> TestResponse {
        self.post_form("/cart/remove", &format!("name={name}")).await
    }

    /// Current cart panel fragment.
    pub async fn panel(&mut self) -> String {
        let response = self.get("/cart/panel").await;
        assert_eq!(response.status, StatusCode::OK);
        response.body
    }

    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
        {
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the Rose ×3, Tulip ×2 cart ($65.00).
pub async fn fill_flower_cart(app: &mut TestApp) {
    app.add("rose").await;
    app.increment("Rose").await;
    app.increment("Rose").await;
    app.add("tulip").await;
    app.increment("Tulip").await;
}
