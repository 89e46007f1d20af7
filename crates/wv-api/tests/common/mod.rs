use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde::Deserialize;
use tempfile::TempDir;
use tower::ServiceExt;
use wv_api::{
    config::{ApiConfig, Environment},
    router,
    state::ApiState,
};
use wv_db::{
    RecordStore,
    models::{Role, User, UserUpdate},
};

pub const TEST_PASSWORD: &str = "password123";

/// Test state builder backed by a throwaway directory
pub struct TestStateBuilder {
    max_file_size: usize,
    trust_proxy: bool,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            max_file_size: 1024 * 1024,
            trust_proxy: false,
        }
    }

    pub fn trust_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }

    pub fn max_file_size(mut self, bytes: usize) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Build an ApiState whose database and uploads live in a temp directory.
    ///
    /// Keep the returned `TempDir` alive for the duration of the test.
    pub async fn build(self) -> (ApiState, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");

        let config = ApiConfig {
            port: 0,
            db_path: dir.path().join("data").join("db.json"),
            upload_path: dir.path().join("uploads"),
            max_file_size: self.max_file_size,
            jwt_secret: "test_jwt_secret_minimum_32_characters_long".to_string(),
            jwt_expiry_days: 7,
            bcrypt_cost: 4,
            admin_email: "admin@waizvault.com".to_string(),
            admin_password: None,
            trust_proxy: self.trust_proxy,
            env: Environment::Development,
        };

        let store = RecordStore::initialize(&config.db_path).await;
        let state = ApiState::new(&config, store, None).expect("Failed to build state");

        (state, dir)
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shortcut for the common case: fresh state plus a client over the full router
pub async fn setup() -> (ApiState, TestClient, TempDir) {
    let (state, dir) = TestStateBuilder::new().build().await;
    let client = TestClient::new(router::router().with_state(state.clone()));
    (state, client, dir)
}

/// Register a user through the service layer, set its role and mint a token
pub async fn create_user(
    state: &ApiState,
    email: &str,
    class_name: &str,
    role: Role,
) -> (User, String) {
    let user = wv_api::auth::service::register_user(
        &state.store,
        "Test User",
        email,
        TEST_PASSWORD,
        class_name,
        state.bcrypt_cost,
    )
    .await
    .expect("Failed to create test user");

    let user = if role == Role::Student {
        user
    } else {
        state
            .store
            .update_user(
                user.id,
                UserUpdate {
                    role: Some(role),
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to update role")
            .expect("User should exist")
    };

    let token = state.tokens.issue(&user).expect("Failed to create token");

    (user, token)
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Send a request and get the response
    pub async fn request(&self, mut request: Request<Body>) -> TestResponse {
        let test_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080);
        request.extensions_mut().insert(ConnectInfo(test_addr));

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    fn builder(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match token {
            Some(token) => builder.header("authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Send a GET request
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Self::builder("GET", uri, None)
            .body(Body::empty())
            .expect("Failed to build request");
        self.request(request).await
    }

    /// Send a GET request with a bearer token
    pub async fn get_with_auth(&self, uri: &str, token: &str) -> TestResponse {
        let request = Self::builder("GET", uri, Some(token))
            .body(Body::empty())
            .expect("Failed to build authenticated request");
        self.request(request).await
    }

    /// Send a POST request with JSON body
    pub async fn post_json<T: serde::Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body");
        let request = Self::builder("POST", uri, None)
            .header("content-type", "application/json")
            .body(Body::from(json_body))
            .expect("Failed to build request");
        self.request(request).await
    }

    /// Send a POST request with JSON body and a bearer token
    pub async fn post_json_with_auth<T: serde::Serialize>(
        &self,
        uri: &str,
        body: &T,
        token: &str,
    ) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body");
        let request = Self::builder("POST", uri, Some(token))
            .header("content-type", "application/json")
            .header("user-agent", "wv-test")
            .body(Body::from(json_body))
            .expect("Failed to build authenticated request");
        self.request(request).await
    }

    /// Send a DELETE request with a bearer token
    pub async fn delete_with_auth(&self, uri: &str, token: &str) -> TestResponse {
        let request = Self::builder("DELETE", uri, Some(token))
            .body(Body::empty())
            .expect("Failed to build authenticated request");
        self.request(request).await
    }

    /// Send a multipart upload. `file` is `(file name, content type, bytes)`.
    pub async fn upload_with_auth(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
        token: &str,
    ) -> TestResponse {
        const BOUNDARY: &str = "----wvTestBoundary7MA4YWxkTrZu0gW";

        let mut body = Vec::new();
        for (name, value) in fields {
            let disposition = format!("Content-Disposition: form-data; name=\"{name}\"");
            body.extend_from_slice(format!("--{BOUNDARY}\r\n{disposition}\r\n\r\n").as_bytes());
            body.extend_from_slice(format!("{value}\r\n").as_bytes());
        }
        if let Some((file_name, content_type, bytes)) = file {
            let disposition =
                format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"");
            body.extend_from_slice(format!("--{BOUNDARY}\r\n{disposition}\r\n").as_bytes());
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Self::builder("POST", uri, Some(token))
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("Failed to build multipart request");
        self.request(request).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: axum::http::HeaderMap,
}

impl TestResponse {
    /// Get response body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse response body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Assert status code
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }

    /// Value of the `error` field of a JSON error body
    pub fn error(&self) -> String {
        let body: serde_json::Value = self.json();
        body["error"]
            .as_str()
            .expect("Response should carry an error message")
            .to_string()
    }
}
