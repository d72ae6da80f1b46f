//! Shared harness for the router tests: in-memory store, signed session
//! tokens and a local stand-in for the AI gateway.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, Method, Request, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use farmlytics_backend::{
    config::{
        AiConfig, Config, DatabaseConfig, JwtConfig, RealtimeConfig, ServerConfig, StoreBackend,
        StoreConfig,
    },
    create_app,
    middleware::auth::Claims,
    store::MemoryStore,
    AppState,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret";

pub fn test_config(ai_endpoint: &str) -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        store: StoreConfig {
            backend: StoreBackend::Memory,
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
            min_connections: 0,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
        ai: AiConfig {
            endpoint: ai_endpoint.to_string(),
            api_key: "test-key".to_string(),
            timeout_secs: 5,
            ..AiConfig::default()
        },
        realtime: RealtimeConfig {
            channel_capacity: 64,
        },
    }
}

/// App wired to a fresh in-memory store
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_gateway("http://127.0.0.1:9/v1/chat/completions")
    }

    pub fn with_gateway(endpoint: &str) -> Self {
        let state = AppState::new(Arc::new(MemoryStore::new()), test_config(endpoint))
            .expect("state builds");
        let router = create_app(state.clone());
        Self { state, router }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request builds"))
            .await
            .expect("router responds");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, user: Uuid) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: Uuid, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: Uuid) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(user), None).await
    }

    /// Create a profile for `user`
    pub async fn sign_up(&self, user: Uuid, name: &str, role: &str) {
        let (status, _) = self
            .post(
                "/api/v1/profiles",
                user,
                serde_json::json!({ "full_name": name, "role": role }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

pub fn token_for(user: Uuid) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.to_string(),
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("token encodes")
}

/// Local chat-completions endpoint that records what it receives
#[derive(Clone)]
pub struct FakeGateway {
    pub endpoint: String,
    pub requests: Arc<Mutex<Vec<Value>>>,
    pub auth_headers: Arc<Mutex<Vec<String>>>,
}

#[derive(Clone)]
struct GatewayState {
    status: StatusCode,
    reply: String,
    requests: Arc<Mutex<Vec<Value>>>,
    auth_headers: Arc<Mutex<Vec<String>>>,
}

async fn completions(
    State(state): State<GatewayState>,
    headers: axum::http::HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.requests.lock().unwrap().push(body);
    if let Some(auth) = headers.get(header::AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        state.auth_headers.lock().unwrap().push(auth.to_string());
    }

    if !state.status.is_success() {
        return (state.status, "upstream unavailable").into_response();
    }

    Json(serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": state.reply } }]
    }))
    .into_response()
}

impl FakeGateway {
    pub async fn start(status: StatusCode, reply: &str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let auth_headers = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/v1/chat/completions", post(completions))
            .with_state(GatewayState {
                status,
                reply: reply.to_string(),
                requests: requests.clone(),
                auth_headers: auth_headers.clone(),
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("gateway binds");
        let addr = listener.local_addr().expect("gateway address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            endpoint: format!("http://{}/v1/chat/completions", addr),
            requests,
            auth_headers,
        }
    }

    pub fn last_request(&self) -> Value {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("gateway received a request")
    }
}
