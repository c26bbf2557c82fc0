//! Integration tests for the LDMS web client.
//!
//! Each test starts two in-process servers on ephemeral ports: a fake REST
//! backend and the web client pointed at it. A `reqwest` client with a
//! cookie store plays the browser.
//!
//! # Fake backend accounts
//!
//! | Email         | Password | Token | Role         | Id |
//! |---------------|----------|-------|--------------|----|
//! | `a@b.com`     | `x`      | `t1`  | client       | 1  |
//! | `admin@b.com` | `y`      | `t2`  | admin        | 2  |
//! | `sm@b.com`    | `z`      | `t3`  | stockManager | 3  |
//! | `d@b.com`     | `w`      | `t4`  | driver       | 4  |
//!
//! `GET /admin/users` lists these accounts. The only stock record is
//! `Widget` (id 7) at 100. Order 31 is shipped and assigned to the driver;
//! order 32 is already delivered.

use std::collections::{BTreeMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use ldms_web::config::{ApiConfig, WebConfig};
use ldms_web::middleware::session::session_layer;
use ldms_web::routes;
use ldms_web::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower_sessions::MemoryStore;
use url::Url;

/// `(email, password, token, role, id, name)`
const ACCOUNTS: [(&str, &str, &str, &str, i64, &str); 4] = [
    ("a@b.com", "x", "t1", "client", 1, "Ann"),
    ("admin@b.com", "y", "t2", "admin", 2, "Root"),
    ("sm@b.com", "z", "t3", "stockManager", 3, "Sam"),
    ("d@b.com", "w", "t4", "driver", 4, "Dee"),
];

/// Id of the driver account.
pub const DRIVER_ID: i64 = 4;

/// Requests the fake backend received, for assertions.
#[derive(Debug, Clone, Default)]
pub struct BackendLog {
    /// Bodies of `POST /orders`, in arrival order.
    pub orders: Vec<Value>,
    /// `(order id, body)` of `PUT /orders/{id}/status`.
    pub status_updates: Vec<(i64, Value)>,
    /// Orders passed to `PUT /orders/mark-delivered/{id}`.
    pub delivered: Vec<i64>,
    /// Multipart fields of `POST /stocks`.
    pub created_stocks: Vec<BTreeMap<String, String>>,
    /// Bodies of `POST /admin/users`.
    pub created_users: Vec<Value>,
    /// Accounts passed to `DELETE /admin/users/{id}`.
    pub deleted_users: Vec<i64>,
}

/// Shared fake backend state.
#[derive(Clone, Default)]
struct Backend {
    log: Arc<Mutex<BackendLog>>,
    revoked: Arc<Mutex<HashSet<String>>>,
    order_delay: Duration,
}

impl Backend {
    fn with_log<R>(&self, f: impl FnOnce(&mut BackendLog) -> R) -> R {
        f(&mut self.log.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Who a bearer token belongs to, unless it was revoked.
    fn identity(&self, headers: &HeaderMap) -> Option<Value> {
        let token = headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let revoked = self
            .revoked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(token);
        if revoked {
            return None;
        }
        ACCOUNTS
            .iter()
            .find(|account| account.2 == token)
            .map(|&(_, _, _, role, id, name)| json!({ "id": id, "role": role, "name": name }))
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Invalid token" })),
    )
        .into_response()
}

fn ok(message: &str) -> Response {
    Json(json!({ "message": message })).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    ACCOUNTS
        .iter()
        .find(|account| account.0 == email && account.1 == password)
        .map_or_else(
            || {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "Invalid credentials" })),
                )
                    .into_response()
            },
            |&(_, _, token, role, _, _)| Json(json!({ "token": token, "role": role })).into_response(),
        )
}

async fn me(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend
        .identity(&headers)
        .map_or_else(unauthorized, |profile| Json(profile).into_response())
}

async fn stocks(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if backend.identity(&headers).is_none() {
        return unauthorized();
    }
    Json(json!([{
        "id": 7,
        "name": "Widget",
        "category": "Tools",
        "price": 100,
        "inStock": 50,
        "status": "In-Stock"
    }]))
    .into_response()
}

async fn create_stock(
    State(backend): State<Backend>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if backend.identity(&headers).is_none() {
        return unauthorized();
    }
    let mut fields = BTreeMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        fields.insert(name, value);
    }
    backend.with_log(|log| log.created_stocks.push(fields));
    (StatusCode::CREATED, Json(json!({ "message": "Stock created" }))).into_response()
}

async fn create_order(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if backend.identity(&headers).is_none() {
        return unauthorized();
    }
    tokio::time::sleep(backend.order_delay).await;
    backend.with_log(|log| log.orders.push(body));
    (StatusCode::CREATED, Json(json!({ "message": "Order created" }))).into_response()
}

fn assigned_order(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "productId": 7,
        "product": { "name": "Widget" },
        "quantity": 3,
        "status": status,
        "userId": 1,
        "driverId": DRIVER_ID,
    })
}

async fn all_orders(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if backend.identity(&headers).is_none() {
        return unauthorized();
    }
    Json(json!([assigned_order(31, "Order Created")])).into_response()
}

async fn user_orders(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
) -> Response {
    if backend.identity(&headers).is_none() {
        return unauthorized();
    }
    let orders: Vec<Value> = backend.with_log(|log| {
        log.orders
            .iter()
            .enumerate()
            .filter(|(_, order)| order["userId"] == user_id)
            .map(|(i, order)| {
                json!({
                    "id": i + 1,
                    "productId": order["productId"],
                    "quantity": order["quantity"],
                    "status": "Order Created",
                    "userId": user_id,
                })
            })
            .collect()
    });
    Json(json!({ "data": orders })).into_response()
}

async fn driver_orders(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(driver_id): Path<i64>,
) -> Response {
    if backend.identity(&headers).is_none() {
        return unauthorized();
    }
    if driver_id != DRIVER_ID {
        return Json(json!([])).into_response();
    }
    Json(json!([
        assigned_order(31, "Order Shipped"),
        assigned_order(32, "Order Delivered"),
    ]))
    .into_response()
}

async fn drivers(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if backend.identity(&headers).is_none() {
        return unauthorized();
    }
    Json(json!([{ "id": DRIVER_ID, "name": "Dee" }])).into_response()
}

async fn update_status(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if backend.identity(&headers).is_none() {
        return unauthorized();
    }
    backend.with_log(|log| log.status_updates.push((id, body)));
    ok("Status updated")
}

async fn mark_delivered(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if backend.identity(&headers).is_none() {
        return unauthorized();
    }
    backend.with_log(|log| log.delivered.push(id));
    ok("Order delivered")
}

async fn users(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if backend.identity(&headers).is_none() {
        return unauthorized();
    }
    let users: Vec<Value> = ACCOUNTS
        .iter()
        .map(|&(email, _, _, role, id, name)| {
            json!({ "id": id, "name": name, "email": email, "role": role })
        })
        .collect();
    Json(json!({ "data": users })).into_response()
}

async fn create_user(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if backend.identity(&headers).is_none() {
        return unauthorized();
    }
    backend.with_log(|log| log.created_users.push(body));
    (StatusCode::CREATED, Json(json!({ "message": "User created" }))).into_response()
}

async fn delete_user(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if backend.identity(&headers).is_none() {
        return unauthorized();
    }
    backend.with_log(|log| log.deleted_users.push(id));
    ok("User deleted")
}

fn backend_router(backend: Backend) -> Router {
    let api = Router::new()
        .route("/users/login", post(login))
        .route("/users/me", get(me))
        .route("/stocks", get(stocks).post(create_stock))
        .route("/orders", get(all_orders).post(create_order))
        .route("/orders/user/{id}", get(user_orders))
        .route("/orders/driver/{id}", get(driver_orders))
        .route("/orders/{id}/status", put(update_status))
        .route("/orders/mark-delivered/{id}", put(mark_delivered))
        .route("/drivers", get(drivers))
        .route("/admin/users", get(users).post(create_user))
        .route("/admin/users/{id}", delete(delete_user))
        .with_state(backend);
    Router::new().nest("/api", api)
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|e| panic!("bind test listener: {e}"));
    let addr = listener
        .local_addr()
        .unwrap_or_else(|e| panic!("test listener address: {e}"));
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            panic!("test server failed: {e}");
        }
    });
    addr
}

fn url(value: &str) -> Url {
    Url::parse(value).unwrap_or_else(|e| panic!("invalid test URL {value}: {e}"))
}

/// A running web client wired to a fake backend.
pub struct TestContext {
    /// Browser-like client: keeps cookies, does not follow redirects.
    pub client: reqwest::Client,
    /// Base URL of the web client.
    pub base_url: String,
    backend: Backend,
}

impl TestContext {
    /// Start the fake backend and the web client.
    pub async fn new() -> Self {
        Self::start(Backend::default()).await
    }

    /// Like [`TestContext::new`], but every `POST /orders` takes `delay`.
    pub async fn with_order_delay(delay: Duration) -> Self {
        Self::start(Backend {
            order_delay: delay,
            ..Backend::default()
        })
        .await
    }

    async fn start(backend: Backend) -> Self {
        let backend_addr = serve(backend_router(backend.clone())).await;

        let config = WebConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: url("http://localhost"),
            api: ApiConfig {
                base_url: url(&format!("http://{backend_addr}/api")),
                timeout: Duration::from_secs(5),
            },
            session_database_url: SecretString::from("sqlite::memory:"),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state = AppState::new(config).unwrap_or_else(|e| panic!("app state: {e}"));
        let app = routes::app(state, session_layer(MemoryStore::default(), false));
        let web_addr = serve(app).await;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|e| panic!("test client: {e}"));

        Self {
            client,
            base_url: format!("http://{web_addr}"),
            backend,
        }
    }

    /// Full URL for a web client path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET` a page.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .unwrap_or_else(|e| panic!("GET {path}: {e}"))
    }

    /// `GET` a page and return its body.
    pub async fn page(&self, path: &str) -> String {
        let response = self.get(path).await;
        assert_eq!(response.status(), 200, "GET {path}");
        response
            .text()
            .await
            .unwrap_or_else(|e| panic!("GET {path} body: {e}"))
    }

    /// `POST` a urlencoded form.
    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap_or_else(|e| panic!("POST {path}: {e}"))
    }

    /// `POST` a multipart form.
    pub async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .unwrap_or_else(|e| panic!("POST {path}: {e}"))
    }

    /// Log in through the login form.
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/login", &[("email", email), ("password", password)])
            .await
    }

    /// Make the backend refuse `token` from now on.
    pub fn revoke_token(&self, token: &str) {
        self.backend
            .revoked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.to_string());
    }

    /// Orders the fake backend received.
    #[must_use]
    pub fn placed_orders(&self) -> Vec<Value> {
        self.backend.with_log(|log| log.orders.clone())
    }

    /// Everything else the fake backend recorded.
    #[must_use]
    pub fn backend_log(&self) -> BackendLog {
        self.backend.with_log(|log| log.clone())
    }
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
