//! HTTP route handlers for the web client.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Landing page
//! GET  /health                         - Liveness check
//! GET  /static/*                       - Stylesheet
//!
//! # Auth
//! GET  /login                          - Login page
//! POST /login                          - Login action
//! GET  /register                       - Register page
//! POST /register                       - Register action
//! POST /logout                         - Logout action
//!
//! # Client
//! GET  /client                         - Dashboard
//! GET  /client/products                - Browse stock
//! GET  /client/cart                    - Cart
//! POST /client/cart/add                - Add a line
//! POST /client/cart/remove             - Remove a line
//! POST /client/cart/checkout           - Place one order per line
//! GET  /client/orders                  - My orders
//! GET  /client/orders/{id}             - Order tracking
//! POST /client/orders/{id}/cancel      - Cancel an order
//! GET  /client/feedback                - Feedback form
//! POST /client/feedback                - Submit feedback
//!
//! # Stock manager
//! GET  /stock-manager                  - Stock summary
//! GET  /stock-manager/stocks           - Stock list and forms
//! POST /stock-manager/stocks           - Create stock (multipart)
//! POST /stock-manager/stocks/{id}      - Update stock (multipart)
//! POST /stock-manager/stocks/{id}/delete
//! GET  /stock-manager/orders           - Order management
//! POST /stock-manager/orders/{id}/accept
//! POST /stock-manager/orders/{id}/status
//! POST /stock-manager/orders/{id}/assign
//! POST /stock-manager/orders/{id}/delete
//!
//! # Driver
//! GET  /driver                         - Assigned deliveries
//! POST /driver/orders/{id}/delivered   - Mark delivered
//!
//! # Admin
//! GET  /admin                          - Dashboard
//! GET  /admin/users                    - User management
//! POST /admin/users                    - Create user
//! POST /admin/users/{id}               - Update user
//! POST /admin/users/{id}/delete        - Delete user
//! GET  /admin/orders                   - All orders
//! GET  /admin/transports               - Transports
//! GET  /admin/reports                  - Reports
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod client;
pub mod driver;
pub mod home;
pub mod stock_manager;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    middleware::from_fn,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use ldms_core::LOGIN_PATH;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{Session, SessionManagerLayer, SessionStore};

use crate::api::ApiError;
use crate::error::AppError;
use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::models::{Flash, flash};
use crate::state::AppState;

/// Largest accepted request body; stock forms carry an image.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Shown when the backend stops accepting the token mid-visit.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Create the client routes router.
pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(client::dashboard))
        .route("/products", get(client::products))
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/checkout", post(cart::checkout))
        .route("/orders", get(client::orders))
        .route("/orders/{id}", get(client::track))
        .route("/orders/{id}/cancel", post(client::cancel))
        .route(
            "/feedback",
            get(client::feedback_page).post(client::submit_feedback),
        )
}

/// Create the stock manager routes router.
pub fn stock_manager_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stock_manager::dashboard))
        .route(
            "/stocks",
            get(stock_manager::stocks).post(stock_manager::create_stock),
        )
        .route("/stocks/{id}", post(stock_manager::update_stock))
        .route("/stocks/{id}/delete", post(stock_manager::delete_stock))
        .route("/orders", get(stock_manager::orders))
        .route("/orders/{id}/accept", post(stock_manager::accept_order))
        .route("/orders/{id}/status", post(stock_manager::update_status))
        .route("/orders/{id}/assign", post(stock_manager::assign_driver))
        .route("/orders/{id}/delete", post(stock_manager::delete_order))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// Create the driver routes router.
pub fn driver_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(driver::dashboard))
        .route("/orders/{id}/delivered", post(driver::mark_delivered))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/users", get(admin::users).post(admin::create_user))
        .route("/users/{id}", post(admin::update_user))
        .route("/users/{id}/delete", post(admin::delete_user))
        .route("/orders", get(admin::orders))
        .route("/transports", get(admin::transports))
        .route("/reports", get(admin::reports))
}

/// Create all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .nest("/client", client_routes())
        .nest("/stock-manager", stock_manager_routes())
        .nest("/driver", driver_routes())
        .nest("/admin", admin_routes())
}

/// Build the complete application over any session store.
///
/// `main` passes the `SQLite` store; tests pass an in-memory one.
pub fn app<S: SessionStore + Clone>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router {
    let static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

    // Outermost first
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = tracing::field::Empty,
            )
        }))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(session_layer);

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(middleware)
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Unwrap backend data for a page.
///
/// An `Unauthorized` answer ends the session and sends the visitor to the
/// login page. Any other failure becomes a notification and the page renders
/// with empty data.
pub(crate) async fn page_data<T: Default>(
    state: &AppState,
    session: &Session,
    result: Result<T, ApiError>,
) -> Result<T, AppError> {
    match result {
        Ok(data) => Ok(data),
        Err(ApiError::Unauthorized) => {
            state.sessions().forget(session).await;
            flash::push(session, Flash::info(SESSION_EXPIRED_MESSAGE)).await;
            Err(AppError::SessionExpired)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Page data unavailable");
            flash::push(session, Flash::error(e.user_message())).await;
            Ok(T::default())
        }
    }
}

/// Respond to a failed user action.
///
/// `Unauthorized` ends the session; anything else is shown as a
/// notification on `back_to`.
pub(crate) async fn action_failed(
    state: &AppState,
    session: &Session,
    err: &ApiError,
    back_to: &str,
) -> Response {
    if err.is_unauthorized() {
        state.sessions().forget(session).await;
        flash::push(session, Flash::info(SESSION_EXPIRED_MESSAGE)).await;
        return Redirect::to(LOGIN_PATH).into_response();
    }

    tracing::warn!(error = %err, "Action failed");
    flash::push(session, Flash::error(err.user_message())).await;
    Redirect::to(back_to).into_response()
}

/// Notify and redirect after an action.
pub(crate) async fn redirect_with(session: &Session, notice: Flash, to: &str) -> Response {
    flash::push(session, notice).await;
    Redirect::to(to).into_response()
}

/// Finish an action: success notice, or the failure handling above.
pub(crate) async fn action_result(
    state: &AppState,
    session: &Session,
    result: Result<(), ApiError>,
    success: &str,
    back_to: &str,
) -> Response {
    match result {
        Ok(()) => redirect_with(session, Flash::success(success), back_to).await,
        Err(e) => action_failed(state, session, &e, back_to).await,
    }
}
