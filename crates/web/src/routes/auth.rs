//! Authentication route handlers.
//!
//! Login, registration and logout. Failures are reported as notifications
//! on the form page they came from.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use ldms_core::{LOGIN_PATH, Role};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use super::redirect_with;
use crate::api::{Credentials, NewUser};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::Visitor;
use crate::models::{Chrome, Flash};
use crate::state::AppState;

const REGISTER_PATH: &str = "/register";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl RegisterForm {
    /// Check for blank fields and resolve the chosen role before calling the
    /// backend.
    fn validate(&self) -> Result<Role, String> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err("Name and email are required.".to_string());
        }
        if self.password.is_empty() {
            return Err("Password is required.".to_string());
        }
        parse_role(&self.role)
    }
}

/// Resolve a role submitted through a form.
pub(crate) fn parse_role(value: &str) -> Result<Role, String> {
    value
        .parse()
        .map_err(|_| format!("Role '{value}' is not recognized."))
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub chrome: Chrome,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub chrome: Chrome,
    pub roles: [Role; 4],
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page, or skip it for a visitor who is logged in.
pub async fn login_page(visitor: Visitor) -> Response {
    if let Some(user) = &visitor.user {
        return Redirect::to(user.role.dashboard_path()).into_response();
    }
    LoginTemplate {
        chrome: visitor.chrome().await,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, visitor, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<LoginForm>,
) -> Response {
    let credentials = Credentials {
        email: form.email.trim().to_string(),
        password: SecretString::from(form.password),
    };

    match state.sessions().login(&visitor.session, &credentials).await {
        Ok(user) => {
            set_sentry_user(user.id, user.role);
            add_breadcrumb("auth", "Logged in", Some(&[("role", user.role.as_str())]));
            Redirect::to(user.role.dashboard_path()).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            redirect_with(&visitor.session, Flash::error(e.user_message()), LOGIN_PATH).await
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(visitor: Visitor) -> impl IntoResponse {
    RegisterTemplate {
        chrome: visitor.chrome().await,
        roles: Role::ALL,
    }
}

/// Handle registration form submission.
#[instrument(skip(state, visitor, form), fields(email = %form.email, role = %form.role))]
pub async fn register(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<RegisterForm>,
) -> Response {
    let role = match form.validate() {
        Ok(role) => role,
        Err(message) => {
            return redirect_with(&visitor.session, Flash::error(message), REGISTER_PATH).await;
        }
    };

    let user = NewUser {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        password: SecretString::from(form.password),
        role,
    };

    match state.api().register(&user).await {
        Ok(()) => {
            tracing::info!("Account registered");
            redirect_with(
                &visitor.session,
                Flash::success("Registration successful. Please log in."),
                LOGIN_PATH,
            )
            .await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            redirect_with(&visitor.session, Flash::error(e.user_message()), REGISTER_PATH).await
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Log out and return to the login page.
#[instrument(skip(state, visitor))]
pub async fn logout(State(state): State<AppState>, visitor: Visitor) -> Response {
    state.sessions().logout(&visitor.session).await;
    clear_sentry_user();
    redirect_with(
        &visitor.session,
        Flash::info("You have been logged out."),
        LOGIN_PATH,
    )
    .await
}
