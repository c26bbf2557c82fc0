//! Admin route handlers: dashboard, user management and read-only listings.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use ldms_core::{Role, UserId};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::instrument;

use super::auth::parse_role;
use super::{action_result, page_data, redirect_with};
use crate::api::{NewUser, Order, SummaryRow, Transport, User, UserUpdate, summary_rows};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Chrome, Flash};
use crate::state::AppState;

const USERS_PATH: &str = "/admin/users";

// =============================================================================
// Form Types
// =============================================================================

/// Create or update user form data.
///
/// On update a blank password keeps the current one.
#[derive(Debug, Deserialize)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: String,
}

impl UserForm {
    /// Check the fields every user needs and resolve the role.
    fn validate(&self) -> std::result::Result<Role, String> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err("Name and email are required.".to_string());
        }
        parse_role(&self.role)
    }

    fn into_update(self, role: Role) -> UserUpdate {
        UserUpdate {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: (!self.password.is_empty()).then(|| SecretString::from(self.password)),
            role,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub chrome: Chrome,
    pub users: usize,
    pub orders: usize,
    pub transports: usize,
    pub rows: Vec<SummaryRow>,
}

/// User management template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct UsersTemplate {
    pub chrome: Chrome,
    pub users: Vec<User>,
    pub roles: [Role; 4],
}

/// All orders template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct OrdersTemplate {
    pub chrome: Chrome,
    pub orders: Vec<Order>,
}

/// Transports template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/transports.html")]
pub struct TransportsTemplate {
    pub chrome: Chrome,
    pub transports: Vec<Transport>,
}

/// Reports template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/reports.html")]
pub struct ReportsTemplate {
    pub chrome: Chrome,
    pub rows: Vec<SummaryRow>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the admin dashboard.
#[instrument(skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
) -> Result<impl IntoResponse> {
    let token = &auth.user.token;
    let (data, users, orders, transports) = tokio::join!(
        state.api().dashboard_data(token),
        state.api().list_users(token),
        state.api().admin_orders(token),
        state.api().list_transports(token),
    );
    let data = page_data(&state, &auth.session, data).await?;
    let users = page_data(&state, &auth.session, users).await?;
    let orders = page_data(&state, &auth.session, orders).await?;
    let transports = page_data(&state, &auth.session, transports).await?;

    Ok(DashboardTemplate {
        users: users.len(),
        orders: orders.len(),
        transports: transports.len(),
        rows: summary_rows(&data),
        chrome: auth.chrome().await,
    })
}

/// Display the user list with create and edit forms.
#[instrument(skip_all)]
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
) -> Result<impl IntoResponse> {
    let users = page_data(
        &state,
        &auth.session,
        state.api().list_users(&auth.user.token).await,
    )
    .await?;

    Ok(UsersTemplate {
        users,
        roles: Role::ALL,
        chrome: auth.chrome().await,
    })
}

/// Create a user.
#[instrument(skip_all, fields(role = %form.role))]
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Form(form): Form<UserForm>,
) -> Response {
    let checked = form.validate().and_then(|role| {
        if form.password.is_empty() {
            Err("Password is required.".to_string())
        } else {
            Ok(role)
        }
    });
    let role = match checked {
        Ok(role) => role,
        Err(message) => {
            return redirect_with(&auth.session, Flash::error(message), USERS_PATH).await;
        }
    };

    let user = NewUser {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        password: SecretString::from(form.password),
        role,
    };
    let result = state.api().create_user(&auth.user.token, &user).await;
    action_result(
        &state,
        &auth.session,
        result,
        &format!("Created {}.", user.name),
        USERS_PATH,
    )
    .await
}

/// Update a user.
#[instrument(skip_all, fields(target_user_id = %id, role = %form.role))]
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<UserId>,
    Form(form): Form<UserForm>,
) -> Response {
    let role = match form.validate() {
        Ok(role) => role,
        Err(message) => {
            return redirect_with(&auth.session, Flash::error(message), USERS_PATH).await;
        }
    };

    let update = form.into_update(role);
    let result = state.api().update_user(&auth.user.token, id, &update).await;
    action_result(
        &state,
        &auth.session,
        result,
        &format!("Updated {}.", update.name),
        USERS_PATH,
    )
    .await
}

/// Delete a user. Admins cannot delete themselves.
#[instrument(skip_all, fields(target_user_id = %id))]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<UserId>,
) -> Response {
    if id == auth.user.id {
        return redirect_with(
            &auth.session,
            Flash::error("You cannot delete your own account."),
            USERS_PATH,
        )
        .await;
    }

    let result = state.api().delete_user(&auth.user.token, id).await;
    action_result(&state, &auth.session, result, "User deleted.", USERS_PATH).await
}

/// Display every order.
#[instrument(skip_all)]
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
) -> Result<impl IntoResponse> {
    let orders = page_data(
        &state,
        &auth.session,
        state.api().admin_orders(&auth.user.token).await,
    )
    .await?;

    Ok(OrdersTemplate {
        orders,
        chrome: auth.chrome().await,
    })
}

/// Display transports.
#[instrument(skip_all)]
pub async fn transports(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
) -> Result<impl IntoResponse> {
    let transports = page_data(
        &state,
        &auth.session,
        state.api().list_transports(&auth.user.token).await,
    )
    .await?;

    Ok(TransportsTemplate {
        transports,
        chrome: auth.chrome().await,
    })
}

/// Display backend reports.
#[instrument(skip_all)]
pub async fn reports(
    State(state): State<AppState>,
    RequireAdmin(auth): RequireAdmin,
) -> Result<impl IntoResponse> {
    let data = page_data(
        &state,
        &auth.session,
        state.api().reports(&auth.user.token).await,
    )
    .await?;

    Ok(ReportsTemplate {
        rows: summary_rows(&data),
        chrome: auth.chrome().await,
    })
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn form(password: &str) -> UserForm {
        UserForm {
            name: " Ann ".to_string(),
            email: "ann@example.com".to_string(),
            password: password.to_string(),
            role: "driver".to_string(),
        }
    }

    #[test]
    fn test_blank_password_keeps_current_one() {
        let update = form("").into_update(Role::Driver);
        assert!(update.password.is_none());
        assert_eq!(update.name, "Ann");
        assert_eq!(update.role, Role::Driver);
    }

    #[test]
    fn test_new_password_is_sent() {
        let update = form("s3cret").into_update(Role::Driver);
        assert_eq!(
            update.password.as_ref().map(|p| p.expose_secret().to_string()),
            Some("s3cret".to_string())
        );
    }

    #[test]
    fn test_user_form_validation() {
        assert_eq!(form("").validate(), Ok(Role::Driver));

        let unknown_role = UserForm {
            role: "owner".to_string(),
            ..form("")
        };
        assert_eq!(
            unknown_role.validate(),
            Err("Role 'owner' is not recognized.".to_string())
        );

        let no_email = UserForm {
            email: " ".to_string(),
            ..form("x")
        };
        assert_eq!(no_email.validate(), Err("Name and email are required.".to_string()));
    }
}
