//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::middleware::Visitor;
use crate::models::Chrome;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub chrome: Chrome,
    /// Where "Go to dashboard" points for a logged-in visitor.
    pub dashboard: Option<&'static str>,
}

/// Display the landing page.
pub async fn home(visitor: Visitor) -> impl IntoResponse {
    HomeTemplate {
        dashboard: visitor.user.as_ref().map(|u| u.role.dashboard_path()),
        chrome: visitor.chrome().await,
    }
}
