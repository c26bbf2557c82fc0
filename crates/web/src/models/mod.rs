//! Domain models for the web client.
//!
//! Types stored in the session and shared by the page templates.

pub mod chrome;
pub mod flash;
pub mod session;

pub use chrome::Chrome;
pub use flash::{Flash, FlashLevel};
pub use session::keys as session_keys;
