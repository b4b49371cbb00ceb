pub mod models;
pub mod error;
pub mod json;
pub mod catalog;
pub mod request;  // Draft -> dispatchable request
pub mod engine;
pub mod history;
pub mod auth;
pub mod copilot;
pub mod curl;
pub mod config;
pub mod session;
pub mod console;
pub mod reporting;

// Re-export commonly used items
pub use models::*;
pub use error::*;
pub use json::*;
pub use catalog::*;
pub use request::*;  // Re-exports all request construction functionality
pub use engine::*;
pub use history::*;
pub use auth::*;
pub use copilot::*;
pub use curl::*;
pub use config::*;
pub use session::*;
pub use console::*;
pub use reporting::*;
