pub mod cli;
pub mod client;
pub mod crypto;
pub mod error;
pub mod models;
pub mod oauth;
pub mod server;
pub mod utils;
pub mod webhook;

pub use error::{Error, Result};
pub use models::*;

/// Default base URL of the Google Meet REST API
pub const DEFAULT_API_BASE_URL: &str = "https://meet.googleapis.com/v2";

/// Google OAuth2 authorization endpoint
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// Google OAuth2 token endpoint
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Package name, used as event prefix and in installation ids
pub const APP_NAME: &str = "googlemeet";

/// Path the webhook listener is mounted on
pub const WEBHOOK_PATH: &str = "/googlemeet";
