mod config;
mod request;

pub use config::*;
pub use request::*;
