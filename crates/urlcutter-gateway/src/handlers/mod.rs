mod health;
mod url;

pub use health::health_handler;
pub use url::{create_method_not_allowed, create_url_handler, redirect_handler};
