use std::env;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Base URL the public reaches this service under; verification links
    /// in proof payloads are built from it.
    pub public_base_url: String,
    pub checkout_base_url: String,
    pub checkout_secret: String,
    /// Where the hosted checkout sends the buyer back to.
    pub checkout_return_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/koinonia".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            checkout_base_url: env::var("CHECKOUT_BASE_URL")
                .unwrap_or_else(|_| "https://api.checkout.invalid".to_string()),
            checkout_secret: env::var("CHECKOUT_SECRET").unwrap_or_default(),
            checkout_return_url: env::var("CHECKOUT_RETURN_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_falls_back_to_defaults() {
        let config = Config::from_env();
        assert!(!config.database_url.is_empty());
        assert!(config.public_base_url.starts_with("http"));
    }
}
