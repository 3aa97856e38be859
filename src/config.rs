use dotenvy::dotenv;
use std::env;

/// Runtime configuration, loaded once from the environment and passed
/// explicitly to the services that need it. Every knob has a local default so
/// the server can come up on a development machine with an empty environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    /// Base URL used to build verification links ({base_url}/verify/{code}).
    pub base_url: String,
    /// Root directory for stored documents (convocations/, acceptances/, uploads/).
    pub storage_root: String,
    /// Directory holding the {family}-{style}.ttf files used by the renderer.
    pub fonts_dir: String,
    /// Company logo; the renderer falls back to a text header when absent.
    pub logo_path: String,
    pub render_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_address: get_env_or("SERVER_ADDRESS", "127.0.0.1:5000"),
            database_url: get_env_or("DATABASE_URL", "sqlite://recruitment.db"),
            base_url: get_env_or("BASE_URL", "http://localhost:5000"),
            storage_root: get_env_or("STORAGE_ROOT", "storage"),
            fonts_dir: get_env_or("FONTS_DIR", "assets/fonts"),
            logo_path: get_env_or("LOGO_PATH", "assets/img/logo.jpeg"),
            render_timeout_secs: get_env_or("RENDER_TIMEOUT_SECS", "30")
                .parse()
                .unwrap_or(30),
        }
    }
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}
