use std::env;
use secrecy::SecretString;

/// Generation service cap on uploaded study material, in bytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50_000_000;
pub const DEFAULT_HISTORY_PAGE_SIZE: usize = 15;

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub blob_base_url: String,
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub exams_collection: String,
    pub feedbacks_collection: String,
    pub chats_collection: String,
    pub snapshot_path: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub auth_jwt_secret: SecretString,
    pub max_upload_bytes: usize,
    pub history_page_size: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            blob_base_url: env::var("BLOB_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:9199/study-mentor".to_string()),
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "study-mentor-local".to_string()),
            exams_collection: env::var("EXAMS_COLLECTION").unwrap_or_else(|_| "exams".to_string()),
            feedbacks_collection: env::var("FEEDBACKS_COLLECTION")
                .unwrap_or_else(|_| "feedbacks".to_string()),
            chats_collection: env::var("CHATS_COLLECTION").unwrap_or_else(|_| "chats".to_string()),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .unwrap_or_else(|_| ".study-mentor/session.json".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            auth_jwt_secret: SecretString::from(
                env::var("AUTH_JWT_SECRET")
                    .unwrap_or_else(|_| "dev_secret_key_change_in_production".to_string()),
            ),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            history_page_size: env::var("HISTORY_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|size: &usize| *size > 0)
                .unwrap_or(DEFAULT_HISTORY_PAGE_SIZE),
        }
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let jwt_secret = self.auth_jwt_secret.expose_secret();

        if jwt_secret == "dev_secret_key_change_in_production" {
            panic!(
                "FATAL: AUTH_JWT_SECRET is using default value! Set AUTH_JWT_SECRET to the auth provider's signing secret."
            );
        }

        if jwt_secret.len() < 32 {
            panic!(
                "FATAL: AUTH_JWT_SECRET is too short ({}). Must be at least 32 characters.",
                jwt_secret.len()
            );
        }

        if !self.api_base_url.starts_with("https://") {
            panic!("FATAL: API_BASE_URL must use https in production.");
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            blob_base_url: "http://127.0.0.1:9199/bucket".to_string(),
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "study-mentor-test".to_string(),
            exams_collection: "exams".to_string(),
            feedbacks_collection: "feedbacks".to_string(),
            chats_collection: "chats".to_string(),
            snapshot_path: "target/test-session.json".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            auth_jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            history_page_size: DEFAULT_HISTORY_PAGE_SIZE,
        }
    }
}
