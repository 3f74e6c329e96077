use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// actix worker threads, `None` keeps actix's default of one per core
    pub workers: Option<usize>,
    /// Largest accepted `/git-upload-pack` request body, in bytes
    pub max_request_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5050,
            workers: None,
            max_request_bytes: 256 * 1024,
        }
    }
}

impl HttpConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
