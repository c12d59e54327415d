use crate::config::Config;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything a handler may read besides the request itself. Requests carry
/// their own data snapshots, so nothing here changes between calls.
pub struct AppState {
    pub config: Config,
}
