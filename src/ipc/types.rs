use crate::config::GradingSettings;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Session state held for the life of the process.
#[derive(Debug, Default)]
pub struct AppState {
    pub settings: GradingSettings,
}
