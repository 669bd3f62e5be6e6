use crate::config::{GradingSettings, SettingsPatch};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn settings_json(req: &Request, settings: &GradingSettings) -> serde_json::Value {
    match serde_json::to_value(settings) {
        Ok(v) => ok(&req.id, json!({ "settings": v })),
        Err(e) => err(&req.id, "internal", e.to_string(), None),
    }
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    settings_json(req, &state.settings)
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(raw) = req.params.get("patch") else {
        return err(&req.id, "bad_params", "missing params.patch", None);
    };
    let patch: SettingsPatch = match serde_json::from_value(raw.clone()) {
        Ok(p) => p,
        Err(e) => return err(&req.id, "bad_params", format!("patch: {}", e), None),
    };
    state.settings.apply(patch);
    tracing::info!(
        core_subjects = state.settings.core_subjects.len(),
        staff = state.settings.staff_list.len(),
        "session settings updated"
    );
    settings_json(req, &state.settings)
}

fn handle_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.settings = GradingSettings::default();
    settings_json(req, &state.settings)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "settings.get" => Some(handle_get(state, req)),
        "settings.update" => Some(handle_update(state, req)),
        "settings.reset" => Some(handle_reset(state, req)),
        _ => None,
    }
}
