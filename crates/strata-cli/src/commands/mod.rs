pub mod create;
pub mod decommission;
pub mod deploy;
pub mod describe;
pub mod discard;
pub mod edit;
pub mod inspect;
pub mod list;
pub mod open;
pub mod rename;
pub mod sessions;
pub mod show;
pub mod status;
pub mod tasks;

use strata_core::Engine;
use strata_schema::TenantId;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFLICT: u8 = 2;
pub const EXIT_STORE_ERROR: u8 = 3;
pub const EXIT_NOT_FOUND: u8 = 4;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Colour an environment status or a session state for terminal output.
pub fn colorize_state(state: &str) -> String {
    use console::Style;
    match state {
        "ready" | "deployed" => Style::new().green().apply_to(state).to_string(),
        "deploying" | "deleting" => Style::new().cyan().bold().apply_to(state).to_string(),
        "pending" | "opened" => Style::new().yellow().apply_to(state).to_string(),
        "deploy_failure" | "delete_failure" => Style::new().red().apply_to(state).to_string(),
        "deleted" => Style::new().dim().apply_to(state).to_string(),
        other => other.to_owned(),
    }
}

/// Resolve an environment of `tenant` by exact id, name, or unique id prefix.
pub fn resolve_env_id(engine: &Engine, input: &str, tenant: &TenantId) -> Result<String, String> {
    let envs = engine
        .environments()
        .list(Some(tenant))
        .map_err(|e| e.to_string())?;

    if let Some(e) = envs.iter().find(|e| *e.id == *input || e.name == input) {
        return Ok(e.id.to_string());
    }

    let matches: Vec<_> = envs.iter().filter(|e| e.id.starts_with(input)).collect();
    match matches.len() {
        0 => Err(format!("no environment matching '{input}'")),
        1 => Ok(matches[0].id.to_string()),
        n => Err(format!(
            "ambiguous environment prefix '{input}': matches {n} environments"
        )),
    }
}

/// First 12 characters of an id, for tables.
pub fn short(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
