use super::{colorize_state, json_pretty, resolve_env_id, EXIT_SUCCESS};
use strata_core::Engine;
use strata_schema::RequestContext;

pub fn run(engine: &Engine, ctx: &RequestContext, env: &str, json: bool) -> Result<u8, String> {
    let resolved = resolve_env_id(engine, env, &ctx.tenant_id)?;
    let status = engine
        .environments()
        .status(&resolved)
        .map_err(|e| e.to_string())?;
    if json {
        println!(
            "{}",
            json_pretty(&serde_json::json!({ "id": resolved, "status": status }))?
        );
    } else {
        println!("{}", colorize_state(&status.to_string()));
    }
    Ok(EXIT_SUCCESS)
}
