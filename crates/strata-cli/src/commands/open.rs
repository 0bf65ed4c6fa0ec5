use super::{json_pretty, resolve_env_id, EXIT_SUCCESS};
use strata_core::Engine;
use strata_schema::RequestContext;

pub fn run(engine: &Engine, ctx: &RequestContext, env: &str, json: bool) -> Result<u8, String> {
    let resolved = resolve_env_id(engine, env, &ctx.tenant_id)?;
    let opened = engine
        .sessions()
        .create(&resolved, &ctx.user_id)
        .map_err(|e| e.to_string())?;
    if json {
        println!(
            "{}",
            json_pretty(&serde_json::json!({
                "id": opened.id,
                "environment_id": opened.environment_id,
                "version": opened.version,
                "state": opened.state,
            }))?
        );
    } else {
        println!(
            "opened session {} on {} at version {}",
            opened.id, opened.environment_id, opened.version
        );
    }
    Ok(EXIT_SUCCESS)
}
