use super::{json_pretty, resolve_env_id, EXIT_SUCCESS};
use strata_core::Engine;
use strata_schema::RequestContext;

pub fn run(engine: &Engine, ctx: &RequestContext, env: &str, json: bool) -> Result<u8, String> {
    let resolved = resolve_env_id(engine, env, &ctx.tenant_id)?;
    let intent = engine
        .environments()
        .delete(&resolved, ctx)
        .map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&intent)?);
    } else {
        println!(
            "deletion of {resolved} submitted (session {})",
            intent.session_id
        );
    }
    Ok(EXIT_SUCCESS)
}
