use super::{resolve_env_id, short, EXIT_SUCCESS};
use strata_core::Engine;
use strata_schema::RequestContext;

pub fn run(engine: &Engine, ctx: &RequestContext, env: &str, new_name: &str) -> Result<u8, String> {
    let resolved = resolve_env_id(engine, env, &ctx.tenant_id)?;
    engine
        .environments()
        .rename(&resolved, new_name)
        .map_err(|e| e.to_string())?;
    println!("renamed {} to '{new_name}'", short(&resolved));
    Ok(EXIT_SUCCESS)
}
