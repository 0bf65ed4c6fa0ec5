use super::{json_pretty, resolve_env_id, EXIT_SUCCESS};
use strata_core::{DescriptionView, Engine};
use strata_schema::RequestContext;

/// Print a description document. Always JSON.
pub fn run(
    engine: &Engine,
    ctx: &RequestContext,
    env: &str,
    session: Option<&str>,
    outer: bool,
) -> Result<u8, String> {
    let resolved = resolve_env_id(engine, env, &ctx.tenant_id)?;
    let view = if outer {
        DescriptionView::Outer
    } else {
        DescriptionView::Inner
    };
    let description = engine
        .environments()
        .description(&resolved, session, view, ctx)
        .map_err(|e| e.to_string())?;
    println!("{}", json_pretty(&description)?);
    Ok(EXIT_SUCCESS)
}
