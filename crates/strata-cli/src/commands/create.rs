use super::{json_pretty, EXIT_SUCCESS};
use strata_core::Engine;
use strata_schema::RequestContext;

pub fn run(engine: &Engine, ctx: &RequestContext, name: &str, json: bool) -> Result<u8, String> {
    let env = engine
        .environments()
        .create(name, ctx)
        .map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&env)?);
    } else {
        println!("created environment '{}' ({})", env.name, env.id);
    }
    Ok(EXIT_SUCCESS)
}
