use super::{json_pretty, EXIT_SUCCESS};
use strata_core::Engine;
use strata_schema::RequestContext;

pub fn run(engine: &Engine, ctx: &RequestContext, session: &str, json: bool) -> Result<u8, String> {
    let intent = engine
        .sessions()
        .deploy(session, ctx)
        .map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&intent)?);
    } else if intent.is_deletion() {
        println!(
            "session {session} submitted an empty topology; environment {} will be torn down",
            intent.environment_id
        );
    } else {
        println!(
            "session {session} is deploying to environment {}",
            intent.environment_id
        );
    }
    Ok(EXIT_SUCCESS)
}
