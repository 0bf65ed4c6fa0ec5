use super::{colorize_state, json_pretty, EXIT_SUCCESS};
use strata_core::Engine;
use strata_schema::RequestContext;

pub fn run(engine: &Engine, ctx: &RequestContext, session: &str, json: bool) -> Result<u8, String> {
    let record = engine
        .sessions()
        .get(session, ctx)
        .map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&record)?);
        return Ok(EXIT_SUCCESS);
    }

    let valid = engine
        .sessions()
        .validate(&record)
        .map_err(|e| e.to_string())?;
    println!("id:           {}", record.id);
    println!("environment:  {}", record.environment_id);
    println!("user:         {}", record.user_id);
    println!("version:      {}", record.version);
    println!("state:        {}", colorize_state(record.state.as_str()));
    println!("deployable:   {}", if valid { "yes" } else { "no" });
    println!("created_at:   {}", record.created_at);
    println!("updated:      {}", record.updated);
    println!("draft:        {}", json_pretty(&record.description)?);
    Ok(EXIT_SUCCESS)
}
