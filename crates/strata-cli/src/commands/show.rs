use super::{colorize_state, json_pretty, resolve_env_id, EXIT_SUCCESS};
use strata_core::Engine;
use strata_schema::RequestContext;

pub fn run(engine: &Engine, ctx: &RequestContext, env: &str, json: bool) -> Result<u8, String> {
    let resolved = resolve_env_id(engine, env, &ctx.tenant_id)?;
    let record = engine
        .environments()
        .get(&resolved, ctx)
        .map_err(|e| e.to_string())?;
    let status = engine
        .environments()
        .status(&resolved)
        .map_err(|e| e.to_string())?;

    if json {
        let mut value = serde_json::to_value(&record)
            .map_err(|e| format!("JSON serialization failed: {e}"))?;
        value["status"] = serde_json::Value::String(status.to_string());
        println!("{}", json_pretty(&value)?);
    } else {
        println!("id:          {}", record.id);
        println!("name:        {}", record.name);
        println!("tenant:      {}", record.tenant_id);
        println!("version:     {}", record.version);
        println!("status:      {}", colorize_state(&status.to_string()));
        println!(
            "committed:   {}",
            record.committed_session.as_deref().unwrap_or("(none)")
        );
        println!("created_at:  {}", record.created_at);
        println!("updated_at:  {}", record.updated_at);
    }
    Ok(EXIT_SUCCESS)
}
