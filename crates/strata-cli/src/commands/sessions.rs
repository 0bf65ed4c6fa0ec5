use super::{colorize_state, json_pretty, resolve_env_id, short, EXIT_SUCCESS};
use strata_core::Engine;
use strata_schema::{RequestContext, SessionState};

pub fn run(
    engine: &Engine,
    ctx: &RequestContext,
    env: &str,
    state: Option<SessionState>,
    json: bool,
) -> Result<u8, String> {
    let resolved = resolve_env_id(engine, env, &ctx.tenant_id)?;
    let sessions = engine
        .sessions()
        .list(&resolved, state, ctx)
        .map_err(|e| e.to_string())?;

    if json {
        println!("{}", json_pretty(&sessions)?);
    } else if sessions.is_empty() {
        println!("no sessions found");
    } else {
        println!(
            "{:<34} {:<12} {:<8} {:<16} UPDATED",
            "ID", "USER", "VERSION", "STATE"
        );
        for s in &sessions {
            println!(
                "{:<34} {:<12} {:<8} {:<16} {}",
                s.id,
                short(&s.user_id),
                s.version,
                colorize_state(s.state.as_str()),
                s.updated.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
