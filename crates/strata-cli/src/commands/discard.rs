use super::EXIT_SUCCESS;
use strata_core::Engine;

pub fn run(engine: &Engine, session: &str) -> Result<u8, String> {
    engine
        .sessions()
        .delete(session)
        .map_err(|e| e.to_string())?;
    println!("deleted session {session}");
    Ok(EXIT_SUCCESS)
}
