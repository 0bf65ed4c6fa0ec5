use super::{json_pretty, short, EXIT_SUCCESS};
use strata_core::{DeploymentOutcome, Engine};

pub fn list(engine: &Engine, json: bool) -> Result<u8, String> {
    let pending = engine.tasks().list_pending().map_err(|e| e.to_string())?;
    if json {
        println!("{}", json_pretty(&pending)?);
    } else if pending.is_empty() {
        println!("no pending tasks");
    } else {
        println!(
            "{:<28} {:<8} {:<14} {:<14} QUEUED",
            "TASK", "ACTION", "ENVIRONMENT", "SESSION"
        );
        for task in &pending {
            println!(
                "{:<28} {:<8} {:<14} {:<14} {}",
                task.task_id,
                task.intent.action.as_deref().unwrap_or("delete"),
                short(&task.intent.environment_id),
                short(&task.intent.session_id),
                task.queued_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }
    Ok(EXIT_SUCCESS)
}

/// Report a task's outcome to its session, then drop it from the queue.
///
/// The task stays queued if the session refuses the outcome.
pub fn complete(engine: &Engine, task_id: &str, failed: bool, json: bool) -> Result<u8, String> {
    let queue = engine.tasks();
    let task = queue.get(task_id).map_err(|e| e.to_string())?;
    let outcome = if failed {
        DeploymentOutcome::Failed
    } else {
        DeploymentOutcome::Succeeded
    };

    let session = engine
        .sessions()
        .finish(&task.intent.session_id, outcome)
        .map_err(|e| e.to_string())?;
    queue.ack(task_id).map_err(|e| e.to_string())?;

    if json {
        println!(
            "{}",
            json_pretty(&serde_json::json!({
                "task_id": task.task_id,
                "session_id": session.id,
                "state": session.state,
            }))?
        );
    } else {
        println!("session {} is now {}", session.id, session.state);
    }
    Ok(EXIT_SUCCESS)
}
