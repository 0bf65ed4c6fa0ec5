use crate::layout::StoreLayout;
use crate::{write_atomic, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use strata_schema::{DeploymentIntent, RequestContext, TaskId};
use tracing::{debug, warn};
use uuid::Uuid;

/// A deployment intent waiting for the orchestration engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedTask {
    pub task_id: TaskId,
    pub intent: DeploymentIntent,
    pub context: RequestContext,
    pub queued_at: DateTime<Utc>,
}

/// Durable hand-off queue for deployment intents.
///
/// Each task is one JSON file under `tasks/`. A task stays pending until it
/// is acknowledged, so intents survive restarts of the submitting process.
pub struct TaskQueue {
    dir: PathBuf,
}

impl TaskQueue {
    pub fn new(layout: &StoreLayout) -> Self {
        Self {
            dir: layout.tasks_dir(),
        }
    }

    fn task_path(&self, task_id: &str) -> PathBuf {
        self.dir.join(format!("{task_id}.json"))
    }

    pub fn enqueue(
        &self,
        intent: DeploymentIntent,
        context: RequestContext,
    ) -> Result<QueuedTask, StoreError> {
        let now = Utc::now();
        let task_id = TaskId::new(format!(
            "{}-{}",
            now.format("%Y%m%d%H%M%S%3f"),
            &Uuid::new_v4().simple().to_string()[..8]
        ));
        let task = QueuedTask {
            task_id,
            intent,
            context,
            queued_at: now,
        };
        let content = serde_json::to_string_pretty(&task)?;
        write_atomic(&self.dir, &self.task_path(&task.task_id), content.as_bytes())?;
        debug!(
            "queued task {} for session {}",
            task.task_id, task.intent.session_id
        );
        Ok(task)
    }

    pub fn get(&self, task_id: &str) -> Result<QueuedTask, StoreError> {
        let path = self.task_path(task_id);
        if !path.exists() {
            return Err(StoreError::TaskNotFound(task_id.to_owned()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Pending tasks, oldest first. Unreadable entries are skipped with a warning.
    pub fn list_pending(&self) -> Result<Vec<QueuedTask>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut tasks = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            match fs::read_to_string(&path)
                .map_err(StoreError::from)
                .and_then(|c| serde_json::from_str::<QueuedTask>(&c).map_err(StoreError::from))
            {
                Ok(task) => tasks.push(task),
                Err(e) => warn!("skipping unreadable task {}: {e}", path.display()),
            }
        }
        tasks.sort_by(|a, b| {
            a.queued_at
                .cmp(&b.queued_at)
                .then(a.task_id.cmp(&b.task_id))
        });
        Ok(tasks)
    }

    /// Drop a task once it has been handled. Acknowledging twice is harmless.
    pub fn ack(&self, task_id: &str) -> Result<bool, StoreError> {
        let path = self.task_path(task_id);
        if path.exists() {
            fs::remove_file(path)?;
            debug!("acknowledged task {task_id}");
            return Ok(true);
        }
        Ok(false)
    }
}
