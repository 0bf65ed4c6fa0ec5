use crate::config::StrataConfig;
use crate::deployment::DeploymentSubmitter;
use crate::environments::EnvironmentService;
use crate::payload::{PayloadAdapter, SecretStore};
use crate::sessions::SessionService;
use crate::CoreError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strata_store::{SecretVault, Storage, StoreLayout, TaskQueue};
use tracing::debug;

/// Entry point wiring storage, payload encryption, and deployment submission
/// into the session and environment services.
pub struct Engine {
    layout: StoreLayout,
    sessions: Arc<SessionService>,
    environments: EnvironmentService,
    encrypt_data: bool,
}

impl Engine {
    /// Open (and initialize if needed) the store at `root` with the bundled
    /// collaborators: the on-disk secret vault and the task queue.
    pub fn open(root: impl Into<PathBuf>, config: &StrataConfig) -> Result<Self, CoreError> {
        let layout = StoreLayout::new(root);
        let vault = SecretVault::open(&layout)?;
        let queue = TaskQueue::new(&layout);
        Self::with_collaborators(layout.root(), config, Arc::new(vault), Arc::new(queue))
    }

    /// Open the store at `root` using caller-supplied collaborators.
    pub fn with_collaborators(
        root: &Path,
        config: &StrataConfig,
        secrets: Arc<dyn SecretStore>,
        submitter: Arc<dyn DeploymentSubmitter>,
    ) -> Result<Self, CoreError> {
        let layout = StoreLayout::new(root);
        layout.initialize()?;
        let storage = Arc::new(Storage::new(layout.clone()));
        let payloads = Arc::new(PayloadAdapter::new(config.encrypt_data, secrets));
        let sessions = Arc::new(SessionService::new(
            storage.clone(),
            payloads.clone(),
            submitter.clone(),
        ));
        let environments = EnvironmentService::new(storage, payloads, submitter, sessions.clone());
        debug!(
            "opened store at {} (encrypt_data={})",
            root.display(),
            config.encrypt_data
        );
        Ok(Self {
            layout,
            sessions,
            environments,
            encrypt_data: config.encrypt_data,
        })
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    pub fn environments(&self) -> &EnvironmentService {
        &self.environments
    }

    /// The durable queue of submitted intents in this store.
    pub fn tasks(&self) -> TaskQueue {
        TaskQueue::new(&self.layout)
    }

    pub fn store_layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn encrypt_data(&self) -> bool {
        self.encrypt_data
    }
}
