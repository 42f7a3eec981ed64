use std::{
    env,
    path::{Path, PathBuf},
    sync::Arc,
};

use kb_index::KbStore;
use tracing::info;
use triage_core::{TriageConfig, TriageService};

use crate::error_handler::AppResult;

pub const DEFAULT_KB_PATH: &str = "kb/known_issues.json";

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// Triage pipeline; owns the KB store and the model gateway.
    pub triage: TriageService,
    /// KB file re-read by `POST /kb/reload`.
    pub kb_path: PathBuf,
}

impl AppState {
    pub fn new(triage: TriageService, kb_path: PathBuf) -> Self {
        Self { triage, kb_path }
    }

    /// Load shared state from environment variables and the KB file.
    ///
    /// A missing KB file leaves the index empty; an unreadable or malformed
    /// one is a startup error.
    pub fn from_env() -> AppResult<Self> {
        let cfg = TriageConfig::from_env()?;
        let kb_path = env::var("KB_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_KB_PATH), PathBuf::from);

        let kb = Arc::new(KbStore::new());
        load_kb(&kb, &kb_path)?;

        let triage = TriageService::from_config(&cfg, kb);
        Ok(Self::new(triage, kb_path))
    }

    pub fn kb(&self) -> &KbStore {
        self.triage.kb()
    }
}

fn load_kb(kb: &KbStore, path: &Path) -> AppResult<()> {
    match kb.load_from_path(path)? {
        Some(n) => info!(path = %path.display(), records = n, "KB loaded"),
        None => info!(path = %path.display(), "no KB file, starting with an empty index"),
    }
    Ok(())
}
