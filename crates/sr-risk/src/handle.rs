//! Shared, load-once access to the risk model.
//!
//! A [`ModelHandle`] is built at startup and handed to the planner.  The
//! first caller of [`get`](ModelHandle::get) runs the loader; concurrent
//! first callers block until it finishes and then share the result.  The
//! outcome is fixed for the life of the handle: a successful load is shared
//! read-only, and a failed load is reported as
//! [`RiskError::ModelUnavailable`] on every later call until the process is
//! restarted with a working artifact.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tracing::{error, info};

use crate::{LogisticRiskModel, RiskError, RiskModel, RiskResult};

type Loader = Box<dyn Fn() -> RiskResult<Arc<dyn RiskModel>> + Send + Sync>;

pub struct ModelHandle {
    artifact: String,
    loader:   Loader,
    cell:     OnceLock<Result<Arc<dyn RiskModel>, String>>,
}

impl ModelHandle {
    /// Load a [`LogisticRiskModel`] from `path` on first use.
    pub fn from_artifact(path: impl AsRef<Path>) -> Self {
        let path: PathBuf = path.as_ref().to_path_buf();
        let artifact = path.display().to_string();
        Self::with_loader(artifact, move || {
            let model = LogisticRiskModel::from_path(&path)?;
            Ok(Arc::new(model) as Arc<dyn RiskModel>)
        })
    }

    /// A handle around an already-built model.
    pub fn preloaded(model: Arc<dyn RiskModel>) -> Self {
        let artifact = model.name().to_owned();
        let cell = OnceLock::new();
        let _ = cell.set(Ok(model));
        Self {
            artifact,
            loader: Box::new(|| Err(RiskError::Artifact("model already loaded".into()))),
            cell,
        }
    }

    /// A handle whose model is produced by `loader` on first use.
    pub fn with_loader<F>(artifact: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> RiskResult<Arc<dyn RiskModel>> + Send + Sync + 'static,
    {
        Self { artifact: artifact.into(), loader: Box::new(loader), cell: OnceLock::new() }
    }

    /// The shared model, loading it if this is the first call.
    pub fn get(&self) -> RiskResult<Arc<dyn RiskModel>> {
        let slot = self.cell.get_or_init(|| match (self.loader)() {
            Ok(model) => {
                info!(artifact = %self.artifact, model = model.name(), "risk model loaded");
                Ok(model)
            }
            Err(e) => {
                error!(artifact = %self.artifact, error = %e, "risk model failed to load");
                Err(e.to_string())
            }
        });
        match slot {
            Ok(model) => Ok(Arc::clone(model)),
            Err(reason) => Err(RiskError::ModelUnavailable {
                artifact: self.artifact.clone(),
                reason:   reason.clone(),
            }),
        }
    }

    /// Load eagerly so startup fails fast on a bad artifact.
    pub fn warm(&self) -> RiskResult<()> {
        self.get().map(|_| ())
    }

    /// `true` once a load has been attempted, whatever its outcome.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("artifact", &self.artifact)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
