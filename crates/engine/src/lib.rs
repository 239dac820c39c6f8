//! Deployment engine: the build pipeline and the rollback manager.
//!
//! Both public operations return structured results rather than errors.
//! Every outcome, success or failure, is persisted on the deployment row
//! and mirrored in the append-only deployment log, so callers and
//! dashboards can audit what happened without inspecting process logs.

pub mod error;
pub mod orchestrator;
pub mod rollback;

pub use error::EngineError;
pub use orchestrator::{BuildResult, Orchestrator};
pub use rollback::{RollbackManager, RollbackResult};
