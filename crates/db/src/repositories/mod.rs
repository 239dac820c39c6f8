//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod deployment_log_repo;
pub mod deployment_repo;
pub mod template_instance_repo;
pub mod template_repo;

pub use deployment_log_repo::DeploymentLogRepo;
pub use deployment_repo::DeploymentRepo;
pub use template_instance_repo::TemplateInstanceRepo;
pub use template_repo::{TemplateRepo, TemplateVersionRepo};
