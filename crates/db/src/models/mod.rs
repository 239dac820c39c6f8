//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Update/query DTOs where the table supports them

pub mod deployment;
pub mod deployment_log;
pub mod status;
pub mod template;
pub mod template_instance;
