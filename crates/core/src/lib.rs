//! Domain logic for the SDUI deployment engine.
//!
//! Everything in this crate is pure: template resolution, artifact key and
//! URL composition, platform and error types. All I/O lives in `sdui-db`
//! (ledger) and `sdui-storage` (artifacts).

pub mod artifact;
pub mod error;
pub mod platform;
pub mod resolver;
pub mod types;
