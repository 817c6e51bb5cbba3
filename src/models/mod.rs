//! Model catalog, weight provisioning, and the lifecycle state machine.

pub mod catalog;
pub mod lifecycle;
pub mod provision;

pub use catalog::{get_model, list_models, ModelInfo};
pub use lifecycle::{LoadState, ModelLifecycle, ReadinessSnapshot};
pub use provision::ensure_whisper_model;
