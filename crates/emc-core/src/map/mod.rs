//! Mapping from model-level feed policy to taskvisor policies.
mod backoff;
mod jitter;
mod restart;
mod spec;

pub use backoff::to_backoff_policy;
pub use jitter::to_jitter_policy;
pub use restart::to_restart_policy;
pub use spec::{to_controller_spec, to_task_spec};
