use taskvisor::{AdmissionPolicy, ControllerSpec, TaskRef, TaskSpec};

use emc_model::FeedPolicy;

use super::{to_backoff_policy, to_restart_policy};

/// The feed consumer runs until cancelled, so it has no timeout.
pub fn to_task_spec(task: TaskRef, p: &FeedPolicy) -> TaskSpec {
    TaskSpec::new(
        task,
        to_restart_policy(p.restart),
        to_backoff_policy(&p.backoff),
        None,
    )
}

/// Resubmitting under the same name replaces the running consumer; two
/// consumers must never feed one engine.
pub fn to_controller_spec(task: TaskRef, p: &FeedPolicy) -> ControllerSpec {
    ControllerSpec {
        admission: AdmissionPolicy::Replace,
        task_spec: to_task_spec(task, p),
    }
}
