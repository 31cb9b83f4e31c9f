use emc_model::RestartStrategy;
use taskvisor::RestartPolicy;

pub fn to_restart_policy(s: RestartStrategy) -> RestartPolicy {
    match s {
        RestartStrategy::Never => RestartPolicy::Never,
        RestartStrategy::Always => RestartPolicy::Always,
        RestartStrategy::OnFailure => RestartPolicy::OnFailure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_restarts_only_on_failure() {
        assert!(matches!(
            to_restart_policy(RestartStrategy::default()),
            RestartPolicy::OnFailure
        ));
        assert!(matches!(to_restart_policy(RestartStrategy::Never), RestartPolicy::Never));
    }
}
