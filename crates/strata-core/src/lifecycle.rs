use crate::CoreError;
use strata_schema::SessionState;

pub fn validate_transition(from: SessionState, to: SessionState) -> Result<(), CoreError> {
    let valid = matches!(
        (from, to),
        (
            SessionState::Opened,
            SessionState::Deploying | SessionState::Deleting
        ) | (SessionState::Deployed, SessionState::Deleting)
            | (
                SessionState::Deploying,
                SessionState::Deployed | SessionState::DeployFailure
            )
            | (
                SessionState::Deleting,
                SessionState::Deleted | SessionState::DeleteFailure
            )
    );

    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        assert!(validate_transition(SessionState::Opened, SessionState::Deploying).is_ok());
        assert!(validate_transition(SessionState::Opened, SessionState::Deleting).is_ok());
        assert!(validate_transition(SessionState::Deployed, SessionState::Deleting).is_ok());
        assert!(validate_transition(SessionState::Deploying, SessionState::Deployed).is_ok());
        assert!(validate_transition(SessionState::Deploying, SessionState::DeployFailure).is_ok());
        assert!(validate_transition(SessionState::Deleting, SessionState::Deleted).is_ok());
        assert!(validate_transition(SessionState::Deleting, SessionState::DeleteFailure).is_ok());
    }

    #[test]
    fn invalid_transitions() {
        assert!(validate_transition(SessionState::Opened, SessionState::Deployed).is_err());
        assert!(validate_transition(SessionState::Deploying, SessionState::Opened).is_err());
        assert!(validate_transition(SessionState::Deploying, SessionState::Deleting).is_err());
        assert!(validate_transition(SessionState::Deployed, SessionState::Deploying).is_err());
        assert!(validate_transition(SessionState::Opened, SessionState::Opened).is_err());
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [
            SessionState::DeployFailure,
            SessionState::Deleted,
            SessionState::DeleteFailure,
        ] {
            for to in SessionState::ALL {
                assert!(
                    validate_transition(from, to).is_err(),
                    "{from} -> {to} must be rejected"
                );
            }
        }
    }
}
