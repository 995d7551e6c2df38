//! Exit codes for the CLI

use tandem_core::{ProjectError, TandemError};
use tandem_tasks::{PlanError, ScheduleError};

use crate::cli::CliError;

/// General error, including failed tasks
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Version control error
pub const VCS_ERROR: i32 = 3;

/// Project or workspace not found
pub const NOT_FOUND: i32 = 4;

/// Planning error (unknown script, malformed expression)
pub const PLAN_ERROR: i32 = 5;

/// Exit code for an error reaching the top level
pub fn for_error(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<TandemError>() {
            return for_core(err);
        }
        if let Some(err) = cause.downcast_ref::<PlanError>() {
            return match err {
                PlanError::Core(core) => for_core(core),
                PlanError::ScriptNotFound { .. } | PlanError::ExpressionSyntax(_) => PLAN_ERROR,
            };
        }
        if cause.downcast_ref::<ScheduleError>().is_some() {
            return PLAN_ERROR;
        }
        if let Some(err) = cause.downcast_ref::<CliError>() {
            return match err {
                CliError::NoWorkspace | CliError::NoCommand | CliError::TasksFailed(_) => ERROR,
            };
        }
    }
    ERROR
}

fn for_core(err: &TandemError) -> i32 {
    match err {
        TandemError::Config(_) => CONFIG_ERROR,
        TandemError::Vcs(_) => VCS_ERROR,
        TandemError::Project(ProjectError::InvalidPattern { .. }) => CONFIG_ERROR,
        TandemError::Project(_) => NOT_FOUND,
        TandemError::Manifest(_) | TandemError::Io(_) => ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_core::{ConfigError, VcsError};

    #[test]
    fn test_core_errors() {
        let err = anyhow::Error::new(TandemError::from(VcsError::RevisionNotFound(
            "master".to_string(),
        )));
        assert_eq!(for_error(&err), VCS_ERROR);

        let err = anyhow::Error::new(TandemError::from(ConfigError::ParseError(
            "bad".to_string(),
        )));
        assert_eq!(for_error(&err), CONFIG_ERROR);

        let err = anyhow::Error::new(TandemError::from(ProjectError::WorkspaceNotFound(
            "wks".to_string(),
        )));
        assert_eq!(for_error(&err), NOT_FOUND);
    }

    #[test]
    fn test_plan_errors() {
        let err = anyhow::Error::new(PlanError::ExpressionSyntax("a b // c".to_string()));
        assert_eq!(for_error(&err), PLAN_ERROR);

        let err = anyhow::Error::new(PlanError::Core(TandemError::from(
            ProjectError::ProjectNotFound("/tmp".into()),
        )));
        assert_eq!(for_error(&err), NOT_FOUND);
    }

    #[test]
    fn test_context_is_looked_through() {
        let err = anyhow::Error::new(CliError::TasksFailed(2)).context("while running");
        assert_eq!(for_error(&err), ERROR);

        assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
    }

    #[test]
    fn test_empty_selection_is_a_plain_failure() {
        let err = anyhow::Error::new(CliError::NoWorkspace).context("while running each");
        assert_eq!(for_error(&err), ERROR);

        let err = anyhow::Error::new(CliError::NoCommand);
        assert_eq!(for_error(&err), ERROR);
    }
}
