//! Repository setup commands: save, check and forget the GitHub location.

use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::yes_no;
use crate::github::{AccessReport, GitTransport, RepositoryLocation};
use crate::store::WorkingCopyStore;
use crate::sync::{SyncCoordinator, SyncError};

/// Check access with `location` and, if it works, remember it.
///
/// The coordinator's transport must already point at `location`.
pub async fn setup<T: GitTransport, S: WorkingCopyStore>(
    coordinator: &SyncCoordinator<T, S>,
    location: &RepositoryLocation,
) -> CliResult<String> {
    require_complete(location)?;

    let report = coordinator.validate_access().await;
    if !report.valid {
        return Err(access_denied(report));
    }

    coordinator.working_copy().save_location(location)?;

    let mut output = format!("✓ Connected to {}\n", location.slug());
    output.push_str(&describe(&report, &location.branch));
    Ok(output)
}

/// Check the configured repository without changing anything.
pub async fn validate<T: GitTransport, S: WorkingCopyStore>(
    coordinator: &SyncCoordinator<T, S>,
    location: &RepositoryLocation,
) -> CliResult<String> {
    if !coordinator.content().is_configured() {
        return Err(CliError::Sync(SyncError::NotConfigured));
    }

    let report = coordinator.validate_access().await;
    if !report.valid {
        return Err(access_denied(report));
    }

    let mut output = format!("✓ Access to {} looks good\n", location.slug());
    output.push_str(&describe(&report, &location.branch));
    Ok(output)
}

pub fn forget<T: GitTransport, S: WorkingCopyStore>(
    coordinator: &SyncCoordinator<T, S>,
) -> CliResult<String> {
    coordinator.working_copy().clear_location()?;
    Ok("✓ Saved repository location removed\n".to_string())
}

fn require_complete(location: &RepositoryLocation) -> CliResult<()> {
    let missing: Vec<&str> = [
        ("token", &location.token),
        ("owner", &location.owner),
        ("repo", &location.repo),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(name, _)| name)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CliError::IncompleteLocation {
            missing: missing.join(", "),
        })
    }
}

fn access_denied(report: AccessReport) -> CliError {
    CliError::AccessDenied {
        message: report
            .error
            .unwrap_or_else(|| "unknown error".to_string()),
    }
}

fn describe(report: &AccessReport, branch: &str) -> String {
    let mut output = String::new();
    if let Some(url) = &report.repo_url {
        output.push_str(&format!("Repository: {}\n", url));
    }
    output.push_str(&format!("Branch:     {}\n", branch));
    if let Some(permissions) = &report.permissions {
        output.push_str(&format!("Push:       {}\n", yes_no(permissions.push)));
    }
    output
}
