//! Sync command implementations.

use tabled::{Table, Tabled};

use crate::cli::error::CliResult;
use crate::cli::utils::{apply_table_style, format_timestamp, yes_no};
use crate::github::GitTransport;
use crate::store::WorkingCopyStore;
use crate::sync::{PublishOutcome, PullOutcome, SyncCoordinator};

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Show configuration and pending-change state
pub fn status<T: GitTransport, S: WorkingCopyStore>(
    coordinator: &SyncCoordinator<T, S>,
    json: bool,
) -> CliResult<String> {
    let status = coordinator.status()?;
    if json {
        return Ok(serde_json::to_string_pretty(&status)?);
    }

    let rows = vec![
        StatusRow {
            field: "Configured",
            value: yes_no(status.is_configured).to_string(),
        },
        StatusRow {
            field: "State",
            value: coordinator.phase().to_string(),
        },
        StatusRow {
            field: "Pending changes",
            value: yes_no(status.pending_changes).to_string(),
        },
        StatusRow {
            field: "Last published",
            value: format_timestamp(status.last_published_at.as_ref()),
        },
        StatusRow {
            field: "Last pulled",
            value: format_timestamp(status.last_pulled_at.as_ref()),
        },
        StatusRow {
            field: "Last commit",
            value: status.last_commit_url.unwrap_or_else(|| "-".to_string()),
        },
    ];

    let mut table = Table::new(rows);
    apply_table_style(&mut table);
    Ok(table.to_string())
}

/// Replace the working copy with the repository's content
pub async fn pull<T: GitTransport, S: WorkingCopyStore>(
    coordinator: &mut SyncCoordinator<T, S>,
    json: bool,
) -> CliResult<String> {
    let result = coordinator.pull().await;
    if json {
        return Ok(serde_json::to_string_pretty(&PullOutcome::from(&result))?);
    }

    let report = result?;
    if !report.updated {
        return Ok("ℹ Repository has no content files yet; working copy unchanged\n".to_string());
    }

    let mut output = String::from("✓ Pulled from GitHub\n\n");
    output.push_str(&format!("Projects:    {}\n", updated_label(report.projects_updated)));
    output.push_str(&format!(
        "Site config: {}\n",
        updated_label(report.site_config_updated)
    ));
    Ok(output)
}

/// Commit the working copy to the repository
pub async fn publish<T: GitTransport, S: WorkingCopyStore>(
    coordinator: &mut SyncCoordinator<T, S>,
    message: &str,
    json: bool,
) -> CliResult<String> {
    let result = coordinator.publish(message).await;
    if json {
        return Ok(serde_json::to_string_pretty(&PublishOutcome::from(&result))?);
    }

    let report = result?;
    let mut output = format!("✓ Published {} files\n\n", report.files_updated);
    output.push_str(&format!("Commit: {}\n", report.commit_url));
    Ok(output)
}

fn updated_label(updated: bool) -> &'static str {
    if updated { "updated" } else { "not in repository" }
}
