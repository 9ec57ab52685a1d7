//! Working-copy content commands.

use std::fs;
use std::path::Path;
use tabled::{Table, Tabled};

use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::{apply_table_style, format_list, truncate_with_ellipsis, yes_no};
use crate::content::{Document, DocumentKind, ProjectList, SiteConfig, regenerate_local};
use crate::github::GitTransport;
use crate::store::WorkingCopyStore;
use crate::sync::SyncCoordinator;

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Technologies")]
    technologies: String,
    #[tabled(rename = "Featured")]
    featured: &'static str,
}

/// Print a document from the working copy
pub fn show<T: GitTransport, S: WorkingCopyStore>(
    coordinator: &SyncCoordinator<T, S>,
    kind: DocumentKind,
    json: bool,
) -> CliResult<String> {
    let working_copy = coordinator.working_copy();
    match kind {
        DocumentKind::SiteConfig => Ok(working_copy.site_config()?.to_json()?),
        DocumentKind::Projects if json => Ok(working_copy.projects()?.to_json()?),
        DocumentKind::Projects => {
            let projects = working_copy.projects()?;
            if projects.is_empty() {
                return Ok("No projects found.".to_string());
            }

            let rows: Vec<ProjectRow> = projects
                .0
                .iter()
                .map(|p| ProjectRow {
                    id: p.id,
                    title: truncate_with_ellipsis(&p.title, 40),
                    category: p.category.clone().unwrap_or_else(|| "-".to_string()),
                    technologies: truncate_with_ellipsis(&format_list(p.technologies.as_ref()), 40),
                    featured: yes_no(p.is_featured()),
                })
                .collect();

            let mut table = Table::new(rows);
            apply_table_style(&mut table);
            Ok(table.to_string())
        }
    }
}

/// Replace a document in the working copy with the contents of `file`
pub fn edit<T: GitTransport, S: WorkingCopyStore>(
    coordinator: &mut SyncCoordinator<T, S>,
    kind: DocumentKind,
    file: &Path,
) -> CliResult<String> {
    let text = fs::read_to_string(file).map_err(|source| CliError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    let invalid = |source| CliError::InvalidInput {
        path: file.to_path_buf(),
        source,
    };

    match kind {
        DocumentKind::Projects => {
            let projects = ProjectList::from_json(&text).map_err(invalid)?;
            coordinator.edit_projects(&projects)?;
            Ok(format!(
                "✓ Saved {} projects to the working copy (unpublished)\n",
                projects.len()
            ))
        }
        DocumentKind::SiteConfig => {
            let site_config = SiteConfig::from_json(&text).map_err(invalid)?;
            coordinator.edit_site_config(&site_config)?;
            Ok("✓ Saved site config to the working copy (unpublished)\n".to_string())
        }
    }
}

/// Export both documents as one JSON bundle, to `output` or stdout
pub fn export<T: GitTransport, S: WorkingCopyStore>(
    coordinator: &SyncCoordinator<T, S>,
    output: Option<&Path>,
) -> CliResult<String> {
    let bundle = coordinator.working_copy().export()?;
    let text = serde_json::to_string_pretty(&bundle)?;

    match output {
        Some(path) => {
            fs::write(path, &text).map_err(|source| CliError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(format!("✓ Exported content to {}\n", path.display()))
        }
        None => Ok(text),
    }
}

/// Drop local edits and bookkeeping
pub fn reset<T: GitTransport, S: WorkingCopyStore>(
    coordinator: &mut SyncCoordinator<T, S>,
) -> CliResult<String> {
    coordinator.reset()?;
    Ok("✓ Working copy reset to bundled defaults\n".to_string())
}

/// Rebuild the generated modules of a site checkout from its JSON files
pub fn generate(root: &Path) -> CliResult<String> {
    let written = regenerate_local(root)?;
    if written.is_empty() {
        return Ok(format!("ℹ No content files found under {}\n", root.display()));
    }

    let mut output = String::from("✓ Generated modules\n");
    for kind in written {
        output.push_str(&format!("  {}\n", kind.module_path()));
    }
    Ok(output)
}
