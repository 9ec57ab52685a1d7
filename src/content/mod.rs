//! Content module - the project list and site configuration documents, their
//! JSON and generated-module forms, and document-level repository access.

mod document;
mod error;
mod module;
mod repository;

pub use document::{Document, DocumentKind, Project, ProjectList, SiteConfig};
pub use error::{ContentError, ContentResult};
pub use module::{regenerate_local, render_module};
pub use repository::{ContentRepository, MAX_CONFLICT_RETRIES, build_updates};
