pub mod cli;
pub mod content;
pub mod github;
pub mod serde_utils;
pub mod settings;
pub mod store;
pub mod sync;
