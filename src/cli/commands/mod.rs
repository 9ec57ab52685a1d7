pub mod content;
pub mod setup;
pub mod sync;
