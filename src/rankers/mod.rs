//! One ranker per command kind. Every ranker returns at least one entry,
//! substituting an informational placeholder for an empty result.

pub mod apps;
pub mod commands;
pub mod files;
pub mod groups;
pub mod themes;

pub use apps::rank_apps;
pub use commands::{rank_config, rank_run};
pub use files::{rank_files, FileCache, FileRequest};
pub use groups::{rank_group, rank_shortcut};
pub use themes::rank_themes;
