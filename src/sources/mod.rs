use anyhow::Result;

use crate::model::AppEntry;

/// Supplies launchable applications.
pub trait Source {
    fn scan(&self) -> Result<Vec<AppEntry>>;
}

pub mod desktop;
pub mod files;
pub mod history;
