pub mod command;
pub mod config;
pub mod executor;
pub mod matcher;
pub mod model;
pub mod rankers;
pub mod sources;
pub mod state;
pub mod template;
pub mod theme;
pub mod topk;
pub mod ui;
