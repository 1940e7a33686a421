pub mod config;
pub mod display;
pub mod export;
pub mod list;
pub mod note;
pub mod save;
pub mod stats;
