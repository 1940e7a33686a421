pub mod ai;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod git;
pub mod model;
pub mod settings;
pub mod store;

pub use ai::{ClientOptions, InterpretationClient};
pub use config::Config;
pub use git::GitCollector;
pub use model::{
    AiInterpretation, CommitRecord, GitSnapshot, RepositoryDescriptor, WorkNote,
    WorkingTreeStatus,
};
pub use store::NoteStore;
