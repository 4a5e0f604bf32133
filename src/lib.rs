pub mod ai;
pub mod config;
pub mod diff;
pub mod error;
pub mod event;
pub mod filter;
pub mod generate;
pub mod github;
pub mod inputs;
pub mod logging;
pub mod orchestrator;
pub mod reporter;
pub mod workflow;
