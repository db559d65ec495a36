pub mod batch;
pub mod builder;
pub mod config;
pub mod environment;
pub mod git;
pub mod layout;
pub mod logging;
pub mod process;
pub mod provision;
pub mod status;
