pub mod cli;
pub mod config;
pub mod constants;
pub mod drivers;
pub mod host;
pub mod input;
pub mod procfs;
pub mod relay;
pub mod retry;
