pub mod config;
pub mod loader;
pub mod runner;
pub mod session;
