// Shared kernel: error types, configuration, logging and value objects used by every module

pub mod config;
pub mod domain;
pub mod errors;
pub mod utils;
