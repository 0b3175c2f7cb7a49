// Main library entry point for pathminer.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;
