// Infrastructure implementations for pathminer.

pub mod concurrency;
pub mod config;
pub mod consolidate;
pub mod discovery;
pub mod python;
pub mod writer;

pub use python::{ExtractedFunction, PythonExtractor};
