use std::path::Path;

use crate::domain::deadline::Deadline;
use crate::domain::error::ExtractError;
use crate::domain::prediction::MethodPrediction;

/// Turns one source file into encoded path-context lines.
pub trait PathExtractor: Send + Sync {
    fn extract_lines(&self, path: &Path, deadline: &Deadline) -> Result<Vec<String>, ExtractError>;
}

/// The downstream name-prediction model. Receives encoded lines in order and
/// answers with one prediction per line.
pub trait PredictionService {
    fn predict(&self, lines: &[String]) -> anyhow::Result<Vec<MethodPrediction>>;
}
