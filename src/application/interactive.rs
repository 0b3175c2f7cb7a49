//! Read-extract-predict loop against a live model.
//!
//! This is a library surface for embedding a model: the binary ships no
//! [`PredictionService`], so callers wire in their own and drive
//! [`InteractivePredictor::run`] with any reader and writer.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::domain::deadline::Deadline;
use crate::domain::prediction::MethodPrediction;
use crate::ports::{PathExtractor, PredictionService};

pub const EXIT_KEYWORDS: [&str; 3] = ["exit", "quit", "q"];
pub const SHOW_TOP_CONTEXTS: usize = 10;

pub struct InteractivePredictor<'a, S: PredictionService> {
    pub extractor: &'a dyn PathExtractor,
    pub service: S,
    pub input_file: PathBuf,
    /// Context count the model was trained with.
    pub max_contexts: usize,
    pub show_code_vector: bool,
}

impl<'a, S: PredictionService> InteractivePredictor<'a, S> {
    /// Prompt until an exit keyword or end of input. Extraction and model
    /// failures are printed and the loop carries on.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, out: &mut W) -> io::Result<()> {
        writeln!(out, "Starting interactive prediction...")?;
        loop {
            writeln!(
                out,
                "Modify the file: \"{}\" and press any key when ready, or \"q\" / \"quit\" / \"exit\" to exit",
                self.input_file.display()
            )?;
            out.flush()?;

            let mut answer = String::new();
            if input.read_line(&mut answer)? == 0
                || EXIT_KEYWORDS.contains(&answer.trim().to_lowercase().as_str())
            {
                writeln!(out, "Exiting...")?;
                return Ok(());
            }

            let lines = match self.extractor.extract_lines(&self.input_file, &Deadline::none()) {
                Ok(lines) if lines.is_empty() => {
                    writeln!(out, "No functions found in {}", self.input_file.display())?;
                    continue;
                }
                Ok(lines) => pad_first_line(lines, self.max_contexts),
                Err(err) => {
                    writeln!(out, "Could not extract path contexts: {err}")?;
                    continue;
                }
            };

            match self.service.predict(&lines) {
                Ok(predictions) => {
                    for prediction in &predictions {
                        self.print_prediction(prediction, out)?;
                    }
                }
                Err(err) => writeln!(out, "Prediction failed: {err:#}")?,
            }
        }
    }

    fn print_prediction<W: Write>(&self, prediction: &MethodPrediction, out: &mut W) -> io::Result<()> {
        writeln!(out, "Original name:\t{}", prediction.original_name)?;
        for candidate in &prediction.predictions {
            writeln!(out, "\t({:.6}) predicted: {}", candidate.probability, candidate.name)?;
        }
        writeln!(out, "Attention:")?;
        for record in prediction.top_attention(SHOW_TOP_CONTEXTS) {
            writeln!(out, "{:.6}\tcontext: {}", record.score, record.context())?;
        }
        if self.show_code_vector {
            if let Some(vector) = &prediction.code_vector {
                let rendered: Vec<String> = vector.iter().map(f32::to_string).collect();
                writeln!(out, "Code vector:")?;
                writeln!(out, "{}", rendered.join(" "))?;
            }
        }
        Ok(())
    }
}

/// Strip line endings and pad the first line with spaces to the model's
/// fixed context count.
pub fn pad_first_line(lines: Vec<String>, max_contexts: usize) -> Vec<String> {
    let mut lines: Vec<String> = lines
        .into_iter()
        .map(|line| line.trim().to_string())
        .collect();
    if let Some(first) = lines.first_mut() {
        let fields: Vec<&str> = first.split_whitespace().collect();
        let contexts = fields.len().saturating_sub(1);
        let padding = " ".repeat(max_contexts.saturating_sub(contexts));
        *first = format!("{}{}", fields.join(" "), padding);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_is_padded_to_max_contexts() {
        let lines = vec!["f a,Name,b c,Name,d\n".to_string(), "g x,Name,y\n".to_string()];
        let padded = pad_first_line(lines, 5);
        assert_eq!(padded[0], "f a,Name,b c,Name,d   ");
        assert_eq!(padded[1], "g x,Name,y");
    }

    #[test]
    fn test_overfull_line_is_not_truncated() {
        let padded = pad_first_line(vec!["f a,N,b c,N,d".to_string()], 1);
        assert_eq!(padded[0], "f a,N,b c,N,d");
    }
}
