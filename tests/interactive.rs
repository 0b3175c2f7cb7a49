// Interactive prediction loop driven by scripted input.

use std::fs;
use std::io::Cursor;
use std::sync::Mutex;

use anyhow::bail;

use pathminer::application::InteractivePredictor;
use pathminer::domain::prediction::{AttentionRecord, MethodPrediction, NamePrediction};
use pathminer::infrastructure::PythonExtractor;
use pathminer::ports::PredictionService;

#[derive(Default)]
struct RecordingService {
    calls: Mutex<Vec<Vec<String>>>,
    fail_first: bool,
}

impl PredictionService for RecordingService {
    fn predict(&self, lines: &[String]) -> anyhow::Result<Vec<MethodPrediction>> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(lines.to_vec());
        if self.fail_first && calls.len() == 1 {
            bail!("model not loaded");
        }
        Ok(lines
            .iter()
            .map(|line| MethodPrediction {
                original_name: line.split(' ').next().unwrap_or_default().to_string(),
                predictions: vec![
                    NamePrediction {
                        name: "add".to_string(),
                        probability: 0.75,
                    },
                    NamePrediction {
                        name: "sum".to_string(),
                        probability: 0.25,
                    },
                ],
                attention: vec![
                    AttentionRecord {
                        score: 0.1,
                        token1: "a".to_string(),
                        path: "arg|arguments|arg".to_string(),
                        token2: "b".to_string(),
                    },
                    AttentionRecord {
                        score: 0.9,
                        token1: "a".to_string(),
                        path: "BinOp_Add".to_string(),
                        token2: "b".to_string(),
                    },
                ],
                code_vector: Some(vec![0.5, -1.0]),
            })
            .collect())
    }
}

fn run(
    source: &str,
    input: &str,
    service: RecordingService,
    show_code_vector: bool,
) -> (String, Vec<Vec<String>>) {
    let dir = tempfile::tempdir().unwrap();
    let input_file = dir.path().join("Input.py");
    fs::write(&input_file, source).unwrap();

    let extractor = PythonExtractor::default();
    let predictor = InteractivePredictor {
        extractor: &extractor,
        service,
        input_file,
        max_contexts: 200,
        show_code_vector,
    };
    let mut out = Vec::new();
    predictor.run(Cursor::new(input.to_string()), &mut out).unwrap();
    let calls = predictor.service.calls.lock().unwrap().clone();
    (String::from_utf8(out).unwrap(), calls)
}

const ADD: &str = "def add_values(a, b):\n    return a + b\n";

#[test]
fn test_prediction_is_printed_with_sorted_attention() {
    let (output, calls) = run(ADD, "\nq\n", RecordingService::default(), false);

    assert!(output.starts_with("Starting interactive prediction...\n"));
    assert!(output.contains("Original name:\tadd|values\n"));
    assert!(output.contains("\t(0.750000) predicted: add\n"));
    assert!(output.contains("\t(0.250000) predicted: sum\n"));
    let high = output.find("0.900000\tcontext: a,BinOp_Add,b").unwrap();
    let low = output.find("0.100000\tcontext: a,arg|arguments|arg,b").unwrap();
    assert!(high < low);
    assert!(!output.contains("Code vector:"));
    assert!(output.ends_with("Exiting...\n"));

    assert_eq!(calls.len(), 1);
    let line = &calls[0][0];
    assert!(line.starts_with("add|values "));
    assert!(!line.ends_with('\n'));
    assert_eq!(line.matches(' ').count(), 200);
}

#[test]
fn test_code_vector_is_shown_on_request() {
    let (output, _) = run(ADD, "go\nexit\n", RecordingService::default(), true);
    assert!(output.contains("Code vector:\n0.5 -1\n"));
}

#[test]
fn test_model_failure_does_not_end_the_loop() {
    let service = RecordingService {
        fail_first: true,
        ..RecordingService::default()
    };
    let (output, calls) = run(ADD, "\n\nQUIT\n", service, false);

    assert!(output.contains("Prediction failed: model not loaded"));
    assert_eq!(calls.len(), 2);
    assert_eq!(output.matches("Original name:").count(), 1);
}

#[test]
fn test_extraction_errors_are_reported_and_skipped() {
    let (output, calls) = run("def broken(:\n", "\n", RecordingService::default(), false);

    assert!(output.contains("Could not extract path contexts:"));
    assert!(calls.is_empty());
    assert!(output.ends_with("Exiting...\n"));
}

#[test]
fn test_file_without_functions_is_not_sent() {
    let (output, calls) = run("x = 1\n", "\nq\n", RecordingService::default(), false);
    assert!(output.contains("No functions found in"));
    assert!(calls.is_empty());
}

#[test]
fn test_end_of_input_exits_immediately() {
    let (output, calls) = run(ADD, "", RecordingService::default(), false);
    assert_eq!(output.matches("Modify the file:").count(), 1);
    assert!(output.ends_with("Exiting...\n"));
    assert!(calls.is_empty());
}
