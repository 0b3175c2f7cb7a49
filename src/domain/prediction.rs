//! Response shapes of the downstream name-prediction model.

use serde::{Deserialize, Serialize};

/// One ranked candidate name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamePrediction {
    pub name: String,
    pub probability: f64,
}

/// Attention weight the model assigned to one path context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionRecord {
    pub score: f64,
    pub token1: String,
    pub path: String,
    pub token2: String,
}

impl AttentionRecord {
    /// `token1,path,token2`, the context as it appeared on the input line.
    pub fn context(&self) -> String {
        format!("{},{},{}", self.token1, self.path, self.token2)
    }
}

/// Model output for one input line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodPrediction {
    pub original_name: String,
    pub predictions: Vec<NamePrediction>,
    pub attention: Vec<AttentionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_vector: Option<Vec<f32>>,
}

impl MethodPrediction {
    /// Attention records sorted by descending score, at most `limit` of them.
    pub fn top_attention(&self, limit: usize) -> Vec<&AttentionRecord> {
        let mut records: Vec<&AttentionRecord> = self.attention.iter().collect();
        records.sort_by(|a, b| b.score.total_cmp(&a.score));
        records.truncate(limit);
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: f64, token1: &str) -> AttentionRecord {
        AttentionRecord {
            score,
            token1: token1.to_string(),
            path: "Name|Call".to_string(),
            token2: "x".to_string(),
        }
    }

    #[test]
    fn test_top_attention_orders_by_score() {
        let prediction = MethodPrediction {
            original_name: "get|value".to_string(),
            predictions: vec![],
            attention: vec![record(0.1, "a"), record(0.7, "b"), record(0.2, "c")],
            code_vector: None,
        };
        let top: Vec<&str> = prediction
            .top_attention(2)
            .iter()
            .map(|r| r.token1.as_str())
            .collect();
        assert_eq!(top, vec!["b", "c"]);
        assert_eq!(prediction.attention[1].context(), "b,Name|Call,x");
    }

    #[test]
    fn test_code_vector_is_optional_in_json() {
        let json = r#"{"original_name":"f","predictions":[{"name":"g","probability":0.5}],"attention":[]}"#;
        let prediction: MethodPrediction = serde_json::from_str(json).unwrap();
        assert!(prediction.code_vector.is_none());
        assert_eq!(prediction.predictions[0].name, "g");
    }
}
