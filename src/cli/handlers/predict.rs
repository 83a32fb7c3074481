//! `predict` command: one-shot scoring from the command line.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{
    colored_label, output_json, print_hint, print_kv, print_table, truncate_text, OutputMode,
};
use crate::init::AppContext;
use crate::models::prediction::PredictionResult;
use crate::services::ServiceMode;

#[derive(Debug, Serialize)]
struct ScoredText<'a> {
    text: &'a str,
    #[serde(flatten)]
    result: &'a PredictionResult,
}

#[derive(Debug, Serialize)]
struct PredictOutput<'a> {
    mode: ServiceMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
    predictions: Vec<ScoredText<'a>>,
}

pub fn handle_predict(ctx: &AppContext, texts: &[String], mode: OutputMode) -> Result<()> {
    let service = &ctx.prediction_service;
    let results = service.predict_batch(texts)?;

    match mode {
        OutputMode::Json => {
            let output = PredictOutput {
                mode: service.mode(),
                detail: service.degradation_reason(),
                predictions: texts
                    .iter()
                    .zip(&results)
                    .map(|(text, result)| ScoredText { text, result })
                    .collect(),
            };
            output_json(&output);
        }
        OutputMode::Human => {
            print_kv("mode", service.mode().as_str());
            if let Some(reason) = service.degradation_reason() {
                print_hint(&format!("  keyword fallback: {}", reason));
            }

            let rows = texts
                .iter()
                .zip(&results)
                .map(|(text, result)| {
                    vec![
                        truncate_text(text, 48),
                        colored_label(result.label).to_string(),
                        format!("{:+.3}", result.score),
                        format!("{:.3}", result.confidence),
                        result.tokens_analyzed.to_string(),
                    ]
                })
                .collect();
            print_table(&["Text", "Label", "Score", "Confidence", "Tokens"], rows);
        }
    }

    Ok(())
}
