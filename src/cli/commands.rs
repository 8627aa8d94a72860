//! Command implementations for the Sardonic CLI.

use std::io::{self, BufRead};

use log::debug;

use crate::analysis::normalizer::TextNormalizer;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::PipelineConfig;
use crate::error::{Result, SardonicError};
use crate::pipeline;

/// Execute a CLI command.
pub fn execute_command(args: SardonicArgs) -> Result<()> {
    let mut config = base_config(&args)?;

    match &args.command {
        Command::Prepare(prepare_args) => {
            prepare_args.corpus.apply(&mut config);
            prepare_args.split.apply(&mut config);
            prepare_args.processed.apply(&mut config);
            output_result(&pipeline::prepare(&config)?, &args)
        }
        Command::Train(train_args) => {
            train_args.processed.apply(&mut config);
            train_args.model.apply(&mut config);
            train_args.classifier.apply(&mut config);
            output_result(&pipeline::train(&config)?, &args)
        }
        Command::Evaluate(evaluate_args) => {
            evaluate_args.processed.apply(&mut config);
            evaluate_args.model.apply(&mut config);
            output_result(&pipeline::evaluate(&config)?, &args)
        }
        Command::Run(run_args) => {
            run_args.corpus.apply(&mut config);
            run_args.split.apply(&mut config);
            run_args.processed.apply(&mut config);
            run_args.model.apply(&mut config);
            run_args.classifier.apply(&mut config);
            output_result(&pipeline::run(&config)?, &args)
        }
        Command::Predict(predict_args) => {
            predict_args.model.apply(&mut config);
            let texts = texts_or_stdin(&predict_args.texts)?;
            output_result(&pipeline::predict(&config, &texts)?, &args)
        }
        Command::Normalize(normalize_args) => {
            let texts = texts_or_stdin(&normalize_args.texts)?;
            output_result(&normalize_texts(&texts, normalize_args.trace), &args)
        }
    }
}

/// Configuration from `--config` or defaults, before per-command flags.
fn base_config(args: &SardonicArgs) -> Result<PipelineConfig> {
    match &args.config {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            PipelineConfig::from_json_file(path)
        }
        None => Ok(PipelineConfig::default()),
    }
}

/// Normalize texts, optionally recording every stage.
pub fn normalize_texts(texts: &[String], trace: bool) -> NormalizationResults {
    let normalizer = TextNormalizer::default();
    let results = texts
        .iter()
        .zip(normalizer.normalize_all(texts))
        .map(|(text, normalized)| NormalizationResult {
            text: text.clone(),
            normalized,
            stages: trace.then(|| {
                normalizer
                    .trace(text)
                    .into_iter()
                    .map(|(stage, output)| StageOutput { stage, output })
                    .collect()
            }),
        })
        .collect();
    NormalizationResults(results)
}

fn texts_or_stdin(texts: &[String]) -> Result<Vec<String>> {
    if !texts.is_empty() {
        return Ok(texts.to_vec());
    }

    let mut lines = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    if lines.is_empty() {
        return Err(SardonicError::invalid_config(
            "no texts given on the command line or stdin",
        ));
    }
    Ok(lines)
}
