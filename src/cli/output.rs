//! Output formatting for CLI commands.

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

use crate::analysis::normalizer::NormalizedText;
use crate::cli::args::{OutputFormat, SardonicArgs};
use crate::error::Result;

/// Result structure for the normalize command.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizationResult {
    pub text: String,
    pub normalized: NormalizedText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<StageOutput>>,
}

/// Output of one normalization stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageOutput {
    pub stage: &'static str,
    pub output: String,
}

/// Results of the normalize command.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct NormalizationResults(pub Vec<NormalizationResult>);

impl fmt::Display for NormalizationResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, result) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match &result.stages {
                Some(stages) => {
                    writeln!(f, "{:<17} {:?}", "input", result.text)?;
                    for (j, step) in stages.iter().enumerate() {
                        if j > 0 {
                            writeln!(f)?;
                        }
                        write!(f, "{:<17} {:?}", step.stage, step.output)?;
                    }
                    if stages.is_empty() {
                        write!(f, "{:<17} {:?}", "output", result.normalized.as_str())?;
                    }
                }
                None => write!(f, "{}", result.normalized)?,
            }
        }
        Ok(())
    }
}

/// Output a result in the format selected on the command line.
pub fn output_result<T>(result: &T, args: &SardonicArgs) -> Result<()>
where
    T: Serialize + fmt::Display,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, result, args.output_format, args.pretty)?;
    out.flush()?;
    Ok(())
}

/// Write a result to `out` in `format`.
pub fn write_result<W, T>(out: &mut W, result: &T, format: OutputFormat, pretty: bool) -> Result<()>
where
    W: Write,
    T: Serialize + fmt::Display,
{
    match format {
        OutputFormat::Human => writeln!(out, "{result}")?,
        OutputFormat::Json => {
            if pretty {
                serde_json::to_writer_pretty(&mut *out, result)?;
            } else {
                serde_json::to_writer(&mut *out, result)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}
