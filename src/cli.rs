use clap::Parser;

use pipegraph::{config::DEFAULT_CONFIG_FILE, output::OutputFormat, render::RankDir};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file to use
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Pipeline specification (JSON) to read instead of fetching it
    #[arg(long = "spec")]
    pub spec: Option<String>,

    /// Run status (JSON) to read instead of fetching it; switches to the run view
    #[arg(long = "run")]
    pub run: Option<String>,

    /// Workflow to fetch the pipeline from
    #[arg(long = "workflow", requires = "pipeline")]
    pub workflow: Option<String>,

    /// Pipeline to fetch
    #[arg(long = "pipeline", requires = "workflow")]
    pub pipeline: Option<String>,

    /// Run to fetch; switches to the run view
    #[arg(long = "run-id", requires = "pipeline", conflicts_with = "run")]
    pub run_id: Option<String>,

    /// Write the result here instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    /// What to produce
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Draw this task in its hover state (SVG output only)
    #[arg(long = "highlight")]
    pub highlight: Option<String>,

    /// Surface width in pixels
    #[arg(long = "width", requires = "height", value_parser = dimension)]
    pub width: Option<f64>,

    /// Surface height in pixels
    #[arg(long = "height", requires = "width", value_parser = dimension)]
    pub height: Option<f64>,

    /// Rank direction of the layout
    #[arg(long = "rankdir", value_enum)]
    pub rankdir: Option<RankDir>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Surface dimensions must be finite and positive.
fn dimension(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|_| format!("'{}' is not a number", raw))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("'{}' must be a finite number greater than zero", raw));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_accepts_positive_values() {
        assert_eq!(dimension("800"), Ok(800.0));
        assert_eq!(dimension("0.5"), Ok(0.5));
    }

    #[test]
    fn dimension_rejects_degenerate_values() {
        for raw in ["0", "-1", "NaN", "inf", "-inf", "wide"] {
            assert!(dimension(raw).is_err(), "{} should be rejected", raw);
        }
    }

    #[test]
    fn nan_width_is_a_usage_error() {
        let parsed = Cli::try_parse_from(["pipegraph", "--width", "NaN", "--height", "100"]);
        assert!(parsed.is_err());
    }
}
