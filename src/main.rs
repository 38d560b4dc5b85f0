use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use oligo_billing::config::ConfigLoader;
use oligo_billing::error::EngineResult;
use oligo_billing::matching::{MatcherCredentials, OpenAiBackend, PromptMatcher};
use oligo_billing::pipeline::process_order;

/// Reconciles an oligo synthesis order against the supplier's billing PDF and
/// writes a billing statement into the order directory.
#[derive(Debug, Parser)]
#[command(name = "oligo-billing", version, about)]
struct Args {
    /// Order directory; its name is the order number.
    order_dir: PathBuf,

    /// Print every matcher prompt and raw reply.
    #[arg(long)]
    debug: bool,

    /// Rulebook YAML file. Built-in defaults are used when omitted.
    #[arg(long, env = "OLIGO_BILLING_CONFIG")]
    config: Option<PathBuf>,
}

fn run(args: &Args) -> EngineResult<()> {
    let config = match &args.config {
        Some(path) => ConfigLoader::load(path)?,
        None => ConfigLoader::default(),
    };

    let matcher_config = config.matcher();
    let credentials = MatcherCredentials::from_env(&matcher_config.api_key_env)?;
    let backend = OpenAiBackend::new(matcher_config, credentials)?;
    let mut matcher = PromptMatcher::new(backend).with_debug(args.debug);
    if let Some(instruction) = &matcher_config.instruction {
        matcher = matcher.with_instruction(instruction.clone());
    }

    let outcome = process_order(&args.order_dir, &config, &matcher)?;

    println!("{}", outcome.result.verdict_message());
    info!(
        statement = %outcome.statement_path.display(),
        expected_total = outcome.result.expected_total,
        actual_total = outcome.result.actual_total,
        matcher_calls = outcome.result.audit_trace.matcher_calls,
        "Run complete"
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    finish(run(&args), &mut std::io::stderr())
}

/// Maps the run outcome to an exit code, reporting a failure once on `err`.
fn finish(result: EngineResult<()>, err: &mut impl Write) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = writeln!(err, "error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oligo_billing::error::EngineError;

    #[test]
    fn test_failure_is_reported_once() {
        let mut err = Vec::new();
        let code = finish(
            Err(EngineError::MissingCredential {
                var: "OPENAI_API_KEY".to_string(),
            }),
            &mut err,
        );

        assert_eq!(code, ExitCode::FAILURE);
        let text = String::from_utf8(err).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("error: "));
        assert!(text.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_success_writes_nothing() {
        let mut err = Vec::new();
        assert_eq!(finish(Ok(()), &mut err), ExitCode::SUCCESS);
        assert!(err.is_empty());
    }
}
