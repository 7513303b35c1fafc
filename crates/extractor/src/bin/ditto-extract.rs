// ABOUTME: CLI binary for the ditto job posting extractor.
// ABOUTME: Extracts one or more job URLs and prints a JSON array of per-URL results.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use ditto_extractor::{CancellationToken, ExtractedJobData, Extractor};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ditto-extract")]
#[command(about = "Extract structured job data from job posting URLs")]
struct Args {
    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Print single-line JSON instead of pretty-printed
    #[arg(long = "compact")]
    compact: bool,

    /// Reject hosts without a dedicated parser instead of using the generic one
    #[arg(long = "strict")]
    strict: bool,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", default_value_t = 10)]
    timeout: u64,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// Job posting URLs to extract
    #[arg(required = true)]
    urls: Vec<String>,
}

/// One line of CLI output per input URL.
#[derive(Debug, Serialize)]
struct UrlResult {
    url: String,
    ok: bool,
    data: Option<ExtractedJobData>,
    warnings: Vec<String>,
    error: Option<String>,
    code: Option<&'static str>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    let extractor = match Extractor::builder()
        .timeout(Duration::from_secs(args.timeout))
        .strict(args.strict)
        .build()
    {
        Ok(extractor) => extractor,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("interrupted, cancelling");
            signal_token.cancel();
        }
    });

    let start = Instant::now();
    let mut results = Vec::with_capacity(args.urls.len());
    let mut had_error = false;

    for url in &args.urls {
        match extractor.extract(&cancel, url).await {
            Ok(extraction) => results.push(UrlResult {
                url: url.clone(),
                ok: true,
                data: Some(extraction.data),
                warnings: extraction.warnings,
                error: None,
                code: None,
            }),
            Err(e) => {
                eprintln!("error extracting {}: {}", url, e);
                had_error = true;
                results.push(UrlResult {
                    url: url.clone(),
                    ok: false,
                    data: None,
                    warnings: Vec::new(),
                    error: Some(e.to_string()),
                    code: Some(e.code.as_str()),
                });
            }
        }
    }

    let elapsed = start.elapsed();

    let rendered = if args.compact {
        serde_json::to_string(&results)
    } else {
        serde_json::to_string_pretty(&results)
    };
    let output_str = match rendered {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error serializing results: {}", e);
            return ExitCode::from(1);
        }
    };

    if let Some(output_path) = &args.output {
        if let Err(e) = fs::write(output_path, &output_str) {
            eprintln!("error writing to {:?}: {}", output_path, e);
            had_error = true;
        }
    } else {
        println!("{}", output_str);
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
