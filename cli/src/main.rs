//! powork: generate and check SHA-256 proof-of-work from the command line.

mod config;
mod input;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use powork_utils::{format_duration, format_rate, init_logging, LogFormat};
use powork_work::generator::STAT_HASHES;
use powork_work::{
    expected_attempts, verify_work, work_difficulty, WorkError, WorkGenerator, WorkNonce,
};

use crate::config::{CliConfig, ConfigOverrides};
use crate::input::{parse_payload_hex, parse_u64};

#[derive(Parser)]
#[command(name = "powork", version, about = "SHA-256 proof-of-work generator and verifier")]
struct Cli {
    /// Path to a TOML configuration file. File settings are used as the
    /// base; CLI flags and env vars override them.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "POWORK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

/// Payload bytes, given as hex or as literal text. Empty when neither is set.
#[derive(clap::Args)]
struct PayloadArgs {
    /// Payload as hex (optional 0x prefix).
    #[arg(long, conflicts_with = "text")]
    payload: Option<String>,

    /// Payload as UTF-8 text.
    #[arg(long)]
    text: Option<String>,
}

impl Cli {
    /// Flags (and their env vars) that replace config file values.
    fn overrides(&self) -> ConfigOverrides {
        let (workers, timeout_secs) = match &self.command {
            Command::Generate {
                workers,
                timeout_secs,
                ..
            } => (*workers, *timeout_secs),
            _ => (None, None),
        };
        ConfigOverrides {
            workers,
            log_level: self.log_level.clone(),
            log_format: self.log_format,
            timeout_secs,
        }
    }
}

impl PayloadArgs {
    fn bytes(&self) -> anyhow::Result<Vec<u8>> {
        match (&self.payload, &self.text) {
            (Some(hex), _) => parse_payload_hex(hex).context("bad --payload"),
            (None, Some(text)) => Ok(text.as_bytes().to_vec()),
            (None, None) => Ok(Vec::new()),
        }
    }
}

#[derive(clap::Subcommand)]
enum Command {
    /// Search for a nonce meeting the difficulty.
    Generate {
        #[command(flatten)]
        payload: PayloadArgs,

        /// Difficulty threshold (decimal or 0x-prefixed hex).
        #[arg(long, value_parser = parse_u64)]
        difficulty: u64,

        /// Worker threads (values below 1 are clamped to 1).
        #[arg(long, env = "POWORK_WORKERS", allow_negative_numbers = true)]
        workers: Option<isize>,

        /// Give up after this many seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Check whether a nonce meets the difficulty. Exits with status 1 if not.
    Verify {
        #[command(flatten)]
        payload: PayloadArgs,

        /// Difficulty threshold (decimal or 0x-prefixed hex).
        #[arg(long, value_parser = parse_u64)]
        difficulty: u64,

        /// Nonce to check (decimal or 0x-prefixed hex).
        #[arg(long, value_parser = parse_u64)]
        nonce: u64,
    },

    /// Print the work value a nonce achieves.
    Difficulty {
        #[command(flatten)]
        payload: PayloadArgs,

        /// Nonce to evaluate (decimal or 0x-prefixed hex).
        #[arg(long, value_parser = parse_u64)]
        nonce: u64,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())
        .with_context(|| format!("loading config from {:?}", cli.config))?
        .apply_overrides(cli.overrides());

    init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::debug!("Loaded config from {}", path.display());
    }

    let ok = match cli.command {
        Command::Generate {
            payload,
            difficulty,
            ..
        } => {
            let timeout = config.timeout_secs.map(Duration::from_secs);
            cmd_generate(&payload.bytes()?, difficulty, config.workers, timeout)?
        }
        Command::Verify {
            payload,
            difficulty,
            nonce,
        } => cmd_verify(&payload.bytes()?, difficulty, nonce),
        Command::Difficulty { payload, nonce } => {
            cmd_difficulty(&payload.bytes()?, nonce);
            true
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn cmd_generate(
    payload: &[u8],
    difficulty: u64,
    workers: isize,
    timeout: Option<Duration>,
) -> anyhow::Result<bool> {
    let generator = WorkGenerator::new(workers);
    tracing::info!(
        workers = generator.workers(),
        expected_attempts = expected_attempts(difficulty),
        "Generating work for difficulty {difficulty:#018x}"
    );

    let started = Instant::now();
    let result = match timeout {
        Some(timeout) => generator.generate_with_timeout(payload, difficulty, timeout),
        None => {
            let cancel = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&cancel);
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .context("installing Ctrl-C handler")?;
            generator.generate_cancellable(payload, difficulty, &cancel)
        }
    };
    let elapsed = started.elapsed();
    let hashes = generator.stats().get(STAT_HASHES);
    tracing::debug!(stats = ?generator.stats().snapshot(), "Generator counters");

    match result {
        Ok(nonce) => {
            tracing::info!(
                hashes,
                "Found nonce in {} ({})",
                format_duration(elapsed),
                format_rate(hashes, elapsed)
            );
            println!("{}", found_line(payload, nonce));
            Ok(true)
        }
        Err(err @ (WorkError::Cancelled | WorkError::TimedOut { .. })) => {
            tracing::warn!(hashes, "Stopped after {}: {err}", format_duration(elapsed));
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

/// `<nonce as 16 hex digits> <work value as 0x-prefixed hex>`
fn found_line(payload: &[u8], nonce: WorkNonce) -> String {
    format!("{nonce} {:#018x}", work_difficulty(payload, nonce.0))
}

fn cmd_verify(payload: &[u8], difficulty: u64, nonce: u64) -> bool {
    let valid = verify_work(payload, difficulty, nonce);
    println!("{}", if valid { "valid" } else { "invalid" });
    valid
}

fn cmd_difficulty(payload: &[u8], nonce: u64) {
    let value = work_difficulty(payload, nonce);
    println!("{value:#018x}");
    tracing::info!(
        "Nonce {nonce} reaches a difficulty worth ~{:.0} attempts",
        expected_attempts(value)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_generate_with_hex_difficulty_and_negative_workers() {
        let cli = Cli::try_parse_from([
            "powork",
            "generate",
            "--text",
            "so",
            "--difficulty",
            "0xf00fffc000000000",
            "--workers",
            "-5",
        ])
        .expect("should parse");
        match cli.command {
            Command::Generate {
                payload,
                difficulty,
                workers,
                timeout_secs,
            } => {
                assert_eq!(payload.bytes().unwrap(), b"so");
                assert_eq!(difficulty, 0xf00f_ffc0_0000_0000);
                assert_eq!(workers, Some(-5));
                assert_eq!(timeout_secs, None);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn payload_and_text_conflict() {
        let result = Cli::try_parse_from([
            "powork", "verify", "--payload", "00", "--text", "x", "--difficulty", "0", "--nonce",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn missing_payload_is_empty() {
        let cli = Cli::try_parse_from(["powork", "difficulty", "--nonce", "3593662"])
            .expect("should parse");
        match cli.command {
            Command::Difficulty { payload, nonce } => {
                assert!(payload.bytes().unwrap().is_empty());
                assert_eq!(nonce, 3_593_662);
            }
            _ => panic!("expected difficulty"),
        }
    }

    #[test]
    fn flags_override_config_file() {
        let cli = Cli::try_parse_from([
            "powork",
            "--log-format",
            "json",
            "generate",
            "--difficulty",
            "0",
            "--workers",
            "6",
            "--timeout-secs",
            "9",
        ])
        .expect("should parse");
        let file = CliConfig::from_toml_str("workers = 2\ntimeout_secs = 1\nlog_level = \"warn\"")
            .expect("should parse");
        let config = file.apply_overrides(cli.overrides());
        assert_eq!(config.workers, 6);
        assert_eq!(config.timeout_secs, Some(9));
        assert_eq!(config.log_format, LogFormat::Json);
        // No --log-level flag, so the file wins (unless POWORK_LOG_LEVEL is set).
        if std::env::var_os("POWORK_LOG_LEVEL").is_none() {
            assert_eq!(config.log_level, "warn");
        }
    }

    #[test]
    fn verify_and_difficulty_do_not_override_workers() {
        let cli = Cli::try_parse_from(["powork", "verify", "--difficulty", "0", "--nonce", "0"])
            .expect("should parse");
        let overrides = cli.overrides();
        assert_eq!(overrides.workers, None);
        assert_eq!(overrides.timeout_secs, None);
    }

    #[test]
    fn found_line_has_hex_nonce_and_work_value() {
        let line = found_line(&[1, 2, 3], WorkNonce(147_372_695));
        let (nonce, value) = line.split_once(' ').expect("two fields");
        assert_eq!(nonce, "0000000008c8ba97");
        assert_eq!(u64::from_str_radix(nonce, 16).unwrap(), 147_372_695);
        let value = u64::from_str_radix(value.trim_start_matches("0x"), 16).unwrap();
        assert_eq!(value, work_difficulty(&[1, 2, 3], 147_372_695));
        assert!(value >= 0xffff_ffc0_0000_0000);
    }

    #[test]
    fn verify_reports_golden_vector() {
        assert!(cmd_verify(&[1, 2, 3], 0xffff_ffc0_0000_0000, 147_372_695));
        assert!(!cmd_verify(&[1, 2, 3], 0xffff_ffc0_0000_0000, 147_372_696));
    }

    #[test]
    fn generate_with_timeout_succeeds_on_easy_work() {
        let found = cmd_generate(b"cli", 0xff00_0000_0000_0000, 2, Some(Duration::from_secs(30)))
            .expect("generation should not error");
        assert!(found);
    }
}
