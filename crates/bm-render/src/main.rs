//! Bassic offline renderer
//!
//! Usage:
//!   bm-render in.wav out.wav                      - default settings
//!   bm-render in.wav out.wav --crossover 80       - custom crossover
//!   bm-render in.wav out.wav --state params.json  - restore saved parameters

use std::path::PathBuf;

use anyhow::{Context, Result};
use bm_core::Channel;
use bm_engine::{BassManager, EngineConfig};
use bm_state::ParamState;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bm-render", about = "Apply 5.1 bass management to a WAV file")]
struct Cli {
    /// Input WAV with at least six channels (L R C LFE Ls Rs)
    input: PathBuf,

    /// Output WAV (32-bit float)
    output: PathBuf,

    /// Crossover frequency in Hz (20-250)
    #[arg(long)]
    crossover: Option<f64>,

    /// LFE low-pass frequency in Hz (20-250)
    #[arg(long)]
    lfe_cutoff: Option<f64>,

    /// Set the LFE boost flag
    #[arg(long)]
    lfe_boost: bool,

    /// Processing block size in samples
    #[arg(long, default_value_t = 512)]
    block_size: usize,

    /// Engine configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Parameter state to restore before rendering (JSON)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Write the effective parameter state here after rendering
    #[arg(long)]
    save_state: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: EngineConfig = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    log::info!("Engine config loaded from {}", path.display());
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;
    let mut engine = BassManager::new(config).context("Invalid engine configuration")?;

    if let Some(path) = &cli.state {
        ParamState::load(path)
            .and_then(|state| state.restore(engine.params()))
            .with_context(|| format!("Failed to restore state {}", path.display()))?;
    }

    let params = engine.params();
    if let Some(hz) = cli.crossover {
        params.set_crossover_frequency(hz);
    }
    if let Some(hz) = cli.lfe_cutoff {
        params.set_lfe_low_pass_frequency(hz);
    }
    if cli.lfe_boost {
        params.set_lfe_boost(true);
    }
    log::info!(
        "Crossover {:.1} Hz, LFE cutoff {:.1} Hz, boost {}",
        params.crossover_frequency(),
        params.lfe_low_pass_frequency(),
        params.lfe_boost()
    );

    let mut audio = bm_render::read_wav(&cli.input)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;
    log::info!(
        "Input: {} channels, {} Hz, {:.2} s",
        audio.num_channels(),
        audio.sample_rate,
        audio.duration_secs()
    );

    let report = bm_render::render(&mut engine, &mut audio, cli.block_size)
        .context("Render failed")?;
    for channel in Channel::ALL {
        log::info!("  {:>3} peak {:7.2} dBFS", channel, report.peak_db(channel));
    }

    bm_render::write_wav(&cli.output, &audio)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    log::info!("Wrote {}", cli.output.display());

    if let Some(path) = &cli.save_state {
        ParamState::capture(engine.params())
            .save(path)
            .with_context(|| format!("Failed to save state {}", path.display()))?;
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    run(Cli::parse())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["bm-render", "in.wav", "out.wav"]).unwrap();
        assert_eq!(cli.block_size, 512);
        assert!(cli.crossover.is_none());
        assert!(!cli.lfe_boost);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "bm-render",
            "in.wav",
            "out.wav",
            "--crossover",
            "80",
            "--lfe-cutoff",
            "100",
            "--lfe-boost",
            "--block-size",
            "256",
        ])
        .unwrap();
        assert_eq!(cli.crossover, Some(80.0));
        assert_eq!(cli.lfe_cutoff, Some(100.0));
        assert!(cli.lfe_boost);
        assert_eq!(cli.block_size, 256);
    }

    #[test]
    fn test_cli_requires_paths() {
        assert!(Cli::try_parse_from(["bm-render", "in.wav"]).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let missing = PathBuf::from("/nonexistent/engine.json");
        assert!(load_config(Some(&missing)).is_err());
        assert_eq!(load_config(None).unwrap(), EngineConfig::default());
    }
}
