//! Logit QRE Binary
//!
//! Reads a game in .nfg or .efg format, traces the principal branch of the
//! logit correspondence, and writes one CSV line per point to stdout.

mod config;

use anyhow::Context;
use clap::Parser;
use config::Config;
use qre_game::Game;
use qre_path::Csv;
use qre_path::Likelihood;
use qre_path::Logit;
use qre_path::LogitMap;
use qre_path::Summary;
use qre_path::Tracer;
use std::io::BufWriter;
use std::io::Write;

fn main() {
    let config = match Config::try_parse() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if config.help {
        eprintln!("{}", Config::usage());
        std::process::exit(1);
    }
    qre_core::log(qre_core::verbosity(config.verbose));
    if !config.quiet {
        eprintln!("{}\n", config::BANNER);
    }
    if let Err(e) = run(&config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    let text = config.input().context("reading game")?;
    let game = Game::try_from(text.as_str()).context("parsing game")?;
    let summary = match game {
        Game::Strategic(ref game) => trace(&Logit::from(game), config)?,
        Game::Extensive(ref tree) if config.strategic => {
            let game = tree.strategic()?;
            trace(&Logit::from(&game), config)?
        }
        Game::Extensive(ref tree) => trace(&Logit::from(tree), config)?,
    };
    log::info!(
        "{} steps, {} rejections, stopped by {:?}",
        summary.steps,
        summary.rejections,
        summary.termination
    );
    Ok(())
}

fn trace<M: LogitMap>(map: &M, config: &Config) -> anyhow::Result<Summary> {
    let mut tracer = Tracer::new(map, config.settings())?;
    if let Some(ref path) = config.observed {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading frequencies from {}", path.display()))?;
        tracer = tracer.observe(Likelihood::parse(&text, map.shape())?);
    }
    let mut csv = Csv::new(BufWriter::new(std::io::stdout().lock()), config.decimals);
    let result = tracer.trace(&mut csv);
    csv.into_inner().flush()?;
    Ok(result?)
}
