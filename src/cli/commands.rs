//! CLI command implementations
//!
//! Each command loads the config, opens the chain read-only, and returns
//! one JSON value. `run_command` prints it as the response, or prints the
//! error response and hands the error back to `main`.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::catalog::{validate_path, ChainCatalog, ChainWalker, RestorePlan};
use crate::chain::ArchiveNum;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::restore::{
    ArchiveSource, DirectorySource, RestoreEngine, RestoreOptions, TarSource,
};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// How archive data is stored under the chain directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// `<archive>/data/<path>` plus `<archive>/meta.json`
    #[default]
    Directory,
    /// `<archive>/data.tar`
    Tar,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chain directory holding `chain.json` (required)
    pub chain_dir: String,

    /// Report deletions instead of treating them as not found (default: false)
    #[serde(default)]
    pub report_removals: bool,

    /// Apply saved uid/gid on restore (default: false)
    #[serde(default)]
    pub restore_ownership: bool,

    /// Archive data layout (default: directory)
    #[serde(default)]
    pub source: SourceFormat,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        let file = path.display().to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("chain_dir", config.chain_dir.as_str()), ("config", file.as_str())],
        );

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> CliResult<()> {
        if self.chain_dir.trim().is_empty() {
            return Err(CliError::config_error("chain_dir must not be empty"));
        }
        Ok(())
    }

    /// Get the chain directory as a path
    pub fn chain_path(&self) -> PathBuf {
        PathBuf::from(&self.chain_dir)
    }

    fn archive_source(&self) -> Box<dyn ArchiveSource> {
        match self.source {
            SourceFormat::Directory => Box::new(DirectorySource::new(self.chain_path())),
            SourceFormat::Tar => Box::new(TarSource::new(self.chain_path())),
        }
    }
}

/// Run the CLI with parsed arguments
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command and print its JSON response
pub fn run_command(cmd: Command) -> CliResult<()> {
    let result = match cmd {
        Command::List { config } => list(&config),
        Command::Resolve {
            config,
            path,
            at,
            report_removals,
        } => resolve(&config, &path, at, report_removals),
        Command::Plan {
            config,
            at,
            include,
        } => plan(&config, at, include.as_deref()),
        Command::Restore {
            config,
            target,
            at,
            include,
            overwrite,
        } => restore(&config, &target, at, include.as_deref(), overwrite),
    };

    match result {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// List the chain's archives, oldest first
pub fn list(config_path: &Path) -> CliResult<Value> {
    let config = Config::load(config_path)?;
    let chain = ChainCatalog::open(&config.chain_path())?;

    let archives: Vec<Value> = chain
        .registry()
        .iter()
        .map(|info| {
            let paths = chain.catalog(info.num()).map_or(0, |c| c.len());
            json!({
                "num": info.num(),
                "name": info.name(),
                "created_at": info.created_at(),
                "paths": paths,
            })
        })
        .collect();

    Ok(json!({
        "chain_id": chain.chain_id(),
        "archives": archives,
    }))
}

/// Resolve one path
pub fn resolve(
    config_path: &Path,
    path: &str,
    at: Option<u32>,
    report_removals: bool,
) -> CliResult<Value> {
    let config = Config::load(config_path)?;
    validate_path(path)?;

    let chain = ChainCatalog::open(&config.chain_path())?;
    let walker = walker_at(&chain, report_removals || config.report_removals, at)?;
    let metrics = MetricsRegistry::new();
    let decision = RestorePlan::resolve_path(&walker, path, &metrics)?;

    Ok(json!({
        "as_of": walker.target(),
        "decision": decision,
        "content_archive": decision.content_archive(),
        "metadata_archive": decision.metadata_archive(),
    }))
}

/// Build the restore plan
pub fn plan(config_path: &Path, at: Option<u32>, include: Option<&str>) -> CliResult<Value> {
    let config = Config::load(config_path)?;
    let filter = include.map(Regex::new).transpose()?;

    let chain = ChainCatalog::open(&config.chain_path())?;
    let walker = walker_at(&chain, config.report_removals, at)?;
    let metrics = MetricsRegistry::new();
    let plan = RestorePlan::build_filtered(&walker, filter.as_ref(), &metrics)?;

    Ok(json!({
        "as_of": walker.target(),
        "summary": plan.summary(),
        "archives_needed": plan.archives_needed(),
        "decisions": plan.decisions(),
    }))
}

/// Restore into a target directory
pub fn restore(
    config_path: &Path,
    target: &Path,
    at: Option<u32>,
    include: Option<&str>,
    overwrite: bool,
) -> CliResult<Value> {
    let config = Config::load(config_path)?;
    let filter = include.map(Regex::new).transpose()?;

    let chain = ChainCatalog::open(&config.chain_path())?;
    // removals are always reported so the report can list them
    let walker = walker_at(&chain, true, at)?;
    let metrics = MetricsRegistry::new();
    let plan = RestorePlan::build_filtered(&walker, filter.as_ref(), &metrics)?;

    let source = config.archive_source();
    let options = RestoreOptions {
        restore_ownership: config.restore_ownership,
        overwrite,
    };
    let report =
        RestoreEngine::new(chain.registry(), &metrics).restore(&plan, source.as_ref(), target, options)?;

    Ok(json!({
        "report": report,
        "metrics": metrics.snapshot(),
    }))
}

fn walker_at(chain: &ChainCatalog, report_removals: bool, at: Option<u32>) -> CliResult<ChainWalker<'_>> {
    let walker = ChainWalker::new(chain, report_removals);
    match at {
        None => Ok(walker),
        Some(n) => {
            let num = ArchiveNum::new(n)
                .ok_or_else(|| CliError::invalid_argument("--at must be 1 or greater"))?;
            Ok(walker.up_to(num)?)
        }
    }
}
