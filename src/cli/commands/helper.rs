use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use super::super::args::CommonArgs;
use crate::{
    config::{CONFIG_FILE_NAME, load_config},
    core::{ExtractContext, ScanOptions},
};

/// Builds the run context from CLI arguments.
///
/// Configuration priority (highest to lowest): CLI arguments, the
/// `.glotxrc.json` file, built-in defaults.
pub fn load_context(common: &CommonArgs) -> Result<ExtractContext> {
    let root_dir = common
        .source_root
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    // Walking up needs an absolute path; scanning keeps the given one.
    let search_dir = root_dir.canonicalize().unwrap_or_else(|_| root_dir.clone());
    let loaded = load_config(&search_dir)?;
    if !loaded.from_file {
        info!("no {} found, using default configuration", CONFIG_FILE_NAME);
    }

    let mut config = loaded.config;
    if let Some(namespace) = &common.namespace {
        config.namespace = namespace.clone();
    }
    if common.no_cache {
        config.cache = false;
    }

    ExtractContext::new(config, root_dir)
}

pub fn scan_options(ctx: &ExtractContext) -> ScanOptions {
    ScanOptions {
        use_cache: ctx.config.cache,
    }
}
