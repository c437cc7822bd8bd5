//! rawcopy CLI entry point.
//!
//! Builds a catalogue of one or more source trees, then replays it onto a
//! destination, hard linking files that share an inode.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod args;
mod output;
mod progress;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use path_clean::PathClean;

use args::Args;
use progress::ProgressManager;
use rawcopy_catalogue::{CatalogueBuilder, common_base};
use rawcopy_config::{Config, KindMismatch, load_config};
use rawcopy_copy::{
    AttributeOptions, KindMismatchPolicy, ReplayOptions, count_entries, layout, replay,
};

fn main() {
    let args = Args::parse();

    // Set up logging, an explicit RUST_LOG wins
    if env::var_os("RUST_LOG").is_none() {
        // SAFETY: We're setting this before any other threads are spawned
        unsafe {
            env::set_var("RUST_LOG", args.log_level());
        }
    }
    pretty_env_logger::init();

    if let Err(e) = run(&args) {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_config(args.config.as_deref())?;
    if let Some(path) = &loaded.config_path {
        log::info!("Loaded config {}", path.display());
    }
    let config = loaded.config;

    let cwd = env::current_dir()?;
    let sources = resolve_sources(&cwd, &args.sources)?;
    let destination = args.output.as_ref().map(|path| cwd.join(path).clean());

    let catalogue = match (&args.catalogue, &destination) {
        (Some(path), _) => cwd.join(path).clean(),
        (None, Some(destination)) => layout::default_catalogue_path(destination),
        (None, None) => return Err("either --catalogue or --output is required".into()),
    };

    let progress_mgr = ProgressManager::new(args.should_show_progress(config.progress));

    if catalogue.exists() {
        if !sources.is_empty() {
            output::print_warning(&format!(
                "Catalogue {} already exists, sources are ignored",
                catalogue.display()
            ));
        }
    } else {
        build_catalogue(&sources, &catalogue, &progress_mgr)?;
    }

    if !args.should_replay() {
        return Ok(());
    }
    let Some(destination) = destination else {
        return Ok(());
    };

    output::print_header("Copying");
    output::print_path("Catalogue:", &catalogue);
    output::print_path("Output:", &destination);
    println!();

    let options = replay_options(args, &config);
    let total = if progress_mgr.is_enabled() {
        count_entries(&catalogue)?
    } else {
        0
    };
    let bar = progress_mgr.create_entry_bar(total);

    let result = replay(&catalogue, &destination, &options, |progress| {
        bar.set_position(progress.index + 1);
    });

    bar.finish_and_clear();
    progress_mgr.clear();

    let summary = result?;
    output::print_summary(&summary, options.test_mode);
    Ok(())
}

/// Make sources absolute and normalized, failing on any that does not exist.
fn resolve_sources(cwd: &Path, sources: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    sources
        .iter()
        .map(|source| {
            let absolute = cwd.join(source).clean();
            if fs::symlink_metadata(&absolute).is_err() {
                return Err(format!("Source does not exist: {}", source.display()));
            }
            Ok(absolute)
        })
        .collect()
}

/// Walk the sources and write the catalogue.
fn build_catalogue(
    sources: &[PathBuf],
    catalogue: &Path,
    progress_mgr: &ProgressManager,
) -> Result<(), Box<dyn std::error::Error>> {
    let base = common_base(sources).ok_or("sources are required to build a catalogue")?;

    output::print_header("Building catalogue");
    output::print_path("Base:", &base);

    let spinner = progress_mgr.create_scanning_spinner();
    spinner.set_message(base.display().to_string());
    let result = CatalogueBuilder::new(base, sources.to_vec()).save(catalogue);
    spinner.finish_and_clear();

    let entries = result?;
    output::print_catalogue_built(catalogue, entries);
    Ok(())
}

/// Combine the configuration with command line overrides.
fn replay_options(args: &Args, config: &Config) -> ReplayOptions {
    let kind_mismatch = if args.strict || config.kind_mismatch == KindMismatch::Strict {
        KindMismatchPolicy::Strict
    } else {
        KindMismatchPolicy::Warn
    };

    ReplayOptions {
        range: args.range,
        test_mode: args.test,
        kind_mismatch,
        checkpoint_interval: config.checkpoint_interval,
        reflink: config.reflink,
        attributes: AttributeOptions {
            ownership: config.preserve_ownership,
        },
    }
}
