//! Terminal output formatting.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;

use colored::Colorize;
use rawcopy_copy::ReplaySummary;

/// Print a header message.
pub fn print_header(message: &str) {
    println!("\n{}\n", message.bold());
}

/// Print a labelled path.
pub fn print_path(label: &str, path: &Path) {
    println!("{label:<12} {}", path.display().to_string().cyan());
}

/// Print the outcome of a catalogue build.
pub fn print_catalogue_built(path: &Path, entries: u64) {
    println!(
        "{} Catalogue written to {} ({} entries)",
        "✓".green(),
        path.display().to_string().cyan(),
        entries
    );
}

/// Print the replay summary.
pub fn print_summary(summary: &ReplaySummary, test_mode: bool) {
    if test_mode {
        println!("{}", "Test run, nothing was changed.".yellow());
    }
    if let Some(index) = summary.resumed_from {
        println!("Resumed from checkpoint {index}");
    }

    let rows = [
        ("processed", summary.entries_processed),
        ("directories", summary.directories_created),
        ("files copied", summary.files_copied),
        ("hard links", summary.hard_links_created),
        ("symlinks", summary.symlinks_created),
        ("present", summary.already_present),
        ("special", summary.special_skipped),
        ("missing", summary.sources_missing),
    ];
    for (label, count) in rows {
        println!("  {} {label:<14} {count}", "•".dimmed());
    }

    if summary.errors > 0 {
        print_warning(&format!(
            "{} entries could not be copied, see the log for details",
            summary.errors
        ));
    } else {
        println!("✅ Copy complete!");
    }
}

/// Print error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", "Warning:".yellow().bold(), message);
}
