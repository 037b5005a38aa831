//! Helpers to parse CLI arguments in the accompanying
//! binaries.
//!
//! APIs here shouldn't be considered stable / used as a
//! library.

use std::path::Path;

pub use clap::{App, Arg};
use indicatif::{ProgressBar, ProgressStyle};
pub use inflector::Inflector;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::dji::NativeDecoder;
use crate::validate::{validate_heuristics, validate_with, DiagnosticReport};

#[macro_export]
macro_rules! args_parser {
    ($name:expr) => {{
        $crate::cli::App::new($name)
            .version(clap::crate_version!())
            .author(clap::crate_authors!())
    }};
}

#[macro_export]
macro_rules! arg {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name).value_name(&$name.to_screaming_snake_case())
    }};
}

#[macro_export]
macro_rules! opt {
    ($name:expr) => {{
        use $crate::cli::Inflector;
        $crate::cli::Arg::with_name($name)
            .long(&$name.to_kebab_case())
            .value_name(&$name.to_screaming_snake_case())
    }};
}

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {wide_bar:cyan/blue} {pos:>7}/{len:7}"),
    );
    bar
}

/// Validate many paths in parallel, one native probe per worker.
pub fn validate_paths_par<D>(paths: Vec<String>, decoder: &D) -> Vec<DiagnosticReport>
where
    D: NativeDecoder + Sync,
{
    let bar = progress_bar(paths.len() as u64);
    let reports = paths
        .into_par_iter()
        .map(|p| validate_with(Path::new(&p), decoder))
        .inspect(|_| bar.inc(1))
        .collect();
    bar.finish();
    reports
}

/// Heuristics-only variant for builds without the `dji` feature.
pub fn heuristic_paths_par(paths: Vec<String>) -> Vec<DiagnosticReport> {
    let bar = progress_bar(paths.len() as u64);
    let reports = paths
        .into_par_iter()
        .map(|p| validate_heuristics(Path::new(&p)))
        .inspect(|_| bar.inc(1))
        .collect();
    bar.finish();
    reports
}
