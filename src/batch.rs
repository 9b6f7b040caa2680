//! Unpacking several archives into one output directory.

use std::path::{Path, PathBuf};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::warn;

use crate::{
    error::Error,
    extract::{ExtractOptions, ExtractSummary},
    unpack,
};

/// What to do when one archive of a batch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnError {
    /// Stop at the first failing archive.
    #[default]
    Halt,
    /// Log the failure and carry on with the next archive.
    Skip,
}

/// Outcome of a batch, per source archive.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub extracted: Vec<(PathBuf, ExtractSummary)>,
    pub failed: Vec<(PathBuf, Error)>,
    /// Sources never attempted because an earlier one failed under [`OnError::Halt`].
    pub skipped: Vec<PathBuf>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    /// Sum over all successfully extracted archives.
    pub fn total(&self) -> ExtractSummary {
        let mut total = ExtractSummary::default();
        for (_, summary) in &self.extracted {
            total += *summary;
        }
        total
    }
}

fn bytes_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "[eta {eta}] {bar:40.cyan/blue} {decimal_bytes:>7}/{decimal_total_bytes:7} {msg}",
    )
    .map(|style| style.progress_chars("##-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Unpacks each of `sources` into `output`, one after the other.
///
/// The archives share nothing but the output directory, so a later archive
/// overwrites files written by an earlier one.
pub async fn unpack_all(
    sources: &[impl AsRef<Path>],
    output: &Path,
    options: &ExtractOptions,
    on_error: OnError,
    progress: &MultiProgress,
) -> BatchReport {
    let mut report = BatchReport::default();
    let overall = progress.add(ProgressBar::new(sources.len() as u64));

    let mut remaining = sources.iter().map(|source| source.as_ref());
    for source in remaining.by_ref() {
        let bar = progress.add(ProgressBar::new(0));
        bar.set_style(bytes_style());
        bar.set_message(source.display().to_string());

        let result = unpack(source, output, options, &bar).await;
        bar.finish_and_clear();
        progress.remove(&bar);
        overall.inc(1);

        match result {
            Ok(summary) => report.extracted.push((source.to_path_buf(), summary)),
            Err(err) => {
                progress.suspend(|| warn!("{}: {err}", source.display()));
                report.failed.push((source.to_path_buf(), err));
                if on_error == OnError::Halt {
                    break;
                }
            }
        }
    }
    report.skipped = remaining.map(Path::to_path_buf).collect();

    overall.finish_and_clear();
    report
}
