//! One-shot runs of a preset over in-memory source text.

use sniff_lint_core::{Engine, EngineError, FileOutcome};
use sniff_lint_rules::Preset;
use std::path::Path;

/// File name reported for in-memory sources.
pub const SOURCE_NAME: &str = "input.php";

fn run(preset: Preset, source: &str, fix: bool) -> Result<FileOutcome, EngineError> {
    let engine = Engine::builder()
        .root("")
        .rules(preset.rules())
        .fix(fix)
        .build()?;
    engine.check_source(Path::new(SOURCE_NAME), source)
}

/// Lints `source` with `preset` without fixing anything.
///
/// # Errors
///
/// Returns an error if `source` cannot be tokenized.
pub fn check_source(preset: Preset, source: &str) -> Result<FileOutcome, EngineError> {
    run(preset, source, false)
}

/// Runs the fix loop over `source` with `preset`.
///
/// The corrected text is in [`FileOutcome::fixed`]; it is `None` when
/// nothing changed.
///
/// # Errors
///
/// Returns an error if `source` cannot be tokenized.
pub fn fix_source(preset: Preset, source: &str) -> Result<FileOutcome, EngineError> {
    run(preset, source, true)
}
