//! Engine: file discovery, the per-file fix loop and report aggregation.

use crate::config::{Config, ConfigError};
use crate::context::{FileContext, RuleContext};
use crate::dispatcher::Dispatcher;
use crate::fixer::Fixer;
use crate::rule::{Rule, RuleBox};
use crate::token::TokenStream;
use crate::tokenizer::{PhpTokenizer, TokenizeError, Tokenizer};
use crate::types::{Location, Report, Severity, Violation};
use crate::utils::suppression::Suppressions;

use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Code of the warning raised when the fix loop hits its pass cap.
pub const FIXED_POINT_NOT_REACHED: &str = "FixedPointNotReached";

/// Code of the error raised when fixed text no longer tokenizes.
pub const FIX_BROKE_SOURCE: &str = "FixBrokeSource";

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum EngineError {
    /// IO error reading or walking files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Source file could not be tokenized.
    #[error("Tokenize error in {path}: {source}")]
    Tokenize {
        /// Path to the file that failed.
        path: PathBuf,
        /// Underlying tokenizer error.
        source: TokenizeError,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Directory walk error.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring an [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    include_patterns: Vec<String>,
    config: Option<Config>,
    fix: bool,
    max_passes: Option<usize>,
    tokenizer: Option<Box<dyn Tokenizer>>,
    fail_on_parse_error: bool,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the engine.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the engine.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed rules to the engine.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = RuleBox>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds an include glob pattern.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Enables fix mode (default: report only).
    #[must_use]
    pub fn fix(mut self, fix: bool) -> Self {
        self.fix = fix;
        self
    }

    /// Caps the number of passes per file.
    #[must_use]
    pub fn max_passes(mut self, passes: usize) -> Self {
        self.max_passes = Some(passes);
        self
    }

    /// Replaces the default [`PhpTokenizer`].
    #[must_use]
    pub fn tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Some(Box::new(tokenizer));
        self
    }

    /// Sets whether to fail on tokenize errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be resolved or a glob
    /// pattern is invalid.
    pub fn build(self) -> Result<Engine, EngineError> {
        let config = self.config.unwrap_or_default();

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        let mut include_patterns = self.include_patterns;
        include_patterns.extend(config.analyzer.include.iter().cloned());
        for pattern in exclude_patterns.iter().chain(&include_patterns) {
            glob::Pattern::new(pattern)?;
        }

        let mut dispatcher = Dispatcher::new();
        for rule in self.rules {
            if !config.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }
            let severity = config.rule_severity(rule.name());
            dispatcher.register_with_severity(rule, severity);
        }

        let max_passes = self
            .max_passes
            .unwrap_or(config.fixer.max_passes)
            .max(1);

        Ok(Engine {
            root,
            dispatcher,
            exclude_patterns,
            include_patterns,
            fix: self.fix,
            max_passes,
            tokenizer: self
                .tokenizer
                .unwrap_or_else(|| Box::new(PhpTokenizer::new())),
            respect_gitignore: config.analyzer.respect_gitignore,
            parallelism: config.analyzer.parallelism,
            fail_on_parse_error: self.fail_on_parse_error,
        })
    }
}

/// Outcome of linting (and possibly fixing) one file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// Path relative to the engine root.
    pub path: PathBuf,
    /// Violations fixed in any pass, then those still present after the
    /// last pass, then engine notices.
    pub violations: Vec<Violation>,
    /// Corrected text, present only when fixes changed the source.
    pub fixed: Option<String>,
    /// Number of dispatcher passes run.
    pub passes: usize,
    /// Whether the last pass applied no fixes.
    pub converged: bool,
}

impl FileOutcome {
    /// Splits the outcome into a one-file report and the corrected text.
    #[must_use]
    pub fn into_parts(self) -> (Report, Option<String>) {
        let mut report = Report::new();
        report.record_file(self.path);
        for violation in self.violations {
            report.add(violation);
        }
        (report, self.fixed)
    }
}

/// A file whose content was corrected by the fix loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedFile {
    /// Path to write to.
    pub path: PathBuf,
    /// Corrected content.
    pub content: String,
}

/// Result of analyzing a directory tree.
#[derive(Debug, Default)]
pub struct Analysis {
    /// Aggregate report over all files.
    pub report: Report,
    /// Files with corrected content (fix mode only).
    pub fixed_files: Vec<FixedFile>,
}

type DedupKey = (Option<String>, String, String, Option<usize>, Option<usize>);

/// Fixed violations gathered across passes, one per dedup key.
#[derive(Default)]
struct FixedViolations {
    seen: HashSet<DedupKey>,
    violations: Vec<Violation>,
}

impl FixedViolations {
    /// Moves the fixed violations out of `pass`, leaving the unfixed ones.
    fn commit(&mut self, pass: &mut Vec<Violation>) {
        let (fixed, unfixed): (Vec<_>, Vec<_>) = pass.drain(..).partition(|v| v.fixed);
        *pass = unfixed;
        for violation in fixed {
            if self.seen.insert(violation.dedup_key()) {
                self.violations.push(violation);
            }
        }
    }
}

/// Runs the registered rules over files, re-tokenizing after fixes until the
/// source stops changing.
///
/// Use [`Engine::builder()`] to construct an instance.
pub struct Engine {
    root: PathBuf,
    dispatcher: Dispatcher,
    exclude_patterns: Vec<String>,
    include_patterns: Vec<String>,
    fix: bool,
    max_passes: usize,
    tokenizer: Box<dyn Tokenizer>,
    respect_gitignore: bool,
    parallelism: Option<usize>,
    fail_on_parse_error: bool,
}

impl Engine {
    /// Creates a new builder for configuring an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of active rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.dispatcher.len()
    }

    /// Returns true if the engine applies fixes.
    #[must_use]
    pub fn is_fixing(&self) -> bool {
        self.fix
    }

    /// Pass cap per file.
    #[must_use]
    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// Lints one source text, running the fix loop in fix mode.
    ///
    /// Each pass tokenizes the current text, dispatches every rule once and,
    /// if any changeset landed, renders the edited text for the next pass.
    /// Fixed violations are kept from every pass; unfixed ones only from the
    /// last pass, since earlier passes describe text that no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Tokenize`] if the original source cannot be
    /// tokenized.
    pub fn check_source(&self, path: &Path, source: &str) -> Result<FileOutcome, EngineError> {
        let relative = path
            .strip_prefix(&self.root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);

        let mut text = source.to_string();
        let mut last_good = text.clone();
        let mut fixed = FixedViolations::default();
        let mut pending: Vec<Violation> = Vec::new();
        let mut notices: Vec<Violation> = Vec::new();
        let mut passes = 0;
        let converged;

        loop {
            let tokens = match self.tokenizer.tokenize(&text) {
                Ok(tokens) => tokens,
                Err(err) if passes == 0 => {
                    return Err(EngineError::Tokenize {
                        path: relative,
                        source: err,
                    });
                }
                Err(err) => {
                    warn!(file = %relative.display(), "fixed source no longer tokenizes: {err}");
                    // The text reverts, so nothing from the last pass was applied.
                    for violation in &mut pending {
                        violation.fixed = false;
                    }
                    notices.push(Violation::engine(
                        FIX_BROKE_SOURCE,
                        Severity::Error,
                        Location::file_level(relative.clone()),
                        format!("Fixes from pass {passes} were discarded: {err}"),
                    ));
                    text = last_good;
                    converged = false;
                    break;
                }
            };

            if passes == self.max_passes {
                warn!(file = %relative.display(), passes, "fix loop did not reach a fixed point");
                notices.push(Violation::engine(
                    FIXED_POINT_NOT_REACHED,
                    Severity::Warning,
                    Location::file_level(relative.clone()),
                    format!("Fixes were still being applied after {passes} passes"),
                ));
                converged = false;
                break;
            }
            fixed.commit(&mut pending);
            pending.clear();
            passes += 1;

            let stream = TokenStream::new(tokens);
            let file = FileContext::new(path, &text, &self.root);
            let suppressions = Suppressions::from_stream(&stream);
            let mut fixer = Fixer::new(&stream, self.fix);
            let stats = {
                let mut ctx =
                    RuleContext::new(&file, &stream, &mut fixer, &mut pending, &suppressions);
                self.dispatcher.run(&mut ctx)
            };

            debug!(
                file = %relative.display(),
                pass = passes,
                invocations = stats.invocations,
                applied = fixer.applied_count(),
                rejected = fixer.rejected_count(),
                "pass complete"
            );

            if !self.fix || fixer.applied_count() == 0 {
                converged = true;
                break;
            }
            last_good = std::mem::replace(&mut text, fixer.render());
        }

        fixed.commit(&mut pending);
        let mut violations = fixed.violations;
        violations.append(&mut pending);
        violations.append(&mut notices);

        let fixed = (self.fix && text != source).then_some(text);
        Ok(FileOutcome {
            path: relative,
            violations,
            fixed,
            passes,
            converged,
        })
    }

    /// Analyzes all matching files under the root.
    ///
    /// Files are processed independently in parallel and merged in discovery
    /// order.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails, a file cannot be read, or a file
    /// fails to tokenize while `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<Analysis, EngineError> {
        info!("Starting analysis at {:?}", self.root);
        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        let outcomes = match self.parallelism {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(|| self.run_all(&files)),
            None => self.run_all(&files),
        };

        let mut analysis = Analysis::default();
        for (path, outcome) in files.iter().zip(outcomes) {
            match outcome {
                Ok(outcome) => {
                    let (report, fixed) = outcome.into_parts();
                    analysis.report.merge(report);
                    if let Some(content) = fixed {
                        analysis.fixed_files.push(FixedFile {
                            path: path.clone(),
                            content,
                        });
                    }
                }
                Err(EngineError::Tokenize { path, source }) => {
                    warn!("Failed to tokenize {}: {}", path.display(), source);
                    if self.fail_on_parse_error {
                        return Err(EngineError::Tokenize { path, source });
                    }
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Analysis complete: {} violations in {} files",
            analysis.report.violations.len(),
            analysis.report.files_checked()
        );
        Ok(analysis)
    }

    fn run_all(&self, files: &[PathBuf]) -> Vec<Result<FileOutcome, EngineError>> {
        files
            .par_iter()
            .map(|path| {
                debug!("Analyzing: {}", path.display());
                let content = std::fs::read_to_string(path)?;
                self.check_source(path, &content)
            })
            .collect()
    }

    /// Walks the root, honoring `.gitignore` when configured.
    fn discover_files(&self) -> Result<Vec<PathBuf>, EngineError> {
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .require_git(false);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if !self.should_include(path) {
                continue;
            }
            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }
            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn relative_str(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Checks include patterns; without any, PHP files are included.
    fn should_include(&self, path: &Path) -> bool {
        if self.include_patterns.is_empty() {
            return path.extension().is_some_and(|e| e == "php");
        }
        let rel = self.relative_str(path);
        self.include_patterns.iter().any(|pattern| {
            glob::Pattern::new(pattern).is_ok_and(|p| p.matches(&rel))
        })
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let rel = self.relative_str(path);
        self.exclude_patterns.iter().any(|pattern| {
            if glob::Pattern::new(pattern).is_ok_and(|p| p.matches(&rel)) {
                return true;
            }
            // "**/vendor/**" also excludes top-level "vendor/..."
            let clean = pattern.replace("**/", "").replace("/**", "");
            !clean.is_empty() && !clean.contains('*') && rel.split('/').any(|c| c == clean)
        })
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("root", &self.root)
            .field("rules", &self.dispatcher.rule_names().collect::<Vec<_>>())
            .field("fix", &self.fix)
            .field("max_passes", &self.max_passes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_PASSES;
    use crate::rule::{RuleError, Scan};
    use crate::token::TokenKind;

    /// Collapses any whitespace run wider than one space.
    struct SingleSpace;

    impl Rule for SingleSpace {
        fn name(&self) -> &'static str {
            "single-space"
        }
        fn code(&self) -> &'static str {
            "T100"
        }
        fn interests(&self) -> &'static [TokenKind] {
            &[TokenKind::Whitespace]
        }
        fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
            let token = &ctx.stream()[position];
            if token.length > 1
                && token.column > 1
                && ctx.add_fixable_error("TooWide", "Expected 1 space", Some(position))
            {
                ctx.replace_token(position, " ");
            }
            Ok(Scan::Continue)
        }
    }

    /// Appends a character to every variable, forever.
    struct Grows;

    impl Rule for Grows {
        fn name(&self) -> &'static str {
            "grows"
        }
        fn code(&self) -> &'static str {
            "T101"
        }
        fn interests(&self) -> &'static [TokenKind] {
            &[TokenKind::Variable]
        }
        fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
            if ctx.add_fixable_warning("Grow", "grow", Some(position)) {
                ctx.insert_after(position, "x");
            }
            Ok(Scan::Continue)
        }
    }

    /// Opens a string literal that never closes.
    struct Breaks;

    impl Rule for Breaks {
        fn name(&self) -> &'static str {
            "breaks"
        }
        fn code(&self) -> &'static str {
            "T102"
        }
        fn interests(&self) -> &'static [TokenKind] {
            &[TokenKind::Variable]
        }
        fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
            if ctx.add_fixable_error("Quote", "quote", Some(position)) {
                ctx.insert_after(position, "'");
            }
            Ok(Scan::Continue)
        }
    }

    fn snippet_engine(fix: bool) -> Engine {
        Engine::builder()
            .root("/")
            .rule(SingleSpace)
            .fix(fix)
            .tokenizer(PhpTokenizer::snippet())
            .build()
            .expect("Failed to build engine")
    }

    #[test]
    fn test_builder() {
        let engine = Engine::builder()
            .root(".")
            .exclude("**/vendor/**")
            .build()
            .expect("Failed to build engine");
        assert!(engine.root().exists());
        assert_eq!(engine.max_passes(), DEFAULT_MAX_PASSES);
    }

    #[test]
    fn test_invalid_glob_is_rejected() {
        let err = Engine::builder().root(".").exclude("[").build().unwrap_err();
        assert!(matches!(err, EngineError::Glob(_)));
    }

    #[test]
    fn test_exclude_patterns() {
        let engine = Engine::builder()
            .root("/p")
            .exclude("**/vendor/**")
            .build()
            .expect("Failed to build engine");
        assert!(engine.should_exclude(Path::new("/p/vendor/lib.php")));
        assert!(engine.should_exclude(Path::new("/p/src/vendor/lib.php")));
        assert!(!engine.should_exclude(Path::new("/p/src/vendors.php")));
    }

    #[test]
    fn test_include_defaults_to_php() {
        let engine = Engine::builder().root("/p").build().expect("build");
        assert!(engine.should_include(Path::new("/p/a.php")));
        assert!(!engine.should_include(Path::new("/p/a.rs")));

        let engine = Engine::builder()
            .root("/p")
            .include("src/*.inc")
            .build()
            .expect("build");
        assert!(engine.should_include(Path::new("/p/src/a.inc")));
        assert!(!engine.should_include(Path::new("/p/a.php")));
    }

    #[test]
    fn lint_mode_runs_one_pass() {
        let outcome = snippet_engine(false)
            .check_source(Path::new("/a.php"), "$a  =   1;")
            .unwrap();
        assert_eq!(outcome.passes, 1);
        assert!(outcome.converged);
        assert!(outcome.fixed.is_none());
        assert_eq!(outcome.violations.len(), 2);
        assert!(outcome.violations.iter().all(|v| !v.fixed));
        assert_eq!(outcome.path, PathBuf::from("a.php"));
    }

    #[test]
    fn fix_mode_converges() {
        let outcome = snippet_engine(true)
            .check_source(Path::new("/a.php"), "$a  =   1;")
            .unwrap();
        assert_eq!(outcome.fixed.as_deref(), Some("$a = 1;"));
        assert_eq!(outcome.passes, 2);
        assert!(outcome.converged);
        assert!(outcome.violations.iter().all(|v| v.fixed));
    }

    #[test]
    fn outcome_splits_into_file_report() {
        let outcome = snippet_engine(true)
            .check_source(Path::new("/a.php"), "$a  =   1;")
            .unwrap();
        let (report, fixed) = outcome.into_parts();
        assert_eq!(fixed.as_deref(), Some("$a = 1;"));
        assert_eq!(report.files, vec![PathBuf::from("a.php")]);
        assert_eq!(report.fixed_count(), 2);

        let clean = snippet_engine(false)
            .check_source(Path::new("/b.php"), "$b = 2;")
            .unwrap();
        let (report, fixed) = clean.into_parts();
        assert!(fixed.is_none());
        assert_eq!(report.files_checked(), 1);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn clean_source_is_idempotent() {
        let outcome = snippet_engine(true)
            .check_source(Path::new("/a.php"), "$a = 1;")
            .unwrap();
        assert_eq!(outcome.passes, 1);
        assert!(outcome.fixed.is_none());
        assert!(outcome.violations.is_empty());
    }

    #[test]
    fn pass_cap_surfaces_warning() {
        let engine = Engine::builder()
            .root("/")
            .rule(Grows)
            .fix(true)
            .max_passes(3)
            .tokenizer(PhpTokenizer::snippet())
            .build()
            .unwrap();
        let outcome = engine.check_source(Path::new("/a.php"), "$a;").unwrap();
        assert_eq!(outcome.passes, 3);
        assert!(!outcome.converged);
        assert_eq!(outcome.fixed.as_deref(), Some("$axxx;"));
        let last = outcome.violations.last().unwrap();
        assert_eq!(last.code, FIXED_POINT_NOT_REACHED);
        assert!(last.rule.is_none());
        assert!(last.location.line.is_none());
    }

    #[test]
    fn broken_fix_is_reverted_and_unfixed() {
        let engine = Engine::builder()
            .root("/")
            .rule(Breaks)
            .fix(true)
            .tokenizer(PhpTokenizer::snippet())
            .build()
            .unwrap();
        let outcome = engine.check_source(Path::new("/a.php"), "$a;").unwrap();
        assert!(outcome.fixed.is_none());
        assert!(!outcome.converged);
        assert_eq!(outcome.passes, 1);

        let codes: Vec<_> = outcome
            .violations
            .iter()
            .map(|v| (v.code.as_str(), v.fixed))
            .collect();
        assert_eq!(codes, vec![("Quote", false), (FIX_BROKE_SOURCE, false)]);
    }

    #[test]
    fn tokenize_error_is_reported() {
        let err = snippet_engine(false)
            .check_source(Path::new("/a.php"), "$a = 'open;")
            .unwrap_err();
        assert!(matches!(err, EngineError::Tokenize { .. }));
    }

    #[test]
    fn disabled_rule_is_not_registered() {
        let config = Config::parse("[rules.single-space]\nenabled = false\n").unwrap();
        let engine = Engine::builder()
            .root("/")
            .rule(SingleSpace)
            .config(config)
            .build()
            .unwrap();
        assert_eq!(engine.rule_count(), 0);
    }
}
