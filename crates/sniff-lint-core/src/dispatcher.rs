//! Routes tokens to the rules interested in them.

use crate::context::RuleContext;
use crate::rule::{RuleBox, Scan};
use crate::token::TokenKind;
use crate::types::Severity;
use std::collections::HashMap;
use tracing::{trace, warn};

struct Registered {
    rule: RuleBox,
    severity: Option<Severity>,
}

/// Counters from one dispatcher pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Number of `process` calls made.
    pub invocations: usize,
    /// Number of calls that returned a malformed-input error.
    pub aborted: usize,
}

/// Holds the registered rules and a kind-to-rules index.
///
/// Rules are called in registration order for each token.
#[derive(Default)]
pub struct Dispatcher {
    rules: Vec<Registered>,
    listeners: HashMap<TokenKind, Vec<usize>>,
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule under each kind it is interested in.
    pub fn register(&mut self, rule: RuleBox) {
        self.register_with_severity(rule, None);
    }

    /// Registers a rule whose violations all take `severity` when set.
    pub fn register_with_severity(&mut self, rule: RuleBox, severity: Option<Severity>) {
        let slot = self.rules.len();
        let mut kinds: Vec<TokenKind> = rule.interests().to_vec();
        kinds.dedup();
        for kind in kinds {
            let listeners = self.listeners.entry(kind).or_default();
            if !listeners.contains(&slot) {
                listeners.push(slot);
            }
        }
        self.rules.push(Registered { rule, severity });
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Names of the registered rules in registration order.
    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.rule.name())
    }

    /// Walks the stream once, feeding each token to its listeners.
    ///
    /// A rule that returns [`Scan::SkipTo`] is not called again before the
    /// given index. A rule error is logged and the pass continues.
    pub fn run(&self, ctx: &mut RuleContext<'_>) -> DispatchStats {
        let stream = ctx.stream();
        let mut resume = vec![0usize; self.rules.len()];
        let mut stats = DispatchStats::default();

        for (position, token) in stream.iter().enumerate() {
            let Some(listeners) = self.listeners.get(&token.kind) else {
                continue;
            };
            for &slot in listeners {
                if position < resume[slot] {
                    continue;
                }
                let registered = &self.rules[slot];
                let name = registered.rule.name();
                ctx.enter_rule(name, registered.severity);
                stats.invocations += 1;
                match registered.rule.process(ctx, position) {
                    Ok(Scan::Continue) => {}
                    Ok(Scan::SkipTo(next)) => {
                        trace!(rule = name, from = position, to = next, "skipping");
                        resume[slot] = next.max(position + 1);
                    }
                    Err(err) => {
                        stats.aborted += 1;
                        warn!(
                            rule = name,
                            file = %ctx.file().relative_path.display(),
                            line = token.line,
                            "{err}"
                        );
                    }
                }
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FileContext;
    use crate::fixer::Fixer;
    use crate::rule::{Rule, RuleError};
    use crate::token::TokenStream;
    use crate::tokenizer::{PhpTokenizer, Tokenizer};
    use crate::types::Violation;
    use crate::utils::suppression::Suppressions;
    use std::path::Path;

    /// Reports every comma, optionally skipping past the enclosing bracket.
    struct CommaRule {
        name: &'static str,
        skip_nested: bool,
    }

    impl Rule for CommaRule {
        fn name(&self) -> &'static str {
            self.name
        }
        fn code(&self) -> &'static str {
            "T001"
        }
        fn interests(&self) -> &'static [TokenKind] {
            &[TokenKind::Comma, TokenKind::Comma, TokenKind::OpenShortArray]
        }
        fn process(&self, ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
            let stream = ctx.stream();
            if stream.kind(position) == TokenKind::OpenShortArray {
                if self.skip_nested && stream.depth(position) > 0 {
                    let closer = stream
                        .partner(position)
                        .ok_or_else(|| RuleError::malformed(position, "no closer"))?;
                    return Ok(Scan::SkipTo(closer + 1));
                }
                return Ok(Scan::Continue);
            }
            ctx.add_error("Comma", "comma", Some(position));
            Ok(Scan::Continue)
        }
    }

    struct Broken;

    impl Rule for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn code(&self) -> &'static str {
            "T002"
        }
        fn interests(&self) -> &'static [TokenKind] {
            &[TokenKind::Comma]
        }
        fn process(&self, _ctx: &mut RuleContext<'_>, position: usize) -> Result<Scan, RuleError> {
            Err(RuleError::malformed(position, "nope"))
        }
    }

    fn dispatch(dispatcher: &Dispatcher, source: &str) -> (Vec<Violation>, DispatchStats) {
        let stream = TokenStream::new(PhpTokenizer::snippet().tokenize(source).unwrap());
        let file = FileContext::new(Path::new("t.php"), source, Path::new(""));
        let suppressions = Suppressions::default();
        let mut fixer = Fixer::new(&stream, false);
        let mut sink = Vec::new();
        let stats = {
            let mut ctx = RuleContext::new(&file, &stream, &mut fixer, &mut sink, &suppressions);
            dispatcher.run(&mut ctx)
        };
        (sink, stats)
    }

    #[test]
    fn calls_rules_in_registration_order() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Box::new(CommaRule {
            name: "first",
            skip_nested: false,
        }));
        dispatcher.register(Box::new(CommaRule {
            name: "second",
            skip_nested: false,
        }));
        let (violations, stats) = dispatch(&dispatcher, "[1, 2];");
        let order: Vec<_> = violations.iter().map(|v| v.rule.as_deref()).collect();
        assert_eq!(order, vec![Some("first"), Some("second")]);
        assert_eq!(stats.invocations, 4);
    }

    #[test]
    fn skip_range_hides_nested_tokens() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Box::new(CommaRule {
            name: "skipper",
            skip_nested: true,
        }));
        let (violations, _) = dispatch(&dispatcher, "[1, [2, 3], 4];");
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[1].location.column, Some(11));
    }

    #[test]
    fn rule_errors_do_not_abort_the_pass() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Box::new(Broken));
        dispatcher.register(Box::new(CommaRule {
            name: "after",
            skip_nested: false,
        }));
        let (violations, stats) = dispatch(&dispatcher, "[1, 2, 3];");
        assert_eq!(violations.len(), 2);
        assert_eq!(stats.aborted, 2);
    }

    #[test]
    fn severity_override_applies() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_with_severity(
            Box::new(CommaRule {
                name: "quiet",
                skip_nested: false,
            }),
            Some(Severity::Notice),
        );
        let (violations, _) = dispatch(&dispatcher, "[1, 2];");
        assert_eq!(violations[0].severity, Severity::Notice);
        assert_eq!(dispatcher.rule_names().collect::<Vec<_>>(), vec!["quiet"]);
    }
}
