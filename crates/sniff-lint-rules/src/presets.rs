//! Rule presets for common configurations.

use crate::{
    ArrayDeclaration, BooleanNotSpacing, DisallowTabIndent, EndOfFileNewline,
    NamespaceDeclaration, PropertyDeclaration, UnaryOperatorSpacing, ValidClassName,
    ValidScalarTypeName,
};
use sniff_lint_core::{Config, RuleBox};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Preset configurations for sniff-lint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Preset {
    /// Every rule with sensible defaults.
    #[default]
    Recommended,
    /// Every rule; arrows and values may not start a new line.
    Strict,
    /// Array declarations only, for gradual adoption.
    Minimal,
}

impl Preset {
    /// All presets, in the order they are listed to users.
    pub const ALL: [Self; 3] = [Self::Recommended, Self::Strict, Self::Minimal];

    /// Name used in configuration files and on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Strict => "strict",
            Self::Minimal => "minimal",
        }
    }

    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        match self {
            Self::Recommended => recommended_rules(),
            Self::Strict => strict_rules(),
            Self::Minimal => minimal_rules(),
        }
    }

    /// Returns the rules for this preset with per-rule options from
    /// `config` applied.
    ///
    /// Rules disabled in `config` are still returned; the engine skips them
    /// when it registers rules.
    #[must_use]
    pub fn rules_with_config(self, config: &Config) -> Vec<RuleBox> {
        let mut array = self.array_declaration();
        if let Some(options) = config.rule(crate::array_declaration::NAME) {
            debug!(
                preset = self.name(),
                rule = crate::array_declaration::NAME,
                "Applying rule options"
            );
            array = array.configure(options);
        }
        if self == Self::Minimal {
            return vec![Box::new(array)];
        }

        let mut tabs = DisallowTabIndent::new();
        if let Some(options) = config.rule(crate::disallow_tab_indent::NAME) {
            debug!(
                preset = self.name(),
                rule = crate::disallow_tab_indent::NAME,
                "Applying rule options"
            );
            tabs = tabs.configure(options);
        }
        let mut rules: Vec<RuleBox> = vec![Box::new(array), Box::new(tabs)];
        rules.extend(style_rules());
        rules
    }

    fn array_declaration(self) -> ArrayDeclaration {
        match self {
            Self::Strict => ArrayDeclaration::new().ignore_new_lines(false),
            Self::Recommended | Self::Minimal => ArrayDeclaration::new(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown preset '{s}' (expected recommended, strict or minimal)")
            })
    }
}

/// Rules without options, shared by the full presets.
fn style_rules() -> Vec<RuleBox> {
    vec![
        Box::new(BooleanNotSpacing::new()),
        Box::new(UnaryOperatorSpacing::new()),
        Box::new(ValidClassName::new()),
        Box::new(ValidScalarTypeName::new()),
        Box::new(NamespaceDeclaration::new()),
        Box::new(PropertyDeclaration::new()),
        Box::new(EndOfFileNewline::new()),
    ]
}

/// Returns the recommended set of rules.
///
/// Includes every built-in rule (SL001-SL009) with default options.
#[must_use]
pub fn recommended_rules() -> Vec<RuleBox> {
    Preset::Recommended.rules_with_config(&Config::default())
}

/// Returns the strict set of rules.
///
/// Same rules as recommended, but `array-declaration` also reports double
/// arrows and values placed on the line after their key.
#[must_use]
pub fn strict_rules() -> Vec<RuleBox> {
    Preset::Strict.rules_with_config(&Config::default())
}

/// Returns the minimal set of rules.
///
/// For gradual adoption, only includes:
/// - `array-declaration` (SL001)
#[must_use]
pub fn minimal_rules() -> Vec<RuleBox> {
    Preset::Minimal.rules_with_config(&Config::default())
}

/// Returns all available rules.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    recommended_rules()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rules: &[RuleBox]) -> Vec<&'static str> {
        rules.iter().map(|r| r.name()).collect()
    }

    #[test]
    fn test_preset_rules() {
        assert_eq!(names(&Preset::Minimal.rules()), vec!["array-declaration"]);
        assert_eq!(Preset::Recommended.rules().len(), 9);
        assert_eq!(
            names(&Preset::Strict.rules()),
            names(&Preset::Recommended.rules())
        );
    }

    #[test]
    fn test_codes_are_unique_and_ordered() {
        let codes: Vec<_> = all_rules().iter().map(|r| r.code()).collect();
        let expected: Vec<_> = (1..=9).map(|n| format!("SL00{n}")).collect();
        assert_eq!(codes, expected);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Strict".parse::<Preset>(), Ok(Preset::Strict));
        assert_eq!(" minimal ".parse::<Preset>(), Ok(Preset::Minimal));
        assert!("lenient".parse::<Preset>().is_err());
        assert_eq!(Preset::default().to_string(), "recommended");
    }

    #[test]
    fn test_strict_reports_values_on_next_line() {
        use crate::testing::check;

        let source = "$a = [\n    'k' =>\n        1,\n];";
        assert!(check(ArrayDeclaration::new(), source).is_empty());
        assert_eq!(check(Preset::Strict.array_declaration(), source).len(), 1);
    }
}
