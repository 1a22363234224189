//! The rule contract and the concrete rule set.

mod async_suffix;
mod braces;
mod enum_value;
mod enum_without_zero;
mod inject;
mod member_order;
mod sort_key;
mod test_structure;

pub use async_suffix::AsyncSuffixRule;
pub use braces::BracesRule;
pub use enum_value::EnumValueRule;
pub use enum_without_zero::EnumWithoutZeroRule;
pub use inject::{batch_inject_document, derive_variable_name, InjectRule};
pub use member_order::MemberOrderRule;
pub use sort_key::{DeclarationKind, SortKey, Staticness, Visibility};
pub use test_structure::TestStructureRule;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::syntax::{Semantics, SourceTree, Span};

/// Severity levels for violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Identifiers for the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleId {
    #[serde(rename = "syntax")]
    Syntax,
    #[serde(rename = "member_order")]
    MemberOrder,
    #[serde(rename = "enum_value")]
    EnumValue,
    #[serde(rename = "braces")]
    Braces,
    #[serde(rename = "async_suffix")]
    AsyncSuffix,
    #[serde(rename = "enum_without_zero")]
    EnumWithoutZero,
    #[serde(rename = "inject")]
    Inject,
    #[serde(rename = "test_structure")]
    TestStructure,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::Syntax => "syntax",
            RuleId::MemberOrder => "member_order",
            RuleId::EnumValue => "enum_value",
            RuleId::Braces => "braces",
            RuleId::AsyncSuffix => "async_suffix",
            RuleId::EnumWithoutZero => "enum_without_zero",
            RuleId::Inject => "inject",
            RuleId::TestStructure => "test_structure",
        }
    }

    /// Stable diagnostic code, used in reports.
    pub fn code(&self) -> &'static str {
        match self {
            RuleId::Syntax => "SF00",
            RuleId::MemberOrder => "SF01",
            RuleId::EnumValue => "SF02",
            RuleId::Braces => "SF03",
            RuleId::AsyncSuffix => "SF04",
            RuleId::EnumWithoutZero => "SF05",
            RuleId::Inject => "SF06",
            RuleId::TestStructure => "SF07",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "syntax" => Some(RuleId::Syntax),
            "member_order" => Some(RuleId::MemberOrder),
            "enum_value" => Some(RuleId::EnumValue),
            "braces" => Some(RuleId::Braces),
            "async_suffix" => Some(RuleId::AsyncSuffix),
            "enum_without_zero" => Some(RuleId::EnumWithoutZero),
            "inject" => Some(RuleId::Inject),
            "test_structure" => Some(RuleId::TestStructure),
            _ => None,
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single reported instance of a rule being broken.
#[derive(Debug, Clone)]
pub struct Violation {
    pub rule: RuleId,
    pub severity: Severity,
    /// Relative path of the owning document.
    pub file: String,
    pub span: Span,
    pub message: String,
    /// Ordered format arguments (the ordering rule's explain labels).
    pub args: Vec<String>,
}

/// What a fixer produced.
///
/// Most rules return new text for the one document they were invoked on.
/// The async-suffix rule instead requests a workspace-wide rename, so the
/// driver knows to re-scope its re-analysis to the whole project.
#[derive(Debug, Clone)]
pub enum FixOutcome {
    Document(String),
    Rename { old: String, new: String },
}

/// Analysis context handed to each rule invocation.
pub struct RuleCtx<'a> {
    pub tree: &'a SourceTree,
    pub file: &'a str,
    pub sem: &'a Semantics,
}

impl<'a> RuleCtx<'a> {
    pub fn violation(&self, rule: RuleId, span: Span, message: impl Into<String>) -> Violation {
        Violation {
            rule,
            severity: Severity::Warning,
            file: self.file.to_string(),
            span,
            message: message.into(),
            args: Vec::new(),
        }
    }
}

/// A named pair of analyze and fix.
pub trait Rule: Send + Sync {
    fn id(&self) -> RuleId;

    /// Report every violation of this rule in the document.
    fn analyze(&self, ctx: &RuleCtx) -> Vec<Violation>;

    /// Produce a fix for one violation, or decline.
    ///
    /// Declining (returning `None`) must leave no partial edit behind.
    fn fix(&self, _ctx: &RuleCtx, _violation: &Violation) -> Option<FixOutcome> {
        None
    }

    /// Whether this rule has a fixer at all (advisory rules do not).
    fn fixable(&self) -> bool {
        true
    }
}

/// The registered rules, in analysis order.
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    /// All seven rules.
    pub fn all() -> Self {
        Self {
            rules: vec![
                Box::new(MemberOrderRule),
                Box::new(EnumValueRule),
                Box::new(BracesRule),
                Box::new(AsyncSuffixRule),
                Box::new(EnumWithoutZeroRule),
                Box::new(InjectRule),
                Box::new(TestStructureRule),
            ],
        }
    }

    pub fn get(&self, id: RuleId) -> Option<&dyn Rule> {
        self.rules.iter().find(|r| r.id() == id).map(|r| r.as_ref())
    }

    /// Run every enabled rule over one document.
    ///
    /// A document whose parse tree contains ERROR nodes additionally yields
    /// one error-severity `syntax` violation; nothing fixes those, so they
    /// feed the unfixable-error accounting.
    pub fn analyze_document(&self, ctx: &RuleCtx, config: &Config) -> Vec<Violation> {
        let mut violations = Vec::new();

        if config.rule_enabled(RuleId::Syntax) && ctx.tree.has_errors() {
            let span = ctx.tree.first_error_span().unwrap_or(Span {
                start_byte: 0,
                end_byte: 0,
                start_line: 1,
                start_col: 1,
                end_line: 1,
                end_col: 1,
            });
            let mut v = ctx.violation(RuleId::Syntax, span, "Source file does not parse");
            v.severity = Severity::Error;
            violations.push(v);
        }

        for rule in &self.rules {
            if config.rule_enabled(rule.id()) {
                violations.extend(rule.analyze(ctx));
            }
        }

        for v in &mut violations {
            v.severity = config.severity_for(v.rule, v.severity);
        }

        violations.sort_by_key(|v| (v.span.start_byte, v.span.end_byte, v.rule.code()));
        violations
    }
}
