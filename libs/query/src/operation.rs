//! Comparison operators and their evaluation contracts
//!
//! Every operator a filter key may name is a variant of [`Operation`]; the
//! behaviour of each one is described by [`OperationSemantics`], which is the
//! single table both binding and evaluation consult.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Boolean combinator used inside and across filter entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoolOp {
    And,
    #[default]
    Or,
}

impl BoolOp {
    /// Parse `and` / `or`, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Eq,
    Eqic,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    C,
    Cic,
    Nc,
    Ncic,
    In,
    Notin,
    Sw,
    Ew,
    Null,
    Notnull,
}

/// What an operator compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Equality after coercion.
    Equality,
    /// `<`, `<=`, `>`, `>=`; the field type must be orderable.
    Ordering,
    /// Substring, prefix or suffix matching on string fields.
    Text,
    /// Membership in a comma-separated literal list.
    Membership,
    /// Null / not-null test; the operand is ignored.
    Nullity,
}

/// Shape of the right-hand side an operator consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Single,
    List,
    Ignored,
}

/// Text operators only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    Contains,
    StartsWith,
    EndsWith,
}

/// Ordering operators only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lt,
    Lte,
    Gt,
    Gte,
}

/// Evaluation contract of one [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSemantics {
    pub kind: OperationKind,
    pub operand: Operand,
    /// Result is the negation of the positive form (`Ne`, `Nc`, `Notin`, `Notnull`).
    pub negated: bool,
    pub case_insensitive: bool,
    pub text: Option<TextMatch>,
    pub bound: Option<Bound>,
}

impl OperationSemantics {
    const fn new(kind: OperationKind, operand: Operand) -> Self {
        Self {
            kind,
            operand,
            negated: false,
            case_insensitive: false,
            text: None,
            bound: None,
        }
    }

    const fn negated(mut self) -> Self {
        self.negated = true;
        self
    }

    const fn ignore_case(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    const fn text(mut self, m: TextMatch) -> Self {
        self.text = Some(m);
        self
    }

    const fn bound(mut self, b: Bound) -> Self {
        self.bound = Some(b);
        self
    }
}

impl Operation {
    pub const ALL: [Operation; 17] = [
        Self::Eq,
        Self::Eqic,
        Self::Ne,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::C,
        Self::Cic,
        Self::Nc,
        Self::Ncic,
        Self::In,
        Self::Notin,
        Self::Sw,
        Self::Ew,
        Self::Null,
        Self::Notnull,
    ];

    /// Parse an operator name (without the leading `$`), ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "eq" => Some(Self::Eq),
            "eqic" => Some(Self::Eqic),
            "ne" => Some(Self::Ne),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "c" => Some(Self::C),
            "cic" => Some(Self::Cic),
            "nc" => Some(Self::Nc),
            "ncic" => Some(Self::Ncic),
            "in" => Some(Self::In),
            "notin" => Some(Self::Notin),
            "sw" => Some(Self::Sw),
            "ew" => Some(Self::Ew),
            "null" => Some(Self::Null),
            "notnull" => Some(Self::Notnull),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Eqic => "eqic",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::C => "c",
            Self::Cic => "cic",
            Self::Nc => "nc",
            Self::Ncic => "ncic",
            Self::In => "in",
            Self::Notin => "notin",
            Self::Sw => "sw",
            Self::Ew => "ew",
            Self::Null => "null",
            Self::Notnull => "notnull",
        }
    }

    pub fn semantics(self) -> OperationSemantics {
        use Operand::*;
        use OperationKind::*;

        match self {
            Self::Eq => OperationSemantics::new(Equality, Single),
            Self::Eqic => OperationSemantics::new(Equality, Single).ignore_case(),
            Self::Ne => OperationSemantics::new(Equality, Single).negated(),
            Self::Lt => OperationSemantics::new(Ordering, Single).bound(Bound::Lt),
            Self::Lte => OperationSemantics::new(Ordering, Single).bound(Bound::Lte),
            Self::Gt => OperationSemantics::new(Ordering, Single).bound(Bound::Gt),
            Self::Gte => OperationSemantics::new(Ordering, Single).bound(Bound::Gte),
            Self::C => OperationSemantics::new(Text, Single).text(TextMatch::Contains),
            Self::Cic => OperationSemantics::new(Text, Single)
                .text(TextMatch::Contains)
                .ignore_case(),
            Self::Nc => OperationSemantics::new(Text, Single)
                .text(TextMatch::Contains)
                .negated(),
            Self::Ncic => OperationSemantics::new(Text, Single)
                .text(TextMatch::Contains)
                .ignore_case()
                .negated(),
            Self::In => OperationSemantics::new(Membership, List),
            Self::Notin => OperationSemantics::new(Membership, List).negated(),
            Self::Sw => OperationSemantics::new(Text, Single).text(TextMatch::StartsWith),
            Self::Ew => OperationSemantics::new(Text, Single).text(TextMatch::EndsWith),
            Self::Null => OperationSemantics::new(Nullity, Ignored),
            Self::Notnull => OperationSemantics::new(Nullity, Ignored).negated(),
        }
    }

    pub fn requires_ordering(self) -> bool {
        self.semantics().kind == OperationKind::Ordering
    }

    pub fn is_textual(self) -> bool {
        self.semantics().kind == OperationKind::Text
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a membership operand on `,`, trimming tokens and dropping empty ones.
pub fn split_list(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
