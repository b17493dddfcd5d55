use crate::Value;
use indexmap::IndexMap;
use quill_syntax::ExpressionKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the variable in a constraint relates to its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    /// The variable is exactly the value.
    Equals,

    /// The variable, once its leading implicit parameters are supplied, is
    /// the value.
    EvaluatesTo,

    /// The variable is what the value becomes once the value's leading
    /// implicit parameters are supplied.
    EvaluatedFrom,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::Equals => "=",
            Operator::EvaluatesTo => "~>",
            Operator::EvaluatedFrom => "<~",
        })
    }
}

/// Which part of the typechecker produced a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum Inferrer {
    /// Attached to a node of this kind during shape attachment.
    Shape(ExpressionKind),

    /// Assumed while unifying two values.
    Convergence,

    /// Forwarded through a free variable whose value wasn't known yet.
    Deferral,

    /// Used to test a candidate set of implicit values.
    ImplicitSearch,
}

/// A single fact about a type variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredType {
    /// How `from` relates to `to`.
    pub operator: Operator,

    /// The constrained variable.
    pub from: String,

    /// The value the variable is constrained to.
    pub to: Value,

    /// The shape name of the node that introduced this fact.
    pub origin: String,

    /// What produced this fact.
    pub inferrer: Inferrer,
}

impl InferredType {
    /// Create a new constraint.
    pub fn new(
        operator: Operator,
        from: impl Into<String>,
        to: Value,
        origin: impl Into<String>,
        inferrer: Inferrer,
    ) -> Self {
        InferredType {
            operator,
            from: from.into(),
            to,
            origin: origin.into(),
            inferrer,
        }
    }

    /// Whether the constraint says nothing, ie. it relates a variable to
    /// itself.
    pub fn is_trivial(&self) -> bool {
        self.to.as_free_variable() == Some(self.from.as_str())
    }

    /// Whether both constraints state the same fact, regardless of where they
    /// came from.
    pub fn is_same_fact(&self, other: &InferredType) -> bool {
        self.operator == other.operator && self.from == other.from && self.to == other.to
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.from, self.operator, self.to)
    }
}

/// Every constraint on a variable, merged into one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollapsedInferredType {
    /// The operator after merging.
    pub operator: Operator,

    /// The constrained variable.
    pub from: String,

    /// The value after merging.
    pub to: Value,

    /// The constraints that were merged, in order.
    pub sources: Vec<InferredType>,
}

impl CollapsedInferredType {
    /// Start a new entry from the first constraint on a variable.
    pub fn new(constraint: InferredType) -> Self {
        CollapsedInferredType {
            operator: constraint.operator,
            from: constraint.from.clone(),
            to: constraint.to.clone(),
            sources: vec![constraint],
        }
    }

    /// Whether a node that consumes this variable's value (the callee of an
    /// application, either side of a dual, or a pattern match) expects it
    /// after its implicit parameters have been supplied.
    pub fn is_consumed(&self) -> bool {
        self.sources.iter().any(|source| {
            source.operator != Operator::Equals && matches!(source.inferrer, Inferrer::Shape(_))
        })
    }
}

impl fmt::Display for CollapsedInferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.from, self.operator, self.to)
    }
}

/// The reduced constraints, at most one per variable, in the order the
/// variables were first constrained.
pub type ConstraintMap = IndexMap<String, CollapsedInferredType>;
