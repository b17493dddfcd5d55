use crate::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A recoverable problem found while typechecking. The pipeline always runs to
/// completion and collects these in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum Diagnostic {
    /// Two values of different kinds were unified.
    TypesAreDifferent {
        /// The first value.
        left: Value,

        /// The second value.
        right: Value,
    },

    /// Two literals of the same kind had different contents.
    TypeValuesAreDifferent {
        /// The first value.
        left: Value,

        /// The second value.
        right: Value,
    },

    /// Two records had different property names.
    UnevenProperties {
        /// The first record's properties.
        left: Vec<String>,

        /// The second record's properties.
        right: Vec<String>,
    },

    /// Two data values had a different number of parameters.
    ParameterCountsAreDifferent {
        /// The first data value's parameter count.
        left: usize,

        /// The second data value's parameter count.
        right: usize,
    },

    /// Two pattern matches had a different number of patterns.
    PatternCountsAreDifferent {
        /// The first pattern match's pattern count.
        left: usize,

        /// The second pattern match's pattern count.
        right: usize,
    },

    /// Reduction was stopped after this many steps.
    ReductionLimit(usize),

    /// No combination of scope bindings satisfies these implicit parameters.
    UnresolvedImplicits {
        /// The implicit parameters, outermost first.
        implicits: Vec<Value>,
    },

    /// More than one combination of scope bindings satisfies the implicit
    /// parameters.
    #[serde(rename_all = "camelCase")]
    AmbiguousImplicits {
        /// The number of valid combinations.
        combinations: usize,

        /// The number of implicit parameters.
        implicits: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::TypesAreDifferent { .. } => write!(f, "Types are different"),
            Diagnostic::TypeValuesAreDifferent { .. } => write!(f, "Type values are different"),
            Diagnostic::UnevenProperties { .. } => write!(f, "Uneven properties"),
            Diagnostic::ParameterCountsAreDifferent { .. } => {
                write!(f, "Parameter counts are different")
            }
            Diagnostic::PatternCountsAreDifferent { .. } => {
                write!(f, "Pattern counts are different")
            }
            Diagnostic::ReductionLimit(_) => write!(f, "Constraint reduction did not converge"),
            Diagnostic::UnresolvedImplicits { .. } => {
                write!(f, "Could not find a valid set of replacements for implicits")
            }
            Diagnostic::AmbiguousImplicits {
                combinations,
                implicits,
            } => write!(
                f,
                "Implicits were ambiguous. {combinations} possible sets of values found for {implicits} implicits"
            ),
        }
    }
}
