//! Compiler pass that infers the type of every expression and supplies every
//! implicit parameter from the surrounding scope.
//!
//! [`check`] runs the whole pass. The stages are also exposed individually so
//! tools can inspect the intermediate results:
//!
//! 1. [`shape::attach_shapes`] gives every node a type variable and collects
//!    constraints between them.
//! 2. [`reduce()`] merges the constraints on each variable.
//! 3. [`simplify()`] substitutes the merged values into each other.
//! 4. [`retype::retype`] replaces the variables on every node.
//! 5. [`scope::build_scopes`] records the bindings visible at every node.
//! 6. [`implicits::resolve_implicits`] supplies implicit parameters.

mod constraint;
mod diagnostic;
mod value;

pub mod converge;
pub mod implicits;
pub mod reduce;
pub mod retype;
pub mod scope;
pub mod shape;
pub mod simplify;

pub use constraint::*;
pub use diagnostic::*;
pub use reduce::reduce;
pub use simplify::simplify;
pub use value::*;

use implicits::ResolvedNode;
use quill_syntax::Node;
use quill_util::UniqueNames;
use serde::{Deserialize, Serialize};

/// Configures the typechecker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// The number of constraints reduction may process before giving up.
    pub reduction_limit: usize,

    /// Whether `Integer`, `Float` and `String` requirements on literals are
    /// satisfied without a binding in scope.
    pub builtin_instances: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            reduction_limit: 100_000,
            builtin_instances: true,
        }
    }
}

/// A problem with the input that prevents typechecking from continuing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A node's type variable was never constrained.
    #[error("no type was inferred for `{0}`")]
    MissingShape(String),

    /// A native expression didn't provide code for any backend.
    #[error("native expression `{0}` has no implementations")]
    EmptyNative(String),
}

/// The result of typechecking an expression.
#[derive(Debug, Clone)]
pub struct Checked {
    /// The typechecked tree, with implicit parameters applied.
    pub node: ResolvedNode,

    /// Every problem found, in the order the stages ran.
    pub diagnostics: Vec<Diagnostic>,

    /// The constraints collected from the tree, before reduction.
    pub constraints: Vec<InferredType>,

    /// The reduced constraints.
    pub reduced: ConstraintMap,

    /// The substituted value of every reduced variable.
    pub simplified: simplify::Simplified,
}

impl Checked {
    /// The type of the whole expression.
    pub fn root_type(&self) -> &Value {
        &self.node.decoration.r#type
    }

    /// Whether typechecking found no problems.
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Typecheck `node`, using `names` to generate type variables.
///
/// Binder names in `node` must be unique, and must not collide with the names
/// `names` generates.
pub fn check<D>(
    node: Node<D>,
    names: &mut impl UniqueNames,
    options: &Options,
) -> Result<Checked, Error> {
    let (constraints, shaped) = shape::attach_shapes(node, names);

    let reduction = reduce(constraints.iter().cloned(), options);
    let simplified = simplify(&reduction.map);

    let typed = retype::retype(shaped, &reduction, &simplified)?;
    let scoped = scope::build_scopes(typed);
    let (node, implicit_diagnostics) = implicits::resolve_implicits(scoped, options);

    let mut diagnostics = reduction.diagnostics;
    diagnostics.extend(implicit_diagnostics);

    log::debug!(
        "typechecked `{node}` as `{}` with {} diagnostics",
        node.decoration.r#type,
        diagnostics.len()
    );

    Ok(Checked {
        node,
        diagnostics,
        constraints,
        reduced: reduction.map,
        simplified,
    })
}
