//! Implicit resolution: supply every implicit parameter a node still needs
//! from the bindings in its scope.

use crate::{
    converge::{converge, Convergence},
    reduce,
    scope::{Scope, Scoped, ScopedNode},
    Diagnostic, Inferrer, InferredType, Operator, Options, Value,
};
use itertools::Itertools;
use quill_syntax::{Expression, Node};
use serde::Serialize;
use std::rc::Rc;

/// The decoration added by implicit resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolved {
    /// The value this node produces.
    pub r#type: Value,

    /// The bindings visible at this node.
    pub scope: Rc<Scope>,

    /// The bindings supplied for this node's implicit parameters, first
    /// parameter first. Empty unless this node was rewritten.
    pub resolved_implicits: Vec<(String, Value)>,
}

/// A fully typechecked node.
pub type ResolvedNode = Node<Resolved>;

/// A binding that could be supplied for an implicit parameter.
type Candidate = (String, Value);

/// Resolve the implicit parameters of every node in `node`, returning the
/// rewritten tree and any resolution failures in the order they were found.
pub fn resolve_implicits(node: ScopedNode, options: &Options) -> (ResolvedNode, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let node = resolve_node(node, options, &mut diagnostics);

    log::debug!(
        "resolved implicits with {} diagnostics",
        diagnostics.len()
    );

    (node, diagnostics)
}

fn resolve_node(
    node: ScopedNode,
    options: &Options,
    diagnostics: &mut Vec<Diagnostic>,
) -> ResolvedNode {
    let Scoped {
        shape,
        r#type,
        scope,
    } = node.decoration;

    let expression = node
        .expression
        .map_nodes(|child| resolve_node(child, options, diagnostics));

    let excess = r#type
        .implicit_count()
        .saturating_sub(shape.implicit_count());

    let requirements = r#type
        .implicit_parameters()
        .into_iter()
        .take(excess)
        .cloned()
        .collect::<Vec<_>>();

    let node = Node::new(
        expression,
        Resolved {
            r#type,
            scope,
            resolved_implicits: Vec::new(),
        },
    );

    if requirements.is_empty() {
        return node;
    }

    let mut combinations = requirements
        .iter()
        .map(|requirement| candidates(requirement, &node.decoration.scope, options))
        .multi_cartesian_product()
        .filter(|combination| is_valid(&requirements, combination, options))
        .collect::<Vec<_>>();

    log::trace!(
        "found {} valid combinations for `{}` in `{}`",
        combinations.len(),
        node.decoration.r#type,
        node
    );

    match combinations.len() {
        0 => {
            diagnostics.push(Diagnostic::UnresolvedImplicits {
                implicits: requirements,
            });

            node
        }
        1 => match combinations.pop() {
            Some(combination) => apply(node, combination),
            None => node,
        },
        count => {
            diagnostics.push(Diagnostic::AmbiguousImplicits {
                combinations: count,
                implicits: requirements.len(),
            });

            node
        }
    }
}

/// Every binding that could satisfy `requirement`, in scope order. A
/// requirement a built-in instance satisfies is resolved by that instance
/// alone.
fn candidates(requirement: &Value, scope: &Scope, options: &Options) -> Vec<Candidate> {
    if options.builtin_instances {
        if let Some(name) = builtin_instance(requirement) {
            return vec![(name, requirement.clone())];
        }
    }

    scope
        .iter()
        .filter(|(name, binding)| satisfies(name, &binding.r#type, requirement))
        .map(|(name, binding)| (name.to_string(), binding.r#type.clone()))
        .collect()
}

/// Whether a binding of type `candidate` can be supplied for `requirement`.
/// The candidate may be more specific than the requirement, but matching must
/// never narrow the candidate itself.
fn satisfies(name: &str, candidate: &Value, requirement: &Value) -> bool {
    if candidate.as_free_variable().is_some() {
        return false;
    }

    let mut convergence = Convergence::new(name);
    converge(candidate, requirement, &mut convergence);

    let own_variables = candidate.free_variables();

    convergence.is_ok()
        && convergence
            .facts
            .iter()
            .all(|fact| !own_variables.contains(&fact.from.as_str()))
}

/// The name of the built-in instance that satisfies `requirement`, if any.
///
/// `Integer(n)` is satisfied by integral numbers, `Float(n)` by any number and
/// `String(s)` by any string.
pub fn builtin_instance(requirement: &Value) -> Option<String> {
    let Value::DataValue { name, parameters } = requirement else {
        return None;
    };

    let (Value::SymbolLiteral(symbol), [parameter]) = (name.as_ref(), parameters.as_slice())
    else {
        return None;
    };

    let satisfied = match (symbol.as_str(), parameter) {
        ("Integer", Value::NumberLiteral(number)) => number.fract() == 0.0,
        ("Float", Value::NumberLiteral(_)) => true,
        ("String", Value::StringLiteral(_)) => true,
        _ => false,
    };

    satisfied.then(|| symbol.clone())
}

fn is_valid(requirements: &[Value], combination: &[Candidate], options: &Options) -> bool {
    let constraints = requirements
        .iter()
        .zip(combination)
        .enumerate()
        .flat_map(|(index, (requirement, (name, value)))| {
            let placeholder = format!("implicit${index}");

            [
                InferredType::new(
                    Operator::Equals,
                    &placeholder,
                    value.clone(),
                    name,
                    Inferrer::ImplicitSearch,
                ),
                InferredType::new(
                    Operator::EvaluatedFrom,
                    &placeholder,
                    requirement.clone(),
                    name,
                    Inferrer::ImplicitSearch,
                ),
            ]
        });

    reduce(constraints, options).diagnostics.is_empty()
}

/// Wrap `node` in one application per implicit. The last implicit is applied
/// innermost, so the first implicit is the outermost argument.
fn apply(node: ResolvedNode, combination: Vec<Candidate>) -> ResolvedNode {
    let scope = node.decoration.scope.clone();

    let mut result = node;
    for (name, value) in combination.iter().rev() {
        let r#type = match result.decoration.r#type.strip_implicit_layer() {
            Some(body) => body.clone(),
            None => result.decoration.r#type.clone(),
        };

        let parameter = Node::new(
            Expression::Identifier(name.clone()),
            Resolved {
                r#type: value.clone(),
                scope: scope.clone(),
                resolved_implicits: Vec::new(),
            },
        );

        result = Node::new(
            Expression::Application {
                callee: result.boxed(),
                parameter: parameter.boxed(),
            },
            Resolved {
                r#type,
                scope: scope.clone(),
                resolved_implicits: Vec::new(),
            },
        );
    }

    result.decoration.resolved_implicits = combination;
    result
}
