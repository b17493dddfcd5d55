//! Constraint reduction: merge every constraint on a variable into a single
//! entry.

use crate::{
    converge::{converge, Convergence},
    CollapsedInferredType, ConstraintMap, Diagnostic, InferredType, Operator, Options, Value,
};
use std::collections::VecDeque;

/// The result of reducing a list of constraints.
#[derive(Debug, Clone, Default)]
pub struct Reduction {
    /// One entry per constrained variable.
    pub map: ConstraintMap,

    /// Mismatches found while merging, in order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Reduce `constraints` in order. Facts learned while merging are reduced
/// after everything already queued.
pub fn reduce(constraints: impl IntoIterator<Item = InferredType>, options: &Options) -> Reduction {
    let mut queue = constraints.into_iter().collect::<VecDeque<_>>();
    let mut reduction = Reduction::default();
    let mut steps = 0;

    while let Some(constraint) = queue.pop_front() {
        if steps >= options.reduction_limit {
            log::debug!(
                "stopping reduction after {steps} steps with {} constraints left",
                queue.len() + 1
            );

            reduction
                .diagnostics
                .push(Diagnostic::ReductionLimit(options.reduction_limit));

            break;
        }

        steps += 1;

        if constraint.is_trivial() {
            continue;
        }

        let Some(entry) = reduction.map.get_mut(&constraint.from) else {
            reduction
                .map
                .insert(constraint.from.clone(), CollapsedInferredType::new(constraint));

            continue;
        };

        if entry
            .sources
            .iter()
            .any(|source| source.is_same_fact(&constraint))
        {
            continue;
        }

        log::trace!("merging `{constraint}` into `{entry}`");

        let mut convergence = Convergence::new(&constraint.origin);
        merge(entry, constraint, &mut convergence);

        queue.extend(convergence.facts);
        reduction.diagnostics.extend(convergence.diagnostics);
    }

    log::debug!(
        "reduced to {} entries in {steps} steps with {} diagnostics",
        reduction.map.len(),
        reduction.diagnostics.len()
    );

    reduction
}

/// Which side of an evaluation an entry keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keep {
    Pre,
    Post,
}

/// Merge `constraint` into `entry`.
pub fn merge(
    entry: &mut CollapsedInferredType,
    constraint: InferredType,
    convergence: &mut Convergence,
) {
    use Operator::*;

    let existing = &entry.to;
    let incoming = &constraint.to;

    let (operator, to) = match (entry.operator, constraint.operator) {
        (Equals, Equals) | (EvaluatesTo, EvaluatesTo) | (EvaluatedFrom, EvaluatedFrom) => {
            (entry.operator, converge(existing, incoming, convergence))
        }
        (Equals, EvaluatesTo) => (
            Equals,
            evaluate(existing, incoming, Keep::Pre, convergence),
        ),
        (EvaluatesTo, Equals) => (
            Equals,
            evaluate(incoming, existing, Keep::Pre, convergence),
        ),
        (Equals, EvaluatedFrom) => (
            Equals,
            evaluate(incoming, existing, Keep::Post, convergence),
        ),
        (EvaluatedFrom, Equals) => (
            Equals,
            evaluate(existing, incoming, Keep::Post, convergence),
        ),
        (EvaluatesTo, EvaluatedFrom) => (
            EvaluatedFrom,
            evaluate(incoming, existing, Keep::Pre, convergence),
        ),
        (EvaluatedFrom, EvaluatesTo) => (
            EvaluatedFrom,
            evaluate(existing, incoming, Keep::Pre, convergence),
        ),
    };

    entry.operator = operator;
    entry.to = to;
    entry.sources.push(constraint);
}

/// Check that `pre`, once its leading implicits are supplied, is `post`.
fn evaluate(pre: &Value, post: &Value, keep: Keep, convergence: &mut Convergence) -> Value {
    let (implicits, resolved) = pre.split_implicits();

    if let Some(variable) = resolved.as_free_variable() {
        convergence.defer(variable, post);

        return match keep {
            Keep::Pre => pre.clone(),
            Keep::Post => post.clone(),
        };
    }

    match keep {
        Keep::Pre => Value::wrap_implicits(implicits, converge(resolved, post, convergence)),
        Keep::Post => converge(post, resolved, convergence),
    }
}
