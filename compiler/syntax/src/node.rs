use crate::{Expression, ExpressionKind, Pattern};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, convert::Infallible};

/// An expression paired with the information a compiler pass attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(
    serialize = "D: Serialize",
    deserialize = "D: Deserialize<'de> + Default"
))]
pub struct Node<D> {
    /// The expression, whose children are decorated the same way.
    pub expression: Expression<D>,

    /// Information attached by the pass that produced this node.
    #[serde(default)]
    pub decoration: D,
}

impl<D> Node<D> {
    /// Pair an expression with a decoration.
    pub fn new(expression: Expression<D>, decoration: D) -> Self {
        Node {
            expression,
            decoration,
        }
    }

    /// The kind of expression contained within the [`Node`].
    pub fn kind(&self) -> ExpressionKind {
        ExpressionKind::from(&self.expression)
    }

    /// Box the node, for use as the child of another expression.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// The direct children of this node, in evaluation order.
    pub fn children(&self) -> Vec<&Node<D>> {
        match &self.expression {
            Expression::Identifier(_)
            | Expression::Symbol(_)
            | Expression::Number(_)
            | Expression::Boolean(_)
            | Expression::String(_)
            | Expression::Native { .. } => Vec::new(),
            Expression::Record(properties) => properties.values().collect(),
            Expression::Application { callee, parameter } => {
                vec![callee.as_ref(), parameter.as_ref()]
            }
            Expression::Function {
                parameter, body, ..
            } => vec![parameter.as_ref(), body.as_ref()],
            Expression::DataInstantiation { callee, parameters } => {
                std::iter::once(callee.as_ref()).chain(parameters).collect()
            }
            Expression::Binding { value, body, .. } => vec![value.as_ref(), body.as_ref()],
            Expression::Dual { left, right } => vec![left.as_ref(), right.as_ref()],
            Expression::ReadRecordProperty { record, .. } => vec![record.as_ref()],
            Expression::ReadDataProperty { data_value, .. } => vec![data_value.as_ref()],
            Expression::PatternMatch { value, patterns } => std::iter::once(value.as_ref())
                .chain(
                    patterns
                        .iter()
                        .flat_map(|pattern| [&pattern.test, &pattern.value]),
                )
                .collect(),
        }
    }

    /// Every identifier a pattern binds, in the order they appear.
    ///
    /// The callee of a data instantiation names the constructor being matched
    /// and does not bind anything.
    pub fn bound_identifiers(&self) -> Vec<(&str, &Node<D>)> {
        fn collect<'a, D>(node: &'a Node<D>, bound: &mut Vec<(&'a str, &'a Node<D>)>) {
            match &node.expression {
                Expression::Identifier(name) => bound.push((name, node)),
                Expression::DataInstantiation { parameters, .. } => {
                    for parameter in parameters {
                        collect(parameter, bound);
                    }
                }
                _ => {
                    for child in node.children() {
                        collect(child, bound);
                    }
                }
            }
        }

        let mut bound = Vec::new();
        collect(self, &mut bound);
        bound
    }

    /// Count the nodes in this tree, including this one.
    pub fn size(&self) -> usize {
        1 + self.children().into_iter().map(Node::size).sum::<usize>()
    }
}

impl<D: Default> From<Expression<D>> for Node<D> {
    fn from(expression: Expression<D>) -> Self {
        Node::new(expression, D::default())
    }
}

impl<D> Expression<D> {
    /// Convert every direct child, in the same order as [`Node::children`],
    /// stopping at the first error.
    pub fn try_map_nodes<E, Err>(
        self,
        mut f: impl FnMut(Node<D>) -> Result<Node<E>, Err>,
    ) -> Result<Expression<E>, Err> {
        Ok(match self {
            Expression::Identifier(name) => Expression::Identifier(name),
            Expression::Symbol(name) => Expression::Symbol(name),
            Expression::Number(number) => Expression::Number(number),
            Expression::Boolean(boolean) => Expression::Boolean(boolean),
            Expression::String(string) => Expression::String(string),
            Expression::Record(properties) => {
                let mut mapped = BTreeMap::new();
                for (name, value) in properties {
                    mapped.insert(name, f(value)?);
                }

                Expression::Record(mapped)
            }
            Expression::Application { callee, parameter } => Expression::Application {
                callee: f(*callee)?.boxed(),
                parameter: f(*parameter)?.boxed(),
            },
            Expression::Function {
                parameter,
                body,
                implicit,
            } => Expression::Function {
                parameter: f(*parameter)?.boxed(),
                body: f(*body)?.boxed(),
                implicit,
            },
            Expression::DataInstantiation { callee, parameters } => {
                let callee = f(*callee)?.boxed();

                let mut mapped = Vec::with_capacity(parameters.len());
                for parameter in parameters {
                    mapped.push(f(parameter)?);
                }

                Expression::DataInstantiation {
                    callee,
                    parameters: mapped,
                }
            }
            Expression::Binding { name, value, body } => Expression::Binding {
                name,
                value: f(*value)?.boxed(),
                body: f(*body)?.boxed(),
            },
            Expression::Dual { left, right } => Expression::Dual {
                left: f(*left)?.boxed(),
                right: f(*right)?.boxed(),
            },
            Expression::ReadRecordProperty { record, property } => {
                Expression::ReadRecordProperty {
                    record: f(*record)?.boxed(),
                    property,
                }
            }
            Expression::ReadDataProperty {
                data_value,
                property,
            } => Expression::ReadDataProperty {
                data_value: f(*data_value)?.boxed(),
                property,
            },
            Expression::PatternMatch { value, patterns } => {
                let value = f(*value)?.boxed();

                let mut mapped = Vec::with_capacity(patterns.len());
                for pattern in patterns {
                    mapped.push(Pattern {
                        test: f(pattern.test)?,
                        value: f(pattern.value)?,
                    });
                }

                Expression::PatternMatch {
                    value,
                    patterns: mapped,
                }
            }
            Expression::Native { implementations } => Expression::Native { implementations },
        })
    }

    /// Convert every direct child, in the same order as [`Node::children`].
    pub fn map_nodes<E>(self, mut f: impl FnMut(Node<D>) -> Node<E>) -> Expression<E> {
        match self.try_map_nodes(|node| Ok::<_, Infallible>(f(node))) {
            Ok(expression) => expression,
            Err(never) => match never {},
        }
    }
}
