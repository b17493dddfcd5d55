//! Scope construction: record which bindings are visible at every node.

use crate::{
    retype::{Typed, TypedNode},
    Value,
};
use derivative::Derivative;
use indexmap::IndexMap;
use quill_syntax::{Expression, Node, Pattern};
use serde::{ser::SerializeMap, Serialize, Serializer};
use std::rc::Rc;

/// The bindings visible at a node, in the order they were introduced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    bindings: IndexMap<String, ScopeBinding>,
}

/// A name visible in a [`Scope`].
#[derive(Derivative, Clone)]
#[derivative(Debug, PartialEq)]
pub struct ScopeBinding {
    /// The type of the bound value.
    pub r#type: Value,

    /// The scope the binding was introduced in.
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    pub scope: Rc<Scope>,

    /// The bound value, if the name was introduced by a `let` rather than a
    /// parameter.
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    pub node: Option<Rc<TypedNode>>,
}

impl Scope {
    /// A scope containing only `bindings`, each of which is treated as a
    /// parameter introduced in the empty scope.
    pub fn from_types<'a>(bindings: impl IntoIterator<Item = (&'a str, Value)>) -> Rc<Self> {
        let root = Rc::new(Scope::default());

        Rc::new(Scope {
            bindings: bindings
                .into_iter()
                .map(|(name, r#type)| {
                    (
                        name.to_string(),
                        ScopeBinding {
                            r#type,
                            scope: root.clone(),
                            node: None,
                        },
                    )
                })
                .collect(),
        })
    }

    /// A new scope containing this scope's bindings followed by `bindings`.
    /// A name that is bound again moves to the end.
    pub fn extend(
        self: &Rc<Self>,
        bindings: impl IntoIterator<Item = (String, ScopeBinding)>,
    ) -> Rc<Self> {
        let mut bindings = bindings.into_iter().peekable();
        if bindings.peek().is_none() {
            return self.clone();
        }

        let mut scope = Scope::clone(self);
        for (name, binding) in bindings {
            scope.bindings.shift_remove(&name);
            scope.bindings.insert(name, binding);
        }

        Rc::new(scope)
    }

    /// Look up a binding by name.
    pub fn get(&self, name: &str) -> Option<&ScopeBinding> {
        self.bindings.get(name)
    }

    /// The bindings in the order they were introduced.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScopeBinding)> {
        self.bindings
            .iter()
            .map(|(name, binding)| (name.as_str(), binding))
    }

    /// The number of visible bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no bindings are visible.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.bindings.len()))?;
        for (name, binding) in &self.bindings {
            map.serialize_entry(name, &binding.r#type)?;
        }

        map.end()
    }
}

/// The decoration added by scope construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scoped {
    /// See [`Typed::shape`].
    pub shape: Value,

    /// See [`Typed`].
    pub r#type: Value,

    /// The bindings visible at this node.
    pub scope: Rc<Scope>,
}

/// A node after scope construction.
pub type ScopedNode = Node<Scoped>;

/// Attach a scope to every node in `node`, starting from an empty scope.
pub fn build_scopes(node: TypedNode) -> ScopedNode {
    scope_node(node, &Rc::new(Scope::default()))
}

fn parameters(pattern: &TypedNode, scope: &Rc<Scope>) -> Vec<(String, ScopeBinding)> {
    pattern
        .bound_identifiers()
        .into_iter()
        .map(|(name, node)| {
            (
                name.to_string(),
                ScopeBinding {
                    r#type: node.decoration.r#type.clone(),
                    scope: scope.clone(),
                    node: None,
                },
            )
        })
        .collect()
}

fn scope_node(node: TypedNode, scope: &Rc<Scope>) -> ScopedNode {
    let Typed { shape, r#type } = node.decoration;

    let expression = match node.expression {
        Expression::Binding { name, value, body } => {
            let body_scope = scope.extend([(
                name.clone(),
                ScopeBinding {
                    r#type: value.decoration.r#type.clone(),
                    scope: scope.clone(),
                    node: Some(Rc::new(value.as_ref().clone())),
                },
            )]);

            Expression::Binding {
                name,
                value: scope_node(*value, scope).boxed(),
                body: scope_node(*body, &body_scope).boxed(),
            }
        }
        Expression::Function {
            parameter,
            body,
            implicit,
        } => {
            let body_scope = scope.extend(parameters(&parameter, scope));

            Expression::Function {
                parameter: scope_node(*parameter, scope).boxed(),
                body: scope_node(*body, &body_scope).boxed(),
                implicit,
            }
        }
        Expression::PatternMatch { value, patterns } => Expression::PatternMatch {
            value: scope_node(*value, scope).boxed(),
            patterns: patterns
                .into_iter()
                .map(|pattern| {
                    let value_scope = scope.extend(parameters(&pattern.test, scope));

                    Pattern {
                        test: scope_node(pattern.test, scope),
                        value: scope_node(pattern.value, &value_scope),
                    }
                })
                .collect(),
        },
        expression => expression.map_nodes(|child| scope_node(child, scope)),
    };

    Node::new(
        expression,
        Scoped {
            shape,
            r#type,
            scope: scope.clone(),
        },
    )
}
