use crate::Node;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use strum::EnumDiscriminants;

/// An expression in the source language, after renaming.
///
/// Binder names are globally unique by the time a tree reaches the
/// typechecker, so identifiers can double as type variable names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
#[serde(bound(
    serialize = "D: Serialize",
    deserialize = "D: Deserialize<'de> + Default"
))]
#[strum_discriminants(
    name(ExpressionKind),
    derive(strum::Display, Hash, PartialOrd, Ord, Serialize, Deserialize)
)]
pub enum Expression<D> {
    /// A reference to a variable.
    Identifier(String),

    /// A bare symbol, such as the name of a data type.
    Symbol(String),

    /// A number literal.
    Number(f64),

    /// A boolean literal.
    Boolean(bool),

    /// A string literal.
    String(String),

    /// A record literal.
    Record(BTreeMap<String, Node<D>>),

    /// A function call with a single explicit parameter.
    #[serde(rename_all = "camelCase")]
    Application {
        /// The function being called.
        callee: Box<Node<D>>,

        /// The value passed to the function.
        parameter: Box<Node<D>>,
    },

    /// A function with a single parameter, which may destructure its input.
    #[serde(rename_all = "camelCase")]
    Function {
        /// The parameter pattern.
        parameter: Box<Node<D>>,

        /// The function body.
        body: Box<Node<D>>,

        /// Whether the parameter is supplied automatically from the scope
        /// of the caller.
        #[serde(default)]
        implicit: bool,
    },

    /// An instance of a data type.
    #[serde(rename_all = "camelCase")]
    DataInstantiation {
        /// The name of the data type.
        callee: Box<Node<D>>,

        /// The positional parameters.
        parameters: Vec<Node<D>>,
    },

    /// `name = value` followed by `body`.
    #[serde(rename_all = "camelCase")]
    Binding {
        /// The bound name.
        name: String,

        /// The bound value, which cannot refer to `name`.
        value: Box<Node<D>>,

        /// The expression in which `name` is visible.
        body: Box<Node<D>>,
    },

    /// Two expressions that must evaluate to the same value.
    #[serde(rename_all = "camelCase")]
    Dual {
        /// The first expression.
        left: Box<Node<D>>,

        /// The second expression.
        right: Box<Node<D>>,
    },

    /// `record.property`.
    #[serde(rename_all = "camelCase")]
    ReadRecordProperty {
        /// The record being read.
        record: Box<Node<D>>,

        /// The name of the property.
        property: String,
    },

    /// `data.index`.
    #[serde(rename_all = "camelCase")]
    ReadDataProperty {
        /// The data value being read.
        data_value: Box<Node<D>>,

        /// The position of the parameter.
        property: usize,
    },

    /// `match value { test => value, ... }`.
    #[serde(rename_all = "camelCase")]
    PatternMatch {
        /// The value being matched.
        value: Box<Node<D>>,

        /// The patterns, tried in order.
        patterns: Vec<Pattern<D>>,
    },

    /// Code provided directly by a backend.
    #[serde(rename_all = "camelCase")]
    Native {
        /// The source for each backend, keyed by backend name.
        implementations: BTreeMap<String, String>,
    },
}

/// A single arm of a [`Expression::PatternMatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(
    serialize = "D: Serialize",
    deserialize = "D: Deserialize<'de> + Default"
))]
pub struct Pattern<D> {
    /// The pattern the matched value is tested against.
    pub test: Node<D>,

    /// The value of the match if the test succeeds.
    pub value: Node<D>,
}

impl<D> fmt::Display for Node<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

impl<D> fmt::Display for Expression<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) | Expression::Symbol(name) => write!(f, "{name}"),
            Expression::Number(number) => write!(f, "{number}"),
            Expression::Boolean(boolean) => write!(f, "{boolean}"),
            Expression::String(string) => write!(f, "{string:?}"),
            Expression::Record(properties) => {
                write!(f, "{{")?;
                for (index, (name, value)) in properties.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }

                    write!(f, "{name}: {value}")?;
                }

                write!(f, "}}")
            }
            Expression::Application { callee, parameter } => write!(f, "({callee} {parameter})"),
            Expression::Function {
                parameter,
                body,
                implicit,
            } => {
                if *implicit {
                    write!(f, "implicit ")?;
                }

                write!(f, "({parameter}) => {body}")
            }
            Expression::DataInstantiation { callee, parameters } => {
                write!(f, "{callee}(")?;
                for (index, parameter) in parameters.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }

                    write!(f, "{parameter}")?;
                }

                write!(f, ")")
            }
            Expression::Binding { name, value, body } => {
                write!(f, "let {name} = {value} in {body}")
            }
            Expression::Dual { left, right } => write!(f, "({left} | {right})"),
            Expression::ReadRecordProperty { record, property } => {
                write!(f, "{record}.{property}")
            }
            Expression::ReadDataProperty {
                data_value,
                property,
            } => write!(f, "{data_value}.{property}"),
            Expression::PatternMatch { value, patterns } => {
                write!(f, "match {value} {{")?;
                for (index, pattern) in patterns.iter().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }

                    write!(f, " {} => {}", pattern.test, pattern.value)?;
                }

                write!(f, " }}")
            }
            Expression::Native { implementations } => {
                write!(f, "native {{")?;
                for (index, backend) in implementations.keys().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }

                    write!(f, " {backend}")?;
                }

                write!(f, " }}")
            }
        }
    }
}
