use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// A type, or a term used at the type level.
///
/// Values are immutable trees compared structurally; passes build new values
/// rather than modifying existing ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum Value {
    /// A placeholder that is replaced during simplification.
    FreeVariable(String),

    /// The type of exactly this number.
    NumberLiteral(f64),

    /// The type of exactly this boolean.
    BooleanLiteral(bool),

    /// The type of exactly this string.
    StringLiteral(String),

    /// A bare symbol, usually naming a data type.
    SymbolLiteral(String),

    /// A record with exactly these properties.
    RecordLiteral(BTreeMap<String, Value>),

    /// An instance of a data type.
    #[serde(rename_all = "camelCase")]
    DataValue {
        /// The name of the data type.
        name: Box<Value>,

        /// The positional parameters.
        parameters: Vec<Value>,
    },

    /// A value constrained by two sides that collapse once either side is
    /// known.
    #[serde(rename_all = "camelCase")]
    DualBinding {
        /// The first side.
        left: Box<Value>,

        /// The second side.
        right: Box<Value>,
    },

    /// A function with an explicit parameter.
    #[serde(rename_all = "camelCase")]
    FunctionLiteral {
        /// The parameter type.
        parameter: Box<Value>,

        /// The return type.
        body: Box<Value>,
    },

    /// A function whose parameter is found in the caller's scope.
    #[serde(rename_all = "camelCase")]
    ImplicitFunctionLiteral {
        /// The type the implicit value must satisfy.
        parameter: Box<Value>,

        /// The type after the implicit value has been supplied.
        body: Box<Value>,
    },

    /// A function applied to a parameter.
    #[serde(rename_all = "camelCase")]
    ApplicationValue {
        /// The function.
        callee: Box<Value>,

        /// The parameter.
        parameter: Box<Value>,
    },

    /// The parameter at `property` of a data value.
    #[serde(rename_all = "camelCase")]
    ReadDataValueProperty {
        /// The data value being read.
        data_value: Box<Value>,

        /// The parameter's position.
        property: usize,
    },

    /// The property named `property` of a record.
    #[serde(rename_all = "camelCase")]
    ReadRecordProperty {
        /// The record being read.
        record: Box<Value>,

        /// The property's name.
        property: String,
    },

    /// A value selected by matching against a list of patterns.
    #[serde(rename_all = "camelCase")]
    PatternMatchValue {
        /// The matched value.
        value: Box<Value>,

        /// The patterns, in order.
        patterns: Vec<PatternValue>,
    },
}

/// One arm of a [`Value::PatternMatchValue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternValue {
    /// The pattern the matched value is tested against.
    pub test: Value,

    /// The result if the test succeeds.
    pub value: Value,
}

impl Value {
    /// A free variable named `name`.
    pub fn variable(name: impl Into<String>) -> Self {
        Value::FreeVariable(name.into())
    }

    /// A symbol named `name`.
    pub fn symbol(name: impl Into<String>) -> Self {
        Value::SymbolLiteral(name.into())
    }

    /// A record literal.
    pub fn record<'a>(properties: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        Value::RecordLiteral(
            properties
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    /// A data value.
    pub fn data(name: Value, parameters: impl IntoIterator<Item = Value>) -> Self {
        Value::DataValue {
            name: Box::new(name),
            parameters: parameters.into_iter().collect(),
        }
    }

    /// `parameter -> body`
    pub fn arrow(parameter: Value, body: Value) -> Self {
        Value::FunctionLiteral {
            parameter: Box::new(parameter),
            body: Box::new(body),
        }
    }

    /// `implicit parameter -> body`
    pub fn implicit(parameter: Value, body: Value) -> Self {
        Value::ImplicitFunctionLiteral {
            parameter: Box::new(parameter),
            body: Box::new(body),
        }
    }

    /// A curried function taking `parameters` in order, each paired with
    /// whether it is implicit, and returning `body`.
    ///
    /// `Value::function(b, [(x, true), (a, false)])` is `implicit x -> a -> b`.
    pub fn function(body: Value, parameters: impl IntoIterator<Item = (Value, bool)>) -> Self {
        let parameters = parameters.into_iter().collect::<Vec<_>>();

        parameters
            .into_iter()
            .rev()
            .fold(body, |body, (parameter, implicit)| {
                if implicit {
                    Value::implicit(parameter, body)
                } else {
                    Value::arrow(parameter, body)
                }
            })
    }

    /// The name of the variable, if this is a free variable.
    pub fn as_free_variable(&self) -> Option<&str> {
        match self {
            Value::FreeVariable(name) => Some(name),
            _ => None,
        }
    }

    /// Split the leading implicit parameters (outermost first) from the value
    /// they wrap.
    pub fn split_implicits(&self) -> (Vec<&Value>, &Value) {
        let mut parameters = Vec::new();
        let mut value = self;
        while let Value::ImplicitFunctionLiteral { parameter, body } = value {
            parameters.push(parameter.as_ref());
            value = body;
        }

        (parameters, value)
    }

    /// The value with every leading implicit parameter removed.
    pub fn strip_implicits(&self) -> &Value {
        self.split_implicits().1
    }

    /// The body of the outermost implicit function, if there is one.
    pub fn strip_implicit_layer(&self) -> Option<&Value> {
        match self {
            Value::ImplicitFunctionLiteral { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The number of leading implicit parameters.
    pub fn implicit_count(&self) -> usize {
        self.split_implicits().0.len()
    }

    /// The leading implicit parameters, outermost first.
    pub fn implicit_parameters(&self) -> Vec<&Value> {
        self.split_implicits().0
    }

    /// Wrap `body` in implicit functions taking `parameters`, the first
    /// parameter outermost. Reverses [`Value::split_implicits`].
    pub fn wrap_implicits<'a>(
        parameters: impl IntoIterator<Item = &'a Value>,
        body: Value,
    ) -> Value {
        Value::function(
            body,
            parameters
                .into_iter()
                .map(|parameter| (parameter.clone(), true)),
        )
    }

    /// Rebuild the value, replacing every subtree for which `f` returns
    /// `Some`. Subtrees that are replaced are not visited further.
    pub fn rewrite(&self, f: &mut impl FnMut(&Value) -> Option<Value>) -> Value {
        if let Some(value) = f(self) {
            return value;
        }

        match self {
            Value::FreeVariable(_)
            | Value::NumberLiteral(_)
            | Value::BooleanLiteral(_)
            | Value::StringLiteral(_)
            | Value::SymbolLiteral(_) => self.clone(),
            Value::RecordLiteral(properties) => Value::RecordLiteral(
                properties
                    .iter()
                    .map(|(name, value)| (name.clone(), value.rewrite(f)))
                    .collect(),
            ),
            Value::DataValue { name, parameters } => Value::DataValue {
                name: Box::new(name.rewrite(f)),
                parameters: parameters
                    .iter()
                    .map(|parameter| parameter.rewrite(f))
                    .collect(),
            },
            Value::DualBinding { left, right } => Value::DualBinding {
                left: Box::new(left.rewrite(f)),
                right: Box::new(right.rewrite(f)),
            },
            Value::FunctionLiteral { parameter, body } => Value::FunctionLiteral {
                parameter: Box::new(parameter.rewrite(f)),
                body: Box::new(body.rewrite(f)),
            },
            Value::ImplicitFunctionLiteral { parameter, body } => {
                Value::ImplicitFunctionLiteral {
                    parameter: Box::new(parameter.rewrite(f)),
                    body: Box::new(body.rewrite(f)),
                }
            }
            Value::ApplicationValue { callee, parameter } => Value::ApplicationValue {
                callee: Box::new(callee.rewrite(f)),
                parameter: Box::new(parameter.rewrite(f)),
            },
            Value::ReadDataValueProperty {
                data_value,
                property,
            } => Value::ReadDataValueProperty {
                data_value: Box::new(data_value.rewrite(f)),
                property: *property,
            },
            Value::ReadRecordProperty { record, property } => Value::ReadRecordProperty {
                record: Box::new(record.rewrite(f)),
                property: property.clone(),
            },
            Value::PatternMatchValue { value, patterns } => Value::PatternMatchValue {
                value: Box::new(value.rewrite(f)),
                patterns: patterns
                    .iter()
                    .map(|pattern| PatternValue {
                        test: pattern.test.rewrite(f),
                        value: pattern.value.rewrite(f),
                    })
                    .collect(),
            },
        }
    }

    /// Every free variable mentioned in the value, in order of appearance and
    /// without duplicates.
    pub fn free_variables(&self) -> Vec<&str> {
        fn collect<'a>(value: &'a Value, variables: &mut Vec<&'a str>) {
            match value {
                Value::FreeVariable(name) => {
                    if !variables.contains(&name.as_str()) {
                        variables.push(name);
                    }
                }
                Value::NumberLiteral(_)
                | Value::BooleanLiteral(_)
                | Value::StringLiteral(_)
                | Value::SymbolLiteral(_) => {}
                Value::RecordLiteral(properties) => {
                    for value in properties.values() {
                        collect(value, variables);
                    }
                }
                Value::DataValue { name, parameters } => {
                    collect(name, variables);
                    for parameter in parameters {
                        collect(parameter, variables);
                    }
                }
                Value::DualBinding {
                    left: first,
                    right: second,
                }
                | Value::FunctionLiteral {
                    parameter: first,
                    body: second,
                }
                | Value::ImplicitFunctionLiteral {
                    parameter: first,
                    body: second,
                }
                | Value::ApplicationValue {
                    callee: first,
                    parameter: second,
                } => {
                    collect(first, variables);
                    collect(second, variables);
                }
                Value::ReadDataValueProperty {
                    data_value: source,
                    ..
                }
                | Value::ReadRecordProperty { record: source, .. } => collect(source, variables),
                Value::PatternMatchValue { value, patterns } => {
                    collect(value, variables);
                    for pattern in patterns {
                        collect(&pattern.test, variables);
                        collect(&pattern.value, variables);
                    }
                }
            }
        }

        let mut variables = Vec::new();
        collect(self, &mut variables);
        variables
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::FreeVariable(name) | Value::SymbolLiteral(name) => write!(f, "{name}"),
            Value::NumberLiteral(number) => write!(f, "{number}"),
            Value::BooleanLiteral(boolean) => write!(f, "{boolean}"),
            Value::StringLiteral(string) => write!(f, "{string:?}"),
            Value::RecordLiteral(properties) => {
                write!(f, "{{")?;
                for (index, (name, value)) in properties.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }

                    write!(f, "{name}: {value}")?;
                }

                write!(f, "}}")
            }
            Value::DataValue { name, parameters } => {
                write!(f, "{name}(")?;
                for (index, parameter) in parameters.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }

                    write!(f, "{parameter}")?;
                }

                write!(f, ")")
            }
            Value::DualBinding { left, right } => write!(f, "({left} | {right})"),
            Value::FunctionLiteral { parameter, body } => write!(f, "({parameter}) -> {body}"),
            Value::ImplicitFunctionLiteral { parameter, body } => {
                write!(f, "implicit ({parameter}) -> {body}")
            }
            Value::ApplicationValue { callee, parameter } => write!(f, "({callee} {parameter})"),
            Value::ReadDataValueProperty {
                data_value,
                property,
            } => write!(f, "{data_value}.{property}"),
            Value::ReadRecordProperty { record, property } => write!(f, "{record}.{property}"),
            Value::PatternMatchValue { value, patterns } => {
                write!(f, "match {value} {{")?;
                for (index, pattern) in patterns.iter().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }

                    write!(f, " {} => {}", pattern.test, pattern.value)?;
                }

                write!(f, " }}")
            }
        }
    }
}
