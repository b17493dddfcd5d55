//! Exact unification of two values.

use crate::{Diagnostic, Inferrer, InferredType, Operator, Value};

/// Collects the facts and diagnostics produced while unifying values.
#[derive(Debug, Clone, Default)]
pub struct Convergence {
    /// The shape name new facts are attributed to.
    pub origin: String,

    /// Facts learned while unifying, to be reduced in turn.
    pub facts: Vec<InferredType>,

    /// Mismatches found while unifying.
    pub diagnostics: Vec<Diagnostic>,
}

impl Convergence {
    /// Start collecting facts attributed to `origin`.
    pub fn new(origin: impl Into<String>) -> Self {
        Convergence {
            origin: origin.into(),
            ..Default::default()
        }
    }

    /// Record that `variable` is exactly `value`.
    pub fn assume(&mut self, variable: &str, value: &Value) {
        self.facts.push(InferredType::new(
            Operator::Equals,
            variable,
            value.clone(),
            &self.origin,
            Inferrer::Convergence,
        ));
    }

    /// Record that `variable`, once its implicits are supplied, is `value`.
    pub fn defer(&mut self, variable: &str, value: &Value) {
        self.facts.push(InferredType::new(
            Operator::EvaluatesTo,
            variable,
            value.clone(),
            &self.origin,
            Inferrer::Deferral,
        ));
    }

    /// Record a mismatch.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Whether any mismatch was recorded.
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Unify `left` and `right`, returning the combined value.
///
/// Free variables on either side are absorbed and recorded as assumptions.
/// On a mismatch a diagnostic is recorded and `left` is kept.
pub fn converge(left: &Value, right: &Value, convergence: &mut Convergence) -> Value {
    if left == right {
        return left.clone();
    }

    match (left, right) {
        // Numbers are compared by representation so NaN matches itself
        (Value::NumberLiteral(left_number), Value::NumberLiteral(right_number))
            if left_number.to_bits() == right_number.to_bits() =>
        {
            left.clone()
        }
        (Value::FreeVariable(variable), other) | (other, Value::FreeVariable(variable)) => {
            convergence.assume(variable, other);
            other.clone()
        }
        (Value::DualBinding { left: first, right: second }, other) => {
            let collapsed = converge(first, second, convergence);
            converge(&collapsed, other, convergence)
        }
        (other, Value::DualBinding { left: first, right: second }) => {
            let collapsed = converge(first, second, convergence);
            converge(other, &collapsed, convergence)
        }
        (Value::NumberLiteral(_), Value::NumberLiteral(_))
        | (Value::BooleanLiteral(_), Value::BooleanLiteral(_))
        | (Value::StringLiteral(_), Value::StringLiteral(_))
        | (Value::SymbolLiteral(_), Value::SymbolLiteral(_)) => {
            // Equal literals were handled above
            convergence.report(Diagnostic::TypeValuesAreDifferent {
                left: left.clone(),
                right: right.clone(),
            });

            left.clone()
        }
        (Value::RecordLiteral(left_properties), Value::RecordLiteral(right_properties)) => {
            if !left_properties.keys().eq(right_properties.keys()) {
                convergence.report(Diagnostic::UnevenProperties {
                    left: left_properties.keys().cloned().collect(),
                    right: right_properties.keys().cloned().collect(),
                });

                return left.clone();
            }

            Value::RecordLiteral(
                left_properties
                    .iter()
                    .zip(right_properties.values())
                    .map(|((name, left), right)| (name.clone(), converge(left, right, convergence)))
                    .collect(),
            )
        }
        (
            Value::DataValue {
                name: left_name,
                parameters: left_parameters,
            },
            Value::DataValue {
                name: right_name,
                parameters: right_parameters,
            },
        ) => {
            let name = converge(left_name, right_name, convergence);

            if left_parameters.len() != right_parameters.len() {
                convergence.report(Diagnostic::ParameterCountsAreDifferent {
                    left: left_parameters.len(),
                    right: right_parameters.len(),
                });

                return Value::DataValue {
                    name: Box::new(name),
                    parameters: left_parameters.clone(),
                };
            }

            Value::DataValue {
                name: Box::new(name),
                parameters: left_parameters
                    .iter()
                    .zip(right_parameters)
                    .map(|(left, right)| converge(left, right, convergence))
                    .collect(),
            }
        }
        (
            Value::FunctionLiteral {
                parameter: left_parameter,
                body: left_body,
            },
            Value::FunctionLiteral {
                parameter: right_parameter,
                body: right_body,
            },
        ) => Value::arrow(
            converge(left_parameter, right_parameter, convergence),
            converge(left_body, right_body, convergence),
        ),
        (
            Value::ImplicitFunctionLiteral {
                parameter: left_parameter,
                body: left_body,
            },
            Value::ImplicitFunctionLiteral {
                parameter: right_parameter,
                body: right_body,
            },
        ) => Value::implicit(
            converge(left_parameter, right_parameter, convergence),
            converge(left_body, right_body, convergence),
        ),
        (
            Value::ApplicationValue {
                callee: left_callee,
                parameter: left_parameter,
            },
            Value::ApplicationValue {
                callee: right_callee,
                parameter: right_parameter,
            },
        ) => Value::ApplicationValue {
            callee: Box::new(converge(left_callee, right_callee, convergence)),
            parameter: Box::new(converge(left_parameter, right_parameter, convergence)),
        },
        (
            Value::ReadRecordProperty {
                record: left_record,
                property: left_property,
            },
            Value::ReadRecordProperty {
                record: right_record,
                property: right_property,
            },
        ) => {
            if left_property != right_property {
                convergence.report(Diagnostic::TypeValuesAreDifferent {
                    left: left.clone(),
                    right: right.clone(),
                });

                return left.clone();
            }

            Value::ReadRecordProperty {
                record: Box::new(converge(left_record, right_record, convergence)),
                property: left_property.clone(),
            }
        }
        (
            Value::ReadDataValueProperty {
                data_value: left_data_value,
                property: left_property,
            },
            Value::ReadDataValueProperty {
                data_value: right_data_value,
                property: right_property,
            },
        ) => {
            if left_property != right_property {
                convergence.report(Diagnostic::TypeValuesAreDifferent {
                    left: left.clone(),
                    right: right.clone(),
                });

                return left.clone();
            }

            Value::ReadDataValueProperty {
                data_value: Box::new(converge(left_data_value, right_data_value, convergence)),
                property: *left_property,
            }
        }
        (
            Value::PatternMatchValue {
                value: left_value,
                patterns: left_patterns,
            },
            Value::PatternMatchValue {
                value: right_value,
                patterns: right_patterns,
            },
        ) => {
            if left_patterns.len() != right_patterns.len() {
                convergence.report(Diagnostic::PatternCountsAreDifferent {
                    left: left_patterns.len(),
                    right: right_patterns.len(),
                });

                return left.clone();
            }

            Value::PatternMatchValue {
                value: Box::new(converge(left_value, right_value, convergence)),
                patterns: left_patterns
                    .iter()
                    .zip(right_patterns)
                    .map(|(left, right)| crate::PatternValue {
                        test: converge(&left.test, &right.test, convergence),
                        value: converge(&left.value, &right.value, convergence),
                    })
                    .collect(),
            }
        }
        _ => {
            convergence.report(Diagnostic::TypesAreDifferent {
                left: left.clone(),
                right: right.clone(),
            });

            left.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(left: &Value, right: &Value) -> (Value, Convergence) {
        let mut convergence = Convergence::new("test");
        let value = converge(left, right, &mut convergence);
        (value, convergence)
    }

    #[test]
    fn test_identical_records() {
        let record = Value::record([
            ("g", Value::NumberLiteral(1.0)),
            ("h", Value::NumberLiteral(2.0)),
        ]);

        let (value, convergence) = run(&record, &record);
        assert_eq!(value, record);
        assert!(convergence.is_ok());
        assert!(convergence.facts.is_empty());
    }

    #[test]
    fn test_swapped_record_values() {
        let (value, convergence) = run(
            &Value::record([
                ("g", Value::NumberLiteral(1.0)),
                ("h", Value::NumberLiteral(2.0)),
            ]),
            &Value::record([
                ("g", Value::NumberLiteral(2.0)),
                ("h", Value::NumberLiteral(1.0)),
            ]),
        );

        assert_eq!(convergence.diagnostics.len(), 2);
        assert_eq!(
            value,
            Value::record([
                ("g", Value::NumberLiteral(1.0)),
                ("h", Value::NumberLiteral(2.0)),
            ])
        );
    }

    #[test]
    fn test_variable_is_absorbed() {
        let (value, convergence) = run(&Value::BooleanLiteral(true), &Value::variable("t"));

        assert_eq!(value, Value::BooleanLiteral(true));
        assert!(convergence.is_ok());
        assert_eq!(
            convergence.facts,
            [InferredType::new(
                Operator::Equals,
                "t",
                Value::BooleanLiteral(true),
                "test",
                Inferrer::Convergence,
            )]
        );
    }

    #[test]
    fn test_dual_collapses() {
        let dual = Value::DualBinding {
            left: Box::new(Value::variable("a")),
            right: Box::new(Value::NumberLiteral(1.0)),
        };

        let (value, convergence) = run(&dual, &Value::NumberLiteral(1.0));
        assert_eq!(value, Value::NumberLiteral(1.0));
        assert!(convergence.is_ok());
        assert_eq!(convergence.facts.len(), 1);
    }

    #[test]
    fn test_different_kinds() {
        let (value, convergence) = run(
            &Value::StringLiteral(String::from("x")),
            &Value::NumberLiteral(1.0),
        );

        assert_eq!(value, Value::StringLiteral(String::from("x")));
        assert_eq!(
            convergence
                .diagnostics
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            ["Types are different"]
        );
    }

    #[test]
    fn test_parameter_counts() {
        let (_, convergence) = run(
            &Value::data(Value::symbol("Pair"), [Value::NumberLiteral(1.0)]),
            &Value::data(
                Value::symbol("Pair"),
                [Value::NumberLiteral(1.0), Value::NumberLiteral(2.0)],
            ),
        );

        assert_eq!(
            convergence.diagnostics,
            [Diagnostic::ParameterCountsAreDifferent { left: 1, right: 2 }]
        );
    }

    #[test]
    fn test_nan_matches_itself() {
        let (value, convergence) = run(
            &Value::NumberLiteral(f64::NAN),
            &Value::NumberLiteral(f64::NAN),
        );

        assert!(convergence.is_ok());
        assert!(matches!(value, Value::NumberLiteral(number) if number.is_nan()));
    }

    #[test]
    fn test_distinct_numbers_differ() {
        let (_, convergence) = run(&Value::NumberLiteral(1.0), &Value::NumberLiteral(2.0));

        assert_eq!(
            convergence
                .diagnostics
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            ["Type values are different"]
        );
    }

    #[test]
    fn test_record_against_number() {
        let (_, convergence) = run(
            &Value::NumberLiteral(1.0),
            &Value::record([("x", Value::variable("r"))]),
        );

        assert_eq!(
            convergence
                .diagnostics
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            ["Types are different"]
        );
    }

    fn pattern_match(value: Value, patterns: impl IntoIterator<Item = (Value, Value)>) -> Value {
        Value::PatternMatchValue {
            value: Box::new(value),
            patterns: patterns
                .into_iter()
                .map(|(test, value)| crate::PatternValue { test, value })
                .collect(),
        }
    }

    #[test]
    fn test_pattern_matches_converge() {
        let (value, convergence) = run(
            &pattern_match(
                Value::variable("v"),
                [(Value::BooleanLiteral(true), Value::variable("r"))],
            ),
            &pattern_match(
                Value::BooleanLiteral(true),
                [(Value::BooleanLiteral(true), Value::NumberLiteral(1.0))],
            ),
        );

        assert!(convergence.is_ok());
        assert_eq!(
            value,
            pattern_match(
                Value::BooleanLiteral(true),
                [(Value::BooleanLiteral(true), Value::NumberLiteral(1.0))],
            )
        );

        insta::assert_snapshot!(
            convergence
                .facts
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
            @r"
        v = true
        r = 1
        "
        );
    }

    #[test]
    fn test_pattern_counts() {
        let left = pattern_match(
            Value::variable("v"),
            [
                (Value::BooleanLiteral(true), Value::NumberLiteral(1.0)),
                (Value::BooleanLiteral(false), Value::NumberLiteral(0.0)),
            ],
        );

        let (value, convergence) = run(
            &left,
            &pattern_match(
                Value::variable("v"),
                [(Value::BooleanLiteral(true), Value::NumberLiteral(1.0))],
            ),
        );

        assert_eq!(value, left);
        assert_eq!(
            convergence.diagnostics,
            [Diagnostic::PatternCountsAreDifferent { left: 2, right: 1 }]
        );
        assert_eq!(
            convergence.diagnostics[0].to_string(),
            "Pattern counts are different"
        );
    }

    #[test]
    fn test_implicit_and_explicit_functions_differ() {
        let (_, convergence) = run(
            &Value::implicit(Value::variable("x"), Value::variable("b")),
            &Value::arrow(Value::variable("x"), Value::variable("b")),
        );

        assert_eq!(convergence.diagnostics.len(), 1);
    }
}
