//! Shape attachment: give every node a type variable and collect the
//! constraints between them.

use crate::{Inferrer, InferredType, Operator, Value};
use quill_syntax::{Expression, ExpressionKind, Node};
use quill_util::UniqueNames;
use serde::{Deserialize, Serialize};

/// The decoration added by shape attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeInfo {
    /// The type variable standing for this node.
    pub shape_name: String,

    /// The node's type in terms of its children's shape variables.
    pub r#type: Value,
}

/// A node after shape attachment.
pub type ShapedNode = Node<ShapeInfo>;

/// Attach a shape to every node in `node`, returning the constraints in the
/// order they were generated.
pub fn attach_shapes<D>(
    node: Node<D>,
    names: &mut impl UniqueNames,
) -> (Vec<InferredType>, ShapedNode) {
    let mut context = ShapeContext {
        names,
        constraints: Vec::new(),
    };

    let node = attach(node, &mut context);

    log::debug!(
        "attached shapes to {} nodes with {} constraints",
        node.size(),
        context.constraints.len()
    );

    (context.constraints, node)
}

struct ShapeContext<'a, N> {
    names: &'a mut N,
    constraints: Vec<InferredType>,
}

impl<N: UniqueNames> ShapeContext<'_, N> {
    fn fresh(&mut self, prefix: &str) -> String {
        self.names.fresh(prefix)
    }

    fn constrain(&mut self, operator: Operator, from: &str, to: Value, node: &Origin<'_>) {
        self.constraints.push(InferredType::new(
            operator,
            from,
            to,
            node.shape_name,
            Inferrer::Shape(node.kind),
        ));
    }
}

struct Origin<'a> {
    shape_name: &'a str,
    kind: ExpressionKind,
}

fn shape(node: &ShapedNode) -> Value {
    Value::variable(&node.decoration.shape_name)
}

fn attach<D, N: UniqueNames>(node: Node<D>, context: &mut ShapeContext<'_, N>) -> ShapedNode {
    let kind = node.kind();
    let expression = node.expression.map_nodes(|child| attach(child, context));

    let shape_name = context.fresh(&format!("node{kind}Type$"));
    let origin = Origin {
        shape_name: &shape_name,
        kind,
    };

    let r#type = match &expression {
        Expression::Identifier(name) => Value::variable(name),
        Expression::Symbol(name) => Value::symbol(name),
        Expression::Number(number) => Value::NumberLiteral(*number),
        Expression::Boolean(boolean) => Value::BooleanLiteral(*boolean),
        Expression::String(string) => Value::StringLiteral(string.clone()),
        Expression::Record(properties) => Value::RecordLiteral(
            properties
                .iter()
                .map(|(name, value)| (name.clone(), shape(value)))
                .collect(),
        ),
        Expression::Application { callee, parameter } => {
            let result = Value::variable(context.fresh("applicationResult$"));

            context.constrain(
                Operator::EvaluatesTo,
                &callee.decoration.shape_name,
                Value::arrow(shape(parameter), result.clone()),
                &origin,
            );

            result
        }
        Expression::Function {
            parameter,
            body,
            implicit,
        } => {
            if *implicit {
                Value::implicit(shape(parameter), shape(body))
            } else {
                Value::arrow(shape(parameter), shape(body))
            }
        }
        Expression::DataInstantiation { callee, parameters } => {
            Value::data(shape(callee), parameters.iter().map(shape))
        }
        Expression::Binding { name, value, body } => {
            context.constrain(
                Operator::Equals,
                &value.decoration.shape_name,
                Value::variable(name),
                &origin,
            );

            shape(body)
        }
        Expression::Dual { left, right } => {
            let result = Value::variable(context.fresh("dualResult$"));

            for side in [left, right] {
                context.constrain(
                    Operator::EvaluatedFrom,
                    &side.decoration.shape_name,
                    result.clone(),
                    &origin,
                );
            }

            result
        }
        Expression::ReadRecordProperty { record, property } => {
            let result = Value::variable(context.fresh("recordPropertyResult$"));

            context.constrain(
                Operator::EvaluatedFrom,
                &record.decoration.shape_name,
                Value::record([(property.as_str(), result.clone())]),
                &origin,
            );

            result
        }
        Expression::ReadDataProperty {
            data_value,
            property,
        } => {
            let result = Value::variable(context.fresh("dataPropertyResult$"));
            let name = Value::variable(context.fresh("dataPropertyName$"));

            // Every parameter before the one being read is left unconstrained
            let mut parameters = (0..*property)
                .map(|_| Value::variable(context.fresh("dataPropertyParameter$")))
                .collect::<Vec<_>>();

            parameters.push(result.clone());

            context.constrain(
                Operator::EvaluatedFrom,
                &data_value.decoration.shape_name,
                Value::data(name, parameters),
                &origin,
            );

            result
        }
        Expression::PatternMatch { value, patterns } => {
            let test = Value::variable(context.fresh("patternTest$"));
            let result = Value::variable(context.fresh("patternResult$"));

            context.constrain(
                Operator::EvaluatedFrom,
                &value.decoration.shape_name,
                test.clone(),
                &origin,
            );

            for pattern in patterns {
                context.constrain(
                    Operator::EvaluatedFrom,
                    &pattern.test.decoration.shape_name,
                    test.clone(),
                    &origin,
                );

                context.constrain(
                    Operator::EvaluatedFrom,
                    &pattern.value.decoration.shape_name,
                    result.clone(),
                    &origin,
                );
            }

            result
        }
        Expression::Native { .. } => Value::variable(context.fresh("native$")),
    };

    context.constrain(Operator::Equals, &shape_name, r#type.clone(), &origin);

    Node::new(
        expression,
        ShapeInfo {
            shape_name,
            r#type,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_syntax::build::*;
    use quill_util::NameCounter;

    #[test]
    fn test_application() {
        let mut names = NameCounter::new();
        let (constraints, node) = attach_shapes(
            application(identifier("f"), number(1.0)),
            &mut names,
        );

        assert_eq!(node.decoration.shape_name, "nodeApplicationType$0");
        assert_eq!(node.decoration.r#type, Value::variable("applicationResult$0"));

        let rendered = constraints
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");

        insta::assert_snapshot!(rendered, @r"
        nodeIdentifierType$0 = f
        nodeNumberType$0 = 1
        nodeIdentifierType$0 ~> (nodeNumberType$0) -> applicationResult$0
        nodeApplicationType$0 = applicationResult$0
        ");
    }

    #[test]
    fn test_binding() {
        let mut names = NameCounter::new();
        let (constraints, node) = attach_shapes(
            binding("x", boolean(true), identifier("x")),
            &mut names,
        );

        assert_eq!(node.decoration.r#type, Value::variable("nodeIdentifierType$0"));

        let binding = constraints
            .iter()
            .find(|constraint| constraint.inferrer == Inferrer::Shape(ExpressionKind::Binding))
            .map(ToString::to_string);

        assert_eq!(binding.as_deref(), Some("nodeBooleanType$0 = x"));
    }

    #[test]
    fn test_pattern_match() {
        let mut names = NameCounter::new();
        let (constraints, _) = attach_shapes(
            pattern_match(
                identifier("v"),
                [(data(symbol("Some"), [identifier("y")]), identifier("y"))],
            ),
            &mut names,
        );

        let rendered = constraints
            .iter()
            .filter(|constraint| constraint.operator == Operator::EvaluatedFrom)
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");

        insta::assert_snapshot!(rendered, @r"
        nodeIdentifierType$0 <~ patternTest$0
        nodeDataInstantiationType$0 <~ patternTest$0
        nodeIdentifierType$2 <~ patternResult$0
        ");
    }

    #[test]
    fn test_property_reads_constrain_source() {
        let mut names = NameCounter::new();
        let (constraints, _) = attach_shapes(
            dual(
                read_record(identifier("point"), "x"),
                read_data(identifier("pair"), 2),
            ),
            &mut names,
        );

        let rendered = constraints
            .iter()
            .filter(|constraint| {
                matches!(
                    constraint.inferrer,
                    Inferrer::Shape(
                        ExpressionKind::ReadRecordProperty | ExpressionKind::ReadDataProperty
                    )
                )
            })
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");

        insta::assert_snapshot!(rendered, @r"
        nodeIdentifierType$0 <~ {x: recordPropertyResult$0}
        nodeReadRecordPropertyType$0 = recordPropertyResult$0
        nodeIdentifierType$1 <~ dataPropertyName$0(dataPropertyParameter$0, dataPropertyParameter$1, dataPropertyResult$0)
        nodeReadDataPropertyType$0 = dataPropertyResult$0
        ");
    }
}
