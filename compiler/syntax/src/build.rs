//! Shorthand constructors for undecorated trees, used by tests and by tools
//! that assemble trees without a parser.

use crate::{Expression, Node, Pattern};

/// An undecorated node, as produced by the parser.
pub type UntypedNode = Node<()>;

/// `name`
pub fn identifier(name: impl Into<String>) -> UntypedNode {
    Expression::Identifier(name.into()).into()
}

/// A bare symbol.
pub fn symbol(name: impl Into<String>) -> UntypedNode {
    Expression::Symbol(name.into()).into()
}

/// A number literal.
pub fn number(number: f64) -> UntypedNode {
    Expression::Number(number).into()
}

/// A boolean literal.
pub fn boolean(boolean: bool) -> UntypedNode {
    Expression::Boolean(boolean).into()
}

/// A string literal.
pub fn string(string: impl Into<String>) -> UntypedNode {
    Expression::String(string.into()).into()
}

/// `{name: value, ...}`
pub fn record<'a>(properties: impl IntoIterator<Item = (&'a str, UntypedNode)>) -> UntypedNode {
    Expression::Record(
        properties
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
    )
    .into()
}

/// `(callee parameter)`
pub fn application(callee: UntypedNode, parameter: UntypedNode) -> UntypedNode {
    Expression::Application {
        callee: callee.boxed(),
        parameter: parameter.boxed(),
    }
    .into()
}

/// `(parameter) => body`
pub fn function(parameter: UntypedNode, body: UntypedNode) -> UntypedNode {
    Expression::Function {
        parameter: parameter.boxed(),
        body: body.boxed(),
        implicit: false,
    }
    .into()
}

/// `implicit (parameter) => body`
pub fn implicit_function(parameter: UntypedNode, body: UntypedNode) -> UntypedNode {
    Expression::Function {
        parameter: parameter.boxed(),
        body: body.boxed(),
        implicit: true,
    }
    .into()
}

/// `callee(parameters...)`
pub fn data(callee: UntypedNode, parameters: impl IntoIterator<Item = UntypedNode>) -> UntypedNode {
    Expression::DataInstantiation {
        callee: callee.boxed(),
        parameters: parameters.into_iter().collect(),
    }
    .into()
}

/// `let name = value in body`
pub fn binding(name: impl Into<String>, value: UntypedNode, body: UntypedNode) -> UntypedNode {
    Expression::Binding {
        name: name.into(),
        value: value.boxed(),
        body: body.boxed(),
    }
    .into()
}

/// `(left | right)`
pub fn dual(left: UntypedNode, right: UntypedNode) -> UntypedNode {
    Expression::Dual {
        left: left.boxed(),
        right: right.boxed(),
    }
    .into()
}

/// `record.property`
pub fn read_record(record: UntypedNode, property: impl Into<String>) -> UntypedNode {
    Expression::ReadRecordProperty {
        record: record.boxed(),
        property: property.into(),
    }
    .into()
}

/// `data_value.property`
pub fn read_data(data_value: UntypedNode, property: usize) -> UntypedNode {
    Expression::ReadDataProperty {
        data_value: data_value.boxed(),
        property,
    }
    .into()
}

/// `match value { test => value, ... }`
pub fn pattern_match(
    value: UntypedNode,
    patterns: impl IntoIterator<Item = (UntypedNode, UntypedNode)>,
) -> UntypedNode {
    Expression::PatternMatch {
        value: value.boxed(),
        patterns: patterns
            .into_iter()
            .map(|(test, value)| Pattern { test, value })
            .collect(),
    }
    .into()
}

/// Backend-provided code.
pub fn native<'a>(implementations: impl IntoIterator<Item = (&'a str, &'a str)>) -> UntypedNode {
    Expression::Native {
        implementations: implementations
            .into_iter()
            .map(|(backend, source)| (backend.to_string(), source.to_string()))
            .collect(),
    }
    .into()
}
