//! Node retyping: replace every node's shape variable and local type with
//! their simplified values.

use crate::{
    reduce::Reduction,
    shape::{ShapeInfo, ShapedNode},
    simplify::{substitute, Simplified},
    Error, Value,
};
use quill_syntax::{Expression, Node};
use serde::{Deserialize, Serialize};

/// The decoration added by retyping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typed {
    /// The value the surrounding expression requires of this node.
    pub shape: Value,

    /// The value this node actually produces, including any implicit
    /// parameters it still needs.
    pub r#type: Value,
}

/// A node after retyping.
pub type TypedNode = Node<Typed>;

/// Retype every node in `node`.
pub fn retype(
    node: ShapedNode,
    reduction: &Reduction,
    simplified: &Simplified,
) -> Result<TypedNode, Error> {
    if let Expression::Native { implementations } = &node.expression {
        if implementations.is_empty() {
            return Err(Error::EmptyNative(node.decoration.shape_name));
        }
    }

    let expression = node
        .expression
        .try_map_nodes(|child| retype(child, reduction, simplified))?;

    let ShapeInfo { shape_name, r#type } = node.decoration;

    let (Some(entry), Some(shape)) = (reduction.map.get(&shape_name), simplified.get(&shape_name))
    else {
        return Err(Error::MissingShape(shape_name));
    };

    let shape = if entry.is_consumed() {
        shape.strip_implicits().clone()
    } else {
        shape.clone()
    };

    Ok(Node::new(
        expression,
        Typed {
            shape,
            r#type: substitute(&r#type, simplified),
        },
    ))
}
