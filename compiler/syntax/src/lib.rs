//! The expression tree shared by every compiler pass.
//!
//! Trees arrive from the parser and renamer with `()` decorations; each later
//! pass rebuilds the tree with its own decoration type.

pub mod build;
mod expression;
mod node;

pub use expression::*;
pub use node::*;
