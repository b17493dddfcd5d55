#![allow(missing_docs)]

use quill_syntax::Node;
use quill_typecheck::{check, Options, Value};
use quill_util::NameCounter;
use rstest::rstest;
use serde::Deserialize;
use std::{fs, path::PathBuf};

/// A program together with the outcome it should produce.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Program {
    diagnostics: Vec<String>,

    #[serde(default)]
    root_type: Option<Value>,

    expression: quill_syntax::Expression<()>,
}

#[rstest]
fn programs(#[files("tests/programs/*.json")] file: PathBuf) {
    let source = fs::read_to_string(&file).expect("failed to read file");
    let program: Program = serde_json::from_str(&source).expect("invalid test file");

    let checked = check(
        Node::from(program.expression),
        &mut NameCounter::new(),
        &Options::default(),
    )
    .expect("typechecking failed");

    let diagnostics = checked
        .diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    assert_eq!(diagnostics, program.diagnostics, "in {}", file.display());

    if let Some(root_type) = program.root_type {
        assert_eq!(checked.root_type(), &root_type, "in {}", file.display());
    }
}
