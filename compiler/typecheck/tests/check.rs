#![allow(missing_docs)]

use quill_syntax::{build::*, Expression};
use quill_typecheck::{
    check, reduce, simplify, Inferrer, InferredType, Operator, Options, Value,
};
use quill_util::{NameCounter, NamesFn};
use rstest::rstest;

fn integer_identity(parameter: UntypedNode) -> UntypedNode {
    binding(
        "integerIdentity",
        implicit_function(
            data(symbol("Integer"), [identifier("x")]),
            function(identifier("x"), identifier("x")),
        ),
        application(identifier("integerIdentity"), parameter),
    )
}

fn messages(checked: &quill_typecheck::Checked) -> Vec<String> {
    checked
        .diagnostics
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn equals(from: &str, to: Value) -> InferredType {
    InferredType::new(Operator::Equals, from, to, "test", Inferrer::Convergence)
}

#[test]
fn integer_identity_resolves_builtin_instance() {
    let checked = check(
        integer_identity(number(1.0)),
        &mut NameCounter::new(),
        &Options::default(),
    )
    .unwrap();

    assert!(checked.is_ok(), "{:?}", checked.diagnostics);
    assert_eq!(checked.root_type(), &Value::NumberLiteral(1.0));

    insta::assert_snapshot!(
        checked.node,
        @"let integerIdentity = implicit (Integer(x)) => (x) => x in ((integerIdentity Integer) 1)"
    );

    let Expression::Binding { body, .. } = &checked.node.expression else {
        panic!("expected binding");
    };

    let Expression::Application { callee, .. } = &body.expression else {
        panic!("expected application");
    };

    assert_eq!(
        callee.decoration.resolved_implicits,
        [(
            String::from("Integer"),
            Value::data(Value::symbol("Integer"), [Value::NumberLiteral(1.0)])
        )]
    );

    assert_eq!(
        callee.decoration.r#type,
        Value::arrow(Value::NumberLiteral(1.0), Value::NumberLiteral(1.0))
    );
}

#[rstest]
#[case::fraction(number(1.5), Options::default())]
#[case::without_builtins(number(1.0), Options { builtin_instances: false, ..Default::default() })]
fn integer_identity_without_instance(#[case] parameter: UntypedNode, #[case] options: Options) {
    let checked = check(
        integer_identity(parameter),
        &mut NameCounter::new(),
        &options,
    )
    .unwrap();

    assert_eq!(
        messages(&checked),
        ["Could not find a valid set of replacements for implicits"]
    );
}

#[test]
fn builtin_instance_is_preferred_to_unconstrained_parameter() {
    let program = function(
        identifier("y"),
        binding(
            "ii",
            implicit_function(
                data(symbol("Integer"), [identifier("x")]),
                function(identifier("x"), identifier("x")),
            ),
            application(identifier("ii"), number(1.0)),
        ),
    );

    let checked = check(program, &mut NameCounter::new(), &Options::default()).unwrap();

    assert!(checked.is_ok(), "{:?}", checked.diagnostics);
    insta::assert_snapshot!(
        checked.node,
        @"(y) => let ii = implicit (Integer(x)) => (x) => x in ((ii Integer) 1)"
    );
}

#[test]
fn unconstrained_parameter_is_not_an_instance() {
    let program = function(
        identifier("y"),
        binding(
            "ii",
            implicit_function(
                data(symbol("Integer"), [identifier("x")]),
                function(identifier("x"), identifier("x")),
            ),
            application(identifier("ii"), number(1.0)),
        ),
    );

    let checked = check(
        program,
        &mut NameCounter::new(),
        &Options {
            builtin_instances: false,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(
        messages(&checked),
        ["Could not find a valid set of replacements for implicits"]
    );
}

#[test]
fn scope_bindings_satisfy_implicits() {
    let program = binding(
        "flag",
        boolean(true),
        binding(
            "choose",
            implicit_function(boolean(true), function(identifier("y"), identifier("y"))),
            application(identifier("choose"), string("yes")),
        ),
    );

    let checked = check(program, &mut NameCounter::new(), &Options::default()).unwrap();

    assert!(checked.is_ok(), "{:?}", checked.diagnostics);
    assert_eq!(
        checked.root_type(),
        &Value::StringLiteral(String::from("yes"))
    );

    insta::assert_snapshot!(
        checked.node,
        @r#"let flag = true in let choose = implicit (true) => (y) => y in ((choose flag) "yes")"#
    );
}

#[rstest]
#[case::identity(
    binding("identity", function(identifier("x"), identifier("x")), application(identifier("identity"), string("hi"))),
    Value::StringLiteral(String::from("hi")),
)]
#[case::record_property(
    binding("point", record([("y", boolean(true))]), read_record(identifier("point"), "y")),
    Value::BooleanLiteral(true),
)]
#[case::data_property(
    binding("pair", data(symbol("Pair"), [number(1.0), string("two")]), read_data(identifier("pair"), 1)),
    Value::StringLiteral(String::from("two")),
)]
#[case::parameter_property(
    application(function(identifier("p"), read_record(identifier("p"), "x")), record([("x", string("x"))])),
    Value::StringLiteral(String::from("x")),
)]
#[case::pattern_match(
    pattern_match(boolean(true), [(boolean(true), string("yes"))]),
    Value::StringLiteral(String::from("yes")),
)]
#[case::data_value(
    data(symbol("Pair"), [number(1.0), boolean(false)]),
    Value::data(Value::symbol("Pair"), [Value::NumberLiteral(1.0), Value::BooleanLiteral(false)]),
)]
fn root_types(#[case] program: UntypedNode, #[case] expected: Value) {
    let checked = check(program, &mut NameCounter::new(), &Options::default()).unwrap();

    assert!(checked.is_ok(), "{:?}", checked.diagnostics);
    assert_eq!(checked.root_type(), &expected);
}

#[rstest]
#[case::missing_property(
    binding("point", record([("x", number(1.0))]), read_record(identifier("point"), "nope")),
    "Uneven properties",
)]
#[case::property_of_number(read_record(number(1.0), "x"), "Types are different")]
#[case::data_index_out_of_range(
    binding("pair", data(symbol("Pair"), [number(1.0)]), read_data(identifier("pair"), 5)),
    "Parameter counts are different",
)]
#[case::index_of_record(
    read_data(record([("x", number(1.0))]), 0),
    "Types are different",
)]
fn invalid_property_reads(#[case] program: UntypedNode, #[case] message: &str) {
    let checked = check(program, &mut NameCounter::new(), &Options::default()).unwrap();

    assert_eq!(messages(&checked), [message]);
}

#[test]
fn dual_mismatch() {
    let checked = check(
        dual(number(1.0), string("a")),
        &mut NameCounter::new(),
        &Options::default(),
    )
    .unwrap();

    assert_eq!(messages(&checked), ["Types are different"]);
}

#[test]
fn self_application_terminates() {
    let program = binding(
        "f",
        function(identifier("x"), application(identifier("x"), identifier("x"))),
        identifier("f"),
    );

    let checked = check(
        program,
        &mut NameCounter::new(),
        &Options {
            reduction_limit: 1_000,
            ..Default::default()
        },
    );

    assert!(checked.is_ok());
}

#[test]
fn custom_names() {
    let mut counter = 0;
    let checked = check(
        number(1.0),
        &mut NamesFn(|prefix: &str| {
            counter += 1;
            format!("{prefix}custom{counter}")
        }),
        &Options::default(),
    )
    .unwrap();

    let names = checked
        .constraints
        .iter()
        .map(|constraint| constraint.from.as_str())
        .collect::<Vec<_>>();

    assert_eq!(names, ["nodeNumberType$custom1"]);
}

#[test]
fn constraints_are_recorded() {
    let checked = check(
        application(identifier("f"), boolean(true)),
        &mut NameCounter::new(),
        &Options::default(),
    )
    .unwrap();

    let rendered = checked
        .reduced
        .values()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");

    insta::assert_snapshot!(rendered, @r"
    nodeIdentifierType$0 = f
    nodeBooleanType$0 = true
    nodeApplicationType$0 = applicationResult$0
    f ~> (nodeBooleanType$0) -> applicationResult$0
    ");
}

#[test]
fn identical_records_converge() {
    let record = Value::record([
        ("g", Value::NumberLiteral(1.0)),
        ("h", Value::NumberLiteral(2.0)),
    ]);

    let reduction = reduce(
        [equals("r", record.clone()), equals("r", record)],
        &Options::default(),
    );

    assert!(reduction.diagnostics.is_empty());
}

#[test]
fn conflicting_records_report_each_property() {
    let reduction = reduce(
        [
            equals(
                "r",
                Value::record([
                    ("g", Value::NumberLiteral(1.0)),
                    ("h", Value::NumberLiteral(2.0)),
                ]),
            ),
            equals(
                "r",
                Value::record([
                    ("g", Value::NumberLiteral(2.0)),
                    ("h", Value::NumberLiteral(1.0)),
                ]),
            ),
        ],
        &Options::default(),
    );

    assert_eq!(reduction.diagnostics.len(), 2);
}

#[rstest]
#[case::absorbed(false, 0)]
#[case::conflicting(true, 1)]
fn evaluated_from_implicits(#[case] both_implicit: bool, #[case] expected: usize) {
    let explicit = [(Value::variable("a"), false)];
    let implicit = [(Value::variable("x"), true), (Value::variable("a"), false)];

    let left = if both_implicit {
        Value::function(Value::variable("b"), implicit.clone())
    } else {
        Value::function(Value::variable("b"), explicit)
    };

    let reduction = reduce(
        [
            equals("d", left),
            InferredType::new(
                Operator::EvaluatedFrom,
                "d",
                Value::function(Value::variable("b"), implicit),
                "test",
                Inferrer::Convergence,
            ),
        ],
        &Options::default(),
    );

    assert_eq!(reduction.diagnostics.len(), expected);
}

#[test]
fn trivial_and_cyclic_constraints() {
    let reduction = reduce(
        [
            equals("a", Value::variable("a")),
            equals("b", Value::arrow(Value::variable("b"), Value::NumberLiteral(1.0))),
        ],
        &Options::default(),
    );

    assert!(!reduction.map.contains_key("a"));

    let simplified = simplify(&reduction.map);
    assert_eq!(
        simplified["b"],
        Value::arrow(Value::variable("b"), Value::NumberLiteral(1.0))
    );
}
