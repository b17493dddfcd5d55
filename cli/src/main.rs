//! Command-line driver for the Quill typechecker.

#![allow(clippy::print_stderr)]

use clap::{Parser, ValueEnum};
use quill_syntax::Node;
use quill_typecheck::{check, implicits::ResolvedNode, Checked, Diagnostic, Options, Value};
use quill_util::NameCounter;
use serde::Serialize;
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

#[derive(Debug, clap::Parser)]
#[clap(name = "quillc", about = "Typecheck Quill expression trees")]
enum Command {
    /// Typecheck a tree and report its type and diagnostics
    Check {
        #[clap(flatten)]
        options: CheckOptions,

        #[clap(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Print the constraints collected from a tree and how they were reduced
    Constraints {
        #[clap(flatten)]
        options: CheckOptions,
    },
}

#[derive(Debug, clap::Parser)]
struct CheckOptions {
    /// A JSON expression tree, or `-` to read from standard input
    path: PathBuf,

    #[clap(long)]
    reduction_limit: Option<usize>,

    #[clap(long)]
    no_builtin_instances: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    match Command::parse() {
        Command::Check { options, format } => {
            let checked = run(&options)?;

            match format {
                Format::Text => {
                    println!("{}", checked.root_type());

                    for diagnostic in &checked.diagnostics {
                        eprintln!("error: {diagnostic}");
                    }
                }
                Format::Json => {
                    println!("{}", serde_json::to_string_pretty(&Report::new(&checked))?);
                }
            }

            Ok(if checked.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Constraints { options } => {
            let checked = run(&options)?;

            println!("constraints:");
            for constraint in &checked.constraints {
                println!("  {constraint}");
            }

            println!("reduced:");
            for entry in checked.reduced.values() {
                println!("  {entry}");
            }

            println!("simplified:");
            for (name, value) in &checked.simplified {
                println!("  {name} = {value}");
            }

            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run(options: &CheckOptions) -> anyhow::Result<Checked> {
    let source = read_source(&options.path)?;

    let node: Node<()> = serde_json::from_str(&source)
        .map_err(|error| anyhow::format_err!("invalid expression tree: {error}"))?;

    let mut typecheck_options = Options {
        builtin_instances: !options.no_builtin_instances,
        ..Default::default()
    };

    if let Some(limit) = options.reduction_limit {
        typecheck_options.reduction_limit = limit;
    }

    log::debug!("typechecking {} nodes", node.size());

    Ok(check(node, &mut NameCounter::new(), &typecheck_options)?)
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        fs::read_to_string(path)
            .map_err(|error| anyhow::format_err!("could not read {}: {error}", path.display()))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    root_type: &'a Value,
    diagnostics: Vec<ReportedDiagnostic<'a>>,
    resolved_implicits: Vec<ReportedImplicits<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportedDiagnostic<'a> {
    message: String,
    diagnostic: &'a Diagnostic,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportedImplicits<'a> {
    expression: String,
    implicits: &'a [(String, Value)],
}

impl<'a> Report<'a> {
    fn new(checked: &'a Checked) -> Self {
        fn collect<'a>(node: &'a ResolvedNode, implicits: &mut Vec<ReportedImplicits<'a>>) {
            if !node.decoration.resolved_implicits.is_empty() {
                implicits.push(ReportedImplicits {
                    expression: node.to_string(),
                    implicits: &node.decoration.resolved_implicits,
                });
            }

            for child in node.children() {
                collect(child, implicits);
            }
        }

        let mut resolved_implicits = Vec::new();
        collect(&checked.node, &mut resolved_implicits);

        Report {
            root_type: checked.root_type(),
            diagnostics: checked
                .diagnostics
                .iter()
                .map(|diagnostic| ReportedDiagnostic {
                    message: diagnostic.to_string(),
                    diagnostic,
                })
                .collect(),
            resolved_implicits,
        }
    }
}
