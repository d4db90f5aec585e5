//! Schema introspection
//!
//! Lists the fields a schema document defines, prints the decoded tree, and
//! checks documents against the embedded meta-schema.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use std::path::PathBuf;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::args::{FormSourceArgs, GlobalOpts, OutputFormat};
use crate::cli::helpers::{escape_tsv, schema_path, truncate_str};
use crate::core::config::Config;
use crate::core::provider::{FileSchemaProvider, SchemaProvider};
use crate::document;
use crate::schema::decode::SchemaError;
use crate::schema::node::SchemaNode;
use crate::schema::path::leaves;
use crate::schema::registry::SchemaRegistry;

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// Show the fields of a schema document
    Show(ShowArgs),

    /// Check a schema document against the meta-schema, reporting every problem
    Check(CheckArgs),

    /// Print the embedded meta-schema
    Meta,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Schema document (default: configured schema)
    pub schema: Option<PathBuf>,

    /// Print the decoded schema tree as JSON instead of a field table
    #[arg(long)]
    pub raw: bool,

    /// Skip the structural pre-check
    #[arg(long)]
    pub lenient: bool,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Schema document (default: configured schema)
    pub schema: Option<PathBuf>,
}

pub fn run(cmd: SchemaCommands, global: &GlobalOpts, config: &Config) -> Result<()> {
    match cmd {
        SchemaCommands::Show(args) => show_schema(args, global, config),
        SchemaCommands::Check(args) => check_schema(args, global, config),
        SchemaCommands::Meta => print_meta(),
    }
}

fn resolve_path(schema: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    let source = FormSourceArgs {
        schema,
        ..Default::default()
    };
    schema_path(&source, config)
}

fn show_schema(args: ShowArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let path = resolve_path(args.schema, config)?;
    let strict = !args.lenient && config.strict_schema();
    let schema = FileSchemaProvider::new(&path)
        .with_strict(strict)
        .fetch_schema()?;

    if args.raw {
        println!("{}", serde_json::to_string_pretty(&schema).into_diagnostic()?);
        return Ok(());
    }

    let format = global.format.or_configured(config.default_format.as_deref());
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&field_list(&schema)).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&field_list(&schema)).into_diagnostic()?);
        }
        OutputFormat::Tsv => print_fields_tsv(&schema),
        OutputFormat::Auto if !console::user_attended() => print_fields_tsv(&schema),
        OutputFormat::Auto => print_fields_table(&schema, global.quiet),
    }
    Ok(())
}

/// One JSON object per leaf, in document order
fn field_list(schema: &SchemaNode) -> serde_json::Value {
    let fields: Vec<_> = leaves(schema)
        .into_iter()
        .map(|leaf| {
            json!({
                "path": leaf.path,
                "type": leaf.node.kind().as_str(),
                "required": leaf.required,
                "title": leaf.node.title(),
                "constraints": leaf.node.constraints(),
            })
        })
        .collect();
    serde_json::Value::Array(fields)
}

fn print_fields_tsv(schema: &SchemaNode) {
    for leaf in leaves(schema) {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            leaf.path,
            leaf.node.kind(),
            if leaf.required { "yes" } else { "" },
            escape_tsv(leaf.node.title().unwrap_or("")),
            leaf.node.constraints()
        );
    }
}

fn print_fields_table(schema: &SchemaNode, quiet: bool) {
    let title = schema.title().unwrap_or("Form");
    if !quiet {
        println!("{}", style(title).bold());
        println!("{}", style("=".repeat(title.chars().count())).dim());
    }

    let mut builder = Builder::default();
    builder.push_record(["PATH", "TYPE", "REQ", "TITLE", "CONSTRAINTS"]);
    let fields = leaves(schema);
    for leaf in &fields {
        builder.push_record([
            leaf.path.clone(),
            leaf.node.kind().to_string(),
            if leaf.required { "yes".to_string() } else { String::new() },
            truncate_str(leaf.node.title().unwrap_or(""), 30),
            truncate_str(&leaf.node.constraints(), 40),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));

    if !quiet {
        println!(
            "\n{} field(s). Use {} for the decoded tree.",
            style(fields.len()).cyan(),
            style("--raw").yellow()
        );
    }
}

fn check_schema(args: CheckArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let path = resolve_path(args.schema, config)?;
    let document = document::read(&path)?;
    let registry = SchemaRegistry::default();

    let violations = registry.check(&document);
    if !violations.is_empty() {
        return Err(SchemaError::structure(violations).into());
    }
    // Structure is fine; decoding still catches semantic problems such as
    // a required name with no matching property
    let schema = registry.load(&document, false)?;

    if !global.quiet {
        println!(
            "{} {} is a valid form schema ({} field(s))",
            style("✓").green(),
            style(path.display()).cyan(),
            leaves(&schema).len()
        );
    }
    Ok(())
}

fn print_meta() -> Result<()> {
    let source = SchemaRegistry::meta_schema_source()
        .ok_or_else(|| miette::miette!("Meta-schema is not embedded in this build"))?;
    print!("{}", source);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::node::{IntegerNode, ObjectNode};

    #[test]
    fn test_field_list() {
        let schema: SchemaNode = ObjectNode::new()
            .property(
                "age",
                IntegerNode {
                    minimum: Some(0),
                    ..Default::default()
                }
                .into(),
            )
            .require("age")
            .into();

        let fields = field_list(&schema);
        assert_eq!(fields[0]["path"], "age");
        assert_eq!(fields[0]["type"], "integer");
        assert_eq!(fields[0]["required"], true);
        assert_eq!(fields[0]["constraints"], "min 0");
    }
}
