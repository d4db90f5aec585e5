//! `schemaform validate` - check a prefill document against its schema
//!
//! Edits given with `--set` go through the same path as an interactive
//! renderer: each one is written to the form and followed by a full
//! validation pass.

use console::style;
use miette::Result;

use crate::cli::args::{FormSourceArgs, GlobalOpts, OutputFormat};
use crate::cli::helpers::{document_order, load_session, render_rows};
use crate::core::config::Config;
use crate::core::session::SubmitError;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: FormSourceArgs,

    /// Set a field before validating (repeatable), e.g. --set address.city=Oslo
    #[arg(long = "set", value_name = "PATH=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,
}

/// Split `PATH=VALUE` at the first `=`
fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((path, value)) if !path.trim().is_empty() => Ok((path.trim().to_string(), value.to_string())),
        _ => Err(format!("expected PATH=VALUE, got '{}'", s)),
    }
}

pub fn run(args: ValidateArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let mut session = load_session(&args.source, config)?;

    for (path, raw) in &args.set {
        let valid = session.update_from_input(path, raw)?;
        tracing::debug!(%path, valid, "applied edit");
    }

    let format = global.format.or_configured(config.default_format.as_deref());
    let field_count = session.state().values().len();

    match session.submit() {
        Ok(_) => {
            if matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
                print!("{}", render_rows(&[], ["FIELD", "ERROR"], format)?);
            } else if !global.quiet {
                println!(
                    "{} Form is valid ({} field(s))",
                    style("✓").green(),
                    style(field_count).cyan()
                );
            }
            Ok(())
        }
        Err(SubmitError::Invalid { summary, .. }) => {
            if let Some(schema) = session.schema() {
                let rows = document_order(schema, session.state().errors(), |message| {
                    serde_json::Value::String(message.clone())
                });
                print!("{}", render_rows(&rows, ["FIELD", "ERROR"], format)?);
            }
            Err(miette::miette!(
                code = "schemaform::validate::invalid",
                help = "Fix the listed fields, or override them with --set PATH=VALUE",
                "Form is invalid: {}",
                summary
            ))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("address.city=Oslo").unwrap(),
            ("address.city".to_string(), "Oslo".to_string())
        );
        assert_eq!(
            parse_assignment("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_assignment("title=").unwrap().1, "");
        assert!(parse_assignment("title").is_err());
        assert!(parse_assignment("=value").is_err());
    }
}
