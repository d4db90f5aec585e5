//! `schemaform fill` - interactive form filling

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::args::{FormSourceArgs, GlobalOpts};
use crate::cli::helpers::load_session;
use crate::core::config::Config;
use crate::document::DocumentFormat;
use crate::schema::wizard::SchemaWizard;

#[derive(clap::Args, Debug)]
pub struct FillArgs {
    #[command(flatten)]
    pub source: FormSourceArgs,

    /// Write the submitted values here (JSON, or YAML by extension) instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: FillArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    if !console::user_attended() {
        return Err(miette::miette!(
            help = "Use `schemaform validate --set PATH=VALUE` for non-interactive edits",
            "fill needs an interactive terminal"
        ));
    }

    let mut session = load_session(&args.source, config)?;
    let result = SchemaWizard::new().run(&mut session)?;

    match &args.output {
        Some(path) => {
            fs::write(path, serialize_payload(&result.payload, path)?).into_diagnostic()?;
            if !global.quiet {
                println!(
                    "{} Wrote {} ({} field(s) edited)",
                    style("✓").green(),
                    style(path.display()).cyan(),
                    result.edited
                );
            }
        }
        None => println!("{}", serde_json::to_string_pretty(&result.payload).into_diagnostic()?),
    }
    Ok(())
}

fn serialize_payload(payload: &JsonValue, path: &Path) -> Result<String> {
    match DocumentFormat::from_path(path) {
        DocumentFormat::Yaml => serde_yml::to_string(payload).into_diagnostic(),
        DocumentFormat::Json => {
            let mut out = serde_json::to_string_pretty(payload).into_diagnostic()?;
            out.push('\n');
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_payload_by_extension() {
        let payload = json!({"title": "Engineer", "openings": 2});

        let yaml = serialize_payload(&payload, Path::new("out.yaml")).unwrap();
        assert!(yaml.contains("openings: 2"));

        let json_text = serialize_payload(&payload, Path::new("out.json")).unwrap();
        let parsed: JsonValue = serde_json::from_str(&json_text).unwrap();
        assert_eq!(parsed, payload);
    }
}
