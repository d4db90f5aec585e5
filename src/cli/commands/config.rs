//! `schemaform config` - inspect the layered configuration

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::args::GlobalOpts;
use crate::core::config::{Config, PROJECT_CONFIG_FILE};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration, or a single key
    Show(ShowArgs),

    /// Show configuration file paths
    Path,

    /// List the configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Only print this key's value
    pub key: Option<String>,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("schema", "Default schema document"),
    ("prefill", "Default prefill document locator"),
    ("default_format", "Default output format (auto, json, yaml, tsv)"),
    ("strict_schema", "Check schema documents against the meta-schema (default: true)"),
];

pub fn run(cmd: ConfigCommands, _global: &GlobalOpts, config: &Config) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, config),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "schema" => config.schema.as_ref().map(|p| p.display().to_string()),
        "prefill" => config.prefill.clone(),
        "default_format" => config.default_format.clone(),
        "strict_schema" => Some(config.strict_schema().to_string()),
        _ => None,
    }
}

fn run_show(args: ShowArgs, config: &Config) -> Result<()> {
    if let Some(key) = &args.key {
        if !VALID_KEYS.iter().any(|(k, _)| k == key) {
            return Err(miette::miette!(
                help = "Run `schemaform config keys` to list valid keys",
                "Unknown configuration key '{}'",
                key
            ));
        }
        return match get_config_value(config, key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in VALID_KEYS {
        match get_config_value(config, key) {
            Some(v) => println!("  {}: {}", style(key).cyan(), v),
            None => println!("  {}: {}", style(key).cyan(), style("(not set)").dim()),
        }
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("{}", style("  1. Command-line flags").dim());
    println!("{}", style("  2. Environment (SCHEMAFORM_SCHEMA, SCHEMAFORM_PREFILL, SCHEMAFORM_FORMAT, SCHEMAFORM_STRICT_SCHEMA)").dim());
    println!("{}", style(format!("  3. Project config (./{})", PROJECT_CONFIG_FILE)).dim());
    println!("{}", style("  4. Global config").dim());
    Ok(())
}

fn project_config_path() -> Result<PathBuf> {
    let cwd = std::env::current_dir().into_diagnostic()?;
    Ok(cwd.join(PROJECT_CONFIG_FILE))
}

fn run_path() -> Result<()> {
    println!("{}", style("Configuration file paths:").bold());
    println!();

    match Config::global_config_path() {
        Some(path) => print_path("Global:", &path),
        None => println!("  {} {}", style("Global:").cyan(), style("(no home directory)").dim()),
    }
    print_path("Project:", &project_config_path()?);
    Ok(())
}

fn print_path(label: &str, path: &std::path::Path) {
    let status = if path.exists() {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    };
    println!("  {} {} {}", style(label).cyan(), path.display(), status);
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();
    for (key, description) in VALID_KEYS {
        println!("  {:<16} {}", style(key).cyan(), description);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_config_value() {
        let config = Config {
            schema: Some("forms/job.json".into()),
            ..Default::default()
        };
        assert_eq!(get_config_value(&config, "schema").as_deref(), Some("forms/job.json"));
        assert_eq!(get_config_value(&config, "prefill"), None);
        assert_eq!(get_config_value(&config, "strict_schema").as_deref(), Some("true"));
        assert_eq!(get_config_value(&config, "bogus"), None);
    }
}
