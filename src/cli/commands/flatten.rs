//! `schemaform flatten` - print the path-addressed values of a prefill document

use miette::Result;

use crate::cli::args::{FormSourceArgs, GlobalOpts};
use crate::cli::helpers::{document_order, load_session, render_rows};
use crate::core::config::Config;
use crate::core::value::DynamicValue;

#[derive(clap::Args, Debug)]
pub struct FlattenArgs {
    #[command(flatten)]
    pub source: FormSourceArgs,
}

pub fn run(args: FlattenArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let session = load_session(&args.source, config)?;
    let Some(schema) = session.schema() else {
        return Err(miette::miette!("No schema loaded"));
    };

    let rows = document_order(schema, session.state().values(), DynamicValue::to_json);
    let format = global.format.or_configured(config.default_format.as_deref());
    print!("{}", render_rows(&rows, ["FIELD", "VALUE"], format)?);
    Ok(())
}
