//! Schema-driven interactive form filling
//!
//! Walks every leaf of the loaded schema, prompts for its value with the
//! current (prefilled) value as default, and re-prompts until the field
//! passes validation. Each accepted edit goes through the session, so the
//! whole form is re-validated exactly as any other renderer would do it.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};
use serde_json::Value as JsonValue;

use crate::core::session::FormSession;
use crate::core::value::DynamicValue;
use crate::schema::node::SchemaNode;
use crate::schema::path::{leaves, Leaf};

/// Interactive renderer for a loaded [`FormSession`]
pub struct SchemaWizard {
    theme: ColorfulTheme,
}

/// Result of running the wizard
#[derive(Debug)]
pub struct WizardResult {
    /// Submitted values keyed by path
    pub payload: JsonValue,
    /// Number of fields whose value changed
    pub edited: usize,
}

impl SchemaWizard {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// Prompt for every field, then submit
    pub fn run(&self, session: &mut FormSession) -> Result<WizardResult> {
        let schema = session
            .schema()
            .cloned()
            .ok_or_else(|| miette::miette!("No schema loaded"))?;

        println!();
        println!(
            "{} {}",
            style("◆").cyan(),
            style(schema.title().unwrap_or("Form")).bold()
        );
        println!("{}", style("─".repeat(50)).dim());
        println!();

        let mut edited = 0;
        for leaf in leaves(&schema) {
            let before = session.value(&leaf.path);
            loop {
                let value = self.prompt_field(&leaf, &session.value(&leaf.path))?;
                session.update_value(&leaf.path, value)?;
                match session.state().error_for(&leaf.path) {
                    Some(message) => println!("  {} {}", style("✗").red(), style(message).red()),
                    None => break,
                }
            }
            if session.value(&leaf.path) != before {
                edited += 1;
            }
        }

        let payload = session.submit()?;

        println!();
        println!("{} Form complete!", style("✓").green());

        Ok(WizardResult { payload, edited })
    }

    /// Prompt the user for one field, starting from its current value
    fn prompt_field(&self, leaf: &Leaf<'_>, current: &DynamicValue) -> Result<DynamicValue> {
        let prompt = format_prompt(leaf);

        match leaf.node {
            SchemaNode::String(node) if node.options.is_some() => {
                let options = node.options.as_deref().unwrap_or_default();
                let mut items: Vec<&str> = options.iter().map(String::as_str).collect();
                if !leaf.required {
                    items.insert(0, "(none)");
                }
                let default_idx = select_index(&items, current.as_str().unwrap_or(""));

                let selection = Select::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .items(&items)
                    .default(default_idx)
                    .interact()
                    .into_diagnostic()?;

                if !leaf.required && selection == 0 {
                    Ok(DynamicValue::Text(String::new()))
                } else {
                    Ok(DynamicValue::Text(items[selection].to_string()))
                }
            }

            SchemaNode::Boolean(_) => {
                let items = &["Yes", "No"];
                let default_idx = if current.as_bool().unwrap_or(false) { 0 } else { 1 };

                let selection = Select::with_theme(&self.theme)
                    .with_prompt(&prompt)
                    .items(items)
                    .default(default_idx)
                    .interact()
                    .into_diagnostic()?;

                Ok(DynamicValue::Boolean(selection == 0))
            }

            SchemaNode::Array(_) => {
                let default_str = current.as_list().map(|items| items.join(", ")).unwrap_or_default();
                let value = self.input(&format!("{} (comma-separated)", prompt), default_str)?;
                Ok(DynamicValue::from_input(leaf.node, &value))
            }

            SchemaNode::String(_) | SchemaNode::Integer(_) | SchemaNode::Number(_) => {
                let value = self.input(&prompt, current.to_text())?;
                Ok(DynamicValue::from_input(leaf.node, &value))
            }

            // Not a leaf; never produced by `leaves`
            SchemaNode::Object(_) => Ok(DynamicValue::Absent),
        }
    }

    fn input(&self, prompt: &str, default: String) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if !default.is_empty() {
            input = input.default(default);
        }
        input.interact_text().into_diagnostic()
    }
}

impl Default for SchemaWizard {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of `current` among `items`, or the first item
fn select_index(items: &[&str], current: &str) -> usize {
    items.iter().position(|item| *item == current).unwrap_or(0)
}

/// Build the prompt label for a field: title-cased name, required marker,
/// and a dimmed constraint summary
fn format_prompt(leaf: &Leaf<'_>) -> String {
    let label = leaf
        .node
        .title()
        .filter(|t| !t.is_empty())
        .map(String::from)
        .unwrap_or_else(|| humanize(leaf.name));

    let mut prompt = label;
    if leaf.required {
        prompt.push_str(" *");
    }
    let constraints = leaf.node.constraints();
    if !constraints.is_empty() {
        prompt = format!("{} ({})", prompt, style(constraints).dim());
    }
    prompt
}

/// `employment_type` / `employmentType` -> `Employment Type`
fn humanize(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' || c == '-' {
            spaced.push(' ');
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower {
            spaced.push(' ');
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        spaced.push(c);
    }

    spaced
        .split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::node::{ObjectNode, StringNode};

    #[test]
    fn test_wizard_creation() {
        let _wizard = SchemaWizard::default();
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("employmentType"), "Employment Type");
        assert_eq!(humanize("application_deadline"), "Application Deadline");
        assert_eq!(humanize("zip"), "Zip");
    }

    #[test]
    fn test_select_index() {
        assert_eq!(select_index(&["a", "b", "c"], "b"), 1);
        assert_eq!(select_index(&["a", "b"], "zzz"), 0);
    }

    #[test]
    fn test_format_prompt() {
        console::set_colors_enabled(false);
        let schema: SchemaNode = ObjectNode::new()
            .property(
                "salary",
                StringNode {
                    title: Some("Yearly salary".into()),
                    min_length: Some(2),
                    ..Default::default()
                }
                .into(),
            )
            .property("employmentType", SchemaNode::string())
            .require("salary")
            .into();
        let fields = leaves(&schema);

        assert_eq!(format_prompt(&fields[0]), "Yearly salary * (minLength 2)");
        assert_eq!(format_prompt(&fields[1]), "Employment Type");
    }
}
