//! Command template parsing
//!
//! Command templates are Markdown files with YAML front matter:
//!
//! ```markdown
//! ---
//! description: Convert tasks into an epic
//! scripts:
//!   sh: scripts/bash/check-prerequisites.sh --json
//!   ps: scripts/powershell/check-prerequisites.ps1 -Json
//! ---
//! Run `{SCRIPT}` and use the user input: {ARGS}
//! ```
//!
//! The `scripts:` and `agent_scripts:` blocks only feed substitution and are
//! stripped from the emitted front matter. Other front-matter lines are kept
//! as written.

use serde_yaml::Value;

use crate::error::{Result, TemplateError};
use crate::substitute::{ScriptVariant, TemplateVariables};

const SCRIPT_BLOCKS: &[&str] = &["scripts", "agent_scripts"];

/// A parsed command template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    /// Template stem (`plan` for `templates/commands/plan.md`)
    pub name: String,
    pub description: String,
    /// `scripts.<variant>` for the selected variant
    pub script_command: Option<String>,
    /// `agent_scripts.<variant>` for the selected variant
    pub agent_script_command: Option<String>,
    front_matter: String,
    body: String,
}

impl CommandTemplate {
    /// Parse template text for the given script variant.
    pub fn parse(name: &str, raw: &str, script: ScriptVariant) -> Result<Self> {
        let source = format!("templates/commands/{name}.md");
        let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");

        let (front_matter, body) =
            split_front_matter(&normalized).ok_or_else(|| TemplateError::MalformedTemplate {
                path: source.clone(),
                reason: "missing YAML front matter".to_string(),
            })?;

        let value: Value =
            serde_yaml::from_str(&front_matter).map_err(|e| TemplateError::MalformedTemplate {
                path: source.clone(),
                reason: e.to_string(),
            })?;
        if !value.is_mapping() && !value.is_null() {
            return Err(TemplateError::MalformedTemplate {
                path: source,
                reason: "front matter is not a mapping".to_string(),
            });
        }

        let description = value
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(Self {
            name: name.to_string(),
            description,
            script_command: script_entry(&value, "scripts", script),
            agent_script_command: script_entry(&value, "agent_scripts", script),
            front_matter: strip_script_blocks(&front_matter),
            body,
        })
    }

    /// Placeholder values for rendering this template for `agent_id`
    pub fn variables(&self, agent_id: &str) -> TemplateVariables {
        let mut variables = TemplateVariables::new().with_agent(agent_id);
        if let Some(script) = &self.script_command {
            variables = variables.with_script(script);
        }
        if let Some(agent_script) = &self.agent_script_command {
            variables = variables.with_agent_script(agent_script);
        }
        variables
    }

    /// Body text after the front matter, leading blank lines removed
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Front matter (script blocks stripped) followed by the body
    pub fn to_markdown(&self) -> String {
        if self.front_matter.is_empty() {
            format!("---\n---\n{}", self.body)
        } else {
            format!("---\n{}\n---\n{}", self.front_matter, self.body)
        }
    }
}

/// Split `---`-delimited front matter from the body.
fn split_front_matter(content: &str) -> Option<(String, String)> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() < 2 || lines[0].trim() != "---" {
        return None;
    }
    let end_idx = lines[1..].iter().position(|l| l.trim() == "---")? + 1;

    let front_matter = lines[1..end_idx].join("\n");
    let mut body = lines[end_idx + 1..]
        .iter()
        .skip_while(|line| line.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");
    if !body.is_empty() && content.ends_with('\n') {
        body.push('\n');
    }

    Some((front_matter, body))
}

fn script_entry(front_matter: &Value, block: &str, script: ScriptVariant) -> Option<String> {
    front_matter
        .get(block)?
        .get(script.as_str())?
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Drop top-level `scripts:` / `agent_scripts:` blocks with their indented children.
fn strip_script_blocks(front_matter: &str) -> String {
    let mut kept = Vec::new();
    let mut skipping = false;

    for line in front_matter.lines() {
        let is_top_level = !line.is_empty() && !line.starts_with(char::is_whitespace);

        if is_top_level {
            let key = line.split(':').next().unwrap_or_default().trim();
            skipping = SCRIPT_BLOCKS.contains(&key);
        }

        if !skipping {
            kept.push(line);
        }
    }

    kept.join("\n").trim_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "---\n\
description: \"Convert tasks into an epic\"\n\
scripts:\n  \
sh: scripts/bash/check-prerequisites.sh --json\n  \
ps: scripts/powershell/check-prerequisites.ps1 -Json\n\
agent_scripts:\n  \
sh: scripts/bash/update-agent-context.sh __AGENT__\n\
handoffs:\n  \
- label: Plan\n\
---\n\
\n\
Run `{SCRIPT}` with {ARGS}\n";

    #[test]
    fn test_parse_extracts_metadata() {
        let template = CommandTemplate::parse("taskstoepic", TEMPLATE, ScriptVariant::Sh).unwrap();
        assert_eq!(template.description, "Convert tasks into an epic");
        assert_eq!(
            template.script_command.as_deref(),
            Some("scripts/bash/check-prerequisites.sh --json")
        );
        assert_eq!(
            template.agent_script_command.as_deref(),
            Some("scripts/bash/update-agent-context.sh __AGENT__")
        );
        assert_eq!(template.body(), "Run `{SCRIPT}` with {ARGS}\n");
    }

    #[test]
    fn test_parse_selects_variant() {
        let template = CommandTemplate::parse("taskstoepic", TEMPLATE, ScriptVariant::Ps).unwrap();
        assert_eq!(
            template.script_command.as_deref(),
            Some("scripts/powershell/check-prerequisites.ps1 -Json")
        );
        assert_eq!(template.agent_script_command, None);
    }

    #[test]
    fn test_markdown_strips_script_blocks() {
        let template = CommandTemplate::parse("taskstoepic", TEMPLATE, ScriptVariant::Sh).unwrap();
        let markdown = template.to_markdown();
        assert!(markdown.starts_with("---\ndescription: \"Convert tasks into an epic\"\nhandoffs:\n  - label: Plan\n---\n"));
        assert!(!markdown.contains("scripts:"));
        assert!(!markdown.contains("check-prerequisites.ps1"));
        assert!(markdown.ends_with("Run `{SCRIPT}` with {ARGS}\n"));
    }

    #[test]
    fn test_crlf_is_normalized() {
        let crlf = TEMPLATE.replace('\n', "\r\n");
        let template = CommandTemplate::parse("taskstoepic", &crlf, ScriptVariant::Sh).unwrap();
        assert!(!template.to_markdown().contains('\r'));
        assert_eq!(template.description, "Convert tasks into an epic");
    }

    #[test]
    fn test_missing_front_matter_is_malformed() {
        let err = CommandTemplate::parse("plain", "# Just markdown\n", ScriptVariant::Sh).unwrap_err();
        assert!(matches!(err, TemplateError::MalformedTemplate { .. }));
        assert!(err.to_string().contains("templates/commands/plain.md"));
    }

    #[test]
    fn test_invalid_yaml_is_malformed() {
        let raw = "---\ndescription: [unclosed\n---\nbody\n";
        assert!(matches!(
            CommandTemplate::parse("bad", raw, ScriptVariant::Sh),
            Err(TemplateError::MalformedTemplate { .. })
        ));
    }

    #[test]
    fn test_variables_carry_agent_and_scripts() {
        let template = CommandTemplate::parse("taskstoepic", TEMPLATE, ScriptVariant::Sh).unwrap();
        let vars = template.variables("gemini");
        assert_eq!(vars.agent.as_deref(), Some("gemini"));
        assert_eq!(
            vars.script.as_deref(),
            Some("scripts/bash/check-prerequisites.sh --json")
        );
    }

    #[test]
    fn test_empty_front_matter() {
        let template = CommandTemplate::parse("x", "---\n---\nBody\n", ScriptVariant::Sh).unwrap();
        assert_eq!(template.description, "");
        assert_eq!(template.to_markdown(), "---\n---\nBody\n");
    }
}
