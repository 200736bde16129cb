//! Command file rendering per output format
//!
//! - Markdown: front matter (script blocks stripped) plus expanded body
//! - TOML: `description` and a multi-line `prompt` holding the same expanded
//!   Markdown, front matter included

use crate::agent::AgentProfile;
use crate::substitute::{FileFormat, expand, rewrite_path_references};
use crate::template::CommandTemplate;

/// Render a parsed command template for `agent`.
pub fn render(template: &CommandTemplate, agent: &AgentProfile) -> String {
    let variables = template.variables(&agent.id);
    let expanded = expand(&template.to_markdown(), &variables, agent.format);
    let content = rewrite_path_references(&expanded);

    match agent.format {
        FileFormat::Markdown => content,
        FileFormat::Toml => build_toml_content(&template.description, &content),
    }
}

fn build_toml_content(description: &str, prompt: &str) -> String {
    let mut toml_content = String::new();

    toml_content.push_str(&format!(
        "description = {}\n\n",
        escape_toml_string(description)
    ));

    toml_content.push_str("prompt = \"\"\"\n");
    toml_content.push_str(&escape_toml_multiline(prompt));
    if !prompt.ends_with('\n') {
        toml_content.push('\n');
    }
    toml_content.push_str("\"\"\"\n");

    toml_content
}

/// Escape a string for use in TOML basic strings
pub fn escape_toml_string(s: &str) -> String {
    let mut escaped = String::new();

    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\x00'..='\x08' | '\x0B' | '\x0C' | '\x0E'..='\x1F' | '\x7F' => {
                escaped.push_str(&format!("\\u{:04X}", c as u32));
            }
            _ => escaped.push(c),
        }
    }

    format!("\"{}\"", escaped)
}

/// Escape text for a TOML multi-line basic string body
fn escape_toml_multiline(s: &str) -> String {
    s.replace('\\', "\\\\").replace("\"\"\"", "\"\"\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substitute::ScriptVariant;

    const TEMPLATE: &str = "---\n\
description: Convert tasks into an epic\n\
scripts:\n  \
sh: scripts/bash/check-prerequisites.sh --json\n\
---\n\
Run `{SCRIPT}` then read memory/constitution.md.\n\
User input: {ARGS}\n";

    fn template() -> CommandTemplate {
        CommandTemplate::parse("taskstoepic", TEMPLATE, ScriptVariant::Sh).unwrap()
    }

    #[test]
    fn test_escape_toml_string() {
        assert_eq!(escape_toml_string("simple"), "\"simple\"");
        assert_eq!(escape_toml_string("with\"quote"), r#""with\"quote""#);
        assert_eq!(
            escape_toml_string("with\\backslash"),
            r#""with\\backslash""#
        );
        assert_eq!(escape_toml_string("with\nnewline"), r#""with\nnewline""#);
    }

    #[test]
    fn test_render_markdown() {
        let agent = AgentProfile::new("claude", "Claude Code", ".claude/commands");
        let rendered = render(&template(), &agent);
        assert_eq!(
            rendered,
            "---\ndescription: Convert tasks into an epic\n---\n\
             Run `.specify/scripts/bash/check-prerequisites.sh --json` then read .specify/memory/constitution.md.\n\
             User input: $ARGUMENTS\n"
        );
    }

    #[test]
    fn test_render_toml() {
        let agent = AgentProfile::new("gemini", "Gemini CLI", ".gemini/commands").with_toml();
        let rendered = render(&template(), &agent);
        assert!(rendered.starts_with(
            "description = \"Convert tasks into an epic\"\n\n\
             prompt = \"\"\"\n---\ndescription: Convert tasks into an epic\n---\n"
        ));
        assert!(rendered.contains("User input: {{args}}\n\"\"\"\n"));
        assert!(!rendered.contains("$ARGUMENTS"));
        assert!(!rendered.contains("scripts:"));
    }

    #[test]
    fn test_toml_escapes_backslashes_and_quotes() {
        let content = build_toml_content("d", "path C:\\x and \"\"\" end");
        assert!(content.contains("path C:\\\\x and \"\"\\\" end\n\"\"\"\n"));
    }
}
