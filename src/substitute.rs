//! Placeholder substitution for command templates
//!
//! The substitution table is fixed:
//!
//! | Token            | Replacement                                         |
//! |------------------|-----------------------------------------------------|
//! | `{SCRIPT}`       | `scripts.<variant>` command of the template         |
//! | `{AGENT_SCRIPT}` | `agent_scripts.<variant>` command of the template   |
//! | `{ARGS}`         | `$ARGUMENTS` (Markdown) or `{{args}}` (TOML)        |
//! | `__AGENT__`      | target agent id                                     |
//!
//! Tokens are matched literally. There are no loops, conditionals, or nested
//! expressions. Expanded output no longer contains the source tokens, so
//! expanding it again changes nothing.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::packager::paths::{SPECIFY_DIR, TEMPLATE_ROOTS};

pub const SCRIPT_TOKEN: &str = "{SCRIPT}";
pub const AGENT_SCRIPT_TOKEN: &str = "{AGENT_SCRIPT}";
pub const ARGS_TOKEN: &str = "{ARGS}";
pub const AGENT_TOKEN: &str = "__AGENT__";

/// Output file format of an agent's command files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Markdown,
    Toml,
}

impl FileFormat {
    /// Replacement for `{ARGS}` in this format
    pub fn args_placeholder(self) -> &'static str {
        match self {
            FileFormat::Markdown => "$ARGUMENTS",
            FileFormat::Toml => "{{args}}",
        }
    }
}

/// Script flavor whose commands replace `{SCRIPT}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptVariant {
    #[default]
    Sh,
    Ps,
}

impl ScriptVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            ScriptVariant::Sh => "sh",
            ScriptVariant::Ps => "ps",
        }
    }
}

impl fmt::Display for ScriptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptVariant {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sh" => Ok(ScriptVariant::Sh),
            "ps" => Ok(ScriptVariant::Ps),
            other => Err(TemplateError::InvalidScriptVariant {
                variant: other.to_string(),
            }),
        }
    }
}

/// Values for the fixed placeholder table
///
/// A `None` value leaves its token untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVariables {
    pub script: Option<String>,
    pub agent_script: Option<String>,
    pub agent: Option<String>,
}

impl TemplateVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, command: impl Into<String>) -> Self {
        self.script = Some(command.into());
        self
    }

    pub fn with_agent_script(mut self, command: impl Into<String>) -> Self {
        self.agent_script = Some(command.into());
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }
}

/// Expand the fixed placeholders in `content`.
pub fn expand(content: &str, variables: &TemplateVariables, format: FileFormat) -> String {
    let mut expanded = content.to_string();

    if let Some(script) = &variables.script {
        expanded = expanded.replace(SCRIPT_TOKEN, script);
    }
    if let Some(agent_script) = &variables.agent_script {
        expanded = expanded.replace(AGENT_SCRIPT_TOKEN, agent_script);
    }
    expanded = expanded.replace(ARGS_TOKEN, format.args_placeholder());
    if let Some(agent) = &variables.agent {
        expanded = expanded.replace(AGENT_TOKEN, agent);
    }

    expanded
}

static PATH_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    let roots = TEMPLATE_ROOTS.join("|");
    #[allow(clippy::expect_used)]
    Regex::new(&format!(r"(^|[^A-Za-z0-9_./-])/?({roots})/"))
        .expect("path reference pattern is valid")
});

/// Point references to `memory/`, `scripts/` and `templates/` inside a
/// command body at their packaged location under `.specify/`.
///
/// References nested under another directory (`.specify/scripts/`,
/// `docs/templates/`) are left alone.
pub fn rewrite_path_references(content: &str) -> String {
    PATH_REFERENCE
        .replace_all(content, format!("${{1}}{SPECIFY_DIR}/${{2}}/").as_str())
        .into_owned()
}
