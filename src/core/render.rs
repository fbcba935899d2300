//! Renderer module
//!
//! Renders ResultSet to different output formats: jsonl, json, md

use crate::core::model::{Kind, ResultItem, ResultSet};
use std::io::Write;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Renderer for result sets
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a result set to a string
    pub fn render(&self, result_set: &ResultSet) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(result_set),
            OutputFormat::Json => self.render_json(result_set),
            OutputFormat::Markdown => self.render_markdown(result_set),
        }
    }

    /// Render to a writer, followed by a trailing newline
    pub fn render_to<W: Write>(
        &self,
        result_set: &ResultSet,
        mut writer: W,
    ) -> std::io::Result<()> {
        let output = self.render(result_set);
        writeln!(writer, "{}", output)
    }

    /// Render as JSON Lines (one JSON object per line)
    fn render_jsonl(&self, result_set: &ResultSet) -> String {
        result_set
            .items
            .iter()
            .filter_map(|item| {
                if self.config.pretty {
                    serde_json::to_string_pretty(item).ok()
                } else {
                    serde_json::to_string(item).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    /// Render as a single JSON array
    fn render_json(&self, result_set: &ResultSet) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(&result_set.items).unwrap_or_else(|_| "[]".to_string())
        }
    }

    /// Render as Markdown
    fn render_markdown(&self, result_set: &ResultSet) -> String {
        let mut output = String::new();

        let mut sheets = Vec::new();
        let mut scans = Vec::new();
        let mut renames = Vec::new();
        let mut steps = Vec::new();
        let mut errors = Vec::new();

        for item in &result_set.items {
            match item.kind {
                Kind::Sheet => sheets.push(item),
                Kind::Scan => scans.push(item),
                Kind::Rename => renames.push(item),
                Kind::Git | Kind::Check => steps.push(item),
                Kind::Error => errors.push(item),
            }
        }

        if !errors.is_empty() {
            output.push_str("## Errors\n\n");
            for item in errors {
                for error in &item.errors {
                    output.push_str(&format!("- **{}**: {}\n", error.code, error.message));
                }
            }
            output.push('\n');
        }

        if !sheets.is_empty() {
            output.push_str("## Sheets\n\n");
            for item in sheets {
                if let Some(label) = &item.label {
                    output.push_str(&format!("- `{}`\n", label));
                }
            }
            output.push('\n');
        }

        if !scans.is_empty() {
            output.push_str("## Column Occurrences\n\n");
            for item in scans {
                self.render_scan_md(&mut output, item);
            }
        }

        if !renames.is_empty() {
            output.push_str("## Renames\n\n");
            for item in renames {
                let path = item.path.as_deref().unwrap_or("?");
                let excerpt = item.excerpt.as_deref().unwrap_or("");
                let marker = if item.meta.changed { "" } else { " (unchanged)" };
                output.push_str(&format!("- `{}`: {}{}\n", path, excerpt, marker));
            }
            output.push('\n');
        }

        if !steps.is_empty() {
            output.push_str("## Steps\n\n");
            for item in steps {
                if let Some(excerpt) = &item.excerpt {
                    output.push_str(&format!("- {}\n", excerpt));
                }
            }
            output.push('\n');
        }

        output
    }

    fn render_scan_md(&self, output: &mut String, item: &ResultItem) {
        let Some(path) = &item.path else {
            return;
        };
        output.push_str(&format!("### `{}`\n\n", path));

        let labels = item.data.as_ref().and_then(|d| d.as_object());
        match labels {
            Some(labels) if !labels.is_empty() => {
                for (label, counts) in labels {
                    let cell = match counts.as_object() {
                        None => "-".to_string(),
                        Some(map) if map.is_empty() => "none".to_string(),
                        Some(map) => map
                            .iter()
                            .map(|(column, count)| format!("{} ×{}", column, count))
                            .collect::<Vec<_>>()
                            .join(", "),
                    };
                    output.push_str(&format!("- **{}**: {}\n", label, cell));
                }
            }
            _ => output.push_str("- none\n"),
        }
        output.push('\n');
    }
}
