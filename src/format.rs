//! Output formatting for merged config sources.

use crate::overlay::Resolved;
use crate::source::MergedSource;
use anyhow::Result;

/// Output format for `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Render the merged source in the given format.
pub fn format_source(source: &MergedSource, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Yaml => {
            if source.is_empty() {
                // serde_yaml renders an empty mapping as "{}"
                String::new()
            } else {
                serde_yaml::to_string(source)?
            }
        }
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(source)?;
            json.push('\n');
            json
        }
    };
    Ok(rendered)
}

/// Render resolved options one per line as `name = value (tier)`.
pub fn format_resolved(resolved: &[(String, Resolved)]) -> String {
    let mut out = String::new();
    for (name, r) in resolved {
        match r.env_var {
            Some(ref var) => {
                out.push_str(&format!("{} = {} ({} {})\n", name, r.value, r.tier, var))
            }
            None => out.push_str(&format!("{} = {} ({})\n", name, r.value, r.tier)),
        }
    }
    out
}
