//! SQL sources: inline statements or `.sql` templates on disk.

use crate::error::{ReportError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Where the SQL for an enquiry comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    /// Literal SQL, executed as-is.
    Inline(String),
    /// A template file whose `{0}`/`{1}` placeholders take schema and table.
    File(PathBuf),
}

impl QuerySource {
    /// Interprets a configured query: anything ending in `.sql` names a file
    /// inside `sql_dir`, everything else is inline SQL.
    pub fn parse(query: &str, sql_dir: &Path) -> Self {
        let trimmed = query.trim();
        if trimmed.ends_with(".sql") {
            Self::File(sql_dir.join(trimmed))
        } else {
            Self::Inline(query.to_string())
        }
    }

    /// Produces the SQL text to execute.
    pub fn resolve(&self, schema: &str, table: &str) -> Result<String> {
        match self {
            Self::Inline(sql) => Ok(sql.clone()),
            Self::File(path) => {
                let template = std::fs::read_to_string(path).map_err(|e| {
                    ReportError::query(format!("Failed to read {}: {e}", path.display()))
                })?;
                substitute_positional(&template, &[schema, table])
            }
        }
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{|\}\}|\{(\d+)\}").expect("placeholder pattern is valid")
    })
}

/// Replaces `{N}` with `args[N]`; `{{` and `}}` are literal braces.
pub fn substitute_positional(template: &str, args: &[&str]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in placeholder_pattern().captures_iter(template) {
        let whole = caps.get(0).expect("group 0 always matches");
        out.push_str(&template[last..whole.start()]);

        match (whole.as_str(), caps.get(1)) {
            ("{{", _) => out.push('{'),
            ("}}", _) => out.push('}'),
            (_, Some(index)) => {
                let arg = index
                    .as_str()
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| args.get(i))
                    .ok_or_else(|| {
                        ReportError::query(format!(
                            "SQL template references {} but only {} arguments are available",
                            whole.as_str(),
                            args.len()
                        ))
                    })?;
                out.push_str(arg);
            }
            _ => unreachable!("pattern only matches braces or indexed placeholders"),
        }

        last = whole.end();
    }

    out.push_str(&template[last..]);
    Ok(out)
}
