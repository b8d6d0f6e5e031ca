//! HTML email body rendering.
//!
//! `HtmlBuilder` fills a Jinja-style template (via minijinja) with four named
//! slots, inserted without escaping. Setters take the builder by value and
//! return the updated builder, so a clone taken mid-chain is unaffected by
//! later setters.

use crate::error::{ReportError, Result};
use minijinja::{AutoEscape, Environment};
use std::collections::BTreeMap;
use std::path::Path;

pub const TITLE: &str = "title";
pub const BODY_HEAD_TITLE: &str = "body_head_title";
pub const BODY_MIDDLE_TEXT: &str = "body_middle_text";
pub const BODY_BOTTOM_TEXT: &str = "body_bottom_text";

/// Template plus the context it will be rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlBuilder {
    source: String,
    context: BTreeMap<&'static str, String>,
}

impl HtmlBuilder {
    /// Creates a builder, rejecting templates that do not parse.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let source = template.into();
        environment().template_from_str(&source)?;

        Ok(Self {
            source,
            context: BTreeMap::new(),
        })
    }

    /// Reads the template from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            ReportError::template(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::new(source)
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        self.with_slot(TITLE, title)
    }

    pub fn with_body_head_title(self, body_head_title: impl Into<String>) -> Self {
        self.with_slot(BODY_HEAD_TITLE, body_head_title)
    }

    pub fn with_body_middle_text(self, body_middle_text: impl Into<String>) -> Self {
        self.with_slot(BODY_MIDDLE_TEXT, body_middle_text)
    }

    pub fn with_body_bottom_text(self, body_bottom_text: impl Into<String>) -> Self {
        self.with_slot(BODY_BOTTOM_TEXT, body_bottom_text)
    }

    fn with_slot(mut self, slot: &'static str, value: impl Into<String>) -> Self {
        self.context.insert(slot, value.into());
        self
    }

    /// Current value of a slot, if set.
    pub fn slot(&self, slot: &str) -> Option<&str> {
        self.context.get(slot).map(String::as_str)
    }

    /// Renders the template. Unset slots render as empty strings.
    pub fn build(&self) -> Result<String> {
        let env = environment();
        let template = env.template_from_str(&self.source)?;
        Ok(template.render(&self.context)?)
    }
}

/// Environment used for every render.
///
/// Slot values are inserted verbatim so they may carry markup; templates
/// that need escaping apply `|e` themselves.
fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env
}
