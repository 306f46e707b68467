//! Request/response templates and `${name}` substitution.
//!
//! Templates are JSON documents. Any string may contain `${name}`
//! placeholders that are resolved from a [`TestContext`]. A string that is
//! exactly one placeholder is replaced by the variable's JSON value, so
//! structured variables (arrays, objects) survive rendering. Placeholders
//! embedded in a longer string are interpolated as text.
//!
//! Expected-response templates may additionally use the markers
//! [`IGNORE_MARKER`] and [`NOT_EMPTY_MARKER`], which pass through rendering
//! untouched and are interpreted by the validator.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::context::TestContext;
use crate::error::{HarnessError, Result};

/// Expected-response value: skip this field (and its subtree).
pub const IGNORE_MARKER: &str = "@ignore@";
/// Expected-response value: field must exist and be non-empty.
pub const NOT_EMPTY_MARKER: &str = "@notEmpty@";

pub const REQUEST_FILE: &str = "request.json";
pub const RESPONSE_FILE: &str = "response.json";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_.\-]*)\}").expect("placeholder regex")
});

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// Where the template came from, used in error messages.
    pub name: String,
    pub body: Value,
}

impl Template {
    pub fn new(name: impl Into<String>, body: Value) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    pub fn render(&self, ctx: &TestContext) -> Result<Value> {
        render_value(&self.body, ctx, &self.name)
    }

    /// Placeholder names referenced anywhere in the template.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_placeholders(&self.body, &mut names);
        names.sort();
        names.dedup();
        names
    }
}

/// Request template plus expected-response template of one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplatePair {
    pub request: Template,
    pub response: Template,
}

/// Rendered request body and expected-response body of one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPair {
    pub request: Value,
    pub expected: Value,
}

impl TemplatePair {
    pub fn render(&self, ctx: &TestContext) -> Result<RenderedPair> {
        Ok(RenderedPair {
            request: self.request.render(ctx)?,
            expected: self.response.render(ctx)?,
        })
    }
}

/// Named store of template pairs, keyed by suite directory and scenario name.
pub trait TemplateSource: Send + Sync {
    fn load(&self, dir: &str, scenario: &str) -> Result<TemplatePair>;
}

/// Templates laid out as `<root>/<dir>/<scenario>/{request,response}.json`.
#[derive(Debug, Clone)]
pub struct DirTemplates {
    root: PathBuf,
}

impl DirTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, path: &Path) -> Result<Template> {
        let name = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| HarnessError::Template {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        let body = serde_json::from_str(&content).map_err(|e| HarnessError::Template {
            name: name.clone(),
            reason: format!("invalid JSON: {e}"),
        })?;
        Ok(Template { name, body })
    }
}

impl TemplateSource for DirTemplates {
    fn load(&self, dir: &str, scenario: &str) -> Result<TemplatePair> {
        let base = self.root.join(dir).join(scenario);
        tracing::debug!(path = %base.display(), "loading templates");
        Ok(TemplatePair {
            request: self.read(&base.join(REQUEST_FILE))?,
            response: self.read(&base.join(RESPONSE_FILE))?,
        })
    }
}

/// In-memory templates.
#[derive(Debug, Clone, Default)]
pub struct StaticTemplates {
    pairs: HashMap<(String, String), TemplatePair>,
}

impl StaticTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dir: &str, scenario: &str, request: Value, response: Value) {
        let key = format!("{dir}/{scenario}");
        self.pairs.insert(
            (dir.to_string(), scenario.to_string()),
            TemplatePair {
                request: Template::new(format!("{key}/{REQUEST_FILE}"), request),
                response: Template::new(format!("{key}/{RESPONSE_FILE}"), response),
            },
        );
    }
}

impl TemplateSource for StaticTemplates {
    fn load(&self, dir: &str, scenario: &str) -> Result<TemplatePair> {
        self.pairs
            .get(&(dir.to_string(), scenario.to_string()))
            .cloned()
            .ok_or_else(|| HarnessError::Template {
                name: format!("{dir}/{scenario}"),
                reason: "no such template".into(),
            })
    }
}

/// Render every string inside `value`. Object keys are left as they are.
pub fn render_value(value: &Value, ctx: &TestContext, template: &str) -> Result<Value> {
    match value {
        Value::String(s) => render_string(s, ctx, template),
        Value::Array(items) => items
            .iter()
            .map(|item| render_value(item, ctx, template))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), render_value(item, ctx, template)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn render_string(input: &str, ctx: &TestContext, template: &str) -> Result<Value> {
    if let Some(caps) = PLACEHOLDER.captures(input) {
        if caps.get(0).is_some_and(|m| m.as_str().len() == input.len()) {
            return lookup(&caps[1], ctx, template).cloned();
        }
    }
    render_str(input, ctx, template).map(Value::String)
}

/// Interpolate placeholders into plain text (header values, URLs).
pub fn render_str(input: &str, ctx: &TestContext, template: &str) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let value = lookup(&caps[1], ctx, template)?;
        out.push_str(&input[last..whole.start()]);
        match value {
            Value::String(s) => out.push_str(s),
            other => out.push_str(&other.to_string()),
        }
        last = whole.end();
    }
    out.push_str(&input[last..]);
    Ok(out)
}

fn lookup<'a>(name: &str, ctx: &'a TestContext, template: &str) -> Result<&'a Value> {
    ctx.lookup(name)
        .ok_or_else(|| HarnessError::UnresolvedPlaceholder {
            name: name.to_string(),
            template: template.to_string(),
        })
}

fn collect_placeholders(value: &Value, names: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            names.extend(PLACEHOLDER.captures_iter(s).map(|caps| caps[1].to_string()));
        }
        Value::Array(items) => items.iter().for_each(|v| collect_placeholders(v, names)),
        Value::Object(map) => map.values().for_each(|v| collect_placeholders(v, names)),
        _ => {}
    }
}
