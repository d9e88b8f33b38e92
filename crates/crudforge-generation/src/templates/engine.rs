//! Template engine for rendering templates against a bound context
//!
//! Rendering is strict: every top-level name the template mentions must be bound, even
//! inside a branch that is not taken, and every name reached inside a loop must resolve.
//! Unresolved names are collected across the whole template and reported together
//! instead of rendering as empty strings.

use std::{collections::BTreeSet, path::PathBuf};

use serde_json::{Map, Value};

use crate::{
    error::GenerationError,
    templates::{
        context::GenerationContext,
        error::TemplateError,
        parser::{TemplateElement, TemplateParser},
        registry::TemplateDescriptor,
    },
};

/// Rendered output for one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Catalog id of the source template
    pub template_id: String,
    /// Target path relative to the output root
    pub path: PathBuf,
    /// File content
    pub content: String,
}

/// Template engine for rendering templates with variable substitution
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateEngine;

impl TemplateEngine {
    /// Create a new template engine
    pub fn new() -> Self {
        Self
    }

    /// Render a catalog template: both its target path and its body
    ///
    /// Missing bindings from the path and the body are reported in a single error.
    pub fn render(
        &self,
        template: &TemplateDescriptor,
        ctx: &GenerationContext,
    ) -> Result<RenderedFile, GenerationError> {
        let path = self.render_path(template.target_path_template, ctx);
        let content = self.render_str(template.body, ctx);

        match (path, content) {
            (Ok(path), Ok(content)) => Ok(RenderedFile {
                template_id: template.id.to_string(),
                path: PathBuf::from(path),
                content,
            }),
            (Err(TemplateError::MissingBinding(mut a)), Err(TemplateError::MissingBinding(b))) => {
                a.extend(b);
                a.sort();
                a.dedup();
                Err(GenerationError::MissingBinding { names: a })
            }
            (Err(err), _) | (_, Err(err)) => Err(match err {
                TemplateError::MissingBinding(names) => GenerationError::MissingBinding { names },
                other => GenerationError::TemplateSyntax {
                    template: template.id.to_string(),
                    source: other,
                },
            }),
        }
    }

    /// Render template text and normalize trailing whitespace
    pub fn render_str(&self, template: &str, ctx: &GenerationContext) -> Result<String, TemplateError> {
        let raw = self.render_raw(template, ctx)?;
        Ok(normalize_output(&raw))
    }

    /// Render a path pattern; the result is trimmed and never has a trailing newline
    pub fn render_path(&self, pattern: &str, ctx: &GenerationContext) -> Result<String, TemplateError> {
        let raw = self.render_raw(pattern, ctx)?;
        Ok(raw.trim().to_string())
    }

    fn render_raw(&self, template: &str, ctx: &GenerationContext) -> Result<String, TemplateError> {
        let parsed = TemplateParser::parse(template)?;

        let missing = parsed
            .placeholder_names
            .iter()
            .filter(|name| matches!(ctx.get(name), None | Some(Value::Null)))
            .cloned()
            .collect();

        let mut render = Render {
            scopes: vec![Scope::Borrowed(ctx.as_map())],
            missing,
            output: String::new(),
        };
        render.elements(&parsed.elements)?;

        if render.missing.is_empty() {
            Ok(render.output)
        } else {
            Err(TemplateError::MissingBinding(render.missing.into_iter().collect()))
        }
    }
}

/// Variables visible at one nesting level
enum Scope<'a> {
    Borrowed(&'a Map<String, Value>),
    Owned(Map<String, Value>),
}

impl Scope<'_> {
    fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Scope::Borrowed(map) => map.get(name),
            Scope::Owned(map) => map.get(name),
        }
    }
}

struct Render<'a> {
    scopes: Vec<Scope<'a>>,
    missing: BTreeSet<String>,
    output: String,
}

impl Render<'_> {
    fn elements(&mut self, elements: &[TemplateElement]) -> Result<(), TemplateError> {
        for element in elements {
            match element {
                TemplateElement::Text(text) => self.output.push_str(text),
                TemplateElement::Placeholder(name) => self.placeholder(name)?,
                TemplateElement::Conditional {
                    condition,
                    negated,
                    then_branch,
                    else_branch,
                } => {
                    let value = match self.lookup(condition) {
                        None | Some(Value::Null) => {
                            self.missing.insert(condition.clone());
                            continue;
                        }
                        Some(value) => value,
                    };
                    if is_truthy(value) != *negated {
                        self.elements(then_branch)?;
                    } else {
                        self.elements(else_branch)?;
                    }
                }
                TemplateElement::Loop { variable, content } => self.each(variable, content)?,
            }
        }
        Ok(())
    }

    fn placeholder(&mut self, name: &str) -> Result<(), TemplateError> {
        match self.lookup(name) {
            None | Some(Value::Null) => {
                self.missing.insert(name.to_string());
                Ok(())
            }
            Some(Value::String(s)) => {
                let s = s.clone();
                self.output.push_str(&s);
                Ok(())
            }
            Some(Value::Number(n)) => {
                let n = n.to_string();
                self.output.push_str(&n);
                Ok(())
            }
            Some(Value::Bool(b)) => {
                let b = if *b { "true" } else { "false" };
                self.output.push_str(b);
                Ok(())
            }
            Some(Value::Array(_) | Value::Object(_)) => Err(TemplateError::NotScalar(name.to_string())),
        }
    }

    fn each(&mut self, variable: &str, content: &[TemplateElement]) -> Result<(), TemplateError> {
        let items = match self.lookup(variable) {
            None | Some(Value::Null) => {
                self.missing.insert(variable.to_string());
                return Ok(());
            }
            Some(Value::Array(items)) => items.clone(),
            Some(_) => return Err(TemplateError::NotAList(variable.to_string())),
        };

        let len = items.len();
        for (index, item) in items.into_iter().enumerate() {
            let mut frame = match item {
                Value::Object(map) => map,
                other => {
                    let mut map = Map::new();
                    map.insert("this".to_string(), other);
                    map
                }
            };
            frame.insert("@index".to_string(), Value::from(index));
            frame.insert("@first".to_string(), Value::from(index == 0));
            frame.insert("@last".to_string(), Value::from(index + 1 == len));

            self.scopes.push(Scope::Owned(frame));
            let result = self.elements(content);
            self.scopes.pop();
            result?;
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Strip trailing whitespace per line, drop trailing blank lines, end with one newline
fn normalize_output(raw: &str) -> String {
    let mut lines: Vec<&str> = raw.lines().map(str::trim_end).collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return String::new();
    }
    let mut output = lines.join("\n");
    output.push('\n');
    output
}
