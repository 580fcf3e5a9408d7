//! Ticket body rendering.
//!
//! Templates use a small Jinja-compatible subset: `{{ var }}`, `{# comment #}`
//! and `{% if var %}` / `{% if not var %}` / `{% else %}` / `{% endif %}`.
//! A `-` just inside any delimiter (`{%- ... -%}`, `{{- ... -}}`,
//! `{#- ... -#}`) strips the whitespace before or after the tag, as in Jinja.
//! Rendering behaves as Jinja with `trim_blocks` and `keep_trailing_newline`
//! enabled, and the result always ends with a newline.
//!
//! The template file is read on every call. A missing or malformed template is
//! a deployment problem and is returned as [`CheckpointError::TemplateError`].

use crate::core::error::CheckpointError;
use std::fs;
use std::path::{Path, PathBuf};

/// Template bundled with the crate.
pub const DEFAULT_TEMPLATE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/templates/checkpoint-missing-info.j2"
);

/// Values available to a ticket template.
#[derive(Debug, Clone, Copy)]
pub struct TicketVars<'a> {
    pub app_name: &'a str,
    pub app_path: &'a str,
    pub field: &'a str,
    pub field_value: &'a str,
}

impl TicketVars<'_> {
    fn get(&self, name: &str) -> Option<&str> {
        match name {
            "app_name" => Some(self.app_name),
            "app_path" => Some(self.app_path),
            "field" => Some(self.field),
            "field_value" => Some(self.field_value),
            _ => None,
        }
    }

    fn lookup(&self, name: &str) -> Result<&str, CheckpointError> {
        self.get(name).ok_or_else(|| {
            CheckpointError::TemplateError(format!("unknown placeholder `{}`", name))
        })
    }
}

/// Renders ticket bodies from a template file.
#[derive(Debug, Clone)]
pub struct TicketRenderer {
    template: PathBuf,
}

impl Default for TicketRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl TicketRenderer {
    pub fn new(template: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &Path {
        &self.template
    }

    pub fn render(&self, vars: &TicketVars<'_>) -> Result<String, CheckpointError> {
        render_template(&self.template, vars)
    }
}

pub fn render_template(template: &Path, vars: &TicketVars<'_>) -> Result<String, CheckpointError> {
    let source = fs::read_to_string(template).map_err(|e| {
        CheckpointError::TemplateError(format!("cannot read {}: {}", template.display(), e))
    })?;
    render_str(&source, vars)
}

#[derive(Debug)]
enum Token<'a> {
    Text(&'a str),
    Var(&'a str),
    Block(&'a str),
}

fn tokenize(source: &str) -> Result<Vec<Token<'_>>, CheckpointError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        let Some(start) = next_tag_start(source, pos) else {
            tokens.push(Token::Text(&source[pos..]));
            break;
        };
        if start > pos {
            tokens.push(Token::Text(&source[pos..start]));
        }

        let opener = &source[start..start + 2];
        let closer = match opener {
            "{{" => "}}",
            "{%" => "%}",
            _ => "#}",
        };
        let body_start = start + 2;
        let Some(len) = source[body_start..].find(closer) else {
            let line = source[..start].lines().count().max(1);
            return Err(CheckpointError::TemplateError(format!(
                "unclosed `{}` on line {}",
                opener, line
            )));
        };
        let mut inner = &source[body_start..body_start + len];
        pos = body_start + len + closer.len();

        if let Some(rest) = inner.strip_prefix('-') {
            inner = rest;
            if let Some(Token::Text(text)) = tokens.last_mut() {
                let kept: &str = *text;
                *text = kept.trim_end();
                if text.is_empty() {
                    tokens.pop();
                }
            }
        }
        let trim_after = match inner.strip_suffix('-') {
            Some(rest) => {
                inner = rest;
                true
            }
            None => false,
        };
        let inner = inner.trim();

        match opener {
            "{{" => tokens.push(Token::Var(inner)),
            "{%" => tokens.push(Token::Block(inner)),
            _ => {}
        }

        if trim_after {
            pos = source.len() - source[pos..].trim_start().len();
        } else if opener != "{{" {
            // trim_blocks
            if source[pos..].starts_with("\r\n") {
                pos += 2;
            } else if source[pos..].starts_with('\n') {
                pos += 1;
            }
        }
    }

    Ok(tokens)
}

fn next_tag_start(source: &str, from: usize) -> Option<usize> {
    source[from..]
        .match_indices('{')
        .map(|(i, _)| from + i)
        .find(|&i| matches!(source.as_bytes().get(i + 1), Some(b'{' | b'%' | b'#')))
}

struct Branch {
    parent_active: bool,
    condition: bool,
    active: bool,
    in_else: bool,
}

pub fn render_str(source: &str, vars: &TicketVars<'_>) -> Result<String, CheckpointError> {
    let mut out = String::with_capacity(source.len());
    let mut branches: Vec<Branch> = Vec::new();

    for token in tokenize(source)? {
        let active = branches.last().is_none_or(|b| b.active);
        match token {
            Token::Text(text) => {
                if active {
                    out.push_str(text);
                }
            }
            Token::Var(name) => {
                let value = vars.lookup(name)?;
                if active {
                    out.push_str(value);
                }
            }
            Token::Block(tag) => {
                let words: Vec<&str> = tag.split_whitespace().collect();
                match words.as_slice() {
                    ["if", name] | ["if", "not", name] => {
                        let truthy = !vars.lookup(name)?.is_empty();
                        let condition = if words.len() == 3 { !truthy } else { truthy };
                        branches.push(Branch {
                            parent_active: active,
                            condition,
                            active: active && condition,
                            in_else: false,
                        });
                    }
                    ["else"] => {
                        let branch = branches.last_mut().ok_or_else(|| {
                            CheckpointError::TemplateError("`else` outside of `if`".to_string())
                        })?;
                        if branch.in_else {
                            return Err(CheckpointError::TemplateError(
                                "duplicate `else` in `if` block".to_string(),
                            ));
                        }
                        branch.in_else = true;
                        branch.active = branch.parent_active && !branch.condition;
                    }
                    ["endif"] => {
                        branches.pop().ok_or_else(|| {
                            CheckpointError::TemplateError("`endif` without `if`".to_string())
                        })?;
                    }
                    _ => {
                        return Err(CheckpointError::TemplateError(format!(
                            "unsupported tag `{{% {} %}}`",
                            tag
                        )));
                    }
                }
            }
        }
    }

    if !branches.is_empty() {
        return Err(CheckpointError::TemplateError(
            "`if` block is never closed".to_string(),
        ));
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}
