//! Template syntax parser
//!
//! Parses template syntax into an element tree, validates block structure and
//! extracts the top-level binding names a template needs.

use std::collections::BTreeSet;

use crate::templates::error::TemplateError;

/// Represents a parsed template element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateElement {
    /// Plain text content
    Text(String),
    /// Placeholder: {{name}}
    Placeholder(String),
    /// Conditional block: {{#if cond}}...{{else}}...{{/if}} or {{#unless cond}}...{{/unless}}
    Conditional {
        /// Binding tested for truthiness
        condition: String,
        /// True for `unless`
        negated: bool,
        /// Rendered when the condition holds
        then_branch: Vec<TemplateElement>,
        /// Rendered otherwise
        else_branch: Vec<TemplateElement>,
    },
    /// Loop block: {{#each items}}...{{/each}}
    Loop {
        /// List binding to iterate over
        variable: String,
        /// Content rendered per item
        content: Vec<TemplateElement>,
    },
}

/// Parsed template structure
#[derive(Debug, Clone)]
pub struct ParsedTemplate {
    /// Template elements
    pub elements: Vec<TemplateElement>,
    /// Binding names referenced outside of loops
    pub placeholder_names: BTreeSet<String>,
}

/// Template parser
pub struct TemplateParser;

impl TemplateParser {
    /// Parse template content and extract structure
    pub fn parse(content: &str) -> Result<ParsedTemplate, TemplateError> {
        let mut parser = Parser::new(content);
        parser.parse()
    }
}

/// Why a sequence stopped
enum Stop {
    Eof,
    Else,
    Close(String),
}

/// Internal parser state machine
struct Parser {
    chars: Vec<char>,
    position: usize,
    line: usize,
    loop_depth: usize,
    placeholder_names: BTreeSet<String>,
}

impl Parser {
    fn new(content: &str) -> Self {
        Self {
            chars: content.chars().collect(),
            position: 0,
            line: 1,
            loop_depth: 0,
            placeholder_names: BTreeSet::new(),
        }
    }

    fn parse(&mut self) -> Result<ParsedTemplate, TemplateError> {
        let (elements, stop) = self.parse_sequence()?;
        match stop {
            Stop::Eof => Ok(ParsedTemplate {
                elements,
                placeholder_names: std::mem::take(&mut self.placeholder_names),
            }),
            Stop::Else => Err(self.syntax_error("Unexpected {{else}} outside of a block")),
            Stop::Close(block) => {
                Err(self.syntax_error(format!("Unexpected {{{{/{}}}}} without opening block", block)))
            }
        }
    }

    fn parse_sequence(&mut self) -> Result<(Vec<TemplateElement>, Stop), TemplateError> {
        let mut elements = Vec::new();
        let mut text = String::new();

        while self.position < self.chars.len() {
            if self.starts_with("\\{{") {
                text.push_str("{{");
                self.position += 3;
                continue;
            }

            if !self.starts_with("{{") {
                let ch = self.chars[self.position];
                if ch == '\n' {
                    self.line += 1;
                }
                text.push(ch);
                self.position += 1;
                continue;
            }

            let tag_start = self.position;
            let tag_line = self.line;
            let tag = self.read_tag()?;
            let is_block = tag.starts_with('#') || tag.starts_with('/') || tag == "else";

            // Block tags alone on a line leave no blank line behind
            if is_block && self.is_standalone(tag_start) {
                let kept = text.trim_end_matches([' ', '\t']).len();
                text.truncate(kept);
                self.skip_line_remainder();
            }

            if !text.is_empty() {
                elements.push(TemplateElement::Text(std::mem::take(&mut text)));
            }

            if tag == "else" {
                return Ok((elements, Stop::Else));
            }
            if let Some(block) = tag.strip_prefix('/') {
                return Ok((elements, Stop::Close(block.trim().to_string())));
            }
            if let Some(block) = tag.strip_prefix('#') {
                elements.push(self.parse_block(block, tag_line)?);
                continue;
            }

            let name = self.validate_name(&tag)?;
            self.record(&name);
            elements.push(TemplateElement::Placeholder(name));
        }

        if !text.is_empty() {
            elements.push(TemplateElement::Text(text));
        }
        Ok((elements, Stop::Eof))
    }

    fn parse_block(&mut self, block: &str, open_line: usize) -> Result<TemplateElement, TemplateError> {
        let (keyword, argument) = block
            .split_once(char::is_whitespace)
            .map(|(k, a)| (k, a.trim()))
            .unwrap_or((block, ""));

        match keyword {
            "if" | "unless" => {
                let condition = self.validate_name(argument)?;
                self.record(&condition);

                let (then_branch, stop) = self.parse_sequence()?;
                let else_branch = match stop {
                    Stop::Else => {
                        let (else_branch, stop) = self.parse_sequence()?;
                        self.expect_close(stop, keyword, open_line)?;
                        else_branch
                    }
                    other => {
                        self.expect_close(other, keyword, open_line)?;
                        Vec::new()
                    }
                };

                Ok(TemplateElement::Conditional {
                    condition,
                    negated: keyword == "unless",
                    then_branch,
                    else_branch,
                })
            }
            "each" => {
                let variable = self.validate_name(argument)?;
                self.record(&variable);

                self.loop_depth += 1;
                let (content, stop) = self.parse_sequence()?;
                self.loop_depth -= 1;

                if matches!(stop, Stop::Else) {
                    return Err(self.syntax_error("{{else}} is not supported inside {{#each}}"));
                }
                self.expect_close(stop, keyword, open_line)?;

                Ok(TemplateElement::Loop { variable, content })
            }
            _ => Err(self.syntax_error(format!("Unknown block type: {}", keyword))),
        }
    }

    fn expect_close(&self, stop: Stop, keyword: &str, open_line: usize) -> Result<(), TemplateError> {
        match stop {
            Stop::Close(block) if block == keyword => Ok(()),
            Stop::Close(block) => Err(self.syntax_error(format!(
                "Expected {{{{/{}}}}} but found {{{{/{}}}}}",
                keyword, block
            ))),
            Stop::Else => Err(self.syntax_error(format!("Duplicate {{{{else}}}} in {{{{#{}}}}}", keyword))),
            Stop::Eof => Err(TemplateError::InvalidSyntax {
                line: open_line,
                message: format!("Unclosed {{{{#{}}}}}", keyword),
            }),
        }
    }

    /// Consume `{{ ... }}` and return the trimmed tag body
    fn read_tag(&mut self) -> Result<String, TemplateError> {
        let start_line = self.line;
        self.position += 2;
        let body_start = self.position;

        while self.position < self.chars.len() {
            if self.starts_with("}}") {
                let body: String = self.chars[body_start..self.position].iter().collect();
                self.position += 2;
                return Ok(body.trim().to_string());
            }
            if self.chars[self.position] == '\n' {
                self.line += 1;
            }
            self.position += 1;
        }

        Err(TemplateError::InvalidSyntax {
            line: start_line,
            message: "Unclosed tag, expected '}}'".to_string(),
        })
    }

    fn validate_name(&self, name: &str) -> Result<String, TemplateError> {
        let name = name.trim();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '@');
        if valid {
            Ok(name.to_string())
        } else {
            Err(self.syntax_error(format!("Invalid binding name: '{}'", name)))
        }
    }

    fn record(&mut self, name: &str) {
        if self.loop_depth == 0 && !name.starts_with('@') {
            self.placeholder_names.insert(name.to_string());
        }
    }

    /// Whether only whitespace surrounds the tag on its line
    fn is_standalone(&self, tag_start: usize) -> bool {
        let before = self.chars[..tag_start]
            .iter()
            .rev()
            .take_while(|c| **c != '\n')
            .all(|c| *c == ' ' || *c == '\t');

        let after = self.chars[self.position..]
            .iter()
            .take_while(|c| **c != '\n')
            .all(|c| *c == ' ' || *c == '\t' || *c == '\r');

        before && after
    }

    fn skip_line_remainder(&mut self) {
        while let Some(&ch) = self.chars.get(self.position) {
            self.position += 1;
            if ch == '\n' {
                self.line += 1;
                break;
            }
        }
    }

    fn starts_with(&self, pattern: &str) -> bool {
        let mut index = self.position;
        for expected in pattern.chars() {
            match self.chars.get(index) {
                Some(&ch) if ch == expected => index += 1,
                _ => return false,
            }
        }
        true
    }

    fn syntax_error(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::InvalidSyntax {
            line: self.line,
            message: message.into(),
        }
    }
}
