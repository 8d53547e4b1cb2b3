// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Parsing and rewriting of single `#define` lines.
//!
//! A line is split into all of its textual parts (indentation, the `//`
//! marker of a disabled definition, the separators and the trailing comment)
//! so that rendering an unmodified [`Define`] reproduces the line exactly.

use std::fmt::{self, Display, Formatter};

use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "define.pest"]
struct DefineParser;

/// A `#define NAME VALUE // comment` line, possibly commented out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Define {
    indent: String,
    disabled: Option<String>,
    keyword_sep: String,
    name: String,
    params: Option<String>,
    value_sep: String,
    value: Option<String>,
    comment_sep: String,
    comment: Option<String>,
}

/// Parse a line of a configuration header.
///
/// Returns `None` if the line is not a (possibly disabled) definition.
pub fn parse_line(line: &str) -> Option<Define> {
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    let mut pairs = DefineParser::parse(Rule::line, line).ok()?;
    let mut def = Define::default();
    for pair in pairs.next()?.into_inner() {
        let text = pair.as_str().to_string();
        match pair.as_rule() {
            Rule::indent => def.indent = text,
            Rule::disabled => def.disabled = Some(text),
            Rule::keyword_sep => def.keyword_sep = text,
            Rule::name => def.name = text,
            Rule::params => def.params = Some(text),
            Rule::value_sep => def.value_sep = text,
            Rule::value => def.value = Some(text),
            Rule::comment_sep => def.comment_sep = text,
            Rule::comment => def.comment = Some(text),
            _ => ()
        }
    }
    Some(def)
}

impl Define {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter list of a function-like macro, including the parentheses.
    pub fn params(&self) -> Option<&str> {
        self.params.as_deref()
    }

    /// The value as written, regardless of whether the line is disabled.
    pub fn raw_value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The effective value: `None` if the definition is commented out or is
    /// a bare flag.
    pub fn value(&self) -> Option<&str> {
        if self.is_commented() {
            None
        } else {
            self.raw_value()
        }
    }

    pub fn is_commented(&self) -> bool {
        self.disabled.is_some()
    }

    /// The trailing comment including its `//` or `/*` marker.
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// A copy with the value replaced.
    ///
    /// The trailing comment is kept unless `comment` is given; an empty
    /// replacement removes it. An empty `value` turns the definition into a
    /// bare flag.
    pub fn with_value(&self, value: &str, comment: Option<&str>) -> Define {
        let mut def = self.clone();
        let value = value.trim();
        if value.is_empty() {
            def.value = None;
            def.value_sep.clear();
        } else {
            if def.value_sep.is_empty() {
                def.value_sep.push(' ');
            }
            def.value = Some(value.to_string());
        }
        if let Some(comment) = comment {
            let comment = comment.trim();
            if comment.is_empty() {
                def.comment = None;
                def.comment_sep.clear();
            } else {
                if def.comment_sep.is_empty() {
                    def.comment_sep.push(' ');
                }
                def.comment = Some(if comment.starts_with("//") || comment.starts_with("/*") {
                    comment.to_string()
                } else {
                    format!("// {}", comment)
                });
            }
        }
        if def.value.is_none() && def.comment.is_none() {
            def.comment_sep.clear();
        }
        def
    }

    /// A copy with the leading `//` removed.
    pub fn enabled(&self) -> Define {
        Define { disabled: None, ..self.clone() }
    }

    /// A copy with a leading `//` added (Marlin style: `//#define`).
    pub fn disabled(&self) -> Define {
        if self.is_commented() {
            return self.clone();
        }
        Define { disabled: Some("//".into()), ..self.clone() }
    }

    /// Rebuild the source line.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Display for Define {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}{}#define{}{}{}",
               self.indent,
               self.disabled.as_deref().unwrap_or(""),
               self.keyword_sep,
               self.name,
               self.params.as_deref().unwrap_or(""))?;
        if let Some(value) = &self.value {
            write!(f, "{}{}", self.value_sep, value)?;
        }
        write!(f, "{}", self.comment_sep)?;
        if let Some(comment) = &self.comment {
            write!(f, "{}", comment)?;
        }
        Ok(())
    }
}
