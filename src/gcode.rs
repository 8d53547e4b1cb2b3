// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Field-level access to single G-code command lines.
//!
//! A line such as `G1 X110 E45 F500.0` is split into ordered fields
//! (`G 1`, `X 110`, `E 45`, `F 500.0`) whose values can be rewritten and the
//! line rendered again. Two non-standard shapes are understood as well:
//!
//! * `M117 Some message` keeps the message as one field with an empty key.
//! * Klipper-style macros (`BED_MESH_PROFILE LOAD=name`) yield the macro
//!   name as a field without value, followed by `LOAD=` / `name` fields. The
//!   `=` stays in the key, marking the field as not being G-code.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use itertools::Itertools;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::num::{round_nearest, show_fewest};

/// Default number of decimal places for numeric field values.
pub const DEFAULT_PRECISION: u32 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub key: String,
    pub value: Option<String>,
}

impl Field {
    pub fn new(key: impl Into<String>, value: Option<&str>) -> Self {
        Field { key: key.into(), value: value.map(String::from) }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}{}", self.key, self.value.as_deref().unwrap_or(""))
    }
}

/// A new value for a field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// Rounded and formatted with trailing zeros removed.
    Number(f64),
    /// Used verbatim.
    Text(String),
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Text(n.to_string())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.into())
    }
}

impl FieldValue {
    fn format(&self, precision: u32) -> String {
        match self {
            FieldValue::Number(n) => show_fewest(round_nearest(*n, precision)),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    fields: Vec<Field>,
}

/// Cut off a `;` comment, or the whole line if it starts with `/` (block
/// delete, which also covers non-standard `//` comments).
fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('/') {
        return "";
    }
    match line.find(';') {
        Some(i) => &line[..i],
        None => line,
    }
}

fn has_digit(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
}

impl Command {
    /// Split a line into fields. Returns `Ok(None)` for blank and comment
    /// lines.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let code = strip_comment(line).trim();
        if code.is_empty() {
            return Ok(None);
        }
        let tokens = code.split_whitespace().collect_vec();
        let mut fields = Vec::with_capacity(tokens.len());
        let mut is_macro = false;
        for (i, &token) in tokens.iter().enumerate() {
            if is_macro {
                match token.find('=') {
                    Some(eq) if eq > 0 => fields.push(Field::new(&token[..=eq], Some(&token[eq + 1..]))),
                    _ => return Err(Error::MalformedArgument { token: token.into(), cmd: code.into() }),
                }
                continue;
            }
            let split = match token.char_indices().nth(1).map(|(idx, _)| idx) {
                // a lone letter, such as X in `G28 X`
                None => {
                    fields.push(Field::new(token, None));
                    continue;
                }
                Some(split) => split,
            };
            if !has_digit(token) {
                if i != 0 {
                    return Err(Error::MisplacedMacro { token: token.into(), cmd: code.into() });
                }
                info!("allowing literal {:?} (assuming it is a Klipper-style macro)", token);
                fields.push(Field::new(token, None));
                is_macro = true;
                continue;
            }
            let (key, value) = token.split_at(split);
            if i == 0 && token.eq_ignore_ascii_case("M117") {
                fields.push(Field::new(key, Some(value)));
                let message = tokens[1..].iter().join(" ");
                if !message.is_empty() {
                    fields.push(Field::new("", Some(message.as_str())));
                }
                break;
            }
            if value.parse::<f64>().is_err() {
                warn!("{:?} is not a number in {:?}", value, code);
            }
            fields.push(Field::new(key, Some(value)));
        }
        Ok(Some(Command { fields }))
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Whether the line is a Klipper-style macro rather than G-code.
    pub fn is_macro(&self) -> bool {
        self.fields.first().map_or(false, |f| f.value.is_none() && f.key.len() > 1)
    }

    /// The command verb, such as `G1`, or the macro name.
    pub fn function(&self) -> String {
        self.fields.first().map(Field::to_string).unwrap_or_default()
    }

    /// The value of the first field with this key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|f| f.key == key).and_then(|f| f.value.as_deref())
    }

    /// All fields by key, plus the verb under `"function"`.
    pub fn to_map(&self) -> BTreeMap<String, Option<String>> {
        let mut map = BTreeMap::new();
        map.insert("function".to_string(), Some(self.function()));
        for field in &self.fields {
            map.entry(field.key.clone()).or_insert_with(|| field.value.clone());
        }
        map
    }

    /// Rewrite the value of the first field with this key.
    ///
    /// Returns `Ok(false)` if there is no such field. A field that exists
    /// without a value is an error, since there is nothing to replace.
    pub fn set(&mut self, key: &str, value: impl Into<FieldValue>, precision: u32) -> Result<bool> {
        let cmd = self.to_string();
        let field = match self.fields.iter_mut().find(|f| f.key == key) {
            Some(field) => field,
            None => return Ok(false),
        };
        if field.value.is_none() {
            return Err(Error::FieldWithoutValue { key: key.into(), cmd });
        }
        field.value = Some(value.into().format(precision));
        Ok(true)
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.fields.iter().join(" "))
    }
}

/// Change the value after `key` in a G-code line.
///
/// The line comes back unchanged (comment and all) when it has no such
/// field; otherwise it is rendered from its fields, without comment.
pub fn changed_cmd(line: &str, key: &str, value: impl Into<FieldValue>, precision: u32) -> Result<String> {
    let mut cmd = match Command::parse(line)? {
        Some(cmd) => cmd,
        None => return Ok(line.into()),
    };
    if cmd.set(key, value, precision)? {
        Ok(cmd.to_string())
    } else {
        Ok(line.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("G1 X1 ; move"), "G1 X1 ");
        assert_eq!(strip_comment("  /G1 X1"), "");
        assert_eq!(strip_comment("// note"), "");
    }

    #[test]
    fn test_lone_letter() {
        let cmd = Command::parse("G28 X Y").unwrap().unwrap();
        assert_eq!(cmd.fields()[1], Field::new("X", None));
        assert_eq!(cmd.to_string(), "G28 X Y");
        assert!(matches!(Command::parse("G28 X").unwrap().unwrap().set("X", 1.0, 5),
                         Err(Error::FieldWithoutValue { .. })));
    }

    #[test]
    fn test_map() {
        let cmd = Command::parse("G1 X110 E45").unwrap().unwrap();
        let map = cmd.to_map();
        assert_eq!(map["function"].as_deref(), Some("G1"));
        assert_eq!(map["X"].as_deref(), Some("110"));
        assert!(!cmd.is_macro());
    }
}
