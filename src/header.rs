// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! In-memory model of a configuration header such as `Configuration.h`.
//!
//! The file is kept as a list of lines. Lookups and edits go through
//! [`crate::define`], so every line that is not touched is written back
//! byte for byte.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::define::{parse_line, Define};
use crate::error::{Error, Result};
use crate::profile::Setting;

/// A located definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lookup {
    /// 1-based line number.
    pub lineno: usize,
    pub define: Define,
    pub warning: Option<LookupWarning>,
}

impl Lookup {
    /// See [`Define::value`].
    pub fn value(&self) -> Option<&str> {
        self.define.value()
    }

    pub fn raw_value(&self) -> Option<&str> {
        self.define.raw_value()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupWarning {
    /// Only a commented-out definition exists.
    Commented,
}

impl fmt::Display for LookupWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LookupWarning::Commented => write!(f, "the definition is commented out"),
        }
    }
}

/// Outcome of inserting a block of literal lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insertion {
    Inserted,
    AlreadyPresent,
    FlagNotFound,
}

impl Insertion {
    pub fn changed(&self) -> bool {
        *self == Insertion::Inserted
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Before,
    After,
}

#[derive(Clone, Debug)]
pub struct HeaderFile {
    path: PathBuf,
    lines: Vec<String>,
    newline: &'static str,
    dirty: bool,
}

impl HeaderFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::from_text(path, &text))
    }

    /// Build from text already in memory; `path` is used for saving and in
    /// error messages.
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        HeaderFile {
            path: path.into(),
            lines: text.lines().map(String::from).collect(),
            newline: if text.contains("\r\n") { "\r\n" } else { "\n" },
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether there are edits not yet saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// All definitions with their 1-based line numbers.
    pub fn defines(&self) -> impl Iterator<Item = (usize, Define)> + '_ {
        self.lines.iter().enumerate()
            .filter(|(_, line)| line.contains("#define"))
            .filter_map(|(i, line)| parse_line(line).map(|def| (i + 1, def)))
    }

    /// Locate `#define NAME`, preferring a definition that is not commented
    /// out.
    pub fn find(&self, name: &str) -> Option<Lookup> {
        let mut commented = None;
        for (lineno, define) in self.defines() {
            if define.name() != name {
                continue;
            }
            if !define.is_commented() {
                return Some(Lookup { lineno, define, warning: None });
            }
            if commented.is_none() {
                commented = Some(Lookup { lineno, define, warning: Some(LookupWarning::Commented) });
            }
        }
        commented
    }

    pub fn has_define(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn get_cdef(&self, name: &str) -> Result<Lookup> {
        let found = self.find(name).ok_or_else(|| Error::UndefinedMacro {
            path: self.path.clone(),
            name: name.into(),
        })?;
        debug!("{}:{}: {}", self.path.display(), found.lineno, found.define);
        Ok(found)
    }

    /// Set the value of a definition, enabling it if it was commented out.
    ///
    /// The trailing comment is preserved unless `comment` is given.
    /// Returns whether the text changed.
    pub fn set_value(&mut self, name: &str, value: &str, comment: Option<&str>) -> Result<bool> {
        let found = self.get_cdef(name)?;
        let define = found.define.with_value(value, comment).enabled();
        Ok(self.replace_line(found.lineno, define.render()))
    }

    /// Disable a definition by prefixing it with `//`.
    pub fn comment_out(&mut self, name: &str) -> Result<bool> {
        let found = self.get_cdef(name)?;
        let define = found.define.disabled();
        Ok(self.replace_line(found.lineno, define.render()))
    }

    /// Enable a commented-out definition, keeping its value.
    pub fn uncomment(&mut self, name: &str) -> Result<bool> {
        let found = self.get_cdef(name)?;
        let define = found.define.enabled();
        Ok(self.replace_line(found.lineno, define.render()))
    }

    pub fn apply(&mut self, name: &str, setting: &Setting) -> Result<bool> {
        match setting {
            Setting::Value(value) => self.set_value(name, value, None),
            Setting::Enable => self.uncomment(name),
            Setting::Disable => self.comment_out(name),
        }
    }

    /// Insert `block` right after the first line containing `flag`.
    pub fn insert_after<S: AsRef<str>>(&mut self, flag: &str, block: &[S]) -> Insertion {
        match self.flag_index(flag) {
            Some(i) => self.insert_at(i, block, Side::After),
            None => self.flag_not_found(flag),
        }
    }

    /// Insert `block` right before the first line containing `flag`.
    ///
    /// The block may itself contain `flag`, so it counts as present when it
    /// sits above any of the lines containing `flag`.
    pub fn insert_before<S: AsRef<str>>(&mut self, flag: &str, block: &[S]) -> Insertion {
        let block: Vec<&str> = block.iter().map(|line| line.as_ref()).collect();
        let anchors: Vec<usize> = self.lines.iter().enumerate()
            .filter(|(_, line)| line.contains(flag))
            .map(|(i, _)| i)
            .collect();
        let first = match anchors.first() {
            Some(&first) => first,
            None => return self.flag_not_found(flag),
        };
        if let Some(&i) = anchors.iter().find(|&&i| self.overlap(i, &block, Side::Before) == block.len()) {
            debug!("{}: block already present above line {}", self.path.display(), i + 1);
            return Insertion::AlreadyPresent;
        }
        self.insert_at(first, &block, Side::Before)
    }

    /// Insert `block` after the line holding `#define NAME`.
    pub fn insert_after_define<S: AsRef<str>>(&mut self, name: &str, block: &[S]) -> Result<Insertion> {
        let found = self.get_cdef(name)?;
        Ok(self.insert_at(found.lineno - 1, block, Side::After))
    }

    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.write_to(&path)
    }

    /// Write to another file, which becomes the path of this header once
    /// the write succeeded.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        self.write_to(&path)?;
        self.path = path;
        Ok(())
    }

    fn write_to(&mut self, path: &Path) -> Result<()> {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push_str(self.newline);
        }
        fs::write(path, text).map_err(|e| Error::io(path, e))?;
        self.dirty = false;
        info!("saved {}", path.display());
        Ok(())
    }

    fn replace_line(&mut self, lineno: usize, line: String) -> bool {
        let old = &mut self.lines[lineno - 1];
        if *old == line {
            return false;
        }
        info!("{}:{}: changed {:?} to {:?}", self.path.display(), lineno, old, line);
        *old = line;
        self.dirty = true;
        true
    }

    fn flag_index(&self, flag: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.contains(flag))
    }

    fn flag_not_found(&self, flag: &str) -> Insertion {
        warn!("{}: {:?} was not found, so nothing was inserted", self.path.display(), flag);
        Insertion::FlagNotFound
    }

    /// How many lines of `block` already sit next to `anchor`: the leading
    /// ones below it, or the trailing ones above it.
    fn overlap(&self, anchor: usize, block: &[&str], side: Side) -> usize {
        let same = |(have, want): &(&String, &&str)| have.trim_end() == want.trim_end();
        match side {
            Side::After => self.lines[anchor + 1..].iter().zip(block).take_while(same).count(),
            Side::Before => self.lines[..anchor].iter().rev().zip(block.iter().rev()).take_while(same).count(),
        }
    }

    fn insert_at<S: AsRef<str>>(&mut self, anchor: usize, block: &[S], side: Side) -> Insertion {
        let block: Vec<&str> = block.iter().map(|line| line.as_ref()).collect();
        let n = block.len();
        let have = self.overlap(anchor, &block, side);
        if have == n {
            debug!("{}: block already present next to line {}", self.path.display(), anchor + 1);
            return Insertion::AlreadyPresent;
        }
        // a partial block cut off by the end (or start) of the file is completed
        let (at, missing) = match side {
            Side::After if anchor + 1 + have == self.lines.len() => (anchor + 1 + have, &block[have..]),
            Side::After => (anchor + 1, &block[..]),
            Side::Before if have == anchor => (0, &block[..n - have]),
            Side::Before => (anchor, &block[..]),
        };
        self.lines.splice(at..at, missing.iter().map(|line| line.to_string()));
        self.dirty = true;
        info!("{}: inserted {} line(s) at line {}", self.path.display(), missing.len(), at + 1);
        Insertion::Inserted
    }
}
