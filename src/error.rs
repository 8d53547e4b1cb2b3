// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Error type shared by the header patcher, the Marlin tree helpers and the
//! G-code field editor.

use std::io;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("{}: {}", .path.display(), .cause)]
    Io { path: PathBuf, #[source] cause: io::Error },

    /// Neither layout of a Marlin tree contained the configuration headers.
    #[error("{}", tried_paths(.tried))]
    MissingConfig { tried: Vec<PathBuf> },

    /// The destination of a copy is not a directory.
    #[error("\"{}\" does not exist", .0.display())]
    MissingRepo(PathBuf),

    #[error("{}: there is no #define {name}", .path.display())]
    UndefinedMacro { path: PathBuf, name: String },

    #[error("the configuration versions are incompatible: {ours:?} vs {theirs:?}")]
    VersionMismatch {
        ours: (Option<String>, Option<String>),
        theirs: (Option<String>, Option<String>),
    },

    #[error("unknown machine {0:?}")]
    UnknownMachine(String),

    #[error("unknown peripheral {0:?}")]
    UnknownPeripheral(String),

    #[error("for {machine} the driver type {requested} should instead be one of: {}", .allowed.join(", "))]
    InvalidDriverType {
        machine: String,
        requested: String,
        allowed: Vec<&'static str>,
    },

    /// The key exists in the command but carries no value, so rewriting it
    /// would invent one.
    #[error("the key '{key}' has no value in `{cmd}`, so it was left unchanged")]
    FieldWithoutValue { key: String, cmd: String },

    #[error("misplaced macro {token:?} in `{cmd}`")]
    MisplacedMacro { token: String, cmd: String },

    #[error("macro argument {token:?} is not KEY=value in `{cmd}`")]
    MalformedArgument { token: String, cmd: String },
}

fn tried_paths(tried: &[PathBuf]) -> String {
    let mut paths = tried.iter().map(|p| format!("\"{}\"", p.display()));
    let first = paths.next().unwrap_or_default();
    let rest = paths.join(", ");
    if rest.is_empty() {
        format!("{} does not exist", first)
    } else {
        format!("{} does not exist (also tried {})", first, rest)
    }
}

impl Error {
    pub(crate) fn io(path: &Path, cause: io::Error) -> Self {
        Error::Io { path: path.to_path_buf(), cause }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
