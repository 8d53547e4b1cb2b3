// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! A Marlin source tree, or just the configuration part of one.
//!
//! Two layouts are accepted: a Marlin repository (headers in
//! `<repo>/Marlin/`) and the inner `Marlin` directory itself.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::header::{HeaderFile, Lookup};
use crate::profile::Profile;

pub const CONFIG_H: &str = "Configuration.h";
pub const CONFIG_ADV_H: &str = "Configuration_adv.h";

/// Every stepper driver macro Marlin knows about.
pub const DRIVER_NAMES: &[&str] = &[
    "X_DRIVER_TYPE", "Y_DRIVER_TYPE", "Z_DRIVER_TYPE",
    "X2_DRIVER_TYPE", "Y2_DRIVER_TYPE", "Z2_DRIVER_TYPE",
    "Z3_DRIVER_TYPE", "Z4_DRIVER_TYPE",
    "I_DRIVER_TYPE", "J_DRIVER_TYPE", "K_DRIVER_TYPE",
    "E0_DRIVER_TYPE", "E1_DRIVER_TYPE", "E2_DRIVER_TYPE", "E3_DRIVER_TYPE",
    "E4_DRIVER_TYPE", "E5_DRIVER_TYPE", "E6_DRIVER_TYPE", "E7_DRIVER_TYPE",
];

/// The `(Configuration.h, Configuration_adv.h)` version values.
pub type ConfVersions = (Option<String>, Option<String>);

pub struct MarlinInfo {
    // directory holding the configuration headers (Marlin/Marlin)
    mm_path: PathBuf,
    // the repository containing mm_path
    m_path: PathBuf,
    config: HeaderFile,
    config_adv: HeaderFile,
}

impl MarlinInfo {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let nested = path.join("Marlin");
        let mm_path = if nested.join(CONFIG_H).is_file() {
            nested
        } else if path.join(CONFIG_H).is_file() {
            path.to_path_buf()
        } else {
            return Err(Error::MissingConfig {
                tried: vec![nested.join(CONFIG_H), path.join(CONFIG_H)],
            });
        };
        let adv_path = mm_path.join(CONFIG_ADV_H);
        if !adv_path.is_file() {
            return Err(Error::MissingConfig { tried: vec![adv_path] });
        }
        let m_path = mm_path.parent().map_or_else(|| mm_path.clone(), Path::to_path_buf);
        Ok(MarlinInfo {
            config: HeaderFile::open(mm_path.join(CONFIG_H))?,
            config_adv: HeaderFile::open(adv_path)?,
            mm_path,
            m_path,
        })
    }

    /// The directory containing the configuration headers.
    pub fn mm_path(&self) -> &Path {
        &self.mm_path
    }

    /// The repository directory.
    pub fn m_path(&self) -> &Path {
        &self.m_path
    }

    pub fn config(&self) -> &HeaderFile {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut HeaderFile {
        &mut self.config
    }

    pub fn config_adv(&self) -> &HeaderFile {
        &self.config_adv
    }

    pub fn config_adv_mut(&mut self) -> &mut HeaderFile {
        &mut self.config_adv
    }

    /// Locate a definition in `Configuration.h`.
    pub fn get_c_cdef(&self, name: &str) -> Result<Lookup> {
        self.config.get_cdef(name)
    }

    /// Locate a definition in `Configuration_adv.h`.
    pub fn get_c_a_cdef(&self, name: &str) -> Result<Lookup> {
        self.config_adv.get_cdef(name)
    }

    pub fn conf_versions(&self) -> ConfVersions {
        let version = |header: &HeaderFile, name: &str| header.find(name).and_then(|l| l.value().map(String::from));
        (version(&self.config, "CONFIGURATION_H_VERSION"),
         version(&self.config_adv, "CONFIGURATION_ADV_H_VERSION"))
    }

    /// Fail unless both trees have the same configuration versions.
    pub fn check_compatible(&self, other: &MarlinInfo) -> Result<()> {
        let (ours, theirs) = (self.conf_versions(), other.conf_versions());
        if ours != theirs {
            return Err(Error::VersionMismatch { ours, theirs });
        }
        Ok(())
    }

    /// Copy both headers (as on disk) into `repo_path/Marlin/`, creating
    /// that directory if needed.
    pub fn copy_to(&self, repo_path: impl AsRef<Path>) -> Result<()> {
        let repo_path = repo_path.as_ref();
        if !repo_path.is_dir() {
            return Err(Error::MissingRepo(repo_path.to_path_buf()));
        }
        let dest = repo_path.join("Marlin");
        fs::create_dir_all(&dest).map_err(|e| Error::io(&dest, e))?;
        for name in &[CONFIG_H, CONFIG_ADV_H] {
            let src = self.mm_path.join(name);
            let dst = dest.join(name);
            fs::copy(&src, &dst).map_err(|e| Error::io(&dst, e))?;
            info!("copied {} to {}", src.display(), dst.display());
        }
        Ok(())
    }

    /// Driver types of all enabled driver definitions; commented-out ones
    /// have no value and are skipped.
    pub fn drivers(&self) -> BTreeMap<String, String> {
        DRIVER_NAMES.iter()
            .filter_map(|&name| self.config.find(name))
            .filter_map(|l| l.value().map(|v| (l.define.name().to_string(), v.to_string())))
            .collect()
    }

    /// Set each of the named drivers to `driver_type` and save
    /// `Configuration.h`.
    ///
    /// Commented-out drivers are enabled, which is safe since a commented
    /// line is only found when there is no enabled one. Returns the names
    /// that were found.
    pub fn patch_drivers<S: AsRef<str>>(&mut self, names: &[S], driver_type: &str) -> Result<Vec<String>> {
        let mut patched = vec![];
        for name in names {
            let name = name.as_ref();
            let found = match self.config.find(name) {
                Some(found) => found,
                None => {
                    warn!("{} is not in {}", name, self.config.path().display());
                    continue;
                }
            };
            if self.config.set_value(name, driver_type, None)? {
                info!("changed {} from {} to {}", name,
                      found.raw_value().unwrap_or("(none)"), driver_type);
            }
            patched.push(name.to_string());
        }
        self.config.save()?;
        Ok(patched)
    }

    /// Apply profile layers in order, then place their notes and save both
    /// headers. Returns the number of definitions that changed.
    pub fn apply_layers(&mut self, layers: &[Profile]) -> Result<usize> {
        let mut changed = 0;
        for layer in layers {
            info!("applying profile {}", layer.name);
            for (name, setting) in &layer.overrides {
                match self.header_for_mut(name) {
                    Some(header) => if header.apply(name, setting)? {
                        changed += 1;
                    },
                    None => warn!("{}: {} is not defined in either header", layer.name, name),
                }
            }
            for (name, lines) in &layer.notes {
                if let Some(header) = self.header_for_mut(name) {
                    header.insert_after_define(name, lines)?;
                }
            }
        }
        if self.config.is_dirty() {
            self.config.save()?;
        }
        if self.config_adv.is_dirty() {
            self.config_adv.save()?;
        }
        Ok(changed)
    }

    fn header_for_mut(&mut self, name: &str) -> Option<&mut HeaderFile> {
        if self.config.has_define(name) {
            Some(&mut self.config)
        } else if self.config_adv.has_define(name) {
            Some(&mut self.config_adv)
        } else {
            None
        }
    }
}
