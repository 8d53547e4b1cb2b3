// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Built-in machine and peripheral profiles.
//!
//! A [`Profile`] is an ordered list of macro overrides. Profiles are applied
//! as layers, in the order returned by [`layers`]: shared defaults first,
//! then the machine, then each peripheral. A later layer overrides an
//! earlier one simply by being applied after it.

use std::str::FromStr;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::{Error, Result};

/// The desired state of one `#define`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Setting {
    /// Define with this value (enabling the line if needed).
    Value(String),
    /// Remove the leading `//`, keeping the value.
    Enable,
    /// Add a leading `//`.
    Disable,
}

/// A named bundle of macro overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub overrides: Vec<(String, Setting)>,
    /// Comment lines to place right after a definition.
    pub notes: Vec<(String, Vec<String>)>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Profile { name: name.into(), ..Default::default() }
    }

    pub fn value(mut self, name: &str, value: &str) -> Self {
        self.overrides.push((name.into(), Setting::Value(value.into())));
        self
    }

    pub fn enable(mut self, name: &str) -> Self {
        self.overrides.push((name.into(), Setting::Enable));
        self
    }

    pub fn disable(mut self, name: &str) -> Self {
        self.overrides.push((name.into(), Setting::Disable));
        self
    }

    pub fn note(mut self, name: &str, lines: &[&str]) -> Self {
        self.notes.push((name.into(), lines.iter().map(|l| l.to_string()).collect()));
        self
    }

    /// The setting this profile requests for a macro, if any. When a macro
    /// is listed more than once the last entry wins.
    pub fn get(&self, name: &str) -> Option<&Setting> {
        self.overrides.iter().rev().find(|(n, _)| n == name).map(|(_, s)| s)
    }
}

/// Printers with built-in profiles.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display, EnumString, EnumIter)]
pub enum Machine {
    /// JGAurora A3S
    #[strum(serialize = "A3S")]
    A3S,
    #[strum(serialize = "R2X_14T")]
    R2X14T,
}

impl Machine {
    /// Guess the machine from a directory name such as `Marlin-A3S`.
    pub fn detect(dir_name: &str) -> Option<Machine> {
        Machine::iter().find(|m| dir_name.contains(&m.to_string()))
    }

    pub fn parse(name: &str) -> Result<Machine> {
        Machine::from_str(name).map_err(|_| Error::UnknownMachine(name.into()))
    }

    /// Driver macros for the steppers installed on the board.
    pub fn driver_names(&self) -> &'static [&'static str] {
        match self {
            Machine::A3S => &["X_DRIVER_TYPE", "Y_DRIVER_TYPE", "Z_DRIVER_TYPE",
                              "E0_DRIVER_TYPE"],
            Machine::R2X14T => &["X_DRIVER_TYPE", "Y_DRIVER_TYPE", "Z_DRIVER_TYPE",
                                 "E0_DRIVER_TYPE", "E1_DRIVER_TYPE"],
        }
    }

    /// Stepper driver types that fit the board; the first is the default.
    pub fn driver_types(&self) -> &'static [&'static str] {
        match self {
            Machine::A3S => &["A4988", "TMC2209"],
            Machine::R2X14T => &["TMC2209"],
        }
    }

    pub fn profile(&self) -> Profile {
        match self {
            Machine::A3S => Profile::new("A3S")
                .value("DEFAULT_AXIS_STEPS_PER_UNIT", "{ 80, 80, 800, 97 }")
                .value("DEFAULT_MAX_FEEDRATE", "{ 500, 500, 15, 25 }")
                .value("HOMING_FEEDRATE_MM_M", "{ (80*60), (80*60), (12*60) }")
                .value("Z_PROBE_FEEDRATE_FAST", "(12*60)")
                // flipped vs. the Marlin 1 settings suggested upstream
                .value("INVERT_X_DIR", "false")
                .value("INVERT_Y_DIR", "true")
                .value("INVERT_Z_DIR", "true")
                .value("INVERT_E0_DIR", "false")
                .value("ENCODER_PULSES_PER_STEP", "4")
                .disable("REVERSE_ENCODER_DIRECTION")
                .note("DEFAULT_AXIS_STEPS_PER_UNIT", &[
                    "// E-steps calibrated from 80: 200 yields 206, so do: 0.97087378640776699029 * 100 = 97",
                    "// - or Set and save (if EEPROM_SETTINGS enabled) with, respectively: M92 E97; M500",
                ])
                .note("Z_MIN_PROBE_REPEATABILITY_TEST", &[
                    "// ^ IF has probe, recommended for TFT24 (See <https://github.com/bigtreetech/BIGTREETECH-TouchScreenFirmware>)",
                ])
                .note("G26_MESH_VALIDATION", &[
                    "// ^ recommended for TFT24 (See <https://github.com/bigtreetech/BIGTREETECH-TouchScreenFirmware>)",
                ]),
            // only the drivers differ from stock
            Machine::R2X14T => Profile::new("R2X_14T"),
        }
    }
}

/// Add-on hardware with its own recommended settings.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display, EnumString, EnumIter)]
pub enum Peripheral {
    /// BIGTREETECH TFT24 touchscreen
    #[strum(serialize = "TFT24")]
    Tft24,
    #[strum(serialize = "BLTOUCH")]
    BlTouch,
}

impl Peripheral {
    pub fn parse(name: &str) -> Result<Peripheral> {
        Peripheral::from_str(&name.to_ascii_uppercase())
            .map_err(|_| Error::UnknownPeripheral(name.into()))
    }

    pub fn profile(&self) -> Profile {
        match self {
            // See <https://github.com/bigtreetech/BIGTREETECH-TouchScreenFirmware>
            Peripheral::Tft24 => Profile::new("TFT24")
                .enable("EEPROM_SETTINGS")
                .enable("M115_GEOMETRY_REPORT")
                .enable("M114_DETAIL")
                .enable("REPORT_FAN_CHANGE")
                .enable("AUTO_REPORT_TEMPERATURES")
                .enable("EXTENDED_CAPABILITIES_REPORT")
                .enable("LONG_FILENAME_HOST_SUPPORT")
                .enable("HOST_ACTION_COMMANDS")
                .enable("G26_MESH_VALIDATION"),
            Peripheral::BlTouch => Profile::new("BLTOUCH")
                .enable("BLTOUCH")
                .enable("Z_SAFE_HOMING")
                .enable("AUTO_BED_LEVELING_BILINEAR")
                .enable("Z_MIN_PROBE_REPEATABILITY_TEST"),
        }
    }
}

/// Settings every machine gets before its own profile.
pub fn shared_defaults() -> Profile {
    Profile::new("defaults")
        .enable("EEPROM_SETTINGS")
}

/// Parse `--peripheral` names, failing on the first unknown one.
pub fn parse_peripherals<S: AsRef<str>>(names: &[S]) -> Result<Vec<Peripheral>> {
    names.iter().map(|name| Peripheral::parse(name.as_ref())).collect()
}

/// The profile layers for a machine, in application order.
pub fn layers(machine: Machine, peripherals: &[Peripheral]) -> Vec<Profile> {
    let mut layers = vec![shared_defaults(), machine.profile()];
    layers.extend(peripherals.iter().map(Peripheral::profile));
    layers
}

/// Check a requested driver type against the machine, or pick the only
/// one that fits. `Ok(None)` means the user has to choose.
pub fn resolve_driver_type(machine: Machine, requested: Option<&str>) -> Result<Option<String>> {
    let allowed = machine.driver_types();
    match requested {
        Some(requested) if allowed.contains(&requested) => Ok(Some(requested.into())),
        Some(requested) => Err(Error::InvalidDriverType {
            machine: machine.to_string(),
            requested: requested.into(),
            allowed: allowed.to_vec(),
        }),
        None if allowed.len() == 1 => Ok(Some(allowed[0].into())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(Machine::detect("Marlin-2.1-A3S"), Some(Machine::A3S));
        assert_eq!(Machine::detect("Marlin-R2X_14T"), Some(Machine::R2X14T));
        assert_eq!(Machine::detect("Marlin"), None);
        assert_eq!(Machine::R2X14T.to_string(), "R2X_14T");
        assert!(Machine::parse("R2X").is_err());
    }

    #[test]
    fn test_layer_order() {
        let names: Vec<_> = layers(Machine::A3S, &[Peripheral::Tft24, Peripheral::BlTouch])
            .into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["defaults", "A3S", "TFT24", "BLTOUCH"]);
    }

    #[test]
    fn test_driver_type() {
        assert_eq!(resolve_driver_type(Machine::R2X14T, None).unwrap().as_deref(), Some("TMC2209"));
        assert_eq!(resolve_driver_type(Machine::A3S, None).unwrap(), None);
        assert_eq!(resolve_driver_type(Machine::A3S, Some("A4988")).unwrap().as_deref(), Some("A4988"));
        assert!(matches!(resolve_driver_type(Machine::R2X14T, Some("A4988")),
                         Err(Error::InvalidDriverType { .. })));
    }

    #[test]
    fn test_last_override_wins() {
        let profile = Profile::new("p").value("A", "1").disable("A");
        assert_eq!(profile.get("A"), Some(&Setting::Disable));
        assert_eq!(profile.get("B"), None);
    }

    #[test]
    fn test_peripheral_case() {
        assert_eq!(Peripheral::parse("tft24").unwrap(), Peripheral::Tft24);
        assert_eq!(Peripheral::parse("BLTouch").unwrap(), Peripheral::BlTouch);
    }

    #[test]
    fn test_parse_peripherals() {
        assert_eq!(parse_peripherals(&["bltouch", "TFT24"]).unwrap(),
                   [Peripheral::BlTouch, Peripheral::Tft24]);
        assert!(matches!(parse_peripherals(&["TFT24", "BLTuch"]),
                         Err(Error::UnknownPeripheral(name)) if name == "BLTuch"));
    }

    #[test]
    fn test_machine_notes() {
        let notes: Vec<_> = Machine::A3S.profile().notes.into_iter().map(|(name, _)| name).collect();
        assert_eq!(notes, ["DEFAULT_AXIS_STEPS_PER_UNIT", "Z_MIN_PROBE_REPEATABILITY_TEST",
                           "G26_MESH_VALIDATION"]);
        let r2x = Machine::R2X14T.profile();
        assert!(r2x.overrides.is_empty() && r2x.notes.is_empty());
    }
}
