// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use std::fs;

use marlininfo::header::{HeaderFile, Insertion, LookupWarning};
use marlininfo::Error;

const CONFIG: &str = "#define CONFIGURATION_H_VERSION 02010300

// Travel limits
#define Z_MAX_POS 205 // note
//#define BLTOUCH
#define X_DRIVER_TYPE  A4988
//#define E1_DRIVER_TYPE A4988
";

fn header() -> HeaderFile {
    HeaderFile::from_text("Configuration.h", CONFIG)
}

#[test]
fn test_get_cdef() {
    let header = header();
    let found = header.get_cdef("Z_MAX_POS").unwrap();
    assert_eq!(found.value(), Some("205"));
    assert_eq!(found.lineno, 4);
    assert_eq!(found.warning, None);

    let found = header.get_cdef("E1_DRIVER_TYPE").unwrap();
    assert_eq!(found.value(), None);
    assert_eq!(found.raw_value(), Some("A4988"));
    assert_eq!(found.warning, Some(LookupWarning::Commented));

    assert!(matches!(header.get_cdef("NOPE"), Err(Error::UndefinedMacro { .. })));
}

#[test]
fn test_set_value() {
    let mut header = header();
    assert!(header.set_value("Z_MAX_POS", "210", None).unwrap());
    assert_eq!(header.lines()[3], "#define Z_MAX_POS 210 // note");
    assert!(!header.set_value("Z_MAX_POS", "210", None).unwrap());
    assert!(header.set_value("Z_MAX_POS", "215", Some("measured")).unwrap());
    assert_eq!(header.lines()[3], "#define Z_MAX_POS 215 // measured");

    // a commented-out definition gets enabled
    assert!(header.set_value("E1_DRIVER_TYPE", "TMC2209", None).unwrap());
    assert_eq!(header.lines()[6], "#define E1_DRIVER_TYPE TMC2209");
}

#[test]
fn test_comment_toggle() {
    let mut header = header();
    assert!(header.uncomment("BLTOUCH").unwrap());
    assert_eq!(header.lines()[4], "#define BLTOUCH");
    assert!(header.comment_out("X_DRIVER_TYPE").unwrap());
    assert_eq!(header.lines()[5], "//#define X_DRIVER_TYPE  A4988");
}

#[test]
fn test_insert() {
    let mut header = header();
    let block = ["// first", "// second"];
    assert_eq!(header.insert_after("// Travel limits", &block), Insertion::Inserted);
    assert_eq!(&header.lines()[3..5], &block);
    assert_eq!(header.insert_after("// Travel limits", &block), Insertion::AlreadyPresent);
    assert_eq!(header.lines().len(), 9);

    assert_eq!(header.insert_before("#define Z_MAX_POS", &["// before"]), Insertion::Inserted);
    assert_eq!(header.lines()[5], "// before");
    assert_eq!(header.insert_before("#define Z_MAX_POS", &["// before"]), Insertion::AlreadyPresent);
}

#[test]
fn test_insert_missing_flag() {
    let mut header = header();
    let result = header.insert_after("#define NOT_THERE", &["// x"]);
    assert_eq!(result, Insertion::FlagNotFound);
    assert!(!result.changed());
    assert!(!header.is_dirty());
    assert_eq!(header.lines().len(), 7);
}

#[test]
fn test_insert_after_define() {
    let mut header = header();
    assert!(header.insert_after_define("Z_MAX_POS", &["// ^ tall"]).unwrap().changed());
    assert_eq!(header.lines()[4], "// ^ tall");
    assert!(!header.insert_after_define("Z_MAX_POS", &["// ^ tall"]).unwrap().changed());
}

#[test]
fn test_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Configuration.h");
    fs::write(&path, CONFIG.trim_end()).unwrap();

    let mut header = HeaderFile::open(&path).unwrap();
    header.set_value("Z_MAX_POS", "210", None).unwrap();
    header.save().unwrap();
    assert!(!header.is_dirty());

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, CONFIG.replace("205", "210"));
}

#[test]
fn test_keeps_crlf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Configuration_adv.h");
    let mut header = HeaderFile::from_text(&path, "#define A 1\r\n#define B 2\r\n");
    header.set_value("B", "3", None).unwrap();
    header.save().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "#define A 1\r\n#define B 3\r\n");
}

#[test]
fn test_open_missing() {
    assert!(matches!(HeaderFile::open("/nonexistent/Configuration.h"), Err(Error::Io { .. })));
}

#[test]
fn test_insert_before_block_containing_flag() {
    let mut header = HeaderFile::from_text("Configuration.h", "// top\n#define BLTOUCH\n#define Z_SAFE_HOMING\n");
    let block = ["// Uncomment BLTOUCH if a probe is installed"];
    assert_eq!(header.insert_before("BLTOUCH", &block), Insertion::Inserted);
    assert_eq!(header.insert_before("BLTOUCH", &block), Insertion::AlreadyPresent);
    assert_eq!(header.lines(), ["// top", block[0], "#define BLTOUCH", "#define Z_SAFE_HOMING"]);
}

#[test]
fn test_insert_completes_partial_block() {
    let mut header = HeaderFile::from_text("Configuration.h", "#define A 1\n// n1\n");
    assert_eq!(header.insert_after("#define A", &["// n1", "// n2"]), Insertion::Inserted);
    assert_eq!(header.lines(), ["#define A 1", "// n1", "// n2"]);
    assert_eq!(header.insert_after("#define A", &["// n1", "// n2"]), Insertion::AlreadyPresent);

    let mut header = HeaderFile::from_text("Configuration.h", "// n2\n#define A 1\n");
    assert_eq!(header.insert_before("#define A", &["// n1", "// n2"]), Insertion::Inserted);
    assert_eq!(header.lines(), ["// n1", "// n2", "#define A 1"]);
}

#[test]
fn test_save_as_failure_keeps_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Configuration.h");
    let mut header = HeaderFile::from_text(&path, CONFIG);
    assert!(header.save_as(dir.path().join("missing").join("Configuration.h")).is_err());
    assert_eq!(header.path(), path);

    let copy = dir.path().join("Configuration.copy.h");
    header.save_as(&copy).unwrap();
    assert_eq!(header.path(), copy);
    assert_eq!(fs::read_to_string(&copy).unwrap(), CONFIG);
}
