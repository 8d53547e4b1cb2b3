// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use marlininfo::define::parse_line;

#[test]
fn test_roundtrip_untouched() {
    for line in &[
        "#define Z_MAX_POS 205 // note",
        "  //#define  BLTOUCH",
        "#define DEFAULT_AXIS_STEPS_PER_UNIT   { 80, 80, 400, 500 }",
        "#define HOMING_FEEDRATE_MM_M { (50*60), (50*60), (4*60) }  // (mm/min)",
        "#define STRING_CONFIG_H_AUTHOR \"(none, default config)\" // Who made the changes.",
        "#define WEBSITE_URL \"https://marlinfw.org\"",
        "\t#define MOTHERBOARD BOARD_RAMPS_14_EFB\t/* board */",
        "#define ENCODER_PULSES_PER_STEP 4 ",
        "#define SQUARE(x) ((x)*(x))",
    ] {
        let def = parse_line(line).unwrap();
        assert_eq!(&def.render(), line);
    }
}

#[test]
fn test_values() {
    let def = parse_line("#define WEBSITE_URL \"https://marlinfw.org\" // site").unwrap();
    assert_eq!(def.value(), Some("\"https://marlinfw.org\""));
    assert_eq!(def.comment(), Some("// site"));

    let def = parse_line("#define DEFAULT_MAX_FEEDRATE { 300, 300, 5, 25 }").unwrap();
    assert_eq!(def.value(), Some("{ 300, 300, 5, 25 }"));

    let def = parse_line("#define SQUARE(x) ((x)*(x))").unwrap();
    assert_eq!(def.name(), "SQUARE");
    assert_eq!(def.params(), Some("(x)"));
    assert_eq!(def.value(), Some("((x)*(x))"));
}

#[test]
fn test_set_value_keeps_comment() {
    let def = parse_line("#define Z_MAX_POS 205 // note").unwrap();
    assert_eq!(def.with_value("210", None).render(), "#define Z_MAX_POS 210 // note");
    assert_eq!(def.with_value("210", Some("// taller")).render(), "#define Z_MAX_POS 210 // taller");
}

#[test]
fn test_toggle() {
    let def = parse_line("  //#define BLTOUCH // probe").unwrap();
    assert!(def.is_commented());
    assert_eq!(def.value(), None);
    assert_eq!(def.enabled().render(), "  #define BLTOUCH // probe");
    assert_eq!(def.enabled().disabled().render(), "  //#define BLTOUCH // probe");
}

#[test]
fn test_not_a_define() {
    for line in &[
        "",
        "// Uncomment #define FOO to enable",
        "#if ENABLED(BLTOUCH)",
        "#define",
        "#define 1ABC 2",
        "#defineFOO 1",
        "#undef FOO",
    ] {
        assert!(parse_line(line).is_none(), "{:?}", line);
    }
}
