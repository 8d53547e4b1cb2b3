// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Tools for maintaining 3D printer firmware configurations.
//!
//! The library edits the `#define` lines of [Marlin]'s `Configuration.h`
//! and `Configuration_adv.h` in place, keeping everything it does not touch
//! byte for byte: indentation, alignment, trailing comments, and whether a
//! definition is commented out. It can also rewrite individual fields of
//! G-code command lines.
//!
//! [Marlin]: https://marlinfw.org/
//!
//! ## Basic usage
//!
//! ```rust,no_run
//! use marlininfo::header::HeaderFile;
//!
//! fn main() -> marlininfo::Result<()> {
//!     let mut conf = HeaderFile::open("Marlin/Configuration.h")?;
//!     println!("{:?}", conf.get_cdef("Z_MAX_POS")?.value());
//!     conf.set_value("Z_MAX_POS", "210", None)?;
//!     conf.save()
//! }
//! ```
//!
//! G-code lines are handled by [`gcode`]:
//!
//! ```rust
//! use marlininfo::gcode::changed_cmd;
//!
//! assert_eq!(changed_cmd("G0 F9000 Z0.200", "Z", 0.4, 5).unwrap(), "G0 F9000 Z0.4");
//! ```
//!
//! The `marlininfo` binary drives all of this for a whole Marlin tree:
//! it patches a working copy of the source configuration for a machine and
//! its peripherals, then opens a diff tool against the destination tree.

pub mod define;
pub mod error;
pub mod gcode;
pub mod header;
pub mod marlin;
pub mod num;
pub mod profile;

pub use error::{Error, Result};

/// Set up `tracing` output on stderr at `level`, unless `RUST_LOG` is set,
/// in which case its directives are used instead.
pub fn init_logging(level: tracing::Level) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()?;
    Ok(())
}
