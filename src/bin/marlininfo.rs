// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! Copy a source Marlin configuration to a working directory, patch it for
//! a machine and its peripherals, then compare it against a destination
//! Marlin tree in a diff tool.

use std::env;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context};
use clap::Parser;
use itertools::Itertools;
use strum::IntoEnumIterator;
use tracing::{info, warn, Level};

use marlininfo::init_logging;
use marlininfo::marlin::MarlinInfo;
use marlininfo::profile::{layers, parse_peripherals, resolve_driver_type, Machine};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Destination Marlin repository
    dest: PathBuf,

    /// Source Marlin repository or Marlin/Marlin directory [default: current directory]
    #[arg(long)]
    source: Option<PathBuf>,

    /// A3S or R2X_14T; detected from the source directory name when possible
    #[arg(long)]
    machine: Option<String>,

    /// Driver type to set for every driver installed on the board
    #[arg(long)]
    driver_type: Option<String>,

    /// Add-on hardware to configure (TFT24, BLTOUCH); may be repeated
    #[arg(long = "peripheral")]
    peripherals: Vec<String>,

    #[arg(long)]
    verbose: bool,

    #[arg(long)]
    debug: bool,

    /// Program to compare the patched copy with the destination
    #[arg(long, default_value = "meld")]
    diff_tool: String,

    /// Only patch the working copy
    #[arg(long)]
    no_diff: bool,

    /// Where to keep working copies [default: ~/.cache/marlininfo]
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

fn default_cache_dir() -> anyhow::Result<PathBuf> {
    let home = env::var_os("HOME").or_else(|| env::var_os("USERPROFILE"))
        .context("cannot determine the home directory; use --cache-dir")?;
    Ok(PathBuf::from(home).join(".cache").join("marlininfo"))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = if args.debug {
        Level::DEBUG
    } else if args.verbose {
        Level::INFO
    } else {
        Level::WARN
    };
    init_logging(level)?;

    let source = match args.source {
        Some(path) => path,
        None => env::current_dir()?,
    };
    let src = MarlinInfo::open(&source)
        .context("You must run this from a Marlin repo (or Marlin/Marlin directory).")?;
    let dst = MarlinInfo::open(&args.dest)?;
    info!("source Configuration.h, _adv versions: {:?}", src.conf_versions());
    info!("destination Configuration.h, _adv versions: {:?}", dst.conf_versions());
    src.check_compatible(&dst)?;

    let marlin_name = src.m_path().file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("the source tree has no directory name")?;
    let detected = Machine::detect(&marlin_name);
    let machine = match args.machine.as_deref().map(Machine::parse).transpose()? {
        Some(machine) => {
            if let Some(detected) = detected.filter(|d| *d != machine) {
                warn!("You set machine to {}, but the directory contained the string {:?}",
                      machine, detected.to_string());
            }
            machine
        }
        None => match detected {
            Some(machine) => machine,
            None => bail!("{} is not in {:?} so the machine could not be detected.",
                          Machine::iter().join(" or "), marlin_name),
        },
    };
    let peripherals = parse_peripherals(&args.peripherals)?;
    println!("machine={}", machine);

    let driver_type = match resolve_driver_type(machine, args.driver_type.as_deref())? {
        Some(driver_type) => driver_type,
        None => {
            eprintln!("Please specify --driver-type such as one of {:?}", machine.driver_types());
            return Ok(());
        }
    };
    if args.driver_type.is_none() {
        println!("# automatically selected for {}:", machine);
        println!("--driver-type {}", driver_type);
    }

    let cache_dir = match args.cache_dir {
        Some(dir) => dir,
        None => default_cache_dir()?,
    };
    let work_path = cache_dir.join("tmp").join(&marlin_name);
    std::fs::create_dir_all(&work_path)
        .with_context(|| format!("creating {}", work_path.display()))?;
    src.copy_to(&work_path)?;
    let mut work = MarlinInfo::open(&work_path)?;

    for (name, current) in work.drivers() {
        if current != driver_type {
            println!("* changing {} from {} to {}", name, current, driver_type);
        }
    }
    work.patch_drivers(machine.driver_names(), &driver_type)?;

    let changed = work.apply_layers(&layers(machine, &peripherals))?;
    info!("{} definition(s) changed by profiles", changed);

    if !args.no_diff {
        Command::new(&args.diff_tool)
            .arg(work.mm_path())
            .arg(dst.mm_path())
            .spawn()
            .with_context(|| format!("running {}", args.diff_tool))?;
    }
    Ok(())
}
