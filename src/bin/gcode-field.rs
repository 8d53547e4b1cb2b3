use anyhow::Context;
use clap::Parser;
use tracing::Level;

use marlininfo::gcode::{changed_cmd, FieldValue, DEFAULT_PRECISION};
use marlininfo::init_logging;

/// Print a G-code line with one field's value replaced.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The G-code line, such as "G0 F9000 Z0.200"
    line: String,
    /// Field letter, such as Z
    key: String,
    value: String,
    /// Decimal places for numeric values
    #[arg(long, default_value_t = DEFAULT_PRECISION)]
    precision: u32,
    /// Use the value verbatim instead of reformatting it as a number
    #[arg(long)]
    text: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(Level::WARN)?;
    let value = match args.value.parse::<f64>() {
        Ok(n) if !args.text => FieldValue::Number(n),
        _ => FieldValue::Text(args.value.clone()),
    };
    let line = changed_cmd(&args.line, &args.key, value, args.precision)
        .with_context(|| format!("cannot change {} in {:?}", args.key, args.line))?;
    println!("{}", line);
    Ok(())
}
