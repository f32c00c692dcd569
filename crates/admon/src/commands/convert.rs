//! Offline unit conversion handlers.

use admon_core::units::{
    bytes_to_size_unit, bytes_to_size_unit_in, millis_to_time_unit, parse_size_unit,
    size_unit_to_bytes, subtract_sizes, time_span_to_minutes, try_parse_value_unit,
};
use admon_core::{SizeUnit, TimeUnit, Unit, ValueUnit};
use serde::Serialize;

use crate::cli::{ConvertArgs, ConvertCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct Conversion {
    input: String,
    value: f64,
    unit: String,
    display: String,
}

impl Conversion {
    fn of<U: Unit>(input: impl Into<String>, result: ValueUnit<U>) -> Self {
        Self {
            input: input.into(),
            value: result.value,
            unit: result.unit.symbol().to_owned(),
            display: result.to_string(),
        }
    }

    #[allow(clippy::as_conversions, clippy::cast_precision_loss)]
    fn count(input: impl Into<String>, value: i64, unit: &str) -> Self {
        Self {
            input: input.into(),
            value: value as f64,
            unit: unit.to_owned(),
            display: value.to_string(),
        }
    }
}

/// Strictly parse `"<value> <unit>"`; garbage is a usage error here
/// rather than a silent zero.
fn parse_operand<U: Unit>(field: &str, text: &str) -> Result<ValueUnit<U>, CliError> {
    try_parse_value_unit::<U>(text).ok_or_else(|| CliError::Validation {
        field: field.into(),
        reason: format!("expected \"<value> <unit>\", got '{text}'"),
    })
}

pub fn handle(args: ConvertArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let result = match args.command {
        ConvertCommand::Bytes { bytes, unit } => {
            let converted = match unit {
                Some(ref text) => {
                    let unit = parse_size_unit(text);
                    if unit.is_none() {
                        return Err(CliError::Validation {
                            field: "unit".into(),
                            reason: format!("unknown size unit '{text}'"),
                        });
                    }
                    bytes_to_size_unit_in(bytes, unit)
                }
                None => bytes_to_size_unit(bytes),
            };
            Conversion::of(bytes.to_string(), converted)
        }

        ConvertCommand::Size { value } => {
            let size = parse_operand::<SizeUnit>("size", &value)?;
            Conversion::count(value, size_unit_to_bytes(size), "B")
        }

        ConvertCommand::Minutes { value } => {
            let span = parse_operand::<TimeUnit>("time span", &value)?;
            Conversion::count(value, time_span_to_minutes(span), "min")
        }

        ConvertCommand::Millis { millis } => {
            Conversion::of(millis.to_string(), millis_to_time_unit(millis))
        }

        ConvertCommand::Subtract { a, b } => {
            let lhs = parse_operand::<SizeUnit>("a", &a)?;
            let rhs = parse_operand::<SizeUnit>("b", &b)?;
            Conversion::of(format!("{a} - {b}"), subtract_sizes(lhs, rhs))
        }
    };

    let out = output::render_single(
        &global.output,
        &result,
        |c| c.display.clone(),
        |c| c.display.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
