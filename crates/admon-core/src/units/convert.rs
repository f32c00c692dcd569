// ── Unit conversion ──
//
// Pure functions between raw byte / millisecond counts and `ValueUnit`s.
// Nothing here fails: unparseable input degrades to `(0, NONE)`.

use super::size::{SIZE_STEP, SizeUnit};
use super::time::{TIME_LADDER, TimeUnit};
use super::value_unit::{Unit, ValueUnit};

const MAX_SIZE_STEPS: u32 = 8;

// ── Parsing ──────────────────────────────────────────────────────────

pub fn parse_size_unit(text: &str) -> SizeUnit {
    SizeUnit::parse(text)
}

pub fn parse_time_unit(text: &str) -> TimeUnit {
    TimeUnit::parse(text)
}

/// Split `"<number> <unit>"` at spaces. The unit token may be empty or
/// unknown; a missing space or a non-numeric first token is `None`.
fn split_value_unit(text: &str) -> Option<(f64, &str)> {
    let mut parts = text.split(' ');
    let value = parts.next()?.parse::<f64>().ok()?;
    let unit = parts.next()?;
    Some((value, unit))
}

/// Parse `"500 MB"`-style text.
///
/// Empty text, a missing space or a non-numeric value give `(0, NONE)`.
/// A numeric value followed by an unknown unit keeps the value and
/// reports the `NONE` unit.
pub fn parse_value_unit<U: Unit>(text: &str) -> ValueUnit<U> {
    split_value_unit(text).map_or_else(ValueUnit::none, |(value, unit)| {
        ValueUnit::new(value, U::parse(unit))
    })
}

/// Strict variant of [`parse_value_unit`]: `None` unless both the value
/// and the unit were recognized.
pub fn try_parse_value_unit<U: Unit>(text: &str) -> Option<ValueUnit<U>> {
    let (value, unit) = split_value_unit(text)?;
    let unit = U::parse(unit);
    (!unit.is_none()).then(|| ValueUnit::new(value, unit))
}

// ── Sizes ────────────────────────────────────────────────────────────

/// Express a byte count in the largest unit that keeps the value at or
/// above one, using truncating division.
///
/// `1048576` becomes `(1, MB)`; `1048575` becomes `(1023, KB)`.
pub fn bytes_to_size_unit(bytes: i64) -> ValueUnit<SizeUnit> {
    let mut value = bytes;
    let mut steps = 0;
    while value >= SIZE_STEP && steps < MAX_SIZE_STEPS {
        value /= SIZE_STEP;
        steps += 1;
    }
    ValueUnit::new(as_f64(value), SizeUnit::from_steps(steps))
}

/// Express a byte count in `unit`, dividing exactly `unit.steps()` times.
/// `NONE` is treated as bytes.
pub fn bytes_to_size_unit_in(bytes: i64, unit: SizeUnit) -> ValueUnit<SizeUnit> {
    let steps = unit.steps();
    let mut value = bytes;
    for _ in 0..steps {
        value /= SIZE_STEP;
    }
    ValueUnit::new(as_f64(value), SizeUnit::from_steps(steps))
}

/// Byte count of a size. The value is truncated to an integer before
/// scaling, so `(1.5, KB)` is 1024 bytes. Saturates at `i64::MAX`.
pub fn size_unit_to_bytes(size: ValueUnit<SizeUnit>) -> i64 {
    let mut bytes = truncate(size.value);
    for _ in 0..size.unit.steps() {
        bytes = bytes.saturating_mul(SIZE_STEP);
    }
    bytes
}

/// Re-derive the natural unit of a size through its byte count.
pub fn normalize_size(size: ValueUnit<SizeUnit>) -> ValueUnit<SizeUnit> {
    bytes_to_size_unit(size_unit_to_bytes(size))
}

/// Rewrite both operands in place so they share the smaller of their two
/// units. The operand already in that unit is untouched; the other is
/// scaled by 1024 per step without truncation.
pub fn align_units(a: &mut ValueUnit<SizeUnit>, b: &mut ValueUnit<SizeUnit>) {
    if a.unit == b.unit {
        return;
    }
    let target = a.unit.min(b.unit);
    for operand in [a, b] {
        let mut value = operand.value;
        for _ in target.steps()..operand.unit.steps() {
            value *= 1024.0;
        }
        operand.update(value, target);
    }
}

/// `a - b` after alignment, in the aligned unit. Negative results are
/// kept.
pub fn subtract_sizes(
    mut a: ValueUnit<SizeUnit>,
    mut b: ValueUnit<SizeUnit>,
) -> ValueUnit<SizeUnit> {
    align_units(&mut a, &mut b);
    ValueUnit::new(a.value - b.value, a.unit)
}

// ── Time ─────────────────────────────────────────────────────────────

/// Whole minutes in a time span. Only minutes, hours and days convert;
/// every other unit yields 0.
pub fn time_span_to_minutes(span: ValueUnit<TimeUnit>) -> i64 {
    match span.unit {
        TimeUnit::Minutes => truncate(span.value),
        TimeUnit::Hours => truncate(span.value * 60.0),
        TimeUnit::Days => truncate(span.value * 60.0 * 24.0),
        _ => 0,
    }
}

/// Express a millisecond count in the largest unit that keeps the value
/// at or above one, using truncating division.
pub fn millis_to_time_unit(millis: i64) -> ValueUnit<TimeUnit> {
    let mut value = millis;
    let mut steps = 0;
    while let Some(&divisor) = TIME_LADDER.get(steps) {
        if value < divisor {
            break;
        }
        value /= divisor;
        steps += 1;
    }
    ValueUnit::new(as_f64(value), TimeUnit::from_steps(steps))
}

// ── Numeric helpers ──────────────────────────────────────────────────

#[allow(clippy::as_conversions, clippy::cast_possible_truncation)]
fn truncate(value: f64) -> i64 {
    value as i64
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn as_f64(value: i64) -> f64 {
    value as f64
}
