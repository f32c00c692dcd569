// ── Measured quantities ──
//
// Size and time unit enumerations, the `ValueUnit` pair, and the
// conversions used to render and compare them.

mod convert;
mod size;
mod time;
mod value_unit;

pub use convert::{
    align_units, bytes_to_size_unit, bytes_to_size_unit_in, millis_to_time_unit, normalize_size,
    parse_size_unit, parse_time_unit, parse_value_unit, size_unit_to_bytes, subtract_sizes,
    time_span_to_minutes, try_parse_value_unit,
};
pub use size::{SIZE_STEP, SizeUnit};
pub use time::TimeUnit;
pub use value_unit::{Unit, ValueUnit};
