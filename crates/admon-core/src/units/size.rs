// ── Storage size units ──
//
// Binary (base-1024) magnitudes, ordered so that `NONE` sorts below every
// real unit and each step up is one factor of 1024.

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use super::value_unit::Unit;

/// Size of one step between adjacent units.
pub const SIZE_STEP: i64 = 1024;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    #[default]
    None,
    Byte,
    Kilobyte,
    Megabyte,
    Gigabyte,
    Terabyte,
    Petabyte,
    Exabyte,
    Zettabyte,
    Yottabyte,
}

impl SizeUnit {
    /// Number of 1024-divisions separating this unit from bytes.
    /// `None` counts as bytes.
    pub fn steps(self) -> u32 {
        match self {
            Self::None | Self::Byte => 0,
            Self::Kilobyte => 1,
            Self::Megabyte => 2,
            Self::Gigabyte => 3,
            Self::Terabyte => 4,
            Self::Petabyte => 5,
            Self::Exabyte => 6,
            Self::Zettabyte => 7,
            Self::Yottabyte => 8,
        }
    }

    /// Inverse of [`steps`](Self::steps); anything past yottabytes is `None`.
    pub fn from_steps(steps: u32) -> Self {
        match steps {
            0 => Self::Byte,
            1 => Self::Kilobyte,
            2 => Self::Megabyte,
            3 => Self::Gigabyte,
            4 => Self::Terabyte,
            5 => Self::Petabyte,
            6 => Self::Exabyte,
            7 => Self::Zettabyte,
            8 => Self::Yottabyte,
            _ => Self::None,
        }
    }
}

impl Unit for SizeUnit {
    fn symbol(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Byte => "B",
            Self::Kilobyte => "KB",
            Self::Megabyte => "MB",
            Self::Gigabyte => "GB",
            Self::Terabyte => "TB",
            Self::Petabyte => "PB",
            Self::Exabyte => "EB",
            Self::Zettabyte => "ZB",
            Self::Yottabyte => "YB",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Byte => "byte",
            Self::Kilobyte => "kilobyte",
            Self::Megabyte => "megabyte",
            Self::Gigabyte => "gigabyte",
            Self::Terabyte => "terabyte",
            Self::Petabyte => "petabyte",
            Self::Exabyte => "exabyte",
            Self::Zettabyte => "zettabyte",
            Self::Yottabyte => "yottabyte",
        }
    }
}
