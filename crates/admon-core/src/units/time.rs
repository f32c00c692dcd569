// ── Elapsed time units ──

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use super::value_unit::Unit;

/// Divisors between adjacent time units, starting at milliseconds.
pub(crate) const TIME_LADDER: [i64; 4] = [1000, 60, 60, 24];

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    None,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Position on [`TIME_LADDER`]; `None` counts as milliseconds.
    pub fn steps(self) -> usize {
        match self {
            Self::None | Self::Milliseconds => 0,
            Self::Seconds => 1,
            Self::Minutes => 2,
            Self::Hours => 3,
            Self::Days => 4,
        }
    }

    pub fn from_steps(steps: usize) -> Self {
        match steps {
            0 => Self::Milliseconds,
            1 => Self::Seconds,
            2 => Self::Minutes,
            3 => Self::Hours,
            4 => Self::Days,
            _ => Self::None,
        }
    }
}

impl Unit for TimeUnit {
    fn symbol(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "min",
            Self::Hours => "h",
            Self::Days => "d",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Milliseconds => "milliseconds",
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
        }
    }
}
