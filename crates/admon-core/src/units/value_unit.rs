use std::fmt;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// A unit enumeration: totally ordered by magnitude, with a `NONE`
/// sentinel as its `Default` and lowest member.
pub trait Unit: Copy + Ord + Default + fmt::Debug + IntoEnumIterator {
    /// Short symbol, e.g. `"MB"`. Empty for the sentinel.
    fn symbol(self) -> &'static str;

    /// Long name, e.g. `"megabyte"`.
    fn description(self) -> &'static str;

    fn is_none(self) -> bool {
        self == Self::default()
    }

    /// Case-insensitive lookup: every symbol first, then every
    /// description. Unknown text yields the sentinel.
    fn parse(text: &str) -> Self {
        let known = || Self::iter().filter(|u| !u.is_none());
        known()
            .find(|u| u.symbol().eq_ignore_ascii_case(text))
            .or_else(|| known().find(|u| u.description().eq_ignore_ascii_case(text)))
            .unwrap_or_default()
    }
}

/// A magnitude paired with its unit. Not normalized: `1024 KB` and
/// `1 MB` compare unequal until aligned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueUnit<U> {
    pub value: f64,
    pub unit: U,
}

impl<U: Unit> ValueUnit<U> {
    pub fn new(value: f64, unit: U) -> Self {
        Self { value, unit }
    }

    /// `(0, NONE)`, the result of every failed conversion.
    pub fn none() -> Self {
        Self::default()
    }

    /// Overwrite both fields in place.
    pub fn update(&mut self, value: f64, unit: U) {
        self.value = value;
        self.unit = unit;
    }

    pub fn is_none(&self) -> bool {
        self.unit.is_none()
    }
}

impl<U: Unit> fmt::Display for ValueUnit<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_none() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit.symbol())
        }
    }
}
