// SizeUnit
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use humansize::{
    FormatSizeOptions,
    BINARY,
    DECIMAL,
};
use std::str::FromStr;
use super::ConfigError;

// Fixed decimal units and their power of 1000.
const SCALED_UNITS: &[(&str, i32)] = &[
    ("kb", 1),
    ("mb", 2),
    ("gb", 3),
    ("tb", 4),
    ("pb", 5),
    ("eb", 6),
];

/// `SizeUnit` represents how we want the bucket sizes to be displayed.
#[derive(Clone, Debug)]
pub enum SizeUnit {
    /// Human readable using SI units (multiples of 1024).
    Binary(FormatSizeOptions),

    /// The number of bytes.
    Bytes,

    /// Human readable using non-SI units (multiples of 1000).
    Decimal(FormatSizeOptions),

    /// A fixed decimal unit, such as megabytes, with two decimal places.
    Scaled {
        /// Lowercase unit label, eg. `mb`.
        label: &'static str,

        /// Number of bytes in one unit.
        divisor: f64,
    },
}

impl SizeUnit {
    /// Column heading suffix for this unit, eg. `MB`.
    pub fn label(&self) -> String {
        match self {
            Self::Binary(_) | Self::Decimal(_) => "HUMAN".into(),
            Self::Bytes                        => "B".into(),
            Self::Scaled { label, .. }         => label.to_uppercase(),
        }
    }
}

impl Default for SizeUnit {
    /// Megabytes.
    fn default() -> Self {
        Self::Scaled {
            label:   "mb",
            divisor: 1000_f64.powi(2),
        }
    }
}

/// This converts from the string arguments we receive on the command line to
/// our enum type.
impl FromStr for SizeUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // We remove the space from the humansize output so that our own
        // output is sortable by `sort -h`.
        let unit = s.to_lowercase();

        match unit.as_str() {
            "binary"  => {
                let opts = FormatSizeOptions::from(BINARY)
                    .space_after_value(false);

                return Ok(Self::Binary(opts))
            },
            "decimal" => {
                let opts = FormatSizeOptions::from(DECIMAL)
                    .space_after_value(false);

                return Ok(Self::Decimal(opts))
            },
            "b" | "bytes" => return Ok(Self::Bytes),
            _ => {},
        }

        SCALED_UNITS
            .iter()
            .find(|(label, _)| *label == unit)
            .map(|(label, power)| Self::Scaled {
                label:   label,
                divisor: 1000_f64.powi(*power),
            })
            .ok_or_else(|| ConfigError::InvalidUnit(s.into()))
    }
}
