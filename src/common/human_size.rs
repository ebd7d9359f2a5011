// HumanSize trait and implementations
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::common::SizeUnit;
use humansize::format_size;
use tracing::debug;

/// `HumanSize` trait.
pub trait HumanSize {
    /// Return `self` formatted according to `unit`.
    fn humansize(&self, unit: &SizeUnit) -> String;
}

/// `HumanSize` trait implementation for `u64`.
impl HumanSize for u64 {
    /// Return `self` as a human friendly size if requested by `unit`.
    fn humansize(&self, unit: &SizeUnit) -> String {
        debug!("humansize: size {}, unit {:?}", self, unit);

        match unit {
            SizeUnit::Binary(opts)  => format_size(*self, opts),
            SizeUnit::Bytes         => self.to_string(),
            SizeUnit::Decimal(opts) => format_size(*self, opts),
            SizeUnit::Scaled { divisor, .. } => {
                format!("{:.2}", *self as f64 / divisor)
            },
        }
    }
}
