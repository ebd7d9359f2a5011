// FilterPredicate: regex inclusion tests on buckets
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use super::{
    Bucket,
    ConfigError,
};

/// The bucket field that a `FilterPredicate` is tested against.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FilterField {
    /// Match against the bucket name. Known before enrichment.
    Name,

    /// Match against the set of storage classes present in the bucket.
    /// Only known once object metrics have been collected.
    StorageClasses,
}

// Field names are case-insensitive.
impl FromStr for FilterField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name"           => Ok(Self::Name),
            "storageclasses" => Ok(Self::StorageClasses),
            _                => Err(ConfigError::InvalidFilterField(s.into())),
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Name           => write!(f, "name"),
            Self::StorageClasses => write!(f, "storageclasses"),
        }
    }
}

/// A compiled regex bound to exactly one `FilterField`.
#[derive(Clone, Debug)]
pub struct FilterPredicate {
    field: FilterField,
    regex: Regex,
}

impl FilterPredicate {
    /// Compile a new `FilterPredicate` for the given `field`.
    pub fn new(field: FilterField, regex: &str) -> Result<Self, ConfigError> {
        let compiled = Regex::new(regex)
            .map_err(|source| ConfigError::InvalidRegex {
                regex:  regex.into(),
                source: source,
            })?;

        Ok(Self {
            field: field,
            regex: compiled,
        })
    }

    /// Build an optional predicate from the raw `--filter` and `--regex`
    /// values.
    ///
    /// Neither given means no filtering. One without the other is an error.
    pub fn from_parts(
        field: Option<&str>,
        regex: Option<&str>,
    ) -> Result<Option<Self>, ConfigError> {
        match (field, regex) {
            (None, None)            => Ok(None),
            (Some(_), None)         => Err(ConfigError::MissingRegex),
            (None, Some(_))         => Err(ConfigError::MissingFilter),
            (Some(field), Some(re)) => {
                let field = FilterField::from_str(field)?;

                Self::new(field, re).map(Some)
            },
        }
    }

    /// The field this predicate tests.
    pub fn field(&self) -> FilterField {
        self.field
    }

    /// Returns `true` if `bucket` should be kept.
    ///
    /// For `StorageClasses` this is true if any present class label matches,
    /// so a bucket with no objects never matches.
    pub fn matches(&self, bucket: &Bucket) -> bool {
        match self.field {
            FilterField::Name => self.regex.is_match(&bucket.name),
            FilterField::StorageClasses => {
                bucket.storage_classes
                    .keys()
                    .any(|class| self.regex.is_match(class))
            },
        }
    }
}

/// Evaluates an optional predicate, where `None` accepts everything.
pub fn accepts(predicate: Option<&FilterPredicate>, bucket: &Bucket) -> bool {
    predicate.map_or(true, |p| p.matches(bucket))
}
