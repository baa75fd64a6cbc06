//! Errors raised by [`crate::HierarchyFilter::set_level`]. A rejected call
//! leaves the selection untouched.

use thiserror::Error;

use crate::level::Level;

/// A rejected selection change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The value belongs to a different level than the one being set.
    #[error("a {value_level} value cannot be set at the {level} level")]
    LevelMismatch {
        /// Level being set.
        level: Level,
        /// Level the value belongs to.
        value_level: Level,
    },

    /// A shallower level is unset.
    #[error("cannot set {level} before {missing} is selected")]
    AncestorUnset {
        /// Level being set.
        level: Level,
        /// Shallowest unset ancestor.
        missing: Level,
    },

    /// The value is not among the level's current options.
    #[error("{value:?} is not a valid {level} for the current selection")]
    NotAnOption {
        /// Level being set.
        level: Level,
        /// Rejected value.
        value: String,
    },
}
