//! Clock port for resolving relative dates.

use chrono::NaiveDateTime;

/// Provides the wall-clock time that `now`, `today`, and bare times are
/// resolved against when parsing date/time answers.
pub trait Clock: Send + Sync {
    /// Returns the current local date and time.
    fn now(&self) -> NaiveDateTime;
}
