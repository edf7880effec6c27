pub mod error;
pub mod timeunit;

pub use self::timeunit::DurationUnit;

/// Milliseconds of a duration as the `u64` the reports carry.
#[inline]
pub fn as_millis(duration: std::time::Duration) -> u64 {
    duration.as_millis().min(u128::from(u64::MAX)) as u64
}
