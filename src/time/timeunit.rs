use crate::time::error::Error;
use core::str::FromStr;
use lazy_static::*;
use regex::Regex;
use std::time::Duration;

lazy_static! {
    static ref DURATION_REGEX: Regex =
        Regex::new(r"^(?P<value>\d+)\s*(?P<unit>[a-z]+)?$").expect("Regex compilation error");
}

/// A duration literal from the manifest. A bare number is read as milliseconds,
/// so `timeout: 1500` and `timeout: "1500ms"` mean the same thing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationUnit {
    value: u64,
    unit: TimeUnit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
}

impl TimeUnit {
    fn millis(self) -> u64 {
        match self {
            TimeUnit::Millisecond => 1,
            TimeUnit::Second => 1_000,
            TimeUnit::Minute => 60_000,
            TimeUnit::Hour => 3_600_000,
        }
    }
}

impl DurationUnit {
    pub fn duration(&self) -> Result<Duration, Error> {
        self.value
            .checked_mul(self.unit.millis())
            .map(Duration::from_millis)
            .ok_or_else(|| Error::Overflow(format!("{}{:?}", self.value, self.unit)))
    }
}

impl FromStr for DurationUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let caps = DURATION_REGEX
            .captures(trimmed)
            .ok_or_else(|| Error::Syntax(s.to_owned()))?;
        let value = caps["value"]
            .parse::<u64>()
            .map_err(|_| Error::Overflow(s.to_owned()))?;
        let unit = match caps.name("unit") {
            Some(unit) => unit.as_str().parse::<TimeUnit>()?,
            None => TimeUnit::Millisecond,
        };
        Ok(Self { value, unit })
    }
}

impl FromStr for TimeUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ms" | "millis" | "milliseconds" => Ok(TimeUnit::Millisecond),
            "s" | "sec" | "secs" | "seconds" => Ok(TimeUnit::Second),
            "m" | "min" | "mins" | "minutes" => Ok(TimeUnit::Minute),
            "h" | "hour" | "hours" => Ok(TimeUnit::Hour),
            _ => Err(Error::UnitNotSupported(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_time_unit_from_string() {
        assert_eq!("ms".parse::<TimeUnit>(), Ok(TimeUnit::Millisecond));
        assert_eq!("s".parse::<TimeUnit>(), Ok(TimeUnit::Second));
        assert_eq!("mins".parse::<TimeUnit>(), Ok(TimeUnit::Minute));
        assert_eq!("h".parse::<TimeUnit>(), Ok(TimeUnit::Hour));
        assert!("fortnight".parse::<TimeUnit>().is_err());
    }

    #[test]
    fn test_conversion_duration_unit_to_duration() {
        let unit = "200ms".parse::<DurationUnit>().unwrap();
        assert_eq!(unit.duration().unwrap(), Duration::from_millis(200));

        let unit = "30 s".parse::<DurationUnit>().unwrap();
        assert_eq!(unit.duration().unwrap(), Duration::from_secs(30));
    }

    #[test]
    fn test_bare_number_is_milliseconds() {
        let unit = "1500".parse::<DurationUnit>().unwrap();
        assert_eq!(unit.duration().unwrap(), Duration::from_millis(1500));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(
            "soon".parse::<DurationUnit>(),
            Err(Error::Syntax("soon".to_owned()))
        );
        assert!("-5s".parse::<DurationUnit>().is_err());
    }

    #[test]
    fn test_overflow_is_reported() {
        let unit = "18446744073709551615h".parse::<DurationUnit>().unwrap();
        assert!(unit.duration().is_err());
    }
}
