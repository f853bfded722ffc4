use std::convert::TryInto;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Sub};

use serde::{de, ser, Deserialize, Serialize};

/// A signed duration in seconds, as used for transfer dwell times and timezone
/// adjustments.
/// # Examples
/// ```rust
/// use raptor_core::time::Duration;
/// assert_eq!(Duration::seconds(60), Duration::minutes(1));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Duration {
    seconds: i32,
}

impl Duration {
    /// Construct a duration of a number of seconds
    pub fn seconds(seconds: i32) -> Duration {
        Duration { seconds }
    }

    /// Construct a duration of a number of minutes
    pub fn minutes(minutes: i32) -> Duration {
        Duration {
            seconds: minutes * 60,
        }
    }

    /// Convert to minutes
    pub fn to_mins(&self) -> i32 {
        self.seconds / 60
    }

    /// Convert to seconds
    pub fn to_secs(&self) -> i32 {
        self.seconds
    }

    pub fn is_negative(&self) -> bool {
        self.seconds < 0
    }
}

impl AddAssign<Duration> for Duration {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Duration) {
        self.seconds += rhs.seconds;
    }
}

impl Div<i32> for Duration {
    type Output = Duration;

    #[inline(always)]
    fn div(self, rhs: i32) -> Self::Output {
        Duration::seconds(self.seconds / rhs)
    }
}

/// A point in time within a service day expressed as seconds from local
/// midnight, not attempting to handle leap seconds.
/// * deserialises the raw integer seconds persisted in the artifacts
/// * can exceed 24 hours, to represent trips that continue into the
///   following calendar day without changing service day
/// * second precision
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Time {
    seconds_since_midnight: u32,
}

impl Time {
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Time {
        Time {
            seconds_since_midnight: (hours * 60 + minutes) * 60 + seconds,
        }
    }

    pub fn from_seconds(seconds_since_midnight: u32) -> Time {
        Time {
            seconds_since_midnight,
        }
    }

    pub fn to_seconds(self) -> u32 {
        self.seconds_since_midnight
    }

    /// get the clock hour, it can be over 23
    fn hour(self) -> u32 {
        self.seconds_since_midnight / 60 / 60
    }

    /// get the minute of the hour
    fn minute(self) -> u8 {
        ((self.seconds_since_midnight / 60) % 60)
            .try_into()
            .unwrap()
    }

    /// get the seconds within the minute
    fn second(self) -> u8 {
        (self.seconds_since_midnight % 60).try_into().unwrap()
    }
}

impl ser::Serialize for Time {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        self.seconds_since_midnight.serialize(serializer)
    }
}

impl<'de> de::Deserialize<'de> for Time {
    fn deserialize<D>(deserializer: D) -> Result<Time, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        de::Deserialize::deserialize(deserializer).map(|seconds_since_midnight| Time {
            seconds_since_midnight,
        })
    }
}

impl Add<Duration> for Time {
    type Output = Time;

    /// Add a duration to a time.
    /// # Panics
    /// if the duration is negative enough to roll over to yesterday
    #[inline(always)]
    fn add(self, rhs: Duration) -> Self::Output {
        let time: i64 = self.seconds_since_midnight.into();
        let duration: i64 = rhs.seconds.into();
        Time {
            seconds_since_midnight: (time + duration)
                .try_into()
                .expect("duration not to be negative enough to roll over to yesterday"),
        }
    }
}

impl Sub<Time> for Time {
    type Output = Duration;

    /// Subtract two `Time`s, returning the `Duration` between. This assumes
    /// both `Time`s are on the same service day timeline.
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        Duration::seconds(self.seconds_since_midnight as i32 - rhs.seconds_since_midnight as i32)
    }
}

impl fmt::Debug for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

/// A period between 2 Times on the same service day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    start: Time,
    end: Time,
}

impl Period {
    /// Create a new period between these 2 times
    /// # Panics
    /// if start > end
    pub fn between(start: Time, end: Time) -> Period {
        assert!(start < end);
        Period { start, end }
    }

    /// returns a new period with the same end and the new start
    /// # Panics
    /// if start > end
    pub fn with_start(&self, start: Time) -> Period {
        Self::between(start, self.end)
    }

    /// Containership, inclusive of start, exclusive of end
    pub fn contains(&self, time: Time) -> bool {
        self.start <= time && time < self.end
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn end(&self) -> Time {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl std::ops::RangeBounds<Time> for Period {
    fn start_bound(&self) -> std::ops::Bound<&Time> {
        std::ops::Bound::Included(&self.start)
    }
    fn end_bound(&self) -> std::ops::Bound<&Time> {
        std::ops::Bound::Excluded(&self.end)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// # String representations
/// ```rust
/// use raptor_core::time::Time;
/// let _: Time = "0:00:00".parse().unwrap();
/// let _: Time = "1:00:00".parse().unwrap();
/// let _: Time = "09:00:00".parse().unwrap();
/// let _: Time = "23:59:59".parse().unwrap();
/// let _: Time = "25:00:00".parse().unwrap();
/// ```
impl std::str::FromStr for Time {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.as_bytes();
        let (hh, mm, ss) = match s.len() {
            8 => {
                if s[2] != b':' || s[5] != b':' {
                    return Err(TimeParseError::InvalidFormat);
                }
                (&s[0..2], &s[3..5], &s[6..8])
            }
            7 => {
                if s[1] != b':' || s[4] != b':' {
                    return Err(TimeParseError::InvalidFormat);
                }
                (&s[0..1], &s[2..4], &s[5..7])
            }
            _ => return Err(TimeParseError::InvalidFormat),
        };
        use std::str::from_utf8;
        let hours: u32 = from_utf8(hh)?.parse()?;
        let minutes: u32 = from_utf8(mm)?.parse()?;
        let seconds: u32 = from_utf8(ss)?.parse()?;
        if seconds > 59 || minutes > 59 {
            return Err(TimeParseError::TooManySecondsOrMinutes);
        }
        Ok(Time {
            seconds_since_midnight: hours * 60 * 60 + minutes * 60 + seconds,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    InvalidFormat,
    TooManySecondsOrMinutes,
    ParseIntError(std::num::ParseIntError),
}

impl From<std::num::ParseIntError> for TimeParseError {
    fn from(err: std::num::ParseIntError) -> TimeParseError {
        TimeParseError::ParseIntError(err)
    }
}

impl std::convert::From<std::str::Utf8Error> for TimeParseError {
    fn from(_err: std::str::Utf8Error) -> TimeParseError {
        TimeParseError::InvalidFormat
    }
}

impl fmt::Display for TimeParseError {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TimeParseError::*;
        match self {
            InvalidFormat => write!(f, "Time should use format eg. 23:59:59"),
            TooManySecondsOrMinutes => write!(f, "Maximum minutes or seconds is 59"),
            ParseIntError(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for TimeParseError {}
