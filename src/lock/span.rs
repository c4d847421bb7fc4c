use std::fmt;
use std::time::Duration;

/// A wait or expiration bound with a distinguished infinite value.
///
/// As a timeout, [`Span::Infinite`] means "wait forever"; as an expiration it
/// means "never release automatically".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Span {
    #[default]
    Infinite,
    Finite(Duration),
}

impl Span {
    pub const ZERO: Span = Span::Finite(Duration::ZERO);

    pub fn from_millis(millis: u64) -> Self {
        Span::Finite(Duration::from_millis(millis))
    }

    pub fn from_secs(secs: u64) -> Self {
        Span::Finite(Duration::from_secs(secs))
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Span::Infinite)
    }

    /// The finite duration, or `None` for the infinite sentinel
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Span::Infinite => None,
            Span::Finite(d) => Some(*d),
        }
    }
}

impl From<Duration> for Span {
    fn from(d: Duration) -> Self {
        Span::Finite(d)
    }
}

impl From<Option<Duration>> for Span {
    fn from(d: Option<Duration>) -> Self {
        d.map_or(Span::Infinite, Span::Finite)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Span::Infinite => write!(f, "infinite"),
            Span::Finite(d) => write!(f, "{:?}", d),
        }
    }
}
