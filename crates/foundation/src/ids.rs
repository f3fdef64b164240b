use std::fmt;
use std::str::FromStr;

/// Identifies one mounted view instance.
///
/// Markup rendered by third-party widgets carries this token so that events
/// coming back from that markup can be routed to the view that produced it,
/// and dropped once that view is gone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewToken(u64);

impl ViewToken {
    pub fn new(n: u64) -> Self {
        ViewToken(n)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ViewToken {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(ViewToken)
    }
}

/// Hands out view tokens in strictly increasing order, starting at 1.
#[derive(Debug, Default)]
pub struct TokenSource {
    last: u64,
}

impl TokenSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_view(&mut self) -> ViewToken {
        self.last += 1;
        ViewToken(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::{TokenSource, ViewToken};

    #[test]
    fn tokens_are_unique_and_increasing() {
        let mut src = TokenSource::new();
        let a = src.next_view();
        let b = src.next_view();
        assert!(a < b);
        assert_eq!(a.get(), 1);
    }

    #[test]
    fn parses_display_form() {
        let t = ViewToken::new(42);
        assert_eq!(t.to_string().parse::<ViewToken>().unwrap(), t);
        assert!("v42".parse::<ViewToken>().is_err());
    }
}
