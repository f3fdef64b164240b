/// Identifies one issued request.
///
/// Small and copyable so it can ride along with an async completion.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

/// Issues request tokens and decides which completion is still current.
///
/// Requests cannot be cancelled once issued, so ordering is enforced on
/// completion instead: only the most recently issued token is accepted, and
/// only once. Anything older is stale.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: u64,
    completed: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestToken {
        self.issued += 1;
        RequestToken(self.issued)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 != 0 && token.0 == self.issued && self.completed < token.0
    }

    /// Returns `true` if the completion for `token` should be applied.
    pub fn complete(&mut self, token: RequestToken) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.completed = token.0;
        true
    }

    pub fn in_flight(&self) -> bool {
        self.completed < self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::{RequestSequencer, RequestToken};

    #[test]
    fn last_issued_wins() {
        let mut seq = RequestSequencer::new();
        let first = seq.issue();
        let second = seq.issue();
        assert!(seq.complete(second));
        assert!(!seq.complete(first));
        assert!(!seq.in_flight());
    }

    #[test]
    fn older_completion_is_stale_even_if_first() {
        let mut seq = RequestSequencer::new();
        let first = seq.issue();
        let second = seq.issue();
        assert!(!seq.complete(first));
        assert!(seq.in_flight());
        assert!(seq.complete(second));
    }

    #[test]
    fn completes_at_most_once() {
        let mut seq = RequestSequencer::new();
        let t = seq.issue();
        assert!(seq.complete(t));
        assert!(!seq.complete(t));
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        let mut seq = RequestSequencer::new();
        assert!(!seq.in_flight());
        assert!(!seq.complete(RequestToken(0)));
        assert!(!seq.complete(RequestToken(5)));
    }
}
