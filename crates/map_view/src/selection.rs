use gateway::record::{Waypoint, WaypointId};

/// The waypoint whose details are open, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    current: Option<Waypoint>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the record with `id` from `cache`.
    ///
    /// Returns `false` and leaves the selection alone if `id` is not cached.
    pub fn select_from(&mut self, id: &WaypointId, cache: &[Waypoint]) -> bool {
        match cache.iter().find(|w| &w.id == id) {
            Some(w) => {
                self.current = Some(w.clone());
                true
            }
            None => false,
        }
    }

    /// Returns `true` if something was selected.
    pub fn clear(&mut self) -> bool {
        self.current.take().is_some()
    }

    pub fn current(&self) -> Option<&Waypoint> {
        self.current.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::geo::LngLat;

    #[test]
    fn select_and_clear() {
        let cache = vec![Waypoint::new("a", "A", LngLat::new(0.0, 0.0))];
        let mut s = Selection::new();
        assert!(!s.select_from(&WaypointId::new("zz"), &cache));
        assert!(s.is_empty());
        assert!(s.select_from(&WaypointId::new("a"), &cache));
        assert_eq!(s.current().map(|w| w.name.as_str()), Some("A"));
        assert!(s.clear());
        assert!(!s.clear());
    }
}
