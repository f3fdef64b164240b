/// Longitude/latitude pair in WGS84 degrees.
///
/// Field order follows the web-map convention (`[lng, lat]`), which is what
/// map widgets expect for marker placement and camera targets.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// True if both components are finite and inside the geographic range.
    pub fn is_valid(&self) -> bool {
        self.lng.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lng)
            && (-90.0..=90.0).contains(&self.lat)
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

#[cfg(test)]
mod tests {
    use super::LngLat;

    #[test]
    fn accepts_range_edges() {
        assert!(LngLat::new(180.0, 90.0).is_valid());
        assert!(LngLat::new(-180.0, -90.0).is_valid());
        assert!(LngLat::new(12.5, 41.9).is_valid());
    }

    #[test]
    fn rejects_out_of_range_and_non_finite() {
        assert!(!LngLat::new(12.0, 91.0).is_valid());
        assert!(!LngLat::new(-181.0, 0.0).is_valid());
        assert!(!LngLat::new(f64::NAN, 0.0).is_valid());
        assert!(!LngLat::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn array_is_lng_first() {
        assert_eq!(LngLat::new(9.0, 40.0).to_array(), [9.0, 40.0]);
    }
}
