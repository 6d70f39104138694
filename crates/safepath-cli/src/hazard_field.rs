//! Random hazard fields for load testing.

use rand::Rng;
use safepath_core::rules::METERS_PER_DEG_LAT;
use safepath_core::{GeoPoint, Hazard};

/// Square area, in metres, around a center point.
#[derive(Debug, Clone, Copy)]
pub struct HazardField {
    pub center: GeoPoint,
    pub half_width_m: f64,
}

impl HazardField {
    pub fn new(center: GeoPoint, half_width_m: f64) -> Self {
        Self {
            center,
            half_width_m,
        }
    }

    /// Uniform random point inside the field.
    pub fn random_point<R: Rng>(&self, rng: &mut R) -> GeoPoint {
        let north = rng.random_range(-self.half_width_m..=self.half_width_m);
        let east = rng.random_range(-self.half_width_m..=self.half_width_m);
        self.offset(north, east)
    }

    /// `count` hazards scattered uniformly, tagged with a frame-style source.
    pub fn scatter<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<Hazard> {
        (0..count)
            .map(|i| {
                let point = self.random_point(rng);
                Hazard::new(point.latitude, point.longitude)
                    .with_source(format!("frame_{:04}.jpg", i))
            })
            .collect()
    }

    /// Degrees bounding box as (min_lat, min_lon, max_lat, max_lon).
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let low = self.offset(-self.half_width_m, -self.half_width_m);
        let high = self.offset(self.half_width_m, self.half_width_m);
        (low.latitude, low.longitude, high.latitude, high.longitude)
    }

    fn offset(&self, north_m: f64, east_m: f64) -> GeoPoint {
        let lon_scale = METERS_PER_DEG_LAT * self.center.latitude.to_radians().cos().max(1e-9);
        GeoPoint::new(
            self.center.latitude + north_m / METERS_PER_DEG_LAT,
            self.center.longitude + east_m / lon_scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn field() -> HazardField {
        HazardField::new(GeoPoint::new(21.0, 39.0), 1500.0)
    }

    #[test]
    fn hazards_stay_inside_the_field() {
        let field = field();
        let (min_lat, min_lon, max_lat, max_lon) = field.bounds();
        let mut rng = StdRng::seed_from_u64(7);
        let hazards = field.scatter(&mut rng, 500);
        assert_eq!(hazards.len(), 500);
        for hazard in &hazards {
            let p = hazard.position;
            assert!(p.latitude >= min_lat - 1e-12 && p.latitude <= max_lat + 1e-12);
            assert!(p.longitude >= min_lon - 1e-12 && p.longitude <= max_lon + 1e-12);
        }
        assert_eq!(hazards[3].source.as_deref(), Some("frame_0003.jpg"));
    }

    #[test]
    fn same_seed_same_field() {
        let field = field();
        let a = field.scatter(&mut StdRng::seed_from_u64(42), 20);
        let b = field.scatter(&mut StdRng::seed_from_u64(42), 20);
        assert_eq!(a, b);
    }
}
