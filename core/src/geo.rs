use crate::models::Coordinate;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Storsirkeldistanse (haversine) mellom to koordinater, i meter.
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn en_grad_lengde_ved_ekvator() {
        let a = Coordinate { lat: 0.0, lon: 0.0 };
        let b = Coordinate { lat: 0.0, lon: 1.0 };
        let d = haversine_m(a, b);
        // ca. 111.2 km
        assert!((d - 111_195.0).abs() < 200.0);
    }

    #[test]
    fn null_distanse_for_samme_punkt() {
        let p = Coordinate { lat: 59.91, lon: 10.75 };
        assert_eq!(haversine_m(p, p), 0.0);
    }

    #[test]
    fn symmetrisk() {
        let a = Coordinate { lat: 59.91, lon: 10.75 };
        let b = Coordinate { lat: 59.92, lon: 10.76 };
        assert!((haversine_m(a, b) - haversine_m(b, a)).abs() < 1e-9);
    }
}
