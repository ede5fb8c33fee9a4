use super::{Point3, Vector3, TOLERANCE};

/// Signed distance from a point to the plane through `origin` with unit
/// `normal`. Positive = on the normal side, negative = opposite.
#[must_use]
pub fn signed_distance_to_plane(point: &Point3, origin: &Point3, normal: &Vector3) -> f64 {
    normal.dot(&(point - origin))
}

/// Signed distances nudged off zero so every vertex lands strictly on one
/// side of the plane. Vertices lying on the plane count as front.
#[must_use]
pub fn strict_signed_distance(point: &Point3, origin: &Point3, normal: &Vector3) -> f64 {
    let dist = signed_distance_to_plane(point, origin, normal);
    if dist.abs() < TOLERANCE {
        TOLERANCE
    } else {
        dist
    }
}

/// Point where segment `a → b` crosses the plane, given the strict signed
/// distances of its endpoints. `None` when both ends are on the same side.
#[must_use]
pub fn segment_crossing(a: &Point3, b: &Point3, d_a: f64, d_b: f64) -> Option<Point3> {
    if d_a * d_b > 0.0 {
        return None;
    }
    let t = d_a / (d_a - d_b);
    Some(a + (b - a) * t)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn crossing(a: Point3, b: Point3) -> Option<Point3> {
        let (origin, normal) = (Point3::origin(), Vector3::z());
        let d_a = strict_signed_distance(&a, &origin, &normal);
        let d_b = strict_signed_distance(&b, &origin, &normal);
        segment_crossing(&a, &b, d_a, d_b)
    }

    #[test]
    fn signed_distance_follows_normal() {
        let origin = p(0.0, 0.0, 1.0);
        let n = Vector3::z();
        assert!((signed_distance_to_plane(&p(4.0, 0.0, 3.0), &origin, &n) - 2.0).abs() < 1e-12);
        assert!((signed_distance_to_plane(&p(0.0, -2.0, 0.5), &origin, &n) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn straddling_segment_crosses_at_the_plane() {
        let hit = crossing(p(0.0, 0.0, -1.0), p(2.0, 0.0, 3.0)).unwrap();
        assert!((hit - p(0.5, 0.0, 0.0)).norm() < 1e-12);
        assert!(crossing(p(0.0, 0.0, 1.0), p(1.0, 0.0, 3.0)).is_none());
    }

    #[test]
    fn vertex_on_plane_counts_as_front() {
        assert!(crossing(p(0.0, 0.0, 0.0), p(0.0, 0.0, 1.0)).is_none());
        let hit = crossing(p(0.0, 0.0, 0.0), p(0.0, 0.0, -1.0)).unwrap();
        assert!(hit.coords.norm() < 1e-9);
    }
}
