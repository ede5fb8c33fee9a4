use std::f64::consts::TAU;

use crate::math::Point3;

use super::TriangleMesh;

/// Creates a box centred on the origin with the given edge lengths along
/// X, Y and Z.
#[must_use]
pub fn make_box(x_length: f64, y_length: f64, z_length: f64) -> TriangleMesh {
    let (hx, hy, hz) = (x_length / 2.0, y_length / 2.0, z_length / 2.0);

    // Vertex i sits at (+x if bit 0, +y if bit 1, +z if bit 2).
    let vertices = (0..8)
        .map(|i| {
            let sx = if i & 1 == 0 { -hx } else { hx };
            let sy = if i & 2 == 0 { -hy } else { hy };
            let sz = if i & 4 == 0 { -hz } else { hz };
            Point3::new(sx, sy, sz)
        })
        .collect();

    let indices = vec![
        [0, 2, 3], [0, 3, 1], // -Z
        [4, 5, 7], [4, 7, 6], // +Z
        [0, 1, 5], [0, 5, 4], // -Y
        [2, 6, 7], [2, 7, 3], // +Y
        [0, 4, 6], [0, 6, 2], // -X
        [1, 3, 7], [1, 7, 5], // +X
    ];

    TriangleMesh::new(vertices, indices)
}

/// Creates a capped tube (cylinder) of `radius` along Z, centred on the
/// origin and spanning `length`.
///
/// `sides` is clamped to at least 3.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn make_tube(radius: f64, length: f64, sides: usize) -> TriangleMesh {
    let n = sides.max(3);
    let half = length / 2.0;

    let mut vertices = Vec::with_capacity(2 * n + 2);
    for z in [-half, half] {
        for i in 0..n {
            let theta = TAU * i as f64 / n as f64;
            vertices.push(Point3::new(radius * theta.cos(), radius * theta.sin(), z));
        }
    }
    vertices.push(Point3::new(0.0, 0.0, -half));
    vertices.push(Point3::new(0.0, 0.0, half));

    let n32 = n as u32;
    let bottom_center = 2 * n32;
    let top_center = 2 * n32 + 1;
    let mut indices = Vec::with_capacity(4 * n);
    for i in 0..n32 {
        let j = (i + 1) % n32;
        let (b0, b1, t0, t1) = (i, j, i + n32, j + n32);
        indices.push([b0, b1, t1]);
        indices.push([b0, t1, t0]);
        indices.push([bottom_center, b1, b0]);
        indices.push([top_center, t0, t1]);
    }

    TriangleMesh::new(vertices, indices)
}

/// Capped tube swept along a polyline, for tests that need bone-like
/// shafts. Ring frames are carried along the path without twisting.
#[cfg(test)]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub(crate) fn swept_tube(path: &[Point3], radius: f64, sides: usize) -> TriangleMesh {
    use crate::math::perpendicular;

    let n = sides.max(3);
    let last = path.len() - 1;
    let tangent = |i: usize| (path[(i + 1).min(last)] - path[i.saturating_sub(1)]).normalize();

    let mut vertices = Vec::with_capacity(path.len() * n + 2);
    let mut u = perpendicular(&tangent(0));
    for (i, center) in path.iter().enumerate() {
        let t = tangent(i);
        u = (u - t * t.dot(&u)).normalize();
        let v = t.cross(&u);
        for k in 0..n {
            let theta = TAU * k as f64 / n as f64;
            vertices.push(center + (u * theta.cos() + v * theta.sin()) * radius);
        }
    }
    vertices.push(path[0]);
    vertices.push(path[last]);

    let n32 = n as u32;
    let first_center = (path.len() * n) as u32;
    let last_center = first_center + 1;
    let last_ring = last as u32 * n32;
    let mut indices = Vec::new();
    for ring in 0..last as u32 {
        for k in 0..n32 {
            let j = (k + 1) % n32;
            let (b0, b1) = (ring * n32 + k, ring * n32 + j);
            let (t0, t1) = (b0 + n32, b1 + n32);
            indices.push([b0, b1, t1]);
            indices.push([b0, t1, t0]);
        }
    }
    for k in 0..n32 {
        let j = (k + 1) % n32;
        indices.push([first_center, j, k]);
        indices.push([last_center, last_ring + k, last_ring + j]);
    }

    TriangleMesh::new(vertices, indices)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn box_has_expected_extent_and_volume() {
        let b = make_box(2.0, 4.0, 6.0);
        assert_eq!(b.triangle_count(), 12);
        let bounds = b.bounds().unwrap();
        assert_relative_eq!(bounds.min, Point3::new(-1.0, -2.0, -3.0));
        assert_relative_eq!(bounds.max, Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(b.signed_volume(), 48.0, epsilon = 1e-9);
    }

    #[test]
    fn tube_is_closed_and_outward() {
        let tube = make_tube(1.0, 2.0, 64);
        assert_eq!(tube.triangle_count(), 4 * 64);
        let volume = tube.signed_volume();
        // Inscribed polygon area: n/2 * sin(2π/n).
        let expected = 32.0 * (TAU / 64.0).sin() * 2.0;
        assert_relative_eq!(volume, expected, epsilon = 1e-9);
        assert!((volume - PI * 2.0).abs() < 0.01);
    }

    #[test]
    fn swept_tube_matches_straight_tube() {
        let path: Vec<Point3> = (0..=4).map(|i| Point3::new(0.0, 0.0, f64::from(i) * 0.5 - 1.0)).collect();
        let swept = swept_tube(&path, 1.0, 64);
        let straight = make_tube(1.0, 2.0, 64);
        assert_relative_eq!(swept.signed_volume(), straight.signed_volume(), epsilon = 1e-9);
    }

    #[test]
    fn tube_clamps_sides() {
        assert_eq!(make_tube(1.0, 1.0, 1).triangle_count(), 12);
    }
}
