//! Contour geometry: area, perimeter, polygon approximation, convexity
//! defects and the minimum enclosing circle.

use std::collections::HashMap;

use geo::{Area, ConvexHull, Simplify};
use geo_types::{Coord, LineString, MultiPoint, Point as GeoPoint, Polygon};
use imageproc::point::Point;

fn coord(p: &Point<i32>) -> Coord<f64> {
    Coord { x: p.x as f64, y: p.y as f64 }
}

/// Area enclosed by the contour polygon (shoelace), not the pixel count
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let ring = LineString::new(points.iter().map(coord).collect());
    Polygon::new(ring, vec![]).unsigned_area()
}

/// Closed perimeter of the contour
pub fn arc_length(points: &[Point<i32>]) -> f64 {
    imageproc::geometry::arc_length(points, true)
}

/// Vertex count of the closed Douglas-Peucker approximation of the contour.
///
/// The ring is split at the first point and the point farthest from it, and
/// each half is simplified separately, so both split points are always kept.
pub fn approx_vertex_count(points: &[Point<i32>], epsilon: f64) -> usize {
    if points.len() < 3 {
        return points.len();
    }

    let start = coord(&points[0]);
    let far = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let c = coord(p);
            (i, (c.x - start.x).powi(2) + (c.y - start.y).powi(2))
        })
        .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0;

    if far == 0 {
        return 1;
    }

    let first: LineString<f64> = points[..=far].iter().map(coord).collect();
    let second: LineString<f64> = points[far..]
        .iter()
        .chain(std::iter::once(&points[0]))
        .map(coord)
        .collect();

    let kept_first = first.simplify(&epsilon).0.len();
    let kept_second = second.simplify(&epsilon).0.len();

    // Each half repeats one split point of the other
    kept_first + kept_second - 2
}

/// Indices of convex hull vertices into `points`, in contour order
pub fn convex_hull_indices(points: &[Point<i32>]) -> Vec<usize> {
    let mut first_index: HashMap<(i32, i32), usize> = HashMap::new();
    for (i, p) in points.iter().enumerate() {
        first_index.entry((p.x, p.y)).or_insert(i);
    }

    let cloud: MultiPoint<f64> = points
        .iter()
        .map(|p| GeoPoint::new(p.x as f64, p.y as f64))
        .collect();
    let hull = cloud.convex_hull();

    let mut indices: Vec<usize> = hull
        .exterior()
        .coords()
        .filter_map(|c| first_index.get(&(c.x.round() as i32, c.y.round() as i32)).copied())
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}

fn distance_to_line(p: &Point<i32>, a: &Point<i32>, b: &Point<i32>) -> f64 {
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64, b.y as f64);
    let (px, py) = (p.x as f64, p.y as f64);
    let (dx, dy) = (bx - ax, by - ay);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    ((px - ax) * dy - (py - ay) * dx).abs() / len
}

/// Number of hull edges whose contour segment dips deeper than `min_depth`
/// below the edge
pub fn convexity_defects(points: &[Point<i32>], hull: &[usize], min_depth: f64) -> usize {
    if hull.len() < 3 {
        return 0;
    }

    let n = points.len();
    let mut defects = 0;
    for (i, &start) in hull.iter().enumerate() {
        let end = hull[(i + 1) % hull.len()];
        let span = (end + n - start) % n;
        if span < 2 {
            continue;
        }

        let depth = (1..span)
            .map(|offset| distance_to_line(&points[(start + offset) % n], &points[start], &points[end]))
            .fold(0.0, f64::max);

        if depth >= min_depth {
            defects += 1;
        }
    }
    defects
}

/// Centre and radius of the smallest circle containing every point.
///
/// Incremental construction; callers pass hull vertices so the point count
/// stays small.
pub fn min_enclosing_circle(points: &[[f64; 2]]) -> ([f64; 2], f64) {
    const EPS: f64 = 1e-7;

    let contains = |center: [f64; 2], radius: f64, p: [f64; 2]| {
        dist(center, p) <= radius + EPS
    };

    let Some(&first) = points.first() else {
        return ([0.0, 0.0], 0.0);
    };

    let (mut center, mut radius) = (first, 0.0);
    for i in 1..points.len() {
        if contains(center, radius, points[i]) {
            continue;
        }
        center = points[i];
        radius = 0.0;
        for j in 0..i {
            if contains(center, radius, points[j]) {
                continue;
            }
            center = midpoint(points[i], points[j]);
            radius = dist(points[i], points[j]) / 2.0;
            for k in 0..j {
                if contains(center, radius, points[k]) {
                    continue;
                }
                (center, radius) = circle_through(points[i], points[j], points[k]);
            }
        }
    }
    (center, radius)
}

fn dist(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

fn midpoint(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0]
}

fn circle_through(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> ([f64; 2], f64) {
    let d = 2.0 * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));
    if d.abs() < 1e-12 {
        // Collinear: the circle over the farthest pair covers all three
        let pairs = [(a, b), (a, c), (b, c)];
        let (p, q) = pairs
            .into_iter()
            .fold((a, b), |best, pair| if dist(pair.0, pair.1) > dist(best.0, best.1) { pair } else { best });
        return (midpoint(p, q), dist(p, q) / 2.0);
    }

    let sq = |p: [f64; 2]| p[0] * p[0] + p[1] * p[1];
    let ux = (sq(a) * (b[1] - c[1]) + sq(b) * (c[1] - a[1]) + sq(c) * (a[1] - b[1])) / d;
    let uy = (sq(a) * (c[0] - b[0]) + sq(b) * (a[0] - c[0]) + sq(c) * (b[0] - a[0])) / d;
    let center = [ux, uy];
    (center, dist(center, a))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: i32) -> Vec<Point<i32>> {
        let mut points = Vec::new();
        for x in 0..side {
            points.push(Point::new(x, 0));
        }
        for y in 0..side {
            points.push(Point::new(side, y));
        }
        for x in (1..=side).rev() {
            points.push(Point::new(x, side));
        }
        for y in (1..=side).rev() {
            points.push(Point::new(0, y));
        }
        points
    }

    #[test]
    fn test_square_area_and_perimeter() {
        let points = square(10);
        assert_eq!(contour_area(&points), 100.0);
        assert!((arc_length(&points) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_perimeter_includes_closing_edge() {
        let points = [Point::new(0, 0), Point::new(3, 0), Point::new(3, 4)];
        assert!((arc_length(&points) - 12.0).abs() < 1e-9);
        assert_eq!(arc_length(&points[..1]), 0.0);
    }

    #[test]
    fn test_square_approximates_to_four_vertices() {
        let points = square(20);
        let epsilon = 0.015 * arc_length(&points);
        assert_eq!(approx_vertex_count(&points, epsilon), 4);
    }

    #[test]
    fn test_square_has_no_defects() {
        let points = square(12);
        let hull = convex_hull_indices(&points);
        assert_eq!(hull.len(), 4);
        assert_eq!(convexity_defects(&points, &hull, 1.0), 0);
    }

    #[test]
    fn test_notched_shape_has_defects() {
        // A "plus" outline has four concave corners
        let points: Vec<Point<i32>> = [
            (10, 0), (20, 0), (20, 10), (30, 10), (30, 20), (20, 20),
            (20, 30), (10, 30), (10, 20), (0, 20), (0, 10), (10, 10),
        ]
        .iter()
        .map(|&(x, y)| Point::new(x, y))
        .collect();
        let hull = convex_hull_indices(&points);
        assert_eq!(hull.len(), 8);
        assert_eq!(convexity_defects(&points, &hull, 1.0), 4);
    }

    #[test]
    fn test_min_enclosing_circle() {
        let (center, radius) = min_enclosing_circle(&[[0.0, 0.0], [4.0, 0.0], [2.0, 1.0]]);
        assert!((center[0] - 2.0).abs() < 1e-9 && center[1].abs() < 1e-9);
        assert!((radius - 2.0).abs() < 1e-9);

        let (center, radius) = min_enclosing_circle(&[[0.0, 0.0], [2.0, 0.0], [0.0, 2.0], [2.0, 2.0]]);
        assert!((center[0] - 1.0).abs() < 1e-9 && (center[1] - 1.0).abs() < 1e-9);
        assert!((radius - 2f64.sqrt()).abs() < 1e-9);
    }
}
