use imageproc::contours::{find_contours, BorderType, Contour};
use tracing::debug;

use super::geometry::{
    approx_vertex_count, arc_length, contour_area, convex_hull_indices, convexity_defects,
    min_enclosing_circle,
};
use crate::{
    config::ShapeConfig,
    constants::shapes::MIN_HULL_POINTS,
    error::Result,
    traits::ShapePass,
    types::{RasterImage, ShapeCounts},
};

/// Edge contours classified by convexity and polygon vertex count.
///
/// The only pass that reports triangles, rectangles and circles.
#[derive(Debug, Clone)]
pub struct ContourShapePass {
    pub canny_low: f32,
    pub canny_high: f32,
    pub min_area: f64,
    pub epsilon_ratio: f64,
    pub circle_tolerance: f64,
    pub min_defects: usize,
    pub min_defect_depth: f64,
}

impl Default for ContourShapePass {
    fn default() -> Self {
        Self::new(&ShapeConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourClass {
    Triangle,
    Rectangle,
    Star,
    Circle,
    Unclassified,
}

impl ContourShapePass {
    pub fn new(config: &ShapeConfig) -> Self {
        Self {
            canny_low: config.canny_low,
            canny_high: config.canny_high,
            min_area: config.min_contour_area,
            epsilon_ratio: config.approx_epsilon_ratio,
            circle_tolerance: config.circle_area_tolerance,
            min_defects: config.min_star_defects,
            min_defect_depth: config.min_defect_depth,
        }
    }

    /// Classify one contour, or `None` when it is below the area floor
    pub fn classify(&self, contour: &Contour<i32>) -> Option<ContourClass> {
        let points = &contour.points;
        let area = contour_area(points);
        if area < self.min_area {
            return None;
        }

        // Concavity is the star signature; it overrides the vertex count
        let hull = convex_hull_indices(points);
        if hull.len() >= MIN_HULL_POINTS
            && convexity_defects(points, &hull, self.min_defect_depth) >= self.min_defects
        {
            return Some(ContourClass::Star);
        }

        let epsilon = self.epsilon_ratio * arc_length(points);
        let class = match approx_vertex_count(points, epsilon) {
            3 => ContourClass::Triangle,
            4 => ContourClass::Rectangle,
            5..=8 => ContourClass::Star,
            v if v > 8 => {
                let hull_points: Vec<[f64; 2]> = hull
                    .iter()
                    .map(|&i| [points[i].x as f64, points[i].y as f64])
                    .collect();
                let (_, radius) = min_enclosing_circle(&hull_points);
                let circle_area = std::f64::consts::PI * radius * radius;
                if circle_area > 0.0 && (area - circle_area).abs() / circle_area < self.circle_tolerance {
                    ContourClass::Circle
                } else {
                    ContourClass::Star
                }
            }
            _ => ContourClass::Unclassified,
        };
        Some(class)
    }
}

impl ShapePass for ContourShapePass {
    fn name(&self) -> &'static str {
        "contour"
    }

    fn detect(&self, image: &RasterImage) -> Result<ShapeCounts> {
        // Canny needs room for its smoothing and gradient kernels
        if image.width() < 3 || image.height() < 3 {
            return Ok(ShapeCounts::default());
        }

        let edges = imageproc::edges::canny(image.gray(), self.canny_low, self.canny_high);
        let contours = find_contours::<i32>(&edges);

        let mut counts = ShapeCounts::default();
        for contour in contours
            .iter()
            .filter(|c| c.parent.is_none() && c.border_type == BorderType::Outer)
        {
            match self.classify(contour) {
                Some(ContourClass::Triangle) => counts += ShapeCounts::new(0, 1, 0, 0, 0),
                Some(ContourClass::Rectangle) => counts += ShapeCounts::new(0, 0, 1, 0, 0),
                Some(ContourClass::Circle) => counts += ShapeCounts::new(1, 0, 0, 0, 0),
                Some(ContourClass::Star) => counts += ShapeCounts::stars(1),
                Some(ContourClass::Unclassified) | None => {}
            }
        }

        debug!(
            "Contour pass: {} external contours, {} classified",
            contours.iter().filter(|c| c.parent.is_none()).count(),
            counts.total_shapes
        );
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use imageproc::point::Point;

    /// Closed pixel ring through `vertices`, interpolated one step at a time
    fn ring(vertices: &[(i32, i32)]) -> Contour<i32> {
        let mut points = Vec::new();
        for (i, &(x0, y0)) in vertices.iter().enumerate() {
            let (x1, y1) = vertices[(i + 1) % vertices.len()];
            let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
            for s in 0..steps {
                let t = s as f64 / steps as f64;
                points.push(Point::new(
                    (x0 as f64 + t * (x1 - x0) as f64).round() as i32,
                    (y0 as f64 + t * (y1 - y0) as f64).round() as i32,
                ));
            }
        }
        Contour {
            points,
            border_type: BorderType::Outer,
            parent: None,
        }
    }

    /// Vertices of an `n`-gon inscribed in an axis-aligned ellipse, rounded
    fn inscribed(n: usize, (cx, cy): (f64, f64), rx: f64, ry: f64) -> Vec<(i32, i32)> {
        (0..n)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::TAU / n as f64;
                ((cx + rx * angle.cos()).round() as i32, (cy + ry * angle.sin()).round() as i32)
            })
            .collect()
    }

    #[test]
    fn test_many_sided_round_outline_is_a_circle() {
        let pass = ContourShapePass::default();
        let contour = ring(&inscribed(12, (100.0, 100.0), 80.0, 80.0));
        assert_eq!(pass.classify(&contour), Some(ContourClass::Circle));
    }

    #[test]
    fn test_many_sided_flat_outline_is_not_a_circle() {
        // Convex with twelve kept vertices, but far smaller than its enclosing circle
        let pass = ContourShapePass::default();
        let points = inscribed(12, (120.0, 80.0), 100.0, 60.0);
        let contour = ring(&points);
        let epsilon = pass.epsilon_ratio * arc_length(&contour.points);
        assert!(approx_vertex_count(&contour.points, epsilon) > 8);
        assert_eq!(pass.classify(&contour), Some(ContourClass::Star));
    }

    #[test]
    fn test_convex_pentagon_is_a_star() {
        let pass = ContourShapePass::default();
        let contour = ring(&inscribed(5, (80.0, 80.0), 60.0, 60.0));
        assert_eq!(pass.classify(&contour), Some(ContourClass::Star));
    }

    #[test]
    fn test_classifies_rectangle() {
        let pass = ContourShapePass::default();
        let contour = ring(&[(0, 0), (40, 0), (40, 25), (0, 25)]);
        assert_eq!(pass.classify(&contour), Some(ContourClass::Rectangle));
    }

    #[test]
    fn test_classifies_triangle() {
        let pass = ContourShapePass::default();
        let contour = ring(&[(0, 0), (40, 0), (20, 30)]);
        assert_eq!(pass.classify(&contour), Some(ContourClass::Triangle));
    }

    #[test]
    fn test_concave_outline_is_a_star() {
        let pass = ContourShapePass::default();
        let contour = ring(&[
            (10, 0), (20, 0), (20, 10), (30, 10), (30, 20), (20, 20),
            (20, 30), (10, 30), (10, 20), (0, 20), (0, 10), (10, 10),
        ]);
        assert_eq!(pass.classify(&contour), Some(ContourClass::Star));
    }

    #[test]
    fn test_small_contours_are_ignored() {
        let pass = ContourShapePass::default();
        assert_eq!(pass.classify(&ring(&[(0, 0), (5, 0), (5, 5), (0, 5)])), None);
    }

    #[test]
    fn test_uniform_image_has_no_contours() {
        let image = RasterImage::from_rgb(RgbImage::from_pixel(80, 60, Rgb([0, 0, 255])));
        let counts = ContourShapePass::default().detect(&image).unwrap();
        assert_eq!(counts, ShapeCounts::default());
    }

    #[test]
    fn test_tiny_image_is_skipped() {
        let image = RasterImage::from_rgb(RgbImage::from_pixel(2, 2, Rgb([255, 255, 255])));
        let counts = ContourShapePass::default().detect(&image).unwrap();
        assert_eq!(counts, ShapeCounts::default());
    }
}
