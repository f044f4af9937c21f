use crate::{
    algorithms::clustering::round2,
    types::{ShapeCounts, StripeProfile, SymbolicAnnotation},
};

/// Hand-tuned weights of the complexity score.
///
/// Stars and crosses also count toward `total_shapes`, so each one scores
/// its shape weight plus its own bonus.
pub mod weights {
    pub const PER_COLOR: f64 = 0.5;
    pub const PER_SHAPE: f64 = 2.0;
    pub const HORIZONTAL_STRIPES: f64 = 1.0;
    pub const VERTICAL_STRIPES: f64 = 1.0;
    pub const PER_STAR: f64 = 3.0;
    pub const PER_CROSS: f64 = 2.0;
    pub const PER_CIRCLE: f64 = 1.5;

    pub const HUMAN: f64 = 5.0;
    pub const ANIMAL: f64 = 4.0;
    pub const BUILDING: f64 = 4.0;
    pub const WEAPON: f64 = 3.0;
    pub const UNION_JACK: f64 = 3.0;
    pub const PLANT: f64 = 2.0;
    pub const CROSS_SYMBOL: f64 = 2.0;
    pub const CELESTIAL: f64 = 1.0;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityScorer;

impl ComplexityScorer {
    /// Linear visual-complexity score, rounded to two decimals
    pub fn score(
        &self,
        shapes: &ShapeCounts,
        stripes: &StripeProfile,
        unique_color_count: usize,
        symbolic: Option<&SymbolicAnnotation>,
    ) -> f64 {
        use weights::*;

        let flag = |present: bool, weight: f64| if present { weight } else { 0.0 };

        let mut score = unique_color_count as f64 * PER_COLOR
            + shapes.total_shapes as f64 * PER_SHAPE
            + flag(stripes.has_horizontal_stripes, HORIZONTAL_STRIPES)
            + flag(stripes.has_vertical_stripes, VERTICAL_STRIPES)
            + shapes.stars as f64 * PER_STAR
            + shapes.crosses as f64 * PER_CROSS
            + shapes.circles as f64 * PER_CIRCLE;

        if let Some(s) = symbolic {
            score += flag(s.has_human, HUMAN)
                + flag(s.has_animal, ANIMAL)
                + flag(s.has_building, BUILDING)
                + flag(s.has_weapon, WEAPON)
                + flag(s.has_union_jack, UNION_JACK)
                + flag(s.has_plant, PLANT)
                + flag(s.has_cross, CROSS_SYMBOL)
                + flag(s.has_celestial, CELESTIAL);
        }

        round2(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_tricolor() {
        let score = ComplexityScorer.score(&ShapeCounts::default(), &StripeProfile::default(), 3, None);
        assert_eq!(score, 1.5);
    }

    #[test]
    fn test_star_is_double_counted() {
        // 2 for the shape, 3 for the star, 0.5 per colour
        let score = ComplexityScorer.score(&ShapeCounts::stars(1), &StripeProfile::default(), 2, None);
        assert_eq!(score, 6.0);
    }

    #[test]
    fn test_full_formula() {
        let shapes = ShapeCounts::new(1, 1, 0, 2, 1);
        let stripes = StripeProfile {
            has_horizontal_stripes: true,
            has_vertical_stripes: true,
            ..Default::default()
        };
        // 0.5*4 + 2*5 + 1 + 1 + 3*2 + 2*1 + 1.5*1
        let score = ComplexityScorer.score(&shapes, &stripes, 4, None);
        assert_eq!(score, 23.5);
    }

    #[test]
    fn test_bands_do_not_score() {
        let stripes = StripeProfile {
            has_horizontal_bands: true,
            has_vertical_bands: true,
            ..Default::default()
        };
        assert_eq!(ComplexityScorer.score(&ShapeCounts::default(), &stripes, 0, None), 0.0);
    }

    #[test]
    fn test_symbolic_weights() {
        let all = SymbolicAnnotation {
            has_human: true,
            has_animal: true,
            has_plant: true,
            has_weapon: true,
            has_building: true,
            has_celestial: true,
            has_union_jack: true,
            has_cross: true,
            has_crescent: true,
            details: vec!["eagle".into()],
        };
        let score = ComplexityScorer.score(&ShapeCounts::default(), &StripeProfile::default(), 0, Some(&all));
        assert_eq!(score, 24.0);

        // An annotation with nothing set adds nothing
        let empty = SymbolicAnnotation::default();
        let score = ComplexityScorer.score(&ShapeCounts::default(), &StripeProfile::default(), 1, Some(&empty));
        assert_eq!(score, 0.5);
    }
}
