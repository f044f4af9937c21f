/// Colour categories and their representative points, in match order.
/// Ties go to the earlier entry.
pub const COLOR_CATEGORIES: &[(&str, &[[u8; 3]])] = &[
    ("red", &[[255, 0, 0], [220, 20, 60], [178, 34, 34], [255, 69, 0]]),
    ("blue", &[[0, 0, 255], [0, 0, 139], [25, 25, 112], [72, 61, 139]]),
    ("lightblue", &[[135, 206, 235], [173, 216, 230], [0, 191, 255], [30, 144, 255], [100, 149, 237]]),
    ("darkblue", &[[0, 0, 139], [25, 25, 112], [0, 0, 128], [72, 61, 139]]),
    ("green", &[[0, 255, 0], [34, 139, 34], [0, 128, 0], [124, 252, 0]]),
    ("lightgreen", &[[144, 238, 144], [152, 251, 152], [173, 255, 47], [127, 255, 0]]),
    ("darkgreen", &[[0, 100, 0], [34, 139, 34], [0, 128, 0], [85, 107, 47]]),
    ("yellow", &[[255, 255, 0], [255, 215, 0], [255, 165, 0], [255, 140, 0]]),
    ("white", &[[255, 255, 255], [248, 248, 255], [245, 245, 245]]),
    ("black", &[[0, 0, 0], [47, 79, 79], [25, 25, 112]]),
    ("orange", &[[255, 165, 0], [255, 140, 0], [255, 69, 0]]),
    ("purple", &[[128, 0, 128], [75, 0, 130], [138, 43, 226]]),
    ("pink", &[[255, 192, 203], [255, 20, 147], [219, 112, 147]]),
    ("brown", &[[139, 69, 19], [160, 82, 45], [210, 180, 140]]),
];

/// CSS3 extended colour keywords. Where two keywords share a value only one
/// is listed (cyan, magenta and the "gray" spellings).
const CSS3_COLORS: &[(&str, [u8; 3])] = &[
    ("aliceblue", [240, 248, 255]),
    ("antiquewhite", [250, 235, 215]),
    ("cyan", [0, 255, 255]),
    ("aquamarine", [127, 255, 212]),
    ("azure", [240, 255, 255]),
    ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]),
    ("black", [0, 0, 0]),
    ("blanchedalmond", [255, 235, 205]),
    ("blue", [0, 0, 255]),
    ("blueviolet", [138, 43, 226]),
    ("brown", [165, 42, 42]),
    ("burlywood", [222, 184, 135]),
    ("cadetblue", [95, 158, 160]),
    ("chartreuse", [127, 255, 0]),
    ("chocolate", [210, 105, 30]),
    ("coral", [255, 127, 80]),
    ("cornflowerblue", [100, 149, 237]),
    ("cornsilk", [255, 248, 220]),
    ("crimson", [220, 20, 60]),
    ("darkblue", [0, 0, 139]),
    ("darkcyan", [0, 139, 139]),
    ("darkgoldenrod", [184, 134, 11]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkkhaki", [189, 183, 107]),
    ("darkmagenta", [139, 0, 139]),
    ("darkolivegreen", [85, 107, 47]),
    ("darkorange", [255, 140, 0]),
    ("darkorchid", [153, 50, 204]),
    ("darkred", [139, 0, 0]),
    ("darksalmon", [233, 150, 122]),
    ("darkseagreen", [143, 188, 143]),
    ("darkslateblue", [72, 61, 139]),
    ("darkslategray", [47, 79, 79]),
    ("darkturquoise", [0, 206, 209]),
    ("darkviolet", [148, 0, 211]),
    ("deeppink", [255, 20, 147]),
    ("deepskyblue", [0, 191, 255]),
    ("dimgray", [105, 105, 105]),
    ("dodgerblue", [30, 144, 255]),
    ("firebrick", [178, 34, 34]),
    ("floralwhite", [255, 250, 240]),
    ("forestgreen", [34, 139, 34]),
    ("magenta", [255, 0, 255]),
    ("gainsboro", [220, 220, 220]),
    ("ghostwhite", [248, 248, 255]),
    ("gold", [255, 215, 0]),
    ("goldenrod", [218, 165, 32]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("greenyellow", [173, 255, 47]),
    ("honeydew", [240, 255, 240]),
    ("hotpink", [255, 105, 180]),
    ("indianred", [205, 92, 92]),
    ("indigo", [75, 0, 130]),
    ("ivory", [255, 255, 240]),
    ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]),
    ("lavenderblush", [255, 240, 245]),
    ("lawngreen", [124, 252, 0]),
    ("lemonchiffon", [255, 250, 205]),
    ("lightblue", [173, 216, 230]),
    ("lightcoral", [240, 128, 128]),
    ("lightcyan", [224, 255, 255]),
    ("lightgoldenrodyellow", [250, 250, 210]),
    ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lightpink", [255, 182, 193]),
    ("lightsalmon", [255, 160, 122]),
    ("lightseagreen", [32, 178, 170]),
    ("lightskyblue", [135, 206, 250]),
    ("lightslategray", [119, 136, 153]),
    ("lightsteelblue", [176, 196, 222]),
    ("lightyellow", [255, 255, 224]),
    ("lime", [0, 255, 0]),
    ("limegreen", [50, 205, 50]),
    ("linen", [250, 240, 230]),
    ("maroon", [128, 0, 0]),
    ("mediumaquamarine", [102, 205, 170]),
    ("mediumblue", [0, 0, 205]),
    ("mediumorchid", [186, 85, 211]),
    ("mediumpurple", [147, 112, 219]),
    ("mediumseagreen", [60, 179, 113]),
    ("mediumslateblue", [123, 104, 238]),
    ("mediumspringgreen", [0, 250, 154]),
    ("mediumturquoise", [72, 209, 204]),
    ("mediumvioletred", [199, 21, 133]),
    ("midnightblue", [25, 25, 112]),
    ("mintcream", [245, 255, 250]),
    ("mistyrose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]),
    ("navajowhite", [255, 222, 173]),
    ("navy", [0, 0, 128]),
    ("oldlace", [253, 245, 230]),
    ("olive", [128, 128, 0]),
    ("olivedrab", [107, 142, 35]),
    ("orange", [255, 165, 0]),
    ("orangered", [255, 69, 0]),
    ("orchid", [218, 112, 214]),
    ("palegoldenrod", [238, 232, 170]),
    ("palegreen", [152, 251, 152]),
    ("paleturquoise", [175, 238, 238]),
    ("palevioletred", [219, 112, 147]),
    ("papayawhip", [255, 239, 213]),
    ("peachpuff", [255, 218, 185]),
    ("peru", [205, 133, 63]),
    ("pink", [255, 192, 203]),
    ("plum", [221, 160, 221]),
    ("powderblue", [176, 224, 230]),
    ("purple", [128, 0, 128]),
    ("red", [255, 0, 0]),
    ("rosybrown", [188, 143, 143]),
    ("royalblue", [65, 105, 225]),
    ("saddlebrown", [139, 69, 19]),
    ("salmon", [250, 128, 114]),
    ("sandybrown", [244, 164, 96]),
    ("seagreen", [46, 139, 87]),
    ("seashell", [255, 245, 238]),
    ("sienna", [160, 82, 45]),
    ("silver", [192, 192, 192]),
    ("skyblue", [135, 206, 235]),
    ("slateblue", [106, 90, 205]),
    ("slategray", [112, 128, 144]),
    ("snow", [255, 250, 250]),
    ("springgreen", [0, 255, 127]),
    ("steelblue", [70, 130, 180]),
    ("tan", [210, 180, 140]),
    ("teal", [0, 128, 128]),
    ("thistle", [216, 191, 216]),
    ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]),
    ("violet", [238, 130, 238]),
    ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]),
    ("whitesmoke", [245, 245, 245]),
    ("yellow", [255, 255, 0]),
    ("yellowgreen", [154, 205, 50]),
];

/// Strictly darker than this on every channel is black
const BLACK_MAX_CHANNEL: i32 = 40;

/// Maps RGB triples to colour names.
///
/// Order of resolution:
/// 1. exact CSS3 keyword
/// 2. nearest category point (squared Euclidean distance)
/// 3. overrides, applied in this order:
///    - every channel below 40 is black
///    - blue-dominant: light/dark blue when B > 180 and R + G < 200, else blue when B > 120
///    - green-dominant with G > 180 and R + B < 200: light/dark green
///    - a nearest match of black that failed the darkness test falls back to the
///      nearest non-black category
///
/// The order is part of the output contract; changing it changes stored names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorNamer;

impl ColorNamer {
    pub fn name_color(&self, rgb: [u8; 3]) -> String {
        self.category(rgb).to_string()
    }

    pub fn category(&self, rgb: [u8; 3]) -> &'static str {
        if let Some(name) = exact_name(rgb) {
            return name;
        }

        let closest = nearest_category(rgb, None);
        let [r, g, b] = rgb.map(i32::from);

        if r.max(g).max(b) < BLACK_MAX_CHANNEL {
            return "black";
        }

        if b > r && b > g {
            if b > 180 && r + g < 200 {
                return if r > 100 || g > 100 { "lightblue" } else { "darkblue" };
            } else if b > 120 {
                return "blue";
            }
        }

        if g > r && g > b && g > 180 && r + b < 200 {
            return if r > 100 || b > 100 { "lightgreen" } else { "darkgreen" };
        }

        if closest == "black" {
            return nearest_category(rgb, Some("black"));
        }

        closest
    }
}

/// Exact CSS3 keyword for `rgb`, if there is one
pub fn exact_name(rgb: [u8; 3]) -> Option<&'static str> {
    CSS3_COLORS
        .iter()
        .find(|(_, value)| *value == rgb)
        .map(|(name, _)| *name)
}

fn distance_sq(a: [u8; 3], b: [u8; 3]) -> i32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            d * d
        })
        .sum()
}

/// Nearest category by squared distance to any of its points, optionally
/// skipping one category
pub fn nearest_category(rgb: [u8; 3], exclude: Option<&str>) -> &'static str {
    let mut best = ("unknown", i32::MAX);
    for &(category, points) in COLOR_CATEGORIES {
        if exclude == Some(category) {
            continue;
        }
        for &point in points {
            let d = distance_sq(rgb, point);
            if d < best.1 {
                best = (category, d);
            }
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_css_names_win() {
        let namer = ColorNamer;
        assert_eq!(namer.name_color([255, 0, 0]), "red");
        assert_eq!(namer.name_color([255, 255, 255]), "white");
        assert_eq!(namer.name_color([0, 0, 255]), "blue");
        assert_eq!(namer.name_color([0, 0, 128]), "navy");
        assert_eq!(namer.name_color([220, 20, 60]), "crimson");
    }

    #[test]
    fn test_gray_spellings() {
        let namer = ColorNamer;
        assert_eq!(namer.name_color([128, 128, 128]), "gray");
        assert_eq!(namer.name_color([169, 169, 169]), "darkgray");
        assert_eq!(namer.name_color([105, 105, 105]), "dimgray");
        assert_eq!(namer.name_color([211, 211, 211]), "lightgray");
        assert_eq!(namer.name_color([112, 128, 144]), "slategray");
        assert_eq!(namer.name_color([119, 136, 153]), "lightslategray");
        assert_eq!(namer.name_color([47, 79, 79]), "darkslategray");
    }

    #[test]
    fn test_very_dark_is_always_black() {
        let namer = ColorNamer;
        for r in (0..40u8).step_by(3) {
            for g in (0..40u8).step_by(5) {
                for b in (0..40u8).step_by(7) {
                    assert_eq!(namer.name_color([r, g, b]), "black", "rgb({r}, {g}, {b})");
                }
            }
        }
        assert_eq!(namer.name_color([39, 39, 39]), "black");
    }

    #[test]
    fn test_dark_grey_is_not_black() {
        // Nearest point is black's (47, 79, 79) but it is not dark enough
        let name = ColorNamer.name_color([60, 60, 60]);
        assert_ne!(name, "black");
        assert_eq!(name, nearest_category([60, 60, 60], Some("black")));
    }

    #[test]
    fn test_blue_overrides() {
        let namer = ColorNamer;
        assert_eq!(namer.name_color([30, 60, 200]), "darkblue");
        assert_eq!(namer.name_color([120, 60, 200]), "lightblue");
        assert_eq!(namer.name_color([90, 110, 150]), "blue");
        // Blue-dominant but too dim for either rule
        assert_ne!(namer.name_color([40, 50, 110]), "lightblue");
    }

    #[test]
    fn test_green_overrides() {
        let namer = ColorNamer;
        assert_eq!(namer.name_color([50, 200, 60]), "darkgreen");
        assert_eq!(namer.name_color([110, 210, 60]), "lightgreen");
    }

    #[test]
    fn test_nearest_category_ties_prefer_earlier_entry() {
        // (0, 0, 139) is listed under both blue and darkblue
        assert_eq!(nearest_category([0, 0, 140], None), "blue");
        assert_eq!(nearest_category([0, 0, 140], Some("blue")), "darkblue");
    }
}
