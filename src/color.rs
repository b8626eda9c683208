/// Minimal CSS color parsing shared by theme detection and the rasterizer

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()` and a handful
    /// of named colors. Returns `None` for anything else.
    pub fn parse(input: &str) -> Option<Rgba> {
        let s = input.trim().to_ascii_lowercase();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(args) = s.strip_prefix("rgba(").or_else(|| s.strip_prefix("rgb(")) {
            return parse_functional(args.strip_suffix(')')?);
        }
        named(&s)
    }

    /// Relative luminance in 0..=1 (sRGB weights, no gamma correction)
    pub fn luminance(&self) -> f32 {
        (0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32) / 255.0
    }

    /// Source-over blend of `self` onto an opaque destination.
    pub fn blend_over(&self, dst: Rgba) -> Rgba {
        let a = self.a as u32;
        let inv = 255 - a;
        let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * inv + 127) / 255) as u8;
        Rgba::opaque(mix(self.r, dst.r), mix(self.g, dst.g), mix(self.b, dst.b))
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba::opaque(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
        6 => Some(Rgba::opaque(pair(0)?, pair(2)?, pair(4)?)),
        8 => Some(Rgba { r: pair(0)?, g: pair(2)?, b: pair(4)?, a: pair(6)? }),
        _ => None,
    }
}

fn parse_functional(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| s.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
    let alpha = match parts.get(3) {
        Some(a) => (a.parse::<f32>().ok()?.clamp(0.0, 1.0) * 255.0).round() as u8,
        None => 255,
    };
    Some(Rgba {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a: alpha,
    })
}

fn named(name: &str) -> Option<Rgba> {
    let c = match name {
        "white" => Rgba::WHITE,
        "black" => Rgba::BLACK,
        "transparent" => Rgba::TRANSPARENT,
        "red" => Rgba::opaque(255, 0, 0),
        "green" => Rgba::opaque(0, 128, 0),
        "blue" => Rgba::opaque(0, 0, 255),
        "gray" | "grey" => Rgba::opaque(128, 128, 128),
        "silver" => Rgba::opaque(192, 192, 192),
        "navy" => Rgba::opaque(0, 0, 128),
        "ivory" => Rgba::opaque(255, 255, 240),
        "beige" => Rgba::opaque(245, 245, 220),
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Rgba::parse("#fff"), Some(Rgba::WHITE));
        assert_eq!(Rgba::parse("#1E1E2e"), Some(Rgba::opaque(0x1e, 0x1e, 0x2e)));
        assert_eq!(Rgba::parse("#00000080").map(|c| c.a), Some(0x80));
        assert_eq!(Rgba::parse("#12345"), None);
        assert_eq!(Rgba::parse("#zzzzzz"), None);
    }

    #[test]
    fn parses_rgba_watermark_colors() {
        let c = Rgba::parse("rgba(255, 255, 255, 0.3)").unwrap();
        assert_eq!((c.r, c.g, c.b, c.a), (255, 255, 255, 77));
        assert_eq!(Rgba::parse("rgb(1, 2, 3)"), Some(Rgba::opaque(1, 2, 3)));
        assert_eq!(Rgba::parse("rgba(1, 2)"), None);
    }

    #[test]
    fn blend_over_respects_alpha() {
        let half_black = Rgba { r: 0, g: 0, b: 0, a: 128 };
        let out = half_black.blend_over(Rgba::WHITE);
        assert_eq!(out.r, 127);
        assert_eq!(Rgba::TRANSPARENT.blend_over(Rgba::WHITE), Rgba::WHITE);
    }
}
