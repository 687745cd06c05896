use serde::{Deserialize, Serialize};

/// 8-bit RGB colour as consumed by the external renderer.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend from `self` (t = 0) to `to` (t = 1). Channels are floored,
    /// `t` is clamped to [0, 1].
    pub fn lerp(self, to: Rgb, t: f64) -> Rgb {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let channel = |a: u8, b: u8| -> u8 {
            let v = a as f64 + (b as f64 - a as f64) * t;
            v.floor().clamp(0.0, 255.0) as u8
        };
        Rgb {
            r: channel(self.r, to.r),
            g: channel(self.g, to.g),
            b: channel(self.b, to.b),
        }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::Rgb;

    #[test]
    fn lerp_endpoints() {
        let a = Rgb::new(70, 70, 70);
        let b = Rgb::new(140, 140, 140);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn lerp_floors_and_clamps() {
        let a = Rgb::new(255, 255, 100);
        let b = Rgb::new(255, 146, 29);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(255, 200, 64));
        assert_eq!(a.lerp(b, 7.0), b);
        assert_eq!(a.lerp(b, f64::NAN), a);
    }

    #[test]
    fn displays_as_css_rgb() {
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "rgb(1, 2, 3)");
    }
}
