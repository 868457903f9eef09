//! Marker colors handed out to worms.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

/// The darkest value a randomly generated channel can take, so that worms
/// stand out against an empty (black) board.
pub const RANDOM_CHANNEL_MIN: u8 = 60;

/// Occupant marker written into every cell a worm covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Every channel uniform in `RANDOM_CHANNEL_MIN..=255`
    Random,
    /// Pick uniformly from a fixed list of colors
    Swatch(Vec<Rgb>),
}

impl Default for Palette {
    fn default() -> Self {
        Palette::Random
    }
}

impl Palette {
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgb {
        match self {
            Palette::Swatch(colors) => {
                if let Some(color) = colors.choose(rng) {
                    return *color;
                }
            }
            Palette::Random => (),
        }

        Rgb::new(
            rng.gen_range(RANDOM_CHANNEL_MIN..=u8::MAX),
            rng.gen_range(RANDOM_CHANNEL_MIN..=u8::MAX),
            rng.gen_range(RANDOM_CHANNEL_MIN..=u8::MAX),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn random_palette_never_goes_below_the_channel_floor() {
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..500 {
            let color = Palette::Random.pick(&mut rng);
            assert!(color.r >= RANDOM_CHANNEL_MIN);
            assert!(color.g >= RANDOM_CHANNEL_MIN);
            assert!(color.b >= RANDOM_CHANNEL_MIN);
        }
    }

    #[test]
    fn swatch_only_hands_out_its_own_colors() {
        let mut rng = SmallRng::seed_from_u64(42);
        let colors = vec![Rgb::new(255, 0, 0), Rgb::new(0, 255, 0)];
        let palette = Palette::Swatch(colors.clone());

        for _ in 0..100 {
            assert!(colors.contains(&palette.pick(&mut rng)));
        }
    }

    #[test]
    fn empty_swatch_falls_back_to_random_colors() {
        let mut rng = SmallRng::seed_from_u64(3);
        let color = Palette::Swatch(vec![]).pick(&mut rng);

        assert!(color.r >= RANDOM_CHANNEL_MIN);
    }

    #[test]
    fn rgb_displays_as_hex() {
        assert_eq!(Rgb::new(255, 16, 0).to_string(), "#ff1000");
    }
}
