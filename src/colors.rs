// src/colors.rs

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::Path;

use palette::{FromColor, Lch, Srgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use tracing::warn;

/// RGB color assigned to one entity, stable for a whole render pass.
pub type Color = Srgb<u8>;

// Hand-picked from each design's palette.
fn seed_palette() -> Vec<(&'static str, Color)> {
    vec![
        ("Tauros", Srgb::new(0xDE, 0xA4, 0x4A)),
        ("Exeggutor", Srgb::new(0x73, 0xAC, 0x31)),
        ("Chansey", Srgb::new(0xFF, 0xAC, 0xAC)),
        ("Starmie", Srgb::new(0x8B, 0x73, 0xBD)),
        ("Snorlax", Srgb::new(0xE6, 0xC5, 0xAC)),
        ("Alakazam", Srgb::new(0xCD, 0xB4, 0x10)),
        ("Golem", Srgb::new(0x9C, 0x8B, 0x52)),
        ("Slowbro", Srgb::new(0xFF, 0x94, 0x94)),
        ("Jynx", Srgb::new(0xF6, 0x31, 0x5A)),
        ("Rhydon", Srgb::new(0x8B, 0x8B, 0x94)),
        ("Lapras", Srgb::new(0x39, 0x7B, 0xA4)),
        ("Jolteon", Srgb::new(0xFF, 0xDE, 0x52)),
        ("Gengar", Srgb::new(0x5A, 0x4A, 0x9C)),
        ("Zapdos", Srgb::new(0xD5, 0xAC, 0x08)),
        ("Machamp", Srgb::new(0x83, 0x8B, 0x94)),
        ("Victreebel", Srgb::new(0x8B, 0xC5, 0x7B)),
        ("Cloyster", Srgb::new(0xAC, 0x7B, 0xBD)),
        ("Dragonite", Srgb::new(0xEE, 0x9C, 0x39)),
        ("Hypno", Srgb::new(0xF6, 0xDE, 0x00)),
    ]
}

/// Entity → color registry with a curated seed and deterministic growth.
///
/// The registry is passed explicitly into the renderer; within one run the
/// same name always resolves to the same color. The caller decides whether
/// the grown registry is written back to disk afterwards.
pub struct ColorRegistry {
    colors: HashMap<String, Color>,
    generated: usize,
    rng: StdRng,
}

impl ColorRegistry {
    pub fn seeded() -> Self {
        let colors = seed_palette()
            .into_iter()
            .map(|(name, c)| (name.to_string(), c))
            .collect();
        Self {
            colors,
            generated: 0,
            rng: StdRng::seed_from_u64(42), // Seed for deterministic colors
        }
    }

    /// Number of names with an assigned color (seeded, loaded, generated).
    pub fn color_count(&self) -> usize {
        self.colors.len()
    }

    /// How many colors this run generated for previously unseen names.
    pub fn newly_generated(&self) -> usize {
        self.generated
    }

    /// Color for `name`, generating and recording one on first encounter.
    pub fn resolve(&mut self, name: &str) -> Color {
        if let Some(c) = self.colors.get(name) {
            return *c;
        }
        let c = self.generate();
        self.colors.insert(name.to_string(), c);
        self.generated += 1;
        c
    }

    // Bright random hue at fixed lightness and chroma. A few rejection
    // rounds keep a fresh color from landing on an exact duplicate of an
    // existing assignment.
    fn generate(&mut self) -> Color {
        let mut color = self.random_color();
        for _ in 0..16 {
            if !self.colors.values().any(|&existing| existing == color) {
                break;
            }
            color = self.random_color();
        }
        color
    }

    fn random_color(&mut self) -> Color {
        let hue = self.rng.gen_range(0.0f32..360.0f32);
        let srgb: Srgb<f32> = Srgb::from_color(Lch::new(70.0f32, 80.0f32, hue));
        let (r, g, b) = srgb.into_components();
        Srgb::new((r * 255.0f32) as u8, (g * 255.0f32) as u8, (b * 255.0f32) as u8)
    }

    /// Merge a palette file (JSON map of name → "#RRGGBB") over the seed.
    ///
    /// An absent or malformed file leaves the registry as seeded; bad
    /// individual entries are skipped.
    pub fn load_overrides(&mut self, path: &Path) {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => {
                warn!(path = %path.display(), "no palette file, using seed colors only");
                return;
            }
        };
        let doc: Value = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unparsable palette file, ignoring");
                return;
            }
        };
        let Some(entries) = doc.as_object() else {
            warn!(path = %path.display(), "palette file is not a map, ignoring");
            return;
        };
        for (name, value) in entries {
            match value.as_str().and_then(parse_hex) {
                Some(color) => {
                    self.colors.insert(name.clone(), color);
                }
                None => warn!(name = %name, "palette entry is not a #RRGGBB string, skipping"),
            }
        }
    }

    /// Write the full registry (seed, loaded, and generated entries) as a
    /// JSON map, sorted by name for stable diffs.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let map: BTreeMap<&str, String> = self
            .colors
            .iter()
            .map(|(name, &c)| (name.as_str(), to_hex(c)))
            .collect();
        let text = serde_json::to_string_pretty(&map).map_err(io::Error::other)?;
        fs::write(path, text)
    }
}

pub fn to_hex(c: Color) -> String {
    format!("#{:02X}{:02X}{:02X}", c.red, c.green, c.blue)
}

fn parse_hex(s: &str) -> Option<Color> {
    let s = s.strip_prefix('#')?;
    if s.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some(Srgb::new(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn curated_seed_is_present() {
        let mut registry = ColorRegistry::seeded();
        assert_eq!(registry.color_count(), 19);
        assert_eq!(registry.resolve("Tauros"), Srgb::new(0xDE, 0xA4, 0x4A));
        assert_eq!(registry.resolve("Hypno"), Srgb::new(0xF6, 0xDE, 0x00));
        assert_eq!(registry.newly_generated(), 0);
    }

    #[test]
    fn same_name_resolves_to_same_color() {
        let mut registry = ColorRegistry::seeded();
        let first = registry.resolve("Mewtwo");
        let second = registry.resolve("Mewtwo");
        assert_eq!(first, second);
        assert_eq!(registry.newly_generated(), 1);
    }

    #[test]
    fn seeded_names_do_not_generate() {
        let mut registry = ColorRegistry::seeded();
        let c = registry.resolve("Snorlax");
        assert_eq!(c, Srgb::new(0xE6, 0xC5, 0xAC));
        assert_eq!(registry.newly_generated(), 0);
    }

    #[test]
    fn distinct_new_names_get_distinct_colors() {
        let mut registry = ColorRegistry::seeded();
        let a = registry.resolve("Mew");
        let b = registry.resolve("Ditto");
        assert_ne!(a, b);
    }

    #[test]
    fn hex_round_trip() {
        let c = parse_hex("#DEA44A").unwrap();
        assert_eq!(to_hex(c), "#DEA44A");
        assert!(parse_hex("DEA44A").is_none());
        assert!(parse_hex("#XYZ123").is_none());
        assert!(parse_hex("#FFF").is_none());
    }

    #[test]
    fn palette_file_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("palette.json");

        let mut registry = ColorRegistry::seeded();
        let generated = registry.resolve("Articuno");
        registry.save(&path).unwrap();

        let mut reloaded = ColorRegistry::seeded();
        reloaded.load_overrides(&path);
        assert_eq!(reloaded.resolve("Articuno"), generated);
        assert_eq!(reloaded.resolve("Tauros"), Srgb::new(0xDE, 0xA4, 0x4A));
        assert_eq!(reloaded.newly_generated(), 0);
    }

    #[test]
    fn malformed_palette_file_leaves_seed_intact() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("palette.json");
        fs::write(&path, "][ not json").unwrap();

        let mut registry = ColorRegistry::seeded();
        registry.load_overrides(&path);
        assert_eq!(registry.color_count(), 19);
    }
}
