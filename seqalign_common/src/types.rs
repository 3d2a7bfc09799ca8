use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Gap symbol accepted in sequences but never colored
pub const GAP: char = '-';

/// Chunk width used until the rendering surface has been measured
pub const DEFAULT_CHUNK_WIDTH: usize = 80;

/// Lifetime of the "copied" confirmation in milliseconds
pub const DEFAULT_COPY_NOTICE_MS: u64 = 1000;

/// 24-bit display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Physico-chemical class of an amino-acid residue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResidueClass {
    Cysteine,
    Hydrophobic,
    Glycine,
    NegativelyCharged,
    PositivelyCharged,
    PolarUncharged,
}

impl ResidueClass {
    pub const ALL: [ResidueClass; 6] = [
        ResidueClass::Cysteine,
        ResidueClass::Hydrophobic,
        ResidueClass::Glycine,
        ResidueClass::NegativelyCharged,
        ResidueClass::PositivelyCharged,
        ResidueClass::PolarUncharged,
    ];

    /// One-letter codes belonging to the class
    pub fn members(self) -> &'static str {
        match self {
            ResidueClass::Cysteine => "C",
            ResidueClass::Hydrophobic => "AILMFWYVP",
            ResidueClass::Glycine => "G",
            ResidueClass::NegativelyCharged => "DE",
            ResidueClass::PositivelyCharged => "KR",
            ResidueClass::PolarUncharged => "STHQN",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            ResidueClass::Cysteine => Rgb(0xFF, 0xEA, 0x00),
            ResidueClass::Hydrophobic => Rgb(0x67, 0xE4, 0xA6),
            ResidueClass::Glycine => Rgb(0xC4, 0xC4, 0xC4),
            ResidueClass::NegativelyCharged => Rgb(0xFC, 0x9C, 0xAC),
            ResidueClass::PositivelyCharged => Rgb(0xBB, 0x99, 0xFF),
            ResidueClass::PolarUncharged => Rgb(0x80, 0xBF, 0xFF),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResidueClass::Cysteine => "cysteine",
            ResidueClass::Hydrophobic => "hydrophobic",
            ResidueClass::Glycine => "glycine",
            ResidueClass::NegativelyCharged => "negatively charged",
            ResidueClass::PositivelyCharged => "positively charged",
            ResidueClass::PolarUncharged => "polar uncharged",
        }
    }

    pub fn of(ch: char) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.members().contains(ch))
    }
}

/// Immutable set of characters accepted by the input stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: BTreeSet<char>,
}

impl Alphabet {
    pub fn new(symbols: &str) -> Self {
        Self {
            symbols: symbols.chars().collect(),
        }
    }

    /// The twenty standard amino acids plus the gap symbol
    pub fn amino_acids() -> Self {
        let mut alphabet = Self::new("ARNDCEQGHILKMFPSTWYV");
        alphabet.symbols.insert(GAP);
        alphabet
    }

    pub fn contains(&self, ch: char) -> bool {
        self.symbols.contains(&ch)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::amino_acids()
    }
}

/// Immutable character to color mapping. Covers a subset of the alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    colors: HashMap<char, Rgb>,
}

impl ColorTable {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (char, Rgb)>,
    {
        Self {
            colors: pairs.into_iter().collect(),
        }
    }

    /// Residue-class coloring; the gap symbol is left unmapped
    pub fn amino_acids() -> Self {
        Self::from_pairs(ResidueClass::ALL.into_iter().flat_map(|class| {
            class.members().chars().map(move |ch| (ch, class.color()))
        }))
    }

    pub fn get(&self, ch: char) -> Option<Rgb> {
        self.colors.get(&ch).copied()
    }

    pub fn contains(&self, ch: char) -> bool {
        self.colors.contains_key(&ch)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::amino_acids()
    }
}

/// Monospaced font used to measure how many characters fit a surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    #[serde(default = "default_font_family")]
    pub family: String,

    /// Font size in pixels
    #[serde(default = "default_font_size")]
    pub size: f32,

    /// Horizontal advance of one glyph as a fraction of the font size
    #[serde(default = "default_advance_ratio")]
    pub advance_ratio: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: default_font_family(),
            size: default_font_size(),
            advance_ratio: default_advance_ratio(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chunk width used before the rendering surface is measured
    #[serde(default = "default_chunk_width")]
    pub default_chunk_width: usize,

    /// How long the "copied" confirmation stays visible
    #[serde(default = "default_copy_notice_ms")]
    pub copy_notice_ms: u64,

    /// Font metrics used for pixel-based width measurement
    #[serde(default)]
    pub font: FontConfig,

    /// Enable portable mode (config alongside binary)
    #[serde(default)]
    pub portable_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_chunk_width: default_chunk_width(),
            copy_notice_ms: default_copy_notice_ms(),
            font: FontConfig::default(),
            portable_mode: false,
        }
    }
}

fn default_chunk_width() -> usize {
    DEFAULT_CHUNK_WIDTH
}

fn default_copy_notice_ms() -> u64 {
    DEFAULT_COPY_NOTICE_MS
}

fn default_font_family() -> String {
    "monospace".to_string()
}

fn default_font_size() -> f32 {
    18.0
}

fn default_advance_ratio() -> f32 {
    0.6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amino_acid_alphabet() {
        let alphabet = Alphabet::amino_acids();
        assert_eq!(alphabet.len(), 21);
        assert!(alphabet.contains('A'));
        assert!(alphabet.contains(GAP));
        assert!(!alphabet.contains('B'));
        assert!(!alphabet.contains('a'));
    }

    #[test]
    fn test_color_table_covers_subset() {
        let alphabet = Alphabet::amino_acids();
        let table = ColorTable::amino_acids();
        assert_eq!(table.len(), 20);
        assert!(table.get(GAP).is_none());
        for ch in alphabet.iter().filter(|ch| *ch != GAP) {
            assert!(table.contains(ch), "{ch} should be colored");
        }
        assert_eq!(table.get('C'), Some(Rgb(0xFF, 0xEA, 0x00)));
        assert_eq!(table.get('K'), table.get('R'));
    }

    #[test]
    fn test_residue_classes_are_disjoint() {
        for ch in "ARNDCEQGHILKMFPSTWYV".chars() {
            let owners = ResidueClass::ALL
                .iter()
                .filter(|class| class.members().contains(ch))
                .count();
            assert_eq!(owners, 1, "{ch} belongs to {owners} classes");
        }
        assert_eq!(ResidueClass::of('G'), Some(ResidueClass::Glycine));
        assert_eq!(ResidueClass::of(GAP), None);
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb(0x67, 0xE4, 0xA6).to_hex(), "#67E4A6");
        assert_eq!(Rgb(0x0A, 0x0B, 0xFF).to_string(), "#0A0BFF");
    }

    #[test]
    fn test_config_defaults_from_empty_toml() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.default_chunk_width, DEFAULT_CHUNK_WIDTH);
        assert_eq!(config.copy_notice_ms, DEFAULT_COPY_NOTICE_MS);
        assert_eq!(config.font, FontConfig::default());
        assert!(!config.portable_mode);
    }

    #[test]
    fn test_config_partial_font_section() {
        let config: AppConfig = toml::from_str("[font]\nsize = 12.0\n").unwrap();
        assert_eq!(config.font.size, 12.0);
        assert_eq!(config.font.family, "monospace");
        assert_eq!(config.font.advance_ratio, 0.6);
    }
}
