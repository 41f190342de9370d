//! The PRISM configuration image and its text renderers.
//!
//! The state table compiler writes a [`ConfigImage`]: `count` STEW words of
//! `size` bits each. This crate owns that image and turns it into the
//! formats the chip loader and humans consume: a byte-addressed hex listing,
//! one hex line per word, a field-by-field table, and a C array.
//!
//! The main entry point is [`render`], which dispatches on [`OutputFormat`].

#![warn(missing_docs)]

pub mod c_array;
pub mod image;
pub mod listing;
pub mod text;

pub use image::ConfigImage;
pub use listing::Columnizer;

use prism_common::PrismResult;
use serde::{Deserialize, Serialize};

/// The text format an image is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Byte-addressed hex listing of the whole image.
    Hex,
    /// One line of hex per word.
    Tab,
    /// Column-aligned table of every field of every word.
    List,
    /// A `const uint32_t` C array.
    C,
}

impl OutputFormat {
    /// Returns the conventional file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Hex => "hex",
            OutputFormat::Tab => "tab",
            OutputFormat::List => "lst",
            OutputFormat::C => "c",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Hex => write!(f, "hex"),
            OutputFormat::Tab => write!(f, "tab"),
            OutputFormat::List => write!(f, "list"),
            OutputFormat::C => write!(f, "c"),
        }
    }
}

/// Renders `image` in `format`.
///
/// Only the hex listing can fail, when the word width is not byte aligned.
pub fn render(image: &ConfigImage, format: OutputFormat) -> PrismResult<String> {
    match format {
        OutputFormat::Hex => text::render_hex(image),
        OutputFormat::Tab => Ok(text::render_tab(image)),
        OutputFormat::List => Ok(listing::render_list(image)),
        OutputFormat::C => Ok(c_array::render_c(image)),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use prism_common::Bitmask;

    #[test]
    fn format_extension() {
        assert_eq!(OutputFormat::Hex.extension(), "hex");
        assert_eq!(OutputFormat::List.extension(), "lst");
        assert_eq!(OutputFormat::C.extension(), "c");
    }

    #[test]
    fn format_display() {
        assert_eq!(format!("{}", OutputFormat::Tab), "tab");
        assert_eq!(format!("{}", OutputFormat::List), "list");
    }

    #[test]
    fn format_serde_roundtrip() {
        let json = serde_json::to_string(&OutputFormat::C).unwrap();
        assert_eq!(json, "\"c\"");
        let back: OutputFormat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OutputFormat::C);
    }

    #[test]
    fn render_dispatches() {
        let mut image = testutil::small();
        image.word_mut(1).write_integer(0x00ff).unwrap();
        assert_eq!(render(&image, OutputFormat::Tab).unwrap(), "0000\n00ff\n");
        assert!(render(&image, OutputFormat::Hex).unwrap().starts_with("0000: 00 00 00 ff"));
        assert!(render(&image, OutputFormat::List).unwrap().contains("| STEW |"));
        assert!(render(&image, OutputFormat::C).unwrap().contains("0x000000ff"));
    }
}
