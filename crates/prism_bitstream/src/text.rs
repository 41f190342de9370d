//! Plain-text dumps: a byte-addressed hex listing and one line per word.

use crate::image::ConfigImage;
use prism_common::{Bitmask, CompileError, PrismResult};

/// Nibbles per line of the hex listing (24 bytes).
const LINE_NIBBLES: usize = 48;

/// Renders the whole image as hex, most significant nibble first.
///
/// Every line starts with the byte address of its first byte and holds 24
/// bytes, each followed by a space. Fails unless the word width is a
/// multiple of 8 bits.
pub fn render_hex(image: &ConfigImage) -> PrismResult<String> {
    let width = image.stew().size;
    if width % 8 != 0 {
        return Err(CompileError::internal(format!(
            "hex output needs byte-aligned words, word width is {width}"
        )));
    }

    let bits = image.bits();
    let nibbles = bits.size() / 4;
    let mut out = String::new();
    for n in 0..nibbles {
        if n % LINE_NIBBLES == 0 {
            out.push_str(&format!("{:04x}: ", n >> 1));
        }
        let digit = bits.nibble(bits.size() - 4 * (n + 1));
        out.push(char::from_digit(u32::from(digit), 16).unwrap_or('?'));
        if n % 2 == 1 {
            out.push(' ');
        }
        if n % LINE_NIBBLES == LINE_NIBBLES - 1 {
            out.push('\n');
        }
    }
    if nibbles % LINE_NIBBLES != 0 {
        out.push('\n');
    }
    Ok(out)
}

/// Renders one line of hex digits per word, word 0 first.
pub fn render_tab(image: &ConfigImage) -> String {
    let mut out = String::new();
    for index in 0..image.word_count() {
        out.push_str(&image.word(index).to_hex(false));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::small;
    use prism_arch::{MuxConfig, Stew};

    #[test]
    fn hex_small_image() {
        let mut image = small();
        image.word_mut(0).write_integer(0xabcd).unwrap();
        image.word_mut(1).write_integer(0x1234).unwrap();
        assert_eq!(render_hex(&image).unwrap(), "0000: ab cd 12 34 \n");
    }

    #[test]
    fn hex_wraps_every_24_bytes() {
        let stew = Stew {
            count: 4,
            size: 64,
            items: Vec::new(),
        };
        let mut image = ConfigImage::new(stew, MuxConfig { bits: 1, count: 1 });
        image.word_mut(3).write_integer(0xff).unwrap();
        let text = render_hex(&image).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0000: 00 00 "));
        assert_eq!(lines[1], "0018: 00 00 00 00 00 00 00 ff ");
    }

    #[test]
    fn hex_addresses_every_line() {
        let stew = Stew {
            count: 9,
            size: 64,
            items: Vec::new(),
        };
        let image = ConfigImage::new(stew, MuxConfig { bits: 1, count: 1 });
        let text = render_hex(&image).unwrap();
        let addresses: Vec<&str> = text.lines().map(|l| &l[..6]).collect();
        assert_eq!(addresses, vec!["0000: ", "0018: ", "0030: "]);
        assert!(text.lines().all(|l| l.len() == 6 + 24 * 3));
    }

    #[test]
    fn hex_rejects_unaligned_words() {
        let stew = Stew {
            count: 2,
            size: 12,
            items: Vec::new(),
        };
        let image = ConfigImage::new(stew, MuxConfig { bits: 1, count: 1 });
        assert!(matches!(render_hex(&image), Err(CompileError::Internal { .. })));
    }

    #[test]
    fn tab_one_line_per_word() {
        let mut image = small();
        image.word_mut(0).write_integer(0xabcd).unwrap();
        image.word_mut(1).write_integer(0x0034).unwrap();
        assert_eq!(render_tab(&image), "abcd\n0034\n");
    }
}
