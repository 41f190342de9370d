//! Rendering the image as a compilable C array.

use crate::image::ConfigImage;
use prism_common::Bitmask;

const RULE: &str = "==============================================================";

/// Renders the image as a `const uint32_t` array named after the module.
///
/// Each word is split into 32-bit groups printed most significant first.
/// Words are emitted from the highest index down, matching the order the
/// loader shifts them into the chip. The array is followed by
/// `<module>_count`, the number of `uint32_t` entries, and `<module>_width`,
/// the word width in bits.
pub fn render_c(image: &ConfigImage) -> String {
    let module = image.module();
    let width = image.stew().size;
    let groups = width.div_ceil(32);

    let mut out = String::new();
    out.push_str(&format!(
        "/*\n{RULE}\nPRISM Downloadable Configuration\n\n\
         Input:    {module}\nConfig:   {}\n{RULE}\n*/\n\n\
         #include <stdint.h>\n\nconst uint32_t {module}[] =\n{{\n",
        image.config_name()
    ));

    for index in (0..image.word_count()).rev() {
        let word = image.word(index);
        out.push_str("   ");
        for g in (0..groups).rev() {
            let bits = (width - 32 * g).min(32);
            out.push_str(&format!("0x{:08x}, ", word.read_integer(32 * g, bits)));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "\n}};\nconst uint32_t {module}_count = {};\nconst uint32_t {module}_width = {width};\n",
        groups * image.word_count()
    ));
    out
}
