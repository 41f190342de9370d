//! A column-aligned table of every word, one column per STEW field.

use crate::image::ConfigImage;
use prism_arch::FieldKind;
use prism_common::Bitmask;

/// Accumulates rows of cells and lays them out as a boxed table.
///
/// Cells are right-aligned to the widest entry of their column.
#[derive(Debug, Default)]
pub struct Columnizer {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Columnizer {
    /// Creates a table with the given column headers.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Appends a row. Missing trailing cells render empty.
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(String::len).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.len());
                } else {
                    widths.push(cell.len());
                }
            }
        }
        widths
    }

    /// Renders the table.
    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut split = String::from("+");
        for &w in &widths {
            split.push_str(&"-".repeat(w + 2));
            split.push('+');
        }
        split.push('\n');

        let line = |cells: &[String]| {
            let mut s = String::from("|");
            for (i, &w) in widths.iter().enumerate() {
                let cell = cells.get(i).map_or("", String::as_str);
                s.push_str(&format!(" {cell:>w$} |"));
            }
            s.push('\n');
            s
        };

        let mut out = split.clone();
        out.push_str(&line(&self.headers));
        out.push_str(&split);
        for row in &self.rows {
            out.push_str(&line(row));
        }
        out.push_str(&split);
        out
    }
}

/// Returns `prefix` followed by a letter for the `nth` field of its kind.
fn lettered(prefix: &str, nth: usize) -> String {
    match u8::try_from(nth).ok().filter(|&n| n < 26) {
        Some(n) => format!("{prefix}{}", char::from(b'A' + n)),
        None => format!("{prefix}{nth}"),
    }
}

/// Renders the image as a table with a column per multiplexer and per
/// non-multiplexer STEW field.
///
/// The last `Out` field is the default output and is headed plain `Out`;
/// the others are lettered in layout order, as are `Jmp` and `Cfg` fields.
pub fn render_list(image: &ConfigImage) -> String {
    let stew = image.stew();
    let muxes = image.muxes();
    let n_out = stew.count_of(FieldKind::Out);

    let mut headers = vec!["ST".to_string()];
    let mut seen = [0usize; 5];
    for item in &stew.items {
        let nth = seen[item.kind as usize];
        seen[item.kind as usize] += 1;
        match item.kind {
            FieldKind::Mux => headers.extend((0..muxes.count).map(|m| format!("Mux{m}"))),
            FieldKind::Inc => headers.push("Inc".to_string()),
            FieldKind::Jmp => headers.push(lettered("Jmp", nth)),
            FieldKind::Out if nth + 1 == n_out => headers.push("Out".to_string()),
            FieldKind::Out => headers.push(lettered("Out", nth)),
            FieldKind::Cfg => headers.push(lettered("Cfg", nth)),
        }
    }
    headers.push("STEW".to_string());

    let mut table = Columnizer::new(headers);
    for index in 0..image.word_count() {
        let word = image.word(index);
        let mut row = vec![format!("{index:x}")];
        for item in &stew.items {
            if item.kind == FieldKind::Mux {
                for m in 0..muxes.count {
                    let select = word.extract(item.offset + m * muxes.bits, muxes.bits);
                    row.push(select.to_hex(false));
                }
            } else {
                row.push(word.extract(item.offset, item.size).to_hex(false));
            }
        }
        row.push(word.to_hex(false));
        table.push_row(row);
    }
    table.render()
}
