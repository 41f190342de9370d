//! Implementation of the `prism layout` command.

use prism_bitstream::Columnizer;
use prism_common::PrismResult;
use prism_config::{load_or_fallback, ResolvedConfig};

use crate::GlobalArgs;

/// Runs the `prism layout` command.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let resolved = load_or_fallback(global.config_path());
    print!("{}", describe(&resolved)?);
    Ok(0)
}

/// Describes the multiplexer bank, the components with the multiplexers
/// wired to each of their pins, and the STEW word layout.
fn describe(resolved: &ResolvedConfig) -> PrismResult<String> {
    let cfg = &resolved.config;
    let wires = cfg.wire_map()?;
    let n_static = cfg.decision_tree.static_components.len();

    let mut out = format!(
        "Configuration: {} ({})\nMuxes: {} x {} bits ({} selectable inputs)\nImage: {} words x {} bits\n\n",
        cfg.title,
        resolved.name(),
        cfg.muxes.count,
        cfg.muxes.bits,
        cfg.muxes.inputs(),
        cfg.stew.count,
        cfg.stew.size,
    );

    let mut components = Columnizer::new(
        ["#", "Kind", "Role", "Pins", "Muxes"]
            .map(String::from)
            .to_vec(),
    );
    for (i, c) in cfg.components().enumerate() {
        let muxes: Vec<String> = (c.input_offset..c.input_offset + c.input_size)
            .map(|v| wires.lookup(v).to_string())
            .collect();
        components.push_row(vec![
            i.to_string(),
            format!("{:?}", c.kind).to_lowercase(),
            if i < n_static { "static" } else { "conditional" }.to_string(),
            format!("{}..{}", c.input_offset, c.input_offset + c.input_size),
            muxes.join(" "),
        ]);
    }
    out.push_str(&components.render());
    out.push('\n');

    let mut fields = Columnizer::new(["Field", "Offset", "Size"].map(String::from).to_vec());
    for item in &cfg.stew.items {
        fields.push_row(vec![
            item.kind.to_string(),
            item.offset.to_string(),
            item.size.to_string(),
        ]);
    }
    out.push_str(&fields.render());
    Ok(out)
}
