//! Configuration file loading and validation.

use crate::error::{ConfigError, ParseDiagnostic};
use crate::types::HardwareConfig;
use prism_arch::FieldKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Loads and validates a hardware configuration from `path`.
pub fn load_config(path: &Path) -> Result<HardwareConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content, &path.display().to_string())
}

/// Parses and validates a hardware configuration from a string.
///
/// `file` is used only to label parse diagnostics.
pub fn load_config_from_str(content: &str, file: &str) -> Result<HardwareConfig, ConfigError> {
    let config: HardwareConfig = toml::from_str(content).map_err(|e| {
        let offset = e.span().map_or(content.len(), |span| span.start);
        ConfigError::ParseError(ParseDiagnostic::at(file, content, offset, e.message()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// The configuration a compilation runs with, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// The parameter set.
    pub config: HardwareConfig,
    /// The file it was loaded from, or `None` for the built-in fallback.
    pub path: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Returns the file name used in report headers, or `"fallback"`.
    pub fn name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map_or_else(|| "fallback".to_string(), |n| n.to_string_lossy().into_owned())
    }
}

/// Loads `path` if given, falling back to the built-in parameter set when
/// no path is given or the file fails to load.
///
/// Load failures are reported through `tracing` and never abort.
pub fn load_or_fallback(path: Option<&Path>) -> ResolvedConfig {
    if let Some(path) = path {
        match load_config(path) {
            Ok(config) => {
                info!("loaded configuration \"{}\" from {}", config.title, path.display());
                return ResolvedConfig {
                    config,
                    path: Some(path.to_path_buf()),
                };
            }
            Err(err) => warn!("{err}"),
        }
    }
    info!("using fallback configuration");
    ResolvedConfig {
        config: HardwareConfig::fallback(),
        path: None,
    }
}

/// Widest multiplexer select accepted. The decision tree allocates one input
/// slot per selectable input, `1 << bits` of them.
pub const MAX_MUX_BITS: usize = 16;

/// Most pins a component may have. Its truth table has `1 << pins` entries.
pub const MAX_COMPONENT_PINS: usize = 16;

/// Validates that the configuration values are consistent.
fn validate_config(config: &HardwareConfig) -> Result<(), ConfigError> {
    let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

    let muxes = config.muxes;
    if muxes.count == 0 || muxes.bits == 0 {
        return invalid("mux configuration needs a nonzero size and count".to_string());
    }
    if muxes.bits > MAX_MUX_BITS {
        return invalid(format!(
            "mux size {} is too large; at most {MAX_MUX_BITS} bits are supported",
            muxes.bits
        ));
    }
    if let Some(&(v, mux)) = config.wiremap.iter().find(|&&(_, mux)| mux >= muxes.count) {
        return invalid(format!(
            "wire-map entry ({v}, {mux}) names a mux outside 0..{}",
            muxes.count
        ));
    }

    if config.decision_tree.static_components.is_empty() {
        return invalid("decision tree needs at least one static component".to_string());
    }
    if let Some(c) = config.components().find(|c| c.input_size > MAX_COMPONENT_PINS) {
        return invalid(format!(
            "component at offset {} has {} pins; at most {MAX_COMPONENT_PINS} are supported",
            c.input_offset, c.input_size
        ));
    }
    let mut windows: Vec<(usize, usize)> = config
        .components()
        .map(|c| (c.input_offset, c.input_size))
        .collect();
    windows.sort_unstable();
    let mut next = 0;
    for (offset, size) in windows {
        if offset != next {
            return invalid(format!(
                "component inputs must tile the virtual input space; expected offset {next}, found {offset}"
            ));
        }
        next = offset + size;
    }

    let stew = &config.stew;
    if stew.count == 0 || stew.size == 0 {
        return invalid("STEW needs a nonzero count and size".to_string());
    }
    if let Some(item) = stew.items.iter().find(|i| i.offset + i.size > stew.size) {
        return invalid(format!(
            "STEW {} field at {}+{} exceeds the {}-bit word",
            item.kind, item.offset, item.size, stew.size
        ));
    }
    match stew.field(FieldKind::Mux, 0) {
        None => return invalid("STEW has no mux field".to_string()),
        Some(item) if item.size < muxes.bits * muxes.count => {
            return invalid(format!(
                "STEW mux field holds {} bits, {} are needed",
                item.size,
                muxes.bits * muxes.count
            ));
        }
        Some(_) => {}
    }

    config
        .wire_map()
        .map(|_| ())
        .map_err(|e| ConfigError::ValidationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LUT4_LUT4: &str = r#"
title = "LUT4+LUT4"
version = "1.0"
wiremap = [[4, 3], [8, 0], [9, 1], [10, 2], [11, 3], [12, 5], [13, 6]]

[muxes]
size = 4
count = 7

[[decision-tree.static-components]]
type = "lut"
offset = 0
size = 4

[[decision-tree.static-components]]
type = "lut"
offset = 4
size = 4

[[decision-tree.conditional-components]]
type = "lut"
offset = 8
size = 2

[[decision-tree.conditional-components]]
type = "lut"
offset = 10
size = 2

[[decision-tree.conditional-components]]
type = "lut"
offset = 12
size = 2

[stew]
count = 48
size = 168
items = [
    { type = "inc", offset = 0, size = 1 },
    { type = "mux", offset = 1, size = 28 },
    { type = "jmp", offset = 29, size = 6 },
    { type = "jmp", offset = 35, size = 6 },
    { type = "out", offset = 65, size = 24 },
    { type = "out", offset = 89, size = 24 },
    { type = "out", offset = 41, size = 24 },
    { type = "cfg", offset = 121, size = 16 },
    { type = "cfg", offset = 137, size = 16 },
    { type = "cfg", offset = 153, size = 4 },
    { type = "cfg", offset = 157, size = 4 },
    { type = "cfg", offset = 161, size = 4 },
]
"#;

    #[test]
    fn parse_matches_fallback() {
        let mut config = load_config_from_str(LUT4_LUT4, "lut4.toml").unwrap();
        assert_eq!(config.version, "1.0");
        config.version.clear();
        assert_eq!(config, HardwareConfig::fallback());
    }

    #[test]
    fn parse_error_has_location() {
        let src = "title = \"x\"\n[muxes]\nsize = \ncount = 7\n";
        let err = load_config_from_str(src, "bad.toml").unwrap_err();
        match err {
            ConfigError::ParseError(diag) => {
                assert_eq!(diag.file, "bad.toml");
                assert_eq!(diag.line, 3);
                assert!(diag.to_string().starts_with("bad.toml:3:"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_component_type_is_a_parse_error() {
        let src = LUT4_LUT4.replacen("type = \"lut\"", "type = \"dsp\"", 1);
        let err = load_config_from_str(&src, "x.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn wiremap_out_of_range() {
        let src = LUT4_LUT4.replace("[13, 6]", "[13, 7]");
        let err = load_config_from_str(&src, "x.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("wire-map")));
    }

    #[test]
    fn gap_in_component_inputs() {
        let src = LUT4_LUT4.replace("offset = 12\nsize = 2", "offset = 13\nsize = 2");
        let err = load_config_from_str(&src, "x.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("tile")));
    }

    #[test]
    fn oversized_mux_is_rejected() {
        let src = LUT4_LUT4.replace("size = 4\ncount = 7", "size = 40\ncount = 7");
        let err = load_config_from_str(&src, "x.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("mux size 40")));
        assert!(err.to_string().contains("at most 16 bits"));
    }

    #[test]
    fn widest_mux_is_accepted_by_the_bound() {
        let src = LUT4_LUT4.replace("size = 4\ncount = 7", "size = 16\ncount = 7");
        let err = load_config_from_str(&src, "x.toml").unwrap_err();
        // passes the width bound, then fails on the 28-bit mux field
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("mux field")));
    }

    #[test]
    fn oversized_component_is_rejected() {
        let src = LUT4_LUT4.replace("offset = 12\nsize = 2", "offset = 12\nsize = 40");
        let err = load_config_from_str(&src, "x.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("40 pins")));
    }

    #[test]
    fn stew_item_outside_word() {
        let src = LUT4_LUT4.replace("offset = 161, size = 4", "offset = 165, size = 4");
        let err = load_config_from_str(&src, "x.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("exceeds")));
    }

    #[test]
    fn narrow_mux_field() {
        let src = LUT4_LUT4.replace("offset = 1, size = 28", "offset = 1, size = 20");
        let err = load_config_from_str(&src, "x.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("mux field")));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LUT4_LUT4.as_bytes()).unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.title, "LUT4+LUT4");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn broken_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"muxes = [").unwrap();
        let resolved = load_or_fallback(Some(file.path()));
        assert!(resolved.path.is_none());
        assert_eq!(resolved.config, HardwareConfig::fallback());
        assert_eq!(resolved.name(), "fallback");
    }

    #[test]
    fn good_file_is_named() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lut4.toml");
        std::fs::write(&path, LUT4_LUT4).unwrap();
        let resolved = load_or_fallback(Some(&path));
        assert_eq!(resolved.name(), "lut4.toml");
        assert_eq!(resolved.config.title, "LUT4+LUT4");
    }
}
