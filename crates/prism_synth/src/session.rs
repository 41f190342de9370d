//! One compilation: a design module against one hardware configuration.

use crate::decision_tree::DecisionTree;
use crate::parse_context::ParseContextTree;
use prism_bitstream::ConfigImage;
use prism_common::PrismResult;
use prism_config::{HardwareConfig, ResolvedConfig};
use std::path::Path;
use tracing::info;

/// Holds what a compilation needs besides the design itself.
#[derive(Debug, Clone)]
pub struct CompileSession {
    module_name: String,
    config: ResolvedConfig,
}

impl CompileSession {
    /// Creates a session, loading the configuration at `config_path` or
    /// falling back to the built-in one.
    pub fn new(module_name: impl Into<String>, config_path: Option<&Path>) -> Self {
        Self::with_config(module_name, prism_config::load_or_fallback(config_path))
    }

    /// Creates a session with an already resolved configuration.
    pub fn with_config(module_name: impl Into<String>, config: ResolvedConfig) -> Self {
        Self {
            module_name: module_name.into(),
            config,
        }
    }

    /// Returns the module name.
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Returns the parameter set in use.
    pub fn config(&self) -> &HardwareConfig {
        &self.config.config
    }

    /// Returns the configuration file name used in report headers.
    pub fn config_name(&self) -> String {
        self.config.name()
    }

    /// Returns a blank image for this configuration, labelled with the
    /// module and configuration names.
    pub fn blank_image(&self) -> ConfigImage {
        let cfg = self.config();
        ConfigImage::new(cfg.stew.clone(), cfg.muxes)
            .with_labels(self.module_name.clone(), self.config_name())
    }

    /// Compiles the diagram into a configuration image.
    pub fn compile(&self, tree: &ParseContextTree) -> PrismResult<ConfigImage> {
        let dt = DecisionTree::new(self.config())?;
        let mut image = self.blank_image();
        tree.write_states(&dt, &mut image)?;
        info!(
            "compiled {} into {} words of {} bits",
            self.module_name,
            image.word_count(),
            image.stew().size
        );
        Ok(image)
    }
}
