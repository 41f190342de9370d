//! Implementation of the `prism compile` and `prism reset` commands.

use std::fs;
use std::path::Path;

use prism_bitstream::{render, ConfigImage, OutputFormat};
use prism_synth::{CompileSession, DesignScript, ParseContextTree};
use tracing::info;

use crate::{CompileArgs, GlobalArgs, ResetArgs};

/// Runs the `prism compile` command.
///
/// Replays the design script, compiles it against the selected hardware
/// configuration and writes the rendered image.
pub fn run(args: &CompileArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let path = Path::new(&args.design);
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read design {}: {e}", path.display()))?;
    let script = DesignScript::from_json(&text)?;
    let tree = script.replay()?;

    let session = CompileSession::new(script.module.clone(), global.config_path());
    let image = session.compile(&tree)?;
    emit(&image, args.format.into(), args.output.as_deref())?;
    Ok(0)
}

/// Runs the `prism reset` command.
///
/// Compiles a design with no states, so every word stays put with all
/// outputs low.
pub fn reset(args: &ResetArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let session = CompileSession::new(args.module.clone(), global.config_path());
    let image = session.compile(&ParseContextTree::new())?;
    emit(&image, args.format.into(), args.output.as_deref())?;
    Ok(0)
}

/// Renders `image` to `output`, or to standard output when `None`.
fn emit(
    image: &ConfigImage,
    format: OutputFormat,
    output: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = render(image, format)?;
    match output {
        Some(path) => {
            fs::write(path, text).map_err(|e| format!("cannot write {path}: {e}"))?;
            info!("wrote {format} image to {path}");
        }
        None => print!("{text}"),
    }
    Ok(())
}
