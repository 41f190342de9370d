//! PRISM CLI, the command-line driver for the PRISM FSM compiler.
//!
//! Provides `prism compile` to turn a recorded design script into a
//! configuration image, `prism layout` to show the hardware parameters in
//! use, and `prism reset` to emit the image of an empty design.

#![warn(missing_docs)]

mod compile;
mod layout;

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use prism_bitstream::OutputFormat;
use tracing_subscriber::{fmt, EnvFilter};

/// PRISM, an FSM compiler for the PRISM programmable state machine fabric.
#[derive(Parser, Debug)]
#[command(name = "prism", version, about = "PRISM FSM compiler")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a hardware configuration file. The built-in LUT4+LUT4
    /// parameters are used when omitted or unreadable.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a design script into a configuration image.
    Compile(CompileArgs),
    /// Print the hardware layout in use.
    Layout,
    /// Emit the image of a design with no states.
    Reset(ResetArgs),
}

/// Arguments for the `prism compile` subcommand.
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// The design script (JSON) to compile.
    pub design: String,

    /// Output format of the image.
    #[arg(short, long, value_enum, default_value_t = FormatArg::Hex)]
    pub format: FormatArg,

    /// Write the image here instead of standard output.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the `prism reset` subcommand.
#[derive(Parser, Debug)]
pub struct ResetArgs {
    /// Module name used to label the image.
    #[arg(long, default_value = "reset")]
    pub module: String,

    /// Output format of the image.
    #[arg(short, long, value_enum, default_value_t = FormatArg::Hex)]
    pub format: FormatArg,

    /// Write the image here instead of standard output.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Image output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Byte-addressed hex listing.
    Hex,
    /// One hex line per word.
    Tab,
    /// Field-by-field table.
    List,
    /// A `const uint32_t` C array.
    C,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Hex => OutputFormat::Hex,
            FormatArg::Tab => OutputFormat::Tab,
            FormatArg::List => OutputFormat::List,
            FormatArg::C => OutputFormat::C,
        }
    }
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a hardware configuration file.
    pub config: Option<String>,
}

impl GlobalArgs {
    /// Returns the configuration path, if one was given.
    pub fn config_path(&self) -> Option<&Path> {
        self.config.as_deref().map(Path::new)
    }
}

/// Installs the log subscriber on stderr.
///
/// `--quiet` and `--verbose` win over `RUST_LOG`, which otherwise defaults
/// to `warn`.
fn init_logging(global: &GlobalArgs) {
    let filter = if global.quiet {
        EnvFilter::new("error")
    } else if global.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Compile(ref args) => compile::run(args, &global),
        Command::Layout => layout::run(&global),
        Command::Reset(ref args) => compile::reset(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_compile_default() {
        let cli = Cli::parse_from(["prism", "compile", "blink.json"]);
        match cli.command {
            Command::Compile(ref args) => {
                assert_eq!(args.design, "blink.json");
                assert_eq!(args.format, FormatArg::Hex);
                assert!(args.output.is_none());
            }
            _ => panic!("expected Compile command"),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_compile_with_args() {
        let cli = Cli::parse_from([
            "prism",
            "compile",
            "blink.json",
            "--format",
            "c",
            "-o",
            "blink.c",
            "--config",
            "lut4.toml",
        ]);
        match cli.command {
            Command::Compile(ref args) => {
                assert_eq!(args.format, FormatArg::C);
                assert_eq!(args.output.as_deref(), Some("blink.c"));
            }
            _ => panic!("expected Compile command"),
        }
        assert_eq!(cli.config.as_deref(), Some("lut4.toml"));
    }

    #[test]
    fn parse_layout() {
        let cli = Cli::parse_from(["prism", "--verbose", "layout"]);
        assert!(matches!(cli.command, Command::Layout));
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn parse_reset() {
        let cli = Cli::parse_from(["prism", "reset", "-q", "--format", "list"]);
        match cli.command {
            Command::Reset(ref args) => {
                assert_eq!(args.module, "reset");
                assert_eq!(args.format, FormatArg::List);
            }
            _ => panic!("expected Reset command"),
        }
        assert!(cli.quiet);
    }

    #[test]
    fn format_maps_to_renderer() {
        assert_eq!(OutputFormat::from(FormatArg::Tab), OutputFormat::Tab);
        assert_eq!(OutputFormat::from(FormatArg::List).extension(), "lst");
    }

    #[test]
    fn config_path() {
        let global = GlobalArgs {
            quiet: false,
            verbose: false,
            config: Some("hw/lut4.toml".to_string()),
        };
        assert_eq!(global.config_path(), Some(Path::new("hw/lut4.toml")));
    }
}
