use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use sprite_cli::{display_path, write_atomic};
use sprite_core::optimize::OptimizeConfig;
use sprite_core::script::create_iife_script;
use sprite_core::sprite::{generate_sprite, GenerateOptions};

/// SVG sprite generator CLI.
///
/// This binary is a thin wrapper around `sprite-core` (exposed in code as
/// `sprite_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "sprite-cli",
    version,
    about = "Combine a directory of SVG icons into one addressable sprite",
    long_about = None
)]
struct Cli {
    /// Directory containing the source icon files.
    #[arg(long = "icons", default_value = "./assets/icons")]
    icons: PathBuf,

    /// Path of the single output file to write.
    #[arg(long = "out", default_value = "dist/sprite.js")]
    out: PathBuf,

    /// Output format: "js" for a self-executing injection script, "svg" for
    /// the raw sprite document.
    #[arg(long = "format", default_value = "js")]
    format: String,

    /// Optional JSON file with optimizer settings, passed through to the
    /// sprite pipeline.
    #[arg(long = "optimizer-config")]
    optimizer_config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Js,
    Svg,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = parse_format(&cli.format)?;
    let optimizer = load_optimizer_config(cli.optimizer_config.as_deref())?;

    build_sprite(&cli.icons, &cli.out, format, optimizer)
}

/// Validated by hand rather than through clap's value enum so that an
/// invalid value exits with status 1 like every other pipeline failure.
fn parse_format(raw: &str) -> Result<OutputFormat> {
    match raw {
        "js" => Ok(OutputFormat::Js),
        "svg" => Ok(OutputFormat::Svg),
        other => bail!("invalid format \"{other}\": use \"js\" or \"svg\""),
    }
}

fn load_optimizer_config(path: Option<&Path>) -> Result<OptimizeConfig> {
    match path {
        None => Ok(OptimizeConfig::default()),
        Some(path) => {
            let body = fs::read_to_string(path).with_context(|| {
                format!("Failed to read optimizer config at {}", path.display())
            })?;
            serde_json::from_str(&body).with_context(|| {
                format!("Failed to parse optimizer config JSON at {}", path.display())
            })
        }
    }
}

/// Run the assembler, wrap the result for the requested format, and write
/// exactly one output file.
fn build_sprite(
    icons: &Path,
    out: &Path,
    format: OutputFormat,
    optimizer: OptimizeConfig,
) -> Result<()> {
    let options = GenerateOptions { icon_dir: icons.to_path_buf(), optimizer };
    let result = generate_sprite(&options)
        .with_context(|| format!("Failed to generate sprite from {}", icons.display()))?;

    let contents = match format {
        OutputFormat::Svg => result.sprite,
        OutputFormat::Js => create_iife_script(&result.sprite),
    };

    write_atomic(out, &contents)?;

    println!("[svg-sprite] Generated {} with {} icons", display_path(out), result.icon_count);
    Ok(())
}
