//! trirast command line front end
//!
//! Renders a RON scene (or the built-in demo) to a PNG image.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use trirast::config::{load_config, RenderConfig};
use trirast::output::save_png;
use trirast::rasterizer::Color;
use trirast::scene::{demo_scene, load_scene, scene_to_string};

#[derive(Parser)]
#[command(name = "trirast", version = trirast::VERSION, about = "Rasterize translucent triangles to PNG")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a scene to a PNG image
    Render {
        /// RON scene file; renders the built-in demo scene if omitted
        scene: Option<PathBuf>,

        /// Output PNG path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Canvas width in pixels
        #[arg(long)]
        width: Option<usize>,

        /// Canvas height in pixels
        #[arg(long)]
        height: Option<usize>,

        /// Background color as R,G,B
        #[arg(long)]
        background: Option<Color>,

        /// RON render config; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write the built-in demo scene as RON
    DumpScene {
        /// Output file; prints to stdout if omitted
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            scene,
            output,
            width,
            height,
            background,
            config,
        } => {
            let mut cfg = match config {
                Some(path) => load_config(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => RenderConfig::default(),
            };
            if let Some(w) = width {
                cfg.width = w;
            }
            if let Some(h) = height {
                cfg.height = h;
            }
            if let Some(bg) = background {
                cfg.background = bg;
            }
            if let Some(out) = output {
                cfg.output = out;
            }
            cfg.validate()?;

            let scene = match scene {
                Some(path) => load_scene(&path)
                    .with_context(|| format!("loading scene {}", path.display()))?,
                None => demo_scene()?,
            };

            let rendered = cfg.renderer().render(&scene);
            save_png(&rendered.buffer, cfg.background, &cfg.output)
                .with_context(|| format!("writing {}", cfg.output.display()))?;

            println!(
                "{}: {} triangles, {} skipped, {} pixels covered ({} blended, {} discarded)",
                cfg.output.display(),
                scene.len(),
                rendered.skipped.len(),
                rendered.buffer.occupied_count(),
                rendered.stats.blended,
                rendered.stats.discarded
            );
        }
        Command::DumpScene { output } => {
            let text = scene_to_string(&demo_scene()?)?;
            match output {
                Some(path) => fs::write(&path, text)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{text}"),
            }
        }
    }

    Ok(())
}
