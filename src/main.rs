//! projection-morph - Main Entry Point
//!
//! Renders a labeled dataset morphing between 2-D projections as a looping GIF.

use clap::Parser;
use projection_morph::cli::{cmd_animate, cmd_config, cmd_demo, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "projection_morph=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Animate {
            data,
            label_column,
            projections,
            embeddings,
            output,
            config,
            frames,
            duration,
            width,
            height,
            hold,
            close_loop,
            no_repeat,
            parallel,
            colors,
            chrome,
        } => {
            cmd_animate(
                &data,
                &label_column,
                &projections,
                &embeddings,
                &output,
                config.as_deref(),
                frames,
                duration,
                (width, height),
                hold,
                close_loop,
                no_repeat,
                parallel,
                &colors,
                &chrome,
            )?;
        }
        Commands::Demo { output, points, seed } => {
            cmd_demo(&output, points, seed)?;
        }
        Commands::Config => {
            cmd_config()?;
        }
    }

    Ok(())
}
