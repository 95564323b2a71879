use abstract_wallpaper::app::App;
use abstract_wallpaper::models::{AspectRatio, Config};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "abstract-wallpaper")]
#[command(about = "Generate abstract 4K wallpapers for desktop or mobile")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Interactive session (the default).
    Interactive,
    /// Generate one wallpaper and save it.
    Generate {
        /// Description of the abstract concept.
        prompt: String,
        /// desktop (16:9) or mobile (9:16); defaults from VIEWPORT_WIDTH.
        #[arg(long, value_parser = parse_ratio_arg)]
        ratio: Option<AspectRatio>,
        /// Directory to save into; defaults to OUTPUT_DIR.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn parse_ratio_arg(input: &str) -> std::result::Result<AspectRatio, String> {
    input.parse().map_err(|_| {
        format!(
            "Invalid ratio '{}'. Expected desktop, mobile, 16:9 or 9:16",
            input
        )
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "abstract_wallpaper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.unwrap_or(CliCommand::Interactive) {
        CliCommand::Interactive => {
            info!("Starting interactive session");
            let mut app = App::new(&config);
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            app.run_interactive(stdin, &mut stdout).await?;
        }
        CliCommand::Generate {
            prompt,
            ratio,
            output,
        } => {
            if let Some(output) = output {
                config.output_dir = output;
            }
            let mut app = App::new(&config);
            app.session_mut().set_prompt(prompt);
            if let Some(ratio) = ratio {
                app.session_mut().set_aspect_ratio(ratio);
            }

            match app.generate_once().await {
                Ok(path) => {
                    info!("Generation completed successfully");
                    println!("{}", path.display());
                }
                Err(e) => {
                    error!("Generation failed: {}", e);
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_ratio_arg;
    use abstract_wallpaper::models::AspectRatio;

    #[test]
    fn test_parse_ratio_arg_valid() {
        assert_eq!(parse_ratio_arg("mobile").unwrap(), AspectRatio::Tall);
        assert_eq!(parse_ratio_arg("16:9").unwrap(), AspectRatio::Wide);
    }

    #[test]
    fn test_parse_ratio_arg_invalid() {
        let err = parse_ratio_arg("4:3").unwrap_err();
        assert!(err.contains("desktop"));
    }
}
