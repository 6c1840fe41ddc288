use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_summarizer::cli::{Cli, Commands};
use yt_summarizer::config::Config;
use yt_summarizer::output;
use yt_summarizer::pipeline::{parse_url_list, AnalysisPipeline};
use yt_summarizer::summarize::SummaryType;
use yt_summarizer::utils;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "yt_summarizer=debug,ytsum=debug"
    } else {
        "yt_summarizer=info,ytsum=info"
    };

    // Initialize tracing; stdout is reserved for exports
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Analyze {
            url,
            analysis,
            format,
            output,
            save,
        } => {
            let api_key = Config::api_key()?;
            let pipeline =
                AnalysisPipeline::from_config(&config, &api_key)?.with_progress(!cli.quiet);
            let options = analysis.to_options(&config);

            tracing::info!("Starting analysis for URL: {}", url);

            let result = pipeline.analyze(&url, &options).await?;

            let path = match (output, save) {
                (Some(path), _) => Some(path),
                (None, true) => Some(PathBuf::from(utils::default_export_filename(
                    format,
                    &result.video.video_id,
                ))),
                (None, false) => None,
            };

            match path {
                Some(path) => {
                    output::save_to_file(&result, &path, format)?;
                    println!("Analysis saved to: {}", path.display());
                }
                None => output::print_to_console(&result, format)?,
            }
        }
        Commands::Batch {
            mut urls,
            file,
            analysis,
            format,
            output,
            save,
        } => {
            if let Some(file) = file {
                urls.extend(read_url_list(&file)?);
            }
            if urls.is_empty() {
                anyhow::bail!("No URLs given: pass them as arguments or with --file");
            }

            let api_key = Config::api_key()?;
            let pipeline =
                AnalysisPipeline::from_config(&config, &api_key)?.with_progress(!cli.quiet);
            let options = analysis.to_options(&config);

            tracing::info!("Starting batch analysis of {} videos", urls.len());

            let batch = pipeline.run_batch(&urls, &options).await;

            let path = match (output, save) {
                (Some(path), _) => Some(path),
                (None, true) => Some(PathBuf::from(utils::BATCH_EXPORT_FILENAME)),
                (None, false) => None,
            };

            match path {
                Some(path) => {
                    output::save_batch_to_file(&batch, &path, format)?;
                    println!("Batch results saved to: {}", path.display());
                }
                None => output::print_batch_to_console(&batch, format)?,
            }

            tracing::info!(
                "Processed {} of {} videos successfully",
                batch.success_count(),
                batch.len()
            );

            if batch.success_count() == 0 {
                anyhow::bail!("All {} videos failed", batch.len());
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                let path = Config::config_path()?;
                println!("Configuration file: {}", path.display());
                println!("Run `ytsum config --show` to see the current values.");
            }
        }
        Commands::SummaryTypes => {
            println!("Available summary types:");
            for summary_type in SummaryType::ALL {
                println!(
                    "  • {:<14} {} (~{} words)",
                    summary_type.to_string(),
                    summary_type.title(),
                    summary_type.target_words()
                );
            }
        }
    }

    Ok(())
}

/// Read a URL list from a file, or from stdin for "-"
fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read URLs from stdin")?;
        text
    } else {
        fs_err::read_to_string(path).context("Failed to read URL list")?
    };

    Ok(parse_url_list(&text))
}
