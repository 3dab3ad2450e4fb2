use std::process::ExitCode;

use anyhow::bail;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cinematch::artifacts::{ArtifactError, ArtifactStore};
use cinematch::config::{self, Config};
use cinematch::display::{self, Stats};
use cinematch::engine::RecommendError;

mod cli;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn missing_artifacts_help(err: &ArtifactError, config: &Config) -> String {
    let files = config.artifacts.files();
    format!(
        "{err}\n\nMake sure these files are in {}:\n  {}\n\n\
         Generate them by running the feature-extraction pipeline to the end, \
         or point artifacts.dir in {}/config.yaml at their location.",
        config.artifacts_dir().display(),
        files.all().join("\n  "),
        config.base_path().display(),
    )
}

fn main() -> anyhow::Result<ExitCode> {
    init_logging();
    let args = cli::Args::parse();

    let config = Config::load_with(config::base_path()?)?;
    let store = ArtifactStore::shared(&config.artifacts_dir(), config.artifacts.files());

    let artifacts = match store.load() {
        Ok(artifacts) => artifacts,
        Err(err) => {
            log::error!("{err}");
            eprintln!("{}", missing_artifacts_help(&err, &config));
            return Ok(ExitCode::FAILURE);
        }
    };

    match args.command {
        cli::Command::Recommend { title, count, json } => {
            let _span = tracing::info_span!("recommend", title = %title).entered();
            let rec_config = &config.recommend;

            let count = count.unwrap_or(rec_config.default_results);
            if !rec_config.allowed_results.contains(&count) {
                bail!(
                    "--count must be one of {:?}, got {count}",
                    rec_config.allowed_results
                );
            }

            match artifacts.recommend_with(&title, count, rec_config.parallel_threshold) {
                Ok(rec) if json => {
                    println!("{}", serde_json::to_string_pretty(&rec)?);
                }
                Ok(rec) => {
                    print!("{}", display::format_recommendation(&rec, count));
                }
                Err(RecommendError::NotFound(title)) => {
                    log::debug!("no title index entry for {title:?}");
                    eprintln!("Movie not found in the dataset.");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        cli::Command::Titles {} => {
            for title in artifacts.table().sorted_titles() {
                println!("{title}");
            }
        }

        cli::Command::Stats { json } => {
            let stats = Stats::of(&artifacts);
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", display::format_stats(&stats));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
