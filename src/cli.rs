use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recommend movies similar to a title
    Recommend {
        /// Exact movie title (case-sensitive)
        title: String,

        /// Number of recommendations. Must be one of
        /// `recommend.allowed_results` in config.yaml.
        #[clap(short = 'n', long)]
        count: Option<usize>,

        /// Print JSON instead of text
        #[clap(long, default_value = "false")]
        json: bool,
    },
    /// List every title in the dataset, sorted
    Titles {},
    /// Show dataset statistics
    Stats {
        /// Print JSON instead of text
        #[clap(long, default_value = "false")]
        json: bool,
    },
}
