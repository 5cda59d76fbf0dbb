use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "coursera-free-filter")]
#[command(about = "Classify course links on saved Coursera pages as truly free, paid/preview or unknown")]
#[command(version)]
pub struct Args {
    /// JSON file overriding scanner weights, limits and URL rules
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan saved pages and print one JSON response per file
    Scan {
        /// HTML file or directory of saved pages
        path: PathBuf,

        /// Page URL used to resolve relative links (defaults to the page's canonical link)
        #[arg(long)]
        base_url: Option<String>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// List the truly free courses found in saved pages
    Free {
        /// HTML file or directory of saved pages
        path: PathBuf,

        /// Page URL used to resolve relative links (defaults to the page's canonical link)
        #[arg(long)]
        base_url: Option<String>,

        /// Open the listed courses in the default browser
        #[arg(long)]
        open: bool,

        /// Maximum number of courses to open
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Classify a block of text
    Classify {
        /// Text to classify
        text: String,

        /// Treat the text as carrying an exact "Free" badge
        #[arg(long)]
        free_badge: bool,

        /// Treat the text as carrying an exact "Preview" badge
        #[arg(long)]
        preview_badge: bool,
    },

    /// Print the canonical form of a URL
    Normalize {
        url: String,

        /// Base URL for relative input
        #[arg(long)]
        base_url: Option<String>,
    },
}
