//! CLI command definitions.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP render server
    Serve {
        /// Override the configured listen address
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Render one image through the cache
    Render {
        /// Action name, e.g. thumbnail
        action: String,

        /// Geometry, e.g. 100x50, 100 or x50
        geometry: String,

        /// Source path relative to the source root
        source: String,

        /// Write the rendered bytes here
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Compute the image URL and dimensions for a source
    Url {
        /// Source path or URL
        source: String,

        /// Action name
        action: String,

        /// Geometry
        geometry: String,

        /// Natural width of the source
        #[arg(long)]
        width: Option<u32>,

        /// Natural height of the source
        #[arg(long)]
        height: Option<u32>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,

    /// Print the default configuration file location
    Path,
}
