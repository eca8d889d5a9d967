//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding one `<id>.json` spec file per served feed.
    #[arg(long, env = "FUSEFEED_FEEDS_DIR", default_value = "feeds")]
    pub feeds_dir: PathBuf,

    /// Port to listen on.
    #[arg(short, long, env = "FUSEFEED_PORT")]
    pub port: Option<u16>,

    /// Enable debug-level logging.
    #[arg(short, long, action)]
    pub debug: bool,
}

impl Cli {
    pub fn feeds_dir(&self) -> PathBuf {
        self.feeds_dir.clone()
    }
}
