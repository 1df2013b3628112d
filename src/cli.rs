//! CLI argument definitions using clap derive macros.

use std::fmt;
use std::path::PathBuf;

use clap::Parser;

/// Download the files of a GitHub repository that match name patterns.
///
/// Repofetch walks the repository's web pages (no API quota needed for
/// public repositories), collects every file whose name matches one of the
/// patterns, and streams them into the output directory.
#[derive(Parser)]
#[command(name = "repofetch")]
#[command(author, version, about)]
pub struct Args {
    /// Repository reference (https://github.com/owner/repo or git@github.com:owner/repo.git)
    pub repository: String,

    /// Comma-separated extensions or file names (".py,.md,README.md")
    #[arg(short, long)]
    pub patterns: Option<String>,

    /// Directory to save files into (created if missing)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Access token sent as `Authorization: token <TOKEN>`
    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Save every file directly in the output directory instead of mirroring the tree
    #[arg(long)]
    pub flatten: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("repository", &self.repository)
            .field("patterns", &self.patterns)
            .field("output_dir", &self.output_dir)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("flatten", &self.flatten)
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .field("no_color", &self.no_color)
            .finish()
    }
}

impl Args {
    /// Returns the default tracing level implied by `-q` / `-v`.
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}
