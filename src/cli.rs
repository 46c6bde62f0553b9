use arrange_engine::Mode;
use clap::Parser;
use std::path::PathBuf;

/// Organize a pile of files into a tidy tree, by content, date or type.
///
/// Sources are never moved or modified: every file is hardlinked (or copied)
/// into the output directory.
#[derive(Debug, Parser)]
#[command(name = "arrange", version, about)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON), layered over the platform one.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,
    /// Files or directories to organize.
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,
    /// Directory the organized tree is created in.
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,
    /// How to group files. Defaults to the configured mode.
    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,
    /// JSON sidecar with analysis results, used in content mode.
    #[arg(long, value_name = "FILE")]
    pub analysis: Option<PathBuf>,
    /// Print the planned tree and exit without touching the output directory.
    #[arg(long)]
    pub dry_run: bool,
    /// Execute without asking for confirmation.
    #[arg(short, long)]
    pub yes: bool,
    /// Copy instead of hardlinking.
    #[arg(long)]
    pub copy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse() {
        let cli = Cli::try_parse_from(["arrange", "in", "more", "-o", "out", "--mode", "date", "--dry-run"]).unwrap();
        assert_eq!(cli.inputs, [PathBuf::from("in"), PathBuf::from("more")]);
        assert_eq!(cli.mode, Some(Mode::Date));
        assert!(cli.dry_run && !cli.yes && !cli.copy);
        assert!(Cli::try_parse_from(["arrange", "-o", "out"]).is_err());
        assert!(Cli::try_parse_from(["arrange", "in"]).is_err());
    }
}
