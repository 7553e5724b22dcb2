/*!
 * Search the Arch User Repository for a package.
 * Exact match -> print it, optionally download or build and install it.
 * No exact match -> page through the alternatives, most popular first.
 */
mod search_command;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use pt_core::logger::init_logger;
use pt_core::query::{AurClient, RequestType, AUR_URL, RPC_TIMEOUT};
use pt_core::{printerror, ConsolePrompter, DisplayOptions};

use crate::search_command::SearchCommand;

#[derive(Parser, Debug)]
#[command(name = "acheron", version, about = "Search for the pkg_name in the Arch User Repository")]
struct Cli {
    /// Package name
    pkg_name: String,

    /// Prints all info fields
    #[arg(short = 'l', long)]
    long_print: bool,

    /// Prints extra explanatory messages
    #[arg(short, long)]
    verbose: bool,

    /// If no exact match is found, print all alternatives
    #[arg(short, long)]
    all: bool,

    /// Maximum number of alternatives shown per page. Ignored with --all
    #[arg(short, long, default_value = "4")]
    entries_shown: NonZeroUsize,

    /// Download the package if an exact match was found
    #[arg(short, long)]
    download: bool,

    /// Download the package and install it using makepkg
    #[arg(short, long)]
    install: bool,

    /// Output directory for downloaded packages
    #[arg(short, long, default_value = "packages/")]
    output: PathBuf,

    /// Look the name up with an info query instead of a search
    #[arg(short = 'I', long)]
    info: bool,
}

impl Cli {
    fn display_options(&self) -> DisplayOptions {
        return DisplayOptions {
            long_print: self.long_print,
            verbose: self.verbose,
            show_all: self.all,
            page_size: self.entries_shown,
            download: self.download,
            install: self.install,
            output_dir: self.output.to_owned(),
        };
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let opts = cli.display_options();
    init_logger(opts.verbose);

    return match run(&cli.pkg_name, cli.info, opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            printerror!("{msg:#}");
            ExitCode::FAILURE
        }
    };
}

fn run(pkg_name: &str, info: bool, opts: DisplayOptions) -> anyhow::Result<()> {
    let client = AurClient::new(AUR_URL, RPC_TIMEOUT).context("Could not set up the AUR client")?;
    let request_type = if info { RequestType::Info } else { RequestType::Search };

    let mut cmd = SearchCommand::new(&client, opts);
    cmd.set_request_type(request_type);

    let mut stdout = std::io::stdout();
    return cmd.execute(pkg_name, &mut stdout, &mut ConsolePrompter);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["acheron", "yay"]);
        let opts = cli.display_options();
        assert_eq!(cli.pkg_name, "yay");
        assert_eq!(opts.page_size.get(), 4);
        assert_eq!(opts.output_dir, PathBuf::from("packages/"));
        assert!(!opts.long_print && !opts.verbose && !opts.show_all && !opts.download && !opts.install);
        assert!(!cli.info);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from(["acheron", "-l", "-v", "-a", "-e", "10", "-d", "-i", "-o", "/tmp/pkgs", "-I", "paru"]);
        let opts = cli.display_options();
        assert!(opts.long_print && opts.verbose && opts.show_all && opts.download && opts.install);
        assert_eq!(opts.page_size.get(), 10);
        assert_eq!(opts.output_dir, PathBuf::from("/tmp/pkgs"));
        assert!(cli.info);
    }

    #[test]
    fn test_page_size_must_be_positive() {
        assert!(Cli::try_parse_from(["acheron", "-e", "0", "yay"]).is_err());
        assert!(Cli::try_parse_from(["acheron", "-e", "many", "yay"]).is_err());
        assert!(Cli::try_parse_from(["acheron"]).is_err());
    }
}
