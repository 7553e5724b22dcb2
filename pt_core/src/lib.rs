pub mod error;
pub mod logger;
pub mod query;
pub mod query_result;
pub mod query_manager;
pub mod installer;

#[doc(hidden)]
pub use tracing;

use std::collections::VecDeque;
use std::io::{stdin, stdout, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use serde_json::{Map, Value};

pub use error::{AcquisitionError, QueryError};

/* FUNCTIONS */
pub fn get_cli_input(msg: &str) -> String {
    /*!
     * Print msg without a newline and read one line from stdin.
     * EOF or a read error count as an empty answer.
     */
    print!("{msg}");
    let _ = stdout().flush();

    let mut input = String::new();
    if stdin().read_line(&mut input).is_err() {
        return String::new();
    }
    return input.trim().to_string();
}

/* TRAITS */
/**
 * Anything that can ask the user a question.
 * The console is one, a closure is another, a scripted list of answers is a third.
 */
pub trait Prompter {
    fn ask(&mut self, msg: &str) -> String;

    /// [N,y] question. Anything but y/yes is a refusal.
    fn confirm(&mut self, msg: &str) -> bool {
        let input = self.ask(msg).trim().to_lowercase();
        return ["y", "yes"].contains(&input.as_str());
    }
}

impl<F> Prompter for F where F: FnMut(&str) -> String {
    fn ask(&mut self, msg: &str) -> String {
        return self(msg);
    }
}

/// Reads answers from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn ask(&mut self, msg: &str) -> String {
        return get_cli_input(msg);
    }
}

/// Replays canned answers and remembers every question. Runs dry as empty answers.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<'a, T>(answers: T) -> ScriptedPrompter where T: IntoIterator<Item = &'a str> {
        return ScriptedPrompter {
            answers: answers.into_iter().map(|x| x.to_string()).collect(),
            asked: Vec::new(),
        };
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, msg: &str) -> String {
        self.asked.push(msg.to_string());
        return self.answers.pop_front().unwrap_or_default();
    }
}

/* STRUCTS */
/**
 * One entry of the AUR `results` array.
 * Known keys are pulled out, the whole object stays in `fields` in upstream order.
 * Read-only once built.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    name: String,
    description: Option<String>,
    maintainer: Option<String>,
    version: Option<String>,
    popularity: Option<Value>,
    url_path: Option<String>,
    fields: Map<String, Value>,
}

/// Count and records as returned by the repository. Not cross-checked.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub total_count: usize,
    pub records: Vec<ResultRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Summary,
    FullDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireMode {
    DownloadOnly,
    DownloadAndInstall,
}

/// Built once from command line flags, read-only afterwards.
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub long_print: bool,
    pub verbose: bool,
    pub show_all: bool,
    pub page_size: NonZeroUsize,
    pub download: bool,
    pub install: bool,
    pub output_dir: PathBuf,
}

impl DisplayOptions {
    pub fn display_mode(&self) -> DisplayMode {
        return if self.long_print { DisplayMode::FullDetail } else { DisplayMode::Summary };
    }

    /// Install implies a download, so it wins when both are set.
    pub fn acquire_mode(&self) -> Option<AcquireMode> {
        if self.install {
            return Some(AcquireMode::DownloadAndInstall);
        }
        if self.download {
            return Some(AcquireMode::DownloadOnly);
        }
        return None;
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        return DisplayOptions {
            long_print: false,
            verbose: false,
            show_all: false,
            page_size: NonZeroUsize::new(4).unwrap_or(NonZeroUsize::MIN),
            download: false,
            install: false,
            output_dir: PathBuf::from("packages/"),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_answers() {
        let mut prompter = ScriptedPrompter::new(["y", " YES ", "n", "", "maybe"]);
        assert!(prompter.confirm("Download foo.tar.gz? [N,y] "));
        assert!(prompter.confirm("again"));
        assert!(!prompter.confirm("again"));
        assert!(!prompter.confirm("again"));
        assert!(!prompter.confirm("again"));
        // Out of answers
        assert!(!prompter.confirm("again"));
        assert_eq!(prompter.asked.len(), 6);
    }

    #[test]
    fn test_closure_prompter() {
        let mut count = 0;
        let mut prompter = |_: &str| { count += 1; "y".to_string() };
        assert!(prompter.confirm("Install package foo anyway? [N,y] "));
        assert_eq!(count, 1);
    }

    #[test]
    fn test_acquire_mode() {
        let mut opts = DisplayOptions::default();
        assert_eq!(opts.acquire_mode(), None);
        opts.download = true;
        assert_eq!(opts.acquire_mode(), Some(AcquireMode::DownloadOnly));
        opts.install = true;
        assert_eq!(opts.acquire_mode(), Some(AcquireMode::DownloadAndInstall));
        assert_eq!(opts.page_size.get(), 4);
        assert_eq!(opts.display_mode(), DisplayMode::Summary);
    }
}
