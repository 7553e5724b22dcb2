/*!
 * Interactive paging over the alternatives of a search.
 *
 * Idle -> ShowingPage -> AwaitingInput -> ShowingPage | Done
 *
 * Enter (or anything that isn't q) shows the next page, q quits.
 * Once everything is shown the prompt turns into an end-of-list notice and any answer ends it.
 */
use std::io::Write;

use crate::query_manager::{AlternativeBrowser, BrowseState};
use crate::{DisplayMode, Prompter, ResultRecord};

const QUIT_SENTINEL: &str = "q";
pub const END_OF_LIST_MSG: &str = "No more entries. Press Enter to exit.";

impl<'a> AlternativeBrowser<'a> {
    pub fn new(alternatives: &'a [ResultRecord], page_size: usize) -> AlternativeBrowser<'a> {
        return AlternativeBrowser {
            alternatives,
            page_size: page_size.max(1),
            shown: 0,
            state: BrowseState::Idle,
        };
    }

    pub fn state(&self) -> BrowseState {
        return self.state;
    }

    pub fn remaining(&self) -> usize {
        return self.alternatives.len() - self.shown;
    }

    /// Move the boundary forward by one page and hand back the records in it.
    pub fn next_page(&mut self) -> &'a [ResultRecord] {
        let start = self.shown;
        self.shown = std::cmp::min(self.alternatives.len(), self.shown + self.page_size);
        self.state = BrowseState::ShowingPage;
        return &self.alternatives[start..self.shown];
    }

    pub fn prompt_msg(&self) -> String {
        return match self.remaining() {
            0 => END_OF_LIST_MSG.to_string(),
            remaining => format!("{remaining} more entries. Press Enter to show the next page or q to quit: "),
        };
    }

    /// Feed the user's answer. Returns the state it leads to.
    pub fn handle_input(&mut self, input: &str) -> BrowseState {
        let quit = input.trim().eq_ignore_ascii_case(QUIT_SENTINEL);
        self.state = if quit || self.remaining() == 0 {
            BrowseState::Done
        } else {
            BrowseState::ShowingPage
        };
        return self.state;
    }

    pub fn run(&mut self, mode: DisplayMode, out: &mut dyn Write, prompter: &mut dyn Prompter) -> std::io::Result<()> {
        if self.alternatives.is_empty() {
            self.state = BrowseState::Done;
            return Ok(());
        }

        while self.state != BrowseState::Done {
            for record in self.next_page() {
                record.print_entry(out, mode)?;
            }
            out.flush()?;

            self.state = BrowseState::AwaitingInput;
            let input = prompter.ask(&self.prompt_msg());
            self.handle_input(&input);
        }
        return Ok(());
    }
}

pub fn browse(
    alternatives: &[ResultRecord],
    page_size: usize,
    show_all: bool,
    mode: DisplayMode,
    out: &mut dyn Write,
    prompter: &mut dyn Prompter,
) -> std::io::Result<()> {
    /*!
     * Show alternatives page by page.
     * show_all prints everything at once and never prompts.
     */
    if show_all {
        for record in alternatives {
            record.print_entry(out, mode)?;
        }
        return Ok(());
    }
    return AlternativeBrowser::new(alternatives, page_size).run(mode, out, prompter);
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use crate::ScriptedPrompter;
    use super::*;

    fn records(count: usize) -> Vec<ResultRecord> {
        return (0..count).map(|i| {
            let Value::Object(fields) = json!({ "Name": format!("pkg{i}"), "Popularity": (count - i) as f64 }) else { panic!() };
            ResultRecord::from_fields(fields).unwrap()
        }).collect();
    }

    /// Names in the order they were printed.
    fn printed(out: Vec<u8>) -> Vec<String> {
        return String::from_utf8(out).unwrap()
            .lines()
            .filter(|line| !line.starts_with('\t'))
            .map(|line| line.to_string())
            .collect();
    }

    fn expected(count: usize) -> Vec<String> {
        return (0..count).map(|i| format!("pkg{i}")).collect();
    }

    #[test]
    fn test_three_pages_then_end_notice() {
        let alts = records(10);
        let mut out = Vec::new();
        let mut prompter = ScriptedPrompter::new(["", "", "whatever"]);
        browse(&alts, 4, false, DisplayMode::Summary, &mut out, &mut prompter).unwrap();

        assert_eq!(printed(out), expected(10));
        assert_eq!(prompter.asked.len(), 3);
        assert!(prompter.asked[0].starts_with("6 more entries"));
        assert!(prompter.asked[1].starts_with("2 more entries"));
        assert_eq!(prompter.asked[2], END_OF_LIST_MSG);
    }

    #[test]
    fn test_page_sizes() {
        let alts = records(10);
        let mut browser = AlternativeBrowser::new(&alts, 4);
        assert_eq!(browser.state(), BrowseState::Idle);
        assert_eq!(browser.next_page().len(), 4);
        assert_eq!(browser.next_page().len(), 4);
        assert_eq!(browser.next_page().len(), 2);
        assert_eq!(browser.remaining(), 0);
        assert_eq!(browser.prompt_msg(), END_OF_LIST_MSG);
        assert_eq!(browser.handle_input("anything"), BrowseState::Done);
    }

    #[test]
    fn test_coverage_for_many_sizes() {
        for count in 1..=13 {
            for page_size in 1..=6 {
                let alts = records(count);
                let mut out = Vec::new();
                let mut prompter = ScriptedPrompter::new([]);
                browse(&alts, page_size, false, DisplayMode::Summary, &mut out, &mut prompter).unwrap();

                assert_eq!(printed(out), expected(count), "count={count} page_size={page_size}");
                // One prompt per page, the last one is the end notice.
                let pages = (count + page_size - 1) / page_size;
                assert_eq!(prompter.asked.len(), pages, "count={count} page_size={page_size}");
                assert_eq!(prompter.asked.last().map(|x| x.as_str()), Some(END_OF_LIST_MSG));
            }
        }
    }

    #[test]
    fn test_quit_stops_paging() {
        let alts = records(10);
        let mut out = Vec::new();
        let mut prompter = ScriptedPrompter::new(["  Q  ", ""]);
        browse(&alts, 4, false, DisplayMode::Summary, &mut out, &mut prompter).unwrap();

        assert_eq!(printed(out), expected(4));
        assert_eq!(prompter.asked.len(), 1);
    }

    #[test]
    fn test_quit_on_second_page() {
        let alts = records(10);
        let mut out = Vec::new();
        let mut prompter = ScriptedPrompter::new(["", "q"]);
        browse(&alts, 4, false, DisplayMode::Summary, &mut out, &mut prompter).unwrap();
        assert_eq!(printed(out), expected(8));
    }

    #[test]
    fn test_show_all_never_prompts() {
        let alts = records(7);
        let mut out = Vec::new();
        let mut prompter = ScriptedPrompter::new([]);
        browse(&alts, 2, true, DisplayMode::Summary, &mut out, &mut prompter).unwrap();
        assert_eq!(printed(out), expected(7));
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn test_empty_alternatives() {
        let mut out = Vec::new();
        let mut prompter = ScriptedPrompter::new([]);
        browse(&[], 4, false, DisplayMode::Summary, &mut out, &mut prompter).unwrap();
        assert!(out.is_empty());
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn test_page_larger_than_list() {
        let alts = records(3);
        let mut out = Vec::new();
        let mut prompter = ScriptedPrompter::new([]);
        browse(&alts, 4, false, DisplayMode::FullDetail, &mut out, &mut prompter).unwrap();
        assert_eq!(printed(out), expected(3));
        assert_eq!(prompter.asked, vec![END_OF_LIST_MSG.to_string()]);
    }
}
