/*!
 * Turn a raw result set into something the user can act on.
 * resolver: pick the exact match, rank the rest.
 * browser: page through the ranked rest.
 */
pub mod resolver;
pub mod browser;

use crate::ResultRecord;

/// A name is either the exact match or an alternative, never both.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSet {
    pub exact_match: Option<ResultRecord>,
    /// Popularity, descending.
    pub alternatives: Vec<ResultRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseState {
    Idle,
    ShowingPage,
    AwaitingInput,
    Done,
}

/**
 * Pages over ranked alternatives.
 * `shown` is the boundary of everything rendered so far.
 */
#[derive(Debug)]
pub struct AlternativeBrowser<'a> {
    alternatives: &'a [ResultRecord],
    page_size: usize,
    shown: usize,
    state: BrowseState,
}
