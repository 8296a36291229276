//! Continuation-token pagination for search results.
//!
//! The crawl is an explicit state machine. Every transition except the
//! network fetch is pure: [`SearchState::step`] decides, and the driver in
//! [`crate::search::Searcher`] performs whatever fetch the decision asks
//! for.
//!
//! ```text
//! Start ──fetch──▶ Extract ──▶ Accumulate ──▶ Decide ──▶ Done
//!                    ▲                          │
//!                    └─────────fetch────────────┘
//! ```
//!
//! Any error moves to `Failed`; results gathered so far are dropped.

use gplay_core::SearchResult;

use crate::error::ScraperError;
use crate::search::extract_results_page;

/// Upper bound on pages fetched by one crawl. Guards against a token that
/// cycles or a source that keeps answering with empty pages.
pub const MAX_PAGES: usize = 64;

/// Largest result count a single search may request.
pub const MAX_RESULTS: usize = 250;

/// Result count used when the caller does not ask for one.
pub const DEFAULT_RESULTS: usize = 20;

/// Records the initial page is assumed to hold. Follow-up `start` offsets
/// are relative to it.
const INITIAL_PAGE_SIZE: i64 = 49;

/// Records requested per follow-up page.
const FOLLOW_UP_PAGE_SIZE: i64 = 48;

/// Records and continuation token decoded from one results page.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsPage {
    pub results: Vec<SearchResult>,
    /// Non-empty token naming the next page; `None` on the last page.
    pub token: Option<String>,
}

/// Data carried between states.
#[derive(Debug, Clone, PartialEq)]
pub struct Crawl {
    results: Vec<SearchResult>,
    target: usize,
    clp: Option<String>,
    pages: usize,
}

impl Crawl {
    #[must_use]
    pub fn new(target: usize) -> Self {
        Self {
            results: Vec::new(),
            target,
            clp: None,
            pages: 0,
        }
    }

    #[must_use]
    pub fn accumulated(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn target(&self) -> usize {
        self.target
    }

    /// Pages extracted so far.
    #[must_use]
    pub fn pages(&self) -> usize {
        self.pages
    }

    #[must_use]
    pub fn clp(&self) -> Option<&str> {
        self.clp.as_deref()
    }

    /// Records the cluster parameter learned from the cluster landing page.
    pub fn set_clp(&mut self, clp: Option<String>) {
        self.clp = clp;
    }

    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.results.len() >= self.target
    }

    /// Accumulated results truncated to the target, in discovery order.
    #[must_use]
    pub fn finish(mut self) -> Vec<SearchResult> {
        self.results.truncate(self.target);
        self.results
    }
}

#[derive(Debug)]
pub enum SearchState {
    Start,
    Extract { body: String },
    Accumulate { page: Vec<SearchResult>, token: Option<String> },
    Decide { token: Option<String> },
    Done,
    Failed(ScraperError),
}

/// What the driver must do next.
#[derive(Debug)]
pub enum Transition {
    /// Move to the state without any I/O.
    To(SearchState),
    /// Fetch the initial results page, then extract it.
    FetchInitial,
    /// Fetch the page named by `token`, then extract it.
    FetchNext { token: String },
}

impl SearchState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }

    /// Advances the machine by one step. Terminal states map to themselves.
    #[must_use]
    pub fn step(self, crawl: &mut Crawl) -> Transition {
        match self {
            Self::Start => Transition::FetchInitial,
            Self::Extract { body } => {
                crawl.pages += 1;
                match extract_results_page(&body) {
                    Ok(page) => Transition::To(Self::Accumulate {
                        page: page.results,
                        token: page.token,
                    }),
                    Err(err) => Transition::To(Self::Failed(err)),
                }
            }
            Self::Accumulate { page, token } => {
                crawl.results.extend(page);
                Transition::To(Self::Decide { token })
            }
            Self::Decide { token } => decide(crawl, token),
            terminal @ (Self::Done | Self::Failed(_)) => Transition::To(terminal),
        }
    }
}

fn decide(crawl: &Crawl, token: Option<String>) -> Transition {
    let token = match token {
        Some(token) if !crawl.is_satisfied() => token,
        _ => return Transition::To(SearchState::Done),
    };
    if crawl.pages >= MAX_PAGES {
        return Transition::To(SearchState::Failed(ScraperError::PaginationLimit {
            max_pages: MAX_PAGES,
        }));
    }
    Transition::FetchNext { token }
}

/// Form fields of a follow-up page request.
///
/// The endpoint expects `num = 0` when exactly one initial page has been
/// read and 48 otherwise, and `start` counted from the end of the initial
/// page (negative while fewer than 49 results are in hand).
#[must_use]
pub fn follow_up_form(
    crawl: &Crawl,
    token: &str,
    lang: &str,
    country: &str,
) -> Vec<(String, String)> {
    let accumulated = i64::try_from(crawl.accumulated()).unwrap_or(i64::MAX);
    let num = if accumulated == INITIAL_PAGE_SIZE {
        0
    } else {
        FOLLOW_UP_PAGE_SIZE
    };
    let start = accumulated - INITIAL_PAGE_SIZE;

    let mut form = vec![
        ("num".to_owned(), num.to_string()),
        ("start".to_owned(), start.to_string()),
        ("pagTok".to_owned(), token.to_owned()),
    ];
    if let Some(clp) = crawl.clp() {
        form.push(("clp".to_owned(), clp.to_owned()));
    }
    form.extend([
        ("pagtt".to_owned(), "3".to_owned()),
        ("hl".to_owned(), lang.to_owned()),
        ("gl".to_owned(), country.to_owned()),
    ]);
    form
}
