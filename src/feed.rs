//! Lazy, pull-based usage feed.
//!
//! The utilization API returns one page of records plus an optional
//! continuation token. [`UsageFeed`] hides that cursor behind an iterator:
//! consumers drain records until the sequence is exhausted without ever
//! holding an a-priori count. The feed is finite and non-restartable.

use crate::error::Result;
use crate::types::UsageRecord;

/// One page of utilization records. `continuation` is `None` on the final
/// page.
#[derive(Debug, Default)]
pub struct UsagePage {
    pub items: Vec<UsageRecord>,
    pub continuation: Option<String>,
}

/// Source of utilization pages. Implemented over HTTP by
/// [`PartnerClient`](crate::partner::PartnerClient); tests substitute an
/// in-memory source.
pub trait UsagePageSource {
    fn first_page(&self) -> Result<UsagePage>;
    fn next_page(&self, continuation: &str) -> Result<UsagePage>;
}

enum FeedState {
    Start,
    Draining(std::vec::IntoIter<UsageRecord>, Option<String>),
    Done,
}

/// Iterator over every record of every page, in page order and intra-page
/// order. The first error ends the iteration; the feed is fused afterwards.
pub struct UsageFeed<S> {
    source: S,
    state: FeedState,
}

impl<S: UsagePageSource> UsageFeed<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: FeedState::Start,
        }
    }

    fn advance(&mut self, page: Result<UsagePage>) -> Option<Result<UsageRecord>> {
        match page {
            Ok(page) => {
                self.state = FeedState::Draining(page.items.into_iter(), page.continuation);
                self.next()
            }
            Err(e) => {
                self.state = FeedState::Done;
                Some(Err(e))
            }
        }
    }
}

impl<S: UsagePageSource> Iterator for UsageFeed<S> {
    type Item = Result<UsageRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.state, FeedState::Done) {
            FeedState::Start => {
                let page = self.source.first_page();
                self.advance(page)
            }
            FeedState::Draining(mut items, continuation) => {
                if let Some(record) = items.next() {
                    self.state = FeedState::Draining(items, continuation);
                    return Some(Ok(record));
                }
                match continuation {
                    Some(token) => {
                        let page = self.source.next_page(&token);
                        self.advance(page)
                    }
                    None => None,
                }
            }
            FeedState::Done => None,
        }
    }
}
