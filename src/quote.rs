//! Quote-of-the-day panel state.

use crate::error::QuoteError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: u32,
    pub quote: String,
    pub author: String,
}

impl Quote {
    pub fn new(id: u32, quote: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id,
            quote: quote.into(),
            author: author.into(),
        }
    }

    /// Shown whenever a source cannot deliver.
    pub fn fallback() -> Self {
        Self::new(
            0,
            "The only way to do great work is to love what you do.",
            "Steve Jobs",
        )
    }
}

pub trait QuoteSource {
    fn fetch(&mut self) -> Result<Quote, QuoteError>;
}

/// Offline source cycling through a fixed list.
#[derive(Debug, Clone)]
pub struct StaticQuotes {
    quotes: Vec<Quote>,
    next: usize,
}

impl StaticQuotes {
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self { quotes, next: 0 }
    }
}

impl Default for StaticQuotes {
    fn default() -> Self {
        Self::new(vec![
            Quote::fallback(),
            Quote::new(1, "Well begun is half done.", "Aristotle"),
            Quote::new(
                2,
                "It always seems impossible until it's done.",
                "Nelson Mandela",
            ),
            Quote::new(
                3,
                "You don't have to see the whole staircase, just take the first step.",
                "Martin Luther King Jr.",
            ),
            Quote::new(4, "Simplicity is prerequisite for reliability.", "Edsger W. Dijkstra"),
        ])
    }
}

impl QuoteSource for StaticQuotes {
    fn fetch(&mut self) -> Result<Quote, QuoteError> {
        if self.quotes.is_empty() {
            return Err(QuoteError::Empty);
        }
        let quote = self.quotes[self.next % self.quotes.len()].clone();
        self.next = self.next.wrapping_add(1);
        Ok(quote)
    }
}

/// Identifies one quote request; later requests carry larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Failed,
    /// A newer request was started after this one; its result was dropped.
    Stale,
}

/// Holds the displayed quote. Only the most recently started request may
/// replace it, so a slow stale response can never overwrite a newer one.
#[derive(Debug, Default)]
pub struct QuoteSlot {
    current: Option<Quote>,
    loading: bool,
    issued: u64,
}

impl QuoteSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Quote> {
        self.current.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn begin(&mut self) -> RequestToken {
        self.issued += 1;
        self.loading = true;
        RequestToken(self.issued)
    }

    pub fn resolve(&mut self, token: RequestToken, result: Result<Quote, QuoteError>) -> Resolution {
        if token.0 != self.issued {
            tracing::debug!(token = token.0, latest = self.issued, "stale quote response dropped");
            return Resolution::Stale;
        }
        self.loading = false;
        match result {
            Ok(quote) => {
                self.current = Some(quote);
                Resolution::Applied
            }
            Err(err) => {
                tracing::warn!(error = %err, "quote fetch failed, using fallback");
                self.current = Some(Quote::fallback());
                Resolution::Failed
            }
        }
    }

    /// Starts and completes a request against a synchronous source.
    pub fn refresh<Q: QuoteSource + ?Sized>(&mut self, source: &mut Q) -> Resolution {
        let token = self.begin();
        let result = source.fetch();
        self.resolve(token, result)
    }
}
