//! Script filter argument parsing.
//!
//! The host passes the typed query as the only positional argument. Each
//! trailing `+` asks for one more page of results: `rust++` is page 3 of
//! `rust`.

/// Character whose repetitions encode the requested page.
pub const PAGE_MARKER: char = '+';

/// The query of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    raw: Option<String>,
    normalized: Option<String>,
    page_count: usize,
}

impl Query {
    /// Parse the positional argument, `None` when the host sent nothing.
    pub fn parse(raw: Option<String>) -> Self {
        match raw {
            Some(raw) => {
                let markers = raw.matches(PAGE_MARKER).count();
                let normalized = raw.replace(PAGE_MARKER, "");
                Self {
                    raw: Some(raw),
                    normalized: Some(normalized),
                    page_count: markers + 1,
                }
            }
            None => Self {
                raw: None,
                normalized: None,
                page_count: 1,
            },
        }
    }

    /// Take the first argument of an argument list (program name excluded).
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::parse(args.into_iter().next().map(Into::into))
    }

    /// The argument exactly as received, pagination markers included.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// The argument with every pagination marker removed.
    pub fn normalized(&self) -> Option<&str> {
        self.normalized.as_deref()
    }

    /// Requested page, starting at 1.
    pub fn page_count(&self) -> usize {
        self.page_count
    }
}
