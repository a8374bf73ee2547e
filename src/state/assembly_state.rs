/// Assembly state definitions for tracking one article through the pipeline
///
/// Every URL walks `Dialing → TitleExtraction → TimeExtraction →
/// ContentExtraction → Translation → Done`; any active state may instead
/// end in `Rejected` or `Failed`.
use std::fmt;

/// Represents where an article currently is in the assembly pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssemblyState {
    // ===== Active States =====
    /// Fetching the article page
    Dialing,

    /// Reading and cleaning the `<title>`
    TitleExtraction,

    /// Locating the publish time and checking freshness
    TimeExtraction,

    /// Running the section extractor over the page body
    ContentExtraction,

    /// Formatting and converting the content script
    Translation,

    // ===== Terminal States =====
    /// Article fully assembled
    Done,

    /// Valid fetch, but the article must not be stored
    Rejected,

    /// Article could not be assembled
    Failed,
}

impl AssemblyState {
    /// Returns true if no further processing happens from this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Rejected | Self::Failed)
    }

    /// Returns true if this state is still part of the pipeline
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// The state that follows this one on the success path
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Dialing => Some(Self::TitleExtraction),
            Self::TitleExtraction => Some(Self::TimeExtraction),
            Self::TimeExtraction => Some(Self::ContentExtraction),
            Self::ContentExtraction => Some(Self::Translation),
            Self::Translation => Some(Self::Done),
            Self::Done | Self::Rejected | Self::Failed => None,
        }
    }

    /// Returns true if moving from `self` to `to` is a legal transition
    ///
    /// Rejection is only possible once the page has been fetched: a dial
    /// either fails or yields a page.
    pub fn can_transition_to(&self, to: Self) -> bool {
        match to {
            Self::Failed => self.is_active(),
            Self::Rejected => self.is_active() && *self != Self::Dialing,
            _ => self.next() == Some(to),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dialing => "dialing",
            Self::TitleExtraction => "title_extraction",
            Self::TimeExtraction => "time_extraction",
            Self::ContentExtraction => "content_extraction",
            Self::Translation => "translation",
            Self::Done => "done",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for AssemblyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
