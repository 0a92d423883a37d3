use std::fmt;
use std::ops::Not;

/// Result of evaluating a condition.
///
/// `Abstain` means the condition had no answer for this context; the rule is
/// passed over exactly as if it were absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Verdict {
    Match,
    NoMatch,
    Abstain,
}

impl Not for Verdict {
    type Output = Verdict;

    fn not(self) -> Verdict {
        match self {
            Verdict::Match => Verdict::NoMatch,
            Verdict::NoMatch => Verdict::Match,
            Verdict::Abstain => Verdict::Abstain,
        }
    }
}

impl From<bool> for Verdict {
    fn from(b: bool) -> Self {
        if b {
            Verdict::Match
        } else {
            Verdict::NoMatch
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Match => write!(f, "match"),
            Verdict::NoMatch => write!(f, "no match"),
            Verdict::Abstain => write!(f, "abstain"),
        }
    }
}
