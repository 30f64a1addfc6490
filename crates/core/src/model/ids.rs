use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::model::question::option_body;

/// Content hash identifying a question across documents and re-parses.
///
/// Computed over the question text plus its option bodies sorted lexicographically, with
/// the letter labels removed, so permuting options in the source yields the same value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    #[must_use]
    pub fn compute<S: AsRef<str>>(text: &str, options: &[S]) -> Self {
        let mut bodies: Vec<&str> = options.iter().map(|o| option_body(o.as_ref())).collect();
        bodies.sort_unstable();

        let mut hasher = Sha256::new();
        hasher.update(text.trim().as_bytes());
        for body in bodies {
            // unit separator keeps ("ab", "c") distinct from ("a", "bc")
            hasher.update([0x1f]);
            hasher.update(body.as_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Wraps an already computed fingerprint, e.g. a key read back from disk.
    #[must_use]
    pub fn from_hex(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.0.chars().take(12).collect();
        write!(f, "Fingerprint({short})")
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_deterministic_hex() {
        let a = Fingerprint::compute("Q", &["A. x", "B. y"]);
        let b = Fingerprint::compute("Q", &["A. x", "B. y"]);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn text_and_options_both_matter() {
        let base = Fingerprint::compute("Q", &["A. x", "B. y"]);
        assert_ne!(base, Fingerprint::compute("Q2", &["A. x", "B. y"]));
        assert_ne!(base, Fingerprint::compute("Q", &["A. x", "B. z"]));
        assert_ne!(
            Fingerprint::compute("Q", &["A. ab", "B. c"]),
            Fingerprint::compute("Q", &["A. a", "B. bc"])
        );
    }
}
