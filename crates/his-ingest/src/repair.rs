//! Replaceable correction table for double-encoded text.
//!
//! Some upstream systems exported UTF-8 text that was later re-saved as if it
//! were Windows-1252, so `Año` reaches us as `AÃ±o`. The table is an ordered
//! list of `(corrupted, intended)` pairs applied to every cell at load time.

use crate::encoding::misread_as_windows_1252;

/// Characters whose double-encoded form the default table repairs.
const REPAIRED_CHARACTERS: &str = "áéíóúÁÉÍÓÚñÑüÜ¿¡°ºª";

/// Ordered before/after replacements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairTable {
    pairs: Vec<(String, String)>,
}

impl RepairTable {
    /// Builds a table from explicit pairs. Empty `before` strings are ignored.
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self {
            pairs: pairs
                .into_iter()
                .filter(|(before, _)| !before.is_empty())
                .collect(),
        }
    }

    /// A table that changes nothing.
    pub fn empty() -> Self {
        Self { pairs: Vec::new() }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// True when the text still contains a corrupted sequence.
    pub fn needs_repair(&self, text: &str) -> bool {
        self.pairs.iter().any(|(before, _)| text.contains(before.as_str()))
    }

    /// Applies the pairs in order, repeating until no corrupted sequence is
    /// left. A replacement can expose a sequence an earlier pair handles
    /// (`ÃÂ±` becomes `Ã±` once `Â±` is fixed), hence the repeat.
    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();
        // Bounded so a cyclic custom table cannot spin forever.
        for _ in 0..=text.chars().count() {
            if !self.needs_repair(&current) {
                break;
            }
            for (before, after) in &self.pairs {
                if current.contains(before.as_str()) {
                    current = current.replace(before.as_str(), after);
                }
            }
        }
        current
    }
}

impl Default for RepairTable {
    /// The deployment table: Spanish letters and punctuation misread as
    /// Windows-1252, stray `Â` lead bytes, then line breaks, tabs and
    /// non-breaking spaces collapsed to plain spaces.
    fn default() -> Self {
        let mut pairs: Vec<(String, String)> = REPAIRED_CHARACTERS
            .chars()
            .map(|ch| {
                let intended = ch.to_string();
                (misread_as_windows_1252(&intended).into_owned(), intended)
            })
            .collect();

        pairs.push(("Â".to_string(), String::new()));
        for whitespace in ["\u{a0}", "\r\n", "\n", "\t"] {
            pairs.push((whitespace.to_string(), " ".to_string()));
        }
        Self::new(pairs)
    }
}
