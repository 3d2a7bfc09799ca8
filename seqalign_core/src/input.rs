use seqalign_common::{Alphabet, SeqAlignError};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Uppercase `raw` and keep only characters of `alphabet`, in order
pub fn sanitize(raw: &str, alphabet: &Alphabet) -> String {
    raw.chars()
        .map(uppercase_single)
        .filter(|ch| alphabet.contains(*ch))
        .collect()
}

// Characters whose uppercase form expands (e.g. 'ß' -> "SS") are kept as-is
// so the output never grows past the input.
fn uppercase_single(ch: char) -> char {
    let mut upper = ch.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => ch,
    }
}

/// A sanitized sequence. Every character belongs to the alphabet it was
/// built against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sequence(String);

impl Sequence {
    pub fn new(raw: &str, alphabet: &Alphabet) -> Self {
        Self(sanitize(raw, alphabet))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for Sequence {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which of the two inputs an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub fn other(self) -> Self {
        match self {
            Slot::First => Slot::Second,
            Slot::Second => Slot::First,
        }
    }
}

/// Two validated sequences of equal, non-zero length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePair {
    first: Sequence,
    second: Sequence,
}

impl SequencePair {
    pub fn new(first: Sequence, second: Sequence) -> Result<Self, SeqAlignError> {
        let (first_len, second_len) = (first.len(), second.len());
        if first_len != second_len || first_len == 0 {
            return Err(SeqAlignError::LengthMismatch {
                first: first_len,
                second: second_len,
            });
        }
        Ok(Self { first, second })
    }

    pub fn first(&self) -> &Sequence {
        &self.first
    }

    pub fn second(&self) -> &Sequence {
        &self.second
    }

    pub fn len(&self) -> usize {
        self.first.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Collects the two raw inputs and gates the comparison on their lengths
#[derive(Debug)]
pub struct InputStage {
    alphabet: Alphabet,
    first: Sequence,
    second: Sequence,
    error: Option<SeqAlignError>,
    submitted: bool,
}

impl InputStage {
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            first: Sequence::default(),
            second: Sequence::default(),
            error: None,
            submitted: false,
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Replace a slot with the sanitized form of `raw`. Any edit clears the
    /// previous submit result and error.
    pub fn edit(&mut self, slot: Slot, raw: &str) {
        let sequence = Sequence::new(raw, &self.alphabet);
        debug!(?slot, len = sequence.len(), "Input edited");
        match slot {
            Slot::First => self.first = sequence,
            Slot::Second => self.second = sequence,
        }
        self.error = None;
        self.submitted = false;
    }

    pub fn sequence(&self, slot: Slot) -> &Sequence {
        match slot {
            Slot::First => &self.first,
            Slot::Second => &self.second,
        }
    }

    pub fn first(&self) -> &Sequence {
        &self.first
    }

    pub fn second(&self) -> &Sequence {
        &self.second
    }

    /// Validate the current inputs. On success the session is ready to
    /// render and the pair is handed out; on failure the error is kept for
    /// display and the inputs stay as typed.
    pub fn submit(&mut self) -> Result<SequencePair, SeqAlignError> {
        match SequencePair::new(self.first.clone(), self.second.clone()) {
            Ok(pair) => {
                info!(len = pair.len(), "Sequences accepted for comparison");
                self.error = None;
                self.submitted = true;
                Ok(pair)
            }
            Err(err) => {
                debug!("Submit rejected: {}", err);
                self.error = Some(SeqAlignError::LengthMismatch {
                    first: self.first.len(),
                    second: self.second.len(),
                });
                self.submitted = false;
                Err(err)
            }
        }
    }

    /// Current validated pair, if the last submit succeeded and nothing was
    /// edited since
    pub fn ready_pair(&self) -> Option<SequencePair> {
        if !self.submitted {
            return None;
        }
        SequencePair::new(self.first.clone(), self.second.clone()).ok()
    }

    pub fn error(&self) -> Option<&SeqAlignError> {
        self.error.as_ref()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }
}

impl Default for InputStage {
    fn default() -> Self {
        Self::new(Alphabet::amino_acids())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amino() -> Alphabet {
        Alphabet::amino_acids()
    }

    #[test]
    fn test_sanitize_uppercases_and_filters() {
        assert_eq!(sanitize("acd-e", &amino()), "ACD-E");
        assert_eq!(sanitize("a1b2c3 x", &amino()), "AC");
        assert_eq!(sanitize("", &amino()), "");
        assert_eq!(sanitize("ßöé", &amino()), "");
    }

    #[test]
    fn test_sanitize_output_is_subset_in_order() {
        let alphabet = amino();
        let inputs = ["mKv-lq!!", "Hello, World", "  g a p - - ", "ZZZ", "wYvp\tst"];
        for raw in inputs {
            let clean = sanitize(raw, &alphabet);
            assert!(clean.chars().all(|ch| alphabet.contains(ch)));
            assert!(clean.chars().count() <= raw.chars().count());

            let upper = raw.to_uppercase();
            let mut expected = upper.chars().filter(|ch| alphabet.contains(*ch));
            assert!(clean.chars().all(|ch| expected.next() == Some(ch)));
        }
    }

    #[test]
    fn test_sanitize_idempotent() {
        let alphabet = amino();
        for raw in ["mkvlq", "xyz-abc", "123", "GAVL ip"] {
            let once = sanitize(raw, &alphabet);
            assert_eq!(sanitize(&once, &alphabet), once);
        }
    }

    #[test]
    fn test_edit_stores_sanitized_value() {
        let mut stage = InputStage::default();
        stage.edit(Slot::First, "mk v");
        assert_eq!(stage.first().as_str(), "MKV");
        assert_eq!(stage.sequence(Slot::Second).as_str(), "");
    }

    #[test]
    fn test_submit_equal_lengths() {
        let mut stage = InputStage::default();
        stage.edit(Slot::First, "ACDE");
        stage.edit(Slot::Second, "acdf");
        let pair = stage.submit().unwrap();
        assert_eq!(pair.first().as_str(), "ACDE");
        assert_eq!(pair.second().as_str(), "ACDF");
        assert!(stage.is_submitted());
        assert!(stage.error().is_none());
        assert_eq!(stage.ready_pair(), Some(pair));
    }

    #[test]
    fn test_submit_length_mismatch() {
        let mut stage = InputStage::default();
        stage.edit(Slot::First, "ACDE");
        stage.edit(Slot::Second, "ACD");
        let err = stage.submit().unwrap_err();
        assert!(matches!(err, SeqAlignError::LengthMismatch { first: 4, second: 3 }));
        assert!(!stage.is_submitted());
        assert!(stage.error().is_some());
        assert!(stage.ready_pair().is_none());
        // inputs are kept
        assert_eq!(stage.first().as_str(), "ACDE");
        assert_eq!(stage.second().as_str(), "ACD");
    }

    #[test]
    fn test_submit_empty_pair_rejected() {
        let mut stage = InputStage::default();
        let err = stage.submit().unwrap_err();
        assert!(matches!(err, SeqAlignError::LengthMismatch { first: 0, second: 0 }));
        assert!(!stage.is_submitted());
    }

    #[test]
    fn test_filtered_input_can_cause_mismatch() {
        let mut stage = InputStage::default();
        stage.edit(Slot::First, "AB");
        stage.edit(Slot::Second, "AC");
        // 'B' is not an amino-acid code
        assert!(stage.submit().is_err());
    }

    #[test]
    fn test_edit_clears_validation_state() {
        let mut stage = InputStage::default();
        stage.edit(Slot::First, "AC");
        stage.submit().unwrap_err();
        assert!(stage.error().is_some());

        stage.edit(Slot::Second, "A");
        assert!(stage.error().is_none());

        stage.edit(Slot::Second, "AG");
        stage.submit().unwrap();
        assert!(stage.is_submitted());

        stage.edit(Slot::First, "AC");
        assert!(!stage.is_submitted());
        assert!(stage.ready_pair().is_none());
    }

    #[test]
    fn test_slot_other() {
        assert_eq!(Slot::First.other(), Slot::Second);
        assert_eq!(Slot::Second.other(), Slot::First);
    }
}
