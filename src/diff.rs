use crate::reference::ReferenceText;

/// Classification of one reference position against the transcript.
#[derive(Clone, Debug, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Verdict {
    Correct,
    Incorrect,
    Pending,
}

/// One verdict per reference char, in order.
pub fn diff(reference: &ReferenceText, transcript: &[char]) -> Vec<Verdict> {
    reference
        .chars()
        .iter()
        .enumerate()
        .map(|(idx, expected)| match transcript.get(idx) {
            Some(typed) if typed == expected => Verdict::Correct,
            Some(_) => Verdict::Incorrect,
            None => Verdict::Pending,
        })
        .collect()
}

/// Number of transcript positions matching the reference at the same index.
pub fn correct_count(reference: &ReferenceText, transcript: &[char]) -> usize {
    transcript
        .iter()
        .zip(reference.chars())
        .filter(|(typed, expected)| typed == expected)
        .count()
}
