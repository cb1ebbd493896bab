use serde::{Deserialize, Serialize};

/// Which transcript edits the input tracker accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPolicy {
    /// Transcript only grows; no backspace, no rewrites.
    #[default]
    AppendOnly,
    /// Any edit within the reference length, including deletions.
    AllowCorrections,
}

impl InputPolicy {
    /// Whether `candidate` may replace `current` for a reference of
    /// `max_len` chars.
    pub fn accepts(self, current: &[char], candidate: &[char], max_len: usize) -> bool {
        if candidate.len() > max_len {
            return false;
        }
        match self {
            InputPolicy::AppendOnly => candidate.starts_with(current),
            InputPolicy::AllowCorrections => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn over_length_is_rejected_by_every_policy() {
        for policy in [InputPolicy::AppendOnly, InputPolicy::AllowCorrections] {
            assert!(!policy.accepts(&chars("ab"), &chars("abc"), 2));
        }
    }

    #[test]
    fn append_only_rejects_shrinking_and_rewrites() {
        let p = InputPolicy::AppendOnly;
        assert!(p.accepts(&chars("ab"), &chars("abc"), 5));
        assert!(p.accepts(&chars("ab"), &chars("abxy"), 5));
        assert!(!p.accepts(&chars("ab"), &chars("a"), 5));
        assert!(!p.accepts(&chars("ab"), &chars("xb"), 5));
        assert!(!p.accepts(&chars("ab"), &chars("xbc"), 5));
    }

    #[test]
    fn corrections_allow_deletion_and_rewrites() {
        let p = InputPolicy::AllowCorrections;
        assert!(p.accepts(&chars("ab"), &chars("a"), 5));
        assert!(p.accepts(&chars("ab"), &chars(""), 5));
        assert!(p.accepts(&chars("ab"), &chars("xbc"), 5));
    }

    #[test]
    fn default_is_append_only() {
        assert_eq!(InputPolicy::default(), InputPolicy::AppendOnly);
        assert_eq!(
            serde_json::to_string(&InputPolicy::AllowCorrections).unwrap(),
            "\"allow_corrections\""
        );
    }
}
