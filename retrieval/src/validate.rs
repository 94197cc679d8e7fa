//! Checks stage 3 output against the candidate set it was chosen from.

use cinematch_embeddings::CandidateSet;
use tracing::warn;

use crate::config::Strictness;
use crate::prompts::COMBINATION_CONNECTOR;

/// A stage 3 item that is traceable to the candidate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedItem {
    /// One candidate, verbatim.
    Single(String),
    /// Two candidates joined by the connector.
    Combination(String, String),
}

impl ValidatedItem {
    /// Canonical text, with combinations joined by [`COMBINATION_CONNECTOR`].
    pub fn render(&self) -> String {
        match self {
            Self::Single(keyword) => keyword.clone(),
            Self::Combination(a, b) => format!("{a}{COMBINATION_CONNECTOR}{b}"),
        }
    }
}

/// Interpret `item` as a candidate or a combination of two distinct
/// candidates.
///
/// Verbatim membership is checked first so that a keyword containing `+`
/// is not mistaken for a combination. A bare `+` without surrounding
/// spaces is accepted as the connector.
pub fn classify(item: &str, candidates: &CandidateSet) -> Option<ValidatedItem> {
    if candidates.contains(item) {
        return Some(ValidatedItem::Single(item.to_string()));
    }

    split_pair(item, COMBINATION_CONNECTOR, candidates)
        .or_else(|| split_pair(item, COMBINATION_CONNECTOR.trim(), candidates))
}

fn split_pair(item: &str, connector: &str, candidates: &CandidateSet) -> Option<ValidatedItem> {
    let parts: Vec<&str> = item.split(connector).map(str::trim).collect();
    match parts.as_slice() {
        [a, b] if a != b && candidates.contains(a) && candidates.contains(b) => {
            Some(ValidatedItem::Combination(a.to_string(), b.to_string()))
        }
        _ => None,
    }
}

/// Apply `strictness` to the parsed stage 3 items.
///
/// Order is preserved; sorting happens afterwards.
pub fn apply_strictness(
    items: Vec<String>,
    candidates: &CandidateSet,
    strictness: Strictness,
) -> Vec<String> {
    match strictness {
        Strictness::Trust => items,
        Strictness::Warn => {
            for item in &items {
                if classify(item, candidates).is_none() {
                    warn!("Recommended item not drawn from candidates: {item:?}");
                }
            }
            items
        }
        Strictness::Discard => items
            .into_iter()
            .filter_map(|item| match classify(&item, candidates) {
                Some(valid) => Some(valid.render()),
                None => {
                    warn!("Discarding recommended item not drawn from candidates: {item:?}");
                    None
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candidates() -> CandidateSet {
        ["Family", "Comedy", "18+", "Coming-of-age"].into_iter().collect()
    }

    #[test]
    fn test_single_candidate() {
        assert_eq!(
            classify("Family", &candidates()),
            Some(ValidatedItem::Single("Family".to_string()))
        );
        assert_eq!(classify("family", &candidates()), None);
    }

    #[test]
    fn test_combination() {
        let expected = ValidatedItem::Combination("Family".to_string(), "Comedy".to_string());
        assert_eq!(classify("Family + Comedy", &candidates()), Some(expected.clone()));
        assert_eq!(classify("Family+Comedy", &candidates()), Some(expected.clone()));
        assert_eq!(expected.render(), "Family + Comedy");
    }

    #[test]
    fn test_combination_with_plus_in_keyword() {
        assert_eq!(classify("18+", &candidates()), Some(ValidatedItem::Single("18+".to_string())));
        assert_eq!(
            classify("18+ + Comedy", &candidates()),
            Some(ValidatedItem::Combination("18+".to_string(), "Comedy".to_string()))
        );
    }

    #[test]
    fn test_rejects_unknown_and_triples() {
        assert_eq!(classify("Horror", &candidates()), None);
        assert_eq!(classify("Family + Horror", &candidates()), None);
        assert_eq!(classify("Family + Comedy + Coming-of-age", &candidates()), None);
    }

    #[test]
    fn test_rejects_keyword_combined_with_itself() {
        assert_eq!(classify("Family + Family", &candidates()), None);
        assert_eq!(classify("Family+Family", &candidates()), None);

        let items = vec!["Family + Family".to_string(), "Family".to_string()];
        assert_eq!(
            apply_strictness(items, &candidates(), Strictness::Discard),
            vec!["Family"]
        );
    }

    #[test]
    fn test_discard_drops_and_normalizes() {
        let items = vec![
            "Family".to_string(),
            "Horror".to_string(),
            "Comedy+Family".to_string(),
        ];
        assert_eq!(
            apply_strictness(items, &candidates(), Strictness::Discard),
            vec!["Family", "Comedy + Family"]
        );
    }

    #[test]
    fn test_trust_and_warn_keep_everything() {
        let items = vec!["Horror".to_string(), "Family".to_string()];
        assert_eq!(
            apply_strictness(items.clone(), &candidates(), Strictness::Trust),
            items
        );
        assert_eq!(
            apply_strictness(items.clone(), &candidates(), Strictness::Warn),
            items
        );
    }
}
