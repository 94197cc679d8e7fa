//! Prompt contracts for the completion stages and parsing of their answers.

use cinematch_embeddings::CandidateSet;

use crate::completion::CompletionRequest;

/// Joins two candidates into one combined recommendation.
pub const COMBINATION_CONNECTOR: &str = " + ";

const EXPANSION_SYSTEM: &str = "You are a film keyword specialist. Your primary job is to \
PRESERVE the user's core intent while expanding it with relevant professional terminology. \
Never lose the main concept.";

const FILTER_SYSTEM: &str = "You are a precision movie search filter. Your job is to eliminate \
ambiguous keywords that could apply to multiple genres when the user specified a specific \
context, so that the user's primary intent is preserved in every single keyword returned. \
Your response must be a single line of comma-separated strings.";

/// Stage 1: ask for `terms` genre/tone-level phrases describing the utterance.
pub fn expansion_request(utterance: &str, terms: usize) -> CompletionRequest {
    let half = terms.div_ceil(2);
    let user = format!(
        r#"User Input: "{utterance}"

Task: Expand the user's input into {terms} specific cinematic keywords while PRESERVING core concepts.

CRITICAL RULES:
1. IDENTIFY CORE KEYWORDS: Extract the main nouns, genres, or themes explicitly present in the input (e.g. "family", "love", "thriller", "90s").
2. PRESERVE CORE KEYWORDS: If the user explicitly names a core concept, at least {half} of your {terms} outputs must include or directly relate to it.
3. EXPAND APPROPRIATELY: Add emotional tones, sub-genres, or narrative elements that ENHANCE the core concept, never replace it.
4. USE PROFESSIONAL TERMINOLOGY: Convert casual language to film industry terms (e.g. "sad" -> "Melancholic", "funny" -> "Comedic").
5. MEDIA TYPE PRESERVATION: If the user asks for a specific media type such as "Movie", use only terms for that type. Avoid terms exclusive to another format (e.g. "Series", "K-Drama") unless the user asked for them.

Examples:
- "Feel-good family film" -> "Family", "Family-friendly", "Family bonding", "Wholesome", "All-ages", ...
- "Intense love stories" -> "Romance", "Romantic", "Love", "Passionate", "Star-crossed", ...
- "90s nostalgia" -> "90s", "1990s", "Nostalgia", "Retro", ...

Output ONLY {terms} keywords/phrases separated by commas."#
    );

    CompletionRequest::new(EXPANSION_SYSTEM, user)
}

/// Stage 3: ask for `min`-`max` ranked picks drawn only from `candidates`.
pub fn filter_request(
    utterance: &str,
    candidates: &CandidateSet,
    min: usize,
    max: usize,
) -> CompletionRequest {
    let listed = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {c}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    let connector = COMBINATION_CONNECTOR.trim();

    let user = format!(
        r#"User's Original Intent: "{utterance}"

Database Candidates:
{listed}

CRITICAL RULES:
- A keyword is valid ONLY if it covers the ENTIRE intent.
- A candidate that covers only part of the intent MUST NOT be used alone. Combine it with one other candidate using "{COMBINATION_CONNECTOR}".
- If the user specifies a media type (e.g. Movie or TV Series), do not use keywords exclusive to the other format.

Task:
1. DECONSTRUCT INTENT: Break the user's intent down into its essential components.
2. INTERSECTION PRINCIPLE: Every output item must represent the intersection of all essential components.
3. COMBINATION LOGIC:
   - If a single candidate already captures the full intersection, use it alone.
   - Otherwise join exactly two candidates, one per component, as "A{COMBINATION_CONNECTOR}B".
4. ANTI-GENERALIZATION: Never return an item that covers only part of the intent.
5. SOURCE INTEGRITY: Use ONLY exact strings from the Database Candidates. Do not shorten or modify them; joining two with "{connector}" is the only allowed change.
6. SELECTION: Return {min}-{max} of the most relevant, high-precision items.
7. FILTERING: Drop every candidate that is irrelevant to or outside the user's intent.
8. RANKING: List items from most to least relevant to "{utterance}".

OUTPUT:
- Output ONLY the items separated by commas.
- Do not include labels, explanations, intros, or outros."#
    );

    CompletionRequest::new(FILTER_SYSTEM, user)
}

/// Split a comma-separated answer into trimmed, non-empty items.
pub fn parse_keyword_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_keyword_list() {
        assert_eq!(
            parse_keyword_list(" Family ,Wholesome,, Family bonding\n, "),
            vec!["Family", "Wholesome", "Family bonding"]
        );
        assert!(parse_keyword_list("").is_empty());
        assert!(parse_keyword_list(" , ,").is_empty());
    }

    #[test]
    fn test_expansion_request_mentions_utterance_and_count() {
        let request = expansion_request("feel-good family film", 10);
        assert!(request.user.contains(r#""feel-good family film""#));
        assert!(request.user.contains("into 10 specific"));
        assert!(request.user.contains("at least 5 of your 10"));
        assert!(request.system.contains("PRESERVE"));
    }

    #[test]
    fn test_filter_request_enumerates_candidates() {
        let candidates: CandidateSet = ["Family", "Comedy"].into_iter().collect();
        let request = filter_request("feel-good family film", &candidates, 5, 8);

        assert!(request.user.contains("1. Comedy\n2. Family"));
        assert!(request.user.contains("Return 5-8"));
        assert!(request.user.contains(r#""A + B""#));
    }
}
