use crate::models::{Phrase, TranslationSubmission};

/// Canonical form used to compare translations: trimmed, lowercased,
/// whitespace collapsed, trailing sentence punctuation dropped
pub fn sanitize(text: &str) -> String {
    let collapsed = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    collapsed
        .trim_end_matches(['.', '!', '?', ',', ';'])
        .trim_end()
        .to_string()
}

/// Accepted answers for a phrase. `;` and `/` separate alternatives.
fn alternatives(correct: &str) -> impl Iterator<Item = String> + '_ {
    correct
        .split([';', '/'])
        .map(sanitize)
        .filter(|alt| !alt.is_empty())
}

/// Grade a typed translation against the phrase's expected translation
pub fn grade(phrase: &Phrase, submitted: &str) -> TranslationSubmission {
    let correct = phrase.translation.clone().unwrap_or_default();
    let answer = sanitize(submitted);
    let is_correct = !answer.is_empty() && alternatives(&correct).any(|alt| alt == answer);

    TranslationSubmission {
        phrase: phrase.phrase.clone(),
        submitted: submitted.trim().to_string(),
        correct,
        is_correct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("  Good   Morning! "), "good morning");
        assert_eq!(sanitize("Hola."), "hola");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_grade_exact_and_alternatives() {
        let phrase = Phrase::new("dog", Some("perro; can"));

        assert!(grade(&phrase, "Perro").is_correct);
        assert!(grade(&phrase, " can ").is_correct);
        assert!(!grade(&phrase, "gato").is_correct);
    }

    #[test]
    fn test_grade_records_texts() {
        let phrase = Phrase::new("cat", Some("gato/gata"));
        let submission = grade(&phrase, "  gata ");

        assert_eq!(submission.phrase, "cat");
        assert_eq!(submission.submitted, "gata");
        assert_eq!(submission.correct, "gato/gata");
        assert!(submission.is_correct);
    }

    #[test]
    fn test_grade_without_expected_translation_is_incorrect() {
        let phrase = Phrase::new("cat", None);
        let submission = grade(&phrase, "gato");

        assert!(!submission.is_correct);
        assert_eq!(submission.correct, "");
    }

    #[test]
    fn test_blank_submission_is_incorrect() {
        let phrase = Phrase::new("cat", Some("gato"));
        assert!(!grade(&phrase, "   ").is_correct);
    }
}
