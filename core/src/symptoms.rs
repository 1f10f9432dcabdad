//! Symptom list derived from the comma-separated input field.

/// Split on commas, trim each token and drop the empty ones.
///
/// Order follows the input and duplicates are kept.
pub fn parse_symptoms(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_empty_and_blank_tokens() {
        assert_eq!(parse_symptoms("fever, cough, ,"), vec!["fever", "cough"]);
    }

    #[test]
    fn preserves_first_occurrence_order() {
        assert_eq!(
            parse_symptoms(" headache ,fatigue,  chest pain"),
            vec!["headache", "fatigue", "chest pain"]
        );
    }

    #[test]
    fn keeps_duplicates() {
        assert_eq!(parse_symptoms("cough,cough"), vec!["cough", "cough"]);
    }

    #[test]
    fn empty_input_yields_no_symptoms() {
        assert!(parse_symptoms("").is_empty());
        assert!(parse_symptoms(" , ,\t").is_empty());
    }

    #[test]
    fn no_token_is_empty_or_padded() {
        for input in ["a,,b", " , x ,", ",,,", "fever\n,\ncough"] {
            for token in parse_symptoms(input) {
                assert!(!token.is_empty());
                assert_eq!(token, token.trim());
            }
        }
    }
}
