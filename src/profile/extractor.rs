//! Weakness extraction from review text
//!
//! Coarse, order-independent keyword classifier: a weakness tag is reported
//! when any of its trigger phrases occurs (case-insensitively) anywhere in
//! the review. Stateless and infallible: unmatched input yields an empty
//! report. The trigger vocabulary lives in one table so it can grow without
//! touching control flow.

/// One weakness tag and the phrases that signal it
pub struct TriggerRule {
    pub tag: &'static str,
    pub phrases: &'static [&'static str],
}

/// Grammar weakness triggers
pub const GRAMMAR_TRIGGERS: &[TriggerRule] = &[
    TriggerRule {
        tag: "articles",
        phrases: &["article", "a/an", "the"],
    },
    TriggerRule {
        tag: "tenses",
        phrases: &[
            "tense",
            "simple present",
            "simple past",
            "simple future",
            "parallelism",
        ],
    },
    TriggerRule {
        tag: "prepositions",
        phrases: &["preposition", "because vs because of", "help me to"],
    },
    TriggerRule {
        tag: "subject_verb",
        phrases: &["subject-verb", "agreement"],
    },
    TriggerRule {
        tag: "comma_splice",
        phrases: &["comma splice", "koma untuk menyambung"],
    },
];

/// Translation weakness triggers
pub const TRANSLATION_TRIGGERS: &[TriggerRule] = &[
    TriggerRule {
        tag: "incomplete_translation",
        phrases: &["tertinggal", "tidak diterjemahkan"],
    },
    TriggerRule {
        tag: "time_expressions",
        phrases: &["time expression", "sore nanti", "this afternoon", "tomorrow"],
    },
    TriggerRule {
        tag: "formal_informal",
        phrases: &["formal", "alignment", "penyelarasan"],
    },
];

/// Words watched for recurring vocabulary gaps
pub const VOCABULARY_WATCHLIST: &[&str] = &["facilitate", "alignment", "mitigate", "proactive"];

/// Weakness tags and gap words detected in one review
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeaknessReport {
    pub grammar: Vec<String>,
    pub translation: Vec<String>,
    pub vocabulary: Vec<String>,
}

impl WeaknessReport {
    /// Total number of detected weaknesses across all categories
    pub fn len(&self) -> usize {
        self.grammar.len() + self.translation.len() + self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scan review text for weakness triggers and watched vocabulary
pub fn extract(review_text: &str) -> WeaknessReport {
    let lower = review_text.to_lowercase();

    let matched_tags = |rules: &[TriggerRule]| {
        rules
            .iter()
            .filter(|rule| rule.phrases.iter().any(|phrase| lower.contains(phrase)))
            .map(|rule| rule.tag.to_string())
            .collect::<Vec<_>>()
    };

    WeaknessReport {
        grammar: matched_tags(GRAMMAR_TRIGGERS),
        translation: matched_tags(TRANSLATION_TRIGGERS),
        vocabulary: VOCABULARY_WATCHLIST
            .iter()
            .filter(|word| lower.contains(**word))
            .map(|word| word.to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_past_maps_to_tenses() {
        let report = extract("The student struggled with the simple past here.");
        assert!(report.grammar.contains(&"tenses".to_string()));
    }

    #[test]
    fn unmatched_text_yields_empty_report() {
        let report = extract("Semua jawaban bagus sekali!");
        assert!(report.grammar.is_empty());
        assert!(report.translation.is_empty());
        assert!(report.vocabulary.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_report() {
        assert!(extract("").is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let report = extract("Watch your SUBJECT-VERB Agreement and Preposition usage.");
        assert!(report.grammar.contains(&"subject_verb".to_string()));
        assert!(report.grammar.contains(&"prepositions".to_string()));
    }

    #[test]
    fn one_tag_per_rule_regardless_of_phrase_count() {
        // Both "tense" and "simple present" match the same rule
        let report = extract("Wrong tense: use simple present instead.");
        assert_eq!(
            report.grammar.iter().filter(|t| *t == "tenses").count(),
            1
        );
    }

    #[test]
    fn watchlist_words_are_reported_as_gaps() {
        let report = extract("You could use 'mitigate' and 'facilitate' here.");
        assert_eq!(report.vocabulary, vec!["facilitate", "mitigate"]);
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = "Tense mistakes and a missing preposition, plus formal tone issues.";
        assert_eq!(extract(text), extract(text));
    }
}
