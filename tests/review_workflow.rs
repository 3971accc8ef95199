//! End-to-end review pipeline: AI review text in, updated stores out.
//!
//! Simulates what happens after a graded review comes back, without any
//! network calls: the weakness extractor feeds the profile store, the
//! word-grade parser feeds the vocabulary store, and the transcript store
//! accumulates the review text.

use chrono::NaiveDate;
use lingotutor::profile::{extract, ProfileStore};
use lingotutor::tasks::TaskStore;
use lingotutor::vocab::{parse_word_grades, VocabStore};

const DAILY_TASK: &str = "\
## 1. Word Transformation Challenge

Fill in the forms of: mitigate, facilitate.

## 2. Translation Challenge (B1 Level)

- Saya akan mengirimkan laporan itu sore nanti.
- Tim kami belum menyelesaikan review kode tersebut.

## 3. Conversation Transliteration Challenge

**Backend:** The deployment looks stable so far.
";

const TASK1_REVIEW: &str = "\
### Word 1: Mitigate

| Form | Correct Answer | Student's Answer | Status | Arti |
|------|----------------|------------------|--------|------|
| Verb | mitigate | mitigate | ✓ | mengurangi |
| Noun | mitigation | mitigasi | ✗ | pengurangan |
| Adjective | mitigable | ... | + | dapat dikurangi |
| Adverb | - | ... | ✗ | - |
| Opposite | aggravate | ... | + | memperburuk |

**Summary:** Perhatikan bentuk noun dari mitigate.
";

const TASK2_REVIEW: &str = "\
### Sentence 1
**Accuracy:** ⚠️ Kurang Tepat

**Feedback:**
- Frasa 'sore nanti' diterjemahkan kurang tepat; perhatikan time expression.
- Gunakan simple future untuk rencana.

**Summary:** Fokus pada tenses dan kelengkapan terjemahan; satu frasa tertinggal.
";

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, n).unwrap()
}

#[test]
fn graded_reviews_update_profile_and_transcript() {
    let data = tempfile::tempdir().unwrap();
    let tasks = tempfile::tempdir().unwrap();

    let profile_store = ProfileStore::with_dir(data.path()).unwrap();
    let task_store = TaskStore::with_dir(tasks.path()).unwrap();

    task_store.write_task(day(29), DAILY_TASK).unwrap();
    task_store.append_review(day(29), 2, TASK2_REVIEW).unwrap();

    let report = extract(TASK2_REVIEW);
    assert!(report.grammar.contains(&"tenses".to_string()));
    assert!(report.translation.contains(&"time_expressions".to_string()));
    assert!(report
        .translation
        .contains(&"incomplete_translation".to_string()));

    let profile = profile_store.update(&report, "review_task2", day(29)).unwrap();
    assert_eq!(profile.total_reviews, 1);
    assert!(profile.patterns.new_issues.contains(&"tenses".to_string()));
    assert!(profile.focus_areas.maintain.contains(&"tenses".to_string()));

    // transcript keeps the exercise and gains the review
    let content = task_store.read_task(day(29)).unwrap();
    assert!(content.contains("Word Transformation Challenge"));
    assert!(content.contains("## Review - Task 2"));

    // a reloading store sees the same state
    let reloaded = ProfileStore::with_dir(data.path()).unwrap().load();
    assert_eq!(reloaded.total_reviews, 1);
}

#[test]
fn repeated_weaknesses_escalate_into_focus_areas() {
    let data = tempfile::tempdir().unwrap();
    let profile_store = ProfileStore::with_dir(data.path()).unwrap();

    for n in 1..=5 {
        let report = extract(TASK2_REVIEW);
        profile_store.update(&report, "review_task2", day(n)).unwrap();
    }

    let profile = profile_store.load();
    // grammar tag at 5 mistakes is urgent; translation tags at 5 >= 3 too
    assert!(profile.focus_areas.urgent.contains(&"tenses".to_string()));
    assert!(profile
        .focus_areas
        .urgent
        .contains(&"time_expressions".to_string()));
    assert!(profile
        .patterns
        .persistent_issues
        .contains(&"tenses".to_string()));

    let context = profile.context_for_ai();
    assert!(context.contains("URGENT areas to focus on"));
    assert!(context.contains("Persistent issues (3+ mistakes)"));
}

#[test]
fn task1_review_feeds_vocabulary_mastery() {
    let data = tempfile::tempdir().unwrap();
    let vocab_store = VocabStore::with_dir(data.path()).unwrap();

    let grades = parse_word_grades(TASK1_REVIEW);
    assert_eq!(grades.len(), 1);
    for grade in grades {
        vocab_store
            .update_mastery(&grade.into_update(), day(29))
            .unwrap();
    }

    let details = vocab_store.details("mitigate").unwrap().unwrap();
    assert_eq!(details.summary.accuracy_score, 20);
    assert_eq!(details.summary.total_reviews, 1);
    assert!(details.form("verb").unwrap().is_mastered);
    assert!(!details.form("noun").unwrap().is_mastered);
    // the reviewer's correction is recorded as the form value
    assert_eq!(
        details.form("noun").unwrap().value.as_deref(),
        Some("mitigation")
    );

    // one weak word in the stats, none mastered yet
    let stats = vocab_store.stats().unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.weak, 1);
    assert_eq!(stats.mastered, 0);
}

#[test]
fn duplicated_review_rows_cannot_push_accuracy_out_of_range() {
    let data = tempfile::tempdir().unwrap();
    let vocab_store = VocabStore::with_dir(data.path()).unwrap();

    // an all-correct table with one form row repeated by the model
    let review = "\
### Word 1: Mitigate

| Form | Correct Answer | Student's Answer | Status | Arti |
|------|----------------|------------------|--------|------|
| Verb | mitigate | mitigate | ✓ | mengurangi |
| Verb | mitigate | mitigate | ✓ | mengurangi |
| Noun | mitigation | mitigation | ✓ | pengurangan |
| Adjective | mitigable | mitigable | ✓ | dapat dikurangi |
| Adverb | - | - | ✓ | - |
| Opposite | aggravate | aggravate | ✓ | memperburuk |
";
    for grade in parse_word_grades(review) {
        vocab_store
            .update_mastery(&grade.into_update(), day(29))
            .unwrap();
    }

    let details = vocab_store.details("mitigate").unwrap().unwrap();
    assert_eq!(details.summary.accuracy_score, 100);
    assert!(details.history.iter().all(|r| r.accuracy <= 100));
}

#[test]
fn mastery_recovers_after_a_perfect_follow_up() {
    let data = tempfile::tempdir().unwrap();
    let vocab_store = VocabStore::with_dir(data.path()).unwrap();

    for grade in parse_word_grades(TASK1_REVIEW) {
        vocab_store
            .update_mastery(&grade.into_update(), day(29))
            .unwrap();
    }

    let perfect = TASK1_REVIEW
        .replace("| ✗ |", "| ✓ |")
        .replace("| + |", "| ✓ |");
    for grade in parse_word_grades(&perfect) {
        vocab_store
            .update_mastery(&grade.into_update(), day(30))
            .unwrap();
    }

    let details = vocab_store.details("mitigate").unwrap().unwrap();
    assert_eq!(details.summary.accuracy_score, 100);
    assert_eq!(details.summary.total_reviews, 2);
    assert!(details.forms.iter().all(|f| f.is_mastered));
    assert_eq!(details.history.len(), 2);
    assert_eq!(details.history[0].accuracy, 20);
    assert_eq!(details.history[1].accuracy, 100);
}
