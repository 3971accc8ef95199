//! Prompt templates for the tutoring calls
//!
//! Every generation request is a single self-contained prompt built here.
//! The daily task prompt carries the two personalization digests (profile
//! context and vocabulary status); the review prompts carry the student's
//! answers and, where grading needs it, the original exercise text.

use crate::profile::LearnerProfile;
use crate::vocab::VocabStore;
use anyhow::Result;

/// Daily exercise generation, personalized by the two digests
pub fn daily_task(user_context: &str, vocab_digest: &str) -> String {
    format!(
        r#"You are an expert English Tutor for a Senior Backend Engineer.

**User Context:**
{user_context}

**Vocabulary Status:**
{vocab_digest}

**Task:**
1. Randomly select **5 high-value English vocabulary words** (verbs, adjectives, or nouns) suitable for a **General Professional Tech environment**.
2. Create a daily learning challenge based on these 5 selected words.
3. If user has specific weaknesses, incorporate vocabulary that helps address those areas.

# Context Setting
The user is a Software Engineer. The context is **General Professional English**.
Focus on daily interactions, clear communication, and standard work updates.

Please generate a Markdown response with this exact structure:

# Daily Task
**Selected Vocabulary:** [List the 5 words here]
**Focus:** Clear Professional Communication

## 1. Word Transformation Challenge
For each selected word, create a fill-in-the-blank list for:
- Verb:
- Noun:
- Adjective:
- Adverb:
- Opposite:
(Leave the answers completely blank after the colon, no underscores).

## 2. Translation Challenge (B1 Level)
Create 6 Indonesian sentences related to daily work life.
Keep the sentence structure simple and direct (Subject-Verb-Object), suitable for Intermediate learners.
Make the sentences slightly longer and more detailed to increase the challenge.

**Requirements:**
- Sentences 1-4: Regular statements (positive sentences)
- Sentence 5: MUST be a negative sentence (using "tidak", "belum", "bukan", etc.)
- Sentence 6: MUST be a question sentence (using "apakah", "bagaimana", "kapan", etc.)

Format: List sentences directly without extra blank lines between them.

## 3. Conversation Transliteration Challenge
Create ONE short professional conversation between 2 people with actual tech roles in English.
Use real roles like: Backend Engineer, Frontend Developer, PM (Product Manager), DevOps Engineer, QA Engineer, Tech Lead, Designer, etc.
The conversation should be about a common workplace scenario (meeting, code review, project discussion, deployment, etc.).
Keep it natural and conversational (4-6 exchanges total).

Format:
**Scenario:** [Brief context, e.g., "Backend and Frontend discussing API integration"]

**Backend:** [English sentence]

**Frontend:** [English sentence]

(Continue for 4-6 exchanges)

Leave blank lines after each dialogue line for the student to write the Indonesian translation.

## 4. Grammar and Structure Challenge
Provide 3 different words (verb, noun, adjective, or adverb) for sentence construction practice.
Each word should be used with a specific tense in a workplace context.

Format:
**1. Simple Present:** [word]
Challenge: Write a sentence using this word in Simple Present tense about your work routine.

**2. Simple Past:** [different word]
Challenge: Write a sentence using this word in Simple Past tense about a completed task.

**3. Simple Future:** [different word]
Challenge: Write a sentence using this word in Simple Future tense (will/going to) about upcoming work.

Make sure each word is different and relevant to tech workplace context.

## 5. Daily Tip
Provide one practical tip for improving English communication skills in a professional tech environment.
Keep it short, actionable, and relevant to the selected vocabulary.

**Do NOT provide the answer key yet.**"#
    )
}

/// Fixed-format instruction block built from the vocabulary store.
///
/// Weak words must reappear, mastered words are off-limits for the word
/// transformation section, and stale unreviewed additions get queued in.
pub fn vocab_digest(store: &VocabStore) -> Result<String> {
    let weak: Vec<String> = store
        .weak(80)?
        .into_iter()
        .take(5)
        .map(|w| w.word)
        .collect();
    let unreviewed: Vec<String> = store
        .unreviewed(5)?
        .into_iter()
        .map(|w| w.word)
        .collect();
    let mastered: Vec<String> = store
        .mastered(80)?
        .into_iter()
        .take(10)
        .map(|w| w.word)
        .collect();

    let mut lines = Vec::new();
    if !weak.is_empty() {
        lines.push(format!(
            "PRIORITY - include these weak words in the Word Transformation Challenge: {}",
            weak.join(", ")
        ));
    }
    if !unreviewed.is_empty() {
        lines.push(format!(
            "Also work in these words the user added but has never practiced: {}",
            unreviewed.join(", ")
        ));
    }
    if !mastered.is_empty() {
        lines.push(format!(
            "Do NOT reuse these already-mastered words: {}",
            mastered.join(", ")
        ));
    }
    if lines.is_empty() {
        lines.push("No tracked vocabulary yet; pick any 5 suitable words.".to_string());
    }
    Ok(lines.join("\n"))
}

/// Grading prompt for the word transformation section.
///
/// The table format requested here is load-bearing: the response is parsed
/// back into mastery updates. Keep it in sync with `vocab::grading`.
pub fn review_task1(user_answers: &str) -> String {
    format!(
        r#"You are an expert English Tutor reviewing a student's word transformation exercise.

The student has completed a word transformation challenge. Here are their answers:

{user_answers}

**Your task:**
1. Review each word and its transformations
2. Correct any mistakes (spelling, wrong forms, or missing forms)
3. Add missing forms if the student left them blank
4. Provide Indonesian meanings for each word form

**Output format:**
Start directly with word reviews. NO greeting or intro paragraphs.

### Word 1: [Word]

| Form | Correct Answer | Student's Answer | Status | Arti |
|------|----------------|------------------|--------|------|
| Verb | ... | ... | ✓/✗/+ | ... |

(Repeat for all words)

---

**Summary:** [1-2 sentences only: overall score and main improvement area]

Use Bahasa Indonesia. Be concise and direct."#
    )
}

/// Grading prompt for the translation section
pub fn review_task2(indonesian_sentences: &str, user_translations: &str) -> String {
    format!(
        r#"You are an expert English Tutor reviewing translation exercises for a B1 (Intermediate) level student.

**Original Indonesian sentences:**
{indonesian_sentences}

**Student's English translations:**
{user_translations}

**Your task:**
For each translation, evaluate:
1. **B1 Level Accuracy** - Is the meaning correct? Are grammar and vocabulary appropriate for B1?
2. **Nativeness** - How natural does it sound to a native English speaker?
3. **Suggestions** - Provide a more natural alternative if needed
4. **Advanced Tips** - Suggest better phrasal verbs, collocations, prepositions, or idioms when applicable

**Output format:**
Create a review for each sentence with this structure:

### Sentence 1
**Indonesian:** [original sentence]
**Your Translation:** [student's answer]
**Accuracy:** ✓ Benar / ⚠️ Kurang Tepat / ✗ Salah
**Nativeness Score:** ⭐⭐⭐⭐⭐ (1-5 stars)

**Feedback:**
- [Brief explanation in Bahasa Indonesia about accuracy]
- [Comment on naturalness]

**More Natural Alternative:**
"[Provide a more natural version]"

**Key Improvements:**
- [Specific suggestion 1]
- [Specific suggestion 2]

---

**Summary:** [2-3 sentences only: score, main patterns to improve, one actionable tip]

Use Bahasa Indonesia for explanations. Be direct and concise. NO lengthy intro or closing paragraphs."#
    )
}

/// Grading prompt for the conversation transliteration section
pub fn review_task3(english_conversation: &str, user_translations: &str) -> String {
    format!(
        r#"You are an expert English Tutor reviewing conversation transliteration exercises for a B1 (Intermediate) level student.

**Original English conversation:**
{english_conversation}

**Student's Indonesian translations:**
{user_translations}

**Your task:**
Review translations with focus on CASUAL/INFORMAL workplace conversation style.
Evaluate:
1. **Translation Accuracy** - Is the meaning correct?
2. **Conversational Tone** - Does it sound like natural, casual workplace chat in Indonesian?
3. **Register** - Is it appropriately informal (not too formal/stiff)?

**Output format:**

### Line 1 - [Role]
**English:** [original line]
**Your Translation:** [student's answer]
**Accuracy:** ✓ Benar / ⚠️ Kurang Tepat / ✗ Salah
**Conversational:** ⭐⭐⭐⭐⭐ (1-5 stars, how casual/natural it sounds)

**Feedback:**
- [Is it too formal? Too stiff? Or naturally casual?]

**Casual Alternative:**
"[Provide more casual/natural workplace conversation version]"

---

**Summary:** [2-3 sentences: overall conversational tone score, formality issue if any, tip for casual workplace Indonesian]

Use Bahasa Indonesia. Focus on helping student sound natural in casual workplace conversations, not overly formal."#
    )
}

/// Grading prompt for the grammar and structure section
pub fn review_task4(user_answers: &str) -> String {
    format!(
        r#"You are an expert English Tutor reviewing grammar and structure exercises for a B1 (Intermediate) level student.

**Student's answers:**
{user_answers}

**Your task:**
Review each sentence for:
1. **Correct Tense Usage** - Is the appropriate tense used (Simple Present/Past/Future)?
2. **Word Usage** - Is the given word used correctly in the sentence?
3. **Grammar Accuracy** - Subject-verb agreement, word order, auxiliary verbs
4. **Naturalness** - Does it sound natural in workplace context?

**Output format:**

### 1. Simple Present
**Given Word:** [the word provided]
**Your Sentence:** [student's sentence]
**Tense:** ✓ Correct / ✗ Incorrect
**Word Usage:** ✓ Correct / ✗ Incorrect
**Grammar:** ✓ Correct / ⚠️ Minor Issues / ✗ Major Issues
**Naturalness:** ⭐⭐⭐⭐⭐ (1-5 stars)

**Feedback:** [Brief explanation in Bahasa Indonesia]
**Better Version:** "[If needed, provide improved sentence]"

### 2. Simple Past
(Same format)

### 3. Simple Future
(Same format)

---

**Summary:** [2-3 sentences: overall tense accuracy, main grammar issue, one tip]

Use Bahasa Indonesia. Be direct and concise. NO lengthy intro or closing."#
    )
}

/// Topic-specific study material generation
pub fn learning_material(topic: &str) -> String {
    format!(
        r#"You are an expert English Tutor creating B1 (Intermediate) level learning materials for software engineers.

**Topic:** {topic}

**Your task:**
Create comprehensive learning material in Markdown format with this structure:

# {topic}

## Overview
[Brief explanation of the topic - 2-3 sentences]

## Key Concepts
[List 3-5 main concepts with brief explanations]

## Common Patterns in Tech Workplace
[Show 5-7 examples relevant to software engineering context]
Example format:
- **Pattern:** [English example]
  **Usage:** [When to use it]
  **Indonesian:** [Translation]

## Practice Exercises
[Provide 5 practice sentences/scenarios]
Format: Leave blank lines for answers

## Common Mistakes to Avoid
[List 3-4 common mistakes with corrections]
❌ Wrong: [example]
✅ Correct: [example]

## Quick Reference
[Summary table or bullet points for quick review]

Keep language at B1 level - not too simple, not too complex.
Focus on practical workplace communication.
Use Bahasa Indonesia for explanations when helpful."#
    )
}

const GRAMMAR_TOPICS: &[(&str, &str)] = &[
    ("articles", "Articles (A, An, The) in English"),
    ("tenses", "Simple Tenses (Present, Past, Future)"),
    ("prepositions", "Common Prepositions in Tech Context"),
    ("subject_verb", "Subject-Verb Agreement"),
    ("comma_splice", "Sentence Structure and Punctuation"),
];

const TRANSLATION_TOPICS: &[(&str, &str)] = &[
    ("incomplete_translation", "Complete Translation Techniques"),
    ("time_expressions", "Time Expressions in English"),
    ("formal_informal", "Formal vs Informal English"),
];

const DEFAULT_TOPICS: &[&str] = &[
    "Phrasal Verbs for Software Engineers",
    "Email Writing in Professional Context",
    "Meeting Phrases and Expressions",
    "Code Review Communication",
    "Technical Documentation Writing",
];

const TOPIC_CAP: usize = 5;

/// Study-material topics matching the profile's focus areas, capped at five.
/// Urgent tags map through the grammar topics, practice tags through the
/// translation topics; a clean profile gets the default B1 list.
pub fn suggest_topics(profile: &LearnerProfile) -> Vec<String> {
    let mut topics = Vec::new();

    for tag in &profile.focus_areas.urgent {
        if let Some((_, topic)) = GRAMMAR_TOPICS.iter().find(|(t, _)| t == tag) {
            topics.push(topic.to_string());
        }
    }
    for tag in &profile.focus_areas.practice {
        if let Some((_, topic)) = TRANSLATION_TOPICS.iter().find(|(t, _)| t == tag) {
            topics.push(topic.to_string());
        }
    }

    if topics.is_empty() {
        topics = DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect();
    }

    topics.truncate(TOPIC_CAP);
    topics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::extract;
    use chrono::NaiveDate;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, n).unwrap()
    }

    #[test]
    fn daily_prompt_carries_both_digests() {
        let prompt = daily_task("URGENT areas to focus on: tenses", "PRIORITY - mitigate");
        assert!(prompt.contains("URGENT areas to focus on: tenses"));
        assert!(prompt.contains("PRIORITY - mitigate"));
        assert!(prompt.contains("## 5. Daily Tip"));
    }

    #[test]
    fn review_prompts_embed_the_exercise_text() {
        let prompt = review_task2("Saya akan hadir.", "I will attend.");
        assert!(prompt.contains("Saya akan hadir."));
        assert!(prompt.contains("I will attend."));
    }

    #[test]
    fn task1_prompt_requests_the_parseable_table() {
        let prompt = review_task1("verb: mitigate");
        assert!(prompt.contains("| Form | Correct Answer | Student's Answer | Status | Arti |"));
        assert!(prompt.contains("### Word 1"));
    }

    #[test]
    fn fresh_profile_gets_default_topics() {
        let profile = LearnerProfile::default();
        let topics = suggest_topics(&profile);
        assert_eq!(topics.len(), 5);
        assert!(topics[0].contains("Phrasal Verbs"));
    }

    #[test]
    fn urgent_grammar_tags_map_to_topics() {
        let mut profile = LearnerProfile::default();
        for n in 1..=5 {
            profile.apply_review(&extract("wrong tense again"), "daily", day(n));
        }
        let topics = suggest_topics(&profile);
        assert!(topics.contains(&"Simple Tenses (Present, Past, Future)".to_string()));
    }

    #[test]
    fn practice_translation_tags_map_to_topics() {
        let mut profile = LearnerProfile::default();
        for n in 1..=2 {
            profile.apply_review(&extract("bagian ini tertinggal"), "daily", day(n));
        }
        let topics = suggest_topics(&profile);
        assert!(topics.contains(&"Complete Translation Techniques".to_string()));
    }

    #[test]
    fn vocab_digest_reflects_store_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = VocabStore::with_dir(dir.path()).unwrap();
        assert!(vocab_digest(&store).unwrap().contains("No tracked vocabulary"));

        store.add_word("leverage", None, None).unwrap();
        let digest = vocab_digest(&store).unwrap();
        assert!(digest.contains("never practiced: leverage"));
    }
}
