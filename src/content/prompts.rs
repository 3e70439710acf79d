//! Prompt templates for the generator and the answer oracle

use crate::domain::{Difficulty, TopicId};

/// Example answers per tier, one-word and two-word
fn tier_examples(tier: Difficulty) -> (&'static str, &'static str) {
    match tier {
        Difficulty::Easy => (
            "\"recycling\", \"compost\", \"windmill\"",
            "\"food bank\", \"bike path\", \"solar light\"",
        ),
        Difficulty::Medium => (
            "\"aquaponics\", \"biochar\", \"greenhouse\"",
            "\"smart grid\", \"seed bank\", \"waste sorting\"",
        ),
        Difficulty::Hard => (
            "\"desalination\", \"permaculture\", \"biodiesel\"",
            "\"carbon sink\", \"micro grid\", \"thermal storage\"",
        ),
    }
}

/// Riddle request for one primary topic
pub fn riddle_prompt(tier: Difficulty, topic: TopicId) -> String {
    let info = topic.info();
    let (one_word, two_words) = tier_examples(tier);
    format!(
        r#"Generate a {tier} sustainability-themed riddle related to SDG {id} ({name}: {description}).
Reply with JSON only, in exactly this shape:
{{
  "question": "The riddle question",
  "answer": "A one or two word answer",
  "fact": "An interesting fact related to the answer and sustainability",
  "didYouKnow": "A surprising 'Did you know?' fact worth sharing",
  "importance": "Why this topic matters for sustainability",
  "sdgs": [{id}, up to 2 other related SDG numbers],
  "hint": "A small hint that does not give the answer away",
  "difficulty": "{tier}"
}}

Rules for the answer:
- Alternate between one-word and two-word answers.
- Use common, guessable terms for specific solutions or actions. No jargon.
- Never use the SDG name or a basic concept from its description as the answer.
- Good {tier} one-word answers look like {one_word}.
- Good {tier} two-word answers look like {two_words}."#,
        tier = tier,
        id = topic.get(),
        name = info.name,
        description = info.description,
        one_word = one_word,
        two_words = two_words,
    )
}

/// Open-ended challenge request
pub fn challenge_prompt(tier: Difficulty, topic: Option<TopicId>) -> String {
    let focus = match topic {
        Some(topic) => format!(
            " focused on SDG {} ({})",
            topic.get(),
            topic.info().name
        ),
        None => String::new(),
    };
    format!(
        r#"Generate a {tier} sustainability-themed problem-solving challenge{focus}.
Reply with JSON only, in exactly this shape:
{{
  "question": "A detailed description of the sustainability problem to solve",
  "solution": "A concise suggested solution",
  "explanation": "Why the solution works and how it addresses the issue",
  "hint": "A hint that guides towards the solution without giving it away",
  "difficulty": "{tier}",
  "sdgs": [1 to 3 relevant SDG numbers, most relevant first]
}}"#,
        tier = tier,
        focus = focus,
    )
}

/// Lenient semantic judgement of a challenge answer
pub fn judge_prompt(question: &str, reference_solution: &str, answer: &str) -> String {
    format!(
        r#"Question: {question}
Correct Answer: {reference_solution}
User Answer: {answer}

Decide whether the user's answer is correct or close enough to the correct answer.
Judge the meaning, not the wording. If the core ideas are present, it is correct.
Respond with exactly one word: "correct" or "incorrect"."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_riddle_prompt_mentions_topic_and_tier() {
        let prompt = riddle_prompt(Difficulty::Medium, TopicId::new(6).unwrap());
        assert!(prompt.contains("SDG 6"));
        assert!(prompt.contains("Clean Water and Sanitation"));
        assert!(prompt.contains("\"difficulty\": \"medium\""));
        assert!(prompt.contains("smart grid"));
    }

    #[test]
    fn test_challenge_prompt_focus_optional() {
        assert!(!challenge_prompt(Difficulty::Hard, None).contains("focused on"));
        let focused = challenge_prompt(Difficulty::Hard, Some(TopicId::new(14).unwrap()));
        assert!(focused.contains("focused on SDG 14 (Life Below Water)"));
    }
}
