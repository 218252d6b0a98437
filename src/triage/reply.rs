//! Templated reply generation.
//!
//! A pure function from (body, category) to a fixed reply template: no
//! I/O, no shared state, safe to call repeatedly and concurrently.
//! Identical input always produces byte-identical output.

use crate::domain::Category;

/// One keyword-trigger rule: fires when any of its keywords occurs in the
/// lowercased body (plain substring containment, by design).
struct ReplyRule {
    keywords: &'static [&'static str],
    template: &'static str,
}

/// Rules are evaluated top to bottom; the first match wins, so order is
/// significant when keywords co-occur ("deadline" beats "meeting" here).
const WORK_RULES: &[ReplyRule] = &[
    ReplyRule {
        keywords: &["deadline", "project", "due", "update"],
        template: "Thanks for the update. I’ll make sure everything is on track and share progress shortly.",
    },
    ReplyRule {
        keywords: &["meeting"],
        template: "Thanks for scheduling the meeting. I'll be there.",
    },
];

const WORK_DEFAULT: &str =
    "Thank you for your message. I’ll review it and get back to you soon.";

/// Evaluated in order: coffee, then dinner, then movie.
const PERSONAL_RULES: &[ReplyRule] = &[
    ReplyRule {
        keywords: &["coffee"],
        template: "Sounds great! I'm up for coffee this weekend. When and where?",
    },
    ReplyRule {
        keywords: &["dinner"],
        template: "Dinner sounds lovely! Let’s pick a time.",
    },
    ReplyRule {
        keywords: &["movie"],
        template: "That sounds like fun! Let me know the time and movie.",
    },
];

const PERSONAL_DEFAULT: &str = "Hey! Great to hear from you. Let me know more.";

/// Spam never gets a real reply, whatever the body says.
const SPAM_REPLY: &str = "No reply required.";

/// Terminal fallback for general mail.
const GENERAL_REPLY: &str = "Thanks for reaching out. I'll get back to you soon.";

/// Stateless reply generator.
pub struct ReplyGenerator;

impl ReplyGenerator {
    /// Creates a reply generator.
    pub fn new() -> Self {
        Self
    }

    /// Generates the templated draft reply for a message body and its
    /// category.
    pub fn generate(&self, body: &str, category: Category) -> &'static str {
        let body = body.to_lowercase();
        match category {
            Category::Work => Self::first_match(WORK_RULES, &body).unwrap_or(WORK_DEFAULT),
            Category::Personal => {
                Self::first_match(PERSONAL_RULES, &body).unwrap_or(PERSONAL_DEFAULT)
            }
            Category::Spam => SPAM_REPLY,
            Category::General => GENERAL_REPLY,
        }
    }

    fn first_match(rules: &[ReplyRule], lowered_body: &str) -> Option<&'static str> {
        rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| lowered_body.contains(kw)))
            .map(|rule| rule.template)
    }
}

impl Default for ReplyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn personal_coffee_reply() {
        let gen = ReplyGenerator::new();
        assert_eq!(
            gen.generate("Are you free this Sunday for coffee?", Category::Personal),
            "Sounds great! I'm up for coffee this weekend. When and where?"
        );
    }

    #[test]
    fn personal_rule_order_is_coffee_then_dinner_then_movie() {
        let gen = ReplyGenerator::new();
        // All three keywords present: coffee wins.
        assert_eq!(
            gen.generate(
                "coffee then dinner then a movie?",
                Category::Personal
            ),
            "Sounds great! I'm up for coffee this weekend. When and where?"
        );
        // Dinner and movie: dinner wins.
        assert_eq!(
            gen.generate("dinner and a movie?", Category::Personal),
            "Dinner sounds lovely! Let’s pick a time."
        );
        assert_eq!(
            gen.generate("movie on friday?", Category::Personal),
            "That sounds like fun! Let me know the time and movie."
        );
    }

    #[test]
    fn personal_default_when_nothing_matches() {
        let gen = ReplyGenerator::new();
        assert_eq!(
            gen.generate("long time no see!", Category::Personal),
            "Hey! Great to hear from you. Let me know more."
        );
    }

    #[test]
    fn work_deadline_branch() {
        let gen = ReplyGenerator::new();
        assert_eq!(
            gen.generate(
                "The final report is due by Friday, please send an update.",
                Category::Work
            ),
            "Thanks for the update. I’ll make sure everything is on track and share progress shortly."
        );
    }

    #[test]
    fn each_deadline_trigger_fires_alone() {
        let gen = ReplyGenerator::new();
        for body in [
            "the deadline moved",
            "new project kickoff",
            "payment is due",
            "quick update for you",
        ] {
            assert_eq!(
                gen.generate(body, Category::Work),
                "Thanks for the update. I’ll make sure everything is on track and share progress shortly."
            );
        }
    }

    #[test]
    fn work_deadline_beats_meeting_when_both_occur() {
        let gen = ReplyGenerator::new();
        assert_eq!(
            gen.generate(
                "project review meeting moved to monday",
                Category::Work
            ),
            "Thanks for the update. I’ll make sure everything is on track and share progress shortly."
        );
    }

    #[test]
    fn work_meeting_branch_and_default() {
        let gen = ReplyGenerator::new();
        assert_eq!(
            gen.generate("the meeting is at 10am", Category::Work),
            "Thanks for scheduling the meeting. I'll be there."
        );
        assert_eq!(
            gen.generate("FYI the office closes early", Category::Work),
            "Thank you for your message. I’ll review it and get back to you soon."
        );
    }

    #[test]
    fn spam_always_gets_the_no_reply_sentinel() {
        let gen = ReplyGenerator::new();
        for body in [
            "",
            "you won a free coffee, click here",
            "deadline for claiming your prize is a meeting",
        ] {
            assert_eq!(gen.generate(body, Category::Spam), "No reply required.");
        }
    }

    #[test]
    fn general_fallback() {
        let gen = ReplyGenerator::new();
        assert_eq!(
            gen.generate("your parcel has shipped", Category::General),
            "Thanks for reaching out. I'll get back to you soon."
        );
    }

    #[test]
    fn generate_is_pure_and_byte_identical() {
        let gen = ReplyGenerator::new();
        let first = gen.generate("coffee?", Category::Personal);
        for _ in 0..10 {
            assert_eq!(gen.generate("coffee?", Category::Personal), first);
        }
    }

    #[test]
    fn substring_containment_is_intended() {
        let gen = ReplyGenerator::new();
        // "coffee" inside a larger word still triggers the coffee rule.
        assert_eq!(
            gen.generate("visiting the coffeehouse", Category::Personal),
            "Sounds great! I'm up for coffee this weekend. When and where?"
        );
    }

    #[test]
    fn casing_does_not_change_the_reply() {
        let gen = ReplyGenerator::new();
        assert_eq!(
            gen.generate("COFFEE THIS SUNDAY", Category::Personal),
            gen.generate("coffee this sunday", Category::Personal)
        );
    }
}
