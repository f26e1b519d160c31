use crate::domain::model::{Verdict, VerdictReason};

const PREAMBLE: &str =
    "I'm a permaculture and gardening assistant, so I can only help with growing-related questions.";

const TOO_VAGUE: &str = "Could you share a bit more detail? Tell me what you're growing, \
where you're growing it, and what you'd like to achieve, and I'll do my best to help.";

const OUT_OF_SCOPE: &str =
    "That topic is outside what I can help with. Here are some things I can help with:";

/// Shown in order after the out-of-scope notice.
pub const SUGGESTIONS: &[&str] = &[
    "Planning a garden bed or food forest layout",
    "Building healthy soil and managing compost",
    "Choosing companion plants and crop rotations",
    "Diagnosing pests, diseases and nutrient problems",
    "Saving water with mulch, swales and smart irrigation",
    "Attracting pollinators and beneficial insects",
];

pub const CLOSING: &str = "Feel free to ask me anything about your garden!";

/// Human-readable refusal for a rejected verdict. Deterministic.
pub fn compose_rejection(verdict: &Verdict) -> String {
    let mut message = String::from(PREAMBLE);
    message.push_str("\n\n");

    match verdict.reason {
        VerdictReason::TooVague => message.push_str(TOO_VAGUE),
        VerdictReason::OffTopic | VerdictReason::InScope => {
            message.push_str(OUT_OF_SCOPE);
            message.push('\n');
            for suggestion in SUGGESTIONS {
                message.push_str("\n• ");
                message.push_str(suggestion);
            }
        }
    }

    message.push_str("\n\n");
    message.push_str(CLOSING);
    message
}
