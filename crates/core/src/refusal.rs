//! Detection of refusal replies from the text-generation service.
//!
//! The service occasionally declines to describe an image. A declined
//! reply must never be used as a synthesis prompt, so the generation flow
//! checks every reply here and retries on a match.

/// Case-insensitive substrings that mark a declined reply.
const REFUSAL_MARKERS: &[&str] = &[
    "i'm sorry",
    "i am sorry",
    "i can't",
    "i cannot",
    "i'm unable",
    "i am unable",
];

/// Replies at or above this many words are treated as usable content even
/// when a marker substring appears (long descriptions can legitimately
/// contain phrases like "I cannot overstate...").
const MAX_REFUSAL_WORDS: usize = 40;

/// Whether `reply` is a refusal rather than a usable description.
pub fn is_refusal(reply: &str) -> bool {
    if reply.split_whitespace().count() >= MAX_REFUSAL_WORDS {
        return false;
    }

    let lowered = reply.to_lowercase();
    REFUSAL_MARKERS.iter().any(|marker| lowered.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_short_apology() {
        assert!(is_refusal("I'm sorry, but I can't help with that request."));
    }

    #[test]
    fn detects_markers_case_insensitively() {
        assert!(is_refusal("I CANNOT assist with this."));
        assert!(is_refusal("i'm unable to describe this image."));
    }

    #[test]
    fn accepts_normal_descriptions() {
        assert!(!is_refusal("A finely stitched leather wallet on a marble surface."));
    }

    #[test]
    fn empty_reply_is_not_a_refusal() {
        // An empty reply is a service bug, not a refusal; the caller
        // surfaces it as an API error instead of retrying.
        assert!(!is_refusal(""));
    }

    #[test]
    fn long_reply_with_marker_is_usable() {
        let mut reply = String::from("I cannot overstate the elegance here. ");
        reply.push_str(&"The product shows detailed craftsmanship throughout the piece. ".repeat(8));
        assert!(!is_refusal(&reply));
    }
}
