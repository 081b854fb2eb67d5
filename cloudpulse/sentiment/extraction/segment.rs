use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Abbreviations that end in a period without ending the sentence.
const ABBREVIATIONS: &[&str] = &[
    "approx.", "corp.", "dept.", "dr.", "e.g.", "est.", "etc.", "fig.", "i.e.", "inc.", "jr.",
    "ltd.", "mr.", "mrs.", "ms.", "no.", "prof.", "sr.", "st.", "u.s.", "vs.",
];

// A lone initial such as "J." in "J. Smith".
static INITIAL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\p{Lu}\.$").ok());

/// Splits `text` into trimmed sentences.
///
/// Boundaries follow Unicode sentence segmentation (UAX #29), which already
/// keeps URLs, domains and decimals intact. A segment is joined to the one
/// after it when it was cut after a known abbreviation or an initial, or when
/// it has no terminal punctuation (a bare line break is not a boundary).
#[must_use]
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences: Vec<String> = Vec::new();
    let mut carry = false;
    for segment in text.unicode_sentences() {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match sentences.last_mut() {
            Some(previous) if carry => {
                previous.push(' ');
                previous.push_str(segment);
            }
            _ => sentences.push(segment.to_string()),
        }
        carry = !ends_with_terminal(segment) || ends_with_abbreviation(segment);
    }
    sentences
}

fn ends_with_terminal(segment: &str) -> bool {
    segment
        .trim_end_matches(|c: char| matches!(c, ')' | ']' | '"' | '\'' | '”' | '’'))
        .ends_with(|c: char| matches!(c, '.' | '!' | '?' | '…' | '。' | '！' | '？'))
}

fn ends_with_abbreviation(segment: &str) -> bool {
    let Some(last) = segment.split_whitespace().last() else {
        return false;
    };
    let last = last.trim_start_matches(|c: char| matches!(c, '(' | '"' | '\''));
    let lowered = last.to_lowercase();
    ABBREVIATIONS.contains(&lowered.as_str())
        || INITIAL.as_ref().is_some_and(|re| re.is_match(last))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminal_punctuation() {
        let sentences = split_sentences("AWS is cheap. Azure is slow! Is GCP secure?");
        assert_eq!(
            sentences,
            ["AWS is cheap.", "Azure is slow!", "Is GCP secure?"]
        );
    }

    #[test]
    fn keeps_abbreviations_and_urls_together() {
        let sentences = split_sentences(
            "Providers vs. on-prem: AWS costs approx. 3.5 dollars per hour. See https://aws.amazon.com/pricing for details.",
        );
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].starts_with("Providers vs. on-prem"));
        assert!(sentences[0].ends_with("3.5 dollars per hour."));
        assert!(sentences[1].contains("https://aws.amazon.com/pricing"));
    }

    #[test]
    fn joins_segments_cut_after_initials() {
        let sentences = split_sentences("Ask J. Smith about Azure support. He knows.");
        assert_eq!(sentences, ["Ask J. Smith about Azure support.", "He knows."]);
    }

    #[test]
    fn line_breaks_without_punctuation_do_not_split() {
        assert_eq!(
            split_sentences("I moved to AWS\npricing is great there"),
            ["I moved to AWS pricing is great there"]
        );
        assert_eq!(
            split_sentences("Azure is slow.\nGCP is fast!\n\nAWS (us-east-1) is down?\nok"),
            ["Azure is slow.", "GCP is fast!", "AWS (us-east-1) is down?", "ok"]
        );
    }

    #[test]
    fn empty_text_has_no_sentences() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n ").is_empty());
    }

    #[test]
    fn text_without_terminator_is_one_sentence() {
        assert_eq!(split_sentences("GCP pricing is fine"), ["GCP pricing is fine"]);
    }
}
