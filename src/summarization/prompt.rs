use super::SummaryLength;

/// Summary the model is told to return for empty or garbled input.
pub const NO_READABLE_CONTENT: &str = "No readable content.";

/// Build the instruction prompt for one document.
///
/// The document text goes last, between `"""` delimiters. The text is not escaped, so a
/// document containing the delimiter can blur the boundary between instructions and content.
pub fn build_prompt(text: &str, length: SummaryLength) -> String {
    let mut prompt = String::with_capacity(text.len() + 1024);
    prompt.push_str(
        "You are an expert document summarizer. Respond with STRICT JSON only: no prose, no \
         markdown, no code fences. Use exactly this schema:\n",
    );
    prompt.push_str("{\"summary\": string, \"key_points\": array of string}\n\n");
    prompt.push_str("Rules:\n");
    prompt.push_str(&format!(
        "- The summary should be ≈{} words.\n",
        length.word_range()
    ));
    prompt.push_str("- key_points lists the most important takeaways, most important first.\n");
    prompt.push_str("- Preserve names, numbers, dates, and definitions exactly as written.\n");
    prompt.push_str("- Keep a neutral, factual tone. Do not add information that is not in the text.\n");
    prompt.push_str(&format!(
        "- If the input is empty or garbled, respond with {{\"summary\": \"{NO_READABLE_CONTENT}\", \"key_points\": []}}.\n\n"
    ));
    prompt.push_str("TEXT:\n\"\"\"\n");
    prompt.push_str(text);
    prompt.push_str("\n\"\"\"\n");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_prompt_quotes_short_range() {
        let prompt = build_prompt("body", SummaryLength::Short);
        assert!(prompt.contains("≈80-120 words"));
        assert!(!prompt.contains("≈150-250 words"));
    }

    #[test]
    fn unknown_length_uses_medium_range() {
        let prompt = build_prompt("body", SummaryLength::from_label(Some("verbose")));
        assert!(prompt.contains("≈150-250 words"));
    }

    #[test]
    fn long_prompt_quotes_long_range() {
        assert!(build_prompt("body", SummaryLength::Long).contains("≈300-450 words"));
    }

    #[test]
    fn prompt_carries_schema_and_degenerate_instruction() {
        let prompt = build_prompt("body", SummaryLength::Medium);
        assert!(prompt.contains("{\"summary\": string, \"key_points\": array of string}"));
        assert!(prompt.contains("\"summary\": \"No readable content.\", \"key_points\": []"));
        assert!(prompt.contains("names, numbers"));
        assert!(prompt.contains("neutral"));
    }

    #[test]
    fn text_is_embedded_between_delimiters() {
        let prompt = build_prompt("  The quarterly report.  ", SummaryLength::Medium);
        assert!(prompt.ends_with("TEXT:\n\"\"\"\n  The quarterly report.  \n\"\"\"\n"));
    }
}
