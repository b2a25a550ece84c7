//! Locate the structured-data span inside free-form model output
//!
//! Two strategies, in order:
//! 1. a fenced block whose label is one of the configured data-format names
//! 2. the last top-level `{...}` span, found in one forward pass

use crate::config::ExtractorConfig;

/// Where a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// Body of a fenced code block
    Fence,
    /// Brace-delimited span in the text
    Braces,
}

/// A substring of the model output that should hold the JSON answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// Candidate text, trimmed
    pub text: &'a str,
    /// Strategy that found it
    pub source: CandidateSource,
}

/// Find the candidate span, or `None` if the text has neither a matching
/// fence nor a brace-delimited span
pub fn locate_candidate<'a>(raw: &'a str, config: &ExtractorConfig) -> Option<Candidate<'a>> {
    if let Some(body) = find_fenced_block(raw, config) {
        return Some(Candidate {
            text: body,
            source: CandidateSource::Fence,
        });
    }

    find_brace_span(raw).map(|text| Candidate {
        text,
        source: CandidateSource::Braces,
    })
}

const FENCE: &str = "```";

/// A closed fenced block
#[derive(Debug, PartialEq, Eq)]
struct Fence<'a> {
    label: &'a str,
    body: &'a str,
}

/// All closed fences, in order. An unterminated fence ends the scan.
fn fences(text: &str) -> Vec<Fence<'_>> {
    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(rel) = text[pos..].find(FENCE) {
        let after = pos + rel + FENCE.len();
        let label_len = text[after..]
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'+'))
            .count();
        let body_start = after + label_len;

        let Some(close_rel) = text[body_start..].find(FENCE) else {
            break;
        };
        let close = body_start + close_rel;
        found.push(Fence {
            label: &text[after..body_start],
            body: text[body_start..close].trim(),
        });
        pos = close + FENCE.len();
    }

    found
}

fn find_fenced_block<'a>(text: &'a str, config: &ExtractorConfig) -> Option<&'a str> {
    let fences = fences(text);

    let labeled = fences.iter().find(|f| {
        config
            .fence_labels
            .iter()
            .any(|label| label.eq_ignore_ascii_case(f.label))
    });
    if let Some(fence) = labeled {
        return Some(fence.body);
    }

    if config.accept_unlabeled_fences {
        return fences
            .iter()
            .find(|f| f.label.is_empty() && f.body.starts_with('{'))
            .map(|f| f.body);
    }

    None
}

/// Last complete top-level object. A top-level object that never closes
/// yields everything from its `{` to the end, so truncated output fails to
/// parse instead of surfacing one of its nested objects.
///
/// A `{` not followed by a quoted key is prose; it is tracked for nesting
/// but never taken as the start of a truncated answer.
fn find_brace_span(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    // (position, starts an object) of each `{` still waiting for its `}`
    let mut open: Vec<(usize, bool)> = Vec::new();
    // (start, end, depth) of each closed span, in closing order
    let mut closed: Vec<(usize, usize, usize)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' if !open.is_empty() => in_string = true,
            b'{' => open.push((i, starts_object(&bytes[i + 1..]))),
            b'}' => {
                if let Some((start, _)) = open.pop() {
                    closed.push((start, i, open.len()));
                }
            }
            _ => {}
        }
    }

    if let Some(&(start, _)) = open.iter().find(|(_, object)| *object) {
        return Some(text[start..].trim_end());
    }

    // Only prose braces are left open; a span is top level when its depth
    // counts just the prose braces before it
    closed
        .iter()
        .rev()
        .find(|(start, _, depth)| *depth == open.partition_point(|(pos, _)| pos < start))
        .map(|&(start, end, _)| &text[start..=end])
}

/// Whether the bytes after a `{` begin with a quoted key
fn starts_object(rest: &[u8]) -> bool {
    rest.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'"')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locate(raw: &str) -> Option<Candidate<'_>> {
        locate_candidate(raw, &ExtractorConfig::default())
    }

    #[test]
    fn test_prefers_json_fence() {
        let raw = "Some {prose}\n```json\n{\"a\": 1}\n```\nthen {\"b\": 2}";
        let candidate = locate(raw).unwrap();
        assert_eq!(candidate.text, "{\"a\": 1}");
        assert_eq!(candidate.source, CandidateSource::Fence);
    }

    #[test]
    fn test_fence_label_is_case_insensitive() {
        let candidate = locate("```JSON\n{\"a\": 1}\n```").unwrap();
        assert_eq!(candidate.text, "{\"a\": 1}");
    }

    #[test]
    fn test_first_labeled_fence_wins() {
        let raw = "```python\nprint({})\n```\n```json\n{\"a\": 1}\n```\n```json\n{\"a\": 2}\n```";
        assert_eq!(locate(raw).unwrap().text, "{\"a\": 1}");
    }

    #[test]
    fn test_fence_on_one_line() {
        assert_eq!(locate("```json {\"a\": 1}```").unwrap().text, "{\"a\": 1}");
    }

    #[test]
    fn test_unterminated_fence_falls_back_to_braces() {
        let raw = "```json\n{\"a\": {\"b\": 1}}";
        let candidate = locate(raw).unwrap();
        assert_eq!(candidate.text, "{\"a\": {\"b\": 1}}");
        assert_eq!(candidate.source, CandidateSource::Braces);
    }

    #[test]
    fn test_unlabeled_fence_needs_opt_in() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(locate(raw).unwrap().source, CandidateSource::Braces);

        let config = ExtractorConfig {
            accept_unlabeled_fences: true,
            ..ExtractorConfig::default()
        };
        let candidate = locate_candidate(raw, &config).unwrap();
        assert_eq!(candidate.source, CandidateSource::Fence);
        assert_eq!(candidate.text, "{\"a\": 1}");
    }

    #[test]
    fn test_selects_last_top_level_object() {
        let raw = r#"For example {example}. The answer: {"risk_score":{"level":"Low"}}"#;
        assert_eq!(locate(raw).unwrap().text, r#"{"risk_score":{"level":"Low"}}"#);
    }

    #[test]
    fn test_keeps_nested_objects_whole() {
        let raw = r#"{"a": {"b": {"c": 1}}, "d": 2}"#;
        assert_eq!(locate(raw).unwrap().text, raw);
    }

    #[test]
    fn test_trailing_prose_after_object() {
        let raw = r#"Result {"a": 1} - hope this helps!"#;
        assert_eq!(locate(raw).unwrap().text, r#"{"a": 1}"#);
    }

    #[test]
    fn test_stray_closing_brace_in_trailing_prose() {
        let raw = r#"{"a": 1} and a smiley :}"#;
        assert_eq!(locate(raw).unwrap().text, r#"{"a": 1}"#);
    }

    #[test]
    fn test_stray_opening_brace_in_leading_prose() {
        let raw = r#"Use { with care. {"a": 1}"#;
        assert_eq!(locate(raw).unwrap().text, r#"{"a": 1}"#);
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let raw = r#"{"note": "use } and { freely", "escaped": "a \"}\" b"}"#;
        assert_eq!(locate(raw).unwrap().text, raw);
    }

    #[test]
    fn test_unbalanced_span_is_still_a_candidate() {
        let raw = r#"{"a": "unterminated}"#;
        assert_eq!(locate(raw).unwrap().text, raw);
    }

    #[test]
    fn test_no_candidate() {
        assert!(locate("I think the crop looks fine but I can't give numbers.").is_none());
        assert!(locate("only an opening { brace").is_none());
        assert!(locate("} backwards {").is_none());
        assert!(locate("").is_none());
    }

    #[test]
    fn test_multibyte_prose() {
        let raw = "Température élevée 🌡️ {\"t\": 31}";
        assert_eq!(locate(raw).unwrap().text, "{\"t\": 31}");
    }

    #[test]
    fn test_truncated_object_is_not_replaced_by_nested_one() {
        let raw = r#"{"predicted_ndvi": {"value": 0.8, "change_percent": 5, "confidence": 90}, "note": "unterminated"#;
        assert_eq!(locate(raw).unwrap().text, raw);

        let raw = "Answer:\n{ \"summary\": \"outer\", \"by_block\": {\"summary\": \"inner\"}, \"more\": \"tru  \n";
        assert_eq!(
            locate(raw).unwrap().text,
            "{ \"summary\": \"outer\", \"by_block\": {\"summary\": \"inner\"}, \"more\": \"tru"
        );
    }

    #[test]
    fn test_complete_answer_inside_prose_brace() {
        let raw = r#"Note {see below: {"a": {"b": 1}} and {"c": 2}"#;
        assert_eq!(locate(raw).unwrap().text, r#"{"c": 2}"#);
    }

    #[test]
    fn test_escaped_backslash_before_quote() {
        let raw = r#"{"path": "C:\\", "brace": "}"} done"#;
        assert_eq!(locate(raw).unwrap().text, r#"{"path": "C:\\", "brace": "}"}"#);
    }

    #[test]
    fn test_large_brace_heavy_input_is_linear() {
        let started = std::time::Instant::now();
        let closers = "}".repeat(400_000);
        assert!(locate(&closers).is_none());

        let openers = "{ ".repeat(200_000);
        assert!(locate(&openers).is_none());

        let pairs = format!("{}{}", "{}".repeat(200_000), r#"{"a": 1}"#);
        assert_eq!(locate(&pairs).unwrap().text, r#"{"a": 1}"#);

        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }
}
