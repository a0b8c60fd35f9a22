use crate::block::Span;

/// Emphasis delimiter.
pub const MARKER: &str = "**";

/// Split a sanitized line into alternating plain/emphasized spans.
///
/// Parts at even positions are plain, odd positions emphasized. An unbalanced
/// marker is not repaired: the tail after the last marker simply takes the
/// style its position implies.
pub fn spans(line: &str) -> Vec<Span> {
    line.split(MARKER)
        .enumerate()
        .map(|(i, part)| Span {
            text: part.to_string(),
            emphasized: i % 2 == 1,
        })
        .collect()
}

/// Remove every emphasis marker, keeping the text between them.
pub fn strip_markers(text: &str) -> String {
    text.replace(MARKER, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::sanitize;
    use proptest::prelude::*;

    fn joined(spans: &[Span]) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn leading_bold() {
        assert_eq!(
            spans("**Bold** and plain"),
            vec![
                Span::plain(""),
                Span::emphasized("Bold"),
                Span::plain(" and plain"),
            ]
        );
    }

    #[test]
    fn no_markers_is_one_plain_span() {
        assert_eq!(spans("just text"), vec![Span::plain("just text")]);
        assert_eq!(spans(""), vec![Span::plain("")]);
    }

    #[test]
    fn several_bold_runs() {
        let out = spans("a **b** c **d**");
        let flags: Vec<bool> = out.iter().map(|s| s.emphasized).collect();
        assert_eq!(flags, vec![false, true, false, true, false]);
        assert_eq!(joined(&out), "a b c d");
    }

    #[test]
    fn concatenation_drops_only_markers() {
        for line in ["x **y** z", "**", "****", "a**b", "no markers", "**open"] {
            assert_eq!(joined(&spans(line)), strip_markers(line));
        }
    }

    // Known edge case: an odd marker count alternates by position and leaves
    // the remainder of the line emphasized.
    #[test]
    fn unbalanced_marker_alternates_by_position() {
        assert_eq!(
            spans("Total: **42 items"),
            vec![Span::plain("Total: "), Span::emphasized("42 items")]
        );
    }

    proptest! {
        #[test]
        fn prop_spans_concatenate_to_unmarked_line(raw in "[a-z *]{0,40}|\\PC*") {
            let line = sanitize(&raw);
            let out = spans(&line);
            prop_assert_eq!(joined(&out), strip_markers(&line));
            prop_assert_eq!(out.len(), line.matches(MARKER).count() + 1);
            for (i, span) in out.iter().enumerate() {
                prop_assert_eq!(span.emphasized, i % 2 == 1);
            }
        }
    }
}
