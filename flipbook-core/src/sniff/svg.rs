//! SVG animation markers.

/// Element openings that mark an SVG as animated.
///
/// `<animate` already covers `<animateTransform` and `<animateMotion`; they
/// are listed so the table reads as the set of SMIL elements it stands for.
pub const SVG_ANIMATION_MARKERS: &[&str] =
    &["<animate", "<animateTransform", "<animateMotion", "<set"];

/// Substring heuristic: any marker anywhere in the text means animated.
///
/// There is no tree walk. A marker inside a comment, a CDATA block or an
/// attribute value still counts, and CSS `@keyframes` or script-driven
/// animation is not detected. Note that `<set` also matches unrelated
/// elements such as `<setting>`.
pub fn is_animated_svg(text: &str) -> bool {
    SVG_ANIMATION_MARKERS
        .iter()
        .any(|marker| text.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_each_smil_element() {
        for doc in [
            r#"<svg><circle><animate attributeName="r" to="5"/></circle></svg>"#,
            r#"<svg><g><animateTransform type="rotate"/></g></svg>"#,
            r#"<svg><path><animateMotion path="M0 0"/></path></svg>"#,
            r#"<svg><rect><set attributeName="fill" to="red"/></rect></svg>"#,
        ] {
            assert!(is_animated_svg(doc), "expected animated: {doc}");
        }
    }

    #[test]
    fn static_document_is_not_animated() {
        let doc = r#"<svg width="10" height="10"><rect width="5" height="5"/></svg>"#;
        assert!(!is_animated_svg(doc));
    }

    #[test]
    fn matches_inside_comments_and_attribute_values() {
        assert!(is_animated_svg("<svg><!-- <animate --></svg>"));
        assert!(is_animated_svg(r#"<svg><desc title="<set>"/></svg>"#));
    }

    #[test]
    fn css_keyframes_are_not_detected() {
        let doc = "<svg><style>@keyframes spin { to { transform: rotate(1turn) } }</style></svg>";
        assert!(!is_animated_svg(doc));
    }

    #[test]
    fn marker_match_is_case_sensitive() {
        assert!(!is_animated_svg("<svg><ANIMATE/></svg>"));
    }
}
