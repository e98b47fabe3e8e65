//! SVG sizing.
//!
//! Only the attributes of the first `<svg>` start tag are read. Nested
//! `<svg>` elements further down the document are never consulted, and no
//! attempt is made to tell an outer wrapper from the drawing it contains.

use std::fmt;

use once_cell::sync::Lazy;
use quick_xml::{Reader, events::Event};
use regex::Regex;
use tracing::debug;

use super::{DEFAULT_HEIGHT, DEFAULT_WIDTH, DimensionSource, Dimensions};

/// Raw sizing attributes found on the root `<svg>` element.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SvgRootAttributes {
    /// Raw `viewBox` value.
    pub view_box: Option<String>,
    /// Raw `width` value, units included.
    pub width: Option<String>,
    /// Raw `height` value, units included.
    pub height: Option<String>,
}

impl SvgRootAttributes {
    fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "viewBox" => &mut self.view_box,
            "width" => &mut self.width,
            "height" => &mut self.height,
            _ => return,
        };
        // Keep the first occurrence of duplicated attributes.
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    /// Turns the raw attributes into a size.
    ///
    /// A non-blank `viewBox` wins; its third and fourth tokens are the width
    /// and height. Otherwise `width` and `height` are read independently,
    /// each falling back to 800 / 600 when absent.
    pub fn resolve(&self) -> Dimensions {
        if let Some(view_box) = self.view_box.as_deref().filter(|v| !v.trim().is_empty()) {
            let mut tokens = view_box
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|token| !token.is_empty());
            let width = tokens.nth(2).map_or(f64::NAN, parse_view_box_token);
            let height = tokens.next().map_or(f64::NAN, parse_view_box_token);
            return Dimensions::new(width, height, DimensionSource::ViewBox);
        }

        let source = match (&self.width, &self.height) {
            (Some(_), Some(_)) => DimensionSource::Attributes,
            (None, None) => DimensionSource::Default,
            _ => DimensionSource::PartialDefault,
        };
        let width = self.width.as_deref().map_or(DEFAULT_WIDTH, parse_length);
        let height = self.height.as_deref().map_or(DEFAULT_HEIGHT, parse_length);

        Dimensions::new(width, height, source)
    }
}

fn parse_view_box_token(token: &str) -> f64 {
    token.parse().unwrap_or(f64::NAN)
}

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?")
        .expect("leading number pattern is valid")
});

/// Reads the numeric prefix of a length (`"50px"` -> 50). Values with no
/// numeric prefix are `NaN`. Units, including `%`, are dropped.
fn parse_length(value: &str) -> f64 {
    LEADING_NUMBER
        .find(value)
        .and_then(|m| m.as_str().trim().parse().ok())
        .unwrap_or(f64::NAN)
}

/// How the root attributes are located in the document text.
pub trait SvgDimensionStrategy: fmt::Debug + Send + Sync {
    /// Finds the sizing attributes on the first `<svg>` start tag.
    fn root_attributes(&self, text: &str) -> SvgRootAttributes;

    /// Resolves the document's size.
    fn extract(&self, text: &str) -> Dimensions {
        self.root_attributes(text).resolve()
    }
}

static SVG_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<svg[\s/>]").expect("svg open pattern is valid")
});

/// An `<svg>` start tag whose attributes are all quoted. Group 1 holds the
/// attribute list, so a `>` inside a quoted value does not end the tag.
static SVG_START_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<svg((?:\s+[^\s=>/]+\s*=\s*(?:"[^"]*"|'[^']*'))*)\s*/?>"#)
        .expect("svg start tag pattern is valid")
});

/// One `name="value"` pair. Applied back to back over the attribute list,
/// each match begins where the previous quoted value ended.
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\s+([^\s=>/]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("attribute pattern is valid")
});

/// Regular-expression scan over the raw text. Tolerates documents that are
/// not well-formed XML.
#[derive(Clone, Copy, Debug, Default)]
pub struct PatternStrategy;

impl SvgDimensionStrategy for PatternStrategy {
    fn root_attributes(&self, text: &str) -> SvgRootAttributes {
        let mut attrs = SvgRootAttributes::default();
        let Some(open) = SVG_OPEN.find(text) else {
            return attrs;
        };
        // Only the first tag counts, even when it does not parse.
        let Some(list) = SVG_START_TAG
            .captures_at(text, open.start())
            .filter(|caps| caps.get(0).is_some_and(|m| m.start() == open.start()))
            .and_then(|caps| caps.get(1))
        else {
            return attrs;
        };

        let list = list.as_str();
        let mut offset = 0;
        while let Some(caps) = ATTRIBUTE.captures_at(list, offset) {
            let Some(whole) = caps.get(0).filter(|m| m.start() == offset) else {
                break;
            };
            offset = whole.end();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            attrs.set(&caps[1], value);
        }

        attrs
    }
}

/// Structured parse with `quick-xml`. Falls back to [`PatternStrategy`] when
/// the document fails to parse before an `<svg>` element is reached.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmlStrategy;

impl SvgDimensionStrategy for XmlStrategy {
    fn root_attributes(&self, text: &str) -> SvgRootAttributes {
        let mut reader = Reader::from_str(text);

        loop {
            match reader.read_event() {
                Ok(Event::Start(elem)) | Ok(Event::Empty(elem))
                    if elem.local_name().as_ref() == b"svg" =>
                {
                    let mut attrs = SvgRootAttributes::default();
                    for attr in elem.attributes().flatten() {
                        let name = String::from_utf8_lossy(attr.key.local_name().as_ref())
                            .into_owned();
                        let value = String::from_utf8_lossy(&attr.value).into_owned();
                        attrs.set(&name, value);
                    }
                    return attrs;
                }
                Ok(Event::Eof) => return PatternStrategy.root_attributes(text),
                Ok(_) => {}
                Err(err) => {
                    debug!(
                        position = reader.error_position(),
                        error = %err,
                        "svg did not parse as xml, scanning attributes instead"
                    );
                    return PatternStrategy.root_attributes(text);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both(text: &str) -> [Dimensions; 2] {
        [PatternStrategy.extract(text), XmlStrategy.extract(text)]
    }

    fn size(dims: Dimensions) -> (f64, f64) {
        (dims.width, dims.height)
    }

    #[test]
    fn view_box_wins_over_width_and_height() {
        for dims in both(r#"<svg width="10" height="10" viewBox="0 0 120 80"></svg>"#) {
            assert_eq!(size(dims), (120.0, 80.0));
            assert_eq!(dims.source, DimensionSource::ViewBox);
        }
    }

    #[test]
    fn fractional_and_comma_separated_view_box() {
        for dims in both(r#"<svg viewBox="0,0,  12.5 ,7.25"/>"#) {
            assert_eq!(size(dims), (12.5, 7.25));
        }
    }

    #[test]
    fn non_numeric_view_box_tokens_are_nan() {
        for dims in both(r#"<svg viewBox="0 0 wide 80"/>"#) {
            assert!(dims.width.is_nan());
            assert_eq!(dims.height, 80.0);
        }
        for dims in both(r#"<svg viewBox="0 0 120"/>"#) {
            assert_eq!(dims.width, 120.0);
            assert!(dims.height.is_nan());
        }
    }

    #[test]
    fn blank_view_box_falls_through_to_attributes() {
        for dims in both(r#"<svg viewBox=" " width="5" height="6"/>"#) {
            assert_eq!(size(dims), (5.0, 6.0));
            assert_eq!(dims.source, DimensionSource::Attributes);
        }
    }

    #[test]
    fn attributes_in_any_order_with_extras() {
        let doc = r#"<svg xmlns="http://www.w3.org/2000/svg"
            height='40'   stroke-width="3"
            version="1.1" width="50">"#;
        for dims in both(doc) {
            assert_eq!(size(dims), (50.0, 40.0));
        }
    }

    #[test]
    fn size_names_inside_other_values_are_ignored() {
        for dims in both(r#"<svg aria-label='a width="9"' width="50" height="40">"#) {
            assert_eq!(size(dims), (50.0, 40.0));
            assert_eq!(dims.source, DimensionSource::Attributes);
        }
    }

    #[test]
    fn angle_bracket_inside_a_value_does_not_end_the_tag() {
        for dims in both(r#"<svg data-x="a>b" width="50" height="40">"#) {
            assert_eq!(size(dims), (50.0, 40.0));
            assert_eq!(dims.source, DimensionSource::Attributes);
        }
    }

    #[test]
    fn pattern_never_skips_past_the_first_tag() {
        let doc = r#"<svg width=50 height=40><svg width="9" height="9"/></svg>"#;
        assert_eq!(PatternStrategy.extract(doc), Dimensions::fallback());
    }

    #[test]
    fn pattern_tolerates_spacing_around_equals() {
        let doc = "<svg\n\twidth = \"12\"\n\theight\t=\t'34'>";
        assert_eq!(size(PatternStrategy.extract(doc)), (12.0, 34.0));
    }

    #[test]
    fn missing_attributes_default_independently() {
        for dims in both(r#"<svg width="300"/>"#) {
            assert_eq!(size(dims), (300.0, 600.0));
            assert_eq!(dims.source, DimensionSource::PartialDefault);
        }
        for dims in both(r#"<svg height="20"/>"#) {
            assert_eq!(size(dims), (800.0, 20.0));
        }
        for dims in both("<svg>") {
            assert_eq!(size(dims), (800.0, 600.0));
            assert_eq!(dims.source, DimensionSource::Default);
        }
    }

    #[test]
    fn lengths_keep_their_numeric_prefix() {
        for dims in both(r#"<svg width="50px" height="2.5e1mm"/>"#) {
            assert_eq!(size(dims), (50.0, 25.0));
        }
        for dims in both(r#"<svg width="auto" height="10"/>"#) {
            assert!(dims.width.is_nan());
            assert_eq!(dims.height, 10.0);
        }
    }

    #[test]
    fn only_the_first_svg_tag_is_read() {
        let doc = r#"<?xml version="1.0"?>
            <!DOCTYPE svg>
            <svg width="64" height="48">
              <svg width="9000" height="9000" viewBox="0 0 1 1"/>
            </svg>"#;
        for dims in both(doc) {
            assert_eq!(size(dims), (64.0, 48.0));
        }
    }

    #[test]
    fn malformed_markup_still_yields_sizes() {
        let doc = r#"<svg width="70" height="30"><g></svg"#;
        for dims in both(doc) {
            assert_eq!(size(dims), (70.0, 30.0));
        }
        let doc = r#"<<svg width="71" height="31">"#;
        assert_eq!(size(XmlStrategy.extract(doc)), (71.0, 31.0));
    }

    #[test]
    fn text_without_svg_uses_fallback() {
        for dims in both("not an image at all") {
            assert_eq!(dims, Dimensions::fallback());
        }
    }
}
