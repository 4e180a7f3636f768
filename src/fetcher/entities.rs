//! HTML entity decoding for feed text.
//!
//! Feeds routinely escape their markup twice, once for HTML and once for XML.
//! The XML layer is decoded by the parser, this module decodes the remaining
//! HTML layer, exactly once.

use std::borrow::Cow;

/// Decode every HTML5 named reference plus decimal and hexadecimal ones.
///
/// Unknown references are kept verbatim.
#[must_use]
pub fn unescape(input: &str) -> Cow<'_, str> {
	if !input.contains('&') {
		return Cow::Borrowed(input);
	}

	html_escape::decode_html_entities(input)
}
