//! Links that open a produced document in the hosted draw.io viewer.

use url::form_urlencoded::byte_serialize;

use crate::drawio::DIAGRAM_ID;

const VIEWER_BASE: &str = "https://viewer.diagrams.net/";

/// Viewer URL with the whole document inlined after `#R`.
pub fn viewer_url(xml: &str) -> String {
    format!(
        "{}?lightbox=1&highlight=0000ff&layers=1&nav=1&page-id={}#R{}",
        VIEWER_BASE,
        DIAGRAM_ID,
        encode_component(xml)
    )
}

/// Percent-encode for a URL fragment. The form encoder writes spaces as `+`,
/// which the viewer would keep literally.
fn encode_component(s: &str) -> String {
    byte_serialize(s.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_prefix() {
        let url = viewer_url("<mxfile/>");
        assert_eq!(
            url,
            "https://viewer.diagrams.net/?lightbox=1&highlight=0000ff&layers=1&nav=1&page-id=diagram1#R%3Cmxfile%2F%3E"
        );
    }

    #[test]
    fn test_spaces_and_plus() {
        assert_eq!(encode_component("a b+c"), "a%20b%2Bc");
        assert_eq!(encode_component("é\n"), "%C3%A9%0A");
    }
}
