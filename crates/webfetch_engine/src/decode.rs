use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Decode raw response bytes into UTF-8 text.
///
/// Encoding is chosen by BOM, then the Content-Type charset parameter, then
/// `chardetng` detection. Undecodable sequences become replacement characters
/// instead of failing; a badly encoded page should still yield searchable
/// text. Returns the text and the name of the encoding actually used.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> (String, &'static str) {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, encoding);
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let part = part.trim();
        let prefix_matches = part
            .get(..8)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("charset="));
        if prefix_matches {
            part.get(8..)
                .map(|value| value.trim_matches([' ', '"', '\''].as_ref()).to_string())
        } else {
            None
        }
    })
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> (String, &'static str) {
    let (text, actual, _had_errors) = encoding.decode(bytes);
    (text.into_owned(), actual.name())
}
