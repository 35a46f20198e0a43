//! Response body decoding.
//!
//! A page body is JSON, optionally gzip-compressed when upstream answers with
//! `Content-Encoding: gzip`; every member of a multi-member gzip stream is
//! read. Decoding is all-or-nothing: a page is merged into
//! the accumulator only when every record in it deserializes.

use std::io::Read;

use flate2::read::MultiGzDecoder;
use reqwest::header::{CONTENT_ENCODING, HeaderMap};

use super::error::DecodeError;
use crate::catalog::Catalog;

/// Body encodings understood by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    /// Body is plain JSON.
    Identity,
    /// Body is a gzip stream wrapping JSON.
    Gzip,
}

impl ContentEncoding {
    /// Reads the encoding from response headers.
    ///
    /// Only an exact `gzip` value selects decompression.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers.get(CONTENT_ENCODING) {
            Some(value) if value == "gzip" => Self::Gzip,
            _ => Self::Identity,
        }
    }
}

/// Decodes one page body.
///
/// # Errors
///
/// Returns [`DecodeError::Gzip`] when a gzip body is corrupt and
/// [`DecodeError::Json`] when the JSON does not match the catalog shape.
pub fn decode_page(encoding: ContentEncoding, body: &[u8]) -> Result<Catalog, DecodeError> {
    match encoding {
        ContentEncoding::Identity => serde_json::from_slice(body).map_err(DecodeError::Json),
        ContentEncoding::Gzip => from_reader(MultiGzDecoder::new(body)),
    }
}

/// Decodes one page body and merges it into `catalog`.
///
/// On error `catalog` is left untouched.
///
/// # Errors
///
/// Same as [`decode_page`].
pub fn decode_into(
    encoding: ContentEncoding,
    body: &[u8],
    catalog: &mut Catalog,
) -> Result<usize, DecodeError> {
    let page = decode_page(encoding, body)?;
    let count = page.len();
    catalog.merge(page);
    Ok(count)
}

fn from_reader<R: Read>(reader: R) -> Result<Catalog, DecodeError> {
    serde_json::from_reader(reader).map_err(|e| {
        if e.is_io() {
            DecodeError::Gzip(std::io::Error::from(e))
        } else {
            DecodeError::Json(e)
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use reqwest::header::HeaderValue;

    use super::*;

    const PAGE: &str = r#"{
        "2": {"id": "2", "type": "country", "name": "Albania", "ancestors": [{"id": "6", "type": "continent"}]},
        "136": {"id": "136", "type": "country", "name": "Nigeria"}
    }"#;

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_encoding_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(ContentEncoding::from_headers(&headers), ContentEncoding::Identity);

        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        assert_eq!(ContentEncoding::from_headers(&headers), ContentEncoding::Gzip);

        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("br"));
        assert_eq!(ContentEncoding::from_headers(&headers), ContentEncoding::Identity);
    }

    #[test]
    fn test_decode_plain_page() {
        let catalog = decode_page(ContentEncoding::Identity, PAGE.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("2").unwrap().name, "Albania");
    }

    #[test]
    fn test_gzip_page_decodes_like_plain_page() {
        let plain = decode_page(ContentEncoding::Identity, PAGE.as_bytes()).unwrap();
        let compressed = decode_page(ContentEncoding::Gzip, &gzip(PAGE.as_bytes())).unwrap();
        assert_eq!(plain, compressed);
        assert_eq!(compressed.get("136").unwrap().name, "Nigeria");
    }

    #[test]
    fn test_multi_member_gzip_is_read_to_the_end() {
        let (head, tail) = PAGE.split_at(PAGE.len() / 2);
        let mut body = gzip(head.as_bytes());
        body.extend(gzip(tail.as_bytes()));

        let catalog = decode_page(ContentEncoding::Gzip, &body).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("136").unwrap().name, "Nigeria");
    }

    #[test]
    fn test_invalid_gzip_is_gzip_error() {
        let result = decode_page(ContentEncoding::Gzip, PAGE.as_bytes());
        assert!(
            matches!(result, Err(DecodeError::Gzip(_))),
            "expected gzip error, got {result:?}"
        );
    }

    #[test]
    fn test_type_mismatch_is_json_error() {
        let result = decode_page(ContentEncoding::Identity, br#"{"1": {"id": 5}}"#);
        match result {
            Err(DecodeError::Json(e)) => assert!(e.to_string().contains("invalid type")),
            other => panic!("expected json error, got {other:?}"),
        }
    }

    #[test]
    fn test_gzip_wrapping_bad_json_is_json_error() {
        let result = decode_page(ContentEncoding::Gzip, &gzip(b"[1, 2]"));
        assert!(matches!(result, Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_decode_into_leaves_catalog_untouched_on_error() {
        let mut catalog = Catalog::new();
        decode_into(ContentEncoding::Identity, PAGE.as_bytes(), &mut catalog).unwrap();

        let bad = br#"{"9": {"id": "9"}, "10": {"id": ["x"]}}"#;
        assert!(decode_into(ContentEncoding::Identity, bad, &mut catalog).is_err());
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("9").is_none());
    }
}
