use lib_utils::b64;

use crate::inbox_sync::client::MessagePart;

/// Walks the flattened part tree and concatenates the decoded UTF-8 text of every inline part.
/// A part with missing or malformed body data is skipped rather than aborting the whole message
/// (SPEC_FULL §4.2 message decoding).
pub fn decode_text_parts(parts: &[MessagePart]) -> String {
    let mut text = String::new();

    for part in parts {
        let Some(data) = &part.body_data else {
            continue;
        };
        match b64::b64u_decode_to_string(data) {
            Ok(decoded) => {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&decoded);
            }
            Err(_) => continue,
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(data: Option<&str>) -> MessagePart {
        MessagePart {
            mime_type: "text/plain".to_string(),
            body_data: data.map(|d| d.to_string()),
        }
    }

    #[test]
    fn concatenates_decoded_parts() {
        let a = lib_utils::b64::b64u_encode("hello");
        let b = lib_utils::b64::b64u_encode("world");
        let parts = vec![part(Some(&a)), part(Some(&b))];
        assert_eq!(decode_text_parts(&parts), "hello\nworld");
    }

    #[test]
    fn skips_malformed_part_without_aborting() {
        let good = lib_utils::b64::b64u_encode("ok");
        let parts = vec![part(Some("not valid base64url!!")), part(Some(&good))];
        assert_eq!(decode_text_parts(&parts), "ok");
    }

    #[test]
    fn skips_parts_with_no_body() {
        let parts = vec![part(None)];
        assert_eq!(decode_text_parts(&parts), "");
    }
}
