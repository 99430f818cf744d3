//! Provider XML reply envelope and escaping.
//!
//! The messaging provider renders a text reply from a fixed TwiML-style
//! envelope; the structure must match exactly for the reply to be delivered.

/// Escape text for embedding inside an XML element.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap a reply message in the provider's `<Response><Message>` envelope.
pub fn message_response(text: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response>\n  <Message>{}</Message>\n</Response>",
        escape_xml(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_all_special_characters() {
        assert_eq!(escape_xml("&"), "&amp;");
        assert_eq!(escape_xml("<"), "&lt;");
        assert_eq!(escape_xml(">"), "&gt;");
        assert_eq!(escape_xml("'"), "&apos;");
        assert_eq!(escape_xml("\""), "&quot;");
    }

    #[test]
    fn escapes_mixed_text() {
        assert_eq!(
            escape_xml(r#"a < b & c > "d's""#),
            "a &lt; b &amp; c &gt; &quot;d&apos;s&quot;"
        );
    }

    #[test]
    fn ampersand_is_not_double_escaped() {
        assert_eq!(escape_xml("&lt;"), "&amp;lt;");
    }

    #[test]
    fn empty_text_escapes_to_empty() {
        assert_eq!(escape_xml(""), "");
    }

    #[test]
    fn envelope_structure() {
        let xml = message_response("Hello");
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response>\n  <Message>Hello</Message>\n</Response>"
        );
    }

    #[test]
    fn envelope_escapes_message_text() {
        let xml = message_response("You've got <mail> & more");
        assert!(xml.contains("<Message>You&apos;ve got &lt;mail&gt; &amp; more</Message>"));
        // No raw specials may survive inside the message element.
        let inner = xml
            .split("<Message>")
            .nth(1)
            .and_then(|s| s.split("</Message>").next())
            .unwrap();
        assert!(!inner.contains('\'') && !inner.contains('<') && !inner.contains('>'));
    }
}
