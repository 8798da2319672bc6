//! GUID masking for demo mode.

use std::borrow::Cow;

use uuid::Uuid;

const GUID_LEN: usize = 36;
const MASK: &str = "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx";

/// Replace every hyphenated GUID in `text` with a fixed mask.
///
/// Borrows when nothing matched.
pub fn redact_guids(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut i = 0;

    while i + GUID_LEN <= bytes.len() {
        let is_guid = bytes[i].is_ascii_hexdigit()
            && text
                .get(i..i + GUID_LEN)
                .is_some_and(|candidate| Uuid::try_parse(candidate).is_ok());
        if is_guid {
            let buf = out.get_or_insert_with(|| String::with_capacity(text.len()));
            buf.push_str(&text[copied..i]);
            buf.push_str(MASK);
            i += GUID_LEN;
            copied = i;
        } else {
            i += 1;
        }
    }

    match out {
        None => Cow::Borrowed(text),
        Some(mut buf) => {
            buf.push_str(&text[copied..]);
            Cow::Owned(buf)
        }
    }
}

/// [`redact_guids`] when `enabled`, otherwise `text` untouched.
pub fn maybe_redact(text: &str, enabled: bool) -> Cow<'_, str> {
    if enabled {
        redact_guids(text)
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn masks_subscription_ids_in_paths() {
        let id = "/subscriptions/0b1f6471-1bf0-4dda-aec3-cb9272f09590/resourceGroups/web";
        assert_eq!(
            redact_guids(id),
            "/subscriptions/xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx/resourceGroups/web"
        );
    }

    #[test]
    fn masks_every_occurrence() {
        let json = r#"{"a":"11111111-2222-3333-4444-555555555555","b":"AAAAAAAA-BBBB-CCCC-DDDD-EEEEEEEEEEEE"}"#;
        let redacted = redact_guids(json);
        assert!(!redacted.contains("1111"));
        assert!(!redacted.contains("AAAA"));
        assert_eq!(redacted.matches(MASK).count(), 2);
    }

    #[test]
    fn text_without_guids_is_borrowed() {
        let text = "resourceGroups/web (36 chars is not enough on its own)";
        assert!(matches!(redact_guids(text), Cow::Borrowed(_)));
        assert!(matches!(redact_guids(""), Cow::Borrowed(_)));
    }

    #[test]
    fn near_misses_are_left_alone() {
        // Wrong hyphen positions and a non-hex digit
        let text = "11111111-22223-333-4444-555555555555 1111111g-2222-3333-4444-555555555555";
        assert_eq!(redact_guids(text), text);
    }

    #[test]
    fn multibyte_text_around_guids_survives() {
        let text = "▶ 11111111-2222-3333-4444-555555555555 ✓";
        assert_eq!(redact_guids(text), format!("▶ {MASK} ✓"));
    }

    #[test]
    fn disabled_redaction_is_identity() {
        let id = "/subscriptions/0b1f6471-1bf0-4dda-aec3-cb9272f09590";
        assert_eq!(maybe_redact(id, false), id);
        assert_ne!(maybe_redact(id, true), id);
    }
}
