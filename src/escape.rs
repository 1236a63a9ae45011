//! HTML entity escaping and unescaping.
//!
//! Byte-table driven: each ASCII byte maps through a class table into a
//! small replacement list, zero meaning the byte passes through unchanged.
//! Multi-byte UTF-8 sequences are never touched.

#[rustfmt::skip]
const ESCAPE_CLASS: [u8; 128] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 1, 0, 0, 0, 2, 3, 0, 0, 0, 0, 0, 0, 0, 4,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 5, 0, 6, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

const ESCAPES: [&str; 7] = ["", "&quot;", "&amp;", "&#39;", "&#47;", "&lt;", "&gt;"];

/// Appends `src` to `out`, replacing `"` `&` `'` `/` `<` `>` with their
/// HTML entities.
pub fn escape_html(out: &mut String, src: &str) {
    let bytes = src.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let run = i;
        while i < bytes.len() && (!bytes[i].is_ascii() || ESCAPE_CLASS[bytes[i] as usize] == 0) {
            i += 1;
        }
        if i > run {
            out.push_str(&src[run..i]);
        }
        if i >= bytes.len() {
            break;
        }
        out.push_str(ESCAPES[ESCAPE_CLASS[bytes[i] as usize] as usize]);
        i += 1;
    }
}

const ENTITIES: [(&[u8], char); 6] = [
    (b"lt;", '<'),
    (b"gt;", '>'),
    (b"amp;", '&'),
    (b"#39;", '\''),
    (b"#47;", '/'),
    (b"quot;", '"'),
];

/// Appends `src` to `out`, decoding the entities produced by
/// [`escape_html`]. Unknown entities and bare ampersands pass through.
pub fn unescape_html(out: &mut String, src: &str) {
    let bytes = src.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let run = i;
        while i < bytes.len() && bytes[i] != b'&' {
            i += 1;
        }
        if i > run {
            out.push_str(&src[run..i]);
        }
        if i >= bytes.len() {
            break;
        }
        match ENTITIES.iter().find(|(pat, _)| bytes[i + 1..].starts_with(pat)) {
            Some((pat, ch)) => {
                out.push(*ch);
                i += 1 + pat.len();
            }
            None => {
                out.push('&');
                i += 1;
            }
        }
    }
}
