//! Percent-encoding of request paths.
//!
//! Paths are matched after decoding, one segment at a time. A decoded `/` or
//! `%` is written back as `%2F` or `%25` so a segment never splits and the
//! matcher only ever sees real separators. Captured values are decoded once
//! more when they are stored.

use std::borrow::Cow;

/// Decodes every segment of `path`, keeping `/` and `%` inside a segment
/// escaped.
///
/// A segment that does not decode to UTF-8 is left as it was.
pub(crate) fn decode_path(path: &str) -> Cow<'_, str> {
    if !path.contains('%') {
        return Cow::Borrowed(path);
    }

    let mut out = String::with_capacity(path.len());
    for (i, segment) in path.split('/').enumerate() {
        if i > 0 {
            out.push('/');
        }
        match urlencoding::decode(segment) {
            Ok(decoded) => {
                for c in decoded.chars() {
                    match c {
                        '%' => out.push_str("%25"),
                        '/' => out.push_str("%2F"),
                        c => out.push(c),
                    }
                }
            }
            Err(_) => out.push_str(segment),
        }
    }
    Cow::Owned(out)
}

/// Restores a value captured from a path produced by [`decode_path`].
pub(crate) fn unescape(value: &str) -> Cow<'_, str> {
    if !value.contains('%') {
        return Cow::Borrowed(value);
    }
    urlencoding::decode(value).unwrap_or(Cow::Borrowed(value))
}

/// Encodes a parameter value for a built path.
///
/// Wildcard values keep their `/` separators.
pub(crate) fn encode_value(value: &str, wildcard: bool) -> Cow<'_, str> {
    if !wildcard {
        return urlencoding::encode(value);
    }
    if value.split('/').all(|piece| matches!(urlencoding::encode(piece), Cow::Borrowed(_))) {
        return Cow::Borrowed(value);
    }
    let pieces: Vec<Cow<'_, str>> = value.split('/').map(urlencoding::encode).collect();
    Cow::Owned(pieces.join("/"))
}
