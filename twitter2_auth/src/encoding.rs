use std::borrow::Cow;

use percent_encoding::{percent_decode, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except the RFC 3986 unreserved characters, which is the set OAuth 1.0a requires to
/// be percent-encoded.
const OAUTH_RESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub(crate) fn percent_encode(s: &str) -> Cow<str> {
    utf8_percent_encode(s, OAUTH_RESERVED).into()
}

/// Iterates over the key-value pairs of an `application/x-www-form-urlencoded` body.
pub(crate) struct FormDecoder<'a> {
    bytes: &'a [u8],
}

impl<'a> FormDecoder<'a> {
    pub(crate) fn new<T>(bytes: &'a T) -> Self
    where
        T: AsRef<[u8]> + ?Sized,
    {
        Self {
            bytes: bytes.as_ref(),
        }
    }
}

impl<'a> Iterator for FormDecoder<'a> {
    type Item = (Cow<'a, str>, Cow<'a, str>);

    fn next(&mut self) -> Option<Self::Item> {
        // Skip over empty pairs, e.g. the one produced by a trailing ampersand.
        loop {
            if self.bytes.is_empty() {
                return None;
            }
            let (pair, remainder) = split_on_byte(self.bytes, b'&');
            self.bytes = remainder;
            if pair.is_empty() {
                continue;
            }
            let (key, val) = split_on_byte(pair, b'=');
            return Some((form_decode(key), form_decode(val)));
        }
    }
}

fn form_decode(bytes: &[u8]) -> Cow<str> {
    if bytes.contains(&b'+') {
        let replaced = bytes
            .iter()
            .map(|&byte| if byte == b'+' { b' ' } else { byte })
            .collect::<Vec<u8>>();
        Cow::Owned(percent_decode(&replaced).decode_utf8_lossy().into_owned())
    } else {
        percent_decode(bytes).decode_utf8_lossy()
    }
}

fn split_on_byte(bytes: &[u8], delim: u8) -> (&[u8], &[u8]) {
    match bytes.iter().position(|&byte| byte == delim) {
        Some(index) => {
            let (prefix, suffix) = bytes.split_at(index);
            // `suffix` starts with the delimiter, so it is never empty here.
            (prefix, &suffix[1..])
        }
        None => (bytes, &bytes[bytes.len()..]),
    }
}
