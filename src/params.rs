//! Request parameter decoding.
//!
//! Decodes URL-encoded key/value pairs from a GET query string or a POST
//! body into an ordered multimap. Decoding is best-effort: `+` becomes a
//! space, `%XX` sequences decode to their byte, and malformed percent
//! escapes pass through literally rather than failing the request.

/// Parameter carrying the database file identifier.
pub const DB_FILE_PARAM: &str = "db";
/// Parameter carrying the SQL statement text.
pub const SQL_STATEMENT_PARAM: &str = "q";
/// Reserved for prepared-statement data; accepted but not interpreted.
pub const PREPARED_DATA_PARAM: &str = "p";

/// Ordered multimap of decoded request parameters.
///
/// Duplicate keys are preserved in input order; [`ParamList::get`] returns
/// the first occurrence.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParamList(Vec<(String, String)>);

impl ParamList {
    /// First value recorded for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All pairs in decode order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decode a raw query string or POST body into a [`ParamList`].
///
/// Tokens split on `&`, or on `;` when the input contains `;` and no `&`.
/// Each token splits on the first `=`; a token without `=` decodes to a key
/// with an empty value. Empty input yields an empty list — this stage never
/// fails.
pub fn parse_params(raw: &[u8]) -> ParamList {
    let delim = if raw.contains(&b';') && !raw.contains(&b'&') {
        b';'
    } else {
        b'&'
    };

    let mut pairs = Vec::new();
    for token in raw.split(|&b| b == delim) {
        if token.is_empty() {
            continue;
        }
        // form_urlencoded handles the first-`=` split, `+` → space, and
        // lenient percent decoding in one pass. Tokens never contain the
        // pair delimiter, so each token yields at most one pair.
        if let Some((key, value)) = url::form_urlencoded::parse(token).next() {
            pairs.push((key.into_owned(), value.into_owned()));
        }
    }
    ParamList(pairs)
}
