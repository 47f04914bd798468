use regex::Regex;
use std::sync::LazyLock;

static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^bytes=(\d+)-(\d*)").expect("static regex"));

const MAX_FILENAME_LEN: usize = 255;

/// A filename is stored as a single path component under the completed area.
pub fn is_valid_filename(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_FILENAME_LEN
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// A `Range` header value as sent by the client, before it is checked against a file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedRange {
    pub start: u64,
    pub end: Option<u64>,
}

/// Parses `bytes=<start>-[<end>]`.
///
/// Returns `None` for anything else; such headers are ignored and the whole file is served.
pub fn parse_range_header(value: &str) -> Option<RequestedRange> {
    let caps = RANGE_RE.captures(value.trim())?;
    let start = caps.get(1)?.as_str().parse().ok()?;
    let end = match caps.get(2).map(|m| m.as_str()) {
        Some("") | None => None,
        Some(end) => Some(end.parse().ok()?),
    };
    Some(RequestedRange { start, end })
}
