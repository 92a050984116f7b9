//! Drop payload parsing and path normalization
//!
//! Drag-and-drop toolkits hand over a single string that may hold several file
//! references: Tcl-style lists where items containing spaces are wrapped in
//! braces, `file://` URLs with percent-encoded characters, or URLs naming a
//! network host. This module turns such a payload into normalized paths.

use std::borrow::Cow;
use std::iter::Peekable;
use std::path::PathBuf;
use std::str::Chars;

use url::Url;

use crate::error::{Error, Result};

const FILE_SCHEME: &str = "file://";

/// Separator and prefix rules used for lexical normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// `/` separated, optional leading root
    Posix,
    /// `\` separated, optional drive (`C:`) or UNC (`\\host\share`) prefix
    Windows,
}

impl PathStyle {
    /// The style of the platform this crate was compiled for
    pub fn native() -> Self {
        if cfg!(windows) {
            PathStyle::Windows
        } else {
            PathStyle::Posix
        }
    }

    /// Lexically normalize `path`: drop `.` segments and repeated separators,
    /// resolve `..` against the preceding segment.
    pub fn normalize(self, path: &str) -> String {
        match self {
            PathStyle::Posix => normalize_posix(path),
            PathStyle::Windows => normalize_windows(path),
        }
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::native()
    }
}

/// Split a drop payload into its items using Tcl list rules
///
/// - whitespace separates items
/// - `{...}` groups an item literally (nested braces allowed)
/// - `"..."` groups an item with backslash escapes applied
/// - elsewhere a backslash escapes the next character
///
/// # Example
///
/// ```
/// use pdf_combine::paths::split_payload;
///
/// let items = split_payload("{/tmp/My Docs/a.pdf} /tmp/b.pdf").unwrap();
/// assert_eq!(items, vec!["/tmp/My Docs/a.pdf", "/tmp/b.pdf"]);
/// ```
pub fn split_payload(payload: &str) -> Result<Vec<String>> {
    let mut items = Vec::new();
    let mut chars = payload.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let item = match chars.peek() {
            None => break,
            Some('{') => {
                chars.next();
                read_braced(&mut chars)?
            }
            Some('"') => {
                chars.next();
                read_quoted(&mut chars)?
            }
            Some(_) => read_bare(&mut chars),
        };
        items.push(item);
    }

    Ok(items)
}

fn read_braced(chars: &mut Peekable<Chars<'_>>) -> Result<String> {
    let mut item = String::new();
    let mut depth = 1usize;

    loop {
        match chars.next() {
            None => return Err(Error::MalformedPayload("unmatched open brace".to_string())),
            Some('\\') => {
                item.push('\\');
                if let Some(next) = chars.next() {
                    item.push(next);
                }
            }
            Some('{') => {
                depth += 1;
                item.push('{');
            }
            Some('}') => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                item.push('}');
            }
            Some(c) => item.push(c),
        }
    }

    expect_item_end(chars, "braces")?;
    Ok(item)
}

fn read_quoted(chars: &mut Peekable<Chars<'_>>) -> Result<String> {
    let mut item = String::new();

    loop {
        match chars.next() {
            None => return Err(Error::MalformedPayload("unmatched open quote".to_string())),
            Some('"') => break,
            Some('\\') => item.push(unescape(chars.next())),
            Some(c) => item.push(c),
        }
    }

    expect_item_end(chars, "quotes")?;
    Ok(item)
}

fn read_bare(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut item = String::new();
    while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
        if c == '\\' {
            item.push(unescape(chars.next()));
        } else {
            item.push(c);
        }
    }
    item
}

fn expect_item_end(chars: &mut Peekable<Chars<'_>>, delimiter: &str) -> Result<()> {
    match chars.peek() {
        Some(c) if !c.is_whitespace() => Err(Error::MalformedPayload(format!(
            "item in {} followed by \"{}\" instead of space",
            delimiter, c
        ))),
        _ => Ok(()),
    }
}

fn unescape(escaped: Option<char>) -> char {
    match escaped {
        Some('n') => '\n',
        Some('t') => '\t',
        Some('r') => '\r',
        Some(c) => c,
        // Trailing backslash stays literal
        None => '\\',
    }
}

/// Convert one payload item to a normalized filesystem path
///
/// `file://` URLs are percent-decoded. A URL with a host names a network share
/// and becomes a UNC path (`\\host\share\...`), which is always normalized with
/// Windows rules. The host is taken verbatim from the URL, so `localhost`,
/// letter case, ports and non-ASCII names survive. Anything else is normalized
/// as-is with `style`.
pub fn to_local_path(item: &str, style: PathStyle) -> Result<PathBuf> {
    let Some(rest) = item.strip_prefix(FILE_SCHEME) else {
        return Ok(PathBuf::from(style.normalize(item)));
    };

    let (authority, path) = match rest.find('/') {
        Some(slash) => rest.split_at(slash),
        None => (rest, ""),
    };

    // `file://C:/dir` carries a drive letter where the host would be
    let (host, path) = if is_drive_letter(authority) {
        ("", rest)
    } else {
        (authority, path)
    };

    let decoded = decode_path(item, path)?;

    let normalized = if host.is_empty() {
        match style {
            PathStyle::Windows => style.normalize(&strip_drive_slash(&decoded)),
            PathStyle::Posix => style.normalize(&decoded),
        }
    } else {
        PathStyle::Windows.normalize(&format!(r"\\{}{}", host, decoded))
    };

    Ok(PathBuf::from(normalized))
}

/// Parse the path part of a file URL on its own, then percent-decode it
fn decode_path(item: &str, path: &str) -> Result<String> {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    let url = Url::parse(&format!("{}{}", FILE_SCHEME, path)).map_err(|e| Error::InvalidFileUrl {
        url: item.to_string(),
        reason: e.to_string(),
    })?;
    Ok(percent_decode(url.path()))
}

fn is_drive_letter(authority: &str) -> bool {
    let bytes = authority.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && (bytes[1] == b':' || bytes[1] == b'|')
}

/// Percent-decode a URL path; invalid UTF-8 is replaced rather than rejected
fn percent_decode(path: &str) -> String {
    let bytes = urlencoding::decode_binary(path.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// `/C:/dir` -> `C:/dir`, `/C|/dir` -> `C:/dir`
fn strip_drive_slash(path: &str) -> Cow<'_, str> {
    let bytes = path.as_bytes();
    if bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() {
        match bytes[2] {
            b':' => return Cow::Borrowed(&path[1..]),
            b'|' => return Cow::Owned(format!("{}:{}", &path[1..2], &path[3..])),
            _ => {}
        }
    }
    Cow::Borrowed(path)
}

fn resolve_segments<'a>(segments: impl Iterator<Item = &'a str>, rooted: bool) -> Vec<&'a str> {
    let mut stack: Vec<&str> = Vec::new();

    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => {
                if stack.last().is_some_and(|last| *last != "..") {
                    stack.pop();
                } else if !rooted {
                    stack.push("..");
                }
            }
            other => stack.push(other),
        }
    }

    stack
}

fn normalize_posix(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    // POSIX leaves exactly two leading slashes implementation-defined
    let prefix = match path.chars().take_while(|&c| c == '/').count() {
        0 => "",
        2 => "//",
        _ => "/",
    };

    let segments = resolve_segments(path.split('/'), !prefix.is_empty());
    let normalized = format!("{}{}", prefix, segments.join("/"));

    if normalized.is_empty() {
        ".".to_string()
    } else {
        normalized
    }
}

fn normalize_windows(path: &str) -> String {
    let path = path.replace('/', "\\");
    let (drive, rest) = split_drive(&path);
    let rooted = rest.starts_with('\\');

    let mut normalized = String::from(drive);
    if rooted {
        normalized.push('\\');
    }
    normalized.push_str(&resolve_segments(rest.split('\\'), rooted).join("\\"));

    if normalized.is_empty() {
        ".".to_string()
    } else {
        normalized
    }
}

/// Split a backslash-separated path into its drive or UNC prefix and the rest
fn split_drive(path: &str) -> (&str, &str) {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        return path.split_at(2);
    }

    if let Some(unc) = path.strip_prefix(r"\\") {
        if unc.is_empty() || unc.starts_with('\\') {
            return ("", path);
        }
        let Some(host_end) = unc.find('\\') else {
            return (path, "");
        };
        let share_end = unc[host_end + 1..]
            .find('\\')
            .map_or(unc.len(), |offset| host_end + 1 + offset);
        return path.split_at(2 + share_end);
    }

    ("", path)
}
