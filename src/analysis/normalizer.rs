//! Message normalization.
//!
//! [`normalize`] turns a raw message into the canonical token string the
//! vectorizer consumes. The steps run in a fixed order because later steps
//! rely on the invariants established by earlier ones (URL and email
//! patterns are matched against lowercased text; the character-class sweep
//! assumes entities are already decoded).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r"http\S+|www\.\S+").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"\S+@\S+").unwrap();
    static ref NON_ALNUM_RE: Regex = Regex::new(r"[^a-z0-9\s]").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Normalize a raw message into the canonical token string.
///
/// Total function: never fails, and `normalize(normalize(x)) ==
/// normalize(x)` for every input. Empty or whitespace-only input yields an
/// empty string, which is a valid output; callers decide whether to drop
/// such rows.
///
/// Pipeline, in order:
/// 1. decode HTML/SGML character entities
/// 2. lowercase
/// 3. replace URL-like substrings with a space
/// 4. replace email-like substrings with a space
/// 5. replace anything outside `[a-z0-9\s]` with a space
/// 6. collapse whitespace runs and trim
///
/// # Examples
///
/// ```
/// use spamsift::analysis::normalize;
///
/// assert_eq!(normalize("WIN $$$ NOW!!! http://x.co"), "win now");
/// ```
pub fn normalize(raw: &str) -> String {
    let text = decode_entities(raw);
    let text = text.to_lowercase();
    let text = URL_RE.replace_all(&text, " ");
    let text = EMAIL_RE.replace_all(&text, " ");
    let text = NON_ALNUM_RE.replace_all(&text, " ");
    let text = WHITESPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Named entities that show up in real-world message corpora. Unknown
/// entities pass through untouched and are swept away by the
/// character-class step.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", "\u{a0}"),
    ("pound", "£"),
    ("euro", "€"),
    ("cent", "¢"),
    ("yen", "¥"),
    ("copy", "©"),
    ("reg", "®"),
    ("trade", "™"),
    ("hellip", "…"),
    ("mdash", "—"),
    ("ndash", "–"),
    ("lsquo", "\u{2018}"),
    ("rsquo", "\u{2019}"),
    ("ldquo", "\u{201c}"),
    ("rdquo", "\u{201d}"),
    ("middot", "·"),
    ("bull", "•"),
];

/// Longest entity body we bother scanning for (`&...;`).
const MAX_ENTITY_LEN: usize = 10;

/// Decode HTML/SGML character entities in a single left-to-right pass.
///
/// Handles the named subset above plus numeric `&#NN;` and `&#xHH;` forms.
/// Malformed or unknown entities are emitted verbatim.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        match rest[1..]
            .find(';')
            .filter(|&end| end > 0 && end <= MAX_ENTITY_LEN)
        {
            Some(end) => {
                let body = &rest[1..end + 1];
                match decode_entity_body(body) {
                    Some(decoded) => {
                        out.push_str(&decoded);
                        rest = &rest[end + 2..];
                    }
                    None => {
                        out.push('&');
                        rest = &rest[1..];
                    }
                }
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode a single entity body (the part between `&` and `;`).
fn decode_entity_body(body: &str) -> Option<String> {
    if let Some(num) = body.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        return char::from_u32(code).map(|c| c.to_string());
    }
    NAMED_ENTITIES
        .iter()
        .find(|(name, _)| *name == body)
        .map(|(_, repl)| (*repl).to_string())
}
