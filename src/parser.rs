// 🏗️ Line Parser Framework - Identity Normalizer
// Turns the heterogeneous lines found in manual list files into (id, name) pairs

use serde::{Deserialize, Serialize};

// ============================================================================
// CORE TYPES
// ============================================================================

/// LineForm - Which textual shape a line was recognized as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineForm {
    /// `Admin=<id>:Whitelist // <comment>`
    Whitelist,
    /// `<id> // <name>`
    Pair,
    /// `<id>`
    BareId,
    /// Any line with an id-looking token somewhere in it
    Fallback,
}

impl LineForm {
    /// Full fallback chain, in priority order
    pub const PRIORITY: [LineForm; 4] = [
        LineForm::Whitelist,
        LineForm::Pair,
        LineForm::BareId,
        LineForm::Fallback,
    ];

    /// Chain used for the additions file (`<id>` or `<id> // <name>` only)
    pub const PAIR_ONLY: [LineForm; 2] = [LineForm::Pair, LineForm::BareId];

    /// Human-readable name for logs
    pub fn name(&self) -> &str {
        match self {
            LineForm::Whitelist => "whitelist",
            LineForm::Pair => "id // name",
            LineForm::BareId => "bare id",
            LineForm::Fallback => "fallback",
        }
    }

    /// Try to parse a (trimmed) line in this form
    pub fn parse(&self, line: &str) -> Option<ParsedLine> {
        match self {
            LineForm::Whitelist => parse_whitelist_form(line),
            LineForm::Pair => parse_pair_form(line),
            LineForm::BareId => parse_bare_id_form(line),
            LineForm::Fallback => parse_fallback_form(line),
        }
    }
}

/// ParsedLine - Output of the normalizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLine {
    pub id: String,
    /// Raw name as written (may still carry the prefix tag)
    pub name: Option<String>,
    pub form: LineForm,
}

impl ParsedLine {
    fn new(id: &str, name: Option<&str>, form: LineForm) -> Self {
        ParsedLine {
            id: id.to_string(),
            name: name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            form,
        }
    }
}

// ============================================================================
// HEURISTICS
// ============================================================================

const WHITELIST_HEAD: &str = "Admin=";
const WHITELIST_TAIL: &str = ":Whitelist";
const COMMENT_SEPARATOR: &str = "//";

/// ID heuristic: a single token that is all digits or longer than 10 characters
pub fn is_id_like(candidate: &str) -> bool {
    !candidate.is_empty()
        && !candidate.contains(char::is_whitespace)
        && (is_all_digits(candidate) || candidate.chars().count() > 10)
}

/// Blank lines and `#` comments never reach the parser
pub fn is_comment_or_blank(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

// ============================================================================
// ONE FUNCTION PER FORM
// ============================================================================

/// Line carries the `Admin=...:Whitelist` markers
pub fn is_whitelist_shaped(line: &str) -> bool {
    line.starts_with(WHITELIST_HEAD) && line.contains(WHITELIST_TAIL)
}

/// Form 1: `Admin=<id>:Whitelist` with an optional `// <comment>`
pub fn parse_whitelist_form(line: &str) -> Option<ParsedLine> {
    let rest = line.strip_prefix(WHITELIST_HEAD)?;
    let tail_pos = rest.find(WHITELIST_TAIL)?;

    let id = rest[..tail_pos].trim();
    if !is_id_like(id) {
        return None;
    }

    let after = &rest[tail_pos + WHITELIST_TAIL.len()..];
    let name = after
        .find(COMMENT_SEPARATOR)
        .map(|pos| &after[pos + COMMENT_SEPARATOR.len()..]);

    Some(ParsedLine::new(id, name, LineForm::Whitelist))
}

/// Form 2: `<id> // <name>`, split once on the first `//`
pub fn parse_pair_form(line: &str) -> Option<ParsedLine> {
    let (left, right) = line.split_once(COMMENT_SEPARATOR)?;
    let id = left.trim();

    if !is_id_like(id) {
        return None;
    }

    Some(ParsedLine::new(id, Some(right), LineForm::Pair))
}

/// Form 3: the whole line is the id
pub fn parse_bare_id_form(line: &str) -> Option<ParsedLine> {
    let id = line.trim();

    if !is_id_like(id) {
        return None;
    }

    Some(ParsedLine::new(id, None, LineForm::BareId))
}

/// Form 4: first token that is all digits, or long and contains a digit
pub fn parse_fallback_form(line: &str) -> Option<ParsedLine> {
    line.split_whitespace()
        .find(|token| {
            is_all_digits(token)
                || (token.chars().count() > 10 && token.chars().any(|c| c.is_ascii_digit()))
        })
        .map(|token| ParsedLine::new(token, None, LineForm::Fallback))
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Parse a line through an explicit chain of forms, first match wins
///
/// A whitelist-shaped line is only ever read as the whitelist form; with a bad
/// id between the markers it is rejected rather than taken whole as an id.
pub fn parse_with(line: &str, forms: &[LineForm]) -> Option<ParsedLine> {
    let trimmed = line.trim();

    if is_whitelist_shaped(trimmed) {
        return forms
            .contains(&LineForm::Whitelist)
            .then(|| parse_whitelist_form(trimmed))
            .flatten();
    }

    forms.iter().find_map(|form| form.parse(trimmed))
}

/// Full fallback chain (used for the removals file)
///
/// # Examples:
/// ```
/// use whitelist_sync::parser::parse_line;
///
/// let parsed = parse_line("Admin=76561198000000001:Whitelist // [(JCom)] Bob").unwrap();
/// assert_eq!(parsed.id, "76561198000000001");
/// assert_eq!(parsed.name.as_deref(), Some("[(JCom)] Bob"));
/// ```
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    parse_with(line, &LineForm::PRIORITY)
}

/// `//`-split variant (used for the additions file)
pub fn parse_pair_line(line: &str) -> Option<ParsedLine> {
    parse_with(line, &LineForm::PAIR_ONLY)
}

// ============================================================================
// TESTS
// ============================================================================
