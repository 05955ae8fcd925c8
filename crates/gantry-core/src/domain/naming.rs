//! Identifier and display-name transformations used by every generator.
//!
//! All functions are total: any input string produces an output, and the
//! output depends only on the input.

use convert_case::{Case, Casing};

/// Prefix that turns a reserved word into a usable identifier.
pub const RAW_PREFIX: &str = "r#";

/// Keywords that cannot appear as bare identifiers in generated Rust source.
const RESERVED: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers either; these get a
/// trailing underscore instead.
const NOT_RAW: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Transform an arbitrary name into a valid source identifier.
///
/// - surrounding whitespace is dropped, internal whitespace and any other
///   character that is not alphanumeric or `_` becomes `_`
/// - a leading digit gets a leading `_`
/// - reserved words get the `r#` escape marker
///
/// The transformation is idempotent: `sanitize_identifier(&sanitize_identifier(x))`
/// equals `sanitize_identifier(x)` for every `x`.
pub fn sanitize_identifier(raw: &str) -> String {
    if let Some(rest) = raw.strip_prefix(RAW_PREFIX) {
        if RESERVED.contains(&rest) {
            return raw.to_string();
        }
    }

    let mut ident: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if ident.is_empty() {
        return "_empty".to_string();
    }

    if ident.starts_with(|c: char| c.is_numeric()) {
        ident.insert(0, '_');
    }

    if NOT_RAW.contains(&ident.as_str()) {
        ident.push('_');
    } else if RESERVED.contains(&ident.as_str()) {
        ident.insert_str(0, RAW_PREFIX);
    }

    ident
}

/// `true` if `name` is usable as-is in generated source.
pub fn is_valid_identifier(name: &str) -> bool {
    sanitize_identifier(name) == name
}

/// Split a camel/Pascal-case identifier into human-readable words.
///
/// Runs of capitals are kept together as acronyms, except that the last
/// capital of a run starts a new word when a lowercase letter follows it.
/// A digit run starts a new word after a lowercase letter.
///
/// ```
/// use gantry_core::domain::naming::display_name;
///
/// assert_eq!(display_name("HROnly"), "HR Only");
/// assert_eq!(display_name("Is3D"), "Is 3D");
/// assert_eq!(display_name("helloWorldUI"), "Hello World UI");
/// ```
pub fn display_name(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    let mut out = String::with_capacity(identifier.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c.is_whitespace() {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            continue;
        }

        if i > 0 && starts_word(&chars, i) && !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
        }

        if out.is_empty() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }

    if out.ends_with(' ') {
        out.pop();
    }
    out
}

fn starts_word(chars: &[char], i: usize) -> bool {
    let prev = chars[i - 1];
    let c = chars[i];
    let next = chars.get(i + 1);

    if c.is_uppercase() {
        prev.is_lowercase()
            || ((prev.is_uppercase() || prev.is_numeric())
                && next.is_some_and(|n| n.is_lowercase()))
    } else if c.is_numeric() {
        prev.is_lowercase()
    } else {
        false
    }
}

/// Lower the leading capital (or acronym) of a Pascal-case name.
///
/// `ProductId` → `productId`, `HRName` → `hrName`, `ID` → `id`.
pub fn camel_case(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    let run = chars.iter().take_while(|c| c.is_uppercase()).count();

    let lowered = match run {
        0 => return identifier.to_string(),
        n if n == chars.len() || n == 1 => n,
        n if chars[n].is_lowercase() => n - 1,
        n => n,
    };

    chars[..lowered]
        .iter()
        .flat_map(|c| c.to_lowercase())
        .chain(chars[lowered..].iter().copied())
        .collect()
}

/// `product_id` → `ProductId`.
pub fn pascal_case(identifier: &str) -> String {
    identifier.to_case(Case::Pascal)
}

/// `CaseProduct` → `case_product`.
pub fn snake_case(identifier: &str) -> String {
    identifier.to_case(Case::Snake)
}
