//! Restricts text to the Latin-1 repertoire the page fonts are laid out for.

/// Drawn in place of anything outside the repertoire.
pub const PLACEHOLDER: char = '?';

/// Substitutions applied before the repertoire check, in order.
const SUBSTITUTIONS: &[(char, &str)] = &[
    ('\u{20AC}', "EUR"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
];

/// Normalize a line of text into the renderable repertoire.
///
/// Idempotent: every character it produces is itself renderable and has no
/// substitution entry.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if let Some((_, replacement)) = SUBSTITUTIONS.iter().find(|(from, _)| *from == ch) {
            out.push_str(replacement);
        } else if is_renderable(ch) {
            out.push(ch);
        } else {
            out.push(PLACEHOLDER);
        }
    }
    out
}

/// Printable Latin-1, plus tab.
pub fn is_renderable(ch: char) -> bool {
    match ch {
        '\t' => true,
        ' '..='~' => true,
        '\u{A0}'..='\u{FF}' => true,
        _ => false,
    }
}
