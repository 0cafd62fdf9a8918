//! # Color Formatting
//!
//! Lore is configured with `&`-prefixed markup (`&7Owner`) and displayed with
//! the `§` section-sign codes the game client understands.

/// Section sign that introduces a formatting code on the client.
pub const SECTION_SIGN: char = '§';

/// Markup prefix used in configuration.
pub const MARKUP_PREFIX: char = '&';

const FORMAT_CODES: &str = "0123456789AaBbCcDdEeFfKkLlMmNnOoRrXx";

/// Translates `&` markup into `§` codes.
///
/// Only a prefix followed by a valid code is translated; the code letter is
/// lower-cased. Anything else, such as `R&D`, is left alone.
///
/// # Examples
///
/// ```
/// use itemlore::lore::format::colorize;
///
/// assert_eq!(colorize("&7Owner: &FAlex"), "§7Owner: §fAlex");
/// assert_eq!(colorize("R&D & more"), "R&D & more");
/// ```
pub fn colorize(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == MARKUP_PREFIX {
            if let Some(&code) = chars.peek() {
                if FORMAT_CODES.contains(code) {
                    output.push(SECTION_SIGN);
                    output.push(code.to_ascii_lowercase());
                    chars.next();
                    continue;
                }
            }
        }
        output.push(ch);
    }

    output
}

/// Removes `§` codes, leaving plain text.
///
/// # Examples
///
/// ```
/// use itemlore::lore::format::{colorize, strip_formatting};
///
/// assert_eq!(strip_formatting(&colorize("&8&m---&r Hi")), "--- Hi");
/// ```
pub fn strip_formatting(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch == SECTION_SIGN {
            chars.next();
        } else {
            output.push(ch);
        }
    }

    output
}

/// Turns an identifier like `DIAMOND_SWORD` into `Diamond Sword`.
pub fn humanize_identifier(identifier: &str) -> String {
    identifier
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
