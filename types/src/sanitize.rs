//! Terminal text sanitization for remote narrative text.
//!
//! Completion-service output is untrusted. Escape sequences in it could move
//! the cursor, rewrite earlier output, or set the clipboard (OSC 52), so
//! everything from the network passes through [`sanitize_terminal_text`]
//! before it is printed.

use std::borrow::Cow;
use std::iter::Peekable;

const ESC: char = '\x1b';
const BEL: char = '\x07';
const C1_CSI: char = '\u{009b}';

/// Strip escape sequences and control characters, keeping `\n`, `\t`, `\r`.
///
/// Returns `Cow::Borrowed` when the input is already clean.
///
/// ```
/// use executive_types::sanitize_terminal_text;
///
/// assert_eq!(sanitize_terminal_text("Hold."), "Hold.");
/// assert_eq!(sanitize_terminal_text("Hold\x1b[2J the line"), "Hold the line");
/// ```
#[must_use]
pub fn sanitize_terminal_text(input: &str) -> Cow<'_, str> {
    if !input.chars().any(is_stripped) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESC => skip_escape(&mut chars),
            C1_CSI => skip_csi_body(&mut chars),
            c if is_stripped(c) => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn is_stripped(c: char) -> bool {
    let c0 = c <= '\x1f' && !matches!(c, '\n' | '\t' | '\r');
    let c1 = ('\u{0080}'..='\u{009f}').contains(&c);
    c0 || c1 || c == '\x7f'
}

fn skip_escape<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    match chars.peek().copied() {
        Some('[') => {
            chars.next();
            skip_csi_body(chars);
        }
        Some(']' | 'P' | 'X' | '^' | '_') => {
            chars.next();
            skip_string_body(chars);
        }
        // Two-character sequences such as ESC c or ESC 7.
        Some(_) => {
            chars.next();
        }
        None => {}
    }
}

/// CSI: parameter and intermediate bytes, then one final byte in `@..=~`.
fn skip_csi_body<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    for c in chars.by_ref() {
        if ('@'..='~').contains(&c) {
            break;
        }
    }
}

/// OSC/DCS/etc: terminated by BEL or ST (`ESC \`).
fn skip_string_body<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    while let Some(c) = chars.next() {
        if c == BEL {
            return;
        }
        if c == ESC {
            if chars.peek() == Some(&'\\') {
                chars.next();
            }
            return;
        }
    }
}
