//! Color-control extraction for engine output.
//!
//! The engine's printer colors values with SGR escape sequences
//! (`ESC [ 34 m` and friends). The transcript stores clean text, so every
//! well-formed control token is cut out of the text and turned into a
//! [`StyleSpan`] that starts at the removal point and runs to the end of the
//! text. Later tokens produce later spans, which win in rendering order.
//!
//! Tokens are scanned up to their final byte, so the two-digit codes the
//! printer emits always remove exactly five characters. A marker that is not
//! followed by a complete token is left in place as literal text.

use crate::range::TextRange;
use crate::style::{ColorTag, StyleSpan};

/// Control sequence introducer: `ESC '['`.
pub const CONTROL_INTRODUCER: &str = "\u{1b}[";

const ESC: char = '\u{1b}';

/// Text with its control tokens removed, plus the spans they produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Marked {
    pub text: String,
    /// Spans relative to `text`, in the order the tokens appeared.
    pub spans: Vec<StyleSpan>,
}

/// A complete control token found at the end of the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token {
    /// Offset of the `ESC` character.
    at: usize,
    color: ColorTag,
}

/// Extracts color-control tokens from `raw`.
///
/// Repeats until the text holds no complete token, so the result is a fixed
/// point: running it again on `Marked::text` yields the same text and no spans.
pub fn extract_styles(raw: &str) -> Marked {
    if !raw.contains(CONTROL_INTRODUCER) {
        return Marked {
            text: raw.to_string(),
            spans: Vec::new(),
        };
    }

    let mut chars: Vec<char> = Vec::with_capacity(raw.len());
    let mut starts: Vec<(usize, ColorTag)> = Vec::new();

    // A token is cut as soon as its final byte arrives. Cutting can only
    // complete a marker that ends at the cut, and that marker is checked
    // again when its own final byte arrives, so one pass reaches the fixed
    // point.
    for c in raw.chars() {
        chars.push(c);
        let Some(token) = token_at_end(&chars) else {
            continue;
        };
        chars.truncate(token.at);
        // Starts stay sorted; spans opened inside the cut move to its edge.
        for (start, _) in starts.iter_mut().rev() {
            if *start <= token.at {
                break;
            }
            *start = token.at;
        }
        starts.push((token.at, token.color));
    }

    let len = chars.len();
    let spans = starts
        .into_iter()
        .map(|(start, color)| StyleSpan::new(TextRange::new(start, len - start), color))
        .collect();

    Marked {
        text: chars.into_iter().collect(),
        spans,
    }
}

fn is_param(c: char) -> bool {
    c.is_ascii_digit() || c == ';'
}

/// Returns the token whose final byte is the last char, if there is one.
fn token_at_end(chars: &[char]) -> Option<Token> {
    let (&final_byte, body) = chars.split_last()?;
    if !('@'..='~').contains(&final_byte) {
        return None;
    }

    let params_len = body.iter().rev().take_while(|c| is_param(**c)).count();
    let params_at = body.len() - params_len;
    let at = params_at.checked_sub(2)?;
    if body[at] != ESC || body[at + 1] != '[' {
        return None;
    }

    let color = if final_byte == 'm' {
        let params: String = body[params_at..].iter().collect();
        resolve_color(&params)
    } else {
        ColorTag::default()
    };
    Some(Token { at, color })
}

/// The last recognized parameter wins; anything else is the default color.
fn resolve_color(params: &str) -> ColorTag {
    params
        .split(';')
        .filter_map(|p| p.parse::<u16>().ok())
        .filter_map(ColorTag::from_sgr)
        .next_back()
        .unwrap_or_default()
}
