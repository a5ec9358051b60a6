//! `an+b` microsyntax for the `:nth-*` pseudo-classes, reduced to the
//! `(a, b)` integer pair. The tokenizer has already glued signs and the `n`
//! into idents, numbers and dimensions, so this decodes those shapes.

use crate::token_vector::TokenVector;
use crate::tokenizer::TokenKind;

/// Parses the argument tokens up to (but not including) the closing paren.
/// Returns `None` on any malformed form.
pub(in crate::parser) fn parse(vector: &mut TokenVector) -> Option<(i32, i32)> {
    log::trace!("parse_anplusb");

    vector.skip_whitespace();

    let token = vector.next()?;
    match token.kind {
        // odd | even | n | -n | n-5 | -n-5
        TokenKind::Ident(ref name) => match name.folded() {
            "odd" => Some((2, 1)),
            "even" => Some((2, 0)),
            ident => {
                let (a, b_inline) = split_n_ident(ident)?;
                finish_b(vector, a, b_inline)
            }
        },
        // bare integer b
        TokenKind::Number { value, integer } => {
            if !integer {
                return None;
            }
            Some((0, value.int_part()))
        }
        // 2n | 2n-5 (the unit carries the n and any inline b)
        TokenKind::Dimension { value, ref unit, integer } => {
            if !integer {
                return None;
            }
            let b_inline = split_n_unit(unit.folded())?;
            finish_b(vector, value.int_part(), b_inline)
        }
        // `+n...` arrives as a lone delimiter before the ident
        TokenKind::Delim('+') => {
            let next = vector.next()?;
            let TokenKind::Ident(ref name) = next.kind else {
                return None;
            };
            let (a, b_inline) = split_n_ident(name.folded())?;
            if a < 0 {
                return None;
            }
            finish_b(vector, a, b_inline)
        }
        _ => None,
    }
}

// Splits an ident like `n`, `-n`, `n-5` or `-n-5` into the a coefficient
// and an optional inline b.
fn split_n_ident(ident: &str) -> Option<(i32, Option<i32>)> {
    let (a, rest) = if let Some(rest) = ident.strip_prefix("-n") {
        (-1, rest)
    } else if let Some(rest) = ident.strip_prefix('n') {
        (1, rest)
    } else {
        return None;
    };

    if rest.is_empty() {
        return Some((a, None));
    }

    // only a `-<digits>` tail is legal inside the ident
    let digits = rest.strip_prefix('-')?;
    let b: i32 = digits.parse().ok()?;
    Some((a, Some(-b)))
}

// Splits a dimension unit: `n` or `n-<digits>`.
fn split_n_unit(unit: &str) -> Option<Option<i32>> {
    let rest = unit.strip_prefix('n')?;
    if rest.is_empty() {
        return Some(None);
    }
    let digits = rest.strip_prefix('-')?;
    let b: i32 = digits.parse().ok()?;
    Some(Some(-b))
}

// After the a-part: either the b was inline, or `+ b` / `- b` / signed
// number follows, or there is no b at all.
fn finish_b(vector: &mut TokenVector, a: i32, b_inline: Option<i32>) -> Option<(i32, i32)> {
    if let Some(b) = b_inline {
        return Some((a, b));
    }

    vector.skip_whitespace();

    let mark = vector.mark();
    let Some(token) = vector.next() else {
        return Some((a, 0));
    };

    match token.kind {
        TokenKind::RParen => {
            vector.rewind(mark);
            Some((a, 0))
        }
        // signed number directly: `n +5` is not valid, but `n+5` lexes as
        // ident-n then signed number
        TokenKind::Number { value, integer: true } => Some((a, value.int_part())),
        TokenKind::Delim(sign @ ('+' | '-')) => {
            vector.skip_whitespace();
            let next = vector.next()?;
            let TokenKind::Number { value, integer: true } = next.kind else {
                return None;
            };
            let b = value.int_part();
            if b < 0 {
                return None;
            }
            Some((a, if sign == '-' { -b } else { b }))
        }
        _ => None,
    }
}
