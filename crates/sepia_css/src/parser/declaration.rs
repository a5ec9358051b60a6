//! Declaration-list parsing: `property : value !important? ;` inside a
//! ruleset, `@page` or inline-style block. A bad declaration is skipped to
//! the next `;` or block end and the style buffer is rolled back, leaving
//! its neighbours untouched.

use sepia_shared::errors::{CssError, CssResult};

use crate::bytecode::StyleBuffer;
use crate::properties::{parse_declaration_value, PropertyContext};
use crate::stylesheet::{CssLog, SheetData};
use crate::token_vector::TokenVector;
use crate::tokenizer::TokenKind;

/// Parses declarations until the closing `}` (consumed) or the end of the
/// vector. Recoverable errors are logged and skipped; allocation failures
/// and failing client callbacks propagate.
pub(in crate::parser) fn parse_declaration_block(
    vector: &mut TokenVector,
    data: &mut SheetData,
    style: &mut StyleBuffer,
) -> CssResult<()> {
    loop {
        vector.skip_whitespace();

        match vector.peek() {
            None => return Ok(()),
            Some(token) => match token.kind {
                TokenKind::RCurly => {
                    vector.next();
                    return Ok(());
                }
                TokenKind::Semicolon => {
                    vector.next();
                    continue;
                }
                _ => {}
            },
        }

        parse_one_declaration(vector, data, style)?;
    }
}

fn parse_one_declaration(vector: &mut TokenVector, data: &mut SheetData, style: &mut StyleBuffer) -> CssResult<()> {
    log::trace!("parse_one_declaration");

    let token = match vector.next_non_ws() {
        Some(token) => token,
        None => return Ok(()),
    };
    let location = token.location;

    let TokenKind::Ident(property) = token.kind else {
        data.log(CssLog::warn("expected property name", location));
        skip_declaration(vector);
        return Ok(());
    };

    match vector.next_non_ws() {
        Some(token) if token.kind == TokenKind::Colon => {}
        _ => {
            data.log(CssLog::warn(
                &format!("expected ':' after property {property}"),
                location,
            ));
            skip_declaration(vector);
            return Ok(());
        }
    }

    let end = declaration_end(vector);
    let (important, value_end) = important_extent(vector, end);

    vector.set_limit(value_end);

    let result = {
        let mut ctx = PropertyContext {
            vector,
            style,
            strings: &mut data.strings,
            handlers: &data.handlers,
            interner: &data.interner,
            base_url: &data.url,
            level: data.level,
            quirks_allowed: data.allow_quirks,
            quirks_used: &mut data.quirks_used,
        };
        parse_declaration_value(&mut ctx, &property, important)
    };

    vector.clear_limit();
    vector.seek(end);

    match result {
        Ok(()) => Ok(()),
        Err(CssError::Invalid) => {
            // an unknown or malformed declaration is dropped; the log
            // records it for clients that care
            data.log(CssLog::warn(&format!("dropped declaration {property}"), location));
            Ok(())
        }
        Err(e) => {
            // allocation failure; no recovery point inside a declaration
            data.log(CssLog::error(&format!("declaration {property} failed: {e}"), location));
            Err(e)
        }
    }
}

// Index of the token ending this declaration's value: the `;` or the block's
// closing `}` at nesting depth zero, or the end of the vector.
fn declaration_end(vector: &TokenVector) -> usize {
    let mut index = vector.mark();
    let mut depth = 0usize;

    while let Some(token) = vector.get(index) {
        match token.kind {
            TokenKind::LCurly | TokenKind::LParen | TokenKind::LBracket | TokenKind::Function(_) => depth += 1,
            TokenKind::RCurly if depth == 0 => return index,
            TokenKind::Semicolon if depth == 0 => return index,
            TokenKind::RCurly | TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
            _ => {}
        }
        index += 1;
    }

    index
}

// Detects a trailing `!important`, returning the flag and where the value
// itself ends.
fn important_extent(vector: &TokenVector, end: usize) -> (bool, usize) {
    let mut index = end;

    // walk back over: ws* "important" ws* "!"
    while index > vector.mark() && matches!(vector.get(index - 1), Some(t) if t.is_whitespace()) {
        index -= 1;
    }
    if index == vector.mark() || !matches!(vector.get(index - 1), Some(t) if t.is_ident_ci("important")) {
        return (false, end);
    }
    index -= 1;

    while index > vector.mark() && matches!(vector.get(index - 1), Some(t) if t.is_whitespace()) {
        index -= 1;
    }
    if index == vector.mark() || !matches!(vector.get(index - 1), Some(t) if t.is_delim('!')) {
        return (false, end);
    }

    (true, index - 1)
}

// Skips to the next recovery point: past the next `;` at depth zero, or
// before the closing `}`.
fn skip_declaration(vector: &mut TokenVector) {
    let mut depth = 0usize;

    while let Some(token) = vector.peek() {
        match token.kind {
            TokenKind::RCurly if depth == 0 => return,
            TokenKind::Semicolon if depth == 0 => {
                vector.next();
                return;
            }
            TokenKind::LCurly | TokenKind::LParen | TokenKind::LBracket | TokenKind::Function(_) => {
                depth += 1;
                vector.next();
            }
            TokenKind::RCurly | TokenKind::RParen | TokenKind::RBracket => {
                depth = depth.saturating_sub(1);
                vector.next();
            }
            _ => {
                vector.next();
            }
        }
    }
}
