//! Ruleset parsing: selector group, `{`, declaration list, `}`. A bad
//! selector list drops the whole rule; bad declarations are handled inside
//! the block parser.

use sepia_shared::errors::CssResult;

use crate::bytecode::StyleBuffer;
use crate::parser::{declaration, selector};
use crate::stylesheet::{CssLog, Ruleset, SheetData};
use crate::token_vector::TokenVector;
use crate::tokenizer::TokenKind;

/// Parses the ruleset in the vector. `Ok(None)` means the rule was invalid
/// and has been dropped (with a log entry); errors are fatal only.
pub(in crate::parser) fn parse_ruleset(vector: &mut TokenVector, data: &mut SheetData) -> CssResult<Option<Ruleset>> {
    log::trace!("parse_ruleset");

    let location = vector.peek_non_ws().map(|t| t.location).unwrap_or_default();

    let Some(selectors) = selector::parse_selector_list(vector, data) else {
        data.log(CssLog::error("dropped rule with invalid selector", location));
        return Ok(None);
    };

    match vector.next_non_ws() {
        Some(token) if token.kind == TokenKind::LCurly => {}
        _ => {
            data.log(CssLog::error("expected '{' after selector list", location));
            return Ok(None);
        }
    }

    let mut style = StyleBuffer::new();
    declaration::parse_declaration_block(vector, data, &mut style)?;
    style.finalize();

    Ok(Some(Ruleset { selectors, style }))
}
