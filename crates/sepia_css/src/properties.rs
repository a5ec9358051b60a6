use sepia_shared::errors::{CssError, CssResult};
use sepia_shared::interner::{Atom, InternContext};

use crate::bytecode::{flags, StyleBuffer};
use crate::stylesheet::{ClientHandlers, Level, StringTable};
use crate::token_vector::TokenVector;
use crate::tokenizer::TokenKind;

mod longhand;
mod shorthand;
mod tables;
pub(crate) mod values;

pub use tables::{dispatch_for, Dispatch, PropertyId, ShorthandId};

/// Everything a property parser needs: the statement's token vector, the
/// owning rule's style buffer, and the sheet-level services (string table,
/// client callbacks, quirks tracking).
pub struct PropertyContext<'a> {
    pub vector: &'a mut TokenVector,
    pub style: &'a mut StyleBuffer,
    pub strings: &'a mut StringTable,
    pub handlers: &'a ClientHandlers,
    pub interner: &'a InternContext,
    pub base_url: &'a str,
    pub level: Level,
    pub quirks_allowed: bool,
    pub quirks_used: &'a mut bool,
}

impl PropertyContext<'_> {
    /// Interns a string into the sheet's table, returning the payload index.
    pub fn add_string(&mut self, atom: &Atom) -> u32 {
        self.strings.add(atom.clone())
    }

    /// Resolves a raw URL against the sheet base and interns the absolute
    /// form. Resolution failure fails the declaration.
    pub fn resolve_url(&mut self, raw: &Atom) -> CssResult<u32> {
        match (self.handlers.resolve)(self.base_url, raw.as_str()) {
            Ok(absolute) => {
                let atom = self.interner.intern(&absolute);
                Ok(self.strings.add(atom))
            }
            Err(e) => {
                log::warn!("url resolution failed for {raw}: {e}");
                Err(CssError::Invalid)
            }
        }
    }
}

/// Parses one declaration's value tokens and appends the resulting bytecode.
///
/// The token-vector cursor and the style-buffer length are saved on entry
/// and restored on any failure, so a bad declaration leaves no partial
/// bytecode behind and the caller can skip to its recovery point.
pub fn parse_declaration_value(ctx: &mut PropertyContext, name: &Atom, important: bool) -> CssResult<()> {
    let Some(dispatch) = dispatch_for(name.folded()) else {
        log::trace!("unknown property {name}");
        return Err(CssError::Invalid);
    };

    let minimum = match dispatch {
        Dispatch::Longhand(id) => id.minimum_level(),
        Dispatch::Shorthand(id) => id.minimum_level(),
    };
    if ctx.level < minimum {
        log::trace!("property {name} requires a newer language level");
        return Err(CssError::Invalid);
    }

    let flag_bits = if important { flags::IMPORTANT } else { 0 };

    let vector_mark = ctx.vector.mark();
    let style_mark = ctx.style.len();

    let result = parse_value(ctx, dispatch, flag_bits).and_then(|()| {
        if ctx.vector.only_whitespace_left() {
            Ok(())
        } else {
            // trailing tokens the grammar did not consume
            Err(CssError::Invalid)
        }
    });

    if result.is_err() {
        ctx.vector.rewind(vector_mark);
        ctx.style.rewind_to(style_mark);
    }

    result
}

fn parse_value(ctx: &mut PropertyContext, dispatch: Dispatch, flag_bits: u8) -> CssResult<()> {
    // `inherit`, `initial` and `unset` are valid for every property, but
    // only as the sole value. A shorthand defaults each of its longhands.
    if let Some(defaulted) = take_sole_defaulted(ctx) {
        match dispatch {
            Dispatch::Longhand(id) => ctx.style.append_defaulted(id, flag_bits | defaulted),
            Dispatch::Shorthand(id) => {
                for prop in id.expands_to() {
                    ctx.style.append_defaulted(*prop, flag_bits | defaulted);
                }
            }
        }
        return Ok(());
    }

    match dispatch {
        Dispatch::Longhand(id) => longhand::parse(ctx, id, flag_bits),
        Dispatch::Shorthand(id) => shorthand::parse(ctx, id, flag_bits),
    }
}

// Consumes `inherit`/`initial`/`unset` when it is the only significant token
// left, returning the flag bit it maps to.
fn take_sole_defaulted(ctx: &mut PropertyContext) -> Option<u8> {
    let mark = ctx.vector.mark();

    let token = ctx.vector.next_non_ws()?;
    let flag = match &token.kind {
        TokenKind::Ident(v) if v.eq_ci_str("inherit") => flags::INHERIT,
        TokenKind::Ident(v) if v.eq_ci_str("initial") => flags::INITIAL,
        TokenKind::Ident(v) if v.eq_ci_str("unset") => flags::UNSET,
        _ => {
            ctx.vector.rewind(mark);
            return None;
        }
    };

    if ctx.vector.only_whitespace_left() {
        Some(flag)
    } else {
        ctx.vector.rewind(mark);
        None
    }
}
