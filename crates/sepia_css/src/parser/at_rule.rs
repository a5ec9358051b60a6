//! At-rule recognition and placement: `@charset`, `@import`, `@namespace`,
//! `@media`, `@font-face` and `@page`. Unknown at-rules are skipped whole;
//! misplaced ones are dropped with a log entry.

use sepia_shared::byte_stream::Location;
use sepia_shared::errors::CssResult;
use sepia_shared::interner::Atom;

use crate::bytecode::StyleBuffer;
use crate::parser::{declaration, media, rule, DocState};
use crate::properties::values::keyword_index;
use crate::stylesheet::{
    CssLog, FontFaceLocation, FontFaceRule, FontFaceSrc, ImportRule, MediaRule, PagePseudo, PageRule,
    Rule, RuleKind, SheetData,
};
use crate::token_vector::TokenVector;
use crate::tokenizer::TokenKind;

pub(in crate::parser) fn parse_at_rule(
    vector: &mut TokenVector,
    data: &mut SheetData,
    name: &Atom,
    at_sheet_start: bool,
    state: &mut DocState,
) -> CssResult<()> {
    log::trace!("parse_at_rule @{name}");

    // consume the at-keyword itself
    vector.skip_whitespace();
    let location = match vector.next() {
        Some(token) => token.location,
        None => return Ok(()),
    };

    match name.folded() {
        "charset" => {
            parse_charset(vector, data, at_sheet_start, *state, location);
            Ok(())
        }
        "import" => parse_import(vector, data, state, location),
        "namespace" => {
            parse_namespace(vector, data, state, location);
            Ok(())
        }
        "media" => {
            let result = parse_media(vector, data, location);
            *state = DocState::Body;
            result
        }
        "font-face" => {
            parse_font_face(vector, data, location);
            *state = DocState::Body;
            Ok(())
        }
        "page" => {
            let result = parse_page(vector, data, location);
            *state = DocState::Body;
            result
        }
        _ => {
            // unknown at-rule: the whole statement (balanced block included)
            // is already in the vector and simply gets discarded
            data.log(CssLog::warn(&format!("skipped unknown at-rule @{name}"), location));
            Ok(())
        }
    }
}

// `@charset "name";` is honoured only as the very first construct of the
// sheet, in exactly that form. The declared encoding still comes from the
// client; the rule is recorded for completeness.
fn parse_charset(
    vector: &mut TokenVector,
    data: &mut SheetData,
    at_sheet_start: bool,
    state: DocState,
    location: Location,
) {
    if !at_sheet_start || state != DocState::Start {
        data.log(CssLog::warn("@charset allowed only at the very start", location));
        return;
    }

    let Some(ws) = vector.next() else {
        data.log(CssLog::warn("malformed @charset", location));
        return;
    };
    let encoding = match (ws.kind, vector.next().map(|t| t.kind)) {
        (TokenKind::Whitespace, Some(TokenKind::QuotedString(encoding))) => encoding,
        _ => {
            data.log(CssLog::warn("malformed @charset", location));
            return;
        }
    };

    match vector.next().map(|t| t.kind) {
        Some(TokenKind::Semicolon) => {}
        _ => {
            data.log(CssLog::warn("malformed @charset", location));
            return;
        }
    }

    data.push_rule(RuleKind::Charset { encoding });
}

// `@import url(...) media-list? ;` valid only before any body rule. In
// quirks mode a misplaced import is tolerated.
fn parse_import(
    vector: &mut TokenVector,
    data: &mut SheetData,
    state: &mut DocState,
    location: Location,
) -> CssResult<()> {
    let placed_ok = matches!(*state, DocState::Start | DocState::Imports);
    if !placed_ok {
        if data.allow_quirks {
            data.quirks_used = true;
        } else {
            data.log(CssLog::warn("misplaced @import dropped", location));
            return Ok(());
        }
    }

    vector.skip_whitespace();
    let Some(raw) = take_url_or_string(vector) else {
        data.log(CssLog::warn("malformed @import", location));
        return Ok(());
    };

    let queries = media::parse_media_query_list(vector);

    match vector.next_non_ws().map(|t| t.kind) {
        Some(TokenKind::Semicolon) | None => {}
        _ => {
            data.log(CssLog::warn("malformed @import", location));
            return Ok(());
        }
    }

    let absolute = match (data.handlers.resolve)(&data.url, raw.as_str()) {
        Ok(absolute) => absolute,
        Err(e) => {
            data.log(CssLog::warn(&format!("could not resolve @import {raw}: {e}"), location));
            return Ok(());
        }
    };
    let url = data.interner.intern(&absolute);

    // a failing fetch callback is the client aborting, not bad CSS
    if let Some(import) = &data.handlers.import {
        import(url.as_str(), &queries)?;
    }

    data.push_rule(RuleKind::Import(ImportRule { url, queries }));
    if placed_ok {
        *state = DocState::Imports;
    }
    Ok(())
}

// `@namespace prefix? url(...)|"uri" ;`
fn parse_namespace(
    vector: &mut TokenVector,
    data: &mut SheetData,
    state: &mut DocState,
    location: Location,
) {
    if !matches!(*state, DocState::Start | DocState::Imports | DocState::Namespaces) {
        data.log(CssLog::warn("misplaced @namespace dropped", location));
        return;
    }

    vector.skip_whitespace();

    let mut prefix: Option<Atom> = None;
    if let Some(token) = vector.peek() {
        if let TokenKind::Ident(name) = token.kind.clone() {
            vector.next();
            prefix = Some(name);
            vector.skip_whitespace();
        }
    }

    let Some(uri) = take_url_or_string(vector) else {
        data.log(CssLog::warn("malformed @namespace", location));
        return;
    };

    match vector.next_non_ws().map(|t| t.kind) {
        Some(TokenKind::Semicolon) | None => {}
        _ => {
            data.log(CssLog::warn("malformed @namespace", location));
            return;
        }
    }

    match &prefix {
        Some(prefix) => data.namespaces.insert(prefix.clone(), uri.clone()),
        None => data.namespaces.set_default(uri.clone()),
    }

    data.push_rule(RuleKind::Namespace { prefix, uri });
    *state = DocState::Namespaces;
}

// `@media <query-list> { <ruleset>* }`
fn parse_media(
    vector: &mut TokenVector,
    data: &mut SheetData,
    location: Location,
) -> CssResult<()> {
    let queries = media::parse_media_query_list(vector);

    match vector.next_non_ws().map(|t| t.kind) {
        Some(TokenKind::LCurly) => {}
        _ => {
            data.log(CssLog::warn("malformed @media", location));
            return Ok(());
        }
    }

    // the media rule takes its slot before its children so document order
    // stays total
    let media_index = data.alloc_index();
    let mut rules = Vec::new();

    loop {
        vector.skip_whitespace();
        match vector.peek().map(|t| t.kind.clone()) {
            None => break,
            Some(TokenKind::RCurly) => {
                vector.next();
                break;
            }
            Some(TokenKind::AtKeyword(nested)) => {
                data.log(CssLog::warn(
                    &format!("skipped nested at-rule @{nested} inside @media"),
                    location,
                ));
                skip_nested_statement(vector);
            }
            _ => {
                if let Some(ruleset) = rule::parse_ruleset(vector, data)? {
                    let source_index = data.alloc_index();
                    rules.push(Rule {
                        kind: RuleKind::Ruleset(ruleset),
                        source_index,
                    });
                } else {
                    // the bad rule's tokens have been consumed up to its
                    // block end by the ruleset parser; carry on with the next
                    skip_nested_statement(vector);
                }
            }
        }
    }

    data.push_prepared(Rule {
        kind: RuleKind::Media(MediaRule { queries, rules }),
        source_index: media_index,
    });
    Ok(())
}

// `@font-face { <descriptor>* }` collected into a storage record for the
// font machinery.
fn parse_font_face(vector: &mut TokenVector, data: &mut SheetData, location: Location) {
    match vector.next_non_ws().map(|t| t.kind) {
        Some(TokenKind::LCurly) => {}
        _ => {
            data.log(CssLog::warn("malformed @font-face", location));
            return;
        }
    }

    let mut record = FontFaceRule::default();

    loop {
        vector.skip_whitespace();
        match vector.peek().map(|t| t.kind.clone()) {
            None => break,
            Some(TokenKind::RCurly) => {
                vector.next();
                break;
            }
            Some(TokenKind::Semicolon) => {
                vector.next();
                continue;
            }
            _ => {}
        }

        if !parse_font_face_descriptor(vector, data, &mut record) {
            data.log(CssLog::warn("dropped malformed @font-face descriptor", location));
            vector.skip_past(&TokenKind::Semicolon);
        }
    }

    data.push_rule(RuleKind::FontFace(record));
}

fn parse_font_face_descriptor(vector: &mut TokenVector, data: &mut SheetData, record: &mut FontFaceRule) -> bool {
    let Some(TokenKind::Ident(name)) = vector.next_non_ws().map(|t| t.kind) else {
        return false;
    };
    match vector.next_non_ws().map(|t| t.kind) {
        Some(TokenKind::Colon) => {}
        _ => return false,
    }

    match name.folded() {
        "font-family" => {
            match vector.next_non_ws().map(|t| t.kind) {
                Some(TokenKind::QuotedString(family) | TokenKind::Ident(family)) => {
                    record.family = Some(family);
                }
                _ => return false,
            }
            true
        }
        "src" => loop {
            let Some(src) = parse_font_face_src(vector, data) else {
                return false;
            };
            record.srcs.push(src);

            match vector.next_non_ws().map(|t| t.kind) {
                Some(TokenKind::Comma) => continue,
                Some(TokenKind::Semicolon) | None => return true,
                Some(TokenKind::RCurly) => {
                    vector.reconsume();
                    return true;
                }
                _ => return false,
            }
        },
        "font-style" => match vector.next_non_ws().map(|t| t.kind) {
            Some(TokenKind::Ident(value)) => {
                match keyword_index(&["normal", "italic", "oblique"], value.folded()) {
                    Some(index) => {
                        record.style = Some(index);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        },
        "font-weight" => match vector.next_non_ws().map(|t| t.kind) {
            Some(TokenKind::Ident(value)) => {
                match keyword_index(&["normal", "bold"], value.folded()) {
                    Some(index) => {
                        record.weight = Some(index);
                        true
                    }
                    None => false,
                }
            }
            Some(TokenKind::Number { value, integer: true }) => {
                let weight = value.int_part();
                if weight < 100 || weight > 900 || weight % 100 != 0 {
                    return false;
                }
                record.weight = Some(2 + (weight / 100 - 1) as u16);
                true
            }
            _ => false,
        },
        "unicode-range" => loop {
            match vector.next_non_ws().map(|t| t.kind) {
                Some(TokenKind::UnicodeRange(start, end)) => {
                    record.unicode_ranges.push((start, end));
                }
                _ => return false,
            }
            match vector.next_non_ws().map(|t| t.kind) {
                Some(TokenKind::Comma) => continue,
                Some(TokenKind::Semicolon) | None => return true,
                Some(TokenKind::RCurly) => {
                    vector.reconsume();
                    return true;
                }
                _ => return false,
            }
        },
        _ => false,
    }
}

fn parse_font_face_src(vector: &mut TokenVector, data: &mut SheetData) -> Option<FontFaceSrc> {
    vector.skip_whitespace();

    let location = match vector.next().map(|t| t.kind) {
        Some(TokenKind::Url(raw)) => {
            let absolute = (data.handlers.resolve)(&data.url, raw.as_str()).ok()?;
            FontFaceLocation::Url(data.interner.intern(&absolute))
        }
        Some(TokenKind::Function(name)) if name.eq_ci_str("url") => {
            let TokenKind::QuotedString(raw) = vector.next_non_ws()?.kind else {
                return None;
            };
            match vector.next_non_ws().map(|t| t.kind) {
                Some(TokenKind::RParen) => {}
                _ => return None,
            }
            let absolute = (data.handlers.resolve)(&data.url, raw.as_str()).ok()?;
            FontFaceLocation::Url(data.interner.intern(&absolute))
        }
        Some(TokenKind::Function(name)) if name.eq_ci_str("local") => {
            let family = match vector.next_non_ws()?.kind {
                TokenKind::QuotedString(family) | TokenKind::Ident(family) => family,
                _ => return None,
            };
            match vector.next_non_ws().map(|t| t.kind) {
                Some(TokenKind::RParen) => {}
                _ => return None,
            }
            FontFaceLocation::Local(family)
        }
        _ => return None,
    };

    // optional format("woff") hint
    let mut format = None;
    let mark = vector.mark();
    if let Some(token) = vector.next_non_ws() {
        if let TokenKind::Function(name) = token.kind {
            if name.eq_ci_str("format") {
                let TokenKind::QuotedString(hint) = vector.next_non_ws()?.kind else {
                    return None;
                };
                match vector.next_non_ws().map(|t| t.kind) {
                    Some(TokenKind::RParen) => {}
                    _ => return None,
                }
                format = Some(hint);
            } else {
                vector.rewind(mark);
            }
        } else {
            vector.rewind(mark);
        }
    }

    Some(FontFaceSrc { location, format })
}

// `@page :pseudo? { <declaration>* }`
fn parse_page(
    vector: &mut TokenVector,
    data: &mut SheetData,
    location: Location,
) -> CssResult<()> {
    vector.skip_whitespace();

    let mut pseudo = None;
    if matches!(vector.peek(), Some(t) if t.kind == TokenKind::Colon) {
        vector.next();
        pseudo = match vector.next().map(|t| t.kind) {
            Some(TokenKind::Ident(name)) => match name.folded() {
                "first" => Some(PagePseudo::First),
                "left" => Some(PagePseudo::Left),
                "right" => Some(PagePseudo::Right),
                _ => {
                    data.log(CssLog::warn("unknown @page pseudo dropped", location));
                    return Ok(());
                }
            },
            _ => {
                data.log(CssLog::warn("malformed @page", location));
                return Ok(());
            }
        };
    }

    match vector.next_non_ws().map(|t| t.kind) {
        Some(TokenKind::LCurly) => {}
        _ => {
            data.log(CssLog::warn("malformed @page", location));
            return Ok(());
        }
    }

    let mut style = StyleBuffer::new();
    declaration::parse_declaration_block(vector, data, &mut style)?;
    style.finalize();

    data.push_rule(RuleKind::Page(PageRule { pseudo, style }));
    Ok(())
}

// A url(...) in either token shape, or a quoted string.
fn take_url_or_string(vector: &mut TokenVector) -> Option<Atom> {
    match vector.next().map(|t| t.kind) {
        Some(TokenKind::Url(url) | TokenKind::QuotedString(url)) => Some(url),
        Some(TokenKind::Function(name)) if name.eq_ci_str("url") => {
            let TokenKind::QuotedString(url) = vector.next_non_ws()?.kind else {
                return None;
            };
            match vector.next_non_ws().map(|t| t.kind) {
                Some(TokenKind::RParen) => Some(url),
                _ => None,
            }
        }
        _ => None,
    }
}

// Skips one nested statement inside a block: to the next `;` at depth zero
// or past one balanced `{...}`.
fn skip_nested_statement(vector: &mut TokenVector) {
    let mut depth = 0usize;

    while let Some(token) = vector.peek() {
        match token.kind {
            TokenKind::Semicolon if depth == 0 => {
                vector.next();
                return;
            }
            TokenKind::RCurly if depth == 0 => return,
            TokenKind::LCurly => {
                depth += 1;
                vector.next();
            }
            TokenKind::RCurly => {
                depth -= 1;
                vector.next();
                if depth == 0 {
                    return;
                }
            }
            _ => {
                vector.next();
            }
        }
    }
}
