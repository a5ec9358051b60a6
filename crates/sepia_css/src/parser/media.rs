//! Media query parsing for `@media` and `@import`. The feature-name table
//! here is deliberately separate from the property table: `color` is both a
//! property and a feature, with different grammars.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::bytecode::Unit;
use crate::stylesheet::{
    MediaCondition, MediaFeature, MediaQualifier, MediaQuery, MediaQueryList, MediaRange, MediaType,
    MediaValue,
};
use crate::token_vector::TokenVector;
use crate::tokenizer::TokenKind;

static MEDIA_TYPES: &[(&str, MediaType)] = &[
    ("all", MediaType::All),
    ("aural", MediaType::Aural),
    ("braille", MediaType::Braille),
    ("embossed", MediaType::Embossed),
    ("handheld", MediaType::Handheld),
    ("print", MediaType::Print),
    ("projection", MediaType::Projection),
    ("screen", MediaType::Screen),
    ("speech", MediaType::Speech),
    ("tty", MediaType::Tty),
    ("tv", MediaType::Tv),
];

static FEATURES: &[(&str, MediaFeature)] = &[
    ("aspect-ratio", MediaFeature::AspectRatio),
    ("color", MediaFeature::Color),
    ("color-index", MediaFeature::ColorIndex),
    ("device-aspect-ratio", MediaFeature::DeviceAspectRatio),
    ("device-height", MediaFeature::DeviceHeight),
    ("device-width", MediaFeature::DeviceWidth),
    ("grid", MediaFeature::Grid),
    ("height", MediaFeature::Height),
    ("monochrome", MediaFeature::Monochrome),
    ("orientation", MediaFeature::Orientation),
    ("overflow-block", MediaFeature::OverflowBlock),
    ("overflow-inline", MediaFeature::OverflowInline),
    ("resolution", MediaFeature::Resolution),
    ("scan", MediaFeature::Scan),
    ("update-frequency", MediaFeature::UpdateFrequency),
    ("width", MediaFeature::Width),
];

lazy_static! {
    static ref TYPE_INDEX: HashMap<&'static str, MediaType> = MEDIA_TYPES.iter().copied().collect();
    static ref FEATURE_INDEX: HashMap<&'static str, MediaFeature> = FEATURES.iter().copied().collect();
}

/// Parses a comma separated media query list, stopping before `{`, `;` or
/// the end of the vector. An empty list is returned as such; `@media`
/// treats it as `all`.
pub(in crate::parser) fn parse_media_query_list(vector: &mut TokenVector) -> MediaQueryList {
    let mut queries = Vec::new();

    loop {
        vector.skip_whitespace();
        match vector.peek() {
            None => break,
            Some(t) if matches!(t.kind, TokenKind::LCurly | TokenKind::Semicolon) => break,
            _ => {}
        }

        queries.push(parse_media_query(vector));

        vector.skip_whitespace();
        match vector.peek() {
            Some(t) if t.kind == TokenKind::Comma => {
                vector.next();
            }
            _ => break,
        }
    }

    queries
}

fn parse_media_query(vector: &mut TokenVector) -> MediaQuery {
    let mut query = MediaQuery::default();

    vector.skip_whitespace();

    // only | not
    if let Some(token) = vector.peek() {
        match &token.kind {
            TokenKind::Ident(v) if v.eq_ci_str("only") => {
                vector.next();
                query.qualifier = Some(MediaQualifier::Only);
            }
            TokenKind::Ident(v) if v.eq_ci_str("not") => {
                vector.next();
                query.qualifier = Some(MediaQualifier::Not);
            }
            _ => {}
        }
    }

    vector.skip_whitespace();

    // media type, or a leading feature condition
    match vector.peek().map(|t| t.kind.clone()) {
        Some(TokenKind::Ident(name)) => {
            vector.next();
            match TYPE_INDEX.get(name.folded()) {
                Some(media_type) => query.media_type = Some(*media_type),
                None => {
                    // an unknown type can never match
                    log::warn!("unknown media type {name}");
                    query.never = true;
                }
            }
        }
        Some(TokenKind::LParen) => {
            if !parse_condition(vector, &mut query) {
                query.never = true;
            }
        }
        _ => {
            query.never = true;
        }
    }

    // `and (feature: value)` chain
    loop {
        vector.skip_whitespace();
        match vector.peek() {
            Some(t) if t.is_ident_ci("and") => {
                vector.next();
                vector.skip_whitespace();
                match vector.peek().map(|t| t.kind.clone()) {
                    Some(TokenKind::LParen) => {
                        if !parse_condition(vector, &mut query) {
                            query.never = true;
                        }
                    }
                    _ => {
                        query.never = true;
                        break;
                    }
                }
            }
            _ => break,
        }
    }

    if query.never {
        // drain whatever is left of this query up to the list separator
        skip_to_query_end(vector);
    }

    query
}

// `( feature [: value] )`. Returns false when the condition is malformed or
// names an unknown feature.
fn parse_condition(vector: &mut TokenVector, query: &mut MediaQuery) -> bool {
    // consume '('
    vector.next();
    vector.skip_whitespace();

    let Some(TokenKind::Ident(name)) = vector.next().map(|t| t.kind) else {
        return false;
    };

    let folded = name.folded();
    let (range, bare) = if let Some(rest) = folded.strip_prefix("min-") {
        (MediaRange::Min, rest)
    } else if let Some(rest) = folded.strip_prefix("max-") {
        (MediaRange::Max, rest)
    } else {
        (MediaRange::Exact, folded)
    };

    let Some(feature) = FEATURE_INDEX.get(bare).copied() else {
        log::warn!("unknown media feature {name}");
        return false;
    };

    vector.skip_whitespace();

    let value = match vector.next().map(|t| t.kind) {
        Some(TokenKind::RParen) => {
            query.conditions.push(MediaCondition {
                range,
                feature,
                value: None,
            });
            return true;
        }
        Some(TokenKind::Colon) => match parse_value(vector) {
            Some(value) => value,
            None => return false,
        },
        _ => return false,
    };

    vector.skip_whitespace();
    if !matches!(vector.next().map(|t| t.kind), Some(TokenKind::RParen)) {
        return false;
    }

    query.conditions.push(MediaCondition {
        range,
        feature,
        value: Some(value),
    });
    true
}

fn parse_value(vector: &mut TokenVector) -> Option<MediaValue> {
    vector.skip_whitespace();

    let token = vector.next()?;
    match token.kind {
        TokenKind::Dimension { value, ref unit, .. } => {
            let unit = Unit::from_ident(unit.folded())?;
            Some(MediaValue::Dimension(value, unit))
        }
        TokenKind::Number { value, integer } => {
            // an integer may be the numerator of a ratio
            if integer {
                let mark = vector.mark();
                vector.skip_whitespace();
                if matches!(vector.peek(), Some(t) if t.is_delim('/')) {
                    vector.next();
                    vector.skip_whitespace();
                    if let Some(next) = vector.next() {
                        if let TokenKind::Number {
                            value: denominator,
                            integer: true,
                        } = next.kind
                        {
                            return Some(MediaValue::Ratio(value.int_part(), denominator.int_part()));
                        }
                    }
                    return None;
                }
                vector.rewind(mark);
                return Some(MediaValue::Integer(value.int_part()));
            }
            Some(MediaValue::Number(value))
        }
        TokenKind::Ident(name) => Some(MediaValue::Ident(name)),
        _ => None,
    }
}

// Advances to the comma separating this query from the next one, or to the
// list terminator.
fn skip_to_query_end(vector: &mut TokenVector) {
    while let Some(token) = vector.peek() {
        match token.kind {
            TokenKind::Comma | TokenKind::LCurly | TokenKind::Semicolon => return,
            _ => {
                vector.next();
            }
        }
    }
}
