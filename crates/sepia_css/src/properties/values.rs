//! Value recognizers shared by the property parsers: unit specifiers with
//! category validation, colour values, keyword sets and the small numeric
//! helpers.

use sepia_shared::errors::{CssError, CssResult};
use sepia_shared::fixed::Fixed;

use crate::bytecode::Unit;
use crate::colors;
use crate::properties::PropertyContext;
use crate::tokenizer::TokenKind;

/// A parsed length-ish value: fixed-point magnitude plus unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LengthSpec {
    pub value: Fixed,
    pub unit: Unit,
}

/// Consumes a DIMENSION, PERCENTAGE or NUMBER token into a [`LengthSpec`].
///
/// A bare `0` takes the default unit. Other unit-less numbers are accepted
/// only in quirks mode (as px), which is recorded on the sheet.
pub fn parse_unit_specifier(ctx: &mut PropertyContext, default_unit: Unit) -> CssResult<LengthSpec> {
    let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;

    match token.kind {
        TokenKind::Dimension { value, ref unit, .. } => {
            let unit = Unit::from_ident(unit.folded()).ok_or(CssError::Invalid)?;
            Ok(LengthSpec { value, unit })
        }
        TokenKind::Percentage(value) => Ok(LengthSpec {
            value,
            unit: Unit::Pct,
        }),
        TokenKind::Number { value, .. } => {
            if value.is_zero() {
                Ok(LengthSpec {
                    value,
                    unit: default_unit,
                })
            } else if ctx.quirks_allowed {
                *ctx.quirks_used = true;
                Ok(LengthSpec {
                    value,
                    unit: Unit::Px,
                })
            } else {
                Err(CssError::Invalid)
            }
        }
        _ => Err(CssError::Invalid),
    }
}

/// Consumes a length (optionally percentage) value, rejecting mismatched
/// unit categories and, where the property forbids them, negative values.
pub fn parse_length(ctx: &mut PropertyContext, allow_pct: bool, allow_negative: bool) -> CssResult<LengthSpec> {
    let spec = parse_unit_specifier(ctx, Unit::Px)?;

    if !spec.unit.is_length() && !(allow_pct && spec.unit.is_percent()) {
        return Err(CssError::Invalid);
    }
    if !allow_negative && spec.value.is_negative() {
        return Err(CssError::Invalid);
    }

    Ok(spec)
}

/// Consumes an angle value.
pub fn parse_angle(ctx: &mut PropertyContext) -> CssResult<LengthSpec> {
    let spec = parse_unit_specifier(ctx, Unit::Deg)?;
    if !spec.unit.is_angle() {
        return Err(CssError::Invalid);
    }
    Ok(spec)
}

/// Consumes a time or percentage value; negatives are rejected.
pub fn parse_time_or_pct(ctx: &mut PropertyContext) -> CssResult<LengthSpec> {
    let spec = parse_unit_specifier(ctx, Unit::S)?;
    if !spec.unit.is_time() && !spec.unit.is_percent() {
        return Err(CssError::Invalid);
    }
    if spec.value.is_negative() {
        return Err(CssError::Invalid);
    }
    Ok(spec)
}

/// Consumes a frequency value.
pub fn parse_frequency(ctx: &mut PropertyContext) -> CssResult<LengthSpec> {
    let spec = parse_unit_specifier(ctx, Unit::Hz)?;
    if !spec.unit.is_frequency() {
        return Err(CssError::Invalid);
    }
    Ok(spec)
}

/// Finds a lowercase keyword in a property's keyword table; the index is
/// the value tag.
pub fn keyword_index(table: &[&str], folded: &str) -> Option<u16> {
    table.iter().position(|kw| *kw == folded).map(|i| i as u16)
}

/// Consumes a single IDENT that must be in the keyword table.
pub fn parse_keyword(ctx: &mut PropertyContext, table: &[&str]) -> CssResult<u16> {
    let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
    match token.kind {
        TokenKind::Ident(ref value) => keyword_index(table, value.folded()).ok_or(CssError::Invalid),
        _ => Err(CssError::Invalid),
    }
}

/// Consumes an integer NUMBER token.
pub fn parse_integer(ctx: &mut PropertyContext) -> CssResult<i32> {
    let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
    match token.kind {
        TokenKind::Number { value, integer: true } => Ok(value.int_part()),
        _ => Err(CssError::Invalid),
    }
}

/// Consumes any NUMBER token.
pub fn parse_number(ctx: &mut PropertyContext) -> CssResult<Fixed> {
    let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
    match token.kind {
        TokenKind::Number { value, .. } => Ok(value),
        _ => Err(CssError::Invalid),
    }
}

/// Consumes a `url(...)` value in either token shape (URL token, or the
/// `url(` function wrapping a quoted string) and returns the string-table
/// index of the resolved absolute URL.
pub fn parse_uri_index(ctx: &mut PropertyContext) -> CssResult<u32> {
    let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
    match token.kind {
        TokenKind::Url(ref raw) => ctx.resolve_url(raw),
        TokenKind::Function(ref name) if name.eq_ci_str("url") => {
            let string = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
            let TokenKind::QuotedString(ref raw) = string.kind else {
                return Err(CssError::Invalid);
            };
            let index = ctx.resolve_url(raw)?;
            expect_rparen(ctx)?;
            Ok(index)
        }
        _ => Err(CssError::Invalid),
    }
}

pub fn expect_comma(ctx: &mut PropertyContext) -> CssResult<()> {
    match ctx.vector.next_non_ws() {
        Some(t) if t.kind == TokenKind::Comma => Ok(()),
        _ => Err(CssError::Invalid),
    }
}

pub fn expect_rparen(ctx: &mut PropertyContext) -> CssResult<()> {
    match ctx.vector.next_non_ws() {
        Some(t) if t.kind == TokenKind::RParen => Ok(()),
        _ => Err(CssError::Invalid),
    }
}

/// A colour value after recognition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Colour {
    Transparent,
    CurrentColor,
    /// AARRGGBB with alpha in the high byte.
    Value(u32),
}

/// Consumes any colour form: named keyword, hex hash, `rgb()`/`rgba()`/
/// `hsl()`/`hsla()` function, `transparent` or `currentColor`. Otherwise-
/// unknown idents are offered to the client's system-colour callback.
pub fn parse_colour(ctx: &mut PropertyContext) -> CssResult<Colour> {
    let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;

    match token.kind {
        TokenKind::Ident(ref name) => {
            let folded = name.folded();
            if folded == "transparent" {
                return Ok(Colour::Transparent);
            }
            if folded == "currentcolor" {
                return Ok(Colour::CurrentColor);
            }
            if let Some(argb) = colors::named_argb(folded) {
                return Ok(Colour::Value(argb));
            }
            if let Some(system) = &ctx.handlers.color {
                match system(folded) {
                    Ok(argb) => return Ok(Colour::Value(argb)),
                    Err(CssError::Nomem) => return Err(CssError::Nomem),
                    Err(_) => return Err(CssError::Invalid),
                }
            }
            Err(CssError::Invalid)
        }
        TokenKind::Hash(ref digits) => colors::parse_hash(digits.as_str())
            .map(Colour::Value)
            .ok_or(CssError::Invalid),
        TokenKind::Function(ref name) => match name.folded() {
            "rgb" => parse_rgb_function(ctx, false).map(Colour::Value),
            "rgba" => parse_rgb_function(ctx, true).map(Colour::Value),
            "hsl" => parse_hsl_function(ctx, false).map(Colour::Value),
            "hsla" => parse_hsl_function(ctx, true).map(Colour::Value),
            _ => Err(CssError::Invalid),
        },
        _ => Err(CssError::Invalid),
    }
}

// One rgb() channel: 0-255 number or percentage, clamped.
fn parse_channel(ctx: &mut PropertyContext) -> CssResult<u8> {
    let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
    match token.kind {
        TokenKind::Number { value, .. } => Ok(value.to_f32().clamp(0.0, 255.0).round() as u8),
        TokenKind::Percentage(value) => Ok((value.to_f32().clamp(0.0, 100.0) * 2.55).round() as u8),
        _ => Err(CssError::Invalid),
    }
}

// An alpha component: 0-1 number or percentage, clamped.
fn parse_alpha(ctx: &mut PropertyContext) -> CssResult<u8> {
    let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
    match token.kind {
        TokenKind::Number { value, .. } => Ok((value.to_f32().clamp(0.0, 1.0) * 255.0).round() as u8),
        TokenKind::Percentage(value) => Ok((value.to_f32().clamp(0.0, 100.0) * 2.55).round() as u8),
        _ => Err(CssError::Invalid),
    }
}

fn parse_rgb_function(ctx: &mut PropertyContext, with_alpha: bool) -> CssResult<u32> {
    let r = parse_channel(ctx)?;
    expect_comma(ctx)?;
    let g = parse_channel(ctx)?;
    expect_comma(ctx)?;
    let b = parse_channel(ctx)?;
    let a = if with_alpha {
        expect_comma(ctx)?;
        parse_alpha(ctx)?
    } else {
        0xFF
    };
    expect_rparen(ctx)?;
    Ok(colors::pack(r, g, b, a))
}

fn parse_hsl_function(ctx: &mut PropertyContext, with_alpha: bool) -> CssResult<u32> {
    let hue = parse_number(ctx)?.to_f32();
    expect_comma(ctx)?;
    let saturation = expect_percentage(ctx)?;
    expect_comma(ctx)?;
    let lightness = expect_percentage(ctx)?;
    let alpha = if with_alpha {
        expect_comma(ctx)?;
        f32::from(parse_alpha(ctx)?) / 255.0
    } else {
        1.0
    };
    expect_rparen(ctx)?;
    Ok(colors::hsl_to_argb(hue, saturation, lightness, alpha))
}

fn expect_percentage(ctx: &mut PropertyContext) -> CssResult<f32> {
    let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
    match token.kind {
        TokenKind::Percentage(value) => Ok(value.to_f32()),
        _ => Err(CssError::Invalid),
    }
}
