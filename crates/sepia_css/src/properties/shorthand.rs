//! Shorthand expansion. A shorthand parser writes one bytecode sequence per
//! expanded longhand, each with its own OPV header; per-side and per-corner
//! fan-out is driven by small const tables rather than repeated code.

use smallvec::SmallVec;

use sepia_shared::errors::{CssError, CssResult};

use crate::bytecode::{item, tag, CodeWord};
use crate::properties::longhand::{
    self, family_items, position_pair, stage_radius_value, take_keyword, Staged, BORDER_STYLE,
    BORDER_WIDTH_KW, FONT_SIZE_KW, FONT_STYLE, FONT_VARIANT, FONT_WEIGHT_KW, GENERIC_FAMILIES,
    KW_INVERT, LIST_STYLE_POSITION, LIST_STYLE_TYPE, OUTLINE_STYLE, OVERFLOW,
};
use crate::properties::values::{
    parse_colour, parse_integer, parse_keyword, parse_length, parse_time_or_pct, parse_uri_index,
};
use crate::properties::{PropertyContext, PropertyId, ShorthandId};
use crate::tokenizer::TokenKind;

// Which source value lands on each of T/R/B/L given how many were written.
const SIDE_INDEX: [[usize; 4]; 4] = [
    [0, 0, 0, 0],
    [0, 1, 0, 1],
    [0, 1, 2, 1],
    [0, 1, 2, 3],
];

// Which source value lands on each of TL/TR/BL/BR given how many were
// written in a border-radius group.
const CORNER_INDEX: [[usize; 4]; 4] = [
    [0, 0, 0, 0],
    [0, 1, 1, 0],
    [0, 1, 1, 2],
    [0, 1, 3, 2],
];

const MARGIN_SIDES: [PropertyId; 4] = [
    PropertyId::MarginTop,
    PropertyId::MarginRight,
    PropertyId::MarginBottom,
    PropertyId::MarginLeft,
];
const PADDING_SIDES: [PropertyId; 4] = [
    PropertyId::PaddingTop,
    PropertyId::PaddingRight,
    PropertyId::PaddingBottom,
    PropertyId::PaddingLeft,
];
const BORDER_WIDTH_SIDES: [PropertyId; 4] = [
    PropertyId::BorderTopWidth,
    PropertyId::BorderRightWidth,
    PropertyId::BorderBottomWidth,
    PropertyId::BorderLeftWidth,
];
const BORDER_STYLE_SIDES: [PropertyId; 4] = [
    PropertyId::BorderTopStyle,
    PropertyId::BorderRightStyle,
    PropertyId::BorderBottomStyle,
    PropertyId::BorderLeftStyle,
];
const BORDER_COLOR_SIDES: [PropertyId; 4] = [
    PropertyId::BorderTopColor,
    PropertyId::BorderRightColor,
    PropertyId::BorderBottomColor,
    PropertyId::BorderLeftColor,
];
const RADIUS_CORNERS: [PropertyId; 4] = [
    PropertyId::BorderTopLeftRadius,
    PropertyId::BorderTopRightRadius,
    PropertyId::BorderBottomLeftRadius,
    PropertyId::BorderBottomRightRadius,
];

pub(super) fn parse(ctx: &mut PropertyContext, id: ShorthandId, flag_bits: u8) -> CssResult<()> {
    match id {
        ShorthandId::Margin => parse_box(ctx, flag_bits, &MARGIN_SIDES, margin_component),
        ShorthandId::Padding => parse_box(ctx, flag_bits, &PADDING_SIDES, padding_component),
        ShorthandId::BorderWidth => parse_box(ctx, flag_bits, &BORDER_WIDTH_SIDES, border_width_component),
        ShorthandId::BorderStyle => parse_box(ctx, flag_bits, &BORDER_STYLE_SIDES, border_style_component),
        ShorthandId::BorderColor => parse_box(ctx, flag_bits, &BORDER_COLOR_SIDES, colour_component),
        ShorthandId::Border => parse_border_side(ctx, flag_bits, None),
        ShorthandId::BorderTop => parse_border_side(ctx, flag_bits, Some(0)),
        ShorthandId::BorderRight => parse_border_side(ctx, flag_bits, Some(1)),
        ShorthandId::BorderBottom => parse_border_side(ctx, flag_bits, Some(2)),
        ShorthandId::BorderLeft => parse_border_side(ctx, flag_bits, Some(3)),
        ShorthandId::BorderRadius => parse_border_radius(ctx, flag_bits),
        ShorthandId::Outline => parse_outline(ctx, flag_bits),
        ShorthandId::ColumnRule => parse_column_rule(ctx, flag_bits),
        ShorthandId::Columns => parse_columns(ctx, flag_bits),
        ShorthandId::Overflow => {
            let index = parse_keyword(ctx, OVERFLOW)?;
            ctx.style.append_opv(PropertyId::OverflowX, flag_bits, index);
            ctx.style.append_opv(PropertyId::OverflowY, flag_bits, index);
            Ok(())
        }
        ShorthandId::Background => parse_background(ctx, flag_bits),
        ShorthandId::Font => parse_font(ctx, flag_bits),
        ShorthandId::ListStyle => parse_list_style(ctx, flag_bits),
        ShorthandId::Cue => parse_cue(ctx, flag_bits),
        ShorthandId::Pause => parse_pause(ctx, flag_bits),
    }
}

// 1-4 component values distributed over the four sides.
fn parse_box(
    ctx: &mut PropertyContext,
    flag_bits: u8,
    sides: &[PropertyId; 4],
    component: fn(&mut PropertyContext) -> CssResult<Staged>,
) -> CssResult<()> {
    let mut values: SmallVec<[Staged; 4]> = SmallVec::new();

    while values.len() < 4 && !ctx.vector.only_whitespace_left() {
        values.push(component(ctx)?);
    }

    if values.is_empty() || !ctx.vector.only_whitespace_left() {
        return Err(CssError::Invalid);
    }

    let map = SIDE_INDEX[values.len() - 1];
    for (side, value_index) in sides.iter().zip(map) {
        values[value_index].emit(ctx, *side, flag_bits);
    }
    Ok(())
}

fn margin_component(ctx: &mut PropertyContext) -> CssResult<Staged> {
    if let Some(index) = take_keyword(ctx, &["auto"]) {
        return Ok(Staged::keyword(index));
    }
    Ok(Staged::dimension(parse_length(ctx, true, true)?))
}

fn padding_component(ctx: &mut PropertyContext) -> CssResult<Staged> {
    Ok(Staged::dimension(parse_length(ctx, true, false)?))
}

fn border_width_component(ctx: &mut PropertyContext) -> CssResult<Staged> {
    if let Some(index) = take_keyword(ctx, BORDER_WIDTH_KW) {
        return Ok(Staged::keyword(index));
    }
    Ok(Staged::dimension(parse_length(ctx, false, false)?))
}

fn border_style_component(ctx: &mut PropertyContext) -> CssResult<Staged> {
    Ok(Staged::keyword(parse_keyword(ctx, BORDER_STYLE)?))
}

fn colour_component(ctx: &mut PropertyContext) -> CssResult<Staged> {
    Ok(Staged::colour(parse_colour(ctx)?))
}

fn try_component(
    ctx: &mut PropertyContext,
    component: fn(&mut PropertyContext) -> CssResult<Staged>,
) -> Option<Staged> {
    let mark = ctx.vector.mark();
    match component(ctx) {
        Ok(staged) => Some(staged),
        Err(_) => {
            ctx.vector.rewind(mark);
            None
        }
    }
}

// `border` and the per-side shorthands: [width || style || color]. Styles
// and widths are tried before colours so a system-colour callback cannot
// swallow keywords.
fn parse_border_side(ctx: &mut PropertyContext, flag_bits: u8, side: Option<usize>) -> CssResult<()> {
    let mut width: Option<Staged> = None;
    let mut style: Option<Staged> = None;
    let mut colour: Option<Staged> = None;

    while !ctx.vector.only_whitespace_left() {
        if style.is_none() {
            if let Some(staged) = try_component(ctx, border_style_component) {
                style = Some(staged);
                continue;
            }
        }
        if width.is_none() {
            if let Some(staged) = try_component(ctx, border_width_component) {
                width = Some(staged);
                continue;
            }
        }
        if colour.is_none() {
            if let Some(staged) = try_component(ctx, colour_component) {
                colour = Some(staged);
                continue;
            }
        }
        return Err(CssError::Invalid);
    }

    if width.is_none() && style.is_none() && colour.is_none() {
        return Err(CssError::Invalid);
    }

    let emit = |ctx: &mut PropertyContext, staged: &Option<Staged>, sides: &[PropertyId; 4]| {
        if let Some(staged) = staged {
            match side {
                Some(index) => staged.emit(ctx, sides[index], flag_bits),
                None => {
                    for prop in sides {
                        staged.emit(ctx, *prop, flag_bits);
                    }
                }
            }
        }
    };

    emit(ctx, &width, &BORDER_WIDTH_SIDES);
    emit(ctx, &style, &BORDER_STYLE_SIDES);
    emit(ctx, &colour, &BORDER_COLOR_SIDES);
    Ok(())
}

// border-radius: up to four x-radii, then optionally `/` and up to four
// y-radii. The corner table applies to each group independently.
fn parse_border_radius(ctx: &mut PropertyContext, flag_bits: u8) -> CssResult<()> {
    let mut groups: [Vec<SmallVec<[CodeWord; 8]>>; 2] = [Vec::new(), Vec::new()];
    let mut group = 0usize;

    while !ctx.vector.only_whitespace_left() {
        let mark = ctx.vector.mark();
        if group == 0 {
            if let Some(token) = ctx.vector.next_non_ws() {
                if token.is_delim('/') {
                    group = 1;
                    continue;
                }
            }
            ctx.vector.rewind(mark);
        }

        if groups[group].len() >= 4 {
            return Err(CssError::Invalid);
        }

        let mut items: SmallVec<[CodeWord; 8]> = SmallVec::new();
        stage_radius_value(ctx, &mut items)?;
        groups[group].push(items);
    }

    if groups[0].is_empty() || (group == 1 && groups[1].is_empty()) {
        return Err(CssError::Invalid);
    }

    let first_map = CORNER_INDEX[groups[0].len() - 1];
    let second_map = if group == 1 {
        Some(CORNER_INDEX[groups[1].len() - 1])
    } else {
        None
    };

    for (corner, prop) in RADIUS_CORNERS.iter().enumerate() {
        ctx.style.append_opv(*prop, flag_bits, tag::LIST);
        let words = &groups[0][first_map[corner]];
        ctx.style.vappend(words);
        if let Some(map) = second_map {
            let words = &groups[1][map[corner]];
            ctx.style.vappend(words);
        }
        ctx.style.append(item::END);
    }
    Ok(())
}

fn outline_colour_component(ctx: &mut PropertyContext) -> CssResult<Staged> {
    if take_keyword(ctx, &["invert"]).is_some() {
        return Ok(Staged::keyword(KW_INVERT));
    }
    colour_component(ctx)
}

fn outline_style_component(ctx: &mut PropertyContext) -> CssResult<Staged> {
    Ok(Staged::keyword(parse_keyword(ctx, OUTLINE_STYLE)?))
}

fn parse_outline(ctx: &mut PropertyContext, flag_bits: u8) -> CssResult<()> {
    parse_trio(
        ctx,
        flag_bits,
        [PropertyId::OutlineColor, PropertyId::OutlineStyle, PropertyId::OutlineWidth],
        outline_colour_component,
        outline_style_component,
        border_width_component,
    )
}

fn column_rule_style_component(ctx: &mut PropertyContext) -> CssResult<Staged> {
    Ok(Staged::keyword(parse_keyword(ctx, BORDER_STYLE)?))
}

fn parse_column_rule(ctx: &mut PropertyContext, flag_bits: u8) -> CssResult<()> {
    parse_trio(
        ctx,
        flag_bits,
        [
            PropertyId::ColumnRuleColor,
            PropertyId::ColumnRuleStyle,
            PropertyId::ColumnRuleWidth,
        ],
        colour_component,
        column_rule_style_component,
        border_width_component,
    )
}

// [color || style || width] in any order, at most one of each.
fn parse_trio(
    ctx: &mut PropertyContext,
    flag_bits: u8,
    props: [PropertyId; 3],
    colour: fn(&mut PropertyContext) -> CssResult<Staged>,
    style: fn(&mut PropertyContext) -> CssResult<Staged>,
    width: fn(&mut PropertyContext) -> CssResult<Staged>,
) -> CssResult<()> {
    let mut staged: [Option<Staged>; 3] = [None, None, None];

    while !ctx.vector.only_whitespace_left() {
        if staged[1].is_none() {
            if let Some(s) = try_component(ctx, style) {
                staged[1] = Some(s);
                continue;
            }
        }
        if staged[2].is_none() {
            if let Some(s) = try_component(ctx, width) {
                staged[2] = Some(s);
                continue;
            }
        }
        if staged[0].is_none() {
            if let Some(s) = try_component(ctx, colour) {
                staged[0] = Some(s);
                continue;
            }
        }
        return Err(CssError::Invalid);
    }

    if staged.iter().all(Option::is_none) {
        return Err(CssError::Invalid);
    }

    for (prop, value) in props.iter().zip(&staged) {
        if let Some(value) = value {
            value.emit(ctx, *prop, flag_bits);
        }
    }
    Ok(())
}

// columns: [auto | <length>] || [auto | <integer>]
fn parse_columns(ctx: &mut PropertyContext, flag_bits: u8) -> CssResult<()> {
    let mut width: Option<Staged> = None;
    let mut count: Option<Staged> = None;
    let mut autos = 0usize;
    let mut values = 0usize;

    while !ctx.vector.only_whitespace_left() {
        if values >= 2 {
            return Err(CssError::Invalid);
        }
        values += 1;

        if take_keyword(ctx, &["auto"]).is_some() {
            autos += 1;
            continue;
        }

        let mark = ctx.vector.mark();
        if let Ok(value) = parse_integer(ctx) {
            if value <= 0 || count.is_some() {
                return Err(CssError::Invalid);
            }
            count = Some(Staged::integer(value));
            continue;
        }
        ctx.vector.rewind(mark);

        if width.is_some() {
            return Err(CssError::Invalid);
        }
        width = Some(Staged::dimension(parse_length(ctx, false, false)?));
    }

    if values == 0 {
        return Err(CssError::Invalid);
    }

    // autos fill whichever slots are left, width first
    for _ in 0..autos {
        if width.is_none() {
            width = Some(Staged::keyword(0));
        } else if count.is_none() {
            count = Some(Staged::keyword(0));
        } else {
            return Err(CssError::Invalid);
        }
    }

    if let Some(count) = count {
        count.emit(ctx, PropertyId::ColumnCount, flag_bits);
    }
    if let Some(width) = width {
        width.emit(ctx, PropertyId::ColumnWidth, flag_bits);
    }
    Ok(())
}

// background: [color || image || repeat || attachment || position]
fn parse_background(ctx: &mut PropertyContext, flag_bits: u8) -> CssResult<()> {
    let mut colour: Option<Staged> = None;
    let mut image: Option<Staged> = None;
    let mut repeat: Option<u16> = None;
    let mut attachment: Option<u16> = None;
    let mut position: Option<[CodeWord; 4]> = None;

    let mut any = false;

    while !ctx.vector.only_whitespace_left() {
        if repeat.is_none() {
            if let Some(index) = take_keyword(ctx, longhand::BACKGROUND_REPEAT) {
                repeat = Some(index);
                any = true;
                continue;
            }
        }
        if attachment.is_none() {
            if let Some(index) = take_keyword(ctx, &["fixed", "scroll"]) {
                attachment = Some(index);
                any = true;
                continue;
            }
        }
        if image.is_none() {
            if take_keyword(ctx, &["none"]).is_some() {
                image = Some(Staged::keyword(0));
                any = true;
                continue;
            }
            let mark = ctx.vector.mark();
            if let Ok(index) = parse_uri_index(ctx) {
                image = Some(Staged::uri(index));
                any = true;
                continue;
            }
            ctx.vector.rewind(mark);
        }
        if position.is_none() {
            let mark = ctx.vector.mark();
            if let Ok((h, v)) = position_pair(ctx) {
                position = Some([h.value.to_word(), h.unit.word(), v.value.to_word(), v.unit.word()]);
                any = true;
                continue;
            }
            ctx.vector.rewind(mark);
        }
        if colour.is_none() {
            if let Some(staged) = try_component(ctx, colour_component) {
                colour = Some(staged);
                any = true;
                continue;
            }
        }
        return Err(CssError::Invalid);
    }

    if !any {
        return Err(CssError::Invalid);
    }

    if let Some(staged) = colour {
        staged.emit(ctx, PropertyId::BackgroundColor, flag_bits);
    }
    if let Some(staged) = image {
        staged.emit(ctx, PropertyId::BackgroundImage, flag_bits);
    }
    if let Some(index) = repeat {
        ctx.style.append_opv(PropertyId::BackgroundRepeat, flag_bits, index);
    }
    if let Some(index) = attachment {
        ctx.style.append_opv(PropertyId::BackgroundAttachment, flag_bits, index);
    }
    if let Some(words) = position {
        ctx.style.append_opv(PropertyId::BackgroundPosition, flag_bits, tag::PAIR);
        ctx.style.vappend(&words);
    }
    Ok(())
}

const SYSTEM_FONTS: &[&str] = &["caption", "icon", "menu", "message-box", "small-caption", "status-bar"];

// font: system keyword, or
// [ <style> || <variant> || <weight> ]? <size> [ / <line-height> ]? <family>
fn parse_font(ctx: &mut PropertyContext, flag_bits: u8) -> CssResult<()> {
    if let Some(index) = take_keyword(ctx, SYSTEM_FONTS) {
        if !ctx.vector.only_whitespace_left() {
            return Err(CssError::Invalid);
        }
        return expand_system_font(ctx, flag_bits, SYSTEM_FONTS[index as usize]);
    }

    let mut style: Option<u16> = None;
    let mut variant: Option<u16> = None;
    let mut weight: Option<u16> = None;

    // leading components; plain `normal` is valid for any of them
    loop {
        if take_keyword(ctx, &["normal"]).is_some() {
            continue;
        }
        if style.is_none() {
            if let Some(index) = take_keyword(ctx, FONT_STYLE) {
                style = Some(index);
                continue;
            }
        }
        if variant.is_none() {
            if let Some(index) = take_keyword(ctx, FONT_VARIANT) {
                variant = Some(index);
                continue;
            }
        }
        if weight.is_none() {
            if let Some(staged) = try_font_weight(ctx) {
                weight = Some(staged);
                continue;
            }
        }
        break;
    }

    // font-size is mandatory
    let size = if let Some(index) = take_keyword(ctx, FONT_SIZE_KW) {
        Staged::keyword(index)
    } else {
        Staged::dimension(parse_length(ctx, true, false)?)
    };

    // optional /line-height
    let mut line_height: Option<Staged> = None;
    let mark = ctx.vector.mark();
    if let Some(token) = ctx.vector.next_non_ws() {
        if token.is_delim('/') {
            line_height = Some(font_line_height(ctx)?);
        } else {
            ctx.vector.rewind(mark);
        }
    }

    let family = family_items(ctx, GENERIC_FAMILIES)?;

    // expanded in canonical longhand order; absent leading components reset
    // to normal
    ctx.style.append_opv(PropertyId::FontStyle, flag_bits, style.unwrap_or(0));
    ctx.style.append_opv(PropertyId::FontVariant, flag_bits, variant.unwrap_or(0));
    ctx.style.append_opv(PropertyId::FontWeight, flag_bits, weight.unwrap_or(0));
    size.emit(ctx, PropertyId::FontSize, flag_bits);
    match line_height {
        Some(staged) => staged.emit(ctx, PropertyId::LineHeight, flag_bits),
        None => ctx.style.append_opv(PropertyId::LineHeight, flag_bits, 0),
    }
    ctx.style.append_opv(PropertyId::FontFamily, flag_bits, tag::LIST);
    ctx.style.vappend(&family);
    ctx.style.append(item::END);
    Ok(())
}

fn try_font_weight(ctx: &mut PropertyContext) -> Option<u16> {
    if let Some(index) = take_keyword(ctx, FONT_WEIGHT_KW) {
        return Some(index);
    }
    let mark = ctx.vector.mark();
    if let Ok(value) = parse_integer(ctx) {
        if value >= 100 && value <= 900 && value % 100 == 0 {
            return Some(FONT_WEIGHT_KW.len() as u16 + (value / 100 - 1) as u16);
        }
    }
    ctx.vector.rewind(mark);
    None
}

fn font_line_height(ctx: &mut PropertyContext) -> CssResult<Staged> {
    if take_keyword(ctx, &["normal"]).is_some() {
        return Ok(Staged::keyword(0));
    }

    let mark = ctx.vector.mark();
    if let Some(token) = ctx.vector.next_non_ws() {
        if let TokenKind::Number { value, .. } = token.kind {
            if !value.is_zero() && !value.is_negative() {
                return Ok(Staged::number(value));
            }
        }
    }
    ctx.vector.rewind(mark);

    Ok(Staged::dimension(parse_length(ctx, true, false)?))
}

fn expand_system_font(ctx: &mut PropertyContext, flag_bits: u8, keyword: &str) -> CssResult<()> {
    let Some(font) = &ctx.handlers.font else {
        return Err(CssError::Invalid);
    };

    let system = match font(keyword) {
        Ok(system) => system,
        Err(CssError::Nomem) => return Err(CssError::Nomem),
        Err(_) => return Err(CssError::Invalid),
    };

    let family = ctx.interner.intern(&system.family);
    let family_index = ctx.strings.add(family);

    ctx.style
        .append_opv(PropertyId::FontStyle, flag_bits, if system.italic { 1 } else { 0 });
    ctx.style.append_opv(PropertyId::FontVariant, flag_bits, 0);
    ctx.style
        .append_opv(PropertyId::FontWeight, flag_bits, if system.bold { 1 } else { 0 });
    ctx.style.append_opv(PropertyId::FontSize, flag_bits, tag::DIMENSION);
    ctx.style.vappend(&[system.size.to_word(), system.size_unit.word()]);
    ctx.style.append_opv(PropertyId::LineHeight, flag_bits, 0);
    ctx.style.append_opv(PropertyId::FontFamily, flag_bits, tag::LIST);
    ctx.style.vappend(&[item::STRING, family_index, item::END]);
    Ok(())
}

// list-style: [ <type> || <position> || <image> ]; a single `none` is the
// type.
fn parse_list_style(ctx: &mut PropertyContext, flag_bits: u8) -> CssResult<()> {
    let mut list_type: Option<u16> = None;
    let mut position: Option<u16> = None;
    let mut image: Option<Staged> = None;

    while !ctx.vector.only_whitespace_left() {
        if position.is_none() {
            if let Some(index) = take_keyword(ctx, LIST_STYLE_POSITION) {
                position = Some(index);
                continue;
            }
        }
        if list_type.is_none() {
            if let Some(index) = take_keyword(ctx, LIST_STYLE_TYPE) {
                list_type = Some(index);
                continue;
            }
        }
        if image.is_none() {
            let mark = ctx.vector.mark();
            if let Ok(index) = parse_uri_index(ctx) {
                image = Some(Staged::uri(index));
                continue;
            }
            ctx.vector.rewind(mark);
        }
        return Err(CssError::Invalid);
    }

    if list_type.is_none() && position.is_none() && image.is_none() {
        return Err(CssError::Invalid);
    }

    if let Some(staged) = image {
        staged.emit(ctx, PropertyId::ListStyleImage, flag_bits);
    }
    if let Some(index) = position {
        ctx.style.append_opv(PropertyId::ListStylePosition, flag_bits, index);
    }
    if let Some(index) = list_type {
        ctx.style.append_opv(PropertyId::ListStyleType, flag_bits, index);
    }
    Ok(())
}

fn cue_component(ctx: &mut PropertyContext) -> CssResult<Staged> {
    if take_keyword(ctx, &["none"]).is_some() {
        return Ok(Staged::keyword(0));
    }
    Ok(Staged::uri(parse_uri_index(ctx)?))
}

// cue: <cue-before> <cue-after>?; one value sets both.
fn parse_cue(ctx: &mut PropertyContext, flag_bits: u8) -> CssResult<()> {
    let before = cue_component(ctx)?;
    let after = if ctx.vector.only_whitespace_left() {
        before.clone()
    } else {
        cue_component(ctx)?
    };

    before.emit(ctx, PropertyId::CueBefore, flag_bits);
    after.emit(ctx, PropertyId::CueAfter, flag_bits);
    Ok(())
}

// pause: <pause-before> <pause-after>?; one value sets both.
fn parse_pause(ctx: &mut PropertyContext, flag_bits: u8) -> CssResult<()> {
    let before = Staged::dimension(parse_time_or_pct(ctx)?);
    let after = if ctx.vector.only_whitespace_left() {
        before.clone()
    } else {
        Staged::dimension(parse_time_or_pct(ctx)?)
    };

    before.emit(ctx, PropertyId::PauseBefore, flag_bits);
    after.emit(ctx, PropertyId::PauseAfter, flag_bits);
    Ok(())
}
