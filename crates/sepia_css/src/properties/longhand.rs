//! Longhand property grammars. Every parser appends exactly one OPV header
//! plus the payload its value tag requires; on failure nothing is appended
//! (the dispatcher rolls the buffer back).

use smallvec::SmallVec;

use sepia_shared::errors::{CssError, CssResult};
use sepia_shared::fixed::Fixed;

use crate::bytecode::{item, tag, CodeWord, Unit};
use crate::properties::values::{
    keyword_index, parse_angle, parse_colour, parse_frequency, parse_integer, parse_keyword, parse_length,
    parse_number, parse_time_or_pct, parse_uri_index, Colour, LengthSpec,
};
use crate::properties::{PropertyContext, PropertyId};
use crate::tokenizer::TokenKind;

// Keyword value tags shared by the colour properties.
pub(super) const KW_TRANSPARENT: u16 = 0x00;
pub(super) const KW_CURRENT_COLOR: u16 = 0x01;
pub(super) const KW_INVERT: u16 = 0x02;

// text-decoration is a keyword bitmask; `none` sits above the bits.
const DECOR_UNDERLINE: u16 = 0x01;
const DECOR_OVERLINE: u16 = 0x02;
const DECOR_LINE_THROUGH: u16 = 0x04;
const DECOR_BLINK: u16 = 0x08;
const DECOR_NONE: u16 = 0x10;

// azimuth: positional keyword index, optionally or'd with the behind bit.
const AZIMUTH_BEHIND_BIT: u16 = 0x20;
const AZIMUTH_CENTER: u16 = 4;

const BACKGROUND_ATTACHMENT: &[&str] = &["fixed", "scroll"];
pub(super) const BACKGROUND_REPEAT: &[&str] = &["no-repeat", "repeat-x", "repeat-y", "repeat"];
const BACKGROUND_SIZE_KW: &[&str] = &["cover", "contain"];
const BORDER_COLLAPSE: &[&str] = &["collapse", "separate"];
pub(super) const BORDER_STYLE: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];
pub(super) const OUTLINE_STYLE: &[&str] = &[
    "none", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];
pub(super) const BORDER_WIDTH_KW: &[&str] = &["thin", "medium", "thick"];
const BREAK_BEFORE_AFTER: &[&str] = &[
    "auto", "always", "avoid", "left", "right", "page", "column", "avoid-page", "avoid-column",
];
const BREAK_INSIDE: &[&str] = &["auto", "avoid", "avoid-page", "avoid-column"];
const CAPTION_SIDE: &[&str] = &["top", "bottom"];
const CLEAR: &[&str] = &["none", "left", "right", "both"];
const COLUMN_FILL: &[&str] = &["balance", "auto"];
const COLUMN_SPAN: &[&str] = &["none", "all"];
const CONTENT_KW: &[&str] = &["open-quote", "close-quote", "no-open-quote", "no-close-quote"];
pub(super) const CURSOR_KW: &[&str] = &[
    "auto", "crosshair", "default", "pointer", "move", "e-resize", "ne-resize", "nw-resize", "n-resize",
    "se-resize", "sw-resize", "s-resize", "w-resize", "text", "wait", "help", "progress",
];
const DIRECTION: &[&str] = &["ltr", "rtl"];
pub(super) const DISPLAY: &[&str] = &[
    "inline", "block", "list-item", "run-in", "inline-block", "table", "inline-table", "table-row-group",
    "table-header-group", "table-footer-group", "table-row", "table-column-group", "table-column",
    "table-cell", "table-caption", "none",
];
const ELEVATION_KW: &[&str] = &["below", "level", "above", "higher", "lower"];
const EMPTY_CELLS: &[&str] = &["show", "hide"];
const FLOAT: &[&str] = &["left", "right", "none"];
pub(super) const FONT_SIZE_KW: &[&str] = &[
    "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large", "larger", "smaller",
];
pub(super) const FONT_STYLE: &[&str] = &["normal", "italic", "oblique"];
pub(super) const FONT_VARIANT: &[&str] = &["normal", "small-caps"];
pub(super) const FONT_WEIGHT_KW: &[&str] = &["normal", "bold", "bolder", "lighter"];
pub(super) const GENERIC_FAMILIES: &[&str] = &["serif", "sans-serif", "cursive", "fantasy", "monospace"];
const GENERIC_VOICES: &[&str] = &["male", "female", "child"];
const HYPHENS: &[&str] = &["auto", "manual", "none"];
pub(super) const LIST_STYLE_POSITION: &[&str] = &["inside", "outside"];
pub(super) const LIST_STYLE_TYPE: &[&str] = &[
    "disc", "circle", "square", "decimal", "decimal-leading-zero", "lower-roman", "upper-roman",
    "lower-greek", "lower-latin", "upper-latin", "armenian", "georgian", "lower-alpha", "upper-alpha",
    "none",
];
pub(super) const OVERFLOW: &[&str] = &["visible", "hidden", "scroll", "auto"];
const PAGE_BREAK: &[&str] = &["auto", "always", "avoid", "left", "right"];
const PAGE_BREAK_INSIDE: &[&str] = &["auto", "avoid"];
const PITCH_KW: &[&str] = &["x-low", "low", "medium", "high", "x-high"];
const PLAY_DURING_KW: &[&str] = &["auto", "none"];
const PLAY_DURING_MODIFIERS: &[&str] = &["mix", "repeat"];
const POSITION: &[&str] = &["static", "relative", "absolute", "fixed"];
const POSITION_KW: &[&str] = &["left", "right", "top", "bottom", "center"];
const SPEAK: &[&str] = &["normal", "none", "spell-out"];
const SPEAK_HEADER: &[&str] = &["once", "always"];
const SPEAK_NUMERAL: &[&str] = &["digits", "continuous"];
const SPEAK_PUNCTUATION: &[&str] = &["code", "none"];
const SPEECH_RATE_KW: &[&str] = &["x-slow", "slow", "medium", "fast", "x-fast", "faster", "slower"];
const TABLE_LAYOUT: &[&str] = &["auto", "fixed"];
const TEXT_ALIGN: &[&str] = &["left", "right", "center", "justify"];
const TEXT_TRANSFORM: &[&str] = &["capitalize", "uppercase", "lowercase", "none"];
const UNICODE_BIDI: &[&str] = &["normal", "embed", "bidi-override"];
const VERTICAL_ALIGN_KW: &[&str] = &[
    "baseline", "sub", "super", "top", "text-top", "middle", "bottom", "text-bottom",
];
const VISIBILITY: &[&str] = &["visible", "hidden", "collapse"];
const VOLUME_KW: &[&str] = &["silent", "x-soft", "soft", "medium", "loud", "x-loud"];
const WHITE_SPACE: &[&str] = &["normal", "pre", "nowrap", "pre-wrap", "pre-line"];
const WRITING_MODE: &[&str] = &["horizontal-tb", "vertical-rl", "vertical-lr"];
const AZIMUTH_KW: &[&str] = &[
    "left-side", "far-left", "left", "center-left", "center", "center-right", "right", "far-right",
    "right-side", "leftwards", "rightwards",
];

/// A parsed component value staged before its OPV is written. Shorthands
/// stage components first because the same value can target several
/// longhands (box sides, radius corners).
#[derive(Clone, Debug)]
pub(super) struct Staged {
    pub vtag: u16,
    pub payload: SmallVec<[CodeWord; 4]>,
}

impl Staged {
    pub fn keyword(index: u16) -> Staged {
        Staged {
            vtag: index,
            payload: SmallVec::new(),
        }
    }

    pub fn dimension(spec: LengthSpec) -> Staged {
        Staged {
            vtag: tag::DIMENSION,
            payload: SmallVec::from_slice(&[spec.value.to_word(), spec.unit.word()]),
        }
    }

    pub fn colour(colour: Colour) -> Staged {
        match colour {
            Colour::Transparent => Staged::keyword(KW_TRANSPARENT),
            Colour::CurrentColor => Staged::keyword(KW_CURRENT_COLOR),
            Colour::Value(argb) => Staged {
                vtag: tag::COLOR,
                payload: SmallVec::from_slice(&[argb]),
            },
        }
    }

    pub fn uri(index: u32) -> Staged {
        Staged {
            vtag: tag::URI,
            payload: SmallVec::from_slice(&[index]),
        }
    }

    pub fn number(value: Fixed) -> Staged {
        Staged {
            vtag: tag::NUMBER,
            payload: SmallVec::from_slice(&[value.to_word()]),
        }
    }

    pub fn integer(value: i32) -> Staged {
        Staged {
            vtag: tag::INTEGER,
            payload: SmallVec::from_slice(&[value as u32]),
        }
    }

    pub fn emit(&self, ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) {
        ctx.style.append_opv(id, flag_bits, self.vtag);
        ctx.style.vappend(&self.payload);
    }
}

/// Consumes an IDENT from the table if one is next, leaving the cursor
/// untouched otherwise.
pub(super) fn take_keyword(ctx: &mut PropertyContext, table: &[&str]) -> Option<u16> {
    let mark = ctx.vector.mark();
    if let Some(token) = ctx.vector.next_non_ws() {
        if let TokenKind::Ident(ref value) = token.kind {
            if let Some(index) = keyword_index(table, value.folded()) {
                return Some(index);
            }
        }
    }
    ctx.vector.rewind(mark);
    None
}

fn take_ident_ci(ctx: &mut PropertyContext, keyword: &str) -> bool {
    let mark = ctx.vector.mark();
    if let Some(token) = ctx.vector.next_non_ws() {
        if token.is_ident_ci(keyword) {
            return true;
        }
    }
    ctx.vector.rewind(mark);
    false
}

fn emit_keyword(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8, table: &[&str]) -> CssResult<()> {
    let index = parse_keyword(ctx, table)?;
    ctx.style.append_opv(id, flag_bits, index);
    Ok(())
}

// keyword | <length [| percentage]>
fn emit_length_or_kw(
    ctx: &mut PropertyContext,
    id: PropertyId,
    flag_bits: u8,
    keywords: &[&str],
    allow_pct: bool,
    allow_negative: bool,
) -> CssResult<()> {
    if !keywords.is_empty() {
        if let Some(index) = take_keyword(ctx, keywords) {
            ctx.style.append_opv(id, flag_bits, index);
            return Ok(());
        }
    }
    let spec = parse_length(ctx, allow_pct, allow_negative)?;
    Staged::dimension(spec).emit(ctx, id, flag_bits);
    Ok(())
}

fn emit_colour(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    let colour = parse_colour(ctx)?;
    Staged::colour(colour).emit(ctx, id, flag_bits);
    Ok(())
}

// none | url(...)
fn emit_uri_or_none(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    if take_ident_ci(ctx, "none") {
        ctx.style.append_opv(id, flag_bits, 0);
        return Ok(());
    }
    let index = parse_uri_index(ctx)?;
    Staged::uri(index).emit(ctx, id, flag_bits);
    Ok(())
}

fn emit_list(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8, items: &[CodeWord]) {
    ctx.style.append_opv(id, flag_bits, tag::LIST);
    ctx.style.vappend(items);
    ctx.style.append(item::END);
}

pub(super) fn parse(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    use PropertyId::*;

    match id {
        // plain keyword sets
        BackgroundAttachment => emit_keyword(ctx, id, flag_bits, BACKGROUND_ATTACHMENT),
        BackgroundRepeat => emit_keyword(ctx, id, flag_bits, BACKGROUND_REPEAT),
        BorderCollapse => emit_keyword(ctx, id, flag_bits, BORDER_COLLAPSE),
        BorderTopStyle | BorderRightStyle | BorderBottomStyle | BorderLeftStyle | ColumnRuleStyle => {
            emit_keyword(ctx, id, flag_bits, BORDER_STYLE)
        }
        OutlineStyle => emit_keyword(ctx, id, flag_bits, OUTLINE_STYLE),
        BreakAfter | BreakBefore => emit_keyword(ctx, id, flag_bits, BREAK_BEFORE_AFTER),
        BreakInside => emit_keyword(ctx, id, flag_bits, BREAK_INSIDE),
        CaptionSide => emit_keyword(ctx, id, flag_bits, CAPTION_SIDE),
        Clear => emit_keyword(ctx, id, flag_bits, CLEAR),
        ColumnFill => emit_keyword(ctx, id, flag_bits, COLUMN_FILL),
        ColumnSpan => emit_keyword(ctx, id, flag_bits, COLUMN_SPAN),
        Direction => emit_keyword(ctx, id, flag_bits, DIRECTION),
        Display => emit_keyword(ctx, id, flag_bits, DISPLAY),
        EmptyCells => emit_keyword(ctx, id, flag_bits, EMPTY_CELLS),
        Float => emit_keyword(ctx, id, flag_bits, FLOAT),
        FontStyle => emit_keyword(ctx, id, flag_bits, FONT_STYLE),
        FontVariant => emit_keyword(ctx, id, flag_bits, FONT_VARIANT),
        Hyphens => emit_keyword(ctx, id, flag_bits, HYPHENS),
        ListStylePosition => emit_keyword(ctx, id, flag_bits, LIST_STYLE_POSITION),
        ListStyleType => emit_keyword(ctx, id, flag_bits, LIST_STYLE_TYPE),
        OverflowX | OverflowY => emit_keyword(ctx, id, flag_bits, OVERFLOW),
        PageBreakAfter | PageBreakBefore => emit_keyword(ctx, id, flag_bits, PAGE_BREAK),
        PageBreakInside => emit_keyword(ctx, id, flag_bits, PAGE_BREAK_INSIDE),
        Position => emit_keyword(ctx, id, flag_bits, POSITION),
        Speak => emit_keyword(ctx, id, flag_bits, SPEAK),
        SpeakHeader => emit_keyword(ctx, id, flag_bits, SPEAK_HEADER),
        SpeakNumeral => emit_keyword(ctx, id, flag_bits, SPEAK_NUMERAL),
        SpeakPunctuation => emit_keyword(ctx, id, flag_bits, SPEAK_PUNCTUATION),
        TableLayout => emit_keyword(ctx, id, flag_bits, TABLE_LAYOUT),
        TextAlign => emit_keyword(ctx, id, flag_bits, TEXT_ALIGN),
        TextTransform => emit_keyword(ctx, id, flag_bits, TEXT_TRANSFORM),
        UnicodeBidi => emit_keyword(ctx, id, flag_bits, UNICODE_BIDI),
        Visibility => emit_keyword(ctx, id, flag_bits, VISIBILITY),
        WhiteSpace => emit_keyword(ctx, id, flag_bits, WHITE_SPACE),
        WritingMode => emit_keyword(ctx, id, flag_bits, WRITING_MODE),

        // colours
        Color | BackgroundColor | BorderTopColor | BorderRightColor | BorderBottomColor | BorderLeftColor
        | ColumnRuleColor => emit_colour(ctx, id, flag_bits),
        OutlineColor => {
            if take_ident_ci(ctx, "invert") {
                ctx.style.append_opv(id, flag_bits, KW_INVERT);
                Ok(())
            } else {
                emit_colour(ctx, id, flag_bits)
            }
        }

        // lengths with per-property keyword alternatives
        BorderTopWidth | BorderRightWidth | BorderBottomWidth | BorderLeftWidth | OutlineWidth
        | ColumnRuleWidth => emit_length_or_kw(ctx, id, flag_bits, BORDER_WIDTH_KW, false, false),
        Width | Height => emit_length_or_kw(ctx, id, flag_bits, &["auto"], true, false),
        MinWidth | MinHeight => emit_length_or_kw(ctx, id, flag_bits, &[], true, false),
        MaxWidth | MaxHeight => emit_length_or_kw(ctx, id, flag_bits, &["none"], true, false),
        Top | Right | Bottom | Left => emit_length_or_kw(ctx, id, flag_bits, &["auto"], true, true),
        MarginTop | MarginRight | MarginBottom | MarginLeft => {
            emit_length_or_kw(ctx, id, flag_bits, &["auto"], true, true)
        }
        PaddingTop | PaddingRight | PaddingBottom | PaddingLeft => {
            emit_length_or_kw(ctx, id, flag_bits, &[], true, false)
        }
        FontSize => emit_length_or_kw(ctx, id, flag_bits, FONT_SIZE_KW, true, false),
        LetterSpacing | WordSpacing => emit_length_or_kw(ctx, id, flag_bits, &["normal"], false, true),
        TextIndent => emit_length_or_kw(ctx, id, flag_bits, &[], true, true),
        VerticalAlign => emit_length_or_kw(ctx, id, flag_bits, VERTICAL_ALIGN_KW, true, true),
        ColumnGap => emit_length_or_kw(ctx, id, flag_bits, &["normal"], false, false),
        ColumnWidth => emit_length_or_kw(ctx, id, flag_bits, &["auto"], false, false),

        // uris
        BackgroundImage | ListStyleImage | CueAfter | CueBefore => emit_uri_or_none(ctx, id, flag_bits),

        // numbers and integers
        Opacity => {
            let value = parse_number(ctx)?.clamp(Fixed::ZERO, Fixed::ONE);
            Staged::number(value).emit(ctx, id, flag_bits);
            Ok(())
        }
        Orphans | Widows => {
            let value = parse_integer(ctx)?;
            Staged::integer(value).emit(ctx, id, flag_bits);
            Ok(())
        }
        ZIndex => {
            if take_ident_ci(ctx, "auto") {
                ctx.style.append_opv(id, flag_bits, 0);
                return Ok(());
            }
            let value = parse_integer(ctx)?;
            Staged::integer(value).emit(ctx, id, flag_bits);
            Ok(())
        }
        ColumnCount => {
            if take_ident_ci(ctx, "auto") {
                ctx.style.append_opv(id, flag_bits, 0);
                return Ok(());
            }
            let value = parse_integer(ctx)?;
            if value <= 0 {
                return Err(CssError::Invalid);
            }
            Staged::integer(value).emit(ctx, id, flag_bits);
            Ok(())
        }
        PitchRange | Richness | Stress => {
            let value = parse_number(ctx)?;
            if value.is_negative() || value.int_part() > 100 {
                return Err(CssError::Invalid);
            }
            Staged::number(value).emit(ctx, id, flag_bits);
            Ok(())
        }

        FontWeight => parse_font_weight(ctx, id, flag_bits),
        LineHeight => parse_line_height(ctx, id, flag_bits),

        // aural dimensions
        Elevation => {
            if let Some(index) = take_keyword(ctx, ELEVATION_KW) {
                ctx.style.append_opv(id, flag_bits, index);
                return Ok(());
            }
            let spec = parse_angle(ctx)?;
            Staged::dimension(spec).emit(ctx, id, flag_bits);
            Ok(())
        }
        Pitch => {
            if let Some(index) = take_keyword(ctx, PITCH_KW) {
                ctx.style.append_opv(id, flag_bits, index);
                return Ok(());
            }
            let spec = parse_frequency(ctx)?;
            Staged::dimension(spec).emit(ctx, id, flag_bits);
            Ok(())
        }
        SpeechRate => {
            if let Some(index) = take_keyword(ctx, SPEECH_RATE_KW) {
                ctx.style.append_opv(id, flag_bits, index);
                return Ok(());
            }
            let value = parse_number(ctx)?;
            if value.is_negative() {
                return Err(CssError::Invalid);
            }
            Staged::number(value).emit(ctx, id, flag_bits);
            Ok(())
        }
        PauseAfter | PauseBefore => {
            let spec = parse_time_or_pct(ctx)?;
            Staged::dimension(spec).emit(ctx, id, flag_bits);
            Ok(())
        }
        Volume => parse_volume(ctx, id, flag_bits),
        Azimuth => parse_azimuth(ctx, id, flag_bits),

        // structured values
        BackgroundPosition => parse_background_position(ctx, id, flag_bits),
        BackgroundSize => parse_background_size(ctx, id, flag_bits),
        BorderSpacing => parse_border_spacing(ctx, id, flag_bits),
        BorderTopLeftRadius | BorderTopRightRadius | BorderBottomLeftRadius | BorderBottomRightRadius => {
            parse_radius_side(ctx, id, flag_bits)
        }
        Clip => parse_clip(ctx, id, flag_bits),
        Content => parse_content(ctx, id, flag_bits),
        CounterIncrement => parse_counter_list(ctx, id, flag_bits, 1),
        CounterReset => parse_counter_list(ctx, id, flag_bits, 0),
        Cursor => parse_cursor(ctx, id, flag_bits),
        FontFamily => {
            let items = family_items(ctx, GENERIC_FAMILIES)?;
            emit_list(ctx, id, flag_bits, &items);
            Ok(())
        }
        VoiceFamily => {
            let items = family_items(ctx, GENERIC_VOICES)?;
            emit_list(ctx, id, flag_bits, &items);
            Ok(())
        }
        PlayDuring => parse_play_during(ctx, id, flag_bits),
        Quotes => parse_quotes(ctx, id, flag_bits),
        TextDecoration => parse_text_decoration(ctx, id, flag_bits),
    }
}

pub(super) fn parse_font_weight(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    if let Some(index) = take_keyword(ctx, FONT_WEIGHT_KW) {
        ctx.style.append_opv(id, flag_bits, index);
        return Ok(());
    }

    // 100..900 in steps of 100, mapped to tags after the keywords
    let value = parse_integer(ctx)?;
    if value < 100 || value > 900 || value % 100 != 0 {
        return Err(CssError::Invalid);
    }
    let index = FONT_WEIGHT_KW.len() as u16 + (value / 100 - 1) as u16;
    ctx.style.append_opv(id, flag_bits, index);
    Ok(())
}

pub(super) fn parse_line_height(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    if take_ident_ci(ctx, "normal") {
        ctx.style.append_opv(id, flag_bits, 0);
        return Ok(());
    }

    // a bare number is a multiplier, distinct from a length
    let mark = ctx.vector.mark();
    if let Some(token) = ctx.vector.next_non_ws() {
        if let TokenKind::Number { value, .. } = token.kind {
            if !value.is_zero() {
                if value.is_negative() {
                    return Err(CssError::Invalid);
                }
                Staged::number(value).emit(ctx, id, flag_bits);
                return Ok(());
            }
        }
    }
    ctx.vector.rewind(mark);

    let spec = parse_length(ctx, true, false)?;
    Staged::dimension(spec).emit(ctx, id, flag_bits);
    Ok(())
}

fn parse_volume(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    if let Some(index) = take_keyword(ctx, VOLUME_KW) {
        ctx.style.append_opv(id, flag_bits, index);
        return Ok(());
    }

    let mark = ctx.vector.mark();
    if let Some(token) = ctx.vector.next_non_ws() {
        match token.kind {
            TokenKind::Number { value, .. } => {
                if value.is_negative() || value.int_part() > 100 {
                    return Err(CssError::Invalid);
                }
                Staged::number(value).emit(ctx, id, flag_bits);
                return Ok(());
            }
            TokenKind::Percentage(value) => {
                if value.is_negative() {
                    return Err(CssError::Invalid);
                }
                Staged::dimension(LengthSpec {
                    value,
                    unit: Unit::Pct,
                })
                .emit(ctx, id, flag_bits);
                return Ok(());
            }
            _ => {}
        }
    }
    ctx.vector.rewind(mark);
    Err(CssError::Invalid)
}

fn parse_azimuth(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    let mark = ctx.vector.mark();
    if let Ok(spec) = parse_angle(ctx) {
        Staged::dimension(spec).emit(ctx, id, flag_bits);
        return Ok(());
    }
    ctx.vector.rewind(mark);

    // behind may precede or follow a positional keyword
    let mut behind = take_ident_ci(ctx, "behind");
    let positional = take_keyword(ctx, AZIMUTH_KW);
    if !behind {
        behind = take_ident_ci(ctx, "behind");
    }

    match positional {
        // leftwards / rightwards stand alone
        Some(index) if index >= 9 => {
            if behind {
                return Err(CssError::Invalid);
            }
            ctx.style.append_opv(id, flag_bits, index);
            Ok(())
        }
        Some(index) => {
            let value = if behind { index | AZIMUTH_BEHIND_BIT } else { index };
            ctx.style.append_opv(id, flag_bits, value);
            Ok(())
        }
        None if behind => {
            ctx.style.append_opv(id, flag_bits, AZIMUTH_CENTER | AZIMUTH_BEHIND_BIT);
            Ok(())
        }
        None => Err(CssError::Invalid),
    }
}

// A single background-position component: keyword (as a percentage) or
// length/percentage. Axis tells how keywords bind.
#[derive(Clone, Copy, PartialEq)]
enum PosAxis {
    Horizontal,
    Vertical,
    Either,
}

fn position_component(ctx: &mut PropertyContext) -> CssResult<(LengthSpec, PosAxis)> {
    if let Some(index) = take_keyword(ctx, POSITION_KW) {
        let (pct, axis) = match index {
            0 => (0, PosAxis::Horizontal),   // left
            1 => (100, PosAxis::Horizontal), // right
            2 => (0, PosAxis::Vertical),     // top
            3 => (100, PosAxis::Vertical),   // bottom
            _ => (50, PosAxis::Either),      // center
        };
        return Ok((
            LengthSpec {
                value: Fixed::from_int(pct)?,
                unit: Unit::Pct,
            },
            axis,
        ));
    }

    let spec = parse_length(ctx, true, true)?;
    Ok((spec, PosAxis::Either))
}

/// One or two position components resolved to an (x, y) pair of
/// length/percentage values. Shared with the background shorthand.
pub(super) fn position_pair(ctx: &mut PropertyContext) -> CssResult<(LengthSpec, LengthSpec)> {
    let (first, first_axis) = position_component(ctx)?;

    let mark = ctx.vector.mark();
    let second = match position_component(ctx) {
        Ok(component) => Some(component),
        Err(_) => {
            ctx.vector.rewind(mark);
            None
        }
    };

    let (second, second_axis) = second.unwrap_or((
        LengthSpec {
            value: Fixed::from_int(50)?,
            unit: Unit::Pct,
        },
        PosAxis::Either,
    ));

    // `top left` binds by keyword axis, not position
    if first_axis == PosAxis::Vertical || second_axis == PosAxis::Horizontal {
        Ok((second, first))
    } else {
        Ok((first, second))
    }
}

pub(super) fn parse_background_position(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    let (horizontal, vertical) = position_pair(ctx)?;

    ctx.style.append_opv(id, flag_bits, tag::PAIR);
    ctx.style.vappend(&[
        horizontal.value.to_word(),
        horizontal.unit.word(),
        vertical.value.to_word(),
        vertical.unit.word(),
    ]);
    Ok(())
}

/// background-size: `cover`, `contain`, or one or two of
/// `{length | percentage | auto}`, written as a list.
pub(super) fn parse_background_size(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    if let Some(index) = take_keyword(ctx, BACKGROUND_SIZE_KW) {
        ctx.style.append_opv(id, flag_bits, index);
        return Ok(());
    }

    let mut items: SmallVec<[CodeWord; 8]> = SmallVec::new();
    let mut values = 0usize;

    while !ctx.vector.only_whitespace_left() {
        if values >= 2 {
            return Err(CssError::Invalid);
        }

        if take_ident_ci(ctx, "auto") {
            items.push(item::KEYWORD_BASE);
        } else {
            let spec = parse_length(ctx, true, false)?;
            items.push(item::VALUE);
            items.push(spec.value.to_word());
            items.push(spec.unit.word());
        }
        values += 1;
    }

    if values == 0 {
        return Err(CssError::Invalid);
    }

    emit_list(ctx, id, flag_bits, &items);
    Ok(())
}

fn parse_border_spacing(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    let first = parse_length(ctx, false, false)?;

    let mark = ctx.vector.mark();
    let second = match parse_length(ctx, false, false) {
        Ok(spec) => spec,
        Err(_) => {
            ctx.vector.rewind(mark);
            first
        }
    };

    ctx.style.append_opv(id, flag_bits, tag::PAIR);
    ctx.style.vappend(&[
        first.value.to_word(),
        first.unit.word(),
        second.value.to_word(),
        second.unit.word(),
    ]);
    Ok(())
}

/// One corner radius: one or two non-negative length/percentage (or bare
/// number) values, written as a list so the x/y pair stays self-describing.
pub(super) fn parse_radius_side(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    let mut items: SmallVec<[CodeWord; 8]> = SmallVec::new();
    let mut values = 0usize;

    while !ctx.vector.only_whitespace_left() && values < 2 {
        stage_radius_value(ctx, &mut items)?;
        values += 1;
    }

    if values == 0 || !ctx.vector.only_whitespace_left() {
        return Err(CssError::Invalid);
    }

    emit_list(ctx, id, flag_bits, &items);
    Ok(())
}

/// A single radius value, staged in list-item form. Shared with the
/// border-radius shorthand.
pub(super) fn stage_radius_value(ctx: &mut PropertyContext, items: &mut SmallVec<[CodeWord; 8]>) -> CssResult<()> {
    let mark = ctx.vector.mark();
    let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;

    match token.kind {
        TokenKind::Dimension { .. } | TokenKind::Percentage(_) => {
            ctx.vector.rewind(mark);
            let spec = parse_length(ctx, true, false)?;
            items.push(item::VALUE);
            items.push(spec.value.to_word());
            items.push(spec.unit.word());
            Ok(())
        }
        TokenKind::Number { value, .. } => {
            if value.is_negative() {
                return Err(CssError::Invalid);
            }
            items.push(item::NUMBER);
            items.push(value.to_word());
            Ok(())
        }
        _ => Err(CssError::Invalid),
    }
}

fn parse_clip(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    if take_ident_ci(ctx, "auto") {
        ctx.style.append_opv(id, flag_bits, 0);
        return Ok(());
    }

    let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
    match token.kind {
        TokenKind::Function(ref name) if name.eq_ci_str("rect") => {}
        _ => return Err(CssError::Invalid),
    }

    let mut items: SmallVec<[CodeWord; 16]> = SmallVec::new();
    for side in 0..4 {
        if side > 0 {
            // commas are optional in the legacy rect() form
            let mark = ctx.vector.mark();
            match ctx.vector.next_non_ws() {
                Some(t) if t.kind == TokenKind::Comma => {}
                _ => ctx.vector.rewind(mark),
            }
        }

        if take_ident_ci(ctx, "auto") {
            items.push(item::KEYWORD_BASE);
        } else {
            let spec = parse_length(ctx, false, true)?;
            items.push(item::VALUE);
            items.push(spec.value.to_word());
            items.push(spec.unit.word());
        }
    }

    match ctx.vector.next_non_ws() {
        Some(t) if t.kind == TokenKind::RParen => {}
        _ => return Err(CssError::Invalid),
    }

    emit_list(ctx, id, flag_bits, &items);
    Ok(())
}

fn parse_content(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    if take_ident_ci(ctx, "normal") {
        ctx.style.append_opv(id, flag_bits, 0);
        return Ok(());
    }
    if take_ident_ci(ctx, "none") {
        ctx.style.append_opv(id, flag_bits, 1);
        return Ok(());
    }

    let mut items: Vec<CodeWord> = Vec::new();

    while !ctx.vector.only_whitespace_left() {
        let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
        match token.kind {
            TokenKind::QuotedString(ref s) => {
                items.push(item::STRING);
                items.push(ctx.add_string(s));
            }
            TokenKind::Url(ref raw) => {
                items.push(item::URI);
                items.push(ctx.resolve_url(raw)?);
            }
            TokenKind::Ident(ref name) => {
                let index = keyword_index(CONTENT_KW, name.folded()).ok_or(CssError::Invalid)?;
                items.push(item::KEYWORD_BASE + u32::from(index));
            }
            TokenKind::Function(ref name) if name.eq_ci_str("counter") => {
                let (name_index, style) = parse_counter_function(ctx)?;
                items.push(item::COUNTER);
                items.push(name_index);
                items.push(style);
            }
            TokenKind::Function(ref name) if name.eq_ci_str("counters") => {
                let name_token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
                let TokenKind::Ident(ref counter_name) = name_token.kind else {
                    return Err(CssError::Invalid);
                };
                let name_index = ctx.add_string(counter_name);

                match ctx.vector.next_non_ws() {
                    Some(t) if t.kind == TokenKind::Comma => {}
                    _ => return Err(CssError::Invalid),
                }
                let sep_token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
                let TokenKind::QuotedString(ref separator) = sep_token.kind else {
                    return Err(CssError::Invalid);
                };
                let sep_index = ctx.add_string(separator);

                let style = parse_counter_style_tail(ctx)?;
                items.push(item::COUNTERS);
                items.push(name_index);
                items.push(sep_index);
                items.push(style);
            }
            TokenKind::Function(ref name) if name.eq_ci_str("attr") => {
                let attr_token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
                let TokenKind::Ident(ref attr_name) = attr_token.kind else {
                    return Err(CssError::Invalid);
                };
                let attr_index = ctx.add_string(attr_name);
                match ctx.vector.next_non_ws() {
                    Some(t) if t.kind == TokenKind::RParen => {}
                    _ => return Err(CssError::Invalid),
                }
                items.push(item::ATTR);
                items.push(attr_index);
            }
            _ => return Err(CssError::Invalid),
        }
    }

    if items.is_empty() {
        return Err(CssError::Invalid);
    }

    emit_list(ctx, id, flag_bits, &items);
    Ok(())
}

// counter(name [, list-style-type]) after the function token.
fn parse_counter_function(ctx: &mut PropertyContext) -> CssResult<(u32, u32)> {
    let name_token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
    let TokenKind::Ident(ref counter_name) = name_token.kind else {
        return Err(CssError::Invalid);
    };
    let name_index = ctx.add_string(counter_name);
    let style = parse_counter_style_tail(ctx)?;
    Ok((name_index, style))
}

// Optional ", list-style-type" then ")". Defaults to decimal.
fn parse_counter_style_tail(ctx: &mut PropertyContext) -> CssResult<u32> {
    let decimal = keyword_index(LIST_STYLE_TYPE, "decimal").unwrap_or(0);

    let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
    match token.kind {
        TokenKind::RParen => Ok(u32::from(decimal)),
        TokenKind::Comma => {
            let style = parse_keyword(ctx, LIST_STYLE_TYPE)?;
            match ctx.vector.next_non_ws() {
                Some(t) if t.kind == TokenKind::RParen => Ok(u32::from(style)),
                _ => Err(CssError::Invalid),
            }
        }
        _ => Err(CssError::Invalid),
    }
}

fn parse_counter_list(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8, default_delta: i32) -> CssResult<()> {
    if take_ident_ci(ctx, "none") {
        ctx.style.append_opv(id, flag_bits, 0);
        return Ok(());
    }

    let mut items: Vec<CodeWord> = Vec::new();

    while !ctx.vector.only_whitespace_left() {
        let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
        let TokenKind::Ident(ref counter_name) = token.kind else {
            return Err(CssError::Invalid);
        };
        let name_index = ctx.add_string(counter_name);

        let mark = ctx.vector.mark();
        let delta = match parse_integer(ctx) {
            Ok(value) => value,
            Err(_) => {
                ctx.vector.rewind(mark);
                default_delta
            }
        };

        items.push(item::COUNTER);
        items.push(name_index);
        items.push(delta as u32);
    }

    if items.is_empty() {
        return Err(CssError::Invalid);
    }

    emit_list(ctx, id, flag_bits, &items);
    Ok(())
}

fn parse_cursor(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    let mut uris: SmallVec<[CodeWord; 8]> = SmallVec::new();

    loop {
        let mark = ctx.vector.mark();
        match parse_uri_index(ctx) {
            Ok(index) => {
                uris.push(item::URI);
                uris.push(index);
                // each uri is followed by a comma; the generic keyword ends
                // the list
                match ctx.vector.next_non_ws() {
                    Some(t) if t.kind == TokenKind::Comma => {}
                    _ => return Err(CssError::Invalid),
                }
            }
            Err(_) => {
                ctx.vector.rewind(mark);
                break;
            }
        }
    }

    let keyword = parse_keyword(ctx, CURSOR_KW)?;

    if uris.is_empty() {
        ctx.style.append_opv(id, flag_bits, keyword);
        return Ok(());
    }

    uris.push(item::KEYWORD_BASE + u32::from(keyword));
    emit_list(ctx, id, flag_bits, &uris);
    Ok(())
}

/// Comma separated family list; unquoted names may span several idents and
/// keep their raw case. Shared by font-family and the font shorthand.
pub(super) fn family_items(ctx: &mut PropertyContext, generics: &[&str]) -> CssResult<Vec<CodeWord>> {
    let mut items: Vec<CodeWord> = Vec::new();

    loop {
        let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
        match token.kind {
            TokenKind::QuotedString(ref name) => {
                items.push(item::STRING);
                items.push(ctx.add_string(name));
            }
            TokenKind::Ident(ref first) => {
                // an ident run forms one family name; a lone generic keyword
                // becomes a keyword item instead
                let mut words: Vec<String> = vec![first.as_str().to_string()];
                loop {
                    let mark = ctx.vector.mark();
                    match ctx.vector.next_non_ws() {
                        Some(t) => match t.kind {
                            TokenKind::Ident(ref next) => words.push(next.as_str().to_string()),
                            _ => {
                                ctx.vector.rewind(mark);
                                break;
                            }
                        },
                        None => break,
                    }
                }

                if words.len() == 1 {
                    if let Some(index) = keyword_index(generics, first.folded()) {
                        items.push(item::KEYWORD_BASE + u32::from(index));
                        if !take_comma(ctx) {
                            break;
                        }
                        continue;
                    }
                }

                let joined = ctx.interner.intern(&words.join(" "));
                items.push(item::STRING);
                items.push(ctx.strings.add(joined));
            }
            _ => return Err(CssError::Invalid),
        }

        if !take_comma(ctx) {
            break;
        }
    }

    if items.is_empty() {
        return Err(CssError::Invalid);
    }

    Ok(items)
}

fn take_comma(ctx: &mut PropertyContext) -> bool {
    let mark = ctx.vector.mark();
    match ctx.vector.next_non_ws() {
        Some(t) if t.kind == TokenKind::Comma => true,
        _ => {
            ctx.vector.rewind(mark);
            false
        }
    }
}

fn parse_play_during(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    if let Some(index) = take_keyword(ctx, PLAY_DURING_KW) {
        ctx.style.append_opv(id, flag_bits, index);
        return Ok(());
    }

    let uri = parse_uri_index(ctx)?;
    let mut items: SmallVec<[CodeWord; 8]> = SmallVec::new();
    items.push(item::URI);
    items.push(uri);

    let mut seen = [false; 2];
    while let Some(index) = take_keyword(ctx, PLAY_DURING_MODIFIERS) {
        if seen[index as usize] {
            return Err(CssError::Invalid);
        }
        seen[index as usize] = true;
        items.push(item::KEYWORD_BASE + u32::from(index));
    }

    emit_list(ctx, id, flag_bits, &items);
    Ok(())
}

fn parse_quotes(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    if take_ident_ci(ctx, "none") {
        ctx.style.append_opv(id, flag_bits, 0);
        return Ok(());
    }

    let mut items: Vec<CodeWord> = Vec::new();

    // open/close pairs
    while !ctx.vector.only_whitespace_left() {
        for _ in 0..2 {
            let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
            let TokenKind::QuotedString(ref quote) = token.kind else {
                return Err(CssError::Invalid);
            };
            items.push(item::STRING);
            items.push(ctx.add_string(quote));
        }
    }

    if items.is_empty() {
        return Err(CssError::Invalid);
    }

    emit_list(ctx, id, flag_bits, &items);
    Ok(())
}

fn parse_text_decoration(ctx: &mut PropertyContext, id: PropertyId, flag_bits: u8) -> CssResult<()> {
    if take_ident_ci(ctx, "none") {
        ctx.style.append_opv(id, flag_bits, DECOR_NONE);
        return Ok(());
    }

    let mut mask: u16 = 0;
    while !ctx.vector.only_whitespace_left() {
        let token = ctx.vector.next_non_ws().ok_or(CssError::Invalid)?;
        let TokenKind::Ident(ref name) = token.kind else {
            return Err(CssError::Invalid);
        };
        let bit = match name.folded() {
            "underline" => DECOR_UNDERLINE,
            "overline" => DECOR_OVERLINE,
            "line-through" => DECOR_LINE_THROUGH,
            "blink" => DECOR_BLINK,
            _ => return Err(CssError::Invalid),
        };
        if mask & bit != 0 {
            return Err(CssError::Invalid);
        }
        mask |= bit;
    }

    if mask == 0 {
        return Err(CssError::Invalid);
    }

    ctx.style.append_opv(id, flag_bits, mask);
    Ok(())
}
