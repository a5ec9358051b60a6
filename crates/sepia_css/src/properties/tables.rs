use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::stylesheet::Level;

/// Identifier of a longhand property. The discriminant doubles as the 10-bit
/// opcode written into OPV words, so the order here is the opcode table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum PropertyId {
    Azimuth = 0,
    BackgroundAttachment,
    BackgroundColor,
    BackgroundImage,
    BackgroundPosition,
    BackgroundRepeat,
    BackgroundSize,
    BorderCollapse,
    BorderSpacing,
    BorderTopColor,
    BorderRightColor,
    BorderBottomColor,
    BorderLeftColor,
    BorderTopStyle,
    BorderRightStyle,
    BorderBottomStyle,
    BorderLeftStyle,
    BorderTopWidth,
    BorderRightWidth,
    BorderBottomWidth,
    BorderLeftWidth,
    BorderTopLeftRadius,
    BorderTopRightRadius,
    BorderBottomLeftRadius,
    BorderBottomRightRadius,
    Bottom,
    BreakAfter,
    BreakBefore,
    BreakInside,
    CaptionSide,
    Clear,
    Clip,
    Color,
    ColumnCount,
    ColumnFill,
    ColumnGap,
    ColumnRuleColor,
    ColumnRuleStyle,
    ColumnRuleWidth,
    ColumnSpan,
    ColumnWidth,
    Content,
    CounterIncrement,
    CounterReset,
    CueAfter,
    CueBefore,
    Cursor,
    Direction,
    Display,
    Elevation,
    EmptyCells,
    Float,
    FontFamily,
    FontSize,
    FontStyle,
    FontVariant,
    FontWeight,
    Height,
    Hyphens,
    Left,
    LetterSpacing,
    LineHeight,
    ListStyleImage,
    ListStylePosition,
    ListStyleType,
    MarginTop,
    MarginRight,
    MarginBottom,
    MarginLeft,
    MaxHeight,
    MaxWidth,
    MinHeight,
    MinWidth,
    Opacity,
    Orphans,
    OutlineColor,
    OutlineStyle,
    OutlineWidth,
    OverflowX,
    OverflowY,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    PaddingLeft,
    PageBreakAfter,
    PageBreakBefore,
    PageBreakInside,
    PauseAfter,
    PauseBefore,
    Pitch,
    PitchRange,
    PlayDuring,
    Position,
    Quotes,
    Richness,
    Right,
    Speak,
    SpeakHeader,
    SpeakNumeral,
    SpeakPunctuation,
    SpeechRate,
    Stress,
    TableLayout,
    TextAlign,
    TextDecoration,
    TextIndent,
    TextTransform,
    Top,
    UnicodeBidi,
    VerticalAlign,
    Visibility,
    VoiceFamily,
    Volume,
    WhiteSpace,
    Widows,
    Width,
    WordSpacing,
    WritingMode,
    ZIndex,
}

impl PropertyId {
    pub fn opcode(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        LONGHANDS[self as usize].0
    }

    /// Lowest language level at which the property is recognized; a sheet
    /// created with a lower level drops the declaration.
    pub fn minimum_level(self) -> Level {
        use PropertyId::*;
        match self {
            BackgroundSize | BorderTopLeftRadius | BorderTopRightRadius | BorderBottomLeftRadius
            | BorderBottomRightRadius | BreakAfter | BreakBefore | BreakInside | ColumnCount
            | ColumnFill | ColumnGap | ColumnRuleColor | ColumnRuleStyle | ColumnRuleWidth
            | ColumnSpan | ColumnWidth | Hyphens | Opacity | OverflowX | OverflowY | WritingMode => {
                Level::Css3
            }
            _ => Level::Css1,
        }
    }
}

/// A shorthand recognized by the dispatcher. Shorthands have no opcode of
/// their own; parsing one expands into longhand bytecode sequences.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShorthandId {
    Background,
    Border,
    BorderBottom,
    BorderColor,
    BorderLeft,
    BorderRadius,
    BorderRight,
    BorderStyle,
    BorderTop,
    BorderWidth,
    ColumnRule,
    Columns,
    Cue,
    Font,
    ListStyle,
    Margin,
    Outline,
    Overflow,
    Padding,
    Pause,
}

impl ShorthandId {
    /// Lowest language level at which the shorthand is recognized. The
    /// check runs on the declared name, so `overflow` stays available at
    /// CSS 2.1 even though its longhands are CSS3-only names.
    pub fn minimum_level(self) -> Level {
        match self {
            ShorthandId::BorderRadius | ShorthandId::ColumnRule | ShorthandId::Columns => Level::Css3,
            _ => Level::Css1,
        }
    }

    /// The longhands this shorthand expands to. `foo: inherit` defaults
    /// every one of them.
    pub fn expands_to(self) -> &'static [PropertyId] {
        use PropertyId::*;
        match self {
            ShorthandId::Background => &[
                BackgroundAttachment,
                BackgroundColor,
                BackgroundImage,
                BackgroundPosition,
                BackgroundRepeat,
            ],
            ShorthandId::Border => &[
                BorderTopColor,
                BorderTopStyle,
                BorderTopWidth,
                BorderRightColor,
                BorderRightStyle,
                BorderRightWidth,
                BorderBottomColor,
                BorderBottomStyle,
                BorderBottomWidth,
                BorderLeftColor,
                BorderLeftStyle,
                BorderLeftWidth,
            ],
            ShorthandId::BorderTop => &[BorderTopColor, BorderTopStyle, BorderTopWidth],
            ShorthandId::BorderRight => &[BorderRightColor, BorderRightStyle, BorderRightWidth],
            ShorthandId::BorderBottom => &[BorderBottomColor, BorderBottomStyle, BorderBottomWidth],
            ShorthandId::BorderLeft => &[BorderLeftColor, BorderLeftStyle, BorderLeftWidth],
            ShorthandId::BorderColor => &[BorderTopColor, BorderRightColor, BorderBottomColor, BorderLeftColor],
            ShorthandId::BorderStyle => &[BorderTopStyle, BorderRightStyle, BorderBottomStyle, BorderLeftStyle],
            ShorthandId::BorderWidth => &[BorderTopWidth, BorderRightWidth, BorderBottomWidth, BorderLeftWidth],
            ShorthandId::BorderRadius => &[
                BorderTopLeftRadius,
                BorderTopRightRadius,
                BorderBottomLeftRadius,
                BorderBottomRightRadius,
            ],
            ShorthandId::ColumnRule => &[ColumnRuleColor, ColumnRuleStyle, ColumnRuleWidth],
            ShorthandId::Columns => &[ColumnCount, ColumnWidth],
            ShorthandId::Cue => &[CueBefore, CueAfter],
            ShorthandId::Font => &[FontStyle, FontVariant, FontWeight, FontSize, LineHeight, FontFamily],
            ShorthandId::ListStyle => &[ListStyleImage, ListStylePosition, ListStyleType],
            ShorthandId::Margin => &[MarginTop, MarginRight, MarginBottom, MarginLeft],
            ShorthandId::Outline => &[OutlineColor, OutlineStyle, OutlineWidth],
            ShorthandId::Overflow => &[OverflowX, OverflowY],
            ShorthandId::Padding => &[PaddingTop, PaddingRight, PaddingBottom, PaddingLeft],
            ShorthandId::Pause => &[PauseBefore, PauseAfter],
        }
    }
}

/// Parser routing for a recognized property name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Longhand(PropertyId),
    Shorthand(ShorthandId),
}

/// Looks up a lowercase property name. Unknown names fail the declaration,
/// which the caller drops per the usual error recovery.
pub fn dispatch_for(folded_name: &str) -> Option<Dispatch> {
    DISPATCH_INDEX.get(folded_name).copied()
}

// Longhand names in opcode order. `column-rule-width` is interned in its
// canonical hyphenated form.
static LONGHANDS: &[(&str, PropertyId)] = &[
    ("azimuth", PropertyId::Azimuth),
    ("background-attachment", PropertyId::BackgroundAttachment),
    ("background-color", PropertyId::BackgroundColor),
    ("background-image", PropertyId::BackgroundImage),
    ("background-position", PropertyId::BackgroundPosition),
    ("background-repeat", PropertyId::BackgroundRepeat),
    ("background-size", PropertyId::BackgroundSize),
    ("border-collapse", PropertyId::BorderCollapse),
    ("border-spacing", PropertyId::BorderSpacing),
    ("border-top-color", PropertyId::BorderTopColor),
    ("border-right-color", PropertyId::BorderRightColor),
    ("border-bottom-color", PropertyId::BorderBottomColor),
    ("border-left-color", PropertyId::BorderLeftColor),
    ("border-top-style", PropertyId::BorderTopStyle),
    ("border-right-style", PropertyId::BorderRightStyle),
    ("border-bottom-style", PropertyId::BorderBottomStyle),
    ("border-left-style", PropertyId::BorderLeftStyle),
    ("border-top-width", PropertyId::BorderTopWidth),
    ("border-right-width", PropertyId::BorderRightWidth),
    ("border-bottom-width", PropertyId::BorderBottomWidth),
    ("border-left-width", PropertyId::BorderLeftWidth),
    ("border-top-left-radius", PropertyId::BorderTopLeftRadius),
    ("border-top-right-radius", PropertyId::BorderTopRightRadius),
    ("border-bottom-left-radius", PropertyId::BorderBottomLeftRadius),
    ("border-bottom-right-radius", PropertyId::BorderBottomRightRadius),
    ("bottom", PropertyId::Bottom),
    ("break-after", PropertyId::BreakAfter),
    ("break-before", PropertyId::BreakBefore),
    ("break-inside", PropertyId::BreakInside),
    ("caption-side", PropertyId::CaptionSide),
    ("clear", PropertyId::Clear),
    ("clip", PropertyId::Clip),
    ("color", PropertyId::Color),
    ("column-count", PropertyId::ColumnCount),
    ("column-fill", PropertyId::ColumnFill),
    ("column-gap", PropertyId::ColumnGap),
    ("column-rule-color", PropertyId::ColumnRuleColor),
    ("column-rule-style", PropertyId::ColumnRuleStyle),
    ("column-rule-width", PropertyId::ColumnRuleWidth),
    ("column-span", PropertyId::ColumnSpan),
    ("column-width", PropertyId::ColumnWidth),
    ("content", PropertyId::Content),
    ("counter-increment", PropertyId::CounterIncrement),
    ("counter-reset", PropertyId::CounterReset),
    ("cue-after", PropertyId::CueAfter),
    ("cue-before", PropertyId::CueBefore),
    ("cursor", PropertyId::Cursor),
    ("direction", PropertyId::Direction),
    ("display", PropertyId::Display),
    ("elevation", PropertyId::Elevation),
    ("empty-cells", PropertyId::EmptyCells),
    ("float", PropertyId::Float),
    ("font-family", PropertyId::FontFamily),
    ("font-size", PropertyId::FontSize),
    ("font-style", PropertyId::FontStyle),
    ("font-variant", PropertyId::FontVariant),
    ("font-weight", PropertyId::FontWeight),
    ("height", PropertyId::Height),
    ("hyphens", PropertyId::Hyphens),
    ("left", PropertyId::Left),
    ("letter-spacing", PropertyId::LetterSpacing),
    ("line-height", PropertyId::LineHeight),
    ("list-style-image", PropertyId::ListStyleImage),
    ("list-style-position", PropertyId::ListStylePosition),
    ("list-style-type", PropertyId::ListStyleType),
    ("margin-top", PropertyId::MarginTop),
    ("margin-right", PropertyId::MarginRight),
    ("margin-bottom", PropertyId::MarginBottom),
    ("margin-left", PropertyId::MarginLeft),
    ("max-height", PropertyId::MaxHeight),
    ("max-width", PropertyId::MaxWidth),
    ("min-height", PropertyId::MinHeight),
    ("min-width", PropertyId::MinWidth),
    ("opacity", PropertyId::Opacity),
    ("orphans", PropertyId::Orphans),
    ("outline-color", PropertyId::OutlineColor),
    ("outline-style", PropertyId::OutlineStyle),
    ("outline-width", PropertyId::OutlineWidth),
    ("overflow-x", PropertyId::OverflowX),
    ("overflow-y", PropertyId::OverflowY),
    ("padding-top", PropertyId::PaddingTop),
    ("padding-right", PropertyId::PaddingRight),
    ("padding-bottom", PropertyId::PaddingBottom),
    ("padding-left", PropertyId::PaddingLeft),
    ("page-break-after", PropertyId::PageBreakAfter),
    ("page-break-before", PropertyId::PageBreakBefore),
    ("page-break-inside", PropertyId::PageBreakInside),
    ("pause-after", PropertyId::PauseAfter),
    ("pause-before", PropertyId::PauseBefore),
    ("pitch", PropertyId::Pitch),
    ("pitch-range", PropertyId::PitchRange),
    ("play-during", PropertyId::PlayDuring),
    ("position", PropertyId::Position),
    ("quotes", PropertyId::Quotes),
    ("richness", PropertyId::Richness),
    ("right", PropertyId::Right),
    ("speak", PropertyId::Speak),
    ("speak-header", PropertyId::SpeakHeader),
    ("speak-numeral", PropertyId::SpeakNumeral),
    ("speak-punctuation", PropertyId::SpeakPunctuation),
    ("speech-rate", PropertyId::SpeechRate),
    ("stress", PropertyId::Stress),
    ("table-layout", PropertyId::TableLayout),
    ("text-align", PropertyId::TextAlign),
    ("text-decoration", PropertyId::TextDecoration),
    ("text-indent", PropertyId::TextIndent),
    ("text-transform", PropertyId::TextTransform),
    ("top", PropertyId::Top),
    ("unicode-bidi", PropertyId::UnicodeBidi),
    ("vertical-align", PropertyId::VerticalAlign),
    ("visibility", PropertyId::Visibility),
    ("voice-family", PropertyId::VoiceFamily),
    ("volume", PropertyId::Volume),
    ("white-space", PropertyId::WhiteSpace),
    ("widows", PropertyId::Widows),
    ("width", PropertyId::Width),
    ("word-spacing", PropertyId::WordSpacing),
    ("writing-mode", PropertyId::WritingMode),
    ("z-index", PropertyId::ZIndex),
];

static SHORTHANDS: &[(&str, ShorthandId)] = &[
    ("background", ShorthandId::Background),
    ("border", ShorthandId::Border),
    ("border-bottom", ShorthandId::BorderBottom),
    ("border-color", ShorthandId::BorderColor),
    ("border-left", ShorthandId::BorderLeft),
    ("border-radius", ShorthandId::BorderRadius),
    ("border-right", ShorthandId::BorderRight),
    ("border-style", ShorthandId::BorderStyle),
    ("border-top", ShorthandId::BorderTop),
    ("border-width", ShorthandId::BorderWidth),
    ("column-rule", ShorthandId::ColumnRule),
    ("columns", ShorthandId::Columns),
    ("cue", ShorthandId::Cue),
    ("font", ShorthandId::Font),
    ("list-style", ShorthandId::ListStyle),
    ("margin", ShorthandId::Margin),
    ("outline", ShorthandId::Outline),
    ("overflow", ShorthandId::Overflow),
    ("padding", ShorthandId::Padding),
    ("pause", ShorthandId::Pause),
];

lazy_static! {
    static ref DISPATCH_INDEX: HashMap<&'static str, Dispatch> = {
        let mut index = HashMap::new();
        for (name, id) in LONGHANDS {
            index.insert(*name, Dispatch::Longhand(*id));
        }
        for (name, id) in SHORTHANDS {
            index.insert(*name, Dispatch::Shorthand(*id));
        }
        index
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn longhand_table_matches_opcodes() {
        for (index, (name, id)) in LONGHANDS.iter().enumerate() {
            assert_eq!(*id as usize, index, "{name} out of opcode order");
            assert_eq!(id.name(), *name);
        }
    }

    #[test]
    fn opcodes_fit_ten_bits() {
        assert!(LONGHANDS.len() <= 0x400);
    }

    #[test]
    fn lookup_is_folded_name_keyed() {
        assert_eq!(dispatch_for("color"), Some(Dispatch::Longhand(PropertyId::Color)));
        assert_eq!(
            dispatch_for("border-radius"),
            Some(Dispatch::Shorthand(ShorthandId::BorderRadius))
        );
        assert_eq!(
            dispatch_for("column-rule-width"),
            Some(Dispatch::Longhand(PropertyId::ColumnRuleWidth))
        );
        assert_eq!(dispatch_for("column-rule_width"), None);
        assert_eq!(dispatch_for("COLOR"), None);
        assert_eq!(dispatch_for("unknown-prop"), None);
    }
}
