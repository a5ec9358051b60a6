use core::fmt::Debug;
use std::collections::HashMap;
use std::fmt::Display;

use sepia_shared::byte_stream::{ByteStream, Encoding, Location};
use sepia_shared::errors::{CssError, CssResult};
use sepia_shared::fixed::Fixed;
use sepia_shared::interner::{Atom, InternContext};

use crate::bytecode::{StyleBuffer, Unit};
use crate::parser::Language;
use crate::selector::Selector;
use crate::tokenizer::Tokenizer;

/// Origin of a stylesheet, in cascade order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    UserAgent,
    User,
    Author,
}

/// Grammar strictness the sheet was created with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Css1,
    Css2,
    Css21,
    Css3,
}

/// Severity of a parse log entry.
#[derive(Debug, PartialEq)]
pub enum Severity {
    /// The construct was dropped entirely.
    Error,
    /// The construct was recovered or partially kept.
    Warning,
    Info,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Info => write!(f, "Info"),
        }
    }
}

/// One recovered-from problem found while parsing. Malformed CSS never
/// aborts a parse; it lands here instead.
#[derive(PartialEq)]
pub struct CssLog {
    pub severity: Severity,
    pub message: String,
    pub location: Location,
}

impl CssLog {
    pub fn error(message: &str, location: Location) -> Self {
        Self {
            severity: Severity::Error,
            message: message.to_string(),
            location,
        }
    }

    pub fn warn(message: &str, location: Location) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.to_string(),
            location,
        }
    }
}

impl Display for CssLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] ({}:{}): {}",
            self.severity, self.location.line, self.location.column, self.message
        )
    }
}

impl Debug for CssLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

/// Media types from CSS 2.1 plus `all`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaType {
    Aural,
    Braille,
    Embossed,
    Handheld,
    Print,
    Projection,
    Screen,
    Speech,
    Tty,
    Tv,
    All,
}

/// Media feature names. This table is deliberately separate from the
/// property table: `color` means different things in the two contexts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaFeature {
    AspectRatio,
    Color,
    ColorIndex,
    DeviceAspectRatio,
    DeviceHeight,
    DeviceWidth,
    Grid,
    Height,
    Monochrome,
    Orientation,
    OverflowBlock,
    OverflowInline,
    Resolution,
    Scan,
    UpdateFrequency,
    Width,
}

/// Range prefix on a media feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaRange {
    Exact,
    Min,
    Max,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MediaValue {
    Dimension(Fixed, Unit),
    Number(Fixed),
    Integer(i32),
    Ratio(i32, i32),
    /// Keyword-valued features: `orientation: landscape`, `scan:
    /// progressive`, `overflow-block: paged`/`optional-paged`/`scroll`,
    /// `overflow-inline: scroll`, `update-frequency: slow`/`fast` and the
    /// like. Stored as the interned keyword; evaluation happens downstream.
    Ident(Atom),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MediaCondition {
    pub range: MediaRange,
    pub feature: MediaFeature,
    pub value: Option<MediaValue>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaQualifier {
    Only,
    Not,
}

/// One parsed media query. Evaluation against a device is a downstream
/// concern; the core only compiles the query.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MediaQuery {
    pub qualifier: Option<MediaQualifier>,
    pub media_type: Option<MediaType>,
    pub conditions: Vec<MediaCondition>,
    /// Set when the query named an unknown type or feature and can never
    /// match ("not all").
    pub never: bool,
}

pub type MediaQueryList = Vec<MediaQuery>;

/// Page pseudo-selector of an `@page` rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PagePseudo {
    First,
    Left,
    Right,
}

/// `src` entry of an `@font-face` rule.
#[derive(Clone, Debug, PartialEq)]
pub enum FontFaceLocation {
    Url(Atom),
    Local(Atom),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FontFaceSrc {
    pub location: FontFaceLocation,
    /// `format(...)` hint, when present.
    pub format: Option<Atom>,
}

/// Descriptors gathered from an `@font-face` block. Storage only; font
/// selection happens elsewhere.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FontFaceRule {
    pub family: Option<Atom>,
    pub srcs: Vec<FontFaceSrc>,
    /// Keyword index into the font-style table, when declared.
    pub style: Option<u16>,
    /// Keyword index into the font-weight table, when declared.
    pub weight: Option<u16>,
    pub unicode_ranges: Vec<(u32, u32)>,
}

/// A selector group plus its compiled declaration bytecode.
#[derive(Debug, PartialEq)]
pub struct Ruleset {
    pub selectors: Vec<Selector>,
    pub style: StyleBuffer,
}

#[derive(Debug, PartialEq)]
pub struct MediaRule {
    pub queries: MediaQueryList,
    pub rules: Vec<Rule>,
}

#[derive(Debug, PartialEq)]
pub struct ImportRule {
    /// Absolute URL after running the client's resolve callback.
    pub url: Atom,
    pub queries: MediaQueryList,
}

#[derive(Debug, PartialEq)]
pub struct PageRule {
    pub pseudo: Option<PagePseudo>,
    pub style: StyleBuffer,
}

#[derive(Debug, PartialEq)]
pub enum RuleKind {
    Ruleset(Ruleset),
    Media(MediaRule),
    Import(ImportRule),
    FontFace(FontFaceRule),
    Page(PageRule),
    Charset { encoding: Atom },
    Namespace { prefix: Option<Atom>, uri: Atom },
}

/// A rule in source order. Iterating [`Stylesheet::rules`] yields rules in
/// the order they appeared in the byte stream.
#[derive(Debug, PartialEq)]
pub struct Rule {
    pub kind: RuleKind,
    pub source_index: u32,
}

/// Deduplicated table of interned strings referenced by bytecode payload
/// words. A payload word holds an index into this table; the table holds
/// only handles of the sheet's interning context.
#[derive(Default)]
pub struct StringTable {
    atoms: Vec<Atom>,
    index: HashMap<Atom, u32>,
}

impl StringTable {
    pub fn add(&mut self, atom: Atom) -> u32 {
        if let Some(existing) = self.index.get(&atom) {
            return *existing;
        }
        let idx = self.atoms.len() as u32;
        self.atoms.push(atom.clone());
        self.index.insert(atom, idx);
        idx
    }

    pub fn get(&self, index: u32) -> Option<&Atom> {
        self.atoms.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    fn byte_size(&self) -> usize {
        self.atoms.iter().map(|a| a.len() + std::mem::size_of::<Atom>()).sum()
    }
}

/// `@namespace` mappings in effect for the sheet.
#[derive(Default)]
pub struct NamespaceMap {
    pub default_ns: Option<Atom>,
    prefixes: Vec<(Atom, Atom)>,
}

impl NamespaceMap {
    pub fn set_default(&mut self, uri: Atom) {
        self.default_ns = Some(uri);
    }

    pub fn insert(&mut self, prefix: Atom, uri: Atom) {
        if let Some(slot) = self.prefixes.iter_mut().find(|(p, _)| *p == prefix) {
            slot.1 = uri;
        } else {
            self.prefixes.push((prefix, uri));
        }
    }

    /// Resolves a prefix; prefixes compare case-sensitively.
    pub fn resolve(&self, prefix: &Atom) -> Option<&Atom> {
        self.prefixes.iter().find(|(p, _)| p == prefix).map(|(_, uri)| uri)
    }
}

pub type ResolveFn = Box<dyn Fn(&str, &str) -> CssResult<String>>;
pub type ImportFn = Box<dyn Fn(&str, &MediaQueryList) -> CssResult<()>>;
pub type ColorFn = Box<dyn Fn(&str) -> CssResult<u32>>;
pub type FontFn = Box<dyn Fn(&str) -> CssResult<SystemFont>>;

/// A system font resolved by the client's `font` callback, expanded by the
/// `font` shorthand when a system keyword is used.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemFont {
    pub family: String,
    pub size: Fixed,
    pub size_unit: Unit,
    pub italic: bool,
    pub bold: bool,
}

/// Capability record of client callbacks. `resolve` is mandatory because
/// relative URLs in the sheet must become absolute at compile time; the
/// rest are optional.
pub struct ClientHandlers {
    pub resolve: ResolveFn,
    pub import: Option<ImportFn>,
    pub color: Option<ColorFn>,
    pub font: Option<FontFn>,
}

impl ClientHandlers {
    pub fn new(resolve: ResolveFn) -> ClientHandlers {
        ClientHandlers {
            resolve,
            import: None,
            color: None,
            font: None,
        }
    }
}

/// Creation parameters for a stylesheet.
pub struct StylesheetParams {
    pub level: Level,
    /// Declared encoding of the incoming bytes. Never sniffed.
    pub charset: String,
    pub url: String,
    pub title: String,
    pub origin: Origin,
    /// Relaxes unit requirements and tolerates misplaced `@import`.
    pub allow_quirks: bool,
    /// When set, the input is a bare declaration list without selectors.
    pub inline_style: bool,
    pub handlers: ClientHandlers,
    /// Interning context to share; a private one is created when absent.
    pub intern: Option<InternContext>,
}

impl StylesheetParams {
    pub fn new(resolve: ResolveFn) -> StylesheetParams {
        StylesheetParams {
            level: Level::Css21,
            charset: "UTF-8".to_string(),
            url: String::new(),
            title: String::new(),
            origin: Origin::Author,
            allow_quirks: false,
            inline_style: false,
            handlers: ClientHandlers::new(resolve),
            intern: None,
        }
    }
}

/// Result of an `append_data` call that did not fail. `NeedsData` is flow,
/// not an error: the sheet is waiting for more input or for `data_done`.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub enum Status {
    Ok,
    NeedsData,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SheetState {
    Created,
    Receiving,
    Done,
    Error,
}

/// Everything the parser writes into as it recognizes statements. Split
/// from [`Stylesheet`] so the language parser can borrow it mutably while
/// owning its own tokenizer state.
pub struct SheetData {
    pub origin: Origin,
    pub level: Level,
    pub url: String,
    pub title: String,
    pub allow_quirks: bool,
    pub quirks_used: bool,
    pub inline_style: bool,
    pub rules: Vec<Rule>,
    pub namespaces: NamespaceMap,
    pub strings: StringTable,
    pub parse_log: Vec<CssLog>,
    pub handlers: ClientHandlers,
    pub interner: InternContext,
    next_rule_index: u32,
}

impl SheetData {
    /// Claims the next source-order index. Nested rules (inside `@media`)
    /// draw from the same sequence so document order is total.
    pub fn alloc_index(&mut self) -> u32 {
        let index = self.next_rule_index;
        self.next_rule_index += 1;
        index
    }

    /// Appends a completed top-level rule, preserving source order.
    pub fn push_rule(&mut self, kind: RuleKind) {
        let source_index = self.alloc_index();
        self.rules.push(Rule { kind, source_index });
    }

    /// Appends a rule whose index was claimed earlier.
    pub fn push_prepared(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn log(&mut self, entry: CssLog) {
        log::warn!("{entry}");
        self.parse_log.push(entry);
    }
}

/// A CSS stylesheet being compiled to bytecode. Drive it with
/// [`Stylesheet::append_data`] and [`Stylesheet::data_done`]; afterwards the
/// rules enumerate in source order and every style buffer is self-describing
/// under the opcode table. Dropping the sheet releases every interned handle
/// and style buffer it owns, from any state.
pub struct Stylesheet {
    data: SheetData,
    language: Language,
    state: SheetState,
}

impl Stylesheet {
    /// Creates an empty stylesheet from the given parameters.
    pub fn new(params: StylesheetParams) -> CssResult<Stylesheet> {
        let Some(encoding) = Encoding::from_label(&params.charset) else {
            return Err(CssError::BadParm);
        };

        let interner = params.intern.unwrap_or_default();
        let stream = ByteStream::new(encoding, None);
        let tokenizer = Tokenizer::new(stream, interner.clone());

        Ok(Stylesheet {
            data: SheetData {
                origin: params.origin,
                level: params.level,
                url: params.url,
                title: params.title,
                allow_quirks: params.allow_quirks,
                quirks_used: false,
                inline_style: params.inline_style,
                rules: Vec::new(),
                namespaces: NamespaceMap::default(),
                strings: StringTable::default(),
                parse_log: Vec::new(),
                handlers: params.handlers,
                interner,
                next_rule_index: 0,
            },
            language: Language::new(tokenizer, params.inline_style),
            state: SheetState::Created,
        })
    }

    /// Feeds a chunk of source bytes. Returns `NeedsData` while the sheet is
    /// waiting for the rest of the input, which is the common case until
    /// `data_done` is called.
    pub fn append_data(&mut self, data: &[u8]) -> CssResult<Status> {
        match self.state {
            SheetState::Created => self.state = SheetState::Receiving,
            SheetState::Receiving => {}
            SheetState::Done | SheetState::Error => return Err(CssError::BadParm),
        }

        self.language.tokenizer_mut().stream_mut().append(data);

        match self.language.pump(&mut self.data) {
            Ok(()) => Ok(Status::NeedsData),
            Err(e) => {
                self.state = SheetState::Error;
                Err(e)
            }
        }
    }

    /// Marks end-of-input, drains residual bytes and closes the sheet.
    pub fn data_done(&mut self) -> CssResult<()> {
        match self.state {
            SheetState::Created | SheetState::Receiving => {}
            SheetState::Done | SheetState::Error => return Err(CssError::BadParm),
        }

        self.language.tokenizer_mut().stream_mut().close();

        match self.language.pump(&mut self.data) {
            Ok(()) => {
                self.state = SheetState::Done;
                Ok(())
            }
            Err(e) => {
                self.state = SheetState::Error;
                Err(e)
            }
        }
    }

    /// Approximate memory footprint in bytes: compiled bytecode, interned
    /// strings and buffered input.
    pub fn size(&self) -> usize {
        let mut total = std::mem::size_of::<Stylesheet>();
        total += self.data.strings.byte_size();
        total += self.language.tokenizer().stream().len();
        total += rules_byte_size(&self.data.rules);
        total
    }

    pub fn rules(&self) -> &[Rule] {
        &self.data.rules
    }

    pub fn rule_count(&self) -> usize {
        self.data.rules.len()
    }

    pub fn origin(&self) -> Origin {
        self.data.origin
    }

    pub fn level(&self) -> Level {
        self.data.level
    }

    pub fn url(&self) -> &str {
        &self.data.url
    }

    pub fn title(&self) -> &str {
        &self.data.title
    }

    /// True when a quirk was actually exercised during the parse.
    pub fn quirks_used(&self) -> bool {
        self.data.quirks_used
    }

    pub fn parse_log(&self) -> &[CssLog] {
        &self.data.parse_log
    }

    pub fn strings(&self) -> &StringTable {
        &self.data.strings
    }

    /// The interning context every handle in this sheet belongs to.
    pub fn interner(&self) -> &InternContext {
        &self.data.interner
    }

    pub fn namespaces(&self) -> &NamespaceMap {
        &self.data.namespaces
    }
}

fn rules_byte_size(rules: &[Rule]) -> usize {
    let mut total = 0;
    for rule in rules {
        total += std::mem::size_of::<Rule>();
        match &rule.kind {
            RuleKind::Ruleset(r) => total += r.style.byte_size(),
            RuleKind::Page(r) => total += r.style.byte_size(),
            RuleKind::Media(r) => total += rules_byte_size(&r.rules),
            _ => {}
        }
    }
    total
}

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> StylesheetParams {
        StylesheetParams::new(Box::new(|_base, rel| Ok(rel.to_string())))
    }

    #[test]
    fn unknown_charset_is_a_bad_parameter() {
        let mut p = params();
        p.charset = "KOI8-R".to_string();
        assert!(matches!(Stylesheet::new(p), Err(CssError::BadParm)));
    }

    #[test]
    fn append_after_done_is_a_bad_parameter() {
        let mut sheet = Stylesheet::new(params()).unwrap();
        let _ = sheet.append_data(b"h1{}").unwrap();
        sheet.data_done().unwrap();
        assert_eq!(sheet.append_data(b"p{}"), Err(CssError::BadParm));
        assert_eq!(sheet.data_done(), Err(CssError::BadParm));
    }

    #[test]
    fn size_grows_with_data() {
        let mut sheet = Stylesheet::new(params()).unwrap();
        let empty = sheet.size();
        let _ = sheet.append_data(b"h1 { color: red; }").unwrap();
        sheet.data_done().unwrap();
        assert!(sheet.size() > empty);
    }

    #[test]
    fn string_table_deduplicates() {
        let ctx = InternContext::new();
        let mut table = StringTable::default();
        let a = table.add(ctx.intern("x.png"));
        let b = table.add(ctx.intern("x.png"));
        let c = table.add(ctx.intern("y.png"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.len(), 2);
    }
}
