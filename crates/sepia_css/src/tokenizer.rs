use std::cell::Cell;
use std::fmt;

use sepia_shared::byte_stream::Character::Ch;
use sepia_shared::byte_stream::{ByteStream, Character, Location};
use sepia_shared::fixed::Fixed;
use sepia_shared::interner::{Atom, InternContext};

const REPLACEMENT: char = '\u{FFFD}';
const MAX_CODEPOINT: u32 = 0x10FFFF;

#[derive(Debug, PartialEq, Clone)]
pub enum TokenKind {
    /// An `@keyword`; the value does not include the `@` marker.
    AtKeyword(Atom),
    Ident(Atom),
    /// An identifier directly followed by `(`.
    Function(Atom),
    /// An unquoted `url(...)` value, escapes decoded, unresolved.
    Url(Atom),
    /// A `#name` token; the value does not include the `#` marker.
    Hash(Atom),
    /// A quoted string, quotes stripped and escapes decoded.
    QuotedString(Atom),
    Number {
        value: Fixed,
        /// True when the lexeme had neither fraction nor exponent.
        integer: bool,
    },
    Percentage(Fixed),
    Dimension {
        value: Fixed,
        unit: Atom,
        integer: bool,
    },
    /// A `u+XXXX(-YYYY)` range, expanded to inclusive endpoints.
    UnicodeRange(u32, u32),
    /// A run of whitespace, collapsed to a single token.
    Whitespace,
    Delim(char),
    LCurly,
    RCurly,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Cdo,
    Cdc,
    /// Malformed lexeme (unterminated string hitting a newline, bad url,
    /// fixed-point overflow). The parser treats this as an error anchor.
    Invalid,
    Eof,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, location: Location) -> Token {
        Token { kind, location }
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace)
    }

    pub fn is_ident(&self) -> bool {
        matches!(self.kind, TokenKind::Ident(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, TokenKind::QuotedString(_))
    }

    pub fn is_delim(&self, delim: char) -> bool {
        matches!(self.kind, TokenKind::Delim(c) if c == delim)
    }

    /// The identifier payload when this token is an IDENT.
    pub fn ident(&self) -> Option<&Atom> {
        match &self.kind {
            TokenKind::Ident(value) => Some(value),
            _ => None,
        }
    }

    /// True for an IDENT matching the given lowercase keyword, caselessly.
    pub fn is_ident_ci(&self, keyword: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(value) if value.eq_ci_str(keyword))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match &self.kind {
            TokenKind::AtKeyword(val) => format!("@{val}"),
            TokenKind::Hash(val) => format!("#{val}"),
            TokenKind::Ident(val) | TokenKind::Url(val) | TokenKind::QuotedString(val) => val.to_string(),
            TokenKind::Function(val) => format!("{val}("),
            TokenKind::Delim(val) => val.to_string(),
            TokenKind::Number { value, .. } => value.to_string(),
            TokenKind::Percentage(value) => format!("{value}%"),
            TokenKind::Dimension { value, unit, .. } => format!("{value}{unit}"),
            TokenKind::UnicodeRange(start, end) => format!("u+{start:x}-{end:x}"),
            TokenKind::Cdc => "-->".into(),
            TokenKind::Cdo => "<!--".into(),
            TokenKind::Colon => ":".into(),
            TokenKind::Semicolon => ";".into(),
            TokenKind::Comma => ",".into(),
            TokenKind::LBracket => "[".into(),
            TokenKind::RBracket => "]".into(),
            TokenKind::LCurly => "{".into(),
            TokenKind::RCurly => "}".into(),
            TokenKind::LParen => "(".into(),
            TokenKind::RParen => ")".into(),
            TokenKind::Whitespace => " ".into(),
            TokenKind::Invalid => "invalid".into(),
            TokenKind::Eof => "eof".into(),
        };

        write!(f, "{string}")
    }
}

/// Result of one tokenization step. `NeedsData` means the buffered bytes end
/// inside a token and the stream is still open: the read position has been
/// rewound to the token start so the next call resumes byte-exactly once the
/// client appends more input.
#[derive(Debug, PartialEq)]
pub enum Lexed {
    Token(Token),
    NeedsData,
}

/// Streaming CSS tokenizer over the byte source. Owns the stream; the
/// language parser pulls complete tokens one at a time and buffers them into
/// its token vector.
pub struct Tokenizer {
    stream: ByteStream,
    interner: InternContext,
    /// Position of the next character to consume.
    cur_location: Location,
    /// Set when any read or lookahead observed the end of an open buffer;
    /// the token under construction cannot be trusted then.
    hit_empty: Cell<bool>,
}

impl Tokenizer {
    pub fn new(stream: ByteStream, interner: InternContext) -> Self {
        Self {
            stream,
            interner,
            cur_location: Location::start(),
            hit_empty: Cell::new(false),
        }
    }

    pub fn stream_mut(&mut self) -> &mut ByteStream {
        &mut self.stream
    }

    pub fn stream(&self) -> &ByteStream {
        &self.stream
    }

    pub fn interner(&self) -> &InternContext {
        &self.interner
    }

    pub fn current_location(&self) -> Location {
        self.cur_location
    }

    /// Produces the next complete token, or `NeedsData` after rewinding when
    /// the open buffer ends mid-token.
    pub fn next_token(&mut self) -> Lexed {
        let start_pos = self.stream.tell_bytes();
        let start_location = self.cur_location;
        self.hit_empty.set(false);

        let token = self.consume_token();

        if self.hit_empty.get() && !self.stream.closed() {
            self.stream.seek_bytes(start_pos);
            self.cur_location = start_location;
            return Lexed::NeedsData;
        }

        Lexed::Token(token)
    }

    fn consume_token(&mut self) -> Token {
        while self.look_ahead_slice(2) == "/*" {
            self.consume_comment();
        }

        let current = self.current_char();
        let loc = self.location_here();

        match current {
            Character::Surrogate(_) => {
                self.next_char();
                Token::new(TokenKind::Delim(REPLACEMENT), loc)
            }
            Character::StreamEnd | Character::StreamEmpty => Token::new(TokenKind::Eof, loc),
            Ch(c) if c.is_whitespace() => {
                self.consume_whitespace();
                Token::new(TokenKind::Whitespace, loc)
            }
            Ch('"' | '\'') => self.consume_string_token(),
            Ch(c @ '#') => {
                // consume '#'
                self.next_char();

                if self.is_ident_char(self.current_char().into()) || self.is_start_of_escape(0) {
                    let name = self.consume_ident();
                    return Token::new(TokenKind::Hash(self.interner.intern(&name)), loc);
                }

                Token::new(TokenKind::Delim(c), loc)
            }
            Ch('(') => {
                self.next_char();
                Token::new(TokenKind::LParen, loc)
            }
            Ch(')') => {
                self.next_char();
                Token::new(TokenKind::RParen, loc)
            }
            Ch('[') => {
                self.next_char();
                Token::new(TokenKind::LBracket, loc)
            }
            Ch(']') => {
                self.next_char();
                Token::new(TokenKind::RBracket, loc)
            }
            Ch('{') => {
                self.next_char();
                Token::new(TokenKind::LCurly, loc)
            }
            Ch('}') => {
                self.next_char();
                Token::new(TokenKind::RCurly, loc)
            }
            Ch(',') => {
                self.next_char();
                Token::new(TokenKind::Comma, loc)
            }
            Ch(':') => {
                self.next_char();
                Token::new(TokenKind::Colon, loc)
            }
            Ch(';') => {
                self.next_char();
                Token::new(TokenKind::Semicolon, loc)
            }
            Ch(c @ '+') => {
                if self.is_signed_decimal(0) {
                    return self.consume_numeric_token();
                }

                // consume '+'
                self.next_char();
                Token::new(TokenKind::Delim(c), loc)
            }
            Ch('.') => {
                if self.stream.look_ahead(1).is_numeric() {
                    return self.consume_numeric_token();
                }

                // consume '.'
                self.next_char();
                Token::new(TokenKind::Delim('.'), loc)
            }
            Ch(c @ '-') => {
                if self.is_signed_decimal(0) {
                    return self.consume_numeric_token();
                }

                if self.look_ahead_slice(3) == "-->" {
                    self.consume_chars(3);
                    return Token::new(TokenKind::Cdc, loc);
                }

                if self.next_3_start_ident_seq(0) {
                    return self.consume_ident_like_seq();
                }

                // consume '-'
                self.next_char();
                Token::new(TokenKind::Delim(c), loc)
            }
            Ch(c @ '<') => {
                if self.look_ahead_slice(4) == "<!--" {
                    self.consume_chars(4);
                    return Token::new(TokenKind::Cdo, loc);
                }

                // consume '<'
                self.next_char();
                Token::new(TokenKind::Delim(c), loc)
            }
            Ch(c @ '@') => {
                // consume '@'
                self.next_char();

                if self.next_3_start_ident_seq(0) {
                    let keyword = self.consume_ident();
                    return Token::new(TokenKind::AtKeyword(self.interner.intern(&keyword)), loc);
                }

                Token::new(TokenKind::Delim(c), loc)
            }
            Ch(c @ '\\') => {
                if self.is_start_of_escape(0) {
                    return self.consume_ident_like_seq();
                }

                // parse error, consume '\'
                self.next_char();
                Token::new(TokenKind::Delim(c), loc)
            }
            Ch('u' | 'U') if self.starts_unicode_range() => self.consume_unicode_range(),
            Ch(c) if c.is_ascii_digit() => self.consume_numeric_token(),
            Ch(c) if self.is_ident_start(c) => self.consume_ident_like_seq(),
            Ch(c) => {
                self.next_char();
                Token::new(TokenKind::Delim(c), loc)
            }
        }
    }

    fn consume_comment(&mut self) {
        // consume '/*'
        self.consume_chars(2);

        loop {
            if self.look_ahead_slice(2) == "*/" {
                self.consume_chars(2);
                return;
            }
            match self.current_char() {
                Ch(_) | Character::Surrogate(_) => {
                    self.next_char();
                }
                // Unterminated comment at stream end; an open stream sets the
                // needs-data flag instead and the token is re-lexed later.
                Character::StreamEnd | Character::StreamEmpty => return,
            }
        }
    }

    /// Returns a `<number-token>`, `<percentage-token>` or `<dimension-token>`;
    /// fixed-point overflow in the numeric part yields an `Invalid` token.
    fn consume_numeric_token(&mut self) -> Token {
        let loc = self.location_here();

        let (lexeme, integer) = self.consume_number_lexeme();
        let Ok(value) = Fixed::parse(&lexeme) else {
            return Token::new(TokenKind::Invalid, loc);
        };

        if self.next_3_start_ident_seq(0) {
            let unit = self.consume_ident();
            return Token::new(
                TokenKind::Dimension {
                    value,
                    unit: self.interner.intern(&unit),
                    integer,
                },
                loc,
            );
        } else if self.current_char() == Ch('%') {
            // consume '%'
            self.next_char();
            return Token::new(TokenKind::Percentage(value), loc);
        }

        Token::new(TokenKind::Number { value, integer }, loc)
    }

    /// Returns either a `<string-token>` or `Invalid` for an unterminated
    /// string running into a newline.
    fn consume_string_token(&mut self) -> Token {
        let loc = self.location_here();

        // consume string starting: (') or (") ...
        let ending = self.next_char();
        let mut value = String::new();

        loop {
            let current = self.current_char();

            // eof: parse error, return what was gathered
            if current == ending || matches!(current, Character::StreamEnd | Character::StreamEmpty) {
                // consume string ending
                self.next_char();
                return Token::new(TokenKind::QuotedString(self.interner.intern(&value)), loc);
            }

            // newline: parse error, the newline is not consumed
            if current == Ch('\n') {
                return Token::new(TokenKind::Invalid, loc);
            }

            // escaped newline is a line continuation
            if current == Ch('\\') && self.stream.look_ahead(1) == Ch('\n') {
                self.consume_chars(2);
                continue;
            }

            if current == Ch('\\')
                && !matches!(self.stream.look_ahead(1), Ch(c) if c.is_ascii_hexdigit())
                && !matches!(self.stream.look_ahead(1), Character::StreamEnd)
            {
                // consume '\'
                self.next_char();
                // consume the char next to `\`
                value.push(self.next_char().into());
                continue;
            }

            if self.is_start_of_escape(0) {
                value.push(self.consume_escaped_char());
                continue;
            }

            value.push(self.next_char().into());
        }
    }

    fn consume_number_lexeme(&mut self) -> (String, bool) {
        let mut value = String::new();
        let mut integer = true;

        if matches!(self.current_char(), Ch('+' | '-')) {
            value.push(self.next_char().into());
        }

        value.push_str(&self.consume_digits());

        if self.current_char() == Ch('.') && self.stream.look_ahead(1).is_numeric() {
            value.push_str(&self.consume_chars(2));
            value.push_str(&self.consume_digits());
            integer = false;
        }

        let c1 = self.stream.look_ahead(0);
        let c2 = self.stream.look_ahead(1);
        let c3 = self.stream.look_ahead(2);
        if matches!(c1, Ch('e' | 'E'))
            && ((matches!(c2, Ch('-' | '+')) && c3.is_numeric()) || c2.is_numeric())
        {
            value.push(self.next_char().into());
            value.push(self.next_char().into());
            value.push_str(&self.consume_digits());
            integer = false;
        }

        (value, integer)
    }

    /// Returns an `<ident-token>`, `<function-token>`, `<url-token>` or
    /// `Invalid` (bad url).
    fn consume_ident_like_seq(&mut self) -> Token {
        let loc = self.location_here();

        let value = self.consume_ident();

        if value.eq_ignore_ascii_case("url") && self.current_char() == Ch('(') {
            // consume '('
            self.next_char();
            self.consume_whitespace();

            if matches!(self.current_char(), Ch('"' | '\'')) {
                return Token::new(TokenKind::Function(self.interner.intern(&value)), loc);
            }

            return self.consume_url();
        } else if self.current_char() == Ch('(') {
            // consume '('
            self.next_char();
            return Token::new(TokenKind::Function(self.interner.intern(&value)), loc);
        }

        Token::new(TokenKind::Ident(self.interner.intern(&value)), loc)
    }

    /// Returns either a `<url-token>` or `Invalid` (bad url).
    fn consume_url(&mut self) -> Token {
        let mut url = String::new();

        let loc = self.location_here();

        self.consume_whitespace();

        loop {
            let current = self.current_char();

            if current == Ch(')') {
                // consume ')'
                self.next_char();
                break;
            }

            if matches!(current, Character::StreamEnd | Character::StreamEmpty) {
                // parse error, unterminated url at stream end
                break;
            }

            if current.is_whitespace() {
                self.consume_whitespace();
                continue;
            }

            if matches!(current, Ch('"' | '\'' | '(')) || self.is_non_printable_char() {
                // parse error
                self.consume_remnants_of_bad_url();
                return Token::new(TokenKind::Invalid, loc);
            }

            if self.is_start_of_escape(0) {
                url.push(self.consume_escaped_char());
                continue;
            }

            url.push(self.next_char().into());
        }

        Token::new(TokenKind::Url(self.interner.intern(&url)), loc)
    }

    /// Consumes enough input to reach a recovery point where normal
    /// tokenizing can resume.
    fn consume_remnants_of_bad_url(&mut self) {
        loop {
            let current = self.current_char();

            // recovery point
            if current == Ch(')') || matches!(current, Character::StreamEnd | Character::StreamEmpty) {
                if current == Ch(')') {
                    self.next_char();
                }
                break;
            }

            if self.is_start_of_escape(0) {
                self.consume_escaped_char();
                continue;
            }

            self.next_char();
        }
    }

    /// Decodes one `\hhhhhh` escape. NUL, surrogates and out-of-range values
    /// all decode to U+FFFD.
    fn consume_escaped_char(&mut self) -> char {
        // consume '\'
        self.next_char();

        let mut value = String::new();

        while matches!(self.current_char(), Ch(c) if c.is_ascii_hexdigit()) && value.len() <= 5 {
            value.push(self.next_char().into());
        }

        if self.current_char().is_whitespace() {
            self.next_char();
        }

        if value.is_empty() {
            return REPLACEMENT;
        }

        let Ok(as_u32) = u32::from_str_radix(&value, 16) else {
            return REPLACEMENT;
        };

        if as_u32 == 0 || as_u32 > MAX_CODEPOINT {
            return REPLACEMENT;
        }

        char::from_u32(as_u32).unwrap_or(REPLACEMENT)
    }

    /// Consumes an ident sequence. The caller must already have checked that
    /// the stream starts one.
    fn consume_ident(&mut self) -> String {
        let mut value = String::new();

        loop {
            // `-\-` is consumed as `--`
            if self.current_char() == Ch('\\')
                && !matches!(self.stream.look_ahead(1), Ch(c) if c.is_ascii_hexdigit())
                && !matches!(self.stream.look_ahead(1), Character::StreamEnd)
            {
                // consume '\'
                self.next_char();

                // consume the char next to `\`
                value.push(self.next_char().into());
                continue;
            }

            if self.is_start_of_escape(0) {
                value.push(self.consume_escaped_char());
                continue;
            }

            if !self.is_ident_char(self.current_char().into()) {
                break;
            }

            value.push(self.next_char().into());
        }

        value
    }

    fn starts_unicode_range(&self) -> bool {
        self.stream.look_ahead(1) == Ch('+')
            && matches!(self.stream.look_ahead(2), Ch(c) if c.is_ascii_hexdigit() || c == '?')
    }

    /// Consumes `u+hhhh`, `u+hh??` or `u+hhhh-hhhh` into inclusive endpoints.
    fn consume_unicode_range(&mut self) -> Token {
        let loc = self.location_here();

        // consume 'u+'
        self.consume_chars(2);

        let mut digits = String::new();
        while matches!(self.current_char(), Ch(c) if c.is_ascii_hexdigit()) && digits.len() < 6 {
            digits.push(self.next_char().into());
        }

        let mut wildcards = 0usize;
        while self.current_char() == Ch('?') && digits.len() + wildcards < 6 {
            self.next_char();
            wildcards += 1;
        }

        if wildcards > 0 {
            let start = u32::from_str_radix(&format!("{}{}", digits, "0".repeat(wildcards)), 16);
            let end = u32::from_str_radix(&format!("{}{}", digits, "f".repeat(wildcards)), 16);
            return match (start, end) {
                (Ok(start), Ok(end)) => Token::new(TokenKind::UnicodeRange(start, end), loc),
                _ => Token::new(TokenKind::Invalid, loc),
            };
        }

        let Ok(start) = u32::from_str_radix(&digits, 16) else {
            return Token::new(TokenKind::Invalid, loc);
        };

        if self.current_char() == Ch('-')
            && matches!(self.stream.look_ahead(1), Ch(c) if c.is_ascii_hexdigit())
        {
            // consume '-'
            self.next_char();
            let mut end_digits = String::new();
            while matches!(self.current_char(), Ch(c) if c.is_ascii_hexdigit()) && end_digits.len() < 6 {
                end_digits.push(self.next_char().into());
            }
            return match u32::from_str_radix(&end_digits, 16) {
                Ok(end) => Token::new(TokenKind::UnicodeRange(start, end), loc),
                Err(_) => Token::new(TokenKind::Invalid, loc),
            };
        }

        Token::new(TokenKind::UnicodeRange(start, start), loc)
    }

    fn consume_digits(&mut self) -> String {
        let mut value = String::new();

        while matches!(self.current_char(), Ch(c) if c.is_ascii_digit()) {
            value.push(self.next_char().into());
        }

        value
    }

    fn consume_chars(&mut self, mut len: usize) -> String {
        let mut value = String::new();

        while len > 0 {
            value.push(self.next_char().into());
            len -= 1;
        }

        value
    }

    fn consume_whitespace(&mut self) {
        while self.current_char().is_whitespace() {
            self.next_char();
        }
    }

    fn is_ident_start(&self, char: char) -> bool {
        char.is_alphabetic() || !char.is_ascii() || char == '_'
    }

    fn is_ident_char(&self, char: char) -> bool {
        self.is_ident_start(char) || char.is_ascii_digit() || char == '-'
    }

    fn is_non_printable_char(&self) -> bool {
        match self.current_char() {
            Ch(c) => {
                matches!(c, '\u{0000}'..='\u{0008}' | '\u{000B}' | '\u{000E}'..='\u{001F}' | '\u{007F}')
            }
            _ => false,
        }
    }

    fn is_start_of_escape(&self, start: usize) -> bool {
        let current_char = self.look_ahead_flagged(start);
        let next_char = self.look_ahead_flagged(start + 1);

        current_char == Ch('\\') && next_char != Ch('\n')
    }

    /// Whether the next three code points would start an ident sequence.
    fn next_3_start_ident_seq(&self, start: usize) -> bool {
        let first = self.look_ahead_flagged(start);
        let second = self.look_ahead_flagged(start + 1);

        if first == Ch('-') {
            return matches!(second, Ch(c) if self.is_ident_start(c))
                || second == Ch('-')
                || self.is_start_of_escape(start + 1);
        }

        if first == Ch('\\') {
            return self.is_start_of_escape(start);
        }

        matches!(first, Ch(c) if self.is_ident_start(c))
    }

    fn is_signed_decimal(&self, start: usize) -> bool {
        let current = self.look_ahead_flagged(start);
        let next = self.look_ahead_flagged(start + 1);
        let last = self.look_ahead_flagged(start + 2);

        // e.g. +1, -1, +.1, -0.01
        matches!(current, Ch('+' | '-')) && ((next == Ch('.') && last.is_numeric()) || next.is_numeric())
    }

    fn current_char(&self) -> Character {
        self.look_ahead_flagged(0)
    }

    fn look_ahead_flagged(&self, offset: usize) -> Character {
        let c = self.stream.look_ahead(offset);
        if c == Character::StreamEmpty {
            self.hit_empty.set(true);
        }
        c
    }

    fn look_ahead_slice(&self, len: usize) -> String {
        let mut s = String::new();

        for i in 0..len {
            match self.look_ahead_flagged(i) {
                Ch(c) => s.push(c),
                _ => break,
            }
        }

        s
    }

    fn location_here(&self) -> Location {
        Location::new(
            self.cur_location.line,
            self.cur_location.column,
            self.stream.tell_bytes() as u32,
        )
    }

    fn next_char(&mut self) -> Character {
        let c = self.stream.read_and_next();
        match c {
            Ch('\n') => {
                self.cur_location.line += 1;
                self.cur_location.column = 1;
            }
            Ch(_) | Character::Surrogate(_) => {
                self.cur_location.column += 1;
            }
            Character::StreamEmpty => {
                self.hit_empty.set(true);
            }
            Character::StreamEnd => {}
        }
        self.cur_location.offset = self.stream.tell_bytes() as u32;

        c
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sepia_shared::byte_stream::Encoding;

    fn tokenizer_for(data: &str) -> Tokenizer {
        let mut stream = ByteStream::new(Encoding::Utf8, None);
        stream.append(data.as_bytes());
        stream.close();
        Tokenizer::new(stream, InternContext::new())
    }

    fn lex_all(data: &str) -> Vec<TokenKind> {
        let mut tokenizer = tokenizer_for(data);
        let mut kinds = Vec::new();
        loop {
            match tokenizer.next_token() {
                Lexed::Token(t) if t.kind == TokenKind::Eof => break,
                Lexed::Token(t) => kinds.push(t.kind),
                Lexed::NeedsData => panic!("closed stream returned NeedsData"),
            }
        }
        kinds
    }

    fn ident(tokenizer: &Tokenizer, s: &str) -> TokenKind {
        TokenKind::Ident(tokenizer.interner().intern(s))
    }

    #[test]
    fn lex_idents() {
        let cases = vec![
            ("-ident", "-ident"),
            ("_123-ident", "_123-ident"),
            ("_123\\ident", "_123ident"),
        ];

        for (raw, expected) in cases {
            let mut tokenizer = tokenizer_for(raw);
            let Lexed::Token(t) = tokenizer.next_token() else {
                panic!("needs data");
            };
            assert_eq!(t.kind, ident(&tokenizer, expected), "for input {raw}");
        }
    }

    #[test]
    fn lex_numeric_tokens() {
        let cases = vec![
            ("42", TokenKind::Number { value: Fixed::parse("42").unwrap(), integer: true }),
            ("7.8", TokenKind::Number { value: Fixed::parse("7.8").unwrap(), integer: false }),
            ("-56", TokenKind::Number { value: Fixed::parse("-56").unwrap(), integer: true }),
            ("1e+1", TokenKind::Number { value: Fixed::parse("10").unwrap(), integer: false }),
            ("100%", TokenKind::Percentage(Fixed::parse("100").unwrap())),
        ];

        for (raw, expected) in cases {
            let mut tokenizer = tokenizer_for(raw);
            let Lexed::Token(t) = tokenizer.next_token() else {
                panic!("needs data");
            };
            assert_eq!(t.kind, expected, "for input {raw}");
        }
    }

    #[test]
    fn lex_dimensions() {
        let mut tokenizer = tokenizer_for("1.1rem");
        let Lexed::Token(t) = tokenizer.next_token() else {
            panic!("needs data");
        };
        match t.kind {
            TokenKind::Dimension { value, unit, integer } => {
                assert_eq!(value, Fixed::parse("1.1").unwrap());
                assert_eq!(unit.as_str(), "rem");
                assert!(!integer);
            }
            other => panic!("expected dimension, got {other:?}"),
        }

        // whitespace between number and ident breaks the dimension
        let kinds = lex_all("18 px");
        assert_eq!(kinds.len(), 3);
        assert!(matches!(kinds[0], TokenKind::Number { .. }));
        assert_eq!(kinds[1], TokenKind::Whitespace);
        assert!(matches!(&kinds[2], TokenKind::Ident(i) if i.as_str() == "px"));
    }

    #[test]
    fn numeric_overflow_is_invalid() {
        let mut tokenizer = tokenizer_for("99999999999");
        let Lexed::Token(t) = tokenizer.next_token() else {
            panic!("needs data");
        };
        assert_eq!(t.kind, TokenKind::Invalid);
    }

    #[test]
    fn lex_strings() {
        let cases = vec![
            ("\"double quotes\"", Some("double quotes")),
            ("'single quotes'", Some("single quotes")),
            ("\"\"", Some("")),
            ("\"eof", Some("eof")),
            ("\"me \\26  you\"", Some("me & you")),
            // newline inside a string is a parse error
            ("'line\nnewline'", None),
        ];

        for (raw, expected) in cases {
            let mut tokenizer = tokenizer_for(raw);
            let Lexed::Token(t) = tokenizer.next_token() else {
                panic!("needs data");
            };
            match expected {
                Some(s) => {
                    assert!(
                        matches!(&t.kind, TokenKind::QuotedString(v) if v.as_str() == s),
                        "for input {raw:?} got {:?}",
                        t.kind
                    );
                }
                None => assert_eq!(t.kind, TokenKind::Invalid, "for input {raw:?}"),
            }
        }
    }

    #[test]
    fn lex_urls() {
        let cases = vec![
            ("url(https://example.org/)", Some("https://example.org/")),
            ("url(  spaced.example   )", Some("spaced.example")),
            ("url(bad\u{0001}url)", None),
        ];

        for (raw, expected) in cases {
            let mut tokenizer = tokenizer_for(raw);
            let Lexed::Token(t) = tokenizer.next_token() else {
                panic!("needs data");
            };
            match expected {
                Some(s) => assert!(
                    matches!(&t.kind, TokenKind::Url(v) if v.as_str() == s),
                    "for input {raw:?} got {:?}",
                    t.kind
                ),
                None => assert_eq!(t.kind, TokenKind::Invalid, "for input {raw:?}"),
            }
        }
    }

    #[test]
    fn quoted_url_is_a_function() {
        let kinds = lex_all("url( 'x.png' )");
        assert!(matches!(&kinds[0], TokenKind::Function(f) if f.as_str() == "url"));
        assert!(matches!(&kinds[1], TokenKind::QuotedString(s) if s.as_str() == "x.png"));
    }

    #[test]
    fn lex_at_keywords() {
        let kinds = lex_all("@media @-x @0media");
        assert!(matches!(&kinds[0], TokenKind::AtKeyword(k) if k.as_str() == "media"));
        assert_eq!(kinds[1], TokenKind::Whitespace);
        assert!(matches!(&kinds[2], TokenKind::AtKeyword(k) if k.as_str() == "-x"));
        assert_eq!(kinds[3], TokenKind::Whitespace);
        // `@0media` => [@, 0media dimension]
        assert_eq!(kinds[4], TokenKind::Delim('@'));
        assert!(matches!(&kinds[5], TokenKind::Dimension { unit, .. } if unit.as_str() == "media"));
    }

    #[test]
    fn lex_cdo_cdc() {
        let kinds = lex_all("<!-- --> {}");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Cdo,
                TokenKind::Whitespace,
                TokenKind::Cdc,
                TokenKind::Whitespace,
                TokenKind::LCurly,
                TokenKind::RCurly,
            ]
        );
    }

    #[test]
    fn lex_unicode_ranges() {
        let cases = vec![
            ("u+26", (0x26, 0x26)),
            ("U+0-7F", (0, 0x7f)),
            ("u+0025-00FF", (0x25, 0xff)),
            ("u+4??", (0x400, 0x4ff)),
        ];

        for (raw, (start, end)) in cases {
            let mut tokenizer = tokenizer_for(raw);
            let Lexed::Token(t) = tokenizer.next_token() else {
                panic!("needs data");
            };
            assert_eq!(t.kind, TokenKind::UnicodeRange(start, end), "for input {raw}");
        }

        // 'u' not followed by '+hex' stays an ident
        let kinds = lex_all("underline");
        assert!(matches!(&kinds[0], TokenKind::Ident(i) if i.as_str() == "underline"));
    }

    #[test]
    fn lex_ruleset_stream() {
        let kinds = lex_all("#header .nav { font-size: 1.1rem; }");
        assert!(matches!(&kinds[0], TokenKind::Hash(h) if h.as_str() == "header"));
        assert_eq!(kinds[1], TokenKind::Whitespace);
        assert_eq!(kinds[2], TokenKind::Delim('.'));
        assert!(matches!(&kinds[3], TokenKind::Ident(i) if i.as_str() == "nav"));
        assert_eq!(kinds[5], TokenKind::LCurly);
        assert!(matches!(&kinds[7], TokenKind::Ident(i) if i.as_str() == "font-size"));
        assert_eq!(kinds[8], TokenKind::Colon);
        assert!(matches!(&kinds[10], TokenKind::Dimension { unit, .. } if unit.as_str() == "rem"));
        assert_eq!(kinds[11], TokenKind::Semicolon);
    }

    #[test]
    fn comments_are_skipped() {
        let kinds = lex_all("/* note */a/* mid */b");
        assert!(matches!(&kinds[0], TokenKind::Ident(i) if i.as_str() == "a"));
        assert!(matches!(&kinds[1], TokenKind::Ident(i) if i.as_str() == "b"));
    }

    #[test]
    fn open_stream_suspends_mid_token() {
        let mut stream = ByteStream::new(Encoding::Utf8, None);
        stream.append(b"colo");
        let mut tokenizer = Tokenizer::new(stream, InternContext::new());

        // The ident may continue in the next chunk.
        assert_eq!(tokenizer.next_token(), Lexed::NeedsData);

        tokenizer.stream_mut().append(b"r:");
        tokenizer.stream_mut().close();

        let Lexed::Token(t) = tokenizer.next_token() else {
            panic!("needs data after close");
        };
        assert!(matches!(&t.kind, TokenKind::Ident(i) if i.as_str() == "color"));
        let Lexed::Token(t) = tokenizer.next_token() else {
            panic!("needs data after close");
        };
        assert_eq!(t.kind, TokenKind::Colon);
    }

    #[test]
    fn open_stream_suspends_mid_comment() {
        let mut stream = ByteStream::new(Encoding::Utf8, None);
        stream.append(b"/* split ");
        let mut tokenizer = Tokenizer::new(stream, InternContext::new());

        assert_eq!(tokenizer.next_token(), Lexed::NeedsData);

        tokenizer.stream_mut().append(b"comment */x");
        tokenizer.stream_mut().close();

        let Lexed::Token(t) = tokenizer.next_token() else {
            panic!("needs data after close");
        };
        assert!(matches!(&t.kind, TokenKind::Ident(i) if i.as_str() == "x"));
    }

    #[test]
    fn needs_data_resumes_byte_exactly() {
        let input = "h1 { color: red; }";

        for split in 1..input.len() {
            let mut stream = ByteStream::new(Encoding::Utf8, None);
            stream.append(input[..split].as_bytes());
            let mut tokenizer = Tokenizer::new(stream, InternContext::new());

            let mut kinds = Vec::new();
            loop {
                match tokenizer.next_token() {
                    Lexed::Token(t) if t.kind == TokenKind::Eof => break,
                    Lexed::Token(t) => kinds.push(t.kind),
                    Lexed::NeedsData => {
                        if !tokenizer.stream().closed() {
                            tokenizer.stream_mut().append(input[split..].as_bytes());
                            tokenizer.stream_mut().close();
                        }
                    }
                }
            }

            // Atoms from different contexts never compare handle-equal, so
            // compare the debug rendering instead.
            let chunked: Vec<String> = kinds.iter().map(|k| format!("{k:?}")).collect();
            let whole: Vec<String> = lex_all(input).iter().map(|k| format!("{k:?}")).collect();
            assert_eq!(chunked, whole, "split at byte {split}");
        }
    }
}
