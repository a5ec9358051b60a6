//! Top-level statement pump: collects the tokens of one statement (rule or
//! at-rule) into the token vector, then dispatches it. Collection suspends
//! cleanly on needs-data; the partially filled vector and depth counters
//! survive until the next `append_data`.

use sepia_shared::errors::CssResult;

use crate::bytecode::StyleBuffer;
use crate::parser::{at_rule, declaration, rule, DocState, Language};
use crate::stylesheet::{RuleKind, Ruleset, SheetData};
use crate::tokenizer::{Lexed, TokenKind};

/// Outcome of one collection attempt.
enum Collect {
    /// A complete statement sits in the vector.
    Complete,
    /// The buffered bytes ran out mid-statement.
    NeedsData,
    /// Stream exhausted and closed with nothing buffered.
    Eof,
}

impl Language {
    /// Consumes as many complete statements as the buffered input holds.
    /// Returns after the stream runs dry (needs-data) or hits its closed
    /// end; fatal errors (allocation, failing client callbacks) propagate.
    pub fn pump(&mut self, data: &mut SheetData) -> CssResult<()> {
        loop {
            match self.collect_statement() {
                Collect::NeedsData => return Ok(()),
                Collect::Eof => {
                    if self.inline_style && !self.inline_done {
                        self.finish_inline(data)?;
                    }
                    return Ok(());
                }
                Collect::Complete => {
                    if self.inline_style {
                        // an inline declaration list is one statement ending
                        // only at end-of-input
                        return self.finish_inline(data);
                    }
                    let result = self.parse_statement(data);
                    self.vector.reset();
                    result?;
                }
            }
        }
    }

    // Fills the vector with one statement's tokens. A statement ends with a
    // `;` outside any nesting or with the `}` closing a top-level block.
    fn collect_statement(&mut self) -> Collect {
        loop {
            match self.tokenizer.next_token() {
                Lexed::NeedsData => return Collect::NeedsData,
                Lexed::Token(token) => {
                    if token.kind == TokenKind::Eof {
                        return if self.vector.is_empty() {
                            Collect::Eof
                        } else {
                            Collect::Complete
                        };
                    }

                    // trivia between statements is not buffered, but it does
                    // spoil the @charset position
                    if self.vector.is_empty()
                        && !self.inline_style
                        && matches!(token.kind, TokenKind::Whitespace | TokenKind::Cdo | TokenKind::Cdc)
                    {
                        self.at_sheet_start = false;
                        continue;
                    }

                    if self.vector.is_empty() {
                        self.statement_at_start = self.at_sheet_start;
                    }
                    self.at_sheet_start = false;

                    match token.kind {
                        TokenKind::LCurly => {
                            self.curly += 1;
                            self.vector.push(token);
                        }
                        TokenKind::RCurly => {
                            if self.curly == 0 {
                                // stray close brace terminates whatever was
                                // being collected
                                if self.vector.is_empty() {
                                    continue;
                                }
                                return Collect::Complete;
                            }
                            self.curly -= 1;
                            self.vector.push(token);
                            if self.curly == 0 && self.round == 0 && self.square == 0 && !self.inline_style {
                                return Collect::Complete;
                            }
                        }
                        TokenKind::LParen | TokenKind::Function(_) => {
                            self.round += 1;
                            self.vector.push(token);
                        }
                        TokenKind::RParen => {
                            self.round = self.round.saturating_sub(1);
                            self.vector.push(token);
                        }
                        TokenKind::LBracket => {
                            self.square += 1;
                            self.vector.push(token);
                        }
                        TokenKind::RBracket => {
                            self.square = self.square.saturating_sub(1);
                            self.vector.push(token);
                        }
                        TokenKind::Semicolon => {
                            self.vector.push(token);
                            if self.curly == 0 && self.round == 0 && self.square == 0 && !self.inline_style {
                                return Collect::Complete;
                            }
                        }
                        _ => self.vector.push(token),
                    }
                }
            }
        }
    }

    // Dispatches the statement sitting in the vector.
    fn parse_statement(&mut self, data: &mut SheetData) -> CssResult<()> {
        self.vector.seek(0);

        let Some(first) = self.vector.peek_non_ws() else {
            return Ok(());
        };

        if let TokenKind::AtKeyword(name) = first.kind.clone() {
            return at_rule::parse_at_rule(
                &mut self.vector,
                data,
                &name,
                self.statement_at_start,
                &mut self.doc_state,
            );
        }

        if let Some(ruleset) = rule::parse_ruleset(&mut self.vector, data)? {
            data.push_rule(RuleKind::Ruleset(ruleset));
            self.doc_state = DocState::Body;
        }
        Ok(())
    }

    // Compiles the buffered inline declaration list into a single rule
    // without selectors.
    fn finish_inline(&mut self, data: &mut SheetData) -> CssResult<()> {
        self.vector.seek(0);

        let mut style = StyleBuffer::new();
        declaration::parse_declaration_block(&mut self.vector, data, &mut style)?;
        style.finalize();

        data.push_rule(RuleKind::Ruleset(Ruleset {
            selectors: Vec::new(),
            style,
        }));

        self.vector.reset();
        self.inline_done = true;
        Ok(())
    }
}
