use crate::token_vector::TokenVector;
use crate::tokenizer::Tokenizer;

mod anplusb;
mod at_rule;
mod declaration;
mod media;
mod rule;
mod selector;
mod stylesheet;

/// Position in the top-level grammar, which fixes where `@charset`,
/// `@import` and `@namespace` may still appear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DocState {
    /// Nothing but trivia seen yet; `@charset` is still possible.
    Start,
    /// Imports (and more imports) are allowed.
    Imports,
    /// Namespaces seen; imports are no longer allowed.
    Namespaces,
    /// A body rule was seen; only body rules from here on.
    Body,
}

/// The language-level parser: pulls tokens from the tokenizer, buffers one
/// statement at a time into the token vector and dispatches it. All state
/// needed to resume after a needs-data suspension lives here.
pub struct Language {
    tokenizer: Tokenizer,
    vector: TokenVector,
    doc_state: DocState,
    inline_style: bool,
    /// True until the first token of the sheet is consumed; `@charset` is
    /// only recognized while this holds.
    at_sheet_start: bool,
    /// Whether the statement currently in the vector started at the very
    /// beginning of the sheet.
    statement_at_start: bool,
    /// Brace/paren/bracket depth of the statement being collected.
    curly: usize,
    round: usize,
    square: usize,
    /// Set once the inline declaration list has been compiled.
    inline_done: bool,
}

impl Language {
    pub fn new(tokenizer: Tokenizer, inline_style: bool) -> Language {
        Language {
            tokenizer,
            vector: TokenVector::new(),
            doc_state: DocState::Start,
            inline_style,
            at_sheet_start: true,
            statement_at_start: false,
            curly: 0,
            round: 0,
            square: 0,
            inline_done: false,
        }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn tokenizer_mut(&mut self) -> &mut Tokenizer {
        &mut self.tokenizer
    }
}
