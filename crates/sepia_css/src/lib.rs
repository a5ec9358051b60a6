//! Streaming CSS parser and bytecode compiler.
//!
//! A [`stylesheet::Stylesheet`] consumes chunks of CSS source bytes,
//! tokenizes and parses them, and compiles every declaration into a compact
//! position-independent bytecode form (one OPV header word plus payload per
//! declaration) ready for a downstream selection and cascade engine.
//! Feeding is push-style: `append_data` returns a needs-data status until
//! `data_done` closes the input.

use sepia_shared::errors::CssResult;

pub mod bytecode;
pub mod colors;
pub mod parser;
pub mod properties;
pub mod selector;
pub mod stylesheet;
pub mod token_vector;
pub mod tokenizer;

pub use stylesheet::{Status, Stylesheet, StylesheetParams};

/// Compiles a complete source string in one call. Mostly useful for tests
/// and tools; streaming clients drive [`Stylesheet`] directly.
pub fn parse_str(data: &str, params: StylesheetParams) -> CssResult<Stylesheet> {
    let mut sheet = Stylesheet::new(params)?;
    let _ = sheet.append_data(data.as_bytes())?;
    sheet.data_done()?;
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_logger::SimpleLogger;

    #[test]
    fn parse_a_small_sheet() {
        // logger init may race with other tests; ignore the error
        let _ = SimpleLogger::new().init();

        let params = StylesheetParams::new(Box::new(|_base, rel| Ok(rel.to_string())));
        let sheet = parse_str("h1 { color: red; }", params).unwrap();
        assert_eq!(sheet.rule_count(), 1);
    }
}
