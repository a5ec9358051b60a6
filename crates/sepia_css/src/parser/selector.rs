//! Selector compiler: turns the token run before a `{` into compiled
//! selectors grouped by combinator, with specificity computed on the way
//! out. Any error here invalidates the whole rule, per CSS error recovery.

use sepia_shared::interner::Atom;

use crate::selector::{AttrOp, Combinator, CompoundSelector, PseudoArg, QName, Selector, SimpleSelector};
use crate::stylesheet::SheetData;
use crate::parser::anplusb;
use crate::token_vector::TokenVector;
use crate::tokenizer::TokenKind;

const PSEUDO_CLASSES: &[&str] = &[
    "active", "checked", "disabled", "empty", "enabled", "first", "first-child", "first-of-type",
    "focus", "hover", "last-child", "last-of-type", "link", "only-child", "only-of-type", "root",
    "target", "visited",
];

// CSS2.1 pseudo-elements are also valid with single-colon syntax.
const PSEUDO_ELEMENTS: &[&str] = &["after", "before", "first-letter", "first-line"];

const FUNCTIONAL_NTH: &[&str] = &["nth-child", "nth-last-child", "nth-of-type", "nth-last-of-type"];

/// Parses a comma separated selector group, stopping before the `{`.
pub(in crate::parser) fn parse_selector_list(vector: &mut TokenVector, data: &SheetData) -> Option<Vec<Selector>> {
    log::trace!("parse_selector_list");

    let mut selectors = Vec::new();

    loop {
        selectors.push(parse_selector(vector, data)?);

        vector.skip_whitespace();
        match vector.peek() {
            Some(token) if token.kind == TokenKind::Comma => {
                vector.next();
            }
            Some(token) if token.kind == TokenKind::LCurly => break,
            None => break,
            _ => return None,
        }
    }

    Some(selectors)
}

fn parse_selector(vector: &mut TokenVector, data: &SheetData) -> Option<Selector> {
    let mut compounds = Vec::new();
    let mut combinator = Combinator::None;

    loop {
        vector.skip_whitespace();
        let simples = parse_compound(vector, data)?;
        compounds.push(CompoundSelector { combinator, simples });

        let mut saw_space = false;
        while matches!(vector.peek(), Some(t) if t.is_whitespace()) {
            vector.next();
            saw_space = true;
        }

        let Some(next) = vector.peek() else { break };
        match next.kind {
            TokenKind::Comma | TokenKind::LCurly => break,
            TokenKind::Delim('>') => {
                vector.next();
                combinator = Combinator::Child;
            }
            TokenKind::Delim('+') => {
                vector.next();
                combinator = Combinator::NextSibling;
            }
            TokenKind::Delim('~') => {
                vector.next();
                combinator = Combinator::SubsequentSibling;
            }
            _ if saw_space => combinator = Combinator::Descendant,
            _ => return None,
        }
    }

    Some(Selector::new(compounds))
}

// One compound: optional type/universal selector followed by specifics.
fn parse_compound(vector: &mut TokenVector, data: &SheetData) -> Option<Vec<SimpleSelector>> {
    let mut simples = Vec::new();

    match vector.peek().map(|t| t.kind.clone()) {
        Some(TokenKind::Ident(_) | TokenKind::Delim('*') | TokenKind::Delim('|')) => {
            simples.push(parse_type_or_universal(vector, data)?);
        }
        _ => {}
    }

    loop {
        let Some(token) = vector.peek() else { break };
        match token.kind.clone() {
            TokenKind::Hash(name) => {
                vector.next();
                simples.push(SimpleSelector::Id(name));
            }
            TokenKind::Delim('.') => {
                vector.next();
                match vector.next().map(|t| t.kind) {
                    Some(TokenKind::Ident(name)) => simples.push(SimpleSelector::Class(name)),
                    _ => return None,
                }
            }
            TokenKind::LBracket => {
                simples.push(parse_attribute(vector, data)?);
            }
            TokenKind::Colon => {
                simples.push(parse_pseudo(vector, data)?);
            }
            _ => break,
        }
    }

    if simples.is_empty() {
        return None;
    }
    Some(simples)
}

// Namespace-prefix handling shared by type and attribute selectors. The
// prefix is resolved against the sheet's @namespace map at compile time; an
// undeclared prefix invalidates the selector.
fn resolve_prefix(data: &SheetData, prefix: Option<&Atom>, any: bool) -> Option<Option<Atom>> {
    if any {
        return Some(Some(data.interner.intern("*")));
    }
    match prefix {
        None => Some(None),
        Some(prefix) => data.namespaces.resolve(prefix).cloned().map(Some),
    }
}

fn parse_type_or_universal(vector: &mut TokenVector, data: &SheetData) -> Option<SimpleSelector> {
    let mut prefix: Option<Atom> = None;
    let mut prefix_any = false;
    let mut explicit_no_ns = false;

    // leading  `|`, `p|` or `*|`  (no whitespace inside the qualified name)
    match vector.peek().map(|t| t.kind.clone()) {
        Some(TokenKind::Delim('|')) => {
            vector.next();
            explicit_no_ns = true;
        }
        Some(TokenKind::Ident(name)) => {
            vector.next();
            if pipe_starts_prefix(vector) {
                vector.next();
                prefix = Some(name);
            } else {
                // plain element name in the default namespace
                let ns = data.namespaces.default_ns.clone();
                return Some(SimpleSelector::Type(QName {
                    ns,
                    local: Some(name),
                }));
            }
        }
        Some(TokenKind::Delim('*')) => {
            vector.next();
            if pipe_starts_prefix(vector) {
                vector.next();
                prefix_any = true;
            } else {
                return Some(SimpleSelector::Universal);
            }
        }
        _ => return None,
    }

    let ns = if explicit_no_ns {
        None
    } else {
        resolve_prefix(data, prefix.as_ref(), prefix_any)?
    };

    match vector.next().map(|t| t.kind) {
        Some(TokenKind::Ident(local)) => Some(SimpleSelector::Type(QName {
            ns,
            local: Some(local),
        })),
        Some(TokenKind::Delim('*')) => match ns {
            None => Some(SimpleSelector::Universal),
            ns => Some(SimpleSelector::Type(QName { ns, local: None })),
        },
        _ => None,
    }
}

// True when the cursor sits on a `|` that continues a qualified name (as
// opposed to the `|=` attribute operator or a stray delimiter).
fn pipe_starts_prefix(vector: &TokenVector) -> bool {
    let pos = vector.mark();
    if !matches!(vector.get(pos), Some(t) if t.is_delim('|')) {
        return false;
    }
    matches!(
        vector.get(pos + 1).map(|t| &t.kind),
        Some(TokenKind::Ident(_) | TokenKind::Delim('*'))
    )
}

fn parse_attribute(vector: &mut TokenVector, data: &SheetData) -> Option<SimpleSelector> {
    log::trace!("parse_attribute");

    // consume '['
    vector.next();
    vector.skip_whitespace();

    // attribute qualified name (prefix forms as for type selectors)
    let mut prefix: Option<Atom> = None;
    let mut prefix_any = false;
    let mut explicit_no_ns = false;

    match vector.next().map(|t| t.kind) {
        Some(TokenKind::Delim('|')) => explicit_no_ns = true,
        Some(TokenKind::Delim('*')) if pipe_starts_prefix(vector) => {
            vector.next();
            prefix_any = true;
        }
        Some(TokenKind::Ident(name)) => {
            if pipe_starts_prefix(vector) {
                vector.next();
                prefix = Some(name);
            } else {
                vector.reconsume();
            }
        }
        _ => return None,
    }

    let name = match vector.next().map(|t| t.kind) {
        Some(TokenKind::Ident(name)) => name,
        _ => return None,
    };

    let ns = if explicit_no_ns {
        None
    } else {
        resolve_prefix(data, prefix.as_ref(), prefix_any)?
    };
    let qname = QName {
        ns,
        local: Some(name),
    };

    vector.skip_whitespace();

    // presence form `[a]`
    if matches!(vector.peek(), Some(t) if t.kind == TokenKind::RBracket) {
        vector.next();
        return Some(SimpleSelector::Attribute {
            qname,
            op: AttrOp::Set,
            value: None,
        });
    }

    let op = match vector.next().map(|t| t.kind) {
        Some(TokenKind::Delim('=')) => AttrOp::Equals,
        Some(TokenKind::Delim(c @ ('~' | '|' | '^' | '$' | '*'))) => {
            match vector.next().map(|t| t.kind) {
                Some(TokenKind::Delim('=')) => {}
                _ => return None,
            }
            match c {
                '~' => AttrOp::Includes,
                '|' => AttrOp::DashMatch,
                '^' => AttrOp::Prefix,
                '$' => AttrOp::Suffix,
                _ => AttrOp::Substring,
            }
        }
        _ => return None,
    };

    vector.skip_whitespace();

    let value = match vector.next().map(|t| t.kind) {
        Some(TokenKind::Ident(value) | TokenKind::QuotedString(value)) => value,
        _ => return None,
    };

    vector.skip_whitespace();
    match vector.next().map(|t| t.kind) {
        Some(TokenKind::RBracket) => {}
        _ => return None,
    }

    Some(SimpleSelector::Attribute {
        qname,
        op,
        value: Some(value),
    })
}

fn parse_pseudo(vector: &mut TokenVector, data: &SheetData) -> Option<SimpleSelector> {
    log::trace!("parse_pseudo");

    // consume ':'
    vector.next();

    // `::element`
    if matches!(vector.peek(), Some(t) if t.kind == TokenKind::Colon) {
        vector.next();
        return match vector.next().map(|t| t.kind) {
            Some(TokenKind::Ident(name)) if PSEUDO_ELEMENTS.contains(&name.folded()) => {
                Some(SimpleSelector::PseudoElement(name))
            }
            _ => None,
        };
    }

    match vector.next().map(|t| t.kind) {
        Some(TokenKind::Ident(name)) => {
            if PSEUDO_ELEMENTS.contains(&name.folded()) {
                // single-colon compatibility syntax
                return Some(SimpleSelector::PseudoElement(name));
            }
            if PSEUDO_CLASSES.contains(&name.folded()) {
                return Some(SimpleSelector::PseudoClass { name, arg: None });
            }
            None
        }
        Some(TokenKind::Function(name)) => {
            let arg = match name.folded() {
                f if FUNCTIONAL_NTH.contains(&f) => {
                    let (a, b) = anplusb::parse(vector)?;
                    PseudoArg::Nth { a, b }
                }
                "lang" => {
                    let ident = match vector.next_non_ws().map(|t| t.kind) {
                        Some(TokenKind::Ident(ident)) => ident,
                        _ => return None,
                    };
                    PseudoArg::Ident(ident)
                }
                "not" => {
                    vector.skip_whitespace();
                    let inner = parse_compound(vector, data)?;
                    if inner.iter().any(|s| matches!(s, SimpleSelector::PseudoElement(_))) {
                        return None;
                    }
                    PseudoArg::Not(inner)
                }
                _ => return None,
            };

            vector.skip_whitespace();
            match vector.next().map(|t| t.kind) {
                Some(TokenKind::RParen) => {}
                _ => return None,
            }

            Some(SimpleSelector::PseudoClass {
                name,
                arg: Some(arg),
            })
        }
        _ => None,
    }
}
