use std::cmp::Ordering;
use std::fmt;
use std::fmt::Debug;

use sepia_shared::interner::Atom;

/// A qualified name: optional namespace URI plus local part. A `None` local
/// part stands for the universal `*`.
#[derive(Clone, Debug, PartialEq)]
pub struct QName {
    /// Resolved namespace URI. `None` means no namespace constraint.
    pub ns: Option<Atom>,
    pub local: Option<Atom>,
}

impl QName {
    pub fn local(name: Atom) -> QName {
        QName {
            ns: None,
            local: Some(name),
        }
    }
}

/// Attribute match operator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttrOp {
    /// `[a]` presence check, no value.
    #[default]
    Set,
    /// `[a=v]`
    Equals,
    /// `[a~=v]`
    Includes,
    /// `[a|=v]`
    DashMatch,
    /// `[a^=v]`
    Prefix,
    /// `[a$=v]`
    Suffix,
    /// `[a*=v]`
    Substring,
}

impl fmt::Display for AttrOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrOp::Set => write!(f, ""),
            AttrOp::Equals => write!(f, "="),
            AttrOp::Includes => write!(f, "~="),
            AttrOp::DashMatch => write!(f, "|="),
            AttrOp::Prefix => write!(f, "^="),
            AttrOp::Suffix => write!(f, "$="),
            AttrOp::Substring => write!(f, "*="),
        }
    }
}

/// Argument of a functional pseudo-class.
#[derive(Clone, Debug, PartialEq)]
pub enum PseudoArg {
    /// `:nth-child(an+b)` and friends, reduced to the (a, b) pair.
    Nth { a: i32, b: i32 },
    /// `:lang(x)`
    Ident(Atom),
    /// `:not(...)`; the negated simple selectors.
    Not(Vec<SimpleSelector>),
}

/// One simple selector within a compound.
#[derive(Clone, Debug, PartialEq)]
pub enum SimpleSelector {
    Universal,
    Type(QName),
    Id(Atom),
    Class(Atom),
    Attribute {
        qname: QName,
        op: AttrOp,
        value: Option<Atom>,
    },
    PseudoClass {
        name: Atom,
        arg: Option<PseudoArg>,
    },
    PseudoElement(Atom),
}

/// How a compound connects to the one before it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    /// First compound of a selector.
    None,
    /// Whitespace.
    Descendant,
    /// `>`
    Child,
    /// `+`
    NextSibling,
    /// `~`
    SubsequentSibling,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::None => write!(f, ""),
            Combinator::Descendant => write!(f, " "),
            Combinator::Child => write!(f, ">"),
            Combinator::NextSibling => write!(f, "+"),
            Combinator::SubsequentSibling => write!(f, "~"),
        }
    }
}

/// A run of simple selectors with the combinator linking it to the previous
/// compound.
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundSelector {
    pub combinator: Combinator,
    pub simples: Vec<SimpleSelector>,
}

/// One compiled selector of a selector group, with its specificity computed
/// at compile time. Matching never recomputes it.
#[derive(Clone, Debug, PartialEq)]
pub struct Selector {
    pub compounds: Vec<CompoundSelector>,
    pub specificity: Specificity,
}

impl Selector {
    pub fn new(compounds: Vec<CompoundSelector>) -> Selector {
        let specificity = Specificity::of(&compounds);
        Selector {
            compounds,
            specificity,
        }
    }
}

/// The (ids, classes+attributes+pseudo-classes, types+pseudo-elements)
/// triple used by the cascade.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl Specificity {
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self(a, b, c)
    }

    fn of(compounds: &[CompoundSelector]) -> Specificity {
        let mut spec = Specificity::new(0, 0, 0);
        for compound in compounds {
            for simple in &compound.simples {
                spec.count(simple);
            }
        }
        spec
    }

    fn count(&mut self, simple: &SimpleSelector) {
        match simple {
            SimpleSelector::Universal => {}
            SimpleSelector::Type(_) => self.2 += 1,
            SimpleSelector::Id(_) => self.0 += 1,
            SimpleSelector::Class(_) | SimpleSelector::Attribute { .. } => self.1 += 1,
            SimpleSelector::PseudoClass { name: _, arg } => {
                // :not(x) contributes x's specificity but does not itself
                // count as a pseudo-class.
                if let Some(PseudoArg::Not(inner)) = arg {
                    for simple in inner {
                        self.count(simple);
                    }
                } else {
                    self.1 += 1;
                }
            }
            SimpleSelector::PseudoElement(_) => self.2 += 1,
        }
    }
}

impl Debug for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.0, self.1, self.2)
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.0.cmp(&other.0) {
            Ordering::Equal => match self.1.cmp(&other.1) {
                Ordering::Equal => self.2.cmp(&other.2),
                ordering => ordering,
            },
            ordering => ordering,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sepia_shared::interner::InternContext;

    fn compound(combinator: Combinator, simples: Vec<SimpleSelector>) -> CompoundSelector {
        CompoundSelector { combinator, simples }
    }

    #[test]
    fn specificity_counts_categories() {
        let ctx = InternContext::new();
        let selector = Selector::new(vec![compound(
            Combinator::None,
            vec![
                SimpleSelector::Type(QName::local(ctx.intern("h1"))),
                SimpleSelector::Class(ctx.intern("myclass")),
                SimpleSelector::Id(ctx.intern("myid")),
            ],
        )]);
        assert_eq!(selector.specificity, Specificity::new(1, 1, 1));

        let selector = Selector::new(vec![compound(
            Combinator::None,
            vec![
                SimpleSelector::Class(ctx.intern("a")),
                SimpleSelector::Class(ctx.intern("b")),
            ],
        )]);
        assert_eq!(selector.specificity, Specificity::new(0, 2, 0));
    }

    #[test]
    fn attributes_and_pseudos_count_in_the_middle() {
        let ctx = InternContext::new();
        let selector = Selector::new(vec![compound(
            Combinator::None,
            vec![
                SimpleSelector::Attribute {
                    qname: QName::local(ctx.intern("type")),
                    op: AttrOp::Equals,
                    value: Some(ctx.intern("text")),
                },
                SimpleSelector::PseudoClass {
                    name: ctx.intern("hover"),
                    arg: None,
                },
                SimpleSelector::PseudoElement(ctx.intern("before")),
            ],
        )]);
        assert_eq!(selector.specificity, Specificity::new(0, 2, 1));
    }

    #[test]
    fn not_adds_inner_contribution_only() {
        let ctx = InternContext::new();
        let selector = Selector::new(vec![compound(
            Combinator::None,
            vec![SimpleSelector::PseudoClass {
                name: ctx.intern("not"),
                arg: Some(PseudoArg::Not(vec![SimpleSelector::Id(ctx.intern("x"))])),
            }],
        )]);
        assert_eq!(selector.specificity, Specificity::new(1, 0, 0));
    }

    #[test]
    fn specificity_ordering() {
        assert!(Specificity::new(1, 0, 0) > Specificity::new(0, 9, 9));
        assert!(Specificity::new(0, 1, 0) > Specificity::new(0, 0, 9));
        assert!(Specificity::new(0, 0, 2) > Specificity::new(0, 0, 1));
        assert_eq!(Specificity::new(1, 2, 3), Specificity::new(1, 2, 3));
    }
}
