use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use cow_utils::CowUtils;
use parking_lot::Mutex;

// One unique byte string held by an interning context. The folded field is
// the lowercase shadow handle used for O(1) caseless comparison; an entry
// that is already lowercase has no shadow and stands for itself.
struct Entry {
    text: Box<str>,
    folded: Option<Arc<Entry>>,
}

/// Handle to an interned string. Clones share the same entry; equality is
/// handle identity, and caseless equality compares the precomputed folded
/// handles, so neither walks the bytes.
#[derive(Clone)]
pub struct Atom(Arc<Entry>);

impl Atom {
    pub fn as_str(&self) -> &str {
        &self.0.text
    }

    pub fn len(&self) -> usize {
        self.0.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.text.is_empty()
    }

    /// The lowercase shadow of this atom (itself when already lowercase).
    pub fn folded(&self) -> &str {
        match &self.0.folded {
            Some(entry) => &entry.text,
            None => &self.0.text,
        }
    }

    /// Case-insensitive comparison in O(1): both folded handles come from the
    /// same context, so pointer identity decides.
    pub fn eq_ci(&self, other: &Atom) -> bool {
        let a = self.0.folded.as_ref().unwrap_or(&self.0);
        let b = other.0.folded.as_ref().unwrap_or(&other.0);
        Arc::ptr_eq(a, b)
    }

    /// Case-insensitive comparison against a plain (lowercase) string.
    pub fn eq_ci_str(&self, folded: &str) -> bool {
        self.folded() == folded
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({:?})", self.as_str())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicitly created interning context. Cheap to clone; clones share the
/// table. A context may be shared across stylesheets (the refcounts are
/// atomic), but each stylesheet is still driven by a single caller.
#[derive(Clone, Default)]
pub struct InternContext {
    table: Arc<Mutex<HashMap<Box<str>, Weak<Entry>>>>,
}

impl InternContext {
    #[must_use]
    pub fn new() -> InternContext {
        InternContext::default()
    }

    /// Interns a string, returning the canonical handle for its exact bytes.
    /// Interning is case-sensitive; the folded shadow is interned alongside
    /// when the text contains uppercase characters (ASCII folding, which is
    /// what CSS keyword matching asks for).
    pub fn intern(&self, text: &str) -> Atom {
        let folded = match text.cow_to_ascii_lowercase() {
            Cow::Borrowed(_) => None,
            Cow::Owned(lower) => Some(self.intern_raw(&lower)),
        };

        Atom(self.entry(text, folded))
    }

    /// True when both handles come out of this context's table.
    pub fn owns(&self, atom: &Atom) -> bool {
        let table = self.table.lock();
        table
            .get(atom.as_str())
            .and_then(Weak::upgrade)
            .is_some_and(|entry| Arc::ptr_eq(&entry, &atom.0))
    }

    fn intern_raw(&self, text: &str) -> Arc<Entry> {
        self.entry(text, None)
    }

    fn entry(&self, text: &str, folded: Option<Arc<Entry>>) -> Arc<Entry> {
        let mut table = self.table.lock();

        if let Some(existing) = table.get(text).and_then(Weak::upgrade) {
            return existing;
        }

        // Entries are weakly held; dropped atoms leave stale slots behind
        // which are swept whenever the table has grown past its live count.
        if table.len() > 64 && table.len() > table.values().filter(|w| w.strong_count() > 0).count() * 2 {
            table.retain(|_, weak| weak.strong_count() > 0);
        }

        let entry = Arc::new(Entry {
            text: Box::from(text),
            folded,
        });
        table.insert(Box::from(text), Arc::downgrade(&entry));
        entry
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn interning_same_text_yields_same_handle() {
        let ctx = InternContext::new();
        let a = ctx.intern("margin");
        let b = ctx.intern("margin");
        assert_eq!(a, b);
    }

    #[test]
    fn interning_is_case_sensitive() {
        let ctx = InternContext::new();
        let lower = ctx.intern("red");
        let upper = ctx.intern("Red");
        assert_ne!(lower, upper);
        assert_eq!(upper.as_str(), "Red");
    }

    #[test]
    fn caseless_comparison_uses_folded_handles() {
        let ctx = InternContext::new();
        let a = ctx.intern("Helvetica");
        let b = ctx.intern("HELVETICA");
        let c = ctx.intern("courier");
        assert!(a.eq_ci(&b));
        assert!(!a.eq_ci(&c));
        assert!(a.eq_ci_str("helvetica"));
    }

    #[test]
    fn dropped_atoms_can_be_reinterned() {
        let ctx = InternContext::new();
        let first = ctx.intern("ephemeral");
        drop(first);
        let second = ctx.intern("ephemeral");
        assert_eq!(second.as_str(), "ephemeral");
    }

    #[test]
    fn shared_context_interns_across_clones() {
        let ctx = InternContext::new();
        let other = ctx.clone();
        let a = ctx.intern("shared");
        let b = other.intern("shared");
        assert_eq!(a, b);
        assert!(ctx.owns(&b));
    }
}
