use indexmap::IndexMap;
use mcis_molecule::{Atom, AtomId};

/// Bidirectional map between fragment atoms and atom identifiers of one
/// source molecule. Both directions are kept injective.
#[derive(Clone, Debug, Default)]
pub struct AtomIdMap {
    /// Fragment atom to source identifier
    forward: IndexMap<Atom, AtomId>,
    /// Source identifier to fragment atom
    reverse: IndexMap<AtomId, Atom>,
}

impl AtomIdMap {
    /// An empty map.
    #[contracts::debug_ensures(ret.forward.is_empty())]
    #[contracts::debug_ensures(ret.reverse.is_empty())]
    #[must_use]
    pub fn new() -> Self {
        Self {
            forward: IndexMap::new(),
            reverse: IndexMap::new(),
        }
    }

    /// Records `atom <-> id`. Returns `false` and leaves the map untouched if
    /// either side is already mapped.
    #[contracts::debug_requires(self.forward.len() == self.reverse.len())]
    #[contracts::debug_ensures(self.forward.len() == self.reverse.len())]
    pub(crate) fn insert(&mut self, atom: Atom, id: AtomId) -> bool {
        if self.forward.contains_key(&atom) || self.reverse.contains_key(&id) {
            tracing::event!(
                tracing::Level::TRACE,
                "AtomIdMap::insert: {:?} <-> {} rejected, already mapped",
                atom,
                id
            );
            return false;
        }
        self.forward.insert(atom, id);
        self.reverse.insert(id, atom);
        true
    }

    /// Id mapped to `atom`.
    #[contracts::debug_ensures(self.debug_consistent(Some(atom), ret))]
    #[must_use]
    pub fn id(&self, atom: Atom) -> Option<AtomId> {
        self.forward.get(&atom).copied()
    }

    /// Atom mapped to `id`.
    #[contracts::debug_ensures(self.debug_consistent(ret, Some(id)))]
    #[must_use]
    pub fn atom(&self, id: AtomId) -> Option<Atom> {
        self.reverse.get(&id).copied()
    }

    /// Whether `atom` is mapped.
    #[must_use]
    pub fn contains_atom(&self, atom: Atom) -> bool {
        self.forward.contains_key(&atom)
    }

    /// Whether `id` is mapped.
    #[must_use]
    pub fn contains_id(&self, id: AtomId) -> bool {
        self.reverse.contains_key(&id)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Atom, AtomId)> + '_ {
        self.forward.iter().map(|(&a, &id)| (a, id))
    }

    /// Number of mapped pairs.
    #[contracts::debug_requires(self.forward.len() == self.reverse.len())]
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Whether nothing is mapped.
    #[contracts::debug_requires(self.forward.len() == self.reverse.len())]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    // a lookup in one direction must round trip through the other
    fn debug_consistent(&self, atom: Option<Atom>, id: Option<AtomId>) -> bool {
        match (atom, id) {
            (None, None) => true,
            (Some(a), Some(i)) => {
                self.forward.get(&a) == Some(&i) && self.reverse.get(&i) == Some(&a)
            }
            (Some(a), None) => !self.forward.contains_key(&a),
            (None, Some(i)) => !self.reverse.contains_key(&i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_injective() {
        let mut map = AtomIdMap::new();
        assert!(map.insert(Atom::new(0), AtomId::new(7)));
        assert!(!map.insert(Atom::new(1), AtomId::new(7)));
        assert!(!map.insert(Atom::new(0), AtomId::new(8)));
        assert!(map.insert(Atom::new(1), AtomId::new(8)));

        assert_eq!(map.len(), 2);
        assert_eq!(map.id(Atom::new(0)), Some(AtomId::new(7)));
        assert_eq!(map.atom(AtomId::new(8)), Some(Atom::new(1)));
        assert_eq!(map.atom(AtomId::new(9)), None);
        assert_eq!(
            map.iter().collect::<Vec<_>>(),
            vec![(Atom::new(0), AtomId::new(7)), (Atom::new(1), AtomId::new(8))]
        );
    }
}
