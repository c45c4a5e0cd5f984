use super::atom::Atom;
use crate::core::bonding::detect::{BondList, detect_bonds};
use nalgebra::Point3;

/// An editable atom list with a derived bond graph.
///
/// Atoms are addressed by positional index; removing an atom shifts every
/// later index down by one, so indices are not stable identities across
/// edits. The bond list is a cache over the current coordinates: any
/// mutation clears it, and the next query recomputes it lazily.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    atoms: Vec<Atom>,
    bonds: Option<BondList>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_atoms(atoms: Vec<Atom>) -> Self {
        Self { atoms, bonds: None }
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Appends an atom and returns its index.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.bonds = None;
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    /// Removes the atom at `index`, shifting all later indices down.
    ///
    /// # Return
    ///
    /// Returns the removed atom, or `None` if the index is out of range.
    pub fn remove_atom(&mut self, index: usize) -> Option<Atom> {
        if index >= self.atoms.len() {
            return None;
        }
        self.bonds = None;
        Some(self.atoms.remove(index))
    }

    /// Moves the atom at `index` to a new position.
    ///
    /// # Return
    ///
    /// Returns `false` (a no-op) if the index is out of range.
    pub fn set_position(&mut self, index: usize, position: Point3<f64>) -> bool {
        let Some(atom) = self.atoms.get_mut(index) else {
            return false;
        };
        atom.position = position;
        self.bonds = None;
        true
    }

    /// The bonded pair list for the current coordinates, recomputing it if
    /// a mutation invalidated the cache.
    pub fn bonds(&mut self) -> &BondList {
        if self.bonds.is_none() {
            self.bonds = Some(detect_bonds(&self.atoms));
        }
        self.bonds.as_ref().unwrap()
    }

    /// The currently cached bond list, if no mutation has occurred since it
    /// was computed.
    pub fn cached_bonds(&self) -> Option<&BondList> {
        self.bonds.as_ref()
    }

    /// Per-atom neighbor lists derived from the bond graph.
    pub fn neighbor_lists(&mut self) -> Vec<Vec<u32>> {
        let count = self.atoms.len();
        self.bonds().adjacency(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Element;

    fn carbon(x: f64) -> Atom {
        Atom::new(Element::C, Point3::new(x, 0.0, 0.0))
    }

    #[test]
    fn bonds_are_computed_lazily_and_cached() {
        let mut structure = Structure::from_atoms(vec![carbon(0.0), carbon(1.5)]);
        assert!(structure.cached_bonds().is_none());
        assert_eq!(structure.bonds().len(), 1);
        assert!(structure.cached_bonds().is_some());
    }

    #[test]
    fn any_mutation_invalidates_the_bond_cache() {
        let mut structure = Structure::from_atoms(vec![carbon(0.0), carbon(1.5)]);
        let _ = structure.bonds();

        assert!(structure.set_position(1, Point3::new(10.0, 0.0, 0.0)));
        assert!(structure.cached_bonds().is_none());
        assert!(structure.bonds().is_empty());

        structure.add_atom(carbon(11.5));
        assert!(structure.cached_bonds().is_none());
        assert_eq!(structure.bonds().len(), 1);

        structure.remove_atom(2);
        assert!(structure.cached_bonds().is_none());
        assert!(structure.bonds().is_empty());
    }

    #[test]
    fn removal_shifts_positional_indices() {
        let mut structure = Structure::from_atoms(vec![carbon(0.0), carbon(1.5), carbon(3.0)]);
        let removed = structure.remove_atom(0).unwrap();
        assert_eq!(removed.position.x, 0.0);
        assert_eq!(structure.len(), 2);
        assert_eq!(structure.atom(0).unwrap().position.x, 1.5);
        assert_eq!(structure.atom(1).unwrap().position.x, 3.0);
    }

    #[test]
    fn out_of_range_edits_are_no_ops() {
        let mut structure = Structure::from_atoms(vec![carbon(0.0)]);
        assert!(!structure.set_position(5, Point3::origin()));
        assert!(structure.remove_atom(5).is_none());
        assert_eq!(structure.len(), 1);
    }

    #[test]
    fn empty_structure_has_no_bonds() {
        let mut structure = Structure::new();
        assert!(structure.bonds().is_empty());
        assert!(structure.neighbor_lists().is_empty());
    }
}
