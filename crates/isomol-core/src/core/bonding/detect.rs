use crate::core::models::atom::Atom;
use nalgebra::Point3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Two atoms bond when their distance is within this factor of the sum of
/// their bonding radii.
pub const BOND_TOLERANCE: f64 = 1.25;

/// Edge length of the cubic buckets used by the neighbor search. At least
/// the largest bonding distance the radius table can produce, so a bonded
/// pair always lands in the same or an adjacent cell.
pub const CELL_SIZE: f64 = 4.0;

/// The 13 "forward" neighbors of a cell in a 3x3x3 neighborhood. Visiting
/// only these (plus the cell itself) touches each unordered cell pair
/// exactly once.
const FORWARD_NEIGHBORS: [[i64; 3]; 13] = [
    [1, 0, 0],
    [-1, 1, 0],
    [0, 1, 0],
    [1, 1, 0],
    [-1, -1, 1],
    [0, -1, 1],
    [1, -1, 1],
    [-1, 0, 1],
    [0, 0, 1],
    [1, 0, 1],
    [-1, 1, 1],
    [0, 1, 1],
    [1, 1, 1],
];

/// The bonded pairs of a structure, stored as two parallel index arrays.
///
/// Each unordered pair appears exactly once, with the smaller atom index in
/// the first array. The list is a derived cache: any atom move, addition,
/// or removal invalidates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BondList {
    first: Vec<u32>,
    second: Vec<u32>,
}

impl BondList {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, a: u32, b: u32) {
        debug_assert!(a < b);
        self.first.push(a);
        self.second.push(b);
    }

    /// Number of bonded pairs.
    pub fn len(&self) -> usize {
        self.first.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }

    /// The lower-index side of every pair.
    pub fn first_atoms(&self) -> &[u32] {
        &self.first
    }

    /// The higher-index side of every pair.
    pub fn second_atoms(&self) -> &[u32] {
        &self.second
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.first
            .iter()
            .copied()
            .zip(self.second.iter().copied())
    }

    /// Whether the unordered pair `(a, b)` is bonded.
    pub fn contains(&self, a: u32, b: u32) -> bool {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.iter().any(|(i, j)| i == lo && j == hi)
    }

    /// Neighbor lists indexed by atom, for graph traversal.
    pub fn adjacency(&self, atom_count: usize) -> Vec<Vec<u32>> {
        let mut lists = vec![Vec::new(); atom_count];
        for (i, j) in self.iter() {
            lists[i as usize].push(j);
            lists[j as usize].push(i);
        }
        lists
    }
}

#[inline]
fn bonded(atoms: &[Atom], radii: &[Option<f64>], a: u32, b: u32) -> bool {
    let (Some(ra), Some(rb)) = (radii[a as usize], radii[b as usize]) else {
        return false;
    };
    let limit = BOND_TOLERANCE * (ra + rb);
    let d = atoms[a as usize].position - atoms[b as usize].position;
    d.norm_squared() <= limit * limit
}

/// Finds all bonded pairs among `atoms` under the radius-sum rule.
///
/// The search buckets atoms into cubic cells of edge [`CELL_SIZE`] and
/// tests candidates only within a cell and against its 13 forward
/// neighbors, so each unordered pair is examined at most once. Output is
/// sorted by pair for determinism regardless of the `parallel` feature.
///
/// Zero or one atom produces an empty list; so does a structure made
/// entirely of unknown species.
pub fn detect_bonds(atoms: &[Atom]) -> BondList {
    let mut list = BondList::new();
    if atoms.len() < 2 {
        return list;
    }

    let radii: Vec<Option<f64>> = atoms.iter().map(|a| a.element.bonding_radius()).collect();

    let mut min = atoms[0].position;
    let mut max = atoms[0].position;
    for atom in &atoms[1..] {
        min = Point3::new(
            min.x.min(atom.position.x),
            min.y.min(atom.position.y),
            min.z.min(atom.position.z),
        );
        max = Point3::new(
            max.x.max(atom.position.x),
            max.y.max(atom.position.y),
            max.z.max(atom.position.z),
        );
    }

    let dims = [
        ((max.x - min.x) / CELL_SIZE).floor() as usize + 1,
        ((max.y - min.y) / CELL_SIZE).floor() as usize + 1,
        ((max.z - min.z) / CELL_SIZE).floor() as usize + 1,
    ];

    let cell_coord = |p: &Point3<f64>| -> [usize; 3] {
        [
            (((p.x - min.x) / CELL_SIZE).floor() as usize).min(dims[0] - 1),
            (((p.y - min.y) / CELL_SIZE).floor() as usize).min(dims[1] - 1),
            (((p.z - min.z) / CELL_SIZE).floor() as usize).min(dims[2] - 1),
        ]
    };
    let cell_index = |c: [usize; 3]| c[0] + dims[0] * (c[1] + dims[1] * c[2]);

    let mut cells: Vec<Vec<u32>> = vec![Vec::new(); dims[0] * dims[1] * dims[2]];
    for (i, atom) in atoms.iter().enumerate() {
        cells[cell_index(cell_coord(&atom.position))].push(i as u32);
    }

    let occupied: Vec<usize> = (0..cells.len()).filter(|&c| !cells[c].is_empty()).collect();

    let pairs_for_cell = |flat: usize| -> Vec<(u32, u32)> {
        let cx = flat % dims[0];
        let cy = (flat / dims[0]) % dims[1];
        let cz = flat / (dims[0] * dims[1]);
        let members = &cells[flat];
        let mut pairs = Vec::new();

        for (n, &a) in members.iter().enumerate() {
            for &b in &members[n + 1..] {
                let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                if bonded(atoms, &radii, lo, hi) {
                    pairs.push((lo, hi));
                }
            }
        }

        for offset in FORWARD_NEIGHBORS {
            let nx = cx as i64 + offset[0];
            let ny = cy as i64 + offset[1];
            let nz = cz as i64 + offset[2];
            if nx < 0
                || ny < 0
                || nz < 0
                || nx >= dims[0] as i64
                || ny >= dims[1] as i64
                || nz >= dims[2] as i64
            {
                continue;
            }
            let neighbor = &cells[cell_index([nx as usize, ny as usize, nz as usize])];
            for &a in members {
                for &b in neighbor {
                    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                    if bonded(atoms, &radii, lo, hi) {
                        pairs.push((lo, hi));
                    }
                }
            }
        }

        pairs
    };

    #[cfg(feature = "parallel")]
    let mut pairs: Vec<(u32, u32)> = occupied
        .par_iter()
        .map(|&c| pairs_for_cell(c))
        .flatten()
        .collect();

    #[cfg(not(feature = "parallel"))]
    let mut pairs: Vec<(u32, u32)> = occupied
        .iter()
        .flat_map(|&c| pairs_for_cell(c))
        .collect();

    pairs.sort_unstable();
    for (a, b) in pairs {
        list.push(a, b);
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Element;

    fn atom(element: Element, x: f64, y: f64, z: f64) -> Atom {
        Atom::new(element, Point3::new(x, y, z))
    }

    fn brute_force(atoms: &[Atom]) -> Vec<(u32, u32)> {
        let mut pairs = Vec::new();
        for i in 0..atoms.len() {
            for j in i + 1..atoms.len() {
                let (Some(ri), Some(rj)) = (
                    atoms[i].element.bonding_radius(),
                    atoms[j].element.bonding_radius(),
                ) else {
                    continue;
                };
                let limit = BOND_TOLERANCE * (ri + rj);
                if (atoms[i].position - atoms[j].position).norm() <= limit {
                    pairs.push((i as u32, j as u32));
                }
            }
        }
        pairs
    }

    #[test]
    fn fewer_than_two_atoms_yield_no_bonds() {
        assert!(detect_bonds(&[]).is_empty());
        assert!(detect_bonds(&[atom(Element::C, 0.0, 0.0, 0.0)]).is_empty());
    }

    #[test]
    fn radius_sum_rule_decides_bonding() {
        // Nitrogen has bonding radius 0.75: limit = 1.25 * 1.5 = 1.875.
        let close = [
            atom(Element::N, 0.0, 0.0, 0.0),
            atom(Element::N, 1.2, 0.0, 0.0),
        ];
        let bonds = detect_bonds(&close);
        assert_eq!(bonds.len(), 1);
        assert!(bonds.contains(0, 1));

        let far = [
            atom(Element::N, 0.0, 0.0, 0.0),
            atom(Element::N, 2.0, 0.0, 0.0),
        ];
        assert!(detect_bonds(&far).is_empty());
    }

    #[test]
    fn unknown_species_never_bond() {
        let atoms = [
            atom(Element::Unknown, 0.0, 0.0, 0.0),
            atom(Element::C, 0.5, 0.0, 0.0),
            atom(Element::Unknown, 0.7, 0.0, 0.0),
        ];
        assert!(detect_bonds(&atoms).is_empty());
    }

    #[test]
    fn pairs_appear_exactly_once_with_lower_index_first() {
        // A methane-like cluster plus a far-away spectator.
        let atoms = [
            atom(Element::C, 0.0, 0.0, 0.0),
            atom(Element::H, 1.09, 0.0, 0.0),
            atom(Element::H, -0.36, 1.03, 0.0),
            atom(Element::H, -0.36, -0.51, 0.89),
            atom(Element::H, -0.36, -0.51, -0.89),
            atom(Element::Ar, 50.0, 50.0, 50.0),
        ];
        let bonds = detect_bonds(&atoms);
        let pairs: Vec<_> = bonds.iter().collect();
        for &(i, j) in &pairs {
            assert!(i < j);
        }
        let mut unique = pairs.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), pairs.len());
        assert_eq!(pairs, brute_force(&atoms));
    }

    #[test]
    fn sparse_atoms_match_brute_force_reference() {
        // Spread across many cells so no two occupied cells are adjacent,
        // then verify zero false negatives against the O(N^2) reference.
        let mut atoms = Vec::new();
        for k in 0..8 {
            let base = k as f64 * 20.0;
            atoms.push(atom(Element::C, base, 0.0, 0.0));
            atoms.push(atom(Element::O, base + 1.2, 0.0, 0.0));
        }
        let bonds = detect_bonds(&atoms);
        let pairs: Vec<_> = bonds.iter().collect();
        assert_eq!(pairs, brute_force(&atoms));
        assert_eq!(pairs.len(), 8);
    }

    #[test]
    fn bonds_across_cell_boundaries_are_found() {
        // Straddle a bucket boundary: atoms at 3.9 and 4.1 land in
        // different cells but are 0.2 apart.
        let atoms = [
            atom(Element::C, 3.9, 0.0, 0.0),
            atom(Element::C, 4.1, 0.0, 0.0),
        ];
        let bonds = detect_bonds(&atoms);
        assert_eq!(bonds.len(), 1);
        assert!(bonds.contains(0, 1));
    }

    #[test]
    fn every_bonding_distance_fits_one_cell_gap() {
        // The adjacent-cell search is exact only while no pair's bonding
        // distance exceeds the bucket edge.
        let max_radius = (1..=118)
            .filter_map(Element::from_atomic_number)
            .filter_map(|e| e.bonding_radius())
            .fold(0.0f64, f64::max);
        assert!(BOND_TOLERANCE * 2.0 * max_radius <= CELL_SIZE);
    }

    #[test]
    fn adjacency_lists_mirror_every_pair() {
        let atoms = [
            atom(Element::C, 0.0, 0.0, 0.0),
            atom(Element::C, 1.5, 0.0, 0.0),
            atom(Element::C, 3.0, 0.0, 0.0),
        ];
        let bonds = detect_bonds(&atoms);
        let adjacency = bonds.adjacency(atoms.len());
        assert_eq!(adjacency[0], vec![1]);
        assert_eq!(adjacency[1], vec![0, 2]);
        assert_eq!(adjacency[2], vec![1]);
    }
}
