use std::collections::VecDeque;

/// The atom set that must move rigidly to apply one internal-coordinate
/// edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovableFragment {
    indices: Vec<u32>,
    ring_detected: bool,
}

impl MovableFragment {
    fn single(moving: usize, ring_detected: bool) -> Self {
        Self {
            indices: vec![moving as u32],
            ring_detected,
        }
    }

    /// Atom indices of the fragment, sorted ascending. Always contains the
    /// moving atom itself.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Whether traversal hit a fixed anchor through a side path, i.e. the
    /// edited coordinate sits in a ring and the fragment was conservatively
    /// collapsed to the moving atom alone.
    pub fn ring_detected(&self) -> bool {
        self.ring_detected
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&(index as u32)).is_ok()
    }
}

/// Collects the rigid fragment for an edit whose moving side starts at
/// `moving` and whose fixed side is guarded by `anchor` (the atom the
/// edited coordinate connects `moving` to) plus any `extra_fixed` atoms of
/// the coordinate.
///
/// The traversal is an explicit breadth-first walk with a visited set, so
/// it terminates on cyclic graphs and cannot exhaust the call stack on
/// large rings. It refuses to cross any fixed atom; if a fixed atom is
/// reached by any path other than the direct `moving`-`anchor` edge, the
/// connectivity is ambiguous and the fragment degrades to `moving` alone
/// rather than guessing.
///
/// # Panics
///
/// Panics if `moving` or `anchor` is not a valid index into `adjacency`;
/// callers validate indices before asking for a fragment.
pub fn movable_fragment(
    adjacency: &[Vec<u32>],
    moving: usize,
    anchor: usize,
    extra_fixed: &[usize],
) -> MovableFragment {
    assert!(moving < adjacency.len(), "moving atom index out of range");
    assert!(anchor < adjacency.len(), "anchor atom index out of range");

    let is_fixed = |v: usize| v == anchor || extra_fixed.contains(&v);

    let mut visited = vec![false; adjacency.len()];
    visited[moving] = true;
    let mut queue = VecDeque::from([moving]);

    while let Some(u) = queue.pop_front() {
        for &v in &adjacency[u] {
            let v = v as usize;
            if is_fixed(v) {
                if u == moving && v == anchor {
                    // The edited bond itself.
                    continue;
                }
                return MovableFragment::single(moving, true);
            }
            if !visited[v] {
                visited[v] = true;
                queue.push_back(v);
            }
        }
    }

    let indices = visited
        .iter()
        .enumerate()
        .filter_map(|(i, &seen)| seen.then_some(i as u32))
        .collect();
    MovableFragment {
        indices,
        ring_detected: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjacency_from_pairs(n: usize, pairs: &[(u32, u32)]) -> Vec<Vec<u32>> {
        let mut lists = vec![Vec::new(); n];
        for &(a, b) in pairs {
            lists[a as usize].push(b);
            lists[b as usize].push(a);
        }
        lists
    }

    #[test]
    fn terminal_atom_moves_alone() {
        // 0-1-2 chain, editing the 0-1 bond from the 0 side.
        let adjacency = adjacency_from_pairs(3, &[(0, 1), (1, 2)]);
        let fragment = movable_fragment(&adjacency, 0, 1, &[]);
        assert_eq!(fragment.indices(), &[0]);
        assert!(!fragment.ring_detected());
    }

    #[test]
    fn side_branch_travels_with_the_moving_atom() {
        // 3 and 4 hang off atom 0; editing 0-1 drags them along.
        let adjacency = adjacency_from_pairs(5, &[(0, 1), (1, 2), (0, 3), (3, 4)]);
        let fragment = movable_fragment(&adjacency, 0, 1, &[]);
        assert_eq!(fragment.indices(), &[0, 3, 4]);
        assert!(!fragment.ring_detected());
    }

    #[test]
    fn ring_collapses_fragment_to_the_moving_atom() {
        // 0-1 closed through 0-2-1: the anchor is reachable around the
        // back, so only the moving atom may move.
        let adjacency = adjacency_from_pairs(3, &[(0, 1), (0, 2), (1, 2)]);
        let fragment = movable_fragment(&adjacency, 0, 1, &[]);
        assert_eq!(fragment.indices(), &[0]);
        assert!(fragment.ring_detected());
    }

    #[test]
    fn large_ring_is_detected_without_recursion() {
        // A 1000-membered ring; the explicit queue must terminate and
        // report ambiguity.
        let n = 1000;
        let pairs: Vec<(u32, u32)> = (0..n)
            .map(|i| (i as u32, ((i + 1) % n) as u32))
            .collect();
        let adjacency = adjacency_from_pairs(n, &pairs);
        let fragment = movable_fragment(&adjacency, 0, 1, &[]);
        assert_eq!(fragment.indices(), &[0]);
        assert!(fragment.ring_detected());
    }

    #[test]
    fn extra_fixed_atoms_block_traversal() {
        // Angle edit 0-1-2 on a triangle: the moving atom touches the far
        // anchor directly, which counts as a ring.
        let adjacency = adjacency_from_pairs(3, &[(0, 1), (1, 2), (0, 2)]);
        let fragment = movable_fragment(&adjacency, 0, 1, &[2]);
        assert_eq!(fragment.indices(), &[0]);
        assert!(fragment.ring_detected());
    }

    #[test]
    fn disconnected_atoms_stay_out_of_the_fragment() {
        let adjacency = adjacency_from_pairs(4, &[(0, 1), (2, 3)]);
        let fragment = movable_fragment(&adjacency, 0, 1, &[]);
        assert_eq!(fragment.indices(), &[0]);
        assert!(!fragment.ring_detected());
    }
}
