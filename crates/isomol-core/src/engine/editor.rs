use crate::core::bonding::fragment::movable_fragment;
use crate::core::models::structure::Structure;
use crate::core::utils::geometry::{
    angle_between, dihedral_degrees, rotation_about_axis, wrap_degrees,
};
use nalgebra::{Point3, Rotation3};
use tracing::debug;

/// Shortest bond length an edit may produce; targets below it are clamped.
pub const MIN_BOND_LENGTH: f64 = 0.1;

/// Length changes smaller than this are treated as no-ops.
pub const LENGTH_TOLERANCE: f64 = 1e-9;

/// Angle changes (degrees) smaller than this are treated as no-ops.
pub const ANGLE_TOLERANCE: f64 = 1e-9;

/// Applies internal-coordinate edits to a [`Structure`], moving the rigid
/// fragment the bond graph dictates.
///
/// Every setter follows the same contract: out-of-range or repeated atom
/// indices, degenerate geometry (coincident atoms, collinear angle axes),
/// and sub-tolerance changes are silent no-ops returning `false`; `true`
/// means atoms actually moved. With `include_neighbors` unset only the
/// named moving atom (`a` in every coordinate) is transformed; with it
/// set, everything connected to `a` away from the coordinate's fixed
/// anchors moves rigidly along, unless the edited coordinate sits in a
/// ring, in which case the edit conservatively falls back to moving `a`
/// alone.
pub struct CoordinateEditor<'a> {
    structure: &'a mut Structure,
}

impl<'a> CoordinateEditor<'a> {
    pub fn new(structure: &'a mut Structure) -> Self {
        Self { structure }
    }

    /// Current length of the `a`-`b` distance, if both indices are valid.
    pub fn bond_length(&self, a: usize, b: usize) -> Option<f64> {
        let pa = self.structure.atom(a)?.position;
        let pb = self.structure.atom(b)?.position;
        Some((pa - pb).norm())
    }

    /// Current `a`-`b`-`c` valence angle in degrees.
    pub fn angle_degrees(&self, a: usize, b: usize, c: usize) -> Option<f64> {
        let pa = self.structure.atom(a)?.position;
        let pb = self.structure.atom(b)?.position;
        let pc = self.structure.atom(c)?.position;
        Some(angle_between(&(pa - pb), &(pc - pb)).to_degrees())
    }

    /// Current `a`-`b`-`c`-`d` torsion in degrees; positive follows the
    /// right-hand rule about the `b -> c` axis.
    pub fn torsion_degrees(&self, a: usize, b: usize, c: usize, d: usize) -> Option<f64> {
        let pa = self.structure.atom(a)?.position;
        let pb = self.structure.atom(b)?.position;
        let pc = self.structure.atom(c)?.position;
        let pd = self.structure.atom(d)?.position;
        Some(dihedral_degrees(&pa, &pb, &pc, &pd))
    }

    /// Sets the `a`-`b` bond length, translating `a`'s fragment along the
    /// `b -> a` direction. The resulting length never drops below
    /// [`MIN_BOND_LENGTH`].
    pub fn set_bond_length(
        &mut self,
        a: usize,
        b: usize,
        length: f64,
        include_neighbors: bool,
    ) -> bool {
        if !self.indices_valid(&[a, b]) || !length.is_finite() {
            return false;
        }
        let pa = self.structure.atoms()[a].position;
        let pb = self.structure.atoms()[b].position;
        let direction = pa - pb;
        let current = direction.norm();
        if current < LENGTH_TOLERANCE {
            return false;
        }
        let target = length.max(MIN_BOND_LENGTH);
        let delta = target - current;
        if delta.abs() < LENGTH_TOLERANCE {
            return false;
        }

        let fragment = self.fragment_for(a, b, &[], include_neighbors);
        debug!(a, b, target, moved = fragment.len(), "Bond length edit.");
        let shift = direction * (delta / current);
        self.move_atoms(&fragment, |p| p + shift);
        true
    }

    /// Sets the `a`-`b`-`c` valence angle in degrees, rotating `a`'s
    /// fragment about `(b -> a) x (b -> c)` with the pivot at `b`.
    pub fn set_angle_degrees(
        &mut self,
        a: usize,
        b: usize,
        c: usize,
        degrees: f64,
        include_neighbors: bool,
    ) -> bool {
        if !self.indices_valid(&[a, b, c]) || !degrees.is_finite() {
            return false;
        }
        let pa = self.structure.atoms()[a].position;
        let pb = self.structure.atoms()[b].position;
        let pc = self.structure.atoms()[c].position;
        let u = pa - pb;
        let w = pc - pb;
        let axis = u.cross(&w);
        if u.norm() < LENGTH_TOLERANCE || w.norm() < LENGTH_TOLERANCE {
            return false;
        }
        // A collinear a-b-c leaves the rotation plane undefined.
        if axis.norm_squared() < LENGTH_TOLERANCE * LENGTH_TOLERANCE {
            return false;
        }

        let current = angle_between(&u, &w).to_degrees();
        // Positive rotation about u x w closes the angle toward c.
        let rotation_degrees = current - degrees;
        if rotation_degrees.abs() < ANGLE_TOLERANCE {
            return false;
        }

        let fragment = self.fragment_for(a, b, &[c], include_neighbors);
        debug!(a, b, c, degrees, moved = fragment.len(), "Valence angle edit.");
        let rotation = rotation_about_axis(&axis, rotation_degrees.to_radians());
        self.rotate_atoms(&fragment, pb, &rotation);
        true
    }

    /// Sets the `a`-`b`-`c`-`d` torsion in degrees, rotating `a`'s
    /// fragment about the `b -> c` axis with the pivot at `b`. Positive
    /// torsions follow the right-hand rule about `b -> c`.
    pub fn set_torsion_degrees(
        &mut self,
        a: usize,
        b: usize,
        c: usize,
        d: usize,
        degrees: f64,
        include_neighbors: bool,
    ) -> bool {
        if !self.indices_valid(&[a, b, c, d]) || !degrees.is_finite() {
            return false;
        }
        let pa = self.structure.atoms()[a].position;
        let pb = self.structure.atoms()[b].position;
        let pc = self.structure.atoms()[c].position;
        let pd = self.structure.atoms()[d].position;
        let axis = pc - pb;
        if axis.norm() < LENGTH_TOLERANCE {
            return false;
        }
        // An atom on the rotation axis has no defined torsion.
        if (pa - pb).cross(&axis).norm_squared() < LENGTH_TOLERANCE * LENGTH_TOLERANCE
            || (pd - pc).cross(&axis).norm_squared() < LENGTH_TOLERANCE * LENGTH_TOLERANCE
        {
            return false;
        }

        let current = dihedral_degrees(&pa, &pb, &pc, &pd);
        let delta = wrap_degrees(degrees - current);
        if delta.abs() < ANGLE_TOLERANCE {
            return false;
        }

        let fragment = self.fragment_for(a, b, &[c, d], include_neighbors);
        debug!(a, b, c, d, degrees, moved = fragment.len(), "Torsion edit.");
        let rotation = rotation_about_axis(&axis, delta.to_radians());
        self.rotate_atoms(&fragment, pb, &rotation);
        true
    }

    fn indices_valid(&self, indices: &[usize]) -> bool {
        let n = self.structure.len();
        if indices.iter().any(|&i| i >= n) {
            return false;
        }
        indices
            .iter()
            .enumerate()
            .all(|(k, &i)| indices[..k].iter().all(|&j| j != i))
    }

    fn fragment_for(
        &mut self,
        moving: usize,
        anchor: usize,
        extra_fixed: &[usize],
        include_neighbors: bool,
    ) -> Vec<u32> {
        if !include_neighbors {
            return vec![moving as u32];
        }
        let adjacency = self.structure.neighbor_lists();
        movable_fragment(&adjacency, moving, anchor, extra_fixed)
            .indices()
            .to_vec()
    }

    fn move_atoms(&mut self, indices: &[u32], f: impl Fn(Point3<f64>) -> Point3<f64>) {
        for &i in indices {
            if let Some(atom) = self.structure.atom(i as usize) {
                let moved = f(atom.position);
                let _ = self.structure.set_position(i as usize, moved);
            }
        }
    }

    fn rotate_atoms(&mut self, indices: &[u32], pivot: Point3<f64>, rotation: &Rotation3<f64>) {
        self.move_atoms(indices, |p| pivot + rotation * (p - pivot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::{Atom, Element};
    use nalgebra::Point3;

    const TOLERANCE: f64 = 1e-9;

    fn carbon(x: f64, y: f64, z: f64) -> Atom {
        Atom::new(Element::C, Point3::new(x, y, z))
    }

    /// a-b-c-d chain with a lone atom e bonded only to a. All C-C
    /// contacts are 1.5 apart (bonded); everything else is out of range.
    fn chain_with_pendant() -> Structure {
        Structure::from_atoms(vec![
            carbon(1.5, 0.0, 0.0), // 0: a
            carbon(0.0, 0.0, 0.0), // 1: b
            carbon(0.0, 0.0, 1.5), // 2: c
            carbon(0.0, 1.5, 1.5), // 3: d
            carbon(3.0, 0.0, 0.0), // 4: e, pendant on a
        ])
    }

    #[test]
    fn bond_length_edit_moves_only_the_named_atom() {
        let mut structure = Structure::from_atoms(vec![carbon(0.0, 0.0, 0.0), carbon(1.5, 0.0, 0.0)]);
        let mut editor = CoordinateEditor::new(&mut structure);

        assert!(editor.set_bond_length(0, 1, 2.0, false));
        assert!((editor.bond_length(0, 1).unwrap() - 2.0).abs() < TOLERANCE);

        // b stayed put; a moved away along the b -> a direction.
        assert!((structure.atom(1).unwrap().position.x - 1.5).abs() < TOLERANCE);
        assert!((structure.atom(0).unwrap().position.x + 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn bond_length_is_clamped_at_the_minimum() {
        let mut structure = Structure::from_atoms(vec![carbon(0.0, 0.0, 0.0), carbon(1.5, 0.0, 0.0)]);
        let mut editor = CoordinateEditor::new(&mut structure);

        assert!(editor.set_bond_length(0, 1, 0.0, false));
        assert!((editor.bond_length(0, 1).unwrap() - MIN_BOND_LENGTH).abs() < TOLERANCE);
    }

    #[test]
    fn sub_tolerance_and_invalid_edits_are_no_ops() {
        let mut structure = Structure::from_atoms(vec![carbon(0.0, 0.0, 0.0), carbon(1.5, 0.0, 0.0)]);
        let mut editor = CoordinateEditor::new(&mut structure);

        assert!(!editor.set_bond_length(0, 1, 1.5, false));
        assert!(!editor.set_bond_length(0, 0, 2.0, false));
        assert!(!editor.set_bond_length(0, 7, 2.0, false));
        assert!(!editor.set_bond_length(0, 1, f64::NAN, false));
        assert!((structure.atom(0).unwrap().position.x).abs() < TOLERANCE);
    }

    #[test]
    fn angle_edit_reaches_the_requested_angle() {
        let mut structure = Structure::from_atoms(vec![
            carbon(1.5, 0.0, 0.0), // a
            carbon(0.0, 0.0, 0.0), // b
            carbon(0.0, 1.5, 0.0), // c
        ]);
        let mut editor = CoordinateEditor::new(&mut structure);
        assert!((editor.angle_degrees(0, 1, 2).unwrap() - 90.0).abs() < TOLERANCE);

        assert!(editor.set_angle_degrees(0, 1, 2, 120.0, false));
        assert!((editor.angle_degrees(0, 1, 2).unwrap() - 120.0).abs() < 1e-9);

        // The pivot and far anchor never move; the a-b distance is
        // preserved by the rotation.
        assert!((editor.bond_length(0, 1).unwrap() - 1.5).abs() < TOLERANCE);
        assert!((structure.atom(1).unwrap().position.coords.norm()).abs() < TOLERANCE);
        assert!((structure.atom(2).unwrap().position.y - 1.5).abs() < TOLERANCE);
    }

    #[test]
    fn collinear_angle_axis_is_a_no_op() {
        let mut structure = Structure::from_atoms(vec![
            carbon(1.5, 0.0, 0.0),
            carbon(0.0, 0.0, 0.0),
            carbon(-1.5, 0.0, 0.0),
        ]);
        let mut editor = CoordinateEditor::new(&mut structure);
        assert!(!editor.set_angle_degrees(0, 1, 2, 120.0, false));
    }

    #[test]
    fn torsion_edit_without_neighbors_moves_only_atom_a() {
        let mut structure = chain_with_pendant();
        let e_before = structure.atom(4).unwrap().position;
        let mut editor = CoordinateEditor::new(&mut structure);

        let current = editor.torsion_degrees(0, 1, 2, 3).unwrap();
        assert!(editor.set_torsion_degrees(0, 1, 2, 3, current + 10.0, false));
        let after = editor.torsion_degrees(0, 1, 2, 3).unwrap();
        assert!((wrap_degrees(after - current) - 10.0).abs() < 1e-9);

        // The pendant atom e did not move.
        assert_eq!(structure.atom(4).unwrap().position, e_before);
    }

    #[test]
    fn torsion_edit_with_neighbors_carries_the_pendant_along() {
        let mut structure = chain_with_pendant();
        let e_before = structure.atom(4).unwrap().position;
        let mut editor = CoordinateEditor::new(&mut structure);

        let current = editor.torsion_degrees(0, 1, 2, 3).unwrap();
        assert!(editor.set_torsion_degrees(0, 1, 2, 3, current + 10.0, true));

        // e rotated rigidly with a: it moved, but kept its distance to a.
        let a_after = structure.atom(0).unwrap().position;
        let e_after = structure.atom(4).unwrap().position;
        assert_ne!(e_after, e_before);
        assert!(((e_after - a_after).norm() - 1.5).abs() < 1e-9);

        // The fixed side of the coordinate stayed put.
        for index in 1..=3 {
            let p = structure.atom(index).unwrap().position;
            let q = chain_with_pendant().atom(index).unwrap().position;
            assert_eq!(p, q);
        }
    }

    #[test]
    fn ring_membership_falls_back_to_the_single_atom() {
        // An equilateral C3 ring; every pair is bonded.
        let mut structure = Structure::from_atoms(vec![
            carbon(0.0, 0.0, 0.0),
            carbon(1.5, 0.0, 0.0),
            carbon(0.75, 1.3, 0.0),
        ]);
        let third_before = structure.atom(2).unwrap().position;
        let mut editor = CoordinateEditor::new(&mut structure);

        assert!(editor.set_bond_length(0, 1, 2.0, true));
        // Only atom 0 moved despite neighbors being requested.
        assert_eq!(structure.atom(2).unwrap().position, third_before);
        assert!((structure.atom(1).unwrap().position.x - 1.5).abs() < TOLERANCE);
        let distance = (structure.atom(0).unwrap().position
            - structure.atom(1).unwrap().position)
            .norm();
        assert!((distance - 2.0).abs() < TOLERANCE);
    }
}
