use nalgebra::{Point3, Rotation3, Unit, Vector3};

/// Rotation by `radians` about an arbitrary (non-unit) axis.
pub fn rotation_about_axis(axis: &Vector3<f64>, radians: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), radians)
}

/// Unsigned angle between two direction vectors, in radians.
pub fn angle_between(u: &Vector3<f64>, w: &Vector3<f64>) -> f64 {
    u.angle(w)
}

/// Signed dihedral angle of the chain `a-b-c-d` in degrees.
///
/// Positive angles follow the right-hand rule about the `b -> c` axis:
/// looking from `c` toward `b`, a positive torsion carries `a`
/// counterclockwise. The result lies in `(-180, 180]`.
pub fn dihedral_degrees(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> f64 {
    let b1 = b - a;
    let b2 = c - b;
    let b3 = d - c;

    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    let m = n1.cross(&b2.normalize());

    let x = n1.dot(&n2);
    let y = m.dot(&n2);
    y.atan2(x).to_degrees()
}

/// Wraps an angle in degrees to the interval `(-180, 180]`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let mut wrapped = angle % 360.0;
    if wrapped <= -180.0 {
        wrapped += 360.0;
    } else if wrapped > 180.0 {
        wrapped -= 360.0;
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn angle_between_orthogonal_vectors_is_right() {
        let angle = angle_between(&Vector3::x(), &Vector3::y());
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < TOLERANCE);
    }

    #[test]
    fn rotation_about_z_carries_x_to_y() {
        let rot = rotation_about_axis(&Vector3::z(), std::f64::consts::FRAC_PI_2);
        let rotated = rot * Vector3::x();
        assert!((rotated - Vector3::y()).norm() < TOLERANCE);
    }

    #[test]
    fn dihedral_of_cis_chain_is_zero() {
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(0.0, 0.0, 1.0);
        let d = Point3::new(1.0, 0.0, 1.0);
        assert!(dihedral_degrees(&a, &b, &c, &d).abs() < TOLERANCE);
    }

    #[test]
    fn dihedral_of_trans_chain_is_half_turn() {
        let a = Point3::new(1.0, 0.0, 0.0);
        let b = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(0.0, 0.0, 1.0);
        let d = Point3::new(-1.0, 0.0, 1.0);
        assert!((dihedral_degrees(&a, &b, &c, &d).abs() - 180.0).abs() < TOLERANCE);
    }

    #[test]
    fn rotating_the_front_atom_shifts_the_dihedral_by_the_same_amount() {
        let b = Point3::new(0.0, 0.0, 0.0);
        let c = Point3::new(0.0, 0.0, 1.0);
        let d = Point3::new(1.0, 0.0, 1.0);
        let a = Point3::new(1.0, 0.0, 0.0);

        let rot = rotation_about_axis(&(c - b), 35.0f64.to_radians());
        let a_rotated = b + rot * (a - b);
        let dihedral = dihedral_degrees(&a_rotated, &b, &c, &d);
        assert!((dihedral - 35.0).abs() < 1e-9);
    }

    #[test]
    fn wrap_degrees_stays_in_half_open_interval() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), 180.0);
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(370.0), 10.0);
        assert_eq!(wrap_degrees(-350.0), 10.0);
    }
}
