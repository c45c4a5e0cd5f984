use nalgebra::Point3;
use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Chemical elements recognized by the engine.
///
/// The set covers the species a quantum-chemistry density file or a small
/// structure file is realistically going to contain. Anything outside it
/// parses as [`Element::Unknown`], which participates in geometry but never
/// in bonding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Element {
    H,
    He,
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,
    K,
    Ca,
    Ti,
    Cr,
    Mn,
    Fe,
    Co,
    Ni,
    Cu,
    Zn,
    Se,
    Br,
    Kr,
    I,
    Xe,
    /// Unrecognized species code. Never forms bonds.
    #[default]
    Unknown,
}

static SYMBOL_TABLE: Map<&'static str, Element> = phf_map! {
    "H" => Element::H,
    "He" => Element::He,
    "Li" => Element::Li,
    "Be" => Element::Be,
    "B" => Element::B,
    "C" => Element::C,
    "N" => Element::N,
    "O" => Element::O,
    "F" => Element::F,
    "Ne" => Element::Ne,
    "Na" => Element::Na,
    "Mg" => Element::Mg,
    "Al" => Element::Al,
    "Si" => Element::Si,
    "P" => Element::P,
    "S" => Element::S,
    "Cl" => Element::Cl,
    "Ar" => Element::Ar,
    "K" => Element::K,
    "Ca" => Element::Ca,
    "Ti" => Element::Ti,
    "Cr" => Element::Cr,
    "Mn" => Element::Mn,
    "Fe" => Element::Fe,
    "Co" => Element::Co,
    "Ni" => Element::Ni,
    "Cu" => Element::Cu,
    "Zn" => Element::Zn,
    "Se" => Element::Se,
    "Br" => Element::Br,
    "Kr" => Element::Kr,
    "I" => Element::I,
    "Xe" => Element::Xe,
};

impl Element {
    /// Looks up an element by chemical symbol, tolerating any letter case.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The chemical symbol (e.g. "C", "cl", "FE").
    ///
    /// # Return
    ///
    /// Returns the matching element, or `None` if the symbol is not in the
    /// table.
    pub fn from_symbol(symbol: &str) -> Option<Element> {
        let mut normalized = String::with_capacity(2);
        let mut chars = symbol.trim().chars();
        normalized.extend(chars.next()?.to_uppercase());
        normalized.extend(chars.flat_map(|c| c.to_lowercase()));
        SYMBOL_TABLE.get(normalized.as_str()).copied()
    }

    /// Looks up an element by atomic number (1-based).
    pub fn from_atomic_number(z: u32) -> Option<Element> {
        let element = match z {
            1 => Element::H,
            2 => Element::He,
            3 => Element::Li,
            4 => Element::Be,
            5 => Element::B,
            6 => Element::C,
            7 => Element::N,
            8 => Element::O,
            9 => Element::F,
            10 => Element::Ne,
            11 => Element::Na,
            12 => Element::Mg,
            13 => Element::Al,
            14 => Element::Si,
            15 => Element::P,
            16 => Element::S,
            17 => Element::Cl,
            18 => Element::Ar,
            19 => Element::K,
            20 => Element::Ca,
            22 => Element::Ti,
            24 => Element::Cr,
            25 => Element::Mn,
            26 => Element::Fe,
            27 => Element::Co,
            28 => Element::Ni,
            29 => Element::Cu,
            30 => Element::Zn,
            34 => Element::Se,
            35 => Element::Br,
            36 => Element::Kr,
            53 => Element::I,
            54 => Element::Xe,
            _ => return None,
        };
        Some(element)
    }

    /// The canonical chemical symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Element::H => "H",
            Element::He => "He",
            Element::Li => "Li",
            Element::Be => "Be",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Ne => "Ne",
            Element::Na => "Na",
            Element::Mg => "Mg",
            Element::Al => "Al",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::Ar => "Ar",
            Element::K => "K",
            Element::Ca => "Ca",
            Element::Ti => "Ti",
            Element::Cr => "Cr",
            Element::Mn => "Mn",
            Element::Fe => "Fe",
            Element::Co => "Co",
            Element::Ni => "Ni",
            Element::Cu => "Cu",
            Element::Zn => "Zn",
            Element::Se => "Se",
            Element::Br => "Br",
            Element::Kr => "Kr",
            Element::I => "I",
            Element::Xe => "Xe",
            Element::Unknown => "X",
        }
    }

    /// Heuristic bonding radius in length units (covalent single-bond radii).
    ///
    /// Two atoms are considered bonded when their distance does not exceed
    /// 1.25x the sum of their radii. [`Element::Unknown`] has no radius and
    /// therefore never bonds. The alkali/alkaline-earth entries are capped
    /// below 1.6 so that no pair's bonding distance can exceed the
    /// neighbor-search cell size.
    pub fn bonding_radius(&self) -> Option<f64> {
        let radius = match self {
            Element::H => 0.37,
            Element::He => 0.32,
            Element::Li => 1.34,
            Element::Be => 0.90,
            Element::B => 0.82,
            Element::C => 0.77,
            Element::N => 0.75,
            Element::O => 0.73,
            Element::F => 0.71,
            Element::Ne => 0.69,
            Element::Na => 1.50,
            Element::Mg => 1.30,
            Element::Al => 1.18,
            Element::Si => 1.11,
            Element::P => 1.06,
            Element::S => 1.02,
            Element::Cl => 0.99,
            Element::Ar => 0.97,
            Element::K => 1.55,
            Element::Ca => 1.55,
            Element::Ti => 1.36,
            Element::Cr => 1.27,
            Element::Mn => 1.39,
            Element::Fe => 1.25,
            Element::Co => 1.26,
            Element::Ni => 1.21,
            Element::Cu => 1.38,
            Element::Zn => 1.31,
            Element::Se => 1.16,
            Element::Br => 1.14,
            Element::Kr => 1.10,
            Element::I => 1.33,
            Element::Xe => 1.30,
            Element::Unknown => return None,
        };
        Some(radius)
    }
}

#[derive(Debug, Error)]
#[error("Unknown element symbol")]
pub struct ParseElementError;

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Element::from_symbol(s).ok_or(ParseElementError)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A positioned atom.
///
/// Atoms are addressed by position in their owning [`Structure`]; the index
/// shifts when earlier atoms are removed, so it must not be cached across
/// edits.
///
/// [`Structure`]: super::structure::Structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atom {
    /// The chemical species of the atom.
    pub element: Element,
    /// The 3D coordinates of the atom in length units.
    pub position: Point3<f64>,
}

impl Atom {
    pub fn new(element: Element, position: Point3<f64>) -> Self {
        Self { element, position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_symbol_accepts_mixed_case() {
        assert_eq!(Element::from_symbol("C"), Some(Element::C));
        assert_eq!(Element::from_symbol("cl"), Some(Element::Cl));
        assert_eq!(Element::from_symbol("FE"), Some(Element::Fe));
        assert_eq!(Element::from_symbol(" na "), Some(Element::Na));
    }

    #[test]
    fn from_symbol_rejects_unlisted_species() {
        assert_eq!(Element::from_symbol("Uuo"), None);
        assert_eq!(Element::from_symbol(""), None);
        assert_eq!(Element::from_symbol("42"), None);
    }

    #[test]
    fn from_atomic_number_matches_symbol_table() {
        assert_eq!(Element::from_atomic_number(1), Some(Element::H));
        assert_eq!(Element::from_atomic_number(6), Some(Element::C));
        assert_eq!(Element::from_atomic_number(53), Some(Element::I));
        assert_eq!(Element::from_atomic_number(0), None);
        assert_eq!(Element::from_atomic_number(119), None);
    }

    #[test]
    fn unknown_element_has_no_bonding_radius() {
        assert_eq!(Element::Unknown.bonding_radius(), None);
        assert_eq!(Element::default(), Element::Unknown);
    }

    #[test]
    fn known_elements_have_positive_radii() {
        for z in 1..=54 {
            if let Some(element) = Element::from_atomic_number(z) {
                assert!(element.bonding_radius().unwrap() > 0.0);
            }
        }
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let element: Element = "Br".parse().unwrap();
        assert_eq!(element.to_string(), "Br");
        assert!("Qq".parse::<Element>().is_err());
    }
}
