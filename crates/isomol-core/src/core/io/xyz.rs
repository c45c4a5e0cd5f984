use crate::core::models::atom::{Atom, Element};
use crate::core::models::structure::Structure;
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid atom count (value: '{value}')")]
    InvalidCount { value: String },

    #[error("Malformed atom record on line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("Unexpected end of file: expected {expected} atom records, found {found}")]
    MissingAtoms { expected: usize, found: usize },
}

/// Reads a structure from an XYZ stream: an atom count, a comment line,
/// then one `symbol x y z` record per atom.
///
/// Species the element table does not know become [`Element::Unknown`];
/// they keep their coordinates but never bond. Extra columns after the
/// coordinates are ignored, as are trailing blank lines.
pub fn read_xyz(reader: impl BufRead) -> Result<Structure, XyzError> {
    let mut lines = reader.lines().enumerate();

    let (_, count_line) = lines.next().ok_or(XyzError::MissingAtoms {
        expected: 1,
        found: 0,
    })?;
    let count_line = count_line?;
    let expected: usize =
        count_line
            .trim()
            .parse()
            .map_err(|_| XyzError::InvalidCount {
                value: count_line.trim().to_string(),
            })?;

    // Comment line; optional when zero atoms are declared.
    if let Some((_, comment)) = lines.next() {
        let _ = comment?;
    }

    let mut atoms = Vec::with_capacity(expected);
    for (index, line) in lines {
        if atoms.len() == expected {
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let line_number = index + 1;
        let mut fields = line.split_whitespace();

        let symbol = fields.next().ok_or_else(|| XyzError::Malformed {
            line: line_number,
            message: "missing element symbol".to_string(),
        })?;
        let element = Element::from_symbol(symbol).unwrap_or(Element::Unknown);

        let mut coordinate = |axis: &str| -> Result<f64, XyzError> {
            let field = fields.next().ok_or_else(|| XyzError::Malformed {
                line: line_number,
                message: format!("missing {axis} coordinate"),
            })?;
            field.parse().map_err(|_| XyzError::Malformed {
                line: line_number,
                message: format!("invalid {axis} coordinate '{field}'"),
            })
        };
        let x = coordinate("x")?;
        let y = coordinate("y")?;
        let z = coordinate("z")?;

        atoms.push(Atom::new(element, Point3::new(x, y, z)));
    }

    if atoms.len() < expected {
        return Err(XyzError::MissingAtoms {
            expected,
            found: atoms.len(),
        });
    }

    Ok(Structure::from_atoms(atoms))
}
