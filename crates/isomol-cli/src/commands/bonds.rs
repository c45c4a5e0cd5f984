use crate::cli::BondsArgs;
use crate::error::Result;
use isomol::workflows;

pub fn run(args: BondsArgs) -> Result<()> {
    let mut structure = workflows::perceive_bonds(&args.input)?;
    if structure.is_empty() {
        println!("no atoms");
        return Ok(());
    }

    let bonds = structure.bonds().clone();
    println!("{} atoms, {} bonds", structure.len(), bonds.len());
    for (i, j) in bonds.iter() {
        let a = &structure.atoms()[i as usize];
        let b = &structure.atoms()[j as usize];
        let distance = (a.position - b.position).norm();
        println!(
            "{:>5} {:<2} - {:>5} {:<2}  {:>7.3}",
            i,
            a.element.symbol(),
            j,
            b.element.symbol(),
            distance
        );
    }

    Ok(())
}
