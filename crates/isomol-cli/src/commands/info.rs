use crate::cli::InfoArgs;
use crate::error::Result;
use isomol::workflows;

pub fn run(args: InfoArgs) -> Result<()> {
    let header = workflows::density_info(&args.input)?;

    println!("description : {}", header.description);
    println!("atoms       : {}", header.atom_count);
    println!(
        "origin      : ({:.4}, {:.4}, {:.4})",
        header.origin.x, header.origin.y, header.origin.z
    );
    println!(
        "points      : {} x {} x {}  ({} total)",
        header.counts[0],
        header.counts[1],
        header.counts[2],
        header.point_count()
    );
    println!(
        "spacing     : ({:.4}, {:.4}, {:.4})",
        header.spacing.x, header.spacing.y, header.spacing.z
    );
    if header.channel_ids.is_empty() {
        println!("channels    : 1 (unnamed)");
    } else {
        let ids: Vec<String> = header.channel_ids.iter().map(i64::to_string).collect();
        println!("channels    : {} ({})", header.channel_count(), ids.join(", "));
    }

    Ok(())
}
