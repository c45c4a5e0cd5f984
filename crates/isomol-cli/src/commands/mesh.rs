use crate::cli::MeshArgs;
use crate::config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use isomol::core::io::obj;
use isomol::engine::loader::CancelToken;
use isomol::engine::progress::ProgressReporter;
use isomol::workflows;
use std::fs::File;
use std::io::BufWriter;
use tracing::info;

pub fn run(args: MeshArgs) -> Result<()> {
    let mesh_config = config::resolve_mesh(&args)?;
    info!(
        input = %args.input.display(),
        channel = mesh_config.channel,
        levels = mesh_config.isolevels.len(),
        "Extracting isosurfaces."
    );

    let handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(handler.callback());
    let surfaces = workflows::extract_isosurfaces(
        &args.input,
        mesh_config.channel,
        &mesh_config.isolevels,
        &reporter,
        CancelToken::new(),
    )?;

    let file = File::create(&args.output)?;
    let mut writer = BufWriter::new(file);
    let names: Vec<String> = surfaces.surfaces().iter().map(|s| s.id().to_string()).collect();
    obj::write_obj(
        &mut writer,
        names
            .iter()
            .map(String::as_str)
            .zip(surfaces.surfaces().iter().map(|s| s.mesh())),
    )?;

    for surface in surfaces.surfaces() {
        println!(
            "{}: isolevel {:>12.6}  {:>8} vertices  {:>8} triangles",
            surface.id(),
            surface.isolevel(),
            surface.vertex_count(),
            surface.triangle_count()
        );
    }
    println!("wrote {}", args.output.display());

    Ok(())
}
