//! `ossa simulate`: run playback, sampling, hierarchy and skinning over frames

use anyhow::{Context, Result, bail};
use clap::Args;
use ossa_anim::{AnimatorConfig, VertexLayout, parallel};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use crate::rig::RigFile;
use crate::utils::{add_table_row, create_table, format_bounds};

#[derive(Args)]
pub struct SimulateArgs {
    /// Path to the rig JSON file
    pub file: PathBuf,

    /// Number of frames to run
    #[arg(short = 'n', long, default_value_t = 60)]
    pub frames: usize,

    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub dt: f32,

    /// Playback speed, negative plays backward
    #[arg(short, long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub speed: f32,

    /// Clamp at the ends instead of looping
    #[arg(long)]
    pub no_loop: bool,

    /// Number of identical instances to step together
    #[arg(long, default_value_t = 1)]
    pub instances: usize,

    /// Skin positions only, without normals
    #[arg(long)]
    pub positions_only: bool,

    /// Write the skinned vertex buffers of the last frame as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Serialize)]
struct SimulationOutput {
    animation: String,
    frames: usize,
    time_ratio: f32,
    layout: VertexLayout,
    meshes: Vec<SkinnedMesh>,
}

#[derive(Serialize)]
struct SkinnedMesh {
    vertex_count: usize,
    vertices: Vec<f32>,
}

pub fn execute(args: &SimulateArgs) -> Result<()> {
    if args.instances == 0 {
        bail!("At least one instance is required");
    }

    let config = AnimatorConfig::new()
        .playback_speed(args.speed)
        .looping(!args.no_loop);
    let animator = RigFile::load(&args.file)?.into_animator(config)?;
    let name = animator.animation().name().to_string();
    let duration = animator.animation().duration();

    let mut animators = vec![animator; args.instances];
    log::info!(
        "Simulating '{name}' for {} frames of {}s on {} instances",
        args.frames,
        args.dt,
        args.instances
    );

    let mut table = create_table(&["Frame", "Time (s)", "Ratio", "Joint bounds"]);
    for frame in 1..=args.frames {
        let results = parallel::update_all(&mut animators, args.dt);
        for (instance, result) in results.into_iter().enumerate() {
            result.with_context(|| format!("Frame {frame}: instance {instance} failed"))?;
        }

        let controller = animators[0].controller();
        add_table_row(
            &mut table,
            [
                frame.to_string(),
                format!("{:.3}", controller.time_seconds(duration)),
                format!("{:.4}", controller.time_ratio()),
                format_bounds(animators[0].joint_bounds()),
            ],
        );
    }
    table.printstd();

    let layout = if args.positions_only {
        VertexLayout::positions_only()
    } else {
        VertexLayout::interleaved()
    };

    let animator = &mut animators[0];
    let mut meshes = Vec::with_capacity(animator.meshes().len());
    for index in 0..animator.meshes().len() {
        let len = animator.vertex_buffer_len(index, &layout).unwrap_or(0);
        let mut vertices = vec![0.0f32; len];
        let vertex_count = animator
            .skin_mesh(index, &mut vertices, &layout)
            .with_context(|| format!("Failed to skin mesh {index}"))?;

        println!(
            "Mesh {index}: {vertex_count} vertices skinned, skinning bounds {}",
            format_bounds(animator.skinning_bounds())
        );
        meshes.push(SkinnedMesh {
            vertex_count,
            vertices,
        });
    }

    if let Some(path) = &args.output {
        let output = SimulationOutput {
            animation: name,
            frames: args.frames,
            time_ratio: animator.controller().time_ratio(),
            layout,
            meshes,
        };

        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &output)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote skinned vertices to {}", path.display());
    }

    Ok(())
}
