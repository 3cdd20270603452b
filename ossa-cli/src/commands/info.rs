//! `ossa info`: summary of a rig file

use anyhow::Result;
use std::path::Path;

use crate::rig::RigFile;
use crate::utils::{add_table_row, create_table, format_parent};

pub fn execute(path: &Path, detailed: bool) -> Result<()> {
    let rig = RigFile::load(path)?;
    let skeleton = &rig.skeleton;
    let animation = &rig.animation;

    println!("=== Rig Information ===");
    println!("File: {}", path.display());
    println!("Joints: {}", skeleton.num_joints());
    println!(
        "Animation: '{}' ({:.3}s, {} tracks, {} keyframes)",
        animation.name(),
        animation.duration(),
        animation.num_tracks(),
        animation.keyframe_count()
    );
    if skeleton.num_joints() != animation.num_tracks() {
        println!(
            "Warning: skeleton has {} joints but animation has {} tracks",
            skeleton.num_joints(),
            animation.num_tracks()
        );
    }
    println!("Meshes: {}", rig.meshes.len());

    if !rig.meshes.is_empty() {
        println!();
        let mut table = create_table(&[
            "Mesh", "Parts", "Vertices", "Triangles", "Max influences", "Joints", "Highest joint",
        ]);
        for (index, mesh) in rig.meshes.iter().enumerate() {
            add_table_row(
                &mut table,
                [
                    index.to_string(),
                    mesh.parts.len().to_string(),
                    mesh.vertex_count().to_string(),
                    (mesh.triangle_index_count() / 3).to_string(),
                    mesh.max_influences_count().to_string(),
                    mesh.num_joints().to_string(),
                    format_parent(mesh.highest_joint_index()),
                ],
            );
        }
        table.printstd();
    }

    if detailed {
        println!("\n=== Joints ===");
        let mut table = create_table(&["Index", "Name", "Parent", "Depth", "Keyframes"]);
        for (index, name) in skeleton.joint_names().iter().enumerate() {
            let keyframes = animation
                .tracks()
                .get(index)
                .map_or(0, |track| track.keyframe_count());
            add_table_row(
                &mut table,
                [
                    index.to_string(),
                    name.clone(),
                    format_parent(skeleton.parent(index)),
                    skeleton.depth(index).to_string(),
                    keyframes.to_string(),
                ],
            );
        }
        table.printstd();

        for (index, mesh) in rig.meshes.iter().enumerate() {
            println!("\n=== Mesh {index} parts ===");
            let mut table = create_table(&["Part", "Vertices", "Influences", "Normals", "UVs"]);
            for (part_index, part) in mesh.parts.iter().enumerate() {
                add_table_row(
                    &mut table,
                    [
                        part_index.to_string(),
                        part.vertex_count().to_string(),
                        part.influences_count().to_string(),
                        part.normal_count().to_string(),
                        part.uv_count().to_string(),
                    ],
                );
            }
            table.printstd();
        }
    }

    Ok(())
}
