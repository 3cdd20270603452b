//! `ossa sample`: joint poses at one time ratio

use anyhow::{Context, Result, bail};
use glam::{Mat4, Vec3};
use ossa_anim::{SamplingContext, Transform, local_to_model, sample};
use std::path::Path;

use crate::rig::RigFile;
use crate::utils::{add_table_row, create_table, format_rotation, format_vec3};

pub fn execute(path: &Path, ratio: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&ratio) {
        bail!("Ratio {ratio} is outside [0, 1]");
    }

    let rig = RigFile::load(path)?;
    let skeleton = &rig.skeleton;
    let animation = &rig.animation;

    let mut context = SamplingContext::new(animation.num_tracks());
    let mut locals = vec![Transform::IDENTITY; animation.num_tracks()];
    sample(animation, ratio, &mut context, &mut locals).context("Failed to sample animation")?;

    let mut models = vec![Mat4::IDENTITY; skeleton.num_joints()];
    local_to_model(skeleton, &locals, &mut models).context("Skeleton and animation do not match")?;

    println!(
        "'{}' at ratio {ratio:.3} ({:.3}s)",
        animation.name(),
        ratio * animation.duration()
    );

    let mut table = create_table(&["Joint", "Translation", "Rotation", "Scale", "Model position"]);
    for (index, (local, model)) in locals.iter().zip(&models).enumerate() {
        add_table_row(
            &mut table,
            [
                skeleton.joint_names()[index].clone(),
                format_vec3(local.translation),
                format_rotation(local.rotation),
                format_vec3(local.scale),
                format_vec3(model.transform_point3(Vec3::ZERO)),
            ],
        );
    }
    table.printstd();

    Ok(())
}
