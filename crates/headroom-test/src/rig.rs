//! Standard avatar rig for tests

use headroom_core::{AvatarProfile, HeadroomResult, NodeNames};
use headroom_motion::{NodeMap, NodeTransform, Vec3};
use headroom_runtime::AvatarEngine;

/// Root, both jaws and the tongue, at the poses a loaded model starts in
pub fn avatar_rig(names: &NodeNames, base_scale: f32) -> NodeMap {
    NodeMap::new()
        .with_node(names.root.clone(), NodeTransform::with_scale(base_scale))
        .with_node(names.lower_jaw.clone(), NodeTransform::identity())
        .with_node(
            names.upper_jaw.clone(),
            NodeTransform::with_position(Vec3::new(0.0, 0.012, 0.004)),
        )
        .with_node(names.tongue.clone(), NodeTransform::identity())
}

/// Seeded engine over the standard rig with a small backdrop surface
pub fn test_engine(profile: AvatarProfile, seed: u64) -> HeadroomResult<AvatarEngine> {
    let rig = avatar_rig(&profile.nodes, profile.glitch.base_scale);
    let mut engine = AvatarEngine::with_seed(profile, Box::new(rig), seed)?;
    engine.resize_backdrop(48.0, 32.0, 1.0)?;
    Ok(engine)
}
