use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use stratum_world::{BlockSnapshot, SNAPSHOT_BORDER};

use crate::emit::{RenderModel, render_liquid};
use crate::vertex::ChunkVertex;
use crate::visibility::build_cull_bits;

/// Result of meshing one section: element counts per stream plus the face visibility matrix.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionMesh {
    pub opaque_count: u32,
    pub translucent_count: u32,
    pub cull_bits: u64,
}

/// Meshes the section held in `snap` (a 20^3 snapshot whose origin is the section origin
/// minus the border) into `opaque` and `translucent`, which are appended to.
///
/// Cells are visited `y`, `x`, `z` (outermost first) and every cell consumes exactly one draw
/// from the variant stream seeded with `seed`, so editing one cell never changes the
/// variant picked for another.
pub fn mesh_section(
    snap: &mut BlockSnapshot,
    seed: u64,
    opaque: &mut Vec<ChunkVertex>,
    translucent: &mut Vec<ChunkVertex>,
) -> SectionMesh {
    snap.set_relative_origin(-SNAPSHOT_BORDER, -SNAPSHOT_BORDER, -SNAPSHOT_BORDER);
    let snap = &*snap;
    let reg = snap.registry().clone();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut opaque_count = 0u32;
    let mut translucent_count = 0u32;

    for y in 0..16 {
        for x in 0..16 {
            for z in 0..16 {
                let ty = reg.block_type(snap.block(x, y, z));
                if !ty.renderable() {
                    rng.next_u32();
                    continue;
                }
                let (buf, counter) = if ty.is_translucent() {
                    (&mut *translucent, &mut translucent_count)
                } else {
                    (&mut *opaque, &mut opaque_count)
                };
                if let Some(liquid) = ty.liquid() {
                    render_liquid(liquid, snap, x, y, z, buf, counter);
                    rng.next_u32();
                    continue;
                }
                if let Some(variant) = ty.models().select_model(&mut rng) {
                    variant.render(x, y, z, snap, buf, counter);
                }
            }
        }
    }

    let cull_bits = build_cull_bits(snap);
    log::trace!(
        target: "mesh",
        "meshed section at {:?}: opaque={} translucent={} cull_bits={:#011x}",
        snap.world_origin(),
        opaque_count,
        translucent_count,
        cull_bits
    );
    SectionMesh {
        opaque_count,
        translucent_count,
        cull_bits,
    }
}
