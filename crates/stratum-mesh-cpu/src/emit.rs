use stratum_blocks::{Liquid, ModelKind, TextureRegion, Variant};
use stratum_geom::Direction;
use stratum_world::{BlockSnapshot, MAX_LIGHT};

use crate::vertex::ChunkVertex;

/// Elements added to a stream's counter per emitted quad (two triangles over a shared
/// quad index buffer).
pub(crate) const ELEMENTS_PER_QUAD: u32 = 6;

// Unit-cube corners per face, indexed by `Direction::index()`. Each face lists its corners
// counter-clockwise seen from outside: top-left, bottom-left, bottom-right, top-right.
const FACE_CORNERS: [[[f32; 3]; 4]; 6] = [
    // Up
    [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
    // Down
    [[0.0, 0.0, 1.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0]],
    // North
    [[1.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    // South
    [[0.0, 1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0]],
    // West
    [[0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0]],
    // East
    [[1.0, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
];

const FACE_UV: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];

const CROSS_QUADS: [[[f32; 3]; 4]; 2] = [
    [[0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0]],
    [[0.0, 1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]],
];

const WHITE: [u8; 3] = [255, 255, 255];

/// A renderable model: appends its geometry for the cell `(x, y, z)` to `buf` and advances
/// `counter` by the element count it emitted.
pub trait RenderModel {
    fn render(
        &self,
        x: i32,
        y: i32,
        z: i32,
        snap: &BlockSnapshot,
        buf: &mut Vec<ChunkVertex>,
        counter: &mut u32,
    );
}

impl RenderModel for Variant {
    fn render(
        &self,
        x: i32,
        y: i32,
        z: i32,
        snap: &BlockSnapshot,
        buf: &mut Vec<ChunkVertex>,
        counter: &mut u32,
    ) {
        match self.kind {
            ModelKind::Cube => render_cube(self, x, y, z, snap, buf, counter),
            ModelKind::Cross => render_cross(self, x, y, z, snap, buf, counter),
        }
    }
}

fn render_cube(
    variant: &Variant,
    x: i32,
    y: i32,
    z: i32,
    snap: &BlockSnapshot,
    buf: &mut Vec<ChunkVertex>,
    counter: &mut u32,
) {
    let this = snap.block(x, y, z);
    let translucent = snap.registry().block_type(this).is_translucent();
    for face in Direction::ALL {
        let (dx, dy, dz) = face.offset();
        let (nx, ny, nz) = (x + dx, y + dy, z + dz);
        let nb = snap.block(nx, ny, nz);
        if snap.registry().block_type(nb).should_cull_against() || (translucent && nb.id == this.id)
        {
            continue;
        }
        let corners = FACE_CORNERS[face.index()];
        let lights = corners.map(|c| corner_light(snap, (x, y, z), face, c));
        push_quad(
            buf,
            counter,
            [x as f32, y as f32, z as f32],
            &corners,
            &FACE_UV,
            variant.texture(face),
            variant.tint,
            lights,
        );
    }
}

fn render_cross(
    variant: &Variant,
    x: i32,
    y: i32,
    z: i32,
    snap: &BlockSnapshot,
    buf: &mut Vec<ChunkVertex>,
    counter: &mut u32,
) {
    let light = (
        scale_light(u32::from(snap.block_light(x, y, z)), 1),
        scale_light(u32::from(snap.sky_light(x, y, z)), 1),
    );
    for quad in &CROSS_QUADS {
        push_quad(
            buf,
            counter,
            [x as f32, y as f32, z as f32],
            quad,
            &FACE_UV,
            variant.texture(Direction::Up),
            variant.tint,
            [light; 4],
        );
    }
}

/// Emits a liquid cell. The surface sits at the level-derived height unless the same
/// liquid continues above; faces against the same liquid or a `cull_against` block are
/// skipped.
pub fn render_liquid(
    liquid: &Liquid,
    snap: &BlockSnapshot,
    x: i32,
    y: i32,
    z: i32,
    buf: &mut Vec<ChunkVertex>,
    counter: &mut u32,
) {
    let this = snap.block(x, y, z);
    let covered = snap.block(x, y + 1, z).id == this.id;
    let top = if covered {
        1.0
    } else {
        Liquid::surface_height(this.state)
    };
    for face in Direction::ALL {
        let (dx, dy, dz) = face.offset();
        let nb = snap.block(x + dx, y + dy, z + dz);
        if nb.id == this.id || snap.registry().block_type(nb).should_cull_against() {
            continue;
        }
        let full = FACE_CORNERS[face.index()];
        let mut corners = full;
        let mut uv = FACE_UV;
        for (c, t) in corners.iter_mut().zip(uv.iter_mut()) {
            if c[1] > 0.5 {
                c[1] = top;
            }
            if !matches!(face, Direction::Up | Direction::Down) {
                t[1] = 1.0 - c[1];
            }
        }
        // Light is sampled at the full-cell corner; a low surface still lights from above.
        let lights = full.map(|c| corner_light(snap, (x, y, z), face, c));
        push_quad(
            buf,
            counter,
            [x as f32, y as f32, z as f32],
            &corners,
            &uv,
            liquid.texture,
            WHITE,
            lights,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn push_quad(
    buf: &mut Vec<ChunkVertex>,
    counter: &mut u32,
    origin: [f32; 3],
    corners: &[[f32; 3]; 4],
    uv: &[[f32; 2]; 4],
    tex: TextureRegion,
    tint: [u8; 3],
    lights: [(u16, u16); 4],
) {
    for i in 0..4 {
        let c = corners[i];
        let mut v = ChunkVertex::new([origin[0] + c[0], origin[1] + c[1], origin[2] + c[2]]);
        v.tx = tex.x;
        v.ty = tex.y;
        v.tw = tex.w;
        v.th = tex.h;
        v.tatlas = tex.atlas;
        v.toffset_x = (uv[i][0] * f32::from(tex.w)).round() as i16;
        v.toffset_y = (uv[i][1] * f32::from(tex.h)).round() as i16;
        v.r = tint[0];
        v.g = tint[1];
        v.b = tint[2];
        v.block_light = lights[i].0;
        v.sky_light = lights[i].1;
        buf.push(v);
    }
    *counter += ELEMENTS_PER_QUAD;
}

// Smooth light for one face corner: the average over the cell in front of the face and
// the up-to-three cells sharing the corner in that plane, skipping cull-against cells.
fn corner_light(
    snap: &BlockSnapshot,
    cell: (i32, i32, i32),
    face: Direction,
    corner: [f32; 3],
) -> (u16, u16) {
    let (dx, dy, dz) = face.offset();
    let front = [cell.0 + dx, cell.1 + dy, cell.2 + dz];
    let normal = [dx, dy, dz];
    let mut steps = [[0i32; 3]; 2];
    let mut k = 0;
    for axis in 0..3 {
        if normal[axis] == 0 {
            steps[k][axis] = if corner[axis] > 0.5 { 1 } else { -1 };
            k += 1;
        }
    }
    let (a, b) = (steps[0], steps[1]);
    let samples = [
        front,
        add(front, a),
        add(front, b),
        add(add(front, a), b),
    ];
    let (mut block, mut sky, mut count) = (0u32, 0u32, 0u32);
    for (i, p) in samples.iter().enumerate() {
        if i > 0 && snap.block_type(p[0], p[1], p[2]).should_cull_against() {
            continue;
        }
        block += u32::from(snap.block_light(p[0], p[1], p[2]));
        sky += u32::from(snap.sky_light(p[0], p[1], p[2]));
        count += 1;
    }
    (scale_light(block, count), scale_light(sky, count))
}

#[inline]
fn add(p: [i32; 3], d: [i32; 3]) -> [i32; 3] {
    [p[0] + d[0], p[1] + d[1], p[2] + d[2]]
}

// Maps the mean of `count` light levels onto the full u16 range.
#[inline]
fn scale_light(sum: u32, count: u32) -> u16 {
    let max = u32::from(MAX_LIGHT) * count.max(1);
    (sum.min(max) * u32::from(u16::MAX) / max) as u16
}
