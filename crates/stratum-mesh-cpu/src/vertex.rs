use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

/// Interleaved section vertex, laid out exactly as the GPU binding reads it.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ChunkVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub tx: u16,
    pub ty: u16,
    pub tw: u16,
    pub th: u16,
    pub toffset_x: i16,
    pub toffset_y: i16,
    pub tatlas: i16,
    pub pad0: i16,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub pad1: u8,
    pub block_light: u16,
    pub sky_light: u16,
}

const_assert_eq!(std::mem::size_of::<ChunkVertex>(), 36);
const_assert_eq!(std::mem::align_of::<ChunkVertex>(), 4);

impl ChunkVertex {
    /// Vertex with the pad fields at their wire values (0 and 255).
    #[inline]
    pub fn new(pos: [f32; 3]) -> Self {
        Self {
            x: pos[0],
            y: pos[1],
            z: pos[2],
            pad1: 255,
            ..Self::zeroed()
        }
    }

    /// Appends the little-endian encoding of this vertex. The `pad0`/`pad1` fields are
    /// always written as 0 and 255 regardless of their in-memory value.
    pub fn write_le(&self, out: &mut Vec<u8>, stride: VertexStride) {
        out.extend_from_slice(&self.x.to_le_bytes());
        out.extend_from_slice(&self.y.to_le_bytes());
        out.extend_from_slice(&self.z.to_le_bytes());
        out.extend_from_slice(&self.tx.to_le_bytes());
        out.extend_from_slice(&self.ty.to_le_bytes());
        out.extend_from_slice(&self.tw.to_le_bytes());
        out.extend_from_slice(&self.th.to_le_bytes());
        out.extend_from_slice(&self.toffset_x.to_le_bytes());
        out.extend_from_slice(&self.toffset_y.to_le_bytes());
        out.extend_from_slice(&self.tatlas.to_le_bytes());
        out.extend_from_slice(&0i16.to_le_bytes());
        out.extend_from_slice(&[self.r, self.g, self.b, 255]);
        out.extend_from_slice(&self.block_light.to_le_bytes());
        out.extend_from_slice(&self.sky_light.to_le_bytes());
        if stride == VertexStride::Padded40 {
            out.extend_from_slice(&[0; 4]);
        }
    }
}

/// Byte stride of an encoded vertex stream.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum VertexStride {
    /// The 36-byte record.
    #[default]
    Packed36,
    /// The 36-byte record followed by two zero `u16` pads.
    Padded40,
}

impl VertexStride {
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            VertexStride::Packed36 => 36,
            VertexStride::Padded40 => 40,
        }
    }
}

/// Serialises `vertices` for upload, replacing the contents of `out`.
pub fn encode_vertices(vertices: &[ChunkVertex], stride: VertexStride, out: &mut Vec<u8>) {
    out.clear();
    out.reserve(vertices.len() * stride.bytes());
    if cfg!(target_endian = "little") && stride == VertexStride::Packed36 {
        // In-memory layout already matches the wire layout.
        out.extend_from_slice(bytemuck::cast_slice(vertices));
        return;
    }
    for v in vertices {
        v.write_le(out, stride);
    }
}
