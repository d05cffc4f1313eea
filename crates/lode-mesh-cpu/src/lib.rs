//! CPU chunk mesher: face culling with per-corner light and ambient occlusion.
#![forbid(unsafe_code)]

mod face;
mod mesh;
mod neighborhood;
mod vertex;

pub use face::Face;
pub use mesh::ChunkMesh;
pub use neighborhood::Neighborhood;
pub use vertex::{MAX_CORNER_LIGHT, MAX_SPRITE, PackedVertex};

use lode_blocks::{AIR, BlockRegistry, LightChannel, Voxel};
use lode_chunk::CHUNK_SIZE_I32;

/// A neighbor sample: cells outside the world are dark and opaque.
#[derive(Copy, Clone)]
struct Sample {
    light: [u8; 4],
    opaque: bool,
}

impl Sample {
    #[inline]
    fn of(v: Option<Voxel>, reg: &BlockRegistry) -> Sample {
        match v {
            Some(v) => Sample {
                light: LightChannel::ALL.map(|ch| v.light.get(ch)),
                opaque: !reg.is_transparent(v.block),
            },
            None => Sample {
                light: [0; 4],
                opaque: true,
            },
        }
    }
}

/// Summed light at one face corner.
///
/// `center` is the cell the face looks into; `side_a`/`side_b` flank the
/// corner and `diagonal` sits between them. When both flanking cells are
/// opaque the corner is fully occluded and only the center counts.
#[inline]
fn corner_light(center: Sample, side_a: Sample, side_b: Sample, diagonal: Sample) -> [u8; 4] {
    if side_a.opaque && side_b.opaque {
        return center.light;
    }
    std::array::from_fn(|c| center.light[c] + side_a.light[c] + side_b.light[c] + diagonal.light[c])
}

#[inline]
fn brightness(light: [u8; 4]) -> u32 {
    light.iter().map(|&l| u32::from(l)).sum()
}

/// Builds the mesh of the neighborhood's center chunk.
///
/// A face is emitted where the voxel across it is transparent and a different
/// block; faces toward cells outside the world are culled.
pub fn build_chunk_mesh(nb: &Neighborhood, reg: &BlockRegistry) -> ChunkMesh {
    let mut mesh = ChunkMesh::new(nb.center());
    let Some(buf) = nb.center_buf() else {
        return mesh;
    };
    if !buf.has_non_air() {
        return mesh;
    }
    mesh.reserve_quads(256);

    for z in 0..CHUNK_SIZE_I32 {
        for y in 0..CHUNK_SIZE_I32 {
            for x in 0..CHUNK_SIZE_I32 {
                let v = buf.get_local(x as usize, y as usize, z as usize);
                if v.block == AIR {
                    continue;
                }
                let desc = reg.descriptor(v.block);
                for face in Face::ALL {
                    let (dx, dy, dz) = face.delta();
                    let (ox, oy, oz) = (x + dx, y + dy, z + dz);
                    let Some(across) = nb.voxel(ox, oy, oz) else {
                        continue;
                    };
                    if !reg.is_transparent(across.block) || across.block == v.block {
                        continue;
                    }

                    let center = Sample::of(Some(across), reg);
                    let sample = |sx: i32, sy: i32, sz: i32| Sample::of(nb.voxel(sx, sy, sz), reg);
                    let sprite = face.sprite(&desc.sprites);
                    let mut lights = [[0u8; 4]; 4];
                    let corners = face.corners(x, y, z);
                    for (i, &(cx, cy, cz)) in corners.iter().enumerate() {
                        // Step from the outward cell toward this corner along both face tangents.
                        let step = |c: i32, o: i32| if c > o { 1 } else { -1 };
                        let (ta, tb) = match face {
                            Face::PosX | Face::NegX => ((0, step(cy, oy), 0), (0, 0, step(cz, oz))),
                            Face::PosY | Face::NegY => ((step(cx, ox), 0, 0), (0, 0, step(cz, oz))),
                            Face::PosZ | Face::NegZ => ((step(cx, ox), 0, 0), (0, step(cy, oy), 0)),
                        };
                        let side_a = sample(ox + ta.0, oy + ta.1, oz + ta.2);
                        let side_b = sample(ox + tb.0, oy + tb.1, oz + tb.2);
                        let diagonal = sample(
                            ox + ta.0 + tb.0,
                            oy + ta.1 + tb.1,
                            oz + ta.2 + tb.2,
                        );
                        lights[i] = corner_light(center, side_a, side_b, diagonal);
                    }

                    let flip = brightness(lights[1]) + brightness(lights[3])
                        > brightness(lights[0]) + brightness(lights[2]);
                    let quad: [PackedVertex; 4] = std::array::from_fn(|i| {
                        let (cx, cy, cz) = corners[i];
                        PackedVertex::new(
                            (cx as u32, cy as u32, cz as u32),
                            face,
                            i as u32,
                            sprite,
                            lights[i],
                        )
                    });
                    mesh.push_quad(quad, flip, desc.transparent);
                }
            }
        }
    }
    log::trace!(
        target: "mesh",
        "meshed {:?}: {} quads ({} opaque idx, {} transparent idx)",
        mesh.coord,
        mesh.quad_count(),
        mesh.opaque.len(),
        mesh.transparent.len()
    );
    mesh
}
