use lode_geom::Vec3;

/// First solid voxel along a ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RayHit {
    /// The solid voxel.
    pub block: (i32, i32, i32),
    /// The empty cell the ray crossed just before `block`; where a placed block goes.
    pub previous: (i32, i32, i32),
    /// Unit normal of the face the ray entered through; zero if it started inside.
    pub normal: (i32, i32, i32),
}

const MAX_STEPS: usize = 512;

#[inline]
fn inv_or_max(v: f32) -> f32 {
    if v.abs() < 1e-8 { f32::MAX } else { 1.0 / v.abs() }
}

#[inline]
fn step_of(v: f32) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Walks voxel cells from `origin` along `dir` (3D DDA) until `is_solid` accepts one
/// or `max_dist` is exceeded.
pub fn raycast_first_hit<F>(origin: Vec3, dir: Vec3, max_dist: f32, mut is_solid: F) -> Option<RayHit>
where
    F: FnMut(i32, i32, i32) -> bool,
{
    let d = dir.try_normalized()?;
    let (mut vx, mut vy, mut vz) = origin.voxel();
    let step = (step_of(d.x), step_of(d.y), step_of(d.z));
    let inv = (inv_or_max(d.x), inv_or_max(d.y), inv_or_max(d.z));
    let delta = (
        if step.0 == 0 { f32::MAX } else { inv.0 },
        if step.1 == 0 { f32::MAX } else { inv.1 },
        if step.2 == 0 { f32::MAX } else { inv.2 },
    );
    let first = |o: f32, s: i32, inv: f32| {
        let f = o - o.floor();
        match s {
            1 => (1.0 - f) * inv,
            -1 => f * inv,
            _ => f32::MAX,
        }
    };
    let mut tmx = first(origin.x, step.0, inv.0);
    let mut tmy = first(origin.y, step.1, inv.1);
    let mut tmz = first(origin.z, step.2, inv.2);

    let mut prev = (vx, vy, vz);
    let mut normal = (0, 0, 0);
    let mut t = 0.0f32;

    for _ in 0..MAX_STEPS {
        if t > max_dist {
            break;
        }
        if is_solid(vx, vy, vz) {
            return Some(RayHit {
                block: (vx, vy, vz),
                previous: prev,
                normal,
            });
        }
        prev = (vx, vy, vz);
        if tmx < tmy && tmx < tmz {
            vx += step.0;
            t = tmx;
            tmx += delta.0;
            normal = (-step.0, 0, 0);
        } else if tmy < tmz {
            vy += step.1;
            t = tmy;
            tmy += delta.1;
            normal = (0, -step.1, 0);
        } else {
            vz += step.2;
            t = tmz;
            tmz += delta.2;
            normal = (0, 0, -step.2);
        }
    }
    None
}
