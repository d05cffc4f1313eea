use lode_geom::{Aabb, Vec3};
use proptest::prelude::*;

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

#[test]
fn voxel_floors_negative_coordinates() {
    assert_eq!(Vec3::new(-0.5, 0.0, 15.99).voxel(), (-1, 0, 15));
    assert_eq!(Vec3::new(-16.0, -16.01, 3.5).voxel(), (-16, -17, 3));
}

#[test]
fn try_normalized_rejects_zero() {
    assert!(Vec3::ZERO.try_normalized().is_none());
    let n = Vec3::new(3.0, 4.0, 0.0).try_normalized().unwrap();
    assert!(approx_eq(n.length(), 1.0, 1e-6));
    assert!(approx_eq(n.x, 0.6, 1e-6));
}

#[test]
fn cross_of_axes_follows_right_hand_rule() {
    let x = Vec3::new(1.0, 0.0, 0.0);
    let z = Vec3::new(0.0, 0.0, 1.0);
    assert_eq!(z.cross(x), Vec3::UP);
    assert_eq!(x.cross(z), -Vec3::UP);
}

#[test]
fn touching_boxes_do_not_intersect() {
    let a = Aabb::voxel(0, 0, 0);
    let b = Aabb::voxel(1, 0, 0);
    assert!(!a.intersects(&b));
    assert!(a.intersects(&Aabb::voxel(0, 0, 0)));
}

#[test]
fn player_box_overlaps_feet_and_head_cells() {
    let player = Aabb::from_center_extents(Vec3::new(0.5, 1.0, 0.5), Vec3::new(0.3, 0.9, 0.3));
    assert!(player.intersects_voxel(0, 0, 0));
    assert!(player.intersects_voxel(0, 1, 0));
    assert!(!player.intersects_voxel(0, 2, 0));
    assert!(!player.intersects_voxel(1, 0, 0));
}

proptest! {
    // Intersection is symmetric for arbitrary voxel pairs
    #[test]
    fn voxel_intersection_is_symmetric(a in (-64i32..64, -64i32..64, -64i32..64), b in (-64i32..64, -64i32..64, -64i32..64)) {
        let ba = Aabb::voxel(a.0, a.1, a.2);
        let bb = Aabb::voxel(b.0, b.1, b.2);
        prop_assert_eq!(ba.intersects(&bb), bb.intersects(&ba));
        prop_assert_eq!(ba.intersects(&bb), a == b);
    }

    // A point always lies inside the voxel it floors to
    #[test]
    fn point_lies_in_its_voxel(x in -1000.0f32..1000.0, y in -1000.0f32..1000.0, z in -1000.0f32..1000.0) {
        let (vx, vy, vz) = Vec3::new(x, y, z).voxel();
        prop_assert!(vx as f32 <= x && x < vx as f32 + 1.0);
        prop_assert!(vy as f32 <= y && y < vy as f32 + 1.0);
        prop_assert!(vz as f32 <= z && z < vz as f32 + 1.0);
    }
}
