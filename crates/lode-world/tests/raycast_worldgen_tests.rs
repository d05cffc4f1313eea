use lode_blocks::{AIR, BlockRegistry};
use lode_chunk::{ChunkCoord, VoxelBuf};
use lode_geom::Vec3;
use lode_world::worldgen::{Mode, WorldGenConfig, generator_from_config};
use lode_world::{FlatGenerator, NoiseGenerator, TerrainGenerator, raycast_first_hit};

const BLOCKS: &str = r#"
    [[blocks]]
    name = "stone"

    [[blocks]]
    name = "dirt"

    [[blocks]]
    name = "grass"
"#;

#[test]
fn ray_down_hits_ground_from_above() {
    let hit = raycast_first_hit(
        Vec3::new(4.5, 12.5, 4.5),
        Vec3::new(0.0, -1.0, 0.0),
        20.0,
        |_, y, _| y < 8,
    )
    .unwrap();
    assert_eq!(hit.block, (4, 7, 4));
    assert_eq!(hit.previous, (4, 8, 4));
    assert_eq!(hit.normal, (0, 1, 0));
}

#[test]
fn ray_sideways_reports_entry_face() {
    let hit = raycast_first_hit(
        Vec3::new(0.5, 0.5, 0.5),
        Vec3::new(-1.0, 0.0, 0.0),
        10.0,
        |x, _, _| x == -3,
    )
    .unwrap();
    assert_eq!(hit.block, (-3, 0, 0));
    assert_eq!(hit.previous, (-2, 0, 0));
    assert_eq!(hit.normal, (1, 0, 0));
}

#[test]
fn ray_misses_beyond_range_or_without_direction() {
    let solid = |_: i32, y: i32, _: i32| y < 0;
    assert!(raycast_first_hit(Vec3::new(0.5, 10.5, 0.5), Vec3::new(0.0, -1.0, 0.0), 5.0, solid).is_none());
    assert!(raycast_first_hit(Vec3::new(0.5, 10.5, 0.5), Vec3::ZERO, 50.0, solid).is_none());
}

#[test]
fn flat_generator_fills_below_ground() {
    let g = FlatGenerator { ground: 8, block: 1 };
    let mut low = VoxelBuf::new(ChunkCoord::new(3, 0, -2));
    g.generate(&mut low);
    assert_eq!(low.get_local(5, 7, 5).block, 1);
    assert_eq!(low.get_local(5, 8, 5).block, AIR);

    let mut high = VoxelBuf::new(ChunkCoord::new(0, 1, 0));
    g.generate(&mut high);
    assert!(!high.has_non_air());
}

#[test]
fn noise_terrain_is_layered_and_deterministic() {
    let reg = BlockRegistry::from_toml_str(BLOCKS).unwrap();
    let cfg = WorldGenConfig::default();
    let g = NoiseGenerator::new(&cfg, &reg, 1337, 64).unwrap();
    let coord = ChunkCoord::new(2, 0, -1);
    let mut a = VoxelBuf::new(coord);
    let mut b = VoxelBuf::new(coord);
    g.generate(&mut a);
    g.generate(&mut b);
    assert_eq!(a, b);

    let (ox, _, oz) = coord.origin();
    let top = g.surface_y(ox + 3, oz + 9);
    assert!((9..=28).contains(&top));
    if top < 16 {
        assert_eq!(a.get_local(3, top as usize, 9).block, reg.id_by_name("grass").unwrap());
        assert_eq!(a.get_local(3, (top - 1) as usize, 9).block, reg.id_by_name("dirt").unwrap());
    }
    assert_eq!(a.get_local(3, 0, 9).block, reg.id_by_name("stone").unwrap());
}

#[test]
fn config_parses_and_rejects_unknown_blocks() {
    let reg = BlockRegistry::from_toml_str(BLOCKS).unwrap();
    let cfg: WorldGenConfig = toml::from_str("mode = \"flat\"\n[flat]\nground = 4\nblock = \"dirt\"\n").unwrap();
    assert_eq!(cfg.mode, Mode::Flat);
    assert!(generator_from_config(&cfg, &reg, 0, 64).is_ok());

    let bad: WorldGenConfig = toml::from_str("[surface]\ntop = \"snow\"\n").unwrap();
    assert!(generator_from_config(&bad, &reg, 0, 64).is_err());
}
