use lode_blocks::config::{BlockDef, BlocksConfig};
use lode_blocks::{AIR, BlockRegistry, BlocksError, Light, LightChannel, LightColor};
use proptest::prelude::*;

const TABLE: &str = r#"
    [[blocks]]
    name = "stone"
    sprites = "stone"

    [[blocks]]
    name = "grass"
    sprites = { top = "grass_top", bottom = "dirt", side = "grass_side" }

    [[blocks]]
    name = "glass"
    transparent = true
    sprites = "glass"

    [[blocks]]
    name = "water"
    solid = false
    transparent = true
    absorption = 2

    [[blocks]]
    name = "lamp"
    emission = { r = 14, g = 9 }
    sprites = "lamp"
"#;

#[test]
fn parses_table_and_assigns_sequential_ids() {
    let reg = BlockRegistry::from_toml_str(TABLE).expect("registry");
    assert_eq!(reg.len(), 6);
    assert_eq!(reg.id_by_name("air"), Some(AIR));
    assert_eq!(reg.id_by_name("stone"), Some(1));
    assert_eq!(reg.id_by_name("lamp"), Some(5));

    let air = reg.descriptor(AIR);
    assert!(!air.solid && air.transparent && air.absorption == 0);

    let stone = reg.descriptor(1);
    assert!(stone.solid && !stone.transparent);

    let water = reg.descriptor(4);
    assert!(!water.solid && water.transparent);
    assert_eq!(water.absorption, 2);

    let lamp = reg.descriptor(5);
    assert_eq!(lamp.emission, LightColor { r: 14, g: 9, b: 0 });
}

#[test]
fn face_sprites_resolve_through_side_and_all() {
    let reg = BlockRegistry::from_toml_str(TABLE).unwrap();
    let grass = reg.descriptor(reg.id_by_name("grass").unwrap());
    let top = reg.atlas.id("grass_top").unwrap();
    let side = reg.atlas.id("grass_side").unwrap();
    let dirt = reg.atlas.id("dirt").unwrap();
    assert_eq!(grass.sprites.top, top);
    assert_eq!(grass.sprites.bottom, dirt);
    assert_eq!(grass.sprites.right, side);
    assert_eq!(grass.sprites.back, side);
    assert_eq!(reg.descriptor(AIR).sprites.top, 0);
    // stone, grass_side, grass_top, dirt, glass, lamp
    assert_eq!(reg.atlas.len(), 6);
}

#[test]
fn absorption_and_emission_are_clamped() {
    let reg = BlockRegistry::from_toml_str(
        r#"
        [[blocks]]
        name = "fog"
        transparent = true
        absorption = 40
        emission = { r = 99, g = 3, b = 16 }
    "#,
    )
    .unwrap();
    let fog = reg.descriptor(1);
    assert_eq!(fog.absorption, 15);
    assert_eq!(fog.emission, LightColor { r: 15, g: 3, b: 15 });
}

#[test]
fn unknown_ids_read_as_opaque() {
    let reg = BlockRegistry::from_toml_str(TABLE).unwrap();
    assert!(reg.get(999).is_none());
    assert!(!reg.is_transparent(999));
    assert!(reg.is_solid(999));
}

#[test]
fn explicit_ids_leave_opaque_gaps() {
    let mut far = BlockDef::named("far");
    far.id = Some(4);
    let reg = BlockRegistry::from_config(BlocksConfig { blocks: vec![far] }).unwrap();
    assert_eq!(reg.len(), 5);
    assert!(reg.descriptor(2).solid);
    assert_eq!(reg.id_by_name("far"), Some(4));
}

#[test]
fn solid_block_cannot_take_air_id() {
    let mut rock = BlockDef::named("rock");
    rock.id = Some(0);
    let err = BlockRegistry::from_config(BlocksConfig { blocks: vec![rock] }).unwrap_err();
    assert!(matches!(err, BlocksError::ReservedAir(name) if name == "rock"));
}

#[test]
fn explicit_air_definition_is_accepted() {
    let mut air = BlockDef::named("air");
    air.solid = Some(false);
    air.transparent = Some(true);
    let reg = BlockRegistry::from_config(BlocksConfig { blocks: vec![air, BlockDef::named("stone")] }).unwrap();
    assert_eq!(reg.id_by_name("air"), Some(0));
    assert_eq!(reg.id_by_name("stone"), Some(1));
}

#[test]
fn duplicate_ids_and_names_are_rejected() {
    let mut a = BlockDef::named("a");
    a.id = Some(3);
    let mut b = BlockDef::named("b");
    b.id = Some(3);
    let err = BlockRegistry::from_config(BlocksConfig { blocks: vec![a, b] }).unwrap_err();
    assert!(matches!(err, BlocksError::DuplicateId { id: 3, .. }));

    let err = BlockRegistry::from_config(BlocksConfig {
        blocks: vec![BlockDef::named("a"), BlockDef::named("a")],
    })
    .unwrap_err();
    assert!(matches!(err, BlocksError::DuplicateName(name) if name == "a"));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = BlockRegistry::from_toml_str("[[blocks]]\nname = 3").unwrap_err();
    assert!(matches!(err, BlocksError::Parse(_)));
}

fn channel() -> impl Strategy<Value = LightChannel> {
    prop_oneof![
        Just(LightChannel::Red),
        Just(LightChannel::Green),
        Just(LightChannel::Blue),
        Just(LightChannel::Sun),
    ]
}

proptest! {
    // Setting one channel never disturbs the other three
    #[test]
    fn light_channels_are_independent(raw in any::<u16>(), ch in channel(), level in 0u8..=15) {
        let before = Light(raw);
        let mut after = before;
        after.set(ch, level);
        prop_assert_eq!(after.get(ch), level);
        for other in LightChannel::ALL {
            if other != ch {
                prop_assert_eq!(after.get(other), before.get(other));
            }
        }
    }

    // Out-of-range levels saturate at the 4-bit maximum
    #[test]
    fn light_set_saturates(ch in channel(), level in 16u8..=255) {
        let l = Light::default().with(ch, level);
        prop_assert_eq!(l.get(ch), Light::MAX);
    }
}
