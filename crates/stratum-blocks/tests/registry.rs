use proptest::prelude::*;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stratum_blocks::{BlockRegistry, ModelSet, RegistryError, TextureRegion, Variant};

#[test]
fn first_block_must_be_air() {
    let err = BlockRegistry::from_toml_str(
        r#"
        [[blocks]]
        name = "stone"
    "#,
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::MissingAir(name) if name == "stone"));
}

#[test]
fn duplicate_names_are_rejected() {
    let err = BlockRegistry::from_toml_str(
        r#"
        [[blocks]]
        name = "air"
        [[blocks]]
        name = "air"
    "#,
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateName(_)));
}

#[test]
fn unknown_texture_is_reported_with_block_name() {
    let err = BlockRegistry::from_toml_str(
        r#"
        [[blocks]]
        name = "air"
        [[blocks]]
        name = "stone"
        models = [{ all = "missing" }]
    "#,
    )
    .unwrap_err();
    match err {
        RegistryError::UnknownTexture { block, texture } => {
            assert_eq!(block, "stone");
            assert_eq!(texture, "missing");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = BlockRegistry::from_toml_str("[[blocks]\nname = ").unwrap_err();
    assert!(matches!(err, RegistryError::Parse(_)));
}

#[test]
fn builtin_capabilities_match_the_table() {
    let reg = BlockRegistry::builtin().unwrap();
    let leaves = reg.block_type(reg.block("leaves").unwrap());
    assert!(!leaves.should_cull_against());
    assert!(!leaves.is_translucent());
    let flower = reg.block_type(reg.block("flower").unwrap());
    assert_eq!(flower.models().variants().len(), 2);
    assert!(!flower.should_cull_against());
    let lava = reg.block_type(reg.block("lava").unwrap());
    assert!(lava.is_liquid() && !lava.is_translucent());
}

proptest! {
    // select_model advances the stream by exactly one draw for any weight layout
    #[test]
    fn select_model_draws_once(seed in any::<u64>(), weights in proptest::collection::vec(0u32..8, 0..5)) {
        let variants = weights
            .iter()
            .map(|&w| {
                let mut v = Variant::cube(TextureRegion::default());
                v.weight = w;
                v
            })
            .collect();
        let set = ModelSet::new(variants);
        let mut a = ChaCha8Rng::seed_from_u64(seed);
        let mut b = ChaCha8Rng::seed_from_u64(seed);
        let picked = set.select_model(&mut a);
        prop_assert_eq!(picked.is_some(), !weights.is_empty());
        b.next_u32();
        prop_assert_eq!(a.next_u64(), b.next_u64());
    }
}
