//! Dirty bits translation for custom sprim types.

use hydra_scene::core::{DataSourceLocator, DataSourceLocatorSet};
use hydra_scene::tracker::dirty_bits::{ALL_DIRTY, CLEAN, CUSTOM_BITS_BEGIN};
use hydra_scene::tracker::{
    register_translators_for_custom_sprim_type, sprim_dirty_bits_to_locator_set,
    sprim_locator_set_to_dirty_bits, DirtyBits,
};
use hydra_scene::util::Token;

const DIRTY_PROTEIN: DirtyBits = CUSTOM_BITS_BEGIN;
const DIRTY_TORTILLA: DirtyBits = CUSTOM_BITS_BEGIN << 1;
const DIRTY_SALSA: DirtyBits = CUSTOM_BITS_BEGIN << 2;

const FILLINGS: [(&str, DirtyBits); 3] = [
    ("protein", DIRTY_PROTEIN),
    ("tortilla", DIRTY_TORTILLA),
    ("salsa", DIRTY_SALSA),
];

fn taco_to_bits(set: &DataSourceLocatorSet) -> DirtyBits {
    FILLINGS
        .iter()
        .filter(|(name, _)| set.intersects(&DataSourceLocator::parse(name)))
        .fold(CLEAN, |bits, (_, bit)| bits | bit)
}

fn taco_to_locators(bits: DirtyBits) -> DataSourceLocatorSet {
    FILLINGS
        .iter()
        .filter(|(_, bit)| bits & bit != 0)
        .map(|(name, _)| DataSourceLocator::parse(name))
        .collect()
}

fn set(locators: &[&str]) -> DataSourceLocatorSet {
    locators.iter().map(|s| DataSourceLocator::parse(s)).collect()
}

#[test]
fn test_custom_sprim_translators() {
    let taco = Token::new("taco");
    register_translators_for_custom_sprim_type("taco", taco_to_bits, taco_to_locators);

    assert_eq!(
        sprim_locator_set_to_dirty_bits(&taco, &set(&["protein"])),
        DIRTY_PROTEIN
    );
    assert_eq!(
        sprim_locator_set_to_dirty_bits(&taco, &set(&["salsa.spicy", "tortilla"])),
        DIRTY_TORTILLA | DIRTY_SALSA
    );
    assert_eq!(sprim_locator_set_to_dirty_bits(&taco, &set(&[])), CLEAN);

    let bits = DIRTY_PROTEIN | DIRTY_SALSA;
    let locators = sprim_dirty_bits_to_locator_set(&taco, bits);
    assert_eq!(locators, set(&["protein", "salsa"]));
    assert_eq!(sprim_locator_set_to_dirty_bits(&taco, &locators), bits);
}

#[test]
fn test_unregistered_type_is_all_dirty() {
    let burger = Token::new("burger");
    let bits = sprim_locator_set_to_dirty_bits(&burger, &set(&["protein"]));
    assert_ne!(bits, CLEAN);
    assert_eq!(bits, ALL_DIRTY);
    assert!(sprim_dirty_bits_to_locator_set(&burger, DIRTY_PROTEIN).is_universal());
    assert!(sprim_dirty_bits_to_locator_set(&burger, CLEAN).is_empty());
}
