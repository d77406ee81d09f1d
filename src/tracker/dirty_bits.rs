//! Translation between locator sets and flat dirty bitmasks.
//!
//! Consumers that still track change as per-prim bitmasks get their bits
//! from here. Rprims and cameras have built-in tables; other sprim types
//! register translator pairs at runtime. A type with no translator maps any
//! non-empty change to [`ALL_DIRTY`]: an unknown change is never reported
//! as clean.

use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::core::{DataSourceLocator, DataSourceLocatorSet};
use crate::util::Token;

/// Flat per-prim change mask.
pub type DirtyBits = u32;

// ============================================================================
// Rprim bits
// ============================================================================

pub const CLEAN: DirtyBits = 0;
pub const INIT_REPR: DirtyBits = 1 << 0;
pub const VARYING: DirtyBits = 1 << 1;
/// Everything except the varying marker.
pub const ALL_DIRTY: DirtyBits = !VARYING;
pub const DIRTY_PRIM_ID: DirtyBits = 1 << 2;
pub const DIRTY_EXTENT: DirtyBits = 1 << 3;
pub const DIRTY_DISPLAY_STYLE: DirtyBits = 1 << 4;
pub const DIRTY_POINTS: DirtyBits = 1 << 5;
pub const DIRTY_PRIMVAR: DirtyBits = 1 << 6;
pub const DIRTY_MATERIAL_ID: DirtyBits = 1 << 7;
pub const DIRTY_TOPOLOGY: DirtyBits = 1 << 8;
pub const DIRTY_TRANSFORM: DirtyBits = 1 << 9;
pub const DIRTY_VISIBILITY: DirtyBits = 1 << 10;
pub const DIRTY_NORMALS: DirtyBits = 1 << 11;
pub const DIRTY_DOUBLE_SIDED: DirtyBits = 1 << 12;
pub const DIRTY_CULL_STYLE: DirtyBits = 1 << 13;
pub const DIRTY_SUBDIV_TAGS: DirtyBits = 1 << 14;
pub const DIRTY_WIDTHS: DirtyBits = 1 << 15;
pub const DIRTY_INSTANCER: DirtyBits = 1 << 16;
pub const DIRTY_INSTANCE_INDEX: DirtyBits = 1 << 17;
pub const DIRTY_REPR: DirtyBits = 1 << 18;
pub const DIRTY_RENDER_TAG: DirtyBits = 1 << 19;
/// Union of every scene-derived rprim bit.
pub const ALL_SCENE_DIRTY_BITS: DirtyBits = (1 << 20) - 1;
/// First bit free for custom translators.
pub const CUSTOM_BITS_BEGIN: DirtyBits = 1 << 24;

/// Camera sprim bits.
pub mod camera_bits {
    use super::DirtyBits;

    pub const DIRTY_TRANSFORM: DirtyBits = 1 << 0;
    pub const DIRTY_PARAMS: DirtyBits = 1 << 1;
    pub const DIRTY_CLIP_PLANES: DirtyBits = 1 << 2;
    pub const DIRTY_WINDOW_POLICY: DirtyBits = 1 << 3;
    pub const ALL_DIRTY: DirtyBits = (1 << 4) - 1;
}

/// Locator set → bits.
pub type LocatorSetToDirtyBitsFn = fn(&DataSourceLocatorSet) -> DirtyBits;
/// Bits → locator set.
pub type DirtyBitsToLocatorSetFn = fn(DirtyBits) -> DataSourceLocatorSet;

#[derive(Clone, Copy)]
struct Translators {
    to_bits: LocatorSetToDirtyBitsFn,
    to_locators: DirtyBitsToLocatorSetFn,
}

static CUSTOM_SPRIM_TRANSLATORS: RwLock<BTreeMap<Token, Translators>> =
    parking_lot::const_rwlock(BTreeMap::new());

/// Register translators for a custom sprim type.
///
/// Registering the same type again replaces the earlier pair.
pub fn register_translators_for_custom_sprim_type(
    prim_type: impl Into<Token>,
    to_bits: LocatorSetToDirtyBitsFn,
    to_locators: DirtyBitsToLocatorSetFn,
) {
    let prim_type = prim_type.into();
    tracing::debug!(%prim_type, "registering dirty bits translators");
    CUSTOM_SPRIM_TRANSLATORS
        .write()
        .insert(prim_type, Translators { to_bits, to_locators });
}

fn custom_translators(prim_type: &Token) -> Option<Translators> {
    CUSTOM_SPRIM_TRANSLATORS.read().get(prim_type).copied()
}

// ============================================================================
// Tables
// ============================================================================

/// Locator prefixes and the bits they stand for, shared by every rprim.
const RPRIM_COMMON: &[(&str, DirtyBits)] = &[
    ("primvars", DIRTY_PRIMVAR),
    ("primvars.points", DIRTY_POINTS),
    ("primvars.normals", DIRTY_NORMALS),
    ("primvars.widths", DIRTY_WIDTHS),
    ("xform", DIRTY_TRANSFORM),
    ("visibility", DIRTY_VISIBILITY),
    ("extent", DIRTY_EXTENT),
    ("materialBindings", DIRTY_MATERIAL_ID),
    ("purpose", DIRTY_RENDER_TAG),
    ("displayStyle", DIRTY_DISPLAY_STYLE | DIRTY_CULL_STYLE | DIRTY_REPR),
    ("instancedBy", DIRTY_INSTANCER | DIRTY_INSTANCE_INDEX),
    ("primId", DIRTY_PRIM_ID),
];

const MESH_TABLE: &[(&str, DirtyBits)] = &[
    ("mesh.topology", DIRTY_TOPOLOGY),
    ("mesh.subdivisionTags", DIRTY_SUBDIV_TAGS),
    ("mesh.subdivisionScheme", DIRTY_TOPOLOGY),
    ("mesh.doubleSided", DIRTY_DOUBLE_SIDED),
];

const BASIS_CURVES_TABLE: &[(&str, DirtyBits)] = &[("basisCurves.topology", DIRTY_TOPOLOGY)];

const CAMERA_TABLE: &[(&str, DirtyBits)] = &[
    ("xform", camera_bits::DIRTY_TRANSFORM),
    ("camera", camera_bits::DIRTY_PARAMS),
    ("camera.clippingRange", camera_bits::DIRTY_CLIP_PLANES),
    ("camera.clippingPlanes", camera_bits::DIRTY_CLIP_PLANES),
    ("camera.windowPolicy", camera_bits::DIRTY_WINDOW_POLICY),
];

fn rprim_type_table(prim_type: &str) -> Option<&'static [(&'static str, DirtyBits)]> {
    match prim_type {
        "mesh" => Some(MESH_TABLE),
        "basisCurves" => Some(BASIS_CURVES_TABLE),
        "points" => Some(&[]),
        _ => None,
    }
}

fn tables_to_bits(set: &DataSourceLocatorSet, tables: &[&[(&str, DirtyBits)]], all: DirtyBits) -> DirtyBits {
    if set.is_universal() {
        return all;
    }
    let mut bits = CLEAN;
    for locator in set {
        for (text, entry_bits) in tables.iter().flat_map(|t| t.iter()) {
            if locator.intersects(&DataSourceLocator::parse(text)) {
                bits |= entry_bits;
            }
        }
    }
    bits
}

fn tables_to_locators(bits: DirtyBits, tables: &[&[(&str, DirtyBits)]], all: DirtyBits) -> DataSourceLocatorSet {
    if bits & all == all {
        return DataSourceLocatorSet::universal();
    }
    tables
        .iter()
        .flat_map(|t| t.iter())
        .filter(|(_, entry_bits)| bits & entry_bits != 0)
        .map(|(text, _)| DataSourceLocator::parse(text))
        .collect()
}

// ============================================================================
// Public translation entry points
// ============================================================================

/// Bits for a change to an rprim of `prim_type`.
pub fn rprim_locator_set_to_dirty_bits(prim_type: &Token, set: &DataSourceLocatorSet) -> DirtyBits {
    if set.is_empty() {
        return CLEAN;
    }
    match rprim_type_table(prim_type) {
        Some(table) => tables_to_bits(set, &[RPRIM_COMMON, table], ALL_DIRTY),
        None => ALL_DIRTY,
    }
}

/// Locators covered by rprim `bits`.
pub fn rprim_dirty_bits_to_locator_set(prim_type: &Token, bits: DirtyBits) -> DataSourceLocatorSet {
    match rprim_type_table(prim_type) {
        Some(table) => tables_to_locators(bits, &[RPRIM_COMMON, table], ALL_SCENE_DIRTY_BITS & !VARYING),
        None if bits != CLEAN => DataSourceLocatorSet::universal(),
        None => DataSourceLocatorSet::new(),
    }
}

/// Bits for a change to an sprim of `prim_type`.
///
/// Unknown types report [`ALL_DIRTY`] for any non-empty set.
pub fn sprim_locator_set_to_dirty_bits(prim_type: &Token, set: &DataSourceLocatorSet) -> DirtyBits {
    if set.is_empty() {
        return CLEAN;
    }
    if prim_type.as_str() == crate::schema::prim_types::CAMERA {
        return tables_to_bits(set, &[CAMERA_TABLE], camera_bits::ALL_DIRTY);
    }
    match custom_translators(prim_type) {
        Some(t) => (t.to_bits)(set),
        None => {
            tracing::trace!(%prim_type, "no dirty bits translator, treating as all dirty");
            ALL_DIRTY
        }
    }
}

/// Locators covered by sprim `bits`.
pub fn sprim_dirty_bits_to_locator_set(prim_type: &Token, bits: DirtyBits) -> DataSourceLocatorSet {
    if prim_type.as_str() == crate::schema::prim_types::CAMERA {
        return tables_to_locators(bits, &[CAMERA_TABLE], camera_bits::ALL_DIRTY);
    }
    match custom_translators(prim_type) {
        Some(t) => (t.to_locators)(bits),
        None if bits != CLEAN => DataSourceLocatorSet::universal(),
        None => DataSourceLocatorSet::new(),
    }
}
