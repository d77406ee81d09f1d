//! Expands pinned cubic curves into equivalent nonperiodic curves.
//!
//! A pinned curve passes through its end points. Renderers that only know
//! nonperiodic curves get the same shape by repeating the end vertices:
//! twice per end for `bspline`, once per end for `catmullRom`. Topology
//! and the affected primvars are rewritten lazily on read.

use std::rc::Rc;
use std::sync::Arc;

use super::{DirtiedPrimEntry, SceneFilter, SceneIndex, SceneIndexHandle, SceneIndexPrim,
    SingleInputFilteringSceneIndex};
use crate::core::{
    retained_value, ContainerDataSourceEditor, ContainerHandle, DataSource, DataSourceLocator,
    SampledDataSource, SampledHandle,
};
use crate::schema::{
    curve_tokens, interpolation, prim_types, BasisCurvesSchema, PrimvarsSchema, Schema,
    CURVE_INDICES, CURVE_VERTEX_COUNTS, INDICES, PRIMVARS, PRIMVAR_VALUE, WRAP,
};
use crate::util::{ScenePath, Time, Value};

/// One source run of an expansion: `len` values starting at `start`, with
/// the first and last value repeated `extra` times on their side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Run {
    start: usize,
    len: usize,
    extra: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct ExpansionPlan {
    runs: Vec<Run>,
}

impl ExpansionPlan {
    /// Per-vertex data: every curve gains `extra` copies at each end.
    fn vertex(counts: &[i32], extra: usize) -> Self {
        let mut start = 0;
        let runs = counts
            .iter()
            .map(|&count| {
                let len = count.max(0) as usize;
                let run = Run { start, len, extra };
                start += len;
                run
            })
            .collect();
        Self { runs }
    }

    /// Per-segment-boundary data: a cubic nonperiodic curve of `n` vertices
    /// carries `n - 2` varying values. A curve with fewer than four authored
    /// vertices still counts as one segment.
    fn varying(counts: &[i32], extra: usize) -> Self {
        let mut start = 0;
        let runs = counts
            .iter()
            .map(|&count| {
                let count = count.max(0) as usize;
                let authored = count.saturating_sub(2).max(2);
                let wanted = (count + 2 * extra).saturating_sub(2);
                let run = Run {
                    start,
                    len: authored,
                    extra: wanted.saturating_sub(authored) / 2,
                };
                start += authored;
                run
            })
            .collect();
        Self { runs }
    }

    fn source_len(&self) -> usize {
        self.runs.iter().map(|r| r.len).sum()
    }

    fn apply<T: Clone>(&self, source: &[T]) -> Option<Vec<T>> {
        if source.len() != self.source_len() {
            return None;
        }
        let mut out = Vec::with_capacity(source.len() + self.runs.len() * 4);
        for run in &self.runs {
            let values = &source[run.start..run.start + run.len];
            let (Some(first), Some(last)) = (values.first(), values.last()) else {
                continue;
            };
            out.extend(std::iter::repeat(first).take(run.extra).cloned());
            out.extend_from_slice(values);
            out.extend(std::iter::repeat(last).take(run.extra).cloned());
        }
        Some(out)
    }

    fn apply_value(&self, value: &Value) -> Option<Value> {
        Some(match value {
            Value::IntArray(v) => Value::IntArray(self.apply(v)?),
            Value::FloatArray(v) => Value::FloatArray(self.apply(v)?),
            Value::DoubleArray(v) => Value::DoubleArray(self.apply(v)?),
            Value::Vec3fArray(v) => Value::Vec3fArray(self.apply(v)?),
            Value::TokenArray(v) => Value::TokenArray(self.apply(v)?),
            _ => return None,
        })
    }
}

/// Sampled array rewritten through an expansion plan on every read.
struct ExpandedValueDataSource {
    input: SampledHandle,
    plan: Arc<ExpansionPlan>,
}

impl SampledDataSource for ExpandedValueDataSource {
    fn value(&self, time: Time) -> Value {
        let value = self.input.value(time);
        match self.plan.apply_value(&value) {
            Some(expanded) => expanded,
            None => {
                tracing::warn!(
                    ty = value.type_name(),
                    len = ?value.array_len(),
                    expected = self.plan.source_len(),
                    "primvar does not match curve topology, left unexpanded"
                );
                value
            }
        }
    }

    fn contributing_sample_times(&self, start: Time, end: Time) -> Option<Vec<Time>> {
        self.input.contributing_sample_times(start, end)
    }
}

fn expanded(input: SampledHandle, plan: &Arc<ExpansionPlan>) -> DataSource {
    DataSource::Sampled(Arc::new(ExpandedValueDataSource {
        input,
        plan: plan.clone(),
    }))
}

/// End vertices added on each side for a pinned cubic basis.
fn extra_for_basis(basis: &str) -> Option<usize> {
    match basis {
        curve_tokens::BSPLINE => Some(2),
        curve_tokens::CATMULL_ROM => Some(1),
        _ => None,
    }
}

/// The filter behind [`PinnedCurveExpandingSceneIndex`].
#[derive(Default)]
pub struct PinnedCurveExpandingFilter;

/// Scene index expanding pinned curves of its input.
pub type PinnedCurveExpandingSceneIndex = SingleInputFilteringSceneIndex<PinnedCurveExpandingFilter>;

impl PinnedCurveExpandingFilter {
    pub fn new_scene_index(input: SceneIndexHandle) -> Rc<PinnedCurveExpandingSceneIndex> {
        SingleInputFilteringSceneIndex::new(input, PinnedCurveExpandingFilter)
    }

    /// Rewrite a `basisCurves` prim container, or `None` when the curves
    /// are not pinned cubics.
    fn expand_prim(prim: &ContainerHandle) -> Option<ContainerHandle> {
        let topology = BasisCurvesSchema::from_parent(prim)?.topology()?;
        if topology.curve_type()?.as_str() != curve_tokens::CUBIC
            || topology.wrap()?.as_str() != curve_tokens::PINNED
        {
            return None;
        }
        let extra = extra_for_basis(topology.basis()?.as_str())?;
        let counts = topology.curve_vertex_counts()?;
        if counts.is_empty() {
            return None;
        }
        let curve_indices = topology.curve_indices().unwrap_or_default();
        let use_curve_indices = !curve_indices.is_empty();

        let vertex_plan = Arc::new(ExpansionPlan::vertex(&counts, extra));
        let varying_plan = Arc::new(ExpansionPlan::varying(&counts, extra));

        let mut topo_editor = ContainerDataSourceEditor::with_initial(topology.container().clone());
        let new_counts: Vec<i32> = counts.iter().map(|c| c + 2 * extra as i32).collect();
        topo_editor.set(&CURVE_VERTEX_COUNTS.into(), Some(retained_value(new_counts)));
        if use_curve_indices {
            match vertex_plan.apply(&curve_indices) {
                Some(indices) => {
                    topo_editor.set(&CURVE_INDICES.into(), Some(retained_value(indices)));
                }
                None => tracing::warn!(
                    len = curve_indices.len(),
                    "curve indices do not match vertex counts"
                ),
            }
        }
        topo_editor.set(&WRAP.into(), Some(retained_value(curve_tokens::NONPERIODIC)));

        let mut editor = ContainerDataSourceEditor::with_initial(prim.clone());
        editor.set(
            &BasisCurvesSchema::topology_locator(),
            Some(DataSource::Container(topo_editor.finish())),
        );

        if let Some(primvars) = PrimvarsSchema::from_parent(prim) {
            for name in primvars.primvar_names() {
                let Some(primvar) = primvars.primvar(&name) else {
                    continue;
                };
                let plan = match primvar.interpolation().as_deref() {
                    Some(interpolation::VERTEX) => &vertex_plan,
                    Some(interpolation::VARYING) => &varying_plan,
                    _ => continue,
                };
                let base = DataSourceLocator::new([PRIMVARS, name.as_str()]);
                if primvar.is_indexed() {
                    if let Some(indices) = primvar.indices() {
                        editor.set(&base.append(INDICES), Some(expanded(indices, plan)));
                    }
                } else if Arc::ptr_eq(plan, &varying_plan) || !use_curve_indices {
                    // Vertex values indexed through curveIndices stay as is.
                    if let Some(values) = primvar.primvar_value() {
                        editor.set(&base.append(PRIMVAR_VALUE), Some(expanded(values, plan)));
                    }
                }
            }
        }
        Some(editor.finish())
    }
}

impl SceneFilter for PinnedCurveExpandingFilter {
    fn name(&self) -> &str {
        "PinnedCurveExpandingSceneIndex"
    }

    fn prim(&self, input: &dyn SceneIndex, path: &ScenePath) -> SceneIndexPrim {
        let mut prim = input.get_prim(path);
        if prim.prim_type.as_str() != prim_types::BASIS_CURVES {
            return prim;
        }
        if let Some(ds) = &prim.data_source {
            if let Some(expanded) = Self::expand_prim(ds) {
                prim.data_source = Some(expanded);
            }
        }
        prim
    }

    fn prims_dirtied(&self, _input: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) -> Vec<DirtiedPrimEntry> {
        let topology = BasisCurvesSchema::topology_locator();
        entries
            .iter()
            .map(|entry| {
                if entry.dirty_locators.intersects(&topology) {
                    let mut entry = entry.clone();
                    entry.dirty_locators.insert(PrimvarsSchema::default_locator());
                    entry
                } else {
                    entry.clone()
                }
            })
            .collect()
    }
}
