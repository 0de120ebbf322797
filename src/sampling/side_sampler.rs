//! Sampling at the quadrature points of boundary sides
use crate::sampling::SamplerOptions;
use crate::traits::{FieldEvaluator, ProcessReduction};
use crate::types::{Face, Result, SampleRecord, SortBy};
use log::debug;
use rayon::prelude::*;

/// Collects field values at the quadrature points of sides
///
/// Each worker fills its own sampler; partial samplers are merged with
/// [`SideValueSampler::thread_join`] and the rows of all processes are combined
/// by [`SideValueSampler::finalize`]. The id of each row is the index of the
/// region the side belongs to.
pub struct SideValueSampler<'a, F: FieldEvaluator> {
    field: &'a F,
    fields: Vec<usize>,
    sort_by: SortBy,
    rows: Vec<SampleRecord<F::T>>,
}

impl<'a, F: FieldEvaluator> SideValueSampler<'a, F> {
    /// Create new
    ///
    /// Rows are sorted by id unless the options name another column.
    pub fn new(field: &'a F, options: &SamplerOptions) -> Result<Self> {
        Ok(Self {
            field,
            fields: options.resolve_fields(field.field_count())?,
            sort_by: options.sort_by().unwrap_or(SortBy::Id),
            rows: vec![],
        })
    }

    /// Sample every quadrature point of a side
    pub fn execute(&mut self, side: &Face<F::T>) {
        let id = num::cast::<usize, F::T>(side.element).unwrap_or_else(num::Float::nan);
        self.rows.reserve(side.npoints());
        for point in &side.points {
            self.rows.push(SampleRecord {
                id,
                point: *point,
                values: self
                    .fields
                    .iter()
                    .map(|f| self.field.value_at(side.element, point, *f))
                    .collect(),
                owners: 1,
            });
        }
    }

    /// Merge the rows collected by another worker
    pub fn thread_join(&mut self, other: Self) {
        self.rows.extend(other.rows);
    }

    /// The rows collected on this process
    pub fn local_rows(&self) -> &[SampleRecord<F::T>] {
        &self.rows
    }

    /// Gather the rows of all processes and sort them
    ///
    /// This is collective: every process must call it.
    pub fn finalize(self, reduction: &impl ProcessReduction) -> Vec<SampleRecord<F::T>> {
        let nvalues = self.fields.len();
        let stride = 4 + nvalues;

        let mut local = Vec::with_capacity(self.rows.len() * stride);
        for row in &self.rows {
            local.push(row.id);
            local.extend_from_slice(&row.point);
            local.extend_from_slice(&row.values);
        }
        let gathered = reduction.all_gather(&local);

        let mut records = gathered
            .chunks(stride)
            .map(|row| SampleRecord {
                id: row[0],
                point: [row[1], row[2], row[3]],
                values: row[4..].to_vec(),
                owners: 1,
            })
            .collect::<Vec<_>>();
        debug!(
            "Gathered {} side samples ({} from rank {})",
            records.len(),
            self.rows.len(),
            reduction.rank()
        );
        self.sort_by.sort(&mut records);
        records
    }
}

/// Sample fields at the quadrature points of `sides` using all worker threads, then gather over all processes
pub fn sample_sides<F: FieldEvaluator>(
    field: &F,
    sides: &[Face<F::T>],
    options: &SamplerOptions,
    reduction: &impl ProcessReduction,
) -> Result<Vec<SampleRecord<F::T>>> {
    // Checks the field list before any thread starts
    let sampler = SideValueSampler::new(field, options)?;
    let fields = sampler.fields.clone();
    let sort_by = sampler.sort_by;
    let sampler = sides
        .par_iter()
        .fold(
            || SideValueSampler {
                field,
                fields: fields.clone(),
                sort_by,
                rows: vec![],
            },
            |mut s, side| {
                s.execute(side);
                s
            },
        )
        .reduce_with(|mut a, b| {
            a.thread_join(b);
            a
        })
        .unwrap_or(sampler);
    Ok(sampler.finalize(reduction))
}
