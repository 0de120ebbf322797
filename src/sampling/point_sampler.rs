//! Sampling at caller supplied points
use crate::locator::{LocatorStatistics, RegionLocator};
use crate::sampling::SamplerOptions;
use crate::traits::{FieldEvaluator, ProcessReduction, SpatialSearch};
use crate::types::{Error, Point, Result, SampleRecord};
use log::{debug, warn};
use num::{Float, One, Zero};
use rayon::prelude::*;

/// Samples fields at a set of points, once per cycle, on every process
///
/// Each process evaluates the points it owns and contributes zeros for the
/// others. One element-wise sum over all processes then gives every process
/// the value from the owning process. Every process must call
/// [`PointSampleAggregator::evaluate`] the same number of times with the same
/// number of points.
pub struct PointSampleAggregator<'a, S, F, R>
where
    S: SpatialSearch + Sync,
    F: FieldEvaluator<T = S::T>,
    R: ProcessReduction,
{
    locators: Vec<RegionLocator<'a, S>>,
    field: &'a F,
    reduction: &'a R,
    fields: Vec<usize>,
    options: SamplerOptions,
}

impl<'a, S, F, R> PointSampleAggregator<'a, S, F, R>
where
    S: SpatialSearch + Sync,
    F: FieldEvaluator<T = S::T>,
    R: ProcessReduction,
{
    /// Create new
    pub fn new(
        search: &'a S,
        field: &'a F,
        reduction: &'a R,
        options: SamplerOptions,
    ) -> Result<Self> {
        let fields = options.resolve_fields(field.field_count())?;
        let locators = (0..options.locator_count())
            .map(|_| RegionLocator::new(search))
            .collect();
        Ok(Self {
            locators,
            field,
            reduction,
            fields,
            options,
        })
    }

    /// The fields that are sampled, in output order
    pub fn fields(&self) -> &[usize] {
        &self.fields
    }

    /// Counters of all locators
    pub fn statistics(&self) -> LocatorStatistics {
        self.locators
            .iter()
            .map(|l| l.statistics())
            .fold(LocatorStatistics::default(), |a, b| LocatorStatistics {
                hits: a.hits + b.hits,
                repeat_hits: a.repeat_hits + b.repeat_hits,
                misses: a.misses + b.misses,
                stale: a.stale + b.stale,
                not_found: a.not_found + b.not_found,
            })
    }

    /// Sample every field at every point
    ///
    /// The records are in the order of `points` unless a sort column is set in
    /// the options. A point that no process owns has all values zero and
    /// `owners == 0`.
    ///
    /// If `points` and `ids` differ in length this returns
    /// [`Error::LengthMismatch`], but only after taking part in the reduction
    /// with an empty buffer. Processes whose input is valid then see
    /// [`Error::ShapeMismatch`] instead of waiting forever.
    pub fn evaluate(
        &mut self,
        points: &[Point<S::T>],
        ids: &[S::T],
    ) -> Result<Vec<SampleRecord<S::T>>> {
        if points.len() != ids.len() {
            // The error reported here is the length mismatch, whatever the reduction returns
            let _ = self.reduction.sum_reduce::<S::T>(&mut []);
            return Err(Error::LengthMismatch {
                points: points.len(),
                ids: ids.len(),
            });
        }
        let npoints = points.len();
        let nvalues = self.fields.len();
        // The values of each point are followed by its owner count
        let stride = nvalues + 1;

        let mut buffer = vec![<S::T>::zero(); npoints * stride];
        let chunk = std::cmp::max(1, npoints.div_ceil(self.locators.len()));
        let field = self.field;
        let fields = &self.fields;

        buffer
            .par_chunks_mut(chunk * stride)
            .zip(points.par_chunks(chunk).zip(ids.par_chunks(chunk)))
            .zip(self.locators.par_iter_mut())
            .for_each(|((values, (points, ids)), locator)| {
                for (i, (point, id)) in points.iter().zip(ids).enumerate() {
                    if let Some(region) = locator.locate(point, *id) {
                        let row = &mut values[i * stride..(i + 1) * stride];
                        for (v, f) in row.iter_mut().zip(fields) {
                            *v = field.value_at(region, point, *f);
                        }
                        row[nvalues] = <S::T>::one();
                    }
                }
            });

        let local_count = buffer
            .chunks(stride)
            .filter(|row| row[nvalues] > <S::T>::zero())
            .count();

        self.reduction.sum_reduce(&mut buffer)?;

        let mut records = buffer
            .chunks(stride)
            .zip(points.iter().zip(ids))
            .map(|(row, (point, id))| SampleRecord {
                id: *id,
                point: *point,
                values: row[..nvalues].to_vec(),
                owners: num::cast::<S::T, usize>(row[nvalues].round()).unwrap_or(0),
            })
            .collect::<Vec<_>>();

        let unsampled = records.iter().filter(|r| r.owners == 0).count();
        if unsampled > 0 {
            debug!("{unsampled} of {npoints} points lie outside the mesh");
        }
        for record in records.iter().filter(|r| r.owners > 1) {
            warn!(
                "Point {:?} with id {:?} is owned by {} processes; its values are summed",
                record.point, record.id, record.owners
            );
        }
        debug!(
            "Rank {} owns {local_count} of {npoints} sampled points",
            self.reduction.rank()
        );

        if let Some(sort_by) = self.options.sort_by() {
            sort_by.sort(&mut records);
        }
        Ok(records)
    }
}
