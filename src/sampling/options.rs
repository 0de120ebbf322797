//! Sampler options
use crate::types::{Error, Result, SortBy};

/// Options for point and side samplers
#[derive(Debug, Clone)]
pub struct SamplerOptions {
    /// Fields to sample, in output order. `None` samples every field.
    fields: Option<Vec<usize>>,
    /// Column the finalised records are sorted by. `None` keeps input order.
    sort_by: Option<SortBy>,
    /// Number of locators (and worker tasks) used to locate points
    locator_count: usize,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            fields: None,
            sort_by: None,
            locator_count: 1,
        }
    }
}

impl SamplerOptions {
    /// Set the fields to sample
    pub fn set_fields(&mut self, fields: Vec<usize>) {
        self.fields = Some(fields);
    }

    /// Set the column the finalised records are sorted by
    pub fn set_sort_by(&mut self, sort_by: Option<SortBy>) {
        self.sort_by = sort_by;
    }

    /// Set the number of locators used to locate points
    pub fn set_locator_count(&mut self, count: usize) {
        if count == 0 {
            panic!("At least one locator is needed");
        }
        self.locator_count = count;
    }

    /// Column the finalised records are sorted by
    pub fn sort_by(&self) -> Option<SortBy> {
        self.sort_by
    }

    /// Number of locators used to locate points
    pub fn locator_count(&self) -> usize {
        self.locator_count
    }

    /// The fields to sample, given the number of available fields
    pub fn resolve_fields(&self, field_count: usize) -> Result<Vec<usize>> {
        match &self.fields {
            None => Ok((0..field_count).collect()),
            Some(fields) => {
                if let Some(field) = fields.iter().find(|f| **f >= field_count) {
                    return Err(Error::UnknownField {
                        field: *field,
                        count: field_count,
                    });
                }
                Ok(fields.clone())
            }
        }
    }
}
