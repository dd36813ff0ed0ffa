use parquet_format_safe::PageLocation;

use crate::error::{Error, Result};

/// A contiguous run of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start: u64,
    pub length: u64,
}

impl Interval {
    pub fn new(start: u64, length: u64) -> Self {
        Self { start, length }
    }

    fn end(&self) -> u64 {
        self.start + self.length
    }
}

/// The row interval each page covers, derived from its neighbors'
/// first-row indexes.
fn page_row_intervals(locations: &[PageLocation], num_rows: u64) -> Result<Vec<Interval>> {
    if locations.is_empty() {
        return Ok(vec![]);
    }

    let last = {
        let start = u64::try_from(locations.last().unwrap().first_row_index)
            .map_err(|_| Error::oos("a negative first-row index"))?;
        Ok(Interval::new(start, num_rows - start))
    };

    locations
        .windows(2)
        .map(|pair| {
            let start = u64::try_from(pair[0].first_row_index)
                .map_err(|_| Error::oos("a negative first-row index"))?;
            let length = u64::try_from(pair[1].first_row_index - pair[0].first_row_index)
                .map_err(|_| Error::oos("first-row indexes must be increasing"))?;
            Ok(Interval::new(start, length))
        })
        .chain(std::iter::once(last))
        .collect()
}

/// The row intervals of the pages marked `true` in `selected`.
pub fn compute_rows(
    selected: &[bool],
    locations: &[PageLocation],
    num_rows: u64,
) -> Result<Vec<Interval>> {
    let intervals = page_row_intervals(locations, num_rows)?;

    Ok(selected
        .iter()
        .zip(intervals.into_iter())
        .filter_map(|(selected, interval)| selected.then_some(interval))
        .collect())
}

/// A page either selected or skipped by a row filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilteredPage {
    Select {
        /// byte offset of the page in the file
        start: u64,
        length: usize,
        /// the rows to keep, relative to the page
        rows_offset: usize,
        rows_length: usize,
    },
    Skip {
        start: u64,
        length: usize,
        /// rows skipped by skipping this page
        num_rows: usize,
    },
}

impl FilteredPage {
    pub fn start(&self) -> u64 {
        match self {
            Self::Select { start, .. } => *start,
            Self::Skip { start, .. } => *start,
        }
    }
}

fn overlap(probe: Interval, intervals: &[Interval]) -> Option<Interval> {
    intervals.iter().find_map(|interval| {
        let overlaps = probe.start < interval.end() && probe.end() > interval.start;
        overlaps.then(|| {
            let start = interval.start.max(probe.start);
            let end = interval.end().min(probe.end());
            Interval::new(start - probe.start, end - start)
        })
    })
}

/// Intersects the selected row `intervals` with the pages of one chunk.
pub fn select_pages(
    intervals: &[Interval],
    locations: &[PageLocation],
    num_rows: u64,
) -> Result<Vec<FilteredPage>> {
    page_row_intervals(locations, num_rows)?
        .into_iter()
        .zip(locations.iter())
        .map(|(interval, location)| {
            Ok(match overlap(interval, intervals) {
                Some(rows) => FilteredPage::Select {
                    start: location.offset.try_into()?,
                    length: location.compressed_page_size.try_into()?,
                    rows_offset: rows.start.try_into()?,
                    rows_length: rows.length.try_into()?,
                },
                None => FilteredPage::Skip {
                    start: location.offset.try_into()?,
                    length: location.compressed_page_size.try_into()?,
                    num_rows: interval.length.try_into()?,
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations() -> Vec<PageLocation> {
        vec![
            PageLocation {
                offset: 4,
                compressed_page_size: 100,
                first_row_index: 0,
            },
            PageLocation {
                offset: 104,
                compressed_page_size: 80,
                first_row_index: 10,
            },
        ]
    }

    #[test]
    fn selects_overlapping_pages() {
        let selected = select_pages(&[Interval::new(12, 3)], &locations(), 20).unwrap();
        assert_eq!(
            selected,
            vec![
                FilteredPage::Skip {
                    start: 4,
                    length: 100,
                    num_rows: 10
                },
                FilteredPage::Select {
                    start: 104,
                    length: 80,
                    rows_offset: 2,
                    rows_length: 3
                },
            ]
        );
    }

    #[test]
    fn compute_rows_of_selection() {
        let rows = compute_rows(&[true, false], &locations(), 20).unwrap();
        assert_eq!(rows, vec![Interval::new(0, 10)]);
    }
}
