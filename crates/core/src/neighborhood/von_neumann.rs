//! Von Neumann (4-connected) neighborhood
//!
//! Each cell aggregates its left, right, upper and lower neighbor. There is
//! no self term and no diagonal. Cells beyond the grid edge contribute zero:
//! edge cells see three neighbors and corner cells two, and their sums are
//! not rescaled to compensate.

use super::{Neighborhood, NeighborhoodSummary, SummaryFields};
use crate::field::Field;
use crate::state::{CellState, State};
use rayon::prelude::*;
use std::ops::Add;

/// Indices of the in-bounds orthogonal neighbors of `(x, y)`, in the order
/// left, right, up, down
#[inline]
fn neighbor_indices(
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> impl Iterator<Item = usize> {
    let idx = y * width + x;
    [
        (x > 0).then(|| idx - 1),
        (x + 1 < width).then(|| idx + 1),
        (y > 0).then(|| idx - width),
        (y + 1 < height).then(|| idx + width),
    ]
    .into_iter()
    .flatten()
}

/// Zero-padded 4-neighbor sum of `value(src[i])`
///
/// Rows are processed in parallel; each cell adds its neighbors in a fixed
/// order, so the result is identical to a sequential pass.
fn neighbor_sum<T, S>(
    src: &[T],
    width: usize,
    height: usize,
    value: impl Fn(&T) -> S + Sync,
) -> Field<S>
where
    T: Sync,
    S: Copy + Default + Send + Add<Output = S>,
{
    let mut out: Field<S> = Field::new(width, height);
    if width == 0 {
        return out;
    }

    out.as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = neighbor_indices(x, y, width, height)
                    .fold(S::default(), |acc, n| acc + value(&src[n]));
            }
        });
    out
}

/// Per-state neighbor counts from 0/1 indicator grids
fn state_counts(state: &State) -> [Field<u8>; CellState::COUNT] {
    let (width, height) = state.dimensions();
    let cells = state.cell_state();
    CellState::ALL.map(|target| neighbor_sum(cells, width, height, |s| u8::from(*s == target)))
}

fn basic_summary(state: &State) -> NeighborhoodSummary {
    let (width, height) = state.dimensions();
    NeighborhoodSummary {
        oxygen_sum: neighbor_sum(state.oxygen(), width, height, |v| *v),
        fuel_sum: neighbor_sum(state.fuel(), width, height, |v| *v),
        heat_sum: neighbor_sum(state.heat(), width, height, |v| *v),
        state_counts: state_counts(state),
        oxygen_higher_count: None,
    }
}

/// Default 4-connected neighborhood
#[derive(Debug, Default, Clone, Copy)]
pub struct NeumannNeighborhood;

impl NeumannNeighborhood {
    pub const NAME: &'static str = "NeumannNeighborhood";
}

impl Neighborhood for NeumannNeighborhood {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn calculate(&self, state: &State) -> NeighborhoodSummary {
        basic_summary(state)
    }
}

/// 4-connected neighborhood that also counts neighbors with higher oxygen
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtendedNeumannNeighborhood;

impl ExtendedNeumannNeighborhood {
    pub const NAME: &'static str = "ExtendedNeumannNeighborhood";
}

impl Neighborhood for ExtendedNeumannNeighborhood {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn provides(&self) -> SummaryFields {
        SummaryFields::EXTENDED
    }

    fn calculate(&self, state: &State) -> NeighborhoodSummary {
        let mut summary = basic_summary(state);
        summary.oxygen_higher_count = Some(oxygen_higher_count(state));
        summary
    }
}

fn oxygen_higher_count(state: &State) -> Field<u8> {
    let (width, height) = state.dimensions();
    let oxygen = state.oxygen();
    let mut out: Field<u8> = Field::new(width, height);
    if width == 0 {
        return out;
    }

    out.as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                let own = oxygen[y * width + x];
                *cell = neighbor_indices(x, y, width, height)
                    .map(|n| u8::from(oxygen[n] > own))
                    .sum();
            }
        });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Cell;

    fn numbered_state(width: usize, height: usize) -> State {
        let oxygen = Field::from_fn(width, height, |x, y| (y * width + x) as f32);
        State::new(
            Field::new(width, height),
            Field::new(width, height),
            oxygen,
            Field::new(width, height),
        )
        .unwrap()
    }

    #[test]
    fn test_corner_sums_only_in_bounds_neighbors() {
        // 0 1 2
        // 3 4 5
        // 6 7 8
        let state = numbered_state(3, 3);
        let summary = NeumannNeighborhood.calculate(&state);

        assert_eq!(*summary.oxygen_sum.get(0, 0), 1.0 + 3.0);
        assert_eq!(*summary.oxygen_sum.get(2, 2), 5.0 + 7.0);
        // Edge cell: three neighbors
        assert_eq!(*summary.oxygen_sum.get(1, 0), 0.0 + 2.0 + 4.0);
        // Center: four neighbors, no self term
        assert_eq!(*summary.oxygen_sum.get(1, 1), 1.0 + 3.0 + 5.0 + 7.0);
    }

    #[test]
    fn test_no_wraparound_on_uniform_grid() {
        let state = State::uniform(4, 3, 1.0, 2.0, 4.0, CellState::Vegetation);
        let summary = NeumannNeighborhood.calculate(&state);

        assert_eq!(*summary.oxygen_sum.get(0, 0), 8.0);
        assert_eq!(*summary.oxygen_sum.get(1, 0), 12.0);
        assert_eq!(*summary.oxygen_sum.get(1, 1), 16.0);
        assert_eq!(*summary.heat_sum.get(3, 2), 2.0);
        assert_eq!(*summary.fuel_sum.get(2, 1), 8.0);
    }

    #[test]
    fn test_state_counts() {
        let mut state = State::uniform(3, 3, 0.0, 0.0, 4.0, CellState::Vegetation);
        state.set_cell(1, 1, Cell::new(CellState::Fire, 4.0, 4.0, 4.0));
        state.set_cell(0, 0, Cell::new(CellState::Hot, 1.0, 0.0, 4.0));

        let summary = NeumannNeighborhood.calculate(&state);
        let fire = summary.state_count(CellState::Fire);
        let hot = summary.state_count(CellState::Hot);
        let veg = summary.state_count(CellState::Vegetation);

        // Orthogonal neighbors of the center see one fire; diagonals see none
        assert_eq!(fire, &[0, 1, 0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(hot, &[0, 1, 0, 1, 0, 0, 0, 0, 0]);
        assert_eq!(veg[4], 4);
        assert_eq!(veg[0], 2);

        // Every cell's counts add up to its number of in-bounds neighbors
        for y in 0..3 {
            for x in 0..3 {
                let idx = y * 3 + x;
                let total: u8 = CellState::ALL
                    .iter()
                    .map(|&s| summary.state_count(s)[idx])
                    .sum();
                assert_eq!(usize::from(total), neighbor_indices(x, y, 3, 3).count());
            }
        }
    }

    #[test]
    fn test_summary_shape_matches_state() {
        let state = State::uniform(7, 2, 0.0, 0.0, 0.0, CellState::Vegetation);
        let summary = ExtendedNeumannNeighborhood.calculate(&state);
        assert_eq!(summary.dimensions(), (7, 2));
        for counts in &summary.state_counts {
            assert_eq!(counts.dimensions(), (7, 2));
        }
        assert_eq!(summary.oxygen_higher_count.map(|f| f.dimensions()), Some((7, 2)));
    }

    #[test]
    fn test_basic_neighborhood_omits_extended_field() {
        let state = State::uniform(2, 2, 0.0, 0.0, 0.0, CellState::Vegetation);
        assert!(NeumannNeighborhood
            .calculate(&state)
            .oxygen_higher_count
            .is_none());
    }

    #[test]
    fn test_oxygen_higher_count() {
        let state = numbered_state(3, 3);
        let summary = ExtendedNeumannNeighborhood.calculate(&state);
        let higher = summary.oxygen_higher_count.unwrap();

        // Cell 0 has neighbors 1 and 3, both higher
        assert_eq!(*higher.get(0, 0), 2);
        // Center (4) has 5 and 7 higher, 1 and 3 lower
        assert_eq!(*higher.get(1, 1), 2);
        // Cell 8 is the maximum
        assert_eq!(*higher.get(2, 2), 0);
    }

    #[test]
    fn test_single_row_grid() {
        let state = numbered_state(4, 1);
        let summary = NeumannNeighborhood.calculate(&state);
        assert_eq!(summary.oxygen_sum.as_slice(), &[1.0, 2.0, 4.0, 2.0]);
    }
}
