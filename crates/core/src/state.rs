//! Grid state: resource fields and combustion state per cell

use crate::error::SimError;
use crate::field::Field;
use std::fmt;

/// Upper bound rules clamp heat, fuel and oxygen to
pub const MAX_LEVEL: f32 = 5.0;

/// Discrete combustion state of a cell
///
/// The discriminants match the numeric codes used for the "average cell
/// state" statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CellState {
    Fire = 0,
    Incombustible = 1,
    Hot = 2,
    #[default]
    Vegetation = 3,
}

impl CellState {
    /// Number of distinct states
    pub const COUNT: usize = 4;

    /// All states, ordered by their numeric code
    pub const ALL: [CellState; Self::COUNT] = [
        CellState::Fire,
        CellState::Incombustible,
        CellState::Hot,
        CellState::Vegetation,
    ];

    /// Numeric code (0..4)
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fire => "Fire",
            Self::Incombustible => "Incombustible",
            Self::Hot => "Hot",
            Self::Vegetation => "Vegetation",
        }
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The grid at one instant
///
/// Four co-indexed fields of identical shape. The shape is fixed when the
/// state is built: fields are only reachable as slices, so rules can change
/// cell contents but never the dimensions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct State {
    heat: Field<f32>,
    fuel: Field<f32>,
    oxygen: Field<f32>,
    cell_state: Field<CellState>,
}

impl State {
    /// Assemble a state from its four fields
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ShapeMismatch`] if the fields differ in dimensions.
    pub fn new(
        heat: Field<f32>,
        fuel: Field<f32>,
        oxygen: Field<f32>,
        cell_state: Field<CellState>,
    ) -> Result<Self, SimError> {
        let expected = cell_state.dimensions();
        for (name, dims) in [
            ("heat", heat.dimensions()),
            ("fuel", fuel.dimensions()),
            ("oxygen", oxygen.dimensions()),
        ] {
            if dims != expected {
                return Err(SimError::ShapeMismatch {
                    field: name,
                    expected,
                    actual: dims,
                });
            }
        }
        Ok(Self {
            heat,
            fuel,
            oxygen,
            cell_state,
        })
    }

    /// Split a grid of whole cells into the four fields
    #[must_use]
    pub fn from_cells(cells: &Field<Cell>) -> Self {
        Self {
            heat: cells.map(|c| c.heat),
            fuel: cells.map(|c| c.fuel),
            oxygen: cells.map(|c| c.oxygen),
            cell_state: cells.map(|c| c.state),
        }
    }

    /// Uniform grid where every cell has the same levels and state
    #[must_use]
    pub fn uniform(
        width: usize,
        height: usize,
        heat: f32,
        fuel: f32,
        oxygen: f32,
        cell_state: CellState,
    ) -> Self {
        Self {
            heat: Field::filled(width, height, heat),
            fuel: Field::filled(width, height, fuel),
            oxygen: Field::filled(width, height, oxygen),
            cell_state: Field::filled(width, height, cell_state),
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.cell_state.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.cell_state.height()
    }

    /// `(width, height)`
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        self.cell_state.dimensions()
    }

    /// Number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.cell_state.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cell_state.is_empty()
    }

    #[must_use]
    pub fn heat(&self) -> &[f32] {
        self.heat.as_slice()
    }

    #[must_use]
    pub fn fuel(&self) -> &[f32] {
        self.fuel.as_slice()
    }

    #[must_use]
    pub fn oxygen(&self) -> &[f32] {
        self.oxygen.as_slice()
    }

    #[must_use]
    pub fn cell_state(&self) -> &[CellState] {
        self.cell_state.as_slice()
    }

    pub fn heat_mut(&mut self) -> &mut [f32] {
        self.heat.as_mut_slice()
    }

    pub fn fuel_mut(&mut self) -> &mut [f32] {
        self.fuel.as_mut_slice()
    }

    pub fn oxygen_mut(&mut self) -> &mut [f32] {
        self.oxygen.as_mut_slice()
    }

    pub fn cell_state_mut(&mut self) -> &mut [CellState] {
        self.cell_state.as_mut_slice()
    }

    /// Mutable access to every field at once, for rules that touch several
    /// fields in the same pass
    pub fn fields_mut(&mut self) -> CellFieldsMut<'_> {
        CellFieldsMut {
            heat: self.heat.as_mut_slice(),
            fuel: self.fuel.as_mut_slice(),
            oxygen: self.oxygen.as_mut_slice(),
            cell_state: self.cell_state.as_mut_slice(),
        }
    }

    /// Overwrite a single cell
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        self.heat.set(x, y, cell.heat);
        self.fuel.set(x, y, cell.fuel);
        self.oxygen.set(x, y, cell.oxygen);
        self.cell_state.set(x, y, cell.state);
    }

    /// Read a single cell
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        Cell {
            heat: *self.heat.get(x, y),
            fuel: *self.fuel.get(x, y),
            oxygen: *self.oxygen.get(x, y),
            state: *self.cell_state.get(x, y),
        }
    }

    /// Borrow the combustion state field including its dimensions
    #[must_use]
    pub fn cell_state_field(&self) -> &Field<CellState> {
        &self.cell_state
    }

    #[must_use]
    pub fn heat_field(&self) -> &Field<f32> {
        &self.heat
    }

    #[must_use]
    pub fn fuel_field(&self) -> &Field<f32> {
        &self.fuel
    }

    #[must_use]
    pub fn oxygen_field(&self) -> &Field<f32> {
        &self.oxygen
    }

    /// Number of cells currently in `state`
    #[must_use]
    pub fn count(&self, state: CellState) -> usize {
        self.cell_state().iter().filter(|&&s| s == state).count()
    }

    /// Mean heat over all cells (0 for an empty grid)
    #[must_use]
    pub fn mean_heat(&self) -> f32 {
        mean(self.heat())
    }

    #[must_use]
    pub fn mean_fuel(&self) -> f32 {
        mean(self.fuel())
    }

    #[must_use]
    pub fn mean_oxygen(&self) -> f32 {
        mean(self.oxygen())
    }

    /// Mean of the numeric state codes
    #[must_use]
    pub fn mean_cell_state(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let total: u32 = self.cell_state().iter().map(|s| u32::from(s.code())).sum();
        total as f32 / self.len() as f32
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Values of a single cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub heat: f32,
    pub fuel: f32,
    pub oxygen: f32,
    pub state: CellState,
}

impl Cell {
    #[must_use]
    pub const fn new(state: CellState, heat: f32, fuel: f32, oxygen: f32) -> Self {
        Self {
            heat,
            fuel,
            oxygen,
            state,
        }
    }
}

/// Simultaneous mutable view over the four fields of a [`State`]
pub struct CellFieldsMut<'a> {
    pub heat: &'a mut [f32],
    pub fuel: &'a mut [f32],
    pub oxygen: &'a mut [f32],
    pub cell_state: &'a mut [CellState],
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_map(f, "oxygen map", self.oxygen_field(), |v| format!("{v:.0}"))?;
        write_map(f, "fuel map", self.fuel_field(), |v| format!("{v:.0}"))?;
        write_map(f, "heat map", self.heat_field(), |v| format!("{v:.0}"))?;
        write_map(f, "state map", self.cell_state_field(), |s| {
            s.code().to_string()
        })
    }
}

fn write_map<T>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    field: &Field<T>,
    render: impl Fn(&T) -> String,
) -> fmt::Result {
    writeln!(f, "{title}:")?;
    for row in field.rows() {
        let line: Vec<String> = row.iter().map(&render).collect();
        writeln!(f, "  {}", line.join(" "))?;
    }
    Ok(())
}
