//! Row-major 2D field storage
//!
//! Every per-cell quantity of the automaton (heat, fuel, oxygen, combustion
//! state, neighbor sums) lives in a `Field<T>`. The dimensions are fixed at
//! construction; callers get slices, never a way to resize the buffer.

/// 2D field stored as a flat `Vec<T>` in row-major order (`y * width + x`)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Field<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Clone> Field<T> {
    /// Create a field with every cell set to `value`
    ///
    /// # Arguments
    ///
    /// * `width` - Grid width in cells
    /// * `height` - Grid height in cells
    /// * `value` - Initial value for all cells
    #[must_use]
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
        }
    }
}

impl<T: Clone + Default> Field<T> {
    /// Create a field with every cell set to `T::default()`
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }
}

impl<T> Field<T> {
    /// Build a field by evaluating `f(x, y)` for every cell
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Grid width in cells
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` for a 0×N or N×0 field
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Reference to the value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> &T {
        assert!(
            x < self.width && y < self.height,
            "Coordinates out of bounds"
        );
        &self.data[y * self.width + x]
    }

    /// Set value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        assert!(
            x < self.width && y < self.height,
            "Coordinates out of bounds"
        );
        self.data[y * self.width + x] = value;
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> std::slice::Chunks<'_, T> {
        self.data.chunks(self.width.max(1))
    }

    /// Apply `f` to every cell, producing a field of the same shape
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Field<U> {
        Field {
            data: self.data.iter().map(f).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_creation() {
        let field: Field<f32> = Field::new(10, 20);
        assert_eq!(field.width(), 10);
        assert_eq!(field.height(), 20);
        assert_eq!(field.len(), 200);
        assert!(field.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_field_filled() {
        let field = Field::filled(5, 5, 4.0_f32);
        assert_eq!(field.dimensions(), (5, 5));
        assert!(field.as_slice().iter().all(|&v| v == 4.0));
    }

    #[test]
    fn test_field_get_set() {
        let mut field: Field<f32> = Field::new(10, 10);
        field.set(3, 4, 2.5);
        assert_eq!(*field.get(3, 4), 2.5);

        // Verify row-major indexing
        assert_eq!(field.as_slice()[4 * 10 + 3], 2.5);
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let field = Field::from_fn(3, 2, |x, y| x + 10 * y);
        assert_eq!(field.as_slice(), &[0, 1, 2, 10, 11, 12]);
        let rows: Vec<&[usize]> = field.rows().collect();
        assert_eq!(rows, vec![&[0, 1, 2][..], &[10, 11, 12][..]]);
    }

    #[test]
    #[should_panic(expected = "Coordinates out of bounds")]
    fn test_field_bounds_check() {
        let field: Field<f32> = Field::new(10, 10);
        let _ = field.get(10, 5);
    }
}
