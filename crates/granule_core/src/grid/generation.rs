//! # Generation Storage
//!
//! One full snapshot of the grid, stored columnar:
//!
//! ```text
//! materials: [m0, m1, m2, ...]   one byte per cell
//! aux:       [a0, a1, a2, ...]   one byte per cell
//! ```
//!
//! Both arrays are allocated once and only ever overwritten in place.

/// Columnar `(material, aux)` storage for every cell of one generation.
pub(crate) struct Generation {
    materials: Box<[u8]>,
    aux: Box<[u8]>,
}

impl Generation {
    /// Allocates a zeroed generation of `len` cells.
    pub(crate) fn new(len: usize) -> Self {
        Self {
            materials: vec![0; len].into_boxed_slice(),
            aux: vec![0; len].into_boxed_slice(),
        }
    }

    /// Number of cells.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.materials.len()
    }

    /// Raw `(material, aux)` bytes at `index`, or None past the end.
    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<(u8, u8)> {
        Some((*self.materials.get(index)?, *self.aux.get(index)?))
    }

    /// Overwrites the cell at `index`.
    ///
    /// Returns `false` if `index` is past the end.
    #[inline]
    pub(crate) fn set(&mut self, index: usize, material: u8, aux: u8) -> bool {
        match (self.materials.get_mut(index), self.aux.get_mut(index)) {
            (Some(m), Some(a)) => {
                *m = material;
                *a = aux;
                true
            }
            _ => false,
        }
    }

    /// Sets every cell to `(material, aux)`.
    pub(crate) fn fill(&mut self, material: u8, aux: u8) {
        self.materials.fill(material);
        self.aux.fill(aux);
    }

    /// All material bytes, row-major.
    #[inline]
    pub(crate) fn materials(&self) -> &[u8] {
        &self.materials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generation_is_zeroed() {
        let generation = Generation::new(16);
        assert_eq!(generation.len(), 16);
        assert!(generation.materials().iter().all(|&m| m == 0));
        assert_eq!(generation.get(15), Some((0, 0)));
        assert_eq!(generation.get(16), None);
    }

    #[test]
    fn test_set_and_fill() {
        let mut generation = Generation::new(4);
        assert!(generation.set(2, 3, 200));
        assert!(!generation.set(4, 1, 1));
        assert_eq!(generation.get(2), Some((3, 200)));

        generation.fill(0, 0);
        assert_eq!(generation.get(2), Some((0, 0)));
    }
}
