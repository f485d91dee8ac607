use anyhow::{bail, Result};

// ---------------------------------------------------------------------------
// Dataset – the two-column table held by the processor
// ---------------------------------------------------------------------------

/// An ordered table of `(x, y)` rows stored column-major.
///
/// Missing cells from external files are kept as `NaN`; nothing else is
/// validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Dataset {
    /// Build a dataset from its two columns. Fails if the lengths differ.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            bail!("x has {} values but y has {}", x.len(), y.len());
        }
        Ok(Dataset { x, y })
    }

    /// Build from columns the caller already knows are the same length.
    pub(crate) fn from_columns(x: Vec<f64>, y: Vec<f64>) -> Self {
        debug_assert_eq!(x.len(), y.len());
        Dataset { x, y }
    }

    /// The `x` column.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// The `y` column.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate rows as `(x, y)` pairs.
    pub fn rows(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    /// Count of cells that are missing (`NaN`) in either column.
    pub fn missing_count(&self) -> usize {
        self.x.iter().chain(self.y.iter()).filter(|v| v.is_nan()).count()
    }
}
