use betatune_core::AttributeSet;

/// Row-major storage for one named attribute set.
///
/// Each particle owns one row of `width` values, in slot order.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryAttributes {
    slots: Vec<String>,
    defaults: Vec<f64>,
    values: Vec<f64>,
    rows: usize,
}

impl MemoryAttributes {
    /// Creates a set with `rows` particles, each initialized to the defaults.
    pub(crate) fn new(defaults: &[(&str, f64)], rows: usize) -> Self {
        let slots = defaults.iter().map(|(name, _)| (*name).to_owned()).collect();
        let defaults: Vec<f64> = defaults.iter().map(|(_, value)| *value).collect();
        let values = defaults.repeat(rows);

        Self {
            slots,
            defaults,
            values,
            rows,
        }
    }

    /// Returns the slot names in storage order.
    #[must_use]
    pub fn slot_names(&self) -> &[String] {
        &self.slots
    }

    /// Returns the number of particle rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Returns the value of the slot called `name` for `particle`.
    #[must_use]
    pub fn get(&self, particle: usize, name: &str) -> Option<f64> {
        self.slot(name).and_then(|slot| self.value(particle, slot))
    }

    /// Appends a row filled with the defaults.
    pub(crate) fn push_default(&mut self) {
        self.values.extend_from_slice(&self.defaults);
        self.rows += 1;
    }

    /// Drops every row whose flag in `lost` is set, keeping the rest in order.
    pub(crate) fn retain_rows(&mut self, lost: &[bool]) {
        let width = self.slots.len();
        let mut kept = Vec::with_capacity(self.values.len());
        let mut rows = 0;

        for (row, is_lost) in lost.iter().enumerate().take(self.rows) {
            if !is_lost {
                kept.extend_from_slice(&self.values[row * width..(row + 1) * width]);
                rows += 1;
            }
        }

        self.values = kept;
        self.rows = rows;
    }

    fn offset(&self, particle: usize, slot: usize) -> Option<usize> {
        let width = self.slots.len();
        (particle < self.rows && slot < width).then(|| particle * width + slot)
    }
}

impl AttributeSet for MemoryAttributes {
    fn slot(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot == name)
    }

    fn value(&self, particle: usize, slot: usize) -> Option<f64> {
        self.offset(particle, slot).map(|i| self.values[i])
    }

    fn value_mut(&mut self, particle: usize, slot: usize) -> Option<&mut f64> {
        self.offset(particle, slot).map(|i| &mut self.values[i])
    }
}
