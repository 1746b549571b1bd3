use super::models::Table;
use super::summary::{numeric_column, NumericColumn};

pub const DEFAULT_BINS: usize = 10;

/// One histogram bar covering `[lower, upper)`; the last bin also includes `upper`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

impl Bin {
    /// Short label for the bar, the lower edge with up to two decimals.
    pub fn label(&self) -> String {
        let rounded = (self.lower * 100.0).round() / 100.0;
        if rounded.fract() == 0.0 {
            format!("{}", rounded as i64)
        } else {
            format!("{}", rounded)
        }
    }
}

/// Equal-width histogram of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub column: String,
    pub bins: Vec<Bin>,
}

impl Histogram {
    /// Bins the numeric values of `column`. Returns `None` when the column is
    /// missing, not numeric, or holds no values.
    pub fn from_column(table: &Table, column: &str, bins: usize) -> Option<Self> {
        match numeric_column(table, column) {
            NumericColumn::Values(values) => Some(Self {
                column: column.to_string(),
                bins: bin_values(&values, bins.max(1)),
            }),
            _ => None,
        }
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

fn bin_values(values: &[f64], bins: usize) -> Vec<Bin> {
    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for value in values {
        let idx = (((value - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}
