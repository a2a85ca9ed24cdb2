//! Sample-series helpers used by the render pipeline: finite filtering,
//! resampling onto another time grid, decimation and state-change detection.

/// Paired `(x, y)` samples. For a raw signal `x` is the time column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    /// Pair two columns, truncating to the shorter one.
    pub fn from_columns(x: &[f64], y: &[f64]) -> Self {
        let n = x.len().min(y.len());
        Self {
            x: x[..n].to_vec(),
            y: y[..n].to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Drop samples where either coordinate is NaN or infinite.
    pub fn finite(self) -> Self {
        let (x, y) = self
            .x
            .into_iter()
            .zip(self.y)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .unzip();
        Self { x, y }
    }

    pub fn scaled(mut self, factor: f64) -> Self {
        if factor != 1.0 {
            for v in self.y.iter_mut() {
                *v *= factor;
            }
        }
        self
    }

    pub fn points(&self) -> Vec<[f64; 2]> {
        self.x.iter().zip(&self.y).map(|(&x, &y)| [x, y]).collect()
    }
}

/// Linearly interpolate `(t, v)` at every `at` sample. Targets outside the
/// source range are extrapolated from the first/last segment; a single
/// source sample yields a constant.
pub fn resample_linear(t: &[f64], v: &[f64], at: &[f64]) -> Vec<f64> {
    let n = t.len().min(v.len());
    match n {
        0 => return vec![f64::NAN; at.len()],
        1 => return vec![v[0]; at.len()],
        _ => {}
    }
    let (t, v) = (&t[..n], &v[..n]);
    at.iter()
        .map(|&x| {
            // Segment [i, i+1] bracketing x, clamped to the end segments.
            let upper = t.partition_point(|&ti| ti < x).clamp(1, n - 1);
            let (t0, t1) = (t[upper - 1], t[upper]);
            let (v0, v1) = (v[upper - 1], v[upper]);
            if t1 == t0 {
                v0
            } else {
                v0 + (v1 - v0) * (x - t0) / (t1 - t0)
            }
        })
        .collect()
}

/// Fixed-stride subsample down to about `max_points`, always keeping the
/// first and last sample. The result has at most `max_points + 1` samples.
pub fn decimate(series: Series, max_points: usize) -> Series {
    let n = series.len();
    if n <= max_points || max_points == 0 {
        return series;
    }
    let stride = n.div_ceil(max_points);
    let mut keep: Vec<usize> = (0..n - 1).step_by(stride).collect();
    keep.push(n - 1);
    Series {
        x: keep.iter().map(|&i| series.x[i]).collect(),
        y: keep.iter().map(|&i| series.y[i]).collect(),
    }
}

/// Samples where the value differs from the previous one. The first sample
/// always starts a run, so runs of equal values collapse to one marker.
pub fn state_changes(series: &Series) -> Series {
    let mut out = Series::default();
    let mut last: Option<f64> = None;
    for (&x, &y) in series.x.iter().zip(&series.y) {
        if last != Some(y) {
            out.x.push(x);
            out.y.push(y);
            last = Some(y);
        }
    }
    out
}
