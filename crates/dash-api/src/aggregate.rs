//! Chart-ready datasets derived from the current page of songs.
//!
//! Pure functions of the input list — the app recomputes this on every list
//! change rather than observing mutations.

use crate::model::Song;

/// One scatter point: x = danceability, y = energy, labelled by title.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub title: String,
}

/// One duration histogram bin with its song count.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationBin {
    pub label: &'static str,
    pub count: u64,
}

/// Fixed-width 60-second bins plus an unbounded overflow bin. Membership is
/// half-open `[min, max)`; the final bin is `[360, ∞)`.
const BIN_LABELS: [&str; 7] = [
    "0-60 sec",
    "60-120 sec",
    "120-180 sec",
    "180-240 sec",
    "240-300 sec",
    "300-360 sec",
    "360+ sec",
];

const BIN_WIDTH_SECS: f64 = 60.0;
const OVERFLOW_FLOOR_SECS: f64 = 360.0;

/// Index of the bin a song of `duration_secs` falls into.
pub fn duration_bin_index(duration_secs: f64) -> usize {
    if duration_secs >= OVERFLOW_FLOOR_SECS {
        BIN_LABELS.len() - 1
    } else {
        // Non-negative by the data model; floor into a 60 s slot.
        (duration_secs.max(0.0) / BIN_WIDTH_SECS) as usize
    }
}

/// One per-song entry of the parallel bar series.
#[derive(Debug, Clone, PartialEq)]
pub struct BarEntry {
    pub title: String,
    pub acousticness: f64,
    pub tempo: f64,
}

/// The three derived presentation datasets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub scatter: Vec<ScatterPoint>,
    pub histogram: Vec<DurationBin>,
    pub bars: Vec<BarEntry>,
}

impl ChartData {
    pub fn from_songs(songs: &[Song]) -> Self {
        if songs.is_empty() {
            // Explicit "no data" marker — renderers show a placeholder, not
            // empty axes.
            return Self::default();
        }

        let scatter = songs
            .iter()
            .map(|s| ScatterPoint {
                x: s.danceability,
                y: s.energy,
                title: s.title.clone(),
            })
            .collect();

        let mut counts = [0u64; BIN_LABELS.len()];
        for song in songs {
            counts[duration_bin_index(song.duration_secs())] += 1;
        }
        let histogram = BIN_LABELS
            .iter()
            .zip(counts)
            .map(|(label, count)| DurationBin { label, count })
            .collect();

        let bars = songs
            .iter()
            .map(|s| BarEntry {
                title: s.title.clone(),
                acousticness: s.acousticness,
                tempo: s.tempo,
            })
            .collect();

        Self {
            scatter,
            histogram,
            bars,
        }
    }

    pub fn has_data(&self) -> bool {
        !self.scatter.is_empty()
    }

    /// Scatter coordinates in the `(x, y)` slice form ratatui datasets take.
    pub fn scatter_coords(&self) -> Vec<(f64, f64)> {
        self.scatter.iter().map(|p| (p.x, p.y)).collect()
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
