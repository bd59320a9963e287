//! CSV export of a song list.
//!
//! One row per song, columns matching the Song entity fields. The filename
//! is fixed (`songs_data.csv`); only the directory is configurable.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::model::Song;

pub const EXPORT_FILENAME: &str = "songs_data.csv";

const HEADER: &str =
    "id,title,danceability,energy,acousticness,tempo,duration_ms,num_segments,num_sections,rating";

/// Quote a field when it contains a comma, quote, or newline; embedded quotes
/// are doubled.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn encode_row(song: &Song) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{}",
        song.id,
        csv_escape(&song.title),
        song.danceability,
        song.energy,
        song.acousticness,
        song.tempo,
        song.duration_ms,
        song.num_segments,
        song.num_sections,
        song.rating,
    )
}

/// Serialize `songs` to CSV text, header first.
pub fn to_csv(songs: &[Song]) -> String {
    let mut out = String::with_capacity(64 * (songs.len() + 1));
    out.push_str(HEADER);
    out.push('\n');
    for song in songs {
        out.push_str(&encode_row(song));
        out.push('\n');
    }
    out
}

/// Write `songs` as `songs_data.csv` under `dir`, overwriting any previous
/// export. Returns the full path written.
pub async fn write_csv(dir: &Path, songs: &[Song]) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(EXPORT_FILENAME);
    tokio::fs::write(&path, to_csv(songs)).await?;
    info!("exported {} songs to {}", songs.len(), path.display());
    Ok(path)
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: u64, title: &str) -> Song {
        Song {
            id,
            title: title.to_string(),
            danceability: 0.52,
            energy: 0.67,
            acousticness: 0.013,
            tempo: 108.03,
            duration_ms: 225_947,
            num_segments: 830,
            num_sections: 10,
            rating: 4,
        }
    }

    #[test]
    fn test_header_and_row_shape() {
        let csv = to_csv(&[song(7, "3AM")]);
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), HEADER);
        assert_eq!(
            lines.next().unwrap(),
            "7,3AM,0.52,0.67,0.013,108.03,225947,830,10,4"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_titles_with_commas_and_quotes_are_quoted() {
        let csv = to_csv(&[song(1, r#"Hello, "World""#)]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with(r#"1,"Hello, ""World""","#));
    }

    #[test]
    fn test_empty_list_exports_header_only() {
        let csv = to_csv(&[]);
        assert_eq!(csv, format!("{}\n", HEADER));
    }

    #[tokio::test]
    async fn test_write_csv_uses_fixed_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), &[song(1, "a"), song(2, "b")])
            .await
            .unwrap();
        assert_eq!(path.file_name().unwrap(), EXPORT_FILENAME);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }
}
