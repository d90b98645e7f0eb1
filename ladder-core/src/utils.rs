//! Utility functions for formatting and path handling.

use crate::error::{CoreError, CoreResult};

use std::path::Path;

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Returns the file name without its last extension, e.g. `movie.final` for
/// `/in/movie.final.mp4`.
pub fn file_stem_safe(path: &Path) -> CoreResult<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            CoreError::PathError(format!("Cannot derive a file stem from {}", path.display()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(59.9), "00:00:59");
        assert_eq!(format_duration(3725.0), "01:02:05");
        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
    }

    #[test]
    fn test_file_stem_safe() {
        assert_eq!(file_stem_safe(Path::new("/in/clip.mp4")).unwrap(), "clip");
        assert_eq!(file_stem_safe(Path::new("movie.final.mov")).unwrap(), "movie.final");
        assert_eq!(file_stem_safe(Path::new("noext")).unwrap(), "noext");
        assert!(matches!(file_stem_safe(Path::new("/")), Err(CoreError::PathError(_))));
    }
}
