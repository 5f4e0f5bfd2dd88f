use crate::config::TrackDisplayField;

use super::model::Track;

/// Build a display string for a track according to the provided `fields` and separator.
///
/// Falls back to the track name when no parts were produced.
pub fn display_from_fields(track: &Track, fields: &[TrackDisplayField], sep: &str) -> String {
    let title = track.name.trim();
    let artist = track.primary_artist().map(str::trim).filter(|s| !s.is_empty());
    let album = Some(track.album.name.trim()).filter(|s| !s.is_empty());

    let mut parts: Vec<&str> = Vec::new();

    for f in fields {
        match f {
            TrackDisplayField::Display => {
                parts.extend(artist);
                if !title.is_empty() {
                    parts.push(title);
                }
            }
            TrackDisplayField::Title => {
                if !title.is_empty() {
                    parts.push(title);
                }
            }
            TrackDisplayField::Artist => parts.extend(artist),
            TrackDisplayField::Album => parts.extend(album),
        }
    }

    if parts.is_empty() {
        track.name.clone()
    } else {
        parts.join(sep)
    }
}
