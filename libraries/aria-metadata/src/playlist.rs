//! Playlist file parsing
//!
//! M3U/M3U8 text parsing. Deliberately permissive: `#EXTM3U` is not
//! required, unknown comment directives are ignored, and entries containing
//! a ':' are treated as URLs and dropped (local paths never carry one).

/// A parsed playlist file: an optional display name and the listed paths,
/// in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPlaylist {
    /// Set by a `#PLAYLIST:` directive
    pub name: Option<String>,
    /// Entry paths as written, absolute or relative to the playlist
    pub entries: Vec<String>,
}

/// Parse M3U/M3U8 playlist text
pub fn parse_playlist(text: &str) -> ParsedPlaylist {
    let mut playlist = ParsedPlaylist::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('#') {
            if let Some(name) = rest.strip_prefix("PLAYLIST:") {
                let name = name.trim();
                if !name.is_empty() {
                    playlist.name = Some(name.to_string());
                }
            }
            continue;
        }

        if line.contains(':') {
            continue;
        }

        playlist.entries.push(line.to_string());
    }

    playlist
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_playlist_collects_entries_in_order() {
        let playlist = parse_playlist("#EXTM3U\n01.flac\n\nsub/02.flac\n");
        assert!(playlist.name.is_none());
        assert_eq!(playlist.entries, vec!["01.flac", "sub/02.flac"]);
    }

    #[test]
    fn parse_playlist_reads_name_directive() {
        let playlist = parse_playlist("#PLAYLIST: Morning Mix \n01.flac\n");
        assert_eq!(playlist.name.as_deref(), Some("Morning Mix"));
    }

    #[test]
    fn parse_playlist_skips_urls_and_comments() {
        let playlist =
            parse_playlist("#EXTINF:180,Song\nhttp://example.com/x.mp3\n/music/a.flac\n");
        assert_eq!(playlist.entries, vec!["/music/a.flac"]);
    }

    #[test]
    fn parse_playlist_tolerates_missing_header() {
        let playlist = parse_playlist("a.flac");
        assert_eq!(playlist.entries, vec!["a.flac"]);
    }
}
