//! Metadata parser implementation using lofty

use crate::parsed::{split_tag_values, ParsedArtist, ParsedPerformer, ParsedRelease, ParsedTrack};
use crate::{MetadataError, MetadataParser, Result};
use lofty::{Accessor, AudioFile, ItemKey, Probe, Tag, TaggedFileExt};
use std::collections::BTreeMap;
use std::path::Path;

/// Tag dimensions always considered for clustering
const FIXED_TAG_DIMENSIONS: &[(&str, Option<ItemKey>)] = &[
    ("GENRE", None), // read through Accessor::genre
    ("MOOD", Some(ItemKey::Mood)),
    ("LANGUAGE", Some(ItemKey::Language)),
];

/// Metadata parser backed by the lofty library
#[derive(Default)]
pub struct LoftyParser;

impl LoftyParser {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataParser for LoftyParser {
    fn parse(&self, path: &Path, extra_tags: &[String]) -> Result<ParsedTrack> {
        if !path.exists() {
            return Err(MetadataError::FileNotFound(path.display().to_string()));
        }

        let tagged_file = Probe::open(path)
            .map_err(|e| MetadataError::Parse(format!("failed to open file: {e}")))?
            .read()
            .map_err(|e| MetadataError::Parse(format!("failed to read file: {e}")))?;

        let properties = tagged_file.properties();
        let duration_ms = properties.duration().as_millis() as i64;
        if duration_ms <= 0 {
            return Err(MetadataError::NoAudioStream(path.display().to_string()));
        }
        let bitrate = properties.audio_bitrate().map(i64::from);

        // Prefer the primary tag (ID3v2 for MP3, Vorbis for OGG/FLAC)
        let tag = tagged_file.primary_tag().or(tagged_file.first_tag());

        let mut parsed = match tag {
            Some(tag) => extract_from_tag(tag, extra_tags),
            None => ParsedTrack::default(),
        };

        parsed.duration_ms = duration_ms;
        parsed.bitrate = bitrate;

        // Fallback: use the file stem as title when the tags carry none
        if parsed.title.is_none() {
            parsed.title = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string());
        }

        Ok(parsed)
    }
}

fn extract_from_tag(tag: &Tag, extra_tags: &[String]) -> ParsedTrack {
    let artist_display_name = tag.artist().map(|s| s.to_string());

    let sort_name = get_string(tag, &ItemKey::Unknown("ARTISTSORT".to_string()));
    let artist_mbid = get_string(tag, &ItemKey::MusicBrainzArtistId);
    let artists: Vec<ParsedArtist> = item_strings(tag, &ItemKey::TrackArtist)
        .into_iter()
        .enumerate()
        .map(|(idx, name)| ParsedArtist {
            name,
            // Sort name and MBID are only unambiguous for a single credit
            sort_name: if idx == 0 { sort_name.clone() } else { None },
            mbid: if idx == 0 { artist_mbid.clone() } else { None },
        })
        .collect();

    let release = tag.album().map(|name| ParsedRelease {
        name: name.to_string(),
        mbid: get_string(tag, &ItemKey::MusicBrainzReleaseId),
        release_type: get_string(tag, &ItemKey::Unknown("RELEASETYPE".to_string())),
        artist_display_name: get_string(tag, &ItemKey::AlbumArtist),
    });

    let performers = role_values(tag, &ItemKey::Performer)
        .into_iter()
        .map(|credit| parse_performer(&credit))
        .collect();

    let mut tags: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (dimension, key) in FIXED_TAG_DIMENSIONS {
        let values = match key {
            Some(key) => item_strings(tag, key)
                .iter()
                .flat_map(|text| split_tag_values(text))
                .collect(),
            None => tag
                .genre()
                .map(|text| split_tag_values(&text))
                .unwrap_or_default(),
        };
        if !values.is_empty() {
            tags.insert((*dimension).to_string(), values);
        }
    }
    for name in extra_tags {
        let key = ItemKey::Unknown(name.clone());
        let values: Vec<String> = item_strings(tag, &key)
            .iter()
            .flat_map(|text| split_tag_values(text))
            .collect();
        if !values.is_empty() {
            tags.insert(name.clone(), values);
        }
    }

    ParsedTrack {
        title: tag.title().map(|s| s.to_string()),
        artist_display_name,
        artists,
        composers: role_values(tag, &ItemKey::Composer),
        conductors: role_values(tag, &ItemKey::Conductor),
        lyricists: role_values(tag, &ItemKey::Lyricist),
        mixers: role_values(tag, &ItemKey::MixEngineer),
        performers,
        producers: role_values(tag, &ItemKey::Producer),
        remixers: role_values(tag, &ItemKey::Remixer),
        release,
        track_number: tag.track().map(i64::from),
        disc_number: tag.disk().map(i64::from),
        duration_ms: 0,
        date: get_string(tag, &ItemKey::RecordingDate),
        original_date: get_string(tag, &ItemKey::OriginalReleaseDate),
        year: tag.year().map(i64::from),
        bitrate: None,
        // POPM-style ratings are backend specific, left to other services
        rating: None,
        has_cover: !tag.pictures().is_empty(),
        track_replay_gain: get_string(tag, &ItemKey::ReplayGainTrackGain)
            .as_deref()
            .and_then(parse_replay_gain),
        release_replay_gain: get_string(tag, &ItemKey::ReplayGainAlbumGain)
            .as_deref()
            .and_then(parse_replay_gain),
        copyright: get_string(tag, &ItemKey::CopyrightMessage),
        recording_mbid: get_string(tag, &ItemKey::MusicBrainzRecordingId),
        tags,
    }
}

/// First text value for a key
fn get_string(tag: &Tag, key: &ItemKey) -> Option<String> {
    tag.get_string(key).map(|s| s.to_string())
}

/// All text values carried by items with the given key
fn item_strings(tag: &Tag, key: &ItemKey) -> Vec<String> {
    tag.items()
        .filter(|item| item.key() == key)
        .filter_map(|item| item.value().text())
        .map(|s| s.to_string())
        .collect()
}

/// Role credits: one name per item, multiple names joined with ';' in one item
fn role_values(tag: &Tag, key: &ItemKey) -> Vec<String> {
    item_strings(tag, key)
        .iter()
        .flat_map(|text| text.split(';'))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse "Name (subrole)" performer credits
fn parse_performer(credit: &str) -> ParsedPerformer {
    if let Some(open) = credit.rfind('(') {
        if let Some(close) = credit.rfind(')') {
            if close > open {
                let name = credit[..open].trim();
                let subrole = credit[open + 1..close].trim();
                if !name.is_empty() && !subrole.is_empty() {
                    return ParsedPerformer {
                        name: name.to_string(),
                        subrole: Some(subrole.to_string()),
                    };
                }
            }
        }
    }
    ParsedPerformer {
        name: credit.trim().to_string(),
        subrole: None,
    }
}

/// Parse "-6.5 dB" style replay gain text
fn parse_replay_gain(text: &str) -> Option<f64> {
    text.trim()
        .trim_end_matches("dB")
        .trim_end_matches("DB")
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_replay_gain_strips_unit() {
        assert_eq!(parse_replay_gain("-6.5 dB"), Some(-6.5));
        assert_eq!(parse_replay_gain("2.0dB"), Some(2.0));
        assert_eq!(parse_replay_gain("1.25"), Some(1.25));
        assert_eq!(parse_replay_gain("loud"), None);
    }

    #[test]
    fn parse_performer_extracts_subrole() {
        let credit = parse_performer("Jane Doe (violin)");
        assert_eq!(credit.name, "Jane Doe");
        assert_eq!(credit.subrole.as_deref(), Some("violin"));

        let plain = parse_performer("John Doe");
        assert_eq!(plain.name, "John Doe");
        assert!(plain.subrole.is_none());
    }

    #[test]
    fn read_nonexistent_file_returns_error() {
        let parser = LoftyParser::new();
        let result = parser.parse(Path::new("/nonexistent/file.mp3"), &[]);
        assert!(matches!(result, Err(MetadataError::FileNotFound(_))));
    }

    #[test]
    fn read_garbage_file_returns_parse_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("garbage.mp3");
        std::fs::write(&path, b"definitely not an mp3").unwrap();

        let parser = LoftyParser::new();
        assert!(parser.parse(&path, &[]).is_err());
    }
}
