use scrobbler::TrackPlay;
use url::form_urlencoded;

/// Decodes an inbound `application/x-www-form-urlencoded` scrobble.
///
/// Fields other than `sk`, `timestamp`, `artist`, `track` and `album` are
/// ignored. Missing fields stay empty and a repeated field keeps its last value.
pub fn parse_track_play(body: &[u8]) -> TrackPlay {
    let mut play = TrackPlay::default();

    for (key, value) in form_urlencoded::parse(body) {
        let slot = match &*key {
            "sk" => &mut play.session_key,
            "timestamp" => &mut play.timestamp,
            "artist" => &mut play.artist,
            "track" => &mut play.track,
            "album" => &mut play.album,
            _ => continue,
        };
        *slot = value.into_owned();
    }

    play
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_fields() {
        let play = parse_track_play(
            b"sk=abc123&timestamp=1700000000&artist=Sigur+R%C3%B3s&track=Hopp%C3%ADpolla&album=Takk...",
        );

        assert_eq!(
            play,
            TrackPlay {
                session_key: "abc123".into(),
                timestamp: "1700000000".into(),
                artist: "Sigur Rós".into(),
                track: "Hoppípolla".into(),
                album: "Takk...".into(),
            }
        );
    }

    #[test]
    fn test_missing_and_unknown_fields() {
        let play = parse_track_play(b"artist=A&track=T&duration=240&method=track.love");

        assert_eq!(play.artist, "A");
        assert_eq!(play.track, "T");
        assert_eq!(play.session_key, "");
        assert_eq!(play.timestamp, "");
        assert_eq!(play.album, "");
    }

    #[test]
    fn test_repeated_field_last_wins() {
        let play = parse_track_play(b"artist=First&artist=Second");
        assert_eq!(play.artist, "Second");
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(parse_track_play(b""), TrackPlay::default());
    }
}
