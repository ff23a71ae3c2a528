use md5::{Digest, Md5};
use url::form_urlencoded;

/// Upstream API method invoked for every submission.
pub const METHOD: &str = "track.scrobble";

const SIGNATURE_FIELD: &str = "api_sig";

/// One play of a track, as reported by the caller.
///
/// None of the fields are validated. Missing values are sent as empty strings
/// and the upstream decides whether to accept them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackPlay {
    pub session_key: String,
    /// Seconds since the epoch at which the track started playing.
    pub timestamp: String,
    pub artist: String,
    pub track: String,
    pub album: String,
}

/// The unsigned parameter set of a `track.scrobble` call.
///
/// Pairs are kept sorted by key (byte-wise) from construction on, so both the
/// signature base string and the form body have a fixed layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrobbleParameters {
    pairs: [(&'static str, String); 7],
}

impl ScrobbleParameters {
    pub fn new(api_key: &str, play: TrackPlay) -> Self {
        let TrackPlay {
            session_key,
            timestamp,
            artist,
            track,
            album,
        } = play;

        let mut pairs = [
            ("method", METHOD.to_string()),
            ("api_key", api_key.to_string()),
            ("sk", session_key),
            ("timestamp", timestamp),
            ("artist", artist),
            ("track", track),
            ("album", album),
        ];
        pairs.sort_unstable_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

        Self { pairs }
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `key1value1key2value2...secret`, keys in ascending byte order.
    pub fn signature_base(&self, secret: &str) -> String {
        let mut base = String::new();
        for (key, value) in self.pairs() {
            base.push_str(key);
            base.push_str(value);
        }
        base.push_str(secret);
        base
    }

    /// Lowercase hex MD5 of the signature base string.
    pub fn signature(&self, secret: &str) -> String {
        hex::encode(Md5::digest(self.signature_base(secret).as_bytes()))
    }

    pub fn sign(self, secret: &str) -> SignedScrobble {
        let api_sig = self.signature(secret);
        SignedScrobble {
            params: self,
            api_sig,
        }
    }
}

/// Parameters plus their `api_sig`, ready to be posted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedScrobble {
    params: ScrobbleParameters,
    api_sig: String,
}

impl SignedScrobble {
    pub fn api_sig(&self) -> &str {
        &self.api_sig
    }

    pub fn params(&self) -> &ScrobbleParameters {
        &self.params
    }

    /// `application/x-www-form-urlencoded` body carrying all eight fields.
    pub fn form_body(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.pairs())
            .append_pair(SIGNATURE_FIELD, &self.api_sig)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn reference_play() -> TrackPlay {
        TrackPlay {
            session_key: "S".into(),
            timestamp: "1000".into(),
            artist: "A".into(),
            track: "T".into(),
            album: "".into(),
        }
    }

    #[test]
    fn test_signature_base() {
        let params = ScrobbleParameters::new("K", reference_play());

        assert_eq!(
            params.signature_base("X"),
            "albumapi_keyKartistAmethodtrack.scrobbleskStimestamp1000trackTX"
        );
        assert_eq!(params.signature("X"), "c5d5b91c313d120ff4a12ed05326c638");
    }

    #[test]
    fn test_keys_sorted() {
        let params = ScrobbleParameters::new("K", reference_play());
        let keys: Vec<&str> = params.pairs().map(|(k, _)| k).collect();

        assert_eq!(
            keys,
            ["album", "api_key", "artist", "method", "sk", "timestamp", "track"]
        );
    }

    #[test]
    fn test_signature_with_spaces() {
        let play = TrackPlay {
            session_key: "session-1".into(),
            timestamp: "1700000000".into(),
            artist: "Pink Floyd".into(),
            track: "Hey You".into(),
            album: "The Wall".into(),
        };
        let signed = ScrobbleParameters::new("b27b", play).sign("s3cr3t");

        assert_eq!(signed.api_sig(), "543a12b3cecda3d8a25ba0d58eafba51");
    }

    #[test]
    fn test_deterministic() {
        let first = ScrobbleParameters::new("K", reference_play()).sign("X");
        let second = ScrobbleParameters::new("K", reference_play()).sign("X");

        assert_eq!(first.api_sig(), second.api_sig());
        assert_eq!(first.form_body(), second.form_body());
        assert_eq!(first.api_sig().len(), 32);
        assert!(
            first
                .api_sig()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn test_signature_excludes_api_sig() {
        let signed = ScrobbleParameters::new("K", reference_play()).sign("X");
        let base = signed.params().signature_base("X");

        assert!(!base.contains("api_sig"));
        // Signing the already signed parameters again must not change anything.
        assert_eq!(signed.params().signature("X"), signed.api_sig());
    }

    #[test]
    fn test_form_body_fields() {
        let play = TrackPlay {
            album: "Hits & Misses".into(),
            ..reference_play()
        };
        let signed = ScrobbleParameters::new("K", play).sign("X");
        let body = signed.form_body();

        let fields: Vec<(String, String)> = form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(fields.len(), 8);

        let fields: HashMap<String, String> = fields.into_iter().collect();
        assert_eq!(fields.len(), 8);
        assert_eq!(fields["method"], "track.scrobble");
        assert_eq!(fields["api_key"], "K");
        assert_eq!(fields["sk"], "S");
        assert_eq!(fields["timestamp"], "1000");
        assert_eq!(fields["artist"], "A");
        assert_eq!(fields["track"], "T");
        assert_eq!(fields["album"], "Hits & Misses");
        assert_eq!(fields["api_sig"], signed.api_sig());

        // The signature covers the decoded value, not the encoded one.
        assert!(
            signed
                .params()
                .signature_base("X")
                .starts_with("albumHits & Misses")
        );
    }

    #[test]
    fn test_secret_changes_signature() {
        let params = ScrobbleParameters::new("K", reference_play());
        assert_ne!(params.signature("X"), params.signature("Y"));
    }
}
