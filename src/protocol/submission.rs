//! Now-playing notifications and scrobble submissions.
//!
//! Both are form encoded POST requests to a URL obtained from the handshake.
//! Absent optional fields are sent as empty values: the servers expect every
//! key to be present.
//!
//! Submissions use indexed keys (`a[0]`, `t[0]`, ...) because the protocol
//! accepts up to 50 tracks per request. Only index 0 is used here.

use super::{optional, param, Params};
use crate::{
    track::{Scrobble, Track},
    util,
};

/// Builds the parameters of a now-playing notification.
#[must_use]
pub fn now_playing_params(session_key: &str, track: &Track) -> Params {
    let mut params = Params::with_capacity(7);
    param(&mut params, "s", session_key);
    param(&mut params, "a", &track.artist);
    param(&mut params, "t", &track.title);
    optional(&mut params, "b", track.album.as_ref());
    optional(&mut params, "i", track.length.map(|length| length.as_secs()));
    optional(&mut params, "n", track.track_number);
    optional(&mut params, "m", track.mbid);
    params
}

/// Builds the parameters of a single-track submission.
#[must_use]
pub fn scrobble_params(session_key: &str, scrobble: &Scrobble) -> Params {
    let track = &scrobble.track;

    let mut params = Params::with_capacity(10);
    param(&mut params, "s", session_key);
    param(&mut params, "a[0]", &track.artist);
    param(&mut params, "t[0]", &track.title);
    param(&mut params, "i[0]", util::to_epoch(scrobble.started_at));
    param(&mut params, "o[0]", &scrobble.source);
    optional(&mut params, "r[0]", scrobble.rating);
    optional(&mut params, "l[0]", track.length.map(|length| length.as_secs()));
    optional(&mut params, "b[0]", track.album.as_ref());
    optional(&mut params, "n[0]", track.track_number);
    optional(&mut params, "m[0]", track.mbid);
    params
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use uuid::Uuid;

    use super::*;
    use crate::track::{Rating, Source};

    fn value<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_now_playing_params() {
        let mbid = Uuid::parse_str("6a2a6a4e-0a4c-4b87-a8f4-3a4b0b9b3e0f").unwrap();
        let track = Track::new("Nina Simone", "Sinnerman")
            .with_album("Pastel Blues")
            .with_length(Duration::from_millis(622_400))
            .with_track_number(9)
            .with_mbid(mbid);
        let params = now_playing_params("key", &track);

        let keys: Vec<_> = params.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["s", "a", "t", "b", "i", "n", "m"]);
        assert_eq!(value(&params, "s"), Some("key"));
        assert_eq!(value(&params, "a"), Some("Nina Simone"));
        assert_eq!(value(&params, "t"), Some("Sinnerman"));
        assert_eq!(value(&params, "b"), Some("Pastel Blues"));
        assert_eq!(value(&params, "i"), Some("622"));
        assert_eq!(value(&params, "n"), Some("9"));
        assert_eq!(value(&params, "m"), Some("6a2a6a4e-0a4c-4b87-a8f4-3a4b0b9b3e0f"));
    }

    #[test]
    fn test_now_playing_absent_fields_are_empty() {
        let params = now_playing_params("key", &Track::new("Nina Simone", "Sinnerman"));
        for key in ["b", "i", "n", "m"] {
            assert_eq!(value(&params, key), Some(""), "{key}");
        }
    }

    #[test]
    fn test_scrobble_params() {
        let track = Track::new("Nina Simone", "Sinnerman").with_length(Duration::from_secs(622));
        let scrobble = Scrobble::new(track, UNIX_EPOCH + Duration::from_secs(1_700_000_000))
            .with_source(Source::LastFm(Some("1b48a".into())))
            .with_rating(Rating::Love);
        let params = scrobble_params("key", &scrobble);

        let keys: Vec<_> = params.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(
            keys,
            ["s", "a[0]", "t[0]", "i[0]", "o[0]", "r[0]", "l[0]", "b[0]", "n[0]", "m[0]"]
        );
        assert_eq!(value(&params, "i[0]"), Some("1700000000"));
        assert_eq!(value(&params, "o[0]"), Some("L1b48a"));
        assert_eq!(value(&params, "r[0]"), Some("L"));
        assert_eq!(value(&params, "l[0]"), Some("622"));
    }

    #[test]
    fn test_scrobble_absent_album_is_empty() {
        let track = Track::new("Nina Simone", "Sinnerman").with_length(Duration::from_secs(622));
        let params = scrobble_params("key", &Scrobble::new(track, UNIX_EPOCH));

        assert_eq!(value(&params, "b[0]"), Some(""));
        assert_eq!(value(&params, "r[0]"), Some(""));
        assert_eq!(value(&params, "n[0]"), Some(""));
        assert_eq!(value(&params, "m[0]"), Some(""));
        assert_eq!(value(&params, "o[0]"), Some("P"));
    }
}
