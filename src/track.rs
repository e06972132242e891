//! Play events reported to the submission servers.
//!
//! A [`Track`] describes what is playing and is all a now-playing
//! notification needs. A [`Scrobble`] adds when the track started, how it
//! was selected ([`Source`]) and an optional [`Rating`].
//!
//! Codes parsed from text are checked on the way in, so an unknown source or
//! rating is rejected before it can become part of a [`Scrobble`]. The rules
//! that relate fields to each other are checked by [`Scrobble::validate`].

use std::{fmt, str::FromStr, time::Duration, time::SystemTime};

use uuid::Uuid;

use crate::error::{Error, Result};

/// Track metadata shared by now-playing notifications and scrobbles.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Track {
    pub artist: String,
    pub title: String,
    pub album: Option<String>,

    /// Length of the track, sent in whole seconds.
    pub length: Option<Duration>,

    /// Position of the track on the album.
    pub track_number: Option<u32>,

    /// MusicBrainz track ID.
    pub mbid: Option<Uuid>,
}

impl Track {
    /// Tracks this short or shorter must not be scrobbled.
    const MIN_LENGTH: Duration = Duration::from_secs(30);

    /// Playing this long always makes a track eligible, however long it is.
    const SCROBBLE_AFTER: Duration = Duration::from_secs(240);

    #[must_use]
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: Duration) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn with_track_number(mut self, track_number: u32) -> Self {
        self.track_number = Some(track_number);
        self
    }

    #[must_use]
    pub fn with_mbid(mut self, mbid: Uuid) -> Self {
        self.mbid = Some(mbid);
        self
    }

    /// Checks that artist and title are present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either is empty.
    pub fn validate(&self) -> Result<()> {
        if self.artist.is_empty() {
            return Err(Error::validation("artist is required"));
        }
        if self.title.is_empty() {
            return Err(Error::validation("track is required"));
        }

        Ok(())
    }

    /// Whether a track that has been `played` this long may be scrobbled.
    ///
    /// A track qualifies when it is longer than 30 seconds and was played for
    /// 240 seconds or half its length, whichever comes first. Without a
    /// known length only the 240 second threshold applies.
    ///
    /// [`Session::submit`](crate::session::Session::submit) does not call
    /// this: deciding whether enough was heard is up to the player.
    #[must_use]
    pub fn is_eligible(&self, played: Duration) -> bool {
        match self.length {
            Some(length) => {
                length > Self::MIN_LENGTH && played >= Self::SCROBBLE_AFTER.min(length / 2)
            }
            None => played >= Self::SCROBBLE_AFTER,
        }
    }
}

/// How the track was selected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Source {
    /// Chosen by the user. Requires a track length.
    #[default]
    User,

    /// Non-personalised broadcast, such as internet radio.
    Broadcast,

    /// Personalised recommendation from a service other than Last.fm.
    Recommendation,

    /// Last.fm, with the recommendation key when one was issued.
    LastFm(Option<String>),
}

impl Source {
    /// The one-letter code of this kind of source.
    #[must_use]
    pub fn code(&self) -> char {
        match self {
            Self::User => 'P',
            Self::Broadcast => 'R',
            Self::Recommendation => 'E',
            Self::LastFm(_) => 'L',
        }
    }
}

impl fmt::Display for Source {
    /// Formats the source as sent on the wire, e.g. `P` or `L1b48a`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())?;
        if let Self::LastFm(Some(key)) = self {
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl FromStr for Source {
    type Err = Error;

    /// Parses a source code.
    ///
    /// The first character selects the kind. Only `L` may be followed by
    /// more characters, which are taken as the recommendation key.
    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let code = chars.next();
        let rest = chars.as_str();

        let source = match code {
            Some('P') => Self::User,
            Some('R') => Self::Broadcast,
            Some('E') => Self::Recommendation,
            Some('L') => {
                return Ok(Self::LastFm((!rest.is_empty()).then(|| rest.to_owned())));
            }
            _ => {
                return Err(Error::validation(format!(
                    "invalid source ({s}), possible values are: P, R, E, L"
                )))
            }
        };

        if rest.is_empty() {
            Ok(source)
        } else {
            Err(Error::validation(format!(
                "invalid source ({s}), only L takes a recommendation key"
            )))
        }
    }
}

/// Rating attached to a scrobble.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rating {
    /// The user loved the track. Implies a listen.
    Love,

    /// The user banned the track. Implies a skip. Last.fm sources only.
    Ban,

    /// The user skipped the track. Last.fm sources only.
    Skip,
}

impl Rating {
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Self::Love => 'L',
            Self::Ban => 'B',
            Self::Skip => 'S',
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Rating {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "L" => Ok(Self::Love),
            "B" => Ok(Self::Ban),
            "S" => Ok(Self::Skip),
            _ => Err(Error::validation(format!(
                "invalid rating ({s}), possible values are: L, B, S"
            ))),
        }
    }
}

/// A finished track ready for submission.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scrobble {
    pub track: Track,

    /// When the track started playing.
    pub started_at: SystemTime,

    pub source: Source,
    pub rating: Option<Rating>,
}

impl Scrobble {
    /// Creates a scrobble chosen by the user, without a rating.
    #[must_use]
    pub fn new(track: Track, started_at: SystemTime) -> Self {
        Self {
            track,
            started_at,
            source: Source::default(),
            rating: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Checks that this is a legal submission.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if:
    /// * artist or title is empty
    /// * the source is [`Source::User`] and no length is set
    /// * the rating is [`Rating::Ban`] or [`Rating::Skip`] and the source is
    ///   not [`Source::LastFm`]
    pub fn validate(&self) -> Result<()> {
        self.track.validate()?;

        if self.source == Source::User && self.track.length.is_none() {
            return Err(Error::validation("length is required when source is P"));
        }

        if let Some(rating @ (Rating::Ban | Rating::Skip)) = self.rating {
            if !matches!(self.source, Source::LastFm(_)) {
                return Err(Error::validation(format!(
                    "{rating} can only be used when source is L"
                )));
            }
        }

        Ok(())
    }
}
