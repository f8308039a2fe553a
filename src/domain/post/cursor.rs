use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::post::value_objects::PostId;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, SecondsFormat, Utc};

/// Position in the forward scan over published posts, ordered by
/// `(published_utc, id)` ascending.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublishedCursor {
    pub published_utc: DateTime<Utc>,
    pub id: PostId,
}

impl PublishedCursor {
    pub fn new(published_utc: DateTime<Utc>, id: PostId) -> Self {
        Self { published_utc, id }
    }

    /// True when `(published_utc, id)` sorts strictly after this cursor.
    pub fn precedes(&self, published_utc: DateTime<Utc>, id: &PostId) -> bool {
        (published_utc, id) > (self.published_utc, &self.id)
    }

    pub fn encode(&self) -> String {
        let raw = format!(
            "{}|{}",
            self.published_utc
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            self.id
        );
        URL_SAFE_NO_PAD.encode(raw.as_bytes())
    }

    pub fn decode(token: &str) -> DomainResult<Self> {
        let invalid = || DomainError::Validation("invalid cursor token".into());
        let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
        let raw = String::from_utf8(bytes).map_err(|_| invalid())?;
        let (published_s, id_s) = raw.split_once('|').ok_or_else(invalid)?;
        let published_utc = DateTime::parse_from_rfc3339(published_s)
            .map_err(|_| invalid())?
            .with_timezone(&Utc);
        let id = PostId::new(id_s).map_err(|_| invalid())?;
        Ok(Self::new(published_utc, id))
    }
}
