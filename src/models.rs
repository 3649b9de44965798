//! Catalog data model
//!
//! An [`Artist`] is the aggregate root: it owns an ordered list of
//! [`Album`]s, and each album owns an ordered list of [`Song`]s. Albums and
//! songs have no identity of their own and are only reachable through their
//! artist.
//!
//! Untrusted JSON never becomes a model directly. Request bodies go through
//! [`ArtistDraft::from_value`] (or [`ArtistDraft::batch_from_value`]), which
//! rejects missing, `null`, empty or mistyped required fields and reports
//! every failing field by its path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Length of a rendered artist id (12 random bytes, hex encoded)
pub const ARTIST_ID_LEN: usize = 24;

// ============================================================================
// Identity
// ============================================================================

/// Store-assigned artist identifier
///
/// Rendered as a 24-character lowercase hex string in JSON and URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtistId(String);

impl ArtistId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        let bytes: [u8; ARTIST_ID_LEN / 2] = rand::random();
        let hex = bytes.iter().map(|b| format!("{b:02x}")).collect();
        Self(hex)
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returned when a string is not a well-formed artist id
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid artist id: {0}")]
pub struct InvalidArtistId(pub String);

impl FromStr for ArtistId {
    type Err = InvalidArtistId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == ARTIST_ID_LEN && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(InvalidArtistId(s.to_string()))
        }
    }
}

impl TryFrom<String> for ArtistId {
    type Error = InvalidArtistId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArtistId> for String {
    fn from(id: ArtistId) -> Self {
        id.0
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A song, owned by an album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub length: String,
}

/// An album, owned by an artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub songs: Vec<Song>,
}

/// A validated artist document that has not been given an id yet
///
/// Used as the payload for both creation and whole-document replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistDraft {
    pub name: String,
    #[serde(default)]
    pub albums: Vec<Album>,
}

/// A stored artist document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    #[serde(default)]
    pub albums: Vec<Album>,
}

impl Artist {
    /// Attach an id to a validated draft
    pub fn from_draft(id: ArtistId, draft: ArtistDraft) -> Self {
        Self {
            id,
            name: draft.name,
            albums: draft.albums,
        }
    }

    /// Strip the id, keeping the document body
    pub fn into_draft(self) -> ArtistDraft {
        ArtistDraft {
            name: self.name,
            albums: self.albums,
        }
    }

    /// Every song of every album, in album order then song order
    pub fn songs(&self) -> impl Iterator<Item = &Song> {
        self.albums.iter().flat_map(|album| album.songs.iter())
    }

    /// Owned, flattened song list
    pub fn song_list(&self) -> Vec<Song> {
        self.songs().cloned().collect()
    }
}

// ============================================================================
// Validation
// ============================================================================

/// What was wrong with a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    /// Absent or `null`
    Missing,
    /// Present but an empty string
    Empty,
    /// Present with the wrong JSON type
    WrongType { expected: &'static str },
}

/// A single failing field, addressed by its dotted path
/// (e.g. `albums.0.songs.2.length`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub problem: FieldProblem,
}

impl FieldError {
    fn leaf(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            FieldProblem::Missing | FieldProblem::Empty => {
                write!(f, "{}: Path `{}` is required.", self.path, self.leaf())
            }
            FieldProblem::WrongType { expected } => {
                write!(f, "{}: Path `{}` must be {}.", self.path, self.leaf(), expected)
            }
        }
    }
}

/// Write-time validation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more fields failed their rules
    #[error("Artist validation failed: {}", join_fields(.0))]
    Fields(Vec<FieldError>),

    /// The body could not be read as an artist payload at all
    #[error("Invalid request body: {0}")]
    Body(String),
}

impl ValidationError {
    /// Field errors, empty for body-level failures
    pub fn fields(&self) -> &[FieldError] {
        match self {
            Self::Fields(errors) => errors,
            Self::Body(_) => &[],
        }
    }

    /// Whether a field at `path` failed
    pub fn has_path(&self, path: &str) -> bool {
        self.fields().iter().any(|e| e.path == path)
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collects field errors while walking a JSON document
#[derive(Default)]
struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    fn fail(&mut self, path: String, problem: FieldProblem) {
        self.errors.push(FieldError { path, problem });
    }

    fn required_string(&mut self, obj: &Map<String, Value>, key: &str, prefix: &str) -> String {
        let path = join_path(prefix, key);
        match obj.get(key) {
            None | Some(Value::Null) => self.fail(path, FieldProblem::Missing),
            Some(Value::String(s)) if s.is_empty() => self.fail(path, FieldProblem::Empty),
            Some(Value::String(s)) => return s.clone(),
            Some(_) => self.fail(path, FieldProblem::WrongType { expected: "a string" }),
        }
        String::new()
    }

    /// Absent or `null` sequences are treated as empty
    fn sequence<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        key: &str,
        prefix: &str,
    ) -> &'a [Value] {
        match obj.get(key) {
            None | Some(Value::Null) => &[],
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.fail(join_path(prefix, key), FieldProblem::WrongType { expected: "an array" });
                &[]
            }
        }
    }

    fn object<'a>(&mut self, value: &'a Value, path: String) -> Option<&'a Map<String, Value>> {
        match value {
            Value::Object(obj) => Some(obj),
            Value::Null => {
                self.fail(path, FieldProblem::Missing);
                None
            }
            _ => {
                self.fail(path, FieldProblem::WrongType { expected: "an object" });
                None
            }
        }
    }

    fn song(&mut self, obj: &Map<String, Value>, prefix: &str) -> Song {
        Song {
            title: self.required_string(obj, "title", prefix),
            length: self.required_string(obj, "length", prefix),
        }
    }

    fn album(&mut self, obj: &Map<String, Value>, prefix: &str) -> Album {
        let title = self.required_string(obj, "title", prefix);
        let description = self.required_string(obj, "description", prefix);
        let songs_prefix = join_path(prefix, "songs");
        let songs = self
            .sequence(obj, "songs", prefix)
            .iter()
            .enumerate()
            .filter_map(|(i, value)| {
                let path = join_path(&songs_prefix, &i.to_string());
                self.object(value, path.clone()).map(|song| self.song(song, &path))
            })
            .collect();

        Album {
            title,
            description,
            songs,
        }
    }

    fn artist(&mut self, obj: &Map<String, Value>, prefix: &str) -> ArtistDraft {
        let name = self.required_string(obj, "name", prefix);
        let albums_prefix = join_path(prefix, "albums");
        let albums = self
            .sequence(obj, "albums", prefix)
            .iter()
            .enumerate()
            .filter_map(|(i, value)| {
                let path = join_path(&albums_prefix, &i.to_string());
                self.object(value, path.clone()).map(|album| self.album(album, &path))
            })
            .collect();

        ArtistDraft { name, albums }
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError::Fields(self.errors))
        }
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

impl ArtistDraft {
    /// Validate a single artist object
    ///
    /// Unknown fields, including any client-supplied `id`, are ignored.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let Value::Object(obj) = value else {
            return Err(ValidationError::Body(
                "expected a JSON object describing an artist".to_string(),
            ));
        };

        let mut validator = Validator::default();
        let draft = validator.artist(obj, "");
        validator.finish(draft)
    }

    /// Validate a create payload: one artist object or an array of them
    ///
    /// The batch is rejected as a whole if any element fails. Field paths of
    /// array elements are prefixed with the element index (`1.albums.0.title`).
    pub fn batch_from_value(value: &Value) -> Result<Vec<Self>, ValidationError> {
        match value {
            Value::Object(_) => Self::from_value(value).map(|draft| vec![draft]),
            Value::Array(items) => {
                let mut validator = Validator::default();
                let drafts = items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| {
                        let prefix = i.to_string();
                        validator
                            .object(item, prefix.clone())
                            .map(|obj| validator.artist(obj, &prefix))
                    })
                    .collect();
                validator.finish(drafts)
            }
            _ => Err(ValidationError::Body(
                "expected an artist object or an array of artist objects".to_string(),
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
