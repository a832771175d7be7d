//! Product metadata collected by the upload wizard.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Listing visibility of a product.
///
/// `Draft` is the implicit state of a session that has not been finalized yet; it is
/// never persisted as a listing visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Unlisted,
    #[default]
    Draft,
}

impl Visibility {
    /// Visibility a product is registered with. Unfinalized drafts list as private.
    pub fn finalized(self) -> Self {
        match self {
            Visibility::Draft => Visibility::Private,
            other => other,
        }
    }
}

impl FromStr for Visibility {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            "unlisted" => Ok(Visibility::Unlisted),
            "draft" => Ok(Visibility::Draft),
            _ => Err(anyhow::anyhow!("Invalid visibility: {}", s)),
        }
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Unlisted => write!(f, "unlisted"),
            Visibility::Draft => write!(f, "draft"),
        }
    }
}

/// Free-form product fields, filled in incrementally across wizard steps.
///
/// No cross-field validation happens at this layer; `bpm` in particular is kept as the
/// raw form value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMetadata {
    pub title: String,
    pub bpm: String,
    pub description: String,
    pub visibility: Visibility,
    pub tags: Vec<String>,
}

/// A single metadata edit. Tags are edited through the session's tag operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataField {
    Title(String),
    Bpm(String),
    Description(String),
    Visibility(Visibility),
}

impl ProductMetadata {
    pub fn apply(&mut self, field: MetadataField) {
        match field {
            MetadataField::Title(value) => self.title = value,
            MetadataField::Bpm(value) => self.bpm = value,
            MetadataField::Description(value) => self.description = value,
            MetadataField::Visibility(value) => self.visibility = value,
        }
    }
}
