//! Records as returned by the remote listing endpoints

use crate::model::Creative;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One page of a cursor-paginated listing
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,

    #[serde(default)]
    pub paging: Option<Paging>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub cursors: Option<Cursors>,

    /// Present only when another page exists
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cursors {
    #[serde(default)]
    pub before: Option<String>,

    #[serde(default)]
    pub after: Option<String>,
}

impl<T> Page<T> {
    /// Cursor for the following page, if the listing continues
    pub fn next_cursor(&self) -> Option<&str> {
        let paging = self.paging.as_ref()?;
        paging.next.as_ref()?;
        paging.cursors.as_ref()?.after.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Campaign {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdSet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ad {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_creative")]
    pub creative: Option<Creative>,
}

/// Decodes a creative reference without failing the enclosing ad
///
/// A payload of the wrong shape keeps only its id, so resolution ends in
/// `none` instead of the ad disappearing from the listing.
fn lenient_creative<'de, D>(deserializer: D) -> Result<Option<Creative>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };

    match Creative::deserialize(&value) {
        Ok(creative) => Ok(Some(creative)),
        Err(e) => {
            let id = value.get("id").and_then(Value::as_str).map(str::to_string);
            tracing::warn!("Malformed creative {:?}: {}", id, e);
            Ok(Some(Creative {
                id,
                ..Default::default()
            }))
        }
    }
}
