use super::definition::{Field, Page};
use super::rules::RuleSet;
use crate::error::{ScriptError, SnapshotError};
use ahash::AHashSet;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

/// A frozen copy of a script's pages and rules, read by the resolver for the
/// duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSnapshot {
    id: String,
    name: String,
    pages: Vec<Page>,
    rules: RuleSet,
}

impl ScriptSnapshot {
    /// Builds a snapshot, enforcing that it has pages and that page ids and
    /// field ids are unique across the script.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        pages: Vec<Page>,
        rules: RuleSet,
    ) -> Result<Self, ScriptError> {
        check_pages(&pages)?;
        Ok(Self {
            id: id.into(),
            name: name.into(),
            pages,
            rules,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every page in authored order, hidden ones included.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The navigable sequence: authored order with hidden pages removed.
    pub fn visible_pages(&self) -> Vec<&Page> {
        self.pages.iter().filter(|p| p.visible).collect()
    }

    pub fn first_visible_page(&self) -> Option<&Page> {
        self.pages.iter().find(|p| p.visible)
    }

    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    /// Looks up a field anywhere in the script.
    pub fn field(&self, field_id: &str) -> Option<&Field> {
        self.pages.iter().flat_map(|p| p.fields.iter()).find(|f| f.id == field_id)
    }

    pub(crate) fn pages_mut(&mut self) -> &mut Vec<Page> {
        &mut self.pages
    }

    pub(crate) fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Vec<Page>, &mut RuleSet) {
        (&mut self.pages, &mut self.rules)
    }

    /// Saves the snapshot to a file using the bincode format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path).map_err(|e| io_error(path, e))?;
        file.write_all(&bytes).map_err(|e| io_error(path, e))?;
        Ok(())
    }

    /// Loads a snapshot previously written by [`ScriptSnapshot::save`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let mut file = fs::File::open(path).map_err(|e| io_error(path, e))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| io_error(path, e))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        encode_to_vec(self, standard()).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Deserializes a snapshot and re-checks its invariants.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let (snapshot, _): (Self, usize) = decode_from_slice(bytes, standard())
            .map_err(|e| SnapshotError::Decode(e.to_string()))?;
        check_pages(&snapshot.pages).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        Ok(snapshot)
    }
}

fn check_pages(pages: &[Page]) -> Result<(), ScriptError> {
    if pages.is_empty() {
        return Err(ScriptError::NoPages);
    }

    let mut page_ids = AHashSet::new();
    let mut field_ids = AHashSet::new();
    for page in pages {
        if !page_ids.insert(page.id.as_str()) {
            return Err(ScriptError::DuplicatePageId(page.id.clone()));
        }
        for field in &page.fields {
            if !field_ids.insert(field.id.as_str()) {
                return Err(ScriptError::DuplicateFieldId {
                    page_id: page.id.clone(),
                    field_id: field.id.clone(),
                });
            }
        }
    }
    Ok(())
}

fn io_error(path: &Path, e: std::io::Error) -> SnapshotError {
    SnapshotError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}
