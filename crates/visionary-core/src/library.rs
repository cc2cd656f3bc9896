//! User component library persisted under a single storage key.

use crate::element::{Element, ElementId};
use crate::storage::{Storage, StorageError, StorageResult};
use serde::{Deserialize, Serialize};

/// Storage key holding the serialized component list.
pub const LIBRARY_STORAGE_KEY: &str = "visionary.component-library";

/// A saved reusable component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryComponent {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub template: Element,
}

impl LibraryComponent {
    pub fn new(name: impl Into<String>, description: impl Into<String>, template: Element) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            template,
        }
    }

    /// Clone the template with fresh ids throughout.
    pub fn instantiate(&self) -> Element {
        let mut element = self.template.clone();
        refresh_ids(&mut element);
        element
    }
}

fn refresh_ids(element: &mut Element) {
    element.id = ElementId::generate();
    element.children.iter_mut().for_each(refresh_ids);
}

/// The user's component library.
///
/// Read once on load; every change rewrites the whole list.
pub struct ComponentLibrary<S: Storage> {
    storage: S,
    components: Vec<LibraryComponent>,
}

impl<S: Storage> ComponentLibrary<S> {
    /// An empty library that has not been read from storage.
    pub fn empty(storage: S) -> Self {
        Self {
            storage,
            components: Vec::new(),
        }
    }

    /// Read the library from storage. A missing key yields an empty library.
    pub async fn load(storage: S) -> StorageResult<Self> {
        let mut library = Self::empty(storage);
        library.reload().await?;
        Ok(library)
    }

    /// Replace the in-memory list with the stored one.
    ///
    /// On error the in-memory list is left unchanged.
    pub async fn reload(&mut self) -> StorageResult<()> {
        self.components = match self.storage.load(LIBRARY_STORAGE_KEY).await {
            Ok(json) => serde_json::from_str(&json).map_err(|e| {
                StorageError::Serialization(format!("Corrupt component library: {}", e))
            })?,
            Err(StorageError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        log::debug!("Loaded {} library components", self.components.len());
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn components(&self) -> &[LibraryComponent] {
        &self.components
    }

    pub fn iter(&self) -> impl Iterator<Item = &LibraryComponent> {
        self.components.iter()
    }

    pub fn get(&self, index: usize) -> Option<&LibraryComponent> {
        self.components.get(index)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Append a component and persist the list.
    ///
    /// The in-memory list is left unchanged if the write fails.
    pub async fn add(&mut self, component: LibraryComponent) -> StorageResult<()> {
        let mut next = self.components.clone();
        next.push(component);
        self.persist(next).await
    }

    /// Remove the component at `index` and persist the list.
    ///
    /// Returns the removed component, or `None` if the index is out of range.
    pub async fn remove(&mut self, index: usize) -> StorageResult<Option<LibraryComponent>> {
        if index >= self.components.len() {
            return Ok(None);
        }
        let mut next = self.components.clone();
        let removed = next.remove(index);
        self.persist(next).await?;
        Ok(Some(removed))
    }

    /// Drop every component and remove the stored key.
    pub async fn clear(&mut self) -> StorageResult<()> {
        self.storage.delete(LIBRARY_STORAGE_KEY).await?;
        log::info!("Component library cleared");
        self.components.clear();
        Ok(())
    }

    /// A fresh copy of the template at `index`, ready for insertion.
    pub fn instantiate(&self, index: usize) -> Option<Element> {
        self.components.get(index).map(LibraryComponent::instantiate)
    }

    async fn persist(&mut self, components: Vec<LibraryComponent>) -> StorageResult<()> {
        let json = serde_json::to_string(&components)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.save(LIBRARY_STORAGE_KEY, &json).await?;
        log::info!("Component library saved ({} components)", components.len());
        self.components = components;
        Ok(())
    }
}
