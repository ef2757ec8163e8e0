//! Lookup of stored binary resources by type code and id.
//!
//! The resource manager proper lives outside this crate; [`ResourceStore`] is
//! the read-only view `populate` needs from it.

use crate::codec::ResourceError;
use crate::resource::Resource;
use std::collections::HashMap;

pub trait ResourceStore {
    /// Raw bytes of resource `id` of type `code`, if present.
    fn find(&self, code: &str, id: i64) -> Option<&[u8]>;
}

/// In-memory store keyed by (type code, id).
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    resources: HashMap<(String, i64), StoredResource>,
}

#[derive(Debug, Clone)]
struct StoredResource {
    name: String,
    data: Vec<u8>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, id: i64, name: impl Into<String>, data: Vec<u8>) {
        self.resources.insert(
            (code.into(), id),
            StoredResource {
                name: name.into(),
                data,
            },
        );
    }

    /// Assemble `resource` and store the result under its code and id.
    pub fn add_resource(&mut self, resource: &Resource<'_>) -> Result<(), ResourceError> {
        let data = resource.assemble()?;
        log::debug!(
            "storing {} #{} ({} bytes)",
            resource.type_code(),
            resource.id(),
            data.len()
        );
        self.insert(resource.type_code(), resource.id(), resource.name(), data);
        Ok(())
    }

    pub fn name(&self, code: &str, id: i64) -> Option<&str> {
        self.resources
            .get(&(code.to_string(), id))
            .map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceStore for MemoryStore {
    fn find(&self, code: &str, id: i64) -> Option<&[u8]> {
        self.resources
            .get(&(code.to_string(), id))
            .map(|r| r.data.as_slice())
    }
}
