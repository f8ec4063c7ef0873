use crate::error::CoreResult;
use async_trait::async_trait;
use nexa_model::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The order agent categories run in during the scan pipeline's Extract
/// stage. Later categories never overwrite a locked field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AgentCategory {
    Sidecar,
    Embedded,
    Local,
    Remote,
}

/// A file-system group whose aggregate becomes one item graph, e.g. all
/// files of a single movie, or all tracks of an album medium. Produced by
/// the scan pipeline's Match stage and consumed by every agent.
#[derive(Debug, Clone)]
pub struct ScanUnit {
    pub library_type: LibraryType,
    pub intended_type: MetadataType,
    pub paths: Vec<PathBuf>,
    pub path_hints: BTreeMap<String, String>,
}

/// One extracted fact, keyed by the canonical hint vocabulary (title,
/// sort variants, external ids, performers with roles, release info,
/// classical movement fields, ...).
#[derive(Debug, Clone, PartialEq)]
pub enum HintValue {
    Text(String),
    Number(f64),
    StringList(Vec<String>),
    ExternalId { provider: String, value: String },
    PersonCredit { name: String, role: Option<String>, kind: CreditKind },
}

#[derive(Debug, Clone, Default)]
pub struct Hints {
    pub values: Vec<(String, HintValue)>,
    pub provenance: Option<String>,
}

impl Hints {
    pub fn push(&mut self, key: impl Into<String>, value: HintValue) {
        self.values.push((key.into(), value));
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.values.iter().find_map(|(k, v)| {
            if k == key {
                if let HintValue::Text(t) = v {
                    return Some(t.as_str());
                }
            }
            None
        })
    }
}

/// Implemented by every sidecar/embedded/local/remote metadata provider.
/// Agents are stateless and must be safe for concurrent invocation.
#[async_trait]
pub trait MetadataAgent: Send + Sync {
    fn agent_name(&self) -> &'static str;
    fn category(&self) -> AgentCategory;
    fn default_order(&self) -> i32;
    fn supported_library_types(&self) -> &'static [LibraryType];
    async fn extract(&self, unit: &ScanUnit) -> CoreResult<Hints>;
}
