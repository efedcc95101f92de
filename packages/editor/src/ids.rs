use crate::document::Component;
use crc32fast::Hasher;

/// Hash an arbitrary key into a short hex id
pub fn short_hash(key: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(key.as_bytes());
    format!("{:08x}", hasher.finalize())
}

/// Generate a fresh document id for `owner`
///
/// `nonce` should differ per call (a timestamp works); the result only uses
/// characters accepted as store keys.
pub fn new_document_id(owner: &str, nonce: i64) -> String {
    format!("page-{}{:x}", short_hash(owner), nonce)
}

/// Sequential component id generator for one document
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    /// Seed from the document id plus a per-session nonce so ids from two
    /// sessions on the same document do not collide
    pub fn for_document(document_id: &str, nonce: i64) -> Self {
        Self {
            seed: short_hash(&format!("{}:{}", document_id, nonce)),
            count: 0,
        }
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Next id not already used by a component in `existing`
    pub fn next_unused(&mut self, existing: &[Component]) -> String {
        loop {
            let id = self.new_id();
            if !existing.iter().any(|c| c.id == id) {
                return id;
            }
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}
