use crc32fast::Hasher;

/// Derive a stable seed from a document identity using CRC32.
pub fn document_seed(identity: &str) -> String {
    let mut buff = String::from(identity);
    if !identity.contains("://") {
        buff = format!("folio://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for nodes within a document.
///
/// IDs are `<seed>-<n>`; the seed is the CRC32 of the document identity,
/// so IDs are deterministic per document and unique within it as long as
/// a single generator owns the counter.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(identity: &str) -> Self {
        Self {
            seed: document_seed(identity),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Resume counting past IDs already present (e.g. after reloading a
    /// persisted document), so fresh IDs never collide with existing ones.
    pub fn resuming<'a>(identity: &str, existing_ids: impl Iterator<Item = &'a str>) -> Self {
        let seed = document_seed(identity);
        let prefix = format!("{}-", seed);
        let count = existing_ids
            .filter_map(|id| id.strip_prefix(&prefix))
            .filter_map(|suffix| suffix.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        Self { seed, count }
    }

    /// Generate the next sequential ID.
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}
