//! Id allocation for slides, sections and library items.

use crate::types::ProtocolDocument;

/// Sequential id generator.
///
/// Ids take the form `<prefix>-<seed>-<n>`. The counter only moves forward and
/// is owned by the editing session rather than by any document, so an id handed
/// out once is never handed out again, even after undo drops the entity.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    /// Create a generator. Use a different seed per session (a timestamp works).
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate the next sequential id.
    pub fn next_id(&mut self, prefix: &str) -> String {
        self.count += 1;
        format!("{}-{}-{}", prefix, self.seed, self.count)
    }

    /// Generate an id not already used anywhere in `doc`.
    ///
    /// Imported documents may carry ids that happen to match this generator's
    /// pattern, so collisions are skipped.
    pub fn fresh_id(&mut self, prefix: &str, doc: &ProtocolDocument) -> String {
        loop {
            let id = self.next_id(prefix);
            if !doc.contains_id(&id) {
                return id;
            }
            log::debug!("Skipping id already present in document: {}", id);
        }
    }

    /// Get the generator seed.
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new("0")
    }
}
