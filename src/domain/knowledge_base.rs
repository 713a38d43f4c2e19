/// Model-written summary of the product documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBase(String);

impl KnowledgeBase {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A whitespace-only file counts as "not built yet".
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
