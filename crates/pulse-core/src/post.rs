use serde::{Deserialize, Serialize};

/// Separator between the four sections of a post.
pub const SECTION_SEPARATOR: &str = "\n\n";

/// The four-part LinkedIn post produced by the ghostwriter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStructure {
    pub hook: String,
    pub insight_body: String,
    pub human_connection: String,
    pub open_loop: String,
}

impl PostStructure {
    /// Sections joined with blank lines, in reading order.
    #[must_use]
    pub fn assemble(&self) -> String {
        [
            self.hook.as_str(),
            self.insight_body.as_str(),
            self.human_connection.as_str(),
            self.open_loop.as_str(),
        ]
        .join(SECTION_SEPARATOR)
    }

    /// Length of [`PostStructure::assemble`] in characters.
    #[must_use]
    pub fn total_chars(&self) -> usize {
        self.hook.chars().count()
            + self.insight_body.chars().count()
            + self.human_connection.chars().count()
            + self.open_loop.chars().count()
            + 3 * SECTION_SEPARATOR.len()
    }
}
