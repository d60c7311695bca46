//! engine::selection
//!
//! The externally owned "what is selected" view.
//!
//! Commands read the selection; they never change it.

/// Read-only access to the current selection.
pub trait Selection {
    /// The single file the user is looking at, if any.
    fn filename(&self) -> Option<String>;

    /// Selected paths in the staged list.
    fn staged(&self) -> Vec<String>;
}

/// A fixed selection, used by the terminal front end and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSelection {
    filename: Option<String>,
    staged: Vec<String>,
}

impl StaticSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_staged(mut self, staged: Vec<String>) -> Self {
        self.staged = staged;
        self
    }
}

impl Selection for StaticSelection {
    fn filename(&self) -> Option<String> {
        self.filename.clone()
    }

    fn staged(&self) -> Vec<String> {
        self.staged.clone()
    }
}
