use crate::model::Page;

/// History of pages, most recent last.
///
/// Only committed expansions push, so depth always equals committed
/// expansions minus completed back-navigations.
#[derive(Debug, Default)]
pub struct NavStack {
    pages: Vec<Page>,
}

impl NavStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// `None` on an empty stack; going back from the root is a no-op.
    pub fn pop(&mut self) -> Option<Page> {
        self.pages.pop()
    }

    pub fn peek(&self) -> Option<&Page> {
        self.pages.last()
    }

    pub fn depth(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }
}
