use std::collections::HashMap;
use std::time::Duration;

/// Style identifier to text color.
pub type StyleTable = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct StyledFragment {
    pub(crate) text: String,
    pub(crate) color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Caption {
    pub(crate) begin: Duration,
    pub(crate) end: Duration,
    pub(crate) fragments: Vec<StyledFragment>,
}

/// Everything extracted from a single TTML document.
#[derive(Debug, Default)]
pub struct Transcript {
    pub(crate) styles: StyleTable,
    pub(crate) captions: Vec<Caption>,
}

impl Transcript {
    pub fn clear(&mut self) {
        self.styles.clear();
        self.captions.clear();
    }
}
