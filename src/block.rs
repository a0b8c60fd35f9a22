/// A run of inline text sharing one emphasis state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub emphasized: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: false,
        }
    }

    pub fn emphasized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: true,
        }
    }
}

/// Block-level elements classified from the source lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Level is always 1, 2 or 3.
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    ListItem {
        text: String,
    },
    Image {
        alt: String,
        path: String,
    },
    Separator,
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

/// One unit of parser output: a block, or the vertical gap left by an
/// empty source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Block(Block),
    Blank,
}
