//! Declarative page description handed to the renderer.
//!
//! The navigation core never looks inside a `View`; page branches build them
//! and the renderer (DOM, terminal, JSON dump) turns them into output.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteLevel {
    Info,
    Hint,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    Title {
        text: String,
        icon: Option<String>,
    },
    Markdown {
        source: String,
    },
    Text {
        text: String,
    },
    Note {
        level: NoteLevel,
        text: String,
    },
    Field {
        label: String,
        value: String,
    },
    /// Internal navigation link.
    Link {
        label: String,
        path: String,
    },
    List {
        items: Vec<View>,
    },
    Section {
        title: String,
        children: Vec<View>,
    },
    Column {
        children: Vec<View>,
    },
}

impl View {
    pub fn title(text: impl Into<String>, icon: &str) -> Self {
        View::Title {
            text: text.into(),
            icon: Some(icon.to_string()),
        }
    }

    pub fn markdown(source: impl Into<String>) -> Self {
        View::Markdown {
            source: source.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        View::Text { text: text.into() }
    }

    pub fn note(level: NoteLevel, text: impl Into<String>) -> Self {
        View::Note {
            level,
            text: text.into(),
        }
    }

    pub fn field(label: impl Into<String>, value: impl Into<String>) -> Self {
        View::Field {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn link(label: impl Into<String>, path: impl Into<String>) -> Self {
        View::Link {
            label: label.into(),
            path: path.into(),
        }
    }

    pub fn list(items: Vec<View>) -> Self {
        View::List { items }
    }

    pub fn section(title: impl Into<String>, children: Vec<View>) -> Self {
        View::Section {
            title: title.into(),
            children,
        }
    }

    pub fn column(children: Vec<View>) -> Self {
        View::Column { children }
    }

    /// Depth-first search for a note of the given level.
    pub fn find_note(&self, level: NoteLevel) -> Option<&str> {
        match self {
            View::Note { level: found, text } if *found == level => Some(text),
            View::List { items } => items.iter().find_map(|item| item.find_note(level)),
            View::Section { children, .. } | View::Column { children } => {
                children.iter().find_map(|child| child.find_note(level))
            }
            _ => None,
        }
    }
}
