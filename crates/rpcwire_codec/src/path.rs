//! Location of a value inside the decoded (or encoded) tree.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
    Key(usize),
}

/// Path from the root value to a nested one, rendered as `$.owner[2]`.
///
/// Map entries are addressed by position: `{i}` is the key of entry `i`,
/// `[i]` its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WirePath {
    segments: Vec<Segment>,
}

impl WirePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn field(&self, name: &str) -> Self {
        self.push(Segment::Field(name.to_string()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.push(Segment::Index(index))
    }

    pub fn key(&self, entry: usize) -> Self {
        self.push(Segment::Key(entry))
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    fn push(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }
}

impl fmt::Display for WirePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            match segment {
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(i) => write!(f, "[{}]", i)?,
                Segment::Key(i) => write!(f, "{{{}}}", i)?,
            }
        }
        Ok(())
    }
}
