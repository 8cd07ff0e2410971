/*!
 * Region Logs
 * Per-scope diagnostic records chained in creation order
 *
 * Nodes live in an arena owned by the chain and link to each other by index,
 * so a chain can move from a provider into the compilation registry without
 * any outstanding references into it.
 */

use crate::core::types::{Size, Timestamp};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::io::{self, Write};

/// Kind of allocation scope a log describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    #[default]
    Heap,
    Stack,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RegionKind::Heap => write!(f, "heap"),
            RegionKind::Stack => write!(f, "stack"),
        }
    }
}

/// Diagnostic record for one allocation scope.
///
/// The provider only links these together; the owning scope fills in the
/// counters as it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionLog {
    pub name: String,
    pub kind: RegionKind,
    pub created: Timestamp,
    pub destroyed: Option<Timestamp>,
    /// Bytes handed to the scope's own clients
    pub bytes_allocated: Size,
    /// Bytes of the segments the scope obtained from its provider
    pub segment_bytes: Size,
    pub segments_requested: usize,
}

impl RegionLog {
    pub fn new(name: impl Into<String>, kind: RegionKind, created: Timestamp) -> Self {
        Self {
            name: name.into(),
            kind,
            created,
            destroyed: None,
            bytes_allocated: 0,
            segment_bytes: 0,
            segments_requested: 0,
        }
    }

    /// Timestamps elapsed between creation and destruction
    pub fn lifetime(&self) -> Option<Timestamp> {
        self.destroyed.map(|end| end.saturating_sub(self.created))
    }
}

impl fmt::Display for RegionLog {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "  Region {} ({}): created {}, ",
            self.name, self.kind, self.created
        )?;
        match self.destroyed {
            Some(end) => write!(f, "destroyed {}", end)?,
            None => write!(f, "live")?,
        }
        write!(
            f,
            ", {} bytes allocated, {} segments ({} bytes)",
            self.bytes_allocated, self.segments_requested, self.segment_bytes
        )
    }
}

/// Handle to a node in a [`RegionLogChain`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionLogId(usize);

#[derive(Debug, Clone)]
struct RegionLogNode {
    log: RegionLog,
    next: Option<RegionLogId>,
}

/// Singly linked chain of region logs with O(1) append at the tail
#[derive(Debug, Clone, Default)]
pub struct RegionLogChain {
    nodes: Vec<RegionLogNode>,
    head: Option<RegionLogId>,
    tail: Option<RegionLogId>,
}

impl RegionLogChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `log` after the current tail
    pub fn append(&mut self, log: RegionLog) -> RegionLogId {
        let id = RegionLogId(self.nodes.len());
        self.nodes.push(RegionLogNode { log, next: None });
        match self.tail {
            Some(tail) => self.nodes[tail.0].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        id
    }

    pub fn head(&self) -> Option<RegionLogId> {
        self.head
    }

    pub fn tail(&self) -> Option<RegionLogId> {
        self.tail
    }

    pub fn next(&self, id: RegionLogId) -> Option<RegionLogId> {
        self.nodes.get(id.0).and_then(|node| node.next)
    }

    pub fn get(&self, id: RegionLogId) -> Option<&RegionLog> {
        self.nodes.get(id.0).map(|node| &node.log)
    }

    pub fn get_mut(&mut self, id: RegionLogId) -> Option<&mut RegionLog> {
        self.nodes.get_mut(id.0).map(|node| &mut node.log)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk the chain from head to tail
    pub fn iter(&self) -> RegionLogIter<'_> {
        RegionLogIter {
            chain: self,
            cursor: self.head,
        }
    }

    /// Render every node, one per line
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        for log in self.iter() {
            writeln!(out, "{}", log)?;
        }
        Ok(())
    }
}

impl Serialize for RegionLogChain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Iterator following the `next` links of a chain
pub struct RegionLogIter<'a> {
    chain: &'a RegionLogChain,
    cursor: Option<RegionLogId>,
}

impl<'a> Iterator for RegionLogIter<'a> {
    type Item = &'a RegionLog;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.chain.nodes.get(id.0)?;
        self.cursor = node.next;
        Some(&node.log)
    }
}
