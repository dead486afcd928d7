//! Line alignment diff
//!
//! Aligns two texts line by line with a classic edit-distance table and
//! returns the alignment path as an ordered edit script of [`LineNode`]s.
//! Only insertions and deletions are costed; equal lines ride the diagonal
//! for free.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Status of an aligned line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    Same,
    Added,
    Removed,
}

/// One cell of the alignment path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineNode {
    pub text: String,
    pub status: LineStatus,
    /// Edit cost accumulated up to and including this node
    pub diffs: usize,
    /// Index of the prior node in the returned script
    pub previous: Option<usize>,
}

impl LineNode {
    pub fn is_same(&self) -> bool {
        self.status == LineStatus::Same
    }
}

/// Insertion/deletion counts of an edit script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffStats {
    pub fn from_script(script: &[LineNode]) -> Self {
        script.iter().fold(Self::default(), |mut stats, node| {
            match node.status {
                LineStatus::Added => stats.insertions += 1,
                LineStatus::Removed => stats.deletions += 1,
                LineStatus::Same => {}
            }
            stats
        })
    }
}

/// Split text into lines; empty text has no lines at all
pub fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').collect()
    }
}

/// How a table cell was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Origin,
    Diagonal,
    /// Insertion of the new line, from the cell to the left
    Left,
    /// Deletion of the old line, from the cell above
    Up,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    cost: u32,
    step: Step,
}

/// Alignment table with a virtual origin row and column
struct Table {
    cols: usize,
    cells: Vec<Cell>,
}

impl Table {
    fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    fn predecessor(&self, row: usize, col: usize) -> Option<(usize, usize)> {
        match self.get(row, col).step {
            Step::Origin => None,
            Step::Diagonal => Some((row - 1, col - 1)),
            Step::Left => Some((row, col - 1)),
            Step::Up => Some((row - 1, col)),
        }
    }
}

fn build_table(old: &[&str], new: &[&str]) -> Table {
    let cols = new.len() + 1;
    let mut cells = Vec::with_capacity((old.len() + 1) * cols);

    cells.push(Cell { cost: 0, step: Step::Origin });
    for j in 1..cols {
        cells.push(Cell { cost: j as u32, step: Step::Left });
    }

    for i in 1..=old.len() {
        for j in 0..cols {
            let cell = if j == 0 {
                Cell { cost: i as u32, step: Step::Up }
            } else if old[i - 1] == new[j - 1] {
                let diagonal = cells[(i - 1) * cols + (j - 1)];
                Cell { cost: diagonal.cost, step: Step::Diagonal }
            } else {
                let up = cells[(i - 1) * cols + j];
                let left = cells[i * cols + (j - 1)];
                // Ties resolve to an insertion
                if up.cost < left.cost {
                    Cell { cost: up.cost + 1, step: Step::Up }
                } else {
                    Cell { cost: left.cost + 1, step: Step::Left }
                }
            };
            cells.push(cell);
        }
    }

    Table { cols, cells }
}

/// Align `old` against `new` and return the edit script in chronological order
pub fn diff_lines(old: &str, new: &str) -> Vec<LineNode> {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);

    if old_lines.is_empty() || new_lines.is_empty() {
        return degenerate(&old_lines, &new_lines);
    }

    let table = build_table(&old_lines, &new_lines);

    let mut path = Vec::with_capacity(old_lines.len() + new_lines.len());
    let mut cursor = Some((old_lines.len(), new_lines.len()));
    while let Some((row, col)) = cursor {
        let cell = table.get(row, col);
        let (text, status) = match cell.step {
            Step::Origin => break,
            Step::Diagonal => (old_lines[row - 1], LineStatus::Same),
            Step::Left => (new_lines[col - 1], LineStatus::Added),
            Step::Up => (old_lines[row - 1], LineStatus::Removed),
        };
        path.push((text, status, cell.cost as usize));
        cursor = table.predecessor(row, col);
    }
    path.reverse();

    path.into_iter()
        .enumerate()
        .map(|(idx, (text, status, diffs))| LineNode {
            text: text.to_string(),
            status,
            diffs,
            previous: idx.checked_sub(1),
        })
        .collect()
}

/// One side is empty: everything is an insertion or everything is a deletion
fn degenerate(old_lines: &[&str], new_lines: &[&str]) -> Vec<LineNode> {
    let (lines, status) = if old_lines.is_empty() {
        (new_lines, LineStatus::Added)
    } else {
        (old_lines, LineStatus::Removed)
    };
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| LineNode {
            text: line.to_string(),
            status,
            diffs: idx + 1,
            previous: idx.checked_sub(1),
        })
        .collect()
}

/// Find the next maximal run of non-`same` nodes at or after `from`
pub fn next_chunk(script: &[LineNode], from: usize) -> Option<Range<usize>> {
    let start = from + script.get(from..)?.iter().position(|n| !n.is_same())?;
    let len = script[start..]
        .iter()
        .take_while(|n| !n.is_same())
        .count();
    Some(start..start + len)
}
