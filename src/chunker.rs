//! Splitting the condensed output into documents at file boundaries.

use crate::types::IncludedFile;

pub const FILE_HEADER: &str = ">>>File: ";
pub const SEPARATOR_WIDTH: usize = 40;

/// An included file together with its decoded text.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub file: IncludedFile,
    pub text: String,
}

impl LoadedFile {
    /// Lines this file occupies once rendered as a section.
    pub fn rendered_lines(&self) -> usize {
        section_lines(&self.text)
    }
}

/// One planned output document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    /// Indices into the loaded file list, in output order.
    pub files: Vec<usize>,
    /// The structure block leads this document.
    pub has_structure: bool,
    /// Rendered line count of the whole document.
    pub lines: usize,
}

impl Chunk {
    fn is_empty(&self) -> bool {
        self.files.is_empty() && !self.has_structure
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkPlan {
    pub chunks: Vec<Chunk>,
}

impl ChunkPlan {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Renders one file section: header, blank line, text, blank line, separator.
pub fn render_section(relative_path: &str, text: &str) -> String {
    let mut out = String::with_capacity(text.len() + relative_path.len() + 64);
    out.push_str(FILE_HEADER);
    out.push_str(relative_path);
    out.push_str("\n\n");
    out.push_str(text);
    out.push_str("\n\n");
    out.push_str(&"=".repeat(SEPARATOR_WIDTH));
    out.push('\n');
    out
}

/// Line count of a rendered section, which always ends in a newline: the
/// text's own newlines plus five from the header, the blank lines and the
/// separator.
pub fn section_lines(text: &str) -> usize {
    text.matches('\n').count() + 5
}

fn block_lines(block: &str) -> usize {
    block.matches('\n').count()
}

/// Groups files into documents.
///
/// Files are taken in order. A file that would push a non-empty document past
/// `max_lines` starts the next one; a file that is over budget on its own gets
/// a document to itself. Files are never split. The structure block, when
/// given, counts toward the first document. `None` or `Some(0)` puts
/// everything in one document.
pub fn plan(files: &[LoadedFile], max_lines: Option<usize>, structure: Option<&str>) -> ChunkPlan {
    let max_lines = max_lines.filter(|&n| n > 0);
    let mut chunks = Vec::new();
    let mut current = Chunk {
        files: Vec::new(),
        has_structure: structure.is_some(),
        lines: structure.map(block_lines).unwrap_or(0),
    };

    for (index, file) in files.iter().enumerate() {
        let lines = file.rendered_lines();
        if let Some(max) = max_lines {
            if lines > max {
                #[cfg(feature = "logging")]
                tracing::debug!(
                    "{} renders to {} lines, over the {} line budget; giving it its own document",
                    file.file.relative_path,
                    lines,
                    max
                );
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                chunks.push(Chunk {
                    files: vec![index],
                    has_structure: false,
                    lines,
                });
                continue;
            }
            if !current.is_empty() && current.lines + lines > max {
                chunks.push(std::mem::take(&mut current));
            }
        }
        current.files.push(index);
        current.lines += lines;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    ChunkPlan { chunks }
}

/// Renders every planned document in order.
pub fn render(plan: &ChunkPlan, files: &[LoadedFile], structure: Option<&str>) -> Vec<String> {
    plan.chunks
        .iter()
        .map(|chunk| {
            let mut out = String::new();
            if chunk.has_structure {
                if let Some(structure) = structure {
                    out.push_str(structure);
                }
            }
            for &index in &chunk.files {
                let loaded = &files[index];
                out.push_str(&render_section(&loaded.file.relative_path, &loaded.text));
            }
            out
        })
        .collect()
}

/// The single document produced in structure-only mode.
pub fn render_structure_only(structure: &str) -> Vec<String> {
    vec![structure.to_string()]
}
