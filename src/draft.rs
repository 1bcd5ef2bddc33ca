use crate::error::BufferError;
use crate::model::{Post, PostFields, PostId};

/// Byte range of the caret or selection inside a [`BodyBuffer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn cursor(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn is_cursor(self) -> bool {
        self.start == self.end
    }

    fn clamp_to(self, text: &str) -> Self {
        Self::new(
            floor_char_boundary(text, self.start),
            floor_char_boundary(text, self.end),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextChange {
    pub start: usize,
    pub end: usize,
    pub insert: String,
}

impl TextChange {
    pub fn new(start: usize, end: usize, insert: impl Into<String>) -> Self {
        Self {
            start,
            end,
            insert: insert.into(),
        }
    }
}

/// A set of non-overlapping changes applied to the body in one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edit {
    pub changes: Vec<TextChange>,
    pub selection_after: Option<Selection>,
    pub label: &'static str,
}

impl Edit {
    pub fn single(change: TextChange, selection_after: Option<Selection>, label: &'static str) -> Self {
        Self {
            changes: vec![change],
            selection_after,
            label,
        }
    }
}

/// Post body text plus the caret, as last reported by the textarea.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BodyBuffer {
    text: String,
    selection: Selection,
    revision: u64,
}

impl BodyBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = text.len();
        Self {
            text,
            selection: Selection::cursor(len),
            revision: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamp_to(&self.text);
    }

    /// Selection as UTF-16 offsets, which is what `selectionStart` uses.
    pub fn selection_utf16(&self) -> (u32, u32) {
        (
            byte_to_utf16(&self.text, self.selection.start),
            byte_to_utf16(&self.text, self.selection.end),
        )
    }

    pub fn set_selection_utf16(&mut self, start: u32, end: u32) {
        let selection = Selection::new(
            utf16_to_byte(&self.text, start),
            utf16_to_byte(&self.text, end),
        );
        self.set_selection(selection);
    }

    /// Replaces the whole text from a textarea `input` event.
    pub fn replace_from_input(&mut self, text: String) {
        if self.text != text {
            self.revision += 1;
        }
        self.text = text;
        self.selection = self.selection.clamp_to(&self.text);
    }

    pub fn apply(&mut self, edit: Edit) -> Result<bool, BufferError> {
        let changes = normalize_changes(&edit.changes, &self.text)?;
        let next_text = apply_changes(&self.text, &changes);
        let next_selection = edit
            .selection_after
            .unwrap_or_else(|| {
                Selection::new(
                    map_position(self.selection.start, &changes),
                    map_position(self.selection.end, &changes),
                )
            })
            .clamp_to(&next_text);

        let changed = next_text != self.text;
        if changed {
            self.revision += 1;
            log::debug!("body edit {:?}, revision {}", edit.label, self.revision);
        }
        self.text = next_text;
        self.selection = next_selection;
        Ok(changed)
    }

    /// Replaces the selection with `snippet` and parks the caret after it.
    pub fn insert_at_selection(&mut self, snippet: &str) -> Result<bool, BufferError> {
        let selection = self.selection;
        let caret = selection.start + snippet.len();
        self.apply(Edit::single(
            TextChange::new(selection.start, selection.end, snippet),
            Some(Selection::cursor(caret)),
            "insert",
        ))
    }

    pub fn append(&mut self, snippet: &str) -> Result<bool, BufferError> {
        let len = self.text.len();
        self.apply(Edit::single(
            TextChange::new(len, len, snippet),
            Some(Selection::cursor(len + snippet.len())),
            "append",
        ))
    }

    pub fn format(&mut self, format: Format) -> Result<bool, BufferError> {
        let edit = match format {
            Format::Bold => wrap_edit(self, "**", "**", "bold"),
            Format::Italic => wrap_edit(self, "*", "*", "italic"),
            Format::Heading => prefix_line_edit(self, "## ", "heading"),
            Format::Quote => prefix_line_edit(self, "> ", "quote"),
        };
        self.apply(edit)
    }
}

/// Toolbar actions in the post editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Bold,
    Italic,
    Heading,
    Quote,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Bold, Format::Italic, Format::Heading, Format::Quote];

    pub fn label(self) -> &'static str {
        match self {
            Format::Bold => "B",
            Format::Italic => "I",
            Format::Heading => "H",
            Format::Quote => "❝",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Format::Bold => "Bold",
            Format::Italic => "Italic",
            Format::Heading => "Heading",
            Format::Quote => "Quote",
        }
    }
}

fn wrap_edit(buffer: &BodyBuffer, open: &str, close: &str, label: &'static str) -> Edit {
    let selection = buffer.selection;
    let inner = &buffer.text[selection.start..selection.end];
    let caret = if selection.is_cursor() {
        selection.start + open.len()
    } else {
        selection.end + open.len() + close.len()
    };
    Edit::single(
        TextChange::new(selection.start, selection.end, format!("{open}{inner}{close}")),
        Some(Selection::cursor(caret)),
        label,
    )
}

/// Prefixes every line the selection touches. A selection that ends right
/// at a line start leaves that line alone. The caret is carried through the
/// inserted prefixes.
fn prefix_line_edit(buffer: &BodyBuffer, prefix: &str, label: &'static str) -> Edit {
    let selection = buffer.selection;
    let first = line_start(&buffer.text, selection.start);
    let changes = std::iter::once(first)
        .chain(
            buffer.text[first..selection.end]
                .match_indices('\n')
                .map(|(i, _)| first + i + 1)
                .filter(|&start| start < selection.end),
        )
        .map(|start| TextChange::new(start, start, prefix))
        .collect();
    Edit {
        changes,
        selection_after: None,
        label,
    }
}

fn normalize_changes(changes: &[TextChange], text: &str) -> Result<Vec<TextChange>, BufferError> {
    let len = text.len();
    let mut sorted = changes.to_vec();
    sorted.sort_by_key(|change| (change.start, change.end));

    for change in &sorted {
        let in_bounds = change.start <= change.end && change.end <= len;
        if !in_bounds || !text.is_char_boundary(change.start) || !text.is_char_boundary(change.end) {
            return Err(BufferError::InvalidRange {
                start: change.start,
                end: change.end,
                len,
            });
        }
    }

    for pair in sorted.windows(2) {
        let (first, next) = (&pair[0], &pair[1]);
        if next.start < first.end {
            return Err(BufferError::OverlappingChanges {
                first_start: first.start,
                first_end: first.end,
                next_start: next.start,
                next_end: next.end,
            });
        }
    }

    Ok(sorted)
}

fn apply_changes(text: &str, changes: &[TextChange]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for change in changes {
        out.push_str(&text[cursor..change.start]);
        out.push_str(&change.insert);
        cursor = change.end;
    }
    out.push_str(&text[cursor..]);
    out
}

fn map_position(pos: usize, changes: &[TextChange]) -> usize {
    let mut shift: isize = 0;
    for change in changes {
        if pos < change.start {
            break;
        }
        if pos <= change.end {
            return (change.start as isize + shift) as usize + change.insert.len();
        }
        shift += change.insert.len() as isize - (change.end - change.start) as isize;
    }
    (pos as isize + shift).max(0) as usize
}

fn line_start(text: &str, pos: usize) -> usize {
    text[..pos.min(text.len())]
        .rfind('\n')
        .map_or(0, |i| i + 1)
}

fn floor_char_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

fn utf16_to_byte(text: &str, pos: u32) -> usize {
    let mut units = 0u32;
    for (idx, ch) in text.char_indices() {
        if units >= pos {
            return idx;
        }
        units += ch.len_utf16() as u32;
    }
    text.len()
}

fn byte_to_utf16(text: &str, pos: usize) -> u32 {
    text[..floor_char_boundary(text, pos)].encode_utf16().count() as u32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorTarget {
    New,
    Existing(PostId),
}

/// The post currently open in the editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostDraft {
    pub target: EditorTarget,
    pub title: String,
    pub excerpt: String,
    pub category: String,
    pub date: String,
    pub body: BodyBuffer,
}

impl PostDraft {
    pub fn blank(category: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            target: EditorTarget::New,
            title: String::new(),
            excerpt: String::new(),
            category: category.into(),
            date: date.into(),
            body: BodyBuffer::default(),
        }
    }

    pub fn from_post(post: &Post) -> Self {
        Self {
            target: EditorTarget::Existing(post.id),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            category: post.category.clone(),
            date: post.date.clone(),
            body: BodyBuffer::new(post.content.clone()),
        }
    }

    pub fn is_new(&self) -> bool {
        self.target == EditorTarget::New
    }

    pub fn set(&mut self, field: DraftField, value: String) {
        match field {
            DraftField::Title => self.title = value,
            DraftField::Excerpt => self.excerpt = value,
            DraftField::Category => self.category = value,
            DraftField::Date => self.date = value,
        }
    }

    pub fn fields(&self) -> PostFields {
        PostFields {
            title: self.title.clone(),
            excerpt: self.excerpt.clone(),
            content: self.body.text().to_string(),
            category: self.category.clone(),
            date: self.date.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Excerpt,
    Category,
    Date,
}

/// Inputs of the category panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryDraft {
    pub new_name: String,
    /// Category being renamed and the edited name.
    pub renaming: Option<(String, String)>,
}

impl CategoryDraft {
    pub fn start_rename(&mut self, category: &str) {
        self.renaming = Some((category.to_string(), category.to_string()));
    }

    pub fn is_renaming(&self, category: &str) -> bool {
        matches!(&self.renaming, Some((old, _)) if old == category)
    }
}
