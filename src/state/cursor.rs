/// Navigation over the image catalog
///
/// The cursor only tracks a position. Saving before a move is the session's
/// job, so these methods are pure index arithmetic over a catalog length or
/// slice.
use super::data::ImageEntry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// `None` means no current image (empty catalog or not started)
    index: Option<usize>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Move onto `index`. Callers check it against the catalog.
    pub fn set(&mut self, index: usize) {
        self.index = Some(index);
    }

    pub fn reset(&mut self) {
        self.index = None;
    }

    /// Step forward with wraparound; from "not started" this lands on 0
    pub fn advance(&mut self, len: usize) -> Option<usize> {
        self.index = match (self.index, len) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), len) => Some((i + 1) % len),
        };
        self.index
    }

    /// Step backward with wraparound; from "not started" this lands on the last image
    pub fn retreat(&mut self, len: usize) -> Option<usize> {
        self.index = match (self.index, len) {
            (_, 0) => None,
            (None, len) => Some(len - 1),
            (Some(i), len) => Some((i % len + len - 1) % len),
        };
        self.index
    }

    /// Keep the cursor in range after the catalog shrank under it
    ///
    /// The index is kept (it now names the image that followed the removed
    /// one) and wraps to 0 past the end.
    pub fn clamp(&mut self, len: usize) -> Option<usize> {
        self.index = match (self.index, len) {
            (_, 0) => None,
            (Some(i), len) if i >= len => Some(0),
            (other, _) => other,
        };
        self.index
    }

    /// First entry after the cursor, wrapping around, that is not annotated
    ///
    /// The scan runs from `index + 1` to the end, then from 0 up to and
    /// including the current index. Leaves the cursor alone when every entry
    /// is annotated.
    pub fn jump_to_next_unannotated<F>(
        &mut self,
        entries: &[ImageEntry],
        is_annotated: F,
    ) -> Option<usize>
    where
        F: Fn(&ImageEntry) -> bool,
    {
        let start = self.index.map_or(0, |i| i + 1).min(entries.len());
        let found = (start..entries.len())
            .chain(0..start)
            .find(|&i| !is_annotated(&entries[i]))?;
        self.index = Some(found);
        Some(found)
    }

    /// First entry whose base name or stored id equals `query`, ignoring case
    ///
    /// `id_of` returns the stored record id for an entry, if any. A blank
    /// query matches nothing and leaves the cursor alone, as does a miss.
    pub fn search<'s, F>(&mut self, entries: &[ImageEntry], query: &str, id_of: F) -> Option<usize>
    where
        F: Fn(&ImageEntry) -> Option<&'s str>,
    {
        let wanted = query.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }

        let found = entries.iter().position(|entry| {
            entry.stem().to_lowercase() == wanted
                || id_of(entry).is_some_and(|id| id.to_lowercase() == wanted)
        })?;
        self.index = Some(found);
        Some(found)
    }
}
