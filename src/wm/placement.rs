//! Placement Module
//!
//! One-shot arrangement of the open windows into a left-to-right grid
//! derived from the document structure:
//!
//! ```text
//! | codex | characters | locations | others | outline | section 1 | section 2 | ... | unsorted |
//! ```
//!
//! Each column stacks its windows top to bottom. A column only takes up
//! space when at least one window landed in it.

use tracing::{debug, info};

use crate::config::ArrangementConfig;
use crate::document::DocumentStructure;
use crate::shared::{CODEX_WINDOW_ID, OUTLINE_WINDOW_ID, Rect, WindowId, WindowKind};
use crate::wm::Workspace;

/// Category column for a codex entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryColumn {
    Characters,
    Locations,
    Others,
}

fn entry_column(category: Option<&str>) -> EntryColumn {
    let category = category.unwrap_or_default().to_lowercase();
    if category.contains("character") {
        EntryColumn::Characters
    } else if category.contains("location") {
        EntryColumn::Locations
    } else {
        EntryColumn::Others
    }
}

/// Accumulates columns left to right
struct Grid<'a> {
    cfg: &'a ArrangementConfig,
    x: f64,
    placed: Vec<(WindowId, Rect)>,
}

impl<'a> Grid<'a> {
    fn new(cfg: &'a ArrangementConfig) -> Self {
        Self {
            cfg,
            x: cfg.origin[0],
            placed: Vec::new(),
        }
    }

    fn column(&mut self, ids: impl IntoIterator<Item = WindowId>, size: [f64; 2]) {
        let [width, height] = size;
        let mut y = self.cfg.origin[1];
        let before = self.placed.len();
        for id in ids {
            self.placed.push((id, Rect::new(self.x, y, width, height)));
            y += height + self.cfg.gap;
        }
        if self.placed.len() > before {
            self.x += width + self.cfg.gap;
        }
    }
}

/// Compute target rects for every open window the layout knows how to
/// place. Custom windows keep their position.
pub fn plan_arrangement<F>(
    doc: &DocumentStructure,
    is_open: F,
    cfg: &ArrangementConfig,
) -> Vec<(WindowId, Rect)>
where
    F: Fn(&WindowId) -> bool,
{
    let mut grid = Grid::new(cfg);
    let open = |id: WindowId| is_open(&id).then_some(id);

    grid.column(open(WindowId::from(CODEX_WINDOW_ID)), cfg.codex_size);

    for column in [EntryColumn::Characters, EntryColumn::Locations, EntryColumn::Others] {
        let ids = doc
            .codex_entries
            .iter()
            .filter(|e| entry_column(e.category.as_deref()) == column)
            .filter_map(|e| open(WindowId::for_codex_entry(&e.id)));
        grid.column(ids, cfg.entry_size);
    }

    grid.column(open(WindowId::from(OUTLINE_WINDOW_ID)), cfg.outline_size);

    for section in &doc.sections {
        let ids = section
            .chapters
            .iter()
            .filter_map(|c| open(WindowId::for_chapter(&c.id)));
        grid.column(ids, cfg.chapter_size);
    }

    grid.placed
}

impl Workspace {
    /// Lay out all open windows by document structure, then fit the view
    pub fn arrange(&mut self, doc: &DocumentStructure) {
        let cfg = self.config.arrangement.clone();
        let mut plan = plan_arrangement(doc, |id| self.windows.contains_key(id), &cfg);

        // Open entries and chapters the structure no longer lists
        let mut stray_entries = Vec::new();
        let mut stray_chapters = Vec::new();
        for window in self.windows.values() {
            if plan.iter().any(|(id, _)| id == &window.id) {
                continue;
            }
            match window.kind() {
                WindowKind::CodexEntry => stray_entries.push(window.id.clone()),
                WindowKind::Chapter => stray_chapters.push(window.id.clone()),
                _ => {}
            }
        }
        if !stray_entries.is_empty() || !stray_chapters.is_empty() {
            stray_entries.sort();
            stray_chapters.sort();
            let mut grid = Grid::new(&cfg);
            grid.x = plan
                .iter()
                .map(|(_, r)| r.right() + cfg.gap)
                .fold(cfg.origin[0], f64::max);
            grid.column(stray_entries, cfg.entry_size);
            grid.column(stray_chapters, cfg.chapter_size);
            plan.extend(grid.placed);
        }

        info!("Arranging {} window(s)", plan.len());
        for (id, rect) in plan {
            debug!("Arrange {} -> {:?}", id, rect);
            self.reposition(id.as_str(), rect);
        }
        self.fit_to_view(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ChapterRef, CodexEntry, Section};
    use crate::wm::test_support::{harness, spec};

    fn structure() -> DocumentStructure {
        let entry = |id: &str, category: Option<&str>| CodexEntry {
            id: id.into(),
            title: id.into(),
            category: category.map(Into::into),
        };
        let chapter = |id: &str| ChapterRef { id: id.into(), title: id.into() };
        DocumentStructure {
            codex_entries: vec![
                entry("ann", Some("Characters")),
                entry("bob", Some("main character")),
                entry("town", Some("Locations")),
                entry("sword", Some("Items")),
                entry("misc", None),
            ],
            sections: vec![
                Section { id: "act1".into(), title: "Act I".into(), chapters: vec![chapter("1"), chapter("2")] },
                Section { id: "act2".into(), title: "Act II".into(), chapters: vec![chapter("3")] },
            ],
        }
    }

    #[test]
    fn test_entry_columns() {
        assert_eq!(entry_column(Some("CHARACTERS")), EntryColumn::Characters);
        assert_eq!(entry_column(Some("Locations & Places")), EntryColumn::Locations);
        assert_eq!(entry_column(Some("Lore")), EntryColumn::Others);
        assert_eq!(entry_column(None), EntryColumn::Others);
    }

    #[test]
    fn test_plan_columns() {
        let open: Vec<WindowId> = vec![
            CODEX_WINDOW_ID.into(),
            OUTLINE_WINDOW_ID.into(),
            WindowId::for_codex_entry("ann"),
            WindowId::for_codex_entry("bob"),
            WindowId::for_codex_entry("sword"),
            WindowId::for_chapter("1"),
            WindowId::for_chapter("3"),
        ];
        let cfg = ArrangementConfig::default();
        let plan = plan_arrangement(&structure(), |id| open.contains(id), &cfg);
        let rect = |id: &str| plan.iter().find(|(w, _)| w.as_str() == id).map(|(_, r)| *r);

        assert_eq!(plan.len(), 7);
        assert_eq!(rect("codex-window"), Some(Rect::new(50.0, 50.0, 500.0, 700.0)));
        // Characters column stacks both entries
        assert_eq!(rect("codex-entry-ann"), Some(Rect::new(590.0, 50.0, 400.0, 320.0)));
        assert_eq!(rect("codex-entry-bob"), Some(Rect::new(590.0, 410.0, 400.0, 320.0)));
        // No open location: that column takes no space
        assert_eq!(rect("codex-entry-sword"), Some(Rect::new(1030.0, 50.0, 400.0, 320.0)));
        assert_eq!(rect("outline-window"), Some(Rect::new(1470.0, 50.0, 500.0, 700.0)));
        assert_eq!(rect("chapter-1"), Some(Rect::new(2010.0, 50.0, 600.0, 400.0)));
        assert_eq!(rect("chapter-3"), Some(Rect::new(2650.0, 50.0, 600.0, 400.0)));
    }

    #[test]
    fn test_plan_empty_when_nothing_open() {
        let plan = plan_arrangement(&structure(), |_| false, &ArrangementConfig::default());
        assert!(plan.is_empty());
    }

    #[tokio::test]
    async fn test_arrange_is_idempotent() {
        let mut h = harness();
        let ws = &mut h.workspace;
        ws.create(spec("outline-window", 900.0, 900.0, 300.0, 300.0));
        ws.create(spec("chapter-2", 10.0, 10.0, 300.0, 300.0));
        ws.create(spec("chapter-99", 10.0, 10.0, 300.0, 300.0));
        ws.create(spec("note", 1234.0, 567.0, 300.0, 300.0));
        ws.minimize("chapter-2");

        ws.arrange(&structure());
        let mut first: Vec<_> = ws.windows().map(|w| (w.id.clone(), w.rect)).collect();
        first.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(ws.window("outline-window").unwrap().rect, Rect::new(50.0, 50.0, 500.0, 700.0));
        let chapter = ws.window("chapter-2").unwrap();
        assert_eq!(chapter.rect, Rect::new(590.0, 50.0, 600.0, 400.0));
        assert!(!chapter.is_minimized());
        // Unknown chapter goes to the trailing column
        assert_eq!(ws.window("chapter-99").unwrap().rect, Rect::new(1230.0, 50.0, 600.0, 400.0));
        // Custom windows stay put
        assert_eq!(ws.window("note").unwrap().rect, Rect::new(1234.0, 567.0, 300.0, 300.0));

        ws.arrange(&structure());
        let mut second: Vec<_> = ws.windows().map(|w| (w.id.clone(), w.rect)).collect();
        second.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_arrange_fits_view() {
        let mut h = harness();
        let ws = &mut h.workspace;
        ws.create(spec("outline-window", 900.0, 900.0, 300.0, 300.0));
        ws.arrange(&DocumentStructure::default());
        // 500x700 box plus padding inside 1600x1000
        let expected = (1000.0_f64 / 900.0).min(1600.0 / 700.0).min(1.5);
        assert!((ws.viewport().scale() - expected).abs() < 1e-9);
    }
}
