//! FamilySession - the current snapshot plus a memoized layout.
//!
//! The session is the single owner of "the tree right now". Edits replace the
//! snapshot with a new one and never touch the old one, so the cached layout
//! is keyed on snapshot identity alone. Changing the focused person does not
//! invalidate anything.

use log::{debug, warn};
use std::rc::Rc;

use crate::error::{ImportError, TreeError};
use crate::layout::{FamilyLayout, GenerationLayout, LayoutConfig};
use crate::spatial::PersonIndex;
use crate::tree::{Edit, FamilyTree};

struct CachedLayout {
    /// Snapshot the layout was computed from.
    source: Rc<FamilyTree>,
    layout: Rc<FamilyLayout>,
    index: PersonIndex,
}

/// Owner of the current snapshot.
pub struct FamilySession {
    tree: Rc<FamilyTree>,
    engine: GenerationLayout,
    cache: Option<CachedLayout>,
    focus: Option<String>,
    revision: u64,
}

impl FamilySession {
    /// Start a session from `tree`.
    pub fn new(tree: FamilyTree) -> Self {
        Self::with_config(tree, LayoutConfig::default())
    }

    pub fn with_config(tree: FamilyTree, config: LayoutConfig) -> Self {
        Self {
            tree: Rc::new(tree),
            engine: GenerationLayout::new(config),
            cache: None,
            focus: None,
            revision: 0,
        }
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    /// The current snapshot. Never mutated after being handed out.
    pub fn snapshot(&self) -> Rc<FamilyTree> {
        Rc::clone(&self.tree)
    }

    pub fn tree(&self) -> &FamilyTree {
        &self.tree
    }

    /// Number of snapshots replaced since the session started.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the snapshot wholesale.
    pub fn replace(&mut self, tree: FamilyTree) {
        self.tree = Rc::new(tree);
        self.revision += 1;
        if self
            .focus
            .as_deref()
            .is_some_and(|id| !self.tree.contains_person(id))
        {
            self.focus = None;
        }
    }

    /// Apply one edit to the current snapshot.
    ///
    /// On error the snapshot is left as it was.
    pub fn apply(&mut self, edit: &Edit) -> Result<(), TreeError> {
        let next = edit.apply(&self.tree).inspect_err(|err| warn!("edit rejected: {err}"))?;
        self.replace(next);
        Ok(())
    }

    /// Apply edits in order, each to the output of the previous one.
    ///
    /// All or nothing: if any edit fails, no snapshot is replaced. An empty
    /// batch leaves the snapshot and its cached layout alone.
    pub fn apply_all(&mut self, edits: &[Edit]) -> Result<(), TreeError> {
        if edits.is_empty() {
            return Ok(());
        }
        let mut next = FamilyTree::clone(&self.tree);
        for edit in edits {
            next = edit
                .apply(&next)
                .inspect_err(|err| warn!("edit batch rejected: {err}"))?;
        }
        self.replace(next);
        Ok(())
    }

    /// Run a pure snapshot transformation, such as one of the permissive
    /// functions in [`crate::tree::mutation`].
    pub fn update(&mut self, edit: impl FnOnce(&FamilyTree) -> FamilyTree) {
        let next = edit(&self.tree);
        self.replace(next);
    }

    /// Replace the snapshot with an imported document.
    ///
    /// A rejected document leaves the session untouched.
    pub fn import_json(&mut self, raw: &str) -> Result<(), ImportError> {
        let tree = FamilyTree::from_json(raw).inspect_err(|err| warn!("import rejected: {err}"))?;
        self.replace(tree);
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, ImportError> {
        self.tree.to_json()
    }

    // =========================================================================
    // Focus
    // =========================================================================

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Select a person. Unknown ids clear the focus.
    pub fn set_focus(&mut self, id: Option<&str>) {
        self.focus = id
            .filter(|id| self.tree.contains_person(id))
            .map(str::to_string);
    }

    // =========================================================================
    // Layout
    // =========================================================================

    pub fn layout_config(&self) -> &LayoutConfig {
        self.engine.config()
    }

    /// Change layout settings; the next layout call recomputes.
    pub fn set_layout_config(&mut self, config: LayoutConfig) {
        self.engine = GenerationLayout::new(config);
        self.cache = None;
    }

    /// Whether the cached layout belongs to the current snapshot.
    pub fn is_layout_fresh(&self) -> bool {
        self.cache
            .as_ref()
            .is_some_and(|cache| Rc::ptr_eq(&cache.source, &self.tree))
    }

    /// The layout of the current snapshot, computed at most once per snapshot.
    pub fn layout(&mut self) -> Rc<FamilyLayout> {
        Rc::clone(&self.ensure_layout().layout)
    }

    /// Id of the person drawn nearest to (x, y), within `max_distance`.
    pub fn person_at(&mut self, x: f32, y: f32, max_distance: f32) -> Option<String> {
        self.ensure_layout()
            .index
            .nearest_within(x, y, max_distance)
            .map(str::to_string)
    }

    /// Ids of persons drawn inside a rectangle.
    pub fn persons_in_rect(&mut self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<String> {
        self.ensure_layout()
            .index
            .in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn ensure_layout(&mut self) -> &CachedLayout {
        let cache = match self.cache.take() {
            Some(cache) if Rc::ptr_eq(&cache.source, &self.tree) => cache,
            _ => {
                debug!("recomputing layout for revision {}", self.revision);
                let layout = self.engine.compute(&self.tree);
                let index = PersonIndex::from_layout(&layout);
                CachedLayout {
                    source: Rc::clone(&self.tree),
                    layout: Rc::new(layout),
                    index,
                }
            }
        };
        self.cache.insert(cache)
    }
}

impl Default for FamilySession {
    fn default() -> Self {
        Self::new(FamilyTree::new())
    }
}
