//! Family Tree - WASM Module
//!
//! This module provides the data model, edits and layout engine for the
//! family tree viewer. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen; rendering, authentication and
//! remote persistence stay in the host.
//!
//! # Architecture
//!
//! - `tree`: Snapshot data model, pure edits, import/export
//! - `graph`: Person/marriage graph using petgraph's StableGraph
//! - `layout`: Generation BFS and row coordinates
//! - `spatial`: R-tree hit testing over laid-out persons
//! - `session`: Current snapshot with a memoized layout

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod session;
pub mod spatial;
pub mod tree;

use layout::{LayoutConfig, compute_generations};
use session::FamilySession;
use tree::{Edit, FamilyTree, IdGenerator, Person, RandomIds};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

/// Serialize to plain JS objects (not `Map`s) so the host can read fields directly.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

/// Main entry point for the family tree.
///
/// This struct wraps a [`FamilySession`] and provides the public API exposed
/// to JavaScript.
#[wasm_bindgen]
pub struct FamilyTreeWasm {
    session: FamilySession,
    ids: RandomIds,
}

#[wasm_bindgen]
impl FamilyTreeWasm {
    /// Create an empty family tree.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            session: FamilySession::default(),
            ids: RandomIds::new(),
        }
    }

    /// Create a family tree from a snapshot document.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<FamilyTreeWasm, JsError> {
        Ok(Self {
            session: FamilySession::new(FamilyTree::from_json(json)?),
            ids: RandomIds::new(),
        })
    }

    // =========================================================================
    // Snapshot
    // =========================================================================

    /// Replace the current tree with an imported document.
    ///
    /// A rejected document leaves the current tree untouched.
    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&mut self, json: &str) -> Result<(), JsError> {
        Ok(self.session.import_json(json)?)
    }

    /// Export the current tree as a snapshot document.
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsError> {
        Ok(self.session.export_json()?)
    }

    /// Get the current tree as a plain object for persistence.
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        to_js(self.session.tree())
    }

    /// Get the number of snapshots replaced so far.
    ///
    /// Hosts compare this to decide whether to persist or redraw.
    pub fn revision(&self) -> f64 {
        self.session.revision() as f64
    }

    #[wasm_bindgen(js_name = personCount)]
    pub fn person_count(&self) -> u32 {
        self.session.tree().persons.len() as u32
    }

    #[wasm_bindgen(js_name = marriageCount)]
    pub fn marriage_count(&self) -> u32 {
        self.session.tree().marriages.len() as u32
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Generate a fresh entity id.
    #[wasm_bindgen(js_name = newId)]
    pub fn new_id(&mut self) -> String {
        self.ids.next_id()
    }

    /// Apply one edit object, e.g. `{kind: "deletePerson", personId: "x"}`.
    #[wasm_bindgen(js_name = applyEdit)]
    pub fn apply_edit(&mut self, edit: JsValue) -> Result<(), JsError> {
        let edit: Edit = serde_wasm_bindgen::from_value(edit)?;
        Ok(self.session.apply(&edit)?)
    }

    /// Apply an array of edits in order, all or nothing.
    #[wasm_bindgen(js_name = applyEdits)]
    pub fn apply_edits(&mut self, edits: JsValue) -> Result<(), JsError> {
        let edits: Vec<Edit> = serde_wasm_bindgen::from_value(edits)?;
        Ok(self.session.apply_all(&edits)?)
    }

    /// Add a person. An empty `id` is replaced by a fresh one.
    ///
    /// Returns the person's id.
    #[wasm_bindgen(js_name = addPerson)]
    pub fn add_person(&mut self, person: JsValue) -> Result<String, JsError> {
        let person = self.person_with_id(person)?;
        let id = person.id.clone();
        self.session.apply(&Edit::AddPerson { person })?;
        Ok(id)
    }

    /// Replace all fields of an existing person.
    #[wasm_bindgen(js_name = updatePerson)]
    pub fn update_person(&mut self, person: JsValue) -> Result<(), JsError> {
        let person: Person = serde_wasm_bindgen::from_value(person)?;
        Ok(self.session.apply(&Edit::UpdatePerson { person })?)
    }

    /// Add a spouse for `person_id` together with their marriage.
    ///
    /// Returns the new marriage id.
    #[wasm_bindgen(js_name = addSpouse)]
    pub fn add_spouse(
        &mut self,
        person_id: String,
        spouse: JsValue,
        marriage_year: Option<i32>,
    ) -> Result<String, JsError> {
        let spouse = self.person_with_id(spouse)?;
        let marriage_id = self.ids.next_id();
        self.session.apply(&Edit::AddSpouse {
            person_id,
            spouse,
            marriage_id: marriage_id.clone(),
            marriage_year,
        })?;
        Ok(marriage_id)
    }

    /// Add a new child to an existing marriage.
    ///
    /// Returns the child's id.
    #[wasm_bindgen(js_name = addChild)]
    pub fn add_child(&mut self, marriage_id: String, child: JsValue) -> Result<String, JsError> {
        let child = self.person_with_id(child)?;
        let child_id = child.id.clone();
        self.session.apply(&Edit::AddChildOf { marriage_id, child })?;
        Ok(child_id)
    }

    /// Add both parents of `child_id` and their marriage.
    ///
    /// Returns the new marriage id.
    #[wasm_bindgen(js_name = addParents)]
    pub fn add_parents(
        &mut self,
        child_id: String,
        father: JsValue,
        mother: JsValue,
        marriage_year: Option<i32>,
    ) -> Result<String, JsError> {
        let father = self.person_with_id(father)?;
        let mother = self.person_with_id(mother)?;
        let marriage_id = self.ids.next_id();
        self.session.apply(&Edit::AddParents {
            child_id,
            father,
            mother,
            marriage_id: marriage_id.clone(),
            marriage_year,
        })?;
        Ok(marriage_id)
    }

    /// Delete a person, their marriages and dependent child links.
    #[wasm_bindgen(js_name = deletePerson)]
    pub fn delete_person(&mut self, person_id: String) -> Result<(), JsError> {
        Ok(self.session.apply(&Edit::DeletePerson { person_id })?)
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// Select a person. Selection never changes the layout.
    #[wasm_bindgen(js_name = setFocus)]
    pub fn set_focus(&mut self, person_id: Option<String>) {
        self.session.set_focus(person_id.as_deref());
    }

    pub fn focus(&self) -> Option<String> {
        self.session.focus().map(str::to_string)
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Set layout options, e.g. `{horizontalSpacing: 200}`. Missing fields keep defaults.
    #[wasm_bindgen(js_name = setLayoutConfig)]
    pub fn set_layout_config(&mut self, config: JsValue) -> Result<(), JsError> {
        let config: LayoutConfig = serde_wasm_bindgen::from_value(config)?;
        self.session.set_layout_config(config);
        Ok(())
    }

    /// Compute generation numbers relative to `start_id`.
    ///
    /// Returns an object of person id -> generation; empty when the id is unknown.
    #[wasm_bindgen(js_name = computeGenerations)]
    pub fn compute_generations(&self, start_id: &str) -> Result<JsValue, JsError> {
        to_js(&compute_generations(self.session.tree(), start_id))
    }

    /// Get the current layout: `{root, generations, persons, marriages}`.
    ///
    /// Computed once per snapshot and reused until the tree changes.
    pub fn layout(&mut self) -> Result<JsValue, JsError> {
        to_js(&*self.session.layout())
    }

    /// Get the bounding box of all placed persons.
    ///
    /// Returns [min_x, min_y, max_x, max_y], or None if nothing is placed.
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&mut self) -> Option<Vec<f32>> {
        self.session
            .layout()
            .bounds()
            .map(|(min_x, min_y, max_x, max_y)| vec![min_x, min_y, max_x, max_y])
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Find the person drawn nearest to a point, within a maximum distance.
    #[wasm_bindgen(js_name = findPersonAt)]
    pub fn find_person_at(&mut self, x: f32, y: f32, max_distance: f32) -> Option<String> {
        self.session.person_at(x, y, max_distance)
    }

    /// Find all persons drawn inside a rectangle.
    #[wasm_bindgen(js_name = findPersonsInRect)]
    pub fn find_persons_in_rect(
        &mut self,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    ) -> Vec<String> {
        self.session.persons_in_rect(min_x, min_y, max_x, max_y)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Set the console log level ("error", "warn", "info", "debug", "trace", "off").
    #[wasm_bindgen(js_name = setLogLevel)]
    pub fn set_log_level(level: &str) -> Result<(), JsError> {
        let filter = logging::parse_level(level)
            .ok_or_else(|| JsError::new(&format!("unknown log level `{level}`")))?;
        logging::init(filter);
        Ok(())
    }
}

impl FamilyTreeWasm {
    /// Decode a person from JS, assigning a fresh id when none was given.
    fn person_with_id(&mut self, value: JsValue) -> Result<Person, JsError> {
        let mut person: Person = serde_wasm_bindgen::from_value(value)?;
        if person.id.is_empty() {
            person.id = self.ids.next_id();
        }
        Ok(person)
    }
}

impl Default for FamilyTreeWasm {
    fn default() -> Self {
        Self::new()
    }
}
