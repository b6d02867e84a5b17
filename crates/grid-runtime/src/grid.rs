//! The grid runtime: one instance per rendered table.
//!
//! A [`Grid`] owns the row records, the selector states and the save state
//! machine. Events come in through [`Grid::handle`]; network calls go through
//! a [`Transport`] passed per call.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use grid_format::json_value_to_cell;
use grid_model::{LayoutVariant, RowIndex, TableDescription, is_code_name};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{AddRowError, GatewayError, RuntimeError, TransportError};
use crate::field::{Capability, Field, FieldSpec};
use crate::gateway::{check_save_reply, serialize};
use crate::markup::{GridMarkup, RowMarkup, parse_grid, parse_row_fragment};
use crate::options::RuntimeOptions;
use crate::rows::{RowRecord, RowSet};
use crate::selector::{
    FieldId, NavKey, SelectorId, SelectorItem, SelectorOutcome, SelectorState, visible_items,
};
use crate::toast::Toast;
use crate::transport::{Response, Transport, row_fragment_path};
use crate::validate::{validate_field, validate_row};

const INVALID_ROW: &str = "Fix the highlighted fields before saving";
const INVALID_GRID: &str = "Some rows have errors; fix them before saving";
const IN_FLIGHT: &str = "A save is already in progress";
const NOTHING_TO_SAVE: &str = "Nothing to save";
const SAVED: &str = "Saved";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridState {
    Idle,
    Validating,
    Saving,
}

/// User input routed to the grid.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    Input { field: FieldId, text: String },
    Blur(FieldId),
    Key { field: FieldId, key: NavKey },
    /// Click on an option of a choice field.
    Pick { field: FieldId, value: String },
    Toggle {
        field: FieldId,
        value: String,
        checked: bool,
    },
    CatalogueFilter(String),
    CatalogueKey(NavKey),
    AddRow(String),
    DeleteRow(RowIndex),
    Save,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveRejection {
    InFlight,
    Invalid,
    /// Time left until the next save is accepted.
    Cooldown(TimeDelta),
    Empty,
}

#[derive(Debug)]
pub enum SaveOutcome {
    Saved,
    Rejected(SaveRejection),
    Failed(GatewayError),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}

/// A save in flight: the request to send and the payload it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveTicket {
    pub path: String,
    pub body: String,
    pub payload: Value,
}

pub struct Grid {
    variant: LayoutVariant,
    endpoint: String,
    title: String,
    state: GridState,
    rows: RowSet,
    catalogue: Vec<SelectorItem>,
    selectors: HashMap<SelectorId, SelectorState>,
    last_save: Option<DateTime<Utc>>,
    extensible: bool,
    unique_codes: bool,
    toasts: Vec<Toast>,
    options: RuntimeOptions,
    clock: Box<dyn Clock>,
}

fn record_from_markup(index: RowIndex, row: RowMarkup) -> RowRecord {
    let fields = row
        .fields
        .into_iter()
        .map(|field| Field::new(field.spec, &field.value))
        .collect();
    RowRecord::new(index, row.code, row.title, fields)
}

impl Grid {
    fn new(
        variant: LayoutVariant,
        endpoint: String,
        title: String,
        catalogue: Vec<SelectorItem>,
        options: RuntimeOptions,
        clock: Box<dyn Clock>,
    ) -> Result<Self, RuntimeError> {
        match variant {
            LayoutVariant::SystemDefinition => Err(RuntimeError::UnsupportedLayout(variant)),
            LayoutVariant::HorizontalStaticUnique
            | LayoutVariant::HorizontalDynamicUnique
            | LayoutVariant::HorizontalDynamicDuplicable
            | LayoutVariant::VerticalStaticUnique => Ok(Self {
                variant,
                endpoint,
                title,
                state: GridState::Idle,
                rows: RowSet::new(),
                catalogue,
                selectors: HashMap::new(),
                last_save: None,
                extensible: variant.is_dynamic(),
                unique_codes: variant.requires_unique_codes(),
                toasts: Vec::new(),
                options,
                clock,
            }),
        }
    }

    /// Parse server markup and apply its initial data.
    ///
    /// Problems with the initial data are logged and skipped.
    pub fn attach(
        markup: &str,
        options: RuntimeOptions,
        clock: Box<dyn Clock>,
        transport: &mut dyn Transport,
    ) -> Result<Self, RuntimeError> {
        let markup = parse_grid(markup)?;
        let initial = markup.initial.clone();
        let mut grid = Self::from_markup(markup, options, clock)?;
        grid.load_initial(initial.as_deref(), transport);
        Ok(grid)
    }

    pub fn from_markup(
        markup: GridMarkup,
        options: RuntimeOptions,
        clock: Box<dyn Clock>,
    ) -> Result<Self, RuntimeError> {
        let catalogue = markup
            .catalogue
            .into_iter()
            .map(|entry| SelectorItem::new(entry.code, entry.title))
            .collect();
        let mut grid = Self::new(
            markup.variant,
            markup.endpoint,
            markup.title,
            catalogue,
            options,
            clock,
        )?;
        for row in markup.rows {
            let index = grid.fresh_index(row.index);
            grid.rows.push(record_from_markup(index, row));
        }
        debug!(
            variant = %grid.variant,
            rows = grid.rows.len(),
            catalogue = grid.catalogue.len(),
            "grid attached"
        );
        Ok(grid)
    }

    /// Build a grid straight from a resolved description. Dynamic initial
    /// data is not applied; see [`Grid::load_initial`].
    pub fn from_description(
        description: &TableDescription,
        options: RuntimeOptions,
        clock: Box<dyn Clock>,
    ) -> Result<Self, RuntimeError> {
        let catalogue = description
            .catalogue
            .iter()
            .map(|entry| SelectorItem::new(entry.code.clone(), entry.title.clone()))
            .collect();
        let mut grid = Self::new(
            description.variant,
            description.endpoint.clone(),
            description.name.clone(),
            catalogue,
            options,
            clock,
        )?;
        for row in &description.rows {
            let fields = row
                .cells
                .iter()
                .filter_map(|cell| {
                    let column = description.columns.get(cell.column)?;
                    Some(Field::new(FieldSpec::from_cell(column, cell), &cell.value))
                })
                .collect();
            let index = grid.fresh_index(row.index);
            grid.rows
                .push(RowRecord::new(index, row.code.clone(), row.title.clone(), fields));
        }
        Ok(grid)
    }

    fn fresh_index(&self, wanted: Option<RowIndex>) -> RowIndex {
        let next = self.rows.peek_next();
        match wanted {
            Some(index) if index >= next => index,
            _ => next,
        }
    }

    /// Provision one row per object of a saved dynamic payload.
    pub fn load_initial(&mut self, payload: Option<&str>, transport: &mut dyn Transport) {
        if !self.extensible {
            return;
        }
        let Some(payload) = payload.map(str::trim).filter(|p| !p.is_empty()) else {
            debug!("no initial data");
            return;
        };
        let objects = match serde_json::from_str::<Value>(payload) {
            Ok(Value::Array(objects)) => objects,
            Ok(_) => {
                warn!("initial data is not an array, skipped");
                return;
            }
            Err(err) => {
                warn!(error = %err, "malformed initial data, skipped");
                return;
            }
        };
        for object in objects {
            let Value::Object(object) = object else {
                warn!("initial row is not an object, skipped");
                continue;
            };
            let Some(code) = object
                .iter()
                .find(|(name, _)| is_code_name(name))
                .and_then(|(_, value)| value.as_str())
                .map(str::to_string)
            else {
                warn!("initial row has no code, skipped");
                continue;
            };
            match self.provision(&code, transport) {
                Ok(index) => self.fill_row(index, &object),
                Err(err) => warn!(code = %code, error = %err, "initial row skipped"),
            }
        }
    }

    fn fill_row(&mut self, index: RowIndex, object: &Map<String, Value>) {
        let Some(row) = self.rows.get_mut(index) else {
            return;
        };
        for (name, value) in object {
            if let Some(field) = row.field_mut(name) {
                field.set_value(&json_value_to_cell(value));
            }
        }
    }

    pub fn variant(&self) -> LayoutVariant {
        self.variant
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> GridState {
        self.state
    }

    pub fn rows(&self) -> &RowSet {
        &self.rows
    }

    pub fn row(&self, index: RowIndex) -> Option<&RowRecord> {
        self.rows.get(index)
    }

    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.rows.get(id.row)?.field(&id.name)
    }

    pub fn last_save(&self) -> Option<DateTime<Utc>> {
        self.last_save
    }

    pub fn is_extensible(&self) -> bool {
        self.extensible
    }

    pub fn selector(&self, id: &SelectorId) -> Option<&SelectorState> {
        self.selectors.get(id)
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    /// Rows still showing the success state.
    pub fn flashing_rows(&self) -> Vec<RowIndex> {
        let now = self.clock.now();
        self.rows
            .iter()
            .filter(|row| row.is_flashing(now))
            .map(|row| row.index)
            .collect()
    }

    /// Whether the add-row catalogue offers this code right now.
    pub fn is_code_selectable(&self, code: &str) -> bool {
        self.catalogue.iter().any(|item| item.value == code)
            && !(self.unique_codes && self.rows.contains_code(code))
    }

    /// Catalogue entries visible under the current add-row filter.
    pub fn catalogue_items(&self) -> Vec<&SelectorItem> {
        let filter = self
            .selectors
            .get(&SelectorId::AddRow)
            .map(|state| state.filter.as_str())
            .unwrap_or_default();
        let hidden = |code: &str| self.unique_codes && self.rows.contains_code(code);
        visible_items(&self.catalogue, filter, &hidden)
    }

    fn field_mut(&mut self, id: &FieldId) -> Result<&mut Field, RuntimeError> {
        self.rows
            .get_mut(id.row)
            .ok_or(RuntimeError::UnknownRow(id.row))?
            .field_mut(&id.name)
            .ok_or_else(|| RuntimeError::UnknownField {
                row: id.row,
                name: id.name.clone(),
            })
    }

    pub fn handle(
        &mut self,
        event: GridEvent,
        transport: &mut dyn Transport,
    ) -> Result<(), RuntimeError> {
        match event {
            GridEvent::Input { field, text } => self.on_input(&field, &text),
            GridEvent::Blur(field) => self.on_blur(&field),
            GridEvent::Key { field, key } => self.on_key(&field, key, transport),
            GridEvent::Pick { field, value } => self.commit_choice(&field, &value, transport),
            GridEvent::Toggle {
                field,
                value,
                checked,
            } => self.on_toggle(&field, &value, checked, transport),
            GridEvent::CatalogueFilter(text) => {
                self.selectors
                    .entry(SelectorId::AddRow)
                    .or_default()
                    .set_filter(&text);
                Ok(())
            }
            GridEvent::CatalogueKey(key) => {
                self.on_catalogue_key(key, transport);
                Ok(())
            }
            GridEvent::AddRow(code) => {
                // failures are already reported as a toast
                self.add_row(&code, transport).ok();
                Ok(())
            }
            GridEvent::DeleteRow(index) => self
                .delete_row(index)
                .map(|_| ())
                .ok_or(RuntimeError::UnknownRow(index)),
            GridEvent::Save => {
                self.save(None, transport);
                Ok(())
            }
        }
    }

    fn on_input(&mut self, id: &FieldId, text: &str) -> Result<(), RuntimeError> {
        let capability = {
            let field = self.field_mut(id)?;
            field.input(text);
            if field.issue.is_some() {
                field.issue = validate_field(field);
            }
            field.capability
        };
        if capability == Capability::Choice {
            self.selectors
                .entry(SelectorId::Field(id.clone()))
                .or_default()
                .set_filter(text);
        }
        Ok(())
    }

    fn on_blur(&mut self, id: &FieldId) -> Result<(), RuntimeError> {
        let row = self
            .rows
            .get_mut(id.row)
            .ok_or(RuntimeError::UnknownRow(id.row))?;
        row.field_mut(&id.name)
            .ok_or_else(|| RuntimeError::UnknownField {
                row: id.row,
                name: id.name.clone(),
            })?
            .blur();
        validate_row(row);
        if let Some(selector) = self.selectors.get_mut(&SelectorId::Field(id.clone())) {
            selector.close();
        }
        Ok(())
    }

    fn on_key(
        &mut self,
        id: &FieldId,
        key: NavKey,
        transport: &mut dyn Transport,
    ) -> Result<(), RuntimeError> {
        let field = self.field_mut(id)?;
        let capability = field.capability;
        match capability {
            Capability::Choice => {
                let items: Vec<SelectorItem> = field
                    .spec
                    .options
                    .iter()
                    .map(|option| SelectorItem::new(option.value.clone(), option.label.clone()))
                    .collect();
                let selector = self
                    .selectors
                    .entry(SelectorId::Field(id.clone()))
                    .or_default();
                let visible = visible_items(&items, &selector.filter, &|_| false);
                if let SelectorOutcome::Commit(value) = selector.key(key, &visible) {
                    self.commit_choice(id, &value, transport)?;
                }
            }
            Capability::Number(_) | Capability::Text(_) if key == NavKey::Enter => {
                field.blur();
                self.save(Some(id.row), transport);
            }
            Capability::Number(_)
            | Capability::Text(_)
            | Capability::MultiSelect
            | Capability::MultiExclusive
            | Capability::ReadOnly => {}
        }
        Ok(())
    }

    fn commit_choice(
        &mut self,
        id: &FieldId,
        value: &str,
        transport: &mut dyn Transport,
    ) -> Result<(), RuntimeError> {
        let field = self.field_mut(id)?;
        if !field.pick(value) {
            return Ok(());
        }
        field.issue = None;
        if let Some(selector) = self.selectors.get_mut(&SelectorId::Field(id.clone())) {
            selector.close();
            selector.filter.clear();
        }
        self.save(Some(id.row), transport);
        Ok(())
    }

    fn on_toggle(
        &mut self,
        id: &FieldId,
        value: &str,
        checked: bool,
        transport: &mut dyn Transport,
    ) -> Result<(), RuntimeError> {
        let field = self.field_mut(id)?;
        if !field.toggle(value, checked) {
            return Ok(());
        }
        if field.issue.is_some() {
            field.issue = validate_field(field);
        }
        if field.spec.required {
            self.save(Some(id.row), transport);
        }
        Ok(())
    }

    fn on_catalogue_key(&mut self, key: NavKey, transport: &mut dyn Transport) {
        let unique = self.unique_codes;
        let rows = &self.rows;
        let hidden = |code: &str| unique && rows.contains_code(code);
        let selector = self.selectors.entry(SelectorId::AddRow).or_default();
        let visible = visible_items(&self.catalogue, &selector.filter, &hidden);
        if let SelectorOutcome::Commit(code) = selector.key(key, &visible) {
            self.add_row(&code, transport).ok();
        }
    }

    /// Add a dynamic row for `code`, reporting failures as a toast.
    pub fn add_row(
        &mut self,
        code: &str,
        transport: &mut dyn Transport,
    ) -> Result<RowIndex, AddRowError> {
        match self.provision(code, transport) {
            Ok(index) => {
                if let Some(selector) = self.selectors.get_mut(&SelectorId::AddRow) {
                    selector.close();
                    selector.filter.clear();
                }
                Ok(index)
            }
            Err(err) => {
                warn!(code, error = %err, "row not added");
                self.toasts.push(Toast::error(err.user_message()));
                Err(err)
            }
        }
    }

    fn provision(
        &mut self,
        code: &str,
        transport: &mut dyn Transport,
    ) -> Result<RowIndex, AddRowError> {
        if !self.extensible {
            return Err(AddRowError::NotExtensible);
        }
        if !self.catalogue.iter().any(|item| item.value == code) {
            return Err(AddRowError::UnknownCode(code.to_string()));
        }
        if self.unique_codes && self.rows.contains_code(code) {
            return Err(AddRowError::DuplicateCode(code.to_string()));
        }

        let index = self.rows.allocate();
        let path = row_fragment_path(&self.endpoint, code, index);
        let response = transport.get(&path).map_err(GatewayError::from)?;
        if !response.is_success() {
            return Err(GatewayError::Server {
                status: response.status,
                message: None,
            }
            .into());
        }
        let fragment = parse_row_fragment(&response.body).map_err(GatewayError::from)?;
        let mut record = record_from_markup(index, fragment);
        record.code = Some(code.to_string());
        if record.title.is_none() {
            record.title = self
                .catalogue
                .iter()
                .find(|item| item.value == code)
                .map(|item| item.label.clone());
        }
        self.rows.push(record);
        debug!(code, %index, "row added");
        Ok(index)
    }

    /// Remove a dynamic row. No server call is made.
    pub fn delete_row(&mut self, index: RowIndex) -> Option<RowRecord> {
        if !self.extensible {
            return None;
        }
        let removed = self.rows.remove(index)?;
        self.selectors
            .retain(|id, _| !matches!(id, SelectorId::Field(field) if field.row == index));
        debug!(%index, code = ?removed.code, "row deleted");
        Some(removed)
    }

    /// Validate and serialize the grid, and move to `Saving`.
    ///
    /// `trigger` is the row whose event asked for the save, if any.
    pub fn begin_save(&mut self, trigger: Option<RowIndex>) -> Result<SaveTicket, SaveRejection> {
        if self.state == GridState::Saving {
            self.toasts.push(Toast::info(IN_FLIGHT));
            return Err(SaveRejection::InFlight);
        }
        self.state = GridState::Validating;

        if let Some(index) = trigger
            && let Some(row) = self.rows.get_mut(index)
            && !validate_row(row)
        {
            return Err(self.reject(SaveRejection::Invalid, Toast::error(INVALID_ROW)));
        }
        if let Some(last) = self.last_save {
            let elapsed = self.clock.now() - last;
            if elapsed <= self.options.save_cooldown {
                let remaining = self.options.save_cooldown - elapsed;
                let message = format!(
                    "Please wait {:.1} s before saving again",
                    remaining.num_milliseconds() as f64 / 1000.0
                );
                return Err(self.reject(SaveRejection::Cooldown(remaining), Toast::info(message)));
            }
        }

        let mut valid = true;
        for row in self.rows.iter_mut() {
            valid &= validate_row(row);
        }
        if !valid {
            return Err(self.reject(SaveRejection::Invalid, Toast::error(INVALID_GRID)));
        }

        let Some(payload) = serialize(self.variant, &self.rows) else {
            return Err(self.reject(SaveRejection::Empty, Toast::info(NOTHING_TO_SAVE)));
        };
        self.state = GridState::Saving;
        Ok(SaveTicket {
            path: self.endpoint.clone(),
            body: payload.to_string(),
            payload,
        })
    }

    fn reject(&mut self, rejection: SaveRejection, toast: Toast) -> SaveRejection {
        debug!(?rejection, "save rejected");
        self.state = GridState::Idle;
        self.toasts.push(toast);
        rejection
    }

    /// Apply the outcome of the request described by `ticket`.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        outcome: Result<Response, TransportError>,
    ) -> SaveOutcome {
        self.state = GridState::Idle;
        let result = outcome
            .map_err(GatewayError::from)
            .and_then(|response| check_save_reply(&response));
        match result {
            Ok(()) => {
                let now = self.clock.now();
                self.last_save = Some(now);
                let until = now + self.options.success_flash;
                for row in self.rows.iter_mut().filter(|row| row.has_data()) {
                    row.flash_until = Some(until);
                }
                info!(endpoint = %ticket.path, bytes = ticket.body.len(), "grid saved");
                self.toasts.push(Toast::success(SAVED));
                SaveOutcome::Saved
            }
            Err(err) => {
                warn!(endpoint = %ticket.path, error = %err, "save failed");
                self.toasts.push(Toast::error(err.user_message()));
                SaveOutcome::Failed(err)
            }
        }
    }

    /// Run a whole save over a blocking transport.
    pub fn save(&mut self, trigger: Option<RowIndex>, transport: &mut dyn Transport) -> SaveOutcome {
        let ticket = match self.begin_save(trigger) {
            Ok(ticket) => ticket,
            Err(rejection) => return SaveOutcome::Rejected(rejection),
        };
        let response = transport.post_json(&ticket.path, &ticket.body);
        self.finish_save(ticket, response)
    }
}
