use std::collections::BTreeSet;
use std::time::Instant;

use serde_json::Value;

use crate::columns::ColumnId;
use crate::config::WidgetConfig;
use crate::diagnostics::Diagnostics;
use crate::model::{InitPayload, PlayerRecord, RosterStore, Team, sample_payload};
use crate::protocol::{HostMessage, OutboundMessage, PlayerClick};
use crate::sorter::sorted_rows;
use crate::surface::{HostChannel, LayoutMode, TableSpec, TableSurface, layout_for_width};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Built,
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Subscription {
    HostMessages,
    DomReady,
    FallbackTimer,
    ViewportResize,
    ContainerResize,
}

#[derive(Debug)]
pub struct Widget<S, H> {
    config: WidgetConfig,
    surface: S,
    host: H,
    phase: Phase,
    teams: Vec<Team>,
    store: RosterStore,
    active_team: Option<String>,
    dom_ready: bool,
    pending_init: Option<InitPayload>,
    init_received: bool,
    fallback_due: Option<Instant>,
    viewport_width: u32,
    layout: LayoutMode,
    resize_due: Option<Instant>,
    subscriptions: BTreeSet<Subscription>,
    diagnostics: Diagnostics,
}

impl<S: TableSurface, H: HostChannel> Widget<S, H> {
    pub fn new(config: WidgetConfig, surface: S, host: H, viewport_width: u32) -> Self {
        let layout = layout_for_width(viewport_width, config.breakpoint_px);
        let mut subscriptions = BTreeSet::new();
        subscriptions.insert(Subscription::HostMessages);
        subscriptions.insert(Subscription::DomReady);
        Self {
            config,
            surface,
            host,
            phase: Phase::Uninitialized,
            teams: Vec::new(),
            store: RosterStore::new(),
            active_team: None,
            dom_ready: false,
            pending_init: None,
            init_received: false,
            fallback_due: None,
            viewport_width,
            layout,
            resize_due: None,
            subscriptions,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_subscribed(&self, sub: Subscription) -> bool {
        self.subscriptions.contains(&sub)
    }

    pub fn active_team(&self) -> Option<&str> {
        self.active_team.as_deref()
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn store(&self) -> &RosterStore {
        &self.store
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn has_pending_init(&self) -> bool {
        self.pending_init.is_some()
    }

    pub fn displayed_rows(&self) -> Vec<PlayerRecord> {
        match (&self.phase, &self.active_team) {
            (Phase::Built, Some(team_id)) => sorted_rows(&self.store, team_id),
            _ => Vec::new(),
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.fallback_due, self.resize_due) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn on_message(&mut self, data: &Value) {
        if !self.is_subscribed(Subscription::HostMessages) {
            return;
        }
        match HostMessage::decode(data) {
            Ok(HostMessage::Init(payload)) => {
                self.init_received = true;
                if !self.dom_ready {
                    if self.pending_init.is_some() {
                        self.diagnostics
                            .info("INIT before DOM ready replaces the buffered one");
                    }
                    self.pending_init = Some(payload);
                    return;
                }
                self.apply_init(payload);
            }
            Ok(HostMessage::Update(update)) => {
                self.store.replace(&update.team_id, update.players);
                if self.phase == Phase::Built
                    && self.active_team.as_deref() == Some(update.team_id.as_str())
                {
                    self.refresh_rows();
                }
            }
            Err(reason) => self.diagnostics.info(format!("dropped host message: {reason}")),
        }
    }

    pub fn on_dom_ready(&mut self, now: Instant) {
        if !self.is_subscribed(Subscription::DomReady) {
            return;
        }
        self.subscriptions.remove(&Subscription::DomReady);
        self.dom_ready = true;

        if let Some(payload) = self.pending_init.take() {
            self.apply_init(payload);
        }

        // Guarded rather than cancelled: a late check after real data is a no-op.
        self.fallback_due = Some(now + self.config.fallback_delay);
        self.subscriptions.insert(Subscription::FallbackTimer);
    }

    pub fn poll(&mut self, now: Instant) {
        if self.fallback_due.is_some_and(|due| due <= now) {
            self.fallback_due = None;
            self.subscriptions.remove(&Subscription::FallbackTimer);
            if !self.init_received && self.store.is_empty() {
                self.diagnostics
                    .info("no host data received; showing sample dataset");
                self.apply_init(InitPayload::from_value(&sample_payload()));
            }
        }

        if self.resize_due.is_some_and(|due| due <= now) {
            self.resize_due = None;
            self.relayout();
        }
    }

    pub fn on_viewport_resize(&mut self, width: u32, now: Instant) {
        if self.phase == Phase::Disposed {
            return;
        }
        self.viewport_width = width;
        if !self.is_subscribed(Subscription::ViewportResize) {
            return;
        }
        self.resize_due = Some(now + self.config.resize_debounce);
    }

    pub fn on_container_resize(&mut self) {
        if !self.is_subscribed(Subscription::ContainerResize) {
            return;
        }
        if let Err(err) = self.surface.redraw(true) {
            self.diagnostics
                .warn(format!("container redraw failed: {err:#}"));
        }
    }

    /// Click on a cell of `row`. Returns whether a message was posted to the host.
    pub fn on_cell_click(&mut self, column: ColumnId, row: &PlayerRecord) -> bool {
        if self.phase != Phase::Built || column != ColumnId::Player {
            return false;
        }
        let Some(url) = row.link() else {
            return false;
        };
        let msg = OutboundMessage::PlayerClick(PlayerClick {
            team_id: self.active_team.clone().unwrap_or_default(),
            player_name: row.click_name(),
            url: url.to_string(),
        });
        match self.host.post_to_parent(&msg) {
            Ok(()) => {
                self.diagnostics
                    .info(format!("PLAYER_CLICK {} -> {url}", row.click_name()));
                true
            }
            Err(err) => {
                self.diagnostics
                    .warn(format!("posting PLAYER_CLICK failed: {err:#}"));
                false
            }
        }
    }

    pub fn click_player(&mut self, name: &str) -> bool {
        let Some(row) = self
            .displayed_rows()
            .into_iter()
            .find(|row| row.sort_name() == name)
        else {
            return false;
        };
        self.on_cell_click(ColumnId::Player, &row)
    }

    pub fn dispose(&mut self) {
        if self.phase == Phase::Disposed {
            return;
        }
        self.subscriptions.clear();
        self.fallback_due = None;
        self.resize_due = None;
        self.pending_init = None;
        self.phase = Phase::Disposed;
        self.diagnostics.info("widget disposed");
    }

    fn apply_init(&mut self, payload: InitPayload) {
        let teams = payload.effective_teams();
        let Some(first) = teams.first() else {
            self.diagnostics.info("INIT without any team ignored");
            return;
        };
        let first_id = first.id.clone();
        self.teams = teams;
        self.store = payload.players_by_team;

        match self.phase {
            Phase::Uninitialized => {
                self.active_team = Some(first_id);
                self.build();
            }
            // The table is built once; later payloads only refresh its rows.
            Phase::Built => self.refresh_rows(),
            Phase::Disposed => {}
        }
    }

    fn build(&mut self) {
        let Some(team_id) = self.active_team.clone() else {
            return;
        };
        self.layout = layout_for_width(self.viewport_width, self.config.breakpoint_px);
        let rows = sorted_rows(&self.store, &team_id);
        let count = rows.len();
        match self.surface.build(TableSpec::new(self.layout), rows) {
            Ok(()) => {
                self.phase = Phase::Built;
                self.subscriptions.insert(Subscription::ViewportResize);
                self.subscriptions.insert(Subscription::ContainerResize);
                self.diagnostics
                    .info(format!("table built for {team_id} ({count} players)"));
            }
            Err(err) => {
                self.active_team = None;
                self.diagnostics.warn(format!("table build failed: {err:#}"));
            }
        }
    }

    fn refresh_rows(&mut self) {
        let Some(team_id) = self.active_team.as_deref() else {
            return;
        };
        let rows = sorted_rows(&self.store, team_id);
        if let Err(err) = self.surface.replace_data(rows) {
            self.diagnostics.warn(format!("replacing rows failed: {err:#}"));
        }
    }

    fn relayout(&mut self) {
        let next = layout_for_width(self.viewport_width, self.config.breakpoint_px);
        if next == self.layout {
            return;
        }
        if let Err(err) = self.surface.set_layout(next) {
            self.diagnostics.warn(format!("layout switch failed: {err:#}"));
            return;
        }
        self.layout = next;
        if let Err(err) = self.surface.redraw(true) {
            self.diagnostics.warn(format!("redraw after resize failed: {err:#}"));
        }
    }
}
