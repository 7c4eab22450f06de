//! TUI application state

use ratatui::widgets::ListState;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::models::{AppEvent, FirmwareCatalog, FocusedPane, OperationKind, PortInfo};
use crate::orchestrator::{Orchestrator, OrchestratorState};
use crate::selection::PortList;

/// Lines moved by PgUp/PgDn
const PAGE: usize = 10;

pub struct App {
    pub orchestrator: Arc<Orchestrator>,
    /// Last observed orchestrator state
    pub state: OrchestratorState,
    pub catalog: FirmwareCatalog,
    pub ports: PortList,
    pub port_list_state: ListState,
    pub firmware_list_state: ListState,
    pub focused_pane: FocusedPane,
    pub show_help: bool,
    pub show_erase_confirmation: bool,
    pub log_scroll_offset: usize,
    pub log_auto_scroll: bool,
    pub refreshing_ports: bool,
    pub port_status: String,
}

impl App {
    pub fn new(orchestrator: Arc<Orchestrator>, config: &AppConfig) -> Self {
        let catalog = FirmwareCatalog::new();
        let default_firmware = config.ui.default_firmware_id;
        orchestrator.select_firmware(catalog.get(default_firmware).map(|fw| fw.id));

        let mut firmware_list_state = ListState::default();
        firmware_list_state.select(catalog.all().iter().position(|fw| fw.id == default_firmware));

        let state = orchestrator.snapshot();
        Self {
            orchestrator,
            state,
            catalog,
            ports: PortList::new(),
            port_list_state: ListState::default(),
            firmware_list_state,
            focused_pane: FocusedPane::default(),
            show_help: false,
            show_erase_confirmation: false,
            log_scroll_offset: 0,
            log_auto_scroll: true,
            refreshing_ports: false,
            port_status: "Scanning for ports...".to_string(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Adopt a new orchestrator snapshot
    pub fn sync_state(&mut self, state: OrchestratorState) {
        self.state = state;
        if self.log_auto_scroll {
            self.log_scroll_offset = self.state.log.len().saturating_sub(1);
        }
    }

    pub fn toggle_focused_pane(&mut self) {
        self.focused_pane = self.focused_pane.next();
    }

    /// Enumerate ports in the background
    pub fn refresh_ports(&mut self, tx: mpsc::UnboundedSender<AppEvent>) {
        if self.refreshing_ports {
            return;
        }
        self.refreshing_ports = true;
        self.port_status = "Scanning for ports...".to_string();

        let orchestrator = Arc::clone(&self.orchestrator);
        tokio::spawn(async move {
            let event = match orchestrator.list_ports().await {
                Ok(ports) => AppEvent::PortsRefreshed(ports),
                Err(e) => AppEvent::PortRefreshFailed(e.to_string()),
            };
            let _ = tx.send(event);
        });
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::PortsRefreshed(ports) => self.handle_ports_refreshed(ports),
            AppEvent::PortRefreshFailed(error) => {
                log::warn!("Port refresh failed: {}", error);
                self.refreshing_ports = false;
                self.port_status = format!("Port scan failed: {}", error);
            }
            AppEvent::OperationEnded(kind, admitted) => {
                if !admitted {
                    log::debug!("{} was not admitted", kind);
                }
            }
            AppEvent::Tick => {}
        }
    }

    pub fn handle_ports_refreshed(&mut self, ports: Vec<PortInfo>) {
        self.refreshing_ports = false;
        self.port_status = format!("{} port(s)", ports.len());

        let current = self.state.selection.port.clone();
        let selected = self.ports.update(ports, current.as_deref());
        if !self.is_busy() && self.orchestrator.select_port(selected) {
            self.state = self.orchestrator.snapshot();
        }
        let highlighted = self
            .state
            .selection
            .port
            .as_deref()
            .and_then(|name| self.ports.position(name))
            .or(if self.ports.is_empty() { None } else { Some(0) });
        self.port_list_state.select(highlighted);
    }

    pub fn move_up(&mut self) {
        match self.focused_pane {
            FocusedPane::PortList => step(&mut self.port_list_state, self.ports.ports().len(), -1),
            FocusedPane::FirmwareList => {
                step(&mut self.firmware_list_state, self.catalog.all().len(), -1)
            }
            FocusedPane::LogPane => self.scroll_log_up(1),
        }
    }

    pub fn move_down(&mut self) {
        match self.focused_pane {
            FocusedPane::PortList => step(&mut self.port_list_state, self.ports.ports().len(), 1),
            FocusedPane::FirmwareList => {
                step(&mut self.firmware_list_state, self.catalog.all().len(), 1)
            }
            FocusedPane::LogPane => self.scroll_log_down(1),
        }
    }

    /// Commit the highlighted port or firmware as the selection
    pub fn select_highlighted(&mut self) {
        if self.is_busy() {
            return;
        }
        let changed = match self.focused_pane {
            FocusedPane::PortList => {
                let port = self
                    .port_list_state
                    .selected()
                    .and_then(|i| self.ports.get(i))
                    .map(|p| p.name.clone());
                port.is_some() && self.orchestrator.select_port(port)
            }
            FocusedPane::FirmwareList => {
                let firmware = self
                    .firmware_list_state
                    .selected()
                    .and_then(|i| self.catalog.all().get(i))
                    .map(|fw| fw.id);
                firmware.is_some() && self.orchestrator.select_firmware(firmware)
            }
            FocusedPane::LogPane => false,
        };
        if changed {
            self.state = self.orchestrator.snapshot();
        }
    }

    /// Run `kind` in the background; the orchestrator decides admission
    pub fn start_operation(&mut self, kind: OperationKind, tx: mpsc::UnboundedSender<AppEvent>) {
        if !self.state.can_start() {
            log::debug!("Ignoring {} request: cannot start now", kind);
            return;
        }
        self.log_auto_scroll = true;
        let orchestrator = Arc::clone(&self.orchestrator);
        tokio::spawn(async move {
            let admitted = orchestrator.run(kind).await;
            let _ = tx.send(AppEvent::OperationEnded(kind, admitted));
        });
    }

    /// Open the erase confirmation when an erase could start
    pub fn request_erase(&mut self) {
        if self.state.can_start() {
            self.show_erase_confirmation = true;
        }
    }

    pub fn confirm_erase(&mut self, tx: mpsc::UnboundedSender<AppEvent>) {
        self.show_erase_confirmation = false;
        self.start_operation(OperationKind::Erase, tx);
    }

    pub fn decline_erase(&mut self) {
        self.show_erase_confirmation = false;
        log::debug!("Erase declined");
    }

    pub fn clear_log(&mut self) {
        if self.orchestrator.clear_log() {
            self.state = self.orchestrator.snapshot();
        }
        self.log_scroll_offset = 0;
    }

    pub fn scroll_log_up(&mut self, lines: usize) {
        self.log_auto_scroll = false;
        self.log_scroll_offset = self.log_scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_log_down(&mut self, lines: usize) {
        let last = self.state.log.len().saturating_sub(1);
        self.log_scroll_offset = (self.log_scroll_offset + lines).min(last);
        self.log_auto_scroll = self.log_scroll_offset >= last;
    }

    pub fn page_up(&mut self) {
        self.scroll_log_up(PAGE);
    }

    pub fn page_down(&mut self) {
        self.scroll_log_down(PAGE);
    }

    pub fn scroll_log_top(&mut self) {
        self.log_auto_scroll = false;
        self.log_scroll_offset = 0;
    }

    pub fn scroll_log_bottom(&mut self) {
        self.log_auto_scroll = true;
        self.log_scroll_offset = self.state.log.len().saturating_sub(1);
    }
}

/// Move a list highlight by `delta`, wrapping at both ends
fn step(list: &mut ListState, len: usize, delta: isize) {
    if len == 0 {
        list.select(None);
        return;
    }
    let current = list.selected().unwrap_or(0) as isize;
    let next = (current + delta).rem_euclid(len as isize) as usize;
    list.select(Some(next));
}
