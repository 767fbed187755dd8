//! App — component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks.
//! - Feed drivers report on a second channel; each envelope carries the ticket
//!   of the session that started the driver.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.

use std::io;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use cybotify_proto::model::PlaylistSummary;

use crate::{
    action::{Action, ComponentId},
    app_state::{AppState, DetailState, Screen, TransportStatus},
    command::{self, Command},
    component::Component,
    components::{
        header::Header, help_overlay::HelpOverlay, log_panel::LogPanel,
        playlist_index::PlaylistIndex, radar_panel::RadarPanel, track_list::TrackList,
    },
    focus::FocusRing,
    session::{SessionOptions, TerminalSession},
    surface::{ChartBuffer, RowBuffer, TitleBuffer},
    transport::{spawn_driver, Driver, DriverChoice, FeedClient, FeedEnvelope, FeedEvent},
    widgets::{
        filter_input::{FilterAction, FilterInput},
        status_bar::{self, InputMode},
        toast::{Severity, ToastManager},
    },
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    IndexLoaded(Result<Vec<PlaylistSummary>, String>),
    Log(String),
}

const MAX_LOG_LINES: usize = 500;

/// Screen areas from the last draw, for mouse hit-testing.
#[derive(Debug, Clone, Copy, Default)]
struct PaneAreas {
    playlist_index: Rect,
    track_list: Rect,
    radar: Rect,
    log_panel: Rect,
}

pub struct App {
    state: AppState,
    client: FeedClient,
    options: SessionOptions,
    driver_choice: DriverChoice,
    initial_playlist: Option<u64>,

    // ── Components ────────────────────────────────────────────────────────
    header: Header,
    playlist_index: PlaylistIndex,
    track_list: TrackList,
    radar_panel: RadarPanel,
    log_panel: LogPanel,
    help_overlay: HelpOverlay,
    command_input: FilterInput,

    // ── UI ────────────────────────────────────────────────────────────────
    focus: FocusRing,
    toast: ToastManager,
    show_logs: bool,
    show_help: bool,
    pane_areas: PaneAreas,

    // ── Background work ───────────────────────────────────────────────────
    app_tx: Option<mpsc::Sender<AppMessage>>,
    feed_tx: Option<mpsc::Sender<FeedEnvelope>>,
    feed_task: Option<JoinHandle<()>>,
    next_ticket: u64,

    should_quit: bool,
}

impl App {
    pub fn new(
        client: FeedClient,
        options: SessionOptions,
        driver_choice: DriverChoice,
        initial_playlist: Option<u64>,
    ) -> Self {
        let state = AppState::new(client.base_url());
        Self {
            state,
            client,
            options,
            driver_choice,
            initial_playlist,
            header: Header::new(),
            playlist_index: PlaylistIndex::new(),
            track_list: TrackList::new(),
            radar_panel: RadarPanel::new(),
            log_panel: LogPanel::new(),
            help_overlay: HelpOverlay::new(),
            command_input: FilterInput::new(':', "sort <key> | filter <text> | clear"),
            focus: FocusRing::new(vec![ComponentId::PlaylistIndex]),
            toast: ToastManager::new(),
            show_logs: false,
            show_help: false,
            pane_areas: PaneAreas::default(),
            app_tx: None,
            feed_tx: None,
            feed_task: None,
            next_ticket: 1,
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self, mut log_rx: broadcast::Receiver<String>) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(1024);
        let (feed_tx, mut feed_rx) = mpsc::channel::<FeedEnvelope>(256);
        self.app_tx = Some(tx.clone());
        self.feed_tx = Some(feed_tx);

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: console log lines → AppMessage ───────────────────
        let log_tx = tx.clone();
        tokio::spawn(async move {
            loop {
                match log_rx.recv().await {
                    Ok(line) => {
                        if log_tx.send(AppMessage::Log(line)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Warning here would loop back into the channel.
                        debug!("console receiver lagged by {} lines", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        self.load_index();
        if let Some(id) = self.initial_playlist.take() {
            self.open_detail(id);
        }

        // Toast expiry check + spinner animation
        let mut toast_tick = tokio::time::interval(Duration::from_millis(100));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    needs_redraw = self.handle_message(msg);
                }
                Some(envelope) = feed_rx.recv() => {
                    needs_redraw = self.on_feed(envelope);
                }
                _ = toast_tick.tick() => {
                    if !self.toast.is_empty() {
                        self.toast.tick();
                        needs_redraw = true;
                    }
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        self.close_detail();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        Ok(())
    }

    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                if key.kind == KeyEventKind::Release {
                    return false;
                }
                for action in self.handle_key(key) {
                    self.dispatch(action);
                }
                true
            }
            AppMessage::Event(Event::Mouse(event)) => {
                let actions = self.handle_mouse(event);
                let redraw = !actions.is_empty() || !matches!(event.kind, MouseEventKind::Moved);
                for action in actions {
                    self.dispatch(action);
                }
                redraw
            }
            AppMessage::Event(Event::Resize(_, _)) => {
                self.dispatch(Action::Resize);
                true
            }
            AppMessage::Event(_) => false,
            AppMessage::IndexLoaded(result) => {
                self.state.index_loading = false;
                match result {
                    Ok(playlists) => {
                        info!("loaded {} playlists", playlists.len());
                        self.state.playlists = playlists;
                        self.state.index_error = None;
                    }
                    Err(e) => {
                        warn!("playlist index failed: {}", e);
                        self.toast.error(format!("playlists: {}", e));
                        self.state.index_error = Some(e);
                    }
                }
                self.playlist_index.sync_playlists(&self.state);
                true
            }
            AppMessage::Log(line) => {
                self.push_log(line);
                self.show_logs
            }
        }
    }

    // ── Feed events ───────────────────────────────────────────────────────────

    fn on_feed(&mut self, envelope: FeedEnvelope) -> bool {
        let Some(detail) = self.state.detail.as_mut() else {
            debug!("feed event {} with no open session", envelope.ticket);
            return false;
        };
        if envelope.ticket != detail.ticket {
            debug!(
                "dropping event from superseded driver {} (current {})",
                envelope.ticket, detail.ticket
            );
            return false;
        }
        let was_complete = detail.session.progress().is_complete();

        match envelope.event {
            FeedEvent::Stage(stage) => {
                detail.session.apply_stage(stage);
                detail.transport = TransportStatus::Receiving;
            }
            FeedEvent::Frame(text) => {
                // Unclassifiable frames are logged by the session and skipped.
                let _ = detail.session.apply_frame(&text);
                detail.transport = TransportStatus::Receiving;
            }
            FeedEvent::Closed => {
                if !detail.session.progress().is_complete() {
                    warn!(
                        "stream for playlist {} closed after {} of 3 stages",
                        detail.session.playlist().id,
                        detail.session.progress().landed()
                    );
                    self.toast.dismiss_spinner();
                    self.toast.warning("stream closed early");
                }
                detail.transport = TransportStatus::Done;
            }
            FeedEvent::Failed(reason) => {
                error!("feed for playlist {} failed: {}", detail.session.playlist().id, reason);
                self.toast.dismiss_spinner();
                self.toast.error(format!("feed: {}", reason));
                detail.transport = TransportStatus::Failed(reason);
            }
        }

        if !was_complete && detail.session.progress().is_complete() {
            if detail.driver == Driver::Fetch {
                detail.transport = TransportStatus::Done;
            }
            let name = detail.session.playlist().display_name().to_string();
            self.toast.resolve_spinner(Severity::Success, format!("loaded {}", name));
        }
        self.sync_track_rows();
        true
    }

    // ── Detail lifecycle ──────────────────────────────────────────────────────

    fn open_detail(&mut self, id: u64) {
        self.close_detail();

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let driver = Driver::choose(self.driver_choice, self.state.summary(id));

        let mut session = TerminalSession::new(
            id,
            ChartBuffer::default(),
            RowBuffer::default(),
            TitleBuffer::default(),
            &self.options,
        );
        if let Some(summary) = self.state.summary(id) {
            session.adopt_summary(summary);
        }
        session.start();
        self.state.detail = Some(DetailState {
            session,
            driver,
            ticket,
            transport: TransportStatus::Waiting,
        });
        self.state.screen = Screen::Detail;
        self.refresh_focus(Some(ComponentId::TrackList));

        if let Some(tx) = &self.feed_tx {
            self.feed_task = Some(spawn_driver(driver, self.client.clone(), id, ticket, tx.clone()));
        }
        let label = self
            .state
            .summary(id)
            .map(|s| s.display_name().to_string())
            .unwrap_or_else(|| format!("playlist {}", id));
        self.toast.spinner(format!("loading {} ({})", label, driver.label()));
    }

    fn close_detail(&mut self) {
        if let Some(task) = self.feed_task.take() {
            task.abort();
        }
        if let Some(mut detail) = self.state.detail.take() {
            detail.session.teardown();
            self.toast.dismiss_spinner();
        }
        self.state.screen = Screen::Index;
        self.state.input_mode = InputMode::Normal;
        self.refresh_focus(Some(ComponentId::PlaylistIndex));
    }

    /// Refresh the track list from the session and re-apply its hover.
    fn sync_track_rows(&mut self) {
        for action in self.track_list.sync_rows(&self.state) {
            self.apply_action(action);
        }
    }

    fn load_index(&mut self) {
        let Some(tx) = self.app_tx.clone() else {
            return;
        };
        self.state.index_loading = true;
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.fetch_index().await.map_err(|e| e.to_string());
            let _ = tx.send(AppMessage::IndexLoaded(result)).await;
        });
    }

    fn focus_items(&self) -> Vec<ComponentId> {
        let mut items = match self.state.screen {
            Screen::Index => vec![ComponentId::PlaylistIndex],
            Screen::Detail => vec![ComponentId::TrackList, ComponentId::RadarPanel],
        };
        if self.show_logs {
            items.push(ComponentId::LogPanel);
        }
        items
    }

    /// Rebuild the focus ring, keeping `prefer` (or the current focus) when
    /// it is still part of the ring.
    fn refresh_focus(&mut self, prefer: Option<ComponentId>) {
        let keep = prefer.or_else(|| self.focus.current());
        self.focus.set_items(self.focus_items());
        if let Some(id) = keep {
            self.focus.set(id);
        }
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        // Global keys — always active regardless of focus/mode
        match key.code {
            KeyCode::Char('q') if key.modifiers == KeyModifiers::NONE => {
                if self.state.input_mode == InputMode::Normal {
                    return vec![Action::Quit];
                }
            }
            KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => {
                return vec![Action::Quit];
            }
            KeyCode::Char('?') if self.state.input_mode == InputMode::Normal => {
                return vec![Action::ToggleHelp];
            }
            KeyCode::Char('L') if self.state.input_mode == InputMode::Normal => {
                return vec![Action::ToggleLogs];
            }
            _ => {}
        }

        // Help overlay captures all keys when visible
        if self.show_help {
            let actions = self.route_key(ComponentId::HelpOverlay, key);
            if !actions.is_empty() {
                return actions;
            }
            return vec![Action::ToggleHelp];
        }

        // Command line captures everything while open
        if self.state.input_mode == InputMode::Command {
            return match self.command_input.handle_key(key) {
                FilterAction::Confirmed(line) => vec![Action::RunCommand(line)],
                FilterAction::Cancelled => vec![Action::CloseCommand],
                FilterAction::Changed(_) | FilterAction::None => vec![],
            };
        }

        match key.code {
            KeyCode::Tab => {
                if self.state.input_mode == InputMode::Filter {
                    return vec![Action::CloseFilter, Action::FocusNext];
                }
                return vec![Action::FocusNext];
            }
            KeyCode::BackTab => {
                if self.state.input_mode == InputMode::Filter {
                    return vec![Action::CloseFilter, Action::FocusPrev];
                }
                return vec![Action::FocusPrev];
            }
            _ => {}
        }

        // Detail-view keys that do not depend on focus
        if self.state.screen == Screen::Detail
            && self.state.input_mode == InputMode::Normal
            && !self.focus.is_focused(ComponentId::TrackList)
        {
            match key.code {
                KeyCode::Esc | KeyCode::Backspace => return vec![Action::CloseDetail],
                KeyCode::Char(':') => return vec![Action::OpenCommand],
                _ => {}
            }
        }

        match self.focus.current() {
            Some(id) => self.route_key(id, key),
            None => vec![],
        }
    }

    fn route_key(&mut self, id: ComponentId, key: KeyEvent) -> Vec<Action> {
        let s = &self.state;
        match id {
            ComponentId::PlaylistIndex => self.playlist_index.handle_key(key, s),
            ComponentId::TrackList => self.track_list.handle_key(key, s),
            ComponentId::RadarPanel => self.radar_panel.handle_key(key, s),
            ComponentId::LogPanel => self.log_panel.handle_key(key, s),
            ComponentId::HelpOverlay => self.help_overlay.handle_key(key, s),
        }
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        if self.show_help {
            return vec![];
        }
        let col = event.column;
        let row = event.row;

        fn hit(r: Rect, col: u16, row: u16) -> bool {
            r.width > 0
                && r.height > 0
                && col >= r.x
                && col < r.x + r.width
                && row >= r.y
                && row < r.y + r.height
        }

        let areas = self.pane_areas;
        let s = &self.state;

        // Pointer motion only matters for track hover.
        if let MouseEventKind::Moved = event.kind {
            if s.screen != Screen::Detail {
                return vec![];
            }
            if hit(areas.track_list, col, row) {
                return self.track_list.handle_mouse(event, areas.track_list, s);
            }
            return self.track_list.leave(s);
        }

        if !matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        ) {
            return vec![];
        }

        macro_rules! click_pane {
            ($id:expr, $component:expr, $area:expr) => {{
                let mut actions = $component.handle_mouse(event, $area, s);
                if !self.focus.is_focused($id) {
                    actions.insert(0, Action::FocusPane($id));
                }
                return actions;
            }};
        }

        if hit(areas.log_panel, col, row) {
            click_pane!(ComponentId::LogPanel, self.log_panel, areas.log_panel);
        }
        match s.screen {
            Screen::Index => {
                if hit(areas.playlist_index, col, row) {
                    click_pane!(ComponentId::PlaylistIndex, self.playlist_index, areas.playlist_index);
                }
            }
            Screen::Detail => {
                if hit(areas.track_list, col, row) {
                    click_pane!(ComponentId::TrackList, self.track_list, areas.track_list);
                }
                if hit(areas.radar, col, row) {
                    click_pane!(ComponentId::RadarPanel, self.radar_panel, areas.radar);
                }
            }
        }
        vec![]
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        // Broadcast action to all components first
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.playlist_index.on_action(&action, s));
            out.extend(self.track_list.on_action(&action, s));
            out.extend(self.radar_panel.on_action(&action, s));
            out.extend(self.log_panel.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out
        };

        self.apply_action(action);

        // Secondary actions are depth-limited to 1 level
        for a in secondary {
            self.apply_action(a);
        }
    }

    fn apply_action(&mut self, action: Action) {
        // Skip logging high-frequency actions
        match &action {
            Action::HoverEnter(_) | Action::HoverLeave(_) | Action::Resize => {}
            _ => debug!("apply_action: {:?}", action),
        }
        match action {
            // ── Navigation ────────────────────────────────────────────────────
            Action::FocusNext => {
                self.focus.next();
            }
            Action::FocusPrev => {
                self.focus.prev();
            }
            Action::FocusPane(id) => self.focus.set(id),
            Action::OpenPlaylist(id) => self.open_detail(id),
            Action::CloseDetail => self.close_detail(),
            Action::ReloadIndex => self.load_index(),

            // ── Filter ────────────────────────────────────────────────────────
            Action::OpenFilter => self.state.input_mode = InputMode::Filter,
            Action::CloseFilter => self.state.input_mode = InputMode::Normal,
            Action::FilterChanged(q) => {
                if let Some(detail) = self.state.detail.as_mut() {
                    detail.session.set_filter(&q);
                }
                self.sync_track_rows();
            }
            Action::ClearFilter => {
                if let Some(detail) = self.state.detail.as_mut() {
                    detail.session.clear_filter();
                }
                self.state.input_mode = InputMode::Normal;
                self.sync_track_rows();
            }

            // ── Sorting ───────────────────────────────────────────────────────
            Action::ToggleSort => {
                if let Some(detail) = self.state.detail.as_mut() {
                    let key = detail.session.view().sort.toggle();
                    detail.session.set_sort_key(key);
                    self.toast.info(format!("sort: {}", key));
                }
                self.sync_track_rows();
            }
            Action::SetSort(raw) => {
                if let Some(detail) = self.state.detail.as_mut() {
                    match detail.session.set_sort(&raw) {
                        Ok(key) => self.toast.info(format!("sort: {}", key)),
                        Err(e) => {
                            warn!("{}", e);
                            self.toast.error(e.to_string());
                        }
                    }
                }
                self.sync_track_rows();
            }

            // ── Hover ─────────────────────────────────────────────────────────
            Action::HoverEnter(handle) => {
                if let Some(detail) = self.state.detail.as_mut() {
                    detail.session.hover_enter(handle);
                }
            }
            Action::HoverLeave(handle) => {
                if let Some(detail) = self.state.detail.as_mut() {
                    detail.session.hover_leave(handle);
                }
            }

            // ── Command line ──────────────────────────────────────────────────
            Action::OpenCommand => {
                if self.state.screen == Screen::Detail {
                    self.command_input.clear();
                    self.command_input.activate();
                    self.state.input_mode = InputMode::Command;
                }
            }
            Action::CloseCommand => {
                self.command_input.deactivate();
                self.state.input_mode = InputMode::Normal;
            }
            Action::RunCommand(line) => {
                self.command_input.deactivate();
                self.state.input_mode = InputMode::Normal;
                match command::parse(&line) {
                    Ok(Command::Sort(raw)) => self.dispatch(Action::SetSort(raw)),
                    Ok(Command::Filter(text)) => self.dispatch(Action::FilterChanged(text)),
                    Ok(Command::Clear) => self.dispatch(Action::ClearFilter),
                    Err(e) => {
                        warn!("command {:?}: {}", line, e);
                        self.toast.error(e.to_string());
                    }
                }
            }

            // ── UI toggles ────────────────────────────────────────────────────
            Action::ToggleLogs => {
                self.show_logs = !self.show_logs;
                self.refresh_focus(None);
            }
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => {
                        let display = if text.chars().count() > 40 {
                            format!("{}…", text.chars().take(40).collect::<String>())
                        } else {
                            text.clone()
                        };
                        self.toast.success(format!("copied: {}", display));
                    }
                    Err(e) => {
                        warn!("clipboard error: {}", e);
                        self.toast.error(format!("clipboard error: {}", e));
                    }
                }
            }

            // ── System ────────────────────────────────────────────────────────
            Action::Quit => self.should_quit = true,
            Action::Resize => {}
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        use crate::theme::C_BG;
        use ratatui::widgets::Block;
        let area = frame.area();

        frame.render_widget(
            Block::default().style(ratatui::style::Style::default().bg(C_BG)),
            area,
        );

        // ── Outer layout: header | body | (log) | statusbar ─────────────────
        let log_h = if self.show_logs { 10u16 } else { 0 };
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(log_h),
                Constraint::Length(1),
            ])
            .split(area);
        let (header_area, body_area, log_area, status_area) = (outer[0], outer[1], outer[2], outer[3]);

        self.header.draw(frame, header_area, false, &self.state);

        // ── Status bar / command line ─────────────────────────────────────────
        if self.state.input_mode == InputMode::Command {
            self.command_input.draw(frame, status_area);
        } else {
            status_bar::draw_keys_bar(frame, status_area, self.state.input_mode, self.state.screen);
        }

        // ── Log panel ─────────────────────────────────────────────────────────
        if self.show_logs {
            let focused = self.focus.is_focused(ComponentId::LogPanel);
            self.log_panel.draw(frame, log_area, focused, &self.state);
            self.pane_areas.log_panel = log_area;
        } else {
            self.pane_areas.log_panel = Rect::default();
        }

        // ── Body ──────────────────────────────────────────────────────────────
        match self.state.screen {
            Screen::Index => {
                let focused = self.focus.is_focused(ComponentId::PlaylistIndex);
                self.playlist_index.draw(frame, body_area, focused, &self.state);
                self.pane_areas.playlist_index = body_area;
                self.pane_areas.track_list = Rect::default();
                self.pane_areas.radar = Rect::default();
            }
            Screen::Detail => {
                let cols = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                    .split(body_area);
                let list_focused = self.focus.is_focused(ComponentId::TrackList);
                let radar_focused = self.focus.is_focused(ComponentId::RadarPanel);
                self.track_list.draw(frame, cols[0], list_focused, &self.state);
                self.radar_panel.draw(frame, cols[1], radar_focused, &self.state);
                self.pane_areas.playlist_index = Rect::default();
                self.pane_areas.track_list = cols[0];
                self.pane_areas.radar = cols[1];
            }
        }

        // ── Help overlay (on top of everything) ──────────────────────────────
        if self.show_help {
            self.help_overlay.draw(frame, area, false, &self.state);
        }

        // ── Toast notifications (topmost layer) ──────────────────────────────
        self.toast.draw(frame, area);
    }

    fn push_log(&mut self, msg: String) {
        self.state.logs.push(msg);
        if self.state.logs.len() > MAX_LOG_LINES {
            self.state.logs.remove(0);
        }
    }
}
