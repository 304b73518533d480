use std::time::Instant;

use crate::api::parser::BoardDetails;
use crate::cascade::{ApplyOutcome, AuxValue, Chain, FetchTicket, Item, ItemKey};
use crate::input::{InputContext, OverlayMode, ViewId};

// UI constants
pub const ERROR_TTL_SECS: u64 = 10;
pub const NOTICE_TTL_SECS: u64 = 5;
pub const SPINNER_FRAME_COUNT: usize = 10;
pub const NARROW_WIDTH_THRESHOLD: u16 = 100;

// Aux attribute names used across fetch, state and rendering.
pub const AUX_DESCR: &str = "descr";
pub const AUX_URL: &str = "url";
pub const AUX_ADMINS: &str = "adm_rights";
pub const AUX_INVITES: &str = "inv_rights";
pub const AUX_LISTS: &str = "list_names";
pub const AUX_OFFICIAL: &str = "official";

pub const REPORT_LEVELS: [&str; 4] = ["app", "version", "test", "result"];

/// Identifies one of the four selection chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainId {
    Reports,
    Backedup,
    OpenBoards,
    ClosedBoards,
}

/// Board panes in left-to-right screen order.
pub const BOARD_PANES: [ChainId; 3] = [ChainId::Backedup, ChainId::OpenBoards, ChainId::ClosedBoards];

/// A server-side state change, carried from the key handler through the
/// confirm/prompt overlays to the dispatcher and back in the completion
/// event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    AddTestResult {
        app: String,
        version: String,
        test: String,
        reporter: String,
        status: String,
    },
    RemoveTestResult {
        id: u64,
    },
    BackupBoard {
        id: String,
    },
    CopyBoard {
        src_id: String,
        dst_name: String,
    },
    RenameBoard {
        id: String,
        new_name: String,
    },
    CloseBoard {
        id: String,
    },
    ReopenBoard {
        id: String,
    },
    AddOrgMembers {
        id: String,
    },
}

impl Mutation {
    pub fn describe(&self) -> String {
        match self {
            Mutation::AddTestResult { test, .. } => format!("add result for {}", test),
            Mutation::RemoveTestResult { id } => format!("remove test result {}", id),
            Mutation::BackupBoard { .. } => "back up board".to_string(),
            Mutation::CopyBoard { dst_name, .. } => format!("copy board to {}", dst_name),
            Mutation::RenameBoard { new_name, .. } => format!("rename board to {}", new_name),
            Mutation::CloseBoard { .. } => "close board".to_string(),
            Mutation::ReopenBoard { .. } => "reopen board".to_string(),
            Mutation::AddOrgMembers { .. } => "add org members to board".to_string(),
        }
    }
}

pub struct ConfirmOverlay {
    pub message: String,
    pub mutation: Mutation,
}

/// What a prompt submission turns into. Multi-step inputs carry the
/// values collected so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    AddResultReporter {
        app: String,
        version: String,
        test: String,
    },
    AddResultStatus {
        app: String,
        version: String,
        test: String,
        reporter: String,
    },
    CopyBoardName {
        src_id: String,
    },
    RenameBoardName {
        id: String,
    },
    BoardFilter {
        pane: usize,
    },
}

pub struct PromptOverlay {
    pub label: &'static str,
    pub buffer: String,
    pub kind: PromptKind,
}

pub enum ActiveOverlay {
    None,
    Confirm(ConfirmOverlay),
    Prompt(PromptOverlay),
}

/// Result of submitting the prompt overlay.
#[derive(Debug, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Nothing to dispatch: advanced to the next stage, rejected with an
    /// error, or there was no prompt.
    Idle,
    Mutation(Mutation),
    /// A pane's name filter changed; that board chain needs a refresh.
    FilterChanged(ChainId),
}

pub struct AppState {
    pub server: String,
    pub view: ViewId,

    // Selection chains
    pub reports: Chain,
    pub backedup: Chain,
    pub open_boards: Chain,
    pub closed_boards: Chain,

    // Focused table per view
    pub reports_focus: usize,
    pub boards_focus: usize,

    /// Per-pane name filters, indexed like `BOARD_PANES`.
    pub board_filters: [String; 3],

    // Transient UI
    pub loading_count: u16,
    pub mutation_in_flight: bool,
    pub error: Option<(String, Instant)>,
    pub notice: Option<(String, Instant)>,
    pub spinner_frame: usize,
    pub should_quit: bool,
    pub overlay: ActiveOverlay,
}

impl AppState {
    pub fn new(server: String) -> Self {
        Self {
            server,
            view: ViewId::Reports,
            reports: Chain::new(&REPORT_LEVELS),
            backedup: Chain::new(&["backedup_board"]),
            open_boards: Chain::new(&["open_board"]),
            closed_boards: Chain::new(&["closed_board"]),
            reports_focus: 0,
            boards_focus: 0,
            board_filters: Default::default(),
            loading_count: 0,
            mutation_in_flight: false,
            error: None,
            notice: None,
            spinner_frame: 0,
            should_quit: false,
            overlay: ActiveOverlay::None,
        }
    }

    pub fn chain(&self, id: ChainId) -> &Chain {
        match id {
            ChainId::Reports => &self.reports,
            ChainId::Backedup => &self.backedup,
            ChainId::OpenBoards => &self.open_boards,
            ChainId::ClosedBoards => &self.closed_boards,
        }
    }

    /// The name filter sent with fetches for a board chain. Each pane
    /// filters independently; the report chain has none.
    pub fn filter_for(&self, id: ChainId) -> &str {
        match id {
            ChainId::Backedup => &self.board_filters[0],
            ChainId::OpenBoards => &self.board_filters[1],
            ChainId::ClosedBoards => &self.board_filters[2],
            ChainId::Reports => "",
        }
    }

    pub fn set_filter(&mut self, id: ChainId, value: String) {
        match id {
            ChainId::Backedup => self.board_filters[0] = value,
            ChainId::OpenBoards => self.board_filters[1] = value,
            ChainId::ClosedBoards => self.board_filters[2] = value,
            ChainId::Reports => {}
        }
    }

    pub fn chain_mut(&mut self, id: ChainId) -> &mut Chain {
        match id {
            ChainId::Reports => &mut self.reports,
            ChainId::Backedup => &mut self.backedup,
            ChainId::OpenBoards => &mut self.open_boards,
            ChainId::ClosedBoards => &mut self.closed_boards,
        }
    }

    /// The chain and level the cursor keys act on.
    pub fn focused(&self) -> (ChainId, usize) {
        match self.view {
            ViewId::Reports => (ChainId::Reports, self.reports_focus),
            ViewId::Boards => (BOARD_PANES[self.boards_focus], 0),
        }
    }

    pub fn focus_next(&mut self) {
        match self.view {
            ViewId::Reports => {
                self.reports_focus = (self.reports_focus + 1) % self.reports.len();
            }
            ViewId::Boards => {
                self.boards_focus = (self.boards_focus + 1) % BOARD_PANES.len();
            }
        }
    }

    pub fn focus_prev(&mut self) {
        match self.view {
            ViewId::Reports => {
                self.reports_focus = self
                    .reports_focus
                    .checked_sub(1)
                    .unwrap_or(self.reports.len() - 1);
            }
            ViewId::Boards => {
                self.boards_focus = self
                    .boards_focus
                    .checked_sub(1)
                    .unwrap_or(BOARD_PANES.len() - 1);
            }
        }
    }

    pub fn switch_view(&mut self) {
        self.view = match self.view {
            ViewId::Reports => ViewId::Boards,
            ViewId::Boards => ViewId::Reports,
        };
    }

    // --- busy indicator ---

    /// Counted, not boolean: overlapping fetches each hold one unit and
    /// release it exactly once when their completion event is handled.
    pub fn fetch_started(&mut self) {
        self.loading_count = self.loading_count.saturating_add(1);
    }

    pub fn fetch_finished(&mut self) {
        self.loading_count = self.loading_count.saturating_sub(1);
    }

    pub fn is_busy(&self) -> bool {
        self.loading_count > 0
    }

    // --- transient messages ---

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAME_COUNT;
    }

    pub fn set_error(&mut self, msg: String) {
        self.error = Some((msg, Instant::now()));
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn prune_error(&mut self) {
        if let Some((_, ts)) = &self.error {
            if ts.elapsed().as_secs() >= ERROR_TTL_SECS {
                self.error = None;
            }
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|(msg, _)| msg.as_str())
    }

    pub fn set_notice(&mut self, msg: String) {
        self.notice = Some((msg, Instant::now()));
    }

    pub fn prune_notice(&mut self) {
        if let Some((_, ts)) = &self.notice {
            if ts.elapsed().as_secs() >= NOTICE_TTL_SECS {
                self.notice = None;
            }
        }
    }

    pub fn notice_message(&self) -> Option<&str> {
        self.notice.as_ref().map(|(msg, _)| msg.as_str())
    }

    pub fn overlay_mode(&self) -> OverlayMode {
        match self.overlay {
            ActiveOverlay::None => OverlayMode::None,
            ActiveOverlay::Confirm(_) => OverlayMode::Confirm,
            ActiveOverlay::Prompt(_) => OverlayMode::Prompt,
        }
    }

    pub fn input_context(&self) -> InputContext {
        InputContext {
            view: self.view,
            has_error: self.error.is_some(),
            is_busy: self.is_busy(),
            mutation_in_flight: self.mutation_in_flight,
            overlay: self.overlay_mode(),
        }
    }

    // --- selection ---

    /// Moves the selection in the focused table by `delta` rows, which
    /// is a real selection change: descendants are cleared and the
    /// returned ticket (if any) must be dispatched.
    pub fn move_selection(&mut self, delta: isize) -> Option<(ChainId, FetchTicket)> {
        let (chain_id, level_idx) = self.focused();
        let chain = self.chain_mut(chain_id);
        let level = chain.level(level_idx);
        if level.items.is_empty() {
            return None;
        }
        let cur = level.current_index().unwrap_or(0);
        let target = cur.saturating_add_signed(delta).min(level.items.len() - 1);
        let key = level.items[target].key.clone();
        match chain.select(level_idx, &key) {
            crate::cascade::SelectOutcome::Selected { child: Some(child) } => {
                Some((chain_id, child))
            }
            _ => None,
        }
    }

    pub fn apply_fetch(
        &mut self,
        chain_id: ChainId,
        ticket: &FetchTicket,
        items: Vec<Item>,
    ) -> ApplyOutcome {
        self.chain_mut(chain_id).apply_items(ticket, items)
    }

    // --- board details ---

    /// Installs a detail payload onto its open-board row. Discarded when
    /// the list has been refreshed since the fetch was spawned or the
    /// row is gone.
    pub fn apply_board_details(&mut self, generation: u64, details: &BoardDetails) -> bool {
        let level = self.open_boards.level(0);
        if level.generation() != generation {
            return false;
        }
        let key = ItemKey::Text(details.id.clone());
        let Some(item) = self.open_boards.level_mut(0).item_mut(&key) else {
            return false;
        };
        item.aux
            .insert(AUX_URL.to_string(), AuxValue::Text(details.url.clone()));
        item.aux.insert(
            AUX_ADMINS.to_string(),
            AuxValue::List(details.adm_rights.clone()),
        );
        item.aux.insert(
            AUX_INVITES.to_string(),
            AuxValue::Text(details.inv_rights.clone()),
        );
        item.aux.insert(
            AUX_LISTS.to_string(),
            AuxValue::List(details.list_names.clone()),
        );
        item.aux
            .insert(AUX_OFFICIAL.to_string(), AuxValue::Flag(details.is_official()));
        true
    }

    fn current_board_id(&self, chain_id: ChainId) -> Option<String> {
        match self.chain(chain_id).level(0).current.as_ref()? {
            ItemKey::Text(id) => Some(id.clone()),
            ItemKey::Id(n) => Some(n.to_string()),
        }
    }

    /// The current open board's id, provided its details have arrived
    /// and mark it official. Everything except reopen requires this.
    fn official_open_board_id(&mut self) -> Option<String> {
        let Some(item) = self.open_boards.level(0).current_item() else {
            self.set_error("no open board selected".to_string());
            return None;
        };
        if !item.aux.contains_key(AUX_OFFICIAL) {
            self.set_error("board details not loaded yet".to_string());
            return None;
        }
        if !item.aux_flag(AUX_OFFICIAL) {
            self.set_error("board is not under sole admin control, refusing".to_string());
            return None;
        }
        self.current_board_id(ChainId::OpenBoards)
    }

    // --- mutation requests ---
    //
    // Each request either returns the mutation to dispatch, installs an
    // overlay that will produce it later, or rejects with an error.

    pub fn request_add_result(&mut self) -> Option<Mutation> {
        let keys: Option<Vec<String>> = (0..3)
            .map(|i| self.reports.level(i).current.as_ref().map(|k| k.as_param()))
            .collect();
        let Some(keys) = keys else {
            self.set_error("select an app, version and test first".to_string());
            return None;
        };
        let [app, version, test] = <[String; 3]>::try_from(keys).ok()?;
        self.overlay = ActiveOverlay::Prompt(PromptOverlay {
            label: "reporter",
            buffer: String::new(),
            kind: PromptKind::AddResultReporter { app, version, test },
        });
        None
    }

    pub fn request_remove_result(&mut self) -> Option<Mutation> {
        let Some(ItemKey::Id(id)) = self.reports.level(3).current.clone() else {
            self.set_error("no test result selected".to_string());
            return None;
        };
        self.overlay = ActiveOverlay::Confirm(ConfirmOverlay {
            message: format!("Remove test result {}?", id),
            mutation: Mutation::RemoveTestResult { id },
        });
        None
    }

    pub fn request_backup_board(&mut self) -> Option<Mutation> {
        let id = self.official_open_board_id()?;
        Some(Mutation::BackupBoard { id })
    }

    pub fn request_copy_board(&mut self) -> Option<Mutation> {
        let src_id = self.official_open_board_id()?;
        self.overlay = ActiveOverlay::Prompt(PromptOverlay {
            label: "new board name",
            buffer: String::new(),
            kind: PromptKind::CopyBoardName { src_id },
        });
        None
    }

    pub fn request_rename_board(&mut self) -> Option<Mutation> {
        let id = self.official_open_board_id()?;
        self.overlay = ActiveOverlay::Prompt(PromptOverlay {
            label: "new board name",
            buffer: String::new(),
            kind: PromptKind::RenameBoardName { id },
        });
        None
    }

    pub fn request_close_board(&mut self) -> Option<Mutation> {
        let id = self.official_open_board_id()?;
        let name = self
            .open_boards
            .level(0)
            .current_item()
            .and_then(|it| it.cells.first().cloned())
            .unwrap_or_else(|| id.clone());
        self.overlay = ActiveOverlay::Confirm(ConfirmOverlay {
            message: format!("Close board {}?", name),
            mutation: Mutation::CloseBoard { id },
        });
        None
    }

    pub fn request_reopen_board(&mut self) -> Option<Mutation> {
        let Some(id) = self.current_board_id(ChainId::ClosedBoards) else {
            self.set_error("no closed board selected".to_string());
            return None;
        };
        Some(Mutation::ReopenBoard { id })
    }

    pub fn request_add_members(&mut self) -> Option<Mutation> {
        let id = self.official_open_board_id()?;
        Some(Mutation::AddOrgMembers { id })
    }

    /// Edits the focused pane's name filter.
    pub fn request_edit_filter(&mut self) {
        let pane = self.boards_focus;
        self.overlay = ActiveOverlay::Prompt(PromptOverlay {
            label: "board name filter",
            buffer: self.board_filters[pane].clone(),
            kind: PromptKind::BoardFilter { pane },
        });
    }

    // --- overlay handling ---

    /// Accepts the pending confirm overlay, yielding its mutation.
    pub fn confirm_yes(&mut self) -> Option<Mutation> {
        match std::mem::replace(&mut self.overlay, ActiveOverlay::None) {
            ActiveOverlay::Confirm(c) => Some(c.mutation),
            other => {
                self.overlay = other;
                None
            }
        }
    }

    /// Declining is a full no-op apart from closing the overlay.
    pub fn confirm_no(&mut self) {
        if matches!(self.overlay, ActiveOverlay::Confirm(_)) {
            self.overlay = ActiveOverlay::None;
        }
    }

    pub fn prompt_char(&mut self, c: char) {
        if let ActiveOverlay::Prompt(p) = &mut self.overlay {
            p.buffer.push(c);
        }
    }

    pub fn prompt_backspace(&mut self) {
        if let ActiveOverlay::Prompt(p) = &mut self.overlay {
            p.buffer.pop();
        }
    }

    pub fn prompt_cancel(&mut self) {
        if matches!(self.overlay, ActiveOverlay::Prompt(_)) {
            self.overlay = ActiveOverlay::None;
        }
    }

    /// Required values (reporter, board names) are rejected here when
    /// empty, before anything reaches the network.
    pub fn submit_prompt(&mut self) -> PromptOutcome {
        let ActiveOverlay::Prompt(p) = std::mem::replace(&mut self.overlay, ActiveOverlay::None)
        else {
            return PromptOutcome::Idle;
        };
        let value = p.buffer.trim().to_string();
        match p.kind {
            PromptKind::AddResultReporter { app, version, test } => {
                if value.is_empty() {
                    self.set_error("reporter must not be empty".to_string());
                    return PromptOutcome::Idle;
                }
                self.overlay = ActiveOverlay::Prompt(PromptOverlay {
                    label: "status",
                    buffer: String::new(),
                    kind: PromptKind::AddResultStatus {
                        app,
                        version,
                        test,
                        reporter: value,
                    },
                });
                PromptOutcome::Idle
            }
            PromptKind::AddResultStatus {
                app,
                version,
                test,
                reporter,
            } => PromptOutcome::Mutation(Mutation::AddTestResult {
                app,
                version,
                test,
                reporter,
                status: value,
            }),
            PromptKind::CopyBoardName { src_id } => {
                if value.is_empty() {
                    self.set_error("board name must not be empty".to_string());
                    return PromptOutcome::Idle;
                }
                PromptOutcome::Mutation(Mutation::CopyBoard {
                    src_id,
                    dst_name: value,
                })
            }
            PromptKind::RenameBoardName { id } => {
                if value.is_empty() {
                    self.set_error("board name must not be empty".to_string());
                    return PromptOutcome::Idle;
                }
                PromptOutcome::Mutation(Mutation::RenameBoard {
                    id,
                    new_name: value,
                })
            }
            PromptKind::BoardFilter { pane } => {
                if value == self.board_filters[pane] {
                    return PromptOutcome::Idle;
                }
                self.board_filters[pane] = value;
                PromptOutcome::FilterChanged(BOARD_PANES[pane])
            }
        }
    }

    // --- post-mutation refreshes ---

    /// Chains to refetch after a successful mutation; property of the
    /// operation, not of what is on screen.
    pub fn refresh_after(&mut self, mutation: &Mutation) -> Vec<(ChainId, FetchTicket)> {
        let targets: &[(ChainId, usize)] = match mutation {
            Mutation::AddTestResult { .. } | Mutation::RemoveTestResult { .. } => {
                &[(ChainId::Reports, 3)]
            }
            Mutation::BackupBoard { .. } => &[(ChainId::Backedup, 0)],
            Mutation::CopyBoard { .. } | Mutation::RenameBoard { .. } => {
                &[(ChainId::OpenBoards, 0)]
            }
            // close/reopen move a board between the two live collections
            Mutation::CloseBoard { .. } | Mutation::ReopenBoard { .. } => {
                &[(ChainId::OpenBoards, 0), (ChainId::ClosedBoards, 0)]
            }
            Mutation::AddOrgMembers { .. } => &[],
        };
        targets
            .iter()
            .filter_map(|&(chain_id, level)| {
                self.chain_mut(chain_id)
                    .begin_refresh(level)
                    .map(|t| (chain_id, t))
            })
            .collect()
    }

    pub fn refresh_all_boards(&mut self) -> Vec<(ChainId, FetchTicket)> {
        BOARD_PANES
            .iter()
            .filter_map(|&id| self.chain_mut(id).begin_refresh(0).map(|t| (id, t)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::ApplyOutcome;

    fn named(keys: &[&str]) -> Vec<Item> {
        keys.iter()
            .map(|k| Item::new(ItemKey::text(*k), vec![(*k).to_string()]))
            .collect()
    }

    fn state() -> AppState {
        AppState::new("http://localhost".to_string())
    }

    /// State with the report chain loaded three levels deep.
    fn loaded_reports() -> AppState {
        let mut s = state();
        let t0 = s.reports.begin_refresh(0).unwrap();
        let ApplyOutcome::Selected { child: Some(t1), .. } =
            s.apply_fetch(ChainId::Reports, &t0, named(&["A1", "A2"]))
        else {
            panic!("expected child ticket");
        };
        let ApplyOutcome::Selected { child: Some(t2), .. } =
            s.apply_fetch(ChainId::Reports, &t1, named(&["1.0", "2.0"]))
        else {
            panic!("expected child ticket");
        };
        let ApplyOutcome::Selected { child: Some(t3), .. } =
            s.apply_fetch(ChainId::Reports, &t2, named(&["smoke", "load"]))
        else {
            panic!("expected child ticket");
        };
        let results = vec![
            Item::new(ItemKey::id(101), vec!["ts1".into(), "alice".into(), "ip".into(), "pass".into()]),
            Item::new(ItemKey::id(102), vec!["ts1".into(), "bob".into(), "ip".into(), "fail".into()]),
        ];
        s.apply_fetch(ChainId::Reports, &t3, results);
        s
    }

    fn details(id: &str, official: bool) -> BoardDetails {
        BoardDetails {
            id: id.to_string(),
            url: format!("https://trello.example/b/{}", id),
            adm_rights: if official {
                vec!["metorg_adm".to_string()]
            } else {
                vec!["metorg_adm".to_string(), "mallory".to_string()]
            },
            inv_rights: "admins".to_string(),
            list_names: vec!["todo".to_string()],
        }
    }

    /// State with one official open board, details applied.
    fn loaded_boards(official: bool) -> AppState {
        let mut s = state();
        s.view = ViewId::Boards;
        let t = s.open_boards.begin_refresh(0).unwrap();
        s.apply_fetch(ChainId::OpenBoards, &t, named(&["b1"]));
        let generation = s.open_boards.level(0).generation();
        assert!(s.apply_board_details(generation, &details("b1", official)));
        let t = s.closed_boards.begin_refresh(0).unwrap();
        s.apply_fetch(ChainId::ClosedBoards, &t, named(&["c1"]));
        s
    }

    // --- busy counter ---

    #[test]
    fn busy_counter_acquire_release() {
        let mut s = state();
        assert!(!s.is_busy());
        s.fetch_started();
        s.fetch_started();
        assert!(s.is_busy());
        s.fetch_finished();
        assert!(s.is_busy());
        s.fetch_finished();
        assert!(!s.is_busy());
    }

    #[test]
    fn busy_counter_never_underflows() {
        let mut s = state();
        s.fetch_finished();
        assert_eq!(s.loading_count, 0);
    }

    // --- focus and views ---

    #[test]
    fn focus_wraps_in_reports_view() {
        let mut s = state();
        for _ in 0..4 {
            s.focus_next();
        }
        assert_eq!(s.reports_focus, 0);
        s.focus_prev();
        assert_eq!(s.reports_focus, 3);
    }

    #[test]
    fn focus_wraps_in_boards_view() {
        let mut s = state();
        s.view = ViewId::Boards;
        s.focus_prev();
        assert_eq!(s.boards_focus, 2);
        s.focus_next();
        assert_eq!(s.boards_focus, 0);
    }

    #[test]
    fn switch_view_toggles() {
        let mut s = state();
        s.switch_view();
        assert_eq!(s.view, ViewId::Boards);
        s.switch_view();
        assert_eq!(s.view, ViewId::Reports);
    }

    // --- selection movement ---

    #[test]
    fn move_selection_down_cascades() {
        let mut s = loaded_reports();
        let (chain_id, ticket) = s.move_selection(1).unwrap();
        assert_eq!(chain_id, ChainId::Reports);
        assert_eq!(ticket.level, 1);
        assert_eq!(s.reports.level(0).current, Some(ItemKey::text("A2")));
        // descendants cleared until the new fetch lands
        assert!(s.reports.level(1).items.is_empty());
        assert!(s.reports.level(3).items.is_empty());
    }

    #[test]
    fn move_selection_clamps_at_edges() {
        let mut s = loaded_reports();
        // already at the first app, moving up is a no-op
        assert!(s.move_selection(-1).is_none());
        assert_eq!(s.reports.level(0).current, Some(ItemKey::text("A1")));
    }

    #[test]
    fn move_selection_on_empty_level_is_noop() {
        let mut s = state();
        assert!(s.move_selection(1).is_none());
    }

    #[test]
    fn move_selection_on_leaf_returns_no_ticket() {
        let mut s = loaded_reports();
        s.reports_focus = 3;
        assert!(s.move_selection(1).is_none());
        assert_eq!(s.reports.level(3).current, Some(ItemKey::id(102)));
    }

    #[test]
    fn in_flight_results_dropped_after_app_move() {
        let mut s = loaded_reports();
        let ticket = s.reports.begin_refresh(3).unwrap();

        // user moves at the app level before the results fetch lands
        s.move_selection(1).unwrap();
        let late = vec![Item::new(ItemKey::id(7), vec!["ts".into()])];
        assert_eq!(
            s.apply_fetch(ChainId::Reports, &ticket, late),
            ApplyOutcome::Stale
        );
        assert!(s.reports.level(3).items.is_empty());
    }

    // --- board details ---

    #[test]
    fn board_details_applied_to_row() {
        let s = loaded_boards(true);
        let item = s.open_boards.level(0).current_item().unwrap();
        assert!(item.aux_flag(AUX_OFFICIAL));
        assert_eq!(item.aux_list(AUX_LISTS).unwrap(), ["todo"]);
        assert!(item.aux_text(AUX_URL).unwrap().contains("b1"));
    }

    #[test]
    fn stale_board_details_discarded() {
        let mut s = loaded_boards(true);
        let old_generation = s.open_boards.level(0).generation();
        let t = s.open_boards.begin_refresh(0).unwrap();
        s.apply_fetch(ChainId::OpenBoards, &t, named(&["b1"]));
        assert!(!s.apply_board_details(old_generation, &details("b1", true)));
        let item = s.open_boards.level(0).current_item().unwrap();
        assert!(!item.aux.contains_key(AUX_OFFICIAL));
    }

    #[test]
    fn details_for_vanished_row_discarded() {
        let mut s = loaded_boards(true);
        let generation = s.open_boards.level(0).generation();
        assert!(!s.apply_board_details(generation, &details("ghost", true)));
    }

    // --- mutation requests ---

    #[test]
    fn backup_requires_official_board() {
        let mut s = loaded_boards(false);
        assert_eq!(s.request_backup_board(), None);
        assert!(s.error_message().unwrap().contains("not under sole admin"));

        let mut s = loaded_boards(true);
        assert_eq!(
            s.request_backup_board(),
            Some(Mutation::BackupBoard { id: "b1".to_string() })
        );
    }

    #[test]
    fn backup_without_details_is_rejected() {
        let mut s = state();
        let t = s.open_boards.begin_refresh(0).unwrap();
        s.apply_fetch(ChainId::OpenBoards, &t, named(&["b1"]));
        assert_eq!(s.request_backup_board(), None);
        assert!(s.error_message().unwrap().contains("details not loaded"));
    }

    #[test]
    fn reopen_skips_official_check() {
        let mut s = loaded_boards(false);
        assert_eq!(
            s.request_reopen_board(),
            Some(Mutation::ReopenBoard { id: "c1".to_string() })
        );
    }

    #[test]
    fn remove_result_goes_through_confirm() {
        let mut s = loaded_reports();
        assert_eq!(s.request_remove_result(), None);
        let ActiveOverlay::Confirm(c) = &s.overlay else {
            panic!("expected confirm overlay");
        };
        assert_eq!(c.mutation, Mutation::RemoveTestResult { id: 101 });

        // declining changes nothing
        s.confirm_no();
        assert!(matches!(s.overlay, ActiveOverlay::None));
        assert_eq!(s.reports.level(3).items.len(), 2);
        assert!(!s.mutation_in_flight);
    }

    #[test]
    fn confirm_yes_yields_the_mutation() {
        let mut s = loaded_boards(true);
        s.request_close_board();
        let m = s.confirm_yes().unwrap();
        assert_eq!(m, Mutation::CloseBoard { id: "b1".to_string() });
        assert!(matches!(s.overlay, ActiveOverlay::None));
    }

    #[test]
    fn confirm_yes_without_overlay_is_noop() {
        let mut s = state();
        assert!(s.confirm_yes().is_none());
    }

    // --- prompts ---

    #[test]
    fn add_result_two_step_prompt() {
        let mut s = loaded_reports();
        assert_eq!(s.request_add_result(), None);
        for c in "alice".chars() {
            s.prompt_char(c);
        }
        assert_eq!(s.submit_prompt(), PromptOutcome::Idle);
        // second stage asks for the status
        let ActiveOverlay::Prompt(p) = &s.overlay else {
            panic!("expected status prompt");
        };
        assert_eq!(p.label, "status");
        for c in "pass".chars() {
            s.prompt_char(c);
        }
        let outcome = s.submit_prompt();
        assert_eq!(
            outcome,
            PromptOutcome::Mutation(Mutation::AddTestResult {
                app: "A1".to_string(),
                version: "1.0".to_string(),
                test: "smoke".to_string(),
                reporter: "alice".to_string(),
                status: "pass".to_string(),
            })
        );
    }

    #[test]
    fn empty_reporter_rejected_before_dispatch() {
        let mut s = loaded_reports();
        s.request_add_result();
        s.prompt_char(' ');
        assert_eq!(s.submit_prompt(), PromptOutcome::Idle);
        assert!(matches!(s.overlay, ActiveOverlay::None));
        assert!(s.error_message().unwrap().contains("reporter"));
    }

    #[test]
    fn add_result_needs_full_selection() {
        let mut s = state();
        assert_eq!(s.request_add_result(), None);
        assert!(s.error_message().is_some());
        assert!(matches!(s.overlay, ActiveOverlay::None));
    }

    #[test]
    fn empty_copy_name_rejected() {
        let mut s = loaded_boards(true);
        s.request_copy_board();
        assert_eq!(s.submit_prompt(), PromptOutcome::Idle);
        assert!(s.error_message().unwrap().contains("board name"));
    }

    #[test]
    fn rename_prompt_produces_mutation() {
        let mut s = loaded_boards(true);
        s.request_rename_board();
        for c in "sprint 9".chars() {
            s.prompt_char(c);
        }
        assert_eq!(
            s.submit_prompt(),
            PromptOutcome::Mutation(Mutation::RenameBoard {
                id: "b1".to_string(),
                new_name: "sprint 9".to_string(),
            })
        );
    }

    #[test]
    fn prompt_editing_and_cancel() {
        let mut s = loaded_boards(true);
        s.request_edit_filter();
        s.prompt_char('a');
        s.prompt_char('b');
        s.prompt_backspace();
        let ActiveOverlay::Prompt(p) = &s.overlay else {
            panic!("expected prompt");
        };
        assert_eq!(p.buffer, "a");
        s.prompt_cancel();
        assert!(matches!(s.overlay, ActiveOverlay::None));
        assert_eq!(s.filter_for(ChainId::Backedup), "");
    }

    #[test]
    fn filter_change_targets_focused_pane() {
        let mut s = loaded_boards(true);
        s.boards_focus = 1;
        s.request_edit_filter();
        s.prompt_char('x');
        assert_eq!(
            s.submit_prompt(),
            PromptOutcome::FilterChanged(ChainId::OpenBoards)
        );
        assert_eq!(s.filter_for(ChainId::OpenBoards), "x");
        // the other panes keep their own filters
        assert_eq!(s.filter_for(ChainId::Backedup), "");
        assert_eq!(s.filter_for(ChainId::ClosedBoards), "");
    }

    #[test]
    fn filters_are_independent_per_pane() {
        let mut s = loaded_boards(true);
        s.set_filter(ChainId::Backedup, "old".to_string());
        s.set_filter(ChainId::ClosedBoards, "done".to_string());
        assert_eq!(s.filter_for(ChainId::Backedup), "old");
        assert_eq!(s.filter_for(ChainId::OpenBoards), "");
        assert_eq!(s.filter_for(ChainId::ClosedBoards), "done");
        assert_eq!(s.filter_for(ChainId::Reports), "");
    }

    #[test]
    fn edit_filter_prefills_the_pane_value() {
        let mut s = loaded_boards(true);
        s.set_filter(ChainId::Backedup, "sprint".to_string());
        s.boards_focus = 0;
        s.request_edit_filter();
        let ActiveOverlay::Prompt(p) = &s.overlay else {
            panic!("expected prompt");
        };
        assert_eq!(p.buffer, "sprint");
    }

    #[test]
    fn unchanged_filter_is_idle() {
        let mut s = loaded_boards(true);
        s.request_edit_filter();
        assert_eq!(s.submit_prompt(), PromptOutcome::Idle);
    }

    // --- post-mutation refreshes ---

    #[test]
    fn close_refreshes_open_and_closed() {
        let mut s = loaded_boards(true);
        let refreshes = s.refresh_after(&Mutation::CloseBoard { id: "b1".to_string() });
        let chains: Vec<ChainId> = refreshes.iter().map(|(c, _)| *c).collect();
        assert_eq!(chains, vec![ChainId::OpenBoards, ChainId::ClosedBoards]);
        // both tables cleared until the refetch lands
        assert!(s.open_boards.level(0).items.is_empty());
        assert!(s.open_boards.level(0).current.is_none());
        assert!(s.closed_boards.level(0).items.is_empty());
    }

    #[test]
    fn remove_result_refreshes_result_level_only() {
        let mut s = loaded_reports();
        let refreshes = s.refresh_after(&Mutation::RemoveTestResult { id: 101 });
        assert_eq!(refreshes.len(), 1);
        assert_eq!(refreshes[0].0, ChainId::Reports);
        assert_eq!(refreshes[0].1.level, 3);
        // ancestors untouched
        assert_eq!(s.reports.level(0).items.len(), 2);
        assert_eq!(s.reports.level(2).current, Some(ItemKey::text("smoke")));
    }

    #[test]
    fn add_members_refreshes_nothing() {
        let mut s = loaded_boards(true);
        assert!(s
            .refresh_after(&Mutation::AddOrgMembers { id: "b1".to_string() })
            .is_empty());
    }

    #[test]
    fn refresh_all_boards_covers_three_panes() {
        let mut s = loaded_boards(true);
        let refreshes = s.refresh_all_boards();
        assert_eq!(refreshes.len(), 3);
    }

    // --- input context ---

    #[test]
    fn input_context_reflects_state() {
        let mut s = loaded_boards(true);
        s.fetch_started();
        s.mutation_in_flight = true;
        s.set_error("boom".to_string());
        s.request_edit_filter();
        let ctx = s.input_context();
        assert_eq!(ctx.view, ViewId::Boards);
        assert!(ctx.is_busy);
        assert!(ctx.mutation_in_flight);
        assert!(ctx.has_error);
        assert_eq!(ctx.overlay, OverlayMode::Prompt);
    }
}
