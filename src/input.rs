use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    DismissError,
    MoveUp,
    MoveDown,
    FocusNext,
    FocusPrev,
    SwitchView,
    Refresh,
    // report mutations
    AddResult,
    RemoveResult,
    // board mutations
    BackupBoard,
    CopyBoard,
    RenameBoard,
    CloseBoard,
    ReopenBoard,
    AddMembers,
    EditFilter,
    // confirm overlay
    ConfirmYes,
    ConfirmNo,
    // prompt overlay
    PromptChar(char),
    PromptBackspace,
    PromptSubmit,
    PromptCancel,
    None,
}

/// Which overlay (if any) is currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayMode {
    #[default]
    None,
    Confirm,
    Prompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewId {
    Reports,
    Boards,
}

/// Captures the UI state needed to interpret a key press.
#[derive(Debug, Clone)]
pub struct InputContext {
    pub view: ViewId,
    pub has_error: bool,
    pub is_busy: bool,
    pub mutation_in_flight: bool,
    pub overlay: OverlayMode,
}

impl Default for InputContext {
    fn default() -> Self {
        Self {
            view: ViewId::Reports,
            has_error: false,
            is_busy: false,
            mutation_in_flight: false,
            overlay: OverlayMode::None,
        }
    }
}

pub fn map_key(key: KeyEvent, ctx: &InputContext) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    if ctx.overlay == OverlayMode::Confirm {
        return match key.code {
            KeyCode::Char('y' | 'Y') => Action::ConfirmYes,
            KeyCode::Char('n' | 'N') | KeyCode::Esc => Action::ConfirmNo,
            _ => Action::None,
        };
    }

    if ctx.overlay == OverlayMode::Prompt {
        return match key.code {
            KeyCode::Enter => Action::PromptSubmit,
            KeyCode::Esc => Action::PromptCancel,
            KeyCode::Backspace => Action::PromptBackspace,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                Action::PromptChar(c)
            }
            _ => Action::None,
        };
    }

    // While a mutation is pending every mutation key is dead. Keeps the
    // at-most-one-mutation rule independent of what is on screen.
    let mutations_enabled = !ctx.mutation_in_flight;

    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Esc => {
            if ctx.has_error {
                Action::DismissError
            } else {
                Action::Quit
            }
        }
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::Right | KeyCode::Char('l') => Action::FocusNext,
        KeyCode::Left | KeyCode::Char('h') => Action::FocusPrev,
        KeyCode::Tab => Action::SwitchView,
        KeyCode::Char('r') if !ctx.is_busy => Action::Refresh,
        KeyCode::Char('a') if ctx.view == ViewId::Reports && mutations_enabled => {
            Action::AddResult
        }
        KeyCode::Char('x') if ctx.view == ViewId::Reports && mutations_enabled => {
            Action::RemoveResult
        }
        KeyCode::Char('b') if ctx.view == ViewId::Boards && mutations_enabled => {
            Action::BackupBoard
        }
        KeyCode::Char('c') if ctx.view == ViewId::Boards && mutations_enabled => Action::CopyBoard,
        KeyCode::Char('n') if ctx.view == ViewId::Boards && mutations_enabled => {
            Action::RenameBoard
        }
        KeyCode::Char('x') if ctx.view == ViewId::Boards && mutations_enabled => Action::CloseBoard,
        KeyCode::Char('o') if ctx.view == ViewId::Boards && mutations_enabled => {
            Action::ReopenBoard
        }
        KeyCode::Char('i') if ctx.view == ViewId::Boards && mutations_enabled => Action::AddMembers,
        KeyCode::Char('f') if ctx.view == ViewId::Boards => Action::EditFilter,
        _ => Action::None,
    }
}
