use madm::api::client::ApiClient;
use madm::app::{AppState, ChainId, Mutation, PromptOutcome};
use madm::cascade::{ApplyOutcome, FetchTicket, ItemKey};
use madm::cli::Cli;
use madm::events::{AppEvent, EventHandler, MutationReply};
use madm::input::{self, Action};
use madm::persist::{self, StateStore};
use madm::tui;

use clap::Parser;
use color_eyre::eyre::Result;
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();
    init_tracing();

    let client = ApiClient::new(&args.server, Duration::from_secs(args.timeout))?;
    let mut store = if args.no_persist {
        StateStore::disabled()
    } else {
        StateStore::open()
    };

    let mut state = AppState::new(args.server.clone());
    if let Some(f) = store.get(persist::KEY_OPEN_FILTER) {
        state.set_filter(ChainId::OpenBoards, f.to_string());
    }
    if let Some(f) = store.get(persist::KEY_CLOSED_FILTER) {
        state.set_filter(ChainId::ClosedBoards, f.to_string());
    }
    seed_selections(&mut state, &args, &store);

    // Setup terminal with panic hook
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let events = EventHandler::new(Duration::from_millis(100));
    let tx = events.sender();

    // Initial load: the report chain root plus all three board tables.
    let mut initial = Vec::new();
    if let Some(t) = state.reports.begin_refresh(0) {
        initial.push((ChainId::Reports, t));
    }
    initial.extend(state.refresh_all_boards());
    for (chain, ticket) in initial {
        dispatch_fetch(&client, &tx, &mut state, chain, ticket);
    }

    let result = run_app(&mut terminal, &mut state, events, &tx, &client, &mut store).await;

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Logs go to a file named by `MADM_LOG`; stderr belongs to the TUI.
fn init_tracing() {
    if let Ok(path) = std::env::var("MADM_LOG") {
        if let Ok(file) = std::fs::File::create(&path) {
            tracing_subscriber::fmt()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
    }
}

/// Deep-link flags win over the stored selections; each level falls
/// back to the saved value only when no flag targets it.
fn seed_selections(state: &mut AppState, args: &Cli, store: &StateStore) {
    let wanted = [
        (0, args.app.as_deref(), persist::KEY_APP),
        (1, args.app_version.as_deref(), persist::KEY_VERSION),
        (2, args.test.as_deref(), persist::KEY_TEST),
    ];
    let any_flag = wanted.iter().any(|(_, flag, _)| flag.is_some());
    for (level, flag, key) in wanted {
        let value = if any_flag {
            flag
        } else {
            store.get(key)
        };
        if let Some(v) = value {
            state
                .reports
                .seed_requested(level, ItemKey::text(v.to_string()));
        }
    }
    if let Some(id) = store.get(persist::KEY_OPEN_BOARD) {
        state
            .open_boards
            .seed_requested(0, ItemKey::text(id.to_string()));
    }
    if let Some(id) = store.get(persist::KEY_CLOSED_BOARD) {
        state
            .closed_boards
            .seed_requested(0, ItemKey::text(id.to_string()));
    }
}

/// Spawns the fetch a ticket describes and routes its outcome back
/// through the event channel. One busy unit is held until the matching
/// completion event is handled.
fn dispatch_fetch(
    client: &ApiClient,
    tx: &UnboundedSender<AppEvent>,
    state: &mut AppState,
    chain: ChainId,
    ticket: FetchTicket,
) {
    state.fetch_started();
    let client = client.clone();
    let tx = tx.clone();
    let filter = state.filter_for(chain).to_string();
    tokio::spawn(async move {
        let parents: Vec<String> = ticket.parent_keys.iter().map(ItemKey::as_param).collect();
        let result = match (chain, ticket.level) {
            (ChainId::Reports, 0) => client.fetch_apps().await,
            (ChainId::Reports, 1) => client.fetch_versions(&parents[0]).await,
            (ChainId::Reports, 2) => client.fetch_tests(&parents[0], &parents[1]).await,
            (ChainId::Reports, _) => {
                client
                    .fetch_test_results(&parents[0], &parents[1], &parents[2])
                    .await
            }
            (ChainId::Backedup, _) => client.fetch_backedup_boards(&filter).await,
            (ChainId::OpenBoards, _) => client.fetch_live_boards(true, &filter).await,
            (ChainId::ClosedBoards, _) => client.fetch_live_boards(false, &filter).await,
        };
        let _ = tx.send(AppEvent::FetchResult {
            chain,
            ticket,
            result: result.map_err(|e| e.to_string()),
        });
    });
}

/// Detail fetches fan out in parallel, one per open board, each pinned
/// to the list generation that spawned it.
fn dispatch_detail_fetches(client: &ApiClient, tx: &UnboundedSender<AppEvent>, state: &mut AppState) {
    let generation = state.open_boards.level(0).generation();
    let ids: Vec<String> = state
        .open_boards
        .level(0)
        .items
        .iter()
        .map(|it| it.key.as_param())
        .collect();
    for id in ids {
        state.fetch_started();
        let client = client.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = client.fetch_board_details(&id).await;
            let _ = tx.send(AppEvent::DetailResult {
                generation,
                result: result.map_err(|e| e.to_string()),
            });
        });
    }
}

fn dispatch_mutation(
    client: &ApiClient,
    tx: &UnboundedSender<AppEvent>,
    state: &mut AppState,
    mutation: Mutation,
) {
    state.mutation_in_flight = true;
    state.fetch_started();
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = match &mutation {
            Mutation::AddTestResult {
                app,
                version,
                test,
                reporter,
                status,
            } => client
                .add_test_result(app, version, test, reporter, status, "")
                .await
                .map(MutationReply::Status),
            Mutation::RemoveTestResult { id } => client
                .remove_test_result(*id)
                .await
                .map(MutationReply::Status),
            Mutation::BackupBoard { id } => {
                client.backup_board(id).await.map(MutationReply::Backup)
            }
            Mutation::CopyBoard { src_id, dst_name } => client
                .copy_live_board(src_id, dst_name)
                .await
                .map(MutationReply::Status),
            Mutation::RenameBoard { id, new_name } => client
                .rename_live_board(id, new_name)
                .await
                .map(MutationReply::Status),
            Mutation::CloseBoard { id } => {
                client.close_board(id).await.map(MutationReply::Status)
            }
            Mutation::ReopenBoard { id } => {
                client.reopen_board(id).await.map(MutationReply::Status)
            }
            Mutation::AddOrgMembers { id } => client
                .add_org_members_to_board(id)
                .await
                .map(MutationReply::Status),
        };
        let _ = tx.send(AppEvent::MutationResult {
            mutation,
            result: result.map_err(|e| e.to_string()),
        });
    });
}

/// Store key for a pane's persisted name filter. The backed-up filter
/// is session-only.
fn filter_store_key(chain: ChainId) -> Option<&'static str> {
    match chain {
        ChainId::OpenBoards => Some(persist::KEY_OPEN_FILTER),
        ChainId::ClosedBoards => Some(persist::KEY_CLOSED_FILTER),
        ChainId::Backedup | ChainId::Reports => None,
    }
}

/// Writes the current selections back to the store after a manual
/// selection change.
fn sync_store(state: &AppState, store: &mut StateStore) {
    let report_keys = [persist::KEY_APP, persist::KEY_VERSION, persist::KEY_TEST];
    for (level, key) in report_keys.iter().enumerate() {
        if let Some(k) = &state.reports.level(level).current {
            store.set(key, &k.as_param());
        }
    }
    if let Some(k) = &state.open_boards.level(0).current {
        store.set(persist::KEY_OPEN_BOARD, &k.as_param());
    }
    if let Some(k) = &state.closed_boards.level(0).current {
        store.set(persist::KEY_CLOSED_BOARD, &k.as_param());
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    mut events: EventHandler,
    tx: &UnboundedSender<AppEvent>,
    client: &ApiClient,
    store: &mut StateStore,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| tui::render::render(f, state))?;

        state.prune_error();
        state.prune_notice();

        if let Some(event) = events.next().await {
            match event {
                AppEvent::Key(key) => match input::map_key(key, &state.input_context()) {
                    Action::Quit => state.should_quit = true,
                    Action::DismissError => state.clear_error(),
                    Action::MoveUp => {
                        if let Some((chain, ticket)) = state.move_selection(-1) {
                            dispatch_fetch(client, tx, state, chain, ticket);
                        }
                        sync_store(state, store);
                    }
                    Action::MoveDown => {
                        if let Some((chain, ticket)) = state.move_selection(1) {
                            dispatch_fetch(client, tx, state, chain, ticket);
                        }
                        sync_store(state, store);
                    }
                    Action::FocusNext => state.focus_next(),
                    Action::FocusPrev => state.focus_prev(),
                    Action::SwitchView => state.switch_view(),
                    Action::Refresh => {
                        let (chain, _) = state.focused();
                        if let Some(ticket) = state.chain_mut(chain).begin_refresh(0) {
                            dispatch_fetch(client, tx, state, chain, ticket);
                        }
                    }
                    Action::AddResult => {
                        state.request_add_result();
                    }
                    Action::RemoveResult => {
                        state.request_remove_result();
                    }
                    Action::BackupBoard => {
                        if let Some(m) = state.request_backup_board() {
                            dispatch_mutation(client, tx, state, m);
                        }
                    }
                    Action::CopyBoard => {
                        state.request_copy_board();
                    }
                    Action::RenameBoard => {
                        state.request_rename_board();
                    }
                    Action::CloseBoard => {
                        state.request_close_board();
                    }
                    Action::ReopenBoard => {
                        if let Some(m) = state.request_reopen_board() {
                            dispatch_mutation(client, tx, state, m);
                        }
                    }
                    Action::AddMembers => {
                        if let Some(m) = state.request_add_members() {
                            dispatch_mutation(client, tx, state, m);
                        }
                    }
                    Action::EditFilter => state.request_edit_filter(),
                    Action::ConfirmYes => {
                        if let Some(m) = state.confirm_yes() {
                            dispatch_mutation(client, tx, state, m);
                        }
                    }
                    Action::ConfirmNo => state.confirm_no(),
                    Action::PromptChar(c) => state.prompt_char(c),
                    Action::PromptBackspace => state.prompt_backspace(),
                    Action::PromptCancel => state.prompt_cancel(),
                    Action::PromptSubmit => match state.submit_prompt() {
                        PromptOutcome::Mutation(m) => dispatch_mutation(client, tx, state, m),
                        PromptOutcome::FilterChanged(chain) => {
                            if let Some(key) = filter_store_key(chain) {
                                store.set(key, state.filter_for(chain));
                            }
                            if let Some(ticket) = state.chain_mut(chain).begin_refresh(0) {
                                dispatch_fetch(client, tx, state, chain, ticket);
                            }
                        }
                        PromptOutcome::Idle => {}
                    },
                    Action::None => {}
                },
                AppEvent::Tick => {
                    if last_tick.elapsed() >= Duration::from_millis(100) {
                        state.advance_spinner();
                        last_tick = Instant::now();
                    }
                }
                AppEvent::FetchResult {
                    chain,
                    ticket,
                    result,
                } => {
                    state.fetch_finished();
                    match result {
                        Ok(items) => match state.apply_fetch(chain, &ticket, items) {
                            ApplyOutcome::Selected { child, .. } => {
                                if let Some(child) = child {
                                    dispatch_fetch(client, tx, state, chain, child);
                                }
                                if chain == ChainId::OpenBoards {
                                    dispatch_detail_fetches(client, tx, state);
                                }
                            }
                            ApplyOutcome::Empty | ApplyOutcome::Stale => {}
                        },
                        Err(msg) => {
                            // a superseded fetch failing is not worth a banner;
                            // the level stays cleared either way
                            if state.chain(chain).is_current(&ticket) {
                                state.set_error(msg);
                            }
                        }
                    }
                }
                AppEvent::DetailResult { generation, result } => {
                    state.fetch_finished();
                    match result {
                        Ok(details) => {
                            state.apply_board_details(generation, &details);
                        }
                        Err(msg) => {
                            if state.open_boards.level(0).generation() == generation {
                                state.set_error(msg);
                            }
                        }
                    }
                }
                AppEvent::MutationResult { mutation, result } => {
                    state.fetch_finished();
                    // cleared unconditionally, success or error
                    state.mutation_in_flight = false;
                    match result {
                        Ok(reply) => {
                            let skip_refresh = match &reply {
                                MutationReply::Backup(None) => {
                                    state.set_notice("backup: no changes".to_string());
                                    true
                                }
                                MutationReply::Backup(Some(commit)) => {
                                    state.set_notice(format!("backup committed {commit}"));
                                    false
                                }
                                MutationReply::Status(status) => {
                                    state.set_notice(format!(
                                        "{}: {}",
                                        mutation.describe(),
                                        status
                                    ));
                                    false
                                }
                            };
                            if !skip_refresh {
                                for (chain, ticket) in state.refresh_after(&mutation) {
                                    dispatch_fetch(client, tx, state, chain, ticket);
                                }
                            }
                        }
                        Err(msg) => state.set_error(format!("{}: {}", mutation.describe(), msg)),
                    }
                }
            }
        }

        if state.should_quit {
            return Ok(());
        }
    }
}
