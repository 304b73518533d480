use std::collections::HashMap;
use std::fmt;

/// Stable identity of a selectable item.
///
/// Display text is never used for lookup: several collections (test
/// results in particular) show timestamps that are not unique, so the
/// server-supplied id is the only valid key for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemKey {
    Text(String),
    Id(u64),
}

impl ItemKey {
    pub fn text(s: impl Into<String>) -> Self {
        ItemKey::Text(s.into())
    }

    pub fn id(n: u64) -> Self {
        ItemKey::Id(n)
    }

    /// The key as it appears in a request query string.
    pub fn as_param(&self) -> String {
        match self {
            ItemKey::Text(s) => s.clone(),
            ItemKey::Id(n) => n.to_string(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::Text(s) => f.write_str(s),
            ItemKey::Id(n) => write!(f, "{}", n),
        }
    }
}

/// Auxiliary attribute attached to an item but not shown as a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuxValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
}

impl AuxValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AuxValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AuxValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            AuxValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

/// One selectable row in a level. `cells` hold the display columns in
/// server order; `aux` carries attributes read only when the item is
/// current (descriptions, rights flags, list names).
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub key: ItemKey,
    pub cells: Vec<String>,
    pub aux: HashMap<String, AuxValue>,
}

impl Item {
    pub fn new(key: ItemKey, cells: Vec<String>) -> Self {
        Self {
            key,
            cells,
            aux: HashMap::new(),
        }
    }

    pub fn with_aux(mut self, name: &str, value: AuxValue) -> Self {
        self.aux.insert(name.to_string(), value);
        self
    }

    pub fn aux_text(&self, name: &str) -> Option<&str> {
        self.aux.get(name).and_then(AuxValue::as_text)
    }

    pub fn aux_list(&self, name: &str) -> Option<&[String]> {
        self.aux.get(name).and_then(AuxValue::as_list)
    }

    pub fn aux_flag(&self, name: &str) -> bool {
        self.aux
            .get(name)
            .and_then(AuxValue::as_flag)
            .unwrap_or(false)
    }
}

/// One tier in a parent-to-child hierarchy of selectable collections.
#[derive(Debug, Clone)]
pub struct Level {
    pub name: &'static str,
    pub items: Vec<Item>,
    pub current: Option<ItemKey>,
    generation: u64,
}

impl Level {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            items: Vec::new(),
            current: None,
            generation: 0,
        }
    }

    /// The refresh cycle this level is on; bumped by every
    /// `begin_refresh` that targets it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.items.iter().any(|it| it.key == *key)
    }

    pub fn current_item(&self) -> Option<&Item> {
        let key = self.current.as_ref()?;
        self.items.iter().find(|it| it.key == *key)
    }

    pub fn item_mut(&mut self, key: &ItemKey) -> Option<&mut Item> {
        self.items.iter_mut().find(|it| it.key == *key)
    }

    /// Index of the current item in server order, if any.
    pub fn current_index(&self) -> Option<usize> {
        let key = self.current.as_ref()?;
        self.items.iter().position(|it| it.key == *key)
    }

    fn first_key(&self) -> Option<ItemKey> {
        self.items.first().map(|it| it.key.clone())
    }

    fn clear(&mut self) {
        self.items.clear();
        self.current = None;
    }
}

/// A fetch the caller must issue for one level. The generation pins the
/// response to the refresh cycle that requested it: a response whose
/// ticket generation is no longer the level's generation is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub level: usize,
    pub generation: u64,
    pub parent_keys: Vec<ItemKey>,
}

/// Result of applying a fetch response to a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A newer refresh for this level superseded the response.
    Stale,
    /// Items installed and a selection made; `child` is the follow-up
    /// fetch, absent at the leaf level.
    Selected {
        key: ItemKey,
        child: Option<FetchTicket>,
    },
    /// Items installed but the level is empty; descendants stay empty.
    Empty,
}

/// Result of a user selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The key is not in the level's items; nothing changed.
    Ignored,
    /// The key was already current; nothing changed, no fetch.
    Unchanged,
    /// Selection applied; `child` is the descendant fetch to issue.
    Selected { child: Option<FetchTicket> },
}

/// An ordered chain of levels with cascading refresh semantics.
///
/// The chain is a pure state machine: it decides what to fetch and how
/// to apply responses, while the caller performs the I/O. All the
/// invariants live here: at most one current item per level, no
/// selection outside the current items, descendants cleared before any
/// refetch, and stale responses dropped by generation.
#[derive(Debug, Clone)]
pub struct Chain {
    levels: Vec<Level>,
    requested: Vec<Option<ItemKey>>,
}

impl Chain {
    pub fn new(names: &[&'static str]) -> Self {
        assert!(!names.is_empty());
        Self {
            levels: names.iter().map(|n| Level::new(n)).collect(),
            requested: vec![None; names.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, idx: usize) -> &Level {
        &self.levels[idx]
    }

    pub fn level_mut(&mut self, idx: usize) -> &mut Level {
        &mut self.levels[idx]
    }

    /// Seeds the preferred selection for a level. Consumed by the next
    /// `apply_items` for that level; honored only if present in the
    /// freshly fetched items.
    pub fn seed_requested(&mut self, idx: usize, key: ItemKey) {
        self.requested[idx] = Some(key);
    }

    /// Keys of the current selections above `idx`, or None if any
    /// ancestor has no selection.
    fn parent_keys(&self, idx: usize) -> Option<Vec<ItemKey>> {
        let mut keys = Vec::with_capacity(idx);
        for level in &self.levels[..idx] {
            keys.push(level.current.clone()?);
        }
        Some(keys)
    }

    /// Starts a refresh of `idx`: clears the level and every descendant,
    /// then returns the fetch to issue. Returns None without bumping any
    /// generation when an ancestor is unselected; children of nothing
    /// must not be fetched, and the cleared descendants stay empty.
    pub fn begin_refresh(&mut self, idx: usize) -> Option<FetchTicket> {
        // Every cleared level advances its generation, not just the one
        // being refetched: an in-flight fetch for any descendant holds a
        // ticket that must go stale the moment its level is cleared.
        for level in &mut self.levels[idx..] {
            level.clear();
            level.generation += 1;
        }
        let parent_keys = self.parent_keys(idx)?;
        Some(FetchTicket {
            level: idx,
            generation: self.levels[idx].generation,
            parent_keys,
        })
    }

    /// Whether a ticket still corresponds to the level's live refresh
    /// cycle.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.levels[ticket.level].generation == ticket.generation
    }

    /// Applies a fetch response. Selection precedence: the consumed
    /// requested key when present in `items`, else the first item in
    /// server order, else nothing.
    pub fn apply_items(&mut self, ticket: &FetchTicket, items: Vec<Item>) -> ApplyOutcome {
        if !self.is_current(ticket) {
            return ApplyOutcome::Stale;
        }
        let idx = ticket.level;
        self.levels[idx].items = items;

        let requested = self.requested[idx].take();
        let key = requested
            .filter(|k| self.levels[idx].contains(k))
            .or_else(|| self.levels[idx].first_key());

        match key {
            Some(key) => {
                self.levels[idx].current = Some(key.clone());
                let child = if idx + 1 < self.levels.len() {
                    self.begin_refresh(idx + 1)
                } else {
                    None
                };
                ApplyOutcome::Selected { key, child }
            }
            None => ApplyOutcome::Empty,
        }
    }

    /// Applies an explicit user selection. A key not present in the
    /// level is ignored; re-selecting the current key changes nothing
    /// and issues no fetch. Manual selection never carries requested
    /// keys downward: descendants default to their first item.
    pub fn select(&mut self, idx: usize, key: &ItemKey) -> SelectOutcome {
        if !self.levels[idx].contains(key) {
            return SelectOutcome::Ignored;
        }
        if self.levels[idx].current.as_ref() == Some(key) {
            return SelectOutcome::Unchanged;
        }
        self.levels[idx].current = Some(key.clone());
        for req in &mut self.requested[idx..] {
            *req = None;
        }
        let child = if idx + 1 < self.levels.len() {
            self.begin_refresh(idx + 1)
        } else {
            None
        };
        SelectOutcome::Selected { child }
    }
}
