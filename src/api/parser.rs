use chrono::DateTime;
use color_eyre::eyre::{eyre, Result};
use serde::de::DeserializeOwned;

use crate::cascade::{AuxValue, Item, ItemKey};

/// Parses a service reply. Every reply may carry a top-level `error`
/// field; when it is non-null the request failed and the remaining
/// fields are meaningless.
fn parse_payload<T: DeserializeOwned>(json: &str) -> Result<T> {
    #[derive(serde::Deserialize)]
    struct Envelope {
        #[serde(default)]
        error: Option<String>,
    }
    let envelope: Envelope = serde_json::from_str(json)?;
    if let Some(msg) = envelope.error {
        return Err(eyre!(msg));
    }
    Ok(serde_json::from_str(json)?)
}

fn name_items(names: Vec<String>) -> Vec<Item> {
    names
        .into_iter()
        .map(|n| Item::new(ItemKey::Text(n.clone()), vec![n]))
        .collect()
}

pub fn parse_apps(json: &str) -> Result<Vec<Item>> {
    #[derive(serde::Deserialize)]
    struct AppsResponse {
        apps: Vec<String>,
    }
    let resp: AppsResponse = parse_payload(json)?;
    Ok(name_items(resp.apps))
}

pub fn parse_versions(json: &str) -> Result<Vec<Item>> {
    #[derive(serde::Deserialize)]
    struct VersionsResponse {
        versions: Vec<String>,
    }
    let resp: VersionsResponse = parse_payload(json)?;
    Ok(name_items(resp.versions))
}

pub fn parse_tests(json: &str) -> Result<Vec<Item>> {
    #[derive(serde::Deserialize)]
    struct TestsResponse {
        tests: Vec<String>,
        descrs: Vec<String>,
    }
    let resp: TestsResponse = parse_payload(json)?;
    if resp.tests.len() != resp.descrs.len() {
        return Err(eyre!(
            "mismatched test arrays: {} tests, {} descrs",
            resp.tests.len(),
            resp.descrs.len()
        ));
    }
    Ok(resp
        .tests
        .into_iter()
        .zip(resp.descrs)
        .map(|(name, descr)| {
            Item::new(ItemKey::Text(name.clone()), vec![name])
                .with_aux("descr", AuxValue::Text(descr))
        })
        .collect())
}

/// Test results arrive as row-major parallel arrays. Rows are keyed by
/// the server-assigned numeric id; timestamps are display-only and may
/// repeat.
pub fn parse_test_results(json: &str) -> Result<Vec<Item>> {
    #[derive(serde::Deserialize)]
    struct ResultsResponse {
        ids: Vec<u64>,
        timestamps: Vec<String>,
        reporters: Vec<String>,
        ipaddresses: Vec<String>,
        statuses: Vec<String>,
        descrs: Vec<String>,
    }
    let resp: ResultsResponse = parse_payload(json)?;
    let n = resp.ids.len();
    for (field, len) in [
        ("timestamps", resp.timestamps.len()),
        ("reporters", resp.reporters.len()),
        ("ipaddresses", resp.ipaddresses.len()),
        ("statuses", resp.statuses.len()),
        ("descrs", resp.descrs.len()),
    ] {
        if len != n {
            return Err(eyre!(
                "mismatched result arrays: {} ids, {} {}",
                n,
                len,
                field
            ));
        }
    }
    let mut items = Vec::with_capacity(n);
    for i in 0..n {
        items.push(
            Item::new(
                ItemKey::Id(resp.ids[i]),
                vec![
                    resp.timestamps[i].clone(),
                    resp.reporters[i].clone(),
                    resp.ipaddresses[i].clone(),
                    resp.statuses[i].clone(),
                ],
            )
            .with_aux("descr", AuxValue::Text(resp.descrs[i].clone())),
        );
    }
    Ok(items)
}

#[derive(serde::Deserialize)]
struct BoardRecord {
    name: String,
    id: String,
    #[serde(default)]
    last_ct: Option<i64>,
}

#[derive(serde::Deserialize)]
struct BoardsResponse {
    boards: Vec<BoardRecord>,
}

/// Unix seconds rendered as `YYYY-MM-DD HH:MM:SS` UTC, matching the
/// backup commit timestamps shown elsewhere.
pub fn format_unix_utc(secs: i64) -> String {
    match DateTime::from_timestamp(secs, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => secs.to_string(),
    }
}

pub fn parse_backedup_boards(json: &str) -> Result<Vec<Item>> {
    let resp: BoardsResponse = parse_payload(json)?;
    Ok(resp
        .boards
        .into_iter()
        .map(|b| {
            let last = b.last_ct.map_or_else(String::new, format_unix_utc);
            Item::new(ItemKey::Text(b.id), vec![b.name, last])
        })
        .collect())
}

pub fn parse_live_boards(json: &str) -> Result<Vec<Item>> {
    let resp: BoardsResponse = parse_payload(json)?;
    Ok(resp
        .boards
        .into_iter()
        .map(|b| Item::new(ItemKey::Text(b.id), vec![b.name]))
        .collect())
}

/// Detail payload for one live board, fetched per row after the board
/// list lands.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct BoardDetails {
    pub id: String,
    pub url: String,
    pub adm_rights: Vec<String>,
    pub inv_rights: String,
    pub list_names: Vec<String>,
}

impl BoardDetails {
    /// A board is official when its sole admin is the service account
    /// and invitations are restricted to admins. Mutations other than
    /// reopen are refused on unofficial boards.
    pub fn is_official(&self) -> bool {
        self.adm_rights.len() == 1
            && self.adm_rights[0] == "metorg_adm"
            && self.inv_rights == "admins"
    }
}

pub fn parse_board_details(json: &str) -> Result<BoardDetails> {
    parse_payload(json)
}

/// Backup replies carry the new commit hash, empty when the backup
/// found nothing to commit.
pub fn parse_backup_commit(json: &str) -> Result<Option<String>> {
    #[derive(serde::Deserialize)]
    struct BackupResponse {
        commit: String,
    }
    let resp: BackupResponse = parse_payload(json)?;
    Ok(Some(resp.commit).filter(|c| !c.is_empty()))
}

pub fn parse_status(json: &str) -> Result<String> {
    #[derive(serde::Deserialize)]
    struct StatusResponse {
        status: String,
    }
    let resp: StatusResponse = parse_payload(json)?;
    Ok(resp.status)
}
