use std::time::Duration;

use color_eyre::eyre::{eyre, Result};
use tracing::debug;

use crate::api::parser::{self, BoardDetails};
use crate::cascade::Item;

pub const REPORT_SCRIPT: &str = "matrep.py";
pub const BOARD_SCRIPT: &str = "metorgtrello";

/// Builds `{base}/cgi-bin/{script}?cmd={cmd}&k=v...` with URL-encoded
/// parameter values.
fn build_url(base: &str, script: &str, cmd: &str, params: &[(&str, &str)]) -> String {
    let mut url = format!("{}/cgi-bin/{}?cmd={}", base, script, cmd);
    for (key, value) in params {
        url.push('&');
        url.push_str(key);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
    url
}

/// HTTP client for the report and board CGI services. Every call is a
/// GET; success and failure both come back as JSON, failure via the
/// top-level `error` field handled by the parsers.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    async fn get(&self, script: &str, cmd: &str, params: &[(&str, &str)]) -> Result<String> {
        let url = build_url(&self.base, script, cmd, params);
        debug!(%url, "request");
        let resp = self.http.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                eyre!("request timed out: {}", cmd)
            } else {
                eyre!("undefined error - is the server down?")
            }
        })?;
        if !resp.status().is_success() {
            return Err(eyre!("HTTP {} from {}", resp.status(), script));
        }
        resp.text()
            .await
            .map_err(|e| eyre!("Failed to read response: {}", e))
    }

    // --- report service ---

    pub async fn fetch_apps(&self) -> Result<Vec<Item>> {
        let body = self.get(REPORT_SCRIPT, "get_apps", &[]).await?;
        parser::parse_apps(&body)
    }

    pub async fn fetch_versions(&self, app: &str) -> Result<Vec<Item>> {
        let body = self
            .get(REPORT_SCRIPT, "get_versions", &[("app", app)])
            .await?;
        parser::parse_versions(&body)
    }

    pub async fn fetch_tests(&self, app: &str, version: &str) -> Result<Vec<Item>> {
        let body = self
            .get(
                REPORT_SCRIPT,
                "get_tests",
                &[("app", app), ("version", version)],
            )
            .await?;
        parser::parse_tests(&body)
    }

    pub async fn fetch_test_results(
        &self,
        app: &str,
        version: &str,
        test: &str,
    ) -> Result<Vec<Item>> {
        let body = self
            .get(
                REPORT_SCRIPT,
                "get_test_results",
                &[("app", app), ("version", version), ("test", test)],
            )
            .await?;
        parser::parse_test_results(&body)
    }

    pub async fn add_test_result(
        &self,
        app: &str,
        version: &str,
        test: &str,
        reporter: &str,
        status: &str,
        descr: &str,
    ) -> Result<String> {
        let body = self
            .get(
                REPORT_SCRIPT,
                "add_test_result",
                &[
                    ("app", app),
                    ("version", version),
                    ("test", test),
                    ("reporter", reporter),
                    ("status", status),
                    ("descr", descr),
                ],
            )
            .await?;
        parser::parse_status(&body)
    }

    pub async fn remove_test_result(&self, id: u64) -> Result<String> {
        let id = id.to_string();
        let body = self
            .get(REPORT_SCRIPT, "remove_test_result", &[("id", &id)])
            .await?;
        parser::parse_status(&body)
    }

    // --- board service ---

    pub async fn fetch_backedup_boards(&self, filter: &str) -> Result<Vec<Item>> {
        let body = self
            .get(BOARD_SCRIPT, "get_backedup_boards", &[("filter", filter)])
            .await?;
        parser::parse_backedup_boards(&body)
    }

    pub async fn fetch_live_boards(&self, open: bool, filter: &str) -> Result<Vec<Item>> {
        let open = if open { "1" } else { "0" };
        let body = self
            .get(
                BOARD_SCRIPT,
                "get_live_boards",
                &[("open", open), ("filter", filter)],
            )
            .await?;
        parser::parse_live_boards(&body)
    }

    pub async fn fetch_board_details(&self, id: &str) -> Result<BoardDetails> {
        let body = self
            .get(BOARD_SCRIPT, "get_live_board_details", &[("id", id)])
            .await?;
        parser::parse_board_details(&body)
    }

    pub async fn backup_board(&self, id: &str) -> Result<Option<String>> {
        let body = self.get(BOARD_SCRIPT, "backup_board", &[("id", id)]).await?;
        parser::parse_backup_commit(&body)
    }

    pub async fn copy_live_board(&self, src_id: &str, dst_name: &str) -> Result<String> {
        let body = self
            .get(
                BOARD_SCRIPT,
                "copy_live_board",
                &[("src_id", src_id), ("dst_name", dst_name)],
            )
            .await?;
        parser::parse_status(&body)
    }

    pub async fn rename_live_board(&self, id: &str, new_name: &str) -> Result<String> {
        let body = self
            .get(
                BOARD_SCRIPT,
                "rename_live_board",
                &[("id", id), ("new_name", new_name)],
            )
            .await?;
        parser::parse_status(&body)
    }

    pub async fn close_board(&self, id: &str) -> Result<String> {
        let body = self.get(BOARD_SCRIPT, "close_board", &[("id", id)]).await?;
        parser::parse_status(&body)
    }

    pub async fn reopen_board(&self, id: &str) -> Result<String> {
        let body = self.get(BOARD_SCRIPT, "reopen_board", &[("id", id)]).await?;
        parser::parse_status(&body)
    }

    pub async fn add_org_members_to_board(&self, id: &str) -> Result<String> {
        let body = self
            .get(BOARD_SCRIPT, "add_org_members_to_board", &[("id", id)])
            .await?;
        parser::parse_status(&body)
    }
}
