use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::SheetsConfig;
use crate::google_auth::{ServiceAccountKey, fetch_access_token};
use crate::http_client::http_client;
use crate::row_store::{CellValue, RowStore};

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// One worksheet of a Google spreadsheet, reached through the Sheets v4 API.
pub struct GoogleSheet {
    client: &'static Client,
    token: String,
    api_base: String,
    spreadsheet_id: String,
    worksheet: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct AppendBody<'a> {
    values: &'a [Vec<CellValue>],
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

impl GoogleSheet {
    /// Authenticates with the service-account file, resolves the spreadsheet
    /// and checks the worksheet exists.
    pub fn open(cfg: &SheetsConfig) -> Result<Self> {
        let client = http_client()?;
        let key = ServiceAccountKey::from_file(&cfg.credentials_file)?;
        let token = fetch_access_token(client, &key).context("google authentication failed")?;

        let spreadsheet_id = match cfg.spreadsheet_id.as_deref() {
            Some(id) => id.to_string(),
            None => find_spreadsheet_id(
                client,
                &token,
                &cfg.drive_files_url,
                &cfg.spreadsheet_name,
            )?,
        };

        let sheet = Self::from_parts(
            client,
            token,
            &cfg.api_base,
            &spreadsheet_id,
            &cfg.worksheet_name,
        );
        sheet.ensure_worksheet()?;
        Ok(sheet)
    }

    /// An already-authenticated handle; no request is made.
    pub fn from_parts(
        client: &'static Client,
        token: String,
        api_base: &str,
        spreadsheet_id: &str,
        worksheet: &str,
    ) -> Self {
        Self {
            client,
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            worksheet: worksheet.to_string(),
        }
    }

    pub fn ensure_worksheet(&self) -> Result<()> {
        let url = self.spreadsheet_url(&[])?;
        let meta: SpreadsheetMeta = send_json(
            self.client
                .get(url)
                .bearer_auth(&self.token)
                .query(&[("fields", "sheets.properties.title")]),
        )
        .context("spreadsheet metadata request failed")?;
        if meta
            .sheets
            .iter()
            .any(|s| s.properties.title == self.worksheet)
        {
            Ok(())
        } else {
            Err(anyhow!(
                "worksheet {:?} not found in spreadsheet {}",
                self.worksheet,
                self.spreadsheet_id
            ))
        }
    }

    fn spreadsheet_url(&self, extra: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base).context("invalid sheets base url")?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow!("sheets base url cannot hold path segments"))?;
            segments.push(&self.spreadsheet_id);
            for seg in extra {
                segments.push(seg);
            }
        }
        Ok(url)
    }

    fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.spreadsheet_url(&["values", range])?;
        let body: ValueRange = send_json(self.client.get(url).bearer_auth(&self.token))
            .with_context(|| format!("read {range} failed"))?;
        Ok(body.values)
    }
}

impl RowStore for GoogleSheet {
    fn first_cell(&mut self) -> Result<Option<String>> {
        let range = a1_range(&self.worksheet, "A1");
        let values = self.read_range(&range)?;
        Ok(values
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .filter(|cell| !cell.is_empty()))
    }

    fn column_values(&mut self, col: usize) -> Result<Vec<String>> {
        let letter = column_letter(col);
        let range = a1_range(&self.worksheet, &format!("{letter}:{letter}"));
        Ok(first_cells(self.read_range(&range)?))
    }

    fn append_rows(&mut self, rows: &[Vec<CellValue>]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let range = format!("{}:append", a1_range(&self.worksheet, "A1"));
        let url = self.spreadsheet_url(&["values", &range])?;
        let _: serde_json::Value = send_json(
            self.client
                .post(url)
                .bearer_auth(&self.token)
                .query(&[
                    ("valueInputOption", "RAW"),
                    ("insertDataOption", "INSERT_ROWS"),
                ])
                .json(&AppendBody { values: rows }),
        )
        .with_context(|| format!("append of {} rows failed", rows.len()))?;
        Ok(())
    }
}

/// Id of the first non-trashed spreadsheet named exactly `name`.
pub fn find_spreadsheet_id(
    client: &Client,
    token: &str,
    drive_files_url: &str,
    name: &str,
) -> Result<String> {
    let query = drive_query(name);
    let list: DriveFileList = send_json(client.get(drive_files_url).bearer_auth(token).query(&[
        ("q", query.as_str()),
        ("fields", "files(id,name)"),
        ("supportsAllDrives", "true"),
        ("includeItemsFromAllDrives", "true"),
    ]))
    .context("drive lookup failed")?;

    let mut files = list.files.into_iter();
    let Some(first) = files.next() else {
        return Err(anyhow!(
            "spreadsheet {name:?} not found (is it shared with the service account?)"
        ));
    };
    if files.next().is_some() {
        log::warn!("several spreadsheets named {name:?}; using {}", first.id);
    }
    Ok(first.id)
}

fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
    let resp = req.send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, body));
    }
    serde_json::from_str(&body).context("invalid json")
}

fn drive_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{escaped}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false")
}

/// `'Sheet 1'!A1`, doubling quotes inside the worksheet title.
fn a1_range(worksheet: &str, cells: &str) -> String {
    format!("'{}'!{}", worksheet.replace('\'', "''"), cells)
}

fn column_letter(col: usize) -> String {
    let mut n = col + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

// Sheets omits trailing empty cells, so a blank row comes back as `[]`.
fn first_cells(rows: Vec<Vec<String>>) -> Vec<String> {
    rows.into_iter()
        .map(|row| row.into_iter().next().unwrap_or_default())
        .collect()
}
