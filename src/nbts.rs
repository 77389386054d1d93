use anyhow::{Context, anyhow};
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use scraper::{Html, Selector};

use crate::constants::{BROWSER_ACCEPT, BROWSER_USER_AGENT};

/// One `<tr>` of the campaign table with its four leading cells.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignRow {
    /// Position among all matched rows, short rows included.
    pub index: usize,
    pub date: String,
    pub title: String,
    pub venue: String,
    pub blood_bank: String,
}

pub async fn fetch_page(client: &Client, url: &str) -> anyhow::Result<String> {
    client
        .get(url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .header(ACCEPT, BROWSER_ACCEPT)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("NBTS page request failed for {url}"))?
        .text()
        .await
        .with_context(|| format!("read body from {url}"))
}

/// Rows with fewer than four cells are dropped.
pub fn parse_rows(html: &str) -> anyhow::Result<Vec<CampaignRow>> {
    let row_sel = selector("table tbody tr")?;
    let cell_sel = selector("td")?;

    let doc = Html::parse_document(html);
    let mut out = Vec::new();
    for (index, row) in doc.select(&row_sel).enumerate() {
        let cells: Vec<String> = row
            .select(&cell_sel)
            .map(|td| td.text().collect::<String>().trim().to_string())
            .collect();
        let [date, title, venue, blood_bank, ..] = cells.as_slice() else {
            continue;
        };
        out.push(CampaignRow {
            index,
            date: date.clone(),
            title: title.clone(),
            venue: venue.clone(),
            blood_bank: blood_bank.clone(),
        });
    }
    Ok(out)
}

fn selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e:?}"))
}
