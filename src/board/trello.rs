// src/board/trello.rs
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;

use super::{BoardContext, BoardSink, CardRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";
/// Trello pages board labels at 50 by default; 1000 is the API maximum.
const LABEL_LIMIT: u32 = 1000;

#[derive(Clone)]
pub struct TrelloClient {
    key: String,
    token: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct TrelloList {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TrelloLabel {
    id: String,
    // Trello allows colour-only labels with an empty/null name.
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct NewCard<'a> {
    id_list: &'a str,
    name: &'a str,
    desc: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    due: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id_labels: Option<String>,
}

impl<'a> NewCard<'a> {
    fn from_request(card: &'a CardRequest) -> Self {
        Self {
            id_list: &card.list_id,
            name: &card.name,
            desc: &card.desc,
            due: card.due.map(|d| d.to_rfc3339()),
            id_labels: (!card.label_ids.is_empty()).then(|| card.label_ids.join(",")),
        }
    }
}

impl TrelloClient {
    pub fn new(key: String, token: String) -> Self {
        Self {
            key,
            token,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Optional builder for tests/tools
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.client
            .get(self.endpoint(path))
            .query(&[("key", &self.key), ("token", &self.token)])
            .send()
            .await
            .with_context(|| format!("trello get {path}"))?
            .error_for_status()
            .with_context(|| format!("trello get {path} non-2xx"))?
            .json::<T>()
            .await
            .with_context(|| format!("trello decode {path}"))
    }

    /// Fetch lists and labels of `board_id` and pick the list named `list_name`.
    pub async fn board_context(&self, board_id: &str, list_name: &str) -> Result<BoardContext> {
        let labels: Vec<TrelloLabel> = self
            .get_json(&labels_path(board_id))
            .await
            .context("could not get labels")?;
        let lists: Vec<TrelloList> = self
            .get_json(&format!("boards/{board_id}/lists"))
            .await
            .context("could not get lists")?;

        build_context(board_id, list_name, lists, labels)
    }
}

fn labels_path(board_id: &str) -> String {
    format!("boards/{board_id}/labels?limit={LABEL_LIMIT}")
}

fn build_context(
    board_id: &str,
    list_name: &str,
    lists: Vec<TrelloList>,
    labels: Vec<TrelloLabel>,
) -> Result<BoardContext> {
    let list = lists
        .into_iter()
        .find(|l| l.name == list_name)
        .ok_or_else(|| anyhow!("could not find list {list_name:?} on board {board_id}"))?;

    let mut by_name = HashMap::new();
    for label in labels {
        if let Some(name) = label.name.filter(|n| !n.is_empty()) {
            // first label with a given name wins
            by_name.entry(name).or_insert(label.id);
        }
    }

    Ok(BoardContext {
        board_id: board_id.to_string(),
        list_id: list.id,
        labels: by_name,
    })
}

#[async_trait::async_trait]
impl BoardSink for TrelloClient {
    async fn create_card(&self, card: &CardRequest) -> Result<()> {
        let body = NewCard::from_request(card);
        tracing::debug!(board = %card.board_id, list = %card.list_id, name = %card.name, "creating trello card");

        self.client
            .post(self.endpoint("cards"))
            .query(&[("key", &self.key), ("token", &self.token)])
            .json(&body)
            .send()
            .await
            .context("trello post card")?
            .error_for_status()
            .context("trello post card non-2xx")?;
        Ok(())
    }
}
