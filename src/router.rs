//! Request/response dispatcher between UI surfaces, the conversion engine,
//! and the settings store.
//!
//! Requests are JSON objects tagged by `action`; every response carries a
//! `success` flag plus an action-specific payload or an `error` string.

use serde::{Deserialize, Serialize};

use crate::config::{Settings, SettingsPatch};
use crate::core::{
    taobao_image_search_url, AgentId, AgentInfo, BatchResult, Converter, ParsedReference,
};
use crate::error::{RedirectError, RedirectResult};
use crate::services::{
    plan_redirect, Favorite, HistoryEntry, HistoryRecord, NewFavorite, Redirect, SettingsStore,
    Stats,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    ParseUrl {
        url: String,
    },
    ConvertUrl {
        url: String,
        target_agent: String,
    },
    BatchConvert {
        urls: Vec<String>,
        target_agent: String,
    },
    GetSupportedAgents,
    GetAgentInfo {
        agent: String,
    },
    GetSettings,
    UpdateSettings {
        updates: SettingsPatch,
    },
    AddToHistory {
        item: HistoryRecord,
    },
    GetHistory {
        #[serde(default)]
        limit: Option<usize>,
    },
    ClearHistory,
    AddToFavorites {
        item: NewFavorite,
    },
    GetFavorites,
    RemoveFavorite {
        id: i64,
    },
    SearchFavorites {
        query: String,
    },
    GetStats,
    ExportData,
    ImportData {
        data: String,
    },
    /// Navigation hook: should this page go to the preferred agent?
    AutoRedirect {
        url: String,
    },
    SearchImage {
        image_url: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(flatten)]
    pub body: ResponseBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum ResponseBody {
    Parsed { parsed: Option<ParsedReference> },
    Converted { converted_url: Option<String> },
    Results { results: Vec<BatchResult> },
    Agents { agents: Vec<AgentId> },
    AgentInfo { agent: AgentInfo },
    Settings { settings: Settings },
    HistoryItem { item: HistoryEntry },
    History { history: Vec<HistoryEntry> },
    FavoriteItem { item: Favorite },
    Favorites { favorites: Vec<Favorite> },
    Stats { stats: Stats },
    Export { data: String },
    Redirect { redirect: Option<Redirect> },
    SearchUrl { url: String },
    Error { error: String },
    Empty {},
}

impl Response {
    pub fn ok(body: ResponseBody) -> Self {
        Self {
            success: true,
            body,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            body: ResponseBody::Error {
                error: message.into(),
            },
        }
    }

    /// Bare success flag with no payload.
    pub fn flag(success: bool) -> Self {
        Self {
            success,
            body: ResponseBody::Empty {},
        }
    }
}

pub struct Router<'r> {
    converter: Converter<'r>,
    store: SettingsStore,
}

impl Router<'static> {
    pub fn new(store: SettingsStore) -> Self {
        Self::with_converter(Converter::new(), store)
    }
}

impl<'r> Router<'r> {
    pub fn with_converter(converter: Converter<'r>, store: SettingsStore) -> Self {
        Self { converter, store }
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SettingsStore {
        &mut self.store
    }

    /// Handle one request. Never panics; failures become error responses.
    pub fn handle(&mut self, request: Request) -> Response {
        match self.dispatch(request) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Request failed");
                Response::error(e.to_string())
            }
        }
    }

    /// Handle a JSON request and answer with a JSON response.
    pub fn handle_json(&mut self, request: &str) -> String {
        let response = match serde_json::from_str::<Request>(request) {
            Ok(request) => self.handle(request),
            Err(e) => {
                tracing::debug!(error = %e, "Malformed request");
                Response::error(format!("Malformed request: {e}"))
            }
        };

        serde_json::to_string(&response).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to serialize response");
            r#"{"success":false,"error":"Failed to serialize response"}"#.to_string()
        })
    }

    fn dispatch(&mut self, request: Request) -> RedirectResult<Response> {
        use ResponseBody as Body;

        let response = match request {
            Request::ParseUrl { url } => Response::ok(Body::Parsed {
                parsed: self.converter.parse_url(&url),
            }),
            Request::ConvertUrl { url, target_agent } => Response::ok(Body::Converted {
                converted_url: self.converter.convert_url(&url, &target_agent),
            }),
            Request::BatchConvert { urls, target_agent } => Response::ok(Body::Results {
                results: self.converter.convert_batch(&urls, &target_agent),
            }),
            Request::GetSupportedAgents => Response::ok(Body::Agents {
                agents: self.converter.supported_agents(),
            }),
            Request::GetAgentInfo { agent } => {
                let info = self
                    .converter
                    .agent_info(&agent)
                    .ok_or(RedirectError::UnknownAgent(agent))?;
                Response::ok(Body::AgentInfo { agent: info })
            }
            Request::GetSettings => Response::ok(Body::Settings {
                settings: self.store.get(),
            }),
            Request::UpdateSettings { updates } => {
                if let Some(agent) = &updates.preferred_agent {
                    if self.converter.registry().agent(agent).is_none() {
                        return Err(RedirectError::UnknownAgent(agent.clone()));
                    }
                }
                Response::ok(Body::Settings {
                    settings: self.store.set_with(updates, self.converter.registry())?,
                })
            }
            Request::AddToHistory { item } => Response::ok(Body::HistoryItem {
                item: self.store.add_history(item)?,
            }),
            Request::GetHistory { limit } => Response::ok(Body::History {
                history: self.store.history(limit),
            }),
            Request::ClearHistory => {
                self.store.clear_history()?;
                Response::flag(true)
            }
            Request::AddToFavorites { item } => {
                let item = self.with_reference(item);
                Response::ok(Body::FavoriteItem {
                    item: self.store.add_favorite(item)?,
                })
            }
            Request::GetFavorites => Response::ok(Body::Favorites {
                favorites: self.store.favorites().to_vec(),
            }),
            Request::RemoveFavorite { id } => Response::flag(self.store.remove_favorite(id)?),
            Request::SearchFavorites { query } => Response::ok(Body::Favorites {
                favorites: self.store.search_favorites(&query),
            }),
            Request::GetStats => Response::ok(Body::Stats {
                stats: self.store.stats(),
            }),
            Request::ExportData => Response::ok(Body::Export {
                data: self.store.export()?,
            }),
            Request::ImportData { data } => {
                self.store.import_with(&data, self.converter.registry())?;
                Response::flag(true)
            }
            Request::AutoRedirect { url } => {
                let redirect = plan_redirect(&self.converter, &self.store.get(), &url);
                if let Some(redirect) = &redirect {
                    self.store.add_history(redirect.record.clone())?;
                }
                Response::ok(Body::Redirect { redirect })
            }
            Request::SearchImage { image_url } => Response::ok(Body::SearchUrl {
                url: taobao_image_search_url(&image_url),
            }),
            Request::Unknown => Response::error("Unknown action"),
        };
        Ok(response)
    }

    /// Fill platform, item and agent from the link itself when the caller
    /// left them out.
    fn with_reference(&self, mut item: NewFavorite) -> NewFavorite {
        if let Some(parsed) = self.converter.parse_url(&item.url) {
            item.platform
                .get_or_insert_with(|| parsed.platform_id.to_string());
            item.item_id.get_or_insert(parsed.item_id);
            if item.agent.is_none() {
                item.agent = parsed.agent_id.map(|a| a.to_string());
            }
        }
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn router() -> Router<'static> {
        Router::new(SettingsStore::in_memory())
    }

    fn call(router: &mut Router<'_>, request: Value) -> Value {
        serde_json::from_str(&router.handle_json(&request.to_string())).unwrap()
    }

    #[test]
    fn test_parse_url_action() {
        let mut router = router();
        let response = call(
            &mut router,
            json!({"action": "parseUrl", "url": "https://item.taobao.com/item.htm?id=123456"}),
        );

        assert_eq!(response["success"], true);
        assert_eq!(response["parsed"]["kind"], "original");
        assert_eq!(response["parsed"]["platformId"], "taobao");
        assert_eq!(response["parsed"]["itemId"], "123456");
    }

    #[test]
    fn test_parse_url_miss_is_still_success() {
        let mut router = router();
        let response = call(&mut router, json!({"action": "parseUrl", "url": "garbage"}));
        assert_eq!(response["success"], true);
        assert!(response["parsed"].is_null());
    }

    #[test]
    fn test_convert_url_action() {
        let mut router = router();
        let response = call(
            &mut router,
            json!({
                "action": "convertUrl",
                "url": "https://item.taobao.com/item.htm?id=123456",
                "targetAgent": "cnfans.com"
            }),
        );
        assert_eq!(
            response["convertedUrl"],
            "https://cnfans.com/product?id=123456&platform=TAOBAO"
        );
    }

    #[test]
    fn test_batch_convert_action() {
        let mut router = router();
        let response = call(
            &mut router,
            json!({
                "action": "batchConvert",
                "urls": ["https://item.taobao.com/item.htm?id=1", "nope"],
                "targetAgent": "original"
            }),
        );

        let results = response["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["converted"], "https://item.taobao.com/item.htm?id=1");
        assert!(results[1]["converted"].is_null());
        assert_eq!(results[1]["original"], "nope");
    }

    #[test]
    fn test_supported_agents_and_info() {
        let mut router = router();
        let response = call(&mut router, json!({"action": "getSupportedAgents"}));
        assert_eq!(response["agents"].as_array().unwrap().len(), 26);

        let response = call(&mut router, json!({"action": "getAgentInfo", "agent": "hoobuy.com"}));
        assert_eq!(response["agent"]["name"], "Hoobuy");
        assert_eq!(response["agent"]["grammar"], "path");
        assert_eq!(response["agent"]["platforms"], json!(["taobao", "weidian"]));

        let response = call(&mut router, json!({"action": "getAgentInfo", "agent": "nope.test"}));
        assert_eq!(response["success"], false);
        assert_eq!(response["error"], "Unknown agent: nope.test");
    }

    #[test]
    fn test_unknown_and_malformed_requests() {
        let mut router = router();
        let response = call(&mut router, json!({"action": "launchRockets"}));
        assert_eq!(response, json!({"success": false, "error": "Unknown action"}));

        let response: Value = serde_json::from_str(&router.handle_json("{oops")).unwrap();
        assert_eq!(response["success"], false);
        assert!(response["error"].as_str().unwrap().starts_with("Malformed request"));
    }

    #[test]
    fn test_settings_actions() {
        let mut router = router();
        let response = call(
            &mut router,
            json!({"action": "updateSettings", "updates": {"currency": "GBP", "autoConvert": false}}),
        );
        assert_eq!(response["settings"]["currency"], "GBP");

        let response = call(&mut router, json!({"action": "getSettings"}));
        assert_eq!(response["settings"]["autoConvert"], false);
        assert_eq!(response["settings"]["preferredAgent"], "superbuy.com");

        let response = call(
            &mut router,
            json!({"action": "updateSettings", "updates": {"preferredAgent": "nope.test"}}),
        );
        assert_eq!(response["success"], false);
    }

    fn build_solo(req: &crate::core::grammar::EmbedRequest<'_>) -> String {
        format!("https://solo.test/?u={}", urlencoding::encode(req.original_url))
    }

    #[test]
    fn test_settings_accept_agents_of_own_registry() {
        let mut agents = crate::core::agents::builtin_agents();
        agents.push(crate::core::grammar::AgentGrammar::encoded(
            "solo.test",
            "Solo",
            r"[?&]u=([^&]+)",
            1,
            build_solo,
        ));
        let registry = crate::core::Registry::new(crate::core::platforms::builtin_platforms(), agents);
        let mut router = Router::with_converter(
            Converter::with_registry(&registry),
            SettingsStore::in_memory(),
        );

        let response = call(
            &mut router,
            json!({"action": "updateSettings", "updates": {"preferredAgent": "solo.test"}}),
        );
        assert_eq!(response["success"], true);
        assert_eq!(response["settings"]["preferredAgent"], "solo.test");
        assert_eq!(router.store().get().preferred_agent, "solo.test");

        let response = call(
            &mut router,
            json!({"action": "updateSettings", "updates": {"preferredAgent": "nowhere.test"}}),
        );
        assert_eq!(response["success"], false);
    }

    #[test]
    fn test_history_actions() {
        let mut router = router();
        for n in 0..3 {
            let response = call(
                &mut router,
                json!({"action": "addToHistory", "item": {
                    "originalUrl": format!("https://item.taobao.com/item.htm?id={n}"),
                    "convertedUrl": "https://x.test",
                    "toAgent": "cnfans.com"
                }}),
            );
            assert!(response["item"]["id"].is_i64());
        }

        let response = call(&mut router, json!({"action": "getHistory", "limit": 2}));
        assert_eq!(response["history"].as_array().unwrap().len(), 2);
        let response = call(&mut router, json!({"action": "getHistory", "limit": 0}));
        assert_eq!(response["history"].as_array().unwrap().len(), 3);

        let response = call(&mut router, json!({"action": "getStats"}));
        assert_eq!(response["stats"]["totalRedirects"], 3);
        assert_eq!(response["stats"]["mostUsedAgent"], "cnfans.com");

        let response = call(&mut router, json!({"action": "clearHistory"}));
        assert_eq!(response, json!({"success": true}));
        let response = call(&mut router, json!({"action": "getHistory"}));
        assert!(response["history"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_favorite_actions() {
        let mut router = router();
        let add = json!({"action": "addToFavorites", "item": {
            "url": "https://hoobuy.com/product/2/77",
            "title": "Denim Jacket"
        }});

        let response = call(&mut router, add.clone());
        assert_eq!(response["success"], true);
        assert_eq!(response["item"]["platform"], "weidian");
        assert_eq!(response["item"]["itemId"], "77");
        assert_eq!(response["item"]["agent"], "hoobuy.com");
        let id = response["item"]["id"].as_i64().unwrap();

        let response = call(&mut router, add);
        assert_eq!(response["success"], false);

        let response = call(&mut router, json!({"action": "searchFavorites", "query": "denim"}));
        assert_eq!(response["favorites"].as_array().unwrap().len(), 1);

        let response = call(&mut router, json!({"action": "removeFavorite", "id": id}));
        assert_eq!(response["success"], true);
        let response = call(&mut router, json!({"action": "getFavorites"}));
        assert!(response["favorites"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_export_import_actions() {
        let mut router = router();
        call(
            &mut router,
            json!({"action": "updateSettings", "updates": {"theme": "dark"}}),
        );
        let exported = call(&mut router, json!({"action": "exportData"}));
        let data = exported["data"].as_str().unwrap().to_string();

        let mut other = self::router();
        let response = call(&mut other, json!({"action": "importData", "data": data}));
        assert_eq!(response, json!({"success": true}));
        assert_eq!(other.store().get().theme, crate::config::Theme::Dark);

        let response = call(&mut other, json!({"action": "importData", "data": "{}"}));
        assert_eq!(response["success"], false);
    }

    #[test]
    fn test_auto_redirect_records_history() {
        let mut router = router();
        call(
            &mut router,
            json!({"action": "updateSettings", "updates": {"preferredAgent": "cnfans.com"}}),
        );

        let response = call(
            &mut router,
            json!({"action": "autoRedirect", "url": "https://hoobuy.com/product/1/42"}),
        );
        assert_eq!(
            response["redirect"]["convertedUrl"],
            "https://cnfans.com/product?id=42&platform=TAOBAO"
        );
        assert_eq!(router.store().history(None).len(), 1);

        let response = call(
            &mut router,
            json!({"action": "autoRedirect", "url": "https://item.taobao.com/item.htm?id=42"}),
        );
        assert!(response["redirect"].is_null());
        assert_eq!(router.store().history(None).len(), 1);
    }

    #[test]
    fn test_search_image_action() {
        let mut router = router();
        let response = call(
            &mut router,
            json!({"action": "searchImage", "imageUrl": "https://img.test/a.jpg"}),
        );
        assert!(response["url"]
            .as_str()
            .unwrap()
            .starts_with("https://s.taobao.com/search?imgfile=https%3A%2F%2Fimg.test%2Fa.jpg"));
    }
}
