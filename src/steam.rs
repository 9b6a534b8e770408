// 📡 Steam Community Source - group roster + profile names
// Blocking reqwest client (no Tokio runtime), quick-xml for the XML endpoints

use crate::config::WhitelistConfig;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// CAPABILITY
// ============================================================================

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Malformed XML: {0}")]
    Parse(String),

    #[error("No <{field}> in response for {id}")]
    MissingField { field: String, id: String },
}

/// MemberSource - where member ids and display names come from
///
/// The roster fetch is fatal for a run; the name fetch is best-effort and
/// callers are expected to degrade to a placeholder (see `NameResolver`).
pub trait MemberSource {
    /// Ids of every member of the group
    fn fetch_group_members(&self) -> Result<Vec<String>, FetchError>;

    /// Current display name of one member
    fn fetch_display_name(&self, id: &str) -> Result<String, FetchError>;
}

// ============================================================================
// STEAM COMMUNITY CLIENT
// ============================================================================

/// Upper bound on `nextPageLink` hops for one roster fetch
const MAX_ROSTER_PAGES: usize = 50;

pub struct SteamCommunityClient {
    http: reqwest::blocking::Client,
    config: WhitelistConfig,
}

impl SteamCommunityClient {
    pub fn new(config: &WhitelistConfig) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("whitelist-sync/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(SteamCommunityClient {
            http,
            config: config.clone(),
        })
    }

    fn get_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let resp = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        resp.text().map_err(|e| FetchError::Network(e.to_string()))
    }
}

impl MemberSource for SteamCommunityClient {
    fn fetch_group_members(&self) -> Result<Vec<String>, FetchError> {
        let mut members = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(self.config.group_url.clone());

        while let Some(url) = next.take() {
            if visited.contains(&url) || visited.len() >= MAX_ROSTER_PAGES {
                log::warn!("⚠️ Stopping roster pagination at {}", url);
                break;
            }

            log::debug!("Fetching roster page {}", url);
            let xml = self.get_text(&url, self.config.roster_timeout())?;
            members.extend(element_texts(&xml, "steamID64")?);

            next = element_texts(&xml, "nextPageLink")?.into_iter().next();
            visited.insert(url);
        }

        Ok(members)
    }

    fn fetch_display_name(&self, id: &str) -> Result<String, FetchError> {
        let url = self.config.profile_url_for(id);
        let xml = self.get_text(&url, self.config.name_timeout())?;

        element_texts(&xml, "steamID")?
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::MissingField {
                field: "steamID".to_string(),
                id: id.to_string(),
            })
    }
}

// ============================================================================
// XML HELPERS
// ============================================================================

/// Text content (plain text + CDATA) of every `<tag>` element, trimmed, empties dropped
pub fn element_texts(xml: &str, tag: &str) -> Result<Vec<String>, FetchError> {
    // Whitespace is kept so names split around entity references survive intact
    let mut reader = Reader::from_str(xml);

    let mut values = Vec::new();
    let mut current: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == tag.as_bytes() => {
                current = Some(String::new());
            }
            Ok(Event::Text(ref e)) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                if let Some(text) = current.as_mut() {
                    push_reference(text, e);
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == tag.as_bytes() => {
                if let Some(text) = current.take() {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        values.push(trimmed.to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FetchError::Parse(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(values)
}

/// Append what an `&...;` reference stands for, or the reference itself if unknown
fn push_reference(text: &mut String, reference: &BytesRef<'_>) {
    if let Ok(Some(c)) = reference.resolve_char_ref() {
        text.push(c);
        return;
    }

    let name = String::from_utf8_lossy(reference.as_ref());
    match resolve_predefined_entity(&name) {
        Some(value) => text.push_str(value),
        None => {
            text.push('&');
            text.push_str(&name);
            text.push(';');
        }
    }
}
