//! In-memory per-browser session storage.
//!
//! Sessions live only as long as the server process. Ids are random 128-bit
//! values carried in the `eco_session` cookie.

use std::collections::HashMap;

use rand::RngCore;
use serde::Serialize;

use crate::classify::ClassificationResult;
use crate::recommend::Recommendation;

pub const SESSION_COOKIE: &str = "eco_session";

/// Upper bound on live sessions; the least recently used is evicted beyond
/// this.
const MAX_SESSIONS: usize = 1024;

/// A 1-5 star rating left on the feedback page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub rating: u8,
    pub comment: String,
}

/// Everything remembered between the pages of one visit.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SessionData {
    pub uploaded_image: Option<String>,
    pub classification: Option<ClassificationResult>,
    pub recommendation: Option<Recommendation>,
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, SessionData>,
    order: Vec<String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a live session for a cookie value and mark it as recently used.
    ///
    /// Unknown or missing ids return `None`; nothing is created.
    pub fn touch(&mut self, presented: Option<&str>) -> Option<String> {
        let id = presented?;
        let position = self.order.iter().position(|known| known == id)?;
        let id = self.order.remove(position);
        self.order.push(id.clone());
        Some(id)
    }

    /// Start a new empty session, evicting the least recently used one when
    /// the store is full.
    pub fn create(&mut self) -> String {
        let id = new_session_id();
        if self.order.len() >= MAX_SESSIONS {
            let evicted = self.order.remove(0);
            self.sessions.remove(&evicted);
            log::debug!("evicted idle session {}", evicted);
        }
        self.sessions.insert(id.clone(), SessionData::default());
        self.order.push(id.clone());
        id
    }

    pub fn get(&self, id: &str) -> Option<&SessionData> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut SessionData> {
        self.sessions.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn new_session_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
