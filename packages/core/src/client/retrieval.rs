// Retrieval operations the engine does not offer yet.
//
// They fail loudly instead of returning empty collections, so "no data" is
// never confused with "feature available".

use super::Client;
use crate::bridge::{Event, EventHandler};
use crate::error::{Result, WhatsflyError};
use serde_json::Value;
use std::sync::Arc;

impl Client {
    pub fn get_all_chats(&self) -> Result<Vec<Value>> {
        Err(WhatsflyError::not_implemented("get_all_chats"))
    }

    pub fn get_all_chat_ids(&self) -> Result<Vec<String>> {
        Err(WhatsflyError::not_implemented("get_all_chat_ids"))
    }

    pub fn get_unread_messages_in_chat(
        &self,
        _chat_id: &str,
        _include_me: bool,
        _include_notifications: bool,
    ) -> Result<Vec<Event>> {
        Err(WhatsflyError::not_implemented("get_unread_messages_in_chat"))
    }

    pub fn get_contacts(&self) -> Result<Vec<Value>> {
        Err(WhatsflyError::not_implemented("get_contacts"))
    }

    pub fn chat_send_seen(&self, _chat_id: &str) -> Result<()> {
        Err(WhatsflyError::not_implemented("chat_send_seen"))
    }

    pub fn check_number_status(&self, _number_id: &str) -> Result<bool> {
        Err(WhatsflyError::not_implemented("check_number_status"))
    }

    pub fn subscribe_new_messages(&self, _observer: Arc<dyn EventHandler>) -> Result<()> {
        Err(WhatsflyError::not_implemented("subscribe_new_messages"))
    }

    pub fn unsubscribe_new_messages(&self, _observer: Arc<dyn EventHandler>) -> Result<()> {
        Err(WhatsflyError::not_implemented("unsubscribe_new_messages"))
    }

    /// Connectivity probe; see [`Client::connection_state`] for the local view.
    pub fn is_connected(&self) -> Result<bool> {
        Err(WhatsflyError::not_implemented("is_connected"))
    }
}
