//! Registry of setting handlers.

use std::collections::HashMap;

use super::handlers::{
    background_handler, background_opacity_handler, box_per_message_handler, font_size_handler,
    max_lines_handler, message_spacing_handler, persist_time_handler, texture_view_handler,
};
use super::SettingHandler;

/// Registry of all available setting handlers.
pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
    /// Keys in display order for `show` output.
    display_order: Vec<&'static str>,
}

impl SettingRegistry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            display_order: Vec::new(),
        };

        registry.register(Box::new(max_lines_handler()));
        registry.register(Box::new(persist_time_handler()));
        registry.register(Box::new(font_size_handler()));
        registry.register(Box::new(background_handler()));
        registry.register(Box::new(background_opacity_handler()));
        registry.register(Box::new(box_per_message_handler()));
        registry.register(Box::new(message_spacing_handler()));
        registry.register(Box::new(texture_view_handler()));

        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        let key = handler.key();
        self.display_order.push(key);
        self.handlers.insert(key, handler);
    }

    /// Get a handler by key.
    pub fn get(&self, key: &str) -> Option<&dyn SettingHandler> {
        self.handlers.get(key).map(|h| h.as_ref())
    }

    /// Get all keys in display order.
    pub fn keys_display_order(&self) -> &[&'static str] {
        &self.display_order
    }
}

impl Default for SettingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
