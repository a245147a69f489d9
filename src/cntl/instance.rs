use std::fmt;
use std::sync::Arc;

use super::engine::{DetachedEngine, Engine};
use super::logger::ConsoleLogger;
use super::settings::{HandleType, Settings};

/// The owning client instance as seen by the control-plane.
///
/// Every handler receives it explicitly; nothing here is global.
pub struct Instance {
    settings: Settings,
    handle_type: HandleType,
    console: Arc<ConsoleLogger>,
    engine: Box<dyn Engine>,
}

impl Instance {
    pub fn new(handle_type: HandleType, engine: Box<dyn Engine>) -> Self {
        Self::with_settings(handle_type, engine, Settings::default())
    }

    /// Start from `settings` instead of the defaults. Later changes go
    /// through the handlers.
    pub fn with_settings(
        handle_type: HandleType,
        engine: Box<dyn Engine>,
        settings: Settings,
    ) -> Self {
        Self {
            settings,
            handle_type,
            console: Arc::new(ConsoleLogger::new()),
            engine,
        }
    }

    /// Bucket instance backed by a [`DetachedEngine`].
    pub fn detached() -> Self {
        Self::new(HandleType::Bucket, Box::new(DetachedEngine::new()))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn handle_type(&self) -> HandleType {
        self.handle_type
    }

    pub fn console(&self) -> &Arc<ConsoleLogger> {
        &self.console
    }

    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    pub(crate) fn engine_mut(&mut self) -> &mut dyn Engine {
        self.engine.as_mut()
    }

    /// Downcast the engine to its concrete type.
    pub fn engine_as<T: 'static>(&self) -> Option<&T> {
        self.engine.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("handle_type", &self.handle_type)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
