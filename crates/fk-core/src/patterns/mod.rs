//! Patterns sub-module: change notification.

pub mod notifier;
