//! Shared harness for the CLI runtime tests.

mod fake_server;
mod scripted;
mod state;

pub(in crate::tests) use fake_server::{ConnectionScript, FakeDictServer};
pub(in crate::tests) use scripted::ScriptedConnector;
pub(in crate::tests) use state::{StaticConfigLoader, TestWorld, world};
