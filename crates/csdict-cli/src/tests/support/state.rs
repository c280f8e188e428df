//! Scenario state shared by the behavioural steps.

use std::cell::RefCell;
use std::ffi::OsString;
use std::io::Cursor;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use csdict_config::Config;
use rstest::fixture;

use super::{ConnectionScript, FakeDictServer};
use crate::errors::AppError;
use crate::{ConfigLoader, IoStreams, run_with_loader};

/// Placeholder in typed commands replaced by the fake server's address.
const SERVER_TOKEN: &str = "SERVER";

pub(in crate::tests) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

#[derive(Default)]
pub(in crate::tests) struct TestWorld {
    server: Option<FakeDictServer>,
    input: Vec<String>,
    debug: bool,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit_code: Option<ExitCode>,
    requests: Vec<String>,
}

impl TestWorld {
    pub fn start_server(&mut self, scripts: Vec<ConnectionScript>) -> Result<()> {
        self.server = Some(FakeDictServer::spawn(scripts)?);
        Ok(())
    }

    pub fn enable_debug(&mut self) {
        self.debug = true;
    }

    pub fn type_line(&mut self, line: &str) {
        self.input.push(line.to_owned());
    }

    /// Runs the client over the typed lines, then collects the server log.
    pub fn run(&mut self) -> Result<()> {
        let address = self
            .server
            .as_ref()
            .map(|server| format!("127.0.0.1 {}", server.port()));
        let mut script = String::new();
        for line in &self.input {
            let line = match &address {
                Some(address) => line.replace(SERVER_TOKEN, address),
                None => line.clone(),
            };
            script.push_str(&line);
            script.push('\n');
        }

        let mut args = vec![OsString::from("csdict")];
        if self.debug {
            args.push(OsString::from("-d"));
        }
        let loader = StaticConfigLoader::new(Config {
            connect_timeout_secs: 2,
            read_timeout_secs: 2,
            ..Config::default()
        });
        let mut stdin = Cursor::new(script.into_bytes());
        self.stdout.clear();
        self.stderr.clear();
        let mut io = IoStreams::new(&mut stdin, &mut self.stdout, &mut self.stderr);
        self.exit_code = Some(run_with_loader(args, &mut io, &loader));

        if let Some(server) = self.server.as_mut() {
            self.requests = server.take_requests().context("collect server requests")?;
        }
        Ok(())
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    pub fn requests(&self) -> &[String] {
        &self.requests
    }

    pub fn assert_success(&self) -> Result<()> {
        match self.exit_code {
            Some(code) if code == ExitCode::SUCCESS => Ok(()),
            Some(code) => Err(anyhow!(
                "expected success, got {code:?}; stderr: {}",
                self.stderr_text()
            )),
            None => Err(anyhow!("the client has not been run")),
        }
    }
}

#[fixture]
pub(in crate::tests) fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}
