//! Fake DICT server for behavioural tests.
//!
//! Accepts a fixed sequence of connections on an ephemeral TCP port. Each
//! connection sends its greeting, then answers one request per scripted step
//! and records every request line it receives, including the trailing `QUIT`.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};

const ACCEPT_DEADLINE: Duration = Duration::from_secs(2);
const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// What the server does after reading one request.
#[derive(Debug, Clone)]
pub(in crate::tests) enum Step {
    Reply(Vec<String>),
    /// Closes the connection without answering.
    Hangup,
}

#[derive(Debug, Clone)]
pub(in crate::tests) struct ConnectionScript {
    greeting: String,
    steps: Vec<Step>,
}

impl ConnectionScript {
    pub fn greeting(greeting: &str) -> Self {
        Self {
            greeting: greeting.to_owned(),
            steps: Vec::new(),
        }
    }

    pub fn reply(mut self, lines: &[&str]) -> Self {
        self.steps
            .push(Step::Reply(lines.iter().map(|line| (*line).to_owned()).collect()));
        self
    }

    pub fn hangup(mut self) -> Self {
        self.steps.push(Step::Hangup);
        self
    }
}

pub(in crate::tests) struct FakeDictServer {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
    result: Arc<Mutex<Option<Result<()>>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FakeDictServer {
    /// Spawns a server that serves `scripts` to successive connections.
    pub fn spawn(scripts: Vec<ConnectionScript>) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind fake server")?;
        listener
            .set_nonblocking(true)
            .context("fake server nonblocking")?;
        let port = listener.local_addr().context("local addr")?.port();
        let requests: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let result: Arc<Mutex<Option<Result<()>>>> = Arc::new(Mutex::new(None));
        let requests_clone = Arc::clone(&requests);
        let result_clone = Arc::clone(&result);
        let handle = thread::spawn(move || {
            let outcome = Self::serve(&listener, scripts, &requests_clone);
            if let Ok(mut guard) = result_clone.lock() {
                *guard = Some(outcome);
            }
        });
        Ok(Self {
            port,
            requests,
            result,
            handle: Some(handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the server thread and returns every recorded request line.
    pub fn take_requests(&mut self) -> Result<Vec<String>> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("fake server thread panicked"))?;
        }
        if let Some(outcome) = self
            .result
            .lock()
            .map_err(|error| anyhow!("lock fake server result: {error}"))?
            .take()
        {
            outcome.context("fake server failed")?;
        }
        let requests = self
            .requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?;
        Ok(requests.clone())
    }

    fn serve(
        listener: &TcpListener,
        scripts: Vec<ConnectionScript>,
        requests: &Arc<Mutex<Vec<String>>>,
    ) -> Result<()> {
        for script in scripts {
            let Some(stream) = Self::accept(listener)? else {
                // The client never connected; leave quietly so the test
                // reports its own failure instead of hanging here.
                return Ok(());
            };
            Self::serve_connection(stream, &script, requests)?;
        }
        Ok(())
    }

    fn accept(listener: &TcpListener) -> Result<Option<TcpStream>> {
        let deadline = Instant::now() + ACCEPT_DEADLINE;
        loop {
            match listener.accept() {
                Ok((stream, _)) => {
                    stream.set_nonblocking(false).context("blocking stream")?;
                    stream
                        .set_read_timeout(Some(READ_TIMEOUT))
                        .context("stream read timeout")?;
                    return Ok(Some(stream));
                }
                Err(ref error)
                    if error.kind() == io::ErrorKind::WouldBlock && Instant::now() < deadline =>
                {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(ref error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(error) => return Err(error).context("accept connection"),
            }
        }
    }

    fn serve_connection(
        mut stream: TcpStream,
        script: &ConnectionScript,
        requests: &Arc<Mutex<Vec<String>>>,
    ) -> Result<()> {
        let mut reader = BufReader::new(stream.try_clone().context("clone stream")?);
        write_line(&mut stream, &script.greeting)?;
        for step in &script.steps {
            if !Self::record_request(&mut reader, requests)? {
                return Ok(());
            }
            match step {
                Step::Reply(lines) => {
                    for line in lines {
                        write_line(&mut stream, line)?;
                    }
                }
                Step::Hangup => return Ok(()),
            }
        }
        while Self::record_request(&mut reader, requests)? {}
        Ok(())
    }

    /// Reads one request line; returns `false` once the client has gone.
    fn record_request(
        reader: &mut BufReader<TcpStream>,
        requests: &Arc<Mutex<Vec<String>>>,
    ) -> Result<bool> {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => return Ok(false),
            Ok(_) => {}
            Err(error) if error.kind() == io::ErrorKind::ConnectionReset => return Ok(false),
            Err(error) => return Err(error).context("read request"),
        }
        let mut guard = requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?;
        guard.push(line.trim_end_matches(['\r', '\n']).to_owned());
        Ok(true)
    }
}

fn write_line(stream: &mut TcpStream, line: &str) -> Result<()> {
    stream
        .write_all(format!("{line}\r\n").as_bytes())
        .context("write response line")
}
