//! Scripted devices for exercising the session engine without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

use super::ShellChannel;
use crate::driver::SessionConfig;
use crate::error::{ChannelError, TransportError};
use crate::transport::Connector;

/// How a scripted device answers one line.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Print the text, then the prompt.
    Text(String),
    /// Print the text and never return to the prompt.
    Silent(String),
    /// Print each chunk verbatim once its offset from the write has passed.
    Chunks(Vec<(Duration, String)>),
    /// Drop the connection.
    Fault,
}

/// What a device prints and how it answers.
#[derive(Debug, Clone)]
pub struct DeviceScript {
    pub banner: String,
    pub prompt: String,
    pub replies: HashMap<String, Reply>,
    pub connect_delay: Duration,
    /// Output printed this long after login, following the banner.
    pub late_banner: Option<(Duration, String)>,
    /// Whether typed lines are echoed back.
    pub echo: bool,
}

impl DeviceScript {
    pub fn new(banner: &str, prompt: &str) -> Self {
        Self {
            banner: banner.to_string(),
            prompt: prompt.to_string(),
            replies: HashMap::new(),
            connect_delay: Duration::ZERO,
            late_banner: None,
            echo: true,
        }
    }

    pub fn reply(mut self, line: &str, reply: Reply) -> Self {
        self.replies.insert(line.to_string(), reply);
        self
    }

    pub fn text(self, line: &str, text: &str) -> Self {
        self.reply(line, Reply::Text(text.to_string()))
    }

    pub fn connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    pub fn late_banner(mut self, delay: Duration, text: &str) -> Self {
        self.late_banner = Some((delay, text.to_string()));
        self
    }

    pub fn without_echo(mut self) -> Self {
        self.echo = false;
        self
    }
}

/// What happened on one mock shell.
#[derive(Debug, Default)]
pub struct ShellLog {
    sent: Mutex<Vec<String>>,
    closes: AtomicUsize,
}

impl ShellLog {
    /// Lines received from the engine, in order.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

pub struct MockShell {
    script: DeviceScript,
    /// Output and the instant it becomes readable.
    inbox: VecDeque<(Instant, Bytes)>,
    pending: Vec<u8>,
    faulted: bool,
    closed: bool,
    log: Arc<ShellLog>,
}

impl MockShell {
    fn new(script: DeviceScript, log: Arc<ShellLog>) -> Self {
        let now = Instant::now();
        let mut inbox = VecDeque::new();
        let banner = format!("{}\r\n{}", script.banner, script.prompt);
        inbox.push_back((now, Bytes::from(banner)));
        if let Some((delay, text)) = &script.late_banner {
            inbox.push_back((now + *delay, Bytes::from(text.clone())));
        }
        Self {
            script,
            inbox,
            pending: Vec::new(),
            faulted: false,
            closed: false,
            log,
        }
    }

    fn answer(&mut self, line: String) {
        let now = Instant::now();
        let prompt = &self.script.prompt;
        let echo = if self.script.echo {
            format!("{line}\r\n")
        } else {
            String::new()
        };

        match self.script.replies.get(&line) {
            Some(Reply::Text(text)) => {
                let response = format!("{echo}{text}\r\n{prompt}");
                self.inbox.push_back((now, Bytes::from(response)));
            }
            Some(Reply::Silent(text)) => {
                let response = format!("{echo}{text}\r\n");
                self.inbox.push_back((now, Bytes::from(response)));
            }
            Some(Reply::Chunks(chunks)) => {
                for (offset, text) in chunks {
                    self.inbox.push_back((now + *offset, Bytes::from(text.clone())));
                }
            }
            Some(Reply::Fault) => self.faulted = true,
            None => {
                let response = format!("{echo}{prompt}");
                self.inbox.push_back((now, Bytes::from(response)));
            }
        }
        self.log.sent.lock().unwrap().push(line);
    }
}

impl ShellChannel for MockShell {
    async fn read_chunk(&mut self, wait: Duration) -> Result<Option<Bytes>, ChannelError> {
        if self.faulted || self.closed {
            return Err(ChannelError::Closed);
        }

        let now = Instant::now();
        let Some(ready) = self.inbox.front().map(|(ready, _)| *ready) else {
            tokio::time::sleep(wait).await;
            return Ok(None);
        };

        if ready > now {
            tokio::time::sleep_until(ready.min(now + wait)).await;
            if Instant::now() < ready {
                return Ok(None);
            }
        }
        Ok(self.inbox.pop_front().map(|(_, chunk)| chunk))
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        self.pending.extend_from_slice(data);
        while let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            let line = String::from_utf8_lossy(&line).trim_end().to_string();
            self.answer(line);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        if !self.closed {
            self.closed = true;
            self.log.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Hands out scripted shells; unknown hosts are unreachable.
#[derive(Default)]
pub struct MockConnector {
    devices: HashMap<String, DeviceScript>,
    logs: Mutex<HashMap<String, Arc<ShellLog>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device(mut self, host: &str, script: DeviceScript) -> Self {
        self.devices.insert(host.to_string(), script);
        self
    }

    /// The log of the most recent shell opened for `host`.
    pub fn log(&self, host: &str) -> Arc<ShellLog> {
        self.logs.lock().unwrap()[host].clone()
    }
}

impl Connector for MockConnector {
    type Channel = MockShell;

    async fn open(&self, config: &SessionConfig) -> Result<MockShell, TransportError> {
        let Some(script) = self.devices.get(&config.host).cloned() else {
            return Err(TransportError::ConnectionFailed {
                host: config.host.clone(),
                port: config.port,
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "unreachable"),
            });
        };

        tokio::time::sleep(script.connect_delay).await;

        let log = Arc::new(ShellLog::default());
        self.logs
            .lock()
            .unwrap()
            .insert(config.host.clone(), log.clone());
        Ok(MockShell::new(script, log))
    }
}
