use midir::{MidiOutput, MidiOutputConnection};
use thiserror::Error;

use crate::midi::MidiMessage;

/// Client name reported to the MIDI backend.
const CLIENT_NAME: &str = "udp2midi";

/// Destination for decoded messages. Opened once at startup and held
/// for the process lifetime; `send` is not safe for concurrent callers.
pub trait MidiSink {
    fn send(&mut self, message: &MidiMessage) -> Result<(), SinkError>;
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("MIDI init error: {0}")]
    Init(String),
    #[error("no MIDI output port matching '{name}' (available: {available:?})")]
    PortNotFound { name: String, available: Vec<String> },
    #[error("MIDI connect error: {0}")]
    Connect(String),
    #[error("MIDI send error: {0}")]
    Send(String),
}

impl From<midir::InitError> for SinkError {
    fn from(err: midir::InitError) -> Self {
        SinkError::Init(err.to_string())
    }
}

impl From<midir::ConnectError<MidiOutput>> for SinkError {
    fn from(err: midir::ConnectError<MidiOutput>) -> Self {
        SinkError::Connect(err.to_string())
    }
}

impl From<midir::SendError> for SinkError {
    fn from(err: midir::SendError) -> Self {
        SinkError::Send(err.to_string())
    }
}

/// MIDI output port backed by `midir`.
pub struct MidirSink {
    connection: MidiOutputConnection,
    port_name: String,
}

impl MidirSink {
    /// Open the output port whose name contains `name`, matched
    /// case-insensitively against the backend's port list.
    pub fn open(name: &str) -> Result<Self, SinkError> {
        let output = MidiOutput::new(CLIENT_NAME)?;
        let wanted = name.to_lowercase();

        let ports = output.ports();
        let mut available = Vec::with_capacity(ports.len());
        let mut matched = None;
        for port in &ports {
            let port_name = match output.port_name(port) {
                Ok(port_name) => port_name,
                Err(_) => continue,
            };
            if matched.is_none() && port_name.to_lowercase().contains(&wanted) {
                matched = Some((port.clone(), port_name.clone()));
            }
            available.push(port_name);
        }

        let (port, port_name) = matched.ok_or(SinkError::PortNotFound {
            name: name.to_string(),
            available,
        })?;
        let connection = output.connect(&port, CLIENT_NAME)?;
        Ok(Self {
            connection,
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl MidiSink for MidirSink {
    fn send(&mut self, message: &MidiMessage) -> Result<(), SinkError> {
        self.connection.send(message.as_bytes())?;
        Ok(())
    }
}

/// Names of all MIDI output ports visible to the backend.
pub fn list_output_ports() -> Result<Vec<String>, SinkError> {
    let output = MidiOutput::new(CLIENT_NAME)?;
    let mut names = Vec::new();
    for port in output.ports() {
        if let Ok(name) = output.port_name(&port) {
            names.push(name);
        }
    }
    Ok(names)
}
