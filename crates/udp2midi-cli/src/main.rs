use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::level_filters::LevelFilter;

use udp2midi_core::{
    Config, DEFAULT_BUFFER_SIZE, DEFAULT_MIDI_PORT_NAME, DEFAULT_UDP_PORT, MidirSink,
    UdpDatagramSource, decode_records, list_output_ports, run_bridge,
};

#[derive(Parser, Debug)]
#[command(name = "udp2midi")]
#[command(version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("UDP2MIDI_BUILD_COMMIT"),
    ")"
))]
#[command(
    about = "Bridge raw MIDI bytes from UDP datagrams to a MIDI output port.",
    long_about = None,
    after_help = "Examples:\n  udp2midi run --port 8321 --midi-port f_midi\n  udp2midi ports\n  udp2midi decode 903C7F0000C105 --pretty"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Listen for UDP datagrams and forward decoded MIDI messages.
    Run {
        /// UDP port to listen on (all interfaces)
        #[arg(short = 'p', long, default_value_t = DEFAULT_UDP_PORT)]
        port: u16,

        /// Receive buffer size in bytes; longer payloads are truncated
        #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
        buffer_size: usize,

        /// MIDI output port name (substring match, case-insensitive)
        #[arg(short = 'm', long, default_value = DEFAULT_MIDI_PORT_NAME)]
        midi_port: String,

        /// Suppress per-byte skip/incomplete diagnostics
        #[arg(short = 'q', long)]
        quiet: bool,
    },

    /// List available MIDI output ports.
    Ports,

    /// Decode a hex-encoded payload offline and print the events as JSON.
    Decode {
        /// Payload as hex digits, e.g. 903C7F0000C105
        payload: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            port,
            buffer_size,
            midi_port,
            quiet,
        } => cmd_run(port, buffer_size, &midi_port, quiet),
        Commands::Ports => cmd_ports(),
        Commands::Decode { payload, pretty } => cmd_decode(&payload, pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

fn cmd_run(port: u16, buffer_size: usize, midi_port: &str, quiet: bool) -> Result<(), CliError> {
    let config = Config {
        udp_port: port,
        buffer_size,
        midi_port_name: midi_port.to_string(),
        verbose: !quiet,
    };
    init_logging(config.verbose);

    if config.buffer_size == 0 {
        return Err(CliError::new(
            "buffer size must be at least 1 byte",
            Some("pass --buffer-size with a positive value".to_string()),
        ));
    }

    // Opening the MIDI port comes first: without a sink there is nothing
    // to bridge, so a failure here aborts before the socket is bound.
    let mut sink = MidirSink::open(&config.midi_port_name).map_err(|err| {
        CliError::new(
            format!("could not open MIDI port '{}': {err}", config.midi_port_name),
            Some("run `udp2midi ports` to list available ports".to_string()),
        )
    })?;

    let mut source = UdpDatagramSource::bind(config.udp_port, config.buffer_size).map_err(|err| {
        CliError::new(
            format!("could not bind UDP port {}: {err}", config.udp_port),
            None,
        )
    })?;

    info!(
        "listening on UDP port {}, forwarding to MIDI port '{}'",
        config.udp_port,
        sink.port_name()
    );

    let stats = run_bridge(&mut source, &mut sink, config.verbose)
        .context("bridge loop failed")
        .map_err(CliError::from)?;

    // Reached only when the source reports exhaustion, which a live UDP
    // socket never does.
    info!(
        "bridge finished: {} datagrams, {} messages forwarded",
        stats.datagrams, stats.forwarded
    );
    Ok(())
}

fn cmd_ports() -> Result<(), CliError> {
    let ports = list_output_ports()
        .map_err(|err| CliError::new(format!("could not list MIDI ports: {err}"), None))?;
    if ports.is_empty() {
        eprintln!("no MIDI output ports available");
        return Ok(());
    }
    for name in ports {
        println!("{name}");
    }
    Ok(())
}

fn cmd_decode(payload: &str, pretty: bool) -> Result<(), CliError> {
    let bytes = parse_hex(payload)?;
    let records = decode_records(&bytes);
    let json = if pretty {
        serde_json::to_string_pretty(&records)
    } else {
        serde_json::to_string(&records)
    };
    let json = json
        .context("JSON serialization failed")
        .map_err(CliError::from)?;
    println!("{json}");
    Ok(())
}

fn parse_hex(input: &str) -> Result<Vec<u8>, CliError> {
    let digits: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(bad) = digits.iter().find(|c| !c.is_ascii_hexdigit()) {
        return Err(CliError::new(
            format!("invalid hex digit '{bad}' in '{input}'"),
            Some("payload must be hex digits only, e.g. 903C7F".to_string()),
        ));
    }
    if digits.len() % 2 != 0 {
        return Err(CliError::new(
            format!("odd number of hex digits in '{input}'"),
            Some("each byte needs two hex digits, e.g. 903C7F".to_string()),
        ));
    }
    Ok(digits
        .chunks(2)
        .map(|pair| {
            let high = pair[0].to_digit(16).unwrap_or(0) as u8;
            let low = pair[1].to_digit(16).unwrap_or(0) as u8;
            (high << 4) | low
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::parse_hex;

    #[test]
    fn parse_hex_accepts_spaced_input() {
        assert_eq!(
            parse_hex("90 3C 7F").expect("hex"),
            vec![0x90, 0x3C, 0x7F]
        );
    }

    #[test]
    fn parse_hex_rejects_odd_length() {
        let err = parse_hex("90C").unwrap_err();
        assert!(err.message.contains("odd number"));
    }

    #[test]
    fn parse_hex_rejects_non_hex() {
        let err = parse_hex("90ZZ").unwrap_err();
        assert!(err.message.contains("invalid hex digit"));
    }
}
