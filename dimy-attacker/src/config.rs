//! Sniffer CLI configuration, grounded on
//! `examples/original_source/Attacker.py`'s hardcoded `locations` list, made
//! configurable here instead of compiled in.

use clap::Parser;

/// Passively sniffs UDP broadcast shares at every given port and correlates
/// them back to synthetic node identities by source address and by hash.
#[derive(Debug, Parser)]
#[command(name = "dimy-attacker", version, about)]
pub struct AttackerConfig {
    /// Ports to sniff at, comma-separated (one socket per port).
    #[arg(
        long,
        env = "DIMY_ATTACKER_PORTS",
        value_delimiter = ',',
        default_value = "50050,50100,60060"
    )]
    pub ports: Vec<u16>,
}
