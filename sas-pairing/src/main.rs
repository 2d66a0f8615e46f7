use std::io::{self, Write};

use clap::{Parser, ValueEnum};
use futures::executor::block_on;
use sas_pairing::{
    commit::{HashCommitment, IdealCommitment},
    pair,
    pin::DEFAULT_PIN_LENGTH,
    Pin, SasConfig, SasError,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scheme {
    /// Ideal commitment functionality.
    Ideal,
    /// Salted blake3 commitment.
    Hash,
}

/// Runs one SAS pairing between two local parties and prints the initiator's
/// and the responder's pin.
#[derive(Debug, Parser)]
#[clap(name = "sas-pairing", version)]
struct Args {
    /// The initiator's message.
    #[clap(long, default_value = "AlicePublicKey")]
    initiator_message: String,
    /// The responder's message.
    #[clap(long, default_value = "BobPublicKey")]
    responder_message: String,
    /// Number of digits in the pin.
    #[clap(long, default_value_t = DEFAULT_PIN_LENGTH)]
    pin_length: usize,
    /// Commitment scheme.
    #[clap(long, value_enum, default_value = "ideal")]
    commitment: Scheme,
}

fn main() -> Result<(), SasError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let pins = run(Args::parse())?;
    print_pins(&mut io::stdout().lock(), &pins)?;

    Ok(())
}

/// Runs one exchange with the parsed arguments.
fn run(args: Args) -> Result<(Pin, Pin), SasError> {
    let config = SasConfig::builder().pin_length(args.pin_length).build()?;

    match args.commitment {
        Scheme::Ideal => block_on(pair::<IdealCommitment>(
            config,
            args.initiator_message,
            args.responder_message,
        )),
        Scheme::Hash => block_on(pair::<HashCommitment>(
            config,
            args.initiator_message,
            args.responder_message,
        )),
    }
}

/// Writes the initiator's pin, then the responder's pin, one per line.
fn print_pins(
    out: &mut impl Write,
    (initiator_pin, responder_pin): &(Pin, Pin),
) -> io::Result<()> {
    writeln!(out, "{initiator_pin}")?;
    writeln!(out, "{responder_pin}")
}
