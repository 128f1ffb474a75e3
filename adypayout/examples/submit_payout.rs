//! Submits a payout against a stored detail
//!
//! Usage:
//! ```bash
//! cargo run --example submit_payout -- params.json
//! ```
//!
//! The parameter file may be YAML or JSON (chosen by extension).

use adyconfig::Config;
use adypayout::{PayoutService, PayoutSettings};
use adysoap::{GatewayResponse, Params, UreqTransport};
use anyhow::Context;

fn load_params(path: &str) -> anyhow::Result<Params> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    let params = if path.ends_with(".json") {
        Params::from_json(&serde_json::from_str(&text)?)?
    } else {
        Params::from_yaml(&serde_yaml::from_str(&text)?)?
    };
    Ok(params)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: submit_payout <params.yaml|params.json>")?;
    let params = load_params(&path)?;

    let config = Config::load_config("")?;
    let settings = PayoutSettings::from_config(&config)?;
    let transport = UreqTransport::new(settings.timeout);
    let service = PayoutService::new(settings, params, transport);

    println!("Submitting payout to {}", service.endpoint());
    let response = service.submit()?;

    if response.success() {
        println!("Payout received, psp reference {}", response.psp_reference());
    } else if response.server_error() {
        println!("Gateway error: {}", response.error(None).message);
    } else {
        println!("Payout refused: {}", response.error(None));
        println!("  result code:    {}", response.result_code());
        println!("  refusal reason: {}", response.refusal_reason());
    }

    Ok(())
}
