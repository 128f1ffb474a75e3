//! Stores a shopper's bank details for later payouts
//!
//! Parameters are read from a YAML file (see `tests/fixtures/store_detail_params.yaml`),
//! credentials and merchant account from the gateway configuration.
//!
//! Usage:
//! ```bash
//! cargo run --example store_detail -- params.yaml
//! ```

use adyconfig::Config;
use adypayout::{PayoutService, PayoutSettings};
use adysoap::{GatewayResponse, Params, UreqTransport};
use anyhow::Context;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: store_detail <params.yaml>")?;
    let yaml: serde_yaml::Value = serde_yaml::from_str(&std::fs::read_to_string(&path)?)?;
    let params = Params::from_yaml(&yaml)?;

    let config = Config::load_config("")?;
    let settings = PayoutSettings::from_config(&config)?;
    let transport = UreqTransport::new(settings.timeout);

    let response = PayoutService::new(settings, params, transport).store_detail()?;

    if response.detail_stored() {
        println!("Detail stored");
        println!("  psp reference:              {}", response.psp_reference());
        println!("  recurring detail reference: {}", response.recurring_detail_reference());
    } else {
        let error = response.error(None);
        println!("Detail not stored: {}", error);
        if !response.refusal_reason().is_empty() {
            println!("  refusal reason: {}", response.refusal_reason());
        }
    }

    Ok(())
}
