//! Encode and decode commands

use anyhow::{anyhow, bail, Result};
use clap::Args;
use rpcwire_codec::{CodecConfig, Decoder, Encoder, Envelope};
use rpcwire_schema::Registry;
use serde_json::{json, Value as JsonValue};
use std::path::PathBuf;
use tracing::debug;

use crate::cli::error::HelpfulError;
use crate::cli::json::{value_from_json, value_to_json};
use crate::cli::load;

/// Arguments for the `encode` command
#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// Interface document that declares the named types
    #[arg(long)]
    pub interface: Option<PathBuf>,

    /// Imported interface documents, one per flag
    #[arg(long = "import", value_name = "PATH")]
    pub imports: Vec<PathBuf>,

    /// Type expression in JSON form, e.g. '{"type": "u32"}'
    #[arg(long = "type", value_name = "TYPE", required_unless_present = "method", conflicts_with = "method")]
    pub ty: Option<String>,

    /// Encode a call envelope for this function; --value is the JSON array of arguments
    #[arg(long, requires = "interface")]
    pub method: Option<String>,

    /// Value in JSON form
    #[arg(long)]
    pub value: String,
}

/// Arguments for the `decode` command
#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Interface document that declares the named types
    #[arg(long)]
    pub interface: Option<PathBuf>,

    /// Imported interface documents, one per flag
    #[arg(long = "import", value_name = "PATH")]
    pub imports: Vec<PathBuf>,

    /// Type expression in JSON form, e.g. '{"type": "u32"}'
    #[arg(long = "type", value_name = "TYPE", required_unless_present = "call", conflicts_with = "call")]
    pub ty: Option<String>,

    /// Decode a call envelope against the interface's functions
    #[arg(long, requires = "interface")]
    pub call: bool,

    /// Encoded bytes as hex, `0x` prefix optional
    #[arg(long)]
    pub hex: String,
}

pub fn run_encode(args: EncodeArgs) -> Result<()> {
    println!("{}", encode(&args)?);
    Ok(())
}

pub fn run_decode(args: DecodeArgs, config: CodecConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&decode(&args, config)?)?);
    Ok(())
}

fn encode(args: &EncodeArgs) -> Result<String> {
    let registry = load::load_registry(args.interface.as_deref(), &args.imports)?;
    let json: JsonValue = serde_json::from_str(&args.value)
        .map_err(|e| anyhow!("--value is not valid JSON: {}", e))?;

    let bytes = match (&args.ty, &args.method) {
        (Some(ty), _) => {
            let ty = load::parse_type(ty)?;
            let value = value_from_json(&registry, &ty, &json)?;
            Encoder::new(&registry).try_encode(&ty, &value)?
        }
        (None, Some(method)) => encode_call(&registry, method, &json)?,
        (None, None) => bail!("Either --type or --method is required"),
    };
    debug!(len = bytes.len(), "Encoded value");
    Ok(hex::encode(bytes))
}

fn encode_call(registry: &Registry, method: &str, json: &JsonValue) -> Result<Vec<u8>> {
    let function = registry
        .function(method)
        .ok_or_else(|| anyhow!("Unknown method '{}' in interface '{}'", method, registry.name()))?;
    let Some(items) = json.as_array() else {
        bail!("Arguments for '{}' must be a JSON array", method);
    };
    if items.len() != function.inputs.len() {
        bail!(
            "'{}' takes {} argument(s), got {}",
            method,
            function.inputs.len(),
            items.len()
        );
    }

    let args = function
        .inputs
        .iter()
        .zip(items)
        .map(|(input, item)| value_from_json(registry, &input.ty, item))
        .collect::<Result<Vec<_>>>()?;
    Ok(Envelope::new(registry).encode_call(method, &args)?)
}

fn decode(args: &DecodeArgs, config: CodecConfig) -> Result<JsonValue> {
    let registry = load::load_registry(args.interface.as_deref(), &args.imports)?;
    let bytes = parse_hex(&args.hex)?;

    if args.call {
        let call = Envelope::with_config(&registry, config).decode_call(&bytes)?;
        return Ok(json!({
            "method": call.method,
            "args": call.args.iter().map(value_to_json).collect::<Vec<_>>(),
        }));
    }

    let Some(ty) = &args.ty else {
        bail!("Either --type or --call is required");
    };
    let ty = load::parse_type(ty)?;
    let value = Decoder::with_config(&registry, config).decode(&ty, &bytes)?;
    Ok(value_to_json(&value))
}

fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = digits.strip_prefix("0x").unwrap_or(&digits);
    hex::decode(digits).map_err(|e| HelpfulError::invalid_hex(&e.to_string()).into())
}
