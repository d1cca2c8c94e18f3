use framehost_codec::{deserialize_message, Envelope};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::cmd::DecodeArgs;
use crate::exit::{codec_error, CliResult, SUCCESS};
use crate::output::{payload_preview, print_json, print_raw, table, OutputFormat};

#[derive(Serialize)]
struct DecodeOutput<'a> {
    schema_id: &'static str,
    #[serde(rename = "type")]
    kind: &'a str,
    known: bool,
    sentinel: Option<&'a str>,
    payload: Value,
}

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let envelope = deserialize_message(&args.wire).map_err(|err| codec_error("decode", err))?;
    print_envelope(&envelope, format);
    Ok(SUCCESS)
}

fn print_envelope(envelope: &Envelope, format: OutputFormat) {
    let out = DecodeOutput {
        schema_id: "https://schemas.3leaps.dev/framehost/cli/v1/envelope.schema.json",
        kind: &envelope.kind,
        known: envelope.message_type().is_some(),
        sentinel: envelope.sentinel(),
        payload: Value::Object(envelope.data.clone()),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut t = table(vec!["FIELD", "VALUE"]);
            t.add_row(vec!["type".to_string(), out.kind.to_string()]);
            t.add_row(vec!["known".to_string(), out.known.to_string()]);
            t.add_row(vec![
                "sentinel".to_string(),
                out.sentinel.unwrap_or("-").to_string(),
            ]);
            for (key, value) in &envelope.data {
                t.add_row(vec![key.clone(), value.to_string()]);
            }
            println!("{t}");
        }
        OutputFormat::Pretty => {
            println!(
                "type={}{} sentinel={} payload={}",
                out.kind,
                if out.known { "" } else { " (unknown)" },
                out.sentinel.unwrap_or("-"),
                payload_preview(&out.payload)
            );
        }
        OutputFormat::Raw => {
            let mut body = Map::new();
            body.insert("type".to_string(), Value::String(envelope.kind.clone()));
            if let Some(sentinel) = out.sentinel {
                body.insert("sentinel".to_string(), Value::String(sentinel.to_string()));
            }
            body.extend(envelope.data.clone());
            print_raw(&Value::Object(body).to_string());
        }
    }
}
