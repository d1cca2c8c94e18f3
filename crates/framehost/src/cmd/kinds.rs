use framehost_codec::MessageType;
use serde::Serialize;

use crate::cmd::KindsArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, print_raw, table, OutputFormat};

#[derive(Serialize)]
struct KindInfo {
    name: &'static str,
    request: bool,
    response: Option<&'static str>,
}

#[derive(Serialize)]
struct KindsOutput {
    schema_id: &'static str,
    kinds: Vec<KindInfo>,
}

pub fn run(_args: KindsArgs, format: OutputFormat) -> CliResult<i32> {
    let kinds: Vec<KindInfo> = MessageType::ALL
        .into_iter()
        .map(|kind| KindInfo {
            name: kind.as_str(),
            request: kind.is_request(),
            response: kind.response_type().map(MessageType::as_str),
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&KindsOutput {
            schema_id: "https://schemas.3leaps.dev/framehost/cli/v1/kinds.schema.json",
            kinds,
        }),
        OutputFormat::Table => {
            let mut out = table(vec!["KIND", "DIRECTION", "RESPONSE"]);
            for kind in &kinds {
                out.add_row(vec![
                    kind.name.to_string(),
                    direction(kind.request).to_string(),
                    kind.response.unwrap_or("-").to_string(),
                ]);
            }
            println!("{out}");
        }
        OutputFormat::Pretty => {
            for kind in &kinds {
                match kind.response {
                    Some(response) => {
                        println!("{} ({}) -> {response}", kind.name, direction(kind.request))
                    }
                    None => println!("{} ({})", kind.name, direction(kind.request)),
                }
            }
        }
        OutputFormat::Raw => {
            for kind in &kinds {
                print_raw(kind.name);
            }
        }
    }
    Ok(SUCCESS)
}

fn direction(request: bool) -> &'static str {
    if request {
        "request"
    } else {
        "host-sent"
    }
}
