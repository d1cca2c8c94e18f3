use framehost_codec::deserialize_message;
use framehost_host::HostConfig;
use serde::Serialize;
use serde_json::Value;

use crate::cmd::ReplayArgs;
use crate::exit::{host_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::output::{payload_preview, print_json, print_raw, table, OutputFormat};
use crate::scenario::{Scenario, SimPage};

#[derive(Serialize)]
struct OutboundMessage {
    window: String,
    origin: String,
    #[serde(rename = "type")]
    kind: String,
    sentinel: Option<String>,
    payload: Value,
    #[serde(skip)]
    wire: String,
}

#[derive(Serialize)]
struct ReplaySummary {
    schema_id: &'static str,
    queued: usize,
    processed: usize,
    accepted: usize,
    replay_failed: usize,
    subscriptions: usize,
    position_updates: usize,
    outbound: usize,
}

pub fn run(args: ReplayArgs, format: OutputFormat) -> CliResult<i32> {
    if args.max_depth == 0 {
        return Err(CliError::new(USAGE, "--max-depth must be at least 1"));
    }
    let config = HostConfig {
        max_ancestry_depth: args.max_depth,
        max_message_len: args.max_message_len,
    };

    let mut sim = Scenario::from_path(&args.scenario)?.build()?;
    let (outbound, summary) = replay(&mut sim, config)?;
    tracing::info!(
        processed = summary.processed,
        accepted = summary.accepted,
        outbound = summary.outbound,
        "replay complete"
    );

    print_replay(&outbound, &summary, format);
    Ok(SUCCESS)
}

fn replay(
    sim: &mut SimPage,
    config: HostConfig,
) -> CliResult<(Vec<OutboundMessage>, ReplaySummary)> {
    let report = sim
        .page
        .install_host(
            Box::new(sim.position.clone()),
            Box::new(sim.overlay.clone()),
            config,
        )
        .map_err(|err| host_error("install host", err))?;

    let live = std::mem::take(&mut sim.live);
    let live_count = live.len();
    let mut accepted = report.accepted;
    for event in live {
        if sim.page.deliver(event) {
            accepted += 1;
        }
    }
    let completed = sim.overlay.complete_all();
    tracing::debug!(completed, "overlay transitions completed");

    for (frame, window, rect) in &sim.updates {
        frame.set_rect(*rect);
        sim.position.notify(*window);
    }
    let host = sim
        .page
        .host_mut()
        .ok_or_else(|| CliError::new(INTERNAL, "messaging host missing after install"))?;
    let position_updates = host
        .flush_position_updates()
        .map_err(|err| host_error("forward position updates", err))?;
    let subscriptions = host.subscription_count();

    let outbound = sim
        .tree
        .posted()
        .into_iter()
        .map(|msg| {
            let envelope = deserialize_message(&msg.data)
                .map_err(|err| CliError::new(INTERNAL, format!("decode outbound: {err}")))?;
            Ok(OutboundMessage {
                window: sim.window_name(msg.window),
                origin: msg.origin,
                sentinel: envelope.sentinel().map(str::to_owned),
                kind: envelope.kind,
                payload: Value::Object(envelope.data),
                wire: msg.data,
            })
        })
        .collect::<CliResult<Vec<_>>>()?;

    let summary = ReplaySummary {
        schema_id: "https://schemas.3leaps.dev/framehost/cli/v1/replay-summary.schema.json",
        queued: report.replayed,
        processed: report.replayed + live_count,
        accepted,
        replay_failed: report.failed,
        subscriptions,
        position_updates,
        outbound: outbound.len(),
    };
    Ok((outbound, summary))
}

fn print_replay(outbound: &[OutboundMessage], summary: &ReplaySummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for msg in outbound {
                print_json(msg);
            }
            print_json(summary);
        }
        OutputFormat::Table => {
            let mut messages = table(vec!["WINDOW", "ORIGIN", "TYPE", "SENTINEL", "PAYLOAD"]);
            for msg in outbound {
                messages.add_row(vec![
                    msg.window.clone(),
                    msg.origin.clone(),
                    msg.kind.clone(),
                    msg.sentinel.clone().unwrap_or_else(|| "-".to_string()),
                    payload_preview(&msg.payload),
                ]);
            }
            println!("{messages}");

            let mut totals = table(vec![
                "PROCESSED",
                "ACCEPTED",
                "FAILED",
                "SUBSCRIPTIONS",
                "OUTBOUND",
            ]);
            totals.add_row(vec![
                summary.processed.to_string(),
                summary.accepted.to_string(),
                summary.replay_failed.to_string(),
                summary.subscriptions.to_string(),
                summary.outbound.to_string(),
            ]);
            println!("{totals}");
        }
        OutputFormat::Pretty => {
            for msg in outbound {
                println!(
                    "-> {} [{}] {} sentinel={} {}",
                    msg.window,
                    msg.origin,
                    msg.kind,
                    msg.sentinel.as_deref().unwrap_or("-"),
                    payload_preview(&msg.payload)
                );
            }
            println!(
                "processed={} accepted={} failed={} subscriptions={} outbound={}",
                summary.processed,
                summary.accepted,
                summary.replay_failed,
                summary.subscriptions,
                summary.outbound
            );
        }
        OutputFormat::Raw => {
            for msg in outbound {
                print_raw(&msg.wire);
            }
        }
    }
}
