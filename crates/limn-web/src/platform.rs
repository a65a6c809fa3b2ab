use crate::command::WebCommand;
use crate::config::WebConfig;
use crate::protocol::{decode_event, encode_error, encode_reply, WireReply};
use limn_core::{DepictorRegistry, DispatchOutcome, InboundEvent, KindTable, Platform};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Platform specialised to the web client's command set.
pub type WebPlatform = Platform<WebCommand>;

/// Legacy browser engines that need reduced-compatibility markup.
fn quirks_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"MSIE \d|Trident/\d").expect("static pattern compiles"))
}

/// Detect quirks mode from the client's user agent string.
pub fn detect_quirks(user_agent: &str) -> bool {
    quirks_pattern().is_match(user_agent)
}

/// Create the platform for a newly connected session, negotiating the
/// rendering capabilities once. The quirks flag is immutable afterwards.
pub fn connect(
    kinds: Arc<KindTable>,
    depictors: Arc<DepictorRegistry<WebCommand>>,
    user_agent: &str,
    config: &WebConfig,
) -> WebPlatform {
    let quirks = config
        .quirks_override
        .unwrap_or_else(|| detect_quirks(user_agent));
    debug!(quirks, user_agent, "web session connected");
    Platform::new(kinds, depictors, quirks).with_outbound_limit(config.outbound_limit)
}

/// Serve one client request: decode the event, dispatch it, run a render
/// cycle if any object went stale, and encode the reply.
///
/// Rejections are reported in-band and never terminate the session. Ping is
/// pure liveness and skips the outbound drain; poll and control requests
/// flush queued commands.
pub fn handle_request(platform: &mut WebPlatform, body: &str) -> String {
    let event = match decode_event(body) {
        Ok(event) => event,
        Err(e) => return encode_error(&e),
    };
    let is_ping = matches!(event, InboundEvent::Ping(_));

    let outcome = platform.dispatch(event);
    let mut reply = WireReply::default();
    if let DispatchOutcome::Rejected { reason } = &outcome {
        reply.error = Some(reason.to_string());
    }

    if platform.has_stale() {
        match platform.run_cycle() {
            Ok(out) => {
                if !out.markup.is_empty() {
                    reply.markup = Some(out.markup);
                }
            }
            Err(e) => {
                // Context is force-released so the next request starts clean.
                platform.abort_cycle();
                reply.error = Some(e.to_string());
            }
        }
    }

    if !is_ping {
        reply.commands = platform.take_outbound();
    }
    encode_reply(&reply)
}
