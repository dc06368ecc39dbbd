use crate::domain::Rules;
use crate::domain::tuning::Difficulty;
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::{ClientMessage, FrameDto, ServerMessage, WelcomeDto};
use crate::interface_adapters::state::{AppState, SessionDefaults};
use crate::use_cases::{ControlScheme, Engine, SessionCommand, SessionOutput, world_task};

use axum::{
    Error, Json,
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{Notify, mpsc};
use tracing::{Instrument, Span, debug, error, info, info_span, warn};
use uuid::Uuid;

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const INPUT_CHANNEL_CAPACITY: usize = 256;
// A slow client drops frames instead of stalling its session.
const OUTPUT_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    Ws(axum::Error),
    Serialization(serde_json::Error),
    InputClosed,
    SessionEnded,
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Ws(e) => write!(f, "websocket error: {e}"),
            NetError::Serialization(e) => write!(f, "serialization error: {e}"),
            NetError::InputClosed => write!(f, "session input channel closed"),
            NetError::SessionEnded => write!(f, "session loop ended"),
        }
    }
}

impl std::error::Error for NetError {}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct SessionQuery {
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    controls: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct SessionSettings {
    difficulty: Difficulty,
    controls: ControlScheme,
    seed: u64,
}

fn session_settings(
    defaults: &SessionDefaults,
    query: SessionQuery,
) -> Result<SessionSettings, String> {
    let difficulty = match query.difficulty.as_deref() {
        Some(value) => value.parse()?,
        None => defaults.difficulty,
    };
    let controls = match query.controls.as_deref() {
        Some(value) => value.parse()?,
        None => defaults.controls,
    };
    let seed = query
        .seed
        .or(defaults.seed)
        .unwrap_or_else(rand::random::<u64>);
    Ok(SessionSettings {
        difficulty,
        controls,
        seed,
    })
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> impl IntoResponse {
    let settings = match session_settings(&state.defaults, query) {
        Ok(settings) => settings,
        Err(error) => {
            // Keep bad-request responses consistent with the JSON error schema.
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, settings))
}

async fn handle_socket(socket: WebSocket, app: Arc<AppState>, settings: SessionSettings) {
    let session_id = Uuid::new_v4();
    let span = info_span!("session", %session_id, difficulty = %settings.difficulty);
    run_session(socket, app, settings, session_id)
        .instrument(span)
        .await
}

async fn run_session(
    mut socket: WebSocket,
    app: Arc<AppState>,
    settings: SessionSettings,
    session_id: Uuid,
) {
    let rules = Rules::new(app.tuning.as_ref().clone(), settings.difficulty);
    let engine = Engine::new(rules, settings.controls, settings.seed, app.clock.now());

    let (input_tx, input_rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
    let (output_tx, output_rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
    let shutdown = Arc::new(Notify::new());
    let session = tokio::spawn(
        world_task(
            engine,
            input_rx,
            output_tx,
            app.clock.clone(),
            app.defaults.tick_interval,
            shutdown.clone(),
        )
        .instrument(Span::current()),
    );

    let mut ctx = ConnCtx::new(input_tx, output_rx);

    let welcome = ServerMessage::Welcome(WelcomeDto {
        session_id: session_id.to_string(),
        difficulty: settings.difficulty,
        controls: settings.controls,
    });
    match send_message(&mut socket, &welcome).await {
        Ok(bytes) => ctx.record_out(bytes),
        Err(e) => {
            warn!(error = %e, "failed to send welcome");
            shutdown.notify_one();
            return;
        }
    }
    info!(controls = %settings.controls, seed = settings.seed, "client connected");

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = %e, "client loop exited with error");
    }

    // Stop the session loop before reporting; it owns the match.
    shutdown.notify_one();
    if let Err(e) = session.await {
        error!(error = %e, "session task failed");
    }
    disconnect_cleanup(&ctx);
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

struct ConnCtx {
    pub input_tx: mpsc::Sender<SessionCommand>,
    pub output_rx: mpsc::Receiver<SessionOutput>,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub frames_out: u64,

    pub invalid_json: u32,

    pub last_input_full_log: Instant,
    pub last_invalid_input_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

impl ConnCtx {
    fn new(
        input_tx: mpsc::Sender<SessionCommand>,
        output_rx: mpsc::Receiver<SessionOutput>,
    ) -> Self {
        let now = Instant::now() - LOG_THROTTLE;
        Self {
            input_tx,
            output_rx,
            msgs_in: 0,
            msgs_out: 0,
            bytes_in: 0,
            bytes_out: 0,
            frames_out: 0,
            invalid_json: 0,
            last_input_full_log: now,
            last_invalid_input_log: now,
            close_frame: None,
        }
    }

    fn record_out(&mut self, bytes: usize) {
        self.msgs_out += 1;
        self.bytes_out += bytes as u64;
    }
}

enum LoopControl {
    Continue,
    Disconnect,
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    // Split borrows so `tokio::select!` can hold them concurrently.
    let ConnCtx {
        input_tx,
        output_rx,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        frames_out,
        invalid_json,
        last_input_full_log,
        last_invalid_input_log,
        close_frame,
    } = ctx;

    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            // Incoming Message from Client
            incoming = socket.recv() => {
                match handle_incoming_ws(
                    incoming,
                    input_tx,
                    msgs_in,
                    bytes_in,
                    invalid_json,
                    last_input_full_log,
                    last_invalid_input_log,
                    close_frame,
                ) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Outgoing frame or cue from the session loop
            output = output_rx.recv() => {
                match output {
                    Some(output) => {
                        match forward_output(output, socket, msgs_out, bytes_out, frames_out).await {
                            LoopControl::Continue => false,
                            LoopControl::Disconnect => true,
                        }
                    }
                    None => {
                        *close_frame = Some(CloseFrame {
                            code: close_code::ERROR,
                            reason: "session ended".into(),
                        });
                        fatal = Some(NetError::SessionEnded);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = %err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    input_tx: &mpsc::Sender<SessionCommand>,
    msgs_in: &mut u64,
    bytes_in: &mut u64,
    invalid_json: &mut u32,
    last_input_full_log: &mut Instant,
    last_invalid_input_log: &mut Instant,
    close_frame: &mut Option<CloseFrame>,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                *msgs_in += 1;
                *bytes_in += text.len() as u64;

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => forward_command(input_tx, message.into(), last_input_full_log),
                    Err(parse_err) => {
                        *invalid_json += 1;
                        if should_log(last_invalid_input_log) {
                            warn!(
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if *invalid_json > MAX_INVALID_JSON {
                            *close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return Ok(LoopControl::Disconnect);
                        }

                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                *close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!("websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

fn forward_command(
    input_tx: &mpsc::Sender<SessionCommand>,
    command: SessionCommand,
    last_input_full_log: &mut Instant,
) -> Result<LoopControl, NetError> {
    match input_tx.try_send(command) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_)) => {
            if should_log(last_input_full_log) {
                warn!("session input queue full; dropping command");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_)) => Err(NetError::InputClosed),
    }
}

async fn forward_output(
    output: SessionOutput,
    socket: &mut WebSocket,
    msgs_out: &mut u64,
    bytes_out: &mut u64,
    frames_out: &mut u64,
) -> LoopControl {
    let is_frame = matches!(output, SessionOutput::Frame(_));
    let msg = match output {
        SessionOutput::Frame(frame) => ServerMessage::Frame(Box::new(FrameDto::from(*frame))),
        SessionOutput::Effect(effect) => ServerMessage::Cue(effect),
    };
    match send_message(socket, &msg).await {
        Ok(bytes) => {
            *msgs_out += 1;
            *bytes_out += bytes as u64;
            if is_frame {
                *frames_out += 1;
            }
            LoopControl::Continue
        }
        Err(NetError::Serialization(err)) => {
            error!(error = %err, "failed to serialize session output");
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = %err, "failed to send session output");
            LoopControl::Disconnect
        }
    }
}

fn disconnect_cleanup(ctx: &ConnCtx) {
    debug!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        frames_out = ctx.frames_out,
        invalid_json = ctx.invalid_json,
        "connection stats"
    );
    info!("client disconnected");
}
