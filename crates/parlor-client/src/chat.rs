use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, header::COOKIE};
use tracing::{info, warn};

use parlor_types::events::{Frame, ServerEvent, parse_frame};
use parlor_view::render::format_jst;
use parlor_view::{ChatController, Dialogs, EditMode, FileThemeStore, ThemeStore, UserAction};

use crate::commands::{self, Command};
use crate::config::ClientConfig;

/// Timer resolution for the typing debounce.
const TICK: Duration = Duration::from_millis(250);

/// Terminal stand-in for browser dialogs. Commands are explicit, so
/// confirmations are implied; prompt answers are staged by the command.
#[derive(Debug, Default)]
pub struct TerminalDialogs {
    answer: Option<String>,
}

impl Dialogs for TerminalDialogs {
    fn alert(&mut self, message: &str) {
        eprintln!("! {}", message);
    }

    fn confirm(&mut self, _message: &str) -> bool {
        true
    }

    fn prompt(&mut self, _message: &str, _default: &str) -> Option<String> {
        self.answer.take()
    }
}

type Controller = ChatController<TerminalDialogs, FileThemeStore>;

pub async fn run(config: ClientConfig) -> anyhow::Result<()> {
    let mut request = config.gateway_url.as_str().into_client_request()?;
    if let Some(cookie) = &config.session_cookie {
        request
            .headers_mut()
            .insert(COOKIE, HeaderValue::from_str(cookie)?);
    }

    let (ws, _) = tokio_tungstenite::connect_async(request)
        .await
        .with_context(|| format!("failed to connect to {}", config.gateway_url))?;
    info!(
        "Connected to {} as {} ({})",
        config.gateway_url, config.username, config.user_id
    );
    let (mut sink, mut stream) = ws.split();

    let (tx, mut intents) = mpsc::unbounded_channel();
    let mut controller = ChatController::new(
        config.user_id,
        config.view,
        TerminalDialogs::default(),
        FileThemeStore::new(config.theme_path.clone()),
        tx,
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            frame = stream.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => handle_frame(&mut controller, text.as_str()),
                    Some(Ok(WsMessage::Close(_))) | None => {
                        info!("Gateway closed the connection");
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!("Gateway read error: {}", e);
                        break;
                    }
                }
                snapshot(&controller, config.render_path.as_deref()).await;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match commands::parse(line.trim_end()) {
                    Ok(Command::Quit) => break,
                    Ok(command) => run_command(&mut controller, command).await,
                    Err(e) => eprintln!("{}", e),
                }
                snapshot(&controller, config.render_path.as_deref()).await;
            }
            Some(intent) = intents.recv() => {
                let json = serde_json::to_string(&intent)?;
                sink.send(WsMessage::Text(json.into())).await?;
            }
            _ = ticker.tick() => controller.tick(Instant::now()),
        }
    }

    // Anything still queued, such as a final typing stop
    while let Ok(intent) = intents.try_recv() {
        let json = serde_json::to_string(&intent)?;
        if sink.send(WsMessage::Text(json.into())).await.is_err() {
            break;
        }
    }
    let _ = sink.close().await;
    Ok(())
}

fn handle_frame<D: Dialogs, S: ThemeStore>(controller: &mut ChatController<D, S>, text: &str) {
    match parse_frame(text) {
        Ok(Frame::Event(event)) => {
            if let Some(line) = describe(&event) {
                println!("{}", line);
            }
            controller.reconcile(event);
        }
        Ok(Frame::UploadAck(ack)) => controller.upload_ack(ack),
        Err(e) => warn!("Ignoring malformed frame: {}", e),
    }
}

/// One-line transcript entry for an event, if it deserves one.
fn describe(event: &ServerEvent) -> Option<String> {
    let line = match event {
        ServerEvent::NewMessage(m) => format!(
            "[{}] #{} {}: {}",
            format_jst(&m.timestamp),
            m.id,
            m.username,
            m.content
        ),
        ServerEvent::MessageEdited(m) => format!("#{} {}: {} (edited)", m.id, m.username, m.content),
        ServerEvent::MessageDeleted { message_id } => format!("#{} deleted", message_id),
        ServerEvent::NewFile(f) => format!(
            "[{}] file {} {} shared {} ({})",
            format_jst(&f.upload_time),
            f.id,
            f.username,
            f.original_filename,
            f.file_type.as_str()
        ),
        ServerEvent::FileDeleted { file_id } => format!("file {} deleted", file_id),
        ServerEvent::ReactionUpdated {
            message_id,
            reactions,
        } => {
            let summary: Vec<String> = reactions
                .groups()
                .map(|g| format!("{} {}", g.emoji, g.count()))
                .collect();
            format!("#{} reactions: {}", message_id, summary.join(" "))
        }
        ServerEvent::UserTyping { .. }
        | ServerEvent::UserConnected { .. }
        | ServerEvent::UserDisconnected { .. } => return None,
    };
    Some(line)
}

async fn run_command(controller: &mut Controller, command: Command) {
    let now = Instant::now();
    let result = match command {
        Command::Say(text) => controller
            .dispatch(UserAction::SetInput(text), now)
            .and_then(|_| controller.dispatch(UserAction::Keystroke, now))
            .and_then(|_| controller.dispatch(UserAction::Send, now)),
        Command::Edit(id, text) => match controller.config().edit_mode {
            EditMode::Inline => controller
                .dispatch(UserAction::BeginEdit(id), now)
                .and_then(|_| controller.dispatch(UserAction::EditDraft(id, text), now))
                .and_then(|_| controller.dispatch(UserAction::SaveEdit(id), now)),
            EditMode::Prompt => {
                controller.dialogs_mut().answer = Some(text);
                controller.dispatch(UserAction::BeginEdit(id), now)
            }
        },
        Command::Delete(id) => controller.dispatch(UserAction::DeleteMessage(id), now),
        Command::React(id, emoji) => controller.dispatch(UserAction::ToggleReaction(id, emoji), now),
        Command::Picker(id) => controller.dispatch(UserAction::TogglePicker(id), now),
        Command::Pick(id, emoji) => controller.dispatch(UserAction::PickReaction(id, emoji), now),
        Command::DeleteFile(id) => controller.dispatch(UserAction::DeleteFile(id), now),
        Command::Upload(path) => {
            if let Err(e) = upload(controller, &path, None).await {
                eprintln!("! {:#}", e);
            }
            Ok(())
        }
        Command::Paste(mime, path) => {
            if let Err(e) = upload(controller, &path, Some(&mime)).await {
                eprintln!("! {:#}", e);
            }
            Ok(())
        }
        Command::Theme => {
            let result = controller.dispatch(UserAction::ToggleTheme, now);
            println!("Theme: {}", controller.state().theme.as_str());
            result
        }
        Command::Away => controller.dispatch(UserAction::VisibilityChanged(false), now),
        Command::Back => controller.dispatch(UserAction::VisibilityChanged(true), now),
        Command::Quit => Ok(()),
    };

    if let Err(e) = result {
        warn!("{}", e);
    }
    controller.dialogs_mut().answer = None;
}

/// Validate on metadata, then read and send. A `mime` marks a clipboard paste.
async fn upload(controller: &mut Controller, path: &Path, mime: Option<&str>) -> anyhow::Result<()> {
    let size = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?
        .len();

    let pending = match mime {
        Some(mime) => controller.begin_paste(mime, size),
        None => {
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .context("upload path has no file name")?;
            controller.begin_upload(filename, size)
        }
    };
    let Some(pending) = pending else {
        return Ok(());
    };

    let bytes = tokio::fs::read(path).await?;
    info!("Uploading {} ({} bytes)", pending.filename, bytes.len());
    controller.complete_upload(pending, &bytes);
    Ok(())
}

async fn snapshot<D: Dialogs, S: ThemeStore>(controller: &ChatController<D, S>, path: Option<&Path>) {
    let Some(path) = path else { return };
    if let Err(e) = tokio::fs::write(path, controller.render_page()).await {
        warn!("Failed to write page snapshot to {}: {}", path.display(), e);
    }
}
