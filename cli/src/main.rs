use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use meltos_room::schema::Open;
use meltos_room::{DEFAULT_BASE_URL, RoomClient, RoomConfig, RoomError, RoomTimeouts, SessionConfigs};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "meltos-room", about = "meltos room HTTP API CLI")]
struct Cli {
    #[arg(long, env = "MELTOS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "MELTOS_SESSION_FILE", default_value = ".meltos-session.json")]
    session_file: PathBuf,

    #[arg(long, env = "MELTOS_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<u64>,

    #[arg(long, env = "MELTOS_CONNECT_TIMEOUT_SECS")]
    connect_timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    config: RoomConfig,
    session_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a new room and save its session.
    Open(OpenArgs),
    /// Join an existing room and save its session.
    Join {
        room_id: String,
        #[arg(long)]
        user_id: Option<String>,
    },
    #[command(flatten)]
    Room(RoomCommand),
}

/// Commands that run against the saved session.
#[derive(Subcommand, Debug)]
enum RoomCommand {
    /// Print the current room state.
    Sync,
    /// Create a discussion.
    Create { title: String },
    /// Post a message to a discussion.
    Speak { discussion_id: String, text: String },
    /// Reply to a message in a discussion.
    Reply {
        discussion_id: String,
        to: String,
        text: String,
    },
    /// Close a discussion.
    Close { discussion_id: String },
    /// Print the room's version-control bundle.
    Fetch,
    /// Upload a version-control bundle given as JSON text.
    Push { bundle: String },
    /// Leave the room.
    Leave,
    /// Print the API URI for the saved room.
    Uri { subpath: Option<String> },
}

#[derive(Args, Debug)]
struct OpenArgs {
    #[arg(long)]
    lifetime_secs: Option<u64>,

    #[arg(long)]
    user_limits: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let ctx = CliContext {
        config: RoomConfig::new(cli.base_url).with_timeouts(RoomTimeouts {
            request_secs: cli.request_timeout_secs,
            connect_secs: cli.connect_timeout_secs,
        }),
        session_file: cli.session_file,
    };

    match cli.command {
        Command::Open(args) => run_open(&ctx, args).await,
        Command::Join { room_id, user_id } => run_join(&ctx, room_id, user_id).await,
        Command::Room(command) => run_room(&ctx, command).await,
    }
}

async fn run_open(ctx: &CliContext, args: OpenArgs) -> Result<(), CliError> {
    let body = Open { lifetime_secs: args.lifetime_secs, user_limits: args.user_limits, bundle: None };
    let client = RoomClient::open(&ctx.config, &body).await?;
    save_session(&ctx.session_file, client.session()).await?;
    print_json(&serde_json::to_value(client.session())?)
}

async fn run_join(ctx: &CliContext, room_id: String, user_id: Option<String>) -> Result<(), CliError> {
    let (client, joined) = RoomClient::join(&ctx.config, room_id.into(), user_id.map(Into::into)).await?;
    save_session(&ctx.session_file, client.session()).await?;
    print_json(&serde_json::to_value(joined)?)
}

async fn run_room(ctx: &CliContext, command: RoomCommand) -> Result<(), CliError> {
    let session = SessionConfigs::load(&ctx.session_file).await?;
    tracing::debug!(path = %ctx.session_file.display(), room_id = %session.room_id, "session loaded");
    let client = RoomClient::new(&ctx.config, session)?;

    let json: Value = match command {
        RoomCommand::Sync => client.sync().await?,
        RoomCommand::Create { title } => client.create(&title).await?,
        RoomCommand::Speak { discussion_id, text } => client.speak(&discussion_id, &text).await?,
        RoomCommand::Reply {
            discussion_id,
            to,
            text,
        } => client.reply(&discussion_id, &to, &text).await?,
        RoomCommand::Close { discussion_id } => client.close(&discussion_id).await?,
        RoomCommand::Fetch => client.fetch().await?,
        RoomCommand::Push { bundle } => {
            let bundle: Value = serde_json::from_str(&bundle)?;
            client.push(&bundle).await?;
            return Ok(());
        }
        RoomCommand::Leave => {
            client.leave().await?;
            tracing::info!(path = %ctx.session_file.display(), "session file kept after leave");
            return Ok(());
        }
        RoomCommand::Uri { subpath } => {
            println!("{}", client.api_uri(subpath.as_deref()));
            return Ok(());
        }
    };
    print_json(&json)
}

async fn save_session(path: &Path, session: &SessionConfigs) -> Result<(), CliError> {
    session.save(path).await?;
    tracing::info!(path = %path.display(), room_id = %session.room_id, "session saved");
    Ok(())
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use clap::CommandFactory;

    use super::*;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn reply_takes_three_positionals() {
        let cli = Cli::try_parse_from(["meltos-room", "reply", "d-1", "m-1", "hi"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Room(RoomCommand::Reply { ref discussion_id, ref to, ref text })
                if discussion_id == "d-1" && to == "m-1" && text == "hi"
        ));
    }

    #[test]
    fn push_takes_bundle_json_text() {
        let cli = Cli::try_parse_from(["meltos-room", "push", r#"{"traces":[]}"#]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Room(RoomCommand::Push { ref bundle }) if bundle == r#"{"traces":[]}"#
        ));
        let cli = Cli::try_parse_from(["meltos-room", "fetch"]).unwrap();
        assert!(matches!(cli.command, Command::Room(RoomCommand::Fetch)));
    }

    #[tokio::test]
    async fn save_session_writes_file_and_logs_event() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let session = SessionConfigs::new("room-1", "sess-1");
        save_session(&path, &session).await.unwrap();

        assert_eq!(SessionConfigs::load(&path).await.unwrap(), session);
        let text = logs.text();
        assert!(text.contains("session saved"), "{text}");
        assert!(text.contains("room-1"), "{text}");
    }

    #[test]
    fn base_url_defaults_to_public_origin() {
        let cli = Cli::try_parse_from(["meltos-room", "sync"]).unwrap();
        assert_eq!(cli.base_url, DEFAULT_BASE_URL);
        assert_eq!(cli.session_file, PathBuf::from(".meltos-session.json"));
    }
}
