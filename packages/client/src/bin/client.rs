//! Command-line chat client.
//!
//! Creates and deletes rooms, sends one-off messages, and opens an
//! interactive WebSocket session. The session reconnects on disconnection
//! (max 5 attempts with 5 second interval) but exits at once when the room
//! does not exist.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kaiwa-client -- create -u alice -u bob
//! cargo run --bin kaiwa-client -- connect <room-id> --username alice
//! cargo run --bin kaiwa-client -- send <room-id> --from bob --text "hi"
//! cargo run --bin kaiwa-client -- delete <room-id>
//! ```

use clap::{Parser, Subcommand};

use kaiwa_client::{ApiClient, ClientError, run_client};
use kaiwa_shared::{logger::setup_logger, time::get_timestamp_millis};

#[derive(Parser, Debug)]
#[command(name = "kaiwa-client")]
#[command(about = "Command-line client for Kaiwa chat rooms", long_about = None)]
struct Args {
    /// Server base URL
    #[arg(short = 's', long, global = true, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Bearer token sent with every request
    #[arg(long, global = true, env = "KAIWA_ACCESS_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a room for the given participants
    Create {
        /// Participant username (repeat for each participant)
        #[arg(short = 'u', long = "username", required = true)]
        usernames: Vec<String>,
    },
    /// Delete a room and its history
    Delete { room_id: String },
    /// Send a single message
    Send {
        room_id: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        text: String,
    },
    /// Join a room interactively
    Connect {
        room_id: String,
        #[arg(short = 'u', long)]
        username: String,
    },
}

async fn run(args: Args) -> Result<(), ClientError> {
    let api = ApiClient::new(&args.server, args.token)?;

    match args.command {
        Command::Create { usernames } => {
            let room_id = api.create_room(&usernames).await?;
            println!("{}", room_id);
        }
        Command::Delete { room_id } => {
            api.delete_room(&room_id).await?;
            println!("Deleted room {}", room_id);
        }
        Command::Send {
            room_id,
            from,
            text,
        } => {
            let id = api
                .send_message(&room_id, &from, &text, get_timestamp_millis())
                .await?;
            println!("Accepted message {}", id);
        }
        Command::Connect { room_id, username } => {
            run_client(api, room_id, username).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
