use clap::{Parser, ValueEnum};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use client::api::ApiClient;
use client::game::LocalGame;
use client::rendering::render_area;
use shared::town_square::{TOWN_SQUARE, TOWN_SQUARE_DEF_ID};
use shared::Direction;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Resolve moves on this side; report only the final position
    Local,
    /// Delegate every move to the backend
    Backend,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL
    #[arg(short = 's', long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Movement mode
    #[arg(short, long, value_enum, default_value = "local")]
    mode: Mode,
}

fn parse_direction(input: &str) -> Option<Direction> {
    match input {
        "n" => Some(Direction::North),
        "s" => Some(Direction::South),
        "e" => Some(Direction::East),
        "w" => Some(Direction::West),
        other => Direction::from_name(other),
    }
}

fn stdin_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    println!("Commands: north/south/east/west (or n/s/e/w), quit");

    match args.mode {
        Mode::Local => run_local(&args.server).await,
        Mode::Backend => run_backend(&args.server).await,
    }
}

/// Local mode: the shared resolver runs on this side against the map data.
/// A backend session is still established when possible so the final
/// position can be reported, but the walk itself works offline.
async fn run_local(server: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut api = ApiClient::new(server);
    let online = match api.start_session().await {
        Ok(session) => {
            info!("Session established for {}", session.user_id);
            true
        }
        Err(e) => {
            info!("Backend unavailable, walking offline: {}", e);
            false
        }
    };

    let map = if online {
        match api.map().await {
            Ok(map) => map,
            Err(e) => {
                warn!("Map fetch failed, using built-in data: {}", e);
                TOWN_SQUARE.clone()
            }
        }
    } else {
        TOWN_SQUARE.clone()
    };

    let mut game = LocalGame::new(&map, "you");
    println!("{}", render_area(game.state()));

    let mut lines = stdin_lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "q" {
            break;
        }
        let Some(direction) = parse_direction(input) else {
            println!("Unknown command: {}", input);
            continue;
        };

        let result = game.step(direction);
        if !result.success {
            println!("Blocked.");
        }
        println!("{}", render_area(game.state()));

        if result.exited_area {
            println!("You left the town square.");
            if online {
                let player = game.player();
                if let Err(e) = api.exit(player.x, player.y, TOWN_SQUARE_DEF_ID).await {
                    warn!("Failed to report final position: {}", e);
                }
            }
            break;
        }
    }

    Ok(())
}

/// Backend mode: every move is a round-trip; the server's state is rendered
/// as-is, other players and all.
async fn run_backend(server: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut api = ApiClient::new(server);
    let session = api.start_session().await?;
    info!("Session established for {}", session.user_id);

    let joined = api.join().await?;
    info!("Joined area {}", joined.area_id);
    println!("{}", render_area(&joined.state));

    let mut lines = stdin_lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "q" {
            break;
        }
        let Some(direction) = parse_direction(input) else {
            println!("Unknown command: {}", input);
            continue;
        };

        match api.send_move(direction).await {
            Ok(response) => {
                if !response.move_result.success {
                    println!("Blocked.");
                }
                println!("{}", render_area(&response.state));
                if response.move_result.exited_area {
                    println!("You left the town square.");
                    break;
                }
            }
            Err(e) => println!("Move failed: {}", e),
        }
    }

    Ok(())
}
