//! Command-line interface for cube_games.

use clap::{Parser, Subcommand};
use cube_tictactoe::Difficulty;

/// Cube Games - 3x3x3 tic-tac-toe in the terminal
#[derive(Parser, Debug)]
#[command(name = "cube_games")]
#[command(about = "3D tic-tac-toe: local, against the AI, or online", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the game config file (defaults apply if it does not exist)
    #[arg(short, long, global = true, default_value = "cube_games.toml")]
    pub config: std::path::PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Two players taking turns at one terminal
    Local,

    /// Play against the computer
    Ai {
        /// AI strength (easy, medium, hard); config default if omitted
        #[arg(short, long)]
        difficulty: Option<Difficulty>,
    },

    /// Two in-process clients playing an online game over a shared room
    Duel {
        /// Host's name
        #[arg(long, default_value = "Alice")]
        host: String,

        /// Guest's name
        #[arg(long, default_value = "Bob")]
        guest: String,

        /// Number of rounds to play
        #[arg(short, long, default_value = "1")]
        rounds: u32,

        /// Seed for both clients' move choice
        #[arg(long, default_value = "7")]
        seed: u64,
    },
}

/// Turns a line typed at the prompt into an event.
///
/// Accepts `layer row col` (spaces or commas), `again`, `menu` and `quit`.
pub fn parse_input(line: &str) -> Option<cube_games::Event> {
    use cube_games::Event;
    let line = line.trim().to_ascii_lowercase();
    match line.as_str() {
        "again" | "a" => return Some(Event::PlayAgain),
        "menu" | "m" => return Some(Event::BackToMenu),
        "quit" | "q" | "exit" => return Some(Event::Quit),
        _ => {}
    }
    let parts: Vec<u8> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::parse::<u8>)
        .collect::<Result<_, _>>()
        .ok()?;
    let [layer, row, col] = parts.as_slice() else {
        return None;
    };
    cube_tictactoe::Coord::new(*layer, *row, *col).map(Event::CellClicked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_games::Event;
    use cube_tictactoe::Coord;

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(parse_input("1 1 1"), Some(Event::CellClicked(Coord::CENTER)));
        assert_eq!(parse_input(" 1,1,1 "), Some(Event::CellClicked(Coord::CENTER)));
        assert_eq!(parse_input("1 1"), None);
        assert_eq!(parse_input("3 0 0"), None);
        assert_eq!(parse_input("x y z"), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input("Again"), Some(Event::PlayAgain));
        assert_eq!(parse_input("quit"), Some(Event::Quit));
        assert_eq!(parse_input("menu"), Some(Event::BackToMenu));
    }
}
