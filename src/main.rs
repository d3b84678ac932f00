//! blocktui — classic falling-block puzzle game in the terminal.

mod app;
mod board;
mod game;
mod input;
mod piece;
mod shapes;
mod theme;
mod ui;

use anyhow::Result;
use app::{App, Outcome};
use clap::{Parser, ValueEnum};

/// Options the game session sees (gravity speed, random seed).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub gravity_interval_ms: u64,
    /// Fixed seed for reproducible piece sequences; random when `None`.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            gravity_interval_ms: game::DEFAULT_GRAVITY_INTERVAL_MS,
            seed: None,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = GameConfig {
        gravity_interval_ms: args.gravity_ms,
        seed: args.seed,
    };
    let mut app = App::new(args, config, theme);
    match app.run()? {
        Outcome::GameOver { score } => println!("Game over! Score: {score}"),
        Outcome::Quit { score } => println!("Score: {score}"),
    }
    Ok(())
}

/// Falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blocktui",
    version,
    about = "Falling-block puzzle in the terminal. Complete horizontal rows to clear them and score.",
    long_about = "blocktui is a terminal take on the classic falling-block puzzle.\n\n\
        Pieces fall into a 10x20 well. Move and rotate them; a piece locks when it cannot fall \
        any further. Every completed row is removed and scores one point. The game ends when a \
        locked piece reaches the top row.\n\n\
        CONTROLS:\n  Left/Right or h/l  Move     Up or k      Rotate\n  Down or j          Soft drop  Space/Enter  Hard drop\n  P  Pause    R  Restart (after game over)    Q / Esc  Quit"
)]
pub struct Args {
    /// Milliseconds between gravity steps.
    #[arg(long, default_value_t = game::DEFAULT_GRAVITY_INTERVAL_MS, value_name = "MS")]
    pub gravity_ms: u64,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Seed for the piece and colour sequence (random if not set).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the game-over fade effect.
    #[arg(long)]
    pub no_animation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["blocktui"]).unwrap();
        assert_eq!(args.gravity_ms, 500);
        assert!((args.frame_rate - 30.0).abs() < f64::EPSILON);
        assert_eq!(args.seed, None);
        assert_eq!(args.palette, Palette::Normal);
        assert!(!args.no_animation);
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::try_parse_from([
            "blocktui",
            "--gravity-ms",
            "250",
            "--seed",
            "7",
            "--palette",
            "colourblind",
        ])
        .unwrap();
        assert_eq!(args.gravity_ms, 250);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.palette, Palette::Colorblind);
    }

    #[test]
    fn test_args_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
