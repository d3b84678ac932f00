//! App: terminal init, main loop, frame pacing and key handling.

use crate::game::{GameSession, Input};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::GameOverFade;
use crate::{Args, GameConfig};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// Lowest frame rate accepted from the command line.
const MIN_FRAME_RATE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

/// How the app loop ended, with the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    GameOver { score: u32 },
    Quit { score: u32 },
}

pub struct App {
    args: Args,
    config: GameConfig,
    theme: Theme,
    session: GameSession,
    screen: Screen,
    paused: bool,
    /// Epoch of the millisecond clock handed to the session.
    clock: Instant,
    fade: GameOverFade,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Self {
        let session = GameSession::new(&config, 0);
        Self {
            args,
            config,
            theme,
            session,
            screen: Screen::Playing,
            paused: false,
            clock: Instant::now(),
            fade: GameOverFade::default(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.clock.elapsed().as_millis() as u64
    }

    fn reset_game(&mut self) {
        self.session = GameSession::new(&self.config, self.now_ms());
        self.screen = Screen::Playing;
        self.paused = false;
        self.fade = GameOverFade::default();
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if !self.paused {
            let now = self.now_ms();
            self.session.reset_gravity_timer(now);
        }
    }

    fn outcome(&self) -> Outcome {
        let score = self.session.score();
        match self.screen {
            Screen::Playing => Outcome::Quit { score },
            Screen::GameOver => Outcome::GameOver { score },
        }
    }

    /// Route one key action. Gameplay inputs are queued for this frame;
    /// returns the outcome when the player quits.
    fn handle_action(&mut self, action: Action, inputs: &mut Vec<Input>) -> Option<Outcome> {
        match (self.screen, action) {
            (_, Action::Quit) => return Some(self.outcome()),
            (Screen::Playing, Action::Pause) => self.toggle_pause(),
            (Screen::Playing, _) if !self.paused => inputs.extend(action.as_input()),
            (Screen::GameOver, Action::Restart) => self.reset_game(),
            _ => {}
        }
        None
    }

    /// Apply this frame's inputs and the gravity check.
    fn step(&mut self, inputs: &mut Vec<Input>) {
        if self.screen != Screen::Playing || self.paused {
            inputs.clear();
            return;
        }
        let now = self.now_ms();
        self.session.frame(inputs.drain(..), now);
        if self.session.is_game_over() {
            self.screen = Screen::GameOver;
        }
    }

    pub fn run(&mut self) -> Result<Outcome> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let result = ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))
            .map_err(anyhow::Error::from)
            .and_then(|mut terminal| {
                terminal.hide_cursor()?;
                self.run_loop(&mut terminal)
            });

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<Outcome> {
        let frame_duration =
            Duration::from_secs_f64(1.0 / self.args.frame_rate.max(MIN_FRAME_RATE));
        let mut inputs = Vec::new();
        // Restart the clock so terminal setup does not count against the first fall.
        self.clock = Instant::now();
        loop {
            let frame_start = Instant::now();
            let fade = (!self.args.no_animation).then_some(&mut self.fade);
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    self.session.snapshot(),
                    &self.theme,
                    self.paused,
                    fade,
                    frame_start,
                );
            })?;

            // Wait out the rest of the frame, then take every pending key.
            let timeout = frame_duration.saturating_sub(frame_start.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind == KeyEventKind::Release {
                            continue;
                        }
                        if let Some(outcome) = self.handle_action(key_to_action(key), &mut inputs) {
                            return Ok(outcome);
                        }
                    }
                }
            }

            self.step(&mut inputs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn app() -> App {
        let args = Args::try_parse_from(["blocktui", "--seed", "5"]).unwrap();
        let config = GameConfig {
            gravity_interval_ms: args.gravity_ms,
            seed: args.seed,
        };
        App::new(args, config, Theme::default())
    }

    #[test]
    fn test_gameplay_actions_are_queued() {
        let mut app = app();
        let mut inputs = Vec::new();
        assert_eq!(app.handle_action(Action::MoveLeft, &mut inputs), None);
        assert_eq!(app.handle_action(Action::Restart, &mut inputs), None);
        assert_eq!(app.handle_action(Action::HardDrop, &mut inputs), None);
        assert_eq!(inputs, vec![Input::MoveLeft, Input::HardDrop]);
    }

    #[test]
    fn test_pause_blocks_inputs_and_steps() {
        let mut app = app();
        let mut inputs = Vec::new();
        app.handle_action(Action::Pause, &mut inputs);
        assert!(app.paused);
        app.handle_action(Action::HardDrop, &mut inputs);
        assert!(inputs.is_empty());

        let before = app.session.snapshot().current.clone();
        inputs.push(Input::HardDrop);
        app.step(&mut inputs);
        assert!(inputs.is_empty());
        assert_eq!(*app.session.snapshot().current, before);

        app.handle_action(Action::Pause, &mut inputs);
        assert!(!app.paused);
    }

    #[test]
    fn test_quit_reports_score() {
        let mut app = app();
        let mut inputs = Vec::new();
        assert_eq!(
            app.handle_action(Action::Quit, &mut inputs),
            Some(Outcome::Quit { score: 0 })
        );
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut app = app();
        app.screen = Screen::GameOver;
        let mut inputs = Vec::new();
        app.handle_action(Action::HardDrop, &mut inputs);
        assert!(inputs.is_empty());
        assert_eq!(
            app.handle_action(Action::Quit, &mut inputs),
            Some(Outcome::GameOver { score: 0 })
        );
        app.handle_action(Action::Restart, &mut inputs);
        assert_eq!(app.screen, Screen::Playing);
        assert!(!app.session.is_game_over());
    }
}
