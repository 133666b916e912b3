use crate::audio::{AudioSink, TerminalBell};
use crate::clock::FrameClock;
use crate::config::{load_settings, save_settings_atomic, Paths, Settings};
use crate::input::{collect_input_nonblocking, Command, InputEvent, Keyboard};
use crate::overlay;
use crate::painter::{Painter, Palette};
use crate::projection::Viewport;
use crate::race::World;
use crate::render::{canvas_to_cells, Terminal};
use crate::sprites::{HeroPose, SpriteSheet};
use crate::storage::{load_highscores, save_highscores_atomic, HighscoreFile};
use std::time::{Duration, Instant};

/// Banner blink half-period.
const BLINK: Duration = Duration::from_millis(500);

pub struct App {
    settings: Settings,
    paths: Paths,
    world: World,
    painter: Painter,
    sprites: SpriteSheet,
    keyboard: Keyboard,
    audio: TerminalBell,
    clock: FrameClock,
    board: HighscoreFile,
    term: Terminal,
    started: Instant,
    full_redraw: bool,
    should_quit: bool,
}

impl App {
    pub fn init(settings: Settings, paths: Paths) -> anyhow::Result<Self> {
        let seed = if settings.seed == 0 {
            rand::random()
        } else {
            settings.seed
        };
        let board = load_highscores(&paths.highscores_path);
        let world = World::new(settings.tuning.clone(), seed).with_highscores(board.highscores());
        let audio = TerminalBell::new(settings.muted);

        let term = Terminal::begin()?;
        let now = Instant::now();

        Ok(Self {
            keyboard: Keyboard::new(term.enhanced),
            clock: FrameClock::new(settings.fps, now),
            settings,
            paths,
            world,
            painter: Painter::new(Palette::default()),
            sprites: SpriteSheet::builtin(),
            audio,
            board,
            term,
            started: now,
            full_redraw: true,
            should_quit: false,
        })
    }

    fn run_loop(&mut self) -> anyhow::Result<()> {
        while !self.should_quit {
            if self.term.resize_if_needed()? {
                self.full_redraw = true;
            }

            let wait = self.clock.until_due(Instant::now());
            for ev in collect_input_nonblocking(wait)? {
                let now = Instant::now();
                match ev {
                    InputEvent::Key(k) => {
                        if let Some(cmd) = self.keyboard.handle(&k, now) {
                            self.apply(cmd);
                        }
                    }
                    InputEvent::FocusLost => self.keyboard.release_all(),
                }
            }

            let now = Instant::now();
            if let Some(step) = self.clock.poll(now) {
                let controls = self.keyboard.controls(now);
                let report = self.world.update(step, controls, &mut self.audio);
                if let Some(millis) = report.finished_lap {
                    log::info!("lap recorded: {millis} ms");
                    self.save_board()?;
                }
                self.render_frame(controls.pose())?;
            }
        }
        Ok(())
    }

    fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::Start => {
                self.world.start_race(&mut self.audio);
            }
            Command::ToggleMute => {
                self.audio.toggle_mute();
                self.settings.muted = self.audio.is_muted();
            }
            Command::Reset => {
                log::info!("reset");
                self.world.reset();
            }
            Command::Quit => self.should_quit = true,
        }
    }

    fn render_frame(&mut self, pose: HeroPose) -> anyhow::Result<()> {
        let view = Viewport::new(self.term.canvas.w as f32, self.term.canvas.h as f32);
        self.painter
            .draw(&self.world, &mut self.term.canvas, &self.sprites, view);
        overlay::paint_scene(&mut self.term.canvas, &self.world, &self.sprites, pose);

        canvas_to_cells(
            &self.term.canvas,
            &mut self.term.cur,
            self.settings.enable_color,
        );

        let blink_on = (self.started.elapsed().as_millis() / BLINK.as_millis()) % 2 == 0;
        overlay::paint_text(
            &mut self.term.cur,
            &self.world,
            blink_on,
            self.audio.is_muted(),
        );

        self.term.present(!self.full_redraw)?;
        self.full_redraw = false;
        Ok(())
    }

    fn save_board(&mut self) -> anyhow::Result<()> {
        self.board
            .merge(self.world.highscores(), chrono::Utc::now());
        save_highscores_atomic(&self.paths.highscores_path, &self.board)
    }

    fn shutdown(&mut self) -> anyhow::Result<()> {
        self.save_board()?;
        // Command-line overrides are per session; only the mute toggle sticks.
        let mut stored = load_settings(&self.paths.settings_path);
        stored.muted = self.settings.muted;
        save_settings_atomic(&self.paths.settings_path, &stored)?;
        Ok(())
    }
}

/// Runs until quit. The terminal is restored even when the loop fails.
pub fn run(settings: Settings, paths: Paths) -> anyhow::Result<()> {
    let mut app = App::init(settings, paths)?;
    let result = app.run_loop();
    let restored = app.term.end();
    if let Err(e) = &result {
        log::error!("main loop failed: {e:#}");
    }
    result?;
    restored?;
    app.shutdown()
}
