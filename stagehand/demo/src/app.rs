//! Demo application state and event loop

use std::io;
use std::rc::Rc;
use std::time::Duration;

use clap::ValueEnum;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::Terminal;
use stagehand_core::{default_clock, Canvas, SceneDirector, SceneManager, StageConfig, Unit};
use tokio::time::MissedTickBehavior;

use crate::render::draw_canvas;
use crate::scenes::{self, Action, Controls, Kit, Tally};

/// Which demo to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// Direct switch, fade and slide between three scenes
    Simple,
    /// Slides paced by tick count and by wall clock
    Timed,
    /// Scenes that change colour while a transition runs
    Aware,
    /// A director cycling scenes when the counter allows it
    Director,
}

impl std::fmt::Display for Demo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Timed => write!(f, "timed"),
            Self::Aware => write!(f, "aware"),
            Self::Director => write!(f, "director"),
        }
    }
}

/// The controller at the root of the demo
enum Stage {
    Manager(SceneManager<Tally>),
    Director(SceneDirector<Tally>),
}

impl Stage {
    fn unit(&mut self) -> &mut dyn Unit {
        match self {
            Self::Manager(manager) => manager,
            Self::Director(director) => director,
        }
    }

    fn is_transitioning(&self) -> bool {
        match self {
            Self::Manager(manager) => manager.is_transitioning(),
            Self::Director(director) => director.is_transitioning(),
        }
    }
}

/// Main application state
pub struct App {
    demo: Demo,
    stage: Stage,
    controls: Rc<Controls>,
    tick_interval: Duration,
    running: bool,
}

impl App {
    /// Build the chosen demo
    pub fn new(demo: Demo, config: StageConfig) -> Self {
        let controls = Rc::new(Controls::default());
        let tick_interval = config.tick_interval();
        let kit = Rc::new(Kit {
            controls: Rc::clone(&controls),
            config,
            clock: default_clock(),
        });

        let stage = match demo {
            Demo::Simple => Stage::Manager(scenes::simple::build(&kit)),
            Demo::Timed => Stage::Manager(scenes::timed::build(&kit)),
            Demo::Aware => Stage::Manager(scenes::aware::build(&kit)),
            Demo::Director => Stage::Director(scenes::director::build(&kit)),
        };
        tracing::info!(%demo, ?tick_interval, "demo ready");

        Self {
            demo,
            stage,
            controls,
            tick_interval,
            running: true,
        }
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let size = terminal.size()?;
        self.resize(size.width, size.height);

        while self.running {
            tokio::select! {
                biased;

                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(e)) => return Err(e.into()),
                        None => self.running = false,
                    }
                }

                _ = ticker.tick() => {
                    self.step()?;
                    self.render(terminal)?;
                }
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Resize(w, h) => self.resize(w, h),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }
            KeyCode::Char(' ') => self.controls.press(Action::Bump),
            KeyCode::Enter => self.controls.press(Action::Advance),
            _ => {}
        }
    }

    /// Leave the bottom row for the status line
    fn resize(&mut self, width: u16, height: u16) {
        let (w, h) = self.stage.unit().resize(width, height.saturating_sub(1));
        tracing::debug!(width = w, height = h, "stage resized");
    }

    /// Advance the stage by one tick, consuming any pending key press
    fn step(&mut self) -> anyhow::Result<()> {
        let result = self.stage.unit().tick();
        self.controls.release();
        result
    }

    fn render(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let status = format!(
            " {} | {} | space: change count  enter: switch  q: quit",
            self.demo,
            if self.stage.is_transitioning() {
                "transition"
            } else {
                "scene"
            }
        );

        terminal.draw(|frame| {
            let area = frame.area();
            let stage_area = Rect {
                height: area.height.saturating_sub(1),
                ..area
            };

            let mut canvas = Canvas::new(stage_area.width, stage_area.height);
            self.stage.unit().present(&mut canvas);

            let buf = frame.buffer_mut();
            draw_canvas(&canvas, buf, stage_area);
            if area.height > 0 {
                buf.set_stringn(
                    area.x,
                    area.y + stage_area.height,
                    &status,
                    usize::from(area.width),
                    Style::default().fg(Color::DarkGray),
                );
            }
        })?;

        Ok(())
    }
}
