//! Demo scenes
//!
//! Every demo is built from the same [`Panel`] scene: a full-screen colour
//! with a counter. `space` changes the counter, `enter` moves on. What
//! "moving on" means is the panel's [`Advance`]: a direct switch, a switch
//! through a transition, or firing a trigger at a director.
//!
//! Input reaches the panels through a shared [`Controls`] value that the app
//! fills before each tick and clears after it.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use stagehand_core::{
    Block, Canvas, Color, ControllerHandle, Directive, FadeTransition, RuleSet, Scene,
    SceneDirector, SceneManager, SceneRef, SharedClock, SlideDirection, SlideTransition,
    StageConfig, TransitionAware, TransitionRef, Trigger, Unit,
};

/// Payload shared by every demo scene
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    /// The number the user is playing with
    pub count: i64,
    /// Set by transition-aware panels while a transition runs
    pub in_transition: bool,
}

// =============================================================================
// Input
// =============================================================================

/// What a key press asks the current scene to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Change the counter
    Bump,
    /// Move to the next scene
    Advance,
}

/// Key press visible to scenes during one tick
#[derive(Debug, Default)]
pub struct Controls {
    pressed: Cell<Option<Action>>,
}

impl Controls {
    pub fn press(&self, action: Action) {
        self.pressed.set(Some(action));
    }

    pub fn pressed(&self) -> Option<Action> {
        self.pressed.get()
    }

    pub fn release(&self) {
        self.pressed.set(None);
    }
}

/// Everything a panel needs to build its successors
pub struct Kit {
    pub controls: Rc<Controls>,
    pub config: StageConfig,
    pub clock: SharedClock,
}

impl Kit {
    /// The configured transition called `name`, or `fallback`
    fn transition_or(
        &self,
        name: &str,
        fallback: impl FnOnce() -> TransitionRef<Tally>,
    ) -> TransitionRef<Tally> {
        match self.config.build_transition(name, &self.clock) {
            Some(transition) => {
                tracing::debug!(name, "using configured transition");
                transition
            }
            None => fallback(),
        }
    }
}

// =============================================================================
// Panel
// =============================================================================

type Build = fn(&Rc<Kit>) -> SceneRef<Tally>;
type MakeTransition = fn(&Kit, &Tally) -> TransitionRef<Tally>;

/// What `enter` does on a panel
#[derive(Clone, Copy)]
pub enum Advance {
    /// Switch straight to a fresh scene
    SwitchTo(Build),
    /// Switch to a fresh scene through a transition
    Through(Build, MakeTransition),
    /// Fire a trigger, but only while `when` holds for the counter
    Trigger {
        trigger: Trigger,
        when: fn(i64) -> bool,
    },
}

/// Full-screen coloured scene with a counter
pub struct Panel {
    title: &'static str,
    fill: Color,
    transit_fill: Option<Color>,
    bump: fn(i64) -> i64,
    advance: Advance,
    kit: Rc<Kit>,
    tally: Tally,
    size: (u16, u16),
    controller: ControllerHandle<Tally>,
}

impl Panel {
    pub fn new(
        kit: &Rc<Kit>,
        title: &'static str,
        fill: Color,
        bump: fn(i64) -> i64,
        advance: Advance,
    ) -> Self {
        Self {
            title,
            fill,
            transit_fill: None,
            bump,
            advance,
            kit: Rc::clone(kit),
            tally: Tally::default(),
            size: (0, 0),
            controller: ControllerHandle::detached(),
        }
    }

    /// Opt into transition hooks, drawing `fill` while a transition runs
    #[must_use]
    pub fn aware(mut self, fill: Color) -> Self {
        self.transit_fill = Some(fill);
        self
    }

    fn can_advance(&self) -> bool {
        match self.advance {
            Advance::Trigger { when, .. } => when(self.tally.count),
            Advance::SwitchTo(_) | Advance::Through(..) => true,
        }
    }

    fn advance(&self) {
        match self.advance {
            Advance::SwitchTo(build) => self.controller.switch_to(build(&self.kit)),
            Advance::Through(build, make) => {
                let transition = make(&self.kit, &self.tally);
                self.controller
                    .switch_with_transition(build(&self.kit), transition);
            }
            Advance::Trigger { trigger, when } => {
                if when(self.tally.count) {
                    self.controller.trigger(trigger);
                } else {
                    tracing::debug!(
                        title = self.title,
                        count = self.tally.count,
                        "not ready to switch"
                    );
                }
            }
        }
    }
}

impl Unit for Panel {
    fn tick(&mut self) -> anyhow::Result<()> {
        match self.kit.controls.pressed() {
            Some(Action::Bump) => self.tally.count = (self.bump)(self.tally.count),
            Some(Action::Advance) => self.advance(),
            None => {}
        }
        Ok(())
    }

    fn present(&mut self, canvas: &mut Canvas) {
        let fill = match self.transit_fill {
            Some(transit) if self.tally.in_transition => transit,
            _ => self.fill,
        };
        canvas.fill(Block::solid(fill));

        let ink = if fill == Color::WHITE {
            Color::BLACK
        } else {
            Color::WHITE
        };
        let lines = [
            self.title.to_string(),
            format!(
                "Count: {}  Size: {}x{}",
                self.tally.count, self.size.0, self.size.1
            ),
            format!("Can switch? {}", if self.can_advance() { "yes" } else { "no" }),
        ];
        let top = (canvas.height() / 2).saturating_sub(1);
        for (row, line) in (top..).zip(&lines) {
            let width = u16::try_from(line.chars().count()).unwrap_or(u16::MAX);
            let left = (canvas.width().saturating_sub(width)) / 2;
            canvas.put_str(left, row, line, ink);
        }
    }

    fn resize(&mut self, width: u16, height: u16) -> (u16, u16) {
        self.size = (width, height);
        (width, height)
    }
}

impl Scene<Tally> for Panel {
    fn load(&mut self, state: Tally, controller: ControllerHandle<Tally>) {
        self.tally = state;
        self.controller = controller;
    }

    fn unload(&mut self) -> Tally {
        self.tally
    }

    fn as_transition_aware(&mut self) -> Option<&mut dyn TransitionAware<Tally>> {
        if self.transit_fill.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl TransitionAware<Tally> for Panel {
    fn pre_transition(&mut self, _to: &SceneRef<Tally>) -> Tally {
        self.tally.in_transition = true;
        self.tally
    }

    fn post_transition(&mut self, state: Tally, _from: &SceneRef<Tally>) {
        self.tally = Tally {
            in_transition: false,
            ..state
        };
    }
}

// =============================================================================
// Palette
// =============================================================================

const RED: Color = Color::rgb(255, 0, 0);
const BLUE: Color = Color::rgb(0, 0, 255);
const GREEN: Color = Color::rgb(0, 255, 0);

fn inc(count: i64) -> i64 {
    count.saturating_add(1)
}

fn dec(count: i64) -> i64 {
    count.saturating_sub(1)
}

fn double(count: i64) -> i64 {
    count.saturating_mul(2)
}

/// Slide duration for the timed demo: one second per count, within reason
fn seconds_from(tally: &Tally) -> Duration {
    Duration::from_secs(tally.count.clamp(1, 30).unsigned_abs())
}

// =============================================================================
// Demo: simple
// =============================================================================

pub mod simple {
    use super::*;

    pub const INITIAL: i64 = 10;

    pub fn build(kit: &Rc<Kit>) -> SceneManager<Tally> {
        SceneManager::new(
            first(kit),
            Tally {
                count: INITIAL,
                ..Tally::default()
            },
        )
    }

    fn first(kit: &Rc<Kit>) -> SceneRef<Tally> {
        SceneRef::new(Panel::new(kit, "First", RED, inc, Advance::SwitchTo(second)))
    }

    fn second(kit: &Rc<Kit>) -> SceneRef<Tally> {
        SceneRef::new(Panel::new(
            kit,
            "Second",
            BLUE,
            dec,
            Advance::Through(third, |kit, _| {
                kit.transition_or("simple-fade", || {
                    TransitionRef::new(FadeTransition::new(0.05))
                })
            }),
        ))
    }

    fn third(kit: &Rc<Kit>) -> SceneRef<Tally> {
        SceneRef::new(Panel::new(
            kit,
            "Third",
            GREEN,
            double,
            Advance::Through(first, |kit, _| {
                kit.transition_or("simple-slide", || {
                    TransitionRef::new(SlideTransition::new(SlideDirection::RightToLeft, 0.05))
                })
            }),
        ))
    }
}

// =============================================================================
// Demo: timed
// =============================================================================

pub mod timed {
    use super::*;

    pub const INITIAL: i64 = 3;

    pub fn build(kit: &Rc<Kit>) -> SceneManager<Tally> {
        SceneManager::new(
            first(kit),
            Tally {
                count: INITIAL,
                ..Tally::default()
            },
        )
    }

    fn first(kit: &Rc<Kit>) -> SceneRef<Tally> {
        SceneRef::new(Panel::new(
            kit,
            "First (tick-timed slide)",
            RED,
            inc,
            Advance::Through(second, |kit, tally| {
                let duration = seconds_from(tally);
                kit.transition_or("timed-forward", || {
                    TransitionRef::new(SlideTransition::ticks_timed(
                        SlideDirection::LeftToRight,
                        kit.config.ticks_per_second,
                        duration,
                    ))
                })
            }),
        ))
    }

    fn second(kit: &Rc<Kit>) -> SceneRef<Tally> {
        SceneRef::new(Panel::new(
            kit,
            "Second (clock-timed slide)",
            BLUE,
            dec,
            Advance::Through(first, |kit, tally| {
                let duration = seconds_from(tally);
                kit.transition_or("timed-back", || {
                    TransitionRef::new(SlideTransition::timed_with_clock(
                        SlideDirection::RightToLeft,
                        duration,
                        kit.clock.clone(),
                    ))
                })
            }),
        ))
    }
}

// =============================================================================
// Demo: aware
// =============================================================================

pub mod aware {
    use super::*;

    pub fn build(kit: &Rc<Kit>) -> SceneManager<Tally> {
        SceneManager::new(first(kit), Tally::default())
    }

    fn first(kit: &Rc<Kit>) -> SceneRef<Tally> {
        let panel = Panel::new(
            kit,
            "First",
            RED,
            inc,
            Advance::Through(second, |kit, _| {
                kit.transition_or("aware-down", || {
                    TransitionRef::new(SlideTransition::new(SlideDirection::TopToBottom, 0.05))
                })
            }),
        );
        SceneRef::new(panel.aware(Color::BLACK))
    }

    fn second(kit: &Rc<Kit>) -> SceneRef<Tally> {
        let panel = Panel::new(
            kit,
            "Second",
            BLUE,
            dec,
            Advance::Through(first, |kit, _| {
                kit.transition_or("aware-up", || {
                    TransitionRef::new(SlideTransition::new(SlideDirection::BottomToTop, 0.05))
                })
            }),
        );
        SceneRef::new(panel.aware(Color::WHITE))
    }
}

// =============================================================================
// Demo: director
// =============================================================================

pub mod director {
    use super::*;

    pub const INITIAL: i64 = 10;
    pub const TRIGGER: Trigger = Trigger::new(0);

    fn when(condition: fn(i64) -> bool) -> Advance {
        Advance::Trigger {
            trigger: TRIGGER,
            when: condition,
        }
    }

    fn at_ten(count: i64) -> bool {
        count == 10
    }

    fn at_most_five(count: i64) -> bool {
        count <= 5
    }

    fn at_least_fifteen(count: i64) -> bool {
        count >= 15
    }

    pub fn build(kit: &Rc<Kit>) -> SceneDirector<Tally> {
        let s1 = SceneRef::new(Panel::new(kit, "First (switch at 10)", RED, inc, when(at_ten)));
        let s2 = SceneRef::new(Panel::new(
            kit,
            "Second (switch at 5 or less)",
            BLUE,
            dec,
            when(at_most_five),
        ));
        let s3 = SceneRef::new(Panel::new(
            kit,
            "Third (switch at 15 or more)",
            GREEN,
            inc,
            when(at_least_fifteen),
        ));

        let slide = |name: &str, direction: SlideDirection| {
            kit.transition_or(name, || {
                TransitionRef::new(SlideTransition::new(direction, 0.02))
            })
        };
        let rules = RuleSet::new()
            .add(
                s1.clone(),
                Directive::new(TRIGGER, s2.clone())
                    .with_transition(slide("director-up", SlideDirection::BottomToTop)),
            )
            .add(
                s2.clone(),
                Directive::new(TRIGGER, s3.clone())
                    .with_transition(slide("director-down", SlideDirection::TopToBottom)),
            )
            .add(
                s3,
                Directive::new(TRIGGER, s1.clone())
                    .with_transition(slide("director-across", SlideDirection::LeftToRight)),
            );

        SceneDirector::new(
            s1,
            Tally {
                count: INITIAL,
                ..Tally::default()
            },
            rules,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stagehand_core::{
        Current, ManualClock, TransitionEffect, TransitionPhase, TransitionSpec, TransitionTiming,
    };

    fn kit() -> Rc<Kit> {
        Rc::new(Kit {
            controls: Rc::new(Controls::default()),
            config: StageConfig::default(),
            clock: ManualClock::shared(),
        })
    }

    fn press(kit: &Kit, unit: &mut impl Unit, action: Action) {
        kit.controls.press(action);
        unit.tick().unwrap();
        kit.controls.release();
    }

    fn frames(unit: &mut impl Unit, count: usize) {
        for _ in 0..count {
            unit.tick().unwrap();
            unit.present(&mut Canvas::new(4, 2));
        }
    }

    fn text(canvas: &Canvas) -> String {
        canvas
            .rows()
            .flatten()
            .map(|block| block.character)
            .collect()
    }

    #[test]
    fn test_simple_demo_cycles_scenes() {
        let kit = kit();
        let mut manager = simple::build(&kit);

        press(&kit, &mut manager, Action::Advance);
        assert!(!manager.is_transitioning());

        press(&kit, &mut manager, Action::Advance);
        assert!(manager.is_transitioning());

        frames(&mut manager, 200);
        assert!(!manager.is_transitioning());
    }

    #[test]
    fn test_payload_survives_switches() {
        let kit = kit();
        let mut manager = simple::build(&kit);

        press(&kit, &mut manager, Action::Bump);
        press(&kit, &mut manager, Action::Advance);
        press(&kit, &mut manager, Action::Bump);

        let mut canvas = Canvas::new(40, 5);
        manager.present(&mut canvas);
        let shown = text(&canvas);
        assert!(shown.contains("Second"), "{shown}");
        assert!(shown.contains("Count: 10"), "{shown}");
    }

    #[test]
    fn test_director_waits_for_condition() {
        let kit = kit();
        let mut director = director::build(&kit);

        press(&kit, &mut director, Action::Bump);
        press(&kit, &mut director, Action::Advance);
        assert!(!director.is_transitioning());

        let mut director = director::build(&kit);
        press(&kit, &mut director, Action::Advance);
        assert!(director.is_transitioning());
    }

    #[test]
    fn test_director_trigger_during_slide_finishes_it() {
        let kit = kit();
        let mut director = director::build(&kit);

        press(&kit, &mut director, Action::Advance);
        let Current::Transition(slide) = director.current() else {
            panic!("expected a running slide");
        };
        assert_eq!(slide.phase(), TransitionPhase::Running);

        // The source panel still holds 10 and fires again.
        press(&kit, &mut director, Action::Advance);
        assert!(!director.is_transitioning());
        assert_eq!(slide.phase(), TransitionPhase::Committed);
    }

    #[test]
    fn test_aware_panels_use_transit_colours() {
        let kit = kit();
        let mut manager = aware::build(&kit);

        press(&kit, &mut manager, Action::Advance);
        assert!(manager.is_transitioning());

        let mut canvas = Canvas::new(2, 2);
        manager.present(&mut canvas);
        let corner = canvas.get(0, 0).map(|block| block.bg);
        assert!(corner == Some(Color::BLACK) || corner == Some(Color::WHITE));

        frames(&mut manager, 200);
        let mut canvas = Canvas::new(2, 2);
        manager.present(&mut canvas);
        assert_eq!(canvas.get(0, 0).map(|block| block.bg), Some(BLUE));
    }

    #[test]
    fn test_timed_durations_are_bounded() {
        let short = Tally {
            count: -4,
            ..Tally::default()
        };
        let long = Tally {
            count: 500,
            ..Tally::default()
        };
        assert_eq!(seconds_from(&short), Duration::from_secs(1));
        assert_eq!(seconds_from(&long), Duration::from_secs(30));
    }

    #[test]
    fn test_configured_transition_wins() {
        let mut config = StageConfig::default();
        config.transitions.insert(
            "simple-fade".to_string(),
            TransitionSpec {
                effect: TransitionEffect::Slide,
                timing: TransitionTiming::Factor(1.0),
                direction: SlideDirection::LeftToRight,
            },
        );
        let kit = Rc::new(Kit {
            controls: Rc::new(Controls::default()),
            config,
            clock: ManualClock::shared(),
        });

        let mut fallback_used = false;
        let built = kit.transition_or("simple-fade", || {
            fallback_used = true;
            TransitionRef::new(FadeTransition::new(0.05))
        });
        assert!(!fallback_used);
        assert_eq!(built.phase(), TransitionPhase::Idle);

        let _ = kit.transition_or("missing", || {
            fallback_used = true;
            TransitionRef::new(FadeTransition::new(0.05))
        });
        assert!(fallback_used);
    }
}
