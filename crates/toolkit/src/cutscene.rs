//! Camera cutscenes sequenced as delayed one-shot tasks.
//!
//! Each scene occupies `fade_in + duration` seconds of the timeline:
//!
//! - at the scene start the fade (if any) begins;
//! - once the fade-in has elapsed the subject is teleported to the start pose
//!   and the camera eases to the end pose;
//! - at the scene end the camera is cleared and the HUD restored.
//!
//! After the last scene the subject gets back its game mode, visibility,
//! input permissions and position. Every restore step is attempted even when
//! an earlier one fails.

use anyhow::{bail, Result};
use mcbe_core::{GameMode, HostError, SimTick, Vector2, Vector3};
use mcbe_scheduler::{SchedulerRef, Task};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, warn};

/// Screen fade timings, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fade {
    /// Fade to black.
    pub fade_in: f32,
    /// Hold black.
    pub fade_hold: f32,
    /// Fade back.
    pub fade_out: f32,
}

/// One camera move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Camera start position.
    pub pos_start: Vector3,
    /// Camera end position.
    pub pos_end: Vector3,
    /// Point the camera faces at the start.
    pub facing_start: Vector3,
    /// Point the camera faces at the end.
    pub facing_end: Vector3,
    /// Ease duration, in seconds.
    pub duration: f32,
    /// Optional fade played before the move.
    #[serde(default)]
    pub fade: Option<Fade>,
    /// Host ease curve name.
    #[serde(default = "default_ease")]
    pub ease: String,
}

fn default_ease() -> String {
    "linear".to_string()
}

impl Scene {
    fn fade_in_ticks(&self) -> u64 {
        self.fade.map_or(0, |fade| SimTick::from_seconds(fade.fade_in))
    }

    /// Ticks from scene start to scene end.
    pub fn length_ticks(&self) -> u64 {
        SimTick::from_seconds(self.duration) + self.fade_in_ticks()
    }

    /// `camera` commands placing and easing the camera.
    pub fn camera_commands(&self) -> Vec<String> {
        vec![
            format!(
                "camera @s set minecraft:free pos {} facing {}",
                self.pos_start, self.facing_start
            ),
            format!(
                "camera @s set minecraft:free ease {} {} pos {} facing {}",
                self.duration, self.ease, self.pos_end, self.facing_end
            ),
        ]
    }
}

/// Commands run a fixed time after playback starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedCommand {
    /// Seconds after start.
    pub time: f32,
    /// Commands run as the subject.
    pub commands: Vec<String>,
}

/// Orientation for a teleport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Look {
    /// Face a point.
    Facing(Vector3),
    /// Explicit pitch / yaw.
    Rotation(Vector2),
}

/// Player-side operations a cutscene needs.
///
/// Only position, game mode, teleport and command execution are required;
/// everything else defaults to the equivalent slash command.
pub trait CameraSubject {
    /// Current position.
    fn location(&self) -> Vector3;
    /// Current pitch / yaw.
    fn rotation(&self) -> Vector2;
    /// Current game mode.
    fn game_mode(&self) -> GameMode;
    /// Move the subject.
    fn teleport(&self, location: Vector3, look: Look) -> Result<(), HostError>;
    /// Run commands as the subject, in order.
    fn run_commands(&self, commands: &[String]) -> Result<(), HostError>;

    /// Switch game mode.
    fn set_game_mode(&self, mode: GameMode) -> Result<(), HostError> {
        self.run_commands(&[format!("gamemode {} @s", mode.as_str())])
    }

    /// Enable or disable camera and movement input.
    fn set_input_permissions(&self, enabled: bool) -> Result<(), HostError> {
        let state = if enabled { "enabled" } else { "disabled" };
        self.run_commands(&[
            format!("inputpermission set @s camera {state}"),
            format!("inputpermission set @s movement {state}"),
        ])
    }

    /// Hide or restore the HUD.
    fn set_hud_visible(&self, visible: bool) -> Result<(), HostError> {
        let action = if visible { "reset" } else { "hide" };
        self.run_commands(&[format!("hud @s {action} all")])
    }

    /// Apply or clear invisibility.
    fn set_invisible(&self, invisible: bool) -> Result<(), HostError> {
        let command = if invisible {
            "effect @s invisibility infinite 0 true"
        } else {
            "effect @s invisibility 0"
        };
        self.run_commands(&[command.to_string()])
    }

    /// Play a screen fade.
    fn fade(&self, fade: &Fade) -> Result<(), HostError> {
        self.run_commands(&[format!(
            "camera @s fade time {} {} {}",
            fade.fade_in, fade.fade_hold, fade.fade_out
        )])
    }

    /// Place the camera at the scene start and ease to its end.
    fn camera_ease(&self, scene: &Scene) -> Result<(), HostError> {
        self.run_commands(&scene.camera_commands())
    }

    /// Return the camera to the player.
    fn clear_camera(&self) -> Result<(), HostError> {
        self.run_commands(&["camera @s clear".to_string()])
    }
}

/// A playlist of scenes plus timed commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cutscene {
    /// Scenes, played back to back.
    pub scenes: Vec<Scene>,
    /// Commands at fixed offsets from the start.
    #[serde(default)]
    pub timed_commands: Vec<TimedCommand>,
    /// Put the subject in spectator mode while playing.
    #[serde(default = "enabled")]
    pub spectator: bool,
    /// Make the subject invisible while playing.
    #[serde(default = "enabled")]
    pub invisible: bool,
}

fn enabled() -> bool {
    true
}

/// Subject state captured before playback.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    location: Vector3,
    rotation: Vector2,
    game_mode: Option<GameMode>,
}

impl Checkpoint {
    fn capture(subject: &dyn CameraSubject, spectator: bool) -> Self {
        let game_mode = spectator.then(|| match subject.game_mode() {
            GameMode::Spectator => GameMode::Adventure,
            mode => mode,
        });
        Self {
            location: subject.location(),
            rotation: subject.rotation(),
            game_mode,
        }
    }
}

/// Runs restore steps to completion, keeping the first failure.
struct Restore {
    first_error: Option<HostError>,
}

impl Restore {
    fn new() -> Self {
        Self { first_error: None }
    }

    fn step(&mut self, what: &'static str, result: Result<(), HostError>) {
        if let Err(err) = result {
            warn!(step = what, "cutscene restore step failed: {err}");
            self.first_error.get_or_insert(err);
        }
    }

    fn finish(self) -> Result<()> {
        match self.first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

/// Tasks scheduled by [`Cutscene::play`].
pub struct Playback {
    tasks: Vec<Task>,
    total_ticks: u64,
}

impl Playback {
    /// Cancel everything still pending. The subject is not restored.
    pub fn cancel(&self) {
        for task in &self.tasks {
            task.dispose();
        }
    }

    /// Whether any task is still pending.
    pub fn is_playing(&self) -> bool {
        self.tasks.iter().any(Task::is_active)
    }

    /// Ticks from start until the final restore.
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }
}

impl Cutscene {
    /// Cutscene with default options.
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self {
            scenes,
            timed_commands: Vec::new(),
            spectator: true,
            invisible: true,
        }
    }

    /// Ticks from start until the final restore.
    pub fn total_ticks(&self) -> u64 {
        self.scenes.iter().map(Scene::length_ticks).sum()
    }

    /// Lock the subject and schedule every scene.
    ///
    /// Fails without touching the subject when there are no scenes.
    pub fn play(&self, scheduler: &SchedulerRef, subject: Rc<dyn CameraSubject>) -> Result<Playback> {
        if self.scenes.is_empty() {
            bail!("cutscene has no scenes");
        }
        let checkpoint = Checkpoint::capture(&*subject, self.spectator);

        subject.set_input_permissions(false)?;
        subject.set_hud_visible(false)?;
        if self.spectator {
            subject.set_game_mode(GameMode::Spectator)?;
        }
        if self.invisible {
            subject.set_invisible(true)?;
        }

        let mut tasks = Vec::new();
        for timed in &self.timed_commands {
            let subject = Rc::clone(&subject);
            let commands = timed.commands.clone();
            tasks.push(Task::timeout(
                scheduler,
                SimTick::from_seconds(timed.time),
                move || Ok(subject.run_commands(&commands)?),
            ));
        }

        let mut timeline = 0;
        let last = self.scenes.len().saturating_sub(1);
        for (index, scene) in self.scenes.iter().enumerate() {
            if let Some(fade) = scene.fade {
                let subject = Rc::clone(&subject);
                tasks.push(Task::timeout(scheduler, timeline, move || {
                    Ok(subject.fade(&fade)?)
                }));
            }

            let start = {
                let subject = Rc::clone(&subject);
                let scene = scene.clone();
                move || -> Result<()> {
                    subject.teleport(scene.pos_start, Look::Facing(scene.facing_start))?;
                    subject.camera_ease(&scene)?;
                    Ok(())
                }
            };
            tasks.push(Task::timeout(
                scheduler,
                timeline + scene.fade_in_ticks(),
                start,
            ));

            let end = {
                let subject = Rc::clone(&subject);
                let restore = (index == last).then_some(checkpoint);
                let invisible = self.invisible;
                move || -> Result<()> {
                    let mut steps = Restore::new();
                    steps.step("camera", subject.clear_camera());
                    steps.step("hud", subject.set_hud_visible(true));
                    if let Some(checkpoint) = restore {
                        if let Some(mode) = checkpoint.game_mode {
                            steps.step("game mode", subject.set_game_mode(mode));
                        }
                        if invisible {
                            steps.step("visibility", subject.set_invisible(false));
                        }
                        steps.step("input", subject.set_input_permissions(true));
                        steps.step(
                            "position",
                            subject.teleport(checkpoint.location, Look::Rotation(checkpoint.rotation)),
                        );
                        debug!("cutscene finished");
                    }
                    steps.finish()
                }
            };
            timeline += scene.length_ticks();
            tasks.push(Task::timeout(scheduler, timeline, end));
        }

        debug!(scenes = self.scenes.len(), ticks = timeline, "cutscene scheduled");
        Ok(Playback {
            tasks,
            total_ticks: timeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcbe_scheduler::TickScheduler;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Recorder {
        log: RefCell<Vec<(u64, String)>>,
        clock: RefCell<Option<Rc<TickScheduler>>>,
        /// Command that fails instead of being recorded.
        rejects: RefCell<Option<String>>,
        /// Host moves the subject when it enters spectator mode.
        moves_on_spectator: Cell<bool>,
        moved: Cell<bool>,
    }

    impl Recorder {
        fn record(&self, entry: String) {
            use mcbe_scheduler::Scheduler;
            let tick = self
                .clock
                .borrow()
                .as_ref()
                .map_or(0, |clock| clock.current_tick().0);
            self.log.borrow_mut().push((tick, entry));
        }

        fn entries(&self) -> Vec<(u64, String)> {
            self.log.borrow().clone()
        }
    }

    impl CameraSubject for Recorder {
        fn location(&self) -> Vector3 {
            if self.moved.get() {
                Vector3::new(0.0, 200.0, 0.0)
            } else {
                Vector3::new(1.0, 64.0, 1.0)
            }
        }

        fn rotation(&self) -> Vector2 {
            Vector2::new(0.0, 90.0)
        }

        fn game_mode(&self) -> GameMode {
            GameMode::Survival
        }

        fn teleport(&self, location: Vector3, look: Look) -> Result<(), HostError> {
            let look = match look {
                Look::Facing(at) => format!("facing {at}"),
                Look::Rotation(rot) => format!("rotation {rot}"),
            };
            self.record(format!("tp {location} {look}"));
            Ok(())
        }

        fn run_commands(&self, commands: &[String]) -> Result<(), HostError> {
            for command in commands {
                if self.rejects.borrow().as_deref() == Some(command.as_str()) {
                    return Err(HostError::Query(format!("{command} rejected")));
                }
                if command == "gamemode spectator @s" && self.moves_on_spectator.get() {
                    self.moved.set(true);
                }
                self.record(command.clone());
            }
            Ok(())
        }
    }

    fn scene(duration: f32, fade: Option<Fade>) -> Scene {
        Scene {
            pos_start: Vector3::new(0.0, 70.0, 0.0),
            pos_end: Vector3::new(10.0, 70.0, 0.0),
            facing_start: Vector3::new(5.0, 64.0, 5.0),
            facing_end: Vector3::new(5.0, 64.0, 5.0),
            duration,
            fade,
            ease: "in_out_sine".into(),
        }
    }

    fn rig() -> (Rc<TickScheduler>, SchedulerRef, Rc<Recorder>) {
        let ticker = Rc::new(TickScheduler::new());
        let shared: SchedulerRef = ticker.clone();
        let recorder = Rc::new(Recorder::default());
        *recorder.clock.borrow_mut() = Some(ticker.clone());
        (ticker, shared, recorder)
    }

    #[test]
    fn scenes_accumulate_on_the_timeline() {
        let (ticker, shared, recorder) = rig();
        let fade = Fade {
            fade_in: 0.5,
            fade_hold: 0.5,
            fade_out: 0.5,
        };
        let cutscene = Cutscene::new(vec![scene(2.0, None), scene(1.0, Some(fade))]);
        assert_eq!(cutscene.total_ticks(), 40 + 30);

        let playback = cutscene.play(&shared, recorder.clone()).unwrap();
        assert_eq!(playback.total_ticks(), 70);
        ticker.run_ticks(100);
        assert!(!playback.is_playing());

        let at = |tick: u64| -> Vec<String> {
            recorder
                .entries()
                .into_iter()
                .filter(|(t, _)| *t == tick)
                .map(|(_, entry)| entry)
                .collect()
        };

        assert_eq!(
            at(0),
            vec![
                "inputpermission set @s camera disabled",
                "inputpermission set @s movement disabled",
                "hud @s hide all",
                "gamemode spectator @s",
                "effect @s invisibility infinite 0 true",
            ]
        );
        assert_eq!(at(1)[0], "tp 0 70 0 facing 5 64 5");
        assert_eq!(
            at(1)[2],
            "camera @s set minecraft:free ease 2 in_out_sine pos 10 70 0 facing 5 64 5"
        );
        assert_eq!(
            at(40),
            vec!["camera @s clear", "hud @s reset all", "camera @s fade time 0.5 0.5 0.5"]
        );
        assert_eq!(at(50)[0], "tp 0 70 0 facing 5 64 5");
        assert_eq!(
            at(70),
            vec![
                "camera @s clear",
                "hud @s reset all",
                "gamemode survival @s",
                "effect @s invisibility 0",
                "inputpermission set @s camera enabled",
                "inputpermission set @s movement enabled",
                "tp 1 64 1 rotation 0 90",
            ]
        );
    }

    #[test]
    fn timed_commands_run_at_their_offset() {
        let (ticker, shared, recorder) = rig();
        let mut cutscene = Cutscene::new(vec![scene(3.0, None)]);
        cutscene.spectator = false;
        cutscene.invisible = false;
        cutscene.timed_commands.push(TimedCommand {
            time: 1.5,
            commands: vec!["say halfway".into()],
        });
        cutscene.play(&shared, recorder.clone()).unwrap();
        ticker.run_ticks(80);

        assert!(recorder
            .entries()
            .contains(&(30, "say halfway".to_string())));
        assert!(!recorder
            .entries()
            .iter()
            .any(|(_, entry)| entry.starts_with("gamemode") || entry.starts_with("effect")));
    }

    #[test]
    fn cancel_leaves_nothing_pending() {
        let (ticker, shared, recorder) = rig();
        let playback = Cutscene::new(vec![scene(1.0, None)])
            .play(&shared, recorder.clone())
            .unwrap();
        playback.cancel();
        ticker.run_ticks(40);
        assert_eq!(recorder.entries().len(), 5);
        assert_eq!(ticker.pending(), 0);
    }

    #[test]
    fn empty_playlist_is_rejected_before_locking() {
        let (ticker, shared, recorder) = rig();
        let result = Cutscene::new(Vec::new()).play(&shared, recorder.clone());
        assert!(result.is_err());
        ticker.run_ticks(20);
        assert!(recorder.entries().is_empty());
        assert_eq!(ticker.pending(), 0);
    }

    #[test]
    fn restore_continues_past_failed_step() {
        let (ticker, shared, recorder) = rig();
        *recorder.rejects.borrow_mut() = Some("camera @s clear".to_string());
        Cutscene::new(vec![scene(1.0, None)])
            .play(&shared, recorder.clone())
            .unwrap();
        ticker.run_ticks(30);

        let last: Vec<String> = recorder
            .entries()
            .into_iter()
            .filter(|(t, _)| *t == 20)
            .map(|(_, entry)| entry)
            .collect();
        assert_eq!(
            last,
            vec![
                "hud @s reset all",
                "gamemode survival @s",
                "effect @s invisibility 0",
                "inputpermission set @s camera enabled",
                "inputpermission set @s movement enabled",
                "tp 1 64 1 rotation 0 90",
            ]
        );
    }

    #[test]
    fn pose_is_captured_before_game_mode_switch() {
        let (ticker, shared, recorder) = rig();
        recorder.moves_on_spectator.set(true);
        Cutscene::new(vec![scene(1.0, None)])
            .play(&shared, recorder.clone())
            .unwrap();
        ticker.run_ticks(30);
        let (tick, last) = recorder.entries().pop().unwrap();
        assert_eq!(tick, 20);
        assert_eq!(last, "tp 1 64 1 rotation 0 90");
    }

    #[test]
    fn cutscene_reads_from_toml() {
        let cutscene: Cutscene = toml::from_str(
            r#"
            [[scenes]]
            pos_start = { x = 0.0, y = 70.0, z = 0.0 }
            pos_end = { x = 4.0, y = 70.0, z = 0.0 }
            facing_start = { x = 0.0, y = 64.0, z = 0.0 }
            facing_end = { x = 4.0, y = 64.0, z = 0.0 }
            duration = 2.0
            fade = { fade_in = 1.0, fade_hold = 0.5, fade_out = 1.0 }
            "#,
        )
        .unwrap();
        assert!(cutscene.spectator && cutscene.invisible);
        assert_eq!(cutscene.scenes[0].ease, "linear");
        assert_eq!(cutscene.total_ticks(), 60);
    }
}
