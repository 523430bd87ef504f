//! End-to-end director scenarios
//!
//! Each scenario drives a simulator through one behavior and collects
//! violations instead of panicking, so the whole suite can be run and
//! reported as one.

use std::time::Duration;

use puppet_core::{Command, EngineTime, Step, SyncSettings};

use crate::{marked_library, RecordingRenderer, ScriptedAudio, SimConfig, StageSimulator};
use puppet_time::ManualClock;

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Clone, Debug)]
pub struct ScenarioResult {
    pub name: &'static str,
    pub violations: Vec<String>,
}

impl ScenarioResult {
    fn new(name: &'static str) -> Self {
        ScenarioResult {
            name,
            violations: Vec::new(),
        }
    }

    fn check(&mut self, ok: bool, what: impl Into<String>) {
        if !ok {
            self.violations.push(what.into());
        }
    }

    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn motions_after(renderer: &RecordingRenderer, t: EngineTime) -> Vec<String> {
    renderer
        .timed_motions()
        .into_iter()
        .filter(|(_, at)| *at > t)
        .map(|(group, _)| group)
        .collect()
}

// ============================================================================
// SCENARIOS
// ============================================================================

/// An interrupt stops a looping scene at once and it never comes back
pub fn scenario_interrupt_stops_loop() -> ScenarioResult {
    let mut result = ScenarioResult::new("interrupt_stops_loop");
    let library = marked_library(
        &[("a", &[("x", 1.0)]), ("b", &[("x", 2.0)]), ("c", &[("x", 3.0)])],
        &[("ab", vec![Step::timed("a", 100), Step::timed("b", 100)])],
    );
    let mut sim = StageSimulator::new(library, SimConfig::default().with_idle_timeout(ms(60_000)));

    sim.submit(Command::scene("ab", true));
    sim.run_for(ms(450));
    result.check(
        sim.renderer().motions().len() >= 4,
        "loop should have cycled at least twice",
    );

    let interrupted_at = sim.now();
    sim.submit(Command::profile("c").interrupting());
    sim.run_for(ms(2_000));

    let after = motions_after(sim.renderer(), interrupted_at);
    result.check(after.is_empty(), format!("steps after interrupt: {after:?}"));
    result.check(sim.current_profile() == Some("c"), "c should be current");
    result.check(!sim.director().stage().execution.is_looping, "looping flag cleared");
    result.check(
        sim.director().stage().execution.current_scene.is_none(),
        "scene cleared",
    );
    result
}

/// Non-interrupting commands run in submission order after the current one
pub fn scenario_queue_preserves_order() -> ScenarioResult {
    let mut result = ScenarioResult::new("queue_preserves_order");
    let library = marked_library(
        &[("a", &[]), ("b", &[]), ("p1", &[]), ("p2", &[])],
        &[("ab", vec![Step::timed("a", 100), Step::timed("b", 100)])],
    );
    let mut sim = StageSimulator::new(library, SimConfig::default().with_idle_timeout(ms(60_000)));

    sim.submit(Command::scene("ab", false));
    sim.run_for(ms(30));
    sim.submit(Command::profile("p1"));
    sim.submit(Command::profile("p2"));
    result.check(sim.director().queue_len() == 2, "two commands queued");

    sim.run_for(ms(500));
    let motions = sim.renderer().motions();
    result.check(
        motions == ["a", "b", "p1", "p2"],
        format!("application order {motions:?}"),
    );
    result.check(sim.director().queue_len() == 0, "queue drained");
    result.check(!sim.director().is_processing(), "nothing processing");
    result
}

/// Parameters missing from an applied profile revert to the default baseline
pub fn scenario_baseline_revert() -> ScenarioResult {
    let mut result = ScenarioResult::new("baseline_revert");
    let library = marked_library(
        &[
            ("default", &[("x", 0.0), ("y", 0.0)]),
            ("B", &[("x", 5.0), ("y", 9.0)]),
            ("A", &[("x", 1.0)]),
        ],
        &[],
    );
    let mut sim = StageSimulator::new(library, SimConfig::default().with_idle_timeout(ms(60_000)));

    sim.submit(Command::profile("B"));
    sim.run_for(ms(200));
    sim.submit(Command::profile("A"));

    let targets = &sim.director().stage().targets;
    result.check(targets.get("x") == Some(1.0), format!("x target {:?}", targets.get("x")));
    result.check(targets.get("y") == Some(0.0), format!("y target {:?}", targets.get("y")));

    sim.run_for(ms(3_000));
    let x = sim.renderer().value("x").unwrap_or(f32::NAN);
    let y = sim.renderer().value("y").unwrap_or(f32::NAN);
    result.check((x - 1.0).abs() < 0.01, format!("rendered x {x}"));
    result.check(y.abs() < 0.01, format!("rendered y {y}"));
    result
}

/// Idle fires only past the timeout, and only once
pub fn scenario_idle_timing() -> ScenarioResult {
    let mut result = ScenarioResult::new("idle_timing");
    let library = marked_library(&[("idle", &[("x", -1.0)]), ("a", &[("x", 1.0)])], &[]);
    let config = SimConfig {
        frame: ms(1),
        ..SimConfig::default().with_idle_timeout(ms(1_000))
    };
    let mut sim = StageSimulator::new(library, config);

    sim.submit(Command::profile("a"));
    sim.run_for(ms(1_000));
    result.check(
        !sim.director().stage().execution.is_idle,
        "idle at exactly the timeout",
    );

    sim.run_for(ms(4_000));
    let entries = sim.idle_entries().to_vec();
    result.check(entries.len() == 1, format!("idle entries {entries:?}"));
    result.check(
        entries.first() == Some(&EngineTime::from_millis(1_001)),
        format!("idle entered at {entries:?}"),
    );
    let idle_applications = sim
        .renderer()
        .motions()
        .iter()
        .filter(|m| *m == "idle")
        .count();
    result.check(idle_applications == 1, format!("idle applied {idle_applications} times"));
    result
}

/// A step naming a deleted profile is skipped; later steps keep their timing
pub fn scenario_deleted_profile_skipped() -> ScenarioResult {
    let mut result = ScenarioResult::new("deleted_profile_skipped");
    let library = marked_library(
        &[("a", &[]), ("c", &[]), ("d", &[])],
        &[(
            "s",
            vec![
                Step::timed("a", 100),
                Step::timed("deleted", 300),
                Step::timed("c", 200),
                Step::named("d"),
            ],
        )],
    );
    let mut sim = StageSimulator::new(library, SimConfig::default().with_idle_timeout(ms(60_000)));

    sim.submit(Command::scene("s", false));
    sim.run_for(ms(1_000));

    let timed = sim.renderer().timed_motions();
    let names: Vec<&str> = timed.iter().map(|(g, _)| g.as_str()).collect();
    result.check(names == ["a", "c", "d"], format!("applied {names:?}"));
    if let [(_, a), (_, c), (_, d)] = timed.as_slice() {
        result.check(c.since(*a) == ms(100), format!("c after {:?}", c.since(*a)));
        result.check(d.since(*c) == ms(200), format!("d after {:?}", d.since(*c)));
    }
    result
}

/// A cancelled loop stays dead even after its old deadlines pass
pub fn scenario_cancelled_loop_never_resumes() -> ScenarioResult {
    let mut result = ScenarioResult::new("cancelled_loop_never_resumes");
    let library = marked_library(
        &[("a", &[]), ("b", &[]), ("rest", &[])],
        &[("ab", vec![Step::timed("a", 500), Step::timed("b", 500)])],
    );
    let mut sim = StageSimulator::new(library, SimConfig::default().with_idle_timeout(ms(60_000)));

    sim.submit(Command::scene("ab", true));
    sim.run_for(ms(100));
    let generation = sim.director().generation();

    sim.submit(Command::profile("rest").interrupting());
    let cancelled_at = sim.now();
    sim.run_for(ms(5_000));

    let after = motions_after(sim.renderer(), cancelled_at);
    result.check(after.is_empty(), format!("loop resumed: {after:?}"));
    result.check(sim.director().generation() > generation, "generation advanced");
    result.check(sim.director().stats().executions_cancelled == 1, "one cancellation");
    result
}

/// A scene reference beats an explicit step list in the same payload
pub fn scenario_scene_beats_sequence() -> ScenarioResult {
    let mut result = ScenarioResult::new("scene_beats_sequence");
    let library = marked_library(
        &[("from_scene", &[]), ("from_list", &[])],
        &[("s", vec![Step::named("from_scene")])],
    );
    let mut sim = StageSimulator::new(library, SimConfig::default());

    let mut command = Command::sequence(vec![Step::named("from_list")], false);
    if let Some(payload) = command.payload.as_mut() {
        payload.scene = Some("s".into());
    }
    sim.submit(command);
    sim.run_for(ms(100));

    let motions = sim.renderer().motions();
    result.check(motions == ["from_scene"], format!("applied {motions:?}"));
    result
}

/// Commands beyond queue capacity are shed, newest first
pub fn scenario_queue_sheds_newest() -> ScenarioResult {
    let mut result = ScenarioResult::new("queue_sheds_newest");
    let library = marked_library(
        &[("long", &[]), ("q1", &[]), ("q2", &[]), ("q3", &[])],
        &[("hold", vec![Step::timed("long", 200)])],
    );
    let mut sim = StageSimulator::new(
        library,
        SimConfig::default()
            .with_queue_capacity(2)
            .with_idle_timeout(ms(60_000)),
    );

    sim.submit(Command::scene("hold", false));
    for id in ["q1", "q2", "q3"] {
        sim.submit(Command::profile(id));
    }
    result.check(sim.director().shed_count() == 1, "one command shed");

    sim.run_for(ms(500));
    let motions = sim.renderer().motions();
    result.check(motions == ["long", "q1", "q2"], format!("applied {motions:?}"));
    result
}

/// Speech holds the execution open, drives the mouth, and resets on end
pub fn scenario_speech_lifecycle() -> ScenarioResult {
    let mut result = ScenarioResult::new("speech_lifecycle");
    let library = marked_library(
        &[("default", &[("x", 0.0)]), ("talk", &[("x", 1.0)]), ("next", &[])],
        &[],
    );
    let clock = ManualClock::new();
    let audio = ScriptedAudio::new(clock.clone()).with_clip("http://media/hello.mp3", ms(400));
    let mut sim = StageSimulator::with_audio(
        library,
        SimConfig::default().with_idle_timeout(ms(200)),
        clock,
        audio,
    );

    sim.submit(
        Command::profile("talk")
            .with_audio("http://media/hello.mp3")
            .with_message("hello"),
    );
    sim.submit(Command::profile("next"));
    result.check(sim.renderer().subtitle().as_deref() == Some("hello"), "subtitle shown");
    result.check(sim.director().queue_len() == 1, "next waits behind speech");

    sim.run_for(ms(300));
    result.check(sim.director().is_talking(), "still talking");
    result.check(
        !sim.director().stage().execution.is_idle,
        "idle must not fire while talking",
    );
    let mouth = sim.renderer().value("ParamMouthOpenY").unwrap_or(0.0);
    result.check((mouth - 0.5).abs() < 1e-3, format!("mouth level {mouth}"));
    result.check(sim.renderer().motions() == ["talk"], "next not started during speech");

    let ended = sim.run_until(ms(500), |s| !s.director().is_talking());
    result.check(ended, "speech ended");
    result.check(sim.renderer().subtitle().is_none(), "subtitle cleared");
    result.check(sim.renderer().motions() == ["talk", "next"], "queued command ran after speech");
    let x = sim.director().stage().targets.get("x");
    result.check(x == Some(0.0), format!("x target after speech {x:?}"));
    result
}

/// With sync switched off mid-clip, the end of speech leaves targets alone
pub fn scenario_speech_end_without_sync() -> ScenarioResult {
    let mut result = ScenarioResult::new("speech_end_without_sync");
    let library = marked_library(&[("default", &[("x", 0.0)]), ("talk", &[("x", 1.0)])], &[]);
    let clock = ManualClock::new();
    let audio = ScriptedAudio::new(clock.clone()).with_clip("http://media/hello.mp3", ms(300));
    let mut sim = StageSimulator::with_audio(library, SimConfig::default(), clock, audio);

    sim.submit(Command::profile("talk").with_audio("http://media/hello.mp3"));
    sim.run_for(ms(100));
    sim.director_mut().apply_settings(SyncSettings {
        is_muted: false,
        is_sync_enabled: false,
    });

    let ended = sim.run_until(ms(500), |s| !s.director().is_talking());
    result.check(ended, "speech ended");
    let x = sim.director().stage().targets.get("x");
    result.check(x == Some(1.0), format!("x target after speech {x:?}"));
    result.check(!sim.director().is_processing(), "execution completed");
    result
}

/// Interrupting speech silences it at once and its end never fires later
pub fn scenario_interrupt_silences_speech() -> ScenarioResult {
    let mut result = ScenarioResult::new("interrupt_silences_speech");
    let library = marked_library(
        &[("default", &[("x", 0.0)]), ("talk", &[("x", 1.0)]), ("other", &[("x", 0.5)])],
        &[],
    );
    let clock = ManualClock::new();
    let audio = ScriptedAudio::new(clock.clone()).with_clip("http://media/hello.mp3", ms(400));
    let mut sim = StageSimulator::with_audio(
        library,
        SimConfig::default().with_idle_timeout(ms(60_000)),
        clock,
        audio,
    );

    sim.submit(
        Command::profile("talk")
            .with_audio("http://media/hello.mp3")
            .with_message("hello"),
    );
    sim.run_for(ms(100));
    result.check(sim.director().is_talking(), "talking before interrupt");

    sim.submit(Command::profile("other").interrupting());
    result.check(!sim.director().is_talking(), "talking after interrupt");
    result.check(!sim.audio().is_playing(), "clip still playing");
    result.check(sim.renderer().subtitle().is_none(), "subtitle cleared");

    sim.run_for(ms(1_000));
    let x = sim.director().stage().targets.get("x");
    result.check(x == Some(0.5), format!("x target after clip length {x:?}"));
    result.check(
        sim.director().audio().stats().clips_ended == 0,
        "interrupted clip reported as ended",
    );
    result
}

/// A clip that fails to start does not hold up the queue
pub fn scenario_broken_audio_does_not_block() -> ScenarioResult {
    let mut result = ScenarioResult::new("broken_audio_does_not_block");
    let library = marked_library(&[("a", &[]), ("b", &[])], &[]);
    let clock = ManualClock::new();
    let audio = ScriptedAudio::new(clock.clone()).with_broken("http://media/missing.mp3");
    let mut sim = StageSimulator::with_audio(library, SimConfig::default(), clock, audio);

    sim.submit(Command::profile("a").with_audio("http://media/missing.mp3"));
    sim.submit(Command::profile("b"));

    result.check(!sim.director().is_talking(), "not talking");
    result.check(sim.renderer().motions() == ["a", "b"], "both ran at once");
    result
}

/// Mute applies to the clip already playing
pub fn scenario_mute_applies_live() -> ScenarioResult {
    let mut result = ScenarioResult::new("mute_applies_live");
    let mut sim = StageSimulator::new(marked_library(&[], &[]), SimConfig::default());

    sim.submit(Command::default().with_audio("http://media/a.mp3"));
    sim.run_for(ms(50));
    result.check(!sim.audio().is_muted(), "starts unmuted");

    sim.director_mut().apply_settings(SyncSettings {
        is_muted: true,
        is_sync_enabled: true,
    });
    result.check(sim.audio().is_muted(), "muted while playing");
    result.check(sim.audio().is_playing(), "still playing");
    result
}

/// Every scenario, in order
pub fn run_all_scenarios() -> Vec<ScenarioResult> {
    vec![
        scenario_interrupt_stops_loop(),
        scenario_queue_preserves_order(),
        scenario_baseline_revert(),
        scenario_idle_timing(),
        scenario_deleted_profile_skipped(),
        scenario_cancelled_loop_never_resumes(),
        scenario_scene_beats_sequence(),
        scenario_queue_sheds_newest(),
        scenario_speech_lifecycle(),
        scenario_speech_end_without_sync(),
        scenario_interrupt_silences_speech(),
        scenario_broken_audio_does_not_block(),
        scenario_mute_applies_live(),
    ]
}
