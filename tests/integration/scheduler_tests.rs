//! Integration tests: full ticks through the scheduler with every port mocked.

use crate::mock_hw::{
    LogSink, MockConsole, MockHardware, MockScreen, MockStore, MockSystem, OutputCall,
};

use fogprop::app::events::AppEvent;
use fogprop::app::service::AppService;
use fogprop::app::state::ActuatorKind;
use fogprop::config::SystemConfig;
use fogprop::scheduler::{Scheduler, TickReport};

struct Loop {
    sched: Scheduler,
    app: AppService,
    hw: MockHardware,
    store: MockStore,
    screen: MockScreen,
    console: MockConsole,
    system: MockSystem,
    sink: LogSink,
}

impl Loop {
    fn new(config: SystemConfig) -> Self {
        Self {
            sched: Scheduler::new(&config),
            app: AppService::new(&config),
            hw: MockHardware::new(),
            store: MockStore::new(),
            screen: MockScreen::default(),
            console: MockConsole::default(),
            system: MockSystem::default(),
            sink: LogSink::new(),
        }
    }

    fn tick(&mut self) -> TickReport {
        self.sched.tick(
            &mut self.app,
            &mut self.hw,
            &mut self.store,
            &mut self.screen,
            &mut self.console,
            &mut self.system,
            &mut self.sink,
        )
    }
}

fn quiet() -> SystemConfig {
    SystemConfig {
        heartbeat_enabled: false,
        ..Default::default()
    }
}

#[test]
fn fog_command_is_persisted_on_the_next_tick() {
    let mut lp = Loop::new(quiet());
    lp.console.send("fogOn 75");

    lp.tick();
    assert_eq!(lp.console.replies, vec!["fogOn 75"]);
    assert_eq!(lp.app.intensity(ActuatorKind::Fog), 75);
    assert_eq!(lp.app.previous_intensity(ActuatorKind::Fog), 75);
    assert!(lp.app.is_dirty());

    lp.tick();
    assert_eq!(lp.store.record()[0], Some(75));
    assert_eq!(lp.store.record()[1], Some(75));
    assert!(!lp.app.is_dirty());
}

#[test]
fn one_command_per_tick() {
    let mut lp = Loop::new(quiet());
    lp.console.send("fogOn 10");
    lp.console.send("pumpOn 20");
    lp.console.send("homebridgeStatus");

    lp.tick();
    assert_eq!(lp.console.replies.len(), 1);
    lp.tick();
    lp.tick();
    assert_eq!(lp.console.replies, vec!["fogOn 10", "pumpOn 20", "homebridgeStatus 1"]);
}

#[test]
fn status_is_rendered_every_tick() {
    let mut lp = Loop::new(quiet());
    lp.console.send("pumpOn 50");
    for _ in 0..3 {
        lp.tick();
    }
    assert_eq!(lp.screen.frames.len(), 3);
    let last = lp.screen.frames[2];
    assert_eq!(last.pump, 50);
    assert!(last.any_active);
    assert_eq!(last.uptime_secs, 2);
}

#[test]
fn day_long_uptime_triggers_one_restart() {
    let mut lp = Loop::new(quiet());
    let ticks_per_day = 86_400;
    for _ in 0..ticks_per_day {
        lp.tick();
    }
    assert_eq!(lp.system.restarts, 0);

    assert!(lp.tick().restarted);
    assert_eq!(lp.system.restarts, 1);
    assert_eq!(lp.sched.uptime_secs(), 0);
    assert_eq!(lp.sink.count(|e| matches!(e, AppEvent::Restarting { .. })), 1);
}

#[test]
fn pending_change_is_flushed_before_restart() {
    let config = SystemConfig {
        restart_after_secs: 2,
        ..quiet()
    };
    let mut lp = Loop::new(config);
    lp.tick();
    lp.console.send("ledOn 40");
    lp.tick();
    assert!(lp.app.is_dirty());

    let report = lp.tick();
    assert!(report.flushed);
    assert!(report.restarted);
    assert_eq!(lp.store.record()[4], Some(40));
}

#[test]
fn restart_flushes_even_when_no_flush_is_due() {
    let config = SystemConfig {
        restart_after_secs: 2,
        flush_interval_ticks: 5,
        ..quiet()
    };
    let mut lp = Loop::new(config);
    lp.console.send("fogOn 75");
    lp.tick();
    lp.tick();
    assert!(lp.app.is_dirty());
    assert_eq!(lp.store.record()[0], None);

    let report = lp.tick();
    assert!(report.restarted);
    assert!(report.flushed);
    assert!(!lp.app.is_dirty());
    assert_eq!(lp.store.record()[0], Some(75));
    assert_eq!(lp.store.record()[1], Some(75));
    assert_eq!(lp.system.restarts, 1);
}

#[test]
fn heartbeat_pulses_the_light_without_persisting() {
    let mut lp = Loop::new(SystemConfig::default());
    lp.console.send("ledOn 20");
    lp.tick();
    lp.tick();
    assert_eq!(lp.store.commits, 1);

    lp.hw.clear();
    lp.tick();
    let levels = lp.hw.levels_of(ActuatorKind::Light);
    assert_eq!(levels.iter().min(), Some(&10));
    assert_eq!(levels.last(), Some(&20));
    assert!(lp.hw.calls.iter().any(|c| matches!(c, OutputCall::Hold(5))));

    assert_eq!(lp.app.intensity(ActuatorKind::Light), 20);
    assert!(!lp.app.is_dirty());
    lp.tick();
    assert_eq!(lp.store.commits, 1);
}

#[test]
fn heartbeat_skips_a_dark_light() {
    let mut lp = Loop::new(SystemConfig::default());
    lp.console.send("fogOn 50");
    lp.tick();
    assert!(lp.hw.levels_of(ActuatorKind::Light).is_empty());
}

#[test]
fn flush_failure_does_not_stop_the_loop() {
    let mut lp = Loop::new(quiet());
    lp.store.fail_commits = true;
    lp.console.send("pumpOn 30");
    lp.tick();
    lp.tick();
    assert!(lp.app.is_dirty());
    lp.console.send("homebridgeStatus");
    lp.tick();
    assert_eq!(lp.console.replies.last().map(String::as_str), Some("homebridgeStatus 1"));

    lp.store.fail_commits = false;
    lp.tick();
    assert!(!lp.app.is_dirty());
    assert_eq!(lp.store.record()[2], Some(30));
}
