mod common;
use common::{assert_float_eq, init_logger, ScriptedSource};

use offload_sim::access_control::AccessControlPolicy;
use offload_sim::event::EventType;
use offload_sim::experiment::SimulationCallbacks;
use offload_sim::interrupt::VictimSelectionPolicy;
use offload_sim::random::Stream;
use offload_sim::state::PopulationState;
use offload_sim::stats::Layer;
use offload_sim::{OffloadSimulation, SimulationConfig, SimulationError, TaskClass};

fn idle_config() -> SimulationConfig {
    SimulationConfig {
        cloudlet_capacity: 1,
        class2_threshold: 1,
        arrival_rate_class1: 0.,
        arrival_rate_class2: 0.,
        stop: 100.,
        batch_means: false,
        ..Default::default()
    }
}

#[derive(Clone, Default)]
struct InvariantChecker {
    last_instant: f64,
    steps: u64,
    offloads: u64,
}

impl SimulationCallbacks for InvariantChecker {
    fn on_simulation_start(&mut self, sim: &mut OffloadSimulation) {
        self.last_instant = sim.current_time();
    }

    fn on_step(&mut self, sim: &mut OffloadSimulation) -> bool {
        assert!(sim.current_time() >= self.last_instant);
        self.last_instant = sim.current_time();
        assert!(sim.cloudlet().state().total_len() <= sim.config().cloudlet_capacity);
        if sim.event_type() == EventType::OffloadRequest {
            assert!(sim.current_time() <= sim.config().stop);
            self.offloads += 1;
        }
        self.steps += 1;
        true
    }
}

#[test]
fn test_single_task_on_cloudlet() {
    init_logger();
    let source = ScriptedSource::new().with(Stream::CloudletClass1, &[5.]);
    let mut sim = OffloadSimulation::with_random_source(idle_config(), Box::new(source)).unwrap();
    sim.inject_offload_request(TaskClass::Class1, 0.).unwrap();

    assert!(sim.step().unwrap());
    assert_eq!(sim.event_type(), EventType::OffloadRequest);
    assert_eq!(sim.cloudlet().state().len(TaskClass::Class1), 1);
    assert_eq!(sim.cloudlet().state().len(TaskClass::Class2), 0);
    assert!(sim.mobile_set().state().is_empty());

    assert!(sim.step().unwrap());
    assert_eq!(sim.event_type(), EventType::CloudletCompletion);
    assert_float_eq(sim.current_time(), 5., 1e-12);
    assert_eq!(sim.statistics().completions(Layer::Cloudlet, TaskClass::Class1), 1);

    assert!(!sim.step().unwrap());
    assert_eq!(sim.event_type(), EventType::Stop);
    assert!(sim.is_finished());
    assert!(!sim.step().unwrap());

    let report = sim.report();
    assert!(report.batch_means.is_none());
    assert_eq!(report.completions, 1);
    assert_float_eq(report.elapsed_time, 5., 1e-12);
    assert_float_eq(report.metrics.cloudlet_throughput.mean, 0.2, 1e-12);
    assert_float_eq(report.metrics.cloudlet_class1_response_time.mean, 5., 1e-12);
    assert_float_eq(report.metrics.cloudlet_population.mean, 1., 1e-12);
    assert_eq!(report.metrics.cloud_throughput.mean, 0.);
}

#[test]
fn test_preemption_moves_class2_task_to_cloud() {
    init_logger();
    let config = SimulationConfig {
        access_control: AccessControlPolicy::Algorithm2,
        cloudlet_service_rate_class2: 0.5,
        cloud_service_rate_class2: 0.25,
        ..idle_config()
    };
    let source = ScriptedSource::new()
        .with(Stream::CloudletClass2, &[10.])
        .with(Stream::CloudletClass1, &[3.])
        .with(Stream::CloudSetup, &[2.]);
    let mut sim = OffloadSimulation::with_random_source(config, Box::new(source)).unwrap();
    sim.inject_offload_request(TaskClass::Class2, 0.).unwrap();
    sim.inject_offload_request(TaskClass::Class1, 1.).unwrap();

    sim.step().unwrap();
    assert_eq!(sim.cloudlet().state().len(TaskClass::Class2), 1);

    sim.step().unwrap();
    assert_eq!(sim.event_type(), EventType::OffloadRequest);
    assert_eq!(sim.cloudlet().state().len(TaskClass::Class1), 1);
    assert_eq!(sim.cloudlet().state().len(TaskClass::Class2), 0);
    let resumed = sim.cloud().state().tasks(TaskClass::Class2)[0];
    assert!(!resumed.is_interrupted());
    assert_eq!(resumed.arrival(), Some(1.));
    // setup 2 plus residual (10 - 1) * 0.5 / 0.25
    assert_float_eq(resumed.completion().unwrap(), 21., 1e-9);
    assert_eq!(sim.statistics().interrupted(), 1);

    sim.run().unwrap();
    let report = sim.report();
    assert_eq!(report.completions, 2);
    assert_float_eq(report.elapsed_time, 21., 1e-9);
    assert_float_eq(report.metrics.class2_interrupted_response_time.mean, 21., 1e-9);
    assert_float_eq(report.metrics.class2_interrupted_fraction.mean, 1., 1e-12);
    assert_float_eq(report.metrics.cloud_class2_response_time.mean, 20., 1e-9);
    assert_float_eq(report.metrics.cloudlet_class1_response_time.mean, 3., 1e-9);
    assert_float_eq(report.metrics.cloudlet_class2_population.mean, 0., 1e-12);
    assert_float_eq(report.metrics.system_response_time.mean, 11.5, 1e-9);
}

#[test]
fn test_start_seeds_both_classes() {
    let config = SimulationConfig {
        start: 5.,
        stop: 50.,
        ..Default::default()
    };
    let mut sim = OffloadSimulation::new(config).unwrap();
    assert_eq!(sim.event_type(), EventType::Stop);
    assert!(sim.step().unwrap());
    assert_eq!(sim.event_type(), EventType::Start);
    let mobile = sim.mobile_set().state();
    assert_eq!(mobile.len(TaskClass::Class1), 1);
    assert_eq!(mobile.len(TaskClass::Class2), 1);
    for class in TaskClass::ALL {
        assert!(mobile.tasks(class)[0].arrival().unwrap() >= 5.);
    }
    assert_eq!(sim.timed_events(), 0);
}

#[test]
fn test_no_arrivals_stops_after_start() {
    let mut sim = OffloadSimulation::new(idle_config()).unwrap();
    assert!(sim.step().unwrap());
    assert_eq!(sim.event_type(), EventType::Start);
    assert!(!sim.step().unwrap());
    assert_eq!(sim.event_type(), EventType::Stop);
    assert_eq!(sim.timed_events(), 0);
    assert_eq!(sim.report().completions, 0);
}

#[test]
fn test_inject_in_the_past() {
    let source = ScriptedSource::new();
    let mut sim = OffloadSimulation::with_random_source(idle_config(), Box::new(source)).unwrap();
    sim.inject_offload_request(TaskClass::Class1, 3.).unwrap();
    sim.step().unwrap();
    assert!(matches!(
        sim.inject_offload_request(TaskClass::Class2, 2.),
        Err(SimulationError::ClockBackwards { .. })
    ));
}

#[test]
fn test_late_arrivals_are_discarded() {
    let source = ScriptedSource::new();
    let config = SimulationConfig {
        stop: 10.,
        ..idle_config()
    };
    let mut sim = OffloadSimulation::with_random_source(config, Box::new(source)).unwrap();
    sim.inject_offload_request(TaskClass::Class1, 11.).unwrap();
    sim.inject_offload_request(TaskClass::Class2, 12.).unwrap();
    // nothing is left once both requests are dropped, so the run starts and stops without timed events
    assert!(sim.step().unwrap());
    assert_eq!(sim.event_type(), EventType::Start);
    assert!(sim.mobile_set().state().is_empty());
    assert!(!sim.step().unwrap());
    assert_eq!(sim.event_type(), EventType::Stop);
    assert_eq!(sim.timed_events(), 0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = SimulationConfig {
        class2_threshold: 30,
        ..Default::default()
    };
    assert!(OffloadSimulation::new(config).is_err());
}

#[test]
fn test_runs_terminate_and_keep_invariants() {
    init_logger();
    let configs = [
        SimulationConfig {
            stop: 300.,
            ..Default::default()
        },
        SimulationConfig {
            stop: 300.,
            class2_threshold: 12,
            access_control: AccessControlPolicy::Algorithm2,
            ..Default::default()
        },
        SimulationConfig {
            stop: 300.,
            cloudlet_capacity: 3,
            class2_threshold: 1,
            access_control: AccessControlPolicy::Algorithm2,
            victim_selection: VictimSelectionPolicy::MaxCompletionTime,
            mean_setup_time: 0.,
            batch_means: false,
            ..Default::default()
        },
    ];
    for config in configs {
        let mut sim = OffloadSimulation::new(config).unwrap();
        let mut checker = InvariantChecker::default();
        sim.run_with_callbacks(&mut checker).unwrap();
        assert!(sim.is_finished());
        assert!(sim.mobile_set().state().is_empty());
        assert!(sim.cloudlet().state().is_empty());
        assert!(sim.cloud().state().is_empty());
        assert!(checker.offloads > 0);
        assert_eq!(checker.steps + 1, sim.timed_events() + 2);
    }
}

#[test]
fn test_preemptions_happen_under_load() {
    let config = SimulationConfig {
        stop: 500.,
        class2_threshold: 10,
        access_control: AccessControlPolicy::Algorithm2,
        batch_means: false,
        ..Default::default()
    };
    let mut sim = OffloadSimulation::new(config).unwrap();
    sim.run().unwrap();
    let report = sim.report();
    assert!(sim.statistics().interrupted() > 0);
    assert!(report.metrics.class2_interrupted_fraction.mean > 0.);
    assert!(report.metrics.class2_interrupted_fraction.mean <= 1.);
    assert!(report.metrics.class2_interrupted_response_time.mean > 0.);
}

#[test]
fn test_same_seed_same_results() {
    let config = SimulationConfig {
        stop: 1000.,
        batch_size: 1000,
        access_control: AccessControlPolicy::Algorithm2,
        class2_threshold: 15,
        ..Default::default()
    };
    let mut first = OffloadSimulation::new(config.clone()).unwrap();
    let mut second = OffloadSimulation::new(config.clone()).unwrap();
    first.run().unwrap();
    second.run().unwrap();
    let (a, b) = (first.report(), second.report());
    assert!(a.batch_means.unwrap().batches > 1);
    assert_eq!(a.metrics, b.metrics);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );

    let mut other = OffloadSimulation::new(SimulationConfig { seed: 42, ..config }).unwrap();
    other.run().unwrap();
    assert_ne!(other.report().metrics, a.metrics);
}

#[test]
fn test_single_batch_matches_plain_run() {
    let events = 200;
    let base = SimulationConfig {
        stop: 1000.,
        access_control: AccessControlPolicy::Algorithm2,
        class2_threshold: 5,
        ..Default::default()
    };
    let mut plain = OffloadSimulation::new(SimulationConfig {
        batch_means: false,
        ..base.clone()
    })
    .unwrap();
    let mut batched = OffloadSimulation::new(SimulationConfig {
        batch_means: true,
        batch_size: events,
        ..base
    })
    .unwrap();
    while plain.timed_events() < events {
        assert!(plain.step().unwrap());
    }
    while batched.timed_events() < events {
        assert!(batched.step().unwrap());
    }

    let report = batched.report();
    assert_eq!(report.batch_means.unwrap().batches, 1);
    let expected = plain.statistics().metrics();
    assert_eq!(report.metrics.system_response_time.mean, expected.system_response_time);
    assert_eq!(report.metrics.cloud_population.mean, expected.cloud_population);
    assert!(report.metrics.system_response_time.half_width.is_none());
    assert_eq!(report.metrics.map(|e| e.mean), expected);
}

#[test]
fn test_short_service_at_large_instant() {
    init_logger();
    let config = SimulationConfig {
        stop: 1e17,
        ..idle_config()
    };
    let source = ScriptedSource::new().with(Stream::CloudletClass1, &[1.]);
    let mut sim = OffloadSimulation::with_random_source(config, Box::new(source)).unwrap();
    sim.inject_offload_request(TaskClass::Class1, 1e16).unwrap();

    assert!(sim.step().unwrap());
    let task = sim.cloudlet().state().tasks(TaskClass::Class1)[0];
    assert!(task.completion().unwrap() > 1e16);

    sim.run().unwrap();
    assert_eq!(sim.event_type(), EventType::Stop);
    assert_eq!(sim.statistics().completions(Layer::Cloudlet, TaskClass::Class1), 1);
}
