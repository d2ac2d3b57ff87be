use rstest::rstest;

use offload_sim::access_control::{
    access_control_resolver, AccessControl, AccessControlPolicy, Action, Algorithm1, Algorithm2, Occupancy,
};
use offload_sim::interrupt::{VictimSelectionPolicy, VictimSelector};
use offload_sim::state::{CloudletState, PopulationState};
use offload_sim::{ConfigError, SimulationError, Task, TaskClass};

fn occupancy(class1: usize, class2: usize, capacity: usize, threshold: usize) -> Occupancy {
    Occupancy {
        class1,
        class2,
        capacity,
        threshold,
    }
}

#[rstest]
#[case(0, 0, TaskClass::Class1, Action::SendCloudlet)]
#[case(0, 0, TaskClass::Class2, Action::SendCloudlet)]
#[case(2, 2, TaskClass::Class1, Action::SendCloudlet)]
#[case(3, 2, TaskClass::Class1, Action::SendCloud)]
#[case(0, 5, TaskClass::Class2, Action::SendCloud)]
fn test_algorithm1(
    #[case] class1: usize,
    #[case] class2: usize,
    #[case] class: TaskClass,
    #[case] expected: Action,
) {
    assert_eq!(Algorithm1.decide(&occupancy(class1, class2, 5, 5), class), expected);
}

#[rstest]
#[case(5, 0, TaskClass::Class1, Action::SendCloud)]
#[case(1, 1, TaskClass::Class1, Action::SendCloudlet)]
#[case(1, 2, TaskClass::Class1, Action::SendCloudletWithClass2Preemption)]
#[case(3, 2, TaskClass::Class1, Action::SendCloudletWithClass2Preemption)]
#[case(4, 0, TaskClass::Class1, Action::SendCloudlet)]
#[case(2, 1, TaskClass::Class2, Action::SendCloud)]
#[case(1, 1, TaskClass::Class2, Action::SendCloudlet)]
#[case(0, 0, TaskClass::Class2, Action::SendCloudlet)]
fn test_algorithm2(
    #[case] class1: usize,
    #[case] class2: usize,
    #[case] class: TaskClass,
    #[case] expected: Action,
) {
    assert_eq!(Algorithm2.decide(&occupancy(class1, class2, 5, 3), class), expected);
}

#[test]
fn test_policies_respect_capacity() {
    let policies: Vec<Box<dyn AccessControl>> = vec![Box::new(Algorithm1), Box::new(Algorithm2)];
    for policy in &policies {
        for capacity in 1..=8 {
            for threshold in 0..=capacity {
                for class1 in 0..=capacity {
                    for class2 in 0..=(capacity - class1) {
                        for class in TaskClass::ALL {
                            let occ = occupancy(class1, class2, capacity, threshold);
                            match policy.decide(&occ, class) {
                                Action::SendCloudlet => assert!(class1 + class2 < capacity),
                                Action::SendCloudletWithClass2Preemption => assert!(class2 > 0),
                                Action::SendCloud => {}
                            }
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_policy_names() {
    assert_eq!(
        "algorithm2".parse::<AccessControlPolicy>().unwrap(),
        AccessControlPolicy::Algorithm2
    );
    assert_eq!(
        "ALGORITHM1".parse::<AccessControlPolicy>().unwrap(),
        AccessControlPolicy::Algorithm1
    );
    assert!(matches!(
        "algorithm3".parse::<AccessControlPolicy>(),
        Err(ConfigError::UnknownPolicy { .. })
    ));
    assert_eq!(
        "Max_Completion_Time".parse::<VictimSelectionPolicy>().unwrap(),
        VictimSelectionPolicy::MaxCompletionTime
    );
    assert!("latest".parse::<VictimSelectionPolicy>().is_err());
    assert_eq!(AccessControlPolicy::Algorithm2.to_string(), "ALGORITHM2");
    assert_eq!(VictimSelectionPolicy::MinArrivalTime.to_string(), "MIN_ARRIVAL_TIME");
}

#[test]
fn test_resolver() {
    let policy = access_control_resolver(AccessControlPolicy::Algorithm2);
    assert_eq!(
        policy.decide(&occupancy(1, 2, 3, 3), TaskClass::Class1),
        Action::SendCloudletWithClass2Preemption
    );
}

fn class2_tasks() -> Vec<Task> {
    // (arrival, completion): (1, 9), (2, 5), (3, 12)
    let mut state = CloudletState::new(3, 3);
    for (id, arrival, completion) in [(10, 1., 9.), (11, 2., 5.), (12, 3., 12.)] {
        let task = Task::new(id, TaskClass::Class2, arrival);
        state.add(task).unwrap();
        state.set_completion(&task, completion).unwrap();
    }
    state.tasks(TaskClass::Class2).to_vec()
}

#[rstest]
#[case(VictimSelectionPolicy::MinArrivalTime, 10)]
#[case(VictimSelectionPolicy::MaxArrivalTime, 12)]
#[case(VictimSelectionPolicy::MinCompletionTime, 11)]
#[case(VictimSelectionPolicy::MaxCompletionTime, 12)]
fn test_victim_selection(#[case] policy: VictimSelectionPolicy, #[case] expected: u64) {
    let victim = policy.select(4., &class2_tasks()).unwrap();
    assert_eq!(victim.id(), expected);
}

#[test]
fn test_victim_selection_ignores_future_arrivals() {
    let victim = VictimSelectionPolicy::MaxArrivalTime
        .select(2.5, &class2_tasks())
        .unwrap();
    assert_eq!(victim.id(), 11);
}

#[test]
fn test_no_victim() {
    assert_eq!(
        VictimSelectionPolicy::MinArrivalTime.select(1., &[]),
        Err(SimulationError::NoVictim)
    );
}
