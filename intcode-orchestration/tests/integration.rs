//! Testes de integração para intcode-orchestration

use std::time::Duration;

use intcode_core::{MachineConfig, MachineStatus, Program};
use intcode_orchestration::*;

const AMPLIFIER: &str = "3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0";

const FEEDBACK_AMPLIFIER: &str = "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,\
27,4,27,1001,28,-1,28,1005,28,6,99,0,0,5";

const FEEDBACK_AMPLIFIER_LONG: &str = "3,52,1001,52,-5,52,3,53,1,52,56,54,1007,54,5,55,\
1005,55,26,1001,54,-5,54,1105,1,12,1,53,54,53,1008,54,0,55,1001,55,1,55,2,53,55,53,4,\
53,1001,56,-1,56,1005,56,6,99,0,0,0,0,10";

/// NIC que repassa cada pacote ao vizinho (o último envia ao NAT)
///
/// Reads its address, polls until `x != -1`, reads `y`, then sends
/// `(address + 1 | 255, x, y + increment)` and goes back to polling.
fn relay_program(last: i64, increment: i64) -> Program {
    let text = format!(
        "3,100,3,101,1008,101,-1,102,1005,102,2,3,103,1001,100,1,104,\
         1008,100,{last},105,1006,105,28,1101,0,255,104,4,104,4,101,\
         1001,103,{increment},103,4,103,1105,1,2"
    );
    Program::parse(&text).unwrap()
}

fn fast_network(program: &Program, size: usize) -> Network {
    Network::with_options(program, size, MachineConfig::default(), 20).unwrap()
}

#[test]
fn test_chain_amplifiers() {
    let program = Program::parse(AMPLIFIER).unwrap();
    let signal = Pipeline::run_phases(program, &[4, 3, 2, 1, 0], Topology::Chain, 0).unwrap();
    assert_eq!(signal, 43210);
}

#[test]
fn test_ring_feedback_amplifiers() {
    let program = Program::parse(FEEDBACK_AMPLIFIER).unwrap();
    let signal = Pipeline::run_phases(program, &[9, 8, 7, 6, 5], Topology::Ring, 0).unwrap();
    assert_eq!(signal, 139_629_729);
}

#[test]
fn test_ring_feedback_amplifiers_long() {
    let program = Program::parse(FEEDBACK_AMPLIFIER_LONG).unwrap();
    let signal = Pipeline::run_phases(program, &[9, 7, 8, 5, 6], Topology::Ring, 0).unwrap();
    assert_eq!(signal, 18216);
}

#[test]
fn test_ring_manual_wiring() {
    let program = Program::parse(FEEDBACK_AMPLIFIER).unwrap();
    let mut pipeline = Pipeline::new(program, 5, Topology::Ring)
        .unwrap()
        .with_config(MachineConfig::default().with_thread_name("amp"));

    for (index, phase) in [9, 8, 7, 6, 5].into_iter().enumerate() {
        pipeline.seed(index, [phase]).unwrap();
    }
    pipeline.input().send(0).unwrap();
    pipeline.start().unwrap();
    pipeline.wait_all().unwrap();

    assert!(pipeline.statuses().iter().all(|s| *s == MachineStatus::Halted));
    assert_eq!(pipeline.output().drain(), vec![139_629_729]);
}

#[test]
fn test_ring_increment_forward_hops() {
    // Cada instância lê um valor, soma 1 e repassa
    let program = Program::parse("3,0,1001,0,1,0,4,0,99").unwrap();
    let size = 5;
    let seed = 10;
    let mut pipeline = Pipeline::new(program, size, Topology::Ring).unwrap();
    pipeline.input().send(seed).unwrap();
    pipeline.start().unwrap();
    pipeline.wait_all().unwrap();

    assert!(pipeline.statuses().iter().all(|s| *s == MachineStatus::Halted));
    assert_eq!(pipeline.output().drain(), vec![seed + size as i64]);
}

#[test]
fn test_chain_upstream_fault_surfaces() {
    let program = Program::parse("3,0,109,-5,4,0,99").unwrap();
    let mut pipeline = Pipeline::new(program.clone(), 3, Topology::Chain).unwrap();
    pipeline.input().send(1).unwrap();
    pipeline.start().unwrap();

    let err = pipeline.wait_all().unwrap_err();
    assert_eq!(
        err,
        OrchestrationError::Machine(intcode_core::IntcodeError::RelativeBaseUnderflow(-5))
    );
    assert!(pipeline.statuses()[1..].iter().all(|s| *s == MachineStatus::Cancelled));

    assert!(Pipeline::run_phases(program, &[1, 2], Topology::Chain, 0).is_err());
}

#[test]
fn test_cancel_stalled_pipeline() {
    // Ninguém alimenta a entrada: todas as instâncias ficam bloqueadas
    let program = Program::parse(AMPLIFIER).unwrap();
    let mut pipeline = Pipeline::new(program, 3, Topology::Chain).unwrap();
    pipeline.start().unwrap();
    pipeline.cancel_all();

    assert_eq!(
        pipeline.wait_all().unwrap_err(),
        OrchestrationError::Machine(intcode_core::IntcodeError::Cancelled)
    );
    assert!(pipeline.statuses().iter().all(|s| *s == MachineStatus::Cancelled));
}

#[test]
fn test_network_relays_to_nat() {
    let size = 4;
    let program = relay_program(size - 1, 1);
    let network = fast_network(&program, size as usize);

    network.inject(Packet::new(0, NAT_ADDRESS, 7, 0)).unwrap();

    let packet = loop {
        match network.route_next(Duration::from_secs(5)).unwrap() {
            Some(NetworkEvent::External(packet)) => break packet,
            Some(NetworkEvent::Delivered(_)) => continue,
            None => panic!("network went quiet"),
        }
    };

    assert_eq!(packet, Packet::new(NAT_ADDRESS, size - 1, 7, size));
    network.shutdown().unwrap();
}

#[test]
fn test_network_inject_unknown_address() {
    let program = relay_program(0, 1);
    let network = fast_network(&program, 1);
    assert_eq!(
        network.inject(Packet::new(5, 0, 1, 1)).unwrap_err(),
        OrchestrationError::UnknownAddress(5)
    );
    network.shutdown().unwrap();
}

#[test]
fn test_network_becomes_idle() {
    let program = relay_program(1, 1);
    let network = fast_network(&program, 2);

    let mut waited = Duration::ZERO;
    while !network.is_idle() {
        assert!(waited < Duration::from_secs(5), "network never went idle");
        std::thread::sleep(Duration::from_millis(5));
        waited += Duration::from_millis(5);
    }

    network.inject(Packet::new(1, 0, 1, 1)).unwrap();
    assert!(!network.is_idle());
    network.shutdown().unwrap();
}

#[test]
fn test_nat_detects_repeated_y() {
    let program = relay_program(1, 0);
    let network = fast_network(&program, 2);
    network.inject(Packet::new(0, NAT_ADDRESS, 3, 42)).unwrap();

    let mut nat = NatMonitor::new();
    let y = nat.run(&network, Duration::from_secs(10)).unwrap();

    assert_eq!(y, 42);
    assert_eq!(nat.first(), Some(Packet::new(NAT_ADDRESS, 1, 3, 42)));
    network.shutdown().unwrap();
}

#[test]
fn test_shutdown_cancels_every_nic() {
    let program = relay_program(2, 1);
    let network = fast_network(&program, 3);
    assert!(network.statuses().iter().all(|s| !s.is_terminal()));
    network.shutdown().unwrap();
}
