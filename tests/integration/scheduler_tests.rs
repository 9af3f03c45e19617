//! Integration tests for the DutyCycleScheduler against mock adapters.

use std::time::Duration;

use gasnode::app::events::NodeEvent;
use gasnode::app::ports::{RadioStatus, TxStatus};
use gasnode::config::{DeviceCredentials, NodeConfig, RawCredentials, TransmitPolicy};
use gasnode::error::{ActuatorError, ConfigError, RadioError};
use gasnode::fsm::CyclePhase;
use gasnode::scheduler::DutyCycleScheduler;

use crate::mock_hw::{journal, Call, Journal, LogSink, MockHardware, MockRadio};

type Node = DutyCycleScheduler<MockHardware, MockRadio, LogSink>;

fn credentials() -> Result<DeviceCredentials, ConfigError> {
    DeviceCredentials::parse(&RawCredentials {
        dev_addr: "26011BDA",
        nwk_skey: "2B7E151628AED2A6ABF7158809CF4F3C",
        app_skey: "3C4FCF098815F7ABA6D2AE2816157E2B",
    })
}

fn node_with(config: NodeConfig, hw: MockHardware, radio: MockRadio) -> Node {
    DutyCycleScheduler::new(config, credentials(), hw, radio, LogSink::new())
}

fn node(j: &Journal) -> Node {
    node_with(
        NodeConfig::default(),
        MockHardware::new(j.clone()),
        MockRadio::new(j.clone()),
    )
}

fn sends(j: &Journal) -> Vec<Vec<u8>> {
    j.borrow()
        .iter()
        .filter_map(|c| match c {
            Call::Send { payload, .. } => Some(payload.clone()),
            _ => None,
        })
        .collect()
}

// ── Bring-up ──────────────────────────────────────────────────

#[test]
fn startup_runs_each_step_once_in_order() {
    let j = journal();
    let mut n = node(&j);
    let report = n.start();

    assert!(report.radio_ready && report.heater_ready && report.joined);
    assert_eq!(
        *j.borrow(),
        vec![Call::RadioInit, Call::PrepareHeater, Call::ArmWatchdog, Call::Join]
    );

    // A second start() touches nothing.
    assert_eq!(n.start(), report);
    assert_eq!(j.borrow().len(), 4);
    assert_eq!(n.sink().count(|e| matches!(e, NodeEvent::Started)), 1);
}

#[test]
fn radio_failure_at_startup_is_not_retried() {
    let j = journal();
    let mut radio = MockRadio::new(j.clone());
    radio.init_result = Err(RadioError::NoResponse);
    radio.join_result = Err(RadioError::NoResponse);
    let mut n = node_with(NodeConfig::default(), MockHardware::new(j.clone()), radio);

    let report = n.start();
    assert!(!report.radio_ready);
    assert!(!report.joined);

    // The cycle still runs and still tries to transmit.
    n.run_cycle();
    let inits = j.borrow().iter().filter(|c| **c == Call::RadioInit).count();
    let joins = j.borrow().iter().filter(|c| **c == Call::Join).count();
    assert_eq!((inits, joins), (1, 1));
    assert_eq!(sends(&j).len(), 1);
    assert_eq!(
        n.sink()
            .count(|e| matches!(e, NodeEvent::RadioFailed(RadioError::NoResponse))),
        1
    );
}

#[test]
fn slow_radio_bring_up_logs_timeout_and_continues() {
    let j = journal();
    let mut radio = MockRadio::new(j.clone());
    radio.init_delay = Duration::from_millis(150);
    let config = NodeConfig {
        startup_timeout_ms: 20,
        ..NodeConfig::default()
    };
    let mut n = node_with(config, MockHardware::new(j.clone()), radio);

    let report = n.start();
    assert!(report.timed_out);
    assert!(report.radio_ready, "guard is advisory, bring-up completes");
    assert!(report.joined);
    assert_eq!(
        n.sink()
            .count(|e| matches!(e, NodeEvent::StartupTimeout { timeout_ms: 20 })),
        1
    );
}

#[test]
fn missing_credentials_skip_join_only() {
    let j = journal();
    let mut n = DutyCycleScheduler::new(
        NodeConfig::default(),
        Err(ConfigError::MissingCredentials),
        MockHardware::new(j.clone()),
        MockRadio::new(j.clone()),
        LogSink::new(),
    );
    let report = n.start();
    assert!(!report.joined);
    assert!(!j.borrow().contains(&Call::Join));
    assert_eq!(
        n.sink().count(|e| matches!(
            e,
            NodeEvent::JoinSkipped(ConfigError::MissingCredentials)
        )),
        1
    );
}

#[test]
fn join_receives_build_credentials() {
    let j = journal();
    let mut n = node(&j);
    n.start();
    let joined = n.radio().joined_with.expect("join called");
    assert_eq!(joined.dev_addr, [0x26, 0x01, 0x1B, 0xDA]);
}

// ── Cycle ─────────────────────────────────────────────────────

#[test]
fn end_to_end_cycle_300_900() {
    let j = journal();
    let mut n = node(&j);
    n.start();
    j.borrow_mut().clear();

    let report = n.run_cycle();

    assert_eq!(
        *j.borrow(),
        vec![
            Call::Heat(5),
            Call::ReadGas,
            Call::ReadTemperature,
            Call::Send {
                payload: vec![0x01, 0x2C, 0x03, 0x84],
                port: 1
            },
            Call::Sleep(120),
        ]
    );
    let sleep = report.sleep.expect("slept");
    assert_eq!(sleep.ticks_target, 15);
    assert_eq!(sleep.halts, 15);
    assert_eq!(n.hardware().ticks().get(), 0);
    assert_eq!(n.phase(), CyclePhase::Heating);
}

#[test]
fn transmit_failure_still_sleeps() {
    let j = journal();
    let radio = MockRadio::new(j.clone()).with_tx(&[
        TxStatus::TransientFailure(RadioError::TxFailed),
        TxStatus::ConfigFailure(RadioError::NotJoined),
    ]);
    let mut n = node_with(NodeConfig::default(), MockHardware::new(j.clone()), radio);

    for expected in [
        TxStatus::TransientFailure(RadioError::TxFailed),
        TxStatus::ConfigFailure(RadioError::NotJoined),
    ] {
        let report = n.run_cycle();
        assert_eq!(report.tx_status, Some(expected));
        assert_eq!(report.tx_attempts, 1);
        assert!(report.sleep.is_some());
        assert_eq!(j.borrow().last(), Some(&Call::Sleep(120)));
    }
}

#[test]
fn failed_uplink_does_not_leak_into_next_payload() {
    let j = journal();
    let hw = MockHardware::new(j.clone()).with_readings(&[(300, 900), (12, 1023)]);
    let radio = MockRadio::new(j.clone()).with_tx(&[TxStatus::TransientFailure(RadioError::Busy)]);
    let mut n = node_with(NodeConfig::default(), hw, radio);

    let first = n.run_cycle();
    let second = n.run_cycle();

    assert_eq!(sends(&j), vec![vec![0x01, 0x2C, 0x03, 0x84], vec![0x00, 0x0C, 0x03, 0xFF]]);
    assert_eq!(first.cycle, 0);
    assert_eq!(second.cycle, 1);
    assert_eq!(second.tx_status, Some(TxStatus::Success));
}

#[test]
fn retry_policy_resends_same_bytes_on_transient_failure() {
    let j = journal();
    let radio = MockRadio::new(j.clone()).with_tx(&[
        TxStatus::TransientFailure(RadioError::Busy),
        TxStatus::TransientFailure(RadioError::Busy),
        TxStatus::TransientFailure(RadioError::Busy),
    ]);
    let config = NodeConfig {
        transmit_policy: TransmitPolicy::RetryTransient { retries: 2 },
        ..NodeConfig::default()
    };
    let mut n = node_with(config, MockHardware::new(j.clone()), radio);

    let report = n.run_cycle();
    assert_eq!(report.tx_attempts, 3);
    assert_eq!(
        report.tx_status,
        Some(TxStatus::TransientFailure(RadioError::Busy))
    );
    let sent = sends(&j);
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|p| p == &sent[0]));
    assert!(report.sleep.is_some());
}

#[test]
fn heater_fault_is_reported_and_cycle_continues() {
    let j = journal();
    let mut hw = MockHardware::new(j.clone());
    hw.heater_fails = true;
    let mut n = node_with(NodeConfig::default(), hw, MockRadio::new(j.clone()));

    let report = n.run_cycle();
    assert_eq!(report.heater_fault, Some(ActuatorError::GpioWriteFailed));
    assert!(report.payload.is_some());
    assert!(report.sleep.is_some());
}

#[test]
fn phase_events_follow_the_cycle() {
    let j = journal();
    let mut n = node(&j);
    n.run_cycle();

    let phases: Vec<_> = n
        .sink()
        .events
        .iter()
        .filter_map(|e| match e {
            NodeEvent::PhaseChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            CyclePhase::Sampling,
            CyclePhase::Transmitting,
            CyclePhase::Sleeping,
            CyclePhase::Heating,
        ]
    );
    assert_eq!(n.cycles_completed(), 1);
}

#[test]
fn radio_status_is_forwarded_to_the_sink() {
    let j = journal();
    let mut radio = MockRadio::new(j.clone());
    let status = RadioStatus {
        supply_mv: Some(3300),
        ..RadioStatus::default()
    };
    radio.init_result = Ok(status.clone());
    let mut n = node_with(NodeConfig::default(), MockHardware::new(j.clone()), radio);
    n.start();
    assert_eq!(
        n.sink()
            .count(|e| matches!(e, NodeEvent::RadioReady(s) if *s == status)),
        1
    );
}
