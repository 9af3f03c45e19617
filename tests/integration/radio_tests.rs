//! Transceiver adapter tests against a scripted serial line.

use gasnode::adapters::radio::Rn2483;
use gasnode::app::ports::{RadioLink, TxStatus};
use gasnode::config::{DeviceCredentials, NodeConfig, RawCredentials};
use gasnode::error::RadioError;
use gasnode::scheduler::DutyCycleScheduler;

use crate::mock_hw::{journal, Call, LogSink, MockHardware, NoDelay, RecPin, ScriptedLine};

const BANNER: &str = "RN2483 1.0.5 Oct 31 2018 15:06:52";

type Radio = Rn2483<ScriptedLine, RecPin, NoDelay>;

fn radio(replies: &[Result<&'static str, RadioError>]) -> Radio {
    Rn2483::new(ScriptedLine::new(replies), RecPin::default(), NoDelay, 868)
}

fn creds() -> DeviceCredentials {
    DeviceCredentials::parse(&RawCredentials {
        dev_addr: "26011BDA",
        nwk_skey: "2B7E151628AED2A6ABF7158809CF4F3C",
        app_skey: "3C4FCF098815F7ABA6D2AE2816157E2B",
    })
    .unwrap()
}

#[test]
fn initialize_resets_and_queries_status() {
    let mut r = radio(&[
        Ok(BANNER),
        Ok(BANNER),
        Ok("0004A30B001A2B3C"),
        Ok("3312"),
    ]);
    let status = r.initialize().unwrap();

    assert_eq!(status.firmware.as_str(), BANNER);
    assert_eq!(
        status.hardware_eui,
        Some([0x00, 0x04, 0xA3, 0x0B, 0x00, 0x1A, 0x2B, 0x3C])
    );
    assert_eq!(status.supply_mv, Some(3312));
    assert_eq!(
        r.serial().written,
        vec!["sys reset", "sys get hweui", "sys get vdd"]
    );
}

#[test]
fn initialize_tolerates_missing_boot_banner_and_bad_status() {
    let mut r = radio(&[
        Err(RadioError::NoResponse),
        Ok(BANNER),
        Ok("invalid_param"),
        Err(RadioError::NoResponse),
    ]);
    let status = r.initialize().unwrap();
    assert_eq!(status.hardware_eui, None);
    assert_eq!(status.supply_mv, None);
}

#[test]
fn initialize_rejects_silent_module() {
    let mut r = radio(&[]);
    assert_eq!(r.initialize(), Err(RadioError::NoResponse));
}

#[test]
fn initialize_rejects_foreign_banner() {
    let mut r = radio(&[Ok(""), Ok("ERROR")]);
    assert_eq!(r.initialize(), Err(RadioError::UnexpectedResponse));
}

#[test]
fn abp_join_sends_personalisation() {
    let mut r = radio(&[
        Ok("ok"),
        Ok("ok"),
        Ok("ok"),
        Ok("ok"),
        Ok("ok"),
        Ok("accepted"),
    ]);
    r.join(&creds()).unwrap();

    assert!(r.is_joined());
    assert_eq!(
        r.serial().written,
        vec![
            "mac reset 868",
            "mac set devaddr 26011BDA",
            "mac set nwkskey 2B7E151628AED2A6ABF7158809CF4F3C",
            "mac set appskey 3C4FCF098815F7ABA6D2AE2816157E2B",
            "mac join abp",
        ]
    );
}

#[test]
fn join_denied_is_reported() {
    let mut r = radio(&[Ok("ok"), Ok("ok"), Ok("ok"), Ok("ok"), Ok("ok"), Ok("denied")]);
    assert_eq!(r.join(&creds()), Err(RadioError::JoinDenied));
    assert!(!r.is_joined());
}

#[test]
fn join_stops_at_first_rejected_command() {
    let mut r = radio(&[Ok("ok"), Ok("invalid_param")]);
    assert_eq!(r.join(&creds()), Err(RadioError::InvalidParam));
    assert_eq!(r.serial().written.len(), 2);
}

#[test]
fn send_values_packs_and_hex_encodes() {
    let mut r = radio(&[Ok("ok"), Ok("mac_tx_ok")]);
    assert_eq!(r.send_values(300, 900, 1), TxStatus::Success);
    assert_eq!(r.serial().written, vec!["mac tx uncnf 1 012C0384"]);
}

#[test]
fn downlink_counts_as_success() {
    let mut r = radio(&[Ok("ok"), Ok("mac_rx 10 0102")]);
    assert_eq!(r.send_bytes(&[0xAB], 2), TxStatus::Success);
}

#[test]
fn immediate_rejection_reads_one_line() {
    let mut r = radio(&[Ok("not_joined"), Ok("mac_tx_ok")]);
    assert_eq!(
        r.send_bytes(&[1, 2, 3, 4], 1),
        TxStatus::ConfigFailure(RadioError::NotJoined)
    );
    assert_eq!(r.serial().remaining(), 1);
}

#[test]
fn link_failures_are_transient() {
    let mut r = radio(&[Ok("no_free_ch")]);
    assert_eq!(
        r.send_bytes(&[0; 4], 1),
        TxStatus::TransientFailure(RadioError::Busy)
    );

    let mut r = radio(&[Ok("ok"), Ok("mac_err")]);
    assert_eq!(
        r.send_bytes(&[0; 4], 1),
        TxStatus::TransientFailure(RadioError::TxFailed)
    );

    let mut r = radio(&[Ok("ok")]);
    assert_eq!(
        r.send_bytes(&[0; 4], 1),
        TxStatus::TransientFailure(RadioError::NoResponse)
    );
}

#[test]
fn oversized_payload_is_refused_before_writing() {
    let mut r = radio(&[]);
    assert_eq!(
        r.send_bytes(&[0u8; 64], 1),
        TxStatus::ConfigFailure(RadioError::LineOverflow)
    );
    assert!(r.serial().written.is_empty());
}

#[test]
fn scheduler_drives_transceiver_end_to_end() {
    let j = journal();
    let mut line = ScriptedLine::new(&[]);
    // Bring-up, ABP join, one uplink.
    line.push_replies(&[BANNER, BANNER, "0004A30B001A2B3C", "3300"]);
    line.push_replies(&["ok", "ok", "ok", "ok", "ok", "accepted"]);
    line.push_replies(&["ok", "mac_tx_ok"]);

    let mut n = DutyCycleScheduler::new(
        NodeConfig::default(),
        Ok(creds()),
        MockHardware::new(j.clone()),
        Rn2483::new(line, RecPin::default(), NoDelay, 868),
        LogSink::new(),
    );

    let startup = n.start();
    assert!(startup.radio_ready && startup.joined);

    let report = n.run_cycle();
    assert_eq!(report.tx_status, Some(TxStatus::Success));
    assert_eq!(
        n.radio().serial().written.last().map(String::as_str),
        Some("mac tx uncnf 1 012C0384")
    );
    assert_eq!(n.radio().serial().remaining(), 0);
    assert!(j.borrow().contains(&Call::Sleep(120)));
}
