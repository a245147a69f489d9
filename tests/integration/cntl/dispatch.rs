use kvcntl::cntl::{
    CntlError, CntlValue, Instance, Ipv6Policy, Mode, Opcode, control, exists, get_u32, set_u32,
};

const TIMEOUT_OPCODES: [Opcode; 12] = [
    Opcode::OP_TIMEOUT,
    Opcode::VIEW_TIMEOUT,
    Opcode::DURABILITY_INTERVAL,
    Opcode::DURABILITY_TIMEOUT,
    Opcode::HTTP_TIMEOUT,
    Opcode::CONFIGURATION_TIMEOUT,
    Opcode::CONFDELAY_THRESH,
    Opcode::CONFIG_NODE_TIMEOUT,
    Opcode::HTCONFIG_IDLE_TIMEOUT,
    Opcode::RETRY_INTERVAL,
    Opcode::N1QL_TIMEOUT,
    Opcode::RETRY_NMV_DELAY,
];

const FLAG_OPCODES: [Opcode; 11] = [
    Opcode::RANDOMIZE_BOOTSTRAP_HOSTS,
    Opcode::SYNCDESTROY,
    Opcode::DETAILED_ERRCODES,
    Opcode::HTTP_REFRESH_CONFIG_ON_ERROR,
    Opcode::SCHED_IMPLICIT_FLUSH,
    Opcode::VBGUESS_PERSIST,
    Opcode::FETCH_MUTATION_TOKENS,
    Opcode::DURABILITY_MUTATION_TOKENS,
    Opcode::RETRY_NMV_IMM,
    Opcode::TCP_NODELAY,
    Opcode::RESET_TIMEOUT_ON_WAIT,
];

fn get(instance: &mut Instance, opcode: Opcode) -> CntlValue {
    let mut value = CntlValue::Empty;
    control(instance, Mode::Get, opcode, &mut value).expect("get");
    value
}

fn set(instance: &mut Instance, opcode: Opcode, value: CntlValue) {
    let mut value = value;
    control(instance, Mode::Set, opcode, &mut value).expect("set");
}

#[test]
fn timeouts_round_trip_independently() {
    let mut instance = Instance::detached();
    for (i, opcode) in TIMEOUT_OPCODES.into_iter().enumerate() {
        set_u32(&mut instance, opcode, 1_000 + i as u32).expect("set");
    }
    for (i, opcode) in TIMEOUT_OPCODES.into_iter().enumerate() {
        assert_eq!(get_u32(&mut instance, opcode), 1_000 + i as u32, "{opcode}");
    }
}

#[test]
fn flags_round_trip() {
    let mut instance = Instance::detached();
    for opcode in FLAG_OPCODES {
        set(&mut instance, opcode, CntlValue::Int(1));
        assert_eq!(get(&mut instance, opcode), CntlValue::Int(1), "{opcode}");
        set(&mut instance, opcode, CntlValue::Int(0));
        assert_eq!(get(&mut instance, opcode), CntlValue::Int(0), "{opcode}");
    }
}

#[test]
fn other_shapes_round_trip() {
    let mut instance = Instance::detached();
    let cases = [
        (Opcode::CONFERRTHRESH, CntlValue::Size(17)),
        (Opcode::RETRY_BACKOFF, CntlValue::Float(0.25)),
        (Opcode::HTCONFIG_URLTYPE, CntlValue::Int(2)),
        (Opcode::COMPRESSION_OPTS, CntlValue::Int(0x01)),
        (Opcode::MAX_REDIRECTS, CntlValue::Int(-1)),
        (Opcode::READ_CHUNKSIZE, CntlValue::U32(4096)),
        (Opcode::HTTP_POOLSIZE, CntlValue::Size(3)),
        (Opcode::IP6POLICY, CntlValue::Ipv6(Ipv6Policy::Allow)),
        (Opcode::FORCE_SASL_MECH, CntlValue::text("PLAIN")),
        (Opcode::CLIENT_STRING, CntlValue::text("app/1.0")),
    ];
    for (opcode, value) in cases {
        set(&mut instance, opcode, value.clone());
        assert_eq!(get(&mut instance, opcode), value, "{opcode}");
    }
}

#[test]
fn absent_text_clears_string_settings() {
    let mut instance = Instance::detached();
    set(&mut instance, Opcode::CLIENT_STRING, CntlValue::text("app"));
    set(&mut instance, Opcode::CLIENT_STRING, CntlValue::Str(None));
    assert_eq!(get(&mut instance, Opcode::CLIENT_STRING), CntlValue::Str(None));
}

#[test]
fn unknown_opcodes_never_panic() {
    for raw in [-1, i32::MIN, 0x10, 0x11, 0x43, 0x1000, i32::MAX] {
        let opcode = Opcode(raw);
        assert!(!exists(opcode), "{raw}");

        let mut instance = Instance::detached();
        let err = control(&mut instance, Mode::Get, opcode, &mut CntlValue::Empty).unwrap_err();
        assert_eq!(err.code(), "not_supported", "{raw}");

        set(&mut instance, Opcode::DETAILED_ERRCODES, CntlValue::Int(1));
        let err = control(&mut instance, Mode::Set, opcode, &mut CntlValue::U32(1)).unwrap_err();
        assert_eq!(err, CntlError::UnknownSetting(opcode), "{raw}");
    }
}

#[test]
fn syncmode_is_registered_but_unknown() {
    assert!(exists(Opcode::SYNCMODE));
    let mut instance = Instance::detached();
    set(&mut instance, Opcode::DETAILED_ERRCODES, CntlValue::Int(1));
    let err = control(&mut instance, Mode::Get, Opcode::SYNCMODE, &mut CntlValue::Empty)
        .unwrap_err();
    assert_eq!(err, CntlError::UnknownSetting(Opcode::SYNCMODE));
}

#[test]
fn unsupported_mode_is_coarsened_unless_detailed() {
    let mut instance = Instance::detached();
    let err = control(
        &mut instance,
        Mode::Set,
        Opcode::HANDLETYPE,
        &mut CntlValue::Empty,
    )
    .unwrap_err();
    assert_eq!(err.code(), "not_supported");

    set(&mut instance, Opcode::DETAILED_ERRCODES, CntlValue::Int(1));
    let err = control(
        &mut instance,
        Mode::Set,
        Opcode::HANDLETYPE,
        &mut CntlValue::Empty,
    )
    .unwrap_err();
    assert_eq!(err.code(), "unsupported_mode");
}

#[test]
fn wrong_payload_shape_is_rejected() {
    let mut instance = Instance::detached();
    let err = control(
        &mut instance,
        Mode::Set,
        Opcode::OP_TIMEOUT,
        &mut CntlValue::text("5"),
    )
    .unwrap_err();
    assert_eq!(err.code(), "invalid_argument");
    assert_eq!(instance.settings().operation_timeout, 2_500_000);
}

#[test]
fn noop_opcodes_accept_anything() {
    let mut instance = Instance::detached();
    for opcode in [
        Opcode::RBUFSIZE,
        Opcode::WBUFSIZE,
        Opcode::SKIP_CONFIGURATION_ERRORS_ON_CONNECT,
    ] {
        control(&mut instance, Mode::Set, opcode, &mut CntlValue::U32(9)).expect("noop");
    }
}

#[test]
fn max_redirects_floor() {
    let mut instance = Instance::detached();
    let err = control(
        &mut instance,
        Mode::Set,
        Opcode::MAX_REDIRECTS,
        &mut CntlValue::Int(-2),
    )
    .unwrap_err();
    assert_eq!(err.code(), "invalid_argument");
}

#[test]
fn get_u32_reports_zero_on_failure() {
    let mut instance = Instance::detached();
    assert_eq!(get_u32(&mut instance, Opcode(0x7f)), 0);
    assert_eq!(get_u32(&mut instance, Opcode::OP_TIMEOUT), 2_500_000);
}
