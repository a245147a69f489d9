use kvcntl::cntl::{
    CntlValue, Instance, Mode, Opcode, RetryPolicy, RetryReason, UNSAFE_OPTIMIZE_SETTINGS,
    apply_settings, control, control_string, retry,
};

#[test]
fn retry_policy_round_trips_through_the_opcode() {
    let mut instance = Instance::detached();
    control_string(&mut instance, "retry_policy", "missingnode:safe").expect("set");

    let mut value = CntlValue::U32(retry::encode(RetryReason::MissingNode, RetryPolicy::None));
    control(&mut instance, Mode::Get, Opcode::RETRYMODE, &mut value).expect("get");
    let (reason, policy) = retry::decode(value.as_u32().unwrap()).unwrap();
    assert_eq!(reason, RetryReason::MissingNode);
    assert_eq!(policy, RetryPolicy::Safe);

    // Other reasons keep their defaults.
    assert_eq!(
        instance.settings().retry.get(RetryReason::TopoChange),
        RetryPolicy::All
    );
}

#[test]
fn retry_get_rejects_out_of_range_reason() {
    let mut instance = Instance::detached();
    let mut value = CntlValue::U32(9 << 16);
    let err = control(&mut instance, Mode::Get, Opcode::RETRYMODE, &mut value).unwrap_err();
    assert_eq!(err.code(), "invalid_argument");
}

#[test]
fn unsafe_optimize_applies_every_setting() {
    let mut instance = Instance::detached();
    control_string(&mut instance, "unsafe_optimize", "1").expect("unsafe optimize");

    let settings = instance.settings();
    assert!(settings.keep_guess_vbuckets);
    for reason in RetryReason::ALL {
        assert_eq!(settings.retry.get(reason), RetryPolicy::None, "{reason:?}");
    }
    assert_eq!(settings.retry_backoff, 0.0);
    assert_eq!(UNSAFE_OPTIMIZE_SETTINGS.len(), 6);
}

#[test]
fn unsafe_optimize_cannot_be_turned_off() {
    let mut instance = Instance::detached();
    let err = control(
        &mut instance,
        Mode::Set,
        Opcode::UNSAFE_OPTIMIZE,
        &mut CntlValue::Int(0),
    )
    .unwrap_err();
    assert_eq!(err.code(), "invalid_argument");
    assert!(!instance.settings().keep_guess_vbuckets);
}

#[test]
fn bundle_failure_keeps_earlier_settings() {
    let mut instance = Instance::detached();
    let bundle = [
        ("vbguess_persist", "1"),
        ("retry_policy", "sockerr:sometimes"),
        ("retry_backoff", "0.0"),
    ];
    let err = apply_settings(&mut instance, &bundle).unwrap_err();
    assert_eq!(err.code(), "invalid_argument");

    let settings = instance.settings();
    assert!(settings.keep_guess_vbuckets);
    assert_eq!(settings.retry.get(RetryReason::SockErr), RetryPolicy::All);
    assert_eq!(settings.retry_backoff, 1.5);
}
